//! Translation lookup for document captions.
use crate::config::{ConfigError, Locale};
use std::collections::HashMap;

/// Resolves caption keys for a locale.
pub trait Translator {
    /// Never fails; unknown keys come back unchanged.
    fn translate(&self, key: &str, locale: &Locale) -> String;
}

const EN: &[(&str, &str)] = &[
    ("signedInvoice", "Signed invoice"),
    ("invoice", "Invoice"),
    ("reference", "Reference"),
    ("dueDate", "Due date"),
    ("amountDue", "Amount due"),
    ("item", "Item"),
    ("description", "Description"),
    ("unitPrice", "Unit price"),
    ("quantity", "Quantity"),
    ("total", "Total"),
    ("subtotalWithoutTax", "Subtotal without tax"),
    ("tax", "Tax"),
    ("waitingForPayment", "Waiting for payment"),
    ("paid", "Paid"),
    ("page", "Page"),
    ("dateFormat", "%m/%d/%Y"),
];

const FR: &[(&str, &str)] = &[
    ("signedInvoice", "Facture signée"),
    ("invoice", "Facture"),
    ("reference", "Référence"),
    ("dueDate", "Échéance"),
    ("amountDue", "Montant dû"),
    ("item", "Article"),
    ("description", "Description"),
    ("unitPrice", "Prix unitaire"),
    ("quantity", "Quantité"),
    ("total", "Total"),
    ("subtotalWithoutTax", "Sous-total HT"),
    ("tax", "TVA"),
    ("waitingForPayment", "En attente de paiement"),
    ("paid", "Payée"),
    ("page", "Page"),
    ("dateFormat", "%d/%m/%Y"),
];

/// In-memory catalog keyed by locale tag.
///
/// Lookup order: the requested locale, its primary language, the default
/// locale, then the key itself.
///
/// # Examples
/// ```rust
/// use sealbill_core::config::Locale;
/// use sealbill_core::render::{Catalog, Translator};
///
/// let catalog = Catalog::default();
/// let fr_ca: Locale = "fr-CA".parse()?;
/// assert_eq!(catalog.translate("tax", &fr_ca), "TVA");
/// assert_eq!(catalog.translate("noSuchKey", &fr_ca), "noSuchKey");
/// # Ok::<(), sealbill_core::config::LocaleParseError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    default_locale: Locale,
    entries: HashMap<String, HashMap<String, String>>,
}

impl Default for Catalog {
    fn default() -> Self {
        let mut catalog = Catalog::empty(Locale::default());
        for (tag, table) in [("en", EN), ("fr", FR)] {
            let entries = table
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect();
            catalog.entries.insert(tag.to_string(), entries);
        }
        catalog
    }
}

impl Catalog {
    pub fn empty(default_locale: Locale) -> Self {
        Self {
            default_locale,
            entries: HashMap::new(),
        }
    }

    pub fn with_default_locale(mut self, locale: Locale) -> Self {
        self.default_locale = locale;
        self
    }

    pub fn default_locale(&self) -> &Locale {
        &self.default_locale
    }

    pub fn insert(&mut self, locale: &Locale, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .entry(locale.as_str().to_string())
            .or_default()
            .insert(key.into(), value.into());
    }

    /// Merge a flat JSON object of `key: text` pairs into `locale`.
    pub fn merge_json(&mut self, locale: &Locale, json: &str) -> Result<(), ConfigError> {
        let table: HashMap<String, String> = serde_json::from_str(json)?;
        self.entries
            .entry(locale.as_str().to_string())
            .or_default()
            .extend(table);
        Ok(())
    }

    fn lookup(&self, tag: &str, key: &str) -> Option<&str> {
        self.entries.get(tag)?.get(key).map(String::as_str)
    }
}

impl Translator for Catalog {
    fn translate(&self, key: &str, locale: &Locale) -> String {
        [
            locale.as_str(),
            locale.primary_language(),
            self.default_locale.as_str(),
        ]
        .into_iter()
        .find_map(|tag| self.lookup(tag, key))
        .unwrap_or(key)
        .to_string()
    }
}
