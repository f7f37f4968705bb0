use super::{
    Client, InvoiceData, InvoiceError, InvoiceTotals, LineItem, PaymentStatus, Seller,
    SignedClaims, ValidationError, VerificationCode, qr::EncodingError,
};
use crate::config::Locale;
use crate::invoice::sign::{InvoiceSigner, SigningError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Invoice data with its totals, computed once at build time.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedInvoice {
    data: InvoiceData,
    totals: InvoiceTotals,
}

/// Finalized invoice plus its signed claims token.
#[derive(Debug, Clone)]
pub struct SignedInvoice {
    finalized: FinalizedInvoice,
    claims: SignedClaims,
    token: String,
}

/// Fields every invoice needs before it can be built.
#[derive(Debug, Clone)]
pub struct RequiredInvoiceFields {
    pub seller: Seller,
    pub client: Client,
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub currency: String,
    pub reference: String,
}

/// Builder for [`FinalizedInvoice`].
///
/// # Examples
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use sealbill_core::invoice::{
///     Address, Client, InvoiceBuilder, LineItem, Party, RequiredInvoiceFields, SellerRole,
/// };
///
/// let seller = Party::<SellerRole>::new(
///     "Acme SAS",
///     "billing@acme.test",
///     Address::new("1 rue de la Paix", "Paris", None, "75002"),
///     "552 100 554",
///     None,
/// );
/// let invoice = InvoiceBuilder::new(RequiredInvoiceFields {
///     seller,
///     client: Client::person("Jane Doe", None),
///     issue_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
///     due_date: Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap(),
///     currency: "EUR".into(),
///     reference: "INV-2024-001".into(),
/// })
/// .line_item(LineItem::new("Widget", 2, 100.0, 0.2))
/// .build()?;
/// assert_eq!(invoice.totals().subtotal_without_tax(), 200.0);
/// # Ok::<(), sealbill_core::InvoiceError>(())
/// ```
#[derive(Debug, Clone)]
pub struct InvoiceBuilder {
    invoice: InvoiceData,
}

impl InvoiceBuilder {
    pub fn new(required: RequiredInvoiceFields) -> Self {
        Self {
            invoice: InvoiceData {
                seller: required.seller,
                client: required.client,
                issue_date: required.issue_date,
                due_date: required.due_date,
                line_items: Vec::new(),
                currency: required.currency,
                reference: required.reference,
                payment: PaymentStatus::Unpaid,
                terms: None,
                logo_path: None,
                locale: Locale::default(),
            },
        }
    }

    pub fn line_item(mut self, item: LineItem) -> Self {
        self.invoice.line_items.push(item);
        self
    }

    pub fn line_items(mut self, items: impl IntoIterator<Item = LineItem>) -> Self {
        self.invoice.line_items.extend(items);
        self
    }

    pub fn payment(mut self, payment: PaymentStatus) -> Self {
        self.invoice.payment = payment;
        self
    }

    pub fn terms(mut self, terms: impl Into<String>) -> Self {
        self.invoice.terms = Some(terms.into());
        self
    }

    pub fn logo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.invoice.logo_path = Some(path.into());
        self
    }

    pub fn locale(mut self, locale: Locale) -> Self {
        self.invoice.locale = locale;
        self
    }

    /// Validate identity fields and line numbers, then aggregate totals.
    ///
    /// # Errors
    /// Returns [`InvoiceError::Validation`] listing every offending field.
    pub fn build(self) -> Result<FinalizedInvoice, InvoiceError> {
        let mut issues = self.invoice.issues();
        let totals = match InvoiceTotals::from_lines(&self.invoice.line_items) {
            Ok(totals) => Some(totals),
            Err(err) => {
                issues.extend(err.issues);
                None
            }
        };
        let totals = match totals {
            Some(totals) if issues.is_empty() => totals,
            _ => return Err(ValidationError::new(issues).into()),
        };

        if totals.line_count() == 0 {
            tracing::debug!(
                reference = %self.invoice.reference,
                "building invoice without line items"
            );
        }

        Ok(FinalizedInvoice {
            data: self.invoice,
            totals,
        })
    }
}

impl FinalizedInvoice {
    pub fn data(&self) -> &InvoiceData {
        &self.data
    }

    pub fn totals(&self) -> &InvoiceTotals {
        &self.totals
    }

    /// Project the invoice onto its signed claim set.
    pub fn claims(&self) -> SignedClaims {
        SignedClaims::from_invoice(self)
    }

    pub fn sign(self, signer: &InvoiceSigner) -> Result<SignedInvoice, SigningError> {
        let claims = self.claims();
        let token = signer.sign_claims(&claims)?;
        tracing::debug!(reference = %claims.reference, "signed invoice claims");
        Ok(SignedInvoice {
            finalized: self,
            claims,
            token,
        })
    }
}

impl SignedInvoice {
    pub fn data(&self) -> &InvoiceData {
        self.finalized.data()
    }

    pub fn totals(&self) -> &InvoiceTotals {
        self.finalized.totals()
    }

    pub fn finalized(&self) -> &FinalizedInvoice {
        &self.finalized
    }

    pub fn claims(&self) -> &SignedClaims {
        &self.claims
    }

    /// Compact ES256 token carrying the claims.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Encode the token as a QR image.
    pub fn verification_code(&self) -> Result<VerificationCode, EncodingError> {
        VerificationCode::encode(&self.token)
    }
}

/// JSON shape accepted by [`FinalizedInvoice::try_from`].
///
/// # Examples
/// ```rust
/// use sealbill_core::invoice::{FinalizedInvoice, InvoiceInput};
///
/// let json = r#"{
///     "seller": {
///         "name": "Acme SAS",
///         "contact": "billing@acme.test",
///         "address": { "street": "1 rue de la Paix", "city": "Paris", "zip": "75002" },
///         "identifier": "552 100 554"
///     },
///     "client": { "name": "Jane Doe" },
///     "date": "2024-01-01T00:00:00Z",
///     "dueDate": "2024-01-31T00:00:00Z",
///     "reference": "INV-2024-001",
///     "currency": "EUR",
///     "lines": [{ "label": "Widget", "quantity": 2, "unitPrice": 100.0, "taxRate": 0.2 }],
///     "payment": "card",
///     "language": "fr"
/// }"#;
/// let input: InvoiceInput = serde_json::from_str(json)?;
/// let invoice = FinalizedInvoice::try_from(input)?;
/// assert!(invoice.data().payment().is_paid());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceInput {
    pub seller: Seller,
    pub client: Client,
    pub date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub reference: String,
    pub currency: String,
    #[serde(default)]
    pub lines: Vec<LineItem>,
    #[serde(default)]
    pub payment: PaymentStatus,
    #[serde(default)]
    pub terms: Option<String>,
    #[serde(default)]
    pub logo_path: Option<PathBuf>,
    #[serde(default)]
    pub language: Option<Locale>,
}

impl InvoiceInput {
    pub fn into_builder(self) -> InvoiceBuilder {
        let mut builder = InvoiceBuilder::new(RequiredInvoiceFields {
            seller: self.seller,
            client: self.client,
            issue_date: self.date,
            due_date: self.due_date,
            currency: self.currency,
            reference: self.reference,
        })
        .line_items(self.lines)
        .payment(self.payment);
        if let Some(terms) = self.terms {
            builder = builder.terms(terms);
        }
        if let Some(path) = self.logo_path {
            builder = builder.logo_path(path);
        }
        if let Some(locale) = self.language {
            builder = builder.locale(locale);
        }
        builder
    }
}

impl TryFrom<InvoiceInput> for FinalizedInvoice {
    type Error = InvoiceError;
    fn try_from(input: InvoiceInput) -> Result<Self, InvoiceError> {
        input.into_builder().build()
    }
}
