//! Invoice domain types, validation and totals.
mod builder;
pub mod claims;
pub mod qr;
pub mod sign;

pub use builder::{
    FinalizedInvoice, InvoiceBuilder, InvoiceInput, RequiredInvoiceFields, SignedInvoice,
};
pub use claims::SignedClaims;
pub use qr::{EncodingError, VerificationCode};

use crate::config::Locale;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

type Result<T> = std::result::Result<T, InvoiceError>;

/// Invoice-related errors.
#[derive(Debug, Error)]
pub enum InvoiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("invalid payment method: {0:?}")]
    InvalidPaymentMethod(String),
}

/// Structured validation error with field-level issues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invoice validation failed: {}", summarize(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    pub fn has_issue(&self, field: InvoiceField, kind: ValidationKind) -> bool {
        self.issues
            .iter()
            .any(|issue| issue.field == field && issue.kind == kind)
    }
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| match issue.line_item_index {
            Some(idx) => format!("{:?} {:?} (line {idx})", issue.field, issue.kind),
            None => format!("{:?} {:?}", issue.field, issue.kind),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Single validation issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: InvoiceField,
    pub kind: ValidationKind,
    pub line_item_index: Option<usize>,
}

impl ValidationIssue {
    pub(crate) fn new(field: InvoiceField, kind: ValidationKind) -> Self {
        Self {
            field,
            kind,
            line_item_index: None,
        }
    }

    pub(crate) fn at_line(field: InvoiceField, kind: ValidationKind, index: usize) -> Self {
        Self {
            field,
            kind,
            line_item_index: Some(index),
        }
    }
}

#[non_exhaustive]
/// Field associated with a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceField {
    SellerName,
    SellerIdentifier,
    ClientName,
    Reference,
    Currency,
    LineItemQuantity,
    LineItemUnitPrice,
    LineItemTaxRate,
}

#[non_exhaustive]
/// Classification of validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    Empty,
    Negative,
    NotFinite,
    /// Accumulated value leaves the representable range.
    Overflow,
}

/// Postal address for parties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: Option<String>,
    pub zip: String,
}

impl Address {
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        state: Option<String>,
        zip: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            state,
            zip: zip.into(),
        }
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn zip(&self) -> &str {
        &self.zip
    }

    /// `"{zip} {city}"` followed by the state when present.
    pub fn locality_line(&self) -> String {
        match self.state() {
            Some(state) => format!("{} {} {}", self.zip, self.city, state),
            None => format!("{} {}", self.zip, self.city),
        }
    }
}

/// VAT number wrapper.
///
/// # Examples
/// ```rust
/// use sealbill_core::invoice::VatNumber;
///
/// let vat = VatNumber::parse(" FR40303265045 ").expect("non-empty");
/// assert_eq!(vat.as_str(), "FR40303265045");
/// assert!(VatNumber::parse("   ").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatNumber(String);

impl VatNumber {
    /// Returns `None` for blank input.
    pub fn parse<S: Into<String>>(s: S) -> Option<Self> {
        let s = s.into().trim().to_string();
        if s.is_empty() { None } else { Some(VatNumber(s)) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for VatNumber {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

// Marker roles
/// Marker trait for party role types.
pub trait PartyRole {}

/// Seller (issuer) role marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerRole;
impl PartyRole for SellerRole {}
/// Client (recipient) role marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRole;
impl PartyRole for ClientRole {}

/// Party wrapper with role-specific typing.
///
/// Sellers always carry an identifier (it is part of the signed issuer claim);
/// clients may be a company or a private person.
///
/// # Examples
/// ```rust
/// use sealbill_core::invoice::{Address, Party, SellerRole};
///
/// let seller = Party::<SellerRole>::new(
///     "Acme SAS",
///     "billing@acme.test",
///     Address::new("1 rue de la Paix", "Paris", None, "75002"),
///     "552 100 554",
///     Some("FR40303265045".into()),
/// );
/// assert_eq!(seller.identifier(), Some("552 100 554"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party<R: PartyRole> {
    #[serde(skip)]
    _marker: PhantomData<R>,
    name: String,
    contact: Option<String>,
    address: Option<Address>,
    identifier: Option<String>,
    vat_number: Option<VatNumber>,
}

pub type Seller = Party<SellerRole>;
pub type Client = Party<ClientRole>;

impl Party<SellerRole> {
    /// Create a seller. Blank names or identifiers are reported by
    /// [`InvoiceBuilder::build`], not here.
    pub fn new(
        name: impl Into<String>,
        contact: impl Into<String>,
        address: Address,
        identifier: impl Into<String>,
        vat_number: Option<String>,
    ) -> Self {
        Party {
            _marker: PhantomData,
            name: name.into(),
            contact: Some(contact.into()),
            address: Some(address),
            identifier: Some(identifier.into()),
            vat_number: vat_number.and_then(VatNumber::parse),
        }
    }
}

impl Party<ClientRole> {
    /// A private person: name and optional address.
    pub fn person(name: impl Into<String>, address: Option<Address>) -> Self {
        Party {
            _marker: PhantomData,
            name: name.into(),
            contact: None,
            address,
            identifier: None,
            vat_number: None,
        }
    }

    /// A company client with its registration identifier.
    pub fn company(
        name: impl Into<String>,
        address: Address,
        identifier: impl Into<String>,
        vat_number: Option<String>,
    ) -> Self {
        Party {
            _marker: PhantomData,
            name: name.into(),
            contact: None,
            address: Some(address),
            identifier: Some(identifier.into()),
            vat_number: vat_number.and_then(VatNumber::parse),
        }
    }
}

impl<R: PartyRole> Party<R> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact(&self) -> Option<&str> {
        self.contact.as_deref()
    }

    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn vat_number(&self) -> Option<&VatNumber> {
        self.vat_number.as_ref()
    }
}

/// How an invoice was settled.
///
/// Serialized as a lowercase tag; unknown tags are kept as [`PaymentMethod::Other`].
///
/// # Examples
/// ```rust
/// use sealbill_core::invoice::PaymentMethod;
///
/// let method: PaymentMethod = "bank_transfer".parse()?;
/// assert_eq!(method, PaymentMethod::BankTransfer);
/// assert_eq!("paypal".parse::<PaymentMethod>()?.as_str(), "paypal");
/// # Ok::<(), sealbill_core::InvoiceError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    Check,
    Other(String),
}

impl PaymentMethod {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Check => "check",
            PaymentMethod::Other(tag) => tag,
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = InvoiceError;
    fn from_str(s: &str) -> Result<Self> {
        let tag = s.trim().to_ascii_lowercase();
        match tag.as_str() {
            "" => Err(InvoiceError::InvalidPaymentMethod(s.to_string())),
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "check" => Ok(PaymentMethod::Check),
            _ => Ok(PaymentMethod::Other(tag)),
        }
    }
}

impl TryFrom<String> for PaymentMethod {
    type Error = InvoiceError;
    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<PaymentMethod> for String {
    fn from(value: PaymentMethod) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment state declared by the issuer.
///
/// On the wire (claims and JSON input) `Unpaid` is `false` and `Paid` is the
/// method tag, e.g. `"card"`.
///
/// # Examples
/// ```rust
/// use sealbill_core::invoice::{PaymentMethod, PaymentStatus};
///
/// let paid = PaymentStatus::Paid(PaymentMethod::Card);
/// assert_eq!(serde_json::to_string(&paid)?, "\"card\"");
/// assert_eq!(serde_json::to_string(&PaymentStatus::Unpaid)?, "false");
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid(PaymentMethod),
}

impl PaymentStatus {
    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentStatus::Paid(_))
    }

    pub fn method(&self) -> Option<&PaymentMethod> {
        match self {
            PaymentStatus::Unpaid => None,
            PaymentStatus::Paid(method) => Some(method),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PaymentStatusRepr {
    Flag(bool),
    Method(PaymentMethod),
}

impl Serialize for PaymentStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            PaymentStatus::Unpaid => PaymentStatusRepr::Flag(false),
            PaymentStatus::Paid(method) => PaymentStatusRepr::Method(method.clone()),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PaymentStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match PaymentStatusRepr::deserialize(deserializer)? {
            PaymentStatusRepr::Flag(false) => Ok(PaymentStatus::Unpaid),
            PaymentStatusRepr::Flag(true) => Err(serde::de::Error::custom(
                "a paid invoice must name its payment method",
            )),
            PaymentStatusRepr::Method(method) => Ok(PaymentStatus::Paid(method)),
        }
    }
}

/// Single invoice line.
///
/// # Examples
/// ```rust
/// use sealbill_core::invoice::LineItem;
///
/// let item = LineItem::new("Consulting", 2, 100.0, 0.2).with_detail("Two days on site");
/// assert_eq!(item.subtotal(), 200.0);
/// assert!((item.total() - 240.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    label: String,
    #[serde(default)]
    detail: Option<String>,
    quantity: i64,
    unit_price: f64,
    tax_rate: f64,
}

impl LineItem {
    pub fn new(label: impl Into<String>, quantity: i64, unit_price: f64, tax_rate: f64) -> Self {
        Self {
            label: label.into(),
            detail: None,
            quantity,
            unit_price,
            tax_rate,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn unit_price(&self) -> f64 {
        self.unit_price
    }

    /// Flat rate as a fraction: `0.2` is 20%.
    pub fn tax_rate(&self) -> f64 {
        self.tax_rate
    }

    /// Amount before tax.
    pub fn subtotal(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }

    /// Amount including tax.
    pub fn total(&self) -> f64 {
        self.subtotal() * (1.0 + self.tax_rate)
    }

    fn issues(&self, index: usize) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if self.quantity < 0 {
            issues.push(ValidationIssue::at_line(
                InvoiceField::LineItemQuantity,
                ValidationKind::Negative,
                index,
            ));
        }
        if !self.unit_price.is_finite() {
            issues.push(ValidationIssue::at_line(
                InvoiceField::LineItemUnitPrice,
                ValidationKind::NotFinite,
                index,
            ));
        } else if self.unit_price < 0.0 {
            issues.push(ValidationIssue::at_line(
                InvoiceField::LineItemUnitPrice,
                ValidationKind::Negative,
                index,
            ));
        }
        if !self.tax_rate.is_finite() {
            issues.push(ValidationIssue::at_line(
                InvoiceField::LineItemTaxRate,
                ValidationKind::NotFinite,
                index,
            ));
        }
        issues
    }
}

/// Core invoice data model.
///
/// Produced by [`InvoiceBuilder`]; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceData {
    seller: Seller,
    client: Client,
    issue_date: DateTime<Utc>,
    due_date: DateTime<Utc>,
    line_items: Vec<LineItem>,
    currency: String,
    reference: String,
    payment: PaymentStatus,
    terms: Option<String>,
    logo_path: Option<PathBuf>,
    locale: Locale,
}

impl InvoiceData {
    pub fn seller(&self) -> &Seller {
        &self.seller
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn issue_date(&self) -> &DateTime<Utc> {
        &self.issue_date
    }

    pub fn due_date(&self) -> &DateTime<Utc> {
        &self.due_date
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    /// Currency code as supplied; not checked against ISO 4217.
    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn payment(&self) -> &PaymentStatus {
        &self.payment
    }

    pub fn terms(&self) -> Option<&str> {
        self.terms.as_deref()
    }

    pub fn logo_path(&self) -> Option<&Path> {
        self.logo_path.as_deref()
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// `"{seller name} ({seller identifier})"`, the signed issuer claim.
    pub fn issuer(&self) -> String {
        format!(
            "{} ({})",
            self.seller.name(),
            self.seller.identifier().unwrap_or_default()
        )
    }

    fn issues(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if self.seller.name().trim().is_empty() {
            issues.push(ValidationIssue::new(
                InvoiceField::SellerName,
                ValidationKind::Empty,
            ));
        }
        if self
            .seller
            .identifier()
            .is_none_or(|id| id.trim().is_empty())
        {
            issues.push(ValidationIssue::new(
                InvoiceField::SellerIdentifier,
                ValidationKind::Empty,
            ));
        }
        if self.client.name().trim().is_empty() {
            issues.push(ValidationIssue::new(
                InvoiceField::ClientName,
                ValidationKind::Empty,
            ));
        }
        if self.reference.trim().is_empty() {
            issues.push(ValidationIssue::new(
                InvoiceField::Reference,
                ValidationKind::Empty,
            ));
        }
        if self.currency.trim().is_empty() {
            issues.push(ValidationIssue::new(
                InvoiceField::Currency,
                ValidationKind::Empty,
            ));
        }
        issues
    }
}

/// Totals derived from the line sequence.
///
/// Accumulated at full `f64` precision; rounding to two fraction digits only
/// happens in [`format_amount`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    subtotal_without_tax: f64,
    amount_due: f64,
    total_quantity: i64,
    line_count: usize,
}

impl InvoiceTotals {
    /// Aggregate a line sequence.
    ///
    /// An empty sequence yields all-zero totals.
    ///
    /// # Errors
    /// Returns [`ValidationError`] if any line has a negative quantity, a
    /// negative or non-finite unit price, or a non-finite tax rate. A quantity
    /// sum past `i64::MAX` is reported as [`ValidationKind::Overflow`] on the
    /// first line that crosses it.
    ///
    /// # Examples
    /// ```rust
    /// use sealbill_core::invoice::{InvoiceTotals, LineItem};
    ///
    /// let totals = InvoiceTotals::from_lines(&[LineItem::new("Widget", 2, 100.0, 0.2)])?;
    /// assert_eq!(totals.subtotal_without_tax(), 200.0);
    /// assert!((totals.amount_due() - 240.0).abs() < 1e-9);
    /// # Ok::<(), sealbill_core::ValidationError>(())
    /// ```
    pub fn from_lines(lines: &[LineItem]) -> std::result::Result<Self, ValidationError> {
        let issues: Vec<_> = lines
            .iter()
            .enumerate()
            .flat_map(|(idx, line)| line.issues(idx))
            .collect();
        if !issues.is_empty() {
            return Err(ValidationError::new(issues));
        }

        let mut totals = Self {
            subtotal_without_tax: 0.0,
            amount_due: 0.0,
            total_quantity: 0,
            line_count: lines.len(),
        };
        for (idx, line) in lines.iter().enumerate() {
            totals.subtotal_without_tax += line.subtotal();
            totals.amount_due += line.total();
            totals.total_quantity = totals
                .total_quantity
                .checked_add(line.quantity)
                .ok_or_else(|| {
                    ValidationError::new(vec![ValidationIssue::at_line(
                        InvoiceField::LineItemQuantity,
                        ValidationKind::Overflow,
                        idx,
                    )])
                })?;
        }
        Ok(totals)
    }

    pub fn subtotal_without_tax(&self) -> f64 {
        self.subtotal_without_tax
    }

    pub fn amount_due(&self) -> f64 {
        self.amount_due
    }

    pub fn tax_amount(&self) -> f64 {
        self.amount_due - self.subtotal_without_tax
    }

    pub fn total_quantity(&self) -> i64 {
        self.total_quantity
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }
}

/// Two fraction digits, no grouping.
pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}

/// `"{currency} {amount}"` with two fraction digits and spaces between
/// thousands groups.
///
/// # Examples
/// ```rust
/// use sealbill_core::invoice::format_currency;
///
/// assert_eq!(format_currency(1234567.891, "EUR"), "EUR 1 234 567.89");
/// assert_eq!(format_currency(-50.0, "USD"), "USD -50.00");
/// ```
pub fn format_currency(amount: f64, currency: &str) -> String {
    let fixed = format_amount(amount);
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    format!("{currency} {sign}{grouped}.{frac_part}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_line_sequence_yields_zero_totals() {
        let totals = InvoiceTotals::from_lines(&[]).expect("empty is valid");
        assert_eq!(totals.subtotal_without_tax(), 0.0);
        assert_eq!(totals.amount_due(), 0.0);
        assert_eq!(totals.total_quantity(), 0);
        assert_eq!(totals.line_count(), 0);
    }

    #[test]
    fn negative_numbers_are_reported_per_line() {
        let lines = vec![
            LineItem::new("ok", 1, 10.0, 0.1),
            LineItem::new("bad qty", -3, 10.0, 0.1),
            LineItem::new("bad price", 1, -0.01, 0.1),
        ];
        let err = InvoiceTotals::from_lines(&lines).expect_err("negative values");
        assert_eq!(
            err.issues,
            vec![
                ValidationIssue::at_line(
                    InvoiceField::LineItemQuantity,
                    ValidationKind::Negative,
                    1
                ),
                ValidationIssue::at_line(
                    InvoiceField::LineItemUnitPrice,
                    ValidationKind::Negative,
                    2
                ),
            ]
        );
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        let lines = vec![LineItem::new("nan", 1, f64::NAN, f64::INFINITY)];
        let err = InvoiceTotals::from_lines(&lines).expect_err("non-finite");
        assert!(err.has_issue(InvoiceField::LineItemUnitPrice, ValidationKind::NotFinite));
        assert!(err.has_issue(InvoiceField::LineItemTaxRate, ValidationKind::NotFinite));
    }

    #[test]
    fn quantity_sum_overflow_is_reported() {
        let lines = vec![
            LineItem::new("a", i64::MAX, 0.0, 0.0),
            LineItem::new("b", 1, 0.0, 0.0),
        ];
        let err = InvoiceTotals::from_lines(&lines).expect_err("overflow");
        assert_eq!(
            err.issues,
            vec![ValidationIssue::at_line(
                InvoiceField::LineItemQuantity,
                ValidationKind::Overflow,
                1
            )]
        );

        let at_limit = vec![
            LineItem::new("a", i64::MAX - 1, 0.0, 0.0),
            LineItem::new("b", 1, 0.0, 0.0),
        ];
        let totals = InvoiceTotals::from_lines(&at_limit).expect("fits exactly");
        assert_eq!(totals.total_quantity(), i64::MAX);
    }

    #[test]
    fn totals_do_not_round_per_line() {
        let lines = vec![LineItem::new("a", 1, 0.333, 0.0); 3];
        let totals = InvoiceTotals::from_lines(&lines).expect("valid");
        assert!((totals.subtotal_without_tax() - 0.999).abs() < 1e-12);
        // per-line rounding would have produced 0.99
        assert_eq!(format_amount(totals.subtotal_without_tax()), "1.00");
    }

    #[test]
    fn currency_format_groups_thousands() {
        assert_eq!(format_currency(0.0, "EUR"), "EUR 0.00");
        assert_eq!(format_currency(999.999, "EUR"), "EUR 1 000.00");
        assert_eq!(format_currency(123456.5, "GBP"), "GBP 123 456.50");
    }

    #[test]
    fn payment_status_wire_form() {
        let unpaid: PaymentStatus = serde_json::from_str("false").expect("unpaid");
        assert_eq!(unpaid, PaymentStatus::Unpaid);
        let paid: PaymentStatus = serde_json::from_str("\"Cash\"").expect("paid");
        assert_eq!(paid, PaymentStatus::Paid(PaymentMethod::Cash));
        assert!(serde_json::from_str::<PaymentStatus>("true").is_err());
        assert!(serde_json::from_str::<PaymentStatus>("\"\"").is_err());
    }

    #[test]
    fn address_locality_includes_state() {
        let address = Address::new("1 Main St", "Springfield", Some("IL".into()), "62701");
        assert_eq!(address.locality_line(), "62701 Springfield IL");
    }
}
