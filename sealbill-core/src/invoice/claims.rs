//! Canonical claim set attested by the invoice signature.
use super::{FinalizedInvoice, PaymentStatus};
use serde::{Deserialize, Serialize};

/// Minimal signed summary of an invoice.
///
/// Only these fields are authenticated. Display text, logo, addresses and
/// terms are not part of the claims and must not be treated as verified.
///
/// Claim names on the wire are the compact ones (`amt`, `curr`, `qty`, ...);
/// unknown claims are rejected when decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignedClaims {
    /// `"{seller name} ({seller identifier})"`.
    pub iss: String,
    /// Client display name.
    pub sub: String,
    /// Issue date, whole seconds since the epoch.
    pub iat: i64,
    #[serde(rename = "dueDate")]
    pub due_date: i64,
    /// Tax-inclusive amount due, unrounded.
    #[serde(rename = "amt")]
    pub amount: f64,
    #[serde(rename = "curr")]
    pub currency: String,
    /// Sum of all line quantities.
    #[serde(rename = "qty")]
    pub quantity: i64,
    /// Number of lines.
    #[serde(rename = "line")]
    pub line_count: usize,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(rename = "pay")]
    pub payment_status: PaymentStatus,
}

impl SignedClaims {
    pub fn from_invoice(invoice: &FinalizedInvoice) -> Self {
        let data = invoice.data();
        let totals = invoice.totals();
        Self {
            iss: data.issuer(),
            sub: data.client().name().to_string(),
            iat: data.issue_date().timestamp(),
            due_date: data.due_date().timestamp(),
            amount: totals.amount_due(),
            currency: data.currency().to_string(),
            quantity: totals.total_quantity(),
            line_count: totals.line_count(),
            reference: data.reference().to_string(),
            payment_status: data.payment().clone(),
        }
    }

    /// Name of the first claim that differs from `expected`, if any.
    ///
    /// Amounts are compared with a relative tolerance of 1e-9.
    pub fn first_mismatch(&self, expected: &SignedClaims) -> Option<&'static str> {
        const RELATIVE_TOLERANCE: f64 = 1e-9;
        let amount_scale = self.amount.abs().max(expected.amount.abs()).max(1.0);

        if self.iss != expected.iss {
            Some("iss")
        } else if self.sub != expected.sub {
            Some("sub")
        } else if self.iat != expected.iat {
            Some("iat")
        } else if self.due_date != expected.due_date {
            Some("dueDate")
        } else if (self.amount - expected.amount).abs() > RELATIVE_TOLERANCE * amount_scale {
            Some("amt")
        } else if self.currency != expected.currency {
            Some("curr")
        } else if self.quantity != expected.quantity {
            Some("qty")
        } else if self.line_count != expected.line_count {
            Some("line")
        } else if self.reference != expected.reference {
            Some("ref")
        } else if self.payment_status != expected.payment_status {
            Some("pay")
        } else {
            None
        }
    }
}
