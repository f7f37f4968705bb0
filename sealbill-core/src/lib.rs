//! Signed, QR-stamped, paginated invoices.
//!
//! Build an invoice with [`invoice::InvoiceBuilder`], sign its claims with
//! [`invoice::sign::InvoiceSigner`], then draw it with [`render::InvoicePdf`].
//!
//! # Examples
//! ```rust
//! use sealbill_core::config::Config;
//!
//! let config = Config::default();
//! assert_eq!(config.locale().as_str(), "en");
//! ```
pub mod config;
pub mod invoice;
pub mod render;

use thiserror::Error;

pub use config::{ConfigError, Locale, LocaleParseError};
pub use invoice::sign::{SigningError, VerificationError};
pub use invoice::{
    EncodingError, InvoiceError, InvoiceField, ValidationError, ValidationIssue, ValidationKind,
};
pub use render::{LayoutOverflow, RenderError};

/// Top-level error wrapper for core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Invoice(#[from] InvoiceError),
    #[error(transparent)]
    Signing(#[from] SigningError),
    #[error(transparent)]
    Verification(#[from] VerificationError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
