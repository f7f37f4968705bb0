use base64ct::{Base64, Encoding};
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};
use std::io::Cursor;
use thiserror::Error;

/// Error correction level used for every verification code.
pub const ERROR_CORRECTION: EcLevel = EcLevel::M;

/// Smallest edge, in pixels, of the rendered PNG.
const MIN_IMAGE_EDGE: u32 = 240;

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("payload of {len} bytes exceeds QR capacity of {capacity} bytes")]
    PayloadTooLarge { len: usize, capacity: usize },
    #[error("QR encoding failed: {0}")]
    Qr(String),
    #[error("QR image encoding failed: {0}")]
    Image(String),
}

/// Byte-mode capacity of a version 40 symbol at `level`.
pub fn capacity(level: EcLevel) -> usize {
    match level {
        EcLevel::L => 2953,
        EcLevel::M => 2331,
        EcLevel::Q => 1663,
        EcLevel::H => 1273,
    }
}

/// Scannable image of a signed token.
///
/// # Examples
/// ```rust
/// use sealbill_core::invoice::VerificationCode;
///
/// let code = VerificationCode::encode("eyJhbGciOiJFUzI1NiJ9.e30.sig")?;
/// assert!(code.png().starts_with(b"\x89PNG"));
/// # Ok::<(), sealbill_core::invoice::EncodingError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCode {
    payload: String,
    modules: usize,
    png: Vec<u8>,
}

impl VerificationCode {
    /// Encode `payload` verbatim as a byte-mode QR symbol and render it to PNG.
    pub fn encode(payload: &str) -> Result<Self, EncodingError> {
        let capacity = capacity(ERROR_CORRECTION);
        if payload.len() > capacity {
            return Err(EncodingError::PayloadTooLarge {
                len: payload.len(),
                capacity,
            });
        }

        let code = QrCode::with_error_correction_level(payload.as_bytes(), ERROR_CORRECTION)
            .map_err(|e| match e {
                qrcode::types::QrError::DataTooLong => EncodingError::PayloadTooLarge {
                    len: payload.len(),
                    capacity,
                },
                other => EncodingError::Qr(other.to_string()),
            })?;

        let image = code
            .render::<Luma<u8>>()
            .quiet_zone(true)
            .min_dimensions(MIN_IMAGE_EDGE, MIN_IMAGE_EDGE)
            .build();

        let mut png = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(image)
            .write_to(&mut png, ImageFormat::Png)
            .map_err(|e| EncodingError::Image(e.to_string()))?;

        tracing::debug!(
            payload_len = payload.len(),
            modules = code.width(),
            "encoded verification code"
        );

        Ok(Self {
            payload: payload.to_string(),
            modules: code.width(),
            png: png.into_inner(),
        })
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Modules per side, excluding the quiet zone.
    pub fn modules(&self) -> usize {
        self.modules
    }

    pub fn png(&self) -> &[u8] {
        &self.png
    }

    pub fn into_png(self) -> Vec<u8> {
        self.png
    }

    /// Standard base64 of the PNG bytes.
    pub fn to_base64(&self) -> String {
        Base64::encode_string(&self.png)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_shrinks_with_stronger_correction() {
        assert!(capacity(EcLevel::L) > capacity(EcLevel::M));
        assert!(capacity(EcLevel::M) > capacity(EcLevel::Q));
        assert!(capacity(EcLevel::Q) > capacity(EcLevel::H));
    }

    #[test]
    fn oversized_payload_is_rejected_before_encoding() {
        let payload = "x".repeat(capacity(ERROR_CORRECTION) + 1);
        match VerificationCode::encode(&payload) {
            Err(EncodingError::PayloadTooLarge { len, capacity: cap }) => {
                assert_eq!(len, payload.len());
                assert_eq!(cap, 2331);
            }
            other => panic!("expected PayloadTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn payload_at_capacity_still_encodes() {
        let payload = "x".repeat(capacity(ERROR_CORRECTION));
        let code = VerificationCode::encode(&payload).expect("fits in version 40");
        assert_eq!(code.modules(), 177);
    }

    #[test]
    fn base64_matches_png_bytes() {
        let code = VerificationCode::encode("INV-1").expect("encode");
        let decoded = Base64::decode_vec(&code.to_base64()).expect("valid base64");
        assert_eq!(decoded, code.png());
        assert_eq!(code.payload(), "INV-1");
    }
}
