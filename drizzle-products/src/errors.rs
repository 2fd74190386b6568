//! Error type for pixel mapping and product assembly.
//!
//! | Variant | Cause | Recoverable? |
//! |---------|-------|--------------|
//! | [`ProductExists`](ProductError::ProductExists) | target present and overwrite disabled | Yes, re-run with overwrite or remove the file |
//! | [`MissingField`](ProductError::MissingField) | a chip lacks a field the active mode needs | No, caller contract violation |
//! | [`Wcs`](ProductError::Wcs) | transform failure from the WCS model | No |
//! | [`Fits`](ProductError::Fits) / [`Io`](ProductError::Io) | reading templates or writing products | Depends on the cause |
//! | [`ShapeMismatch`](ProductError::ShapeMismatch) | array shape differs from the resolved output shape | No |
//!
//! Nothing in this crate retries. A failure after a prior product was deleted
//! leaves that product missing; re-running with overwrite enabled recovers.

use std::path::PathBuf;

use drizzle_fits::FitsError;
use drizzle_wcs::WcsError;
use thiserror::Error;

pub type ProductResult<T> = Result<T, ProductError>;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Output product {} already exists and overwrite is disabled", path.display())]
    ProductExists { path: PathBuf },

    #[error("Chip {chip} is missing required field '{field}'")]
    MissingField { chip: usize, field: &'static str },

    #[error("{array} array has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        array: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("No chips supplied to the output assembler")]
    NoChips,

    #[error("Invalid weight scale '{0}': expected 'exptime', 'expsq' or a number")]
    InvalidWeightScale(String),

    #[error("Invalid output specification '{0}'")]
    InvalidOutputSpec(String),

    #[error("WCS error: {0}")]
    Wcs(#[from] WcsError),

    #[error("FITS error: {0}")]
    Fits(#[from] FitsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProductError {
    pub fn product_exists(path: impl Into<PathBuf>) -> Self {
        Self::ProductExists { path: path.into() }
    }

    pub fn missing_field(chip: usize, field: &'static str) -> Self {
        Self::MissingField { chip, field }
    }

    pub fn shape_mismatch(array: &'static str, expected: &[usize], actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            array,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_exists_message() {
        let err = ProductError::product_exists("out_drz.fits");
        assert!(err.to_string().contains("out_drz.fits"));
    }

    #[test]
    fn test_missing_field_message() {
        let err = ProductError::missing_field(1, "blot_image");
        let msg = err.to_string();
        assert!(msg.contains("Chip 1"));
        assert!(msg.contains("blot_image"));
    }

    #[test]
    fn test_wcs_error_propagates_unchanged() {
        let err: ProductError = WcsError::missing_extent("no NAXIS").into();
        match err {
            ProductError::Wcs(WcsError::MissingExtent { message }) => assert_eq!(message, "no NAXIS"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
