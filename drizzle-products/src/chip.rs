//! Per-chip configuration records.
//!
//! A [`ChipRecord`] describes one detector/exposure contributing to a
//! product: its input name, exposure window, the output paths for every
//! operating mode and the drizzle parameters used to combine it. The shared
//! parameter set ([`SharedParams`]) is folded into every record when the
//! assembler is constructed.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::{ProductError, ProductResult};

/// Output grid size in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageShape {
    pub width: usize,
    pub height: usize,
}

impl ImageShape {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Array shape in row-major order, `[height, width]`.
    pub fn dims(&self) -> [usize; 2] {
        [self.height, self.width]
    }
}

/// How the per-chip weighting factor is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum WeightScale {
    /// Weight by the exposure time.
    #[default]
    Exptime,
    /// Weight by the square of the exposure time.
    ExpSquared,
    Literal(f64),
}

impl WeightScale {
    pub fn resolve(&self, exptime: f64) -> f64 {
        match self {
            WeightScale::Exptime => exptime,
            WeightScale::ExpSquared => exptime * exptime,
            WeightScale::Literal(value) => *value,
        }
    }
}

impl FromStr for WeightScale {
    type Err = ProductError;

    fn from_str(s: &str) -> ProductResult<Self> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "exptime" => Ok(WeightScale::Exptime),
            "expsq" => Ok(WeightScale::ExpSquared),
            _ => trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(WeightScale::Literal)
                .ok_or_else(|| ProductError::InvalidWeightScale(s.to_string())),
        }
    }
}

impl TryFrom<String> for WeightScale {
    type Error = ProductError;

    fn try_from(value: String) -> ProductResult<Self> {
        value.parse()
    }
}

impl From<WeightScale> for String {
    fn from(scale: WeightScale) -> Self {
        scale.to_string()
    }
}

impl fmt::Display for WeightScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightScale::Exptime => write!(f, "exptime"),
            WeightScale::ExpSquared => write!(f, "expsq"),
            WeightScale::Literal(value) => write!(f, "{}", value),
        }
    }
}

/// Drizzle parameters recorded per chip.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct DrizzleParams {
    pub kernel: String,
    pub pixfrac: f64,
    pub wt_scl: WeightScale,
    pub fillval: Option<f64>,
    pub wcs_key: String,
    /// Output pixel scale in arcsec.
    pub scale: f64,
    /// Default distortion-table pixel scale in arcsec.
    pub idcscale: f64,
    pub driz_version: String,
}

impl Default for DrizzleParams {
    fn default() -> Self {
        Self {
            kernel: "square".to_string(),
            pixfrac: 1.0,
            wt_scl: WeightScale::Exptime,
            fillval: None,
            wcs_key: String::new(),
            scale: 0.0,
            idcscale: 0.0,
            driz_version: String::new(),
        }
    }
}

/// Parameters shared by every chip. Each `Some` overrides the chip's value.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SharedParams {
    pub kernel: Option<String>,
    pub pixfrac: Option<f64>,
    pub wt_scl: Option<WeightScale>,
    pub fillval: Option<f64>,
    pub wcs_key: Option<String>,
    pub scale: Option<f64>,
    pub idcscale: Option<f64>,
    pub driz_version: Option<String>,
}

impl SharedParams {
    pub fn apply_to(&self, params: &mut DrizzleParams) {
        if let Some(kernel) = &self.kernel {
            params.kernel = kernel.clone();
        }
        if let Some(pixfrac) = self.pixfrac {
            params.pixfrac = pixfrac;
        }
        if let Some(wt_scl) = self.wt_scl {
            params.wt_scl = wt_scl;
        }
        if let Some(fillval) = self.fillval {
            params.fillval = Some(fillval);
        }
        if let Some(wcs_key) = &self.wcs_key {
            params.wcs_key = wcs_key.clone();
        }
        if let Some(scale) = self.scale {
            params.scale = scale;
        }
        if let Some(idcscale) = self.idcscale {
            params.idcscale = idcscale;
        }
        if let Some(version) = &self.driz_version {
            params.driz_version = version.clone();
        }
    }
}

/// One detector/exposure unit contributing to a product.
///
/// Output paths are optional because each operating mode reads a different
/// subset; the assembler fails with [`ProductError::MissingField`] when the
/// active mode needs one that is absent.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ChipRecord {
    /// Input data name, e.g. `j8c0d1011_flt.fits[sci,1]`.
    pub data: String,
    pub exptime: f64,
    pub expstart: f64,
    pub expend: f64,
    pub output_shape: ImageShape,
    pub blot_shape: Option<ImageShape>,

    pub out_final: Option<PathBuf>,
    pub out_sci: Option<PathBuf>,
    pub out_weight: Option<PathBuf>,
    pub out_context: Option<PathBuf>,
    pub out_single: Option<PathBuf>,
    pub out_single_weight: Option<PathBuf>,
    pub out_single_context: Option<PathBuf>,
    pub blot_image: Option<PathBuf>,

    pub single_driz_mask: Option<String>,
    pub final_mask: Option<String>,
    /// Number of images combined into the product, when known.
    pub combine_count: usize,
    pub drizzle: DrizzleParams,
}

impl ChipRecord {
    pub fn new(data: impl Into<String>, exptime: f64, output_shape: ImageShape) -> Self {
        Self {
            data: data.into(),
            exptime,
            output_shape,
            ..Self::default()
        }
    }

    pub fn with_exposure_window(mut self, expstart: f64, expend: f64) -> Self {
        self.expstart = expstart;
        self.expend = expend;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_scale_parse() {
        assert_eq!("exptime".parse::<WeightScale>().unwrap(), WeightScale::Exptime);
        assert_eq!("EXPSQ".parse::<WeightScale>().unwrap(), WeightScale::ExpSquared);
        assert_eq!("0.5".parse::<WeightScale>().unwrap(), WeightScale::Literal(0.5));
        assert!(matches!(
            "bogus".parse::<WeightScale>(),
            Err(ProductError::InvalidWeightScale(_))
        ));
    }

    #[test]
    fn test_weight_scale_resolve() {
        assert_eq!(WeightScale::Exptime.resolve(150.0), 150.0);
        assert_eq!(WeightScale::ExpSquared.resolve(150.0), 22500.0);
        assert_eq!(WeightScale::Literal(0.5).resolve(150.0), 0.5);
    }

    #[test]
    fn test_weight_scale_display_round_trips() {
        for scale in [
            WeightScale::Exptime,
            WeightScale::ExpSquared,
            WeightScale::Literal(2.5),
        ] {
            assert_eq!(scale.to_string().parse::<WeightScale>().unwrap(), scale);
        }
    }

    #[test]
    fn test_shared_params_override() {
        let mut params = DrizzleParams::default();
        let shared = SharedParams {
            kernel: Some("turbo".to_string()),
            fillval: Some(0.0),
            ..SharedParams::default()
        };
        shared.apply_to(&mut params);
        assert_eq!(params.kernel, "turbo");
        assert_eq!(params.fillval, Some(0.0));
        assert_eq!(params.pixfrac, 1.0);
    }

    #[test]
    fn test_chip_record_new() {
        let chip = ChipRecord::new("a_flt.fits[sci,1]", 100.0, ImageShape::new(20, 10))
            .with_exposure_window(0.0, 100.0);
        assert_eq!(chip.output_shape.dims(), [10, 20]);
        assert_eq!(chip.expend, 100.0);
        assert!(chip.out_final.is_none());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_chip_record_from_json() {
        let json = r#"{
            "data": "a_flt.fits[sci,1]",
            "exptime": 150.0,
            "output_shape": {"width": 4, "height": 3},
            "out_final": "final_drz.fits",
            "drizzle": {"wt_scl": "expsq", "kernel": "gaussian"}
        }"#;
        let chip: ChipRecord = serde_json::from_str(json).unwrap();
        assert_eq!(chip.drizzle.wt_scl, WeightScale::ExpSquared);
        assert_eq!(chip.drizzle.pixfrac, 1.0);
        assert_eq!(chip.out_final, Some(PathBuf::from("final_drz.fits")));
    }
}
