//! Per-chip drizzle provenance keywords.
//!
//! Each chip contributes one record of `D<nnn><CODE>` keywords, `nnn` being
//! the 1-based chip index. Records are built fresh from [`PROVENANCE_SCHEMA`]
//! for every chip and every call.

use drizzle_fits::{Header, KeywordValue};

use crate::chip::ChipRecord;

/// Sentinel written when no fill value was configured.
pub const UNDEFINED_FILL: &str = "INDEF";

/// One provenance field: short code, default value, card comment and the
/// maximum length of string values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvenanceField {
    pub code: &'static str,
    pub default: &'static str,
    pub comment: &'static str,
    pub max_len: Option<usize>,
}

const fn field(
    code: &'static str,
    default: &'static str,
    comment: &'static str,
    max_len: Option<usize>,
) -> ProvenanceField {
    ProvenanceField {
        code,
        default,
        comment,
        max_len,
    }
}

pub const PROVENANCE_SCHEMA: &[ProvenanceField] = &[
    field("VER", "", "Drizzle, task version", Some(44)),
    field("GEOM", "wcs", "Drizzle, source of geometric information", None),
    field("DATA", "", "Drizzle, input data image", Some(64)),
    field("DEXP", "", "Drizzle, input image exposure time (s)", None),
    field("OUDA", "", "Drizzle, output data image", Some(64)),
    field("OUWE", "", "Drizzle, output weighting image", Some(64)),
    field("OUCO", "", "Drizzle, output context image", Some(64)),
    field("MASK", "", "Drizzle, input weighting image", Some(64)),
    field("WTSC", "", "Drizzle, weighting factor for input image", None),
    field("KERN", "", "Drizzle, form of weight distribution kernel", None),
    field("PIXF", "1.0", "Drizzle, linear size of drop", None),
    field("COEF", "SIP", "Drizzle, source of coefficients", None),
    field("OUUN", "cps", "Drizzle, units of output image - counts or cps", None),
    field("FVAL", UNDEFINED_FILL, "Drizzle, fill value for zero weight output pix", None),
    field("WKEY", "", "Input image WCS Version used", None),
    field("SCAL", "", "Drizzle, pixel size (arcsec) of output image", None),
    field("ISCL", "", "Drizzle, default IDCTAB pixel size(arcsec)", None),
];

/// Product-wide values shared by every chip's record.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvenanceContext {
    /// Selects the single-exposure mask over the final mask.
    pub single: bool,
    pub units: String,
    pub out_data: String,
    pub out_weight: String,
    pub out_context: String,
}

pub fn provenance_key(index: usize, code: &str) -> String {
    format!("D{:03}{}", index, code)
}

/// Writes one provenance record per chip, then the version history.
pub fn write_provenance(
    header: &mut Header,
    chips: &[ChipRecord],
    context: &ProvenanceContext,
    versions: &[(String, String)],
) {
    for (i, chip) in chips.iter().enumerate() {
        for field in PROVENANCE_SCHEMA {
            let value = truncate(field_value(field, chip, context), field.max_len);
            header.set_with_comment(&provenance_key(i + 1, field.code), value, field.comment);
        }
    }

    if !versions.is_empty() {
        header.add_history("Drizzle processing performed using: ");
        for (name, version) in versions {
            header.add_history(format!("    {} Version {}", name, version));
        }
    }
}

fn field_value(field: &ProvenanceField, chip: &ChipRecord, context: &ProvenanceContext) -> KeywordValue {
    let params = &chip.drizzle;
    match field.code {
        "VER" => params.driz_version.as_str().into(),
        "DATA" => chip.data.as_str().into(),
        "DEXP" => chip.exptime.into(),
        "OUDA" => context.out_data.as_str().into(),
        "OUWE" => context.out_weight.as_str().into(),
        "OUCO" => context.out_context.as_str().into(),
        "MASK" => {
            let mask = if context.single {
                &chip.single_driz_mask
            } else {
                &chip.final_mask
            };
            mask.as_deref().unwrap_or("").into()
        }
        "WTSC" => params.wt_scl.resolve(chip.exptime).into(),
        "KERN" => params.kernel.as_str().into(),
        "PIXF" => params.pixfrac.into(),
        "OUUN" => context.units.as_str().into(),
        "FVAL" => match params.fillval {
            Some(fill) => fill.into(),
            None => UNDEFINED_FILL.into(),
        },
        "WKEY" => params.wcs_key.as_str().into(),
        "SCAL" => params.scale.into(),
        "ISCL" => params.idcscale.into(),
        _ => field.default.into(),
    }
}

fn truncate(value: KeywordValue, max_len: Option<usize>) -> KeywordValue {
    match (value, max_len) {
        (KeywordValue::String(s), Some(max)) if s.chars().count() > max => {
            KeywordValue::String(s.chars().take(max).collect())
        }
        (value, _) => value,
    }
}
