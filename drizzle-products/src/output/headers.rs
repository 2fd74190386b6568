//! Header preparation shared by every product layout.

use drizzle_fits::{Header, Keyword};

use super::spec::ExposureWindow;

/// Positional WCS keywords every data header of a product must agree on.
pub const WCS_KEYWORDS: [&str; 11] = [
    "CD1_1", "CD1_2", "CD2_1", "CD2_2", "CRPIX1", "CRPIX2", "CRVAL1", "CRVAL2", "CTYPE1", "CTYPE2",
    "WCSNAME",
];

/// Keys never copied from a template into a split-file primary header.
pub const RESERVED_KEYS: [&str; 7] = ["NAXIS", "BITPIX", "DATE", "IRAF-TLM", "XTENSION", "EXTNAME", "EXTVER"];

/// Keys that describe an input rather than the product.
const INPUT_ONLY_KEYS: [&str; 2] = ["MDRIZSKY", "OBJECT"];

const SCALING_KEYS: [&str; 2] = ["BSCALE", "BZERO"];

/// Chip identifier written into combined products.
pub const CHIP_SENTINEL: &str = "-999";

/// Product file-name marker cut off to form `ROOTNAME`.
const PRODUCT_SUFFIX: &str = "_drz";

const COUNTS_COMMENT: &str = "counts * gain = electrons";
const UNITS_COMMENT: &str = "Units of science product";

/// Strips data scaling and copies missing WCS keywords from the science
/// header into the error and data-quality headers.
pub fn clean_templates(science: &mut Header, error: &mut Header, dq: &mut Header) {
    for header in [&mut *science, &mut *error, &mut *dq] {
        for key in SCALING_KEYS {
            header.delete_if_present(key);
        }
    }

    for key in WCS_KEYWORDS {
        let Some(keyword) = science.get_keyword(key) else {
            continue;
        };
        for header in [&mut *error, &mut *dq] {
            if !header.has(key) {
                header.add_keyword(keyword.clone());
            }
        }
    }
}

/// Moves the trailing cards of `primary`, starting at the first `INHERIT`
/// or `EXPNAME` card, into a new science header.
pub fn synthesize_science_header(primary: &mut Header) -> Header {
    let start = primary
        .iter()
        .position(|k| k.name == "INHERIT" || k.name == "EXPNAME");
    match start {
        Some(position) => primary.split_off(position),
        None => Header::new(),
    }
}

/// `ROOTNAME` value: the file name up to the product suffix, if present.
pub fn root_name(file_name: &str) -> &str {
    match file_name.find(PRODUCT_SUFFIX) {
        Some(index) => &file_name[..index],
        None => file_name,
    }
}

/// Product-level primary header fields.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryFields<'a> {
    pub extend: bool,
    pub nextend: usize,
    pub file_name: &'a str,
    pub window: Option<ExposureWindow>,
    pub images_combined: usize,
}

pub fn populate_primary(primary: &mut Header, fields: &PrimaryFields<'_>) {
    primary.set("EXTEND", fields.extend);
    primary.set("NEXTEND", fields.nextend);
    primary.set("FILENAME", fields.file_name);
    primary.set("ROOTNAME", root_name(fields.file_name));

    if let Some(window) = fields.window {
        primary.set("EXPTIME", window.texptime);
        primary.set("EXPSTART", window.expstart);
        primary.set("EXPEND", window.expend);
    }

    primary.set("ASN_MTYP", "PROD-DTH");
    for step in ["DRIZCORR", "DITHCORR"] {
        if primary.has(step) {
            primary.set(step, "COMPLETE");
        }
    }
    primary.set_with_comment(
        "NDRIZIM",
        fields.images_combined,
        "Drizzle, No. images drizzled onto output",
    );
}

/// Adjusts an inherited science header to describe the combined product.
pub fn fix_science_header(science: &mut Header, bunit: Option<&str>, images_combined: usize) {
    for key in INPUT_ONLY_KEYS {
        science.delete_if_present(key);
    }
    if science.has("CCDCHIP") {
        science.set("CCDCHIP", CHIP_SENTINEL);
    }
    if science.has("NCOMBINE") || images_combined > 1 {
        science.set("NCOMBINE", images_combined);
    }

    match bunit {
        Some(unit) => {
            let comment = if is_counts(unit) {
                COUNTS_COMMENT
            } else {
                UNITS_COMMENT
            };
            science.set_with_comment("BUNIT", unit, comment);
        }
        None => {
            if science.get_string("BUNIT").is_some_and(is_counts) {
                science.set_comment("BUNIT", COUNTS_COMMENT);
            }
        }
    }
}

pub fn fix_weight_header(weight: &mut Header) {
    weight.set("CCDCHIP", CHIP_SENTINEL);
}

/// Removes keys that must not appear in any product header.
pub fn scrub_product_header(header: &mut Header) {
    for key in SCALING_KEYS.iter().chain(INPUT_ONLY_KEYS.iter()) {
        header.delete_if_present(key);
    }
}

/// Appends template cards absent from `target`, skipping reserved keys and
/// commentary cards.
pub fn inherit_unique(target: &mut Header, template: &Header) {
    let inherited: Vec<Keyword> = template
        .iter()
        .filter(|k| !k.is_commentary())
        .filter(|k| !RESERVED_KEYS.contains(&k.name.as_str()))
        .filter(|k| !target.has(&k.name))
        .cloned()
        .collect();
    for keyword in inherited {
        target.append(keyword);
    }
}

fn is_counts(unit: &str) -> bool {
    unit.trim().to_ascii_lowercase().starts_with("count")
}
