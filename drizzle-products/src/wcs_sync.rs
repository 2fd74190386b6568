use drizzle_fits::Header;
use drizzle_wcs::Wcs;

/// Keys removed outright from forward-combined products.
const DISTORTION_KEYS: &[&str] = &["TDDALPHA", "TDDBETA", "D2IMEXT", "D2IMERR", "DGEOEXT", "NPOLEXT"];

/// Key prefixes of per-input distortion terms.
const DISTORTION_PREFIXES: &[&str] = &[
    "D2IMDIS", "CPDIS", "CPERR", "DP1", "DP2", "A_", "B_", "AP_", "BP_", "SCD", "SCTYPE", "SCRVAL",
    "SNAXIS", "SCRPIX",
];

/// Writes the product WCS into `header`.
///
/// Orientation, CD matrix, reference point and solution name always follow
/// `wcs`; projection types are only seeded when missing. Unless
/// `back_projection` is set, per-input distortion keywords are removed as
/// well, since they do not apply to the resampled frame.
pub fn sync_wcs_keywords(wcs: &Wcs, header: &mut Header, back_projection: bool) {
    let cd = wcs.cd_matrix();
    let crval = wcs.crval();
    let crpix = wcs.crpix();

    header.set("ORIENTAT", wcs.orientation());
    header.set("CD1_1", cd[0][0]);
    header.set("CD1_2", cd[0][1]);
    header.set("CD2_1", cd[1][0]);
    header.set("CD2_2", cd[1][1]);
    header.set("CRVAL1", crval[0]);
    header.set("CRVAL2", crval[1]);
    header.set("CRPIX1", crpix[0]);
    header.set("CRPIX2", crpix[1]);
    header.set("WCSNAME", wcs.name().unwrap_or(""));
    header.set("VAFACTOR", 1.0);

    if !header.has("CTYPE1") {
        let [ctype1, ctype2] = wcs.ctype();
        header.set("CTYPE1", ctype1);
        header.set("CTYPE2", ctype2);
    }

    if !back_projection {
        remove_distortion_keywords(header);
    }
}

pub fn remove_distortion_keywords(header: &mut Header) {
    header.retain(|keyword| {
        let name = keyword.name.as_str();
        if keyword.is_commentary() {
            return true;
        }
        let idc = name.starts_with("IDC") && name != "IDCTAB";
        !(idc
            || DISTORTION_KEYS.contains(&name)
            || DISTORTION_PREFIXES.iter().any(|p| name.starts_with(p)))
    });

    for key in ["CTYPE1", "CTYPE2"] {
        let stripped = header
            .get_string(key)
            .and_then(|ctype| ctype.strip_suffix("-SIP"))
            .map(str::to_string);
        if let Some(ctype) = stripped {
            header.set(key, ctype);
        }
    }
}
