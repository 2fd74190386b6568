//! Single-image products: one array plus its WCS in a primary + image
//! extension file.

use std::fs;
use std::path::Path;

use drizzle_fits::{wcs_to_keywords, Hdu, HduList, Header, ImageData};
use drizzle_wcs::{Wcs, WcsModel};
use tracing::{info, warn};

use crate::errors::{ProductError, ProductResult};
use crate::output::assembler::file_name;
use crate::output::headers::{clean_templates, synthesize_science_header};
use crate::templates::HeaderTemplateProvider;

const DEFAULT_EXTNAME: &str = "SCI";

/// Splits `name.fits[ext,ver]` into the file name and the bracketed part.
pub fn parse_filename(spec: &str) -> (&str, Option<&str>) {
    let spec = spec.trim();
    match spec.find('[') {
        Some(open) => {
            let inner = &spec[open + 1..];
            let inner = inner.strip_suffix(']').unwrap_or(inner);
            (&spec[..open], Some(inner.trim()))
        }
        None => (spec, None),
    }
}

/// Parses an extension spec such as `sci,2`, `sci` or `2` into an upper-case
/// name and a version, defaulting to `SCI` and 1.
pub fn parse_extension(extension: Option<&str>) -> ProductResult<(String, i64)> {
    let Some(extension) = extension.filter(|e| !e.is_empty()) else {
        return Ok((DEFAULT_EXTNAME.to_string(), 1));
    };

    let (name, version) = match extension.split_once(',') {
        Some((name, version)) => (name.trim(), Some(version.trim())),
        None => match extension.trim().parse::<i64>() {
            Ok(_) => ("", Some(extension.trim())),
            Err(_) => (extension.trim(), None),
        },
    };

    let version = match version {
        Some(v) => v
            .parse::<i64>()
            .map_err(|_| ProductError::InvalidOutputSpec(extension.to_string()))?,
        None => 1,
    };
    let name = if name.is_empty() {
        DEFAULT_EXTNAME.to_string()
    } else {
        name.to_ascii_uppercase()
    };
    Ok((name, if version == 0 { 1 } else { version }))
}

/// Everything needed to write one single-image product.
pub struct SingleImageRequest<'a> {
    pub data: &'a ImageData,
    pub wcs: &'a Wcs,
    /// Output file, optionally with an `[ext,ver]` suffix.
    pub output: &'a str,
    pub provider: Option<&'a dyn HeaderTemplateProvider>,
    pub sources: &'a [String],
    pub overwrite: bool,
}

pub fn write_single_image(request: &SingleImageRequest<'_>) -> ProductResult<()> {
    let (output, extension) = parse_filename(request.output);
    let (extname, extver) = parse_extension(extension)?;
    let path = Path::new(output);

    if path.exists() {
        if !request.overwrite {
            warn!(
                path = %path.display(),
                "output product already exists and overwrite is disabled"
            );
            return Err(ProductError::product_exists(path));
        }
        info!(path = %path.display(), "deleting previous output product");
        fs::remove_file(path)?;
    }

    let (primary, mut science) = match request.provider {
        Some(provider) if !request.sources.is_empty() => {
            let bundle = provider.get_templates(request.sources, false)?;
            let mut primary = bundle.primary;
            let mut science = match bundle.science {
                Some(header) => header,
                None => synthesize_science_header(&mut primary),
            };
            let mut error = bundle.error.unwrap_or_default();
            let mut dq = bundle.dq.unwrap_or_default();
            clean_templates(&mut science, &mut error, &mut dq);
            (primary, science)
        }
        _ => {
            let mut primary = Header::new();
            primary.set("EXTEND", true);
            primary.set("FILENAME", file_name(path).as_str());
            (primary, Header::new())
        }
    };

    let include_sip = request.wcs.supports_full_inverse_transform();
    for keyword in wcs_to_keywords(request.wcs, include_sip) {
        science.add_keyword(keyword);
    }

    let mut hdus = HduList::new();
    hdus.push(Hdu::header_only(primary));
    hdus.push(Hdu::named_image(science, request.data.clone(), &extname, extver));
    hdus.write_to(path)?;
    info!(path = %path.display(), "created output image");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::HeaderBundle;
    use drizzle_fits::read_hdus;
    use drizzle_wcs::{SipDistortion, WcsBuilder};
    use tempfile::TempDir;

    fn sip_wcs() -> Wcs {
        let mut sip = SipDistortion::new([2.0, 2.0], 2, 2);
        sip.set_a(2, 0, 1e-5);
        WcsBuilder::new()
            .crpix(2.0, 2.0)
            .crval(150.0, 2.0)
            .cd_matrix([[-1e-5, 0.0], [0.0, 1e-5]])
            .sip(sip)
            .build()
            .unwrap()
    }

    #[test]
    fn test_parse_filename() {
        assert_eq!(parse_filename("out.fits[sci,2]"), ("out.fits", Some("sci,2")));
        assert_eq!(parse_filename("out.fits"), ("out.fits", None));
        assert_eq!(parse_filename("a_flt.fits[ SCI ]"), ("a_flt.fits", Some("SCI")));
    }

    #[test]
    fn test_parse_extension() {
        assert_eq!(parse_extension(None).unwrap(), ("SCI".to_string(), 1));
        assert_eq!(parse_extension(Some("wht,3")).unwrap(), ("WHT".to_string(), 3));
        assert_eq!(parse_extension(Some("ctx")).unwrap(), ("CTX".to_string(), 1));
        assert_eq!(parse_extension(Some("2")).unwrap(), ("SCI".to_string(), 2));
        assert_eq!(parse_extension(Some("sci,0")).unwrap(), ("SCI".to_string(), 1));
        assert!(parse_extension(Some("sci,x")).is_err());
    }

    #[test]
    fn test_write_without_templates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blot.fits");
        let data = ImageData::from_f32(vec![3, 3], vec![0.5; 9]).unwrap();
        let wcs = sip_wcs();
        let output = format!("{}[blt,2]", path.display());
        let request = SingleImageRequest {
            data: &data,
            wcs: &wcs,
            output: &output,
            provider: None,
            sources: &[],
            overwrite: false,
        };
        write_single_image(&request).unwrap();

        let hdus = read_hdus(&path).unwrap();
        assert_eq!(hdus.len(), 2);
        assert_eq!(hdus[0].header.get_logical("EXTEND"), Some(true));
        assert_eq!(hdus[0].header.get_string("FILENAME"), Some("blot.fits"));
        assert_eq!(hdus[1].extname(), Some("BLT"));
        assert_eq!(hdus[1].extver(), Some(2));
        assert_eq!(hdus[1].header.get_string("CTYPE1"), Some("RA---TAN-SIP"));
        assert_eq!(hdus[1].header.get_integer("A_ORDER"), Some(2));

        assert!(matches!(
            write_single_image(&request),
            Err(ProductError::ProductExists { .. })
        ));
        let overwrite = SingleImageRequest {
            overwrite: true,
            ..request
        };
        write_single_image(&overwrite).unwrap();
    }

    struct ScaledTemplates;

    impl HeaderTemplateProvider for ScaledTemplates {
        fn get_templates(&self, _sources: &[String], _blend: bool) -> ProductResult<HeaderBundle> {
            let mut primary = Header::new();
            primary.set("TELESCOP", "HST");
            let mut science = Header::new();
            science.set("BSCALE", 2.0);
            science.set("BZERO", 32768.0);
            science.set("PHOTFLAM", 1.5e-19);
            Ok(HeaderBundle {
                primary,
                science: Some(science),
                ..HeaderBundle::default()
            })
        }
    }

    #[test]
    fn test_template_scaling_is_dropped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.fits");
        let data = ImageData::from_f32(vec![2, 2], vec![1.25; 4]).unwrap();
        let wcs = sip_wcs();
        let output = path.display().to_string();
        let sources = ["a_flt.fits".to_string()];
        let provider: &dyn HeaderTemplateProvider = &ScaledTemplates;
        let request = SingleImageRequest {
            data: &data,
            wcs: &wcs,
            output: &output,
            provider: Some(provider),
            sources: &sources,
            overwrite: false,
        };
        write_single_image(&request).unwrap();

        let hdus = read_hdus(&path).unwrap();
        assert_eq!(hdus[0].header.get_string("TELESCOP"), Some("HST"));
        let science = &hdus[1].header;
        assert!(!science.has("BSCALE"));
        assert!(!science.has("BZERO"));
        assert_eq!(science.get_real("PHOTFLAM"), Some(1.5e-19));
        assert_eq!(hdus[1].data_as_f32().unwrap(), vec![1.25; 4]);
    }
}
