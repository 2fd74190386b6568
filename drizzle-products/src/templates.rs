//! Header templates for output products.

use drizzle_fits::{read_hdus, ColumnData, Header, MetadataTable, RawHdu, METADATA_TABLE_NAME};
use tracing::debug;

use crate::errors::{ProductError, ProductResult};
use crate::single::parse_filename;

/// Headers an output product starts from.
///
/// `science` is `None` when the sources carry no extension metadata; the
/// assembler then synthesizes one from the primary header. Missing error or
/// data-quality headers are treated as empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderBundle {
    pub primary: Header,
    pub science: Option<Header>,
    pub error: Option<Header>,
    pub dq: Option<Header>,
    pub table: Option<MetadataTable>,
}

/// Source of product header templates, typically backed by a header
/// blending service.
pub trait HeaderTemplateProvider {
    fn get_templates(&self, sources: &[String], blend: bool) -> ProductResult<HeaderBundle>;
}

/// Reads templates directly from the input FITS files.
///
/// Headers come from the first source: its primary HDU and its first
/// `SCI`, `ERR` and `DQ` extensions. With `blend` set and more than one
/// source, a metadata table with one row per source is added.
#[derive(Debug, Clone, Copy, Default)]
pub struct FitsTemplateProvider;

const TABLE_TEXT_COLUMNS: [&str; 2] = ["FILENAME", "ROOTNAME"];
const TABLE_REAL_COLUMNS: [&str; 3] = ["EXPTIME", "EXPSTART", "EXPEND"];

impl FitsTemplateProvider {
    pub fn new() -> Self {
        Self
    }

    fn metadata_table(&self, sources: &[String], first: &Header) -> ProductResult<MetadataTable> {
        let mut primaries = vec![first.clone()];
        for source in &sources[1..] {
            let hdus = read_hdus(parse_filename(source).0)?;
            primaries.extend(hdus.into_iter().next().map(|hdu| hdu.header));
        }

        let mut table = MetadataTable::new(METADATA_TABLE_NAME, primaries.len());
        for name in TABLE_TEXT_COLUMNS {
            let values = primaries
                .iter()
                .zip(sources)
                .map(|(header, source)| match header.get_string(name) {
                    Some(value) => value.to_string(),
                    None if name == "FILENAME" => parse_filename(source).0.to_string(),
                    None => String::new(),
                })
                .collect();
            table.add_column(name, ColumnData::Text(values))?;
        }
        for name in TABLE_REAL_COLUMNS {
            let values = primaries
                .iter()
                .map(|header| header.get_real(name).unwrap_or(f64::NAN))
                .collect();
            table.add_column(name, ColumnData::Real(values))?;
        }
        Ok(table)
    }
}

impl HeaderTemplateProvider for FitsTemplateProvider {
    fn get_templates(&self, sources: &[String], blend: bool) -> ProductResult<HeaderBundle> {
        let first = sources
            .first()
            .ok_or_else(|| ProductError::InvalidOutputSpec("no template sources".to_string()))?;
        let hdus = read_hdus(parse_filename(first).0)?;
        debug!(source = %first, hdus = hdus.len(), blend, "reading header templates");

        let primary = hdus
            .first()
            .map(|hdu| hdu.header.clone())
            .unwrap_or_default();
        let table = if blend && sources.len() > 1 {
            Some(self.metadata_table(sources, &primary)?)
        } else {
            None
        };

        Ok(HeaderBundle {
            science: find_extension(&hdus, "SCI"),
            error: find_extension(&hdus, "ERR"),
            dq: find_extension(&hdus, "DQ"),
            primary,
            table,
        })
    }
}

fn find_extension(hdus: &[RawHdu], extname: &str) -> Option<Header> {
    hdus.iter()
        .skip(1)
        .find(|hdu| {
            hdu.extname()
                .is_some_and(|name| name.trim().eq_ignore_ascii_case(extname))
        })
        .map(|hdu| hdu.header.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use drizzle_fits::{Hdu, HduList, ImageData};
    use std::path::Path;
    use tempfile::TempDir;

    fn write_input(path: &Path, rootname: &str, exptime: f64, with_extensions: bool) {
        let mut primary = Header::new();
        primary.set("ROOTNAME", rootname);
        primary.set("EXPTIME", exptime);
        primary.set("EXPSTART", 1.0);
        primary.set("EXPEND", 1.0 + exptime);

        let mut hdus = HduList::new();
        hdus.push(Hdu::header_only(primary));
        if with_extensions {
            for (name, unit) in [("SCI", "ELECTRONS"), ("ERR", "ELECTRONS"), ("DQ", "UNITLESS")] {
                let mut header = Header::new();
                header.set("BUNIT", unit);
                let data = ImageData::from_f32(vec![2, 2], vec![0.0; 4]).unwrap();
                hdus.push(Hdu::named_image(header, data, name, 1));
            }
        }
        hdus.write_to(path).unwrap();
    }

    #[test]
    fn test_reads_extension_headers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a_flt.fits");
        write_input(&path, "a", 100.0, true);

        let source = format!("{}[sci,1]", path.display());
        let bundle = FitsTemplateProvider::new().get_templates(&[source], true).unwrap();
        assert_eq!(bundle.primary.get_string("ROOTNAME"), Some("a"));
        assert_eq!(bundle.science.unwrap().get_string("EXTNAME"), Some("SCI"));
        assert_eq!(bundle.dq.unwrap().get_string("BUNIT"), Some("UNITLESS"));
        assert!(bundle.error.is_some());
        assert!(bundle.table.is_none());
    }

    #[test]
    fn test_simple_fits_has_no_science_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("simple.fits");
        write_input(&path, "s", 10.0, false);

        let bundle = FitsTemplateProvider::new()
            .get_templates(&[path.display().to_string()], false)
            .unwrap();
        assert!(bundle.science.is_none());
        assert!(bundle.error.is_none());
    }

    #[test]
    fn test_blend_builds_metadata_table() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a_flt.fits");
        let b = dir.path().join("b_flt.fits");
        write_input(&a, "a", 100.0, true);
        write_input(&b, "b", 200.0, true);
        let sources = vec![a.display().to_string(), b.display().to_string()];

        let provider = FitsTemplateProvider::new();
        let table = provider.get_templates(&sources, true).unwrap().table.unwrap();
        assert_eq!(table.name(), METADATA_TABLE_NAME);
        assert_eq!(table.nrows(), 2);
        match &table.column("exptime").unwrap().data {
            ColumnData::Real(values) => assert_eq!(values, &vec![100.0, 200.0]),
            other => panic!("unexpected column {other:?}"),
        }
        match &table.column("ROOTNAME").unwrap().data {
            ColumnData::Text(values) => assert_eq!(values, &vec!["a".to_string(), "b".to_string()]),
            other => panic!("unexpected column {other:?}"),
        }

        assert!(provider.get_templates(&sources, false).unwrap().table.is_none());
    }

    #[test]
    fn test_no_sources() {
        assert!(FitsTemplateProvider::new().get_templates(&[], false).is_err());
    }
}
