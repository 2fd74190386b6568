use drizzle_wcs::{KeywordProvider, Wcs, WcsBuilder, WcsKeyword, WcsKeywordValue, WcsResult};

use crate::header::{Header, Keyword, KeywordValue};

/// Exposes a [`Header`] to the WCS builder.
pub struct FitsKeywordAdapter<'a> {
    header: &'a Header,
}

impl<'a> FitsKeywordAdapter<'a> {
    pub fn new(header: &'a Header) -> Self {
        Self { header }
    }
}

impl KeywordProvider for FitsKeywordAdapter<'_> {
    fn get_string(&self, key: &str) -> Option<String> {
        self.header.get_string(key).map(|s| s.to_string())
    }

    fn get_float(&self, key: &str) -> Option<f64> {
        self.header.get_real(key)
    }

    fn get_int(&self, key: &str) -> Option<i64> {
        self.header.get_integer(key)
    }
}

pub fn wcs_from_header(header: &Header) -> WcsResult<Wcs> {
    WcsBuilder::from_header(&FitsKeywordAdapter::new(header))?.build()
}

pub fn wcs_keyword_to_fits(keyword: WcsKeyword) -> Keyword {
    let value = match keyword.value {
        WcsKeywordValue::Real(v) => KeywordValue::Real(v),
        WcsKeywordValue::Integer(v) => KeywordValue::Integer(v),
        WcsKeywordValue::String(s) => KeywordValue::String(s),
    };
    Keyword::new(keyword.name).with_value(value)
}

pub fn wcs_to_keywords(wcs: &Wcs, include_sip: bool) -> Vec<Keyword> {
    wcs.to_keywords(include_sip)
        .into_iter()
        .map(wcs_keyword_to_fits)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use drizzle_wcs::{SipDistortion, WcsModel};

    fn tan_header() -> Header {
        let mut header = Header::new();
        header.set("NAXIS1", 200);
        header.set("NAXIS2", 100);
        header.set("CTYPE1", "RA---TAN");
        header.set("CTYPE2", "DEC--TAN");
        header.set("CRPIX1", 100.5);
        header.set("CRPIX2", 50.5);
        header.set("CRVAL1", 180.0);
        header.set("CRVAL2", 45.0);
        header.set("CD1_1", -1e-5);
        header.set("CD1_2", 0.0);
        header.set("CD2_1", 0.0);
        header.set("CD2_2", 1e-5);
        header
    }

    #[test]
    fn test_wcs_from_header() {
        let wcs = wcs_from_header(&tan_header()).unwrap();
        assert_eq!(wcs.crpix(), [100.5, 50.5]);
        assert_eq!(wcs.crval(), [180.0, 45.0]);
        let extent = wcs.extent().unwrap();
        assert_eq!((extent.width, extent.height), (200, 100));
    }

    #[test]
    fn test_missing_ctype() {
        assert!(wcs_from_header(&Header::new()).is_err());
    }

    #[test]
    fn test_integer_crpix_is_accepted() {
        let mut header = tan_header();
        header.set("CRPIX1", 100);
        let wcs = wcs_from_header(&header).unwrap();
        assert_eq!(wcs.crpix()[0], 100.0);
    }

    #[test]
    fn test_keywords_into_header_and_back() {
        let mut sip = SipDistortion::new([100.5, 50.5], 2, 2);
        sip.set_a(2, 0, 1e-6);
        let wcs = WcsBuilder::new()
            .crpix(100.5, 50.5)
            .crval(180.0, 45.0)
            .cd_matrix([[-1e-5, 0.0], [0.0, 1e-5]])
            .sip(sip)
            .build()
            .unwrap();

        let mut header = Header::new();
        for keyword in wcs_to_keywords(&wcs, true) {
            header.add_keyword(keyword);
        }
        assert_eq!(header.get_string("CTYPE1"), Some("RA---TAN-SIP"));
        assert_eq!(header.get_integer("A_ORDER"), Some(2));

        let rebuilt = wcs_from_header(&header).unwrap();
        assert!(rebuilt.supports_full_inverse_transform());
    }
}
