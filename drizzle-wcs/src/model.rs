use crate::coordinate::{CelestialCoord, PixelCoord};
use crate::error::{WcsError, WcsResult};
use crate::header::KeywordProvider;
use crate::linear::LinearTransform;
use crate::projection::Projection;
use crate::rotation::SphericalRotation;
use crate::sip::SipDistortion;

const SIP_SUFFIX: &str = "-SIP";

/// Pixel grid the solution was derived for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageExtent {
    pub width: usize,
    pub height: usize,
}

impl ImageExtent {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Pixel/sky transform capability consumed by the pixel mapper.
///
/// Pixel coordinates are 1-based; sky coordinates are degrees.
pub trait WcsModel {
    fn extent(&self) -> Option<ImageExtent>;

    /// Full forward transform including distortion.
    fn pixel_to_world(&self, x: f64, y: f64) -> WcsResult<(f64, f64)>;

    /// Full inverse transform including distortion.
    fn world_to_pixel(&self, lon: f64, lat: f64) -> WcsResult<(f64, f64)>;

    /// Inverse transform through the linear solution only.
    fn world_to_pixel_linear(&self, lon: f64, lat: f64) -> WcsResult<(f64, f64)>;

    /// True when `world_to_pixel` carries a distortion correction.
    fn supports_full_inverse_transform(&self) -> bool;

    fn pixels_to_world(&self, pixels: &[(f64, f64)]) -> WcsResult<Vec<(f64, f64)>> {
        pixels
            .iter()
            .map(|&(x, y)| self.pixel_to_world(x, y))
            .collect()
    }

    fn worlds_to_pixels(&self, coords: &[(f64, f64)]) -> WcsResult<Vec<(f64, f64)>> {
        coords
            .iter()
            .map(|&(lon, lat)| self.world_to_pixel(lon, lat))
            .collect()
    }

    fn worlds_to_pixels_linear(&self, coords: &[(f64, f64)]) -> WcsResult<Vec<(f64, f64)>> {
        coords
            .iter()
            .map(|&(lon, lat)| self.world_to_pixel_linear(lon, lat))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct Wcs {
    linear: LinearTransform,
    projection: Projection,
    rotation: SphericalRotation,
    crval: [f64; 2],
    lonpole: f64,
    ctype: [String; 2],
    sip: Option<SipDistortion>,
    extent: Option<ImageExtent>,
    name: Option<String>,
}

impl Wcs {
    pub fn pixel_to_celestial(&self, pixel: PixelCoord) -> WcsResult<CelestialCoord> {
        let pixel = match &self.sip {
            Some(sip) => {
                let (x, y) = sip.apply(pixel.x(), pixel.y());
                PixelCoord::new(x, y)
            }
            None => pixel,
        };
        let intermediate = self.linear.pixel_to_intermediate(pixel);
        let native = self.projection.deproject(intermediate)?;
        Ok(self.rotation.native_to_celestial(native))
    }

    pub fn celestial_to_pixel(&self, celestial: CelestialCoord) -> WcsResult<PixelCoord> {
        let pixel = self.celestial_to_pixel_linear(celestial)?;
        match &self.sip {
            Some(sip) => {
                let (x, y) = sip.apply_inverse(pixel.x(), pixel.y())?;
                Ok(PixelCoord::new(x, y))
            }
            None => Ok(pixel),
        }
    }

    pub fn celestial_to_pixel_linear(&self, celestial: CelestialCoord) -> WcsResult<PixelCoord> {
        let native = self.rotation.celestial_to_native(celestial);
        let intermediate = self.projection.project(native)?;
        Ok(self.linear.intermediate_to_pixel(intermediate))
    }

    #[inline]
    pub fn crpix(&self) -> [f64; 2] {
        self.linear.crpix()
    }

    #[inline]
    pub fn crval(&self) -> [f64; 2] {
        self.crval
    }

    #[inline]
    pub fn cd_matrix(&self) -> [[f64; 2]; 2] {
        self.linear.cd_matrix()
    }

    #[inline]
    pub fn projection(&self) -> Projection {
        self.projection
    }

    #[inline]
    pub fn lonpole(&self) -> f64 {
        self.lonpole
    }

    /// CTYPE values without any `-SIP` suffix.
    pub fn ctype(&self) -> [&str; 2] {
        [&self.ctype[0], &self.ctype[1]]
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn sip(&self) -> Option<&SipDistortion> {
        self.sip.as_ref()
    }

    /// ORIENTAT: position angle of the image +y axis in degrees.
    pub fn orientation(&self) -> f64 {
        self.linear.orientation()
    }

    pub fn pixel_scale(&self) -> f64 {
        self.linear.pixel_scale()
    }

    pub fn to_keywords(&self, include_sip: bool) -> Vec<WcsKeyword> {
        let with_sip = include_sip && self.sip.is_some();
        let suffix = if with_sip { SIP_SUFFIX } else { "" };
        let crpix = self.crpix();
        let cd = self.cd_matrix();

        let mut keywords = vec![
            WcsKeyword::string("CTYPE1", format!("{}{}", self.ctype[0], suffix)),
            WcsKeyword::string("CTYPE2", format!("{}{}", self.ctype[1], suffix)),
            WcsKeyword::real("CRPIX1", crpix[0]),
            WcsKeyword::real("CRPIX2", crpix[1]),
            WcsKeyword::real("CRVAL1", self.crval[0]),
            WcsKeyword::real("CRVAL2", self.crval[1]),
            WcsKeyword::real("CD1_1", cd[0][0]),
            WcsKeyword::real("CD1_2", cd[0][1]),
            WcsKeyword::real("CD2_1", cd[1][0]),
            WcsKeyword::real("CD2_2", cd[1][1]),
        ];

        if (self.lonpole - default_lonpole(self.crval[1], self.projection)).abs() > 1e-10 {
            keywords.push(WcsKeyword::real("LONPOLE", self.lonpole));
        }
        if let Some(name) = &self.name {
            keywords.push(WcsKeyword::string("WCSNAME", name.clone()));
        }
        if let (true, Some(sip)) = (with_sip, &self.sip) {
            keywords.extend(sip_keywords(sip));
        }
        keywords
    }
}

impl WcsModel for Wcs {
    fn extent(&self) -> Option<ImageExtent> {
        self.extent
    }

    fn pixel_to_world(&self, x: f64, y: f64) -> WcsResult<(f64, f64)> {
        let sky = self.pixel_to_celestial(PixelCoord::new(x, y))?;
        Ok((sky.lon(), sky.lat()))
    }

    fn world_to_pixel(&self, lon: f64, lat: f64) -> WcsResult<(f64, f64)> {
        let pixel = self.celestial_to_pixel(CelestialCoord::new(lon, lat))?;
        Ok((pixel.x(), pixel.y()))
    }

    fn world_to_pixel_linear(&self, lon: f64, lat: f64) -> WcsResult<(f64, f64)> {
        let pixel = self.celestial_to_pixel_linear(CelestialCoord::new(lon, lat))?;
        Ok((pixel.x(), pixel.y()))
    }

    fn supports_full_inverse_transform(&self) -> bool {
        self.sip.is_some()
    }
}

fn sip_keywords(sip: &SipDistortion) -> Vec<WcsKeyword> {
    let mut keywords = vec![WcsKeyword::integer("A_ORDER", sip.a().order() as i64)];
    keywords.extend(sip.a().terms().map(|((p, q), c)| WcsKeyword::real(format!("A_{}_{}", p, q), c)));
    keywords.push(WcsKeyword::integer("B_ORDER", sip.b().order() as i64));
    keywords.extend(sip.b().terms().map(|((p, q), c)| WcsKeyword::real(format!("B_{}_{}", p, q), c)));

    if let (Some(ap), Some(bp)) = (sip.ap(), sip.bp()) {
        keywords.push(WcsKeyword::integer("AP_ORDER", ap.order() as i64));
        keywords.extend(ap.terms().map(|((p, q), c)| WcsKeyword::real(format!("AP_{}_{}", p, q), c)));
        keywords.push(WcsKeyword::integer("BP_ORDER", bp.order() as i64));
        keywords.extend(bp.terms().map(|((p, q), c)| WcsKeyword::real(format!("BP_{}_{}", p, q), c)));
    }
    keywords
}

fn default_lonpole(crval_lat: f64, projection: Projection) -> f64 {
    if crval_lat >= projection.theta0() {
        0.0
    } else {
        180.0
    }
}

fn format_ctype(prefix: &str, proj_code: &str) -> String {
    let dashes = "-".repeat(5usize.saturating_sub(prefix.len()));
    format!("{}{}{}", prefix, dashes, proj_code)
}

/// Splits a CTYPE value into its base (e.g. `RA---TAN`), projection code
/// and whether it carries the SIP suffix.
fn parse_ctype(key: &str, ctype: &str) -> WcsResult<(String, String, bool)> {
    let trimmed = ctype.trim().to_ascii_uppercase();
    let (base, has_sip) = match trimmed.strip_suffix(SIP_SUFFIX) {
        Some(base) => (base.to_string(), true),
        None => (trimmed, false),
    };

    let code = match base.rfind('-') {
        Some(pos) if pos > 0 && pos + 1 < base.len() => base[pos + 1..].to_string(),
        _ => {
            return Err(WcsError::invalid_keyword(
                key,
                format!("Invalid CTYPE format: '{}'", ctype),
            ))
        }
    };
    Ok((base, code, has_sip))
}

#[derive(Debug, Clone, PartialEq)]
pub enum WcsKeywordValue {
    Real(f64),
    Integer(i64),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WcsKeyword {
    pub name: String,
    pub value: WcsKeywordValue,
}

impl WcsKeyword {
    pub fn real(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value: WcsKeywordValue::Real(value),
        }
    }

    pub fn integer(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value: WcsKeywordValue::Integer(value),
        }
    }

    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: WcsKeywordValue::String(value.into()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WcsBuilder {
    crpix: Option<[f64; 2]>,
    crval: Option<[f64; 2]>,
    cd: Option<[[f64; 2]; 2]>,
    pc_cdelt: Option<([[f64; 2]; 2], [f64; 2])>,
    projection: Option<Projection>,
    ctype: Option<[String; 2]>,
    lonpole: Option<f64>,
    sip: Option<SipDistortion>,
    extent: Option<ImageExtent>,
    name: Option<String>,
}

impl WcsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn crpix(mut self, x: f64, y: f64) -> Self {
        self.crpix = Some([x, y]);
        self
    }

    pub fn crval(mut self, lon: f64, lat: f64) -> Self {
        self.crval = Some([lon, lat]);
        self
    }

    pub fn cd_matrix(mut self, cd: [[f64; 2]; 2]) -> Self {
        self.cd = Some(cd);
        self
    }

    pub fn pc_cdelt(mut self, pc: [[f64; 2]; 2], cdelt: [f64; 2]) -> Self {
        self.pc_cdelt = Some((pc, cdelt));
        self
    }

    pub fn projection(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    /// Axis types without the `-SIP` suffix, e.g. `RA---TAN`.
    pub fn ctype(mut self, ctype1: impl Into<String>, ctype2: impl Into<String>) -> Self {
        self.ctype = Some([ctype1.into(), ctype2.into()]);
        self
    }

    pub fn lonpole(mut self, lonpole: f64) -> Self {
        self.lonpole = Some(lonpole);
        self
    }

    pub fn sip(mut self, sip: SipDistortion) -> Self {
        self.sip = Some(sip);
        self
    }

    pub fn extent(mut self, width: usize, height: usize) -> Self {
        self.extent = Some(ImageExtent::new(width, height));
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn from_header<K: KeywordProvider + ?Sized>(header: &K) -> WcsResult<Self> {
        let (base1, code1, sip1) = parse_ctype("CTYPE1", &header.require_string("CTYPE1")?)?;
        let (base2, code2, _) = parse_ctype("CTYPE2", &header.require_string("CTYPE2")?)?;

        if code1 != code2 {
            return Err(WcsError::invalid_keyword(
                "CTYPE1/CTYPE2",
                format!("Mismatched projection codes: '{}' vs '{}'", code1, code2),
            ));
        }

        let mut builder = Self::new()
            .projection(Projection::from_code(&code1)?)
            .ctype(base1, base2)
            .crpix(header.require_float("CRPIX1")?, header.require_float("CRPIX2")?)
            .crval(header.require_float("CRVAL1")?, header.require_float("CRVAL2")?);

        let cd_keys = ["CD1_1", "CD1_2", "CD2_1", "CD2_2"];
        if cd_keys.iter().any(|k| header.get_float(k).is_some()) {
            let cd = |k: &str| header.get_float(k).unwrap_or(0.0);
            builder = builder.cd_matrix([[cd("CD1_1"), cd("CD1_2")], [cd("CD2_1"), cd("CD2_2")]]);
        } else if let (Some(d1), Some(d2)) = (header.get_float("CDELT1"), header.get_float("CDELT2")) {
            let pc = |k: &str, default: f64| header.get_float(k).unwrap_or(default);
            builder = builder.pc_cdelt(
                [[pc("PC1_1", 1.0), pc("PC1_2", 0.0)], [pc("PC2_1", 0.0), pc("PC2_2", 1.0)]],
                [d1, d2],
            );
        }

        if let Some(lonpole) = header.get_float("LONPOLE") {
            builder = builder.lonpole(lonpole);
        }
        if let Some(name) = header.get_string("WCSNAME") {
            builder = builder.name(name.trim());
        }
        if let (Some(w), Some(h)) = (header.get_int("NAXIS1"), header.get_int("NAXIS2")) {
            if w > 0 && h > 0 {
                builder = builder.extent(w as usize, h as usize);
            }
        }
        if sip1 {
            let crpix = builder.crpix.unwrap_or_default();
            builder = builder.sip(parse_sip(header, crpix)?);
        }

        Ok(builder)
    }

    pub fn build(self) -> WcsResult<Wcs> {
        let crpix = self.crpix.ok_or_else(|| WcsError::missing_keyword("CRPIX"))?;
        let crval = self.crval.ok_or_else(|| WcsError::missing_keyword("CRVAL"))?;

        let linear = match (self.cd, self.pc_cdelt) {
            (Some(cd), _) => LinearTransform::from_cd(crpix, cd)?,
            (None, Some((pc, cdelt))) => LinearTransform::from_pc_cdelt(crpix, pc, cdelt)?,
            (None, None) => {
                return Err(WcsError::missing_keyword(
                    "transformation matrix (CD or PC+CDELT)",
                ))
            }
        };

        let projection = self.projection.unwrap_or(Projection::Tan);
        let ctype = self.ctype.unwrap_or_else(|| {
            [
                format_ctype("RA", projection.code()),
                format_ctype("DEC", projection.code()),
            ]
        });
        let lonpole = self
            .lonpole
            .unwrap_or_else(|| default_lonpole(crval[1], projection));

        Ok(Wcs {
            linear,
            projection,
            rotation: SphericalRotation::new(crval, lonpole),
            crval,
            lonpole,
            ctype,
            sip: self.sip,
            extent: self.extent,
            name: self.name,
        })
    }
}

fn parse_sip<K: KeywordProvider + ?Sized>(header: &K, crpix: [f64; 2]) -> WcsResult<SipDistortion> {
    let a_order = read_order(header, "A_ORDER")?;
    let b_order = read_order(header, "B_ORDER")?;
    let mut sip = SipDistortion::new(crpix, a_order, b_order);

    for_each_term(a_order, |p, q| {
        if let Some(v) = header.get_float(&format!("A_{}_{}", p, q)) {
            sip.set_a(p, q, v);
        }
    });
    for_each_term(b_order, |p, q| {
        if let Some(v) = header.get_float(&format!("B_{}_{}", p, q)) {
            sip.set_b(p, q, v);
        }
    });

    if header.has("AP_ORDER") && header.has("BP_ORDER") {
        let ap_order = read_order(header, "AP_ORDER")?;
        let bp_order = read_order(header, "BP_ORDER")?;
        sip.set_inverse_order(ap_order, bp_order);
        for_each_term(ap_order, |p, q| {
            if let Some(v) = header.get_float(&format!("AP_{}_{}", p, q)) {
                sip.set_ap(p, q, v);
            }
        });
        for_each_term(bp_order, |p, q| {
            if let Some(v) = header.get_float(&format!("BP_{}_{}", p, q)) {
                sip.set_bp(p, q, v);
            }
        });
    }

    Ok(sip)
}

fn read_order<K: KeywordProvider + ?Sized>(header: &K, key: &str) -> WcsResult<u32> {
    let order = header.require_int(key)?;
    u32::try_from(order).map_err(|_| WcsError::invalid_keyword(key, "order must be non-negative"))
}

fn for_each_term(order: u32, mut f: impl FnMut(u32, u32)) {
    for p in 0..=order {
        for q in 0..=(order - p) {
            f(p, q);
        }
    }
}
