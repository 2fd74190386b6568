#![allow(dead_code)]

use std::path::{Path, PathBuf};

use drizzle_fits::{Hdu, HduList, Header, ImageData};
use drizzle_products::{ChipRecord, ImageShape};
use drizzle_wcs::{Wcs, WcsBuilder};

pub const WIDTH: usize = 6;
pub const HEIGHT: usize = 4;
pub const BLOT_WIDTH: usize = 5;
pub const BLOT_HEIGHT: usize = 3;

pub fn product_wcs() -> Wcs {
    WcsBuilder::new()
        .crpix(3.5, 2.5)
        .crval(53.16, -27.78)
        .cd_matrix([[-1.4e-5, 0.0], [0.0, 1.4e-5]])
        .name("DRZWCS")
        .build()
        .unwrap()
}

/// Writes an input exposure with primary, SCI, ERR and DQ HDUs whose
/// headers carry keys the products must not keep.
pub fn write_input(path: &Path, rootname: &str, exptime: f64, expstart: f64) {
    let mut primary = Header::new();
    primary.set("ROOTNAME", rootname);
    primary.set("TELESCOP", "HST");
    primary.set("EXPTIME", exptime);
    primary.set("EXPSTART", expstart);
    primary.set("EXPEND", expstart + exptime);
    primary.set("DRIZCORR", "PERFORM");
    primary.set("DITHCORR", "PERFORM");

    let mut sci = Header::new();
    sci.set("BSCALE", 1.0);
    sci.set("BZERO", 0.0);
    sci.set("MDRIZSKY", 21.5);
    sci.set("OBJECT", "HUDF");
    sci.set("CCDCHIP", 1);
    sci.set("BUNIT", "COUNTS");
    sci.set("CTYPE1", "RA---TAN-SIP");
    sci.set("CTYPE2", "DEC--TAN-SIP");
    sci.set("CRPIX1", 2048.0);
    sci.set("CRPIX2", 1024.0);
    sci.set("CRVAL1", 53.1);
    sci.set("CRVAL2", -27.7);
    sci.set("CD1_1", -1.4e-5);
    sci.set("CD1_2", 0.0);
    sci.set("CD2_1", 0.0);
    sci.set("CD2_2", 1.4e-5);
    sci.set("A_ORDER", 2);
    sci.set("A_2_0", 1e-7);
    sci.set("B_ORDER", 2);
    sci.set("IDCSCALE", 0.05);
    sci.set("IDCTAB", "jref$idc.fits");

    let mut err = Header::new();
    err.set("BZERO", 0.0);
    err.set("CCDCHIP", 1);
    let mut dq = Header::new();
    dq.set("BSCALE", 1.0);

    let mut hdus = HduList::new();
    hdus.push(Hdu::header_only(primary));
    for (header, name) in [(sci, "SCI"), (err, "ERR"), (dq, "DQ")] {
        let data = ImageData::from_f32(vec![2, 2], vec![1.0; 4]).unwrap();
        hdus.push(Hdu::named_image(header, data, name, 1));
    }
    hdus.write_to(path).unwrap();
}

pub fn chip(dir: &Path, data: &str, exptime: f64, expstart: f64, expend: f64) -> ChipRecord {
    let mut chip = ChipRecord::new(data, exptime, ImageShape::new(WIDTH, HEIGHT))
        .with_exposure_window(expstart, expend);
    chip.out_final = Some(dir.join("mosaic_drz.fits"));
    chip.out_sci = Some(dir.join("mosaic_drz_sci.fits"));
    chip.out_weight = Some(dir.join("mosaic_drz_wht.fits"));
    chip.out_context = Some(dir.join("mosaic_drz_ctx.fits"));
    chip.out_single = Some(dir.join("a_single_sci.fits"));
    chip.out_single_weight = Some(dir.join("a_single_wht.fits"));
    chip.out_single_context = Some(dir.join("a_single_ctx.fits"));
    chip.blot_image = Some(dir.join("a_sci1_blt.fits"));
    chip.blot_shape = Some(ImageShape::new(BLOT_WIDTH, BLOT_HEIGHT));
    chip.final_mask = Some("a_final_mask.fits".to_string());
    chip.single_driz_mask = Some("a_single_mask.fits".to_string());
    chip
}

pub struct Arrays {
    pub science: ImageData,
    pub weight: ImageData,
    pub context: ImageData,
}

pub fn arrays(width: usize, height: usize) -> Arrays {
    let n = width * height;
    Arrays {
        science: ImageData::from_f32(vec![height, width], (0..n).map(|v| v as f32).collect()).unwrap(),
        weight: ImageData::from_f32(vec![height, width], vec![1.0; n]).unwrap(),
        context: ImageData::from_i32(vec![1, height, width], vec![3; n]).unwrap(),
    }
}

pub fn every_output(dir: &Path) -> Vec<PathBuf> {
    [
        "mosaic_drz.fits",
        "mosaic_drz_sci.fits",
        "mosaic_drz_wht.fits",
        "mosaic_drz_ctx.fits",
        "a_single_sci.fits",
        "a_single_wht.fits",
        "a_single_ctx.fits",
        "a_sci1_blt.fits",
    ]
    .iter()
    .map(|name| dir.join(name))
    .collect()
}
