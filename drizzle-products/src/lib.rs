//! Geometry and assembly layer of a drizzle image-combination pipeline.
//!
//! [`compute_pixel_map`] relates the pixels of one exposure to another
//! exposure's frame through their WCS models. [`OutputProductAssembler`]
//! turns resampled science, weight and context arrays into FITS products
//! with cleaned headers, a synchronized WCS and per-chip provenance.
//!
//! ```no_run
//! use drizzle_products::{
//!     ChipRecord, EmitOptions, FitsTemplateProvider, ImageShape, OutputMode,
//!     OutputProductAssembler, ProductArrays, SharedParams,
//! };
//! use drizzle_fits::ImageData;
//!
//! let mut chip = ChipRecord::new("j8c0d1011_flt.fits[sci,1]", 100.0, ImageShape::new(4, 4));
//! chip.out_final = Some("j8c0d1011_drz.fits".into());
//!
//! let assembler = OutputProductAssembler::new(
//!     vec![chip],
//!     &SharedParams::default(),
//!     OutputMode::new(true, false, false),
//!     None,
//! )?;
//! let science = ImageData::from_f32(vec![4, 4], vec![0.0; 16])?;
//! let weight = ImageData::from_f32(vec![4, 4], vec![1.0; 16])?;
//! assembler.emit(
//!     &FitsTemplateProvider::new(),
//!     &["j8c0d1011_flt.fits".to_string()],
//!     ProductArrays { science: &science, weight: &weight, context: None },
//!     &EmitOptions::default(),
//! )?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod chip;
pub mod errors;
pub mod output;
pub mod pixmap;
pub mod provenance;
pub mod single;
pub mod templates;
pub mod wcs_sync;

pub use chip::{ChipRecord, DrizzleParams, ImageShape, SharedParams, WeightScale};
pub use errors::{ProductError, ProductResult};
pub use output::{
    EmitOptions, ExposureWindow, OutputMode, OutputProductAssembler, OutputSpecification,
    ProductArrays,
};
pub use pixmap::{compute_pixel_map, PixelMap};
pub use provenance::{write_provenance, ProvenanceContext, PROVENANCE_SCHEMA};
pub use single::{write_single_image, SingleImageRequest};
pub use templates::{FitsTemplateProvider, HeaderBundle, HeaderTemplateProvider};
pub use wcs_sync::{remove_distortion_keywords, sync_wcs_keywords};
