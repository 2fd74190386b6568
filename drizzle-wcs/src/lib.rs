//! World coordinate system models for drizzle geometry.
//!
//! A [`Wcs`] chains an optional SIP distortion, a CD-matrix linear
//! transform, a zenithal projection and a spherical rotation. The
//! [`WcsModel`] trait is the capability the pixel mapper consumes.

pub mod coordinate;
pub mod error;
pub mod header;
pub mod linear;
pub mod model;
pub mod polynomial;
pub mod projection;
pub mod rotation;
pub mod sip;

pub use coordinate::{CelestialCoord, IntermediateCoord, NativeCoord, PixelCoord};
pub use error::{WcsError, WcsResult};
pub use header::{KeywordMap, KeywordProvider};
pub use linear::LinearTransform;
pub use model::{ImageExtent, Wcs, WcsBuilder, WcsKeyword, WcsKeywordValue, WcsModel};
pub use projection::Projection;
pub use rotation::SphericalRotation;
pub use sip::SipDistortion;
