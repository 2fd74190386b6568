//! Zenithal projections between the projection plane and native spherical
//! coordinates.
//!
//! All three supported projections share the polar form
//! `x = R sin(phi)`, `y = -R cos(phi)` and differ only in how the native
//! latitude maps to the radial distance `R`.

use std::f64::consts::FRAC_PI_2;

use crate::coordinate::{IntermediateCoord, NativeCoord};
use crate::error::{WcsError, WcsResult};

const R2D: f64 = 180.0 / std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    Tan,
    Sin,
    Arc,
}

impl Projection {
    pub fn from_code(code: &str) -> WcsResult<Self> {
        match code.to_ascii_uppercase().as_str() {
            "TAN" => Ok(Projection::Tan),
            "SIN" => Ok(Projection::Sin),
            "ARC" => Ok(Projection::Arc),
            other => Err(WcsError::unsupported_projection(other)),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Projection::Tan => "TAN",
            Projection::Sin => "SIN",
            Projection::Arc => "ARC",
        }
    }

    /// Native latitude of the fiducial point, degrees.
    pub fn theta0(&self) -> f64 {
        90.0
    }

    pub fn project(&self, native: NativeCoord) -> WcsResult<IntermediateCoord> {
        let theta = native.theta();
        let r = match self {
            Projection::Tan => {
                let sin_theta = libm::sin(theta);
                if sin_theta <= 0.0 {
                    return Err(WcsError::singularity(
                        "TAN projection undefined at or below native equator",
                    ));
                }
                R2D * libm::cos(theta) / sin_theta
            }
            Projection::Sin => {
                if theta < 0.0 {
                    return Err(WcsError::singularity(
                        "SIN projection undefined on the far hemisphere",
                    ));
                }
                R2D * libm::cos(theta)
            }
            Projection::Arc => R2D * (FRAC_PI_2 - theta),
        };
        Ok(radial_to_intermediate(r, native.phi()))
    }

    pub fn deproject(&self, inter: IntermediateCoord) -> WcsResult<NativeCoord> {
        let (r, phi) = intermediate_to_polar(inter);
        let theta = match self {
            Projection::Tan => libm::atan2(R2D, r),
            Projection::Sin => {
                let w = r / R2D;
                if w > 1.0 + 1e-13 {
                    return Err(WcsError::invalid_parameter(format!(
                        "SIN radius {} exceeds projection boundary",
                        r
                    )));
                }
                libm::acos(w.min(1.0))
            }
            Projection::Arc => FRAC_PI_2 - r / R2D,
        };
        Ok(NativeCoord::new(phi, theta))
    }
}

fn radial_to_intermediate(r: f64, phi: f64) -> IntermediateCoord {
    IntermediateCoord::new(r * libm::sin(phi), -r * libm::cos(phi))
}

fn intermediate_to_polar(inter: IntermediateCoord) -> (f64, f64) {
    let x = inter.x_deg();
    let y = inter.y_deg();
    let r = libm::sqrt(x * x + y * y);
    let phi = if r == 0.0 { 0.0 } else { libm::atan2(x, -y) };
    (r, phi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(Projection::from_code("TAN").unwrap(), Projection::Tan);
        assert_eq!(Projection::from_code("sin").unwrap(), Projection::Sin);
        assert_eq!(Projection::from_code("ARC").unwrap(), Projection::Arc);
        assert!(matches!(
            Projection::from_code("HPX"),
            Err(WcsError::UnsupportedProjection { .. })
        ));
    }

    #[test]
    fn test_pole_maps_to_origin() {
        for proj in [Projection::Tan, Projection::Sin, Projection::Arc] {
            let inter = proj.project(NativeCoord::new(0.0, FRAC_PI_2)).unwrap();
            assert!(inter.x_deg().abs() < 1e-12, "{:?}", proj);
            assert!(inter.y_deg().abs() < 1e-12, "{:?}", proj);
        }
    }

    #[test]
    fn test_roundtrip_near_pole() {
        let native = NativeCoord::new(0.7, 89.5_f64.to_radians());
        for proj in [Projection::Tan, Projection::Sin, Projection::Arc] {
            let inter = proj.project(native).unwrap();
            let back = proj.deproject(inter).unwrap();
            assert!((back.phi() - native.phi()).abs() < 1e-10, "{:?}", proj);
            assert!((back.theta() - native.theta()).abs() < 1e-12, "{:?}", proj);
        }
    }

    #[test]
    fn test_tan_equator_is_singular() {
        let result = Projection::Tan.project(NativeCoord::new(0.0, 0.0));
        assert!(matches!(result, Err(WcsError::Singularity { .. })));
    }

    #[test]
    fn test_sin_outside_boundary() {
        let result = Projection::Sin.deproject(IntermediateCoord::new(100.0, 0.0));
        assert!(result.is_err());
    }

    #[test]
    fn test_arc_radius_is_colatitude() {
        let inter = Projection::Arc
            .project(NativeCoord::new(std::f64::consts::PI, 80.0_f64.to_radians()))
            .unwrap();
        assert!(inter.x_deg().abs() < 1e-9);
        assert!((inter.y_deg() - 10.0).abs() < 1e-9);
    }
}
