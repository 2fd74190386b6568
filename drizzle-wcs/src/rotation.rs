use crate::coordinate::{CelestialCoord, NativeCoord};

/// Rotation between native spherical and celestial coordinates for a
/// projection whose fiducial point lies at the native pole.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalRotation {
    alpha_p: f64,
    delta_p: f64,
    phi_p: f64,
}

impl SphericalRotation {
    /// `crval` in degrees, `lonpole` in degrees.
    pub fn new(crval: [f64; 2], lonpole: f64) -> Self {
        Self {
            alpha_p: crval[0].to_radians(),
            delta_p: crval[1].to_radians(),
            phi_p: lonpole.to_radians(),
        }
    }

    pub fn native_to_celestial(&self, native: NativeCoord) -> CelestialCoord {
        let (sin_theta, cos_theta) = libm::sincos(native.theta());
        let (sin_dp, cos_dp) = libm::sincos(self.delta_p);
        let dphi = native.phi() - self.phi_p;
        let (sin_dphi, cos_dphi) = libm::sincos(dphi);

        let x = sin_theta * cos_dp - cos_theta * sin_dp * cos_dphi;
        let y = -cos_theta * sin_dphi;
        let alpha = self.alpha_p + libm::atan2(y, x);

        let z = sin_theta * sin_dp + cos_theta * cos_dp * cos_dphi;
        let delta = latitude(x, y, z);

        CelestialCoord::new(normalize_longitude(alpha.to_degrees()), delta.to_degrees())
    }

    pub fn celestial_to_native(&self, celestial: CelestialCoord) -> NativeCoord {
        let (sin_d, cos_d) = libm::sincos(celestial.lat().to_radians());
        let (sin_dp, cos_dp) = libm::sincos(self.delta_p);
        let dalpha = celestial.lon().to_radians() - self.alpha_p;
        let (sin_da, cos_da) = libm::sincos(dalpha);

        let x = sin_d * cos_dp - cos_d * sin_dp * cos_da;
        let y = -cos_d * sin_da;
        let phi = self.phi_p + libm::atan2(y, x);

        let z = sin_d * sin_dp + cos_d * cos_dp * cos_da;
        NativeCoord::new(phi, latitude(x, y, z))
    }
}

/// Latitude from the rotated unit vector. `hypot(x, y)` is the cosine of the
/// latitude, so this stays accurate next to the poles where `asin(z)` does not.
#[inline]
fn latitude(x: f64, y: f64, z: f64) -> f64 {
    libm::atan2(z, libm::hypot(x, y))
}

/// Wraps a longitude in degrees into `[0, 360)`.
pub fn normalize_longitude(lon: f64) -> f64 {
    let wrapped = lon.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
