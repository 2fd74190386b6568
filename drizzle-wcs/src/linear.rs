use crate::coordinate::{IntermediateCoord, PixelCoord};
use crate::error::{WcsError, WcsResult};

const DETERMINANT_THRESHOLD: f64 = 1e-20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTransform {
    crpix: [f64; 2],
    cd: [[f64; 2]; 2],
    cd_inverse: [[f64; 2]; 2],
    determinant: f64,
}

impl LinearTransform {
    pub fn from_cd(crpix: [f64; 2], cd: [[f64; 2]; 2]) -> WcsResult<Self> {
        let determinant = cd[0][0] * cd[1][1] - cd[0][1] * cd[1][0];
        if determinant.abs() < DETERMINANT_THRESHOLD {
            return Err(WcsError::non_invertible_matrix(determinant));
        }
        let cd_inverse = compute_inverse(cd, determinant);
        Ok(Self {
            crpix,
            cd,
            cd_inverse,
            determinant,
        })
    }

    pub fn from_pc_cdelt(crpix: [f64; 2], pc: [[f64; 2]; 2], cdelt: [f64; 2]) -> WcsResult<Self> {
        let cd = [
            [cdelt[0] * pc[0][0], cdelt[0] * pc[0][1]],
            [cdelt[1] * pc[1][0], cdelt[1] * pc[1][1]],
        ];
        Self::from_cd(crpix, cd)
    }

    pub fn pixel_to_intermediate(&self, pixel: PixelCoord) -> IntermediateCoord {
        let d0 = pixel.x() - self.crpix[0];
        let d1 = pixel.y() - self.crpix[1];
        let x = self.cd[0][0] * d0 + self.cd[0][1] * d1;
        let y = self.cd[1][0] * d0 + self.cd[1][1] * d1;
        IntermediateCoord::new(x, y)
    }

    pub fn intermediate_to_pixel(&self, inter: IntermediateCoord) -> PixelCoord {
        let x = inter.x_deg();
        let y = inter.y_deg();
        let px = self.cd_inverse[0][0] * x + self.cd_inverse[0][1] * y + self.crpix[0];
        let py = self.cd_inverse[1][0] * x + self.cd_inverse[1][1] * y + self.crpix[1];
        PixelCoord::new(px, py)
    }

    #[inline]
    pub fn crpix(&self) -> [f64; 2] {
        self.crpix
    }

    #[inline]
    pub fn cd_matrix(&self) -> [[f64; 2]; 2] {
        self.cd
    }

    /// Mean pixel scale in degrees per pixel.
    #[inline]
    pub fn pixel_scale(&self) -> f64 {
        libm::sqrt(self.determinant.abs())
    }

    /// Position angle of the image +y axis, degrees east of north.
    #[inline]
    pub fn orientation(&self) -> f64 {
        libm::atan2(self.cd[0][1], self.cd[1][1]).to_degrees()
    }
}

fn compute_inverse(m: [[f64; 2]; 2], det: f64) -> [[f64; 2]; 2] {
    let inv_det = 1.0 / det;
    [
        [m[1][1] * inv_det, -m[0][1] * inv_det],
        [-m[1][0] * inv_det, m[0][0] * inv_det],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const HST_SCALE: f64 = 0.05 / 3600.0;

    #[test]
    fn test_roundtrip_pixel_intermediate_pixel() {
        let transform = LinearTransform::from_cd([512.0, 512.0], [[0.001, 0.0], [0.0, 0.001]]).unwrap();

        let original = PixelCoord::new(256.0, 768.0);
        let recovered = transform.intermediate_to_pixel(transform.pixel_to_intermediate(original));

        assert!((original.x() - recovered.x()).abs() < 1e-9);
        assert!((original.y() - recovered.y()).abs() < 1e-9);
    }

    #[test]
    fn test_known_values() {
        let transform = LinearTransform::from_cd([512.0, 512.0], [[0.001, 0.0], [0.0, 0.001]]).unwrap();
        let inter = transform.pixel_to_intermediate(PixelCoord::new(256.0, 256.0));

        assert_eq!(inter.x_deg(), -0.256);
        assert_eq!(inter.y_deg(), -0.256);
    }

    #[test]
    fn test_pc_cdelt_equivalence() {
        let crpix = [100.0, 100.0];
        let transform_cd =
            LinearTransform::from_cd(crpix, [[0.002, 0.001], [-0.001, 0.002]]).unwrap();
        let transform_pc =
            LinearTransform::from_pc_cdelt(crpix, [[1.0, 0.5], [-0.5, 1.0]], [0.002, 0.002])
                .unwrap();

        assert_eq!(transform_cd.cd_matrix(), transform_pc.cd_matrix());
    }

    #[test]
    fn test_non_invertible_matrix() {
        let result = LinearTransform::from_cd([512.0, 512.0], [[1.0, 2.0], [2.0, 4.0]]);
        match result {
            Err(WcsError::NonInvertibleMatrix { determinant }) => assert_eq!(determinant, 0.0),
            _ => panic!("Expected NonInvertibleMatrix error"),
        }
    }

    #[test]
    fn test_hst_scale_cd_is_invertible() {
        let cd = [[-HST_SCALE, 0.0], [0.0, HST_SCALE]];
        assert!(LinearTransform::from_cd([2048.0, 1024.0], cd).is_ok());
    }

    #[test]
    fn test_orientation_north_up() {
        let cd = [[-HST_SCALE, 0.0], [0.0, HST_SCALE]];
        let transform = LinearTransform::from_cd([1.0, 1.0], cd).unwrap();
        assert!(transform.orientation().abs() < 1e-12);
    }

    #[test]
    fn test_orientation_rotated() {
        let angle = 30.0_f64.to_radians();
        let (s, c) = angle.sin_cos();
        let cd = [[-HST_SCALE * c, HST_SCALE * s], [HST_SCALE * s, HST_SCALE * c]];
        let transform = LinearTransform::from_cd([1.0, 1.0], cd).unwrap();
        assert!((transform.orientation() - 30.0).abs() < 1e-9);
    }
}
