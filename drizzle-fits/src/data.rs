use crate::types::BitPix;
use crate::{FitsError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum ImageValues {
    F32(Vec<f32>),
    I32(Vec<i32>),
}

impl ImageValues {
    pub fn len(&self) -> usize {
        match self {
            Self::F32(v) => v.len(),
            Self::I32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Image pixels in row-major order.
///
/// `shape` lists the slowest-varying axis first (planes, rows, columns),
/// which is the reverse of the FITS `NAXISn` numbering.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    shape: Vec<usize>,
    values: ImageValues,
}

impl ImageData {
    pub fn new(shape: Vec<usize>, values: ImageValues) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != values.len() {
            return Err(FitsError::DataShape {
                shape,
                expected,
                actual: values.len(),
            });
        }
        Ok(Self { shape, values })
    }

    pub fn from_f32(shape: Vec<usize>, values: Vec<f32>) -> Result<Self> {
        Self::new(shape, ImageValues::F32(values))
    }

    pub fn from_i32(shape: Vec<usize>, values: Vec<i32>) -> Result<Self> {
        Self::new(shape, ImageValues::I32(values))
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Axis lengths in FITS order (`NAXIS1` first).
    pub fn naxes(&self) -> Vec<usize> {
        self.shape.iter().rev().copied().collect()
    }

    pub fn values(&self) -> &ImageValues {
        &self.values
    }

    pub fn bitpix(&self) -> BitPix {
        match self.values {
            ImageValues::F32(_) => BitPix::F32,
            ImageValues::I32(_) => BitPix::I32,
        }
    }

    /// Drops leading unit axes so a single-plane cube becomes 2-D.
    pub fn squeeze(mut self) -> Self {
        while self.shape.len() > 2 && self.shape[0] == 1 {
            self.shape.remove(0);
        }
        self
    }

    pub fn to_be_bytes(&self) -> Vec<u8> {
        match &self.values {
            ImageValues::F32(v) => v.iter().flat_map(|x| x.to_be_bytes()).collect(),
            ImageValues::I32(v) => v.iter().flat_map(|x| x.to_be_bytes()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_validation() {
        assert!(ImageData::from_f32(vec![2, 3], vec![0.0; 6]).is_ok());
        let err = ImageData::from_f32(vec![2, 3], vec![0.0; 5]).unwrap_err();
        assert!(matches!(err, FitsError::DataShape { expected: 6, actual: 5, .. }));
    }

    #[test]
    fn test_naxes_reversed() {
        let data = ImageData::from_i32(vec![4, 5], vec![0; 20]).unwrap();
        assert_eq!(data.naxes(), vec![5, 4]);
        assert_eq!(data.bitpix(), BitPix::I32);
    }

    #[test]
    fn test_squeeze_single_plane() {
        let data = ImageData::from_i32(vec![1, 4, 5], vec![0; 20]).unwrap().squeeze();
        assert_eq!(data.shape(), &[4, 5]);
    }

    #[test]
    fn test_squeeze_keeps_multi_plane() {
        let data = ImageData::from_i32(vec![2, 4, 5], vec![0; 40]).unwrap().squeeze();
        assert_eq!(data.shape(), &[2, 4, 5]);
    }

    #[test]
    fn test_big_endian_bytes() {
        let data = ImageData::from_f32(vec![1, 1], vec![1.0]).unwrap();
        assert_eq!(data.to_be_bytes(), vec![0x3f, 0x80, 0x00, 0x00]);
    }
}
