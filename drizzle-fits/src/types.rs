#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitPix {
    U8 = 8,
    I16 = 16,
    I32 = 32,
    F32 = -32,
    F64 = -64,
}

impl BitPix {
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            8 => Some(Self::U8),
            16 => Some(Self::I16),
            32 => Some(Self::I32),
            -32 => Some(Self::F32),
            -64 => Some(Self::F64),
            _ => None,
        }
    }

    pub fn value(self) -> i64 {
        self as i64
    }

    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::I16 => 2,
            Self::I32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitpix_valid_values() {
        for (input, expected) in [
            (8, BitPix::U8),
            (16, BitPix::I16),
            (32, BitPix::I32),
            (-32, BitPix::F32),
            (-64, BitPix::F64),
        ] {
            assert_eq!(BitPix::from_value(input), Some(expected));
            assert_eq!(expected.value(), input);
        }
    }

    #[test]
    fn bitpix_invalid_values() {
        for value in [0, 1, -1, 64, -16] {
            assert_eq!(BitPix::from_value(value), None);
        }
    }

    #[test]
    fn bitpix_sizes() {
        assert_eq!(BitPix::U8.bytes_per_pixel(), 1);
        assert_eq!(BitPix::F32.bytes_per_pixel(), 4);
        assert_eq!(BitPix::F64.bytes_per_pixel(), 8);
    }
}
