use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::header::{Header, HeaderParser};
use crate::types::BitPix;
use crate::{FitsError, Result, FITS_BLOCK_SIZE};

/// Header plus undecoded big-endian data of one HDU.
#[derive(Debug, Clone)]
pub struct RawHdu {
    pub header: Header,
    pub data: Vec<u8>,
}

impl RawHdu {
    pub fn extname(&self) -> Option<&str> {
        self.header.get_string("EXTNAME")
    }

    pub fn extver(&self) -> Option<i64> {
        self.header.get_integer("EXTVER")
    }

    pub fn is_image(&self) -> bool {
        match self.header.get_string("XTENSION") {
            Some(kind) => kind == "IMAGE",
            None => true,
        }
    }

    /// Axis lengths in FITS order (`NAXIS1` first).
    pub fn naxes(&self) -> Vec<usize> {
        let naxis = self.header.get_integer("NAXIS").unwrap_or(0).max(0);
        (1..=naxis)
            .map(|i| {
                self.header
                    .get_integer(&format!("NAXIS{}", i))
                    .unwrap_or(0)
                    .max(0) as usize
            })
            .collect()
    }

    pub fn data_as_f32(&self) -> Result<Vec<f32>> {
        self.expect_bitpix(BitPix::F32)?;
        Ok(self
            .data
            .chunks_exact(4)
            .map(|b| f32::from_be_bytes([b[0], b[1], b[2], b[3]]))
            .collect())
    }

    pub fn data_as_i32(&self) -> Result<Vec<i32>> {
        self.expect_bitpix(BitPix::I32)?;
        Ok(self
            .data
            .chunks_exact(4)
            .map(|b| i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
            .collect())
    }

    fn expect_bitpix(&self, expected: BitPix) -> Result<()> {
        let value = self
            .header
            .get_integer("BITPIX")
            .ok_or_else(|| FitsError::KeywordNotFound {
                keyword: "BITPIX".to_string(),
            })?;
        match BitPix::from_value(value) {
            Some(bitpix) if bitpix == expected => Ok(()),
            Some(_) => Err(FitsError::InvalidKeywordValue {
                keyword: "BITPIX".to_string(),
                value: value.to_string(),
            }),
            None => Err(FitsError::InvalidBitPix(value)),
        }
    }
}

/// Reads every HDU of a file in order.
pub fn read_hdus<P: AsRef<Path>>(path: P) -> Result<Vec<RawHdu>> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hdus = Vec::new();

    while let Some(header) = HeaderParser::read_header(&mut reader)? {
        let size = data_size(&header)?;
        let mut data = vec![0u8; size];
        reader
            .read_exact(&mut data)
            .map_err(|_| FitsError::UnexpectedEof)?;

        let padding = align_to_block(size) - size;
        if padding > 0 {
            let mut skip = vec![0u8; padding];
            reader
                .read_exact(&mut skip)
                .map_err(|_| FitsError::UnexpectedEof)?;
        }
        hdus.push(RawHdu { header, data });
    }

    if hdus.is_empty() {
        return Err(FitsError::InvalidFormat("file holds no HDU".to_string()));
    }
    Ok(hdus)
}

fn data_size(header: &Header) -> Result<usize> {
    let bitpix = header
        .get_integer("BITPIX")
        .ok_or_else(|| FitsError::KeywordNotFound {
            keyword: "BITPIX".to_string(),
        })?;
    let bitpix = BitPix::from_value(bitpix).ok_or(FitsError::InvalidBitPix(bitpix))?;
    let naxis = header.get_integer("NAXIS").unwrap_or(0);
    if naxis == 0 {
        return Ok(0);
    }

    let mut elements: usize = 1;
    for i in 1..=naxis {
        let n = header.get_integer(&format!("NAXIS{}", i)).unwrap_or(0);
        elements *= usize::try_from(n).map_err(|_| FitsError::InvalidKeywordValue {
            keyword: format!("NAXIS{}", i),
            value: n.to_string(),
        })?;
    }
    let pcount = header.get_integer("PCOUNT").unwrap_or(0).max(0) as usize;
    let gcount = header.get_integer("GCOUNT").unwrap_or(1).max(1) as usize;
    Ok(bitpix.bytes_per_pixel() * gcount * (pcount + elements))
}

fn align_to_block(size: usize) -> usize {
    size.div_ceil(FITS_BLOCK_SIZE) * FITS_BLOCK_SIZE
}
