//! FITS support for drizzle products: an ordered header model, a
//! multi-extension writer and a sequential reader.

pub mod data;
pub mod error;
pub mod hdu;
pub mod header;
pub mod reader;
pub mod table;
pub mod types;
pub mod wcs;
pub mod writer;

pub const CARD_SIZE: usize = 80;
pub const FITS_BLOCK_SIZE: usize = 2880;

pub use data::{ImageData, ImageValues};
pub use error::{FitsError, Result};
pub use hdu::{Hdu, HduData, HduList};
pub use header::{Header, Keyword, KeywordValue};
pub use reader::{read_hdus, RawHdu};
pub use table::{Column, ColumnData, MetadataTable, METADATA_TABLE_NAME};
pub use types::BitPix;
pub use wcs::{wcs_from_header, wcs_to_keywords, FitsKeywordAdapter};
pub use writer::FitsWriter;
