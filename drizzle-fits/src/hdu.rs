use std::path::Path;

use crate::data::ImageData;
use crate::header::Header;
use crate::table::MetadataTable;
use crate::writer::FitsWriter;
use crate::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum HduData {
    Empty,
    Image(ImageData),
    Table(MetadataTable),
}

/// One header-data unit ready for writing.
///
/// The header holds only descriptive cards; the writer derives the
/// structural ones from `data`.
#[derive(Debug, Clone, PartialEq)]
pub struct Hdu {
    pub header: Header,
    pub data: HduData,
}

impl Hdu {
    pub fn header_only(header: Header) -> Self {
        Self {
            header,
            data: HduData::Empty,
        }
    }

    pub fn image(header: Header, data: ImageData) -> Self {
        Self {
            header,
            data: HduData::Image(data),
        }
    }

    /// Image extension tagged with `EXTNAME`/`EXTVER`.
    pub fn named_image(mut header: Header, data: ImageData, extname: &str, extver: i64) -> Self {
        header.set("EXTNAME", extname);
        header.set("EXTVER", extver);
        Self::image(header, data)
    }

    /// Data-less image extension tagged with `EXTNAME`/`EXTVER`.
    pub fn named_empty(mut header: Header, extname: &str, extver: i64) -> Self {
        header.set("EXTNAME", extname);
        header.set("EXTVER", extver);
        Self::header_only(header)
    }

    pub fn table(mut header: Header, table: MetadataTable) -> Self {
        if !header.has("EXTNAME") {
            header.set("EXTNAME", table.name());
        }
        Self {
            header,
            data: HduData::Table(table),
        }
    }

    pub fn extname(&self) -> Option<&str> {
        self.header.get_string("EXTNAME")
    }
}

/// Ordered list of HDUs; the first one is written as the primary HDU.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HduList {
    hdus: Vec<Hdu>,
}

impl HduList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, hdu: Hdu) {
        self.hdus.push(hdu);
    }

    pub fn len(&self) -> usize {
        self.hdus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hdus.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hdu> {
        self.hdus.iter()
    }

    /// Writes every HDU to a new file. Fails if the path already exists.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = FitsWriter::create_new(path)?;
        for (i, hdu) in self.hdus.iter().enumerate() {
            writer.write_hdu(hdu, i == 0)?;
        }
        writer.finish()
    }
}
