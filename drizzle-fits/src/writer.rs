use std::fs::{File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;

use crate::hdu::{Hdu, HduData};
use crate::header::{Keyword, KeywordValue};
use crate::types::BitPix;
use crate::{FitsError, Result, CARD_SIZE, FITS_BLOCK_SIZE};

const MAX_STRING_LEN: usize = 68;
const MAX_TEXT_LEN: usize = 72;
const VALUE_WIDTH: usize = 20;

pub struct FitsWriter {
    writer: BufWriter<File>,
}

impl FitsWriter {
    /// Opens a new file; an existing file at `path` is an error.
    pub fn create_new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => FitsError::FileExists(path.display().to_string()),
                _ => FitsError::Io(e),
            })?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    pub fn write_hdu(&mut self, hdu: &Hdu, primary: bool) -> Result<()> {
        let mut cards = structural_cards(hdu, primary);
        cards.extend(
            hdu.header
                .iter()
                .filter(|k| !k.is_structural())
                .cloned(),
        );

        let mut header_bytes = Vec::with_capacity((cards.len() + 1) * CARD_SIZE);
        for keyword in &cards {
            header_bytes.extend_from_slice(&format_card(keyword)?);
        }
        header_bytes.extend_from_slice(&end_card());
        pad_to_block(&mut header_bytes, b' ');
        self.writer.write_all(&header_bytes)?;

        let mut data_bytes = match &hdu.data {
            HduData::Empty => Vec::new(),
            HduData::Image(image) => image.to_be_bytes(),
            HduData::Table(table) => table.to_be_bytes(),
        };
        if !data_bytes.is_empty() {
            pad_to_block(&mut data_bytes, 0);
            self.writer.write_all(&data_bytes)?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

fn structural_cards(hdu: &Hdu, primary: bool) -> Vec<Keyword> {
    let mut cards = Vec::new();
    if primary {
        cards.push(Keyword::logical("SIMPLE", true).with_comment("conforms to FITS standard"));
    } else {
        let kind = match hdu.data {
            HduData::Table(_) => "BINTABLE",
            _ => "IMAGE",
        };
        cards.push(Keyword::string("XTENSION", kind).with_comment("extension type"));
    }

    match &hdu.data {
        HduData::Empty => {
            cards.push(Keyword::integer("BITPIX", BitPix::U8.value()));
            cards.push(Keyword::integer("NAXIS", 0));
        }
        HduData::Image(image) => {
            let naxes = image.naxes();
            cards.push(
                Keyword::integer("BITPIX", image.bitpix().value()).with_comment("array data type"),
            );
            cards.push(Keyword::integer("NAXIS", naxes.len() as i64));
            for (i, n) in naxes.iter().enumerate() {
                cards.push(Keyword::integer(format!("NAXIS{}", i + 1), *n as i64));
            }
        }
        HduData::Table(table) => {
            cards.push(Keyword::integer("BITPIX", BitPix::U8.value()));
            cards.push(Keyword::integer("NAXIS", 2));
            cards.push(
                Keyword::integer("NAXIS1", table.row_width() as i64).with_comment("width of table in bytes"),
            );
            cards.push(Keyword::integer("NAXIS2", table.nrows() as i64).with_comment("number of rows in table"));
        }
    }

    if primary {
        let extend = hdu.header.get_logical("EXTEND").unwrap_or(true);
        cards.push(Keyword::logical("EXTEND", extend));
    } else {
        cards.push(Keyword::integer("PCOUNT", 0));
        cards.push(Keyword::integer("GCOUNT", 1));
    }

    if let HduData::Table(table) = &hdu.data {
        cards.push(Keyword::integer("TFIELDS", table.columns().len() as i64));
        for (i, column) in table.columns().iter().enumerate() {
            cards.push(Keyword::string(format!("TTYPE{}", i + 1), column.name.clone()));
            cards.push(Keyword::string(format!("TFORM{}", i + 1), column.tform()));
        }
    }
    cards
}

fn end_card() -> [u8; CARD_SIZE] {
    let mut card = [b' '; CARD_SIZE];
    card[..3].copy_from_slice(b"END");
    card
}

fn pad_to_block(bytes: &mut Vec<u8>, fill: u8) {
    let remainder = bytes.len() % FITS_BLOCK_SIZE;
    if remainder != 0 {
        bytes.resize(bytes.len() + FITS_BLOCK_SIZE - remainder, fill);
    }
}

/// Renders one keyword as an 80-byte fixed-format card.
pub fn format_card(keyword: &Keyword) -> Result<[u8; CARD_SIZE]> {
    let name = keyword.name.as_str();
    if name.len() > 8 || !name.is_ascii() {
        return Err(FitsError::InvalidKeyword(name.to_string()));
    }

    let mut text = format!("{:<8}", name);

    match &keyword.value {
        None => {
            let body = keyword.comment.as_deref().unwrap_or("");
            text.push_str(&ascii_prefix(body, MAX_TEXT_LEN));
        }
        Some(value) => {
            text.push_str("= ");
            text.push_str(&format_value(name, value)?);
            if let Some(comment) = keyword.comment.as_deref().filter(|c| !c.is_empty()) {
                let room = CARD_SIZE.saturating_sub(text.len() + 3);
                if room > 0 {
                    text.push_str(" / ");
                    text.push_str(&ascii_prefix(comment, room));
                }
            }
        }
    }

    let mut card = [b' '; CARD_SIZE];
    let bytes = text.as_bytes();
    let n = bytes.len().min(CARD_SIZE);
    card[..n].copy_from_slice(&bytes[..n]);
    Ok(card)
}

fn format_value(name: &str, value: &KeywordValue) -> Result<String> {
    Ok(match value {
        KeywordValue::Logical(b) => format!("{:>width$}", if *b { "T" } else { "F" }, width = VALUE_WIDTH),
        KeywordValue::Integer(i) => format!("{:>width$}", i, width = VALUE_WIDTH),
        KeywordValue::Real(f) => format!("{:>width$}", format_real(name, *f)?, width = VALUE_WIDTH),
        KeywordValue::String(s) => format_string(s),
    })
}

/// Reals always carry a decimal point or an exponent so they read back as
/// floating point.
fn format_real(name: &str, value: f64) -> Result<String> {
    if !value.is_finite() {
        return Err(FitsError::InvalidKeywordValue {
            keyword: name.to_string(),
            value: value.to_string(),
        });
    }
    let magnitude = value.abs();
    if value == 0.0 || (1e-4..1e15).contains(&magnitude) {
        let mut plain = value.to_string();
        if !plain.contains('.') {
            plain.push_str(".0");
        }
        if plain.len() <= VALUE_WIDTH {
            return Ok(plain);
        }
    }
    Ok(format!("{:.13E}", value))
}

fn format_string(value: &str) -> String {
    let mut escaped = String::new();
    for c in value.chars().filter(char::is_ascii) {
        let encoded_len = if c == '\'' { 2 } else { 1 };
        if escaped.len() + encoded_len > MAX_STRING_LEN {
            break;
        }
        if c == '\'' {
            escaped.push_str("''");
        } else {
            escaped.push(c);
        }
    }
    format!("'{:<8}'", escaped)
}

fn ascii_prefix(text: &str, max: usize) -> String {
    text.chars().filter(char::is_ascii).take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ImageData;
    use crate::header::Header;
    use std::io::Read;
    use tempfile::TempDir;

    fn card_text(keyword: &Keyword) -> String {
        String::from_utf8(format_card(keyword).unwrap().to_vec()).unwrap()
    }

    #[test]
    fn test_format_integer_card() {
        let text = card_text(&Keyword::integer("NAXIS", 2));
        assert_eq!(&text[..30], "NAXIS   =                    2");
        assert_eq!(text.len(), 80);
    }

    #[test]
    fn test_format_real_always_has_point() {
        let text = card_text(&Keyword::real("EXPTIME", 100.0));
        assert!(text[10..30].trim() == "100.0");

        let small = card_text(&Keyword::real("CD1_1", -1.388888888889e-5));
        assert!(small[10..30].contains('E'));
    }

    #[test]
    fn test_format_string_card_with_comment() {
        let keyword = Keyword::string("EXTNAME", "SCI").with_comment("extension name");
        let text = card_text(&keyword);
        assert!(text.starts_with("EXTNAME = 'SCI     ' / extension name"));
    }

    #[test]
    fn test_format_string_escapes_and_truncates() {
        let text = card_text(&Keyword::string("OBJECT", "O'Brien"));
        assert!(text.contains("'O''Brien'"));

        let long = "x".repeat(100);
        let text = card_text(&Keyword::string("D001DATA", long));
        assert_eq!(text.matches('x').count(), MAX_STRING_LEN);
    }

    #[test]
    fn test_format_history() {
        let text = card_text(&Keyword::history("    drizzlepac Version 3.5.0"));
        assert!(text.starts_with("HISTORY     drizzlepac Version 3.5.0"));
    }

    #[test]
    fn test_long_keyword_rejected() {
        assert!(format_card(&Keyword::real("TOOLONGNAME", 1.0)).is_err());
    }

    #[test]
    fn test_nan_rejected() {
        assert!(format_card(&Keyword::real("FVAL", f64::NAN)).is_err());
    }

    #[test]
    fn test_write_blocks_and_skip_template_structure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.fits");

        let mut header = Header::new();
        header.set("NAXIS", 7);
        header.set("BITPIX", 16);
        header.set("TELESCOP", "HST");
        let data = ImageData::from_f32(vec![2, 3], vec![1.0; 6]).unwrap();

        let mut writer = FitsWriter::create_new(&path).unwrap();
        writer.write_hdu(&Hdu::image(header, data), true).unwrap();
        writer.finish().unwrap();

        let mut bytes = Vec::new();
        std::fs::File::open(&path)
            .unwrap()
            .read_to_end(&mut bytes)
            .unwrap();
        assert_eq!(bytes.len(), 2 * FITS_BLOCK_SIZE);

        let text = String::from_utf8_lossy(&bytes[..FITS_BLOCK_SIZE]).to_string();
        assert_eq!(text.matches("NAXIS   =").count(), 1);
        assert!(text.contains("NAXIS1  =                    3"));
        assert!(text.contains("BITPIX  =                  -32"));
        assert!(text.contains("TELESCOP= 'HST     '"));
    }

    #[test]
    fn test_create_new_refuses_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("exists.fits");
        std::fs::write(&path, b"x").unwrap();
        assert!(matches!(
            FitsWriter::create_new(&path),
            Err(FitsError::FileExists(_))
        ));
    }
}
