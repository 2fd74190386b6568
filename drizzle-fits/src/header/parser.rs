use std::io::Read;
use std::str;

use super::{Header, Keyword, KeywordValue};
use crate::{FitsError, Result, CARD_SIZE, FITS_BLOCK_SIZE};

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCard {
    pub keyword: String,
    pub value: Option<String>,
    pub comment: Option<String>,
}

pub struct HeaderParser;

impl HeaderCard {
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() != CARD_SIZE {
            return Err(FitsError::HeaderParse(format!(
                "card must be {} bytes, got {}",
                CARD_SIZE,
                data.len()
            )));
        }
        if !data.is_ascii() {
            return Err(FitsError::InvalidFormat(
                "Non-ASCII byte in header card".to_string(),
            ));
        }
        let card = str::from_utf8(data)
            .map_err(|_| FitsError::InvalidFormat("Invalid UTF-8 in header card".to_string()))?;

        let keyword = card[..8].trim().to_string();
        let mut parsed = HeaderCard {
            keyword,
            value: None,
            comment: None,
        };

        if &card[8..10] == "= " && !matches!(parsed.keyword.as_str(), "HISTORY" | "COMMENT" | "") {
            let (value, comment) = split_value_comment(&card[10..]);
            parsed.value = value;
            parsed.comment = comment;
        } else {
            let text = card[8..].trim_end();
            if !text.trim().is_empty() {
                parsed.comment = Some(text.trim_start_matches(' ').to_string());
            }
        }
        Ok(parsed)
    }

    pub fn to_keyword(&self) -> Result<Keyword> {
        let mut keyword = Keyword::new(self.keyword.clone());
        if let Some(comment) = &self.comment {
            keyword = keyword.with_comment(comment.clone());
        }
        if let Some(value) = &self.value {
            keyword = keyword.with_value(parse_value(&self.keyword, value)?);
        }
        Ok(keyword)
    }
}

/// Splits the value field at the comment separator, honouring quoted
/// strings with doubled-quote escapes.
fn split_value_comment(field: &str) -> (Option<String>, Option<String>) {
    let trimmed = field.trim_start();
    let (value, rest) = if trimmed.starts_with('\'') {
        let bytes = trimmed.as_bytes();
        let mut end = None;
        let mut i = 1;
        while i < bytes.len() {
            if bytes[i] == b'\'' {
                if i + 1 < bytes.len() && bytes[i + 1] == b'\'' {
                    i += 2;
                    continue;
                }
                end = Some(i);
                break;
            }
            i += 1;
        }
        match end {
            Some(end) => (&trimmed[..=end], &trimmed[end + 1..]),
            None => (trimmed, ""),
        }
    } else {
        match trimmed.find('/') {
            Some(pos) => (&trimmed[..pos], &trimmed[pos..]),
            None => (trimmed, ""),
        }
    };

    let value = value.trim();
    let comment = rest
        .trim_start()
        .strip_prefix('/')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    ((!value.is_empty()).then(|| value.to_string()), comment)
}

fn parse_value(keyword: &str, raw: &str) -> Result<KeywordValue> {
    let trimmed = raw.trim();
    match trimmed {
        "T" => return Ok(KeywordValue::Logical(true)),
        "F" => return Ok(KeywordValue::Logical(false)),
        _ => {}
    }

    if let Some(inner) = trimmed.strip_prefix('\'') {
        let inner = inner.strip_suffix('\'').unwrap_or(inner);
        return Ok(KeywordValue::String(inner.replace("''", "'").trim_end().to_string()));
    }

    if let Ok(int_val) = trimmed.parse::<i64>() {
        return Ok(KeywordValue::Integer(int_val));
    }

    trimmed
        .replace(['D', 'd'], "E")
        .parse::<f64>()
        .map(KeywordValue::Real)
        .map_err(|_| FitsError::InvalidKeywordValue {
            keyword: keyword.to_string(),
            value: trimmed.to_string(),
        })
}

impl HeaderParser {
    /// Parses one header from its raw blocks.
    pub fn parse_header(data: &[u8]) -> Result<Header> {
        if data.len() % FITS_BLOCK_SIZE != 0 {
            return Err(FitsError::InvalidFormat(
                "Header size must be multiple of 2880 bytes".to_string(),
            ));
        }

        let mut header = Header::new();
        for chunk in data.chunks_exact(CARD_SIZE) {
            let card = HeaderCard::parse(chunk)?;
            if card.keyword == "END" {
                return Ok(header);
            }
            if card.keyword.is_empty() && card.comment.is_none() {
                continue;
            }
            header.append(card.to_keyword()?);
        }

        Err(FitsError::InvalidFormat("Missing END keyword".to_string()))
    }

    /// Reads header blocks until the one holding `END`. Returns `None` at a
    /// clean end of stream.
    pub fn read_header<R: Read>(reader: &mut R) -> Result<Option<Header>> {
        let mut raw = Vec::new();
        let mut block = [0u8; FITS_BLOCK_SIZE];

        loop {
            match read_block(reader, &mut block)? {
                false if raw.is_empty() => return Ok(None),
                false => return Err(FitsError::UnexpectedEof),
                true => {}
            }
            raw.extend_from_slice(&block);
            let has_end = block
                .chunks_exact(CARD_SIZE)
                .any(|card| card.starts_with(b"END     "));
            if has_end {
                return Self::parse_header(&raw).map(Some);
            }
        }
    }
}

/// Fills `block`, returning false if the stream was already exhausted.
fn read_block<R: Read>(reader: &mut R, block: &mut [u8]) -> Result<bool> {
    let mut filled = 0;
    while filled < block.len() {
        let n = reader.read(&mut block[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    match filled {
        0 => Ok(false),
        n if n == block.len() => Ok(true),
        _ => Err(FitsError::UnexpectedEof),
    }
}
