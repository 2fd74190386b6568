#[derive(Debug, thiserror::Error)]
pub enum FitsError {
    #[error("Invalid FITS format: {0}")]
    InvalidFormat(String),

    #[error("Keyword {keyword} not found")]
    KeywordNotFound { keyword: String },

    #[error("Invalid BITPIX value: {0}")]
    InvalidBitPix(i64),

    #[error("Header parsing error: {0}")]
    HeaderParse(String),

    #[error("Invalid keyword: {0}")]
    InvalidKeyword(String),

    #[error("Invalid keyword value: {keyword} = {value}")]
    InvalidKeywordValue { keyword: String, value: String },

    #[error("Data length {actual} does not match shape {shape:?} (expected {expected})")]
    DataShape {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },

    #[error("Table column '{column}' has {actual} rows, expected {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("File already exists: {0}")]
    FileExists(String),

    #[error("EOF reached unexpectedly")]
    UnexpectedEof,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FitsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_shape_message() {
        let err = FitsError::DataShape {
            shape: vec![4, 3],
            expected: 12,
            actual: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("[4, 3]"));
        assert!(msg.contains("12"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: FitsError = io.into();
        assert!(matches!(err, FitsError::Io(_)));
    }
}
