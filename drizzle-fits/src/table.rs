use crate::{FitsError, Result};

pub const METADATA_TABLE_NAME: &str = "HDRTAB";

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Text(Vec<String>),
    Real(Vec<f64>),
    Integer(Vec<i64>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            Self::Text(v) => v.len(),
            Self::Real(v) => v.len(),
            Self::Integer(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    /// Bytes per row; text columns are as wide as their longest value.
    pub fn width(&self) -> usize {
        match &self.data {
            ColumnData::Text(v) => v.iter().map(String::len).max().unwrap_or(0).max(1),
            ColumnData::Real(_) | ColumnData::Integer(_) => 8,
        }
    }

    pub fn tform(&self) -> String {
        match &self.data {
            ColumnData::Text(_) => format!("{}A", self.width()),
            ColumnData::Real(_) => "1D".to_string(),
            ColumnData::Integer(_) => "1K".to_string(),
        }
    }

    fn encode_cell(&self, row: usize, out: &mut Vec<u8>) {
        match &self.data {
            ColumnData::Text(v) => {
                let width = self.width();
                let bytes = v[row].as_bytes();
                let n = bytes.len().min(width);
                out.extend_from_slice(&bytes[..n]);
                out.resize(out.len() + width - n, b' ');
            }
            ColumnData::Real(v) => out.extend_from_slice(&v[row].to_be_bytes()),
            ColumnData::Integer(v) => out.extend_from_slice(&v[row].to_be_bytes()),
        }
    }
}

/// Row-per-input metadata table written as a binary-table extension.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataTable {
    name: String,
    nrows: usize,
    columns: Vec<Column>,
}

impl MetadataTable {
    pub fn new(name: impl Into<String>, nrows: usize) -> Self {
        Self {
            name: name.into(),
            nrows,
            columns: Vec::new(),
        }
    }

    pub fn add_column(&mut self, name: impl Into<String>, data: ColumnData) -> Result<()> {
        let name = name.into();
        if data.len() != self.nrows {
            return Err(FitsError::ColumnLength {
                column: name,
                expected: self.nrows,
                actual: data.len(),
            });
        }
        self.columns.push(Column { name, data });
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn row_width(&self) -> usize {
        self.columns.iter().map(Column::width).sum()
    }

    pub fn to_be_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.row_width() * self.nrows);
        for row in 0..self.nrows {
            for column in &self.columns {
                column.encode_cell(row, &mut out);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> MetadataTable {
        let mut table = MetadataTable::new(METADATA_TABLE_NAME, 2);
        table
            .add_column(
                "FILENAME",
                ColumnData::Text(vec!["a_flt.fits".into(), "bb_flt.fits".into()]),
            )
            .unwrap();
        table
            .add_column("EXPTIME", ColumnData::Real(vec![100.0, 200.0]))
            .unwrap();
        table
    }

    #[test]
    fn test_column_formats() {
        let table = table();
        assert_eq!(table.columns()[0].tform(), "11A");
        assert_eq!(table.columns()[1].tform(), "1D");
        assert_eq!(table.row_width(), 19);
    }

    #[test]
    fn test_row_encoding() {
        let bytes = table().to_be_bytes();
        assert_eq!(bytes.len(), 38);
        assert_eq!(&bytes[..11], b"a_flt.fits ");
        assert_eq!(&bytes[11..19], &100.0f64.to_be_bytes());
    }

    #[test]
    fn test_column_length_mismatch() {
        let mut table = MetadataTable::new(METADATA_TABLE_NAME, 2);
        let err = table
            .add_column("EXPEND", ColumnData::Real(vec![1.0]))
            .unwrap_err();
        assert!(matches!(err, FitsError::ColumnLength { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn test_column_lookup() {
        let table = table();
        assert!(table.column("exptime").is_some());
        assert!(table.column("ROOTNAME").is_none());
    }
}
