//! Shared CSV reading helpers for both tables.

use std::collections::BTreeMap;
use std::io::Read;

use crate::DatasetError;

/// A fully-read CSV table: trimmed headers plus raw string records.
pub struct RawTable {
    pub table: &'static str,
    pub headers: Vec<String>,
    pub records: Vec<csv::StringRecord>,
    positions: BTreeMap<String, usize>,
}

impl RawTable {
    /// Reads every record from `reader`.
    ///
    /// The reader is strict about row width: a short or long row is a
    /// malformed table, not a missing value.
    pub fn read(table: &'static str, reader: impl Read) -> Result<Self, DatasetError> {
        let csv_error = |source| DatasetError::Csv { table, source };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(false)
            .trim(csv::Trim::Fields)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(|h| h.trim().to_owned())
            .collect();

        let records = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(csv_error)?;

        let positions = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), i))
            .collect();

        log::debug!(
            "Read {} {table} rows with {} columns",
            records.len(),
            headers.len()
        );

        Ok(Self {
            table,
            headers,
            records,
            positions,
        })
    }

    /// Returns the position of an optional column.
    pub fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }

    /// Returns the position of a required column.
    pub fn require(&self, column: &str) -> Result<usize, DatasetError> {
        self.position(column)
            .ok_or_else(|| DatasetError::MissingColumn {
                table: self.table,
                column: column.to_owned(),
            })
    }

    /// Builds an [`DatasetError::InvalidValue`] for a 0-based record index.
    pub fn invalid(&self, index: usize, column: usize, value: &str) -> DatasetError {
        DatasetError::InvalidValue {
            table: self.table,
            row: index + 1,
            column: self.headers[column].clone(),
            value: value.to_owned(),
        }
    }

    /// Returns the cell at `(index, column)`, empty when absent.
    pub fn cell(&self, index: usize, column: usize) -> &str {
        self.records[index].get(column).unwrap_or("")
    }

    /// Parses a required floating point cell.
    pub fn parse_f64(&self, index: usize, column: usize) -> Result<f64, DatasetError> {
        let raw = self.cell(index, column);
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.invalid(index, column, raw))
    }
}

/// Parses an optional numeric cell. Empty and `NaN` cells are missing
/// values; anything else must parse to a finite number.
pub fn parse_optional_f64(raw: &str) -> Result<Option<f64>, ()> {
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or(())
}

/// Parses a boolean flag cell as written by spreadsheet and dataframe
/// exports.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_optional_numbers() {
        assert_eq!(parse_optional_f64(""), Ok(None));
        assert_eq!(parse_optional_f64("NaN"), Ok(None));
        assert_eq!(parse_optional_f64("450000.0"), Ok(Some(450_000.0)));
        assert!(parse_optional_f64("abc").is_err());
    }

    #[test]
    fn rejects_infinite_optional_numbers() {
        assert!(parse_optional_f64("inf").is_err());
        assert!(parse_optional_f64("-inf").is_err());
        assert!(parse_optional_f64("infinity").is_err());
    }

    #[test]
    fn parses_flags() {
        assert_eq!(parse_flag("True"), Some(true));
        assert_eq!(parse_flag("FALSE"), Some(false));
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn rejects_ragged_rows() {
        let csv = "a,b\n1,2\n3\n";
        assert!(matches!(
            RawTable::read("test", csv.as_bytes()),
            Err(DatasetError::Csv { .. })
        ));
    }

    #[test]
    fn trims_headers_and_fields() {
        let table = RawTable::read("test", " a , b \n 1 , 2 \n".as_bytes()).unwrap();
        assert_eq!(table.require("a").unwrap(), 0);
        assert_eq!(table.cell(0, 1), "2");
    }
}
