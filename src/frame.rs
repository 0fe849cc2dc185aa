use std::path::Path;

use crate::error::{OscarError, Result};

/// Logical columns every statement export is expected to carry.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "Date",
    "Category",
    "RefNo",
    "Date.1",
    "Withdrawal",
    "Deposit",
    "Balance",
];

/// An in-memory tabular batch: ordered headers plus string cells.
/// Cells are kept raw; all coercion happens in the normalizer.
#[derive(Debug, Clone)]
pub struct Frame {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Frame {
    pub fn from_csv_path(path: &Path) -> Result<Frame> {
        let text = std::fs::read_to_string(path)?;
        Self::from_csv_str(&text)
    }

    pub fn from_csv_str(text: &str) -> Result<Frame> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());
        let headers: Vec<String> = rdr
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }
        Ok(Frame { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// Cell at (row, column name), or "" when the column is absent or
    /// the record is short. Tolerant mode falls out of this default:
    /// the parse-or-default combinators map "" to 0.0 / empty text.
    pub fn cell(&self, row: usize, name: &str) -> &str {
        let Some(col) = self.headers.iter().position(|h| h == name) else {
            return "";
        };
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|c| c.as_str())
            .unwrap_or("")
    }

    /// Strict validation: every required column must be present, else
    /// the batch fails with the full list of missing names.
    pub fn require_columns(&self, required: &[&str]) -> Result<()> {
        let missing: Vec<String> = required
            .iter()
            .filter(|c| !self.has_column(c))
            .map(|c| c.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(OscarError::MissingColumns(missing))
        }
    }

    /// Rewrite the batch as CSV with one column's cells replaced.
    /// Used by `categorize --output` to export the filled frame.
    pub fn to_csv_with_column(&self, name: &str, values: &[String]) -> Result<String> {
        let col = self.headers.iter().position(|h| h == name);
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(&self.headers)?;
        for (i, row) in self.rows.iter().enumerate() {
            let mut out: Vec<String> = Vec::with_capacity(self.headers.len());
            for (j, _) in self.headers.iter().enumerate() {
                let cell = row.get(j).cloned().unwrap_or_default();
                if Some(j) == col {
                    out.push(values.get(i).cloned().unwrap_or(cell));
                } else {
                    out.push(cell);
                }
            }
            wtr.write_record(&out)?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| OscarError::Other(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| OscarError::Other(e.to_string()))
    }
}
