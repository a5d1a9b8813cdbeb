//! In-memory CSV table
//!
//! Header plus string cells, loaded with the `csv` crate. Rows shorter than
//! the header are allowed; absent cells read as missing.

use std::io::Read;
use std::path::Path;

/// Cell spellings treated as missing values
const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "NULL", "null", "NaN", "nan", "None"];

/// Whether a raw cell counts as a missing value
pub fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell.trim())
}

/// A loaded CSV table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Read a table from a CSV file with a header row
    pub fn from_path(path: &Path) -> Result<Self, csv::Error> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;
        Self::from_csv(reader)
    }

    /// Read a table from any CSV source with a header row
    pub fn from_reader<R: Read>(source: R) -> Result<Self, csv::Error> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(source);
        Self::from_csv(reader)
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, csv::Error> {
        let headers = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Find a column by name, exact match first, then trimmed and case-insensitive
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name).or_else(|| {
            let wanted = name.trim().to_lowercase();
            self.headers
                .iter()
                .position(|h| h.trim().to_lowercase() == wanted)
        })
    }

    /// Cells of a column as `(1-based row, value)`; `None` for missing cells
    pub fn column(&self, index: usize) -> impl Iterator<Item = (usize, Option<&str>)> + '_ {
        self.rows.iter().enumerate().map(move |(i, row)| {
            let cell = row
                .get(index)
                .map(String::as_str)
                .filter(|cell| !is_missing(cell));
            (i + 1, cell)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "id,name,email\n1,Alice,a@example.com\n2,,NULL\n3,Bob\n";

    #[test]
    fn test_from_reader() {
        let table = Table::from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(table.headers(), &["id", "name", "email"]);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 3);
    }

    #[test]
    fn test_column_missing_cells() {
        let table = Table::from_reader(CSV.as_bytes()).unwrap();
        let email: Vec<_> = table.column(2).collect();
        assert_eq!(
            email,
            vec![(1, Some("a@example.com")), (2, None), (3, None)]
        );
    }

    #[test]
    fn test_column_index_lookup() {
        let table = Table::new(vec!["Customer ID".to_string()], Vec::new());
        assert_eq!(table.column_index("Customer ID"), Some(0));
        assert_eq!(table.column_index("customer id"), Some(0));
        assert_eq!(table.column_index("email"), None);
    }

    #[test]
    fn test_is_missing() {
        assert!(is_missing(""));
        assert!(is_missing("  "));
        assert!(is_missing("N/A"));
        assert!(!is_missing("0"));
    }
}
