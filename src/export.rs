//! Result Export
//!
//! Serializes a validation result for download:
//! - JSON: the full result, pretty printed
//! - CSV: one row per check (`name,definition,result,status`)

use chrono::NaiveDate;

use crate::model::ValidationResult;

/// Export file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output is not UTF-8: {0}")]
    Utf8(String),
}

/// Download file name: `validation-<dataset>-<YYYY-MM-DD>.<ext>`
pub fn export_filename(result: &ValidationResult, format: ExportFormat, date: NaiveDate) -> String {
    format!(
        "validation-{}-{}.{}",
        result.dataset,
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Pretty JSON of the whole result
pub fn to_json(result: &ValidationResult) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Parse a JSON export back into a result
pub fn from_json(json: &str) -> Result<ValidationResult, ExportError> {
    Ok(serde_json::from_str(json)?)
}

/// Checks as CSV
pub fn to_csv(result: &ValidationResult) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["name", "definition", "result", "status"])?;

    for check in &result.checks {
        writer.write_record([
            check.name.as_str(),
            check.definition.as_str(),
            check.result.as_str(),
            check.status.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Utf8(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::Utf8(e.to_string()))
}

/// Render `result` in `format`
pub fn render(result: &ValidationResult, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Json => to_json(result),
        ExportFormat::Csv => to_csv(result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CheckStatus, InvalidRecord, ValidationCheck};

    fn result() -> ValidationResult {
        ValidationResult::new(
            "customers.csv",
            vec![
                ValidationCheck::new("row_count", "row_count > 0", "3", CheckStatus::Passed),
                ValidationCheck::new(
                    "values in (status)",
                    "values in (status) in ('active', 'inactive')",
                    "1 invalid value(s)",
                    CheckStatus::Failed,
                ),
            ],
            vec![InvalidRecord {
                row: 3,
                column: "status".to_string(),
                value: "deleted".to_string(),
                issue: "Invalid value".to_string(),
            }],
        )
    }

    #[test]
    fn test_json_roundtrip() {
        let result = result();
        let json = to_json(&result).unwrap();
        assert!(json.contains('\n'));
        assert_eq!(from_json(&json).unwrap(), result);
    }

    #[test]
    fn test_csv() {
        let csv = to_csv(&result()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "name,definition,result,status");
        assert_eq!(lines[1], "row_count,row_count > 0,3,passed");
        assert_eq!(
            lines[2],
            "values in (status),\"values in (status) in ('active', 'inactive')\",1 invalid value(s),failed"
        );
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            export_filename(&result(), ExportFormat::Json, date),
            "validation-customers.csv-2024-03-09.json"
        );
        assert_eq!(
            export_filename(&result(), ExportFormat::Csv, date),
            "validation-customers.csv-2024-03-09.csv"
        );
    }
}
