//! Check Evaluator
//!
//! Runs a parsed check document against a loaded table and produces the
//! checks and invalid records of a validation result.

use std::collections::HashMap;

use crate::checks::ast::*;
use crate::datasets::Table;
use crate::model::{CheckStatus, InvalidRecord, ValidationCheck};

/// Default cap on invalid records collected per run
pub const DEFAULT_MAX_INVALID_RECORDS: usize = 1000;

/// Evaluation settings
#[derive(Debug, Clone, Copy)]
pub struct EvaluationOptions {
    /// Maximum invalid records kept for one run; checks are never capped
    pub max_invalid_records: usize,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            max_invalid_records: DEFAULT_MAX_INVALID_RECORDS,
        }
    }
}

/// Outcome of evaluating a document
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    pub checks: Vec<ValidationCheck>,
    pub invalid_records: Vec<InvalidRecord>,
    /// Whether invalid records were dropped because of the cap
    pub truncated: bool,
}

/// Evaluates check documents against tables
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    options: EvaluationOptions,
}

/// Collects invalid records up to a limit
struct RecordSink {
    records: Vec<InvalidRecord>,
    limit: usize,
    truncated: bool,
}

impl RecordSink {
    fn push(&mut self, row: usize, column: &str, value: &str, issue: impl Into<String>) {
        if self.records.len() >= self.limit {
            self.truncated = true;
            return;
        }
        self.records.push(InvalidRecord {
            row,
            column: column.to_string(),
            value: value.to_string(),
            issue: issue.into(),
        });
    }
}

impl Severity {
    /// Status reported when a check with this severity is violated
    pub fn violation_status(&self) -> CheckStatus {
        match self {
            Severity::Fail => CheckStatus::Failed,
            Severity::Warn => CheckStatus::Warning,
        }
    }
}

impl Evaluator {
    pub fn new(options: EvaluationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EvaluationOptions {
        &self.options
    }

    /// Evaluate every check of `document` against `table`, in document order
    pub fn evaluate(&self, document: &CheckDocument, table: &Table) -> Evaluation {
        let mut sink = RecordSink {
            records: Vec::new(),
            limit: self.options.max_invalid_records,
            truncated: false,
        };

        let checks = document
            .checks()
            .map(|def| evaluate_check(def, table, &mut sink))
            .collect();

        if sink.truncated {
            tracing::debug!(
                limit = sink.limit,
                "Invalid record limit reached, remaining records dropped"
            );
        }

        Evaluation {
            checks,
            invalid_records: sink.records,
            truncated: sink.truncated,
        }
    }
}

fn evaluate_check(def: &CheckDef, table: &Table, sink: &mut RecordSink) -> ValidationCheck {
    let name = def.kind.name();

    let column = match def.kind.column() {
        Some(col) => match table.column_index(col) {
            Some(idx) => Some((idx, col)),
            None => {
                return ValidationCheck::new(
                    name,
                    &def.definition,
                    format!("column '{}' not found", col),
                    CheckStatus::Failed,
                )
            }
        },
        None => None,
    };

    let (result, passed) = match (&def.kind, column) {
        (CheckKind::Threshold { metric, threshold }, column) => {
            match measure(metric, table, column.map(|(idx, _)| idx)) {
                Some(value) => {
                    let passed = threshold.accepts(value);
                    if !passed {
                        if let Some((idx, col)) = column {
                            collect_violations(metric, threshold, table, idx, col, sink);
                        }
                    }
                    (format_number(value), passed)
                }
                None => ("no numeric values".to_string(), false),
            }
        }
        (CheckKind::ValuesIn { allowed, .. }, Some((idx, col))) => {
            let invalid: Vec<(usize, &str)> = table
                .column(idx)
                .filter_map(|(row, cell)| cell.map(|v| (row, v)))
                .filter(|(_, v)| !allowed.iter().any(|a| a == *v))
                .collect();

            for (row, value) in &invalid {
                sink.push(*row, col, value, "Invalid value");
            }

            let n = invalid.len();
            let plural = if n == 1 { "" } else { "s" };
            (format!("{} invalid value{}", n, plural), n == 0)
        }
        (CheckKind::ValuesIn { .. }, None) => unreachable!("values-in checks always name a column"),
    };

    let status = if passed {
        CheckStatus::Passed
    } else {
        def.severity.violation_status()
    };

    ValidationCheck::new(name, &def.definition, result, status)
}

/// Measure a metric; `None` when there is nothing to measure
fn measure(metric: &Metric, table: &Table, column: Option<usize>) -> Option<f64> {
    let cells = || column.into_iter().flat_map(|idx| table.column(idx));

    match metric {
        Metric::RowCount => Some(table.row_count() as f64),
        Metric::MissingCount(_) => Some(cells().filter(|(_, c)| c.is_none()).count() as f64),
        Metric::DuplicateCount(_) => {
            let groups = group_values(cells().filter_map(|(row, c)| c.map(|v| (row, v))));
            Some(groups.iter().map(|(_, rows)| rows.len() - 1).sum::<usize>() as f64)
        }
        Metric::AvgLength(_) => {
            let lengths: Vec<usize> = cells()
                .filter_map(|(_, c)| c.map(|v| v.chars().count()))
                .collect();
            if lengths.is_empty() {
                Some(0.0)
            } else {
                Some(lengths.iter().sum::<usize>() as f64 / lengths.len() as f64)
            }
        }
        Metric::Min(_) => numeric(cells()).reduce(f64::min),
        Metric::Max(_) => numeric(cells()).reduce(f64::max),
    }
}

fn numeric<'a>(
    cells: impl Iterator<Item = (usize, Option<&'a str>)> + 'a,
) -> impl Iterator<Item = f64> + 'a {
    cells
        .filter_map(|(_, c)| c.and_then(|v| v.trim().parse::<f64>().ok()))
        .filter(|v| v.is_finite())
}

/// Group non-missing values by value, in order of first appearance
fn group_values<'a>(cells: impl Iterator<Item = (usize, &'a str)>) -> Vec<(&'a str, Vec<usize>)> {
    let mut order: Vec<(&str, Vec<usize>)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for (row, value) in cells {
        match positions.get(value) {
            Some(&pos) => order[pos].1.push(row),
            None => {
                positions.insert(value, order.len());
                order.push((value, vec![row]));
            }
        }
    }

    order
}

/// Record the offending cells of a violated threshold check
fn collect_violations(
    metric: &Metric,
    threshold: &Threshold,
    table: &Table,
    idx: usize,
    col: &str,
    sink: &mut RecordSink,
) {
    match metric {
        Metric::MissingCount(_) => {
            for (row, _) in table.column(idx).filter(|(_, c)| c.is_none()) {
                sink.push(row, col, "NULL", "Missing value");
            }
        }
        Metric::DuplicateCount(_) => {
            let groups = group_values(table.column(idx).filter_map(|(row, c)| c.map(|v| (row, v))));
            for (value, rows) in groups.iter().filter(|(_, rows)| rows.len() > 1) {
                for row in rows {
                    sink.push(*row, col, value, "Duplicate value");
                }
            }
        }
        Metric::AvgLength(_) => {
            if let Threshold::Between(low, high) = *threshold {
                for (row, value) in table.column(idx).filter_map(|(row, c)| c.map(|v| (row, v))) {
                    let len = value.chars().count() as f64;
                    if len < low {
                        sink.push(
                            row,
                            col,
                            value,
                            format!("Length below minimum ({})", format_number(low)),
                        );
                    } else if len > high {
                        sink.push(
                            row,
                            col,
                            value,
                            format!("Length above maximum ({})", format_number(high)),
                        );
                    }
                }
            }
        }
        Metric::RowCount | Metric::Min(_) | Metric::Max(_) => {}
    }
}

/// Render a measured value: integers without decimals, others with up to two
pub fn format_number(value: f64) -> String {
    // Anything that rounds to zero renders unsigned
    if (value * 100.0).round() == 0.0 {
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        let text = format!("{:.2}", value);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::parse_document;

    const CUSTOMERS: &str = "customer_id,name,email,status,score
1,Alice Smith,alice@example.com,active,10
2,Bob,bob@example.com,inactive,7.5
3,Carol Jones,alice@example.com,archived,
,Dan Brown,dan@example.com,pending,3
5,Eve Adams,eve@example.com,active,abc
";

    fn table() -> Table {
        Table::from_reader(CUSTOMERS.as_bytes()).unwrap()
    }

    fn run(doc: &str) -> Evaluation {
        let doc = parse_document(doc).unwrap();
        Evaluator::default().evaluate(&doc, &table())
    }

    #[test]
    fn test_row_count() {
        let eval = run("checks for c:\n  - row_count > 0\n  - row_count = 10\n");
        assert_eq!(eval.checks[0].result, "5");
        assert_eq!(eval.checks[0].status, CheckStatus::Passed);
        assert_eq!(eval.checks[1].status, CheckStatus::Failed);
        assert!(eval.invalid_records.is_empty());
    }

    #[test]
    fn test_missing_count_records() {
        let eval = run("checks for c:\n  - missing_count(customer_id) = 0\n");
        let check = &eval.checks[0];
        assert_eq!(check.name, "missing_count(customer_id)");
        assert_eq!(check.definition, "missing_count(customer_id) = 0");
        assert_eq!(check.result, "1");
        assert_eq!(check.status, CheckStatus::Failed);

        assert_eq!(eval.invalid_records.len(), 1);
        let record = &eval.invalid_records[0];
        assert_eq!(record.row, 4);
        assert_eq!(record.column, "customer_id");
        assert_eq!(record.value, "NULL");
        assert_eq!(record.issue, "Missing value");
    }

    #[test]
    fn test_duplicate_count_records() {
        let eval = run("checks for c:\n  - duplicate_count(email) = 0\n");
        assert_eq!(eval.checks[0].result, "1");
        assert_eq!(eval.checks[0].status, CheckStatus::Failed);

        let rows: Vec<usize> = eval.invalid_records.iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![1, 3]);
        assert!(eval
            .invalid_records
            .iter()
            .all(|r| r.value == "alice@example.com" && r.issue == "Duplicate value"));
    }

    #[test]
    fn test_avg_length_warning() {
        let eval = run("checks for c:\n  - warn: avg_length(name) between 9 and 10\n");
        let check = &eval.checks[0];
        assert_eq!(check.status, CheckStatus::Warning);
        assert_eq!(check.result, "8.6");

        let issues: Vec<(usize, &str)> = eval
            .invalid_records
            .iter()
            .map(|r| (r.row, r.issue.as_str()))
            .collect();
        assert_eq!(
            issues,
            vec![
                (1, "Length above maximum (10)"),
                (2, "Length below minimum (9)"),
                (3, "Length above maximum (10)"),
            ]
        );
    }

    #[test]
    fn test_values_in() {
        let eval = run(
            "checks for c:\n  - values in (status) in ('active', 'inactive', 'pending')\n",
        );
        assert_eq!(eval.checks[0].result, "1 invalid value");
        assert_eq!(eval.checks[0].status, CheckStatus::Failed);
        assert_eq!(eval.invalid_records[0].row, 3);
        assert_eq!(eval.invalid_records[0].value, "archived");
        assert_eq!(eval.invalid_records[0].issue, "Invalid value");
    }

    #[test]
    fn test_min_max_skip_non_numeric() {
        let eval = run("checks for c:\n  - min(score) >= 3\n  - max(score) < 10\n");
        assert_eq!(eval.checks[0].result, "3");
        assert_eq!(eval.checks[0].status, CheckStatus::Passed);
        assert_eq!(eval.checks[1].result, "10");
        assert_eq!(eval.checks[1].status, CheckStatus::Failed);

        let eval = run("checks for c:\n  - min(name) > 0\n");
        assert_eq!(eval.checks[0].result, "no numeric values");
        assert_eq!(eval.checks[0].status, CheckStatus::Failed);
    }

    #[test]
    fn test_min_max_ignore_non_finite() {
        let table = Table::from_reader("reading\ninf\n5\n-infinity\nNaN\n2\n".as_bytes()).unwrap();
        let doc = parse_document("checks for c:\n  - max(reading) <= 5\n  - min(reading) >= 2\n").unwrap();
        let eval = Evaluator::default().evaluate(&doc, &table);

        assert_eq!(eval.checks[0].result, "5");
        assert_eq!(eval.checks[0].status, CheckStatus::Passed);
        assert_eq!(eval.checks[1].result, "2");
        assert_eq!(eval.checks[1].status, CheckStatus::Passed);
    }

    #[test]
    fn test_unknown_column_fails_regardless_of_severity() {
        let eval = run("checks for c:\n  - warn: missing_count(phone) = 0\n");
        assert_eq!(eval.checks[0].status, CheckStatus::Failed);
        assert_eq!(eval.checks[0].result, "column 'phone' not found");
    }

    #[test]
    fn test_summary_invariant_holds() {
        let eval = run(
            "checks for c:
  - row_count > 0
  - missing_count(customer_id) = 0
  - duplicate_count(email) = 0
  - warn: avg_length(name) between 5 and 30
  - values in (status) in ('active', 'inactive', 'pending')
",
        );
        let summary = crate::model::ValidationSummary::from_checks(&eval.checks);
        assert_eq!(summary.total, eval.checks.len());
        assert_eq!(summary.passed + summary.warnings + summary.failed, summary.total);
    }

    #[test]
    fn test_record_cap() {
        let doc = parse_document(
            "checks for c:\n  - duplicate_count(email) = 0\n  - missing_count(customer_id) = 0\n",
        )
        .unwrap();
        let evaluator = Evaluator::new(EvaluationOptions {
            max_invalid_records: 1,
        });
        let eval = evaluator.evaluate(&doc, &table());
        assert_eq!(eval.checks.len(), 2);
        assert_eq!(eval.invalid_records.len(), 1);
        assert!(eval.truncated);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(5000.0), "5000");
        assert_eq!(format_number(4.8), "4.8");
        assert_eq!(format_number(2.0 / 3.0), "0.67");
        assert_eq!(format_number(-1.5), "-1.5");
        assert_eq!(format_number(-0.004), "0");
        assert_eq!(format_number(-0.0), "0");
    }
}
