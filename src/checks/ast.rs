//! Check document AST
//!
//! A parsed document is a list of sections (`checks for <table>:`), each
//! holding the checks listed under it.

/// A parsed check document
#[derive(Debug, Clone, PartialEq)]
pub struct CheckDocument {
    pub sections: Vec<CheckSection>,
}

impl CheckDocument {
    /// All checks in document order
    pub fn checks(&self) -> impl Iterator<Item = &CheckDef> {
        self.sections.iter().flat_map(|s| s.checks.iter())
    }

    /// Total number of checks across sections
    pub fn len(&self) -> usize {
        self.sections.iter().map(|s| s.checks.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A `checks for <table>:` block
#[derive(Debug, Clone, PartialEq)]
pub struct CheckSection {
    /// Table named in the header (informational)
    pub table: String,
    pub checks: Vec<CheckDef>,
}

/// A single check as written in the document
#[derive(Debug, Clone, PartialEq)]
pub struct CheckDef {
    /// Check text without the leading `- `
    pub definition: String,
    /// 1-based line in the document
    pub line: usize,
    pub severity: Severity,
    pub kind: CheckKind,
}

/// What a violated check reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Violation is a failure
    Fail,
    /// Violation is a warning (`warn:` prefix)
    Warn,
}

/// The check itself
#[derive(Debug, Clone, PartialEq)]
pub enum CheckKind {
    /// A measured metric compared against a threshold
    Threshold { metric: Metric, threshold: Threshold },
    /// Every non-missing value of `column` must be in `allowed`
    ValuesIn { column: String, allowed: Vec<String> },
}

impl CheckKind {
    /// Display name, e.g. `missing_count(email)` or `values in (status)`
    pub fn name(&self) -> String {
        match self {
            CheckKind::Threshold { metric, .. } => metric.name(),
            CheckKind::ValuesIn { column, .. } => format!("values in ({})", column),
        }
    }

    /// Column the check reads, if any
    pub fn column(&self) -> Option<&str> {
        match self {
            CheckKind::Threshold { metric, .. } => metric.column(),
            CheckKind::ValuesIn { column, .. } => Some(column),
        }
    }
}

/// Measurable table properties
#[derive(Debug, Clone, PartialEq)]
pub enum Metric {
    RowCount,
    MissingCount(String),
    DuplicateCount(String),
    AvgLength(String),
    Min(String),
    Max(String),
}

impl Metric {
    pub fn name(&self) -> String {
        match self {
            Metric::RowCount => "row_count".to_string(),
            Metric::MissingCount(c) => format!("missing_count({})", c),
            Metric::DuplicateCount(c) => format!("duplicate_count({})", c),
            Metric::AvgLength(c) => format!("avg_length({})", c),
            Metric::Min(c) => format!("min({})", c),
            Metric::Max(c) => format!("max({})", c),
        }
    }

    pub fn column(&self) -> Option<&str> {
        match self {
            Metric::RowCount => None,
            Metric::MissingCount(c)
            | Metric::DuplicateCount(c)
            | Metric::AvgLength(c)
            | Metric::Min(c)
            | Metric::Max(c) => Some(c),
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Acceptance condition for a measured value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    Compare(Operator, f64),
    /// Inclusive range
    Between(f64, f64),
}

impl Threshold {
    /// Whether `value` satisfies the threshold
    pub fn accepts(&self, value: f64) -> bool {
        match *self {
            Threshold::Compare(op, limit) => match op {
                Operator::Eq => (value - limit).abs() < f64::EPSILON,
                Operator::Ne => (value - limit).abs() >= f64::EPSILON,
                Operator::Lt => value < limit,
                Operator::Le => value <= limit,
                Operator::Gt => value > limit,
                Operator::Ge => value >= limit,
            },
            Threshold::Between(low, high) => value >= low && value <= high,
        }
    }
}
