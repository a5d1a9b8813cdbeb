//! Check Engine
//!
//! The validation engine behind `POST /validation/run`:
//!
//! - **AST**: Check document types
//! - **Parser**: Parse the YAML-like check document into the AST
//! - **Evaluator**: Run checks against a CSV table
//!
//! # Check Document
//!
//! ```text
//! checks for customers:
//!   - row_count > 0
//!   - missing_count(customer_id) = 0
//!   - duplicate_count(email) = 0
//!   - warn: avg_length(name) between 5 and 30
//!   - values in (status) in ('active', 'inactive', 'pending')
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use dqdash::checks::{parse_document, Evaluator};
//! use dqdash::datasets::Table;
//!
//! let document = parse_document("checks for t:\n  - row_count > 0\n")?;
//! let table = Table::from_path(Path::new("uploads/customers.csv"))?;
//! let evaluation = Evaluator::default().evaluate(&document, &table);
//! ```

mod ast;
mod error;
mod evaluator;
mod parser;

pub use ast::{
    CheckDef, CheckDocument, CheckKind, CheckSection, Metric, Operator, Severity, Threshold,
};
pub use error::{CheckError, CheckResult};
pub use evaluator::{
    format_number, Evaluation, EvaluationOptions, Evaluator, DEFAULT_MAX_INVALID_RECORDS,
};
pub use parser::{parse_check, parse_document};
