//! Check Document Parser
//!
//! Parses the YAML-like check document submitted with a validation run.
//!
//! # Document Syntax
//!
//! ```text
//! # comment
//! checks for customers:
//!   - row_count > 0
//!   - missing_count(customer_id) = 0
//!   - duplicate_count(email) = 0
//!   - warn: avg_length(name) between 5 and 30
//!   - values in (status) in ('active', 'inactive', 'pending')
//! ```
//!
//! # Check Syntax
//!
//! ```text
//! [warn:] row_count|missing_count(col)|duplicate_count(col)|avg_length(col)|min(col)|max(col)
//!         (= | != | < | <= | > | >=) <number> | between <number> and <number>
//! [warn:] values in (col) in (<value>, ...)
//! ```

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while, take_while1},
    character::complete::{char, digit1, multispace0, multispace1},
    combinator::{map, map_res, opt, recognize, value, verify},
    multi::separated_list1,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use crate::checks::ast::*;
use crate::checks::error::{CheckError, CheckResult};

/// Parse a full check document
pub fn parse_document(input: &str) -> CheckResult<CheckDocument> {
    let mut sections: Vec<CheckSection> = Vec::new();

    for (idx, raw) in input.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(item) = trimmed.strip_prefix('-') {
            let section = sections.last_mut().ok_or_else(|| CheckError::Syntax {
                line,
                message: "check listed outside of a 'checks for <table>:' section".to_string(),
            })?;
            section.checks.push(parse_check(unquote(item.trim()), line)?);
            continue;
        }

        match section_header(trimmed) {
            Ok((rest, table)) if rest.trim().is_empty() => sections.push(CheckSection {
                table: table.to_string(),
                checks: Vec::new(),
            }),
            _ => {
                return Err(CheckError::Syntax {
                    line,
                    message: format!(
                        "expected 'checks for <table>:' or '- <check>', found '{}'",
                        trimmed
                    ),
                })
            }
        }
    }

    let document = CheckDocument { sections };
    if document.is_empty() {
        return Err(CheckError::Empty);
    }

    Ok(document)
}

/// Parse a single check definition found on `line`
pub fn parse_check(definition: &str, line: usize) -> CheckResult<CheckDef> {
    let definition = definition.trim();
    let invalid = |message: String| CheckError::InvalidCheck {
        line,
        definition: definition.to_string(),
        message,
    };

    let (rest, (severity, kind)) =
        check_line(definition).map_err(|_| invalid("unrecognized check".to_string()))?;

    if !rest.trim().is_empty() {
        return Err(invalid(format!("unexpected input '{}'", rest.trim())));
    }

    if let CheckKind::Threshold {
        threshold: Threshold::Between(low, high),
        ..
    } = kind
    {
        if low > high {
            return Err(invalid(format!(
                "lower bound {} is greater than upper bound {}",
                low, high
            )));
        }
    }

    Ok(CheckDef {
        definition: definition.to_string(),
        line,
        severity,
        kind,
    })
}

/// Strip one pair of matching surrounding quotes
fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Parse `checks for <table>:`
fn section_header(input: &str) -> IResult<&str, &str> {
    let (input, _) = tag_no_case("checks")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = tag_no_case("for")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, table) = take_while1(|c: char| c != ':')(input)?;
    let (input, _) = char(':')(input)?;

    Ok((input, table.trim()))
}

/// Parse a check with optional severity prefix
fn check_line(input: &str) -> IResult<&str, (Severity, CheckKind)> {
    let (input, severity) = parse_severity(input)?;
    let (input, kind) = alt((parse_values_in, parse_threshold_check))(input)?;

    Ok((input, (severity, kind)))
}

/// Parse the optional `warn:` prefix
fn parse_severity(input: &str) -> IResult<&str, Severity> {
    map(
        opt(terminated(tag_no_case("warn:"), multispace0)),
        |prefix: Option<&str>| {
            if prefix.is_some() {
                Severity::Warn
            } else {
                Severity::Fail
            }
        },
    )(input)
}

/// Parse `values in (col) in ('a', 'b')`
fn parse_values_in(input: &str) -> IResult<&str, CheckKind> {
    let (input, _) = tag_no_case("values")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = tag_no_case("in")(input)?;
    let (input, _) = multispace0(input)?;
    let (input, column) = parse_column(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = tag_no_case("in")(input)?;
    let (input, _) = multispace0(input)?;
    let (input, allowed) = delimited(
        pair(char('('), multispace0),
        separated_list1(
            delimited(multispace0, char(','), multispace0),
            parse_literal,
        ),
        pair(multispace0, char(')')),
    )(input)?;

    Ok((input, CheckKind::ValuesIn { column, allowed }))
}

/// Parse `metric threshold`
fn parse_threshold_check(input: &str) -> IResult<&str, CheckKind> {
    let (input, metric) = parse_metric(input)?;
    let (input, _) = multispace0(input)?;
    let (input, threshold) = parse_threshold(input)?;

    Ok((input, CheckKind::Threshold { metric, threshold }))
}

/// Parse a metric like `row_count` or `missing_count(email)`
fn parse_metric(input: &str) -> IResult<&str, Metric> {
    alt((
        value(Metric::RowCount, tag_no_case("row_count")),
        map(column_fn("missing_count"), Metric::MissingCount),
        map(column_fn("duplicate_count"), Metric::DuplicateCount),
        map(column_fn("avg_length"), Metric::AvgLength),
        map(column_fn("min"), Metric::Min),
        map(column_fn("max"), Metric::Max),
    ))(input)
}

/// Parser for `<name>(<column>)`
fn column_fn(name: &'static str) -> impl FnMut(&str) -> IResult<&str, String> {
    move |input| preceded(pair(tag_no_case(name), multispace0), parse_column)(input)
}

/// Parse a parenthesized column name
fn parse_column(input: &str) -> IResult<&str, String> {
    map(
        delimited(
            char('('),
            verify(take_while1(|c: char| c != ')' && c != '('), |s: &str| {
                !s.trim().is_empty()
            }),
            char(')'),
        ),
        |s: &str| s.trim().to_string(),
    )(input)
}

/// Parse a threshold: comparison or `between a and b`
fn parse_threshold(input: &str) -> IResult<&str, Threshold> {
    alt((parse_between, parse_comparison))(input)
}

fn parse_between(input: &str) -> IResult<&str, Threshold> {
    let (input, _) = tag_no_case("between")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, low) = parse_number(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = tag_no_case("and")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, high) = parse_number(input)?;

    Ok((input, Threshold::Between(low, high)))
}

fn parse_comparison(input: &str) -> IResult<&str, Threshold> {
    let (input, op) = parse_operator(input)?;
    let (input, _) = multispace0(input)?;
    let (input, limit) = parse_number(input)?;

    Ok((input, Threshold::Compare(op, limit)))
}

/// Parse comparison operator
fn parse_operator(input: &str) -> IResult<&str, Operator> {
    alt((
        value(Operator::Ge, tag(">=")),
        value(Operator::Le, tag("<=")),
        value(Operator::Ne, tag("!=")),
        value(Operator::Ne, tag("<>")),
        value(Operator::Eq, tag("==")),
        value(Operator::Eq, tag("=")),
        value(Operator::Gt, tag(">")),
        value(Operator::Lt, tag("<")),
    ))(input)
}

/// Parse a (possibly negative, possibly fractional) number
fn parse_number(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize(tuple((
            opt(char('-')),
            digit1,
            opt(pair(char('.'), digit1)),
        ))),
        |s: &str| s.parse::<f64>(),
    )(input)
}

/// Parse a quoted or bare literal in a value list
fn parse_literal(input: &str) -> IResult<&str, String> {
    map(
        alt((
            delimited(char('\''), take_while(|c: char| c != '\''), char('\'')),
            delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
            take_while1(|c: char| !c.is_whitespace() && c != ',' && c != ')'),
        )),
        |s: &str| s.to_string(),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "# Example configuration
checks for customers:
  - row_count > 0
  - missing_count(customer_id) = 0
  - duplicate_count(email) = 0
  - warn: avg_length(name) between 5 and 30
  - values in (status) in ('active', 'inactive', 'pending')
";

    #[test]
    fn test_parse_sample_document() {
        let doc = parse_document(SAMPLE).unwrap();
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].table, "customers");
        assert_eq!(doc.len(), 5);

        let checks: Vec<&CheckDef> = doc.checks().collect();
        assert_eq!(checks[0].line, 3);
        assert_eq!(checks[0].definition, "row_count > 0");
        assert_eq!(
            checks[0].kind,
            CheckKind::Threshold {
                metric: Metric::RowCount,
                threshold: Threshold::Compare(Operator::Gt, 0.0),
            }
        );
        assert_eq!(checks[3].severity, Severity::Warn);
        assert_eq!(
            checks[3].kind,
            CheckKind::Threshold {
                metric: Metric::AvgLength("name".to_string()),
                threshold: Threshold::Between(5.0, 30.0),
            }
        );
        assert_eq!(
            checks[4].kind,
            CheckKind::ValuesIn {
                column: "status".to_string(),
                allowed: vec![
                    "active".to_string(),
                    "inactive".to_string(),
                    "pending".to_string()
                ],
            }
        );
    }

    #[test]
    fn test_parse_operators() {
        let cases = [
            ("row_count = 10", Operator::Eq),
            ("row_count == 10", Operator::Eq),
            ("row_count != 10", Operator::Ne),
            ("row_count < 10", Operator::Lt),
            ("row_count <= 10", Operator::Le),
            ("row_count > 10", Operator::Gt),
            ("row_count>=10", Operator::Ge),
        ];

        for (text, op) in cases {
            let def = parse_check(text, 1).unwrap();
            assert_eq!(
                def.kind,
                CheckKind::Threshold {
                    metric: Metric::RowCount,
                    threshold: Threshold::Compare(op, 10.0),
                },
                "{}",
                text
            );
        }
    }

    #[test]
    fn test_parse_min_max_with_decimals() {
        let def = parse_check("min(price) >= -1.5", 1).unwrap();
        assert_eq!(
            def.kind,
            CheckKind::Threshold {
                metric: Metric::Min("price".to_string()),
                threshold: Threshold::Compare(Operator::Ge, -1.5),
            }
        );

        let def = parse_check("MAX( price ) < 100", 1).unwrap();
        assert_eq!(def.kind.column(), Some("price"));
    }

    #[test]
    fn test_parse_quoted_item() {
        let doc = parse_document("checks for t:\n  - \"row_count > 0\"\n").unwrap();
        assert_eq!(doc.checks().next().unwrap().definition, "row_count > 0");
    }

    #[test]
    fn test_parse_multiple_sections() {
        let doc = parse_document(
            "checks for orders:\n  - row_count > 0\n\nchecks for items:\n  - missing_count(sku) = 0\n",
        )
        .unwrap();
        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[1].table, "items");
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_check_outside_section() {
        let err = parse_document("- row_count > 0").unwrap_err();
        assert!(matches!(err, CheckError::Syntax { line: 1, .. }));
    }

    #[test]
    fn test_unknown_line() {
        let err = parse_document("checks for t:\n  - row_count > 0\nnonsense here").unwrap_err();
        assert!(matches!(err, CheckError::Syntax { line: 3, .. }));
    }

    #[test]
    fn test_invalid_check() {
        let err = parse_document("checks for t:\n  - row_count >\n").unwrap_err();
        assert!(matches!(err, CheckError::InvalidCheck { line: 2, .. }));

        assert!(parse_check("missing_count() = 0", 1).is_err());
        assert!(parse_check("row_count > 0 extra", 1).is_err());
        assert!(parse_check("freshness(ts) < 1d", 1).is_err());
    }

    #[test]
    fn test_between_bounds_order() {
        let err = parse_check("avg_length(name) between 30 and 5", 4).unwrap_err();
        assert!(matches!(err, CheckError::InvalidCheck { line: 4, .. }));
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(parse_document("").unwrap_err(), CheckError::Empty);
        assert_eq!(
            parse_document("# nothing\nchecks for t:\n").unwrap_err(),
            CheckError::Empty
        );
    }
}
