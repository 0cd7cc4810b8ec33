//! Condition parser.
//!
//! Turns a raw comparison such as `price >= 100` or `"name" = 'John'` into a
//! [`Predicate`].

use super::predicates::{Operator, Predicate};
use crate::types::{Cell, CommandError, Result};

/// Parse a comparison expression.
///
/// Operators are tried in the fixed order `>=, <=, !=, =, >, <` and the text is
/// split on the first occurrence of the first operator present. The left side
/// (trimmed, unquoted) names the column; the right side is the literal, typed by
/// [`Cell::literal`].
///
/// # Errors
///
/// Returns `SyntaxError` if no operator is present or either side is empty
pub fn parse_condition(raw: &str) -> Result<Predicate> {
    let (column, operator, token) = split_condition(raw)?;
    Ok(Predicate::new(column, operator, Cell::literal(token)))
}

/// Split a comparison into column, operator and raw literal token.
pub fn split_condition(raw: &str) -> Result<(&str, Operator, &str)> {
    let (operator, position) = Operator::BY_PRIORITY
        .iter()
        .find_map(|op| raw.find(op.token()).map(|pos| (*op, pos)))
        .ok_or_else(|| {
            CommandError::syntax(format!(
                "no comparison operator in '{}' (use =, >, <, >=, <= or !=)",
                raw.trim()
            ))
        })?;

    let column = unquote(&raw[..position]);
    let token = unquote(&raw[position + operator.token().len()..]);

    if column.is_empty() {
        return Err(CommandError::syntax(format!(
            "missing column before '{}'",
            operator.token()
        )));
    }
    if token.is_empty() {
        return Err(CommandError::syntax(format!(
            "missing value after '{}'",
            operator.token()
        )));
    }

    Ok((column, operator, token))
}

/// Trim whitespace, then surrounding double quotes, then surrounding single quotes.
pub fn unquote(raw: &str) -> &str {
    raw.trim().trim_matches('"').trim_matches('\'')
}

/// Split a comma-separated column list into unquoted names.
pub fn parse_column_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|c| unquote(c).to_string()).collect()
}
