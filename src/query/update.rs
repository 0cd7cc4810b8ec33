//! `UPDATE col = expr WHERE col2 = value` statements.
//!
//! The value side is a closed-form expression (numbers, quoted strings,
//! `+ - * /`, parentheses) evaluated once per statement. The condition side
//! supports equality only. `WHERE` must be written in capitals.

use super::parser::unquote;
use super::predicates::{Operator, Predicate};
use crate::types::{Cell, CommandError, Result, Table};
use std::cmp::Ordering;
use tracing::debug;

/// Parsed UPDATE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    /// Column receiving the new value
    pub target: String,
    /// Value to write
    pub value: Expr,
    /// Equality condition selecting the rows to change (literal kept as text)
    pub condition: Predicate,
}

/// Value expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(Cell),
    Text(String),
    /// Unquoted text containing words, taken as-is
    Verbatim(String),
    Neg(Box<Expr>),
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Parse the argument of an UPDATE command.
///
/// # Errors
///
/// Returns `SyntaxError` when:
/// - `WHERE` does not occur exactly once
/// - either side does not contain exactly one `=`
/// - the condition uses an operator other than `=`
/// - the value expression is malformed
pub fn parse_update(raw: &str) -> Result<UpdateStatement> {
    let clauses: Vec<&str> = raw.split("WHERE").collect();
    if clauses.len() != 2 {
        return Err(CommandError::syntax(
            "expected exactly one WHERE in capitals (UPDATE col = expr WHERE col2 = value)",
        ));
    }
    let (assignment, condition) = (clauses[0], clauses[1]);

    let (target, expression) = split_once_eq(assignment, "assignment")?;
    let target = unquote(target);
    if target.is_empty() {
        return Err(CommandError::syntax("missing column to update"));
    }

    let (column, value) = split_once_eq(condition, "condition")?;
    let (column, value) = (unquote(column), unquote(value));
    if column.ends_with(|c: char| c == '!' || c == '<' || c == '>') {
        return Err(CommandError::syntax(
            "UPDATE conditions support only '='",
        ));
    }
    if column.is_empty() {
        return Err(CommandError::syntax("missing column in WHERE condition"));
    }

    Ok(UpdateStatement {
        target: target.to_string(),
        value: parse_expr(expression)?,
        condition: Predicate::new(column, Operator::Eq, Cell::String(value.to_string())),
    })
}

/// Split on a single `=`.
fn split_once_eq<'a>(raw: &'a str, clause: &str) -> Result<(&'a str, &'a str)> {
    let parts: Vec<&str> = raw.split('=').collect();
    if parts.len() != 2 {
        return Err(CommandError::syntax(format!(
            "{} must contain exactly one '='",
            clause
        )));
    }
    Ok((parts[0], parts[1]))
}

/// Apply an update to a copy of `table`.
///
/// Returns the updated table and the number of rows changed. A row matches
/// when the cell's text equals the value, or when both are numbers that
/// compare equal (`3` matches `3.0`). With no matching row the table comes back
/// unchanged.
///
/// # Errors
///
/// - `ColumnError` if the target or condition column is absent
/// - `SyntaxError` if the value expression cannot be evaluated
pub fn apply_update(table: &Table, statement: &UpdateStatement) -> Result<(Table, usize)> {
    let target = table.column_index(&statement.target)?;
    let condition = table.column_index(&statement.condition.column)?;
    let value = statement.value.evaluate()?;

    let wanted = statement.condition.literal.to_string();
    let wanted_number = Some(Cell::infer(&wanted)).filter(Cell::is_numeric);
    let matching: Vec<usize> = table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            let cell = &row[condition];
            cell.to_string() == wanted
                || wanted_number
                    .as_ref()
                    .is_some_and(|n| cell.compare(n) == Some(Ordering::Equal))
        })
        .map(|(i, _)| i)
        .collect();

    let mut updated = table.clone();
    if !matching.is_empty() {
        updated.overwrite(target, &matching, value);
    }

    debug!(target = %statement.target, rows = matching.len(), "update");
    Ok((updated, matching.len()))
}

impl Expr {
    /// Evaluate the expression. Text results are re-inferred (`"42"` becomes 42).
    ///
    /// # Errors
    ///
    /// Returns `SyntaxError` on division by zero or arithmetic on text
    pub fn evaluate(&self) -> Result<Cell> {
        Ok(match self.eval()? {
            Cell::String(s) => Cell::infer(&s),
            cell => cell,
        })
    }

    fn eval(&self) -> Result<Cell> {
        match self {
            Expr::Number(n) => Ok(n.clone()),
            Expr::Text(s) | Expr::Verbatim(s) => Ok(Cell::String(s.clone())),
            Expr::Neg(inner) => match inner.eval()? {
                Cell::Integer(i) => Ok(i
                    .checked_neg()
                    .map(Cell::Integer)
                    .unwrap_or(Cell::Float(-(i as f64)))),
                Cell::Float(f) => Ok(Cell::Float(-f)),
                _ => Err(CommandError::syntax("cannot negate text")),
            },
            Expr::Binary(lhs, op, rhs) => binary(lhs.eval()?, *op, rhs.eval()?),
        }
    }
}

fn binary(lhs: Cell, op: BinaryOp, rhs: Cell) -> Result<Cell> {
    match (lhs, rhs) {
        (Cell::String(a), Cell::String(b)) if op == BinaryOp::Add => {
            Ok(Cell::String(a + &b))
        }
        (Cell::Integer(a), Cell::Integer(b)) if op != BinaryOp::Div => {
            let exact = match op {
                BinaryOp::Add => a.checked_add(b),
                BinaryOp::Sub => a.checked_sub(b),
                _ => a.checked_mul(b),
            };
            Ok(match exact {
                Some(v) => Cell::Integer(v),
                None => float_op(a as f64, op, b as f64)?,
            })
        }
        (a, b) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => float_op(a, op, b),
            _ => Err(CommandError::syntax(
                "arithmetic on text (only '+' joins two strings)",
            )),
        },
    }
}

fn float_op(a: f64, op: BinaryOp, b: f64) -> Result<Cell> {
    Ok(Cell::Float(match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(CommandError::syntax("division by zero"));
            }
            a / b
        }
    }))
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(Cell),
    Text(String),
    Op(char),
    Open,
    Close,
}

/// Parse a value expression.
///
/// Text with a bare word outside quotes is taken verbatim.
pub fn parse_expr(raw: &str) -> Result<Expr> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CommandError::syntax("missing value expression"));
    }
    if has_bare_word(raw) {
        return Ok(Expr::Verbatim(unquote(raw).to_string()));
    }

    let tokens = tokenize(raw)?;
    let mut parser = ExprParser { tokens, pos: 0 };
    let expr = parser.sum()?;
    if parser.pos != parser.tokens.len() {
        return Err(CommandError::syntax(format!(
            "unexpected input in expression '{}'",
            raw
        )));
    }
    Ok(expr)
}

fn has_bare_word(raw: &str) -> bool {
    let mut quote: Option<char> = None;
    for c in raw.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c.is_whitespace() || c.is_ascii_digit() || "+-*/().".contains(c) => {}
            None => return true,
        }
    }
    false
}

fn tokenize(raw: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = raw.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '(' => tokens.push(Token::Open),
            ')' => tokens.push(Token::Close),
            '+' | '-' | '*' | '/' => tokens.push(Token::Op(c)),
            '"' | '\'' => {
                let mut text = String::new();
                let mut closed = false;
                for (_, d) in chars.by_ref() {
                    if d == c {
                        closed = true;
                        break;
                    }
                    text.push(d);
                }
                if !closed {
                    return Err(CommandError::syntax("unterminated string in expression"));
                }
                tokens.push(Token::Text(text));
            }
            _ => {
                let mut end = start + c.len_utf8();
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        end = i + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let literal = &raw[start..end];
                let number = literal
                    .parse::<i64>()
                    .map(Cell::Integer)
                    .or_else(|_| literal.parse::<f64>().map(Cell::Float))
                    .map_err(|_| CommandError::syntax(format!("invalid number '{}'", literal)))?;
                tokens.push(Token::Number(number));
            }
        }
    }

    Ok(tokens)
}

/// Recursive-descent parser: sum := product (('+'|'-') product)*,
/// product := unary (('*'|'/') unary)*, unary := '-' unary | atom.
struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl ExprParser {
    fn peek_op(&self, ops: &[char]) -> Option<char> {
        match self.tokens.get(self.pos) {
            Some(Token::Op(c)) if ops.contains(c) => Some(*c),
            _ => None,
        }
    }

    fn sum(&mut self) -> Result<Expr> {
        let mut lhs = self.product()?;
        while let Some(c) = self.peek_op(&['+', '-']) {
            self.pos += 1;
            let op = if c == '+' { BinaryOp::Add } else { BinaryOp::Sub };
            lhs = Expr::Binary(Box::new(lhs), op, Box::new(self.product()?));
        }
        Ok(lhs)
    }

    fn product(&mut self) -> Result<Expr> {
        let mut lhs = self.unary()?;
        while let Some(c) = self.peek_op(&['*', '/']) {
            self.pos += 1;
            let op = if c == '*' { BinaryOp::Mul } else { BinaryOp::Div };
            lhs = Expr::Binary(Box::new(lhs), op, Box::new(self.unary()?));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr> {
        if self.peek_op(&['-']).is_some() {
            self.pos += 1;
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<Expr> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| CommandError::syntax("expression ends unexpectedly"))?;
        self.pos += 1;

        match token {
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::Text(s) => Ok(Expr::Text(s)),
            Token::Open => {
                let inner = self.sum()?;
                match self.tokens.get(self.pos) {
                    Some(Token::Close) => {
                        self.pos += 1;
                        Ok(inner)
                    }
                    _ => Err(CommandError::syntax("missing ')' in expression")),
                }
            }
            Token::Close | Token::Op(_) => Err(CommandError::syntax(
                "expected a number, string or '(' in expression",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellKind;

    fn eval(raw: &str) -> Cell {
        parse_expr(raw).unwrap().evaluate().unwrap()
    }

    #[test]
    fn test_parse_update() {
        let stmt = parse_update("price = 10 * 2 WHERE \"name\" = 'apple'").unwrap();
        assert_eq!(stmt.target, "price");
        assert_eq!(stmt.condition.column, "name");
        assert_eq!(stmt.condition.literal, Cell::String("apple".into()));
        assert_eq!(stmt.value.evaluate().unwrap(), Cell::Integer(20));
    }

    #[test]
    fn test_parse_update_clause_counts() {
        assert!(parse_update("price = 1").is_err());
        assert!(parse_update("price = 1 WHERE a = 1 WHERE b = 2").is_err());
        assert!(parse_update("price 1 WHERE a = 1").is_err());
        assert!(parse_update("price = 1 WHERE a = 1 = 2").is_err());
    }

    #[test]
    fn test_condition_is_equality_only() {
        let err = parse_update("price = 1 WHERE qty >= 3").unwrap_err();
        assert!(err.to_string().contains("only '='"));
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("1 + 2 * 3"), Cell::Integer(7));
        assert_eq!(eval("(1 + 2) * 3"), Cell::Integer(9));
        assert_eq!(eval("10 / 4"), Cell::Float(2.5));
        assert_eq!(eval("-2.5 + 1"), Cell::Float(-1.5));
        assert_eq!(eval("- (3 - 5)"), Cell::Integer(2));
    }

    #[test]
    fn test_text_values() {
        assert_eq!(eval("'done'"), Cell::String("done".into()));
        assert_eq!(eval("'foo' + \"bar\""), Cell::String("foobar".into()));
        assert_eq!(eval("in progress"), Cell::String("in progress".into()));
        // Text results are re-inferred
        assert_eq!(eval("'42'"), Cell::Integer(42));
    }

    #[test]
    fn test_bad_expressions() {
        assert!(parse_expr("1 +").is_err());
        assert!(parse_expr("(1 + 2").is_err());
        assert!(parse_expr("'open").is_err());
        assert!(parse_expr("1.2.3").is_err());
        assert!(parse_expr("").is_err());

        let div = parse_expr("1 / 0").unwrap();
        assert!(div.evaluate().is_err());
        let mixed = parse_expr("'a' * 2").unwrap();
        assert!(mixed.evaluate().is_err());
    }

    #[test]
    fn test_apply_update() {
        let table = Table::from_text(
            vec!["name".into(), "qty".into()],
            vec![
                vec!["apple".into(), "1".into()],
                vec!["pear".into(), "2".into()],
                vec!["apple".into(), "3".into()],
            ],
        )
        .unwrap();

        let stmt = parse_update("qty = 5 * 2 WHERE name = apple").unwrap();
        let (updated, changed) = apply_update(&table, &stmt).unwrap();
        assert_eq!(changed, 2);
        assert_eq!(updated.cell(0, 1), Some(&Cell::Integer(10)));
        assert_eq!(updated.cell(1, 1), Some(&Cell::Integer(2)));
        assert_eq!(updated.cell(2, 1), Some(&Cell::Integer(10)));
        // The source table is untouched
        assert_eq!(table.cell(0, 1), Some(&Cell::Integer(1)));

        let stmt = parse_update("total = 1 WHERE name = apple").unwrap();
        let err = apply_update(&table, &stmt).unwrap_err();
        assert!(matches!(err, CommandError::ColumnError(_)));
    }

    #[test]
    fn test_update_without_match_leaves_table() {
        let table = Table::from_text(
            vec!["item".into(), "qty".into()],
            vec![
                vec!["pen".into(), "1".into()],
                vec!["cup".into(), "2".into()],
            ],
        )
        .unwrap();

        let stmt = parse_update("qty = 'n/a' WHERE item = nothing").unwrap();
        let (updated, changed) = apply_update(&table, &stmt).unwrap();
        assert_eq!(changed, 0);
        assert_eq!(updated.columns()[1].kind, CellKind::Integer);
        assert_eq!(updated, table);
    }

    #[test]
    fn test_numeric_condition_matches_by_value() {
        let table = Table::from_text(
            vec!["item".into(), "price".into()],
            vec![
                vec!["pen".into(), "3".into()],
                vec!["cup".into(), "2.50".into()],
                vec!["mug".into(), "4.5".into()],
            ],
        )
        .unwrap();

        // The column is float, so the first cell reads as 3.0
        let stmt = parse_update("item = 'sale' WHERE price = 3").unwrap();
        let (updated, changed) = apply_update(&table, &stmt).unwrap();
        assert_eq!(changed, 1);
        assert_eq!(updated.cell(0, 0), Some(&Cell::String("sale".into())));

        let stmt = parse_update("item = 'sale' WHERE price = 2.50").unwrap();
        let (updated, changed) = apply_update(&table, &stmt).unwrap();
        assert_eq!(changed, 1);
        assert_eq!(updated.cell(1, 0), Some(&Cell::String("sale".into())));
    }

    #[test]
    fn test_where_keyword_is_uppercase() {
        let err = parse_update("qty = 1 where item = pen").unwrap_err();
        assert!(err.to_string().contains("WHERE in capitals"));
    }
}
