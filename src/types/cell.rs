//! Typed cell values and type inference.
//!
//! A `Cell` is the value held at one row/column position. Kinds are inferred from
//! raw text: integer first, then float, else string. Empty text is `Null`.

use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// One typed value held at a row/column position.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Integer(i64),
    Float(f64),
    String(String),
    Null,
}

/// Kind of a column (and of every non-null cell in it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Integer,
    Float,
    String,
}

impl CellKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, CellKind::Integer | CellKind::Float)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CellKind::Integer => "integer",
            CellKind::Float => "float",
            CellKind::String => "string",
        }
    }
}

impl Cell {
    /// Kind of the cell, `None` for `Null`.
    pub fn kind(&self) -> Option<CellKind> {
        match self {
            Cell::Integer(_) => Some(CellKind::Integer),
            Cell::Float(_) => Some(CellKind::Float),
            Cell::String(_) => Some(CellKind::String),
            Cell::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Cell::Integer(_) | Cell::Float(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(i) => Some(*i as f64),
            Cell::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Infer a single value from raw text (integer, then float, else string).
    pub fn infer(raw: &str) -> Cell {
        if raw.is_empty() {
            return Cell::Null;
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Cell::Integer(i);
        }
        if let Some(f) = parse_float(raw) {
            return Cell::Float(f);
        }
        Cell::String(raw.to_string())
    }

    /// Classify a predicate literal token.
    ///
    /// Only pure digits, or digits with exactly one decimal point, are numeric.
    /// Signs, exponents and whitespace make the token a string.
    pub fn literal(token: &str) -> Cell {
        let dots = token.matches('.').count();
        let digits_only = token.chars().all(|c| c.is_ascii_digit() || c == '.');
        let has_digit = token.chars().any(|c| c.is_ascii_digit());

        if digits_only && has_digit && dots == 0 {
            match token.parse::<i64>() {
                Ok(i) => Cell::Integer(i),
                // Too wide for i64, still numeric
                Err(_) => token
                    .parse::<f64>()
                    .map(Cell::Float)
                    .unwrap_or_else(|_| Cell::String(token.to_string())),
            }
        } else if digits_only && has_digit && dots == 1 {
            token
                .parse::<f64>()
                .map(Cell::Float)
                .unwrap_or_else(|_| Cell::String(token.to_string()))
        } else {
            Cell::String(token.to_string())
        }
    }

    /// Parse a raw field as a value of an already-inferred column kind.
    pub fn parse_as(kind: CellKind, raw: &str) -> Cell {
        if raw.is_empty() {
            return Cell::Null;
        }
        match kind {
            CellKind::Integer => raw
                .parse::<i64>()
                .map(Cell::Integer)
                .unwrap_or_else(|_| Cell::String(raw.to_string())),
            CellKind::Float => parse_float(raw)
                .map(Cell::Float)
                .unwrap_or_else(|| Cell::String(raw.to_string())),
            CellKind::String => Cell::String(raw.to_string()),
        }
    }

    /// Convert the cell to a column of another kind.
    ///
    /// Used when a column is widened: integers become floats, numbers become text.
    pub fn coerce(self, kind: CellKind) -> Cell {
        match (self, kind) {
            (Cell::Null, _) => Cell::Null,
            (Cell::Integer(i), CellKind::Float) => Cell::Float(i as f64),
            (cell @ Cell::Integer(_), CellKind::String)
            | (cell @ Cell::Float(_), CellKind::String) => Cell::String(cell.to_string()),
            (cell, _) => cell,
        }
    }

    /// Type-aware comparison.
    ///
    /// Numbers compare numerically, strings lexically. Any other pairing (including
    /// `Null` on either side) has no valid comparison.
    pub fn compare(&self, other: &Cell) -> Option<Ordering> {
        match (self, other) {
            (Cell::Integer(a), Cell::Integer(b)) => Some(a.cmp(b)),
            (Cell::String(a), Cell::String(b)) => Some(a.cmp(b)),
            (a, b) if a.is_numeric() && b.is_numeric() => {
                let (a, b) = (a.as_f64()?, b.as_f64()?);
                a.partial_cmp(&b)
            }
            _ => None,
        }
    }

    /// Total order used by sorting.
    ///
    /// Falls back to a kind rank (numbers before strings) where `compare` has no answer.
    /// `Null` placement is left to the caller.
    pub fn sort_cmp(&self, other: &Cell) -> Ordering {
        self.compare(other)
            .unwrap_or_else(|| self.rank().cmp(&other.rank()))
    }

    fn rank(&self) -> u8 {
        match self {
            Cell::Integer(_) | Cell::Float(_) => 0,
            Cell::String(_) => 1,
            Cell::Null => 2,
        }
    }

    /// Hashable identity used by grouping, deduplication and joins.
    pub fn key(&self) -> CellKey {
        match self {
            Cell::Integer(i) => CellKey::Integer(*i),
            Cell::Float(f) => {
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                    CellKey::Integer(*f as i64)
                } else if f.is_nan() {
                    CellKey::Float(f64::NAN.to_bits())
                } else {
                    CellKey::Float(f.to_bits())
                }
            }
            Cell::String(s) => CellKey::String(s.clone()),
            Cell::Null => CellKey::Null,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Cell::Integer(i) => Value::from(*i),
            Cell::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Cell::String(s) => Value::String(s.clone()),
            Cell::Null => Value::Null,
        }
    }
}

/// Equality key for a cell; numerically equal integers and floats share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellKey {
    Integer(i64),
    Float(u64),
    String(String),
    Null,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Integer(i) => write!(f, "{}", i),
            Cell::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => {
                write!(f, "{:.1}", v)
            }
            Cell::Float(v) => write!(f, "{}", v),
            Cell::String(s) => f.write_str(s),
            Cell::Null => Ok(()),
        }
    }
}

/// Infer the kind of a whole column and parse every field as that kind.
///
/// A column is integer if every non-empty field is an integer, float if every
/// non-empty field is a number, string otherwise. A column with no values at
/// all is treated as float.
pub fn infer_column(fields: &[&str]) -> (CellKind, Vec<Cell>) {
    let values = fields.iter().filter(|f| !f.is_empty());

    let kind = if values.clone().all(|f| f.parse::<i64>().is_ok()) {
        if fields.iter().all(|f| f.is_empty()) {
            CellKind::Float
        } else {
            CellKind::Integer
        }
    } else if values.clone().all(|f| parse_float(f).is_some()) {
        CellKind::Float
    } else {
        CellKind::String
    };

    let cells = fields.iter().map(|f| Cell::parse_as(kind, f)).collect();
    (kind, cells)
}

/// Parse a float, rejecting words such as `inf` or `NaN` that carry no digit.
fn parse_float(raw: &str) -> Option<f64> {
    if !raw.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_inference() {
        assert_eq!(Cell::literal("100"), Cell::Integer(100));
        assert_eq!(Cell::literal("2.5"), Cell::Float(2.5));
        assert_eq!(Cell::literal(".5"), Cell::Float(0.5));
        assert_eq!(Cell::literal("John"), Cell::String("John".into()));
        // Signs and multiple points are not numeric literals
        assert_eq!(Cell::literal("-5"), Cell::String("-5".into()));
        assert_eq!(Cell::literal("1.2.3"), Cell::String("1.2.3".into()));
        assert_eq!(Cell::literal("."), Cell::String(".".into()));
        assert_eq!(Cell::literal(""), Cell::String(String::new()));
    }

    #[test]
    fn test_infer_single_value() {
        assert_eq!(Cell::infer("42"), Cell::Integer(42));
        assert_eq!(Cell::infer("-3.5"), Cell::Float(-3.5));
        assert_eq!(Cell::infer("nan"), Cell::String("nan".into()));
        assert_eq!(Cell::infer(""), Cell::Null);
    }

    #[test]
    fn test_infer_column() {
        let (kind, cells) = infer_column(&["1", "", "3"]);
        assert_eq!(kind, CellKind::Integer);
        assert_eq!(cells, vec![Cell::Integer(1), Cell::Null, Cell::Integer(3)]);

        let (kind, cells) = infer_column(&["1", "2.5"]);
        assert_eq!(kind, CellKind::Float);
        assert_eq!(cells, vec![Cell::Float(1.0), Cell::Float(2.5)]);

        let (kind, _) = infer_column(&["1", "abc"]);
        assert_eq!(kind, CellKind::String);

        let (kind, cells) = infer_column(&["", ""]);
        assert_eq!(kind, CellKind::Float);
        assert!(cells.iter().all(Cell::is_null));
    }

    #[test]
    fn test_compare() {
        assert_eq!(
            Cell::Integer(3).compare(&Cell::Float(2.5)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Cell::String("a".into()).compare(&Cell::String("b".into())),
            Some(Ordering::Less)
        );
        assert_eq!(Cell::String("5".into()).compare(&Cell::Integer(5)), None);
        assert_eq!(Cell::Null.compare(&Cell::Null), None);
    }

    #[test]
    fn test_key_unifies_numbers() {
        assert_eq!(Cell::Integer(2).key(), Cell::Float(2.0).key());
        assert_ne!(Cell::Integer(2).key(), Cell::String("2".into()).key());
    }

    #[test]
    fn test_display() {
        assert_eq!(Cell::Float(3.0).to_string(), "3.0");
        assert_eq!(Cell::Float(2.25).to_string(), "2.25");
        assert_eq!(Cell::Integer(-7).to_string(), "-7");
        assert_eq!(Cell::Null.to_string(), "");
    }

    #[test]
    fn test_coerce() {
        assert_eq!(Cell::Integer(2).coerce(CellKind::Float), Cell::Float(2.0));
        assert_eq!(
            Cell::Float(1.5).coerce(CellKind::String),
            Cell::String("1.5".into())
        );
        assert_eq!(Cell::Null.coerce(CellKind::String), Cell::Null);
    }
}
