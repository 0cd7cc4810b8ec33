//! Predicate-based row filtering
//!
//! A predicate is a single column/operator/literal comparison evaluated against
//! the cell a row holds for that column.

use crate::types::Cell;
use std::cmp::Ordering;
use std::fmt;

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// field == value
    Eq,
    /// field != value
    Ne,
    /// field > value
    Gt,
    /// field >= value
    Gte,
    /// field < value
    Lt,
    /// field <= value
    Lte,
}

impl Operator {
    /// Operators in the order the condition parser tries them.
    ///
    /// Two-character operators come first so `>=` is never split as `>`.
    pub const BY_PRIORITY: [Operator; 6] = [
        Operator::Gte,
        Operator::Lte,
        Operator::Ne,
        Operator::Eq,
        Operator::Gt,
        Operator::Lt,
    ];

    /// Token the operator is written as in a command.
    pub fn token(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }

    /// Canonical symbol (`=` normalizes to `==`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            other => other.token(),
        }
    }

    /// Whether an ordering between cell and literal satisfies the operator.
    pub fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering == Ordering::Equal,
            Self::Ne => ordering != Ordering::Equal,
            Self::Gt => ordering == Ordering::Greater,
            Self::Gte => ordering != Ordering::Less,
            Self::Lt => ordering == Ordering::Less,
            Self::Lte => ordering != Ordering::Greater,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single comparison used to keep or reject rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub operator: Operator,
    pub literal: Cell,
}

impl Predicate {
    pub fn new(column: impl Into<String>, operator: Operator, literal: Cell) -> Self {
        Self {
            column: column.into(),
            operator,
            literal,
        }
    }

    /// Evaluate the predicate against the cell a row holds for `self.column`.
    ///
    /// Cells whose kind has no valid comparison with the literal never match.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tabsh::query::{Operator, Predicate};
    /// use tabsh::types::Cell;
    ///
    /// let pred = Predicate::new("age", Operator::Gt, Cell::Integer(30));
    /// assert!(pred.evaluate(&Cell::Integer(31)));
    /// assert!(!pred.evaluate(&Cell::String("31".into())));
    /// ```
    pub fn evaluate(&self, cell: &Cell) -> bool {
        cell.compare(&self.literal)
            .map(|ordering| self.operator.accepts(ordering))
            .unwrap_or(false)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.literal {
            Cell::String(s) => write!(f, "{} {} '{}'", self.column, self.operator, s),
            literal => write!(f, "{} {} {}", self.column, self.operator, literal),
        }
    }
}
