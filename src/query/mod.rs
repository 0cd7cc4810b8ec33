//! Condition parsing and relational execution.
//!
//! - `parser`: textual comparisons into [`Predicate`]s
//! - `predicates`: operators and predicate evaluation
//! - `executor`: filter, select, sort, group, join, dedupe
//! - `update`: `UPDATE ... WHERE ...` statements

pub mod executor;
pub mod parser;
pub mod predicates;
pub mod update;

pub use executor::{dedupe, filter, group, join, select, sort, Order};
pub use parser::{parse_column_list, parse_condition, split_condition, unquote};
pub use predicates::{Operator, Predicate};
pub use update::{apply_update, parse_update, Expr, UpdateStatement};
