//! Core data types for the interpreter.
//!
//! Defines fundamental types used throughout the system:
//! - `Cell`: Typed value at a row/column position
//! - `Table`: Ordered columns and rows with per-column kinds
//! - `CommandError`: Error types for all commands
//! - `Result`: Convenient result type alias

pub mod cell;
pub mod error;
pub mod table;

pub use cell::{Cell, CellKey, CellKind};
pub use error::{CommandError, ErrorKind, Result};
pub use table::{Column, Table};
