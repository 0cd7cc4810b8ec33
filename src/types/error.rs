//! Error types for interpreter commands.
//!
//! Uses `thiserror` for ergonomic error definitions with automatic `From` implementations.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CommandError>;

/// Error raised by a single command.
///
/// The shell renders every variant as one line and keeps accepting commands.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Malformed command argument (missing operator, bad quoting, wrong clause count)
    #[error("Syntax error: {0}")]
    SyntaxError(String),

    /// Referenced column absent from the table, or task absent from the project
    #[error("Column error: {0}")]
    ColumnError(String),

    /// Operation requires a table or project that does not exist yet
    #[error("State error: {0}")]
    StateError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Coarse error taxonomy shared by every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Column,
    Io,
    State,
}

impl CommandError {
    pub fn syntax(msg: impl Into<String>) -> Self {
        Self::SyntaxError(msg.into())
    }

    pub fn column(msg: impl Into<String>) -> Self {
        Self::ColumnError(msg.into())
    }

    pub fn state(msg: impl Into<String>) -> Self {
        Self::StateError(msg.into())
    }

    /// Error for a column name that is not part of a table.
    pub fn unknown_column(name: &str) -> Self {
        Self::ColumnError(format!("column '{}' not found", name))
    }

    /// Map the error onto the four-way taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SyntaxError(_) => ErrorKind::Syntax,
            Self::ColumnError(_) => ErrorKind::Column,
            Self::StateError(_) => ErrorKind::State,
            Self::IoError(_) | Self::CsvError(_) | Self::JsonError(_) | Self::ConfigError(_) => {
                ErrorKind::Io
            }
        }
    }
}
