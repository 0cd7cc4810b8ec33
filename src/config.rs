//! Interpreter configuration.
//!
//! Read from a JSON file: an explicit path, else `~/.tabsh/config.json` if it
//! exists, else built-in defaults. Missing keys take their default.

use crate::project::DEFAULT_STATUS;
use crate::types::{CommandError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Interpreter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// CSV field delimiter (single ASCII character)
    pub delimiter: char,
    /// SHOW prints at most this many rows (head and tail)
    pub show_max_rows: usize,
    /// Default EXPORT_JSON name after a FILTER: `<prefix><literal>.json`
    pub filtered_export_prefix: String,
    /// Default EXPORT_JSON name when no filter has run
    pub default_export_name: String,
    /// Status of newly added tasks
    pub default_task_status: String,
    /// Pretty-print EXPORT_JSON output
    pub pretty_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delimiter: ',',
            show_max_rows: 60,
            filtered_export_prefix: "vendas_".to_string(),
            default_export_name: "dados_exportados.json".to_string(),
            default_task_status: DEFAULT_STATUS.to_string(),
            pretty_json: false,
        }
    }
}

impl Config {
    /// Get default config directory (~/.tabsh/).
    pub fn config_dir() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .map_err(|_| CommandError::ConfigError("HOME not set".to_string()))?;
        Ok(PathBuf::from(home).join(".tabsh"))
    }

    /// Get default config file path (~/.tabsh/config.json).
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default file is used when
    /// present and defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::config_file() {
                Ok(file) if file.exists() => Self::from_file(&file),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CommandError::ConfigError(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| CommandError::ConfigError(format!("Serialize error: {}", e)))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !self.delimiter.is_ascii() || self.delimiter == '"' || self.delimiter == '\n' {
            return Err(CommandError::ConfigError(format!(
                "delimiter must be a single ASCII character other than quote or newline, got {:?}",
                self.delimiter
            )));
        }
        if self.show_max_rows == 0 {
            return Err(CommandError::ConfigError(
                "show_max_rows must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Delimiter as a byte for the CSV codec.
    pub fn delimiter_byte(&self) -> u8 {
        // Validated ASCII on load; fall back to comma for hand-built configs
        u8::try_from(self.delimiter).unwrap_or(b',')
    }
}
