//! CSV import/export of tables.

use crate::types::{CommandError, Result, Table};
use std::path::Path;
use tracing::debug;

/// CSV reader/writer for [`Table`]s.
///
/// A header row is required on load and always written on save.
#[derive(Debug, Clone, Copy)]
pub struct CsvCodec {
    delimiter: u8,
}

impl Default for CsvCodec {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvCodec {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Load a table, inferring each column's kind.
    ///
    /// # Errors
    ///
    /// - `IoError` if the file is missing or has no header row
    /// - `CsvError` if a record is malformed or has the wrong number of fields
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Table> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_path(path)?;

        let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if header.is_empty() || header.iter().all(String::is_empty) {
            return Err(CommandError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("'{}' has no header row", path.display()),
            )));
        }

        let mut records = Vec::new();
        for record in reader.records() {
            records.push(record?.iter().map(str::to_string).collect());
        }

        debug!(path = %path.display(), rows = records.len(), columns = header.len(), "csv load");
        Table::from_text(header, records)
    }

    /// Write a table with a header row. Null cells are written empty.
    ///
    /// # Errors
    ///
    /// Returns `CsvError` if the file cannot be created or written
    pub fn save<P: AsRef<Path>>(&self, table: &Table, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_path(path)?;

        writer.write_record(table.column_names())?;
        for row in table.rows() {
            writer.write_record(row.iter().map(|cell| cell.to_string()))?;
        }
        writer.flush()?;

        debug!(path = %path.display(), rows = table.len(), "csv save");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cell, CellKind};
    use tempfile::tempdir;

    #[test]
    fn test_load_infers_types() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("people.csv");
        std::fs::write(&path, "name,age,score\nAnn,31,9.5\nBob,,7\n").unwrap();

        let table = CsvCodec::default().load(&path).unwrap();
        assert_eq!(table.column_names(), vec!["name", "age", "score"]);
        assert_eq!(table.columns()[1].kind, CellKind::Integer);
        assert_eq!(table.columns()[2].kind, CellKind::Float);
        assert_eq!(table.cell(1, 1), Some(&Cell::Null));
        assert_eq!(table.cell(1, 2), Some(&Cell::Float(7.0)));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = CsvCodec::default().load(dir.path().join("nope.csv")).unwrap_err();
        assert_eq!(err.kind(), crate::types::ErrorKind::Io);
    }

    #[test]
    fn test_load_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "").unwrap();
        assert!(CsvCodec::default().load(&path).is_err());
    }

    #[test]
    fn test_save_writes_header_and_quotes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let table = Table::from_text(
            vec!["city".into(), "pop".into()],
            vec![vec!["Porto, PT".into(), "".into()]],
        )
        .unwrap();

        CsvCodec::default().save(&table, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "city,pop\n\"Porto, PT\",\n");
    }

    #[test]
    fn test_custom_delimiter() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("semi.csv");
        std::fs::write(&path, "a;b\n1;x\n").unwrap();

        let codec = CsvCodec::new(b';');
        let table = codec.load(&path).unwrap();
        assert_eq!(table.width(), 2);
        assert_eq!(table.cell(0, 0), Some(&Cell::Integer(1)));
    }
}
