//! JSON export: an array of row objects keyed by column name.

use crate::types::{Result, Table};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// JSON exporter.
pub struct JsonExporter;

impl JsonExporter {
    /// Convert a table to a JSON array of records, keys in column order.
    pub fn to_value(table: &Table) -> Value {
        let names = table.column_names();
        Value::Array(
            table
                .rows()
                .iter()
                .map(|row| {
                    let record: Map<String, Value> = names
                        .iter()
                        .zip(row)
                        .map(|(name, cell)| (name.to_string(), cell.to_json()))
                        .collect();
                    Value::Object(record)
                })
                .collect(),
        )
    }

    /// Export a table to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `IoError` or `JsonError` if the file cannot be written
    pub fn export<P: AsRef<Path>>(table: &Table, path: P, pretty: bool) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        let value = Self::to_value(table);
        if pretty {
            serde_json::to_writer_pretty(&mut writer, &value)?;
        } else {
            serde_json::to_writer(&mut writer, &value)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_records_keep_column_order() {
        let table = Table::from_text(
            vec!["z".into(), "a".into()],
            vec![vec!["1".into(), "x".into()], vec!["".into(), "y".into()]],
        )
        .unwrap();

        let value = JsonExporter::to_value(&table);
        assert_eq!(value, json!([{"z": 1, "a": "x"}, {"z": null, "a": "y"}]));
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"[{"z":1,"a":"x"},{"z":null,"a":"y"}]"#
        );
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        let table = Table::from_text(vec!["n".into()], vec![vec!["2.5".into()]]).unwrap();

        JsonExporter::export(&table, &path, false).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"[{"n":2.5}]"#);
    }
}
