//! In-memory relational table.
//!
//! Columns are ordered and uniquely named; every row holds exactly one cell per
//! column, in column order.

use super::cell::{infer_column, Cell, CellKind};
use super::error::{CommandError, Result};
use std::collections::HashSet;

/// Named, typed column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: CellKind,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: CellKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Ordered columns and ordered rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table, checking the structural invariants.
    ///
    /// # Errors
    ///
    /// - `ColumnError` if there are no columns or a column name repeats
    /// - `SyntaxError` if a row does not have one cell per column
    pub fn new(columns: Vec<Column>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        if columns.is_empty() {
            return Err(CommandError::column("table has no columns"));
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(CommandError::column(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }
        }

        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(CommandError::syntax(format!(
                "row {} has {} values, expected {}",
                i + 1,
                row.len(),
                columns.len()
            )));
        }

        Ok(Self { columns, rows })
    }

    /// Build a table from raw text, inferring each column's kind.
    pub fn from_text(header: Vec<String>, records: Vec<Vec<String>>) -> Result<Self> {
        let width = header.len();
        if let Some((i, record)) = records.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(CommandError::syntax(format!(
                "record {} has {} fields, expected {}",
                i + 1,
                record.len(),
                width
            )));
        }

        let mut columns = Vec::with_capacity(width);
        let mut rows: Vec<Vec<Cell>> = vec![Vec::with_capacity(width); records.len()];

        for (c, name) in header.into_iter().enumerate() {
            let fields: Vec<&str> = records.iter().map(|r| r[c].as_str()).collect();
            let (kind, cells) = infer_column(&fields);
            columns.push(Column::new(name, kind));
            for (row, cell) in rows.iter_mut().zip(cells) {
                row.push(cell);
            }
        }

        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn into_parts(self) -> (Vec<Column>, Vec<Vec<Cell>>) {
        (self.columns, self.rows)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Position of a column.
    ///
    /// # Errors
    ///
    /// Returns `ColumnError` if the column does not exist
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| CommandError::unknown_column(name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Cell at a row/column position.
    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Overwrite one column's cell in the given rows.
    ///
    /// The column is widened when the new value does not fit its kind: an integer
    /// column receiving a float becomes float, a numeric column receiving a string
    /// becomes string. A string column stores numbers as their text. With no
    /// rows to change the table is left as is, column kind included.
    pub fn overwrite(&mut self, column: usize, rows: &[usize], value: Cell) {
        if rows.is_empty() {
            return;
        }
        let current = self.columns[column].kind;
        let target = match (current, value.kind()) {
            (_, None) => current,
            (CellKind::String, _) => CellKind::String,
            (_, Some(CellKind::String)) => CellKind::String,
            (CellKind::Integer, Some(CellKind::Float)) => CellKind::Float,
            (kind, Some(_)) => kind,
        };

        if target != current {
            self.columns[column].kind = target;
            for row in &mut self.rows {
                let cell = std::mem::replace(&mut row[column], Cell::Null);
                row[column] = cell.coerce(target);
            }
        }

        let value = value.coerce(target);
        for &r in rows {
            self.rows[r][column] = value.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Table {
        Table::from_text(
            vec!["name".into(), "age".into()],
            vec![
                vec!["Ann".into(), "31".into()],
                vec!["Bob".into(), "25".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_from_text_infers_kinds() {
        let table = people();
        assert_eq!(table.columns()[0].kind, CellKind::String);
        assert_eq!(table.columns()[1].kind, CellKind::Integer);
        assert_eq!(table.cell(1, 1), Some(&Cell::Integer(25)));
    }

    #[test]
    fn test_new_rejects_bad_shapes() {
        assert!(Table::new(vec![], vec![]).is_err());

        let dup = vec![
            Column::new("a", CellKind::Integer),
            Column::new("a", CellKind::Integer),
        ];
        assert!(Table::new(dup, vec![]).is_err());

        let cols = vec![Column::new("a", CellKind::Integer)];
        let err = Table::new(cols, vec![vec![Cell::Integer(1), Cell::Integer(2)]]).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_column_index() {
        let table = people();
        assert_eq!(table.column_index("age").unwrap(), 1);
        assert!(table.column_index("salary").is_err());
    }

    #[test]
    fn test_overwrite_widens_column() {
        let mut table = people();
        table.overwrite(1, &[0], Cell::Float(31.5));
        assert_eq!(table.columns()[1].kind, CellKind::Float);
        assert_eq!(table.cell(0, 1), Some(&Cell::Float(31.5)));
        assert_eq!(table.cell(1, 1), Some(&Cell::Float(25.0)));

        table.overwrite(1, &[1], Cell::String("unknown".into()));
        assert_eq!(table.columns()[1].kind, CellKind::String);
        assert_eq!(table.cell(0, 1), Some(&Cell::String("31.5".into())));
    }

    #[test]
    fn test_overwrite_string_column_keeps_text() {
        let mut table = people();
        table.overwrite(0, &[1], Cell::Integer(7));
        assert_eq!(table.columns()[0].kind, CellKind::String);
        assert_eq!(table.cell(1, 0), Some(&Cell::String("7".into())));
    }

    #[test]
    fn test_overwrite_no_rows_keeps_kind() {
        let mut table = people();
        table.overwrite(1, &[], Cell::String("n/a".into()));
        assert_eq!(table, people());
        assert_eq!(table.columns()[1].kind, CellKind::Integer);
    }
}
