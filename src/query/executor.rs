//! Relational operators over a [`Table`].
//!
//! Every operator reads its input and builds a new table; the caller decides
//! whether to commit the result.

use super::predicates::Predicate;
use crate::types::{Cell, CellKey, CellKind, Column, CommandError, Result, Table};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Sort order for SORT_BY
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    /// `ASC` (any case) or no token is ascending; anything else is descending.
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            None => Order::Asc,
            Some(t) if t.eq_ignore_ascii_case("asc") => Order::Asc,
            Some(_) => Order::Desc,
        }
    }
}

/// Keep the rows that satisfy `predicate`.
///
/// # Errors
///
/// Returns `ColumnError` if the predicate's column does not exist
pub fn filter(table: &Table, predicate: &Predicate) -> Result<Table> {
    let idx = table.column_index(&predicate.column)?;

    let rows: Vec<Vec<Cell>> = table
        .rows()
        .iter()
        .filter(|row| predicate.evaluate(&row[idx]))
        .cloned()
        .collect();

    debug!(predicate = %predicate, rows_in = table.len(), rows_out = rows.len(), "filter");
    Table::new(table.columns().to_vec(), rows)
}

/// Project onto the given columns, in the given order.
///
/// # Errors
///
/// - `ColumnError` if any name is absent
/// - `SyntaxError` if a name is listed twice
pub fn select(table: &Table, names: &[String]) -> Result<Table> {
    let mut seen = HashSet::new();
    let mut indices = Vec::with_capacity(names.len());
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(CommandError::syntax(format!(
                "column '{}' listed more than once",
                name
            )));
        }
        indices.push(table.column_index(name)?);
    }

    let columns = indices.iter().map(|&i| table.columns()[i].clone()).collect();
    let rows = table
        .rows()
        .iter()
        .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
        .collect();

    debug!(columns = ?names, "select");
    Table::new(columns, rows)
}

/// Stable sort on one column.
///
/// Uses the same type-aware comparison as `filter`. Null cells go last in
/// either direction.
///
/// # Errors
///
/// Returns `ColumnError` if the column does not exist
pub fn sort(table: &Table, column: &str, order: Order) -> Result<Table> {
    let idx = table.column_index(column)?;

    let mut rows = table.rows().to_vec();
    rows.sort_by(|a, b| match (&a[idx], &b[idx]) {
        (Cell::Null, Cell::Null) => Ordering::Equal,
        (Cell::Null, _) => Ordering::Greater,
        (_, Cell::Null) => Ordering::Less,
        (x, y) => match order {
            Order::Asc => x.sort_cmp(y),
            Order::Desc => y.sort_cmp(x),
        },
    });

    debug!(column, ?order, rows = rows.len(), "sort");
    Table::new(table.columns().to_vec(), rows)
}

/// Group rows by equal value in `column` and sum every other numeric column.
///
/// Output has one row per distinct value, in first-appearance order. String
/// columns are dropped. Null counts as zero in a sum.
///
/// # Errors
///
/// Returns `ColumnError` if the column does not exist
pub fn group(table: &Table, column: &str) -> Result<Table> {
    let idx = table.column_index(column)?;

    let mut positions: HashMap<CellKey, usize> = HashMap::new();
    let mut groups: Vec<(Cell, Vec<usize>)> = Vec::new();
    for (r, row) in table.rows().iter().enumerate() {
        let key = row[idx].key();
        match positions.get(&key) {
            Some(&g) => groups[g].1.push(r),
            None => {
                positions.insert(key, groups.len());
                groups.push((row[idx].clone(), vec![r]));
            }
        }
    }

    let summed: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(i, c)| *i != idx && c.kind.is_numeric())
        .map(|(i, _)| i)
        .collect();

    let mut columns = vec![table.columns()[idx].clone()];
    columns.extend(summed.iter().map(|&i| table.columns()[i].clone()));

    let mut rows = groups
        .into_iter()
        .map(|(value, members)| {
            let mut row = vec![value];
            row.extend(summed.iter().map(|&c| {
                sum_cells(
                    table.columns()[c].kind,
                    members.iter().map(|&r| &table.rows()[r][c]),
                )
            }));
            row
        })
        .collect::<Vec<_>>();

    // An integer sum that overflowed i64 came back as a float; widen its column
    for c in 1..columns.len() {
        if columns[c].kind == CellKind::Integer
            && rows.iter().any(|row| matches!(row[c], Cell::Float(_)))
        {
            columns[c].kind = CellKind::Float;
            for row in &mut rows {
                let cell = std::mem::replace(&mut row[c], Cell::Null);
                row[c] = cell.coerce(CellKind::Float);
            }
        }
    }

    debug!(column, groups = rows.len(), summed = summed.len(), "group");
    Table::new(columns, rows)
}

fn sum_cells<'a>(kind: CellKind, cells: impl Iterator<Item = &'a Cell>) -> Cell {
    match kind {
        CellKind::Integer => {
            let mut total: i128 = 0;
            for cell in cells {
                if let Cell::Integer(i) = cell {
                    total += *i as i128;
                }
            }
            i64::try_from(total)
                .map(Cell::Integer)
                .unwrap_or(Cell::Float(total as f64))
        }
        _ => Cell::Float(cells.filter_map(Cell::as_f64).sum()),
    }
}

/// Inner join on equal values of `column`.
///
/// The join column appears once. Other columns present in both tables are
/// suffixed `_x` (left) and `_y` (right). Rows come out left-major: each left
/// row in order, followed by each matching right row in order.
///
/// # Errors
///
/// Returns `ColumnError` if either table lacks `column`
pub fn join(left: &Table, right: &Table, column: &str) -> Result<Table> {
    let left_key = left
        .column_index(column)
        .map_err(|_| CommandError::column(format!("column '{}' not found in current table", column)))?;
    let right_key = right
        .column_index(column)
        .map_err(|_| CommandError::column(format!("column '{}' not found in joined table", column)))?;

    debug!(left = ?left.column_names(), right = ?right.column_names(), column, "join inputs");

    let overlapping: HashSet<&str> = left
        .column_names()
        .into_iter()
        .filter(|name| *name != column && right.has_column(name))
        .collect();

    let mut columns: Vec<Column> = left
        .columns()
        .iter()
        .map(|c| {
            if overlapping.contains(c.name.as_str()) {
                Column::new(format!("{}_x", c.name), c.kind)
            } else {
                c.clone()
            }
        })
        .collect();
    let right_kept: Vec<usize> = (0..right.width()).filter(|&i| i != right_key).collect();
    columns.extend(right_kept.iter().map(|&i| {
        let c = &right.columns()[i];
        if overlapping.contains(c.name.as_str()) {
            Column::new(format!("{}_y", c.name), c.kind)
        } else {
            c.clone()
        }
    }));

    let mut index: HashMap<CellKey, Vec<usize>> = HashMap::new();
    for (r, row) in right.rows().iter().enumerate() {
        if !row[right_key].is_null() {
            index.entry(row[right_key].key()).or_default().push(r);
        }
    }

    let mut rows = Vec::new();
    for row in left.rows() {
        if row[left_key].is_null() {
            continue;
        }
        if let Some(matches) = index.get(&row[left_key].key()) {
            for &m in matches {
                let other = &right.rows()[m];
                let mut joined = row.clone();
                joined.extend(right_kept.iter().map(|&i| other[i].clone()));
                rows.push(joined);
            }
        }
    }

    debug!(column, rows = rows.len(), "join");
    Table::new(columns, rows)
}

/// Keep the first row seen for each distinct value of `column`.
///
/// # Errors
///
/// Returns `ColumnError` if the column does not exist
pub fn dedupe(table: &Table, column: &str) -> Result<Table> {
    let idx = table.column_index(column)?;

    let mut seen = HashSet::new();
    let rows: Vec<Vec<Cell>> = table
        .rows()
        .iter()
        .filter(|row| seen.insert(row[idx].key()))
        .cloned()
        .collect();

    debug!(column, rows_in = table.len(), rows_out = rows.len(), "dedupe");
    Table::new(table.columns().to_vec(), rows)
}
