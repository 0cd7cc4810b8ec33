//! Plain-text table rendering for SHOW.

use crate::types::{Cell, Table};

/// Render `table` as aligned text.
///
/// Layout: header line, dashed rule, one line per row, then a
/// `[R rows x C columns]` footer. Numeric columns are right-aligned. Tables
/// longer than `max_rows` show the first and last rows around a `...` line.
/// Trailing spaces are trimmed from every line.
pub fn render_table(table: &Table, max_rows: usize) -> String {
    let max_rows = max_rows.max(1);
    let total = table.len();

    let visible: Vec<Option<usize>> = if total > max_rows {
        let head = max_rows.div_ceil(2);
        let tail = max_rows / 2;
        (0..head)
            .map(Some)
            .chain(std::iter::once(None))
            .chain((total - tail..total).map(Some))
            .collect()
    } else {
        (0..total).map(Some).collect()
    };

    let text: Vec<Option<Vec<String>>> = visible
        .iter()
        .map(|slot| slot.map(|r| table.rows()[r].iter().map(Cell::to_string).collect()))
        .collect();

    let columns = table.columns();
    let mut widths: Vec<usize> = columns.iter().map(|c| c.name.chars().count()).collect();
    for row in text.iter().flatten() {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = Vec::with_capacity(text.len() + 3);
    out.push(join_line(
        columns.iter().zip(&widths).map(|(c, w)| pad(&c.name, *w, false)),
    ));
    out.push(join_line(widths.iter().map(|w| "-".repeat((*w).max(1)))));

    for row in &text {
        match row {
            Some(cells) => out.push(join_line(
                cells
                    .iter()
                    .zip(columns)
                    .zip(&widths)
                    .map(|((cell, col), w)| pad(cell, *w, col.kind.is_numeric())),
            )),
            None => out.push("...".to_string()),
        }
    }

    if total == 0 {
        out.push("(no rows)".to_string());
    }
    out.push(format!(
        "[{} x {}]",
        plural(total, "row"),
        plural(table.width(), "column")
    ));

    out.join("\n")
}

fn pad(text: &str, width: usize, right: bool) -> String {
    if right {
        format!("{:>width$}", text, width = width)
    } else {
        format!("{:<width$}", text, width = width)
    }
}

fn join_line(parts: impl Iterator<Item = String>) -> String {
    parts.collect::<Vec<_>>().join("  ").trim_end().to_string()
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", n, noun)
    }
}
