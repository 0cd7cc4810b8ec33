//! Property tests for the relational operators and the CSV codec.

use proptest::prelude::*;
use std::collections::HashMap;
use tabsh::export::CsvCodec;
use tabsh::query::{filter, group, join, select, Operator, Predicate};
use tabsh::types::{Cell, CellKey, CommandError, Table};
use tempfile::tempdir;

/// One raw CSV field: an integer, a short word or empty.
fn field() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => (-50i64..50).prop_map(|i| i.to_string()),
        2 => "[a-z]{1,5}",
        1 => Just(String::new()),
    ]
}

fn numeric_field() -> impl Strategy<Value = String> {
    prop_oneof![
        5 => (0i64..20).prop_map(|i| i.to_string()),
        1 => Just(String::new()),
    ]
}

fn table_of(names: &[&str], records: Vec<Vec<String>>) -> Table {
    Table::from_text(names.iter().map(|n| n.to_string()).collect(), records).unwrap()
}

fn abc_table() -> impl Strategy<Value = Table> {
    prop::collection::vec(prop::collection::vec(field(), 3), 0..25)
        .prop_map(|records| table_of(&["a", "b", "c"], records))
}

fn operator() -> impl Strategy<Value = Operator> {
    prop::sample::select(Operator::BY_PRIORITY.to_vec())
}

proptest! {
    #[test]
    fn prop_filter_is_idempotent(
        table in abc_table(),
        op in operator(),
        column in prop::sample::select(vec!["a", "b", "c"]),
        literal in prop_oneof![(0i64..30).prop_map(Cell::Integer), "[a-z]{1,3}".prop_map(Cell::String)],
    ) {
        let predicate = Predicate::new(column, op, literal);
        let once = filter(&table, &predicate).unwrap();
        let twice = filter(&once, &predicate).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_select_all_is_identity(table in abc_table()) {
        let names: Vec<String> = table.column_names().into_iter().map(String::from).collect();
        prop_assert_eq!(select(&table, &names).unwrap(), table);
    }

    #[test]
    fn prop_csv_round_trip(table in abc_table()) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.csv");
        let codec = CsvCodec::default();

        codec.save(&table, &path).unwrap();
        let loaded = codec.load(&path).unwrap();
        prop_assert_eq!(loaded, table);
    }

    #[test]
    fn prop_join_counts_matching_pairs(
        left in prop::collection::vec(prop::collection::vec(numeric_field(), 2), 0..15),
        right in prop::collection::vec(prop::collection::vec(numeric_field(), 2), 0..15),
    ) {
        let left = table_of(&["k", "x"], left);
        let right = table_of(&["k", "y"], right);

        let mut counts: HashMap<CellKey, usize> = HashMap::new();
        for row in right.rows().iter().filter(|r| !r[0].is_null()) {
            *counts.entry(row[0].key()).or_default() += 1;
        }
        let expected: usize = left
            .rows()
            .iter()
            .filter(|r| !r[0].is_null())
            .map(|r| counts.get(&r[0].key()).copied().unwrap_or(0))
            .sum();

        let joined = join(&left, &right, "k").unwrap();
        prop_assert_eq!(joined.len(), expected);
        prop_assert_eq!(joined.column_names(), vec!["k", "x", "y"]);
    }

    #[test]
    fn prop_group_sums_partitions(
        rows in prop::collection::vec(
            (prop::sample::select(vec!["red", "green", "blue"]), 0i64..100, "[a-z]{1,4}"),
            1..30,
        ),
    ) {
        let records = rows
            .iter()
            .map(|(k, v, note)| vec![k.to_string(), v.to_string(), note.clone()])
            .collect();
        let table = table_of(&["colour", "value", "note"], records);

        let grouped = group(&table, "colour").unwrap();
        prop_assert_eq!(grouped.column_names(), vec!["colour", "value"]);

        let mut expected: Vec<(String, i64)> = Vec::new();
        for (k, v, _) in &rows {
            match expected.iter_mut().find(|(key, _)| key == k) {
                Some((_, total)) => *total += v,
                None => expected.push((k.to_string(), *v)),
            }
        }
        let actual: Vec<(String, i64)> = grouped
            .rows()
            .iter()
            .map(|r| match (&r[0], &r[1]) {
                (Cell::String(k), Cell::Integer(v)) => (k.clone(), *v),
                other => panic!("unexpected row {:?}", other),
            })
            .collect();
        prop_assert_eq!(actual, expected);
    }
}

#[test]
fn test_join_on_one_sided_column() {
    let left = table_of(&["k", "x"], vec![vec!["1".into(), "2".into()]]);
    let right = table_of(&["id", "y"], vec![vec!["1".into(), "3".into()]]);
    assert!(matches!(
        join(&left, &right, "k"),
        Err(CommandError::ColumnError(_))
    ));
}
