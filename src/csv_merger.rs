// csv_merger.rs
use crate::csv_table::{Cell, Table};
use crate::errors::{ProcessError, ProcessResult};
use std::collections::{HashMap, HashSet};

/// Folds a list of tables into one by outer joining each table onto the
/// running result, keyed on the first table's key columns.
///
/// Zero tables give an empty table and a single table comes back untouched.
pub fn merge_tables(tables: Vec<Table>) -> ProcessResult<Table> {
    let mut tables = tables.into_iter();
    let Some(first) = tables.next() else {
        return Ok(Table::empty());
    };

    let keys: Vec<String> = first.key_columns().to_vec();
    let mut merged = first;
    for (offset, table) in tables.enumerate() {
        merged = outer_join(&merged, &table, &keys, offset + 2)?;
        tracing::debug!(shape = ?merged.shape(), "merged table {}", offset + 2);
    }

    Ok(merged)
}

fn key_indices(table: &Table, keys: &[String], position: usize) -> ProcessResult<Vec<usize>> {
    keys.iter()
        .map(|key| {
            table.column_index(key).ok_or_else(|| {
                ProcessError::SchemaMismatch(format!(
                    "file {} is missing key column '{}'",
                    position, key
                ))
            })
        })
        .collect()
}

fn non_key_indices(table: &Table, key_indices: &[usize]) -> Vec<usize> {
    (0..table.headers().len())
        .filter(|index| !key_indices.contains(index))
        .collect()
}

/// Full outer join of `right` onto `left`. Left rows keep their order, each
/// followed by its matches in right order; unmatched right rows come last.
fn outer_join(left: &Table, right: &Table, keys: &[String], position: usize) -> ProcessResult<Table> {
    let left_keys = key_indices(left, keys, 1)?;
    let right_keys = key_indices(right, keys, position)?;
    let left_rest = non_key_indices(left, &left_keys);
    let right_rest = non_key_indices(right, &right_keys);

    let left_names: HashSet<&str> = left_rest.iter().map(|&i| left.headers()[i].as_str()).collect();
    let right_names: HashSet<&str> = right_rest.iter().map(|&i| right.headers()[i].as_str()).collect();

    let mut headers: Vec<String> = keys.to_vec();
    for &index in &left_rest {
        let name = &left.headers()[index];
        if right_names.contains(name.as_str()) {
            headers.push(format!("{}_x", name));
        } else {
            headers.push(name.clone());
        }
    }
    for &index in &right_rest {
        let name = &right.headers()[index];
        if left_names.contains(name.as_str()) {
            headers.push(format!("{}_y", name));
        } else {
            headers.push(name.clone());
        }
    }

    let mut seen = HashSet::new();
    for header in &headers {
        if !seen.insert(header.as_str()) {
            return Err(ProcessError::SchemaMismatch(format!(
                "merging file {} produces duplicate column '{}'",
                position, header
            )));
        }
    }

    let mut right_by_key: HashMap<Vec<Cell>, Vec<usize>> = HashMap::new();
    for (row_index, row) in right.rows().iter().enumerate() {
        right_by_key
            .entry(Table::key_tuple(row, &right_keys))
            .or_default()
            .push(row_index);
    }

    let mut matched = vec![false; right.rows().len()];
    let mut rows: Vec<Vec<Cell>> = Vec::new();

    for left_row in left.rows() {
        let key = Table::key_tuple(left_row, &left_keys);
        let left_cells = left_rest.iter().map(|&i| left_row[i].clone());
        match right_by_key.get(&key) {
            Some(matches) => {
                for &right_index in matches {
                    matched[right_index] = true;
                    let right_row = &right.rows()[right_index];
                    let mut row = key.clone();
                    row.extend(left_cells.clone());
                    row.extend(right_rest.iter().map(|&i| right_row[i].clone()));
                    rows.push(row);
                }
            }
            None => {
                let mut row = key;
                row.extend(left_cells);
                row.extend(std::iter::repeat(None).take(right_rest.len()));
                rows.push(row);
            }
        }
    }

    for (right_index, right_row) in right.rows().iter().enumerate() {
        if matched[right_index] {
            continue;
        }
        let mut row = Table::key_tuple(right_row, &right_keys);
        row.extend(std::iter::repeat(None).take(left_rest.len()));
        row.extend(right_rest.iter().map(|&i| right_row[i].clone()));
        rows.push(row);
    }

    Ok(Table::new(headers, rows))
}
