// csv_filter.rs
use crate::csv_table::{Cell, Table};
use crate::errors::{ProcessError, ProcessResult};
use std::collections::HashSet;

/// Returns the rows of `all` whose key tuple does not appear in `target`.
///
/// Both tables must share their first five column names, in order. Row order
/// and every column of `all` are preserved; neither input is modified.
pub fn remove_target_from_all(target: &Table, all: &Table) -> ProcessResult<Table> {
    let keys = target.key_columns();
    if keys != all.key_columns() {
        return Err(ProcessError::KeyMismatch {
            target: keys.join(", "),
            all: all.key_columns().join(", "),
        });
    }

    let key_indices: Vec<usize> = (0..keys.len()).collect();
    let target_keys: HashSet<Vec<Cell>> = target
        .rows()
        .iter()
        .map(|row| Table::key_tuple(row, &key_indices))
        .collect();

    let rows: Vec<Vec<Cell>> = all
        .rows()
        .iter()
        .filter(|row| !target_keys.contains(&Table::key_tuple(row, &key_indices)))
        .cloned()
        .collect();

    tracing::debug!(
        removed = all.rows().len() - rows.len(),
        kept = rows.len(),
        "filtered target keys out of all"
    );

    Ok(Table::new(all.headers().to_vec(), rows))
}
