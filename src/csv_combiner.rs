// csv_combiner.rs
use crate::csv_table::{Cell, Table};
use crate::errors::{ProcessError, ProcessResult};

pub const SELECTED_COLUMN: &str = "SELECTED";

const SELECTED_TRUE: &str = "True";
const SELECTED_FALSE: &str = "False";

/// Flags target rows as selected and filtered-all rows as not, moves the flag
/// to the front and stacks target rows above the filtered-all rows.
///
/// Columns only one side has are null-filled on the other side. With
/// `strict_columns` set, differing column sets are an error instead.
pub fn combine_tables(target: &Table, filtered_all: &Table, strict_columns: bool) -> ProcessResult<Table> {
    let target_columns = data_columns(target);
    let all_columns = data_columns(filtered_all);

    let only_in_target: Vec<&str> = target_columns
        .iter()
        .filter(|name| !all_columns.contains(name))
        .copied()
        .collect();
    let only_in_all: Vec<&str> = all_columns
        .iter()
        .filter(|name| !target_columns.contains(name))
        .copied()
        .collect();

    if strict_columns && (!only_in_target.is_empty() || !only_in_all.is_empty()) {
        return Err(ProcessError::ColumnMismatch(format!(
            "only in Target: [{}], only in All: [{}]",
            only_in_target.join(", "),
            only_in_all.join(", ")
        )));
    }

    let mut headers = vec![SELECTED_COLUMN.to_string()];
    headers.extend(target_columns.iter().map(|name| name.to_string()));
    headers.extend(only_in_all.iter().map(|name| name.to_string()));

    let mut rows = Vec::with_capacity(target.rows().len() + filtered_all.rows().len());
    rows.extend(flag_rows(target, &headers, SELECTED_TRUE));
    rows.extend(flag_rows(filtered_all, &headers, SELECTED_FALSE));

    Ok(Table::new(headers, rows))
}

fn data_columns(table: &Table) -> Vec<&str> {
    table
        .headers()
        .iter()
        .map(String::as_str)
        .filter(|name| *name != SELECTED_COLUMN)
        .collect()
}

/// Lays each row of `table` out along `headers`, putting `flag` in the first
/// column. A pre-existing SELECTED column is overwritten.
fn flag_rows(table: &Table, headers: &[String], flag: &str) -> Vec<Vec<Cell>> {
    let sources: Vec<Option<usize>> = headers[1..]
        .iter()
        .map(|name| table.column_index(name))
        .collect();

    table
        .rows()
        .iter()
        .map(|row| {
            let mut out = Vec::with_capacity(headers.len());
            out.push(Some(flag.to_string()));
            out.extend(
                sources
                    .iter()
                    .map(|source| source.and_then(|index| row[index].clone())),
            );
            out
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_table::tests::table;

    #[test]
    fn flags_and_stacks_target_first() {
        let target = table(&["k", "x"], &[&["1", "a"]]);
        let all = table(&["k", "x"], &[&["2", "b"], &["3", "c"]]);

        let combined = combine_tables(&target, &all, false).unwrap();
        assert_eq!(combined.headers(), &["SELECTED", "k", "x"]);
        assert_eq!(combined.shape(), (3, 3));
        assert_eq!(combined.rows()[0][0].as_deref(), Some("True"));
        assert_eq!(combined.rows()[0][1].as_deref(), Some("1"));
        assert_eq!(combined.rows()[1][0].as_deref(), Some("False"));
        assert_eq!(combined.rows()[2][1].as_deref(), Some("3"));
    }

    #[test]
    fn inputs_do_not_gain_a_selected_column() {
        let target = table(&["k", "x"], &[&["1", "a"]]);
        let all = table(&["k", "x"], &[&["2", "b"]]);

        let _ = combine_tables(&target, &all, false).unwrap();
        assert!(target.column_index(SELECTED_COLUMN).is_none());
        assert!(all.column_index(SELECTED_COLUMN).is_none());
    }

    #[test]
    fn existing_selected_column_is_replaced() {
        let target = table(&["k", "SELECTED"], &[&["1", "no"]]);
        let all = table(&["SELECTED", "k"], &[&["yes", "2"]]);

        let combined = combine_tables(&target, &all, false).unwrap();
        assert_eq!(combined.headers(), &["SELECTED", "k"]);
        assert_eq!(combined.rows()[0][0].as_deref(), Some("True"));
        assert_eq!(combined.rows()[1][0].as_deref(), Some("False"));
        assert_eq!(combined.rows()[1][1].as_deref(), Some("2"));
    }

    #[test]
    fn differing_columns_are_null_filled() {
        let target = table(&["k", "t"], &[&["1", "a"]]);
        let all = table(&["k", "u"], &[&["2", "b"]]);

        let combined = combine_tables(&target, &all, false).unwrap();
        assert_eq!(combined.headers(), &["SELECTED", "k", "t", "u"]);
        assert_eq!(combined.rows()[0][3], None);
        assert_eq!(combined.rows()[1][2], None);
        assert_eq!(combined.rows()[1][3].as_deref(), Some("b"));
    }

    #[test]
    fn differing_columns_fail_in_strict_mode() {
        let target = table(&["k", "t"], &[&["1", "a"]]);
        let all = table(&["k", "u"], &[&["2", "b"]]);

        let err = combine_tables(&target, &all, true).unwrap_err();
        match err {
            ProcessError::ColumnMismatch(message) => {
                assert!(message.contains("only in Target: [t]"));
                assert!(message.contains("only in All: [u]"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn strict_mode_accepts_reordered_columns() {
        let target = table(&["k", "t", "u"], &[&["1", "a", "b"]]);
        let all = table(&["k", "u", "t"], &[&["2", "d", "c"]]);

        let combined = combine_tables(&target, &all, true).unwrap();
        assert_eq!(combined.headers(), &["SELECTED", "k", "t", "u"]);
        assert_eq!(combined.rows()[1][2].as_deref(), Some("c"));
        assert_eq!(combined.rows()[1][3].as_deref(), Some("d"));
    }
}
