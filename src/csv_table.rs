// csv_table.rs

/// Leading columns that identify a row across merges and filtering.
pub const KEY_COLUMN_COUNT: usize = 5;

/// A single cell. `None` is a missing value.
pub type Cell = Option<String>;

/// Ordered columns, ordered rows. Every row carries one cell per column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == headers.len()));
        Table { headers, rows }
    }

    /// No columns, no rows.
    pub fn empty() -> Self {
        Table::default()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.headers.len())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// The first five column names, or all of them for narrower tables.
    pub fn key_columns(&self) -> &[String] {
        let count = self.headers.len().min(KEY_COLUMN_COUNT);
        &self.headers[..count]
    }

    /// Cells at `indices`, in order. Missing cells compare equal to each other.
    pub fn key_tuple(row: &[Cell], indices: &[usize]) -> Vec<Cell> {
        indices.iter().map(|&index| row[index].clone()).collect()
    }

    /// Renders the table the way the terminal preview shows it: a header line,
    /// a dashed rule, the first and last `edge_rows` rows with a marker for the
    /// hidden middle, and the total row count.
    pub fn render_preview(&self, edge_rows: usize) -> String {
        let total = self.rows.len();
        let hidden = total.saturating_sub(edge_rows * 2);
        let (head, tail): (&[Vec<Cell>], &[Vec<Cell>]) = if hidden == 0 {
            (&self.rows, &[])
        } else {
            (&self.rows[..edge_rows], &self.rows[total - edge_rows..])
        };
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in head.iter().chain(tail.iter()) {
            for (index, cell) in row.iter().enumerate() {
                let len = cell.as_deref().unwrap_or("").chars().count();
                widths[index] = widths[index].max(len);
            }
        }

        fn format_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
            let mut line = String::from("|");
            for (cell, width) in cells.zip(widths.iter()) {
                line.push_str(&format!("{:<width$}|", cell, width = width + 1));
            }
            line
        }
        fn format_row(row: &[Cell], widths: &[usize]) -> String {
            format_line(row.iter().map(|cell| cell.as_deref().unwrap_or("")), widths)
        }

        let header_line = format_line(self.headers.iter().map(String::as_str), &widths);
        let rule = "-".repeat(header_line.chars().count());
        let mut out = vec![header_line, rule];

        out.extend(head.iter().map(|row| format_row(row, &widths)));
        if hidden > 0 {
            let noun = if hidden == 1 { "row" } else { "rows" };
            out.push(format!("<<+{} {}>>", hidden, noun));
        }
        out.extend(tail.iter().map(|row| format_row(row, &widths)));
        out.push(format!("Total rows: {}", total));

        out.join("\n")
    }

    pub fn print_table(&self, edge_rows: usize) {
        println!("{}", self.render_preview(edge_rows));
    }
}
