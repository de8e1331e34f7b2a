// csv_serializer.rs
use crate::csv_table::Table;
use crate::errors::ProcessResult;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Renders `table` as UTF-8 csv: header row first, no index column, missing
/// values written as empty fields.
pub fn to_csv_bytes(table: &Table) -> ProcessResult<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(table.headers()).map_err(io::Error::from)?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))
            .map_err(io::Error::from)?;
    }

    Ok(writer.into_inner().map_err(|e| e.into_error())?)
}

/// Writes csv `bytes` to `dir/file_name`, creating `dir` when needed.
pub fn save_csv(bytes: &[u8], dir: &Path, file_name: &str) -> ProcessResult<PathBuf> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    let path = dir.join(file_name);
    fs::write(&path, bytes)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_loader::load_csv_bytes;
    use crate::csv_table::tests::table;

    #[test]
    fn writes_header_then_rows() {
        let t = table(&["SELECTED", "k", "x"], &[&["True", "1", "a"], &["False", "2", ""]]);
        let bytes = to_csv_bytes(&t).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "SELECTED,k,x\nTrue,1,a\nFalse,2,\n"
        );
    }

    #[test]
    fn quotes_only_when_needed() {
        let t = table(&["k", "v"], &[&["a,b", "say \"hi\""], &["line\nbreak", "plain"]]);
        let text = String::from_utf8(to_csv_bytes(&t).unwrap()).unwrap();
        assert_eq!(
            text,
            "k,v\n\"a,b\",\"say \"\"hi\"\"\"\n\"line\nbreak\",plain\n"
        );
    }

    #[test]
    fn reload_reproduces_the_table() {
        let t = table(
            &["SELECTED", "k", "note"],
            &[&["True", "1", "x, y"], &["False", "2", ""], &["False", "3", "ünïcode"]],
        );
        let bytes = to_csv_bytes(&t).unwrap();
        let reloaded = load_csv_bytes("out.csv", &bytes).unwrap();
        assert_eq!(reloaded, t);
    }

    #[test]
    fn saves_into_a_fresh_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("downloads");

        let path = save_csv(b"a\n1\n", &out_dir, "Final.csv").unwrap();
        assert_eq!(path, out_dir.join("Final.csv"));
        assert_eq!(fs::read_to_string(path).unwrap(), "a\n1\n");
    }
}
