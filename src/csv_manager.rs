// csv_manager.rs
use crate::errors::{ProcessError, ProcessResult};
use crate::keyword_processor::UploadedFile;
use crate::user_experience::{handle_back_flag, handle_cancel_flag, handle_quit_flag};
use crate::user_interaction::{
    get_user_input_level_2, print_insight, print_insight_level_2, print_list, FUZZY_THRESHOLD,
};
use chrono::{DateTime, Local};
use fuzzywuzzy::fuzz;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::SystemTime;

/// Every `.csv` file directly inside `dirs`, most recently modified first.
/// Unreadable directories are skipped.
pub fn list_csv_files(dirs: &[PathBuf]) -> Vec<(PathBuf, SystemTime)> {
    fn list_dir(path: &Path) -> io::Result<Vec<(PathBuf, SystemTime)>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let path = entry.path();
            let is_csv = path
                .extension()
                .and_then(|s| s.to_str())
                .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));
            if path.is_file() && is_csv {
                if let Ok(modified) = entry.metadata().and_then(|m| m.modified()) {
                    files.push((path, modified));
                }
            }
        }
        Ok(files)
    }

    let mut seen = HashSet::new();
    let mut files: Vec<(PathBuf, SystemTime)> = dirs
        .iter()
        .flat_map(|dir| match list_dir(dir) {
            Ok(files) => files,
            Err(e) => {
                tracing::debug!(dir = %dir.display(), "skipping directory: {}", e);
                Vec::new()
            }
        })
        .filter(|(path, _)| seen.insert(path.clone()))
        .collect();

    files.sort_by(|a, b| b.1.cmp(&a.1));
    files
}

pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(String::from)
        .unwrap_or_else(|| path.display().to_string())
}

/// Resolves a comma separated answer such as `1, 3, keywords_may` against
/// `names`. Each piece is a serial number or a slice of a file name.
pub fn resolve_selection(choice: &str, names: &[String]) -> ProcessResult<Vec<usize>> {
    let mut picked = Vec::new();

    for piece in choice.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let index = match piece.parse::<usize>() {
            Ok(serial) if serial > 0 && serial <= names.len() => serial - 1,
            _ => {
                let needle = piece.to_lowercase();
                names
                    .iter()
                    .enumerate()
                    .map(|(index, name)| {
                        let name = name.to_lowercase();
                        let score = if name.contains(&needle) {
                            100
                        } else {
                            fuzz::ratio(&needle, &name)
                        };
                        (index, score)
                    })
                    .filter(|&(_, score)| score > FUZZY_THRESHOLD)
                    .max_by_key(|&(_, score)| score)
                    .map(|(index, _)| index)
                    .ok_or_else(|| {
                        ProcessError::Validation(format!("No file matches '{}'", piece))
                    })?
            }
        };
        if !picked.contains(&index) {
            picked.push(index);
        }
    }

    Ok(picked)
}

/// Lists the csv files in `dirs` and lets the user pick any number of them.
/// Returns `None` when the user backs out.
pub fn select_csv_files(label: &str, dirs: &[PathBuf]) -> Option<Vec<PathBuf>> {
    let files = list_csv_files(dirs);
    if files.is_empty() {
        print_insight("No csv files in sight, bro. Check input_dirs in CONFIG.");
        return None;
    }

    let file_infos: Vec<String> = files
        .iter()
        .map(|(path, modified)| {
            let modified: DateTime<Local> = (*modified).into();
            format!(
                "{} (Modified: {})",
                file_name_of(path),
                modified.format("%Y-%m-%d %H:%M:%S")
            )
        })
        .collect();
    let file_info_slices: Vec<&str> = file_infos.iter().map(AsRef::as_ref).collect();

    loop {
        print_insight(&format!("Pick your {} csv files:", label));
        print_list(&file_info_slices);

        let choice = get_user_input_level_2(
            "Punch in serial numbers or slices of file names, comma separated (@b to go back): ",
        );
        handle_quit_flag(&choice);
        if handle_back_flag(&choice) || handle_cancel_flag(&choice) {
            print_insight_level_2("Bailed on that. Heading back to the last menu, bro.");
            return None;
        }

        let names: Vec<String> = files.iter().map(|(path, _)| file_name_of(path)).collect();
        match resolve_selection(&choice, &names) {
            Ok(picked) if !picked.is_empty() => {
                return Some(picked.into_iter().map(|i| files[i].0.clone()).collect());
            }
            Ok(_) => print_insight_level_2("Nothing picked. Give it another whirl."),
            Err(e) => print_insight_level_2(&e.to_string()),
        }
    }
}

/// Reads the picked files into memory, ready to hand to a run.
pub fn read_uploads(paths: &[PathBuf]) -> ProcessResult<Vec<UploadedFile>> {
    paths
        .iter()
        .map(|path| {
            let name = file_name_of(path);
            let bytes = fs::read(path).map_err(|e| ProcessError::MalformedInput {
                file: name.clone(),
                reason: e.to_string(),
            })?;
            Ok(UploadedFile { name, bytes })
        })
        .collect()
}

fn forbidden_file_name_chars() -> &'static Regex {
    static FORBIDDEN: OnceLock<Regex> = OnceLock::new();
    FORBIDDEN.get_or_init(|| {
        Regex::new(r#"[/\\:*?"<>|\x00-\x1f]"#).expect("file name pattern is a valid regex")
    })
}

/// Cleans a user supplied output filename: drops path separators and
/// characters file systems reject, and makes sure it ends in `.csv`.
pub fn sanitize_output_file_name(input: &str) -> Option<String> {
    let cleaned = forbidden_file_name_chars().replace_all(input, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case(".csv") {
        return None;
    }

    if cleaned.to_lowercase().ends_with(".csv") {
        Some(cleaned.to_string())
    } else {
        Some(format!("{}.csv", cleaned))
    }
}

/// Asks for a new output filename. Blank input or `@c` keeps `current`.
pub fn prompt_output_file_name(current: &str) -> String {
    print_insight(&format!("Current output filename: {}", current));
    let input = get_user_input_level_2("Enter output filename (blank keeps the current one): ");
    handle_quit_flag(&input);
    if handle_cancel_flag(&input) {
        return current.to_string();
    }

    match sanitize_output_file_name(&input) {
        Some(name) => name,
        None => current.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec![
            "keywords_may.csv".to_string(),
            "keywords_june.csv".to_string(),
            "universe.csv".to_string(),
        ]
    }

    #[test]
    fn selection_by_serial_and_fragment() {
        assert_eq!(resolve_selection("1, 3", &names()).unwrap(), vec![0, 2]);
        assert_eq!(resolve_selection("june", &names()).unwrap(), vec![1]);
        assert_eq!(resolve_selection("universe.csv,1", &names()).unwrap(), vec![2, 0]);
    }

    #[test]
    fn selection_ignores_repeats_and_blanks() {
        assert_eq!(resolve_selection("2,,2, june", &names()).unwrap(), vec![1]);
        assert!(resolve_selection("  ", &names()).unwrap().is_empty());
    }

    #[test]
    fn unmatched_fragment_is_reported() {
        let err = resolve_selection("1, qqqqqqqqqqqq", &names()).unwrap_err();
        assert_eq!(err.to_string(), "No file matches 'qqqqqqqqqqqq'");
    }

    #[test]
    fn output_file_name_is_cleaned() {
        assert_eq!(sanitize_output_file_name("report"), Some("report.csv".to_string()));
        assert_eq!(sanitize_output_file_name(" final.CSV "), Some("final.CSV".to_string()));
        assert_eq!(sanitize_output_file_name("../etc/pass:wd"), Some("..etcpasswd.csv".to_string()));
        assert_eq!(sanitize_output_file_name("   "), None);
        assert_eq!(sanitize_output_file_name("/.csv"), None);
    }

    #[test]
    fn every_forbidden_character_is_dropped_on_repeat_calls() {
        for _ in 0..3 {
            assert_eq!(
                sanitize_output_file_name("a\\b*c?d\"e<f>g|h\ti\u{0}j"),
                Some("abcdefghij.csv".to_string())
            );
        }
    }

    #[test]
    fn lists_only_csv_files_across_dirs() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(first.path().join("a.csv"), "x\n1\n").unwrap();
        fs::write(first.path().join("notes.txt"), "nope").unwrap();
        fs::write(second.path().join("b.CSV"), "x\n2\n").unwrap();

        let dirs = vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
            first.path().join("missing"),
            first.path().to_path_buf(),
        ];
        let mut listed: Vec<String> = list_csv_files(&dirs)
            .iter()
            .map(|(path, _)| file_name_of(path))
            .collect();
        listed.sort();
        assert_eq!(listed, vec!["a.csv".to_string(), "b.CSV".to_string()]);
    }

    #[test]
    fn reads_uploads_with_their_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("target.csv");
        fs::write(&path, "a,b\n1,2\n").unwrap();

        let uploads = read_uploads(&[path]).unwrap();
        assert_eq!(uploads[0].name, "target.csv");
        assert_eq!(uploads[0].bytes, b"a,b\n1,2\n");

        let err = read_uploads(&[dir.path().join("gone.csv")]).unwrap_err();
        assert!(matches!(err, ProcessError::MalformedInput { .. }));
    }
}
