// config.rs
use crate::errors::ProcessResult;
use crate::user_interaction::{get_edited_user_config_input, print_insight_level_2};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "keyword_processor.config";

const SYNTAX: &str = r#"SYNTAX
======

{
  "input_dirs": ["/home/you/Desktop", "/home/you/Downloads"], // folders listed when picking csv files
  "output_dir": "/home/you/Downloads",                         // where the final csv is saved
  "preview_rows": 5,                                           // rows shown at each end of the preview
  "strict_columns": false                                      // true => Target and All must carry the same columns
}
"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input_dirs: Vec<String>,
    pub output_dir: String,
    pub preview_rows: usize,
    pub strict_columns: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config::for_home(&home_dir())
    }
}

impl Config {
    pub fn for_home(home: &Path) -> Self {
        let desktop = home.join("Desktop");
        let downloads = home.join("Downloads");
        Config {
            input_dirs: vec![
                desktop.to_string_lossy().into_owned(),
                downloads.to_string_lossy().into_owned(),
                desktop.join("csv_db").to_string_lossy().into_owned(),
            ],
            output_dir: downloads.to_string_lossy().into_owned(),
            preview_rows: 5,
            strict_columns: false,
        }
    }

    pub fn input_paths(&self) -> Vec<PathBuf> {
        self.input_dirs.iter().map(PathBuf::from).collect()
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir)
    }
}

pub fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// `$HOME/Desktop/csv_db`, where the config file lives.
pub fn csv_db_path() -> PathBuf {
    home_dir().join("Desktop").join("csv_db")
}

fn json_part(text: &str) -> &str {
    text.split("SYNTAX").next().unwrap_or_default()
}

fn render(config: &Config) -> ProcessResult<String> {
    Ok(format!("{}\n\n{}", serde_json::to_string_pretty(config)?, SYNTAX))
}

/// Reads the config, writing one with defaults first if none exists.
pub fn load_config(csv_db_path: &Path) -> ProcessResult<Config> {
    let config_path = csv_db_path.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        fs::create_dir_all(csv_db_path)?;
        let config = Config::default();
        fs::write(&config_path, render(&config)?)?;
        return Ok(config);
    }

    let text = fs::read_to_string(&config_path)?;
    let json = json_part(&text);
    if json.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_json::from_str(json)?)
}

/// The file exactly as it sits on disk, broken JSON included, so the user can
/// fix it. A missing file is offered as the defaults.
fn config_text_for_editing(csv_db_path: &Path) -> ProcessResult<String> {
    let config_path = csv_db_path.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Ok(fs::read_to_string(&config_path)?)
    } else {
        render(&Config::default())
    }
}

/// Validates edited text and saves it with a fresh SYNTAX section. Invalid
/// JSON leaves the file on disk untouched.
fn save_edited_config(csv_db_path: &Path, edited_config_text: &str) -> ProcessResult<Config> {
    let config: Config = serde_json::from_str(json_part(edited_config_text))?;
    fs::create_dir_all(csv_db_path)?;
    fs::write(csv_db_path.join(CONFIG_FILE_NAME), render(&config)?)?;
    Ok(config)
}

/// Opens the config in vim, validates the edit and saves it back.
pub fn edit_config(csv_db_path: &Path) -> ProcessResult<Config> {
    let edited_config_text = get_edited_user_config_input(config_text_for_editing(csv_db_path)?);

    match save_edited_config(csv_db_path, &edited_config_text) {
        Ok(config) => {
            print_insight_level_2("Config's all good, bro!");
            Ok(config)
        }
        Err(e) => {
            println!();
            print_insight_level_2(&format!(
                "Whoops, hit a snag with that config: {}. Mind tweaking it and trying again?",
                e
            ));
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_home_folders() {
        let config = Config::for_home(Path::new("/home/bro"));
        assert_eq!(
            config.input_dirs,
            vec![
                "/home/bro/Desktop".to_string(),
                "/home/bro/Downloads".to_string(),
                "/home/bro/Desktop/csv_db".to_string(),
            ]
        );
        assert_eq!(config.output_path(), PathBuf::from("/home/bro/Downloads"));
        assert_eq!(config.preview_rows, 5);
        assert!(!config.strict_columns);
    }

    #[test]
    fn creates_config_file_on_first_load() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("csv_db");

        let config = load_config(&db).unwrap();
        let text = fs::read_to_string(db.join(CONFIG_FILE_NAME)).unwrap();
        assert!(text.contains("SYNTAX"));
        assert_eq!(load_config(&db).unwrap(), config);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "{ \"strict_columns\": true, \"preview_rows\": 2 }\n\nSYNTAX\n======\nignored",
        )
        .unwrap();

        let config = load_config(dir.path()).unwrap();
        assert!(config.strict_columns);
        assert_eq!(config.preview_rows, 2);
        assert_eq!(config.input_dirs.len(), 3);
    }

    #[test]
    fn broken_json_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "{ not json").unwrap();

        let err = load_config(dir.path()).unwrap_err();
        assert!(matches!(err, crate::errors::ProcessError::Config(_)));
    }

    #[test]
    fn broken_file_is_offered_for_editing_as_is() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "{ not json").unwrap();

        assert_eq!(config_text_for_editing(dir.path()).unwrap(), "{ not json");
    }

    #[test]
    fn missing_file_is_offered_as_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let text = config_text_for_editing(&dir.path().join("csv_db")).unwrap();
        assert!(text.contains("\"preview_rows\": 5"));
        assert!(text.contains("SYNTAX"));
    }

    #[test]
    fn fixed_edit_replaces_broken_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();

        let config = save_edited_config(dir.path(), "{ \"strict_columns\": true }\n\nSYNTAX\nold").unwrap();
        assert!(config.strict_columns);
        assert_eq!(load_config(dir.path()).unwrap(), config);
    }

    #[test]
    fn broken_edit_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "{ \"preview_rows\": 3 }").unwrap();

        let err = save_edited_config(dir.path(), "{ oops").unwrap_err();
        assert!(matches!(err, crate::errors::ProcessError::Config(_)));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ \"preview_rows\": 3 }");
    }
}
