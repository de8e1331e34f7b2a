// keyword_processor.rs
use crate::csv_combiner::combine_tables;
use crate::csv_filter::remove_target_from_all;
use crate::csv_loader::load_csv_bytes;
use crate::csv_merger::merge_tables;
use crate::csv_serializer::to_csv_bytes;
use crate::csv_table::Table;
use crate::errors::{ProcessError, ProcessResult};
use chrono::{DateTime, Local, Utc};
use std::fmt;

const READY_MESSAGE: &str = "Ready to process files.";

/// Raw csv content handed over by whoever picked the file.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Per-run knobs. Nothing here outlives the run it is passed to.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub output_file_name: String,
    pub strict_columns: bool,
}

impl RunSettings {
    pub fn new(now: DateTime<Utc>) -> Self {
        RunSettings {
            output_file_name: default_output_file_name(now),
            strict_columns: false,
        }
    }
}

pub fn default_output_file_name(now: DateTime<Utc>) -> String {
    format!("Final Keyword File {}.csv", now.timestamp())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Idle,
    Validating,
    Loading,
    Merging,
    Filtering,
    Combining,
    Serializing,
    Done,
    Failed,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub at: DateTime<Local>,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.at.format("%H:%M:%S"), self.message)
    }
}

/// Append-only log of a single run.
#[derive(Debug, Clone, Default)]
pub struct RunLog {
    entries: Vec<LogEntry>,
}

impl RunLog {
    pub fn push(&mut self, message: impl Into<String>) {
        let entry = LogEntry {
            at: Local::now(),
            message: message.into(),
        };
        tracing::debug!("{}", entry.message);
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn messages(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.message.as_str()).collect()
    }

    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// What a successful run hands to the download side.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub table: Table,
    pub csv_bytes: Vec<u8>,
    pub file_name: String,
}

/// Drives one run through load, merge, filter, combine and serialize,
/// recording every step in the run log.
#[derive(Debug)]
pub struct KeywordProcessor {
    stage: RunStage,
    log: RunLog,
    status: String,
}

impl Default for KeywordProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordProcessor {
    pub fn new() -> Self {
        KeywordProcessor {
            stage: RunStage::Idle,
            log: RunLog::default(),
            status: READY_MESSAGE.to_string(),
        }
    }

    pub fn stage(&self) -> RunStage {
        self.stage
    }

    pub fn log(&self) -> &RunLog {
        &self.log
    }

    pub fn status_message(&self) -> &str {
        &self.status
    }

    /// Runs the whole pipeline. On failure no output is produced and the
    /// processor ends in `RunStage::Failed`.
    pub fn run(
        &mut self,
        target_files: &[UploadedFile],
        all_files: &[UploadedFile],
        settings: &RunSettings,
    ) -> ProcessResult<RunOutput> {
        self.log = RunLog::default();
        self.stage = RunStage::Idle;
        self.log.push("Starting processing...");

        match self.execute(target_files, all_files, settings) {
            Ok(output) => {
                self.advance(RunStage::Done, "Processing complete!");
                Ok(output)
            }
            Err(err) => {
                self.stage = RunStage::Failed;
                match &err {
                    ProcessError::Validation(message) => {
                        self.log.push(format!("Error: {}", message));
                        self.status = format!("{}!", message);
                    }
                    other => {
                        self.log.push(format!("Error occurred: {}", other));
                        self.status = format!("An error occurred: {}", other);
                    }
                }
                tracing::warn!(error = %err, "run failed");
                Err(err)
            }
        }
    }

    fn advance(&mut self, stage: RunStage, message: &str) {
        tracing::debug!(from = ?self.stage, to = ?stage, "stage transition");
        self.stage = stage;
        self.status = match stage {
            RunStage::Idle => READY_MESSAGE.to_string(),
            RunStage::Done => "Processing complete!".to_string(),
            _ => "Processing files...".to_string(),
        };
        self.log.push(message);
    }

    fn execute(
        &mut self,
        target_files: &[UploadedFile],
        all_files: &[UploadedFile],
        settings: &RunSettings,
    ) -> ProcessResult<RunOutput> {
        self.advance(RunStage::Validating, "Validating file selections...");
        if target_files.is_empty() {
            return Err(ProcessError::Validation("No Target files selected".to_string()));
        }
        if all_files.is_empty() {
            return Err(ProcessError::Validation("No All files selected".to_string()));
        }

        let target = self.read_set("Target", target_files)?;
        let all = self.read_set("All", all_files)?;

        self.advance(RunStage::Filtering, "Removing Target entries from All data...");
        let filtered_all = remove_target_from_all(&target, &all)?;
        self.log.push(format!("Filtered data shape: {:?}", filtered_all.shape()));

        self.advance(RunStage::Combining, "Adding SELECTED flags and concatenating...");
        let table = combine_tables(&target, &filtered_all, settings.strict_columns)?;
        self.log.push(format!("Final data shape: {:?}", table.shape()));

        self.advance(RunStage::Serializing, "Preparing csv download...");
        let csv_bytes = to_csv_bytes(&table)?;

        Ok(RunOutput {
            table,
            csv_bytes,
            file_name: settings.output_file_name.clone(),
        })
    }

    /// Loads one set and merges it before the next set is read.
    fn read_set(&mut self, label: &str, files: &[UploadedFile]) -> ProcessResult<Table> {
        self.advance(RunStage::Loading, &format!("Reading {} files...", label));
        let tables = load_all(files)?;
        self.stage = RunStage::Merging;
        self.merge_set(label, tables)
    }

    fn merge_set(&mut self, label: &str, tables: Vec<Table>) -> ProcessResult<Table> {
        if tables.len() > 1 {
            self.log.push(format!("Merging {} {} files...", tables.len(), label));
        }
        let merged = merge_tables(tables)
            .map_err(|e| ProcessError::SchemaMismatch(format!("{} files: {}", label, strip_prefix(&e))))?;
        self.log.push(format!("{} data shape: {:?}", label, merged.shape()));
        Ok(merged)
    }
}

fn load_all(files: &[UploadedFile]) -> ProcessResult<Vec<Table>> {
    files
        .iter()
        .map(|file| load_csv_bytes(&file.name, &file.bytes))
        .collect()
}

fn strip_prefix(err: &ProcessError) -> String {
    match err {
        ProcessError::SchemaMismatch(message) => message.clone(),
        other => other.to_string(),
    }
}
