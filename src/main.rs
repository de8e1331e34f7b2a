mod config;
mod csv_combiner;
mod csv_filter;
mod csv_loader;
mod csv_manager;
mod csv_merger;
mod csv_serializer;
mod csv_table;
mod errors;
mod keyword_processor;
mod user_experience;
mod user_interaction;

use crate::config::{csv_db_path, edit_config, load_config, Config};
use crate::csv_manager::{
    file_name_of, prompt_output_file_name, read_uploads, select_csv_files,
};
use crate::csv_loader::load_csv_file;
use crate::csv_serializer::save_csv;
use crate::keyword_processor::{KeywordProcessor, RunSettings, UploadedFile};
use crate::user_experience::{handle_quit_flag, handle_special_flag};
use crate::user_interaction::{
    determine_action_as_text, get_user_input, print_error, print_insight, print_insight_level_2,
    print_list, print_success,
};
use chrono::Utc;
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// What the operator has picked so far. Lives for the whole session.
struct Session {
    target_files: Vec<PathBuf>,
    all_files: Vec<PathBuf>,
    settings: RunSettings,
    config: Config,
}

impl Session {
    fn describe(&self) {
        let list = |files: &[PathBuf]| {
            if files.is_empty() {
                "none".to_string()
            } else {
                files.iter().map(|p| file_name_of(p)).collect::<Vec<_>>().join(", ")
            }
        };
        print_insight_level_2(&format!("Target files: {}", list(&self.target_files)));
        print_insight_level_2(&format!("All files: {}", list(&self.all_files)));
        print_insight_level_2(&format!("Output filename: {}", self.settings.output_file_name));
    }
}

/// Peeks at each picked file so a broken csv shows up before the run.
fn report_picked_files(files: &[PathBuf]) {
    for path in files {
        match load_csv_file(path) {
            Ok(table) => print_insight_level_2(&format!(
                "{}: shape {:?}",
                file_name_of(path),
                table.shape()
            )),
            Err(e) => print_error(&e.to_string()),
        }
    }
}

fn process_files(session: &Session) {
    let uploads = read_uploads(&session.target_files)
        .and_then(|target| Ok((target, read_uploads(&session.all_files)?)));
    let (target_uploads, all_uploads): (Vec<UploadedFile>, Vec<UploadedFile>) = match uploads {
        Ok(uploads) => uploads,
        Err(e) => {
            print_error(&format!("An error occurred: {}", e));
            return;
        }
    };

    let mut processor = KeywordProcessor::new();
    print_insight(processor.status_message());

    let mut settings = session.settings.clone();
    settings.strict_columns = session.config.strict_columns;

    let result = processor.run(&target_uploads, &all_uploads, &settings);
    println!("{}", processor.log().render());

    match result {
        Ok(output) => {
            output.table.print_table(session.config.preview_rows);
            match save_csv(&output.csv_bytes, &session.config.output_path(), &output.file_name) {
                Ok(path) => {
                    print_success(processor.status_message());
                    print_insight(&format!("CSV file saved at {}", path.display()));
                }
                Err(e) => print_error(&format!("An error occurred: {}", e)),
            }
        }
        Err(_) => print_error(processor.status_message()),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if std::env::args().any(|arg| arg == "--version") {
        print_insight(VERSION);
        std::process::exit(0);
    }

    let config = match load_config(&csv_db_path()) {
        Ok(config) => config,
        Err(e) => {
            print_error(&format!("Couldn't read the config ({}). Rolling with defaults.", e));
            Config::default()
        }
    };

    let mut session = Session {
        target_files: Vec::new(),
        all_files: Vec::new(),
        settings: RunSettings::new(Utc::now()),
        config,
    };

    println!();
    print_insight("Keyword Processor");
    print_insight("Ready to process files.");

    let menu_options = vec![
        "SELECT TARGET FILES",
        "SELECT ALL FILES",
        "SET OUTPUT FILENAME",
        "PROCESS FILES",
        "SHOW SELECTIONS",
        "CONFIG",
    ];

    loop {
        print_list(&menu_options);
        let choice = get_user_input("Your move, bro: ");
        handle_quit_flag(&choice);
        if handle_special_flag(&choice) {
            continue;
        }

        match determine_action_as_text(&menu_options, &choice) {
            Some(ref action) if action == "SELECT TARGET FILES" => {
                if let Some(files) = select_csv_files("Target", &session.config.input_paths()) {
                    report_picked_files(&files);
                    session.target_files = files;
                }
            }
            Some(ref action) if action == "SELECT ALL FILES" => {
                if let Some(files) = select_csv_files("All", &session.config.input_paths()) {
                    report_picked_files(&files);
                    session.all_files = files;
                }
            }
            Some(ref action) if action == "SET OUTPUT FILENAME" => {
                session.settings.output_file_name =
                    prompt_output_file_name(&session.settings.output_file_name);
                print_insight_level_2(&format!(
                    "Output filename: {}",
                    session.settings.output_file_name
                ));
            }
            Some(ref action) if action == "PROCESS FILES" => process_files(&session),
            Some(ref action) if action == "SHOW SELECTIONS" => session.describe(),
            Some(ref action) if action == "CONFIG" => {
                match edit_config(&csv_db_path()) {
                    Ok(config) => session.config = config,
                    Err(e) => print_error(&format!("Config not updated: {}", e)),
                }
            }
            _ => {
                print_insight("Dude, that action's a no-go. Give it another whirl, alright?");
            }
        }
        println!();
    }
}
