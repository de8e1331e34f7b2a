// user_interaction.rs
use fuzzywuzzy::fuzz;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use vim_edit::vim_edit;

const BOLD_ORANGE: &str = "\x1b[1;38;5;208m";
const ORANGE: &str = "\x1b[0;38;5;208m";
const BOLD_YELLOW: &str = "\x1b[1;33m";
const GREEN: &str = "\x1b[0;32m";
const RED: &str = "\x1b[1;31m";
const RESET: &str = "\x1b[0m";

/// Minimum fuzzy score for a typed fragment to count as a match.
pub const FUZZY_THRESHOLD: u8 = 60;

fn read_line(styled_prompt: &str) -> String {
    let mut rl = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            tracing::error!("failed to initialize editor: {:?}", err);
            return String::new();
        }
    };

    match rl.readline(styled_prompt) {
        Ok(line) => {
            let _ = rl.add_history_entry(line.as_str());
            line
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
            println!("Input interrupted or end of file reached.");
            String::new()
        }
        Err(err) => {
            tracing::error!("error reading line: {:?}", err);
            String::new()
        }
    }
}

pub fn get_user_input(prompt: &str) -> String {
    read_line(&format!("{}@BIGbro: {}{}", BOLD_ORANGE, prompt, RESET))
}

pub fn get_user_input_level_2(prompt: &str) -> String {
    read_line(&format!("  {}@LILbro: {}{}", ORANGE, prompt, RESET))
}

/// Opens `config_text` in vim and returns what was saved.
pub fn get_edited_user_config_input(config_text: String) -> String {
    vim_edit(config_text)
}

pub fn print_list(options: &[&str]) {
    let max_digits = options.len().to_string().len();
    for (index, option) in options.iter().enumerate() {
        let padded_index = format!("{:width$}:", index + 1, width = max_digits);
        println!("  {}{} {}{}", BOLD_YELLOW, padded_index, option, RESET);
    }
}

/// Serial number first, then the closest fuzzy match on the option text.
pub fn determine_action_as_text(menu_options: &[&str], choice: &str) -> Option<String> {
    determine_action_as_number(menu_options, choice).map(|index| menu_options[index - 1].to_string())
}

/// 1-based position of the chosen option.
pub fn determine_action_as_number(menu_options: &[&str], choice: &str) -> Option<usize> {
    let choice = choice.trim().to_lowercase();
    if choice.is_empty() {
        return None;
    }

    if let Ok(index) = choice.parse::<usize>() {
        if index > 0 && index <= menu_options.len() {
            return Some(index);
        }
    }

    menu_options
        .iter()
        .enumerate()
        .map(|(index, option)| (index + 1, fuzz::ratio(&choice, &option.to_lowercase())))
        .filter(|&(_, score)| score > FUZZY_THRESHOLD)
        .max_by_key(|&(_, score)| score)
        .map(|(index, _)| index)
}

pub fn print_insight(message: &str) {
    println!("{}@BIGBro: {}{}", BOLD_ORANGE, message, RESET);
}

pub fn print_insight_level_2(message: &str) {
    println!("  {}@LILBro: {}{}", ORANGE, message, RESET);
}

pub fn print_success(message: &str) {
    println!("{}@BIGBro: {}{}", GREEN, message, RESET);
}

pub fn print_error(message: &str) {
    println!("{}@BIGBro: {}{}", RED, message, RESET);
}
