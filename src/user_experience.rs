// src/user_experience.rs
use crate::user_interaction::{print_insight, print_list};

const FLAGS: [&str; 4] = [
    "@b           : File picker => Back to the main menu",
    "@c           : File picker/ Filename prompt => Cancel action",
    "@f / @flags  : Main menu => View all flags",
    "@q           : Anywhere => Quit",
];

/// Handles flags that need no run state. Returns true when `flag` was one.
pub fn handle_special_flag(flag: &str) -> bool {
    match flag.trim() {
        "@f" | "@flags" => {
            print_insight("Serving your flags ...");
            print_list(&FLAGS);
            println!();
            true
        }
        _ => false,
    }
}

pub fn handle_back_flag(flag: &str) -> bool {
    flag.trim() == "@b"
}

pub fn handle_quit_flag(flag: &str) {
    if is_quit_flag(flag) {
        std::process::exit(0);
    }
}

fn is_quit_flag(flag: &str) -> bool {
    flag.trim() == "@q"
}

pub fn handle_cancel_flag(flag: &str) -> bool {
    flag.trim().starts_with("@c")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_flags() {
        assert!(handle_back_flag(" @b "));
        assert!(!handle_back_flag("b"));
        assert!(handle_cancel_flag("@c"));
        assert!(handle_cancel_flag("@cancel"));
        assert!(is_quit_flag("@q"));
        assert!(!is_quit_flag("quit"));
        assert!(!handle_special_flag("@nope"));
    }
}
