//! Terminal UI helpers.
//!
//! Status markers, the compile spinner, and width measurement that ignores
//! ANSI color codes.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub fn info(msg: &str) {
    println!("{} {}", "[INFO]".bright_blue(), msg);
}

pub fn warning(msg: &str) {
    println!("{} {}", "[WARNING]".bright_red(), msg);
}

pub fn done(msg: &str) {
    println!("{} {}", "[DONE]".bright_green(), msg);
}

/// Spinner shown while the compiler runs. Hidden when stderr is not a terminal.
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["[/]", "[-]", "[\\]", "[|]", "[✓]"])
        .template("{msg} {spinner:.green}")
    {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Display width of `s`, not counting ANSI escape sequences.
pub fn visible_width(s: &str) -> usize {
    console::measure_text_width(s)
}

/// `[PASSED]`/`[FAILED]` marker with the label colored.
pub fn outcome_marker(passed: bool) -> String {
    if passed {
        format!("[{}]", "PASSED".bright_green())
    } else {
        format!("[{}]", "FAILED".bright_red())
    }
}

/// `1 fail`, `0 fails`, `3 fails`.
pub fn count_noun(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

/// 64-bit when the target architecture name ends in 64.
pub fn machine_word_size() -> &'static str {
    if std::env::consts::ARCH.ends_with("64") {
        "64-bit"
    } else {
        "32-bit"
    }
}
