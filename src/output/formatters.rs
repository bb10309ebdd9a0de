//! Formatting utilities for terminal output

use crate::chat::AccentColor;
use crate::core::{Evaluation, KeyboardState, LetterStatus};
use colored::{ColoredString, Colorize};

/// Keyboard layout used when printing the shared keyboard
pub const KEYBOARD_ROWS: [&str; 3] = ["qwertyuiop", "asdfghjkl", "zxcvbnm"];

/// A letter as a coloured tile, e.g. ` A ` on green
#[must_use]
pub fn letter_tile(letter: u8, status: LetterStatus) -> ColoredString {
    let text = format!(" {} ", char::from(letter.to_ascii_uppercase()));
    match status {
        LetterStatus::Unset => text.normal(),
        LetterStatus::NotInWord => text.white().on_bright_black(),
        LetterStatus::InWrongPlace => text.black().on_yellow(),
        LetterStatus::InCorrectPlace => text.black().on_green(),
    }
}

/// All tiles of a guess in order
#[must_use]
pub fn guess_tiles(evaluation: &Evaluation) -> String {
    evaluation
        .iter()
        .map(|(letter, status)| letter_tile(letter, status).to_string())
        .collect()
}

/// One line per keyboard row, each key coloured by its best status
#[must_use]
pub fn keyboard_rows(keyboard: &KeyboardState) -> Vec<String> {
    KEYBOARD_ROWS
        .iter()
        .map(|row| {
            row.bytes()
                .map(|letter| letter_tile(letter, keyboard.status(letter)).to_string())
                .collect()
        })
        .collect()
}

/// Answer letters found so far, e.g. `C _ A _ _`
#[must_use]
pub fn revealed_pattern(revealed: impl IntoIterator<Item = Option<u8>>) -> String {
    revealed
        .into_iter()
        .map(|slot| slot.map_or('_', |letter| char::from(letter.to_ascii_uppercase())))
        .map(String::from)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Username in the colour the viewer picked
#[must_use]
pub fn user_name(user: &str, color: Option<AccentColor>) -> ColoredString {
    match color {
        Some(c) => user.truecolor(c.r, c.g, c.b).bold(),
        None => user.bold(),
    }
}

/// Signed score change, e.g. `+3`
#[must_use]
pub fn format_delta(delta: i32) -> String {
    format!("{delta:+}")
}

/// Create a progress bar string
#[must_use]
pub fn create_progress_bar(value: i64, max: i64, width: usize) -> String {
    let filled = if max <= 0 || value <= 0 {
        0
    } else {
        let ratio = value.min(max) as f64 / max as f64;
        // Clamped to [0, width] above
        (ratio * width as f64).round() as usize
    };

    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}
