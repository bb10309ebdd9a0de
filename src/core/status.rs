//! Per-letter feedback status
//!
//! The variants are ordered by how much they tell about a letter:
//! - 0 = Unset (never guessed)
//! - 1 = `NotInWord`
//! - 2 = `InWrongPlace`
//! - 3 = `InCorrectPlace`
//!
//! The ordering is load-bearing: the keyboard keeps the maximum status seen for a
//! letter and scoring is the difference between two encodings.

use std::fmt;

/// Feedback for one letter, ordered low to high
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LetterStatus {
    #[default]
    Unset = 0,
    NotInWord = 1,
    InWrongPlace = 2,
    InCorrectPlace = 3,
}

impl LetterStatus {
    /// Integer encoding used for scoring
    #[inline]
    #[must_use]
    pub const fn value(self) -> i32 {
        self as i32
    }

    /// Emoji square for this status
    #[must_use]
    pub const fn emoji(self) -> char {
        match self {
            Self::InCorrectPlace => '🟩',
            Self::InWrongPlace => '🟨',
            Self::NotInWord => '⬛',
            Self::Unset => '⬜',
        }
    }
}

impl fmt::Display for LetterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unset => "unset",
            Self::NotInWord => "not in word",
            Self::InWrongPlace => "wrong place",
            Self::InCorrectPlace => "correct place",
        };
        write!(f, "{name}")
    }
}
