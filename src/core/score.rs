//! Scoring rules
//!
//! Points come from letters improving on the shared keyboard (the difference
//! between the old and new status encodings) plus a bonus for solving the word.

use super::LetterStatus;
use rustc_hash::FxHashMap;

/// Points for a letter moving from `old` to `new`
///
/// # Examples
/// ```
/// use twitch_wordle::core::{score_delta, LetterStatus};
///
/// assert_eq!(score_delta(LetterStatus::Unset, LetterStatus::InCorrectPlace), 3);
/// assert_eq!(score_delta(LetterStatus::InWrongPlace, LetterStatus::InCorrectPlace), 1);
/// assert_eq!(score_delta(LetterStatus::NotInWord, LetterStatus::NotInWord), 0);
/// ```
#[inline]
#[must_use]
pub const fn score_delta(old: LetterStatus, new: LetterStatus) -> i32 {
    new.value() - old.value()
}

/// Bonus for guessing the answer exactly
#[inline]
#[must_use]
pub const fn solve_bonus(guess_length: usize) -> u32 {
    guess_length as u32
}

/// A non-zero score change for one letter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LetterScore {
    pub letter: u8,
    pub status: LetterStatus,
    pub delta: i32,
}

/// Remembers the last scored status of every letter within a round
#[derive(Debug, Clone, Default)]
pub struct ScoreTracker {
    previous: FxHashMap<u8, LetterStatus>,
}

impl ScoreTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `letter` now shows `status`
    ///
    /// Returns `None` when nothing changed, so no score notification is due.
    pub fn record(&mut self, letter: u8, status: LetterStatus) -> Option<LetterScore> {
        let letter = letter.to_ascii_lowercase();
        let previous = self.previous(letter);
        let delta = score_delta(previous, status);
        if delta == 0 {
            return None;
        }
        self.previous.insert(letter, status);
        Some(LetterScore {
            letter,
            status,
            delta,
        })
    }

    /// Last scored status for `letter`
    #[must_use]
    pub fn previous(&self, letter: u8) -> LetterStatus {
        self.previous
            .get(&letter.to_ascii_lowercase())
            .copied()
            .unwrap_or_default()
    }

    /// Forget everything; the next observations score from `Unset`
    pub fn reset(&mut self) {
        self.previous.clear();
    }
}

/// Running points per submitter
#[derive(Debug, Clone, Default)]
pub struct Scoreboard {
    points: FxHashMap<String, i64>,
}

impl Scoreboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `points` to `user` and return their new total
    pub fn credit(&mut self, user: &str, points: i64) -> i64 {
        let total = self.points.entry(user.to_string()).or_insert(0);
        *total += points;
        *total
    }

    #[must_use]
    pub fn points(&self, user: &str) -> i64 {
        self.points.get(user).copied().unwrap_or(0)
    }

    /// Top `n` users by points, ties broken by name
    #[must_use]
    pub fn leaders(&self, n: usize) -> Vec<(&str, i64)> {
        let mut entries: Vec<(&str, i64)> = self
            .points
            .iter()
            .map(|(user, &points)| (user.as_str(), points))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries.truncate(n);
        entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
