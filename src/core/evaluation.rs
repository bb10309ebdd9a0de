//! Guess evaluation against the answer
//!
//! Produces one [`LetterStatus`] per guess position using Wordle's duplicate-aware
//! rules.

use super::{LetterStatus, Word};
use std::fmt;

/// Error returned when a guess cannot be compared with the answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    InvalidGuessLength { expected: usize, actual: usize },
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGuessLength { expected, actual } => {
                write!(f, "Guess must be {expected} letters, got {actual}")
            }
        }
    }
}

impl std::error::Error for EvaluationError {}

/// Feedback for a single guess
///
/// Statuses are in guess order and never change after evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    guess: Word,
    statuses: Vec<LetterStatus>,
}

/// Evaluate `guess` against `answer`
///
/// # Algorithm
/// 1. Every position starts as `NotInWord`
/// 2. First pass: exact matches become `InCorrectPlace` and consume their answer slot
/// 3. Second pass: each remaining guess letter takes the first unconsumed answer slot
///    holding the same letter and becomes `InWrongPlace`
///
/// An answer letter can satisfy at most one guess position, so repeated letters are
/// credited exactly as many times as the answer contains them.
///
/// # Errors
/// Returns [`EvaluationError::InvalidGuessLength`] if the lengths differ. The guess
/// is never truncated or padded.
///
/// # Examples
/// ```
/// use twitch_wordle::core::{evaluate, LetterStatus::*, Word};
///
/// let answer = Word::new("crane").unwrap();
/// let guess = Word::new("react").unwrap();
/// let evaluation = evaluate(&answer, &guess).unwrap();
///
/// assert_eq!(
///     evaluation.statuses(),
///     &[InWrongPlace, InWrongPlace, InCorrectPlace, InWrongPlace, NotInWord]
/// );
/// ```
pub fn evaluate(answer: &Word, guess: &Word) -> Result<Evaluation, EvaluationError> {
    if guess.len() != answer.len() {
        return Err(EvaluationError::InvalidGuessLength {
            expected: answer.len(),
            actual: guess.len(),
        });
    }

    let answer_letters = answer.letters();
    let guess_letters = guess.letters();
    let mut statuses = vec![LetterStatus::NotInWord; guess_letters.len()];
    let mut consumed = vec![false; answer_letters.len()];

    // First pass: exact position matches
    for (i, (&g, &a)) in guess_letters.iter().zip(answer_letters).enumerate() {
        if g == a {
            statuses[i] = LetterStatus::InCorrectPlace;
            consumed[i] = true;
        }
    }

    // Second pass: letters present elsewhere among unconsumed answer slots
    for (i, &g) in guess_letters.iter().enumerate() {
        if statuses[i] == LetterStatus::InCorrectPlace {
            continue;
        }
        let slot = answer_letters
            .iter()
            .enumerate()
            .position(|(j, &a)| !consumed[j] && a == g);
        if let Some(j) = slot {
            statuses[i] = LetterStatus::InWrongPlace;
            consumed[j] = true;
        }
    }

    Ok(Evaluation {
        guess: guess.clone(),
        statuses,
    })
}

impl Evaluation {
    /// The evaluated guess
    #[must_use]
    pub const fn guess(&self) -> &Word {
        &self.guess
    }

    /// Status per position, in guess order
    #[must_use]
    pub fn statuses(&self) -> &[LetterStatus] {
        &self.statuses
    }

    /// Pairs of (letter, status) in guess order
    pub fn iter(&self) -> impl Iterator<Item = (u8, LetterStatus)> + '_ {
        self.guess
            .letters()
            .iter()
            .copied()
            .zip(self.statuses.iter().copied())
    }

    /// Check if every position is in the correct place
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.statuses
            .iter()
            .all(|&s| s == LetterStatus::InCorrectPlace)
    }

    /// Count positions with the given status
    #[must_use]
    pub fn count(&self, status: LetterStatus) -> usize {
        self.statuses.iter().filter(|&&s| s == status).count()
    }

    /// Positions whose letter is in the correct place
    pub fn found_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.statuses
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == LetterStatus::InCorrectPlace)
            .map(|(i, _)| i)
    }

    /// Render as a row of emoji squares, e.g. "🟨🟨🟩🟨⬛"
    #[must_use]
    pub fn to_emoji(&self) -> String {
        self.statuses.iter().map(|s| s.emoji()).collect()
    }
}
