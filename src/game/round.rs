//! A single round: one answer, its guesses and the shared keyboard

use crate::chat::AccentColor;
use crate::core::{
    Evaluation, EvaluationError, KeyboardState, LetterScore, LetterUpdates, ScoreTracker, Word,
    evaluate,
};

/// An accepted guess and who made it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guess {
    pub user: String,
    pub color: Option<AccentColor>,
    pub evaluation: Evaluation,
}

/// Result of playing one guess into a round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayOutcome {
    pub evaluation: Evaluation,
    /// Non-zero score changes, in keyboard order
    pub scores: Vec<LetterScore>,
    pub solved: bool,
}

#[derive(Debug, Clone)]
pub struct Round {
    number: u32,
    answer: Word,
    keyboard: KeyboardState,
    tracker: ScoreTracker,
    history: Vec<Guess>,
    revealed: Vec<bool>,
    solved_by: Option<String>,
}

impl Round {
    #[must_use]
    pub fn new(number: u32, answer: Word) -> Self {
        let revealed = vec![false; answer.len()];
        Self {
            number,
            answer,
            keyboard: KeyboardState::new(),
            tracker: ScoreTracker::new(),
            history: Vec::new(),
            revealed,
            solved_by: None,
        }
    }

    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }

    #[must_use]
    pub const fn answer(&self) -> &Word {
        &self.answer
    }

    #[must_use]
    pub const fn keyboard(&self) -> &KeyboardState {
        &self.keyboard
    }

    #[must_use]
    pub fn history(&self) -> &[Guess] {
        &self.history
    }

    #[must_use]
    pub fn solved_by(&self) -> Option<&str> {
        self.solved_by.as_deref()
    }

    #[must_use]
    pub const fn is_solved(&self) -> bool {
        self.solved_by.is_some()
    }

    /// Answer letters found in place so far, `None` for hidden positions
    pub fn revealed(&self) -> impl Iterator<Item = Option<u8>> + '_ {
        self.answer
            .letters()
            .iter()
            .zip(&self.revealed)
            .map(|(&letter, &shown)| shown.then_some(letter))
    }

    /// Evaluate `guess`, update the keyboard and score the letters that improved
    ///
    /// # Errors
    /// Returns [`EvaluationError::InvalidGuessLength`] if the guess length differs
    /// from the answer; the round is left untouched.
    pub fn play(
        &mut self,
        user: &str,
        color: Option<AccentColor>,
        guess: &Word,
    ) -> Result<PlayOutcome, EvaluationError> {
        let evaluation = evaluate(&self.answer, guess)?;

        for position in evaluation.found_positions() {
            self.revealed[position] = true;
        }

        let updates = LetterUpdates::from_evaluation(&evaluation);
        let scores = self
            .keyboard
            .apply(&updates)
            .into_iter()
            .filter_map(|change| self.tracker.record(change.letter, change.to))
            .collect();

        let solved = evaluation.is_solved();
        if solved {
            self.solved_by = Some(user.to_string());
        }

        self.history.push(Guess {
            user: user.to_string(),
            color,
            evaluation: evaluation.clone(),
        });

        Ok(PlayOutcome {
            evaluation,
            scores,
            solved,
        })
    }
}
