//! Core domain types for the guess engine
//!
//! Everything here is synchronous and free of I/O: comparing a guess with the
//! answer, folding guesses into the shared keyboard and turning keyboard changes
//! into points.

mod evaluation;
mod keyboard;
mod score;
mod status;
mod word;

pub use evaluation::{Evaluation, EvaluationError, evaluate};
pub use keyboard::{KeyboardState, LetterChange, LetterUpdates};
pub use score::{LetterScore, ScoreTracker, Scoreboard, score_delta, solve_bonus};
pub use status::LetterStatus;
pub use word::{MAX_WORD_LEN, Word, WordError};
