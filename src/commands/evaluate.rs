//! Single-guess evaluation command

use crate::core::{Evaluation, Word, evaluate};
use anyhow::{Context, Result};

/// Evaluate `guess` against `answer`
///
/// # Errors
///
/// Returns an error if either word is invalid or their lengths differ.
///
/// # Examples
/// ```
/// use twitch_wordle::commands::evaluate_words;
///
/// let evaluation = evaluate_words("crane", "CRANE").unwrap();
/// assert!(evaluation.is_solved());
/// ```
pub fn evaluate_words(answer: &str, guess: &str) -> Result<Evaluation> {
    let answer = Word::new(answer).with_context(|| format!("Invalid answer '{answer}'"))?;
    let guess = Word::new(guess).with_context(|| format!("Invalid guess '{guess}'"))?;
    Ok(evaluate(&answer, &guess)?)
}
