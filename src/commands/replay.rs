//! Chat log replay
//!
//! Plays a recorded chat log against a known answer and reports the final
//! keyboard and scoreboard. Log lines look like `user: message` or
//! `user#RRGGBB: message`; anything else is skipped.

use crate::chat::ChatMessage;
use crate::config::GameConfig;
use crate::core::{Evaluation, KeyboardState, Scoreboard, Word};
use crate::game::{Game, GameEvent};
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

/// Outcome of a replay
pub struct ReplayResult {
    pub answer: Word,
    /// Every accepted guess, in log order
    pub evaluations: Vec<Evaluation>,
    pub keyboard: KeyboardState,
    pub scoreboard: Scoreboard,
    pub solved_by: Option<String>,
    /// Lines that parsed as chat messages
    pub messages: usize,
    /// Lines that did not
    pub skipped_lines: usize,
}

/// Parse one log line into a chat message
///
/// # Examples
/// ```
/// use twitch_wordle::commands::parse_log_line;
///
/// let message = parse_log_line("viewer#FF0000: crane").unwrap();
/// assert_eq!(message.user, "viewer");
/// assert_eq!(message.text, "crane");
/// assert!(message.color.is_some());
/// ```
#[must_use]
pub fn parse_log_line(line: &str) -> Option<ChatMessage> {
    let (sender, text) = line.split_once(':')?;
    let sender = sender.trim();
    let (user, color) = match sender.split_once('#') {
        Some((user, color)) => (user, Some(color.parse().ok()?)),
        None => (sender, None),
    };
    if user.is_empty() || user.contains(char::is_whitespace) {
        return None;
    }

    let message = ChatMessage::new(user, text.trim());
    Some(match color {
        Some(color) => message.with_color(color),
        None => message,
    })
}

/// Replay log `content` against `answer`
///
/// Log lines carry no timestamps, so cooldowns are ignored and every logged
/// guess is played.
///
/// # Errors
///
/// Returns an error if the game cannot be created.
pub fn replay_log(content: &str, answer: Word, config: GameConfig) -> Result<ReplayResult> {
    let mut game = Game::new(
        config.with_guess_cooldown(Duration::ZERO),
        vec![answer.clone()],
    )?;

    let now = Instant::now();
    let mut messages = 0;
    let mut skipped_lines = 0;

    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        let Some(message) = parse_log_line(line) else {
            debug!("Skipping log line '{line}'");
            skipped_lines += 1;
            continue;
        };
        messages += 1;

        let events = game.submit(&message, now);
        if events
            .iter()
            .any(|e| matches!(e, GameEvent::RoundSolved { .. }))
        {
            debug!("Round solved at log message {messages}");
        }
    }

    let round = game.round();
    let evaluations: Vec<Evaluation> = round
        .history()
        .iter()
        .map(|guess| guess.evaluation.clone())
        .collect();
    let keyboard = KeyboardState::from_evaluations(&evaluations);
    debug_assert_eq!(keyboard, *round.keyboard());

    Ok(ReplayResult {
        answer,
        keyboard,
        solved_by: round.solved_by().map(str::to_string),
        scoreboard: game.scoreboard().clone(),
        evaluations,
        messages,
        skipped_lines,
    })
}

/// Replay the log file at `path`
///
/// # Errors
///
/// Returns an error if the file cannot be read or the answer is invalid.
pub fn replay_file<P: AsRef<Path>>(
    path: P,
    answer: &str,
    config: GameConfig,
) -> Result<ReplayResult> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read chat log {}", path.display()))?;
    let answer = Word::new(answer).with_context(|| format!("Invalid answer '{answer}'"))?;
    replay_log(&content, answer, config)
}
