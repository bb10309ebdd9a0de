//! Twitch Wordle
//!
//! A Wordle round played by a whole Twitch chat: viewers type guesses, every
//! guess is scored against the shared keyboard, and the first exact guess wins
//! the round.
//!
//! # Quick Start
//!
//! ```rust
//! use twitch_wordle::core::{evaluate, KeyboardState, LetterStatus, LetterUpdates, Word};
//!
//! let answer = Word::new("crane").unwrap();
//! let guess = Word::new("react").unwrap();
//!
//! let evaluation = evaluate(&answer, &guess).unwrap();
//! println!("{}", evaluation.to_emoji());
//!
//! let keyboard = KeyboardState::new().fold(&LetterUpdates::from_evaluation(&evaluation));
//! assert_eq!(keyboard.status(b'a'), LetterStatus::InCorrectPlace);
//! ```

// Core domain types: evaluation, keyboard, scoring
pub mod core;

// Chat sources and the Twitch IRC client
pub mod chat;

// Chat connection state machine
pub mod connection;

// Timing defaults
pub mod config;

// Rounds, cooldowns and the scoreboard
pub mod game;

// Word lists
pub mod wordlists;

// Command implementations
pub mod commands;

// Terminal output formatting
pub mod output;
