//! Game orchestrator
//!
//! Turns chat messages into guesses, plays them into the current [`Round`] and
//! reports what happened as [`GameEvent`]s. Everything here is synchronous;
//! callers serialise messages and pass the current time in.

mod round;

pub use round::{Guess, PlayOutcome, Round};

use crate::chat::{AccentColor, ChatMessage};
use crate::config::GameConfig;
use crate::core::{Evaluation, LetterScore, Scoreboard, Word, solve_bonus};
use log::{debug, info, warn};
use rand::prelude::IndexedRandom;
use rustc_hash::FxHashMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Something presentation may want to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    RoundStarted {
        number: u32,
        length: usize,
    },
    GuessEvaluated {
        user: String,
        color: Option<AccentColor>,
        evaluation: Evaluation,
        /// Cooldown now running for `user`
        cooldown: Duration,
    },
    LetterScored {
        user: String,
        score: LetterScore,
    },
    SolveBonus {
        user: String,
        points: u32,
    },
    RoundSolved {
        number: u32,
        user: String,
        answer: Word,
        guesses: usize,
    },
}

/// Why a chat message was not played
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    RoundSolved,
    /// Empty, several words, or non-letters
    NotAGuess,
    WrongLength { expected: usize, actual: usize },
    CoolingDown { remaining: Duration },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoundSolved => write!(f, "round already solved"),
            Self::NotAGuess => write!(f, "not a single word"),
            Self::WrongLength { expected, actual } => {
                write!(f, "expected {expected} letters, got {actual}")
            }
            Self::CoolingDown { remaining } => {
                write!(f, "cooling down for {}ms", remaining.as_millis())
            }
        }
    }
}

/// Errors creating a game
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    NoAnswers,
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAnswers => write!(f, "Answer list is empty"),
        }
    }
}

impl std::error::Error for GameError {}

pub struct Game {
    config: GameConfig,
    answers: Vec<Word>,
    round: Round,
    scoreboard: Scoreboard,
    /// Lower-cased user → end of their cooldown; `None` lasts until the next round
    cooldowns: FxHashMap<String, Option<Instant>>,
}

impl Game {
    /// Create a game and start round 1 with a random answer
    ///
    /// # Errors
    /// Returns [`GameError::NoAnswers`] if `answers` is empty.
    ///
    /// # Examples
    /// ```
    /// use std::time::Instant;
    /// use twitch_wordle::chat::ChatMessage;
    /// use twitch_wordle::config::GameConfig;
    /// use twitch_wordle::core::Word;
    /// use twitch_wordle::game::{Game, GameEvent};
    ///
    /// let answers = vec![Word::new("crane").unwrap()];
    /// let mut game = Game::new(GameConfig::default(), answers).unwrap();
    ///
    /// let events = game.submit(&ChatMessage::new("viewer", "crane"), Instant::now());
    /// assert!(matches!(events.last(), Some(GameEvent::RoundSolved { .. })));
    /// ```
    pub fn new(config: GameConfig, answers: Vec<Word>) -> Result<Self, GameError> {
        let answer = answers
            .choose(&mut rand::rng())
            .cloned()
            .ok_or(GameError::NoAnswers)?;
        Ok(Self {
            config,
            answers,
            round: Round::new(1, answer),
            scoreboard: Scoreboard::new(),
            cooldowns: FxHashMap::default(),
        })
    }

    #[must_use]
    pub const fn round(&self) -> &Round {
        &self.round
    }

    #[must_use]
    pub const fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    /// Announcement for the round in progress
    #[must_use]
    pub fn round_started(&self) -> GameEvent {
        GameEvent::RoundStarted {
            number: self.round.number(),
            length: self.round.answer().len(),
        }
    }

    /// Replace the current round with one for `answer`
    pub fn start_round(&mut self, answer: Word) -> GameEvent {
        let number = self.round.number() + 1;
        info!("Round {number} started ({} letters)", answer.len());
        self.round = Round::new(number, answer);
        self.cooldowns.clear();
        self.round_started()
    }

    /// Start a new round with a random answer, avoiding a repeat when possible
    pub fn next_round(&mut self) -> GameEvent {
        let previous = self.round.answer().clone();
        let fresh: Vec<&Word> = self.answers.iter().filter(|w| **w != previous).collect();
        let answer = fresh
            .choose(&mut rand::rng())
            .map_or(previous, |w| (*w).clone());
        self.start_round(answer)
    }

    /// Check whether `message` would be played at `now`
    ///
    /// # Errors
    /// Returns the [`Rejection`] explaining why the message is ignored.
    pub fn check(&self, message: &ChatMessage, now: Instant) -> Result<Word, Rejection> {
        if self.round.is_solved() {
            return Err(Rejection::RoundSolved);
        }

        let text = message.text.trim();
        if text.is_empty() || text.contains(char::is_whitespace) {
            return Err(Rejection::NotAGuess);
        }
        let guess = Word::new(text).map_err(|_| Rejection::NotAGuess)?;

        let expected = self.round.answer().len();
        if guess.len() != expected {
            return Err(Rejection::WrongLength {
                expected,
                actual: guess.len(),
            });
        }

        match self.cooldowns.get(&message.user.to_lowercase()) {
            Some(Some(until)) if now < *until => {
                return Err(Rejection::CoolingDown {
                    remaining: *until - now,
                });
            }
            Some(None) => {
                return Err(Rejection::CoolingDown {
                    remaining: Duration::MAX,
                });
            }
            _ => {}
        }

        Ok(guess)
    }

    /// Play a chat message as a guess
    ///
    /// Messages that are not valid guesses produce no events.
    pub fn submit(&mut self, message: &ChatMessage, now: Instant) -> Vec<GameEvent> {
        let guess = match self.check(message, now) {
            Ok(guess) => guess,
            Err(reason) => {
                debug!("Ignoring '{}' from {}: {reason}", message.text, message.user);
                return Vec::new();
            }
        };

        let outcome = match self.round.play(&message.user, message.color, &guess) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Guess from {} not played: {e}", message.user);
                return Vec::new();
            }
        };

        let cooldown = self.config.guess_cooldown;
        self.cooldowns
            .insert(message.user.to_lowercase(), now.checked_add(cooldown));

        let mut events = Vec::with_capacity(outcome.scores.len() + 3);
        events.push(GameEvent::GuessEvaluated {
            user: message.user.clone(),
            color: message.color,
            evaluation: outcome.evaluation,
            cooldown,
        });

        for score in outcome.scores {
            self.scoreboard
                .credit(&message.user, i64::from(score.delta));
            events.push(GameEvent::LetterScored {
                user: message.user.clone(),
                score,
            });
        }

        if outcome.solved {
            let points = solve_bonus(guess.len());
            self.scoreboard.credit(&message.user, i64::from(points));
            info!(
                "{} solved round {} with '{guess}'",
                message.user,
                self.round.number()
            );
            events.push(GameEvent::SolveBonus {
                user: message.user.clone(),
                points,
            });
            events.push(GameEvent::RoundSolved {
                number: self.round.number(),
                user: message.user.clone(),
                answer: self.round.answer().clone(),
                guesses: self.round.history().len(),
            });
        }

        events
    }
}
