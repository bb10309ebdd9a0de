//! Game configuration
//!
//! Defaults match what streamers expect out of the box; the CLI overrides
//! individual fields.

use crate::connection::ConnectionConfig;
use std::time::Duration;

/// Timing knobs for a game session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    /// How long a viewer waits between accepted guesses
    pub guess_cooldown: Duration,
    /// Pause between a solve and the next round
    pub next_round_delay: Duration,
    pub connection: ConnectionConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            guess_cooldown: Duration::from_secs(3),
            next_round_delay: Duration::from_secs(5),
            connection: ConnectionConfig::default(),
        }
    }
}

impl GameConfig {
    #[must_use]
    pub const fn with_guess_cooldown(mut self, cooldown: Duration) -> Self {
        self.guess_cooldown = cooldown;
        self
    }

    #[must_use]
    pub const fn with_next_round_delay(mut self, delay: Duration) -> Self {
        self.next_round_delay = delay;
        self
    }

    #[must_use]
    pub const fn with_connection(mut self, connection: ConnectionConfig) -> Self {
        self.connection = connection;
        self
    }
}
