//! Connection session reducer
//!
//! Pure state transitions for one chat connection attempt. No timers and no I/O:
//! the [`Connector`](super::Connector) feeds it ticks and acts on the outcomes.

use super::ConnectionError;
use std::fmt;

/// Lifecycle of a chat connection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Idle,
    Connecting,
    Connected,
    /// Retry budget exhausted; a new attempt may be requested
    Failed,
}

impl ConnectionStatus {
    /// Whether a new connection may be requested from this status
    #[must_use]
    pub const fn can_connect(self) -> bool {
        matches!(self, Self::Idle | Self::Failed)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// What a poll tick decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still waiting; `attempts` polls have come back empty so far
    Waiting { attempts: u32 },
    /// Membership confirmed
    Connected { channel: String },
    /// Retry budget exhausted for `channel`
    Failed { channel: String, attempts: u32 },
    /// The session was not connecting (e.g. disconnected mid-attempt)
    Ignored,
}

/// Channel, status and attempt count of the current connection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionSession {
    channel: Option<String>,
    status: ConnectionStatus,
    attempts: u32,
}

impl ConnectionSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Pending channel while connecting, confirmed channel once connected
    #[must_use]
    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Begin connecting to `channel`
    ///
    /// # Errors
    /// Returns [`ConnectionError::AlreadyActive`] unless the session is `Idle` or
    /// `Failed`.
    pub fn request_connect(&mut self, channel: &str) -> Result<(), ConnectionError> {
        if !self.status.can_connect() {
            return Err(ConnectionError::AlreadyActive(self.status));
        }
        self.channel = Some(channel.to_string());
        self.status = ConnectionStatus::Connecting;
        self.attempts = 0;
        Ok(())
    }

    /// Apply one poll result
    ///
    /// `joined` is what the chat source currently reports; any entry confirms the
    /// connection. Otherwise the attempt counter grows and the session fails once
    /// it reaches `max_attempts`.
    pub fn tick(&mut self, joined: &[String], max_attempts: u32) -> TickOutcome {
        if self.status != ConnectionStatus::Connecting {
            return TickOutcome::Ignored;
        }

        if let Some(first) = joined.first() {
            let channel = confirmed_channel_name(first);
            self.channel = Some(channel.clone());
            self.status = ConnectionStatus::Connected;
            return TickOutcome::Connected { channel };
        }

        self.attempts += 1;
        if self.attempts >= max_attempts {
            let channel = self.channel.take().unwrap_or_default();
            self.status = ConnectionStatus::Failed;
            return TickOutcome::Failed {
                channel,
                attempts: self.attempts,
            };
        }

        TickOutcome::Waiting {
            attempts: self.attempts,
        }
    }

    /// Drop the connection or the pending attempt
    ///
    /// Returns the channel that was connected or pending.
    ///
    /// # Errors
    /// Returns [`ConnectionError::NotActive`] unless the session is `Connecting` or
    /// `Connected`.
    pub fn disconnect(&mut self) -> Result<Option<String>, ConnectionError> {
        match self.status {
            ConnectionStatus::Connecting | ConnectionStatus::Connected => {
                let channel = self.channel.take();
                *self = Self::default();
                Ok(channel)
            }
            ConnectionStatus::Idle | ConnectionStatus::Failed => Err(ConnectionError::NotActive),
        }
    }
}

/// `#SomeChannel` as reported by the server → `somechannel`
fn confirmed_channel_name(joined: &str) -> String {
    joined.trim_start_matches('#').to_ascii_lowercase()
}
