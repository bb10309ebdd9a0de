//! Chat connection state machine
//!
//! ```text
//!            request_connect            membership seen
//!   Idle ──────────────────▶ Connecting ───────────────▶ Connected
//!    ▲                          │   ▲                        │
//!    │                          │   │ request_connect        │
//!    │           retry budget   ▼   │                        │
//!    │           exhausted    Failed                         │
//!    └──────────────────── disconnect ◀──────────────────────┘
//! ```
//!
//! [`ConnectionSession`] holds the transitions; [`Connector`] drives them from a
//! polling task and reports [`ConnectionEvent`]s.

mod connector;
mod session;

pub use connector::Connector;
pub use session::{ConnectionSession, ConnectionStatus, TickOutcome};

use std::fmt;
use std::time::Duration;

/// Longest channel name Twitch allows
const MAX_CHANNEL_LEN: usize = 25;

/// Timing of the membership poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Time between polls; the first poll happens one interval after the request
    pub poll_interval: Duration,
    /// Empty polls tolerated before the attempt fails
    pub max_attempts: u32,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            max_attempts: 5,
        }
    }
}

/// Connection errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// The user typed something that cannot be a channel name.
    InvalidChannel(String),
    /// A connection is already pending or established.
    AlreadyActive(ConnectionStatus),
    /// There is nothing to disconnect.
    NotActive,
    /// The retry budget ran out before the channel was joined.
    Failed { channel: String, attempts: u32 },
    /// The chat source refused to start the subscription.
    Subscribe { channel: String, reason: String },
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChannel(name) => write!(f, "'{name}' is not a valid channel name"),
            Self::AlreadyActive(status) => write!(f, "Connection already {status}"),
            Self::NotActive => write!(f, "Not connected"),
            Self::Failed { channel, attempts } => {
                write!(f, "Connection failed: #{channel} not joined after {attempts} tries")
            }
            Self::Subscribe { channel, reason } => {
                write!(f, "Could not start joining #{channel}: {reason}")
            }
        }
    }
}

impl std::error::Error for ConnectionError {}

/// Lifecycle notifications for presentation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    Connecting { channel: String },
    Connected { channel: String },
    /// Carries [`ConnectionError::Failed`]; the session is ready for a new attempt
    Failed(ConnectionError),
    Disconnected,
}

/// Validate and normalise a user-entered channel name
///
/// Accepts an optional leading `#` and any case.
///
/// # Errors
/// Returns [`ConnectionError::InvalidChannel`] for empty names, names longer than
/// 25 characters, and names with characters outside `[a-z0-9_]`.
///
/// # Examples
/// ```
/// use twitch_wordle::connection::normalize_channel;
///
/// assert_eq!(normalize_channel(" #SomeStreamer ").unwrap(), "somestreamer");
/// assert!(normalize_channel("two words").is_err());
/// ```
pub fn normalize_channel(input: &str) -> Result<String, ConnectionError> {
    let name = input.trim().trim_start_matches('#').to_ascii_lowercase();
    let valid = !name.is_empty()
        && name.len() <= MAX_CHANNEL_LEN
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');
    if valid {
        Ok(name)
    } else {
        Err(ConnectionError::InvalidChannel(input.trim().to_string()))
    }
}

/// Query string that reopens the game on `channel`
#[must_use]
pub fn share_query(channel: &str) -> String {
    format!("?channel={channel}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timing() {
        let config = ConnectionConfig::default();
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.max_attempts, 5);
    }

    #[test]
    fn normalize_accepts_twitch_names() {
        assert_eq!(normalize_channel("streamer_01").unwrap(), "streamer_01");
        assert_eq!(normalize_channel("#Streamer").unwrap(), "streamer");
    }

    #[test]
    fn normalize_rejects_bad_names() {
        assert_eq!(
            normalize_channel("   "),
            Err(ConnectionError::InvalidChannel(String::new()))
        );
        assert!(normalize_channel("#").is_err());
        assert!(normalize_channel("bad-name").is_err());
        assert!(normalize_channel(&"a".repeat(26)).is_err());
    }

    #[test]
    fn share_query_format() {
        assert_eq!(share_query("streamer"), "?channel=streamer");
    }

    #[test]
    fn failed_error_message() {
        let err = ConnectionError::Failed {
            channel: "streamer".to_string(),
            attempts: 5,
        };
        assert_eq!(
            err.to_string(),
            "Connection failed: #streamer not joined after 5 tries"
        );
    }
}
