//! Chat sources
//!
//! A chat source delivers the messages viewers type into a channel. The
//! connection state machine only needs three things from it: start a
//! subscription, stop it, and report which channels are currently joined.
//!
//! ```text
//! ChatSource (trait)
//!     │
//!     └── TwitchChat   anonymous read-only IRC session on irc.chat.twitch.tv
//! ```
//!
//! Messages flow separately, through the `mpsc` receiver handed out when the
//! source is created.

mod color;
pub mod irc;
mod twitch;

pub use color::{AccentColor, ColorParseError};
pub use twitch::{TWITCH_IRC_ADDR, TwitchChat};

use async_trait::async_trait;
use std::fmt;
use std::io;

/// A message typed into chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Display name of the sender
    pub user: String,
    /// Raw message text
    pub text: String,
    /// Name colour chosen by the sender, if any
    pub color: Option<AccentColor>,
}

impl ChatMessage {
    #[must_use]
    pub fn new(user: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            text: text.into(),
            color: None,
        }
    }

    #[must_use]
    pub const fn with_color(mut self, color: AccentColor) -> Self {
        self.color = Some(color);
        self
    }
}

/// Errors raised by a chat source
#[derive(Debug)]
pub enum ChatError {
    /// The transport could not be opened or written to.
    Io(io::Error),
    /// The source was shut down.
    Closed,
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Chat I/O error: {e}"),
            Self::Closed => write!(f, "Chat source closed"),
        }
    }
}

impl std::error::Error for ChatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Closed => None,
        }
    }
}

impl From<io::Error> for ChatError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// An external feed of chat messages for one channel at a time
#[async_trait]
pub trait ChatSource: Send + Sync {
    /// Start joining `channel` (already normalised, without `#`).
    ///
    /// Returning `Ok` means the attempt was started, not that the channel was
    /// joined; confirmation shows up later in [`ChatSource::joined_channels`].
    async fn subscribe(&self, channel: &str) -> Result<(), ChatError>;

    /// Leave the current channel and release the transport.
    async fn unsubscribe(&self);

    /// Channels the source has confirmed membership of, as reported by the
    /// server (Twitch prefixes them with `#`).
    fn joined_channels(&self) -> Vec<String>;
}
