//! IRCv3 line parsing
//!
//! Twitch chat speaks plain IRC with message tags:
//!
//! ```text
//! @color=#1E90FF;display-name=Viewer :viewer!viewer@viewer.tmi.twitch.tv PRIVMSG #chan :crane
//! └──────────── tags ─────────────┘ └────────────── prefix ─────────────┘ └cmd──┘ └params┘
//! ```

use rustc_hash::FxHashMap;

/// One parsed IRC line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IrcMessage {
    pub tags: FxHashMap<String, String>,
    pub prefix: Option<String>,
    pub command: String,
    pub params: Vec<String>,
}

impl IrcMessage {
    /// Parse a single line, with or without its trailing CRLF
    ///
    /// Returns `None` for blank lines and lines without a command.
    ///
    /// # Examples
    /// ```
    /// use twitch_wordle::chat::irc::IrcMessage;
    ///
    /// let msg = IrcMessage::parse("PING :tmi.twitch.tv").unwrap();
    /// assert_eq!(msg.command, "PING");
    /// assert_eq!(msg.trailing(), Some("tmi.twitch.tv"));
    /// ```
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let mut rest = line.trim_end_matches(['\r', '\n']);
        let mut message = Self::default();

        if let Some(stripped) = rest.strip_prefix('@') {
            let (raw_tags, remainder) = stripped.split_once(' ')?;
            for pair in raw_tags.split(';').filter(|p| !p.is_empty()) {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                message
                    .tags
                    .insert(key.to_string(), unescape_tag_value(value));
            }
            rest = remainder.trim_start_matches(' ');
        }

        if let Some(stripped) = rest.strip_prefix(':') {
            let (prefix, remainder) = stripped.split_once(' ')?;
            message.prefix = Some(prefix.to_string());
            rest = remainder.trim_start_matches(' ');
        }

        let (command, mut params) = rest.split_once(' ').unwrap_or((rest, ""));
        if command.is_empty() {
            return None;
        }
        message.command = command.to_ascii_uppercase();

        loop {
            params = params.trim_start_matches(' ');
            if params.is_empty() {
                break;
            }
            if let Some(trailing) = params.strip_prefix(':') {
                message.params.push(trailing.to_string());
                break;
            }
            match params.split_once(' ') {
                Some((param, remainder)) => {
                    message.params.push(param.to_string());
                    params = remainder;
                }
                None => {
                    message.params.push(params.to_string());
                    break;
                }
            }
        }

        Some(message)
    }

    /// Nickname part of the prefix (`nick!user@host`)
    #[must_use]
    pub fn nick(&self) -> Option<&str> {
        let prefix = self.prefix.as_deref()?;
        let nick = prefix.split(['!', '@']).next().unwrap_or(prefix);
        (!nick.is_empty()).then_some(nick)
    }

    /// Value of a non-empty tag
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Last parameter (the message text for PRIVMSG)
    #[must_use]
    pub fn trailing(&self) -> Option<&str> {
        self.params.last().map(String::as_str)
    }
}

fn unescape_tag_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(':') => out.push(';'),
            Some('s') => out.push(' '),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            // A lone trailing backslash is dropped
            None => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_privmsg() {
        let line = "@badge-info=;badges=;color=#1E90FF;display-name=SomeViewer;mod=0 \
                    :someviewer!someviewer@someviewer.tmi.twitch.tv PRIVMSG #streamer :crane\r\n";
        let msg = IrcMessage::parse(line).unwrap();

        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.nick(), Some("someviewer"));
        assert_eq!(msg.tag("display-name"), Some("SomeViewer"));
        assert_eq!(msg.tag("color"), Some("#1E90FF"));
        assert_eq!(msg.tag("badges"), None);
        assert_eq!(msg.params, vec!["#streamer", "crane"]);
        assert_eq!(msg.trailing(), Some("crane"));
    }

    #[test]
    fn parses_join_without_tags() {
        let msg = IrcMessage::parse(":justinfan42!justinfan42@justinfan42.tmi.twitch.tv JOIN #streamer")
            .unwrap();
        assert_eq!(msg.command, "JOIN");
        assert_eq!(msg.nick(), Some("justinfan42"));
        assert_eq!(msg.params, vec!["#streamer"]);
    }

    #[test]
    fn parses_numeric_with_multiple_middle_params() {
        let msg = IrcMessage::parse(":tmi.twitch.tv 001 justinfan42 :Welcome, GLHF!").unwrap();
        assert_eq!(msg.command, "001");
        assert_eq!(msg.params, vec!["justinfan42", "Welcome, GLHF!"]);
        assert_eq!(msg.nick(), Some("tmi.twitch.tv"));
    }

    #[test]
    fn trailing_keeps_inner_spaces_and_colons() {
        let msg = IrcMessage::parse("PRIVMSG #chan :hello there : friend").unwrap();
        assert_eq!(msg.trailing(), Some("hello there : friend"));
    }

    #[test]
    fn unescapes_tag_values() {
        let msg = IrcMessage::parse(r"@system-msg=hi\sthere\:\\ok\ NOTICE #c :x").unwrap();
        assert_eq!(msg.tag("system-msg"), Some("hi there;\\ok"));
    }

    #[test]
    fn rejects_blank_and_prefix_only_lines() {
        assert!(IrcMessage::parse("").is_none());
        assert!(IrcMessage::parse("\r\n").is_none());
        assert!(IrcMessage::parse(":prefix.only").is_none());
    }
}
