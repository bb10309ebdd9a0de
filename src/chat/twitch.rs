//! Anonymous Twitch chat over IRC
//!
//! Logs in with a `justinfan` nickname, which Twitch accepts without a token for
//! read-only access, joins one channel and forwards every `PRIVMSG`.

use super::irc::IrcMessage;
use super::{ChatError, ChatMessage, ChatSource};
use async_trait::async_trait;
use log::{debug, info, warn};
use rand::Rng;
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Plain-text Twitch IRC endpoint
pub const TWITCH_IRC_ADDR: &str = "irc.chat.twitch.tv:6667";

/// Any password works for anonymous logins; this is the one Twitch documents
const ANONYMOUS_PASS: &str = "SCHMOOPIIE";

type Joined = Arc<Mutex<Vec<String>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Read-only Twitch chat client
///
/// Dropping the client stops the reader task.
#[derive(Debug)]
pub struct TwitchChat {
    addr: String,
    joined: Joined,
    messages: mpsc::UnboundedSender<ChatMessage>,
    reader: Mutex<Option<DropGuard>>,
}

impl TwitchChat {
    /// Create a client for the public Twitch endpoint
    ///
    /// Returns the client and the receiver that chat messages arrive on.
    ///
    /// # Examples
    /// ```no_run
    /// use twitch_wordle::chat::{ChatSource, TwitchChat};
    ///
    /// # async fn run() -> Result<(), twitch_wordle::chat::ChatError> {
    /// let (chat, mut messages) = TwitchChat::new();
    /// chat.subscribe("somechannel").await?;
    /// while let Some(message) = messages.recv().await {
    ///     println!("{}: {}", message.user, message.text);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ChatMessage>) {
        Self::with_addr(TWITCH_IRC_ADDR)
    }

    /// Create a client for another IRC endpoint
    #[must_use]
    pub fn with_addr(addr: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<ChatMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let chat = Self {
            addr: addr.into(),
            joined: Arc::default(),
            messages: tx,
            reader: Mutex::new(None),
        };
        (chat, rx)
    }

    fn stop_reader(&self) {
        // Dropping the guard cancels the reader task
        lock(&self.reader).take();
        lock(&self.joined).clear();
    }
}

#[async_trait]
impl ChatSource for TwitchChat {
    async fn subscribe(&self, channel: &str) -> Result<(), ChatError> {
        self.stop_reader();

        let nick = anonymous_nick();
        let stream = TcpStream::connect(&self.addr).await?;
        let (read, mut write) = stream.into_split();

        let login = format!(
            "CAP REQ :twitch.tv/tags twitch.tv/commands\r\n\
             PASS {ANONYMOUS_PASS}\r\n\
             NICK {nick}\r\n\
             JOIN #{channel}\r\n"
        );
        write.write_all(login.as_bytes()).await?;
        info!("Joining #{channel} on {} as {nick}", self.addr);

        let token = CancellationToken::new();
        let session = ReaderSession {
            nick,
            joined: Arc::clone(&self.joined),
            messages: self.messages.clone(),
        };
        tokio::spawn(session.run(BufReader::new(read), write, token.clone()));
        *lock(&self.reader) = Some(token.drop_guard());
        Ok(())
    }

    async fn unsubscribe(&self) {
        debug!("Leaving Twitch chat");
        self.stop_reader();
    }

    fn joined_channels(&self) -> Vec<String> {
        lock(&self.joined).clone()
    }
}

fn anonymous_nick() -> String {
    format!("justinfan{}", rand::rng().random_range(10_000..100_000))
}

/// State owned by the spawned reader task
struct ReaderSession {
    nick: String,
    joined: Joined,
    messages: mpsc::UnboundedSender<ChatMessage>,
}

impl ReaderSession {
    async fn run(
        self,
        reader: BufReader<OwnedReadHalf>,
        mut writer: OwnedWriteHalf,
        token: CancellationToken,
    ) {
        let mut lines = reader.lines();
        loop {
            let line = tokio::select! {
                biased;
                () = token.cancelled() => break,
                line = lines.next_line() => line,
            };
            match line {
                Ok(Some(line)) => match self.handle_line(&line, &mut writer).await {
                    Ok(ControlFlow::Continue(())) => {}
                    Ok(ControlFlow::Break(())) => break,
                    Err(e) => {
                        warn!("Twitch chat reader stopped: {e}");
                        break;
                    }
                },
                Ok(None) => {
                    warn!("Twitch chat connection closed by server");
                    break;
                }
                Err(e) => {
                    warn!("Twitch chat read failed: {e}");
                    break;
                }
            }
        }
        lock(&self.joined).clear();
        if !token.is_cancelled() {
            warn!("Chat feed ended; use /disconnect then /connect <channel> to rejoin");
        }
    }

    fn mark_joined(&self, channel: &str) {
        let mut joined = lock(&self.joined);
        if !joined.iter().any(|c| c == channel) {
            info!("Joined {channel}");
            joined.push(channel.to_string());
        }
    }

    /// Handle one server line; `Break` ends the feed
    async fn handle_line(
        &self,
        line: &str,
        writer: &mut OwnedWriteHalf,
    ) -> Result<ControlFlow<()>, ChatError> {
        let Some(msg) = IrcMessage::parse(line) else {
            return Ok(ControlFlow::Continue(()));
        };

        match msg.command.as_str() {
            "PING" => {
                let token = msg.trailing().unwrap_or("tmi.twitch.tv");
                writer.write_all(format!("PONG :{token}\r\n").as_bytes()).await?;
            }
            "JOIN" if msg.nick() == Some(self.nick.as_str()) => {
                if let Some(channel) = msg.params.first() {
                    self.mark_joined(channel);
                }
            }
            // Twitch sends ROOMSTATE right after a successful join
            "ROOMSTATE" => {
                if let Some(channel) = msg.params.first() {
                    self.mark_joined(channel);
                }
            }
            "PART" if msg.nick() == Some(self.nick.as_str()) => {
                if let Some(channel) = msg.params.first() {
                    lock(&self.joined).retain(|c| c != channel);
                }
            }
            "PRIVMSG" => {
                if let Some(message) = chat_message(&msg)
                    && self.messages.send(message).is_err()
                {
                    return Err(ChatError::Closed);
                }
            }
            "NOTICE" => {
                info!("Twitch notice: {}", msg.trailing().unwrap_or_default());
            }
            "RECONNECT" => {
                warn!("Twitch asked us to reconnect");
                return Ok(ControlFlow::Break(()));
            }
            _ => debug!("Ignoring {}", msg.command),
        }
        Ok(ControlFlow::Continue(()))
    }
}

/// Turn a `PRIVMSG` into a chat message, preferring the display name tag
fn chat_message(msg: &IrcMessage) -> Option<ChatMessage> {
    let text = msg.trailing()?;
    let user = msg.tag("display-name").or_else(|| msg.nick())?;
    let color = msg.tag("color").and_then(|c| c.parse().ok());
    Some(ChatMessage {
        user: user.to_string(),
        text: text.to_string(),
        color,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::AccentColor;
    use std::time::Duration;
    use tokio::net::TcpListener;

    #[test]
    fn privmsg_uses_display_name_and_color() {
        let msg = IrcMessage::parse(
            "@color=#FF0000;display-name=Viewer :viewer!viewer@viewer.tmi.twitch.tv PRIVMSG #chan :crane",
        )
        .unwrap();
        assert_eq!(
            chat_message(&msg),
            Some(ChatMessage::new("Viewer", "crane").with_color(AccentColor::new(255, 0, 0)))
        );
    }

    #[test]
    fn privmsg_falls_back_to_nick() {
        let msg = IrcMessage::parse(
            "@color=;display-name= :viewer!viewer@viewer.tmi.twitch.tv PRIVMSG #chan :hello",
        )
        .unwrap();
        assert_eq!(chat_message(&msg), Some(ChatMessage::new("viewer", "hello")));
    }

    #[test]
    fn anonymous_nick_shape() {
        let nick = anonymous_nick();
        assert!(nick.starts_with("justinfan"));
        assert!(nick["justinfan".len()..].parse::<u32>().is_ok());
    }

    #[test]
    fn roomstate_marks_channel_joined_once() {
        let (messages, _rx) = mpsc::unbounded_channel();
        let session = ReaderSession {
            nick: "justinfan12345".to_string(),
            joined: Joined::default(),
            messages,
        };

        let msg = IrcMessage::parse("@room-id=1;slow=0 :tmi.twitch.tv ROOMSTATE #streamer").unwrap();
        assert_eq!(msg.command, "ROOMSTATE");
        session.mark_joined(&msg.params[0]);
        session.mark_joined(&msg.params[0]);
        assert_eq!(*lock(&session.joined), vec!["#streamer".to_string()]);
    }

    #[tokio::test]
    async fn joins_and_forwards_messages_from_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let (read, mut write) = socket.into_split();
            let mut lines = BufReader::new(read).lines();

            let mut nick = String::new();
            while let Some(line) = lines.next_line().await.unwrap() {
                if let Some(n) = line.strip_prefix("NICK ") {
                    nick = n.to_string();
                }
                if line.starts_with("JOIN ") {
                    break;
                }
            }

            let replies = format!(
                ":{nick}!{nick}@{nick}.tmi.twitch.tv JOIN #streamer\r\n\
                 PING :tmi.twitch.tv\r\n\
                 @color=#00FF00;display-name=Alice :alice!alice@alice.tmi.twitch.tv PRIVMSG #streamer :crane\r\n"
            );
            write.write_all(replies.as_bytes()).await.unwrap();

            let pong = lines.next_line().await.unwrap();
            assert_eq!(pong.as_deref(), Some("PONG :tmi.twitch.tv"));

            // Hand the socket back so it stays open until the test is done
            (lines, write)
        });

        let (chat, mut messages) = TwitchChat::with_addr(addr.to_string());
        assert!(chat.joined_channels().is_empty());
        chat.subscribe("streamer").await.unwrap();

        let message = tokio::time::timeout(Duration::from_secs(5), messages.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(message.user, "Alice");
        assert_eq!(message.text, "crane");
        assert_eq!(message.color, Some(AccentColor::new(0, 255, 0)));
        assert_eq!(chat.joined_channels(), vec!["#streamer".to_string()]);

        let _socket = server.await.unwrap();

        chat.unsubscribe().await;
        assert!(chat.joined_channels().is_empty());
    }

    #[tokio::test]
    async fn reconnect_request_ends_the_feed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (joined_tx, joined_rx) = tokio::sync::oneshot::channel();
        let (go_tx, go_rx) = tokio::sync::oneshot::channel::<()>();

        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let (read, mut write) = socket.into_split();
            let mut lines = BufReader::new(read).lines();

            let mut nick = String::new();
            while let Some(line) = lines.next_line().await.unwrap() {
                if let Some(n) = line.strip_prefix("NICK ") {
                    nick = n.to_string();
                }
                if line.starts_with("JOIN ") {
                    break;
                }
            }

            let replies =
                format!(":{nick}!{nick}@{nick}.tmi.twitch.tv JOIN #streamer\r\nPING :x\r\n");
            write.write_all(replies.as_bytes()).await.unwrap();
            lines.next_line().await.unwrap();
            joined_tx.send(()).unwrap();

            go_rx.await.unwrap();
            write.write_all(b":tmi.twitch.tv RECONNECT\r\n").await.unwrap();

            // The socket stays open; only RECONNECT ends the feed
            (lines, write)
        });

        let (chat, _messages) = TwitchChat::with_addr(addr.to_string());
        chat.subscribe("streamer").await.unwrap();

        joined_rx.await.unwrap();
        assert_eq!(chat.joined_channels(), vec!["#streamer".to_string()]);

        go_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), async {
            while !chat.joined_channels().is_empty() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        let _socket = server.await.unwrap();
    }
}
