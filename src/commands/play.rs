//! Live play
//!
//! One event loop serialises chat messages, console input, the next-round timer
//! and connection events. Console lines starting with `/` are host commands;
//! anything else is played as a guess from the host.

use crate::chat::{ChatMessage, TwitchChat};
use crate::config::GameConfig;
use crate::connection::{ConnectionEvent, Connector};
use crate::core::Word;
use crate::game::{Game, GameEvent};
use crate::output::{
    print_connection_event, print_game_event, print_round_status, print_scoreboard,
};
use anyhow::{Context, Result};
use colored::Colorize;
use log::{debug, warn};
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{self, Duration, Instant};

/// Name guesses typed into the console are credited to
pub const HOST_USER: &str = "host";

/// Players shown on the scoreboard
const SCOREBOARD_SIZE: usize = 10;

/// How the play command should start
#[derive(Debug, Clone, Default)]
pub struct PlayOptions {
    /// Channel to connect to immediately
    pub channel: Option<String>,
    /// Play from the console only, without a chat source
    pub offline: bool,
}

/// A line typed by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Connect(String),
    Disconnect,
    Next,
    Status,
    Scores,
    Help,
    Quit,
    Guess(String),
    Unknown(String),
}

impl ConsoleCommand {
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(command) = line.strip_prefix('/') else {
            return Self::Guess(line.to_string());
        };
        let (name, arg) = command.split_once(' ').unwrap_or((command, ""));
        match name.to_ascii_lowercase().as_str() {
            "connect" | "join" if !arg.trim().is_empty() => Self::Connect(arg.trim().to_string()),
            "disconnect" | "leave" => Self::Disconnect,
            "next" | "skip" => Self::Next,
            "status" => Self::Status,
            "scores" | "top" => Self::Scores,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => Self::Unknown(line.to_string()),
        }
    }
}

fn print_help(offline: bool) {
    println!("{}", "Commands:".bright_cyan().bold());
    if !offline {
        println!("  /connect <channel>   join a Twitch channel's chat");
        println!("  /disconnect          leave the current channel");
    }
    println!("  /next                skip to a new word");
    println!("  /status              show revealed letters and keyboard");
    println!("  /scores              show the scoreboard");
    println!("  /quit                exit");
    println!("Anything else is played as a guess from '{HOST_USER}'.");
}

/// The live session: the game plus an optional chat connection
struct PlaySession {
    game: Game,
    connector: Option<Connector<TwitchChat>>,
}

impl PlaySession {
    /// Play a message and report whether the round was solved
    fn play(&mut self, message: &ChatMessage) -> bool {
        let events = self.game.submit(message, std::time::Instant::now());
        let mut solved = false;
        for event in &events {
            print_game_event(event);
            solved |= matches!(event, GameEvent::RoundSolved { .. });
        }
        if solved {
            print_scoreboard(self.game.scoreboard(), SCOREBOARD_SIZE);
        }
        solved
    }

    fn next_round(&mut self) {
        let event = self.game.next_round();
        print_game_event(&event);
    }

    async fn console(&mut self, line: &str, offline: bool) -> ControlFlow<(), bool> {
        match ConsoleCommand::parse(line) {
            ConsoleCommand::Guess(text) if text.is_empty() => {}
            ConsoleCommand::Guess(text) => {
                let solved = self.play(&ChatMessage::new(HOST_USER, text));
                return ControlFlow::Continue(solved);
            }
            ConsoleCommand::Connect(channel) => match self.connector.as_mut() {
                Some(connector) => {
                    if let Err(e) = connector.request_connect(&channel).await {
                        println!("{}", e.to_string().red());
                    }
                }
                None => println!("{}", "Offline mode has no chat connection".yellow()),
            },
            ConsoleCommand::Disconnect => {
                if let Some(connector) = self.connector.as_mut()
                    && let Err(e) = connector.disconnect().await
                {
                    println!("{}", e.to_string().yellow());
                }
            }
            ConsoleCommand::Next => self.next_round(),
            ConsoleCommand::Status => print_round_status(self.game.round()),
            ConsoleCommand::Scores => print_scoreboard(self.game.scoreboard(), SCOREBOARD_SIZE),
            ConsoleCommand::Help => print_help(offline),
            ConsoleCommand::Quit => return ControlFlow::Break(()),
            ConsoleCommand::Unknown(line) => {
                println!("{} {line}", "Unknown command:".yellow());
            }
        }
        ControlFlow::Continue(false)
    }

    async fn shutdown(&mut self) {
        if let Some(connector) = self.connector.as_mut()
            && !connector.status().can_connect()
            && let Err(e) = connector.disconnect().await
        {
            debug!("Shutdown disconnect: {e}");
        }
    }
}

async fn recv_or_pending<T>(rx: Option<&mut UnboundedReceiver<T>>) -> Option<T> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Run rounds until the host quits
///
/// # Errors
///
/// Returns an error if the answer list is empty or the initial channel cannot
/// be joined.
pub async fn run_play(config: GameConfig, answers: Vec<Word>, options: PlayOptions) -> Result<()> {
    let next_round_delay = config.next_round_delay;
    let mut session = PlaySession {
        game: Game::new(config, answers)?,
        connector: None,
    };

    let mut chat_messages = None;
    let mut connection_events = None;
    if !options.offline {
        let (chat, messages) = TwitchChat::new();
        let (connector, events) = Connector::new(Arc::new(chat), config.connection);
        session.connector = Some(connector);
        chat_messages = Some(messages);
        connection_events = Some(events);
    }

    println!(
        "{}",
        "Twitch Wordle: viewers guess by typing words in chat"
            .bright_cyan()
            .bold()
    );
    print_help(options.offline);
    print_game_event(&session.game.round_started());

    if let Some(channel) = options.channel.as_deref() {
        match session.connector.as_mut() {
            Some(connector) => connector
                .request_connect(channel)
                .await
                .with_context(|| format!("Could not connect to '{channel}'"))?,
            None => warn!("Ignoring channel '{channel}' in offline mode"),
        }
    }

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let round_timer = time::sleep(Duration::ZERO);
    tokio::pin!(round_timer);
    let mut round_pending = false;

    loop {
        let solved = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            Some(message) = recv_or_pending(chat_messages.as_mut()) => {
                session.play(&message)
            }
            Some(event) = recv_or_pending(connection_events.as_mut()) => {
                print_connection_event(&event);
                if matches!(event, ConnectionEvent::Failed(_)) {
                    println!("{}", "Use /connect <channel> to try again".bright_black());
                }
                false
            }
            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match session.console(&line, options.offline).await {
                    ControlFlow::Break(()) => break,
                    ControlFlow::Continue(solved) => solved,
                },
                Ok(None) => {
                    stdin_open = false;
                    if options.offline {
                        break;
                    }
                    false
                }
                Err(e) => {
                    warn!("Console input failed: {e}");
                    stdin_open = false;
                    false
                }
            },
            () = &mut round_timer, if round_pending => {
                round_pending = false;
                if session.game.round().is_solved() {
                    session.next_round();
                }
                false
            }
        };

        if solved {
            println!(
                "{}",
                format!("Next word in {}s", next_round_delay.as_secs()).bright_black()
            );
            round_timer.as_mut().reset(Instant::now() + next_round_delay);
            round_pending = true;
        }
    }

    session.shutdown().await;
    print_scoreboard(session.game.scoreboard(), SCOREBOARD_SIZE);
    Ok(())
}
