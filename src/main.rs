//! Twitch Wordle - CLI
//!
//! Host a Wordle round for a Twitch channel's chat, or evaluate and replay
//! guesses offline.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use twitch_wordle::{
    commands::{PlayOptions, evaluate_words, replay_file, run_play},
    config::GameConfig,
    connection::ConnectionConfig,
    core::Word,
    output::{print_evaluation, print_keyboard, print_scoreboard},
    wordlists::{ANSWERS, loader::words_from_slice},
};

#[derive(Parser)]
#[command(
    name = "twitch_wordle",
    about = "Wordle for a whole Twitch chat: viewers guess by typing words",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Wordlist: 'answers' (default, embedded) or path to file
    #[arg(short = 'w', long, global = true, default_value = "answers")]
    wordlist: String,

    /// Milliseconds between checks that the channel was joined
    #[arg(long, global = true, default_value = "500")]
    poll_interval_ms: u64,

    /// Checks before giving up on joining a channel
    #[arg(long, global = true, default_value = "5", value_parser = clap::value_parser!(u32).range(1..))]
    max_attempts: u32,

    /// Milliseconds a viewer must wait between guesses
    #[arg(long, global = true, default_value = "3000")]
    cooldown_ms: u64,

    /// Milliseconds between a solve and the next word
    #[arg(long, global = true, default_value = "5000")]
    next_round_delay_ms: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Host rounds for a channel's chat (default)
    Play {
        /// Channel to join on start
        #[arg(short, long)]
        channel: Option<String>,

        /// Console-only play, no chat connection
        #[arg(long, conflicts_with = "channel")]
        offline: bool,
    },

    /// Evaluate one guess against an answer
    Evaluate {
        /// The secret answer
        answer: String,

        /// The guess to evaluate
        guess: String,
    },

    /// Replay a chat log ("user: message" per line) against an answer
    Replay {
        /// Path to the chat log
        log: PathBuf,

        /// The answer the log was played against
        #[arg(short, long)]
        answer: String,
    },
}

impl Cli {
    fn config(&self) -> GameConfig {
        GameConfig::default()
            .with_guess_cooldown(Duration::from_millis(self.cooldown_ms))
            .with_next_round_delay(Duration::from_millis(self.next_round_delay_ms))
            .with_connection(ConnectionConfig {
                poll_interval: Duration::from_millis(self.poll_interval_ms),
                max_attempts: self.max_attempts,
            })
    }
}

/// Load answers based on the -w flag
///
/// - "answers": the embedded list
/// - "<path>": one word per line from a file
fn load_answers(wordlist_mode: &str) -> Result<Vec<Word>> {
    use twitch_wordle::wordlists::loader::load_from_file;

    let words = match wordlist_mode {
        "answers" => words_from_slice(ANSWERS),
        path => load_from_file(path).with_context(|| format!("Failed to load wordlist {path}"))?,
    };
    anyhow::ensure!(!words.is_empty(), "Wordlist '{wordlist_mode}' has no valid words");
    Ok(words)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = cli.config();

    // Default to Play mode if no command given
    let command = cli.command.unwrap_or(Commands::Play {
        channel: None,
        offline: false,
    });

    match command {
        Commands::Play { channel, offline } => {
            let answers = load_answers(&cli.wordlist)?;
            run_play(config, answers, PlayOptions { channel, offline }).await
        }
        Commands::Evaluate { answer, guess } => {
            let evaluation = evaluate_words(&answer, &guess)?;
            print_evaluation(&evaluation);
            Ok(())
        }
        Commands::Replay { log, answer } => {
            let result = replay_file(&log, &answer, config)?;
            println!(
                "Replayed {} messages ({} lines skipped), {} guesses played",
                result.messages,
                result.skipped_lines,
                result.evaluations.len()
            );
            match &result.solved_by {
                Some(user) => println!("Solved by {user}: {}", result.answer.text().to_uppercase()),
                None => println!("Not solved: {}", result.answer.text().to_uppercase()),
            }
            print_keyboard(&result.keyboard);
            print_scoreboard(&result.scoreboard, 10);
            Ok(())
        }
    }
}
