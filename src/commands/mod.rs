//! Command implementations

pub mod evaluate;
pub mod play;
pub mod replay;

pub use evaluate::evaluate_words;
pub use play::{ConsoleCommand, HOST_USER, PlayOptions, run_play};
pub use replay::{ReplayResult, parse_log_line, replay_file, replay_log};
