//! Terminal output formatting
//!
//! Plain coloured lines for game and connection events.

pub mod display;
pub mod formatters;

pub use display::{
    print_connection_event, print_evaluation, print_game_event, print_keyboard,
    print_round_status, print_scoreboard,
};
