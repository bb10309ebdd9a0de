//! Printing of game and connection events

use super::formatters::{
    create_progress_bar, format_delta, guess_tiles, keyboard_rows, letter_tile, revealed_pattern,
    user_name,
};
use crate::connection::{ConnectionEvent, share_query};
use crate::core::{Evaluation, KeyboardState, LetterStatus, Scoreboard};
use crate::game::{GameEvent, Round};
use colored::Colorize;

/// Print one game event as a single line
pub fn print_game_event(event: &GameEvent) {
    match event {
        GameEvent::RoundStarted { number, length } => {
            println!("\n{}", "─".repeat(60).cyan());
            println!(
                "{} {}",
                format!("Round {number}").bright_cyan().bold(),
                format!("({length} letters)").bright_black()
            );
            println!("{}", "─".repeat(60).cyan());
        }
        GameEvent::GuessEvaluated {
            user,
            color,
            evaluation,
            ..
        } => {
            println!(
                "{} {}  {}",
                guess_tiles(evaluation),
                evaluation.to_emoji(),
                user_name(user, *color)
            );
        }
        GameEvent::LetterScored { user, score } => {
            let delta = format_delta(score.delta);
            let delta = match score.status {
                LetterStatus::InCorrectPlace => delta.green(),
                LetterStatus::InWrongPlace => delta.yellow(),
                LetterStatus::NotInWord | LetterStatus::Unset => delta.bright_black(),
            };
            println!(
                "   {} {delta} {}",
                letter_tile(score.letter, score.status),
                user.bright_black()
            );
        }
        GameEvent::SolveBonus { user, points } => {
            println!(
                "   {} {}",
                format!("+{points} solve bonus").bright_yellow().bold(),
                user.bold()
            );
        }
        GameEvent::RoundSolved {
            number,
            user,
            answer,
            guesses,
        } => {
            println!(
                "\n{}",
                format!(
                    "✅ {user} solved round {number}: {} after {guesses} guesses",
                    answer.text().to_uppercase()
                )
                .green()
                .bold()
            );
        }
    }
}

/// Print a connection lifecycle change
pub fn print_connection_event(event: &ConnectionEvent) {
    match event {
        ConnectionEvent::Connecting { channel } => {
            println!("{}", format!("Connecting to #{channel}...").bright_black());
        }
        ConnectionEvent::Connected { channel } => {
            println!(
                "{} {}",
                format!("Connected to #{channel}").green().bold(),
                format!("(share: {})", share_query(channel)).bright_black()
            );
        }
        ConnectionEvent::Failed(error) => {
            println!("{}", format!("❌ {error}").red().bold());
        }
        ConnectionEvent::Disconnected => {
            println!("{}", "Disconnected".yellow());
        }
    }
}

/// Print the result of evaluating a single guess
pub fn print_evaluation(evaluation: &Evaluation) {
    println!("{} {}", guess_tiles(evaluation), evaluation.to_emoji());
    if evaluation.is_solved() {
        println!("{}", "Solved!".green().bold());
    } else {
        println!(
            "{} in place, {} misplaced, {} absent",
            evaluation.count(LetterStatus::InCorrectPlace),
            evaluation.count(LetterStatus::InWrongPlace),
            evaluation.count(LetterStatus::NotInWord)
        );
    }
}

pub fn print_keyboard(keyboard: &KeyboardState) {
    for (indent, row) in keyboard_rows(keyboard).iter().enumerate() {
        println!("{}{row}", " ".repeat(indent * 2));
    }
}

/// Print revealed letters, guess count and keyboard of a round
pub fn print_round_status(round: &Round) {
    println!(
        "\n{} {}   {} guesses",
        format!("Round {}:", round.number()).bright_cyan().bold(),
        revealed_pattern(round.revealed()),
        round.history().len()
    );
    print_keyboard(round.keyboard());
}

/// Print the top `n` players with bars relative to the leader
pub fn print_scoreboard(scoreboard: &Scoreboard, n: usize) {
    println!("\n🏆 {}", "Scoreboard:".bright_cyan().bold());
    if scoreboard.is_empty() {
        println!("   {}", "No points yet".bright_black());
        return;
    }

    let leaders = scoreboard.leaders(n);
    let top = leaders.first().map_or(0, |&(_, points)| points);
    let width = leaders.iter().map(|(user, _)| user.len()).max().unwrap_or(0);
    for (rank, (user, points)) in leaders.iter().enumerate() {
        println!(
            "   {:>2}. {user:<width$} {} {}",
            rank + 1,
            create_progress_bar(*points, top, 20).green(),
            points.to_string().bright_yellow()
        );
    }
}
