//! Text rendering for the terminal screens.

use std::fmt::Write;

use mathland_game::{
    ClassLevel, Feedback, GameMode, Operation, RoundView, GAME_MODES, ROUND_CHOICES,
};

/// Welcome banner of the configuration screen.
pub const WELCOME: &str = "Math Adventure Land\nChoose your challenge and start the fun!";

/// Renders a numbered menu, marking the default entry.
fn numbered(heading: &str, rows: &[String], default: usize) -> String {
    let mut out = format!("\n{heading}\n");
    for (i, row) in rows.iter().enumerate() {
        let marker = if i == default { " (default)" } else { "" };
        let _ = writeln!(out, "  {}. {row}{marker}", i + 1);
    }
    out.trim_end().to_string()
}

/// The class level menu.
pub fn level_menu(default: ClassLevel) -> String {
    let rows: Vec<String> = ClassLevel::ALL.iter().map(|l| l.title().to_string()).collect();
    let index = ClassLevel::ALL.iter().position(|l| *l == default).unwrap_or(0);
    numbered("1. Select Your Class Level", &rows, index)
}

/// The operation menu.
pub fn operation_menu(default: Operation) -> String {
    let rows: Vec<String> = Operation::ALL.iter().map(|o| o.title().to_string()).collect();
    let index = Operation::ALL.iter().position(|o| *o == default).unwrap_or(0);
    numbered("2. Pick an Operation", &rows, index)
}

/// The game mode menu, disabled modes included.
pub fn mode_menu(default: GameMode) -> String {
    let rows: Vec<String> = GAME_MODES
        .iter()
        .map(|info| format!("{} - {}", info.title, info.description))
        .collect();
    let index = GameMode::ALL.iter().position(|m| *m == default).unwrap_or(0);
    numbered("3. Choose a Game Mode", &rows, index)
}

/// The round count menu.
pub fn rounds_menu(default: u32) -> String {
    let rows: Vec<String> = ROUND_CHOICES.iter().map(|r| format!("{r} rounds")).collect();
    let index = ROUND_CHOICES.iter().position(|r| *r == default).unwrap_or(0);
    numbered("4. How Many Rounds?", &rows, index)
}

/// Title and tagline shown when a mini-game starts.
pub const fn mode_intro(mode: GameMode) -> &'static str {
    match mode {
        GameMode::BalloonPop => "Balloon Pop Math\nPop the balloon with the correct answer!",
        _ => "Treasure Hunt\nSolve the puzzle to get closer to the treasure!",
    }
}

/// The current round: progress line, question, and any choices.
pub fn round(view: &RoundView) -> String {
    let mut out = format!(
        "\nQuestion {} of {} | Score: {}\n\n  {}\n",
        view.round, view.total, view.score, view.question
    );
    if !view.choices.is_empty() {
        out.push('\n');
        let balloons: Vec<String> = view
            .choices
            .iter()
            .map(|c| format!("({}) {}", c.label, c.value))
            .collect();
        let _ = writeln!(out, "  {}", balloons.join("   "));
    }
    out.trim_end().to_string()
}

/// Prompt for the current round.
pub fn answer_prompt(view: &RoundView) -> &'static str {
    if view.choices.is_empty() {
        "Your answer: "
    } else {
        "Pop a balloon: "
    }
}

/// Feedback line after an answer.
pub fn feedback(mode: GameMode, feedback: Feedback, answer: i64) -> String {
    match (mode, feedback) {
        (_, Feedback::Unanswered) => String::new(),
        (GameMode::BalloonPop, Feedback::Correct) => "POP! Correct!".to_string(),
        (GameMode::BalloonPop, Feedback::Incorrect) => format!("Whoops! The answer is {answer}."),
        (_, Feedback::Correct) => "Correct!".to_string(),
        (_, Feedback::Incorrect) => format!("Not quite! The answer is {answer}."),
    }
}
