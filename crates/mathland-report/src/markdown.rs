//! Markdown rendering of the end screen.
//!
//! The output has the "Adventure Complete!" heading, the encouragement
//! message, the score, a small table describing the game, and one row per
//! round.
//!
//! # Example
//!
//! ```rust
//! use mathland_report::{GameSummary, MarkdownGenerator, Report};
//!
//! let report = Report::builder()
//!     .game(GameSummary::default())
//!     .score(5, 5)
//!     .build()
//!     .unwrap();
//!
//! let markdown = MarkdownGenerator::new(&report).generate();
//! assert!(markdown.starts_with("# Adventure Complete!"));
//! assert!(markdown.contains("Perfect Score!"));
//! ```

use std::fmt::Write;

use crate::{Report, RoundSummary, COMPLETE_HEADING};

/// Shown in place of an answer that was not a number.
const NO_ANSWER: &str = "-";

/// Renders a [`Report`] as Markdown.
pub struct MarkdownGenerator<'a> {
    report: &'a Report,
}

impl<'a> MarkdownGenerator<'a> {
    /// Creates a new Markdown generator for the given report.
    #[must_use]
    pub const fn new(report: &'a Report) -> Self {
        Self { report }
    }

    /// Renders the whole end screen, without a trailing newline.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output = String::new();

        self.write_heading(&mut output);
        self.write_game(&mut output);
        self.write_rounds(&mut output);

        output.trim_end().to_string()
    }

    fn write_heading(&self, output: &mut String) {
        let _ = writeln!(output, "# {COMPLETE_HEADING}\n");
        let _ = writeln!(output, "**{}**\n", self.report.message);
        let _ = writeln!(
            output,
            "Your Score: **{} / {}** ({}%)\n",
            self.report.score, self.report.total, self.report.percentage
        );
    }

    fn write_game(&self, output: &mut String) {
        let game = &self.report.game;

        let _ = writeln!(output, "| Setting | Value |");
        let _ = writeln!(output, "|---------|-------|");
        let _ = writeln!(output, "| Level | {} |", escape_markdown(&game.level));
        let _ = writeln!(output, "| Operation | {} |", escape_markdown(&game.operation));
        let _ = writeln!(output, "| Game | {} |", escape_markdown(&game.mode));
        if self.report.started_at.is_some() && self.report.finished_at.is_some() {
            let _ = writeln!(
                output,
                "| Duration | {} |",
                format_duration(self.report.duration_seconds())
            );
        }
        let _ = writeln!(output);
    }

    fn write_rounds(&self, output: &mut String) {
        if self.report.rounds.is_empty() {
            return;
        }

        let _ = writeln!(output, "## Rounds\n");
        let _ = writeln!(output, "| # | Question | Your Answer | Answer | Result |");
        let _ = writeln!(output, "|---|----------|-------------|--------|--------|");
        for round in &self.report.rounds {
            write_round_row(output, round);
        }
    }
}

fn write_round_row(output: &mut String, round: &RoundSummary) {
    let submitted = round
        .submitted
        .map_or_else(|| NO_ANSWER.to_string(), |v| v.to_string());
    let result = if round.correct { "Correct" } else { "Incorrect" };
    let _ = writeln!(
        output,
        "| {} | {} | {} | {} | {} |",
        round.round,
        escape_markdown(&round.question),
        submitted,
        round.answer,
        result
    );
}

/// Formats a duration in seconds, e.g. "1m 5s".
fn format_duration(seconds: u64) -> String {
    let minutes = seconds / 60;
    let secs = seconds % 60;

    if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

/// Escapes characters that would break table cells or formatting.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for ch in text.chars() {
        match ch {
            '*' | '_' | '`' | '#' | '[' | ']' | '\\' | '<' | '>' | '|' => {
                result.push('\\');
                result.push(ch);
            }
            '\n' => result.push(' '),
            _ => result.push(ch),
        }
    }

    result
}
