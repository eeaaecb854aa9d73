//! Math Adventure Land end-of-game summary
//!
//! Turns a finished game into a [`Report`]: score, percentage, an
//! encouragement tier, and a per-round breakdown. Reports render to Markdown
//! for the end screen or to JSON for scripting.
//!
//! # Generators
//!
//! - [`MarkdownGenerator`] - the "Adventure Complete!" screen
//! - [`json::JsonGenerator`] - compact or pretty JSON
//!
//! # Example
//!
//! ```rust
//! use mathland_report::{GameSummary, Report, RoundSummary, Tier};
//!
//! let report = Report::builder()
//!     .game(GameSummary {
//!         level: "Primary 2".to_string(),
//!         operation: "Addition".to_string(),
//!         mode: "Treasure Hunt".to_string(),
//!     })
//!     .score(1, 2)
//!     .round(RoundSummary::new(1, "1 + 1 = ?", 2, Some(2)))
//!     .round(RoundSummary::new(2, "2 + 2 = ?", 4, Some(5)))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(report.percentage, 50);
//! assert_eq!(report.tier, Tier::Great);
//! ```

pub mod json;
mod markdown;

pub use markdown::MarkdownGenerator;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Heading of the end screen.
pub const COMPLETE_HEADING: &str = "Adventure Complete!";

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while building or rendering a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Failed to serialize the report to JSON.
    #[error("failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failed to write the report.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid report data.
    #[error("invalid report data: {0}")]
    InvalidData(String),
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

// ============================================================================
// Percentage and Tier
// ============================================================================

/// Whole-number percentage of `score` out of `total`, rounding halves up.
///
/// Returns 0 when `total` is 0.
///
/// # Examples
///
/// ```
/// use mathland_report::percentage;
///
/// assert_eq!(percentage(3, 5), 60);
/// assert_eq!(percentage(2, 3), 67);
/// assert_eq!(percentage(1, 8), 13);
/// assert_eq!(percentage(0, 0), 0);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_lossless)]
pub const fn percentage(score: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let (score, total) = (score as u64, total as u64);
    ((200 * score + total) / (2 * total)) as u32
}

/// Encouragement band for a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// 100%.
    Perfect,
    /// 80% and up.
    Excellent,
    /// 50% and up.
    Great,
    /// Everything else.
    Effort,
}

impl Tier {
    /// Picks the tier for a percentage.
    #[must_use]
    pub const fn from_percentage(percentage: u32) -> Self {
        match percentage {
            100.. => Self::Perfect,
            80..=99 => Self::Excellent,
            50..=79 => Self::Great,
            _ => Self::Effort,
        }
    }

    /// The message shown on the end screen.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Perfect => "Perfect Score! You're a Math Genius!",
            Self::Excellent => "Excellent Work! You're a Math Star!",
            Self::Great => "Great Job! Keep practicing!",
            Self::Effort => "Good effort!",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

// ============================================================================
// Report
// ============================================================================

/// What was played, as display titles.
///
/// Plain strings keep this crate independent of the game crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    /// Class level title, e.g. "Primary 2".
    pub level: String,
    /// Operation title, e.g. "Addition".
    pub operation: String,
    /// Game mode title, e.g. "Treasure Hunt".
    pub mode: String,
}

/// One answered round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    /// 1-based round number.
    pub round: usize,
    /// The question shown.
    pub question: String,
    /// The correct answer.
    pub answer: i64,
    /// What the player submitted; `None` for non-numeric input.
    pub submitted: Option<i64>,
    /// Whether the submission was correct.
    pub correct: bool,
}

impl RoundSummary {
    /// Creates a round summary, deriving `correct` from the submission.
    #[must_use]
    pub fn new(round: usize, question: impl Into<String>, answer: i64, submitted: Option<i64>) -> Self {
        Self {
            round,
            question: question.into(),
            answer,
            submitted,
            correct: submitted == Some(answer),
        }
    }
}

/// The end-of-game report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// What was played.
    pub game: GameSummary,
    /// Correct answers.
    pub score: u32,
    /// Rounds played.
    pub total: u32,
    /// Rounded percentage.
    pub percentage: u32,
    /// Encouragement band.
    pub tier: Tier,
    /// The tier's message.
    pub message: String,
    /// Per-round breakdown.
    pub rounds: Vec<RoundSummary>,
    /// When the game started, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// When the game finished, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Report {
    /// Creates a new report builder.
    #[must_use]
    pub fn builder() -> ReportBuilder {
        ReportBuilder::default()
    }

    /// Whole seconds between start and finish, 0 when unknown.
    #[must_use]
    pub fn duration_seconds(&self) -> u64 {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => u64::try_from((end - start).num_seconds()).unwrap_or(0),
            _ => 0,
        }
    }
}

// ============================================================================
// ReportBuilder
// ============================================================================

/// Builder for [`Report`].
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    game: Option<GameSummary>,
    score: u32,
    total: u32,
    rounds: Vec<RoundSummary>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl ReportBuilder {
    /// Sets what was played.
    #[must_use]
    pub fn game(mut self, game: GameSummary) -> Self {
        self.game = Some(game);
        self
    }

    /// Sets the score and the number of rounds.
    #[must_use]
    pub fn score(mut self, score: u32, total: u32) -> Self {
        self.score = score;
        self.total = total;
        self
    }

    /// Adds one round.
    #[must_use]
    pub fn round(mut self, round: RoundSummary) -> Self {
        self.rounds.push(round);
        self
    }

    /// Sets all rounds at once.
    #[must_use]
    pub fn rounds(mut self, rounds: Vec<RoundSummary>) -> Self {
        self.rounds = rounds;
        self
    }

    /// Sets start and finish times.
    #[must_use]
    pub fn timing(mut self, started_at: DateTime<Utc>, finished_at: DateTime<Utc>) -> Self {
        self.started_at = Some(started_at);
        self.finished_at = Some(finished_at);
        self
    }

    /// Builds the report.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidData` if the game is missing, the score
    /// exceeds the total, or rounds are given but disagree with the score.
    pub fn build(self) -> Result<Report> {
        let game = self
            .game
            .ok_or_else(|| ReportError::InvalidData("game is required".to_string()))?;

        if self.score > self.total {
            return Err(ReportError::InvalidData(format!(
                "score {} exceeds total {}",
                self.score, self.total
            )));
        }
        if !self.rounds.is_empty() {
            let correct = self.rounds.iter().filter(|r| r.correct).count();
            if self.rounds.len() != self.total as usize || correct != self.score as usize {
                return Err(ReportError::InvalidData(format!(
                    "{} rounds with {correct} correct do not match score {} / {}",
                    self.rounds.len(),
                    self.score,
                    self.total
                )));
            }
        }

        let percentage = percentage(self.score, self.total);
        let tier = Tier::from_percentage(percentage);
        Ok(Report {
            game,
            score: self.score,
            total: self.total,
            percentage,
            tier,
            message: tier.message().to_string(),
            rounds: self.rounds,
            started_at: self.started_at,
            finished_at: self.finished_at,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
