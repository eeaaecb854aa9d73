//! Session state for one game.
//!
//! A [`Session`] walks an ordered batch of problems. Each round is answered
//! once, shows its feedback, and is then advanced past. The score only ever
//! changes in [`Session::submit_answer`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::GameConfig;
use crate::error::{GameError, Result};
use crate::problem::Problem;

// ============================================================================
// Feedback and SessionStatus
// ============================================================================

/// Feedback state of the current round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    /// Waiting for an answer.
    #[default]
    Unanswered,
    /// The answer matched.
    Correct,
    /// The answer did not match or was not a number.
    Incorrect,
}

impl Feedback {
    /// Returns `true` once the round has been answered.
    #[must_use]
    pub const fn is_answered(self) -> bool {
        !matches!(self, Self::Unanswered)
    }
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Rounds are being played.
    #[default]
    Active,
    /// Every round has been answered and advanced past.
    Complete,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

// ============================================================================
// RoundRecord and Outcome
// ============================================================================

/// What happened in one answered round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// 1-based round number.
    pub round: usize,
    /// The question shown.
    pub question: String,
    /// The correct answer.
    pub answer: i64,
    /// The submitted value, `None` when the input was not a number.
    pub submitted: Option<i64>,
    /// Whether the submission was correct.
    pub correct: bool,
}

/// Final result of a completed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// The configuration that was played.
    pub config: GameConfig,
    /// Number of correct answers.
    pub score: u32,
    /// Number of rounds played.
    pub total: u32,
    /// One record per round, in order.
    pub rounds: Vec<RoundRecord>,
    /// When the session started.
    pub started_at: DateTime<Utc>,
    /// When the last round was advanced past.
    pub finished_at: DateTime<Utc>,
}

/// Result of [`Session::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// The next round is ready.
    NextRound,
    /// That was the last round.
    Complete(Outcome),
}

// ============================================================================
// Session
// ============================================================================

/// One game in progress.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    config: GameConfig,
    problems: Vec<Problem>,
    current_index: usize,
    score: u32,
    feedback: Feedback,
    status: SessionStatus,
    history: Vec<RoundRecord>,
    started_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Session {
    /// Starts a session at round one.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::ProblemCountMismatch`] if `problems` is empty or
    /// its length differs from `config.rounds`, and [`GameError::Generation`]
    /// if the mode needs options and any problem lacks a valid set.
    pub fn start(config: GameConfig, problems: Vec<Problem>) -> Result<Self> {
        let expected = usize::try_from(config.rounds).unwrap_or(usize::MAX);
        if problems.is_empty() || problems.len() != expected {
            return Err(GameError::ProblemCountMismatch {
                expected,
                actual: problems.len(),
            });
        }
        if config.needs_options() {
            for problem in &problems {
                problem.validate_options()?;
            }
        }

        let now = Utc::now();
        Ok(Self {
            config,
            history: Vec::with_capacity(problems.len()),
            problems,
            current_index: 0,
            score: 0,
            feedback: Feedback::Unanswered,
            status: SessionStatus::Active,
            started_at: now,
            updated_at: now,
        })
    }

    /// The configuration being played.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Zero-based index of the current round.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    /// The current problem.
    #[must_use]
    pub fn current_problem(&self) -> &Problem {
        &self.problems[self.current_index]
    }

    /// Number of rounds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.problems.len()
    }

    /// Always `false`; sessions cannot start empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    /// Correct answers so far.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Feedback for the current round.
    #[must_use]
    pub const fn feedback(&self) -> Feedback {
        self.feedback
    }

    /// Lifecycle status.
    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    /// Answered rounds so far.
    #[must_use]
    pub fn history(&self) -> &[RoundRecord] {
        &self.history
    }

    /// Returns `true` if this is the final round.
    #[must_use]
    pub fn is_last_round(&self) -> bool {
        self.current_index + 1 == self.problems.len()
    }

    /// Time since the session started.
    #[must_use]
    pub fn elapsed(&self) -> chrono::Duration {
        Utc::now() - self.started_at
    }

    /// Submits an answer for the current round.
    ///
    /// `None` stands for input that was not a number and counts as
    /// incorrect. Once the round has feedback, further submissions are
    /// ignored and the existing feedback is returned.
    pub fn submit_answer(&mut self, value: Option<i64>) -> Feedback {
        if self.status == SessionStatus::Complete || self.feedback.is_answered() {
            return self.feedback;
        }

        let problem = &self.problems[self.current_index];
        let correct = value.is_some_and(|v| problem.is_correct(v));
        self.feedback = if correct {
            self.score += 1;
            Feedback::Correct
        } else {
            Feedback::Incorrect
        };
        self.history.push(RoundRecord {
            round: self.current_index + 1,
            question: problem.question.clone(),
            answer: problem.answer,
            submitted: value,
            correct,
        });
        self.touch();

        debug!(
            round = self.current_index + 1,
            ?value,
            correct,
            score = self.score,
            "Answer submitted"
        );
        self.feedback
    }

    /// Moves past the current round once it has feedback.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidStateTransition`] if the round is still
    /// unanswered or the session is already complete.
    pub fn advance(&mut self) -> Result<Progress> {
        if self.status == SessionStatus::Complete {
            return Err(GameError::invalid_transition(self.status, "next round"));
        }
        if !self.feedback.is_answered() {
            return Err(GameError::invalid_transition("unanswered round", "next round"));
        }

        if self.is_last_round() {
            self.status = SessionStatus::Complete;
            self.touch();
            debug!(score = self.score, total = self.len(), "Session complete");
            return Ok(Progress::Complete(self.outcome_snapshot()));
        }

        self.current_index += 1;
        self.feedback = Feedback::Unanswered;
        self.touch();
        Ok(Progress::NextRound)
    }

    /// The final outcome, once complete.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        (self.status == SessionStatus::Complete).then(|| self.outcome_snapshot())
    }

    /// Checks `score <= current_index + (1 if the current round is correct)`.
    #[must_use]
    pub fn invariant_holds(&self) -> bool {
        let bonus = usize::from(self.feedback == Feedback::Correct);
        usize::try_from(self.score).is_ok_and(|score| score <= self.current_index + bonus)
    }

    fn outcome_snapshot(&self) -> Outcome {
        Outcome {
            config: self.config,
            score: self.score,
            total: u32::try_from(self.problems.len()).unwrap_or(u32::MAX),
            rounds: self.history.clone(),
            started_at: self.started_at,
            finished_at: self.updated_at,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ============================================================================
// Tests
// ============================================================================
