//! Round driver shared by every playable mini-game.
//!
//! Treasure Hunt and Balloon Pop only differ in how an answer is collected.
//! That difference lives behind [`AnswerMode`]; everything else (feedback,
//! scoring, advancing) goes through one [`RoundDriver`].

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::catalog::GameMode;
use crate::error::Result;
use crate::problem::Problem;
use crate::session::{Feedback, Progress, Session};

/// Labels shown next to multiple-choice options.
pub const CHOICE_LABELS: [char; 4] = ['A', 'B', 'C', 'D'];

/// One labelled multiple-choice option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Letter shown to the player.
    pub label: char,
    /// The integer the option stands for.
    pub value: i64,
}

/// Input that does not select anything and must be asked for again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{input}' is not one of the choices; {hint}")]
pub struct RejectedInput {
    /// The raw input.
    pub input: String,
    /// What the player should type instead.
    pub hint: String,
}

/// How a mini-game turns raw input into a submitted answer.
pub trait AnswerMode: Send {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Called once when `problem` becomes the current round.
    fn prepare(&mut self, problem: &Problem);

    /// The options on screen, empty for free entry.
    fn choices(&self) -> &[Choice];

    /// Interprets one line of input.
    ///
    /// `Ok(None)` is a submission that is not a number.
    ///
    /// # Errors
    ///
    /// Returns [`RejectedInput`] when the input selects nothing and the
    /// round should keep waiting.
    fn interpret(&self, input: &str) -> std::result::Result<Option<i64>, RejectedInput>;
}

// ============================================================================
// FreeEntry
// ============================================================================

/// Typed integer answers (Treasure Hunt).
#[derive(Debug, Clone, Copy, Default)]
pub struct FreeEntry;

impl AnswerMode for FreeEntry {
    fn name(&self) -> &'static str {
        "free_entry"
    }

    fn prepare(&mut self, _problem: &Problem) {}

    fn choices(&self) -> &[Choice] {
        &[]
    }

    fn interpret(&self, input: &str) -> std::result::Result<Option<i64>, RejectedInput> {
        Ok(input.trim().parse().ok())
    }
}

// ============================================================================
// MultipleChoice
// ============================================================================

/// Four shuffled options selected by letter or position (Balloon Pop).
#[derive(Debug)]
pub struct MultipleChoice {
    rng: StdRng,
    choices: Vec<Choice>,
}

impl MultipleChoice {
    /// Creates a mode shuffling with OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            choices: Vec::new(),
        }
    }

    /// Creates a mode with a reproducible shuffle.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            choices: Vec::new(),
        }
    }

    fn hint(&self) -> String {
        let labels: Vec<String> = self.choices.iter().map(|c| c.label.to_string()).collect();
        format!("pick {} or 1-{}", labels.join("/"), self.choices.len())
    }
}

impl Default for MultipleChoice {
    fn default() -> Self {
        Self::new()
    }
}

impl AnswerMode for MultipleChoice {
    fn name(&self) -> &'static str {
        "multiple_choice"
    }

    fn prepare(&mut self, problem: &Problem) {
        let mut values = problem.options.clone().unwrap_or_default();
        values.shuffle(&mut self.rng);
        self.choices = CHOICE_LABELS
            .iter()
            .zip(values)
            .map(|(&label, value)| Choice { label, value })
            .collect();
    }

    fn choices(&self) -> &[Choice] {
        &self.choices
    }

    fn interpret(&self, input: &str) -> std::result::Result<Option<i64>, RejectedInput> {
        let trimmed = input.trim();
        let by_label = trimmed
            .chars()
            .next()
            .filter(|_| trimmed.chars().count() == 1)
            .map(|c| c.to_ascii_uppercase())
            .and_then(|label| self.choices.iter().find(|c| c.label == label));
        let by_position = || {
            trimmed
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| self.choices.get(i))
        };

        by_label
            .or_else(by_position)
            .map(|choice| Some(choice.value))
            .ok_or_else(|| RejectedInput {
                input: trimmed.to_string(),
                hint: self.hint(),
            })
    }
}

/// Returns the answer mode a game mode plays with.
#[must_use]
pub fn answer_mode_for(mode: GameMode, seed: Option<u64>) -> Box<dyn AnswerMode> {
    if mode.needs_options() {
        Box::new(seed.map_or_else(MultipleChoice::new, MultipleChoice::seeded))
    } else {
        Box::new(FreeEntry)
    }
}

// ============================================================================
// RoundDriver
// ============================================================================

/// Everything a front end needs to draw the current round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundView {
    /// 1-based round number.
    pub round: usize,
    /// Total rounds.
    pub total: usize,
    /// The question.
    pub question: String,
    /// Labelled options, empty for free entry.
    pub choices: Vec<Choice>,
    /// Score so far.
    pub score: u32,
    /// Feedback for this round.
    pub feedback: Feedback,
    /// The correct answer, revealed once the round has feedback.
    pub revealed_answer: Option<i64>,
}

/// A session paired with the answer mode of its mini-game.
pub struct RoundDriver {
    session: Session,
    mode: Box<dyn AnswerMode>,
}

impl std::fmt::Debug for RoundDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoundDriver")
            .field("session", &self.session)
            .field("mode", &self.mode.name())
            .finish()
    }
}

impl RoundDriver {
    /// Creates a driver and prepares the first round.
    #[must_use]
    pub fn new(session: Session, mut mode: Box<dyn AnswerMode>) -> Self {
        mode.prepare(session.current_problem());
        Self { session, mode }
    }

    /// The underlying session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// The current round as shown to the player.
    #[must_use]
    pub fn view(&self) -> RoundView {
        let problem = self.session.current_problem();
        let feedback = self.session.feedback();
        RoundView {
            round: self.session.current_index() + 1,
            total: self.session.len(),
            question: problem.question.clone(),
            choices: self.mode.choices().to_vec(),
            score: self.session.score(),
            feedback,
            revealed_answer: feedback.is_answered().then_some(problem.answer),
        }
    }

    /// Interprets and submits one line of input.
    ///
    /// Input arriving after the round already has feedback is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`RejectedInput`] if the mode cannot map the input to an
    /// answer; the round stays unanswered.
    pub fn submit(&mut self, input: &str) -> std::result::Result<Feedback, RejectedInput> {
        if self.session.feedback().is_answered() {
            return Ok(self.session.feedback());
        }
        let value = self.mode.interpret(input)?;
        Ok(self.session.submit_answer(value))
    }

    /// Submits an already interpreted value.
    pub fn submit_value(&mut self, value: Option<i64>) -> Feedback {
        self.session.submit_answer(value)
    }

    /// Advances the session and prepares the next round.
    ///
    /// # Errors
    ///
    /// Propagates [`Session::advance`] errors.
    pub fn advance(&mut self) -> Result<Progress> {
        let progress = self.session.advance()?;
        if progress == Progress::NextRound {
            self.mode.prepare(self.session.current_problem());
        }
        Ok(progress)
    }
}
