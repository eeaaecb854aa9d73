//! Math problems and their local validation.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Number of options shown in multiple-choice modes.
pub const OPTION_COUNT: usize = 4;

/// Suffix every normalized question ends with.
pub const QUESTION_SUFFIX: &str = " = ?";

/// Any "= ?" run, with or without surrounding spaces.
#[allow(clippy::expect_used)]
static EQUALS_QUESTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*=\s*\?").expect("literal pattern compiles"));

/// One problem as presented to the player. Read-only once generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    /// Human-readable question, always ending in [`QUESTION_SUFFIX`].
    pub question: String,
    /// The correct integer answer.
    pub answer: i64,
    /// Four distinct choices including `answer`, in multiple-choice modes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<i64>>,
}

impl Problem {
    /// Creates a free-entry problem, normalizing the question.
    #[must_use]
    pub fn new(question: &str, answer: i64) -> Self {
        Self {
            question: normalize_question(question),
            answer,
            options: None,
        }
    }

    /// Attaches multiple-choice options.
    #[must_use]
    pub fn with_options(mut self, options: Vec<i64>) -> Self {
        self.options = Some(options);
        self
    }

    /// Returns `true` if `value` is the correct answer.
    #[must_use]
    pub const fn is_correct(&self, value: i64) -> bool {
        self.answer == value
    }

    /// Checks that the options are usable for a multiple-choice round.
    ///
    /// # Errors
    ///
    /// Returns a `Schema` [`GenerationError`] if options are missing, not
    /// exactly four, contain duplicates, or leave out the answer.
    pub fn validate_options(&self) -> Result<(), GenerationError> {
        let Some(options) = &self.options else {
            return Err(GenerationError::schema(format!(
                "problem '{}' has no options",
                self.question
            )));
        };
        if options.len() != OPTION_COUNT {
            return Err(GenerationError::schema(format!(
                "problem '{}' has {} options, expected {OPTION_COUNT}",
                self.question,
                options.len()
            )));
        }
        let distinct: HashSet<i64> = options.iter().copied().collect();
        if distinct.len() != options.len() {
            return Err(GenerationError::schema(format!(
                "problem '{}' has duplicate options {options:?}",
                self.question
            )));
        }
        if !distinct.contains(&self.answer) {
            return Err(GenerationError::schema(format!(
                "problem '{}' options {options:?} do not include the answer {}",
                self.question, self.answer
            )));
        }
        Ok(())
    }
}

/// Normalizes a question so it ends with exactly one `" = ?"`.
///
/// Every `"= ?"` run is removed, trailing `?`, `=` and whitespace are
/// stripped, and the suffix is appended. Idempotent.
///
/// # Examples
///
/// ```
/// use mathland_game::problem::normalize_question;
///
/// assert_eq!(normalize_question("5 + 3"), "5 + 3 = ?");
/// assert_eq!(normalize_question("5 + 3 = ?"), "5 + 3 = ?");
/// assert_eq!(normalize_question("What is 5 + 3?"), "What is 5 + 3 = ?");
/// ```
#[must_use]
pub fn normalize_question(raw: &str) -> String {
    // Removing one "= ?" can join its neighbours into another.
    let mut text = raw.to_string();
    while EQUALS_QUESTION.is_match(&text) {
        text = EQUALS_QUESTION.replace_all(&text, "").into_owned();
    }
    let stem = text.trim_end_matches(|c: char| c == '?' || c == '=' || c.is_whitespace());
    format!("{}{QUESTION_SUFFIX}", stem.trim_start())
}
