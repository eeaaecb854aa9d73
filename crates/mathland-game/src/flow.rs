//! Top-level game flow: configure, generate, play, summarize, repeat.

use tracing::{info, warn};

use crate::catalog::GameConfig;
use crate::error::{GameError, GenerationError, Result};
use crate::problem::Problem;
use crate::round::{answer_mode_for, RoundDriver, RoundView};
use crate::session::{Feedback, Outcome, Progress, Session};

/// Where the game currently is.
#[derive(Debug)]
pub enum Phase {
    /// Choosing level, operation, mode and rounds.
    Configuring,
    /// Waiting on the problem generator.
    Generating(GameConfig),
    /// Rounds in progress.
    Playing(RoundDriver),
    /// Summary screen.
    Complete(Outcome),
}

impl Phase {
    /// Short name used in errors and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Configuring => "configuring",
            Self::Generating(_) => "generating",
            Self::Playing(_) => "playing",
            Self::Complete(_) => "complete",
        }
    }
}

/// Owns the single session of one player.
///
/// At most one generation is in flight at a time: a second
/// [`begin_generation`](Self::begin_generation) is refused until
/// [`finish_generation`](Self::finish_generation) is called.
#[derive(Debug)]
pub struct GameFlow {
    phase: Phase,
    seed: Option<u64>,
}

impl Default for GameFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl GameFlow {
    /// Creates a flow on the configuration screen.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: Phase::Configuring,
            seed: None,
        }
    }

    /// Uses a fixed seed for multiple-choice shuffles.
    #[must_use]
    pub const fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// The current phase.
    #[must_use]
    pub const fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Accepts a configuration and marks generation as in flight.
    ///
    /// # Errors
    ///
    /// - [`GameError::GenerationPending`] if a generation is already running
    /// - [`GameError::InvalidStateTransition`] outside the configuration screen
    /// - [`GameError::ModeUnavailable`] or [`GameError::ConfigValidationError`]
    ///   for configurations that cannot be played
    pub fn begin_generation(&mut self, config: GameConfig) -> Result<()> {
        match self.phase {
            Phase::Configuring => {}
            Phase::Generating(_) => return Err(GameError::GenerationPending),
            _ => return Err(GameError::invalid_transition(self.phase.name(), "generating")),
        }
        config.validate()?;

        info!(
            level = config.level.as_key(),
            operation = config.operation.as_key(),
            mode = config.game_mode.as_key(),
            rounds = config.rounds,
            "Generating problems"
        );
        self.phase = Phase::Generating(config);
        Ok(())
    }

    /// Completes the in-flight generation.
    ///
    /// On success the first round starts. On failure the flow returns to the
    /// configuration screen and the error is handed back for display.
    ///
    /// # Errors
    ///
    /// Returns the generation error, a [`GameError::ProblemCountMismatch`]
    /// for an unusable batch, or [`GameError::InvalidStateTransition`] if no
    /// generation was in flight.
    pub fn finish_generation(
        &mut self,
        result: std::result::Result<Vec<Problem>, GenerationError>,
    ) -> Result<()> {
        let Phase::Generating(config) = self.phase else {
            return Err(GameError::invalid_transition(self.phase.name(), "playing"));
        };

        let started = result
            .map_err(GameError::from)
            .and_then(|problems| Session::start(config, problems));

        match started {
            Ok(session) => {
                let mode = answer_mode_for(config.game_mode, self.seed);
                self.phase = Phase::Playing(RoundDriver::new(session, mode));
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Generation failed, back to configuration");
                self.phase = Phase::Configuring;
                Err(err)
            }
        }
    }

    /// The current round, while playing.
    #[must_use]
    pub fn view(&self) -> Option<RoundView> {
        match &self.phase {
            Phase::Playing(driver) => Some(driver.view()),
            _ => None,
        }
    }

    /// Submits one line of input for the current round.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::RejectedInput`] for a choice that selects
    /// nothing, or [`GameError::InvalidStateTransition`] when not playing.
    pub fn submit(&mut self, input: &str) -> Result<Feedback> {
        match &mut self.phase {
            Phase::Playing(driver) => Ok(driver.submit(input)?),
            other => Err(GameError::invalid_transition(other.name(), "answered")),
        }
    }

    /// Advances past an answered round, moving to the summary after the last.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidStateTransition`] when not playing or when
    /// the round is unanswered.
    pub fn advance(&mut self) -> Result<Progress> {
        let Phase::Playing(driver) = &mut self.phase else {
            return Err(GameError::invalid_transition(self.phase.name(), "next round"));
        };

        let progress = driver.advance()?;
        if let Progress::Complete(outcome) = &progress {
            info!(score = outcome.score, total = outcome.total, "Game complete");
            self.phase = Phase::Complete(outcome.clone());
        }
        Ok(progress)
    }

    /// The summary, once complete.
    #[must_use]
    pub const fn outcome(&self) -> Option<&Outcome> {
        match &self.phase {
            Phase::Complete(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// "Play Again": discards the finished session.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidStateTransition`] unless complete.
    pub fn restart(&mut self) -> Result<()> {
        if !matches!(self.phase, Phase::Complete(_)) {
            return Err(GameError::invalid_transition(self.phase.name(), "configuring"));
        }
        self.phase = Phase::Configuring;
        Ok(())
    }
}
