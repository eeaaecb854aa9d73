//! JSON output of the end-of-game report.
//!
//! # Example
//!
//! ```rust
//! use mathland_report::{GameSummary, Report};
//! use mathland_report::json::JsonGenerator;
//!
//! let report = Report::builder()
//!     .game(GameSummary::default())
//!     .score(3, 5)
//!     .build()
//!     .unwrap();
//!
//! let compact = JsonGenerator::new(&report).generate().unwrap();
//! assert!(compact.contains(r#""percentage":60"#));
//! ```

use std::io::Write;

use crate::{Report, ReportError, Result};

/// JSON report generator.
pub struct JsonGenerator<'a> {
    report: &'a Report,
}

impl<'a> JsonGenerator<'a> {
    /// Creates a new JSON generator for the given report.
    #[must_use]
    pub const fn new(report: &'a Report) -> Self {
        Self { report }
    }

    /// Generates compact JSON on a single line.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if JSON serialization fails.
    pub fn generate(&self) -> Result<String> {
        serde_json::to_string(self.report).map_err(ReportError::from)
    }

    /// Generates pretty-printed JSON with 2-space indentation.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if JSON serialization fails.
    pub fn generate_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self.report).map_err(ReportError::from)
    }

    /// Writes pretty JSON followed by a newline to `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if serialization fails and
    /// [`ReportError::Io`] if the writer fails.
    pub fn write_to(&self, mut writer: impl Write) -> Result<()> {
        serde_json::to_writer_pretty(&mut writer, self.report)?;
        writeln!(writer)?;
        Ok(())
    }
}
