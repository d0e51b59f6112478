//! Short progress report over the portfolio.

use crate::types::PortfolioData;
use std::fmt;

/// Tallies shown in the summary panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryReport {
    /// Episodes whose reflection is complete
    pub episodes_completed: usize,
    /// Episodes in the curriculum
    pub episodes_total: usize,
    /// Vocabulary words with a definition
    pub vocabulary_defined: usize,
    /// Vocabulary words in the curriculum
    pub vocabulary_total: usize,
    /// Overall progress percentage
    pub progress: u8,
    /// Whether the observations journal has any text
    pub has_observations: bool,
}

/// Computes the summary tallies for the current aggregate.
pub fn generate_summary(data: &PortfolioData) -> SummaryReport {
    SummaryReport {
        episodes_completed: data.episodes.iter().filter(|e| e.completed).count(),
        episodes_total: data.episodes.len(),
        vocabulary_defined: data
            .vocabulary
            .iter()
            .filter(|v| !v.definition.trim().is_empty())
            .count(),
        vocabulary_total: data.vocabulary.len(),
        progress: data.progress,
        has_observations: !data.observations.trim().is_empty(),
    }
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Portfolio Summary")?;
        writeln!(
            f,
            "Episodes completed: {}/{}",
            self.episodes_completed, self.episodes_total
        )?;
        writeln!(
            f,
            "Vocabulary defined: {}/{}",
            self.vocabulary_defined, self.vocabulary_total
        )?;
        writeln!(f, "Overall progress: {}%", self.progress)?;
        write!(
            f,
            "Observations: {}",
            if self.has_observations {
                "recorded"
            } else {
                "not yet recorded"
            }
        )
    }
}
