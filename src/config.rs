//! Search and import configuration.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default minimum trigram score a username must exceed to be a candidate.
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.05;

/// How the matcher orders usernames with equal scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Ascending user id (creation order).
    #[default]
    UserId,
    /// Ascending username, compared by code points.
    Name,
}

/// Tunables for matching, ranking and import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Scores must be strictly greater than this to be returned.
    pub min_similarity: f64,
    /// Lowercase both sides before extracting trigrams.
    pub fold_case: bool,
    pub tie_break: TieBreak,
    /// Import-time cap on neighbors per owner. The store may impose a lower one.
    pub max_neighbors: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_similarity: DEFAULT_MIN_SIMILARITY,
            fold_case: true,
            tie_break: TieBreak::UserId,
            max_neighbors: None,
        }
    }
}

impl SearchConfig {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: SearchConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min_similarity.is_finite() || !(0.0..1.0).contains(&self.min_similarity) {
            return Err(Error::InvalidArgument(format!(
                "min_similarity must be in [0, 1), got {}",
                self.min_similarity
            )));
        }
        if self.max_neighbors == Some(0) {
            return Err(Error::InvalidArgument("max_neighbors must be at least 1".into()));
        }
        Ok(())
    }
}
