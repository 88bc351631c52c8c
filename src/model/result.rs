//! Request-scoped result types. Never persisted.

use serde::{Deserialize, Serialize};

use super::UserId;
use crate::{Error, Result};

/// The searcher's graph similarity to a match.
///
/// `Related(0.0)` means an edge exists with a zero score, which is not the
/// same thing as having no recorded edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum GraphScore {
    Related(f64),
    Unrelated,
}

impl GraphScore {
    pub fn as_option(self) -> Option<f64> {
        match self {
            GraphScore::Related(score) => Some(score),
            GraphScore::Unrelated => None,
        }
    }

    pub fn is_related(self) -> bool {
        matches!(self, GraphScore::Related(_))
    }
}

impl From<Option<f64>> for GraphScore {
    fn from(score: Option<f64>) -> Self {
        score.map_or(GraphScore::Unrelated, GraphScore::Related)
    }
}

impl From<GraphScore> for Option<f64> {
    fn from(score: GraphScore) -> Self {
        score.as_option()
    }
}

/// A username candidate from the fuzzy matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameMatch {
    pub id: UserId,
    pub name: String,
    pub score: f64,
}

/// One row of a similar-users search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: UserId,
    pub name: String,
    pub lexical_score: f64,
    pub graph_score: GraphScore,
}

impl SearchResult {
    pub fn graph_similarity(&self) -> Option<f64> {
        self.graph_score.as_option()
    }

    pub fn is_related(&self) -> bool {
        self.graph_score.is_related()
    }
}

/// One neighbor returned by a graph query, name resolved at query time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarUser {
    pub id: UserId,
    pub name: String,
    pub similarity: f64,
}

/// Maximum number of results to return. Zero is valid and yields nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Limit(usize);

impl Limit {
    pub const fn new(n: usize) -> Self {
        Limit(n)
    }

    pub const fn get(self) -> usize {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<usize> for Limit {
    fn from(n: usize) -> Self {
        Limit(n)
    }
}

impl TryFrom<i64> for Limit {
    type Error = Error;

    fn try_from(raw: i64) -> Result<Self> {
        usize::try_from(raw)
            .map(Limit)
            .map_err(|_| Error::InvalidArgument(format!("max_results must not be negative, got {raw}")))
    }
}
