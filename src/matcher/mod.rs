//! # Fuzzy Name Matcher
//!
//! Ranks a username corpus against a query fragment by trigram similarity.
//! Pure: it never looks at the similarity graph.

pub mod trigram;

use std::cmp::Ordering;

use crate::config::{SearchConfig, TieBreak};
use crate::model::{Limit, NameMatch, UserId};

pub use trigram::{Trigram, TrigramSet};

/// Trigram matcher configured from a [`SearchConfig`].
#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    min_similarity: f64,
    fold_case: bool,
    tie_break: TieBreak,
}

impl FuzzyMatcher {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            min_similarity: config.min_similarity,
            fold_case: config.fold_case,
            tie_break: config.tie_break,
        }
    }

    /// Candidates scoring above the threshold, best first, at most `limit`.
    ///
    /// Equal scores are ordered by the configured [`TieBreak`], so the
    /// output is fully deterministic for a given corpus.
    pub fn rank<'a, I>(&self, query: &str, candidates: I, limit: Limit) -> Vec<NameMatch>
    where
        I: IntoIterator<Item = (UserId, &'a str)>,
    {
        if limit.is_zero() {
            return Vec::new();
        }
        let query = TrigramSet::extract(query, self.fold_case);
        if query.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<NameMatch> = candidates
            .into_iter()
            .filter_map(|(id, name)| {
                let score = query.similarity(&TrigramSet::extract(name, self.fold_case));
                (score > self.min_similarity).then(|| NameMatch {
                    id,
                    name: name.to_string(),
                    score,
                })
            })
            .collect();

        matches.sort_by(|a, b| self.order(a, b));
        matches.truncate(limit.get());
        matches
    }

    fn order(&self, a: &NameMatch, b: &NameMatch) -> Ordering {
        let by_score = b.score.total_cmp(&a.score);
        match self.tie_break {
            TieBreak::UserId => by_score
                .then_with(|| a.id.cmp(&b.id))
                .then_with(|| a.name.cmp(&b.name)),
            // str comparison is byte-wise UTF-8, i.e. code point order
            TieBreak::Name => by_score
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id)),
        }
    }
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new(&SearchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<(UserId, &'static str)> {
        vec![
            (UserId(1), "Cécile"),
            (UserId(2), "Cecile"),
            (UserId(3), "lucifer"),
            (UserId(4), "rob"),
        ]
    }

    fn names(matches: &[NameMatch]) -> Vec<&str> {
        matches.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_reference_corpus() {
        let matcher = FuzzyMatcher::default();
        let matches = matcher.rank("cif", corpus(), Limit::new(10));

        assert_eq!(names(&matches), vec!["Cécile", "Cecile", "lucifer"]);
        assert_eq!(matches[0].score, 0.1);
        assert_eq!(matches[1].score, 0.1);
        assert!((matches[2].score - 0.090_909_09).abs() < 1e-6);
    }

    #[test]
    fn test_tie_break_by_name() {
        let config = SearchConfig { tie_break: TieBreak::Name, ..Default::default() };
        let matches = FuzzyMatcher::new(&config).rank("cif", corpus(), Limit::new(10));
        // 'e' (U+0065) sorts before 'é' (U+00E9)
        assert_eq!(names(&matches), vec!["Cecile", "Cécile", "lucifer"]);
    }

    #[test]
    fn test_tie_break_independent_of_corpus_order() {
        let matcher = FuzzyMatcher::default();
        let mut reversed = corpus();
        reversed.reverse();
        assert_eq!(
            matcher.rank("cif", corpus(), Limit::new(10)),
            matcher.rank("cif", reversed, Limit::new(10)),
        );
    }

    #[test]
    fn test_truncates_after_sorting() {
        let matcher = FuzzyMatcher::default();
        let matches = matcher.rank("cif", corpus(), Limit::new(1));
        assert_eq!(names(&matches), vec!["Cécile"]);
    }

    #[test]
    fn test_zero_limit_and_empty_query() {
        let matcher = FuzzyMatcher::default();
        assert!(matcher.rank("cif", corpus(), Limit::new(0)).is_empty());
        assert!(matcher.rank("", corpus(), Limit::new(10)).is_empty());
        assert!(matcher.rank("--", corpus(), Limit::new(10)).is_empty());
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let config = SearchConfig { min_similarity: 0.1, ..Default::default() };
        let matches = FuzzyMatcher::new(&config).rank("cif", corpus(), Limit::new(10));
        assert!(matches.is_empty());
    }
}
