//! # Search Ranker
//!
//! Fuses two signals: lexical closeness of usernames (from the fuzzy
//! matcher) and graph closeness to the searcher (from the store). The
//! lexical order is authoritative; graph scores only annotate it.

use tracing::{debug, instrument};

use crate::config::SearchConfig;
use crate::directory::UserDirectory;
use crate::matcher::FuzzyMatcher;
use crate::model::{Limit, NameMatch, NeighborList, SearchResult, UserId};
use crate::storage::SimilarityStore;
use crate::Result;

/// Attach the searcher's graph similarity to each match, keeping order.
///
/// A match without an edge in `neighbors` gets
/// [`GraphScore::Unrelated`](crate::model::GraphScore::Unrelated).
pub fn enrich(matches: Vec<NameMatch>, neighbors: &NeighborList) -> Vec<SearchResult> {
    matches
        .into_iter()
        .map(|m| SearchResult {
            graph_score: neighbors.get(m.id).map(|s| s.local).into(),
            id: m.id,
            name: m.name,
            lexical_score: m.score,
        })
        .collect()
}

/// Similar-users search over a directory and a similarity store.
#[derive(Debug, Clone, Default)]
pub struct SearchRanker {
    matcher: FuzzyMatcher,
}

impl SearchRanker {
    pub fn new(config: &SearchConfig) -> Self {
        Self { matcher: FuzzyMatcher::new(config) }
    }

    pub fn matcher(&self) -> &FuzzyMatcher {
        &self.matcher
    }

    /// Usernames resembling `query`, best lexical match first, each
    /// annotated with the searcher's similarity to that user.
    ///
    /// An unknown searcher is not an error: every result is `Unrelated`.
    /// The searcher's own name may appear and is `Unrelated` too, since the
    /// store never holds self-edges.
    #[instrument(name = "similar_users::search", skip(self, store, directory, limit), fields(limit = limit.get()))]
    pub async fn search<S, D>(
        &self,
        store: &S,
        directory: &D,
        query: &str,
        limit: Limit,
        searcher: UserId,
    ) -> Result<Vec<SearchResult>>
    where
        S: SimilarityStore + ?Sized,
        D: UserDirectory + ?Sized,
    {
        if limit.is_zero() {
            return Ok(Vec::new());
        }

        let corpus = directory.usernames().await?;
        let matches = self
            .matcher
            .rank(query, corpus.iter().map(|(id, name)| (*id, name.as_str())), limit);
        if matches.is_empty() {
            debug!(target: "similar_users::search", corpus = corpus.len(), "no candidates");
            return Ok(Vec::new());
        }

        let neighbors = store.get_neighbors(searcher).await?;
        let results = enrich(matches, &neighbors);
        debug!(
            target: "similar_users::search",
            corpus = corpus.len(),
            results = results.len(),
            related = results.iter().filter(|r| r.graph_score.is_related()).count(),
            "search finished"
        );
        Ok(results)
    }
}
