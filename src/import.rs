//! # Graph Importer
//!
//! Loads a freshly computed batch of similarity mappings into a
//! [`SimilarityStore`], replacing each owner's list as one atomic unit.
//!
//! Input is noisy: keys are opaque strings and score pairs come straight
//! from JSON. Bad entries are skipped and reported, never fatal. Only a
//! store failure aborts the run; owners written before it stay written and
//! the failing owner keeps its previous list.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, info, instrument, warn};

use crate::config::SearchConfig;
use crate::model::{NeighborList, Similarity, SimilarityEdge, UserId};
use crate::storage::SimilarityStore;
use crate::Result;

// ============================================================================
// Import batch
// ============================================================================

/// `owner → neighbor → [local, global]`, as produced upstream.
///
/// Owner mappings and score pairs are kept loosely typed so one malformed
/// entry does not fail the whole document at deserialization time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImportBatch {
    owners: BTreeMap<String, OwnerEntry>,
}

/// An owner's value: a neighbor mapping, or anything else the document held.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum OwnerEntry {
    Neighbors(BTreeMap<String, JsonValue>),
    Malformed(JsonValue),
}

impl ImportBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Add one edge.
    pub fn insert(
        &mut self,
        owner: impl Into<String>,
        neighbor: impl Into<String>,
        local: f64,
        global: f64,
    ) -> &mut Self {
        self.put(owner.into(), Some((neighbor.into(), serde_json::json!([local, global]))))
    }

    /// Add an owner with no neighbors; importing it clears the owner's list.
    pub fn insert_owner(&mut self, owner: impl Into<String>) -> &mut Self {
        self.put(owner.into(), None)
    }

    /// Add an edge with an arbitrary raw score value.
    pub fn insert_raw(
        &mut self,
        owner: impl Into<String>,
        neighbor: impl Into<String>,
        scores: JsonValue,
    ) -> &mut Self {
        self.put(owner.into(), Some((neighbor.into(), scores)))
    }

    fn put(&mut self, owner: String, edge: Option<(String, JsonValue)>) -> &mut Self {
        let entry = self
            .owners
            .entry(owner)
            .or_insert_with(|| OwnerEntry::Neighbors(BTreeMap::new()));
        if let OwnerEntry::Malformed(_) = entry {
            *entry = OwnerEntry::Neighbors(BTreeMap::new());
        }
        if let (OwnerEntry::Neighbors(neighbors), Some((neighbor, scores))) = (entry, edge) {
            neighbors.insert(neighbor, scores);
        }
        self
    }

    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

// ============================================================================
// Report
// ============================================================================

/// Why an entry was left out of an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The owner key did not parse; the owner's whole mapping was skipped.
    MalformedOwner(String),
    /// The owner's value was not a neighbor mapping; its list was left as is.
    MalformedNeighbors(String),
    MalformedNeighbor(String),
    MalformedScores(String),
    /// A key that normalizes to an id already seen in this scope.
    Duplicate(UserId),
    SelfEdge,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MalformedOwner(why) => write!(f, "malformed owner key: {why}"),
            SkipReason::MalformedNeighbors(why) => write!(f, "malformed neighbor mapping: {why}"),
            SkipReason::MalformedNeighbor(why) => write!(f, "malformed neighbor key: {why}"),
            SkipReason::MalformedScores(why) => write!(f, "malformed scores: {why}"),
            SkipReason::Duplicate(id) => write!(f, "duplicate key for user {id}"),
            SkipReason::SelfEdge => f.write_str("self edge"),
        }
    }
}

/// One skipped entry. `neighbor` is `None` when the whole owner was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub owner: String,
    pub neighbor: Option<String>,
    pub reason: SkipReason,
}

/// Outcome of a successful import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub owners_imported: usize,
    pub edges_imported: usize,
    /// Edges dropped by the neighbor cap.
    pub edges_truncated: usize,
    pub skipped: Vec<SkippedEntry>,
}

impl ImportReport {
    fn skip(&mut self, owner: &str, neighbor: Option<&str>, reason: SkipReason) {
        debug!(target: "similar_users::import", owner, ?neighbor, %reason, "skipping entry");
        self.skipped.push(SkippedEntry {
            owner: owner.to_string(),
            neighbor: neighbor.map(str::to_string),
            reason,
        });
    }
}

// ============================================================================
// Importer
// ============================================================================

/// Applies import batches to a store.
#[derive(Debug, Clone, Default)]
pub struct Importer {
    max_neighbors: Option<usize>,
}

impl Importer {
    pub fn new(config: &SearchConfig) -> Self {
        Self { max_neighbors: config.max_neighbors }
    }

    /// Cap a single owner's list to the top `max_neighbors` by local score.
    pub fn with_max_neighbors(max_neighbors: usize) -> Self {
        Self { max_neighbors: Some(max_neighbors) }
    }

    /// The tighter of our cap and the store's.
    pub fn effective_cap(&self, store_cap: Option<usize>) -> Option<usize> {
        match (self.max_neighbors, store_cap) {
            (Some(ours), Some(theirs)) => Some(ours.min(theirs)),
            (ours, theirs) => ours.or(theirs),
        }
    }

    /// Replace the neighbor list of every owner in `batch`.
    ///
    /// Owners are processed in ascending key order. Owners absent from the
    /// batch are not touched.
    #[instrument(
        name = "similar_users::import",
        skip(self, store, batch),
        fields(owners = batch.owner_count())
    )]
    pub async fn import<S>(&self, store: &S, batch: &ImportBatch) -> Result<ImportReport>
    where
        S: SimilarityStore + ?Sized,
    {
        let cap = self.effective_cap(store.capabilities().max_neighbors);
        let mut report = ImportReport::default();
        let mut seen_owners = HashSet::with_capacity(batch.owners.len());

        for (owner_key, entry) in &batch.owners {
            let owner = match owner_key.parse::<UserId>() {
                Ok(owner) => owner,
                Err(e) => {
                    report.skip(owner_key, None, SkipReason::MalformedOwner(e.to_string()));
                    continue;
                }
            };
            let neighbors = match entry {
                OwnerEntry::Neighbors(neighbors) => neighbors,
                OwnerEntry::Malformed(raw) => {
                    let why = format!("expected {{neighbor: [local, global]}}, got {raw}");
                    report.skip(owner_key, None, SkipReason::MalformedNeighbors(why));
                    continue;
                }
            };
            if !seen_owners.insert(owner) {
                report.skip(owner_key, None, SkipReason::Duplicate(owner));
                continue;
            }

            let mut list = normalize_neighbors(owner_key, owner, neighbors, &mut report);
            if let Some(cap) = cap {
                let dropped = list.truncate(cap);
                if dropped > 0 {
                    debug!(target: "similar_users::import", %owner, dropped, cap, "truncated neighbor list");
                    report.edges_truncated += dropped;
                }
            }

            let edges = list.len();
            if let Err(e) = store.put_neighbors(owner, list).await {
                warn!(
                    target: "similar_users::import",
                    %owner,
                    committed = report.owners_imported,
                    error = %e,
                    "import aborted"
                );
                return Err(e);
            }
            report.owners_imported += 1;
            report.edges_imported += edges;
        }

        if !report.skipped.is_empty() {
            warn!(
                target: "similar_users::import",
                skipped = report.skipped.len(),
                "import finished with skipped entries"
            );
        }
        info!(
            target: "similar_users::import",
            owners = report.owners_imported,
            edges = report.edges_imported,
            truncated = report.edges_truncated,
            "import finished"
        );
        Ok(report)
    }
}

fn normalize_neighbors(
    owner_key: &str,
    owner: UserId,
    neighbors: &BTreeMap<String, JsonValue>,
    report: &mut ImportReport,
) -> NeighborList {
    let mut seen = HashSet::with_capacity(neighbors.len());
    let mut edges = Vec::with_capacity(neighbors.len());

    for (neighbor_key, raw) in neighbors {
        let neighbor = match neighbor_key.parse::<UserId>() {
            Ok(neighbor) => neighbor,
            Err(e) => {
                report.skip(owner_key, Some(neighbor_key.as_str()), SkipReason::MalformedNeighbor(e.to_string()));
                continue;
            }
        };
        if neighbor == owner {
            report.skip(owner_key, Some(neighbor_key.as_str()), SkipReason::SelfEdge);
            continue;
        }
        if !seen.insert(neighbor) {
            report.skip(owner_key, Some(neighbor_key.as_str()), SkipReason::Duplicate(neighbor));
            continue;
        }
        match parse_scores(raw) {
            Ok(similarity) => edges.push(SimilarityEdge { neighbor, similarity }),
            Err(why) => report.skip(owner_key, Some(neighbor_key.as_str()), SkipReason::MalformedScores(why)),
        }
    }

    NeighborList::from_edges(edges)
}

/// Scores must be a two-element array of finite numbers.
fn parse_scores(raw: &JsonValue) -> std::result::Result<Similarity, String> {
    let pair = raw
        .as_array()
        .ok_or_else(|| format!("expected [local, global], got {raw}"))?;
    if pair.len() != 2 {
        return Err(format!("expected 2 scores, got {}", pair.len()));
    }
    let score = |v: &JsonValue| {
        v.as_f64()
            .filter(|s| s.is_finite())
            .ok_or_else(|| format!("not a finite number: {v}"))
    };
    Ok(Similarity::new(score(&pair[0])?, score(&pair[1])?))
}

// ============================================================================
// Tests
// ============================================================================
