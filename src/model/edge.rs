//! Similarity edges and per-owner neighbor lists.

use std::cmp::Ordering;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::UserId;

/// Score pair carried by every edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Similarity {
    /// Primary ranking key, conventionally in [0, 1].
    pub local: f64,
    /// Secondary signal from the upstream job. Stored and returned,
    /// never used for ordering.
    pub global: f64,
}

impl Similarity {
    pub fn new(local: f64, global: f64) -> Self {
        Self { local, global }
    }
}

impl From<(f64, f64)> for Similarity {
    fn from((local, global): (f64, f64)) -> Self {
        Self { local, global }
    }
}

/// A directed edge from an owner (implicit) to `neighbor`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityEdge {
    pub neighbor: UserId,
    pub similarity: Similarity,
}

impl SimilarityEdge {
    pub fn new(neighbor: UserId, similarity: impl Into<Similarity>) -> Self {
        Self { neighbor, similarity: similarity.into() }
    }

    /// Canonical order: `local` descending, then neighbor id ascending.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .similarity
            .local
            .total_cmp(&self.similarity.local)
            .then_with(|| self.neighbor.cmp(&other.neighbor))
    }
}

/// One owner's neighbors.
///
/// Holds at most one edge per neighbor. Edges are kept in canonical order
/// (see [`SimilarityEdge::rank_cmp`]) regardless of insertion order, with a
/// side index for direct neighbor lookup.
#[derive(Debug, Clone, Default)]
pub struct NeighborList {
    edges: Vec<SimilarityEdge>,
    index: HashMap<UserId, usize>,
}

impl NeighborList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from edges. When a neighbor repeats, the last edge wins.
    pub fn from_edges(edges: impl IntoIterator<Item = SimilarityEdge>) -> Self {
        let mut latest: HashMap<UserId, Similarity> = HashMap::new();
        for edge in edges {
            latest.insert(edge.neighbor, edge.similarity);
        }
        let mut edges: Vec<SimilarityEdge> = latest
            .into_iter()
            .map(|(neighbor, similarity)| SimilarityEdge { neighbor, similarity })
            .collect();
        edges.sort_by(SimilarityEdge::rank_cmp);
        Self::from_sorted(edges)
    }

    fn from_sorted(edges: Vec<SimilarityEdge>) -> Self {
        let index = edges
            .iter()
            .enumerate()
            .map(|(pos, edge)| (edge.neighbor, pos))
            .collect();
        Self { edges, index }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Direct lookup of the edge to `neighbor`.
    pub fn get(&self, neighbor: UserId) -> Option<Similarity> {
        self.index.get(&neighbor).map(|&pos| self.edges[pos].similarity)
    }

    pub fn contains(&self, neighbor: UserId) -> bool {
        self.index.contains_key(&neighbor)
    }

    /// Edges in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &SimilarityEdge> {
        self.edges.iter()
    }

    pub fn edges(&self) -> &[SimilarityEdge] {
        &self.edges
    }

    /// Keep the top `k` edges by canonical order. Returns how many were dropped.
    pub fn truncate(&mut self, k: usize) -> usize {
        if self.edges.len() <= k {
            return 0;
        }
        let dropped = self.edges.len() - k;
        self.edges.truncate(k);
        self.index.retain(|_, pos| *pos < k);
        dropped
    }
}

impl PartialEq for NeighborList {
    fn eq(&self, other: &Self) -> bool {
        self.edges == other.edges
    }
}

impl FromIterator<SimilarityEdge> for NeighborList {
    fn from_iter<I: IntoIterator<Item = SimilarityEdge>>(iter: I) -> Self {
        Self::from_edges(iter)
    }
}

impl<'a> IntoIterator for &'a NeighborList {
    type Item = &'a SimilarityEdge;
    type IntoIter = std::slice::Iter<'a, SimilarityEdge>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(id: i64, local: f64) -> SimilarityEdge {
        SimilarityEdge::new(UserId(id), (local, 0.0))
    }

    #[test]
    fn test_canonical_order_ignores_insertion_order() {
        let list = NeighborList::from_edges([edge(2, 0.4), edge(3, 0.7), edge(1, 0.4)]);
        let ids: Vec<i64> = list.iter().map(|e| e.neighbor.0).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_duplicate_neighbor_last_wins() {
        let list = NeighborList::from_edges([edge(5, 0.1), edge(5, 0.9)]);
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(UserId(5)).map(|s| s.local), Some(0.9));
    }

    #[test]
    fn test_lookup_and_zero_score() {
        let list = NeighborList::from_edges([edge(1, 0.0)]);
        assert_eq!(list.get(UserId(1)).map(|s| s.local), Some(0.0));
        assert!(list.get(UserId(2)).is_none());
    }

    #[test]
    fn test_truncate_keeps_top_k() {
        let mut list = NeighborList::from_edges([edge(1, 0.1), edge(2, 0.9), edge(3, 0.5)]);
        assert_eq!(list.truncate(2), 1);
        assert_eq!(list.len(), 2);
        assert!(list.contains(UserId(2)));
        assert!(list.contains(UserId(3)));
        assert!(!list.contains(UserId(1)));
        assert_eq!(list.truncate(5), 0);
    }
}
