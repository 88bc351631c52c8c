//! # Similarity Store Trait
//!
//! The contract between the similarity core and whatever persists the
//! per-user neighbor lists.
//!
//! ## Implementations
//!
//! | Backend | Module | Description |
//! |---------|--------|-------------|
//! | `MemoryStore` | `memory` | In-memory, per-owner atomic swap |
//!
//! ## Atomicity
//!
//! The unit of mutation is one owner's [`NeighborList`]. `put_neighbors`
//! must publish the new list in a single step: concurrent readers see
//! either the old list or the new one, never a mix. Different owners are
//! independent and must not serialize behind one another.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::model::{NeighborList, Similarity, UserId};
use crate::Result;

pub use memory::MemoryStore;

// ============================================================================
// Store capabilities
// ============================================================================

/// Limits a store imposes, read by the importer.
#[derive(Debug, Clone, Default)]
pub struct StoreCapabilities {
    /// Largest neighbor list the store accepts. `put_neighbors` rejects
    /// bigger lists instead of truncating them.
    pub max_neighbors: Option<usize>,
}

// ============================================================================
// SimilarityStore Trait
// ============================================================================

/// Storage for the sparse, directed user similarity graph.
#[async_trait]
pub trait SimilarityStore: Send + Sync + 'static {
    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Shut the store down. Later calls fail with `StoreUnavailable`.
    async fn shutdown(&self) -> Result<()>;

    // ========================================================================
    // Neighbor lists
    // ========================================================================

    /// Replace `owner`'s entire neighbor list atomically.
    ///
    /// Fails with `InvalidArgument` if the list holds an edge to `owner`
    /// itself or exceeds `capabilities().max_neighbors`.
    async fn put_neighbors(&self, owner: UserId, neighbors: NeighborList) -> Result<()>;

    /// The owner's current list. Unknown owners get an empty list.
    async fn get_neighbors(&self, owner: UserId) -> Result<Arc<NeighborList>>;

    /// Drop an owner's list entirely. Returns true if one existed.
    async fn remove_neighbors(&self, owner: UserId) -> Result<bool>;

    /// Direct lookup of a single edge.
    ///
    /// Default: fetch the owner's list and look the neighbor up in it.
    async fn get_edge(&self, owner: UserId, neighbor: UserId) -> Result<Option<Similarity>> {
        Ok(self.get_neighbors(owner).await?.get(neighbor))
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Number of owners with a recorded list (possibly empty).
    async fn owner_count(&self) -> Result<u64>;

    /// Total number of edges across all owners.
    async fn edge_count(&self) -> Result<u64>;

    // ========================================================================
    // Batch operations
    // ========================================================================

    /// Replace several owners' lists. Each owner is its own atomic unit;
    /// a failure leaves earlier owners committed.
    ///
    /// Default falls back to sequential `put_neighbors` calls.
    async fn put_neighbors_batch(&self, lists: Vec<(UserId, NeighborList)>) -> Result<usize> {
        let mut written = 0;
        for (owner, neighbors) in lists {
            self.put_neighbors(owner, neighbors).await?;
            written += 1;
        }
        Ok(written)
    }

    // ========================================================================
    // Capability negotiation
    // ========================================================================

    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities::default()
    }
}
