//! In-memory similarity store.
//!
//! This is the reference implementation of `SimilarityStore`.
//!
//! Every owner gets its own `ArcSwap<NeighborList>` slot. Replacing a list
//! builds the new `NeighborList` off to the side and publishes it with a
//! single pointer swap, so readers never see a half-written list and a
//! reader holding the old `Arc` keeps a consistent snapshot.
//!
//! The owner map itself sits behind a `parking_lot::RwLock`. Replacing an
//! existing owner only takes the read side; the write side is taken briefly
//! the first time an owner appears, or when one is removed.
//!
//! ## Limitations
//!
//! - **No persistence**: everything is lost on drop.
//! - **Single writer per owner**: two concurrent writers for the same owner
//!   both succeed and the last swap wins.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::model::{NeighborList, UserId};
use crate::{Error, Result};
use super::{SimilarityStore, StoreCapabilities};

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory similarity graph. Cloning shares the same underlying data.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    /// owner → independently swappable neighbor list
    lists: RwLock<HashMap<UserId, ArcSwap<NeighborList>>>,
    /// shared empty list handed out for unknown owners
    empty: Arc<NeighborList>,
    max_neighbors: Option<usize>,
    open: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// A store that refuses lists longer than `max_neighbors`.
    pub fn with_max_neighbors(max_neighbors: usize) -> Self {
        Self::build(Some(max_neighbors))
    }

    fn build(max_neighbors: Option<usize>) -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                lists: RwLock::new(HashMap::new()),
                empty: Arc::new(NeighborList::new()),
                max_neighbors,
                open: AtomicBool::new(true),
            }),
        }
    }

    fn check_open(&self) -> Result<()> {
        if self.inner.open.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(Error::StoreUnavailable("memory store has been shut down".into()))
        }
    }

    fn check_list(&self, owner: UserId, neighbors: &NeighborList) -> Result<()> {
        if neighbors.contains(owner) {
            return Err(Error::InvalidArgument(format!("user {owner} cannot be its own neighbor")));
        }
        if let Some(cap) = self.inner.max_neighbors {
            if neighbors.len() > cap {
                return Err(Error::InvalidArgument(format!(
                    "neighbor list for {owner} has {} edges, store cap is {cap}",
                    neighbors.len()
                )));
            }
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SimilarityStore impl
// ============================================================================

#[async_trait]
impl SimilarityStore for MemoryStore {
    async fn shutdown(&self) -> Result<()> {
        self.inner.open.store(false, Ordering::Release);
        Ok(())
    }

    async fn put_neighbors(&self, owner: UserId, neighbors: NeighborList) -> Result<()> {
        self.check_open()?;
        self.check_list(owner, &neighbors)?;

        let edges = neighbors.len();
        let list = Arc::new(neighbors);

        // Fast path: existing owner, swap under the read lock.
        {
            let lists = self.inner.lists.read();
            if let Some(slot) = lists.get(&owner) {
                slot.store(list);
                debug!(target: "similar_users::store", %owner, edges, "replaced neighbor list");
                return Ok(());
            }
        }

        match self.inner.lists.write().entry(owner) {
            Entry::Occupied(slot) => slot.get().store(list),
            Entry::Vacant(slot) => {
                slot.insert(ArcSwap::new(list));
            }
        }
        debug!(target: "similar_users::store", %owner, edges, "stored neighbor list");
        Ok(())
    }

    async fn get_neighbors(&self, owner: UserId) -> Result<Arc<NeighborList>> {
        self.check_open()?;
        let lists = self.inner.lists.read();
        Ok(lists
            .get(&owner)
            .map(|slot| slot.load_full())
            .unwrap_or_else(|| Arc::clone(&self.inner.empty)))
    }

    async fn remove_neighbors(&self, owner: UserId) -> Result<bool> {
        self.check_open()?;
        Ok(self.inner.lists.write().remove(&owner).is_some())
    }

    async fn owner_count(&self) -> Result<u64> {
        self.check_open()?;
        Ok(self.inner.lists.read().len() as u64)
    }

    async fn edge_count(&self) -> Result<u64> {
        self.check_open()?;
        let lists = self.inner.lists.read();
        Ok(lists.values().map(|slot| slot.load().len() as u64).sum())
    }

    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities { max_neighbors: self.inner.max_neighbors }
    }
}

// ============================================================================
// Tests
// ============================================================================
