//! # Graph Query
//!
//! An owner's neighbors, best first, with names resolved at query time so
//! renames show up without re-importing.

use crate::directory::UserDirectory;
use crate::model::{SimilarUser, UserId};
use crate::storage::SimilarityStore;
use crate::Result;

/// Neighbors of `owner` ordered by local similarity descending, then
/// neighbor id ascending.
///
/// Unknown or edge-less owners yield an empty list. Neighbors the directory
/// no longer knows about are left out.
pub async fn similar_users<S, D>(store: &S, directory: &D, owner: UserId) -> Result<Vec<SimilarUser>>
where
    S: SimilarityStore + ?Sized,
    D: UserDirectory + ?Sized,
{
    let neighbors = store.get_neighbors(owner).await?;
    if neighbors.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<UserId> = neighbors.iter().map(|e| e.neighbor).collect();
    let mut names = directory.users_by_id(&ids).await?;

    // NeighborList iterates in canonical order already.
    Ok(neighbors
        .iter()
        .filter_map(|edge| {
            names.remove(&edge.neighbor).map(|name| SimilarUser {
                id: edge.neighbor,
                name,
                similarity: edge.similarity.local,
            })
        })
        .collect())
}
