//! Concurrency tests for the in-memory store.
//!
//! Readers racing a writer must see a whole list, old or new. Writers for
//! different owners must not lose each other's updates.

use std::sync::Arc;

use similar_users::{MemoryStore, NeighborList, SimilarityEdge, SimilarityStore, UserId};

fn list(ids: &[i64], local: f64) -> NeighborList {
    ids.iter()
        .map(|&id| SimilarityEdge::new(UserId(id), (local, 0.0)))
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_never_see_a_mixed_list() {
    let store = Arc::new(MemoryStore::new());
    let owner = UserId(1);
    store.put_neighbors(owner, list(&[2, 3], 0.1)).await.unwrap();

    let writer = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            for i in 0..500 {
                let next = if i % 2 == 0 { list(&[4, 5, 6], 0.9) } else { list(&[2, 3], 0.1) };
                store.put_neighbors(owner, next).await.unwrap();
                tokio::task::yield_now().await;
            }
        })
    };

    let mut readers = Vec::new();
    for _ in 0..3 {
        let store = Arc::clone(&store);
        readers.push(tokio::spawn(async move {
            for _ in 0..500 {
                let snapshot = store.get_neighbors(owner).await.unwrap();
                let ids: Vec<i64> = snapshot.iter().map(|e| e.neighbor.0).collect();
                let old = ids == vec![2, 3] && snapshot.iter().all(|e| e.similarity.local == 0.1);
                let new = ids == vec![4, 5, 6] && snapshot.iter().all(|e| e.similarity.local == 0.9);
                assert!(old || new, "mixed snapshot: {ids:?}");
                tokio::task::yield_now().await;
            }
        }));
    }

    writer.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_disjoint_owners_import_concurrently() {
    let store = Arc::new(MemoryStore::new());

    let mut writers = Vec::new();
    for owner in 1..=16i64 {
        let store = Arc::clone(&store);
        writers.push(tokio::spawn(async move {
            for round in 0..20 {
                let neighbors: Vec<i64> = (100..100 + round + 1).collect();
                store.put_neighbors(UserId(owner), list(&neighbors, 0.5)).await.unwrap();
            }
        }));
    }
    for writer in writers {
        writer.await.unwrap();
    }

    assert_eq!(store.owner_count().await.unwrap(), 16);
    assert_eq!(store.edge_count().await.unwrap(), 16 * 20);
    for owner in 1..=16 {
        assert_eq!(store.get_neighbors(UserId(owner)).await.unwrap().len(), 20);
    }
}
