//! End-to-end tests for importing upstream similarity documents.
//!
//! Each test feeds a JSON document shaped like the offline job's output
//! through `SimilarUsers::import_json` and checks what became visible.

use pretty_assertions::assert_eq;
use similar_users::{
    Error, ImportBatch, MemoryDirectory, MemoryStore, SearchConfig, SimilarUsers, SimilarityStore,
    SkipReason, UserId,
};

// ============================================================================
// 1. A clean document
// ============================================================================

#[tokio::test]
async fn test_import_json_document() {
    let users = SimilarUsers::open_memory().await.unwrap();
    let report = users
        .import_json(
            r#"{
                "1": { "2": [0.4, 0.01], "3": [0.7, 0.001] },
                "2": { "1": [0.4, 0.01] },
                "3": { "1": [0.7, 0.02] }
            }"#,
        )
        .await
        .unwrap();

    assert_eq!(report.owners_imported, 3);
    assert_eq!(report.edges_imported, 4);
    assert!(report.skipped.is_empty());
    assert_eq!(users.store().owner_count().await.unwrap(), 3);

    let ordered: Vec<UserId> = users
        .store()
        .get_neighbors(UserId(1))
        .await
        .unwrap()
        .iter()
        .map(|e| e.neighbor)
        .collect();
    assert_eq!(ordered, vec![UserId(3), UserId(2)]);
}

// ============================================================================
// 2. Noisy documents are imported partially
// ============================================================================

#[tokio::test]
async fn test_noisy_document() {
    let users = SimilarUsers::open_memory().await.unwrap();
    let report = users
        .import_json(
            r#"{
                "1": { "2": [0.4, 0.01], "two": [0.5, 0.1], "3": [0.6], "1": [1.0, 1.0] },
                "user-9": { "1": [0.3, 0.0] },
                " 4 ": { "1": [0.2, "0.1"], "2": [0.9, 0.3] }
            }"#,
        )
        .await
        .unwrap();

    assert_eq!(report.owners_imported, 2);
    assert_eq!(report.edges_imported, 2);

    let mut reasons: Vec<String> = report
        .skipped
        .iter()
        .map(|s| match &s.reason {
            SkipReason::MalformedOwner(_) => format!("owner {}", s.owner),
            SkipReason::MalformedNeighbors(_) => format!("mapping {}", s.owner),
            SkipReason::MalformedNeighbor(_) => format!("neighbor {}", s.neighbor.as_deref().unwrap_or("")),
            SkipReason::MalformedScores(_) => format!("scores {}", s.neighbor.as_deref().unwrap_or("")),
            SkipReason::SelfEdge => "self".to_string(),
            SkipReason::Duplicate(id) => format!("dup {id}"),
        })
        .collect();
    reasons.sort();
    assert_eq!(
        reasons,
        vec!["neighbor two", "owner user-9", "scores 1", "scores 3", "self"]
    );

    assert!(users.store().get_neighbors(UserId(4)).await.unwrap().contains(UserId(2)));
}

// ============================================================================
// 3. Only a document that is not a mapping at all fails as a whole
// ============================================================================

#[tokio::test]
async fn test_malformed_document() {
    let users = SimilarUsers::open_memory().await.unwrap();
    assert!(matches!(users.import_json("[1, 2, 3]").await, Err(Error::Json(_))));
    assert!(matches!(users.import_json("not json").await, Err(Error::Json(_))));
    assert_eq!(users.store().owner_count().await.unwrap(), 0);

    let report = users
        .import_json(r#"{ "1": { "2": [0.4, 0.01] }, "3": null, "4": 5 }"#)
        .await
        .unwrap();
    assert_eq!(report.owners_imported, 1);
    let mut skipped: Vec<&str> = report.skipped.iter().map(|s| s.owner.as_str()).collect();
    skipped.sort();
    assert_eq!(skipped, vec!["3", "4"]);
    assert!(report.skipped.iter().all(|s| matches!(s.reason, SkipReason::MalformedNeighbors(_))));
    assert!(users.store().get_neighbors(UserId(1)).await.unwrap().contains(UserId(2)));
    assert_eq!(users.store().owner_count().await.unwrap(), 1);
}

// ============================================================================
// 4. Configured neighbor cap
// ============================================================================

#[tokio::test]
async fn test_configured_cap() {
    let config = SearchConfig { max_neighbors: Some(2), ..Default::default() };
    let users = SimilarUsers::open_memory_with(config).await.unwrap();

    let mut batch = ImportBatch::new();
    for (neighbor, score) in [(2, 0.2), (3, 0.9), (4, 0.5), (5, 0.7)] {
        batch.insert("1", neighbor.to_string(), score, 0.0);
    }
    let report = users.import(&batch).await.unwrap();
    assert_eq!(report.edges_truncated, 2);

    let kept: Vec<UserId> = users.store().get_neighbors(UserId(1)).await.unwrap().iter().map(|e| e.neighbor).collect();
    assert_eq!(kept, vec![UserId(3), UserId(5)]);
}

// ============================================================================
// 5. Invalid configuration is refused up front
// ============================================================================

#[tokio::test]
async fn test_invalid_config() {
    let config = SearchConfig { max_neighbors: Some(0), ..Default::default() };
    let built = SimilarUsers::with_backends(MemoryStore::new(), MemoryDirectory::new(), config);
    assert!(matches!(built, Err(Error::InvalidArgument(_))));
}

// ============================================================================
// 6. Batch round-trips through JSON
// ============================================================================

#[tokio::test]
async fn test_batch_serializes_in_upstream_shape() {
    let mut batch = ImportBatch::new();
    batch.insert("1", "2", 0.5, 0.25);
    let json = serde_json::to_value(&batch).unwrap();
    assert_eq!(json, serde_json::json!({ "1": { "2": [0.5, 0.25] } }));
}
