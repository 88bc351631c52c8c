//! # similar-users: similar-users search core
//!
//! A precomputed, sparse, directed similarity graph between users, fused at
//! query time with trigram matching over usernames: "find users whose name
//! resembles this query, and tell me how similar each one already is to me".
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `SimilarityStore` and `UserDirectory` are the contracts
//!    to the outside world; the core only talks to them
//! 2. **Owner-scoped atomicity**: one owner's neighbor list is replaced as a
//!    whole, never patched
//! 3. **Two pure signals**: trigram ranking and graph enrichment are separate
//!    functions, composed by the ranker
//! 4. **Lexical order wins**: graph scores annotate search results, they never
//!    reorder them
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use similar_users::{ImportBatch, Limit, SimilarUsers};
//!
//! # async fn example() -> similar_users::Result<()> {
//! let users = SimilarUsers::open_memory().await?;
//! let me = users.directory().create("Cécile", None)?;
//! let other = users.directory().create("Cecile", None)?;
//!
//! let mut batch = ImportBatch::new();
//! batch.insert(me.to_string(), other.to_string(), 0.42, 0.2);
//! users.import(&batch).await?;
//!
//! for hit in users.search("cif", Limit::new(10), me).await? {
//!     println!("{} {:.3} {:?}", hit.name, hit.lexical_score, hit.graph_similarity());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Backends
//!
//! | Collaborator | Implementation | Description |
//! |--------------|----------------|-------------|
//! | Store | `MemoryStore` | Per-owner `ArcSwap` slots |
//! | Directory | `MemoryDirectory` | In-memory user records |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod config;
pub mod storage;
pub mod directory;
pub mod import;
pub mod query;
pub mod matcher;
pub mod search;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    User, UserId, UserColumn, UserRow,
    Similarity, SimilarityEdge, NeighborList,
    GraphScore, NameMatch, SearchResult, SimilarUser, Limit,
};

// ============================================================================
// Re-exports: Collaborators and pipeline
// ============================================================================

pub use config::{SearchConfig, TieBreak};
pub use storage::{SimilarityStore, StoreCapabilities, MemoryStore};
pub use directory::{UserDirectory, MemoryDirectory};
pub use import::{ImportBatch, ImportReport, Importer, SkipReason, SkippedEntry};
pub use matcher::FuzzyMatcher;
pub use search::{SearchRanker, enrich};

// ============================================================================
// Top-level handle
// ============================================================================

/// The primary entry point. Wraps a store and a directory and exposes
/// import, graph query and search.
pub struct SimilarUsers<S: SimilarityStore, D: UserDirectory> {
    store: S,
    directory: D,
    config: SearchConfig,
    importer: Importer,
    ranker: SearchRanker,
}

impl<S: SimilarityStore, D: UserDirectory> SimilarUsers<S, D> {
    /// Build from explicit collaborators. Fails if `config` is invalid.
    pub fn with_backends(store: S, directory: D, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            importer: Importer::new(&config),
            ranker: SearchRanker::new(&config),
            store,
            directory,
            config,
        })
    }

    /// Apply an import batch, one atomic replace per owner.
    pub async fn import(&self, batch: &ImportBatch) -> Result<ImportReport> {
        self.importer.import(&self.store, batch).await
    }

    /// Parse an upstream JSON document and import it.
    pub async fn import_json(&self, raw: &str) -> Result<ImportReport> {
        let batch = ImportBatch::from_json(raw)?;
        self.import(&batch).await
    }

    /// `owner`'s neighbors, best first, with current names.
    pub async fn similar_users(&self, owner: UserId) -> Result<Vec<SimilarUser>> {
        query::similar_users(&self.store, &self.directory, owner).await
    }

    /// Fuzzy username search annotated with `searcher`'s graph similarity.
    pub async fn search(&self, query: &str, limit: Limit, searcher: UserId) -> Result<Vec<SearchResult>> {
        self.ranker
            .search(&self.store, &self.directory, query, limit, searcher)
            .await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.store.shutdown().await
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}

/// In-memory setup for testing and embedding.
impl SimilarUsers<MemoryStore, MemoryDirectory> {
    pub async fn open_memory() -> Result<Self> {
        Self::open_memory_with(SearchConfig::default()).await
    }

    pub async fn open_memory_with(config: SearchConfig) -> Result<Self> {
        Self::with_backends(MemoryStore::new(), MemoryDirectory::new(), config)
    }

    /// Remove a user from the directory together with their own neighbor
    /// list. Edges other owners hold towards the user are left alone; graph
    /// queries skip them because the name no longer resolves.
    ///
    /// The list goes first: if the store fails, the user is still there.
    pub async fn delete_user(&self, id: UserId) -> Result<bool> {
        self.store.remove_neighbors(id).await?;
        Ok(self.directory.delete(id))
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed key {key:?}: {reason}")]
    MalformedKey { key: String, reason: String },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
