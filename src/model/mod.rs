//! # Data Model
//!
//! Plain DTOs shared by the store, importer, matcher and ranker.
//! No I/O, no state, no async.

pub mod user;
pub mod edge;
pub mod result;

pub use user::{User, UserId, UserColumn, UserRow};
pub use edge::{Similarity, SimilarityEdge, NeighborList};
pub use result::{GraphScore, NameMatch, SearchResult, SimilarUser, Limit};
