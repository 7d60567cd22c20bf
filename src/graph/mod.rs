//! Relationship graph and update audience resolution.
//!
//! This module keeps track of who is friends with whom, who follows
//! whose updates, and who has blocked whom, and from that computes
//! mutual friends and the recipients of a broadcast update.
//!
//! # Architecture
//!
//! ```text
//! FriendGraph (boundary operations)
//!     ├── AudienceResolver (update recipients)
//!     │       ├── EdgeResolver (neighbour / blocker / subscriber sets)
//!     │       └── MentionParser (emails named in the text)
//!     ├── intersect (common friends)
//!     └── RelationshipStore (SqliteStore by default)
//! ```
//!
//! # Types
//!
//! - [`User`]: an email address with a stable [`UserId`]
//! - [`Friendship`]: undirected edge, at most one per pair
//! - [`Block`]: directed edge suppressing friendship and update delivery
//! - [`Subscription`]: directed edge granting update delivery

mod audience;
mod common;
mod edges;
mod error;
mod manager;
mod mentions;
mod storage;
mod store;
pub mod types;

pub use audience::AudienceResolver;
pub use common::intersect;
pub use edges::EdgeResolver;
pub use error::{ErrorKind, GraphError, Result};
pub use manager::{FriendGraph, DATABASE_FILE};
pub use mentions::MentionParser;
pub use storage::SqliteStore;
pub use store::{RelationshipStore, StoreError, StoreResult};
pub use types::{Block, Friendship, Subscription, User, UserId};
