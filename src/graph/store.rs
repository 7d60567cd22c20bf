//! The persistence surface consumed by the graph core.
//!
//! The core never touches storage directly; every resolver and the
//! [`FriendGraph`](super::FriendGraph) facade are handed a
//! [`RelationshipStore`] explicitly. The store owns identity assignment
//! and uniqueness; the core only reads records and asks for inserts.

use thiserror::Error;

use super::types::{Block, Friendship, Subscription, User, UserId};

/// Errors raised by a [`RelationshipStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An insert collided with a uniqueness constraint.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Database error from `SQLite`.
    #[error("Database error: {0}")]
    Database(rusqlite::Error),

    /// The connection lock was poisoned by a panicking holder.
    #[error("Failed to acquire database lock: {0}")]
    Lock(String),

    /// A stored row could not be decoded.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Storage setup (directories, files) failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(ref failure, ref message) = err {
            let unique = failure.code == rusqlite::ErrorCode::ConstraintViolation
                && matches!(
                    failure.extended_code,
                    rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                        | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                );
            if unique {
                return Self::UniqueViolation(
                    message.clone().unwrap_or_else(|| failure.to_string()),
                );
            }
        }
        Self::Database(err)
    }
}

/// Record storage for users and the three edge kinds.
///
/// Implementations must be safe to share across threads and must
/// enforce uniqueness themselves: duplicate edge inserts fail with
/// [`StoreError::UniqueViolation`], and [`create_user`] is idempotent
/// on email even under concurrent callers.
///
/// [`create_user`]: RelationshipStore::create_user
pub trait RelationshipStore: Send + Sync {
    /// Looks up every user whose email is in `emails`.
    ///
    /// Emails with no matching user are silently skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails.
    fn find_users_by_email(&self, emails: &[&str]) -> StoreResult<Vec<User>>;

    /// Looks up every user whose ID is in `ids`, ordered by ascending ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails.
    fn find_users_by_id(&self, ids: &[UserId]) -> StoreResult<Vec<User>>;

    /// Creates a user for `email`, or returns the existing one.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying write fails.
    fn create_user(&self, email: &str) -> StoreResult<User>;

    /// Finds the friendship between `a` and `b` in either orientation.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails.
    fn find_friendship(&self, a: UserId, b: UserId) -> StoreResult<Option<Friendship>>;

    /// Creates the friendship between `a` and `b`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UniqueViolation`] if the pair is already
    /// connected, or another error if the write fails.
    fn create_friendship(&self, a: UserId, b: UserId) -> StoreResult<Friendship>;

    /// Returns every friendship with `user` at either endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails.
    fn friendships_of(&self, user: UserId) -> StoreResult<Vec<Friendship>>;

    /// Finds the block from `blocker` to `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails.
    fn find_block(&self, blocker: UserId, target: UserId) -> StoreResult<Option<Block>>;

    /// Creates a block from `blocker` to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UniqueViolation`] on a duplicate block.
    fn create_block(&self, blocker: UserId, target: UserId) -> StoreResult<Block>;

    /// Returns every block whose target is `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails.
    fn blocks_targeting(&self, target: UserId) -> StoreResult<Vec<Block>>;

    /// Finds the subscription from `subscriber` to `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails.
    fn find_subscription(
        &self,
        subscriber: UserId,
        target: UserId,
    ) -> StoreResult<Option<Subscription>>;

    /// Creates a subscription from `subscriber` to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UniqueViolation`] on a duplicate subscription.
    fn create_subscription(&self, subscriber: UserId, target: UserId)
        -> StoreResult<Subscription>;

    /// Returns every subscription whose target is `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails.
    fn subscriptions_targeting(&self, target: UserId) -> StoreResult<Vec<Subscription>>;
}
