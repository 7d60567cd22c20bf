//! High-level relationship graph API.
//!
//! [`FriendGraph`] exposes the boundary operations: connecting friends,
//! listing connections and common friends, subscribing, blocking, and
//! resolving the audience of an update. Each operation is a short
//! sequence of store reads followed by at most one write; users are
//! created on first reference through an explicit find-or-create step.

use std::path::Path;

use tracing::{info, instrument};

use super::audience::AudienceResolver;
use super::common::intersect;
use super::edges::EdgeResolver;
use super::error::{GraphError, Result};
use super::storage::SqliteStore;
use super::store::{RelationshipStore, StoreError};
use super::types::{User, UserId};
use crate::config::Config;

const FRIENDSHIP_EXISTS: &str = "Friendship already exists";
const BLOCK_EXISTS: &str = "Block already exists";
const SUBSCRIPTION_EXISTS: &str = "Subscription already exists";
const SUBSCRIPTION_TARGET_MISSING: &str = "Subscription target does not exist";
const SENDER_MISSING: &str = "Sender specified does not exist";

/// Database file created inside the data directory.
pub const DATABASE_FILE: &str = "friendnet.db";

/// High-level API over a [`RelationshipStore`].
///
/// # Example
///
/// ```
/// use friendnet_core::graph::FriendGraph;
///
/// let graph = FriendGraph::in_memory()?;
/// graph.connect("andy@example.com", "john@example.com")?;
/// assert_eq!(graph.connections("andy@example.com")?, vec!["john@example.com"]);
/// # Ok::<(), friendnet_core::graph::GraphError>(())
/// ```
#[derive(Debug)]
pub struct FriendGraph<S: RelationshipStore = SqliteStore> {
    store: S,
}

impl FriendGraph<SqliteStore> {
    /// Opens a graph backed by `SQLite` inside `data_dir`.
    ///
    /// Creates the directory and database if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or database cannot be created.
    pub fn new(data_dir: &Path) -> Result<Self> {
        create_data_dir(data_dir)?;
        let store = SqliteStore::new(&data_dir.join(DATABASE_FILE))?;
        Ok(Self::with_store(store))
    }

    /// Opens the graph described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or database cannot be created.
    pub fn from_config(config: &Config) -> Result<Self> {
        create_data_dir(&config.store.data_dir)?;
        let store = SqliteStore::open(&config.store.database_path(), config.store.busy_timeout)?;
        Ok(Self::with_store(store))
    }

    /// Creates a graph backed by an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory() -> Result<Self> {
        Ok(Self::with_store(SqliteStore::in_memory()?))
    }
}

fn create_data_dir(data_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(data_dir).map_err(|e| {
        GraphError::Internal(StoreError::Storage(format!(
            "Failed to create data directory: {e}"
        )))
    })
}

/// Maps a uniqueness collision to a conflict carrying `message`.
fn conflict(message: &'static str) -> impl FnOnce(StoreError) -> GraphError {
    move |err| match err {
        StoreError::UniqueViolation(_) => GraphError::Conflict(message.to_string()),
        other => other.into(),
    }
}

fn not_found(email: &str) -> GraphError {
    GraphError::NotFound(format!("User not found: {email}"))
}

impl<S: RelationshipStore> FriendGraph<S> {
    /// Wraps an existing store.
    #[must_use]
    pub const fn with_store(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    // ==================== Users ====================

    /// Returns the users for `emails`, creating any that are missing.
    ///
    /// The result is in the same order as `emails`. Creation goes through
    /// the store's idempotent [`create_user`], so two callers racing on
    /// the same new email end up with the same user.
    ///
    /// [`create_user`]: RelationshipStore::create_user
    fn find_or_create(&self, emails: &[&str]) -> Result<Vec<User>> {
        let existing = self.store.find_users_by_email(emails)?;

        emails
            .iter()
            .map(|email| match existing.iter().find(|u| u.email == *email) {
                Some(user) => Ok(user.clone()),
                None => {
                    let user = self.store.create_user(email)?;
                    info!(user = %user.id, "created user");
                    Ok(user)
                }
            })
            .collect()
    }

    fn find_existing(&self, email: &str) -> Result<Option<User>> {
        Ok(self.store.find_users_by_email(&[email])?.into_iter().next())
    }

    fn require(&self, email: &str) -> Result<User> {
        self.find_existing(email)?.ok_or_else(|| not_found(email))
    }

    fn emails_of(&self, ids: &[UserId]) -> Result<Vec<String>> {
        Ok(self
            .store
            .find_users_by_id(ids)?
            .into_iter()
            .map(|user| user.email)
            .collect())
    }

    // ==================== Friendships ====================

    /// Connects two users as friends, creating either if absent.
    ///
    /// # Errors
    ///
    /// - [`GraphError::Validation`] if both emails are the same.
    /// - [`GraphError::Permission`] if either user has blocked the other.
    /// - [`GraphError::Conflict`] if they are already friends.
    #[instrument(skip(self))]
    pub fn connect(&self, email_a: &str, email_b: &str) -> Result<()> {
        if email_a == email_b {
            return Err(GraphError::Validation(
                "Cannot connect a user to themselves".to_string(),
            ));
        }

        let users = self.find_or_create(&[email_a, email_b])?;
        let (a, b) = (users[0].id, users[1].id);

        if self.store.find_block(a, b)?.is_some() || self.store.find_block(b, a)?.is_some() {
            return Err(GraphError::Permission(
                "Cannot connect users when a block exists between them".to_string(),
            ));
        }

        if self.store.find_friendship(a, b)?.is_some() {
            return Err(GraphError::Conflict(FRIENDSHIP_EXISTS.to_string()));
        }

        self.store
            .create_friendship(a, b)
            .map_err(conflict(FRIENDSHIP_EXISTS))?;

        info!(a = %a, b = %b, "created friendship");
        Ok(())
    }

    /// Lists the emails of `email`'s friends, ascending by user ID.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotFound`] if the user does not exist.
    #[instrument(skip(self))]
    pub fn connections(&self, email: &str) -> Result<Vec<String>> {
        let user = self.require(email)?;
        let neighbors: Vec<UserId> = EdgeResolver::new(&self.store)
            .neighbors(user.id)?
            .into_iter()
            .collect();

        self.emails_of(&neighbors)
    }

    /// Lists the emails of users who are friends with both users.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotFound`] if either user does not exist.
    #[instrument(skip(self))]
    pub fn common_friends(&self, email_a: &str, email_b: &str) -> Result<Vec<String>> {
        let a = self.require(email_a)?;
        let b = self.require(email_b)?;

        let edges = EdgeResolver::new(&self.store);
        let friends_a: Vec<UserId> = edges.neighbors(a.id)?.into_iter().collect();
        let friends_b: Vec<UserId> = edges.neighbors(b.id)?.into_iter().collect();

        self.emails_of(&intersect(&friends_a, &friends_b))
    }

    // ==================== Subscriptions & Blocks ====================

    /// Subscribes `requestor` to `target`'s updates.
    ///
    /// The target must already exist; the requestor is created if absent.
    ///
    /// # Errors
    ///
    /// - [`GraphError::Validation`] if both emails are the same.
    /// - [`GraphError::NotFound`] if the target does not exist.
    /// - [`GraphError::Conflict`] if the subscription already exists.
    #[instrument(skip(self))]
    pub fn subscribe(&self, requestor_email: &str, target_email: &str) -> Result<()> {
        if requestor_email == target_email {
            return Err(GraphError::Validation(
                "Cannot subscribe to your own updates".to_string(),
            ));
        }

        let target = self
            .find_existing(target_email)?
            .ok_or_else(|| GraphError::NotFound(SUBSCRIPTION_TARGET_MISSING.to_string()))?;
        let requestor = self.find_or_create(&[requestor_email])?.remove(0);

        if self
            .store
            .find_subscription(requestor.id, target.id)?
            .is_some()
        {
            return Err(GraphError::Conflict(SUBSCRIPTION_EXISTS.to_string()));
        }

        self.store
            .create_subscription(requestor.id, target.id)
            .map_err(conflict(SUBSCRIPTION_EXISTS))?;

        info!(subscriber = %requestor.id, target = %target.id, "created subscription");
        Ok(())
    }

    /// Blocks `target` on behalf of `requestor`, creating either if absent.
    ///
    /// An existing friendship is left in place; the block only prevents
    /// new friendships and suppresses update delivery to `requestor`.
    ///
    /// # Errors
    ///
    /// - [`GraphError::Validation`] if both emails are the same.
    /// - [`GraphError::Conflict`] if the block already exists.
    #[instrument(skip(self))]
    pub fn block(&self, requestor_email: &str, target_email: &str) -> Result<()> {
        if requestor_email == target_email {
            return Err(GraphError::Validation(
                "Cannot block yourself".to_string(),
            ));
        }

        let users = self.find_or_create(&[requestor_email, target_email])?;
        let (blocker, target) = (users[0].id, users[1].id);

        if self.store.find_block(blocker, target)?.is_some() {
            return Err(GraphError::Conflict(BLOCK_EXISTS.to_string()));
        }

        self.store
            .create_block(blocker, target)
            .map_err(conflict(BLOCK_EXISTS))?;

        info!(blocker = %blocker, target = %target, "created block");
        Ok(())
    }

    // ==================== Updates ====================

    /// Returns the recipients of an update `text` from `sender_email`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotFound`] if the sender does not exist.
    #[instrument(skip(self, text))]
    pub fn update(&self, sender_email: &str, text: &str) -> Result<Vec<String>> {
        let sender = self
            .find_existing(sender_email)?
            .ok_or_else(|| GraphError::NotFound(SENDER_MISSING.to_string()))?;

        AudienceResolver::new(&self.store).resolve_for(&sender, text)
    }
}
