//! Per-user neighbour, blocker and subscriber sets.
//!
//! [`EdgeResolver`] turns raw edge records into ID sets. Sets are
//! [`BTreeSet`]s so callers can hand them straight to
//! [`intersect`](super::common::intersect) as ascending sequences.

use std::collections::BTreeSet;

use tracing::trace;

use super::store::{RelationshipStore, StoreResult};
use super::types::UserId;

/// Read-only view of one user's edges.
///
/// Holds no state beyond the borrowed store; every call is a fresh read.
#[derive(Debug)]
pub struct EdgeResolver<'a, S: RelationshipStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RelationshipStore + ?Sized> EdgeResolver<'a, S> {
    /// Creates a resolver reading from `store`.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// IDs connected to `user` by a friendship, whichever endpoint
    /// `user` occupies.
    ///
    /// # Errors
    ///
    /// Returns an error if the store read fails.
    pub fn neighbors(&self, user: UserId) -> StoreResult<BTreeSet<UserId>> {
        let neighbors: BTreeSet<UserId> = self
            .store
            .friendships_of(user)?
            .iter()
            .filter_map(|friendship| friendship.other(user))
            .collect();

        trace!(user = %user, count = neighbors.len(), "resolved neighbors");
        Ok(neighbors)
    }

    /// IDs holding a block that targets `user`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store read fails.
    pub fn blockers_of(&self, user: UserId) -> StoreResult<BTreeSet<UserId>> {
        Ok(self
            .store
            .blocks_targeting(user)?
            .into_iter()
            .map(|block| block.blocker)
            .collect())
    }

    /// IDs holding a subscription that targets `user`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store read fails.
    pub fn subscribers_of(&self, user: UserId) -> StoreResult<BTreeSet<UserId>> {
        Ok(self
            .store
            .subscriptions_targeting(user)?
            .into_iter()
            .map(|subscription| subscription.subscriber)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::storage::SqliteStore;

    fn ids(store: &SqliteStore, emails: &[&str]) -> Vec<UserId> {
        emails
            .iter()
            .map(|email| store.create_user(email).unwrap().id)
            .collect()
    }

    #[test]
    fn neighbors_from_either_endpoint() {
        let store = SqliteStore::in_memory().unwrap();
        let u = ids(&store, &["a@x.com", "b@x.com", "c@x.com", "d@x.com"]);
        store.create_friendship(u[0], u[1]).unwrap();
        store.create_friendship(u[2], u[0]).unwrap();
        store.create_friendship(u[2], u[3]).unwrap();

        let resolver = EdgeResolver::new(&store);
        let neighbors = resolver.neighbors(u[0]).unwrap();

        assert_eq!(neighbors.into_iter().collect::<Vec<_>>(), vec![u[1], u[2]]);
    }

    #[test]
    fn neighbors_of_isolated_user_is_empty() {
        let store = SqliteStore::in_memory().unwrap();
        let u = ids(&store, &["a@x.com"]);
        assert!(EdgeResolver::new(&store).neighbors(u[0]).unwrap().is_empty());
    }

    #[test]
    fn blockers_only_include_inbound_blocks() {
        let store = SqliteStore::in_memory().unwrap();
        let u = ids(&store, &["a@x.com", "b@x.com", "c@x.com"]);
        store.create_block(u[1], u[0]).unwrap();
        store.create_block(u[0], u[2]).unwrap();

        let blockers = EdgeResolver::new(&store).blockers_of(u[0]).unwrap();
        assert_eq!(blockers.into_iter().collect::<Vec<_>>(), vec![u[1]]);
    }

    #[test]
    fn subscribers_only_include_inbound_subscriptions() {
        let store = SqliteStore::in_memory().unwrap();
        let u = ids(&store, &["a@x.com", "b@x.com", "c@x.com"]);
        store.create_subscription(u[1], u[0]).unwrap();
        store.create_subscription(u[2], u[0]).unwrap();
        store.create_subscription(u[0], u[1]).unwrap();

        let subscribers = EdgeResolver::new(&store).subscribers_of(u[0]).unwrap();
        assert_eq!(
            subscribers.into_iter().collect::<Vec<_>>(),
            vec![u[1], u[2]]
        );
    }
}
