//! Core record types for the relationship graph.
//!
//! Users are keyed by email at the boundary but every edge references
//! the stable numeric [`UserId`] assigned when the user was first created.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable numeric identity of a user, assigned once at first creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    /// Returns the raw integer value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A user identity.
///
/// The email is globally unique and compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable identity used on every edge.
    pub id: UserId,
    /// Unique email address.
    pub email: String,
    /// When the user was created (Unix timestamp).
    pub created_at: i64,
}

/// Undirected friendship edge.
///
/// Endpoints are stored normalised so that `user_low < user_high`; use
/// [`Friendship::between`] to build the key for an arbitrary pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Friendship {
    /// Lower endpoint ID.
    pub user_low: UserId,
    /// Higher endpoint ID.
    pub user_high: UserId,
    /// When the friendship was created (Unix timestamp).
    pub created_at: i64,
}

impl Friendship {
    /// Normalises an unordered pair into `(low, high)` order.
    #[must_use]
    pub fn between(a: UserId, b: UserId) -> (UserId, UserId) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Returns the endpoint opposite `user`, or `None` if `user` is not
    /// an endpoint of this friendship.
    #[must_use]
    pub fn other(&self, user: UserId) -> Option<UserId> {
        if user == self.user_low {
            Some(self.user_high)
        } else if user == self.user_high {
            Some(self.user_low)
        } else {
            None
        }
    }

    /// Returns whether `user` is one of the endpoints.
    #[must_use]
    pub fn involves(&self, user: UserId) -> bool {
        self.user_low == user || self.user_high == user
    }
}

/// Directed block edge: `blocker` suppresses `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// User holding the block.
    pub blocker: UserId,
    /// User being blocked.
    pub target: UserId,
    /// When the block was created (Unix timestamp).
    pub created_at: i64,
}

/// Directed subscription edge: `subscriber` receives `target`'s updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    /// User receiving updates.
    pub subscriber: UserId,
    /// User whose updates are followed.
    pub target: UserId,
    /// When the subscription was created (Unix timestamp).
    pub created_at: i64,
}
