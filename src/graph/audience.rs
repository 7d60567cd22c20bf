//! Recipient resolution for broadcast updates.
//!
//! The audience of an update is built from three sources:
//!
//! ```text
//! subscribers(sender) ∪ neighbors(sender)    (by user ID)
//!     − blockers(sender)                     (users who blocked the sender)
//!     → resolved to emails
//!     ∪ mentions(text)                       (raw emails, never filtered)
//! ```
//!
//! Mentions bypass both the block filter and the requirement that the
//! address belongs to a known user.

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use super::edges::EdgeResolver;
use super::error::{GraphError, Result};
use super::mentions::MentionParser;
use super::store::RelationshipStore;
use super::types::{User, UserId};

/// Computes the recipient list for a sender's update.
#[derive(Debug)]
pub struct AudienceResolver<'a, S: RelationshipStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RelationshipStore + ?Sized> AudienceResolver<'a, S> {
    /// Creates a resolver reading from `store`.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Resolves the deduplicated recipient emails for an update `text`
    /// sent by `sender`.
    ///
    /// Connected recipients come first in ascending user-ID order,
    /// followed by mentioned addresses in order of first appearance.
    /// Each address appears once. The sender is only a recipient when
    /// the text mentions the sender's own address.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotFound`] if `sender` does not exist, or
    /// [`GraphError::Internal`] if a store read fails.
    pub fn resolve(&self, sender: UserId, text: &str) -> Result<Vec<String>> {
        let user = self
            .store
            .find_users_by_id(&[sender])?
            .into_iter()
            .next()
            .ok_or_else(|| GraphError::NotFound("Sender specified does not exist".to_string()))?;

        self.resolve_for(&user, text)
    }

    /// Same as [`resolve`](Self::resolve) for a sender already read from
    /// the store.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Internal`] if a store read fails.
    pub fn resolve_for(&self, sender: &User, text: &str) -> Result<Vec<String>> {
        let sender = sender.id;
        let recipient_ids = self.connected_recipients(sender)?;
        let mentions = MentionParser::parse(text);

        let connected = self.store.find_users_by_id(&recipient_ids)?;

        let mut seen = HashSet::with_capacity(connected.len() + mentions.len());
        let recipients: Vec<String> = connected
            .into_iter()
            .map(|user| user.email)
            .chain(mentions.iter().map(|mention| (*mention).to_string()))
            .filter(|email| seen.insert(email.clone()))
            .collect();

        debug!(
            sender = %sender,
            connected = recipient_ids.len(),
            mentions = mentions.len(),
            recipients = recipients.len(),
            "resolved update audience"
        );

        Ok(recipients)
    }

    /// Subscribers and friends of `sender`, minus everyone who blocked
    /// the sender, in ascending ID order.
    fn connected_recipients(&self, sender: UserId) -> Result<Vec<UserId>> {
        let edges = EdgeResolver::new(self.store);

        let mut candidates: BTreeSet<UserId> = edges.subscribers_of(sender)?;
        candidates.extend(edges.neighbors(sender)?);
        let blocked = edges.blockers_of(sender)?;

        Ok(candidates
            .difference(&blocked)
            .copied()
            .filter(|id| *id != sender)
            .collect())
    }
}
