//! Property-based tests for the relationship graph.
//!
//! These tests verify:
//! - `intersect` agrees with set intersection on sorted inputs
//! - Every parsed mention is a valid address taken from the text
//! - The update audience matches a simple model of friends, subscribers
//!   and blocks built from whichever operations succeeded

use std::collections::BTreeSet;

use friendnet_core::email::is_email;
use friendnet_core::graph::{intersect, FriendGraph, MentionParser, RelationshipStore};
use proptest::prelude::*;

const USERS: usize = 6;

fn email(index: usize) -> String {
    format!("u{index}@x.com")
}

fn sorted_unique(values: Vec<i64>) -> Vec<i64> {
    values.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

// ============================================================================
// Intersection
// ============================================================================

/// The last element of both inputs must survive the merge.
#[test]
fn intersect_keeps_trailing_match() {
    assert_eq!(intersect(&[1, 2, 3, 5], &[2, 3, 4, 5]), vec![2, 3, 5]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: the merge equals the `BTreeSet` intersection.
    #[test]
    fn intersect_matches_set_model(
        a in prop::collection::vec(-50i64..50, 0..30),
        b in prop::collection::vec(-50i64..50, 0..30),
    ) {
        let a = sorted_unique(a);
        let b = sorted_unique(b);

        let expected: Vec<i64> = a
            .iter()
            .collect::<BTreeSet<_>>()
            .intersection(&b.iter().collect())
            .map(|v| **v)
            .collect();

        prop_assert_eq!(intersect(&a, &b), expected);
    }

    /// Property: argument order does not matter.
    #[test]
    fn intersect_is_commutative(
        a in prop::collection::vec(-50i64..50, 0..30),
        b in prop::collection::vec(-50i64..50, 0..30),
    ) {
        let a = sorted_unique(a);
        let b = sorted_unique(b);
        prop_assert_eq!(intersect(&a, &b), intersect(&b, &a));
    }

    /// Property: a list intersected with itself is unchanged, and with the
    /// empty list is empty.
    #[test]
    fn intersect_identity_and_empty(a in prop::collection::vec(-50i64..50, 0..30)) {
        let a = sorted_unique(a);
        prop_assert_eq!(intersect(&a, &a), a.clone());
        prop_assert!(intersect(&a, &[]).is_empty());
    }
}

// ============================================================================
// Mentions
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: every mention is a valid address appearing in the text.
    #[test]
    fn mentions_are_valid_addresses(text in "[a-z@. ]{0,64}") {
        for mention in MentionParser::parse(&text) {
            prop_assert!(is_email(mention), "invalid mention {:?}", mention);
            prop_assert!(text.contains(mention));
        }
    }

    /// Property: the `@` sigil does not change which address is mentioned.
    #[test]
    fn sigil_is_transparent(local in "[a-z]{1,8}", domain in "[a-z]{1,8}") {
        let address = format!("{local}@{domain}.com");
        let bare = MentionParser::parse(&address);
        let prefixed_text = format!("@{address}");
        let prefixed = MentionParser::parse(&prefixed_text);
        prop_assert_eq!(bare, prefixed);
    }
}

// ============================================================================
// Update audience
// ============================================================================

/// One relationship request between two of the fixture users.
#[derive(Debug, Clone, Copy)]
enum Op {
    Connect(usize, usize),
    Subscribe(usize, usize),
    Block(usize, usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    (0..3u8, 0..USERS, 0..USERS).prop_map(|(kind, a, b)| match kind {
        0 => Op::Connect(a, b),
        1 => Op::Subscribe(a, b),
        _ => Op::Block(a, b),
    })
}

/// Relationships that were actually recorded.
#[derive(Default)]
struct Model {
    friends: BTreeSet<(usize, usize)>,
    subscriptions: BTreeSet<(usize, usize)>,
    blocks: BTreeSet<(usize, usize)>,
}

impl Model {
    fn audience(&self, sender: usize) -> Vec<String> {
        (0..USERS)
            .filter(|&u| u != sender)
            .filter(|&u| !self.blocks.contains(&(u, sender)))
            .filter(|&u| {
                self.friends.contains(&(u.min(sender), u.max(sender)))
                    || self.subscriptions.contains(&(u, sender))
            })
            .map(email)
            .collect()
    }
}

fn apply(graph: &FriendGraph, ops: &[Op]) -> Model {
    let mut model = Model::default();
    for op in ops {
        match *op {
            Op::Connect(a, b) => {
                if graph.connect(&email(a), &email(b)).is_ok() {
                    model.friends.insert((a.min(b), a.max(b)));
                }
            }
            Op::Subscribe(a, b) => {
                if graph.subscribe(&email(a), &email(b)).is_ok() {
                    model.subscriptions.insert((a, b));
                }
            }
            Op::Block(a, b) => {
                if graph.block(&email(a), &email(b)).is_ok() {
                    model.blocks.insert((a, b));
                }
            }
        }
    }
    model
}

fn fixture_graph() -> FriendGraph {
    let graph = FriendGraph::in_memory().expect("in-memory graph");
    // Created in index order so ascending IDs follow ascending indexes.
    for index in 0..USERS {
        graph.store().create_user(&email(index)).expect("create user");
    }
    graph
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: without mentions, the audience is exactly the non-blocking
    /// friends and subscribers of the sender, ascending by ID.
    #[test]
    fn audience_matches_model(
        ops in prop::collection::vec(op_strategy(), 0..40),
        sender in 0..USERS,
    ) {
        let graph = fixture_graph();
        let model = apply(&graph, &ops);

        let recipients = graph.update(&email(sender), "no mentions here").unwrap();
        prop_assert_eq!(recipients, model.audience(sender));
    }

    /// Property: no friendship ever exists alongside a block that predates it.
    #[test]
    fn blocked_pairs_never_become_friends(
        ops in prop::collection::vec(op_strategy(), 0..40),
    ) {
        let graph = fixture_graph();
        let mut blocked: BTreeSet<(usize, usize)> = BTreeSet::new();

        for op in ops {
            match op {
                Op::Block(a, b) => {
                    if graph.block(&email(a), &email(b)).is_ok() {
                        blocked.insert((a.min(b), a.max(b)));
                    }
                }
                Op::Connect(a, b) => {
                    let result = graph.connect(&email(a), &email(b));
                    if blocked.contains(&(a.min(b), a.max(b))) {
                        prop_assert!(result.is_err());
                    }
                }
                Op::Subscribe(a, b) => {
                    let _ = graph.subscribe(&email(a), &email(b));
                }
            }
        }
    }

    /// Property: mentioned addresses are always delivered, exactly once,
    /// even when they block the sender.
    #[test]
    fn mentions_always_delivered_once(
        ops in prop::collection::vec(op_strategy(), 0..40),
        sender in 0..USERS,
        mentioned in prop::collection::vec(0..USERS, 1..4),
    ) {
        let graph = fixture_graph();
        apply(&graph, &ops);

        let text = mentioned
            .iter()
            .map(|&m| format!("@{}", email(m)))
            .collect::<Vec<_>>()
            .join(" ");
        let recipients = graph.update(&email(sender), &text).unwrap();

        for &m in &mentioned {
            let address = email(m);
            prop_assert_eq!(recipients.iter().filter(|r| **r == address).count(), 1);
        }
        let unique: BTreeSet<&String> = recipients.iter().collect();
        prop_assert_eq!(unique.len(), recipients.len());
    }
}
