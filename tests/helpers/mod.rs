//! Reusable test helpers for graph integration tests.
//!
//! Every test gets its own data directory so file-backed graphs never
//! share state.

#![allow(dead_code)]

use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use friendnet_core::graph::FriendGraph;

/// Atomic counter for unique test directory names.
static HELPER_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Creates a unique temporary directory path for test isolation.
///
/// Each call produces a distinct path by combining the prefix, process ID,
/// and an atomic counter. The directory itself is not created.
pub fn unique_temp_dir(prefix: &str) -> PathBuf {
    let id = HELPER_COUNTER.fetch_add(1, Ordering::SeqCst);
    env::temp_dir().join(format!(
        "friendnet_test_{}_{}_{}",
        prefix,
        std::process::id(),
        id
    ))
}

/// Removes a temporary test directory. Ignores errors silently.
pub fn cleanup_dir(dir: &PathBuf) {
    let _ = std::fs::remove_dir_all(dir);
}

/// Connects `center` to every address in `friends`.
pub fn connect_all(graph: &FriendGraph, center: &str, friends: &[&str]) {
    for friend in friends {
        graph
            .connect(center, friend)
            .expect("should connect friends");
    }
}

/// Asserts that `emails` contains no address twice.
pub fn assert_unique(emails: &[String]) {
    let mut sorted = emails.to_vec();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), emails.len(), "duplicate address in {emails:?}");
}
