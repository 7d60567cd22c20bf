//! Friendnet Core Library
//!
//! Core functionality for Friendnet - a friendship graph with blocks and
//! subscriptions that decides who receives each broadcast update.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![deny(unsafe_code)]

pub mod api;
pub mod config;
pub mod email;
pub mod graph;
pub mod logging;

pub use api::FriendnetApi;
pub use graph::{FriendGraph, GraphError};
