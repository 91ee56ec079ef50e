//! Driftsync: content-addressed one-way synchronization
//!
//! Builds hierarchical models of a remote object store and the local
//! filesystem, detects content changes via SHA-256 digests, and materializes
//! remote trees locally with clone (additive) and pull (overwrite-changed)
//! semantics. A notify-based watcher reports local mutations for upstream
//! propagation.

pub mod config;
pub mod detect;
pub mod digest;
pub mod error;
pub mod hierarchy;
pub mod logging;
pub mod materialize;
pub mod remote;
pub mod session;
pub mod watch;
