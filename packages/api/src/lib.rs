//! # API crate — remote synchronization for subwatch
//!
//! This crate connects the local subscription store to a remote account. It
//! has two layers:
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`client`] | The wire protocol: a [`SyncTransport`] trait for the four server operations (register, login, push, pull) and [`HttpClient`], the reqwest implementation |
//! | [`sync`] | [`SyncController`]: the session state machine that decides *when* to sync — pull on login, debounced background push on every local save, clear on logout |
//! | [`error`] | [`SyncError`]: the auth/network/not-authenticated taxonomy shared by both layers |
//!
//! Sync is whole-collection replace in both directions: a push overwrites the
//! server's copy with the local one, a pull overwrites the local copy with
//! the server's. There is no merge.

pub mod client;
pub mod error;
pub mod sync;

pub use client::{HttpClient, SyncTransport};
pub use error::SyncError;
pub use sync::SyncController;
