//! # LocalStore — whole-value persistence for the collection and session
//!
//! This module is the core of subwatch's storage layer. [`LocalStore`] owns the
//! authoritative local copy of the subscription collection and the signed-in
//! user's session, persisted as two JSON-encoded slots in a [`KvStore`]. The
//! same logic works against an in-memory store (tests) or the filesystem
//! (desktop persistence); implementations live in sibling modules
//! ([`crate::memory`], [`crate::file_store`]).
//!
//! ## [`KvStore`] trait
//!
//! A minimal slot interface — `get`/`put` for string values keyed by name,
//! plus `remove`. Only two slots are ever used:
//!
//! | Slot | Constant | Holds |
//! |------|----------|-------|
//! | `subscription-data` | [`COLLECTION_KEY`] | the full ordered collection, as a JSON array |
//! | `user-info` | [`SESSION_KEY`] | the session profile, as a JSON object |
//!
//! ## Recovery semantics
//!
//! A missing slot is a valid initial state. A slot that fails to parse is
//! treated the same way — the corruption is logged and an empty collection
//! (or no session) is returned; callers never see a parse error from a load.
//! `save_*` report persistence failure as `false` rather than an error so a
//! full disk cannot take down the caller's mutation flow.

use crate::models::{Session, Subscription};

/// Slot name for the subscription collection.
pub const COLLECTION_KEY: &str = "subscription-data";
/// Slot name for the signed-in user's session.
pub const SESSION_KEY: &str = "user-info";

/// Trait for storing and retrieving named JSON slots.
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    /// Returns false when the value could not be persisted.
    fn put(&self, key: &str, value: &str) -> bool;
    fn remove(&self, key: &str);
}

/// Whole-value store for the collection and session, backed by a KvStore.
#[derive(Clone, Debug)]
pub struct LocalStore<S: KvStore> {
    store: S,
}

impl<S: KvStore> LocalStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Load the persisted collection.
    ///
    /// Returns an empty collection when the slot is absent or corrupt.
    pub fn load_subscriptions(&self) -> Vec<Subscription> {
        let Some(raw) = self.store.get(COLLECTION_KEY) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(subs) => subs,
            Err(err) => {
                tracing::warn!(%err, "stored subscription data is corrupt, starting empty");
                Vec::new()
            }
        }
    }

    /// Persist the full collection, overwriting any prior value.
    pub fn save_subscriptions(&self, subscriptions: &[Subscription]) -> bool {
        let raw = match serde_json::to_string(subscriptions) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::error!(%err, "failed to encode subscription data");
                return false;
            }
        };
        let ok = self.store.put(COLLECTION_KEY, &raw);
        if !ok {
            tracing::error!("failed to persist subscription data");
        }
        ok
    }

    /// Load the stored session, if any.
    ///
    /// Returns None when the slot is absent or corrupt.
    pub fn load_session(&self) -> Option<Session> {
        let raw = self.store.get(SESSION_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(err) => {
                tracing::warn!(%err, "stored session is corrupt, treating as signed out");
                None
            }
        }
    }

    /// Persist the session, replacing any prior value wholesale.
    pub fn save_session(&self, session: &Session) -> bool {
        let raw = match serde_json::to_string(session) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::error!(%err, "failed to encode session");
                return false;
            }
        };
        let ok = self.store.put(SESSION_KEY, &raw);
        if !ok {
            tracing::error!("failed to persist session");
        }
        ok
    }

    /// Remove the stored session.
    pub fn clear_session(&self) {
        self.store.remove(SESSION_KEY);
    }

    /// Erase both the collection and the session. Used on logout.
    pub fn clear_all(&self) {
        self.store.remove(COLLECTION_KEY);
        self.store.remove(SESSION_KEY);
    }
}
