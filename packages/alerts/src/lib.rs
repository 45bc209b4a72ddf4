//! # Alerts crate — expiry scanning and notification for subwatch
//!
//! Periodically classifies the local collection against the current time and
//! raises human-readable alerts for subscriptions that are expiring soon or
//! already expired.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`classify`] | Pure classification: days-to-expiry arithmetic and the [`ScanReport`] split into expiring-soon / expired |
//! | [`notify`] | [`Notifier`] with the [`AlertSink`] capability gate; at most two aggregate alerts per scan |
//! | [`scheduler`] | [`scan_once`] plus the interval-driven watcher task |
//!
//! Scans only read the store and keep no state between runs; repeat alerts
//! for the same record are not suppressed here.

pub mod classify;
pub mod notify;
pub mod scheduler;

pub use classify::{classify, days_to_expiry, ScanReport, EXPIRING_WINDOW_DAYS};
pub use notify::{AlertSink, LogSink, Notifier};
pub use scheduler::{scan_once, spawn_expiry_watcher};
