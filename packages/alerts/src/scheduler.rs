//! Interval-driven expiry scanning.
//!
//! The watcher task scans once immediately at start-up and then on a fixed
//! period (3600s by default, from `subwatch.toml`). Each run is independent:
//! it reads whatever the store holds at that moment, classifies it against
//! the current time, and hands the report to the notifier. The watcher only
//! reads the store, so it runs safely alongside an in-flight sync.

use std::time::Duration;

use chrono::{DateTime, Utc};
use store::{KvStore, LocalStore};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::classify::{classify, ScanReport};
use crate::notify::{AlertSink, Notifier};

/// Run a single scan over the stored collection and raise the alerts.
pub fn scan_once<S, A>(
    store: &LocalStore<S>,
    notifier: &Notifier<A>,
    now: DateTime<Utc>,
) -> ScanReport
where
    S: KvStore,
    A: AlertSink,
{
    let subscriptions = store.load_subscriptions();
    let report = classify(&subscriptions, now);
    tracing::debug!(
        scanned = subscriptions.len(),
        expiring_soon = report.expiring_soon.len(),
        expired = report.expired.len(),
        "expiry scan complete"
    );
    notifier.summarize(&report);
    report
}

/// Spawn the periodic expiry watcher. The first scan runs immediately.
///
/// Returns the task handle and a channel carrying each scan's report, for
/// hosts that render classification results in addition to the alerts.
pub fn spawn_expiry_watcher<S, A>(
    store: LocalStore<S>,
    notifier: Notifier<A>,
    interval: Duration,
) -> (JoinHandle<()>, watch::Receiver<ScanReport>)
where
    S: KvStore + Send + Sync + 'static,
    A: AlertSink + Send + Sync + 'static,
{
    let (reports, subscription) = watch::channel(ScanReport::default());
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let report = scan_once(&store, &notifier, Utc::now());
            let _ = reports.send(report);
        }
    });
    (handle, subscription)
}
