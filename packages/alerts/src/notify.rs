//! Alert delivery behind a host capability gate.
//!
//! Host notification facilities (desktop toasts, system trays) are injected
//! through [`AlertSink`], so a headless process or a test can substitute its
//! own sink. Delivery is gated on the host's alerting permission; without it
//! every alert is a silent no-op.

use crate::classify::{ScanReport, EXPIRING_WINDOW_DAYS};

/// Capability interface to the host's notification facility.
pub trait AlertSink {
    /// Whether the host has granted alerting permission.
    fn permission_granted(&self) -> bool;
    /// Deliver one alert. Only called when permission is granted.
    fn deliver(&self, title: &str, body: &str);
}

/// Delivers aggregate expiry alerts through an [`AlertSink`].
#[derive(Clone, Debug)]
pub struct Notifier<A: AlertSink> {
    sink: A,
}

impl<A: AlertSink> Notifier<A> {
    pub fn new(sink: A) -> Self {
        Self { sink }
    }

    /// Deliver a single alert, or silently do nothing without permission.
    pub fn notify(&self, title: &str, body: &str) {
        if self.sink.permission_granted() {
            self.sink.deliver(title, body);
        }
    }

    /// Raise at most two aggregate alerts for a scan: one naming the
    /// expiring-soon count and one naming the expired count. Never one alert
    /// per record.
    pub fn summarize(&self, report: &ScanReport) {
        let expiring = report.expiring_soon.len();
        if expiring > 0 {
            self.notify(
                "Subscriptions expiring soon",
                &format!(
                    "{expiring} subscription(s) expire within the next {EXPIRING_WINDOW_DAYS} days."
                ),
            );
        }
        let expired = report.expired.len();
        if expired > 0 {
            self.notify(
                "Subscriptions expired",
                &format!("{expired} subscription(s) have expired."),
            );
        }
    }
}

/// Sink that writes alerts to the log. Always permitted; the headless
/// default when no host notification facility is wired up.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl AlertSink for LogSink {
    fn permission_granted(&self) -> bool {
        true
    }

    fn deliver(&self, title: &str, body: &str) {
        tracing::info!(title, body, "subscription alert");
    }
}
