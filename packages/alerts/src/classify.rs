//! Pure expiry classification over a collection snapshot.
//!
//! Nothing here is cached or persisted: every scan recomputes the report
//! from the collection and the supplied "now", so the same inputs always
//! produce the same [`ScanReport`].

use chrono::{DateTime, NaiveDate, Utc};
use store::Subscription;

/// A subscription counts as "expiring soon" up to this many days ahead.
pub const EXPIRING_WINDOW_DAYS: i64 = 7;

const SECS_PER_DAY: i64 = 86_400;

/// Result of one scan over the collection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScanReport {
    /// Expires within the next [`EXPIRING_WINDOW_DAYS`] days (exclusive of today).
    pub expiring_soon: Vec<Subscription>,
    /// Expiry date is today or in the past.
    pub expired: Vec<Subscription>,
}

impl ScanReport {
    pub fn is_empty(&self) -> bool {
        self.expiring_soon.is_empty() && self.expired.is_empty()
    }
}

/// Whole days until `expire` (at midnight UTC), rounded up.
///
/// Zero or negative means the expiry moment has passed.
pub fn days_to_expiry(expire: NaiveDate, now: DateTime<Utc>) -> i64 {
    let expire_at = expire.and_time(chrono::NaiveTime::MIN).and_utc();
    let secs = (expire_at - now).num_seconds();
    secs.div_euclid(SECS_PER_DAY) + (secs.rem_euclid(SECS_PER_DAY) > 0) as i64
}

/// Classify each record with an expiry date as expiring-soon, expired, or
/// neither. Records without an expiry date are never classified.
pub fn classify(subscriptions: &[Subscription], now: DateTime<Utc>) -> ScanReport {
    let mut report = ScanReport::default();
    for sub in subscriptions {
        let Some(expire) = sub.expire_date else {
            continue;
        };
        let days = days_to_expiry(expire, now);
        if days <= 0 {
            report.expired.push(sub.clone());
        } else if days <= EXPIRING_WINDOW_DAYS {
            report.expiring_soon.push(sub.clone());
        }
    }
    report
}
