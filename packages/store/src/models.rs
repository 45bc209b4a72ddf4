//! # Domain models for subscriptions and the signed-in user
//!
//! Defines the data structures persisted by [`crate::LocalStore`] and exchanged
//! with the sync server. These types are `Serialize + Deserialize` with
//! camelCase wire names so the same JSON shape works for local slots, the
//! portable export document, and the `/sync` endpoints.
//!
//! ## Types
//!
//! | Struct | Represents |
//! |--------|-----------|
//! | [`Subscription`] | One recurring cost. Carries the product and project labels, an optional expiry date (absence means "does not expire"), the cost with its currency code, the billing period, the renewal mode, and a free-form description. Records have no identifier beyond their position in the collection. |
//! | [`Session`] | The signed-in user's profile plus bearer token. Held only while logged in, replaced wholesale, never patched field by field. |
//!
//! ## Enums
//!
//! - [`BillingPeriod`] — how often the subscription bills (`monthly`,
//!   `quarterly`, `yearly` on the wire).
//! - [`RenewalMode`] — whether the subscription renews by itself (`auto`,
//!   `manual`, `cancelled` on the wire).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single tracked subscription.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Name of the subscribed product or service: "JetBrains All Products"
    pub product: String,
    /// Project or context the subscription belongs to: "side-project"
    pub project: String,
    /// Expiry date, or None for subscriptions that never expire
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_date: Option<NaiveDate>,
    /// Cost per billing period
    pub cost: f64,
    /// ISO-like currency code: "USD", "EUR", "CNY"
    pub currency: String,
    /// Billing interval
    pub period: BillingPeriod,
    /// How the subscription renews
    pub renewal_mode: RenewalMode,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Billing interval of a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriod {
    Monthly,
    Quarterly,
    Yearly,
}

/// Renewal behaviour of a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenewalMode {
    Auto,
    Manual,
    Cancelled,
}

/// The signed-in user's profile and bearer credential.
///
/// Presence of a stored `Session` is the sole signal of "authenticated".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub email: String,
    pub username: String,
    /// Opaque bearer token, sent as `Authorization: Bearer <token>`.
    pub token: String,
    pub created_at: DateTime<Utc>,
    /// When the collection was last pushed to or pulled from the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
}

impl Session {
    /// Display name for the UI, falling back to the email address.
    pub fn display_name(&self) -> &str {
        if self.username.is_empty() {
            &self.email
        } else {
            &self.username
        }
    }
}
