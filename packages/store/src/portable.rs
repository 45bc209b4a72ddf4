//! # Portable import/export of the collection
//!
//! The export document is the bare JSON array of subscription records — no
//! envelope, no metadata — so an exported file can be re-imported verbatim or
//! hand-edited. Import validates the document before anything is persisted:
//! a rejected import must leave the previously stored collection untouched,
//! which these functions guarantee by being pure over strings. File dialogs
//! and host file access stay with the caller.

use chrono::Utc;
use serde_json::Value;
use thiserror::Error;

use crate::models::Subscription;

/// Why an import did not take effect.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The document is not well-formed JSON.
    #[error("invalid JSON: {0}")]
    Parse(#[source] serde_json::Error),
    /// The document parsed, but is not an array of subscription records.
    #[error("invalid subscription document: {0}")]
    Validation(String),
    /// The document was valid but the local store refused the write.
    #[error("could not persist the imported subscriptions")]
    Persistence,
}

/// Serialize the collection to the portable export document.
pub fn export_json(subscriptions: &[Subscription]) -> String {
    // Pretty-printed so exported files are diffable and hand-editable.
    serde_json::to_string_pretty(subscriptions).unwrap_or_else(|_| "[]".to_string())
}

/// Default file name for an export: `subscriptions_YYYY-MM-DD.json`.
pub fn export_file_name() -> String {
    format!("subscriptions_{}.json", Utc::now().format("%Y-%m-%d"))
}

/// Parse and validate a portable document into a collection.
///
/// Nothing is persisted here; callers save the returned records only on
/// success, so a rejected import cannot disturb existing data.
pub fn import_json(document: &str) -> Result<Vec<Subscription>, ImportError> {
    let value: Value = serde_json::from_str(document).map_err(ImportError::Parse)?;
    if !value.is_array() {
        return Err(ImportError::Validation(
            "expected an array of subscription records".to_string(),
        ));
    }
    serde_json::from_value(value).map_err(|err| ImportError::Validation(err.to_string()))
}
