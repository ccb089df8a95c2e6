//! A single recorded edit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One `(selector, property)` write. `property` is a camelCase key, or one of
/// the sentinels `textContent` and `pageBackground`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleEdit {
    pub selector: String,
    pub property: String,
    pub value: String,
    /// Unix milliseconds.
    pub timestamp: i64,
}

impl StyleEdit {
    pub fn new(
        selector: impl Into<String>,
        property: impl Into<String>,
        value: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            selector: selector.into(),
            property: property.into(),
            value: value.into(),
            timestamp: at.timestamp_millis(),
        }
    }

    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    /// Whether this edit is keyed by the same `(selector, property)` pair.
    pub fn same_target(&self, selector: &str, property: &str) -> bool {
        self.selector == selector && self.property == property
    }
}
