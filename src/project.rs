//! Wire contracts: generation request/response and the project snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::{EditLedger, StyleEdit};

/// Request sent to the text-generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model: String,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
        }
    }
}

/// A successful generation. `code` is an opaque HTML document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub success: bool,
    pub code: String,
    pub prompt: String,
}

/// A failed generation as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("generation failed: {error}")]
pub struct GenerationError {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl GenerationError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GenerationBody {
    Success(GenerationResponse),
    Failure(GenerationError),
}

/// Decode a service reply body into a response or an error. A body that
/// claims `success: false` or fails to parse is an error too.
pub fn parse_generation(body: &str) -> Result<GenerationResponse, GenerationError> {
    match serde_json::from_str::<GenerationBody>(body) {
        Ok(GenerationBody::Success(response)) if response.success => Ok(response),
        Ok(GenerationBody::Success(_)) => Err(GenerationError::new("service reported failure")),
        Ok(GenerationBody::Failure(error)) => Err(error),
        Err(err) => Err(GenerationError::new("malformed generation response").with_details(err.to_string())),
    }
}

/// A saved project. `edits` is exactly the ledger contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub id: String,
    pub prompt: String,
    pub code: String,
    /// Unix milliseconds.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edits: Option<Vec<StyleEdit>>,
}

impl ProjectSnapshot {
    pub fn new(id: impl Into<String>, prompt: impl Into<String>, code: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            code: code.into(),
            timestamp: at.timestamp_millis(),
            thumbnail: None,
            edits: None,
        }
    }

    /// Attach the ledger. An empty ledger is stored as absent.
    pub fn with_ledger(mut self, ledger: &EditLedger) -> Self {
        self.edits = (!ledger.is_empty()).then(|| ledger.entries().to_vec());
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    /// The ledger this snapshot carries, possibly empty.
    pub fn ledger(&self) -> EditLedger {
        EditLedger::from_entries(self.id.clone(), self.edits.clone().unwrap_or_default())
    }
}
