//! Traits describing advisory-insight backends and their configuration.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Error as ReqwestError;
use serde_json::Error as JsonError;

use crate::model::{DistrictStats, Insight};

/// Default model asked for insights.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
/// Default base URL of the generative language API.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default upper bound for a single advisory call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to an advisory backend.
pub enum AdvisoryError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Backend answered with a non-success HTTP status.
    #[error("Advisor answered with HTTP status {0}")]
    Status(u16),
    /// Payload could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] JsonError),
    /// Backend answered, but not with the expected insight structure.
    #[error("Malformed response: {0}")]
    Malformed(String),
    /// Backend did not answer in time.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
    /// No API key was configured.
    #[error("API key missing")]
    MissingApiKey,
}

#[derive(Debug, Clone)]
/// Settings for an advisory backend, injected by the caller.
pub struct AdvisoryConfig {
    /// Secret key; advisory calls are skipped without it.
    pub api_key: Option<String>,
    /// Model name.
    pub model: String,
    /// Base URL of the API.
    pub endpoint: String,
    /// Upper bound for a single call.
    pub timeout: Duration,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_owned(),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl AdvisoryConfig {
    /// Replace the API key.
    #[must_use]
    pub fn with_api_key<S: Into<String>>(mut self, api_key: Option<S>) -> Self {
        self.api_key = api_key.map(Into::into);
        self
    }

    /// Non-blank API key, if any.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Whether an advisory backend can be called at all.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }
}

#[async_trait]
/// Backend that turns district statistics into categorized insights.
pub trait InsightPort: Send + Sync {
    /// Short backend name used in logs.
    fn name(&self) -> &str;

    /// Ask the backend for insights about the given districts.
    ///
    /// # Errors
    ///
    /// Returns an [`AdvisoryError`] when the call fails or the answer cannot be parsed.
    async fn insights(&self, districts: &[DistrictStats]) -> Result<Vec<Insight>, AdvisoryError>;
}
