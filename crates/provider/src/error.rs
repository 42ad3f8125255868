//! Provider error types.

use ensemble_common::ModelId;
use thiserror::Error;

/// Errors from a data provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No data exists for this model/region/time combination.
    #[error("no data for {model} in the requested region/time range: {detail}")]
    NotFound { model: ModelId, detail: String },

    /// Transport-level failure reaching the backend.
    #[error("network error fetching {model}: {detail}")]
    Network { model: ModelId, detail: String },

    /// The backend rejected the request for quota reasons.
    #[error("provider quota exceeded: {0}")]
    Quota(String),

    /// The backend rejected our credentials.
    #[error("provider authentication failed: {0}")]
    Auth(String),
}

impl ProviderError {
    pub fn not_found(model: &ModelId, detail: impl Into<String>) -> Self {
        Self::NotFound {
            model: model.clone(),
            detail: detail.into(),
        }
    }

    pub fn network(model: &ModelId, detail: impl Into<String>) -> Self {
        Self::Network {
            model: model.clone(),
            detail: detail.into(),
        }
    }

    /// True when the failure means "this data does not exist" rather than
    /// "the backend misbehaved".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
