//! Provider error types

use thiserror::Error;

/// Coarse classification used by callers to decide whether an error is
/// actionable by the user or a recoverable upstream failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Transport,
    Malformed,
    Storage,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider '{0}' not found in registry")]
    ProviderNotFound(String),

    #[error("Provider '{0}' is disabled")]
    ProviderDisabled(String),

    #[error("Provider '{0}' requires a secret key but none is configured")]
    MissingSecretKey(String),

    #[error("Invalid provider configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid search query: {0}")]
    InvalidQuery(String),

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Provider '{provider}' returned HTTP status {status}")]
    HttpStatus { provider: String, status: u16 },

    #[error("Provider '{provider}' timed out after {timeout_ms}ms")]
    Timeout { provider: String, timeout_ms: u64 },

    #[error("Malformed response from '{provider}': {reason}")]
    MalformedResponse { provider: String, reason: String },

    #[error("Failed to load provider configuration: {0}")]
    ConfigLoadError(String),

    #[error("Failed to save provider configuration: {0}")]
    ConfigSaveError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl ProviderError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ProviderError::ProviderNotFound(_)
            | ProviderError::ProviderDisabled(_)
            | ProviderError::MissingSecretKey(_)
            | ProviderError::InvalidConfig(_)
            | ProviderError::InvalidQuery(_) => ErrorCategory::Configuration,
            ProviderError::Transport { .. }
            | ProviderError::HttpStatus { .. }
            | ProviderError::Timeout { .. } => ErrorCategory::Transport,
            ProviderError::MalformedResponse { .. } | ProviderError::SerdeError(_) => {
                ErrorCategory::Malformed
            }
            ProviderError::ConfigLoadError(_)
            | ProviderError::ConfigSaveError(_)
            | ProviderError::IoError(_) => ErrorCategory::Storage,
        }
    }

    /// Configuration errors are raised to the caller before any network call;
    /// everything else degrades to an empty result.
    pub fn is_configuration(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    pub(crate) fn malformed(provider: &str, reason: impl Into<String>) -> Self {
        ProviderError::MalformedResponse {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
