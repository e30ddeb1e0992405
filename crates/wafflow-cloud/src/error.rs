//! Resource lifecycle error types

use thiserror::Error;

/// Error reported by a remote cloud API, identified by its error code.
///
/// This is the transport-neutral shape retry decisions are made on: the SDK
/// layer converts its own error values into this before they reach a
/// resource implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct ApiError {
    /// Remote error code (e.g. `WAFOptimisticLockException`)
    pub code: String,

    /// Human readable message returned with the error
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Whether this error carries the given error code
    pub fn is_code(&self, code: &str) -> bool {
        self.code == code
    }

    /// Whether this error carries the given code and its message contains
    /// `fragment`. An empty fragment matches any message.
    pub fn matches(&self, code: &str, fragment: &str) -> bool {
        self.is_code(code) && (fragment.is_empty() || self.message.contains(fragment))
    }
}

/// Resource lifecycle errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Resource still exists: {0}")]
    ResourceStillExists(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid value for {attribute}: {reason}")]
    Validation { attribute: String, reason: String },

    #[error("unexpected format of ID ({0:?}), expected ID/NAME/SCOPE")]
    InvalidImportId(String),

    #[error("Changing {attribute} requires replacing the resource")]
    RequiresReplacement { attribute: String },

    #[error("{context}: {source}")]
    Api {
        context: String,
        #[source]
        source: ApiError,
    },

    #[error("{context}: {reason}")]
    Provider { context: String, reason: String },

    #[error("State file error: {0}")]
    StateError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    pub fn validation(attribute: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }

    pub fn api(context: impl Into<String>, source: ApiError) -> Self {
        Self::Api {
            context: context.into(),
            source,
        }
    }

    /// The remote error behind this error, if any
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
