//! AWS provider error types

use thiserror::Error;
use wafflow_cloud::{ApiError, CloudError};

/// WAFv2 error codes this crate inspects
pub mod codes {
    pub const WAF_INTERNAL_ERROR: &str = "WAFInternalErrorException";
    pub const WAF_TAG_OPERATION: &str = "WAFTagOperationException";
    pub const WAF_TAG_OPERATION_INTERNAL_ERROR: &str = "WAFTagOperationInternalErrorException";
    pub const WAF_OPTIMISTIC_LOCK: &str = "WAFOptimisticLockException";
    pub const WAF_NONEXISTENT_ITEM: &str = "WAFNonexistentItemException";
    pub const WAF_DUPLICATE_ITEM: &str = "WAFDuplicateItemException";
    pub const WAF_INVALID_PARAMETER: &str = "WAFInvalidParameterException";
}

#[derive(Error, Debug)]
pub enum AwsError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("failed to build request: {0}")]
    Build(#[from] aws_sdk_wafv2::error::BuildError),

    #[error("response is missing {0}")]
    MissingField(&'static str),
}

impl AwsError {
    /// The remote error behind this error, if any
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            AwsError::Api(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_code(&self, code: &str) -> bool {
        self.api_error().is_some_and(|e| e.is_code(code))
    }

    /// Whether the remote reported that the entity does not exist
    pub fn is_not_found(&self) -> bool {
        self.is_code(codes::WAF_NONEXISTENT_ITEM)
    }

    /// Convert into a lifecycle error, describing the failed operation
    pub fn into_cloud(self, context: impl Into<String>) -> CloudError {
        match self {
            AwsError::Api(source) => CloudError::api(context, source),
            other => CloudError::Provider {
                context: context.into(),
                reason: other.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, AwsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        let err = AwsError::Api(ApiError::new(codes::WAF_NONEXISTENT_ITEM, "gone"));
        assert!(err.is_not_found());
        assert!(!AwsError::MissingField("LockToken").is_not_found());
    }

    #[test]
    fn test_into_cloud_keeps_api_error() {
        let err = AwsError::Api(ApiError::new(codes::WAF_OPTIMISTIC_LOCK, "stale token"))
            .into_cloud("error updating WAFv2 regex pattern set");

        assert_eq!(
            err.api_error().map(|e| e.code.as_str()),
            Some(codes::WAF_OPTIMISTIC_LOCK)
        );

        let err = AwsError::MissingField("LockToken").into_cloud("error getting lock token");
        assert_eq!(
            err.to_string(),
            "error getting lock token: response is missing LockToken"
        );
    }
}
