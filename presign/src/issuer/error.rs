//! Error types for presigned URL issuance and metadata lookup

use aws_sdk_s3::{
    error::{DisplayErrorContext, SdkError},
    operation::head_object::HeadObjectError,
};
use thiserror::Error;

use crate::object_key::ObjectKeyError;

/// Result type for issuer operations
pub type IssuerResult<T> = Result<T, IssuerError>;

/// Errors that can occur while issuing presigned URLs or reading metadata
#[derive(Error, Debug)]
pub enum IssuerError {
    /// The SDK could not produce a signed URL (e.g. missing credentials)
    #[error("Signing error: {0}")]
    SigningError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The authorizer denied the caller access to the key
    #[error("Caller {caller_id} is not authorized for {key}")]
    Unauthorized {
        /// Identity of the caller
        caller_id: String,
        /// Key the caller asked for
        key: String,
    },

    /// Object does not exist in the bucket
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// Upstream service error (5xx from S3)
    #[error("Upstream service error: {0}")]
    UpstreamError(String),

    /// S3 service error
    #[error("S3 service error: {0}")]
    S3Error(String),

    /// Object key is malformed
    #[error("Invalid object key: {0}")]
    InvalidKey(#[from] ObjectKeyError),
}

/// Fallback for HeadObject failures; not-found and 5xx are mapped where the
/// key is known
impl From<SdkError<HeadObjectError>> for IssuerError {
    fn from(error: SdkError<HeadObjectError>) -> Self {
        match error {
            SdkError::ServiceError(err) => Self::S3Error(format!("{:?}", err.err())),
            _ => Self::S3Error(DisplayErrorContext(&error).to_string()),
        }
    }
}
