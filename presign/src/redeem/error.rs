//! Error types for presigned URL redemption

use thiserror::Error;

use crate::issuer::Verb;

/// Result type for redemption
pub type RedeemResult<T> = Result<T, RedeemError>;

/// Errors that can occur while redeeming a presigned URL
#[derive(Error, Debug)]
pub enum RedeemError {
    /// The storage service answered with a non-2xx status
    #[error("{verb} failed: {status}")]
    UnexpectedStatus {
        /// Verb that was attempted
        verb: Verb,
        /// HTTP status code returned by the storage service
        status: u16,
    },

    /// The request never produced a response
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A signed header could not be sent
    #[error("Invalid signed header: {0}")]
    InvalidHeader(String),
}

impl RedeemError {
    /// HTTP status carried by the error, if the service answered
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::Transport(_) | Self::InvalidHeader(_) => None,
        }
    }
}
