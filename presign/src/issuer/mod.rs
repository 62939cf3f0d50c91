//! S3 presigned URL issuance and metadata lookup
mod error;
mod types;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use aws_sdk_s3::{
    error::{DisplayErrorContext, SdkError},
    operation::head_object::HeadObjectError,
    presigning::PresigningConfig,
    Client as S3Client,
};
use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

pub use error::{IssuerError, IssuerResult};
pub use types::{PresignedUrl, UploadOptions, Verb, OWNER_METADATA_KEY, TAG_METADATA_KEY};

use crate::{
    authorization::{AuthorizationDecision, Authorizer},
    object_key::ObjectKey,
};

/// Issues single-verb presigned URLs for objects in one bucket
///
/// The S3 client is shared read-only for the process lifetime; the signature
/// itself is produced by the SDK and validated by the storage service, so the
/// expiry window is the only access control once a URL is handed out.
pub struct PresignedAccessIssuer {
    s3_client: Arc<S3Client>,
    bucket_name: String,
    presigned_url_expiry_secs: u64,
    authorizer: Arc<dyn Authorizer>,
}

impl PresignedAccessIssuer {
    /// Creates a new issuer
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - Bucket every issued URL points into
    /// * `presigned_url_expiry_secs` - Validity window of issued URLs in seconds
    /// * `authorizer` - Consulted before every issuance
    #[must_use]
    pub fn new(
        s3_client: Arc<S3Client>,
        bucket_name: String,
        presigned_url_expiry_secs: u64,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        Self {
            s3_client,
            bucket_name,
            presigned_url_expiry_secs,
            authorizer,
        }
    }

    /// Bucket this issuer signs URLs for
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket_name
    }

    /// Validity window of issued URLs in seconds
    #[must_use]
    pub const fn presigned_url_expiry_secs(&self) -> u64 {
        self.presigned_url_expiry_secs
    }

    /// Checks that `caller_id` may act on `key`
    ///
    /// # Errors
    ///
    /// Returns `IssuerError::Unauthorized` if the authorizer denies the request
    pub async fn authorize(&self, caller_id: &str, key: &ObjectKey) -> IssuerResult<()> {
        match self.authorizer.authorize(caller_id, key).await {
            AuthorizationDecision::Allow => Ok(()),
            AuthorizationDecision::Deny => {
                warn!("Denied caller {caller_id} access to {key}");
                Err(IssuerError::Unauthorized {
                    caller_id: caller_id.to_string(),
                    key: key.to_string(),
                })
            }
        }
    }

    /// Generates a presigned URL for uploading `key`
    ///
    /// The content type and the metadata derived from `options` are part of
    /// the signature, so the upload has to carry them unchanged.
    ///
    /// # Errors
    ///
    /// Returns `IssuerError::Unauthorized` if the caller may not write `key`
    /// Returns `IssuerError::ConfigError` if presigning config creation fails
    /// Returns `IssuerError::SigningError` if presigned URL generation fails
    pub async fn issue_put_token(
        &self,
        caller_id: &str,
        key: &ObjectKey,
        options: &UploadOptions,
    ) -> IssuerResult<PresignedUrl> {
        self.authorize(caller_id, key).await?;

        let (presigning_config, expires_at) = self.presigning_config()?;

        let presigned_request = self
            .s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key.as_str())
            .content_type(&options.content_type)
            .set_metadata(Some(options.metadata()))
            .presigned(presigning_config)
            .await
            .map_err(|e| {
                IssuerError::SigningError(format!(
                    "Failed to generate presigned PUT URL: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        debug!("Generated presigned PUT URL for {key} expires at: {expires_at}");

        Ok(PresignedUrl::from_presigned(
            Verb::Put,
            &presigned_request,
            expires_at,
        ))
    }

    /// Generates a presigned URL for deleting `key`
    ///
    /// # Errors
    ///
    /// Returns `IssuerError::Unauthorized` if the caller may not delete `key`
    /// Returns `IssuerError::ConfigError` if presigning config creation fails
    /// Returns `IssuerError::SigningError` if presigned URL generation fails
    pub async fn issue_delete_token(
        &self,
        caller_id: &str,
        key: &ObjectKey,
    ) -> IssuerResult<PresignedUrl> {
        self.authorize(caller_id, key).await?;

        let (presigning_config, expires_at) = self.presigning_config()?;

        let presigned_request = self
            .s3_client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(key.as_str())
            .presigned(presigning_config)
            .await
            .map_err(|e| {
                IssuerError::SigningError(format!(
                    "Failed to generate presigned DELETE URL: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        debug!("Generated presigned DELETE URL for {key} expires at: {expires_at}");

        Ok(PresignedUrl::from_presigned(
            Verb::Delete,
            &presigned_request,
            expires_at,
        ))
    }

    /// Reads the user metadata of `key` without transferring its content
    ///
    /// Uses the issuer's own credentials, not a presigned URL.
    ///
    /// # Errors
    ///
    /// Returns `IssuerError::ObjectNotFound` if the object does not exist
    /// Returns `IssuerError::UpstreamError` for 5xx errors
    /// Returns `IssuerError::S3Error` for other S3 service errors
    pub async fn head_metadata(&self, key: &ObjectKey) -> IssuerResult<HashMap<String, String>> {
        let result = self
            .s3_client
            .head_object()
            .bucket(&self.bucket_name)
            .key(key.as_str())
            .send()
            .await;

        match result {
            Ok(output) => Ok(types::canonical_metadata(
                output.metadata().cloned().unwrap_or_default(),
            )),
            Err(SdkError::ServiceError(service_err))
                if matches!(service_err.err(), HeadObjectError::NotFound(_)) =>
            {
                Err(IssuerError::ObjectNotFound(key.to_string()))
            }
            Err(SdkError::ServiceError(service_err))
                if service_err.raw().status().as_u16() >= 500 =>
            {
                Err(IssuerError::UpstreamError(format!("{service_err:?}")))
            }
            Err(e) => Err(IssuerError::from(e)),
        }
    }

    /// Reads the user metadata of `key`, logging instead of propagating failures
    ///
    /// Returns `None` when the lookup failed for any reason; the failure is not
    /// retried.
    pub async fn fetch_metadata(&self, key: &ObjectKey) -> Option<HashMap<String, String>> {
        match self.head_metadata(key).await {
            Ok(metadata) => {
                debug!(?metadata, "Metadata for {key}");
                Some(metadata)
            }
            Err(e) => {
                error!("Error fetching metadata for {key}: {e}");
                None
            }
        }
    }

    fn presigning_config(&self) -> IssuerResult<(PresigningConfig, DateTime<Utc>)> {
        if self.presigned_url_expiry_secs == 0 {
            return Err(IssuerError::ConfigError(
                "Presigned URL expiry must be positive".to_string(),
            ));
        }

        let expires_in = Duration::from_secs(self.presigned_url_expiry_secs);
        let issued_at = SystemTime::now();

        let presigning_config = PresigningConfig::builder()
            .start_time(issued_at)
            .expires_in(expires_in)
            .build()
            .map_err(|e| {
                IssuerError::ConfigError(format!("Failed to create presigning config: {e}"))
            })?;

        Ok((presigning_config, DateTime::<Utc>::from(issued_at) + expires_in))
    }
}
