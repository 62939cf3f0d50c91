//! Plain HTTP redemption of presigned URLs
mod error;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, info};

pub use error::{RedeemError, RedeemResult};

use crate::issuer::{PresignedUrl, Verb};

/// HTTP client that redeems presigned URLs
///
/// No timeout and no retries: a request runs until the service answers or the
/// connection fails, and any failure is returned to the caller as-is.
#[derive(Debug, Clone, Default)]
pub struct PresignedClient {
    http_client: reqwest::Client,
}

impl PresignedClient {
    /// Creates a client with a fresh connection pool
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a client on top of an existing `reqwest` client
    #[must_use]
    pub const fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    /// Uploads `content` through a presigned PUT URL
    ///
    /// Creates or overwrites the remote object.
    ///
    /// # Errors
    ///
    /// Returns `RedeemError::UnexpectedStatus` with the status code if the
    /// service does not answer 2xx
    /// Returns `RedeemError::Transport` if the request fails to complete
    pub async fn redeem_upload(
        &self,
        presigned: &PresignedUrl,
        content: impl Into<reqwest::Body>,
    ) -> RedeemResult<()> {
        self.send(presigned, Verb::Put, Some(content.into())).await?;
        info!("Upload with metadata successful!");
        Ok(())
    }

    /// Deletes the object behind a presigned DELETE URL
    ///
    /// # Errors
    ///
    /// Returns `RedeemError::UnexpectedStatus` with the status code if the
    /// service does not answer 2xx
    /// Returns `RedeemError::Transport` if the request fails to complete
    pub async fn redeem_delete(&self, presigned: &PresignedUrl) -> RedeemResult<()> {
        self.send(presigned, Verb::Delete, None).await?;
        info!("Delete successful!");
        Ok(())
    }

    async fn send(
        &self,
        presigned: &PresignedUrl,
        verb: Verb,
        body: Option<reqwest::Body>,
    ) -> RedeemResult<()> {
        // The verb is not checked against the URL; a mismatch is rejected by
        // the storage service's signature check.
        let mut request = self
            .http_client
            .request(verb.method(), presigned.url.as_str())
            .headers(signed_headers(presigned)?);

        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            debug!(
                "{verb} redemption rejected with {status}: {}",
                response.text().await.unwrap_or_default()
            );
            return Err(RedeemError::UnexpectedStatus {
                verb,
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

fn signed_headers(presigned: &PresignedUrl) -> RedeemResult<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(presigned.signed_headers.len());

    for (name, value) in &presigned.signed_headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| RedeemError::InvalidHeader(format!("{name}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| RedeemError::InvalidHeader(format!("{name}: {e}")))?;
        headers.insert(name, value);
    }

    Ok(headers)
}
