use std::collections::{BTreeMap, HashMap};

use aws_sdk_s3::presigning::PresignedRequest;
use chrono::{DateTime, Utc};
use http::Method;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// Metadata name carrying the uploading owner's id
pub const OWNER_METADATA_KEY: &str = "userId";

/// Metadata name carrying the caller-supplied tag
pub const TAG_METADATA_KEY: &str = "tag";

/// HTTP verb a presigned URL is bound to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display, AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Verb {
    /// Create or overwrite the object
    Put,
    /// Remove the object
    Delete,
}

impl Verb {
    /// HTTP method used to redeem a URL bound to this verb
    #[must_use]
    pub const fn method(self) -> Method {
        match self {
            Self::Put => Method::PUT,
            Self::Delete => Method::DELETE,
        }
    }
}

/// Presigned URL with expiration information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignedUrl {
    /// Verb the signature is bound to
    pub verb: Verb,
    /// The presigned URL
    pub url: String,
    /// Headers covered by the signature; they must be sent as-is on redemption
    pub signed_headers: BTreeMap<String, String>,
    /// UTC timestamp when the URL expires
    pub expires_at: DateTime<Utc>,
}

impl PresignedUrl {
    pub(crate) fn from_presigned(
        verb: Verb,
        request: &PresignedRequest,
        expires_at: DateTime<Utc>,
    ) -> Self {
        // Host comes from the URL and the length from the body sent on redemption
        let signed_headers = request
            .headers()
            .filter(|(name, _)| {
                !name.eq_ignore_ascii_case("host") && !name.eq_ignore_ascii_case("content-length")
            })
            .map(|(name, value)| (name.to_ascii_lowercase(), value.to_string()))
            .collect();

        Self {
            verb,
            url: request.uri().to_string(),
            signed_headers,
            expires_at,
        }
    }
}

/// Caller-supplied parameters bound into a presigned PUT
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    /// Owner recorded in the object's metadata
    pub owner_id: String,
    /// Free-form tag recorded in the object's metadata
    pub tag: String,
    /// `Content-Type` the upload must be sent with
    pub content_type: String,
}

impl UploadOptions {
    /// Options with the default `text/plain` content type
    pub fn new(owner_id: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            tag: tag.into(),
            content_type: "text/plain".to_string(),
        }
    }

    /// Overrides the content type
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// User metadata attached to the uploaded object
    #[must_use]
    pub fn metadata(&self) -> HashMap<String, String> {
        HashMap::from([
            (OWNER_METADATA_KEY.to_string(), self.owner_id.clone()),
            (TAG_METADATA_KEY.to_string(), self.tag.clone()),
        ])
    }
}

/// Restores the casing of metadata names this crate attaches.
///
/// S3 stores metadata names lower-cased, so `userId` comes back as `userid`.
pub(crate) fn canonical_metadata(metadata: HashMap<String, String>) -> HashMap<String, String> {
    metadata
        .into_iter()
        .map(|(name, value)| {
            let name = [OWNER_METADATA_KEY, TAG_METADATA_KEY]
                .into_iter()
                .find(|known| known.eq_ignore_ascii_case(&name))
                .map_or(name, ToString::to_string);
            (name, value)
        })
        .collect()
}
