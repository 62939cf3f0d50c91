use std::{collections::BTreeMap, sync::Arc};

use axum::{Extension, Json};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::{
    issuer::{IssuerError, PresignedAccessIssuer, PresignedUrl, UploadOptions, Verb},
    middleware::AuthenticatedCaller,
    object_key::ObjectKey,
    types::{AppError, ValidatedJson},
};

/// Tag and content type travel as signed request headers
fn validate_header_value(value: &str) -> Result<(), validator::ValidationError> {
    match http::HeaderValue::from_str(value) {
        Ok(header) if header.to_str().is_ok() => Ok(()),
        _ => Err(validator::ValidationError::new("invalid_header_value")),
    }
}

/// Request for a presigned upload URL
#[derive(Debug, Deserialize, Serialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct UploadUrlRequest {
    /// Object key, `{ownerId}/{fileName}`
    #[validate(length(min = 3, max = 1024))]
    pub key: String,
    /// Tag recorded in the object's metadata
    #[validate(length(min = 1, max = 256), custom(function = "validate_header_value"))]
    pub tag: String,
    /// Content type the upload will be sent with, `text/plain` if omitted
    #[validate(length(min = 1, max = 255), custom(function = "validate_header_value"))]
    pub content_type: Option<String>,
}

/// Request for a presigned delete URL
#[derive(Debug, Deserialize, Serialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct DeleteUrlRequest {
    /// Object key, `{ownerId}/{fileName}`
    #[validate(length(min = 3, max = 1024))]
    pub key: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PresignedUrlResponse {
    /// HTTP verb the URL must be redeemed with
    pub verb: Verb,
    /// Presigned URL
    pub url: String,
    /// Headers that must be sent unchanged with the request
    pub signed_headers: BTreeMap<String, String>,
    /// ISO-8601 UTC timestamp when the presigned URL expires
    pub expires_at: String,
}

impl From<PresignedUrl> for PresignedUrlResponse {
    fn from(presigned: PresignedUrl) -> Self {
        Self {
            verb: presigned.verb,
            url: presigned.url,
            signed_headers: presigned.signed_headers,
            expires_at: presigned.expires_at.to_rfc3339(),
        }
    }
}

/// Creates a presigned URL for uploading an object
///
/// The caller id is recorded as the object's `userId` metadata and the caller
/// must be authorized for the key.
///
/// # Errors
///
/// - `400 BAD_REQUEST` - Malformed body or object key
/// - `401 UNAUTHORIZED` - Missing bearer token
/// - `403 FORBIDDEN` - Caller may not write the key
/// - `500 INTERNAL_SERVER_ERROR` - Signing failed
#[instrument(skip(issuer, payload))]
pub async fn create_upload_url(
    caller: AuthenticatedCaller,
    Extension(issuer): Extension<Arc<PresignedAccessIssuer>>,
    ValidatedJson(payload): ValidatedJson<UploadUrlRequest>,
) -> Result<Json<PresignedUrlResponse>, AppError> {
    let key: ObjectKey = payload.key.parse().map_err(IssuerError::from)?;

    let mut options = UploadOptions::new(caller.caller_id.as_str(), payload.tag);
    if let Some(content_type) = payload.content_type {
        options = options.with_content_type(content_type);
    }

    let presigned_url = issuer
        .issue_put_token(&caller.caller_id, &key, &options)
        .await?;

    tracing::info!("Issued upload URL for {key}");

    Ok(Json(presigned_url.into()))
}

/// Creates a presigned URL for deleting an object
///
/// # Errors
///
/// - `400 BAD_REQUEST` - Malformed body or object key
/// - `401 UNAUTHORIZED` - Missing bearer token
/// - `403 FORBIDDEN` - Caller may not delete the key
/// - `500 INTERNAL_SERVER_ERROR` - Signing failed
#[instrument(skip(issuer, payload))]
pub async fn create_delete_url(
    caller: AuthenticatedCaller,
    Extension(issuer): Extension<Arc<PresignedAccessIssuer>>,
    ValidatedJson(payload): ValidatedJson<DeleteUrlRequest>,
) -> Result<Json<PresignedUrlResponse>, AppError> {
    let key: ObjectKey = payload.key.parse().map_err(IssuerError::from)?;

    let presigned_url = issuer.issue_delete_token(&caller.caller_id, &key).await?;

    tracing::info!("Issued delete URL for {key}");

    Ok(Json(presigned_url.into()))
}
