use std::sync::Arc;

use aide::axum::IntoApiResponse;
use axum::{Extension, Json};
use schemars::JsonSchema;
use serde::Serialize;

use crate::issuer::PresignedAccessIssuer;

#[derive(Debug, Serialize, JsonSchema)]
pub struct HealthResponse {
    status: &'static str,
    /// Crate version of the running binary
    version: &'static str,
    /// Commit the binary was built from, when `GIT_REV` was set at build time
    rev: Option<&'static str>,
    /// Validity window of issued URLs in seconds
    presigned_url_expiry_secs: u64,
}

/// Liveness probe
///
/// Does not touch S3; reports the build and the issuer's expiry window.
pub async fn handler(
    Extension(issuer): Extension<Arc<PresignedAccessIssuer>>,
) -> impl IntoApiResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        rev: option_env!("GIT_REV"),
        presigned_url_expiry_secs: issuer.presigned_url_expiry_secs(),
    })
}
