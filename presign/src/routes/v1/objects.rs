use std::{collections::BTreeMap, sync::Arc};

use axum::{extract::Query, Extension, Json};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    issuer::{IssuerError, PresignedAccessIssuer},
    middleware::AuthenticatedCaller,
    object_key::ObjectKey,
    types::AppError,
};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct MetadataQuery {
    /// Object key, `{ownerId}/{fileName}`
    pub key: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct MetadataResponse {
    /// Object key the metadata belongs to
    pub key: String,
    /// User metadata attached at upload time
    pub metadata: BTreeMap<String, String>,
}

/// Returns the user metadata of an object without its content
///
/// # Errors
///
/// - `400 BAD_REQUEST` - Malformed object key
/// - `401 UNAUTHORIZED` - Missing bearer token
/// - `403 FORBIDDEN` - Caller may not read the key
/// - `404 NOT_FOUND` - Object does not exist
/// - `503 SERVICE_UNAVAILABLE` - S3 returned a 5xx
#[instrument(skip(issuer))]
pub async fn get_metadata(
    caller: AuthenticatedCaller,
    Extension(issuer): Extension<Arc<PresignedAccessIssuer>>,
    Query(query): Query<MetadataQuery>,
) -> Result<Json<MetadataResponse>, AppError> {
    let key: ObjectKey = query.key.parse().map_err(IssuerError::from)?;

    issuer.authorize(&caller.caller_id, &key).await?;
    let metadata = issuer.head_metadata(&key).await?;

    Ok(Json(MetadataResponse {
        key: key.to_string(),
        metadata: metadata.into_iter().collect(),
    }))
}
