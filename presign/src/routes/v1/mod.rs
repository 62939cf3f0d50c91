pub mod objects;
pub mod presigned_urls;

use aide::axum::{
    routing::{get, post},
    ApiRouter,
};
use axum::middleware;

use crate::middleware::auth::auth_middleware;

/// Creates the v1 API router; every route requires a caller identity
pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .api_route(
            "/v1/presigned-urls/upload",
            post(presigned_urls::create_upload_url),
        )
        .api_route(
            "/v1/presigned-urls/delete",
            post(presigned_urls::create_delete_url),
        )
        .api_route("/v1/objects/metadata", get(objects::get_metadata))
        .layer(middleware::from_fn(auth_middleware))
}
