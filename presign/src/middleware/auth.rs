use aide::OperationIo;
use axum::{
    extract::{FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::types::AppError;

/// Identity of the caller a request is made on behalf of
#[derive(Debug, Clone, OperationIo)]
pub struct AuthenticatedCaller {
    /// Caller id, compared against the owner segment of object keys
    pub caller_id: String,
}

/// Axum extractor for the authenticated caller
///
/// ```ignore
/// async fn protected_handler(
///     caller: AuthenticatedCaller,
/// ) -> Result<impl IntoResponse, AppError> {
///     Ok(caller.caller_id)
/// }
/// ```
impl<S> FromRequestParts<S> for AuthenticatedCaller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or_else(|| {
            AppError::new(
                StatusCode::UNAUTHORIZED,
                "missing_auth",
                "Authentication required but caller not found in request extensions",
                false,
            )
        })
    }
}

/// Caller identity middleware
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Adds it to the request extensions as the `AuthenticatedCaller`
/// 3. Returns 401 for missing or empty tokens
///
/// The token is taken as the caller id as-is; verifying it is the job of the
/// gateway in front of this service.
///
/// # Errors
///
/// - `AppError` - Missing token with 401 status code
pub async fn auth_middleware(mut request: Request, next: Next) -> Result<Response, AppError> {
    let caller_id = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            AppError::new(
                StatusCode::UNAUTHORIZED,
                "missing_token",
                "Authorization header must contain a valid Bearer token",
                false,
            )
        })?
        .to_string();

    request
        .extensions_mut()
        .insert(AuthenticatedCaller { caller_id });

    Ok(next.run(request).await)
}
