//! Authorization boundary consulted before any presigned URL is issued

use async_trait::async_trait;
use tracing::debug;

use crate::object_key::ObjectKey;

/// Outcome of an authorization check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationDecision {
    /// The caller may act on the key
    Allow,
    /// The caller may not act on the key
    Deny,
}

/// Decides whether a caller may obtain access to an object key
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Checks whether `caller_id` may act on `key`
    async fn authorize(&self, caller_id: &str, key: &ObjectKey) -> AuthorizationDecision;
}

/// Allows a caller to act only on keys whose owner segment is the caller's id
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnerAuthorizer;

#[async_trait]
impl Authorizer for OwnerAuthorizer {
    async fn authorize(&self, caller_id: &str, key: &ObjectKey) -> AuthorizationDecision {
        if !caller_id.is_empty() && key.owner_id() == caller_id {
            AuthorizationDecision::Allow
        } else {
            AuthorizationDecision::Deny
        }
    }
}

/// Allows every request, for deployments where an upstream layer already
/// enforces key ownership
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

#[async_trait]
impl Authorizer for AllowAll {
    async fn authorize(&self, caller_id: &str, key: &ObjectKey) -> AuthorizationDecision {
        debug!("Skipping ownership check for {caller_id} on {key}");
        AuthorizationDecision::Allow
    }
}
