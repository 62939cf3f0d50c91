//! Presigned S3 object access: issuance, redemption and metadata lookup

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Caller authorization for object keys
pub mod authorization;

/// Presigned URL issuance and metadata lookup
pub mod issuer;

/// Tracing subscriber setup
pub mod logging;

/// Middleware
pub mod middleware;

/// `{ownerId}/{fileName}` object keys
pub mod object_key;

/// Plain HTTP redemption of presigned URLs
pub mod redeem;

/// HTTP routes
pub mod routes;

/// HTTP server
pub mod server;

/// Shared types: configuration and errors
pub mod types;
