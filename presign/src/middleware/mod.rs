/// Caller identity middleware
pub mod auth;

pub use auth::AuthenticatedCaller;
