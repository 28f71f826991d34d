//! Cross-cutting layers applied around the API routes.

pub mod rate_limit;
pub mod security;

pub use rate_limit::{rate_limit, RateLimiter};
pub use security::{cors_layer, with_security_headers};
