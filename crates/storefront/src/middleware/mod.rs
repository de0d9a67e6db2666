//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Request ID (`x-request-id`, recorded in span and Sentry scope)
//! 4. Session layer (in-memory store, SameSite=Lax)
//! 5. Security headers
//!
//! Rate limiting is attached per route to the credential forms only.

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{CustomerSession, OptionalAuth, RequireAuth, clear_login, store_login};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
