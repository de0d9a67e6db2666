//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Request ID (`x-request-id`, recorded in span and Sentry scope)
//! 4. Session layer (in-memory store, SameSite=Strict)
//! 5. Security headers
//!
//! Authentication is an extractor ([`RequireAdminAuth`]) rather than a layer,
//! so the login page and probes stay public.

pub mod auth;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{AdminSession, RequireAdminAuth, clear_login, store_login};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
