//! Service modules: one async function per commerce API endpoint.
//!
//! Authenticated calls take the customer's access token by value so they can
//! be handed to [`CustomerSession::call`]. Catalog and location reads are
//! public and send no token.
//!
//! [`CustomerSession::call`]: crate::middleware::CustomerSession::call

pub mod addresses;
pub mod cart;
pub mod catalog;
pub mod locations;
pub mod lookups;
pub mod orders;
pub mod payments;
