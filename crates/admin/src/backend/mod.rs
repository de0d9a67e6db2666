//! Service modules: one async function per commerce API endpoint.
//!
//! Every function takes the client, the caller's access token by value (so
//! it can be passed straight to [`AdminSession::call`]) and the request
//! data, and returns the decoded response.
//!
//! [`AdminSession::call`]: crate::middleware::AdminSession::call

pub mod categories;
pub mod coupons;
pub mod orders;
pub mod products;
pub mod promotions;
pub mod shipping_info;
pub mod suppliers;
pub mod users;
