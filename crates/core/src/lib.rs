//! Boutique Core - Shared types library.
//!
//! This crate provides the types used across all Boutique components:
//! - `storefront` - Customer-facing shop
//! - `admin` - Back-office console
//! - `cli` - Operator tools
//!
//! # Architecture
//!
//! By default the crate contains only types: no I/O and no HTTP. The
//! `client` feature adds [`client::ApiClient`], the commerce API client both
//! web applications talk through, and the public geography lookup client.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, VND amounts, order statuses, catalog sort
//! - [`resources`] - REST resource DTOs in wire format
//! - [`client`] - Commerce API HTTP client (feature `client`)
//! - [`config`] - Environment and secret validation helpers (feature `config`)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod resources;
pub mod types;

#[cfg(feature = "client")]
pub mod client;

#[cfg(feature = "config")]
pub mod config;

pub use resources::*;
pub use types::*;
