//! Chợ Đồ Cũ Core - Shared domain types.
//!
//! This crate provides the types shared by the marketplace client components:
//! - `client` - Region catalog, profile store, address book and profile editor
//! - `cli` - Command-line driver for the client core
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no HTTP
//! clients, no async. This keeps it lightweight and allows it to be used
//! anywhere, including in test fakes.
//!
//! # Modules
//!
//! - [`types`] - Ids, region codes, addresses, the profile aggregate, roles,
//!   auth context and field-scoped validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
