//! Chợ Đồ Cũ client core.
//!
//! Profile and address editing for the marketplace client, independent of
//! any UI toolkit:
//!
//! - [`selector`] - cascading province → district → ward selector
//! - [`address`] - address record editor and address book manager
//! - [`profile`] - profile aggregate editor (basic info, addresses, seller info)
//! - [`region`], [`store`], [`auth`] - collaborator seams with HTTP
//!   implementations
//!
//! The session is passed in explicitly as an
//! [`AuthContext`](chodocu_core::AuthContext); nothing reads ambient state.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod address;
pub mod auth;
pub mod config;
pub mod error;
pub mod profile;
pub mod region;
pub mod selector;
pub mod store;

#[cfg(test)]
mod testing;

pub use address::{AddressBook, AddressEdit, AddressEditor};
pub use auth::{AuthApi, AuthClient};
pub use config::{ClientConfig, ConfigError};
pub use error::ClientError;
pub use profile::ProfileEditor;
pub use region::{HttpRegionCatalog, RegionCatalog, RegionError};
pub use selector::RegionSelector;
pub use store::{HttpProfileStore, ProfileStore, StoreError};
