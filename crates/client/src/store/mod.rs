//! Profile store: the backing resource the profile editor reads and writes.

mod http;

pub use http::HttpProfileStore;
pub(crate) use http::check_response;

use async_trait::async_trait;
use chodocu_core::{
    AddressId, AuthContext, BasicInfoUpdate, NewShippingAddress, ProfileAggregate, SellerInfo,
    ShippingAddressPatch, check_default_exclusivity,
};
use thiserror::Error;
use tracing::warn;

/// Errors returned by the marketplace backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The session is missing or expired; nothing was sent.
    #[error("Session expired")]
    Unauthenticated,
}

/// The profile resource of the authenticated principal.
///
/// Mutations do not return the updated resource; callers reload with
/// [`ProfileStore::get_profile`].
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Read the whole aggregate.
    async fn get_profile(&self, auth: &AuthContext) -> Result<ProfileAggregate, StoreError>;

    /// Replace the basic info section.
    async fn update_basic_info(
        &self,
        auth: &AuthContext,
        update: &BasicInfoUpdate,
    ) -> Result<(), StoreError>;

    /// Create an address.
    async fn add_shipping_address(
        &self,
        auth: &AuthContext,
        address: &NewShippingAddress,
    ) -> Result<(), StoreError>;

    /// Apply a partial update to one address.
    async fn update_shipping_address(
        &self,
        auth: &AuthContext,
        id: &AddressId,
        patch: &ShippingAddressPatch,
    ) -> Result<(), StoreError>;

    /// Remove one address.
    async fn delete_shipping_address(
        &self,
        auth: &AuthContext,
        id: &AddressId,
    ) -> Result<(), StoreError>;

    /// Replace the seller info section.
    async fn update_seller_info(
        &self,
        auth: &AuthContext,
        info: &SellerInfo,
    ) -> Result<(), StoreError>;
}

/// Read the aggregate back after a write.
///
/// A book that breaks default exclusivity (left behind by a half-finished
/// default swap) is returned as-is and logged.
pub(crate) async fn reload_profile(
    store: &dyn ProfileStore,
    auth: &AuthContext,
) -> Result<ProfileAggregate, StoreError> {
    let profile = store.get_profile(auth).await?;
    if let Err(conflict) = check_default_exclusivity(&profile.shipping_addresses) {
        warn!(
            kind = %conflict.kind,
            count = conflict.count,
            "Reloaded address book has conflicting defaults"
        );
    }
    Ok(profile)
}
