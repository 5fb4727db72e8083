//! Administrative region catalog.
//!
//! The catalog is pure data access: it lists provinces, the districts of a
//! province and the wards of a district. Failures are errors, never empty
//! lists.

mod http;

pub use http::HttpRegionCatalog;

use async_trait::async_trait;
use chodocu_core::{Region, RegionCode, RegionLevel};
use thiserror::Error;

/// Errors that can occur when fetching regions.
#[derive(Debug, Error)]
pub enum RegionError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Source of administrative regions.
#[async_trait]
pub trait RegionCatalog: Send + Sync {
    /// All provinces.
    async fn list_provinces(&self) -> Result<Vec<Region>, RegionError>;

    /// Districts of one province.
    async fn list_districts(&self, province: &RegionCode) -> Result<Vec<Region>, RegionError>;

    /// Wards of one district.
    async fn list_wards(&self, district: &RegionCode) -> Result<Vec<Region>, RegionError>;
}

/// Load the options of `level`, whose parent is `parent`.
///
/// # Errors
///
/// Propagates catalog errors. A child level without a parent code fails with
/// `RegionError::Parse` rather than reaching the network.
pub async fn list_level(
    catalog: &dyn RegionCatalog,
    level: RegionLevel,
    parent: Option<&RegionCode>,
) -> Result<Vec<Region>, RegionError> {
    match (level, parent) {
        (RegionLevel::Province, _) => catalog.list_provinces().await,
        (RegionLevel::District, Some(province)) => catalog.list_districts(province).await,
        (RegionLevel::Ward, Some(district)) => catalog.list_wards(district).await,
        (level, None) => Err(RegionError::Parse(format!("{level} list requires a parent code"))),
    }
}
