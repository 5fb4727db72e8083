//! Region catalog browsing.

use std::error::Error;

use chodocu_client::region::list_level;
use chodocu_client::{ClientConfig, HttpRegionCatalog};
use chodocu_core::{RegionCode, RegionLevel};

/// Print provinces, the districts of `province` or the wards of `district`.
///
/// # Errors
///
/// Returns the catalog failure.
#[allow(clippy::print_stdout)]
pub async fn list(
    config: &ClientConfig,
    province: Option<&str>,
    district: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let catalog = HttpRegionCatalog::new(config)?;
    let (level, parent) = match (province, district) {
        (_, Some(d)) => (RegionLevel::Ward, Some(RegionCode::new(d))),
        (Some(p), None) => (RegionLevel::District, Some(RegionCode::new(p))),
        (None, None) => (RegionLevel::Province, None),
    };

    let regions = list_level(&catalog, level, parent.as_ref()).await?;
    tracing::info!(%level, count = regions.len(), "Regions loaded");
    for region in regions {
        println!("{}\t{}", region.code, region.name);
    }
    Ok(())
}
