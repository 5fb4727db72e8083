//! Integration tests for the public region catalog.
//!
//! These tests require network access to the region API
//! (`CHODOCU_REGION_API_BASE_URL`, default `https://provinces.open-api.vn/api`).

use chodocu_client::RegionCatalog;
use chodocu_client::selector::{RegionHints, RegionSelector};
use chodocu_core::RegionLevel;
use chodocu_integration_tests::TestContext;

#[tokio::test]
#[ignore = "Requires network access to the region API"]
async fn test_provinces_include_hanoi() {
    let ctx = TestContext::from_env();
    let provinces = ctx
        .catalog()
        .list_provinces()
        .await
        .expect("Failed to list provinces");

    assert!(provinces.len() > 30, "got {} provinces", provinces.len());
    assert!(provinces.iter().any(|p| p.name.contains("Hà Nội")));
}

#[tokio::test]
#[ignore = "Requires network access to the region API"]
async fn test_selector_resolves_names_from_catalog() {
    let ctx = TestContext::from_env();
    let catalog = ctx.catalog();

    let provinces = catalog.list_provinces().await.expect("Failed to list provinces");
    let province = provinces.first().expect("Catalog has no provinces").clone();
    let districts = catalog
        .list_districts(&province.code)
        .await
        .expect("Failed to list districts");
    let district = districts.first().expect("Province has no districts").clone();

    let selector = RegionSelector::new(catalog);
    let resolved = selector
        .initialize(RegionHints {
            province: Some(&province.name),
            district: Some(&district.name),
            ward: None,
        })
        .await;

    assert_eq!(resolved.province, Some(province.code));
    assert_eq!(resolved.district, Some(district.code));
    assert!(!selector.options(RegionLevel::Ward).is_empty());
}

#[tokio::test]
#[ignore = "Requires network access to the region API"]
async fn test_unknown_province_is_empty_not_error() {
    let ctx = TestContext::from_env();
    let selector = RegionSelector::new(ctx.catalog());

    let resolved = selector
        .initialize(RegionHints {
            province: Some("Không tồn tại"),
            ..RegionHints::default()
        })
        .await;

    assert!(resolved.province.is_none());
    assert!(selector.options(RegionLevel::District).is_empty());
}
