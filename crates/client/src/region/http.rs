//! Region catalog backed by the public provinces API.
//!
//! Region lists change a few times a decade, so responses are cached with
//! `moka` (1 hour TTL by default).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chodocu_core::{Region, RegionCode};
use moka::future::Cache;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::{RegionCatalog, RegionError};
use crate::config::ClientConfig;

const CACHE_CAPACITY: u64 = 512;

/// Cache key for region lists.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Provinces,
    Districts(RegionCode),
    Wards(RegionCode),
}

/// `GET /p/{code}?depth=2`
#[derive(Debug, Deserialize)]
struct ProvinceDetail {
    #[serde(default)]
    districts: Option<Vec<Region>>,
}

/// `GET /d/{code}?depth=2`
#[derive(Debug, Deserialize)]
struct DistrictDetail {
    #[serde(default)]
    wards: Option<Vec<Region>>,
}

/// HTTP region catalog.
#[derive(Clone)]
pub struct HttpRegionCatalog {
    inner: Arc<HttpRegionCatalogInner>,
}

struct HttpRegionCatalogInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<CacheKey, Vec<Region>>,
}

impl HttpRegionCatalog {
    /// Create a catalog client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, RegionError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self::with_client(
            client,
            &config.region_api_base_url,
            config.region_cache_ttl,
        ))
    }

    /// Create a catalog client around an existing `reqwest::Client`.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: &str, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(ttl)
            .build();

        Self {
            inner: Arc::new(HttpRegionCatalogInner {
                client,
                base_url: base_url.trim_end_matches('/').to_string(),
                cache,
            }),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RegionError> {
        let url = format!("{}{path}", self.inner.base_url);
        let response = self.inner.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RegionError::Api {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| RegionError::Parse(e.to_string()))
    }

    async fn cached<F>(&self, key: CacheKey, fetch: F) -> Result<Vec<Region>, RegionError>
    where
        F: Future<Output = Result<Vec<Region>, RegionError>>,
    {
        if let Some(regions) = self.inner.cache.get(&key).await {
            debug!(?key, "Cache hit for regions");
            return Ok(regions);
        }

        let regions = fetch.await?;
        self.inner.cache.insert(key, regions.clone()).await;
        Ok(regions)
    }
}

#[async_trait]
impl RegionCatalog for HttpRegionCatalog {
    #[instrument(skip(self))]
    async fn list_provinces(&self) -> Result<Vec<Region>, RegionError> {
        self.cached(CacheKey::Provinces, self.get_json("/p/"))
            .await
    }

    #[instrument(skip(self), fields(province = %province))]
    async fn list_districts(&self, province: &RegionCode) -> Result<Vec<Region>, RegionError> {
        let path = format!("/p/{}?depth=2", urlencoding::encode(province.as_str()));
        self.cached(CacheKey::Districts(province.clone()), async {
            let detail: ProvinceDetail = self.get_json(&path).await?;
            Ok(detail.districts.unwrap_or_default())
        })
        .await
    }

    #[instrument(skip(self), fields(district = %district))]
    async fn list_wards(&self, district: &RegionCode) -> Result<Vec<Region>, RegionError> {
        let path = format!("/d/{}?depth=2", urlencoding::encode(district.as_str()));
        self.cached(CacheKey::Wards(district.clone()), async {
            let detail: DistrictDetail = self.get_json(&path).await?;
            Ok(detail.wards.unwrap_or_default())
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_province_list_accepts_numeric_codes() {
        let json = r#"[
            { "name": "Thành phố Hà Nội", "code": 1, "division_type": "thành phố trung ương",
              "codename": "thanh_pho_ha_noi", "phone_code": 24, "districts": [] },
            { "name": "Tỉnh Hà Giang", "code": 2 }
        ]"#;
        let provinces: Vec<Region> = serde_json::from_str(json).unwrap();
        assert_eq!(provinces.len(), 2);
        assert_eq!(provinces[0].code.as_str(), "1");
        assert_eq!(provinces[0].name, "Thành phố Hà Nội");
    }

    #[test]
    fn test_province_detail_reads_districts() {
        let json = r#"{ "name": "Thành phố Hà Nội", "code": 1,
            "districts": [ { "name": "Quận Ba Đình", "code": 1, "wards": [] },
                           { "name": "Quận Cầu Giấy", "code": 5 } ] }"#;
        let detail: ProvinceDetail = serde_json::from_str(json).unwrap();
        let districts = detail.districts.unwrap_or_default();
        assert_eq!(districts[1].code.as_str(), "5");
    }

    #[test]
    fn test_missing_child_array_is_empty() {
        let detail: ProvinceDetail = serde_json::from_str(r#"{ "code": 1 }"#).unwrap();
        assert!(detail.districts.unwrap_or_default().is_empty());

        let detail: DistrictDetail =
            serde_json::from_str(r#"{ "code": 5, "wards": null }"#).unwrap();
        assert!(detail.wards.unwrap_or_default().is_empty());
    }
}
