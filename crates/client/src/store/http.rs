//! Profile store backed by the marketplace REST API.

use std::sync::Arc;

use async_trait::async_trait;
use chodocu_core::{
    AddressId, AuthContext, BasicInfoUpdate, NewShippingAddress, ProfileAggregate, SellerInfo,
    ShippingAddressPatch,
};
use reqwest::{Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{ProfileStore, StoreError};
use crate::config::ClientConfig;

/// Error body returned by the backend: `{ code?, message }`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Turn a non-success response into a `StoreError`, surfacing the
/// backend's message when it sent one.
pub(crate) async fn check_response(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let parsed = serde_json::from_str::<ErrorBody>(&body).ok();
    let code = parsed.as_ref().and_then(|b| b.code.clone());
    let message = parsed
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| body.chars().take(200).collect());

    tracing::warn!(status = %status, code = ?code, %message, "Backend returned non-success status");

    Err(StoreError::Api {
        status: status.as_u16(),
        code,
        message,
    })
}

/// HTTP profile store.
#[derive(Clone)]
pub struct HttpProfileStore {
    inner: Arc<HttpProfileStoreInner>,
}

struct HttpProfileStoreInner {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProfileStore {
    /// Create a profile store client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpProfileStoreInner {
                client,
                base_url: config.api_base_url.clone(),
            }),
        })
    }

    fn request(
        &self,
        auth: &AuthContext,
        method: Method,
        path: &str,
    ) -> Result<RequestBuilder, StoreError> {
        if auth.is_expired() {
            return Err(StoreError::Unauthenticated);
        }
        let url = format!("{}/v1/profile{path}", self.inner.base_url);
        Ok(self
            .inner
            .client
            .request(method, url)
            .bearer_auth(auth.token()))
    }

    async fn send_json<B: Serialize + Sync>(
        &self,
        auth: &AuthContext,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<(), StoreError> {
        let response = self.request(auth, method, path)?.json(body).send().await?;
        check_response(response).await?;
        Ok(())
    }

    fn address_path(id: &AddressId) -> String {
        format!("/shipping-addresses/{}", urlencoding::encode(id.as_str()))
    }
}

#[async_trait]
impl ProfileStore for HttpProfileStore {
    #[instrument(skip(self, auth))]
    async fn get_profile(&self, auth: &AuthContext) -> Result<ProfileAggregate, StoreError> {
        let response = self.request(auth, Method::GET, "")?.send().await?;
        let response = check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))
    }

    #[instrument(skip(self, auth, update))]
    async fn update_basic_info(
        &self,
        auth: &AuthContext,
        update: &BasicInfoUpdate,
    ) -> Result<(), StoreError> {
        self.send_json(auth, Method::PUT, "/basic-info", update).await
    }

    #[instrument(skip(self, auth, address))]
    async fn add_shipping_address(
        &self,
        auth: &AuthContext,
        address: &NewShippingAddress,
    ) -> Result<(), StoreError> {
        self.send_json(auth, Method::POST, "/shipping-addresses", address)
            .await
    }

    #[instrument(skip(self, auth, patch), fields(id = %id))]
    async fn update_shipping_address(
        &self,
        auth: &AuthContext,
        id: &AddressId,
        patch: &ShippingAddressPatch,
    ) -> Result<(), StoreError> {
        self.send_json(auth, Method::PUT, &Self::address_path(id), patch)
            .await
    }

    #[instrument(skip(self, auth), fields(id = %id))]
    async fn delete_shipping_address(
        &self,
        auth: &AuthContext,
        id: &AddressId,
    ) -> Result<(), StoreError> {
        let response = self
            .request(auth, Method::DELETE, &Self::address_path(id))?
            .send()
            .await?;
        check_response(response).await?;
        Ok(())
    }

    #[instrument(skip(self, auth, info))]
    async fn update_seller_info(
        &self,
        auth: &AuthContext,
        info: &SellerInfo,
    ) -> Result<(), StoreError> {
        self.send_json(auth, Method::PUT, "/seller-info", info).await
    }
}
