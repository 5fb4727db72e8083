//! Login and registration against the marketplace backend.
//!
//! A successful login yields an [`AuthContext`] that callers hand to the
//! profile editor explicitly; nothing is stored here.

use std::sync::Arc;

use async_trait::async_trait;
use chodocu_core::{AuthContext, Credentials, UserId, UserRole};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::store::{StoreError, check_response};

/// Login / register request body.
#[derive(Serialize)]
struct CredentialsBody<'a> {
    email: &'a str,
    password: &'a str,
}

/// Response of `POST /v1/auth/login` and `POST /v1/auth/register`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    id: Option<UserId>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl AuthResponse {
    /// Build the session, falling back to the typed email and the `user`
    /// role when the backend omits them.
    fn into_session(self, typed_email: &str) -> Result<AuthContext, StoreError> {
        let Some(token) = self.access_token.or(self.token) else {
            return Err(StoreError::Api {
                status: 200,
                code: None,
                message: self.message.unwrap_or_else(|| "Login failed".to_string()),
            });
        };
        let role = self
            .role
            .as_deref()
            .and_then(|r| r.parse::<UserRole>().ok())
            .unwrap_or_default();
        let email = self.email.unwrap_or_else(|| typed_email.to_string());
        Ok(AuthContext::new(token, role, email))
    }
}

/// An account created by registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registered {
    pub id: Option<UserId>,
    pub email: String,
}

/// Authentication endpoints.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Validate the login form and exchange it for a session.
    async fn login(&self, credentials: &Credentials) -> Result<AuthContext, ClientError>;

    /// Validate the registration form and create an account.
    async fn register(&self, credentials: &Credentials) -> Result<Registered, ClientError>;
}

/// HTTP authentication client.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<AuthClientInner>,
}

struct AuthClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    /// Create an authentication client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(AuthClientInner {
                client,
                base_url: config.api_base_url.clone(),
            }),
        })
    }

    async fn post(
        &self,
        path: &str,
        credentials: &Credentials,
    ) -> Result<AuthResponse, StoreError> {
        let url = format!("{}/v1/auth/{path}", self.inner.base_url);
        let body = CredentialsBody {
            email: &credentials.email,
            password: credentials.password.expose_secret(),
        };

        let response = self.inner.client.post(&url).json(&body).send().await?;
        let response = check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))
    }
}

#[async_trait]
impl AuthApi for AuthClient {
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn login(&self, credentials: &Credentials) -> Result<AuthContext, ClientError> {
        credentials.validate_login()?;
        let session = self
            .post("login", credentials)
            .await?
            .into_session(&credentials.email)?;
        info!(role = %session.role, "Logged in");
        Ok(session)
    }

    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn register(&self, credentials: &Credentials) -> Result<Registered, ClientError> {
        credentials.validate_register()?;
        let response = self.post("register", credentials).await?;
        if response.id.is_none() && response.email.is_none() {
            return Err(StoreError::Api {
                status: 200,
                code: None,
                message: response
                    .message
                    .unwrap_or_else(|| "Registration failed".to_string()),
            }
            .into());
        }
        info!("Registered");
        Ok(Registered {
            id: response.id,
            email: response.email.unwrap_or_else(|| credentials.email.clone()),
        })
    }
}
