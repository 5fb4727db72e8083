//! Integration tests for the Chợ Đồ Cũ client core.
//!
//! # Running Tests
//!
//! ```bash
//! # Region tests only need network access
//! cargo test -p chodocu-integration-tests --test regions -- --ignored
//!
//! # Profile tests need a running backend and a session
//! export CHODOCU_API_BASE_URL=http://localhost:8080/api
//! cho-cli login -e seller@chodocu.vn -p ... >> .env
//! cargo test -p chodocu-integration-tests --test profile -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `regions` - Public region catalog and the cascading selector
//! - `profile` - Profile store, address book and profile editor

use std::sync::Arc;

use chodocu_client::{ClientConfig, HttpProfileStore, HttpRegionCatalog, ProfileEditor};
use chodocu_core::AuthContext;

/// Configuration and clients shared by the tests.
pub struct TestContext {
    pub config: ClientConfig,
}

impl TestContext {
    /// Load the configuration from the environment.
    ///
    /// # Panics
    ///
    /// Panics if the environment holds an invalid value.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            config: ClientConfig::from_env().expect("Invalid client configuration"),
        }
    }

    /// The configured session.
    ///
    /// # Panics
    ///
    /// Panics if `CHODOCU_ACCESS_TOKEN` is not set.
    #[must_use]
    pub fn auth(&self) -> AuthContext {
        self.config
            .require_session()
            .expect("CHODOCU_ACCESS_TOKEN must be set for profile tests")
    }

    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn store(&self) -> Arc<HttpProfileStore> {
        Arc::new(HttpProfileStore::new(&self.config).expect("Failed to build profile store"))
    }

    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn catalog(&self) -> Arc<HttpRegionCatalog> {
        Arc::new(HttpRegionCatalog::new(&self.config).expect("Failed to build region catalog"))
    }

    /// A profile editor for the configured session.
    ///
    /// # Panics
    ///
    /// Panics if there is no session or the HTTP client cannot be built.
    #[must_use]
    pub fn editor(&self) -> ProfileEditor {
        ProfileEditor::new(self.auth(), self.store())
    }
}
