//! Principal roles.

use serde::{Deserialize, Serialize};

/// Role of an authenticated principal, as issued by the login endpoint.
///
/// Dashboards and profile pages are gated on this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular buyer account. Also the fallback when login omits a role.
    #[default]
    User,
    /// Account that can list goods for sale.
    Seller,
    /// Marketplace administrator (category management).
    Admin,
}

impl UserRole {
    /// Landing path after login for this role.
    #[must_use]
    pub const fn home_path(self) -> &'static str {
        match self {
            Self::User => "/user",
            Self::Seller => "/seller",
            Self::Admin => "/admin",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Seller => write!(f, "seller"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "seller" => Ok(Self::Seller),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}
