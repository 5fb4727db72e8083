//! Session context and credential checks.
//!
//! The session is an explicit value handed to stores and editors. Nothing
//! here reads ambient storage or decodes tokens.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};

use super::email::{Email, EmailError};
use super::role::UserRole;
use super::validation::{Field, FieldError, ValidationErrors};

/// Seconds before `expires_at` at which a session is already treated as
/// expired.
const EXPIRY_SKEW_SECS: i64 = 60;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// An authenticated session.
#[derive(Clone)]
pub struct AuthContext {
    token: SecretString,
    /// Role issued at login.
    pub role: UserRole,
    /// Email of the principal.
    pub email: String,
    /// When the token stops being accepted, if known.
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthContext {
    /// Create a session from a bearer token.
    #[must_use]
    pub fn new(token: impl Into<String>, role: UserRole, email: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
            role,
            email: email.into(),
            expires_at: None,
        }
    }

    /// Set the expiry instant.
    #[must_use]
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Raw bearer token.
    #[must_use]
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }

    /// Value for an `Authorization` header.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token.expose_secret())
    }

    /// Check if the session is expired (with a 60 second buffer).
    ///
    /// Sessions without a known expiry are never considered expired; the
    /// backend rejects them when they lapse.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|at| Utc::now() >= at - Duration::seconds(EXPIRY_SKEW_SECS))
    }

    /// Whether the role is in `allowed`. An empty list admits every role.
    #[must_use]
    pub fn permits(&self, allowed: &[UserRole]) -> bool {
        allowed.is_empty() || allowed.contains(&self.role)
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("token", &"[REDACTED]")
            .field("role", &self.role)
            .field("email", &self.email)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Outcome of gating a view on the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Render the view.
    Granted,
    /// Send the user to the login page.
    Login,
}

impl Access {
    /// Path of the login page.
    pub const LOGIN_PATH: &'static str = "/login";
}

/// Decide whether a role-gated view may be shown.
///
/// Missing or expired sessions and roles outside `allowed` all lead to the
/// login page.
#[must_use]
pub fn guard(auth: Option<&AuthContext>, allowed: &[UserRole]) -> Access {
    match auth {
        Some(ctx) if !ctx.is_expired() && ctx.permits(allowed) => Access::Granted,
        _ => Access::Login,
    }
}

/// First failing credential check. Checks run in form order.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("Please fill in all fields")]
    Incomplete,
    #[error("Email is invalid")]
    InvalidEmail(#[source] EmailError),
    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    #[error("Password confirmation does not match")]
    PasswordMismatch,
}

impl CredentialsError {
    /// Form field the error belongs to, if it is field-specific.
    #[must_use]
    pub const fn field(&self) -> Option<Field> {
        match self {
            Self::Incomplete => None,
            Self::InvalidEmail(_) => Some(Field::Email),
            Self::PasswordTooShort { .. } => Some(Field::Password),
            Self::PasswordMismatch => Some(Field::ConfirmPassword),
        }
    }
}

impl From<CredentialsError> for ValidationErrors {
    fn from(error: CredentialsError) -> Self {
        let field = error.field().unwrap_or(Field::Email);
        FieldError::new(field, error.to_string()).into()
    }
}

/// Login or registration form input.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
    /// Only used by registration.
    pub confirm_password: Option<SecretString>,
}

impl Credentials {
    /// Login form input.
    #[must_use]
    pub fn login(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
            confirm_password: None,
        }
    }

    /// Registration form input.
    #[must_use]
    pub fn register(
        email: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
            confirm_password: Some(SecretString::from(confirm_password.into())),
        }
    }

    /// Check login input: both fields present and an email with an @.
    ///
    /// # Errors
    ///
    /// Returns the first failing check.
    pub fn validate_login(&self) -> Result<Email, CredentialsError> {
        if self.email.is_empty() || self.password.expose_secret().is_empty() {
            return Err(CredentialsError::Incomplete);
        }
        Email::parse(&self.email).map_err(CredentialsError::InvalidEmail)
    }

    /// Check registration input: login checks plus password length and
    /// confirmation.
    ///
    /// # Errors
    ///
    /// Returns the first failing check.
    pub fn validate_register(&self) -> Result<Email, CredentialsError> {
        let confirm = self
            .confirm_password
            .as_ref()
            .map_or("", |s| s.expose_secret());
        if confirm.is_empty() {
            return Err(CredentialsError::Incomplete);
        }

        let email = self.validate_login()?;
        let password = self.password.expose_secret();
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(CredentialsError::PasswordTooShort {
                min: MIN_PASSWORD_LENGTH,
            });
        }
        if password != confirm {
            return Err(CredentialsError::PasswordMismatch);
        }
        Ok(email)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}
