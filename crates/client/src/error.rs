//! Error type surfaced by the editors.

use chodocu_core::{CredentialsError, ValidationErrors};
use thiserror::Error;

use crate::store::StoreError;

/// Every failure an editor handler can report.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Local, field-scoped validation failure. Nothing was sent.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// The backing store rejected or failed a request.
    #[error(transparent)]
    Request(#[from] StoreError),

    /// No usable session.
    #[error("Not authenticated")]
    Unauthenticated,
}

impl From<CredentialsError> for ClientError {
    fn from(error: CredentialsError) -> Self {
        Self::Validation(error.into())
    }
}

impl ClientError {
    /// Message suitable for showing next to the form that failed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(errors) => errors
                .errors()
                .first()
                .map_or_else(|| errors.to_string(), |e| e.message.clone()),
            Self::Request(StoreError::Api { status: 401, .. } | StoreError::Unauthenticated)
            | Self::Unauthenticated => {
                "Your session has expired. Please log in again.".to_string()
            }
            Self::Request(StoreError::Api { message, .. }) => message.clone(),
            Self::Request(StoreError::Http(_)) => {
                "Could not reach the server. Please try again.".to_string()
            }
            Self::Request(StoreError::Parse(_)) => {
                "The server sent an unexpected response.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chodocu_core::{Field, FieldError};

    use super::*;

    #[test]
    fn test_user_message_prefers_backend_message() {
        let err = ClientError::from(StoreError::Api {
            status: 409,
            code: Some("ADDRESS_LIMIT".to_string()),
            message: "You can store at most 10 addresses".to_string(),
        });
        assert_eq!(err.user_message(), "You can store at most 10 addresses");
    }

    #[test]
    fn test_user_message_for_validation_is_first_field_message() {
        let mut errors = ValidationErrors::new();
        errors.push(Field::ShopName, "Shop name is required");
        errors.push(Field::TradingArea, "Trading area is required");
        assert_eq!(
            ClientError::from(errors).user_message(),
            "Shop name is required"
        );

        let single = ValidationErrors::from(FieldError::new(Field::Ward, "Ward is required"));
        assert_eq!(ClientError::from(single).user_message(), "Ward is required");
    }

    #[test]
    fn test_credentials_error_becomes_validation() {
        let err = ClientError::from(CredentialsError::Incomplete);
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(err.user_message(), "Please fill in all fields");
    }

    #[test]
    fn test_unauthenticated_message() {
        assert!(ClientError::Unauthenticated.user_message().contains("log in"));
        assert_eq!(
            ClientError::from(StoreError::Unauthenticated).user_message(),
            ClientError::Unauthenticated.user_message()
        );
    }

    #[test]
    fn test_rejected_token_reads_as_expired_session() {
        let err = ClientError::from(StoreError::Api {
            status: 401,
            code: Some("TOKEN_EXPIRED".to_string()),
            message: "jwt expired".to_string(),
        });
        assert_eq!(err.user_message(), ClientError::Unauthenticated.user_message());
    }
}
