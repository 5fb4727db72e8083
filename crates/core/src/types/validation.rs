//! Field-scoped validation errors.
//!
//! Validation happens locally before any network call. Errors name the form
//! field they belong to so a view can render them inline.

use core::fmt;

use serde::Serialize;

/// A form field that can carry a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FullName,
    Phone,
    Province,
    District,
    Ward,
    ShopName,
    TradingArea,
    TermsAccepted,
    NoProhibitedItems,
    Email,
    Password,
    ConfirmPassword,
}

impl Field {
    /// Wire/form name of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::Phone => "phone",
            Self::Province => "province",
            Self::District => "district",
            Self::Ward => "ward",
            Self::ShopName => "shopName",
            Self::TradingArea => "tradingArea",
            Self::TermsAccepted => "termsAccepted",
            Self::NoProhibitedItems => "noProhibitedItems",
            Self::Email => "email",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation failure attached to a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// The offending field.
    pub field: Field,
    /// User-facing message.
    pub message: String,
}

impl FieldError {
    /// Create a field error.
    #[must_use]
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Field errors collected by one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Create an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Record an error for `field`.
    pub fn push(&mut self, field: Field, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    /// True when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All recorded errors, in the order they were found.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Message for `field`, if it failed.
    #[must_use]
    pub fn message_for(&self, field: Field) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Whether `field` failed.
    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// Forget the errors of `field`, e.g. once the user edits it again.
    pub fn clear_field(&mut self, field: Field) {
        self.0.retain(|e| e.field != field);
    }

    /// Convert into a `Result`, failing when any error was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one error was recorded.
    pub fn into_result<T>(self, ok: T) -> Result<T, Self> {
        if self.is_empty() { Ok(ok) } else { Err(self) }
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        Self(vec![error])
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("no validation errors");
        }
        let parts: Vec<_> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// True when `value` is absent or blank after trimming.
#[must_use]
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_fields() {
        let mut errors = ValidationErrors::new();
        errors.push(Field::FullName, "Full name is required");
        errors.push(Field::Phone, "Phone is required");
        assert_eq!(
            errors.to_string(),
            "fullName: Full name is required; phone: Phone is required"
        );
    }

    #[test]
    fn test_message_for() {
        let errors = ValidationErrors::from(FieldError::new(Field::Ward, "Ward is required"));
        assert_eq!(errors.message_for(Field::Ward), Some("Ward is required"));
        assert_eq!(errors.message_for(Field::District), None);
    }

    #[test]
    fn test_into_result() {
        assert_eq!(ValidationErrors::new().into_result(5), Ok(5));
        let mut errors = ValidationErrors::new();
        errors.push(Field::Email, "bad");
        assert!(errors.into_result(()).is_err());
    }

    #[test]
    fn test_clear_field() {
        let mut errors = ValidationErrors::new();
        errors.push(Field::FullName, "required");
        errors.push(Field::Phone, "required");
        errors.clear_field(Field::Phone);
        assert!(!errors.contains(Field::Phone));
        assert!(errors.contains(Field::FullName));
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(None));
        assert!(is_blank(Some("   ")));
        assert!(!is_blank(Some(" a ")));
    }
}
