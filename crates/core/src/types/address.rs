//! Shipping addresses and the address-book default invariants.
//!
//! An address book may hold at most one default-for-shipping address and at
//! most one default-for-pickup address. The two flags are independent: one
//! address can carry both, either or neither.

use serde::{Deserialize, Serialize};

use super::id::AddressId;
use super::validation::{Field, ValidationErrors};

// ─────────────────────────────────────────────────────────────────────────────
// Persisted Types
// ─────────────────────────────────────────────────────────────────────────────

/// A shipping address as stored by the profile service.
///
/// Province, district and ward are persisted as *names*. Region codes are a
/// client-side convenience and are re-derived from names when editing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    /// Store-assigned id; absent until persisted.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AddressId>,
    /// Recipient name.
    pub full_name: String,
    /// Recipient phone.
    pub phone: String,
    /// Province name.
    pub province: String,
    /// District name.
    pub district: String,
    /// Ward name.
    pub ward: String,
    /// Street and house number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    /// Delivery note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Default address for deliveries to this principal.
    #[serde(default)]
    pub is_default_shipping: bool,
    /// Default address for pickups from this principal (as a seller).
    #[serde(default)]
    pub is_default_pickup: bool,
}

impl ShippingAddress {
    /// Format the address as a single line: street, ward, district, province.
    #[must_use]
    pub fn formatted_single_line(&self) -> String {
        let mut parts = Vec::with_capacity(4);

        if let Some(street) = &self.street
            && !street.trim().is_empty()
        {
            parts.push(street.as_str());
        }
        for part in [&self.ward, &self.district, &self.province] {
            if !part.is_empty() {
                parts.push(part.as_str());
            }
        }

        parts.join(", ")
    }

    /// Whether this address is `id`.
    #[must_use]
    pub fn has_id(&self, id: &AddressId) -> bool {
        self.id.as_ref() == Some(id)
    }
}

/// An address ready to be created: a validated draft without an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShippingAddress {
    pub full_name: String,
    pub phone: String,
    pub province: String,
    pub district: String,
    pub ward: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub is_default_shipping: bool,
    pub is_default_pickup: bool,
}

impl NewShippingAddress {
    /// Whether this address asks to become the `kind` default.
    #[must_use]
    pub const fn requests_default(&self, kind: DefaultKind) -> bool {
        match kind {
            DefaultKind::Shipping => self.is_default_shipping,
            DefaultKind::Pickup => self.is_default_pickup,
        }
    }
}

/// Partial update of a stored address. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddressPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ward: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default_shipping: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default_pickup: Option<bool>,
}

impl ShippingAddressPatch {
    /// A patch that touches only the `kind` default flag.
    #[must_use]
    pub fn default_flag(kind: DefaultKind, value: bool) -> Self {
        match kind {
            DefaultKind::Shipping => Self {
                is_default_shipping: Some(value),
                ..Self::default()
            },
            DefaultKind::Pickup => Self {
                is_default_pickup: Some(value),
                ..Self::default()
            },
        }
    }

    /// True when the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the patch to a stored address.
    pub fn apply_to(&self, address: &mut ShippingAddress) {
        if let Some(v) = &self.full_name {
            address.full_name.clone_from(v);
        }
        if let Some(v) = &self.phone {
            address.phone.clone_from(v);
        }
        if let Some(v) = &self.province {
            address.province.clone_from(v);
        }
        if let Some(v) = &self.district {
            address.district.clone_from(v);
        }
        if let Some(v) = &self.ward {
            address.ward.clone_from(v);
        }
        if let Some(v) = &self.street {
            address.street = non_blank(v);
        }
        if let Some(v) = &self.note {
            address.note = non_blank(v);
        }
        if let Some(v) = self.is_default_shipping {
            address.is_default_shipping = v;
        }
        if let Some(v) = self.is_default_pickup {
            address.is_default_pickup = v;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Default Flags
// ─────────────────────────────────────────────────────────────────────────────

/// The two independent "default" purposes an address can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultKind {
    Shipping,
    Pickup,
}

impl DefaultKind {
    /// Both kinds, shipping first.
    pub const ALL: [Self; 2] = [Self::Shipping, Self::Pickup];

    /// Whether `address` currently holds this flag.
    #[must_use]
    pub const fn holds(self, address: &ShippingAddress) -> bool {
        match self {
            Self::Shipping => address.is_default_shipping,
            Self::Pickup => address.is_default_pickup,
        }
    }
}

impl std::fmt::Display for DefaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shipping => write!(f, "shipping"),
            Self::Pickup => write!(f, "pickup"),
        }
    }
}

/// Find the address currently holding the `kind` default, skipping
/// `excluding`.
#[must_use]
pub fn find_default_holder<'a>(
    addresses: &'a [ShippingAddress],
    kind: DefaultKind,
    excluding: Option<&AddressId>,
) -> Option<&'a ShippingAddress> {
    addresses
        .iter()
        .filter(|a| excluding.is_none_or(|id| !a.has_id(id)))
        .find(|a| kind.holds(a))
}

/// More than one address holds the same default flag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{count} addresses hold the default {kind} flag")]
pub struct DefaultConflict {
    /// The flag in conflict.
    pub kind: DefaultKind,
    /// Number of holders (always > 1).
    pub count: usize,
}

/// Check that each default flag is held by at most one address.
///
/// # Errors
///
/// Returns the first conflicting flag, shipping checked first.
pub fn check_default_exclusivity(addresses: &[ShippingAddress]) -> Result<(), DefaultConflict> {
    for kind in DefaultKind::ALL {
        let count = addresses.iter().filter(|a| kind.holds(a)).count();
        if count > 1 {
            return Err(DefaultConflict { kind, count });
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Form Draft
// ─────────────────────────────────────────────────────────────────────────────

/// Editable form state for one address, new or existing.
///
/// Region fields hold names; the codes driving the cascading selector live in
/// the selector itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressDraft {
    pub full_name: String,
    pub phone: String,
    pub province: String,
    pub district: String,
    pub ward: String,
    pub street: String,
    pub note: String,
    pub is_default_shipping: bool,
    pub is_default_pickup: bool,
}

impl AddressDraft {
    /// Start editing a stored address.
    #[must_use]
    pub fn from_address(address: &ShippingAddress) -> Self {
        Self {
            full_name: address.full_name.clone(),
            phone: address.phone.clone(),
            province: address.province.clone(),
            district: address.district.clone(),
            ward: address.ward.clone(),
            street: address.street.clone().unwrap_or_default(),
            note: address.note.clone().unwrap_or_default(),
            is_default_shipping: address.is_default_shipping,
            is_default_pickup: address.is_default_pickup,
        }
    }

    /// Apply a patch reported by an address editor.
    pub fn apply(&mut self, patch: &ShippingAddressPatch) {
        let assign = |slot: &mut String, value: Option<&String>| {
            if let Some(v) = value {
                slot.clone_from(v);
            }
        };
        assign(&mut self.full_name, patch.full_name.as_ref());
        assign(&mut self.phone, patch.phone.as_ref());
        assign(&mut self.province, patch.province.as_ref());
        assign(&mut self.district, patch.district.as_ref());
        assign(&mut self.ward, patch.ward.as_ref());
        assign(&mut self.street, patch.street.as_ref());
        assign(&mut self.note, patch.note.as_ref());
        if let Some(v) = patch.is_default_shipping {
            self.is_default_shipping = v;
        }
        if let Some(v) = patch.is_default_pickup {
            self.is_default_pickup = v;
        }
    }

    /// Check the required fields.
    ///
    /// fullName, phone, province, district and ward must be non-empty after
    /// trimming. Street and note are optional. The default flags are passed
    /// through untouched; exclusivity is enforced by the address book.
    ///
    /// # Errors
    ///
    /// Returns one field error per missing required field.
    pub fn validate(&self) -> Result<NewShippingAddress, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let required = [
            (Field::FullName, &self.full_name, "Recipient name is required"),
            (Field::Phone, &self.phone, "Phone number is required"),
            (Field::Province, &self.province, "Province is required"),
            (Field::District, &self.district, "District is required"),
            (Field::Ward, &self.ward, "Ward is required"),
        ];
        for (field, value, message) in required {
            if value.trim().is_empty() {
                errors.push(field, message);
            }
        }

        errors.into_result(NewShippingAddress {
            full_name: self.full_name.clone(),
            phone: self.phone.clone(),
            province: self.province.clone(),
            district: self.district.clone(),
            ward: self.ward.clone(),
            street: non_blank(&self.street),
            note: non_blank(&self.note),
            is_default_shipping: self.is_default_shipping,
            is_default_pickup: self.is_default_pickup,
        })
    }

    /// Every field as a patch, for saving an edited address.
    #[must_use]
    pub fn to_patch(&self) -> ShippingAddressPatch {
        ShippingAddressPatch {
            full_name: Some(self.full_name.clone()),
            phone: Some(self.phone.clone()),
            province: Some(self.province.clone()),
            district: Some(self.district.clone()),
            ward: Some(self.ward.clone()),
            street: Some(self.street.clone()),
            note: Some(self.note.clone()),
            is_default_shipping: Some(self.is_default_shipping),
            is_default_pickup: Some(self.is_default_pickup),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}
