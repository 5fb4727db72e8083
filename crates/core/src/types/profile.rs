//! The profile aggregate: basic info, address book and seller info.
//!
//! One aggregate exists per authenticated principal. It is created
//! server-side; the client only reads it and updates its sections.

use serde::{Deserialize, Deserializer, Serialize};

use super::address::{DefaultKind, ShippingAddress, find_default_holder};
use super::id::AddressId;
use super::phone::{PhoneError, PhoneNumber};
use super::validation::{Field, FieldError, ValidationErrors, is_blank};

/// Everything the profile page edits, as returned by the profile service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAggregate {
    /// Personal details.
    #[serde(rename = "profile", default)]
    pub basic_info: BasicInfo,
    /// The address book.
    #[serde(default)]
    pub shipping_addresses: Vec<ShippingAddress>,
    /// Seller details; empty for accounts that never sold.
    #[serde(default)]
    pub seller_info: SellerInfo,
    /// Server-computed completion figure.
    #[serde(default)]
    pub completion: Completion,
}

impl ProfileAggregate {
    /// The stored address with `id`.
    #[must_use]
    pub fn address(&self, id: &AddressId) -> Option<&ShippingAddress> {
        self.shipping_addresses.iter().find(|a| a.has_id(id))
    }

    /// The current `kind` default, if any.
    #[must_use]
    pub fn default_address(&self, kind: DefaultKind) -> Option<&ShippingAddress> {
        find_default_holder(&self.shipping_addresses, kind, None)
    }
}

/// Postal address attached to the basic info section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub province: String,
    pub district: String,
    pub ward: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
}

/// Personal details of the principal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    /// Avatar image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<PostalAddress>,
}

impl BasicInfo {
    /// Validate the form and build the update payload.
    ///
    /// Full name and phone are required; the phone must be 10-11 digits. The
    /// postal address, if present, is sent as-is.
    ///
    /// # Errors
    ///
    /// Returns one field error per failing field.
    pub fn validate_for_save(&self) -> Result<BasicInfoUpdate, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if is_blank(self.full_name.as_deref()) {
            errors.push(Field::FullName, "Full name is required");
        }

        let phone = self.phone.as_deref().unwrap_or_default();
        match PhoneNumber::parse(phone) {
            Ok(_) => {}
            Err(PhoneError::Empty) => errors.push(Field::Phone, "Phone number is required"),
            Err(_) => errors.push(Field::Phone, "Phone number is invalid"),
        }

        errors.into_result(BasicInfoUpdate {
            full_name: self.full_name.clone().unwrap_or_default(),
            phone: phone.to_owned(),
            avatar: self.avatar.clone(),
            address: self.address.clone(),
        })
    }
}

/// Payload of a basic info save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfoUpdate {
    pub full_name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<PostalAddress>,
}

/// How buyers may contact a seller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMethods {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_chat: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_phone: Option<bool>,
}

/// Payment methods a seller accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethods {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e_wallet: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_transfer: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_account: Option<String>,
}

/// Seller commitments that must both be accepted before selling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerAgreements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms_accepted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_prohibited_items: Option<bool>,
}

/// Seller details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerInfo {
    /// Name shown on listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_name: Option<String>,
    /// Free-text trading area, e.g. "Hà Nội" or "Toàn quốc".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trading_area: Option<String>,
    /// Address-book entry used for pickups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_address_id: Option<AddressId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_methods: Option<ContactMethods>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_methods: Option<PaymentMethods>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agreements: Option<SellerAgreements>,
}

impl SellerInfo {
    /// Validate before saving.
    ///
    /// Checks short-circuit in form order (shop name, trading area, terms,
    /// prohibited-items pledge) and report only the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first failing field.
    pub fn validate_for_save(&self) -> Result<(), ValidationErrors> {
        let agreements = self.agreements.clone().unwrap_or_default();

        let failure = if is_blank(self.shop_name.as_deref()) {
            Some(FieldError::new(Field::ShopName, "Shop name is required"))
        } else if is_blank(self.trading_area.as_deref()) {
            Some(FieldError::new(Field::TradingArea, "Trading area is required"))
        } else if agreements.terms_accepted != Some(true) {
            Some(FieldError::new(
                Field::TermsAccepted,
                "Please accept the seller terms",
            ))
        } else if agreements.no_prohibited_items != Some(true) {
            Some(FieldError::new(
                Field::NoProhibitedItems,
                "Please confirm you will not sell prohibited items",
            ))
        } else {
            None
        };

        failure.map_or(Ok(()), |e| Err(e.into()))
    }

    /// Mutable contact methods, created on first use.
    pub fn contact_methods_mut(&mut self) -> &mut ContactMethods {
        self.contact_methods.get_or_insert_with(ContactMethods::default)
    }

    /// Mutable payment methods, created on first use.
    pub fn payment_methods_mut(&mut self) -> &mut PaymentMethods {
        self.payment_methods.get_or_insert_with(PaymentMethods::default)
    }

    /// Mutable agreements, created on first use.
    pub fn agreements_mut(&mut self) -> &mut SellerAgreements {
        self.agreements.get_or_insert_with(SellerAgreements::default)
    }
}

/// Profile completion as reported by the server. Never computed locally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    /// 0-100. The server may send a fraction; it is rounded on read.
    #[serde(default, deserialize_with = "deserialize_percentage")]
    pub percentage: u8,
    /// Human-readable names of sections still missing.
    #[serde(default)]
    pub missing_fields: Vec<String>,
}

impl Completion {
    /// Whether the profile is complete.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.percentage >= 100
    }
}

/// Accept any JSON number (or null) and clamp it into 0-100.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn deserialize_percentage<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?.unwrap_or_default();
    if value.is_nan() {
        return Ok(0);
    }
    Ok(value.round().clamp(0.0, 100.0) as u8)
}
