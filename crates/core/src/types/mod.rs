//! Core types for the marketplace client.
//!
//! This module provides type-safe wrappers for the domain concepts the client
//! core edits: regions, shipping addresses and the profile aggregate.

pub mod address;
pub mod auth;
pub mod email;
pub mod id;
pub mod phone;
pub mod profile;
pub mod region;
pub mod role;
pub mod validation;

pub use address::{
    AddressDraft, DefaultKind, DefaultConflict, NewShippingAddress, ShippingAddress,
    ShippingAddressPatch, check_default_exclusivity, find_default_holder,
};
pub use auth::{Access, AuthContext, Credentials, CredentialsError, guard};
pub use email::{Email, EmailError};
pub use id::*;
pub use phone::{PhoneError, PhoneNumber};
pub use profile::{
    BasicInfo, BasicInfoUpdate, Completion, ContactMethods, PaymentMethods, PostalAddress,
    ProfileAggregate, SellerAgreements, SellerInfo,
};
pub use region::{Region, RegionLevel, resolve_hint};
pub use role::UserRole;
pub use validation::{Field, FieldError, ValidationErrors};
