//! Profile aggregate editor.
//!
//! [`ProfileEditor`] holds the form state of the three profile sections
//! (basic info, address book, seller info) and runs their saves. Each save
//! goes `Idle → Validating → Saving → Idle`. A rejected validation returns
//! to `Idle` with field errors and sends nothing. A settled write always
//! reloads the whole aggregate before returning to `Idle`; a failed reload
//! reports its own error but the save itself still counts as done.
//!
//! All sections share one `saving` flag and one error/success message pair.
//! Saves from different sections are not blocked from overlapping.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chodocu_core::{
    AddressDraft, AddressId, AuthContext, BasicInfo, Field, PostalAddress, ProfileAggregate,
    SellerInfo, ShippingAddress, ShippingAddressPatch, ValidationErrors,
};
use tracing::{debug, info, instrument};

use crate::address::{AddressBook, Reload, pickup_candidate};
use crate::error::ClientError;
use crate::store::{ProfileStore, reload_profile};

/// How long a success message stays visible.
pub const SUCCESS_MESSAGE_TTL: Duration = Duration::from_secs(3);

const ADDRESS_INCOMPLETE: &str = "Please fill in all address fields";

// =============================================================================
// State
// =============================================================================

/// One of the three editable sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    BasicInfo,
    Addresses,
    SellerInfo,
}

/// Where a section is in its save cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SectionPhase {
    #[default]
    Idle,
    Validating,
    Saving,
}

/// Phase and field errors of one section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionState {
    pub phase: SectionPhase,
    pub field_errors: ValidationErrors,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Sections {
    basic_info: SectionState,
    addresses: SectionState,
    seller_info: SectionState,
}

impl Sections {
    const fn get(&self, section: Section) -> &SectionState {
        match section {
            Section::BasicInfo => &self.basic_info,
            Section::Addresses => &self.addresses,
            Section::SellerInfo => &self.seller_info,
        }
    }

    const fn get_mut(&mut self, section: Section) -> &mut SectionState {
        match section {
            Section::BasicInfo => &mut self.basic_info,
            Section::Addresses => &mut self.addresses,
            Section::SellerInfo => &mut self.seller_info,
        }
    }
}

/// A success message and when it was shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessMessage {
    pub text: String,
    pub shown_at: Instant,
}

/// Everything the profile page renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorState {
    /// Last aggregate loaded from the store.
    pub profile: Option<ProfileAggregate>,
    /// Basic info form.
    pub basic_info: BasicInfo,
    /// Seller info form.
    pub seller_info: SellerInfo,
    /// Form for the next address to add.
    pub new_address: AddressDraft,
    pub loading: bool,
    pub saving: bool,
    pub error: Option<String>,
    pub success: Option<SuccessMessage>,
    sections: Sections,
}

impl EditorState {
    /// Addresses of the last loaded aggregate.
    #[must_use]
    pub fn shipping_addresses(&self) -> &[ShippingAddress] {
        self.profile
            .as_ref()
            .map(|p| p.shipping_addresses.as_slice())
            .unwrap_or_default()
    }

    /// Phase and field errors of `section`.
    #[must_use]
    pub const fn section(&self, section: Section) -> &SectionState {
        self.sections.get(section)
    }

    /// Message for `field` in `section`, if it failed validation.
    #[must_use]
    pub fn field_error(&self, section: Section, field: Field) -> Option<&str> {
        self.section(section).field_errors.message_for(field)
    }

    /// Replace the forms with a freshly loaded aggregate.
    ///
    /// A seller without a pickup address gets the current pickup default
    /// preselected.
    fn apply_profile(&mut self, profile: ProfileAggregate) {
        self.basic_info = profile.basic_info.clone();
        self.seller_info = profile.seller_info.clone();
        if self.seller_info.pickup_address_id.is_none() {
            self.seller_info.pickup_address_id =
                pickup_candidate(&profile.shipping_addresses).and_then(|a| a.id.clone());
        }
        self.profile = Some(profile);
    }
}

/// Contact channel toggles of the seller form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactMethod {
    InternalChat,
    Phone,
    ShowPhone,
}

/// Payment toggles of the seller form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    EWallet,
    BankTransfer,
}

/// Seller commitments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Agreement {
    Terms,
    NoProhibitedItems,
}

// =============================================================================
// Editor
// =============================================================================

/// Editor over the profile aggregate of one authenticated principal.
pub struct ProfileEditor {
    auth: AuthContext,
    store: Arc<dyn ProfileStore>,
    book: AddressBook,
    state: Mutex<EditorState>,
    mounted: AtomicBool,
}

impl ProfileEditor {
    #[must_use]
    pub fn new(auth: AuthContext, store: Arc<dyn ProfileStore>) -> Self {
        Self {
            auth,
            book: AddressBook::new(store.clone()),
            store,
            state: Mutex::new(EditorState::default()),
            mounted: AtomicBool::new(true),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EditorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current state.
    #[must_use]
    pub fn state(&self) -> EditorState {
        self.lock().clone()
    }

    /// The address book, for inline editing of stored addresses.
    #[must_use]
    pub const fn book(&self) -> &AddressBook {
        &self.book
    }

    /// Stop applying results. Requests still in flight finish, but their
    /// outcome is dropped.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::Release);
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    fn session(&self) -> Result<&AuthContext, ClientError> {
        if self.auth.is_expired() {
            self.lock().error = Some(ClientError::Unauthenticated.user_message());
            return Err(ClientError::Unauthenticated);
        }
        Ok(&self.auth)
    }

    // =========================================================================
    // Handlers
    // =========================================================================

    /// Load the aggregate and reset the forms from it.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` for an expired session and `Request` when
    /// the store fails. Either way the message is also recorded in state.
    #[instrument(skip(self))]
    pub async fn load_profile(&self) -> Result<(), ClientError> {
        let auth = self.session()?;
        {
            let mut state = self.lock();
            state.loading = true;
            state.error = None;
        }

        let result = reload_profile(self.store.as_ref(), auth).await;

        if !self.is_mounted() {
            debug!("Editor unmounted, dropping profile load");
            return result.map(drop).map_err(Into::into);
        }
        let mut state = self.lock();
        state.loading = false;
        match result {
            Ok(profile) => {
                state.apply_profile(profile);
                Ok(())
            }
            Err(e) => {
                let e = ClientError::from(e);
                state.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Validate and save the basic info form.
    ///
    /// # Errors
    ///
    /// Returns `Validation` (field errors only, nothing sent), or the store
    /// failure.
    #[instrument(skip(self))]
    pub async fn save_basic_info(&self) -> Result<(), ClientError> {
        let auth = self.session()?;
        let update = self.validate(Section::BasicInfo, |s| s.basic_info.validate_for_save())?;

        self.begin_save(Section::BasicInfo);
        let outcome = match self.store.update_basic_info(auth, &update).await {
            Ok(()) => Ok(self.reload().await),
            Err(e) => Err(e.into()),
        };
        self.settle(Section::BasicInfo, outcome, "Basic info updated")
    }

    /// Validate and create the new-address form, then clear it.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an incomplete form, or the store failure.
    #[instrument(skip(self))]
    pub async fn add_address(&self) -> Result<(), ClientError> {
        let auth = self.session()?;
        let (draft, current) = self.validate(Section::Addresses, |s| {
            s.new_address.validate()?;
            Ok((s.new_address.clone(), s.shipping_addresses().to_vec()))
        })?;

        self.begin_save(Section::Addresses);
        let outcome = self.book.add(auth, &current, &draft).await;
        self.settle(Section::Addresses, outcome, "Address added")?;
        if self.is_mounted() {
            self.lock().new_address = AddressDraft::default();
        }
        Ok(())
    }

    /// Send `patch` to address `id`.
    ///
    /// # Errors
    ///
    /// Returns the store failure.
    #[instrument(skip(self, patch))]
    pub async fn update_address(
        &self,
        id: &AddressId,
        patch: &ShippingAddressPatch,
    ) -> Result<(), ClientError> {
        let auth = self.session()?;
        self.begin_save(Section::Addresses);
        let outcome = self.book.update(auth, id, patch).await;
        self.settle(Section::Addresses, outcome, "Address updated")
    }

    /// Validate and save the address open in the book's inline editor.
    /// Does nothing when no address is being edited.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an incomplete draft, or the store failure.
    pub async fn save_address_edit(&self) -> Result<(), ClientError> {
        self.session()?;
        let Some(editing) = self.book.editing() else {
            return Ok(());
        };
        self.validate(Section::Addresses, |_| editing.draft.validate())?;
        self.update_address(&editing.id, &editing.draft.to_patch())
            .await
    }

    /// Delete address `id`.
    ///
    /// # Errors
    ///
    /// Returns the store failure.
    #[instrument(skip(self))]
    pub async fn delete_address(&self, id: &AddressId) -> Result<(), ClientError> {
        let auth = self.session()?;
        self.begin_save(Section::Addresses);
        let outcome = self.book.delete(auth, id).await;
        self.settle(Section::Addresses, outcome, "Address deleted")
    }

    /// Make `id` the default shipping address.
    ///
    /// # Errors
    ///
    /// Returns the failure of the first failing store call.
    #[instrument(skip(self))]
    pub async fn set_default_shipping(&self, id: &AddressId) -> Result<(), ClientError> {
        let auth = self.session()?;
        let current = self.begin_save(Section::Addresses);
        let outcome = self.book.set_default_shipping(auth, &current, id).await;
        self.settle(Section::Addresses, outcome, "Default shipping address set")
    }

    /// Make `id` the default pickup address.
    ///
    /// # Errors
    ///
    /// Returns the failure of the first failing store call.
    #[instrument(skip(self))]
    pub async fn set_default_pickup(&self, id: &AddressId) -> Result<(), ClientError> {
        let auth = self.session()?;
        let current = self.begin_save(Section::Addresses);
        let outcome = self.book.set_default_pickup(auth, &current, id).await;
        self.settle(Section::Addresses, outcome, "Default pickup address set")
    }

    /// Validate and save the seller info form.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for the first failing check (also shown as the
    /// error message), or the store failure.
    #[instrument(skip(self))]
    pub async fn save_seller_info(&self) -> Result<(), ClientError> {
        let auth = self.session()?;
        let info = self.validate(Section::SellerInfo, |s| {
            s.seller_info.validate_for_save()?;
            Ok(s.seller_info.clone())
        })?;

        self.begin_save(Section::SellerInfo);
        let outcome = match self.store.update_seller_info(auth, &info).await {
            Ok(()) => Ok(self.reload().await),
            Err(e) => Err(e.into()),
        };
        self.settle(Section::SellerInfo, outcome, "Seller info updated")
    }

    async fn reload(&self) -> Reload {
        reload_profile(self.store.as_ref(), &self.auth).await
    }

    /// Run `check` against the current forms with `section` in `Validating`.
    /// A failure records the field errors and returns the section to `Idle`.
    fn validate<T>(
        &self,
        section: Section,
        check: impl FnOnce(&EditorState) -> Result<T, ValidationErrors>,
    ) -> Result<T, ClientError> {
        let mut state = self.lock();
        state.sections.get_mut(section).phase = SectionPhase::Validating;
        state.error = None;
        state.success = None;

        let result = check(&state);
        let entry = state.sections.get_mut(section);
        match result {
            Ok(value) => {
                entry.field_errors = ValidationErrors::new();
                Ok(value)
            }
            Err(errors) => {
                entry.phase = SectionPhase::Idle;
                entry.field_errors = errors.clone();
                state.error = match section {
                    Section::BasicInfo => None,
                    Section::Addresses => Some(ADDRESS_INCOMPLETE.to_string()),
                    Section::SellerInfo => errors.errors().first().map(|e| e.message.clone()),
                };
                debug!(?section, %errors, "Validation rejected save");
                Err(errors.into())
            }
        }
    }

    /// Enter `Saving`. Returns the current address list for handlers that
    /// need it.
    fn begin_save(&self, section: Section) -> Vec<ShippingAddress> {
        let mut state = self.lock();
        state.saving = true;
        state.error = None;
        state.success = None;
        state.sections.get_mut(section).phase = SectionPhase::Saving;
        state.shipping_addresses().to_vec()
    }

    /// Record the outcome of a save and return `section` to `Idle`.
    fn settle(
        &self,
        section: Section,
        outcome: Result<Reload, ClientError>,
        success: &str,
    ) -> Result<(), ClientError> {
        if !self.is_mounted() {
            debug!(?section, "Editor unmounted, dropping save result");
            return outcome.map(drop);
        }

        let mut state = self.lock();
        state.saving = false;
        state.sections.get_mut(section).phase = SectionPhase::Idle;
        match outcome {
            Ok(reload) => {
                info!(?section, "Profile section saved");
                state.success = Some(SuccessMessage {
                    text: success.to_string(),
                    shown_at: Instant::now(),
                });
                match reload {
                    Ok(profile) => state.apply_profile(profile),
                    Err(e) => state.error = Some(ClientError::from(e).user_message()),
                }
                Ok(())
            }
            Err(e) => {
                state.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    // =========================================================================
    // Messages
    // =========================================================================

    /// The success message, unless it has expired.
    #[must_use]
    pub fn success_message(&self) -> Option<String> {
        self.success_message_at(Instant::now())
    }

    /// The success message as seen at `now`.
    #[must_use]
    pub fn success_message_at(&self, now: Instant) -> Option<String> {
        self.lock()
            .success
            .as_ref()
            .filter(|m| now.saturating_duration_since(m.shown_at) < SUCCESS_MESSAGE_TTL)
            .map(|m| m.text.clone())
    }

    pub fn clear_error(&self) {
        self.lock().error = None;
    }

    pub fn clear_success(&self) {
        self.lock().success = None;
    }

    // =========================================================================
    // Form setters
    // =========================================================================

    fn edit(&self, section: Section, field: Option<Field>, f: impl FnOnce(&mut EditorState)) {
        let mut state = self.lock();
        f(&mut state);
        if let Some(field) = field {
            state.sections.get_mut(section).field_errors.clear_field(field);
        }
    }

    pub fn set_full_name(&self, value: impl Into<String>) {
        let value = value.into();
        self.edit(Section::BasicInfo, Some(Field::FullName), |s| {
            s.basic_info.full_name = Some(value);
        });
    }

    pub fn set_phone(&self, value: impl Into<String>) {
        let value = value.into();
        self.edit(Section::BasicInfo, Some(Field::Phone), |s| {
            s.basic_info.phone = Some(value);
        });
    }

    pub fn set_avatar(&self, url: Option<String>) {
        self.edit(Section::BasicInfo, None, |s| s.basic_info.avatar = url);
    }

    pub fn set_postal_address(&self, address: Option<PostalAddress>) {
        self.edit(Section::BasicInfo, None, |s| s.basic_info.address = address);
    }

    pub fn set_shop_name(&self, value: impl Into<String>) {
        let value = value.into();
        self.edit(Section::SellerInfo, Some(Field::ShopName), |s| {
            s.seller_info.shop_name = Some(value);
        });
    }

    pub fn set_trading_area(&self, value: impl Into<String>) {
        let value = value.into();
        self.edit(Section::SellerInfo, Some(Field::TradingArea), |s| {
            s.seller_info.trading_area = Some(value);
        });
    }

    /// Choose the pickup address, or clear it with `None`.
    pub fn set_pickup_address(&self, id: Option<AddressId>) {
        self.edit(Section::SellerInfo, None, |s| {
            s.seller_info.pickup_address_id = id;
        });
    }

    pub fn set_contact_method(&self, method: ContactMethod, enabled: bool) {
        self.edit(Section::SellerInfo, None, |s| {
            let contact = s.seller_info.contact_methods_mut();
            let slot = match method {
                ContactMethod::InternalChat => &mut contact.internal_chat,
                ContactMethod::Phone => &mut contact.phone,
                ContactMethod::ShowPhone => &mut contact.show_phone,
            };
            *slot = Some(enabled);
        });
    }

    pub fn set_payment_method(&self, method: PaymentMethod, enabled: bool) {
        self.edit(Section::SellerInfo, None, |s| {
            let payment = s.seller_info.payment_methods_mut();
            let slot = match method {
                PaymentMethod::EWallet => &mut payment.e_wallet,
                PaymentMethod::BankTransfer => &mut payment.bank_transfer,
            };
            *slot = Some(enabled);
        });
    }

    pub fn set_bank_account(&self, account: impl Into<String>) {
        let account = account.into();
        self.edit(Section::SellerInfo, None, |s| {
            s.seller_info.payment_methods_mut().bank_account = Some(account);
        });
    }

    pub fn set_agreement(&self, agreement: Agreement, accepted: bool) {
        let field = match agreement {
            Agreement::Terms => Field::TermsAccepted,
            Agreement::NoProhibitedItems => Field::NoProhibitedItems,
        };
        self.edit(Section::SellerInfo, Some(field), |s| {
            let agreements = s.seller_info.agreements_mut();
            let slot = match agreement {
                Agreement::Terms => &mut agreements.terms_accepted,
                Agreement::NoProhibitedItems => &mut agreements.no_prohibited_items,
            };
            *slot = Some(accepted);
        });
    }

    /// Apply an address editor patch to the new-address form.
    pub fn edit_new_address(&self, patch: &ShippingAddressPatch) {
        let mut state = self.lock();
        state.new_address.apply(patch);
        let touched = [
            (Field::FullName, patch.full_name.is_some()),
            (Field::Phone, patch.phone.is_some()),
            (Field::Province, patch.province.is_some()),
            (Field::District, patch.district.is_some()),
            (Field::Ward, patch.ward.is_some()),
        ];
        let errors = &mut state.sections.get_mut(Section::Addresses).field_errors;
        for (field, _) in touched.into_iter().filter(|(_, t)| *t) {
            errors.clear_field(field);
        }
    }

    /// Blank the new-address form.
    pub fn reset_new_address(&self) {
        let mut state = self.lock();
        state.new_address = AddressDraft::default();
        state.sections.get_mut(Section::Addresses).field_errors = ValidationErrors::new();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chodocu_core::{DefaultKind, UserRole, check_default_exclusivity};

    use super::*;
    use crate::store::StoreError;
    use crate::testing::{RecordingStore, StoreCall, address, session};

    fn id(s: &str) -> AddressId {
        AddressId::new(s)
    }

    fn pickup(id: &str) -> ShippingAddress {
        ShippingAddress {
            is_default_pickup: true,
            ..address(id, "Nguyễn Văn A")
        }
    }

    async fn loaded(store: &Arc<RecordingStore>) -> Arc<ProfileEditor> {
        let editor = Arc::new(ProfileEditor::new(session(), store.clone()));
        editor.load_profile().await.unwrap();
        editor
    }

    fn fill_seller(editor: &ProfileEditor) {
        editor.set_shop_name("Đồ cũ Cầu Giấy");
        editor.set_trading_area("Hà Nội");
        editor.set_agreement(Agreement::Terms, true);
        editor.set_agreement(Agreement::NoProhibitedItems, true);
    }

    #[tokio::test]
    async fn test_load_profile_fills_forms_and_preselects_pickup() {
        let store = Arc::new(RecordingStore::with_addresses(vec![
            address("a", "Nguyễn Văn A"),
            pickup("b"),
        ]));
        let editor = loaded(&store).await;

        let state = editor.state();
        assert!(!state.loading);
        assert_eq!(state.shipping_addresses().len(), 2);
        assert_eq!(state.seller_info.pickup_address_id, Some(id("b")));
    }

    #[tokio::test]
    async fn test_stored_pickup_address_is_kept() {
        let mut profile = ProfileAggregate {
            shipping_addresses: vec![address("a", "Nguyễn Văn A"), pickup("b")],
            ..ProfileAggregate::default()
        };
        profile.seller_info.pickup_address_id = Some(id("a"));
        let store = Arc::new(RecordingStore::with_profile(profile));

        let editor = loaded(&store).await;
        assert_eq!(editor.state().seller_info.pickup_address_id, Some(id("a")));
    }

    #[tokio::test]
    async fn test_load_failure_sets_error() {
        let store = Arc::new(RecordingStore::default());
        store.fail_when(|_| true);
        let editor = ProfileEditor::new(session(), store.clone());

        assert!(editor.load_profile().await.is_err());
        let state = editor.state();
        assert_eq!(state.error.as_deref(), Some("Internal error"));
        assert!(!state.loading);
        assert!(state.profile.is_none());
    }

    #[tokio::test]
    async fn test_basic_info_bad_phone_sends_nothing() {
        let store = Arc::new(RecordingStore::default());
        let editor = loaded(&store).await;
        editor.set_full_name("Lê Văn C");
        editor.set_phone("09123");

        let err = editor.save_basic_info().await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));

        let state = editor.state();
        assert_eq!(
            state.field_error(Section::BasicInfo, Field::Phone),
            Some("Phone number is invalid")
        );
        assert_eq!(state.error, None);
        assert_eq!(state.section(Section::BasicInfo).phase, SectionPhase::Idle);
        assert!(store.mutations().is_empty());

        editor.set_phone("0912345678");
        assert_eq!(editor.state().field_error(Section::BasicInfo, Field::Phone), None);
    }

    #[tokio::test]
    async fn test_save_basic_info_reloads_and_reports_success() {
        let store = Arc::new(RecordingStore::default());
        let editor = loaded(&store).await;
        editor.set_full_name("Lê Văn C");
        editor.set_phone("0912345678");

        editor.save_basic_info().await.unwrap();

        assert!(matches!(
            store.mutations().as_slice(),
            [StoreCall::UpdateBasicInfo(update)] if update.phone == "0912345678"
        ));
        assert_eq!(store.reloads(), 2);
        let state = editor.state();
        assert!(!state.saving);
        assert_eq!(
            state.profile.unwrap().basic_info.full_name.as_deref(),
            Some("Lê Văn C")
        );
        assert_eq!(editor.success_message().as_deref(), Some("Basic info updated"));
    }

    #[tokio::test]
    async fn test_seller_validation_short_circuits_with_message() {
        let store = Arc::new(RecordingStore::default());
        let editor = loaded(&store).await;
        editor.set_shop_name("Đồ cũ Cầu Giấy");
        editor.set_trading_area("Hà Nội");
        editor.set_agreement(Agreement::Terms, true);

        assert!(editor.save_seller_info().await.is_err());

        let state = editor.state();
        assert_eq!(
            state.error.as_deref(),
            Some("Please confirm you will not sell prohibited items")
        );
        assert_eq!(
            state.section(Section::SellerInfo).field_errors.errors().len(),
            1
        );
        assert!(store.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_save_seller_info() {
        let store = Arc::new(RecordingStore::with_addresses(vec![pickup("b")]));
        let editor = loaded(&store).await;
        fill_seller(&editor);
        editor.set_contact_method(ContactMethod::InternalChat, true);
        editor.set_payment_method(PaymentMethod::BankTransfer, true);
        editor.set_bank_account("0123456789 VCB");

        editor.save_seller_info().await.unwrap();

        let saved = store.profile().seller_info;
        assert_eq!(saved.shop_name.as_deref(), Some("Đồ cũ Cầu Giấy"));
        assert_eq!(saved.pickup_address_id, Some(id("b")));
        assert_eq!(
            saved.contact_methods.unwrap().internal_chat,
            Some(true)
        );
        assert_eq!(
            saved.payment_methods.unwrap().bank_account.as_deref(),
            Some("0123456789 VCB")
        );
    }

    #[tokio::test]
    async fn test_add_address_without_phone_is_rejected_locally() {
        let store = Arc::new(RecordingStore::default());
        let editor = loaded(&store).await;
        editor.edit_new_address(&ShippingAddressPatch {
            full_name: Some("Trần Thị B".to_string()),
            province: Some("Hà Nội".to_string()),
            district: Some("Cầu Giấy".to_string()),
            ward: Some("Dịch Vọng".to_string()),
            ..ShippingAddressPatch::default()
        });

        assert!(editor.add_address().await.is_err());

        let state = editor.state();
        assert_eq!(state.error.as_deref(), Some(ADDRESS_INCOMPLETE));
        assert!(
            state
                .field_error(Section::Addresses, Field::Phone)
                .is_some()
        );
        assert!(!store.mutations().iter().any(|c| matches!(c, StoreCall::AddAddress(_))));
    }

    #[tokio::test]
    async fn test_add_address_clears_form() {
        let store = Arc::new(RecordingStore::default());
        let editor = loaded(&store).await;
        let draft = AddressDraft::from_address(&address("x", "Trần Thị B"));
        editor.edit_new_address(&draft.to_patch());

        editor.add_address().await.unwrap();

        let state = editor.state();
        assert_eq!(state.new_address, AddressDraft::default());
        assert_eq!(state.shipping_addresses().len(), 1);
        assert_eq!(editor.success_message().as_deref(), Some("Address added"));
    }

    #[tokio::test]
    async fn test_set_default_pickup_through_editor() {
        let store = Arc::new(RecordingStore::with_addresses(vec![
            pickup("a"),
            address("b", "Trần Thị B"),
        ]));
        let editor = loaded(&store).await;

        editor.set_default_pickup(&id("b")).await.unwrap();

        let state = editor.state();
        let book = state.shipping_addresses();
        assert!(check_default_exclusivity(book).is_ok());
        assert_eq!(
            state
                .profile
                .as_ref()
                .and_then(|p| p.default_address(DefaultKind::Pickup))
                .and_then(|a| a.id.clone()),
            Some(id("b"))
        );
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_state() {
        let store = Arc::new(RecordingStore::with_addresses(vec![address(
            "a",
            "Nguyễn Văn A",
        )]));
        let editor = loaded(&store).await;
        let before = editor.state().profile;
        store.fail_when(|call| matches!(call, StoreCall::DeleteAddress(_)));

        let err = editor.delete_address(&id("a")).await.unwrap_err();

        assert!(matches!(err, ClientError::Request(StoreError::Api { .. })));
        let state = editor.state();
        assert_eq!(state.profile, before);
        assert_eq!(state.error.as_deref(), Some("Internal error"));
        assert!(!state.saving);
        assert_eq!(state.section(Section::Addresses).phase, SectionPhase::Idle);
        assert_eq!(editor.success_message(), None);
    }

    #[tokio::test]
    async fn test_reload_failure_does_not_reopen_save() {
        let store = Arc::new(RecordingStore::default());
        let editor = loaded(&store).await;
        fill_seller(&editor);
        store.fail_when(|call| *call == StoreCall::GetProfile);

        editor.save_seller_info().await.unwrap();

        let state = editor.state();
        assert!(!state.saving);
        assert_eq!(state.section(Section::SellerInfo).phase, SectionPhase::Idle);
        assert_eq!(state.error.as_deref(), Some("Internal error"));
        assert!(state.success.is_some());
    }

    #[tokio::test]
    async fn test_saving_flag_held_until_reload_settles() {
        let store = Arc::new(RecordingStore::default());
        let editor = loaded(&store).await;
        editor.set_full_name("Lê Văn C");
        editor.set_phone("0912345678");

        let gate = store.gate_reload();
        let task = tokio::spawn({
            let editor = editor.clone();
            async move { editor.save_basic_info().await }
        });
        store
            .wait_for_call(|c| matches!(c, StoreCall::UpdateBasicInfo(_)))
            .await;

        let state = editor.state();
        assert!(state.saving);
        assert_eq!(state.section(Section::BasicInfo).phase, SectionPhase::Saving);

        gate.open();
        task.await.unwrap().unwrap();
        assert!(!editor.state().saving);
    }

    #[tokio::test]
    async fn test_unmounted_editor_drops_late_result() {
        let store = Arc::new(RecordingStore::default());
        let editor = loaded(&store).await;
        fill_seller(&editor);

        let gate = store.gate_reload();
        let task = tokio::spawn({
            let editor = editor.clone();
            async move { editor.save_seller_info().await }
        });
        store
            .wait_for_call(|c| matches!(c, StoreCall::UpdateSellerInfo(_)))
            .await;
        editor.unmount();
        gate.open();
        task.await.unwrap().unwrap();

        let state = editor.state();
        assert!(state.success.is_none());
        assert_eq!(
            state.profile.unwrap().seller_info,
            SellerInfo::default()
        );
    }

    #[tokio::test]
    async fn test_expired_session_sends_nothing() {
        let store = Arc::new(RecordingStore::default());
        let auth = AuthContext::new("t", UserRole::User, "a@b.vn")
            .with_expiry(chrono::Utc::now() - chrono::Duration::minutes(5));
        let editor = ProfileEditor::new(auth, store.clone());

        assert!(matches!(
            editor.load_profile().await,
            Err(ClientError::Unauthenticated)
        ));
        assert!(matches!(
            editor.delete_address(&id("a")).await,
            Err(ClientError::Unauthenticated)
        ));
        assert!(store.calls().is_empty());
        assert!(editor.state().error.unwrap().contains("log in"));
    }

    #[tokio::test]
    async fn test_success_message_expires() {
        let store = Arc::new(RecordingStore::default());
        let editor = loaded(&store).await;
        fill_seller(&editor);
        editor.save_seller_info().await.unwrap();

        let shown_at = editor.state().success.unwrap().shown_at;
        assert!(editor.success_message_at(shown_at).is_some());
        assert!(
            editor
                .success_message_at(shown_at + SUCCESS_MESSAGE_TTL)
                .is_none()
        );

        editor.clear_success();
        assert!(editor.success_message().is_none());
    }

    #[tokio::test]
    async fn test_inline_edit_saved_through_editor() {
        let store = Arc::new(RecordingStore::with_addresses(vec![address(
            "a",
            "Nguyễn Văn A",
        )]));
        let editor = loaded(&store).await;
        let stored = editor.state().shipping_addresses().first().cloned().unwrap();
        editor.book().begin_edit(&stored);
        editor.book().edit_draft(&ShippingAddressPatch {
            street: Some("1 Trần Duy Hưng".to_string()),
            ..ShippingAddressPatch::default()
        });

        editor.save_address_edit().await.unwrap();

        assert_eq!(
            store.address("a").street.as_deref(),
            Some("1 Trần Duy Hưng")
        );
        assert!(editor.book().editing().is_none());
        assert_eq!(editor.success_message().as_deref(), Some("Address updated"));
    }
}
