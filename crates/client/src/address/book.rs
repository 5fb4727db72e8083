//! Address book manager.
//!
//! The book never keeps its own copy of the addresses. Callers pass the
//! current list from the last aggregate they loaded, and every successful
//! write is followed by a full reload whose result is handed back.
//!
//! Default flags are kept exclusive by clearing the current holder before
//! setting the new one. These are two separate store calls; a failure
//! between them is reported and not compensated.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chodocu_core::{
    AddressDraft, AddressId, AuthContext, DefaultKind, ProfileAggregate, ShippingAddress,
    ShippingAddressPatch, find_default_holder,
};
use tracing::{debug, info, instrument, warn};

use crate::error::ClientError;
use crate::store::{ProfileStore, StoreError, reload_profile};

/// Outcome of the reload that follows a successful write.
///
/// The write itself succeeded either way; a failed reload only means the
/// caller is still looking at the previous aggregate.
pub type Reload = Result<ProfileAggregate, StoreError>;

/// The address currently open for inline editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditingAddress {
    pub id: AddressId,
    pub draft: AddressDraft,
}

/// Writes to the address book of one principal.
pub struct AddressBook {
    store: Arc<dyn ProfileStore>,
    editing: Mutex<Option<EditingAddress>>,
}

impl AddressBook {
    #[must_use]
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self {
            store,
            editing: Mutex::new(None),
        }
    }

    fn editing_lock(&self) -> MutexGuard<'_, Option<EditingAddress>> {
        self.editing.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn reload(&self, auth: &AuthContext) -> Reload {
        reload_profile(self.store.as_ref(), auth).await
    }

    /// Clear the `kind` flag on its current holder, if there is one other
    /// than `excluding`. Returns whether a call was made.
    async fn clear_default(
        &self,
        auth: &AuthContext,
        current: &[ShippingAddress],
        kind: DefaultKind,
        excluding: Option<&AddressId>,
    ) -> Result<bool, StoreError> {
        let Some(id) = find_default_holder(current, kind, excluding).and_then(|a| a.id.as_ref())
        else {
            return Ok(false);
        };
        debug!(%id, %kind, "Clearing previous default");
        self.store
            .update_shipping_address(auth, id, &ShippingAddressPatch::default_flag(kind, false))
            .await?;
        Ok(true)
    }

    /// Create an address from `draft`.
    ///
    /// Each default flag the draft requests is first cleared on its current
    /// holder. Nothing is sent when the draft is incomplete.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an incomplete draft, `Request` when a store
    /// call fails. The reload outcome is returned inside `Ok`.
    #[instrument(skip_all)]
    pub async fn add(
        &self,
        auth: &AuthContext,
        current: &[ShippingAddress],
        draft: &AddressDraft,
    ) -> Result<Reload, ClientError> {
        let address = draft.validate()?;

        for kind in DefaultKind::ALL {
            if address.requests_default(kind) {
                self.clear_default(auth, current, kind, None).await?;
            }
        }
        self.store.add_shipping_address(auth, &address).await?;
        info!("Shipping address added");

        Ok(self.reload(auth).await)
    }

    /// Send `patch` to address `id` as-is.
    ///
    /// Default flags in the patch are not made exclusive here; use
    /// [`AddressBook::set_default`] for that.
    ///
    /// # Errors
    ///
    /// Returns `Request` when the store call fails.
    #[instrument(skip(self, auth, patch))]
    pub async fn update(
        &self,
        auth: &AuthContext,
        id: &AddressId,
        patch: &ShippingAddressPatch,
    ) -> Result<Reload, ClientError> {
        self.store.update_shipping_address(auth, id, patch).await?;
        info!("Shipping address updated");
        self.finish_edit(id);
        Ok(self.reload(auth).await)
    }

    /// Make `id` the `kind` default: clear the current holder, then set the
    /// flag on `id`, then reload.
    ///
    /// # Errors
    ///
    /// Returns `Request` for the first failing call. When the set step fails
    /// after a successful clear, the book is left without a `kind` default.
    #[instrument(skip(self, auth, current))]
    pub async fn set_default(
        &self,
        auth: &AuthContext,
        current: &[ShippingAddress],
        kind: DefaultKind,
        id: &AddressId,
    ) -> Result<Reload, ClientError> {
        let cleared = self.clear_default(auth, current, kind, Some(id)).await?;

        let set = ShippingAddressPatch::default_flag(kind, true);
        if let Err(e) = self.store.update_shipping_address(auth, id, &set).await {
            if cleared {
                warn!(error = %e, "Default swap stopped after clearing the previous holder");
            }
            return Err(e.into());
        }
        info!("Default address set");

        Ok(self.reload(auth).await)
    }

    /// [`AddressBook::set_default`] for the shipping flag.
    ///
    /// # Errors
    ///
    /// See [`AddressBook::set_default`].
    pub async fn set_default_shipping(
        &self,
        auth: &AuthContext,
        current: &[ShippingAddress],
        id: &AddressId,
    ) -> Result<Reload, ClientError> {
        self.set_default(auth, current, DefaultKind::Shipping, id).await
    }

    /// [`AddressBook::set_default`] for the pickup flag.
    ///
    /// # Errors
    ///
    /// See [`AddressBook::set_default`].
    pub async fn set_default_pickup(
        &self,
        auth: &AuthContext,
        current: &[ShippingAddress],
        id: &AddressId,
    ) -> Result<Reload, ClientError> {
        self.set_default(auth, current, DefaultKind::Pickup, id).await
    }

    /// Delete address `id`. No other address is promoted to take over its
    /// default flags.
    ///
    /// # Errors
    ///
    /// Returns `Request` when the store call fails.
    #[instrument(skip(self, auth))]
    pub async fn delete(&self, auth: &AuthContext, id: &AddressId) -> Result<Reload, ClientError> {
        self.store.delete_shipping_address(auth, id).await?;
        info!("Shipping address deleted");
        self.finish_edit(id);
        Ok(self.reload(auth).await)
    }

    // =========================================================================
    // Inline editing
    // =========================================================================

    /// Open `address` for editing, replacing any edit in progress. Returns
    /// `None` for an address that was never stored.
    pub fn begin_edit(&self, address: &ShippingAddress) -> Option<AddressDraft> {
        let id = address.id.clone()?;
        let draft = AddressDraft::from_address(address);
        *self.editing_lock() = Some(EditingAddress {
            id,
            draft: draft.clone(),
        });
        Some(draft)
    }

    /// The edit in progress.
    #[must_use]
    pub fn editing(&self) -> Option<EditingAddress> {
        self.editing_lock().clone()
    }

    /// Apply an editor patch to the edit in progress. Returns `false` when
    /// nothing is being edited.
    pub fn edit_draft(&self, patch: &ShippingAddressPatch) -> bool {
        let mut editing = self.editing_lock();
        let Some(current) = editing.as_mut() else {
            return false;
        };
        current.draft.apply(patch);
        true
    }

    /// Drop the edit in progress without saving.
    pub fn cancel_edit(&self) {
        *self.editing_lock() = None;
    }

    fn finish_edit(&self, id: &AddressId) {
        let mut editing = self.editing_lock();
        if editing.as_ref().is_some_and(|e| &e.id == id) {
            *editing = None;
        }
    }

    /// Validate and save the edit in progress. Returns `Ok(None)` when
    /// nothing is being edited. The edit stays open if saving fails.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an incomplete draft, `Request` when the store
    /// call fails.
    pub async fn save_edit(&self, auth: &AuthContext) -> Result<Option<Reload>, ClientError> {
        let Some(EditingAddress { id, draft }) = self.editing() else {
            return Ok(None);
        };
        draft.validate()?;
        self.update(auth, &id, &draft.to_patch()).await.map(Some)
    }
}

/// The address a seller form should preselect for pickups: the current
/// pickup default.
#[must_use]
pub fn pickup_candidate(addresses: &[ShippingAddress]) -> Option<&ShippingAddress> {
    find_default_holder(addresses, DefaultKind::Pickup, None)
}
