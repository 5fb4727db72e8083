//! In-memory collaborators for unit tests.
//!
//! `FakeCatalog` serves a fixed region tree and can hold individual loads
//! behind a [`Gate`]; `RecordingStore` keeps a profile in memory, applies
//! mutations to it and records every call.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chodocu_core::{
    AddressId, AuthContext, BasicInfoUpdate, NewShippingAddress, ProfileAggregate, Region,
    RegionCode, SellerInfo, ShippingAddress, ShippingAddressPatch, UserRole,
};
use tokio::sync::Notify;

use crate::region::{RegionCatalog, RegionError};
use crate::store::{ProfileStore, StoreError};

/// Holds one call until [`Gate::open`] is called.
#[derive(Clone, Default)]
pub struct Gate(Arc<Notify>);

impl Gate {
    /// Let the held call continue. Opening before the call arrives is fine.
    pub fn open(&self) {
        self.0.notify_one();
    }

    async fn pass(&self) {
        self.0.notified().await;
    }
}

/// Call log shared by the fakes, with a way to wait for a call to arrive.
struct CallLog<T> {
    calls: Mutex<Vec<T>>,
    arrived: Notify,
}

impl<T> Default for CallLog<T> {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            arrived: Notify::new(),
        }
    }
}

impl<T: Clone> CallLog<T> {
    fn record(&self, call: T) {
        self.calls.lock().unwrap().push(call);
        self.arrived.notify_waiters();
    }

    fn all(&self) -> Vec<T> {
        self.calls.lock().unwrap().clone()
    }

    async fn wait_for(&self, found: impl Fn(&T) -> bool) {
        loop {
            let arrived = self.arrived.notified();
            if self.calls.lock().unwrap().iter().any(&found) {
                return;
            }
            arrived.await;
        }
    }
}

// =============================================================================
// FakeCatalog
// =============================================================================

/// Region catalog over a fixed tree. Calls are logged as `provinces`,
/// `districts:{code}` and `wards:{code}`.
#[derive(Default)]
pub struct FakeCatalog {
    provinces: Vec<Region>,
    districts: HashMap<String, Vec<Region>>,
    wards: HashMap<String, Vec<Region>>,
    failing: Mutex<HashSet<String>>,
    gates: Mutex<HashMap<String, Gate>>,
    log: CallLog<String>,
}

impl FakeCatalog {
    /// Hà Nội (01) → Cầu Giấy (001) → Dịch Vọng (00001).
    pub fn hanoi() -> Self {
        Self::default()
            .with_province("01", "Hà Nội")
            .with_districts("01", &[("001", "Cầu Giấy")])
            .with_wards("001", &[("00001", "Dịch Vọng")])
    }

    pub fn with_province(mut self, code: &str, name: &str) -> Self {
        self.provinces.push(Region::new(code, name));
        self
    }

    pub fn with_districts(mut self, province: &str, districts: &[(&str, &str)]) -> Self {
        self.districts
            .insert(province.to_string(), regions(districts));
        self
    }

    pub fn with_wards(mut self, district: &str, wards: &[(&str, &str)]) -> Self {
        self.wards.insert(district.to_string(), regions(wards));
        self
    }

    /// Make the call logged as `key` fail.
    pub fn fail(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_string());
    }

    /// Hold the next call logged as `key` until the returned gate opens.
    /// Later calls with the same key pass straight through.
    pub fn gate(&self, key: &str) -> Gate {
        let gate = Gate::default();
        self.gates
            .lock()
            .unwrap()
            .insert(key.to_string(), gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.all()
    }

    /// Wait until the call logged as `key` has started.
    pub async fn wait_for_call(&self, key: &str) {
        self.log.wait_for(|c| c == key).await;
    }

    async fn serve(
        &self,
        key: String,
        list: Option<&Vec<Region>>,
    ) -> Result<Vec<Region>, RegionError> {
        self.log.record(key.clone());
        let gate = self.gates.lock().unwrap().remove(&key);
        if let Some(gate) = gate {
            gate.pass().await;
        }
        if self.failing.lock().unwrap().contains(&key) {
            return Err(RegionError::Api {
                status: 503,
                message: format!("{key} unavailable"),
            });
        }
        Ok(list.cloned().unwrap_or_default())
    }
}

fn regions(pairs: &[(&str, &str)]) -> Vec<Region> {
    pairs.iter().map(|(c, n)| Region::new(*c, *n)).collect()
}

#[async_trait]
impl RegionCatalog for FakeCatalog {
    async fn list_provinces(&self) -> Result<Vec<Region>, RegionError> {
        self.serve("provinces".to_string(), Some(&self.provinces)).await
    }

    async fn list_districts(&self, province: &RegionCode) -> Result<Vec<Region>, RegionError> {
        self.serve(
            format!("districts:{province}"),
            self.districts.get(province.as_str()),
        )
        .await
    }

    async fn list_wards(&self, district: &RegionCode) -> Result<Vec<Region>, RegionError> {
        self.serve(format!("wards:{district}"), self.wards.get(district.as_str()))
            .await
    }
}

// =============================================================================
// RecordingStore
// =============================================================================

/// One call received by [`RecordingStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    GetProfile,
    UpdateBasicInfo(BasicInfoUpdate),
    AddAddress(NewShippingAddress),
    UpdateAddress(AddressId, ShippingAddressPatch),
    DeleteAddress(AddressId),
    UpdateSellerInfo(SellerInfo),
}

type FailWhen = Box<dyn Fn(&StoreCall) -> bool + Send + Sync>;

/// Profile store holding one aggregate in memory.
#[derive(Default)]
pub struct RecordingStore {
    profile: Mutex<ProfileAggregate>,
    fail_when: Mutex<Option<FailWhen>>,
    reload_gate: Mutex<Option<Gate>>,
    next_id: AtomicU64,
    log: CallLog<StoreCall>,
}

impl RecordingStore {
    pub fn with_addresses(addresses: Vec<ShippingAddress>) -> Self {
        let store = Self::default();
        store.profile.lock().unwrap().shipping_addresses = addresses;
        store
    }

    pub fn with_profile(profile: ProfileAggregate) -> Self {
        let store = Self::default();
        *store.profile.lock().unwrap() = profile;
        store
    }

    /// Fail every call matching `predicate` with a 500. Failing calls are
    /// still recorded and change nothing.
    pub fn fail_when(&self, predicate: impl Fn(&StoreCall) -> bool + Send + Sync + 'static) {
        *self.fail_when.lock().unwrap() = Some(Box::new(predicate));
    }

    /// Hold the next `get_profile` until the returned gate opens.
    pub fn gate_reload(&self) -> Gate {
        let gate = Gate::default();
        *self.reload_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.log.all()
    }

    /// Every call except reloads.
    pub fn mutations(&self) -> Vec<StoreCall> {
        self.calls()
            .into_iter()
            .filter(|c| *c != StoreCall::GetProfile)
            .collect()
    }

    pub fn reloads(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| **c == StoreCall::GetProfile)
            .count()
    }

    pub async fn wait_for_call(&self, found: impl Fn(&StoreCall) -> bool) {
        self.log.wait_for(found).await;
    }

    /// The stored aggregate.
    pub fn profile(&self) -> ProfileAggregate {
        self.profile.lock().unwrap().clone()
    }

    pub fn address(&self, id: &str) -> ShippingAddress {
        self.profile()
            .address(&AddressId::new(id))
            .cloned()
            .unwrap()
    }

    fn record(&self, call: StoreCall) -> Result<(), StoreError> {
        let fails = self
            .fail_when
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|f| f(&call));
        self.log.record(call);
        if fails {
            return Err(StoreError::Api {
                status: 500,
                code: None,
                message: "Internal error".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for RecordingStore {
    async fn get_profile(&self, _auth: &AuthContext) -> Result<ProfileAggregate, StoreError> {
        self.record(StoreCall::GetProfile)?;
        let gate = self.reload_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        Ok(self.profile())
    }

    async fn update_basic_info(
        &self,
        _auth: &AuthContext,
        update: &BasicInfoUpdate,
    ) -> Result<(), StoreError> {
        self.record(StoreCall::UpdateBasicInfo(update.clone()))?;
        let mut profile = self.profile.lock().unwrap();
        profile.basic_info.full_name = Some(update.full_name.clone());
        profile.basic_info.phone = Some(update.phone.clone());
        profile.basic_info.avatar.clone_from(&update.avatar);
        profile.basic_info.address.clone_from(&update.address);
        Ok(())
    }

    async fn add_shipping_address(
        &self,
        _auth: &AuthContext,
        address: &NewShippingAddress,
    ) -> Result<(), StoreError> {
        self.record(StoreCall::AddAddress(address.clone()))?;
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.profile
            .lock()
            .unwrap()
            .shipping_addresses
            .push(ShippingAddress {
                id: Some(AddressId::new(format!("new-{n}"))),
                full_name: address.full_name.clone(),
                phone: address.phone.clone(),
                province: address.province.clone(),
                district: address.district.clone(),
                ward: address.ward.clone(),
                street: address.street.clone(),
                note: address.note.clone(),
                is_default_shipping: address.is_default_shipping,
                is_default_pickup: address.is_default_pickup,
            });
        Ok(())
    }

    async fn update_shipping_address(
        &self,
        _auth: &AuthContext,
        id: &AddressId,
        patch: &ShippingAddressPatch,
    ) -> Result<(), StoreError> {
        self.record(StoreCall::UpdateAddress(id.clone(), patch.clone()))?;
        let mut profile = self.profile.lock().unwrap();
        let Some(address) = profile.shipping_addresses.iter_mut().find(|a| a.has_id(id)) else {
            return Err(StoreError::Api {
                status: 404,
                code: Some("NOT_FOUND".to_string()),
                message: "Address not found".to_string(),
            });
        };
        patch.apply_to(address);
        Ok(())
    }

    async fn delete_shipping_address(
        &self,
        _auth: &AuthContext,
        id: &AddressId,
    ) -> Result<(), StoreError> {
        self.record(StoreCall::DeleteAddress(id.clone()))?;
        self.profile
            .lock()
            .unwrap()
            .shipping_addresses
            .retain(|a| !a.has_id(id));
        Ok(())
    }

    async fn update_seller_info(
        &self,
        _auth: &AuthContext,
        info: &SellerInfo,
    ) -> Result<(), StoreError> {
        self.record(StoreCall::UpdateSellerInfo(info.clone()))?;
        self.profile.lock().unwrap().seller_info = info.clone();
        Ok(())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// A session that never expires.
pub fn session() -> AuthContext {
    AuthContext::new("test-token", UserRole::Seller, "seller@chodocu.vn")
}

/// A complete stored address in Cầu Giấy.
pub fn address(id: &str, full_name: &str) -> ShippingAddress {
    ShippingAddress {
        id: Some(AddressId::new(id)),
        full_name: full_name.to_string(),
        phone: "0912345678".to_string(),
        province: "Hà Nội".to_string(),
        district: "Cầu Giấy".to_string(),
        ward: "Dịch Vọng".to_string(),
        street: Some("144 Xuân Thủy".to_string()),
        note: None,
        is_default_shipping: false,
        is_default_pickup: false,
    }
}
