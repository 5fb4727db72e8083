//! Cascading province → district → ward selector.
//!
//! [`RegionSelector`] drives [`SelectorState`] against a [`RegionCatalog`].
//! Loads at different levels are chained: a district list is only requested
//! once a province selection has settled, a ward list once a district has.
//! Within one level the latest selection wins; a result for a superseded
//! selection is dropped when it arrives, and so is its pick. A newer
//! [`RegionSelector::initialize`], a user selection or a reset ends any
//! hydration still in flight.

mod state;

pub use state::{LevelState, LoadStatus, SelectorState, Selected, Ticket};

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chodocu_core::{Region, RegionCode, RegionLevel, resolve_hint};
use tracing::{debug, instrument, warn};

use crate::region::{RegionCatalog, list_level};

/// A selection reported to the owner: the code the selector tracks and the
/// name the owner persists. An empty code means the level was cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionPick {
    pub code: RegionCode,
    pub name: String,
}

impl RegionPick {
    /// Whether the pick cleared its level.
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.code.is_empty()
    }
}

/// Codes resolved by [`RegionSelector::initialize`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedCodes {
    pub province: Option<RegionCode>,
    pub district: Option<RegionCode>,
    pub ward: Option<RegionCode>,
}

/// Hints for [`RegionSelector::initialize`]. Each may be a code or a name.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionHints<'a> {
    pub province: Option<&'a str>,
    pub district: Option<&'a str>,
    pub ward: Option<&'a str>,
}

/// Stateful cascading selector.
pub struct RegionSelector {
    catalog: Arc<dyn RegionCatalog>,
    state: Mutex<SelectorState>,
    /// Bumped by every entry point that supersedes a running hydration.
    generation: AtomicU64,
    detached: AtomicBool,
}

impl RegionSelector {
    /// Create an empty selector. Call [`RegionSelector::initialize`] to load
    /// provinces.
    #[must_use]
    pub fn new(catalog: Arc<dyn RegionCatalog>) -> Self {
        Self {
            catalog,
            state: Mutex::new(SelectorState::default()),
            generation: AtomicU64::new(0),
            detached: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SelectorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn supersede(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) == generation
    }

    /// Load provinces and resolve the hints level by level.
    ///
    /// Each hint is tried as a code, then as an exact name, against the list
    /// of its level. A level is only loaded after its parent resolved; the
    /// first unresolved level ends the chain. So does a newer call, a user
    /// selection or a reset; the codes resolved up to that point are
    /// returned.
    #[instrument(skip(self))]
    pub async fn initialize(&self, hints: RegionHints<'_>) -> ResolvedCodes {
        let generation = self.supersede();
        let ticket = {
            let mut state = self.lock();
            state.reset();
            state.begin_load(RegionLevel::Province)
        };
        self.load(ticket).await;

        let mut resolved = ResolvedCodes::default();
        let chain = [
            (RegionLevel::Province, hints.province),
            (RegionLevel::District, hints.district),
            (RegionLevel::Ward, hints.ward),
        ];
        for (level, hint) in chain {
            if !self.is_current(generation) {
                debug!(%level, "Selector re-initialized, abandoning hydration");
                break;
            }
            let Some(code) = self.resolve(level, hint.unwrap_or_default()) else {
                debug!(%level, "Region hint unresolved, stopping");
                break;
            };
            if self.select(level, code.clone()).await.is_none() || !self.is_current(generation) {
                debug!(%level, "Hydration superseded");
                break;
            }
            match level {
                RegionLevel::Province => resolved.province = Some(code),
                RegionLevel::District => resolved.district = Some(code),
                RegionLevel::Ward => resolved.ward = Some(code),
            }
        }
        resolved
    }

    fn resolve(&self, level: RegionLevel, hint: &str) -> Option<RegionCode> {
        let state = self.lock();
        let level_state = state.level(level);
        if level_state.status != LoadStatus::Ready {
            return None;
        }
        resolve_hint(&level_state.options, hint).map(|r| r.code.clone())
    }

    /// Select a province. Clears district and ward, then loads districts.
    /// An empty code clears everything. Returns `None` when a later
    /// selection replaced this one before its districts arrived.
    pub async fn select_province(&self, code: impl Into<RegionCode>) -> Option<RegionPick> {
        self.supersede();
        self.select(RegionLevel::Province, code.into()).await
    }

    /// Select a district. Clears the ward, then loads wards. Returns `None`
    /// without doing anything when no province is selected, and `None` when
    /// a later selection replaced this one.
    pub async fn select_district(&self, code: impl Into<RegionCode>) -> Option<RegionPick> {
        self.supersede();
        self.select(RegionLevel::District, code.into()).await
    }

    /// Select a ward. Returns `None` when no district is selected.
    pub async fn select_ward(&self, code: impl Into<RegionCode>) -> Option<RegionPick> {
        self.supersede();
        self.select(RegionLevel::Ward, code.into()).await
    }

    /// Apply a selection, then load the child level if one was requested.
    ///
    /// The pick is computed before the load so its name comes from the list
    /// the user chose from. It is only handed out if the selection is still
    /// the current one once the load settles.
    async fn select(&self, level: RegionLevel, code: RegionCode) -> Option<RegionPick> {
        let (pick, ticket) = {
            let mut state = self.lock();
            let name = state.name_of(level, &code).unwrap_or_default().to_string();
            match state.select(level, code.clone()) {
                Selected::Ignored => {
                    debug!(%level, %code, "Selection ignored, parent level is empty");
                    return None;
                }
                Selected::Applied(ticket) => (RegionPick { code, name }, ticket),
            }
        };

        if let Some(ticket) = ticket {
            self.load(ticket).await;
            if self.selection(level).unwrap_or_default() != pick.code {
                debug!(%level, code = %pick.code, "Selection superseded, dropping pick");
                return None;
            }
        }
        Some(pick)
    }

    /// Fetch the options for `ticket` and commit them if still current.
    async fn load(&self, ticket: Ticket) {
        let result = list_level(self.catalog.as_ref(), ticket.level(), ticket.parent())
            .await
            .map_err(|e| {
                warn!(level = %ticket.level(), error = %e, "Region load failed");
                e.to_string()
            });

        if self.detached.load(Ordering::Acquire) {
            debug!(level = %ticket.level(), "Selector detached, dropping region load");
            return;
        }
        if !self.lock().commit(&ticket, result) {
            debug!(level = %ticket.level(), "Discarding stale region load");
        }
    }

    /// Options currently offered at `level`.
    #[must_use]
    pub fn options(&self, level: RegionLevel) -> Vec<Region> {
        self.lock().level(level).options.clone()
    }

    /// Selected code at `level`.
    #[must_use]
    pub fn selection(&self, level: RegionLevel) -> Option<RegionCode> {
        self.lock().level(level).selection.clone()
    }

    /// Load status at `level`.
    #[must_use]
    pub fn status(&self, level: RegionLevel) -> LoadStatus {
        self.lock().level(level).status.clone()
    }

    /// Whether `level` accepts input.
    #[must_use]
    pub fn is_enabled(&self, level: RegionLevel) -> bool {
        self.lock().is_enabled(level)
    }

    /// Name of the option with `code` at `level`.
    #[must_use]
    pub fn name_of(&self, level: RegionLevel, code: &RegionCode) -> Option<String> {
        self.lock().name_of(level, code).map(str::to_owned)
    }

    /// Clear every level.
    pub fn reset(&self) {
        self.supersede();
        self.lock().reset();
    }

    /// Mark the selector as gone. Loads that resolve afterwards are dropped.
    pub fn detach(&self) {
        self.detached.store(true, Ordering::Release);
    }

    /// Whether [`RegionSelector::detach`] was called.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }
}
