//! Pure state of the cascading region selector.
//!
//! Three levels in a fixed array, driven by one "select level" event that
//! resets every level below it. Loads are tracked by [`Ticket`]s: a result
//! commits only if its ticket is still the level's pending one and the
//! parent selection it was issued for is still current.

use chodocu_core::{Region, RegionCode, RegionLevel};

/// Load status of one level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadStatus {
    /// Nothing requested since the last reset.
    #[default]
    Idle,
    Loading,
    Ready,
    /// The last load failed; options were left as they were.
    Failed(String),
}

/// Identity of one region load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
    level: RegionLevel,
    parent: Option<RegionCode>,
}

impl Ticket {
    /// Level whose options are being loaded.
    #[must_use]
    pub const fn level(&self) -> RegionLevel {
        self.level
    }

    /// Code of the parent selection the load is for.
    #[must_use]
    pub const fn parent(&self) -> Option<&RegionCode> {
        self.parent.as_ref()
    }
}

/// Options, selection and load status of one level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelState {
    pub options: Vec<Region>,
    pub selection: Option<RegionCode>,
    pub status: LoadStatus,
    pending: Option<Ticket>,
}

impl LevelState {
    fn clear(&mut self) {
        *self = Self::default();
    }

    /// The selected region, if it is among the options.
    #[must_use]
    pub fn selected_region(&self) -> Option<&Region> {
        let code = self.selection.as_ref()?;
        self.options.iter().find(|r| &r.code == code)
    }
}

/// Outcome of a `select` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selected {
    /// The level was updated. A ticket is returned when the child level
    /// must now be loaded.
    Applied(Option<Ticket>),
    /// The parent level has no selection; nothing changed.
    Ignored,
}

/// The three levels of the selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorState {
    levels: [LevelState; 3],
    next_seq: u64,
}

impl SelectorState {
    /// State of one level.
    #[must_use]
    pub const fn level(&self, level: RegionLevel) -> &LevelState {
        let [province, district, ward] = &self.levels;
        match level {
            RegionLevel::Province => province,
            RegionLevel::District => district,
            RegionLevel::Ward => ward,
        }
    }

    const fn level_mut(&mut self, level: RegionLevel) -> &mut LevelState {
        let [province, district, ward] = &mut self.levels;
        match level {
            RegionLevel::Province => province,
            RegionLevel::District => district,
            RegionLevel::Ward => ward,
        }
    }

    /// Selected code of the parent of `level`. The province level has no
    /// parent and always reports `None`.
    fn parent_selection(&self, level: RegionLevel) -> Option<&RegionCode> {
        level
            .parent()
            .and_then(|p| self.level(p).selection.as_ref())
    }

    /// Whether the control for `level` should accept input.
    ///
    /// Child levels need a parent selection; a failed level stays disabled
    /// until its parent changes.
    #[must_use]
    pub fn is_enabled(&self, level: RegionLevel) -> bool {
        let state = self.level(level);
        let has_parent = level.parent().is_none() || self.parent_selection(level).is_some();
        has_parent && !matches!(state.status, LoadStatus::Failed(_))
    }

    /// Name of the option with `code` at `level`.
    #[must_use]
    pub fn name_of(&self, level: RegionLevel, code: &RegionCode) -> Option<&str> {
        self.level(level)
            .options
            .iter()
            .find(|r| &r.code == code)
            .map(|r| r.name.as_str())
    }

    /// Clear every level.
    pub fn reset(&mut self) {
        for level in &mut self.levels {
            level.clear();
        }
    }

    /// Mark `level` as loading for the current parent selection.
    pub fn begin_load(&mut self, level: RegionLevel) -> Ticket {
        self.next_seq += 1;
        let ticket = Ticket {
            seq: self.next_seq,
            level,
            parent: self.parent_selection(level).cloned(),
        };
        let state = self.level_mut(level);
        state.status = LoadStatus::Loading;
        state.pending = Some(ticket.clone());
        ticket
    }

    /// Set the selection at `level` and reset every level below it.
    ///
    /// An empty code clears the level. Selecting below a level without a
    /// selection is ignored.
    pub fn select(&mut self, level: RegionLevel, code: RegionCode) -> Selected {
        if level.parent().is_some() && self.parent_selection(level).is_none() {
            return Selected::Ignored;
        }

        let selection = (!code.is_empty()).then_some(code);
        let load_child = selection.is_some();
        self.level_mut(level).selection = selection;

        let mut below = level.child();
        while let Some(l) = below {
            self.level_mut(l).clear();
            below = l.child();
        }

        let ticket = match level.child() {
            Some(child) if load_child => Some(self.begin_load(child)),
            _ => None,
        };
        Selected::Applied(ticket)
    }

    /// Commit the result of the load identified by `ticket`.
    ///
    /// Returns `false` (and changes nothing) when the ticket has been
    /// superseded. A failure keeps the existing options.
    pub fn commit(&mut self, ticket: &Ticket, result: Result<Vec<Region>, String>) -> bool {
        let current = self.level(ticket.level).pending.as_ref() == Some(ticket)
            && self.parent_selection(ticket.level) == ticket.parent.as_ref();
        if !current {
            return false;
        }

        let state = self.level_mut(ticket.level);
        state.pending = None;
        match result {
            Ok(options) => {
                state.options = options;
                state.status = LoadStatus::Ready;
            }
            Err(message) => state.status = LoadStatus::Failed(message),
        }
        true
    }
}
