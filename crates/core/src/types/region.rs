//! Vietnamese administrative regions.

use serde::{Deserialize, Serialize};

use super::id::RegionCode;

/// One level of the administrative hierarchy.
///
/// A district belongs to exactly one province and a ward to exactly one
/// district.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionLevel {
    Province,
    District,
    Ward,
}

impl RegionLevel {
    /// All levels, root first.
    pub const ALL: [Self; 3] = [Self::Province, Self::District, Self::Ward];

    /// Position of the level in [`RegionLevel::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Province => 0,
            Self::District => 1,
            Self::Ward => 2,
        }
    }

    /// The level whose options depend on this one.
    #[must_use]
    pub const fn child(self) -> Option<Self> {
        match self {
            Self::Province => Some(Self::District),
            Self::District => Some(Self::Ward),
            Self::Ward => None,
        }
    }

    /// The level this one depends on.
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::Province => None,
            Self::District => Some(Self::Province),
            Self::Ward => Some(Self::District),
        }
    }
}

impl std::fmt::Display for RegionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Province => write!(f, "province"),
            Self::District => write!(f, "district"),
            Self::Ward => write!(f, "ward"),
        }
    }
}

/// A region at any level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    /// Opaque code, unique within its level.
    pub code: RegionCode,
    /// User-facing name. Not unique across the country.
    pub name: String,
}

impl Region {
    /// Create a region.
    #[must_use]
    pub fn new(code: impl Into<RegionCode>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Resolve a stored hint against a loaded option list.
///
/// Records persist region *names*, while older records (and the selector
/// itself) may carry codes. The hint is first tried as a code; if no code
/// matches it is treated as a name and must match exactly.
#[must_use]
pub fn resolve_hint<'a>(options: &'a [Region], hint: &str) -> Option<&'a Region> {
    if hint.is_empty() {
        return None;
    }
    options
        .iter()
        .find(|r| r.code.as_str() == hint)
        .or_else(|| options.iter().find(|r| r.name == hint))
}
