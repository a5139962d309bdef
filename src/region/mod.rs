//! Region table and resolved-locator types.

pub mod resolver;

pub use resolver::{DetectStrategy, ExistenceProbe, RegionResolver, TitleLookup};

use std::fmt;
use std::path::{Path, PathBuf};

/// Supported system-menu region variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    Jpn,
    Usa,
    Eur,
}

impl Region {
    pub fn code(&self) -> &'static str {
        match self {
            Region::Jpn => "JPN",
            Region::Usa => "USA",
            Region::Eur => "EUR",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One known protected-storage location for a region variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionEntry {
    pub region: Region,
    /// Installed menu title id matched by [`resolver::TitleLookup`].
    pub title_id: u64,
    /// Full path of the theme asset under the mounted partition.
    pub source_path: PathBuf,
}

impl RegionEntry {
    /// File name of the theme asset, for display.
    pub fn asset_name(&self) -> &str {
        self.source_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("?")
    }
}

/// Immutable table of known region entries.
///
/// Built once and injected into the resolver, never a process-wide global,
/// so tests can substitute synthetic entries.
#[derive(Clone, Debug)]
pub struct RegionTable {
    entries: Vec<RegionEntry>,
}

const MENU_CONTENT: &[(Region, u64, &str)] = &[
    (
        Region::Jpn,
        0x0005_0010_1004_0000,
        "title/00000001/00000002/content/0000001c.app",
    ),
    (
        Region::Usa,
        0x0005_0010_1004_0100,
        "title/00000001/00000002/content/0000001f.app",
    ),
    (
        Region::Eur,
        0x0005_0010_1004_0200,
        "title/00000001/00000002/content/00000022.app",
    ),
];

impl RegionTable {
    pub fn new(entries: Vec<RegionEntry>) -> Self {
        Self { entries }
    }

    /// Built-in table rooted at the protected-storage mount point.
    pub fn builtin(protected_root: &Path) -> Self {
        Self::new(
            MENU_CONTENT
                .iter()
                .map(|(region, title_id, relative)| RegionEntry {
                    region: *region,
                    title_id: *title_id,
                    source_path: protected_root.join(relative),
                })
                .collect(),
        )
    }

    pub fn entries(&self) -> &[RegionEntry] {
        &self.entries
    }
}

/// Outcome of one resolver run.
///
/// Owned by the caller that invoked resolution and superseded wholesale on
/// each rerun, never mutated in place.
#[derive(Clone, Debug, Default)]
pub enum ResolvedLocator {
    Resolved(RegionEntry),
    #[default]
    Unresolved,
}

impl ResolvedLocator {
    pub fn entry(&self) -> Option<&RegionEntry> {
        match self {
            ResolvedLocator::Resolved(entry) => Some(entry),
            ResolvedLocator::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolvedLocator::Resolved(_))
    }
}
