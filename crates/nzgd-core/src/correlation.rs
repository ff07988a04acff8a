//! Correlation and hammer-type lookups.
//!
//! Pre-computed Vs30 estimates are keyed by integer surrogate ids of the
//! correlations used to produce them. Callers select correlations by name;
//! [`CorrelationSelection::resolve`] turns those names into ids through a
//! [`CorrelationLookup`] before any estimate is queried.

use std::{collections::HashMap, fmt};

use serde::Serialize;

use crate::{Error, table::Columns};

// ─── Kinds ───────────────────────────────────────────────────────────────────

/// The four lookup tables a Vs30 estimate can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationKind {
  /// Vs profile to Vs30 (e.g. `boore_2004`).
  VsToVs30,
  /// CPT measurements to Vs (e.g. `mcgann_2015`).
  CptToVs,
  /// SPT blow counts to Vs (e.g. `kwak_2015`).
  SptToVs,
  /// SPT hammer type (e.g. `Standard`).
  HammerType,
}

impl CorrelationKind {
  pub const ALL: [Self; 4] =
    [Self::VsToVs30, Self::CptToVs, Self::SptToVs, Self::HammerType];

  /// Name of the lookup table in the store.
  pub fn table(self) -> &'static str {
    match self {
      Self::VsToVs30 => "vstovs30correlation",
      Self::CptToVs => "cpttovscorrelation",
      Self::SptToVs => "spttovscorrelation",
      Self::HammerType => "spttovs30hammertype",
    }
  }

  /// Name of the integer surrogate key column in [`Self::table`].
  pub fn id_column(self) -> &'static str {
    match self {
      Self::VsToVs30 => "vs_to_vs30_correlation_id",
      Self::CptToVs => "cpt_to_vs_correlation_id",
      Self::SptToVs => "correlation_id",
      Self::HammerType => "hammer_id",
    }
  }
}

impl fmt::Display for CorrelationKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::VsToVs30 => "Vs to Vs30 correlation",
      Self::CptToVs => "CPT to Vs correlation",
      Self::SptToVs => "SPT to Vs correlation",
      Self::HammerType => "hammer type",
    })
  }
}

// ─── Lookup ──────────────────────────────────────────────────────────────────

/// One row of a lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorrelationEntry {
  pub kind: CorrelationKind,
  pub id:   i64,
  pub name: String,
}

impl Columns for CorrelationEntry {
  const COLUMNS: &'static [&'static str] = &["kind", "id", "name"];
}

/// Maps a correlation or hammer-type name to its surrogate id.
///
/// Implemented by storage backends (querying the lookup table by name) and by
/// [`StaticLookup`] (a table loaded once up front).
pub trait CorrelationLookup {
  type Error: std::error::Error + From<Error>;

  /// Return the id for `name`, or `None` if the table has no such row.
  fn lookup_id(&self, kind: CorrelationKind, name: &str) -> Result<Option<i64>, Self::Error>;

  /// Like [`Self::lookup_id`], but a missing name is an
  /// [`Error::UnknownName`].
  fn require_id(&self, kind: CorrelationKind, name: &str) -> Result<i64, Self::Error> {
    self.lookup_id(kind, name)?.ok_or_else(|| {
      Error::UnknownName { kind, name: name.to_owned() }.into()
    })
  }
}

/// An in-memory lookup table covering all [`CorrelationKind`]s.
#[derive(Debug, Clone, Default)]
pub struct StaticLookup {
  ids: HashMap<(CorrelationKind, String), i64>,
}

impl StaticLookup {
  pub fn new() -> Self { Self::default() }

  pub fn insert(&mut self, kind: CorrelationKind, name: impl Into<String>, id: i64) {
    self.ids.insert((kind, name.into()), id);
  }
}

impl FromIterator<CorrelationEntry> for StaticLookup {
  fn from_iter<I: IntoIterator<Item = CorrelationEntry>>(iter: I) -> Self {
    let mut lookup = Self::new();
    for entry in iter {
      lookup.insert(entry.kind, entry.name, entry.id);
    }
    lookup
  }
}

impl CorrelationLookup for StaticLookup {
  type Error = Error;

  fn lookup_id(&self, kind: CorrelationKind, name: &str) -> Result<Option<i64>, Error> {
    Ok(self.ids.get(&(kind, name.to_owned())).copied())
  }
}

// ─── Selection ───────────────────────────────────────────────────────────────

/// The four names a caller picks for the bulk Vs30 query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationSelection {
  pub vs_to_vs30:  String,
  pub cpt_to_vs:   String,
  pub spt_to_vs:   String,
  pub hammer_type: String,
}

/// Surrogate ids for a [`CorrelationSelection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedCorrelations {
  pub vs_to_vs30_id:  i64,
  pub cpt_to_vs_id:   i64,
  pub spt_to_vs_id:   i64,
  pub hammer_type_id: i64,
}

impl CorrelationSelection {
  pub fn new(
    vs_to_vs30: impl Into<String>,
    cpt_to_vs: impl Into<String>,
    spt_to_vs: impl Into<String>,
    hammer_type: impl Into<String>,
  ) -> Self {
    Self {
      vs_to_vs30:  vs_to_vs30.into(),
      cpt_to_vs:   cpt_to_vs.into(),
      spt_to_vs:   spt_to_vs.into(),
      hammer_type: hammer_type.into(),
    }
  }

  /// Resolve every name, failing on the first one that is unknown.
  pub fn resolve<L: CorrelationLookup>(
    &self,
    lookup: &L,
  ) -> Result<ResolvedCorrelations, L::Error> {
    Ok(ResolvedCorrelations {
      vs_to_vs30_id:  lookup.require_id(CorrelationKind::VsToVs30, &self.vs_to_vs30)?,
      cpt_to_vs_id:   lookup.require_id(CorrelationKind::CptToVs, &self.cpt_to_vs)?,
      spt_to_vs_id:   lookup.require_id(CorrelationKind::SptToVs, &self.spt_to_vs)?,
      hammer_type_id: lookup.require_id(CorrelationKind::HammerType, &self.hammer_type)?,
    })
  }
}
