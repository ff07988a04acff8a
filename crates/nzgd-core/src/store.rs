//! The `InvestigationStore` trait.
//!
//! Implemented by storage backends (e.g. `nzgd-store-sqlite`). The command
//! surface depends on this abstraction, not on a concrete backend.

use crate::{
  correlation::{CorrelationEntry, CorrelationLookup, CorrelationSelection},
  measurement::{CptMeasurement, SptMeasurement},
  soil::SoilLayer,
  vs30::{CptVs30, SptVs30, Vs30Record},
};

/// Read-only access to NZGD investigations and their Vs30 estimates.
///
/// Every operation is a single synchronous request. An id with no data
/// yields an empty `Vec`, never an error.
pub trait InvestigationStore: CorrelationLookup {
  /// CPT readings for every CPT of `nzgd_id`, ordered by depth.
  fn cpt_measurements(&self, nzgd_id: i64) -> Result<Vec<CptMeasurement>, Self::Error>;

  /// SPT blow counts for borehole `nzgd_id`, ordered by depth.
  fn spt_measurements(&self, nzgd_id: i64) -> Result<Vec<SptMeasurement>, Self::Error>;

  /// Soil layers of borehole `nzgd_id`, grouped by top depth.
  fn spt_soil_types(&self, nzgd_id: i64) -> Result<Vec<SoilLayer>, Self::Error>;

  /// Every CPT Vs30 estimate of `nzgd_id`.
  fn cpt_vs30s(&self, nzgd_id: i64) -> Result<Vec<CptVs30>, Self::Error>;

  /// Every SPT Vs30 estimate of borehole `nzgd_id`.
  fn spt_vs30s(&self, nzgd_id: i64) -> Result<Vec<SptVs30>, Self::Error>;

  /// CPT then SPT Vs30 estimates across all records for one choice of
  /// correlations and hammer type.
  ///
  /// Names are resolved first; an unknown name fails before any estimate is
  /// read.
  fn all_vs30s(&self, selection: &CorrelationSelection) -> Result<Vec<Vs30Record>, Self::Error>;

  /// Every row of every lookup table.
  fn correlations(&self) -> Result<Vec<CorrelationEntry>, Self::Error>;
}
