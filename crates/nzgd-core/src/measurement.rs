//! Depth-indexed CPT and SPT measurements.

use serde::Serialize;

use crate::table::Columns;

/// One CPT reading. Several CPTs may belong to the same NZGD record; they
/// are told apart by `cpt_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CptMeasurement {
  pub depth:   f64,
  /// Cone resistance.
  pub qc:      Option<f64>,
  /// Sleeve friction.
  pub fs:      Option<f64>,
  /// Pore pressure.
  pub u2:      Option<f64>,
  pub cpt_id:  i64,
  pub nzgd_id: i64,
}

impl Columns for CptMeasurement {
  const COLUMNS: &'static [&'static str] = &["depth", "qc", "fs", "u2", "cpt_id", "nzgd_id"];
}

/// One SPT blow count. The borehole id doubles as the NZGD id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SptMeasurement {
  pub depth:   f64,
  pub n:       Option<f64>,
  pub nzgd_id: i64,
}

impl Columns for SptMeasurement {
  const COLUMNS: &'static [&'static str] = &["depth", "n", "nzgd_id"];
}

/// Shallowest and deepest measured depth of one investigation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthRange {
  pub shallowest: f64,
  pub deepest:    f64,
}

impl DepthRange {
  /// The extent of `depths`, or `None` when there are none.
  pub fn of(depths: impl IntoIterator<Item = f64>) -> Option<Self> {
    depths.into_iter().fold(None, |range, depth| {
      Some(match range {
        None => Self { shallowest: depth, deepest: depth },
        Some(r) => Self {
          shallowest: r.shallowest.min(depth),
          deepest:    r.deepest.max(depth),
        },
      })
    })
  }
}
