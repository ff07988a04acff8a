//! Vs30 estimate rows.
//!
//! [`CptVs30`] and [`SptVs30`] are the per-record views. [`Vs30Record`] is the
//! bulk view: a single schema that is the union of the CPT and SPT columns,
//! with the columns that do not apply to a row left as `None`.

use serde::Serialize;

use crate::{
  derived::{DerivedColumns, DerivedInputs, type_number_code},
  measurement::DepthRange,
  table::Columns,
};

// ─── CPT ─────────────────────────────────────────────────────────────────────

/// A CPT-based Vs30 estimate for one NZGD record with its report metadata,
/// correlation names and location.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CptVs30 {
  pub cpt_id:                        i64,
  pub nzgd_id:                       i64,
  pub vs30:                          Option<f64>,
  pub vs30_stddev:                   Option<f64>,
  pub cpt_file:                      Option<String>,
  pub cpt_tip_net_area_ratio:        Option<f64>,
  pub measured_gwl:                  Option<f64>,
  pub deepest_depth:                 Option<f64>,
  pub shallowest_depth:              Option<f64>,
  pub cpt_to_vs_correlation:         String,
  pub vs_to_vs30_correlation:        String,
  pub type_prefix:                   String,
  pub original_reference:            Option<String>,
  pub investigation_date:            Option<String>,
  pub published_date:                Option<String>,
  pub latitude:                      Option<f64>,
  pub longitude:                     Option<f64>,
  pub model_vs30_foster_2019:        Option<f64>,
  pub model_vs30_stddev_foster_2019: Option<f64>,
  pub model_gwl_westerhoff_2019:     Option<f64>,
  pub region:                        Option<String>,
  pub district:                      Option<String>,
  pub city:                          Option<String>,
  pub suburb:                        Option<String>,
  pub record_name:                   String,
  pub vs30_log_residual:             f64,
  pub gwl_residual:                  f64,
}

impl CptVs30 {
  /// Fill `record_name`, `vs30_log_residual` and `gwl_residual`.
  pub fn fill_derived(&mut self) {
    let d = DerivedColumns::compute(DerivedInputs {
      type_prefix:  &self.type_prefix,
      nzgd_id:      self.nzgd_id,
      vs30:         self.vs30,
      model_vs30:   self.model_vs30_foster_2019,
      measured_gwl: self.measured_gwl,
      model_gwl:    self.model_gwl_westerhoff_2019,
    });
    self.record_name = d.record_name;
    self.vs30_log_residual = d.vs30_log_residual;
    self.gwl_residual = d.gwl_residual;
  }
}

impl Columns for CptVs30 {
  const COLUMNS: &'static [&'static str] = &[
    "cpt_id",
    "nzgd_id",
    "vs30",
    "vs30_stddev",
    "cpt_file",
    "cpt_tip_net_area_ratio",
    "measured_gwl",
    "deepest_depth",
    "shallowest_depth",
    "cpt_to_vs_correlation",
    "vs_to_vs30_correlation",
    "type_prefix",
    "original_reference",
    "investigation_date",
    "published_date",
    "latitude",
    "longitude",
    "model_vs30_foster_2019",
    "model_vs30_stddev_foster_2019",
    "model_gwl_westerhoff_2019",
    "region",
    "district",
    "city",
    "suburb",
    "record_name",
    "vs30_log_residual",
    "gwl_residual",
  ];
}

// ─── SPT ─────────────────────────────────────────────────────────────────────

/// An SPT-based Vs30 estimate for one borehole.
///
/// The estimate table does not store measured depth extents; they are filled
/// from the borehole's measurements via [`SptVs30::set_depth_range`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SptVs30 {
  pub nzgd_id:                                     i64,
  pub spt_borehole_diameter_for_vs30_calculation: Option<f64>,
  pub vs30:                                        Option<f64>,
  pub vs30_stddev:                                 Option<f64>,
  pub spt_vs30_calculation_used_efficiency:        Option<String>,
  pub spt_vs30_calculation_used_soil_info:         Option<String>,
  pub borehole_file:                               Option<String>,
  pub spt_efficiency:                              Option<f64>,
  pub spt_borehole_diameter:                       Option<f64>,
  pub measured_gwl:                                Option<f64>,
  pub spt_to_vs_correlation:                       String,
  pub vs_to_vs30_correlation:                      String,
  pub type_prefix:                                 String,
  pub original_reference:                          Option<String>,
  pub investigation_date:                          Option<String>,
  pub published_date:                              Option<String>,
  pub latitude:                                    Option<f64>,
  pub longitude:                                   Option<f64>,
  pub model_vs30_foster_2019:                      Option<f64>,
  pub model_vs30_stddev_foster_2019:               Option<f64>,
  pub model_gwl_westerhoff_2019:                   Option<f64>,
  pub hammer_type:                                 String,
  pub region:                                      Option<String>,
  pub district:                                    Option<String>,
  pub city:                                        Option<String>,
  pub suburb:                                      Option<String>,
  pub deepest_depth:                               Option<f64>,
  pub shallowest_depth:                            Option<f64>,
  pub record_name:                                 String,
  pub vs30_log_residual:                           f64,
  pub gwl_residual:                                f64,
}

impl SptVs30 {
  pub fn set_depth_range(&mut self, range: Option<DepthRange>) {
    self.shallowest_depth = range.map(|r| r.shallowest);
    self.deepest_depth = range.map(|r| r.deepest);
  }

  /// Fill `record_name`, `vs30_log_residual` and `gwl_residual`.
  pub fn fill_derived(&mut self) {
    let d = DerivedColumns::compute(DerivedInputs {
      type_prefix:  &self.type_prefix,
      nzgd_id:      self.nzgd_id,
      vs30:         self.vs30,
      model_vs30:   self.model_vs30_foster_2019,
      measured_gwl: self.measured_gwl,
      model_gwl:    self.model_gwl_westerhoff_2019,
    });
    self.record_name = d.record_name;
    self.vs30_log_residual = d.vs30_log_residual;
    self.gwl_residual = d.gwl_residual;
  }
}

impl Columns for SptVs30 {
  const COLUMNS: &'static [&'static str] = &[
    "nzgd_id",
    "spt_borehole_diameter_for_vs30_calculation",
    "vs30",
    "vs30_stddev",
    "spt_vs30_calculation_used_efficiency",
    "spt_vs30_calculation_used_soil_info",
    "borehole_file",
    "spt_efficiency",
    "spt_borehole_diameter",
    "measured_gwl",
    "spt_to_vs_correlation",
    "vs_to_vs30_correlation",
    "type_prefix",
    "original_reference",
    "investigation_date",
    "published_date",
    "latitude",
    "longitude",
    "model_vs30_foster_2019",
    "model_vs30_stddev_foster_2019",
    "model_gwl_westerhoff_2019",
    "hammer_type",
    "region",
    "district",
    "city",
    "suburb",
    "deepest_depth",
    "shallowest_depth",
    "record_name",
    "vs30_log_residual",
    "gwl_residual",
  ];
}

// ─── Bulk ────────────────────────────────────────────────────────────────────

/// Which branch of the bulk query produced a [`Vs30Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vs30Source {
  Cpt,
  Spt,
}

/// One row of the bulk Vs30 query: CPT-only columns (`cpt_id`,
/// `cpt_tip_net_area_ratio`) are `None` on SPT rows and SPT-only columns
/// (`spt_efficiency`, `spt_borehole_diameter`) are `None` on CPT rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Vs30Record {
  pub cpt_id:                        Option<i64>,
  pub nzgd_id:                       i64,
  pub vs30:                          Option<f64>,
  pub vs30_stddev:                   Option<f64>,
  pub type_prefix:                   String,
  pub original_reference:            Option<String>,
  pub investigation_date:            Option<String>,
  pub published_date:                Option<String>,
  pub latitude:                      Option<f64>,
  pub longitude:                     Option<f64>,
  pub model_vs30_foster_2019:        Option<f64>,
  pub model_vs30_stddev_foster_2019: Option<f64>,
  pub model_gwl_westerhoff_2019:     Option<f64>,
  pub cpt_tip_net_area_ratio:        Option<f64>,
  pub measured_gwl:                  Option<f64>,
  pub deepest_depth:                 Option<f64>,
  pub shallowest_depth:              Option<f64>,
  pub region:                        Option<String>,
  pub district:                      Option<String>,
  pub suburb:                        Option<String>,
  pub city:                          Option<String>,
  pub record_name:                   String,
  pub vs30_log_residual:             f64,
  pub gwl_residual:                  f64,
  pub spt_efficiency:                Option<f64>,
  pub spt_borehole_diameter:         Option<f64>,
  pub type_number_code:              Option<u8>,
}

impl Vs30Record {
  pub fn source(&self) -> Vs30Source {
    if self.cpt_id.is_some() { Vs30Source::Cpt } else { Vs30Source::Spt }
  }

  pub fn set_depth_range(&mut self, range: Option<DepthRange>) {
    self.shallowest_depth = range.map(|r| r.shallowest);
    self.deepest_depth = range.map(|r| r.deepest);
  }

  /// Fill the three derived columns and `type_number_code`.
  pub fn fill_derived(&mut self) {
    let d = DerivedColumns::compute(DerivedInputs {
      type_prefix:  &self.type_prefix,
      nzgd_id:      self.nzgd_id,
      vs30:         self.vs30,
      model_vs30:   self.model_vs30_foster_2019,
      measured_gwl: self.measured_gwl,
      model_gwl:    self.model_gwl_westerhoff_2019,
    });
    self.record_name = d.record_name;
    self.vs30_log_residual = d.vs30_log_residual;
    self.gwl_residual = d.gwl_residual;
    self.type_number_code = type_number_code(&self.type_prefix);
  }
}

impl Columns for Vs30Record {
  const COLUMNS: &'static [&'static str] = &[
    "cpt_id",
    "nzgd_id",
    "vs30",
    "vs30_stddev",
    "type_prefix",
    "original_reference",
    "investigation_date",
    "published_date",
    "latitude",
    "longitude",
    "model_vs30_foster_2019",
    "model_vs30_stddev_foster_2019",
    "model_gwl_westerhoff_2019",
    "cpt_tip_net_area_ratio",
    "measured_gwl",
    "deepest_depth",
    "shallowest_depth",
    "region",
    "district",
    "suburb",
    "city",
    "record_name",
    "vs30_log_residual",
    "gwl_residual",
    "spt_efficiency",
    "spt_borehole_diameter",
    "type_number_code",
  ];
}
