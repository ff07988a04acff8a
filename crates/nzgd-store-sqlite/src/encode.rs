//! Decoding helpers between SQLite rows and `nzgd-core` row types.
//!
//! Columns are read by name, so each `SELECT` only has to alias its columns
//! to the names used here; column order in the SQL does not matter.
//! Numeric columns are read as `f64` (SQLite widens INTEGER values), except
//! the residual operands, which go through [`opt_real`]. Free-text metadata
//! is read as text whatever its storage class.

use std::collections::HashMap;

use nzgd_core::{
  correlation::{CorrelationEntry, CorrelationKind},
  measurement::{CptMeasurement, DepthRange, SptMeasurement},
  soil::SoilTypeRow,
  vs30::{CptVs30, SptVs30, Vs30Record},
};
use rusqlite::{Row, RowIndex, types::ValueRef};

// ─── Scalars ─────────────────────────────────────────────────────────────────

/// Read any non-NULL value as text.
///
/// Dates and references are stored inconsistently (TEXT in most rows,
/// INTEGER or REAL in some), so they are stringified rather than rejected.
pub fn opt_text<I: RowIndex>(row: &Row<'_>, idx: I) -> rusqlite::Result<Option<String>> {
  Ok(match row.get_ref(idx)? {
    ValueRef::Null => None,
    ValueRef::Integer(i) => Some(i.to_string()),
    ValueRef::Real(f) => Some(f.to_string()),
    ValueRef::Text(t) | ValueRef::Blob(t) => Some(String::from_utf8_lossy(t).into_owned()),
  })
}

/// Read a numeric column leniently: numbers and numeric text become
/// `Some`, anything else (NULL, non-numeric text, blobs) becomes `None`.
///
/// Used for the operands of the derived residuals, which fall back to NaN
/// per row instead of failing the whole query.
pub fn opt_real<I: RowIndex>(row: &Row<'_>, idx: I) -> rusqlite::Result<Option<f64>> {
  Ok(match row.get_ref(idx)? {
    ValueRef::Integer(i) => Some(i as f64),
    ValueRef::Real(f) => Some(f),
    ValueRef::Text(t) => std::str::from_utf8(t).ok().and_then(|s| s.trim().parse().ok()),
    ValueRef::Null | ValueRef::Blob(_) => None,
  })
}

// ─── Measurements ────────────────────────────────────────────────────────────

pub fn cpt_measurement(row: &Row<'_>) -> rusqlite::Result<CptMeasurement> {
  Ok(CptMeasurement {
    depth:   row.get("depth")?,
    qc:      row.get("qc")?,
    fs:      row.get("fs")?,
    u2:      row.get("u2")?,
    cpt_id:  row.get("cpt_id")?,
    nzgd_id: row.get("nzgd_id")?,
  })
}

pub fn spt_measurement(row: &Row<'_>) -> rusqlite::Result<SptMeasurement> {
  Ok(SptMeasurement {
    depth:   row.get("depth")?,
    n:       row.get("n")?,
    nzgd_id: row.get("nzgd_id")?,
  })
}

pub fn soil_type_row(row: &Row<'_>) -> rusqlite::Result<SoilTypeRow> {
  Ok(SoilTypeRow {
    nzgd_id:   row.get("nzgd_id")?,
    top_depth: row.get("top_depth")?,
    soil_type: row.get("soil_type")?,
  })
}

/// `(borehole_id, shallowest_depth, deepest_depth)` aggregate rows.
pub fn depth_range_by_borehole(row: &Row<'_>) -> rusqlite::Result<(i64, DepthRange)> {
  Ok((row.get("borehole_id")?, DepthRange {
    shallowest: row.get("shallowest_depth")?,
    deepest:    row.get("deepest_depth")?,
  }))
}

// ─── Lookups ─────────────────────────────────────────────────────────────────

pub fn correlation_entry(
  kind: CorrelationKind,
) -> impl Fn(&Row<'_>) -> rusqlite::Result<CorrelationEntry> {
  move |row| {
    Ok(CorrelationEntry {
      kind,
      id: row.get("id")?,
      name: row.get("name")?,
    })
  }
}

// ─── Vs30 estimates ──────────────────────────────────────────────────────────

/// Decode a per-record CPT Vs30 row; derived columns are left for the caller.
pub fn cpt_vs30(row: &Row<'_>) -> rusqlite::Result<CptVs30> {
  Ok(CptVs30 {
    cpt_id:                        row.get("cpt_id")?,
    nzgd_id:                       row.get("nzgd_id")?,
    vs30:                          opt_real(row, "vs30")?,
    vs30_stddev:                   row.get("vs30_stddev")?,
    cpt_file:                      opt_text(row, "cpt_file")?,
    cpt_tip_net_area_ratio:        row.get("cpt_tip_net_area_ratio")?,
    measured_gwl:                  opt_real(row, "measured_gwl")?,
    deepest_depth:                 row.get("deepest_depth")?,
    shallowest_depth:              row.get("shallowest_depth")?,
    cpt_to_vs_correlation:         row.get("cpt_to_vs_correlation")?,
    vs_to_vs30_correlation:        row.get("vs_to_vs30_correlation")?,
    type_prefix:                   row.get("type_prefix")?,
    original_reference:            opt_text(row, "original_reference")?,
    investigation_date:            opt_text(row, "investigation_date")?,
    published_date:                opt_text(row, "published_date")?,
    latitude:                      row.get("latitude")?,
    longitude:                     row.get("longitude")?,
    model_vs30_foster_2019:        opt_real(row, "model_vs30_foster_2019")?,
    model_vs30_stddev_foster_2019: row.get("model_vs30_stddev_foster_2019")?,
    model_gwl_westerhoff_2019:     opt_real(row, "model_gwl_westerhoff_2019")?,
    region:                        opt_text(row, "region")?,
    district:                      opt_text(row, "district")?,
    city:                          opt_text(row, "city")?,
    suburb:                        opt_text(row, "suburb")?,
    ..Default::default()
  })
}

/// Decode a per-borehole SPT Vs30 row; depth extents and derived columns are
/// left for the caller.
pub fn spt_vs30(row: &Row<'_>) -> rusqlite::Result<SptVs30> {
  Ok(SptVs30 {
    nzgd_id:                                     row.get("nzgd_id")?,
    spt_borehole_diameter_for_vs30_calculation: row
      .get("spt_borehole_diameter_for_vs30_calculation")?,
    vs30:                                        opt_real(row, "vs30")?,
    vs30_stddev:                                 row.get("vs30_stddev")?,
    spt_vs30_calculation_used_efficiency:        opt_text(
      row,
      "spt_vs30_calculation_used_efficiency",
    )?,
    spt_vs30_calculation_used_soil_info:         opt_text(
      row,
      "spt_vs30_calculation_used_soil_info",
    )?,
    borehole_file:                               opt_text(row, "borehole_file")?,
    spt_efficiency:                              row.get("spt_efficiency")?,
    spt_borehole_diameter:                       row.get("spt_borehole_diameter")?,
    measured_gwl:                                opt_real(row, "measured_gwl")?,
    spt_to_vs_correlation:                       row.get("spt_to_vs_correlation")?,
    vs_to_vs30_correlation:                      row.get("vs_to_vs30_correlation")?,
    type_prefix:                                 row.get("type_prefix")?,
    original_reference:                          opt_text(row, "original_reference")?,
    investigation_date:                          opt_text(row, "investigation_date")?,
    published_date:                              opt_text(row, "published_date")?,
    latitude:                                    row.get("latitude")?,
    longitude:                                   row.get("longitude")?,
    model_vs30_foster_2019:                      opt_real(row, "model_vs30_foster_2019")?,
    model_vs30_stddev_foster_2019:               row.get("model_vs30_stddev_foster_2019")?,
    model_gwl_westerhoff_2019:                   opt_real(row, "model_gwl_westerhoff_2019")?,
    hammer_type:                                 row.get("hammer_type")?,
    region:                                      opt_text(row, "region")?,
    district:                                    opt_text(row, "district")?,
    city:                                        opt_text(row, "city")?,
    suburb:                                      opt_text(row, "suburb")?,
    ..Default::default()
  })
}

/// Columns shared by both branches of the bulk query.
fn bulk_common(row: &Row<'_>) -> rusqlite::Result<Vs30Record> {
  Ok(Vs30Record {
    nzgd_id:                       row.get("nzgd_id")?,
    vs30:                          opt_real(row, "vs30")?,
    vs30_stddev:                   row.get("vs30_stddev")?,
    type_prefix:                   row.get("type_prefix")?,
    original_reference:            opt_text(row, "original_reference")?,
    investigation_date:            opt_text(row, "investigation_date")?,
    published_date:                opt_text(row, "published_date")?,
    latitude:                      row.get("latitude")?,
    longitude:                     row.get("longitude")?,
    model_vs30_foster_2019:        opt_real(row, "model_vs30_foster_2019")?,
    model_vs30_stddev_foster_2019: row.get("model_vs30_stddev_foster_2019")?,
    model_gwl_westerhoff_2019:     opt_real(row, "model_gwl_westerhoff_2019")?,
    measured_gwl:                  opt_real(row, "measured_gwl")?,
    region:                        opt_text(row, "region")?,
    district:                      opt_text(row, "district")?,
    suburb:                        opt_text(row, "suburb")?,
    city:                          opt_text(row, "city")?,
    ..Default::default()
  })
}

/// Decode a CPT-branch bulk row.
pub fn bulk_cpt(row: &Row<'_>) -> rusqlite::Result<Vs30Record> {
  Ok(Vs30Record {
    cpt_id: Some(row.get("cpt_id")?),
    cpt_tip_net_area_ratio: row.get("cpt_tip_net_area_ratio")?,
    deepest_depth: row.get("deepest_depth")?,
    shallowest_depth: row.get("shallowest_depth")?,
    ..bulk_common(row)?
  })
}

/// Decode an SPT-branch bulk row; depth extents come from
/// [`depth_range_by_borehole`] and are joined by the caller.
pub fn bulk_spt(row: &Row<'_>) -> rusqlite::Result<Vs30Record> {
  Ok(Vs30Record {
    spt_efficiency: row.get("spt_efficiency")?,
    spt_borehole_diameter: row.get("spt_borehole_diameter")?,
    ..bulk_common(row)?
  })
}

/// Left-join per-borehole depth extents onto SPT bulk rows.
pub fn join_depth_ranges(rows: &mut [Vs30Record], ranges: &HashMap<i64, DepthRange>) {
  for row in rows {
    row.set_depth_range(ranges.get(&row.nzgd_id).copied());
  }
}
