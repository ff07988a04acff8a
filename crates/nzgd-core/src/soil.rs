//! Aggregation of SPT soil-type rows into depth layers.
//!
//! A soil measurement can carry several soil-type labels, and the store
//! returns one row per label. [`group_soil_layers`] collapses rows that share
//! a top depth into one layer and derives each layer's thickness from the
//! top depth of the layer below it.

use std::collections::HashMap;

use serde::Serialize;

use crate::table::Columns;

/// Separator between labels of a multi-type layer.
pub const SOIL_TYPE_SEPARATOR: &str = " + ";

/// Thickness reported for the deepest layer.
pub const THICKNESS_NOT_AVAILABLE: &str = "not available";

/// Decimal places top depths are rounded to before grouping.
pub const DEPTH_DECIMALS: i32 = 4;

/// A soil-type row as returned by the store, one per (layer, label).
#[derive(Debug, Clone, PartialEq)]
pub struct SoilTypeRow {
  pub nzgd_id:   i64,
  pub top_depth: f64,
  pub soil_type: String,
}

/// One soil layer after grouping.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SoilLayer {
  pub nzgd_id:         i64,
  pub top_depth:       f64,
  pub soil_type:       String,
  /// Distance to the next layer's top depth, `{:.4}`, or
  /// [`THICKNESS_NOT_AVAILABLE`] for the deepest layer.
  pub layer_thickness: String,
}

impl Columns for SoilLayer {
  const COLUMNS: &'static [&'static str] =
    &["nzgd_id", "top_depth", "soil_type", "layer_thickness"];
}

/// Round half to even at [`DEPTH_DECIMALS`] places.
pub fn round_depth(depth: f64) -> f64 {
  let scale = 10f64.powi(DEPTH_DECIMALS);
  let rounded = (depth * scale).round_ties_even() / scale;
  // Fold -0.0 into 0.0 so both land in the same group.
  if rounded == 0.0 { 0.0 } else { rounded }
}

/// Group `rows` by rounded top depth.
///
/// Layers keep the order in which their depth first appears, and labels
/// within a layer keep input order. `nzgd_id` is taken from the first row of
/// each layer.
pub fn group_soil_layers(rows: impl IntoIterator<Item = SoilTypeRow>) -> Vec<SoilLayer> {
  let mut layers: Vec<(i64, f64, Vec<String>)> = Vec::new();
  let mut by_depth: HashMap<u64, usize> = HashMap::new();

  for row in rows {
    let depth = round_depth(row.top_depth);
    match by_depth.get(&depth.to_bits()) {
      Some(&idx) => layers[idx].2.push(row.soil_type),
      None => {
        by_depth.insert(depth.to_bits(), layers.len());
        layers.push((row.nzgd_id, depth, vec![row.soil_type]));
      }
    }
  }

  let next_depths: Vec<Option<f64>> = layers
    .iter()
    .skip(1)
    .map(|(_, depth, _)| Some(*depth))
    .chain(std::iter::once(None))
    .collect();

  layers
    .into_iter()
    .zip(next_depths)
    .map(|((nzgd_id, top_depth, labels), next)| SoilLayer {
      nzgd_id,
      top_depth,
      soil_type: labels.join(SOIL_TYPE_SEPARATOR),
      layer_thickness: match next {
        Some(next) => format!("{:.4}", next - top_depth),
        None => THICKNESS_NOT_AVAILABLE.to_owned(),
      },
    })
    .collect()
}
