//! Columns computed from queried values rather than read from the store.
//!
//! Missing operands never abort a query: every residual falls back to
//! `f64::NAN` on its own row.

use std::str::FromStr;

// ─── Record name ─────────────────────────────────────────────────────────────

/// Human-readable record name, e.g. `CPT_1234`.
pub fn record_name(type_prefix: &str, nzgd_id: i64) -> String {
  format!("{type_prefix}_{nzgd_id}")
}

// ─── Residuals ───────────────────────────────────────────────────────────────

/// `ln(vs30) - ln(model_vs30)`.
///
/// `NaN` unless both values are present, finite and strictly positive.
pub fn vs30_log_residual(vs30: Option<f64>, model_vs30: Option<f64>) -> f64 {
  match (vs30, model_vs30) {
    (Some(v), Some(m)) if is_positive(v) && is_positive(m) => v.ln() - m.ln(),
    _ => f64::NAN,
  }
}

/// `measured_gwl - model_gwl`, or `NaN` if either is missing.
pub fn gwl_residual(measured_gwl: Option<f64>, model_gwl: Option<f64>) -> f64 {
  match (measured_gwl, model_gwl) {
    (Some(measured), Some(model)) => measured - model,
    _ => f64::NAN,
  }
}

fn is_positive(x: f64) -> bool { x.is_finite() && x > 0.0 }

/// The three derived columns every Vs30 row carries.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedColumns {
  pub record_name:       String,
  pub vs30_log_residual: f64,
  pub gwl_residual:      f64,
}

/// Inputs to [`DerivedColumns::compute`], borrowed from a queried row.
#[derive(Debug, Clone, Copy)]
pub struct DerivedInputs<'a> {
  pub type_prefix:  &'a str,
  pub nzgd_id:      i64,
  pub vs30:         Option<f64>,
  pub model_vs30:   Option<f64>,
  pub measured_gwl: Option<f64>,
  pub model_gwl:    Option<f64>,
}

impl DerivedColumns {
  pub fn compute(inputs: DerivedInputs<'_>) -> Self {
    Self {
      record_name:       record_name(inputs.type_prefix, inputs.nzgd_id),
      vs30_log_residual: vs30_log_residual(inputs.vs30, inputs.model_vs30),
      gwl_residual:      gwl_residual(inputs.measured_gwl, inputs.model_gwl),
    }
  }
}

// ─── Type prefix ─────────────────────────────────────────────────────────────

/// Investigation type prefixes that have a categorical code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypePrefix {
  Cpt,
  Scpt,
  Bh,
}

impl TypePrefix {
  /// Small-integer code used for categorical encoding downstream.
  pub fn code(self) -> u8 {
    match self {
      Self::Cpt => 0,
      Self::Scpt => 1,
      Self::Bh => 2,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Cpt => "CPT",
      Self::Scpt => "SCPT",
      Self::Bh => "BH",
    }
  }
}

impl FromStr for TypePrefix {
  type Err = ();

  fn from_str(s: &str) -> Result<Self, ()> {
    match s {
      "CPT" => Ok(Self::Cpt),
      "SCPT" => Ok(Self::Scpt),
      "BH" => Ok(Self::Bh),
      _ => Err(()),
    }
  }
}

/// Code for a stored type prefix; `None` for prefixes outside the known set.
pub fn type_number_code(type_prefix: &str) -> Option<u8> {
  type_prefix.parse::<TypePrefix>().ok().map(TypePrefix::code)
}
