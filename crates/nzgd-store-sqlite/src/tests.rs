//! Integration tests for `SqliteStore` against an in-memory fixture database.

use std::io::Write as _;

use nzgd_core::{
  correlation::{
    CorrelationKind, CorrelationLookup, CorrelationSelection, ResolvedCorrelations,
  },
  soil::THICKNESS_NOT_AVAILABLE,
  store::InvestigationStore,
  vs30::Vs30Source,
};
use rusqlite::Connection;

use crate::{Error, SqliteStore, schema::SCHEMA};

/// Two CPTs under record 100, an SCPT (101) with no model predictions, a
/// borehole (200) with measurements and soil layers, and a borehole (201)
/// with neither measurements nor a Vs30 value.
const FIXTURE: &str = "
INSERT INTO region   VALUES (1, 'Canterbury');
INSERT INTO district VALUES (1, 'Christchurch City');
INSERT INTO city     VALUES (1, 'Christchurch');
INSERT INTO suburb   VALUES (1, 'Riccarton');

INSERT INTO nzgdrecord VALUES
  (100, 'CPT',  'ref-100', '2012-03-04', '2013-01-01', -43.53, 172.60, 1, 1, 1, 1, 200.0, 0.3, 1.5),
  (101, 'SCPT', 'ref-101', '2014-05-06', '2015-01-01', -43.54, 172.61, 1, 1, 1, 1, NULL,  NULL, NULL),
  (200, 'BH',   'ref-200', '2011-07-08', '2012-01-01', -43.55, 172.62, 1, 1, 1, 1, 250.0, 0.25, 2.0),
  (201, 'BH',   'ref-201', NULL,         NULL,         -43.56, 172.63, 1, 1, 1, 1, 300.0, 0.2, 3.0);

INSERT INTO cptreport VALUES
  (1, 100, 'CPT_100_a.xls', 0.8,  1.0, 3.0, 0.5),
  (2, 100, 'CPT_100_b.xls', 0.75, 1.2, 1.5, 0.2),
  (3, 101, 'SCPT_101.xls',  0.8,  2.0, 9.0, 0.1);

-- Deliberately out of depth order.
INSERT INTO cptmeasurements (cpt_id, depth, qc, fs, u2) VALUES
  (1, 2.0, 5.1, 0.05, 0.01),
  (2, 1.5, 3.3, 0.03, NULL),
  (1, 0.5, 2.2, 0.02, 0.00),
  (2, 0.2, 1.1, 0.01, NULL),
  (1, 1.0, 4.0, 0.04, 0.02);

INSERT INTO sptreport VALUES
  (200, 'BH_200.pdf', 0.6, 100.0, 2.5),
  (201, 'BH_201.pdf', NULL, NULL, NULL);

INSERT INTO sptmeasurements (borehole_id, depth, n) VALUES
  (200, 3.0, 10),
  (200, 1.5, 5),
  (200, 4.5, 20);

INSERT INTO soiltypes VALUES (1, 'sand'), (2, 'silt'), (3, 'gravel'), (4, 'clay');

INSERT INTO soilmeasurements VALUES
  (1, 200, 0.0),
  (2, 200, 1.0),
  (3, 200, 2.5),
  (4, 200, 1.00003);

-- The layer at 1.0 m carries two labels.
INSERT INTO soilmeasurementsoiltype VALUES
  (1, 1),
  (2, 2),
  (2, 4),
  (3, 1),
  (4, 3);

INSERT INTO vstovs30correlation VALUES (1, 'boore_2004'), (2, 'boore_2011');
INSERT INTO cpttovscorrelation  VALUES (1, 'andrus_2007_holocene'), (2, 'mcgann_2015');
INSERT INTO spttovscorrelation  VALUES (1, 'brandenberg_2010'), (2, 'kwak_2015');
INSERT INTO spttovs30hammertype VALUES (1, 'Auto'), (2, 'Safety'), (3, 'Standard');

INSERT INTO cptvs30estimates
  (cpt_id, nzgd_id, cpt_to_vs_correlation_id, vs_to_vs30_correlation_id, vs30, vs30_stddev)
VALUES
  (1, 100, 2, 1, 220.0, 0.2),
  (1, 100, 1, 1, 210.0, 0.2),
  (2, 100, 2, 1, 230.0, 0.2),
  (3, 101, 2, 1, 180.0, 0.3),
  (1, 100, 2, 2, 225.0, 0.2);

INSERT INTO sptvs30estimates
  (spt_id, spt_to_vs_correlation_id, vs_to_vs30_correlation_id, hammer_type_id,
   borehole_diameter, vs30_used_efficiency, vs30_used_soil_info, vs30, vs30_stddev)
VALUES
  (200, 2, 1, 3, 100.0, 1, 1, 260.0, 0.25),
  (200, 1, 1, 3, 100.0, 1, 0, 255.0, 0.25),
  (201, 2, 1, 3, NULL,  0, 0, NULL,  NULL),
  (200, 2, 1, 1, 100.0, 1, 1, 240.0, 0.25);
";

fn store() -> SqliteStore { store_with("") }

/// The fixture with `extra` SQL applied on top.
fn store_with(extra: &str) -> SqliteStore {
  let conn = Connection::open_in_memory().expect("in-memory db");
  conn.execute_batch(SCHEMA).expect("schema");
  conn.execute_batch(FIXTURE).expect("fixture");
  conn.execute_batch(extra).expect("extra fixture sql");
  SqliteStore::from_connection(conn)
}

fn default_selection() -> CorrelationSelection {
  CorrelationSelection::new("boore_2004", "mcgann_2015", "kwak_2015", "Standard")
}

fn close(a: f64, b: f64) -> bool { (a - b).abs() < 1e-9 }

// ─── Connection ──────────────────────────────────────────────────────────────

#[test]
fn open_missing_file_fails_without_creating_it() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("missing.db");

  let err = SqliteStore::open(&path).err().expect("open should fail");
  assert!(matches!(err, Error::Open { .. }));
  assert!(!path.exists());
}

#[test]
fn open_non_database_file_fails() {
  let mut file = tempfile::NamedTempFile::new().unwrap();
  file
    .write_all(b"this is definitely not a sqlite database, just some text padding it out")
    .unwrap();

  let err = SqliteStore::open(file.path()).err().expect("open should fail");
  assert!(matches!(err, Error::Open { .. }));
}

#[test]
fn open_file_database_read_only() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("nzgd.db");
  {
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(SCHEMA).unwrap();
    conn.execute_batch(FIXTURE).unwrap();
  }

  let s = SqliteStore::open(&path).unwrap();
  assert_eq!(s.spt_measurements(200).unwrap().len(), 3);
  s.close().unwrap();
}

// ─── Measurements ────────────────────────────────────────────────────────────

#[test]
fn cpt_measurements_cover_every_cpt_of_the_record() {
  let rows = store().cpt_measurements(100).unwrap();
  assert_eq!(rows.len(), 5);
  assert!(rows.iter().all(|r| r.nzgd_id == 100));

  let mut cpt_ids: Vec<_> = rows.iter().map(|r| r.cpt_id).collect();
  cpt_ids.sort();
  cpt_ids.dedup();
  assert_eq!(cpt_ids, vec![1, 2]);

  assert!(rows.windows(2).all(|w| w[0].depth <= w[1].depth));
  for cpt_id in [1, 2] {
    let depths: Vec<f64> = rows.iter().filter(|r| r.cpt_id == cpt_id).map(|r| r.depth).collect();
    assert!(depths.windows(2).all(|w| w[0] <= w[1]));
  }
}

#[test]
fn cpt_measurements_keep_null_readings() {
  let rows = store().cpt_measurements(100).unwrap();
  let first = &rows[0];
  assert_eq!((first.cpt_id, first.depth), (2, 0.2));
  assert_eq!(first.qc, Some(1.1));
  assert_eq!(first.u2, None);
}

#[test]
fn cpt_measurements_unknown_record_is_empty() {
  assert!(store().cpt_measurements(999).unwrap().is_empty());
}

#[test]
fn spt_measurements_sorted_by_depth() {
  let rows = store().spt_measurements(200).unwrap();
  let depths: Vec<f64> = rows.iter().map(|r| r.depth).collect();
  assert_eq!(depths, vec![1.5, 3.0, 4.5]);
  assert_eq!(rows[0].n, Some(5.0));
  assert!(rows.iter().all(|r| r.nzgd_id == 200));
}

#[test]
fn spt_measurements_empty_borehole() {
  assert!(store().spt_measurements(201).unwrap().is_empty());
}

// ─── Soil types ──────────────────────────────────────────────────────────────

#[test]
fn soil_layers_grouped_by_rounded_top_depth() {
  let layers = store().spt_soil_types(200).unwrap();
  assert_eq!(layers.len(), 3);

  assert_eq!(layers[0].top_depth, 0.0);
  assert_eq!(layers[0].soil_type, "sand");
  assert_eq!(layers[0].layer_thickness, "1.0000");

  // 1.0 carries silt and clay; 1.00003 rounds onto it and adds gravel.
  assert_eq!(layers[1].top_depth, 1.0);
  assert_eq!(layers[1].soil_type, "silt + clay + gravel");
  assert_eq!(layers[1].layer_thickness, "1.5000");

  assert_eq!(layers[2].top_depth, 2.5);
  assert_eq!(layers[2].layer_thickness, THICKNESS_NOT_AVAILABLE);
  assert!(layers.iter().all(|l| l.nzgd_id == 200));
}

#[test]
fn soil_layers_for_borehole_without_soil_data() {
  assert!(store().spt_soil_types(201).unwrap().is_empty());
}

// ─── Per-record Vs30 ─────────────────────────────────────────────────────────

#[test]
fn cpt_vs30s_with_derived_columns() {
  let rows = store().cpt_vs30s(100).unwrap();
  assert_eq!(rows.len(), 4);

  let row = rows
    .iter()
    .find(|r| r.cpt_id == 1 && r.cpt_to_vs_correlation == "mcgann_2015"
      && r.vs_to_vs30_correlation == "boore_2004")
    .expect("cpt 1 / mcgann / boore_2004");
  assert_eq!(row.record_name, "CPT_100");
  assert!(close(row.vs30_log_residual, 220f64.ln() - 200f64.ln()));
  assert!(close(row.gwl_residual, -0.5));
  assert_eq!(row.cpt_tip_net_area_ratio, Some(0.8));
  assert_eq!(row.cpt_file.as_deref(), Some("CPT_100_a.xls"));
  assert_eq!(row.region.as_deref(), Some("Canterbury"));
  assert_eq!(row.suburb.as_deref(), Some("Riccarton"));
}

#[test]
fn cpt_vs30s_missing_model_is_nan_not_error() {
  let rows = store().cpt_vs30s(101).unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].record_name, "SCPT_101");
  assert!(rows[0].vs30_log_residual.is_nan());
  assert!(rows[0].gwl_residual.is_nan());
}

#[test]
fn non_numeric_model_value_gives_nan_residual() {
  let s = store_with(
    "UPDATE nzgdrecord SET model_vs30_foster_2019 = 'n/a' WHERE nzgd_id = 100;
     UPDATE cptreport  SET measured_gwl = 'dry' WHERE cpt_id = 1;",
  );

  let rows = s.cpt_vs30s(100).unwrap();
  assert_eq!(rows.len(), 4);
  for row in &rows {
    assert_eq!(row.model_vs30_foster_2019, None);
    assert!(row.vs30_log_residual.is_nan());
  }
  let cpt1 = rows.iter().find(|r| r.cpt_id == 1).unwrap();
  assert_eq!(cpt1.measured_gwl, None);
  assert!(cpt1.gwl_residual.is_nan());
  let cpt2 = rows.iter().find(|r| r.cpt_id == 2).unwrap();
  assert!(close(cpt2.gwl_residual, 1.2 - 1.5));

  let bulk = s.all_vs30s(&default_selection()).unwrap();
  assert_eq!(bulk.len(), 5);
  for row in bulk.iter().filter(|r| r.nzgd_id == 100) {
    assert!(row.vs30_log_residual.is_nan());
  }
  let bh = bulk.iter().find(|r| r.nzgd_id == 200).unwrap();
  assert!(close(bh.vs30_log_residual, 260f64.ln() - 250f64.ln()));
}

#[test]
fn spt_vs30s_fill_depth_range_from_measurements() {
  let rows = store().spt_vs30s(200).unwrap();
  assert_eq!(rows.len(), 3);
  for row in &rows {
    assert_eq!(row.shallowest_depth, Some(1.5));
    assert_eq!(row.deepest_depth, Some(4.5));
    assert_eq!(row.record_name, "BH_200");
    assert_eq!(row.spt_efficiency, Some(0.6));
    assert!(close(row.gwl_residual, 0.5));
  }

  let kwak = rows
    .iter()
    .find(|r| r.spt_to_vs_correlation == "kwak_2015" && r.hammer_type == "Standard")
    .unwrap();
  assert!(close(kwak.vs30_log_residual, 260f64.ln() - 250f64.ln()));
  assert_eq!(kwak.spt_vs30_calculation_used_efficiency.as_deref(), Some("1"));
}

#[test]
fn spt_vs30s_missing_vs30_and_measurements() {
  let rows = store().spt_vs30s(201).unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].vs30, None);
  assert!(rows[0].vs30_log_residual.is_nan());
  assert_eq!(rows[0].shallowest_depth, None);
  assert_eq!(rows[0].deepest_depth, None);
}

// ─── Bulk Vs30 ───────────────────────────────────────────────────────────────

#[test]
fn all_vs30s_concatenates_cpt_then_spt() {
  let rows = store().all_vs30s(&default_selection()).unwrap();
  assert_eq!(rows.len(), 5);

  let sources: Vec<_> = rows.iter().map(|r| r.source()).collect();
  assert_eq!(sources, vec![
    Vs30Source::Cpt,
    Vs30Source::Cpt,
    Vs30Source::Cpt,
    Vs30Source::Spt,
    Vs30Source::Spt,
  ]);

  let mut cpt_ids: Vec<_> = rows.iter().filter_map(|r| r.cpt_id).collect();
  cpt_ids.sort();
  assert_eq!(cpt_ids, vec![1, 2, 3]);
}

#[test]
fn all_vs30s_union_schema_leaves_other_type_absent() {
  let rows = store().all_vs30s(&default_selection()).unwrap();

  for row in rows.iter().filter(|r| r.source() == Vs30Source::Cpt) {
    assert!(row.spt_efficiency.is_none());
    assert!(row.spt_borehole_diameter.is_none());
    assert!(row.cpt_tip_net_area_ratio.is_some());
  }
  for row in rows.iter().filter(|r| r.source() == Vs30Source::Spt) {
    assert!(row.cpt_tip_net_area_ratio.is_none());
  }

  let bh_200 = rows.iter().find(|r| r.nzgd_id == 200).unwrap();
  assert_eq!(bh_200.spt_efficiency, Some(0.6));
  assert_eq!(bh_200.spt_borehole_diameter, Some(100.0));
  assert_eq!((bh_200.shallowest_depth, bh_200.deepest_depth), (Some(1.5), Some(4.5)));
  assert_eq!(bh_200.vs30, Some(260.0));

  let bh_201 = rows.iter().find(|r| r.nzgd_id == 201).unwrap();
  assert_eq!((bh_201.shallowest_depth, bh_201.deepest_depth), (None, None));
  assert!(bh_201.vs30_log_residual.is_nan());
}

#[test]
fn all_vs30s_derived_columns_and_type_codes() {
  let rows = store().all_vs30s(&default_selection()).unwrap();

  for row in &rows {
    assert_eq!(row.record_name, format!("{}_{}", row.type_prefix, row.nzgd_id));
  }

  let codes: Vec<_> = rows.iter().map(|r| (r.nzgd_id, r.type_number_code)).collect();
  assert!(codes.contains(&(100, Some(0))));
  assert!(codes.contains(&(101, Some(1))));
  assert!(codes.contains(&(200, Some(2))));

  let scpt = rows.iter().find(|r| r.nzgd_id == 101).unwrap();
  assert!(scpt.vs30_log_residual.is_nan());
  assert_eq!(scpt.region.as_deref(), Some("Canterbury"));
  assert_eq!(scpt.city.as_deref(), Some("Christchurch"));
}

#[test]
fn all_vs30s_other_correlations_select_other_rows() {
  let s = store();
  let selection =
    CorrelationSelection::new("boore_2011", "mcgann_2015", "kwak_2015", "Standard");
  let rows = s.all_vs30s(&selection).unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].vs30, Some(225.0));
}

#[test]
fn all_vs30s_unknown_name_is_a_lookup_failure() {
  let s = store();
  let selection =
    CorrelationSelection::new("boore_2004", "mcgann_2015", "kwak_2015", "Turbo");
  let err = s.all_vs30s(&selection).unwrap_err();

  assert!(err.is_unknown_name());
  match err {
    Error::Core(nzgd_core::Error::UnknownName { kind, name }) => {
      assert_eq!(kind, CorrelationKind::HammerType);
      assert_eq!(name, "Turbo");
    }
    other => panic!("expected UnknownName, got {other:?}"),
  }
}

#[test]
fn all_vs30s_with_preloaded_ids() {
  let s = store();
  let ids = default_selection().resolve(&s.load_lookup().unwrap()).unwrap();
  assert_eq!(ids, ResolvedCorrelations {
    vs_to_vs30_id:  1,
    cpt_to_vs_id:   2,
    spt_to_vs_id:   2,
    hammer_type_id: 3,
  });
  assert_eq!(s.all_vs30s_resolved(&ids).unwrap().len(), 5);
}

// ─── Lookups ─────────────────────────────────────────────────────────────────

#[test]
fn store_and_static_lookup_agree() {
  let s = store();
  let preloaded = s.load_lookup().unwrap();
  for entry in s.correlations().unwrap() {
    assert_eq!(preloaded.lookup_id(entry.kind, &entry.name).unwrap(), Some(entry.id));
  }

  for (kind, name) in [
    (CorrelationKind::VsToVs30, "boore_2011"),
    (CorrelationKind::CptToVs, "andrus_2007_holocene"),
    (CorrelationKind::SptToVs, "brandenberg_2010"),
    (CorrelationKind::HammerType, "Safety"),
    (CorrelationKind::HammerType, "Turbo"),
  ] {
    assert_eq!(
      s.lookup_id(kind, name).unwrap(),
      preloaded.lookup_id(kind, name).unwrap(),
      "{kind} {name}"
    );
  }
}

#[test]
fn correlations_lists_every_table() {
  let entries = store().correlations().unwrap();
  assert_eq!(entries.len(), 9);
  assert_eq!(entries[0].kind, CorrelationKind::VsToVs30);
  assert_eq!(entries[0].name, "boore_2004");
  assert!(
    entries
      .iter()
      .any(|e| e.kind == CorrelationKind::HammerType && e.name == "Standard" && e.id == 3)
  );
}
