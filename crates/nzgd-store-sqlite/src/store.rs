//! [`SqliteStore`]: the SQLite implementation of [`InvestigationStore`].

use std::{
  collections::HashMap,
  path::Path,
  time::Instant,
};

use nzgd_core::{
  correlation::{
    CorrelationEntry, CorrelationKind, CorrelationLookup, CorrelationSelection,
    ResolvedCorrelations, StaticLookup,
  },
  measurement::{CptMeasurement, DepthRange, SptMeasurement},
  soil::{SoilLayer, group_soil_layers},
  store::InvestigationStore,
  vs30::{CptVs30, SptVs30, Vs30Record},
};
use rusqlite::{Connection, OpenFlags, OptionalExtension as _};
use tracing::{debug, info};

use crate::{Error, Result, encode};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A read-only view of an NZGD SQLite database.
///
/// Owns one connection; it is closed when the store is dropped or
/// [`SqliteStore::close`]d.
pub struct SqliteStore {
  conn: Connection,
}

impl SqliteStore {
  /// Open the database at `path` read-only.
  ///
  /// Never creates a file. A missing file, or one that is not a SQLite
  /// database, fails here with [`Error::Open`] rather than at the first query.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let open_err = |source| Error::Open { path: path.to_path_buf(), source };

    let conn = Connection::open_with_flags(
      path,
      OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(open_err)?;

    // SQLite opens lazily; touch the header so a bad file fails now.
    conn
      .query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))
      .map_err(open_err)?;

    debug!(?path, "opened database read-only");
    Ok(Self { conn })
  }

  /// Wrap an already-open connection, e.g. an in-memory fixture.
  pub fn from_connection(conn: Connection) -> Self { Self { conn } }

  /// Close the connection, reporting any error SQLite raises on close.
  pub fn close(self) -> Result<()> {
    self.conn.close().map_err(|(_, e)| Error::Database(e))
  }

  /// Read all four lookup tables into memory.
  pub fn load_lookup(&self) -> Result<StaticLookup> {
    Ok(self.correlations()?.into_iter().collect())
  }

  /// The bulk query with names already resolved to ids.
  ///
  /// Each branch narrows the estimate table one id at a time, starting with
  /// the Vs-to-Vs30 correlation (fewest distinct values), and only then joins
  /// the metadata tables.
  pub fn all_vs30s_resolved(&self, ids: &ResolvedCorrelations) -> Result<Vec<Vs30Record>> {
    let started = Instant::now();
    let mut cpt = self.bulk_cpt_vs30s(ids)?;
    info!(
      rows = cpt.len(),
      elapsed_ms = started.elapsed().as_millis() as u64,
      "extracted CPT Vs30s and metadata"
    );

    let started = Instant::now();
    let spt = self.bulk_spt_vs30s(ids)?;
    info!(
      rows = spt.len(),
      elapsed_ms = started.elapsed().as_millis() as u64,
      "extracted SPT Vs30s and metadata"
    );

    cpt.extend(spt);
    for row in &mut cpt {
      row.fill_derived();
    }
    Ok(cpt)
  }

  fn bulk_cpt_vs30s(&self, ids: &ResolvedCorrelations) -> Result<Vec<Vs30Record>> {
    debug!(
      vs_to_vs30_id = ids.vs_to_vs30_id,
      cpt_to_vs_id = ids.cpt_to_vs_id,
      "querying CPT Vs30 estimates"
    );
    let mut stmt = self.conn.prepare(
      "WITH first_filter AS (
         SELECT cpt_id, nzgd_id, cpt_to_vs_correlation_id, vs30, vs30_stddev
         FROM cptvs30estimates
         WHERE vs_to_vs30_correlation_id = ?1
       ), second_filter AS (
         SELECT cpt_id, nzgd_id, vs30, vs30_stddev
         FROM first_filter
         WHERE cpt_to_vs_correlation_id = ?2
       )
       SELECT
         sf.cpt_id, sf.nzgd_id, sf.vs30, sf.vs30_stddev,
         n.type_prefix, n.original_reference, n.investigation_date, n.published_date,
         n.latitude, n.longitude,
         n.model_vs30_foster_2019, n.model_vs30_stddev_foster_2019,
         n.model_gwl_westerhoff_2019,
         cr.tip_net_area_ratio AS cpt_tip_net_area_ratio,
         cr.measured_gwl, cr.deepest_depth, cr.shallowest_depth,
         r.name   AS region,
         d.name   AS district,
         sub.name AS suburb,
         cty.name AS city
       FROM second_filter AS sf
       JOIN nzgdrecord AS n   ON sf.nzgd_id = n.nzgd_id
       JOIN region     AS r   ON n.region_id = r.region_id
       JOIN district   AS d   ON n.district_id = d.district_id
       JOIN suburb     AS sub ON n.suburb_id = sub.suburb_id
       JOIN city       AS cty ON n.city_id = cty.city_id
       JOIN cptreport  AS cr  ON sf.cpt_id = cr.cpt_id",
    )?;
    let rows = stmt
      .query_map(rusqlite::params![ids.vs_to_vs30_id, ids.cpt_to_vs_id], encode::bulk_cpt)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }

  fn bulk_spt_vs30s(&self, ids: &ResolvedCorrelations) -> Result<Vec<Vs30Record>> {
    debug!(
      vs_to_vs30_id = ids.vs_to_vs30_id,
      spt_to_vs_id = ids.spt_to_vs_id,
      hammer_type_id = ids.hammer_type_id,
      "querying SPT Vs30 estimates"
    );
    let mut stmt = self.conn.prepare(
      "WITH first_filter AS (
         SELECT spt_id, spt_to_vs_correlation_id, hammer_type_id, vs30, vs30_stddev
         FROM sptvs30estimates
         WHERE vs_to_vs30_correlation_id = ?1
       ), second_filter AS (
         SELECT spt_id, hammer_type_id, vs30, vs30_stddev
         FROM first_filter
         WHERE spt_to_vs_correlation_id = ?2
       ), third_filter AS (
         SELECT spt_id, vs30, vs30_stddev
         FROM second_filter
         WHERE hammer_type_id = ?3
       )
       SELECT
         tf.spt_id AS nzgd_id, tf.vs30, tf.vs30_stddev,
         n.type_prefix, n.original_reference, n.investigation_date, n.published_date,
         n.latitude, n.longitude,
         n.model_vs30_foster_2019, n.model_vs30_stddev_foster_2019,
         n.model_gwl_westerhoff_2019,
         sr.measured_gwl,
         sr.efficiency        AS spt_efficiency,
         sr.borehole_diameter AS spt_borehole_diameter,
         r.name   AS region,
         d.name   AS district,
         sub.name AS suburb,
         cty.name AS city
       FROM third_filter AS tf
       JOIN nzgdrecord AS n   ON tf.spt_id = n.nzgd_id
       JOIN sptreport  AS sr  ON tf.spt_id = sr.borehole_id
       JOIN region     AS r   ON n.region_id = r.region_id
       JOIN district   AS d   ON n.district_id = d.district_id
       JOIN suburb     AS sub ON n.suburb_id = sub.suburb_id
       JOIN city       AS cty ON n.city_id = cty.city_id",
    )?;
    let mut rows = stmt
      .query_map(
        rusqlite::params![ids.vs_to_vs30_id, ids.spt_to_vs_id, ids.hammer_type_id],
        encode::bulk_spt,
      )?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    let ranges = self.spt_depth_ranges()?;
    encode::join_depth_ranges(&mut rows, &ranges);
    Ok(rows)
  }

  /// Shallowest and deepest SPT depth of every borehole, in one aggregate.
  fn spt_depth_ranges(&self) -> Result<HashMap<i64, DepthRange>> {
    let mut stmt = self.conn.prepare(
      "SELECT borehole_id,
              MIN(depth) AS shallowest_depth,
              MAX(depth) AS deepest_depth
       FROM sptmeasurements
       GROUP BY borehole_id",
    )?;
    let ranges = stmt
      .query_map([], encode::depth_range_by_borehole)?
      .collect::<rusqlite::Result<HashMap<_, _>>>()?;
    Ok(ranges)
  }
}

// ─── CorrelationLookup impl ──────────────────────────────────────────────────

impl CorrelationLookup for SqliteStore {
  type Error = Error;

  fn lookup_id(&self, kind: CorrelationKind, name: &str) -> Result<Option<i64>> {
    let sql = format!(
      "SELECT {id} FROM {table} WHERE name = ?1",
      id = kind.id_column(),
      table = kind.table(),
    );
    let id = self
      .conn
      .query_row(&sql, rusqlite::params![name], |row| row.get(0))
      .optional()?;
    debug!(%kind, name, ?id, "resolved lookup name");
    Ok(id)
  }
}

// ─── InvestigationStore impl ─────────────────────────────────────────────────

impl InvestigationStore for SqliteStore {
  fn cpt_measurements(&self, nzgd_id: i64) -> Result<Vec<CptMeasurement>> {
    let started = Instant::now();
    let mut stmt = self.conn.prepare(
      "SELECT
         m.depth, m.qc, m.fs, m.u2, m.cpt_id,
         r.nzgd_id
       FROM cptmeasurements AS m
       JOIN cptreport AS r ON m.cpt_id = r.cpt_id
       WHERE r.nzgd_id = ?1
       ORDER BY m.depth ASC",
    )?;
    let rows = stmt
      .query_map(rusqlite::params![nzgd_id], encode::cpt_measurement)?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    info!(
      nzgd_id,
      rows = rows.len(),
      elapsed_ms = started.elapsed().as_millis() as u64,
      "extracted CPT measurements"
    );
    Ok(rows)
  }

  fn spt_measurements(&self, nzgd_id: i64) -> Result<Vec<SptMeasurement>> {
    let started = Instant::now();
    let mut stmt = self.conn.prepare(
      "SELECT depth, n, borehole_id AS nzgd_id
       FROM sptmeasurements
       WHERE borehole_id = ?1
       ORDER BY depth ASC",
    )?;
    let rows = stmt
      .query_map(rusqlite::params![nzgd_id], encode::spt_measurement)?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    info!(
      nzgd_id,
      rows = rows.len(),
      elapsed_ms = started.elapsed().as_millis() as u64,
      "extracted SPT measurements"
    );
    Ok(rows)
  }

  fn spt_soil_types(&self, nzgd_id: i64) -> Result<Vec<SoilLayer>> {
    let mut stmt = self.conn.prepare(
      "SELECT
         sr.borehole_id AS nzgd_id,
         sm.top_depth,
         st.name AS soil_type
       FROM sptreport AS sr
       JOIN soilmeasurements        AS sm  ON sm.report_id = sr.borehole_id
       JOIN soilmeasurementsoiltype AS smt ON smt.soil_measurement_id = sm.measurement_id
       JOIN soiltypes               AS st  ON smt.soil_type_id = st.id
       WHERE sr.borehole_id = ?1
       ORDER BY sm.top_depth ASC, smt.rowid ASC",
    )?;
    let rows = stmt
      .query_map(rusqlite::params![nzgd_id], encode::soil_type_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    let layers = group_soil_layers(rows);
    debug!(nzgd_id, layers = layers.len(), "grouped soil layers");
    Ok(layers)
  }

  fn cpt_vs30s(&self, nzgd_id: i64) -> Result<Vec<CptVs30>> {
    let started = Instant::now();
    let mut stmt = self.conn.prepare(
      "SELECT
         e.cpt_id, e.nzgd_id, e.vs30, e.vs30_stddev,
         cr.cpt_file,
         cr.tip_net_area_ratio AS cpt_tip_net_area_ratio,
         cr.measured_gwl, cr.deepest_depth, cr.shallowest_depth,
         c.name AS cpt_to_vs_correlation,
         v.name AS vs_to_vs30_correlation,
         n.type_prefix, n.original_reference, n.investigation_date, n.published_date,
         n.latitude, n.longitude,
         n.model_vs30_foster_2019, n.model_vs30_stddev_foster_2019,
         n.model_gwl_westerhoff_2019,
         region.name   AS region,
         district.name AS district,
         city.name     AS city,
         suburb.name   AS suburb
       FROM cptvs30estimates AS e
       JOIN cpttovscorrelation  AS c
         ON e.cpt_to_vs_correlation_id = c.cpt_to_vs_correlation_id
       JOIN vstovs30correlation AS v
         ON e.vs_to_vs30_correlation_id = v.vs_to_vs30_correlation_id
       JOIN cptreport  AS cr ON e.cpt_id = cr.cpt_id
       JOIN nzgdrecord AS n  ON e.nzgd_id = n.nzgd_id
       JOIN region   ON n.region_id = region.region_id
       JOIN district ON n.district_id = district.district_id
       JOIN suburb   ON n.suburb_id = suburb.suburb_id
       JOIN city     ON n.city_id = city.city_id
       WHERE e.nzgd_id = ?1",
    )?;
    let mut rows = stmt
      .query_map(rusqlite::params![nzgd_id], encode::cpt_vs30)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    for row in &mut rows {
      row.fill_derived();
    }

    info!(
      nzgd_id,
      rows = rows.len(),
      elapsed_ms = started.elapsed().as_millis() as u64,
      "extracted CPT Vs30s"
    );
    Ok(rows)
  }

  fn spt_vs30s(&self, nzgd_id: i64) -> Result<Vec<SptVs30>> {
    let started = Instant::now();
    let mut stmt = self.conn.prepare(
      "SELECT
         e.spt_id AS nzgd_id,
         e.borehole_diameter    AS spt_borehole_diameter_for_vs30_calculation,
         e.vs30, e.vs30_stddev,
         e.vs30_used_efficiency AS spt_vs30_calculation_used_efficiency,
         e.vs30_used_soil_info  AS spt_vs30_calculation_used_soil_info,
         sr.borehole_file,
         sr.efficiency        AS spt_efficiency,
         sr.borehole_diameter AS spt_borehole_diameter,
         sr.measured_gwl,
         s.name AS spt_to_vs_correlation,
         v.name AS vs_to_vs30_correlation,
         n.type_prefix, n.original_reference, n.investigation_date, n.published_date,
         n.latitude, n.longitude,
         n.model_vs30_foster_2019, n.model_vs30_stddev_foster_2019,
         n.model_gwl_westerhoff_2019,
         h.name AS hammer_type,
         region.name   AS region,
         district.name AS district,
         city.name     AS city,
         suburb.name   AS suburb
       FROM sptvs30estimates AS e
       JOIN spttovscorrelation  AS s
         ON e.spt_to_vs_correlation_id = s.correlation_id
       JOIN vstovs30correlation AS v
         ON e.vs_to_vs30_correlation_id = v.vs_to_vs30_correlation_id
       JOIN sptreport           AS sr ON e.spt_id = sr.borehole_id
       JOIN spttovs30hammertype AS h  ON e.hammer_type_id = h.hammer_id
       JOIN nzgdrecord          AS n  ON e.spt_id = n.nzgd_id
       JOIN region   ON n.region_id = region.region_id
       JOIN district ON n.district_id = district.district_id
       JOIN suburb   ON n.suburb_id = suburb.suburb_id
       JOIN city     ON n.city_id = city.city_id
       WHERE e.spt_id = ?1",
    )?;
    let mut rows = stmt
      .query_map(rusqlite::params![nzgd_id], encode::spt_vs30)?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    // The estimate table does not carry depth extents; take them from the
    // borehole's measurements.
    let range = DepthRange::of(self.spt_measurements(nzgd_id)?.iter().map(|m| m.depth));
    for row in &mut rows {
      row.set_depth_range(range);
      row.fill_derived();
    }

    info!(
      nzgd_id,
      rows = rows.len(),
      elapsed_ms = started.elapsed().as_millis() as u64,
      "extracted SPT Vs30s"
    );
    Ok(rows)
  }

  fn all_vs30s(&self, selection: &CorrelationSelection) -> Result<Vec<Vs30Record>> {
    let ids = selection.resolve(self)?;
    self.all_vs30s_resolved(&ids)
  }

  fn correlations(&self) -> Result<Vec<CorrelationEntry>> {
    let mut entries = Vec::new();
    for kind in CorrelationKind::ALL {
      let sql = format!(
        "SELECT {id} AS id, name FROM {table} ORDER BY {id}",
        id = kind.id_column(),
        table = kind.table(),
      );
      let mut stmt = self.conn.prepare(&sql)?;
      let rows = stmt
        .query_map([], encode::correlation_entry(kind))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      entries.extend(rows);
    }
    Ok(entries)
  }
}
