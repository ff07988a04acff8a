//! The subset of the NZGD database schema this crate reads.
//!
//! The store is never migrated or written by this crate; the DDL below is
//! the read contract, and is used to build fixture databases in tests.

/// DDL for every table and column the queries touch.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS region (
    region_id INTEGER PRIMARY KEY,
    name      TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS district (
    district_id INTEGER PRIMARY KEY,
    name        TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS city (
    city_id INTEGER PRIMARY KEY,
    name    TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS suburb (
    suburb_id INTEGER PRIMARY KEY,
    name      TEXT NOT NULL
);

-- One row per site investigation.
CREATE TABLE IF NOT EXISTS nzgdrecord (
    nzgd_id                       INTEGER PRIMARY KEY,
    type_prefix                   TEXT NOT NULL,   -- 'CPT' | 'SCPT' | 'BH' | ...
    original_reference            TEXT,
    investigation_date            TEXT,
    published_date                TEXT,
    latitude                      REAL,
    longitude                     REAL,
    region_id                     INTEGER REFERENCES region(region_id),
    district_id                   INTEGER REFERENCES district(district_id),
    city_id                       INTEGER REFERENCES city(city_id),
    suburb_id                     INTEGER REFERENCES suburb(suburb_id),
    model_vs30_foster_2019        REAL,
    model_vs30_stddev_foster_2019 REAL,
    model_gwl_westerhoff_2019     REAL
);

CREATE TABLE IF NOT EXISTS cptreport (
    cpt_id             INTEGER PRIMARY KEY,
    nzgd_id            INTEGER NOT NULL REFERENCES nzgdrecord(nzgd_id),
    cpt_file           TEXT,
    tip_net_area_ratio REAL,
    measured_gwl       REAL,
    deepest_depth      REAL,
    shallowest_depth   REAL
);

CREATE TABLE IF NOT EXISTS cptmeasurements (
    measurement_id INTEGER PRIMARY KEY,
    cpt_id         INTEGER NOT NULL REFERENCES cptreport(cpt_id),
    depth          REAL NOT NULL,
    qc             REAL,
    fs             REAL,
    u2             REAL
);

-- The borehole id is the NZGD id.
CREATE TABLE IF NOT EXISTS sptreport (
    borehole_id       INTEGER PRIMARY KEY REFERENCES nzgdrecord(nzgd_id),
    borehole_file     TEXT,
    efficiency        REAL,
    borehole_diameter REAL,
    measured_gwl      REAL
);

CREATE TABLE IF NOT EXISTS sptmeasurements (
    measurement_id INTEGER PRIMARY KEY,
    borehole_id    INTEGER NOT NULL REFERENCES sptreport(borehole_id),
    depth          REAL NOT NULL,
    n              REAL
);

CREATE TABLE IF NOT EXISTS soiltypes (
    id   INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS soilmeasurements (
    measurement_id INTEGER PRIMARY KEY,
    report_id      INTEGER NOT NULL REFERENCES sptreport(borehole_id),
    top_depth      REAL NOT NULL
);

-- Many-to-many: a soil layer may carry several soil types.
CREATE TABLE IF NOT EXISTS soilmeasurementsoiltype (
    soil_measurement_id INTEGER NOT NULL REFERENCES soilmeasurements(measurement_id),
    soil_type_id        INTEGER NOT NULL REFERENCES soiltypes(id)
);

CREATE TABLE IF NOT EXISTS vstovs30correlation (
    vs_to_vs30_correlation_id INTEGER PRIMARY KEY,
    name                      TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS cpttovscorrelation (
    cpt_to_vs_correlation_id INTEGER PRIMARY KEY,
    name                     TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS spttovscorrelation (
    correlation_id INTEGER PRIMARY KEY,
    name           TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS spttovs30hammertype (
    hammer_id INTEGER PRIMARY KEY,
    name      TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS cptvs30estimates (
    vs30_id                   INTEGER PRIMARY KEY,
    cpt_id                    INTEGER NOT NULL REFERENCES cptreport(cpt_id),
    nzgd_id                   INTEGER NOT NULL REFERENCES nzgdrecord(nzgd_id),
    cpt_to_vs_correlation_id  INTEGER NOT NULL
        REFERENCES cpttovscorrelation(cpt_to_vs_correlation_id),
    vs_to_vs30_correlation_id INTEGER NOT NULL
        REFERENCES vstovs30correlation(vs_to_vs30_correlation_id),
    vs30                      REAL,
    vs30_stddev               REAL
);

CREATE TABLE IF NOT EXISTS sptvs30estimates (
    vs30_id                   INTEGER PRIMARY KEY,
    spt_id                    INTEGER NOT NULL REFERENCES sptreport(borehole_id),
    spt_to_vs_correlation_id  INTEGER NOT NULL
        REFERENCES spttovscorrelation(correlation_id),
    vs_to_vs30_correlation_id INTEGER NOT NULL
        REFERENCES vstovs30correlation(vs_to_vs30_correlation_id),
    hammer_type_id            INTEGER NOT NULL
        REFERENCES spttovs30hammertype(hammer_id),
    borehole_diameter         REAL,
    vs30_used_efficiency      INTEGER,
    vs30_used_soil_info       INTEGER,
    vs30                      REAL,
    vs30_stddev               REAL
);

CREATE INDEX IF NOT EXISTS cptvs30_nzgd_idx      ON cptvs30estimates(nzgd_id);
CREATE INDEX IF NOT EXISTS cptmeasurements_cpt_idx ON cptmeasurements(cpt_id);
CREATE INDEX IF NOT EXISTS sptmeasurements_bh_idx  ON sptmeasurements(borehole_id);
";
