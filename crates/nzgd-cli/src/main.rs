//! `nzgd`: query an NZGD SQLite database and print CSV.
//!
//! # Usage
//!
//! ```text
//! nzgd --db-path nzgd.db cpt-measurements --nzgd-id 1234
//! nzgd --db-path nzgd.db all-vs30s \
//!   --vs30-correlation boore_2004 --cpt-to-vs-correlation mcgann_2015 \
//!   --spt-to-vs-correlation kwak_2015 --hammer-type Standard
//! ```
//!
//! Exits 1 when the database cannot be opened or queried, and 3 when a
//! correlation or hammer-type name is unknown.

mod config;
mod output;

use std::{
  fs,
  io::{self, Write},
  path::{Path, PathBuf},
  process::ExitCode,
};

use anyhow::{Context as _, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use nzgd_core::{correlation::CorrelationSelection, store::InvestigationStore, table::Columns};
use nzgd_store_sqlite::SqliteStore;
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::{CorrelationDefaults, Settings};

/// Exit code for an unknown correlation or hammer-type name.
const EXIT_UNKNOWN_NAME: u8 = 3;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "nzgd", version, about = "Query the NZGD SQLite database and print CSV")]
struct Cli {
  /// Path to the SQLite database file.
  #[arg(long, global = true, value_name = "FILE")]
  db_path: Option<PathBuf>,

  /// Path to a TOML config file.
  #[arg(short, long, global = true, value_name = "FILE", default_value = "nzgd.toml")]
  config: PathBuf,

  /// Write CSV here instead of standard output.
  #[arg(short, long, global = true, value_name = "FILE")]
  output: Option<PathBuf>,

  /// Log progress and timings to standard error.
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Args, Debug)]
struct RecordArgs {
  /// The NZGD ID to query.
  #[arg(long)]
  nzgd_id: i64,
}

#[derive(Args, Debug)]
struct CorrelationArgs {
  /// Vs to Vs30 correlation name (e.g. boore_2004).
  #[arg(long)]
  vs30_correlation:      Option<String>,
  /// CPT to Vs correlation name (e.g. mcgann_2015).
  #[arg(long)]
  cpt_to_vs_correlation: Option<String>,
  /// SPT to Vs correlation name (e.g. kwak_2015).
  #[arg(long)]
  spt_to_vs_correlation: Option<String>,
  /// SPT hammer type name (e.g. Standard).
  #[arg(long)]
  hammer_type:           Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// CPT measurements for an NZGD ID.
  CptMeasurements(RecordArgs),
  /// SPT measurements for an NZGD ID.
  SptMeasurements(RecordArgs),
  /// SPT soil layers for an NZGD ID.
  SptSoilTypes(RecordArgs),
  /// CPT Vs30 estimates for an NZGD ID.
  CptVs30s(RecordArgs),
  /// SPT Vs30 estimates for an NZGD ID.
  SptVs30s(RecordArgs),
  /// CPT and SPT Vs30 estimates for all records, for one set of correlations.
  AllVs30s(CorrelationArgs),
  /// List the correlation and hammer-type names in the database.
  Correlations,
}

impl CorrelationArgs {
  /// Fill omitted arguments from the config defaults.
  fn into_selection(self, defaults: CorrelationDefaults) -> Result<CorrelationSelection> {
    fn pick(arg: Option<String>, default: Option<String>, flag: &str) -> Result<String> {
      arg.or(default).ok_or_else(|| {
        anyhow!("missing --{flag} (or default_correlations.{} in the config)", flag.replace('-', "_"))
      })
    }

    Ok(CorrelationSelection::new(
      pick(self.vs30_correlation, defaults.vs30_correlation, "vs30-correlation")?,
      pick(
        self.cpt_to_vs_correlation,
        defaults.cpt_to_vs_correlation,
        "cpt-to-vs-correlation",
      )?,
      pick(
        self.spt_to_vs_correlation,
        defaults.spt_to_vs_correlation,
        "spt-to-vs-correlation",
      )?,
      pick(self.hammer_type, defaults.hammer_type, "hammer-type")?,
    ))
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() -> ExitCode {
  let cli = Cli::parse();

  // Logs go to stderr; stdout carries only CSV.
  let default_level = if cli.verbose { LevelFilter::INFO } else { LevelFilter::WARN };
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy(),
    )
    .init();

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      eprintln!("Error: {err:#}");
      let unknown_name = err
        .downcast_ref::<nzgd_store_sqlite::Error>()
        .is_some_and(nzgd_store_sqlite::Error::is_unknown_name);
      if unknown_name { ExitCode::from(EXIT_UNKNOWN_NAME) } else { ExitCode::FAILURE }
    }
  }
}

fn run(cli: Cli) -> Result<()> {
  let settings = Settings::load(&cli.config)?;

  // --db-path wins over both config sources.
  let db_path = cli
    .db_path
    .or(settings.db_path)
    .context("no database given: pass --db-path or set db_path / NZGD_DB_PATH")?;

  // Fails before anything is written, so a bad path leaves no output file.
  let store = SqliteStore::open(&db_path)?;
  let dest = cli.output.as_deref();

  match cli.command {
    Command::CptMeasurements(args) => emit(&store.cpt_measurements(args.nzgd_id)?, dest),
    Command::SptMeasurements(args) => emit(&store.spt_measurements(args.nzgd_id)?, dest),
    Command::SptSoilTypes(args) => emit(&store.spt_soil_types(args.nzgd_id)?, dest),
    Command::CptVs30s(args) => emit(&store.cpt_vs30s(args.nzgd_id)?, dest),
    Command::SptVs30s(args) => emit(&store.spt_vs30s(args.nzgd_id)?, dest),
    Command::AllVs30s(args) => {
      let selection = args.into_selection(settings.default_correlations)?;
      emit(&store.all_vs30s(&selection)?, dest)
    }
    Command::Correlations => emit(&store.correlations()?, dest),
  }
}

/// Render `rows` and only then touch the destination, so a failed query
/// leaves an existing `--output` file as it was.
fn emit<R: Serialize + Columns>(rows: &[R], dest: Option<&Path>) -> Result<()> {
  let mut csv = Vec::new();
  output::write_csv(rows, &mut csv)?;
  tracing::info!(rows = rows.len(), bytes = csv.len(), "writing CSV");

  match dest {
    Some(path) => {
      fs::write(path, &csv).with_context(|| format!("failed to write {}", path.display()))
    }
    None => {
      let mut stdout = io::stdout().lock();
      stdout.write_all(&csv).context("failed to write to stdout")?;
      stdout.flush().context("failed to flush stdout")
    }
  }
}
