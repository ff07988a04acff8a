//! CSV serialisation of result rows.

use std::io::Write;

use anyhow::{Context as _, Result};
use nzgd_core::table::Columns;
use serde::Serialize;

/// Write `rows` as CSV with a header row and no index column.
///
/// The header comes from [`Columns::COLUMNS`], so an empty result still
/// produces one. Absent values are empty fields; `NaN` residuals are
/// written as `NaN`.
pub fn write_csv<R, W>(rows: &[R], out: W) -> Result<()>
where
  R: Serialize + Columns,
  W: Write,
{
  let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
  writer.write_record(R::COLUMNS).context("failed to write CSV header")?;
  for row in rows {
    writer.serialize(row).context("failed to write CSV row")?;
  }
  writer.flush().context("failed to flush CSV output")?;
  Ok(())
}
