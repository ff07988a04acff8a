//! Column schema shared by every result row type.

/// A result row with a fixed, ordered set of output columns.
///
/// `COLUMNS` must list the serialised field names in declaration order so a
/// header can be written even when a result set is empty.
pub trait Columns {
  const COLUMNS: &'static [&'static str];
}
