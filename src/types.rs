//! Global type definitions.

use std::collections::HashMap;
use std::path::PathBuf;

/// Raw bytes of one field. No text encoding is assumed.
pub type Field = Vec<u8>;

/// Ordered fields of one delimited line.
pub type Row = Vec<Field>;

/// Maps normalized join keys to the first lookup row bearing that key.
pub type LookupDictionary = HashMap<Field, Row>;

/// Effective separators of a run, one byte each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Separators {
	pub primary: u8,
	pub lookup: u8,
	/// Used for the output file and for splitting value-column index lists.
	pub output: u8,
}

impl Default for Separators {
	fn default() -> Self {
		Self {
			primary: b';',
			lookup: b';',
			output: b';',
		}
	}
}

/// Quote handling on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quoting {
	/// Double quotes wrap fields and are escaped by doubling.
	#[default]
	Quoted,
	/// Quote characters are plain data.
	Unquoted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseMode {
	#[default]
	Sensitive,
	Insensitive,
}

impl CaseMode {
	/// Normalize a join key for dictionary insertion or lookup. Only ASCII letters are folded.
	pub fn normalize(self, key: &[u8]) -> Field {
		match self {
			CaseMode::Sensitive => key.to_vec(),
			CaseMode::Insensitive => key.to_ascii_lowercase(),
		}
	}
}

/// Where substitute values go relative to the join column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
	/// Keep the join column and insert the values right after it.
	#[default]
	Insert,
	/// Overwrite the join column with the values.
	Replace,
}

impl Placement {
	/// Number of leading fields kept past the join index.
	pub fn offset(self) -> usize {
		match self {
			Placement::Insert => 1,
			Placement::Replace => 0,
		}
	}
}

/// Immutable configuration of a run.
#[derive(Debug, Clone, Default)]
pub struct Options {
	pub headers: bool,
	pub placement: Placement,
	pub case: CaseMode,
	pub exclude: bool,
	pub found: bool,
	pub quoting: Quoting,
	pub separators: Separators,
}

/// Files and column arguments of a run, as given on the command line.
#[derive(Debug, Clone)]
pub struct LookupJob {
	pub primary: PathBuf,
	pub primary_column: String,
	pub lookup: PathBuf,
	pub lookup_column: String,
	pub value_columns: String,
	pub output: PathBuf,
}

/// Fetch a field, substituting an empty string past the end of the row.
pub fn field(row: &[Field], index: usize) -> &[u8] {
	row.get(index).map_or(&[][..], Vec::as_slice)
}

/// Select the fields at `columns`, in order.
pub fn select(row: &[Field], columns: &[usize]) -> Row {
	columns.iter().map(|&c| field(row, c).to_vec()).collect()
}

/// Splice `value` into `row` around the join column at `index`.
///
/// Produces `row[..index + offset] ++ value ++ row[index + 1..]`, clamping both slices to the
/// row length so that short rows never panic.
pub fn splice(row: &[Field], index: usize, value: Row, placement: Placement) -> Row {
	let head = (index + placement.offset()).min(row.len());
	let tail = (index + 1).min(row.len());
	let mut out = Vec::with_capacity(head + value.len() + row.len() - tail);
	out.extend_from_slice(&row[..head]);
	out.extend(value);
	out.extend_from_slice(&row[tail..]);
	out
}

/// Split a `;`-separated literal into a row.
#[cfg(test)]
pub(crate) fn row(s: &str) -> Row {
	s.split(';').map(|f| f.as_bytes().to_vec()).collect()
}
