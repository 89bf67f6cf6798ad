//! Column references and header resolution.

use std::path::Path;

use crate::delimited;
use crate::error::{LookupError, Result};
use crate::stream;
use crate::types::{Field, Quoting, Row};

/// A column given on the command line, either by position or by header name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
	ByIndex(usize),
	ByName(String),
}

impl ColumnRef {
	/// Parse a single column argument.
	pub fn parse(spec: &str, by_name: bool) -> Result<Self> {
		if by_name {
			Ok(ColumnRef::ByName(spec.to_string()))
		} else {
			spec.trim()
				.parse()
				.map(ColumnRef::ByIndex)
				.map_err(|_| LookupError::InvalidIndex(spec.to_string()))
		}
	}

	/// Parse a list of column arguments split on `separator`.
	pub fn parse_list(spec: &str, separator: u8, by_name: bool) -> Result<Vec<Self>> {
		spec.split(separator as char)
			.map(|part| Self::parse(part, by_name))
			.collect()
	}

	/// Resolve to an index. Names match the first header cell with the same bytes.
	pub fn resolve(&self, header: &[Field], file: &Path) -> Result<usize> {
		match self {
			ColumnRef::ByIndex(index) => Ok(*index),
			ColumnRef::ByName(name) => header
				.iter()
				.position(|cell| cell.as_slice() == name.as_bytes())
				.ok_or_else(|| column_not_found(name, file)),
		}
	}
}

pub(crate) fn column_not_found(column: &str, file: &Path) -> LookupError {
	LookupError::ColumnNotFound {
		column: column.to_string(),
		file: file.display().to_string(),
	}
}

/// Read Header
///
/// Read only the first row of the file at `path`. The file is closed before returning.
pub fn read_header(path: &Path, separator: u8, quoting: Quoting) -> Result<Row> {
	let input = stream::open_input(path)?;
	delimited::first_row(input, separator, quoting)
}

/// Resolve every reference in `columns` against `header`, keeping their order.
pub fn resolve_columns(header: &[Field], columns: &[ColumnRef], file: &Path) -> Result<Vec<usize>> {
	columns.iter().map(|c| c.resolve(header, file)).collect()
}

/// Resolve Names
///
/// Read the header of the file at `path` and return the position of each of `names`. Fails as
/// a whole if any name is missing.
pub fn resolve_names(
	path: &Path,
	separator: u8,
	quoting: Quoting,
	names: &[String],
) -> Result<Vec<usize>> {
	let header = read_header(path, separator, quoting)?;
	let columns: Vec<ColumnRef> = names.iter().cloned().map(ColumnRef::ByName).collect();
	resolve_columns(&header, &columns, path)
}
