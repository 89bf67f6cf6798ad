//! Building the in-memory lookup dictionary.

use std::collections::hash_map::Entry;
use std::io::Read;
use std::path::Path;

use crate::delimited;
use crate::error::Result;
use crate::stream;
use crate::types::{field, CaseMode, LookupDictionary, Quoting};

/// Build Dictionary
///
/// Read every data row of `input` and key it by the normalized field at `column`. The first row
/// seen for a key wins; later rows with the same key are skipped.
pub fn build<R: Read>(
	input: R,
	column: usize,
	separator: u8,
	has_header: bool,
	case: CaseMode,
	quoting: Quoting,
) -> Result<LookupDictionary> {
	let rdr = delimited::reader(input, separator, quoting, has_header);
	let mut dictionary = LookupDictionary::new();
	let mut duplicates = 0usize;

	for row in delimited::rows(rdr) {
		let row = row?;
		let key = case.normalize(field(&row, column));
		match dictionary.entry(key) {
			Entry::Vacant(entry) => {
				entry.insert(row);
			}
			Entry::Occupied(entry) => {
				log::debug!(
					"Ignoring duplicate lookup key '{}'",
					String::from_utf8_lossy(entry.key())
				);
				duplicates += 1;
			}
		}
	}

	log::info!(
		"Loaded {} lookup keys ({} duplicates skipped)",
		dictionary.len(),
		duplicates
	);
	Ok(dictionary)
}

/// Build the dictionary from the file at `path`, closing it when done.
pub fn build_from_path(
	path: &Path,
	column: usize,
	separator: u8,
	has_header: bool,
	case: CaseMode,
	quoting: Quoting,
) -> Result<LookupDictionary> {
	let input = stream::open_input(path)?;
	build(input, column, separator, has_header, case, quoting)
}
