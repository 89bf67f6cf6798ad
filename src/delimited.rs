//! Reading and writing delimited rows.

use std::io::{Read, Write};

use crate::error::Result;
use crate::types::{Field, Quoting, Row};

/// Output quote character, independent of the input quoting mode.
pub const QUOTE: u8 = b'"';

/// Reader
///
/// Build a CSV reader over `input`. Rows may have any number of fields. When `has_header` is set
/// the first row is held back as the header and excluded from [`rows`].
pub fn reader<R: Read>(
	input: R,
	delimiter: u8,
	quoting: Quoting,
	has_header: bool,
) -> csv::Reader<R> {
	csv::ReaderBuilder::new()
		.delimiter(delimiter)
		.has_headers(has_header)
		.flexible(true)
		.quoting(quoting == Quoting::Quoted)
		.double_quote(true)
		.from_reader(input)
}

/// Lazily yield the data rows of `rdr`, in a single forward pass. Fields are kept as raw
/// bytes.
pub fn rows<R: Read>(rdr: csv::Reader<R>) -> impl Iterator<Item = Result<Row>> {
	rdr.into_byte_records().map(|record| {
		let record = record?;
		Ok(record.iter().map(<[u8]>::to_vec).collect())
	})
}

/// Read the first row of `input`. An empty input yields an empty row.
pub fn first_row<R: Read>(input: R, delimiter: u8, quoting: Quoting) -> Result<Row> {
	let mut rdr = reader(input, delimiter, quoting, true);
	Ok(rdr.byte_headers()?.iter().map(<[u8]>::to_vec).collect())
}

/// Append `value` to `line`, wrapped in quotes when it contains `separator`. Embedded quotes are
/// left as they are.
fn push_quoted(line: &mut Vec<u8>, value: &[u8], separator: u8) {
	if value.contains(&separator) {
		line.push(QUOTE);
		line.extend_from_slice(value);
		line.push(QUOTE);
	} else {
		line.extend_from_slice(value);
	}
}

/// Write Row
///
/// Write `row` joined by `separator` and terminated by a newline.
pub fn write_row<W: Write>(wtr: &mut W, row: &[Field], separator: u8) -> std::io::Result<()> {
	let mut line = Vec::new();
	for (i, value) in row.iter().enumerate() {
		if i > 0 {
			line.push(separator);
		}
		push_quoted(&mut line, value, separator);
	}
	wtr.write_all(&line)?;
	wtr.write_all(b"\n")
}
