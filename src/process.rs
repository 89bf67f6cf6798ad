//! Main lookup processing.

use std::io::{Read, Write};
use std::path::Path;

use crate::delimited;
use crate::dictionary;
use crate::error::{LookupError, Result};
use crate::header::{self, column_not_found, ColumnRef};
use crate::stream;
use crate::types::{field, select, splice, Field, LookupDictionary, LookupJob, Options, Row};

/// Column positions of a run, resolved before any data row is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPlan {
	/// Join column of the primary file.
	pub primary: usize,
	/// Join column of the lookup file.
	pub lookup: usize,
	/// Lookup columns copied into matched rows.
	pub values: Vec<usize>,
	/// Header written ahead of the data rows, in header mode only.
	pub header: Option<Row>,
}

/// Row counts of a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
	pub read: usize,
	pub matched: usize,
	pub written: usize,
	pub excluded: usize,
}

/// Run
///
/// Resolve the columns of `job`, load the lookup file, then stream the primary file into the
/// output file. Column errors abort before the output file is created. A closed output pipe
/// ends the run early without an error.
pub fn run(job: &LookupJob, options: &Options) -> Result<Summary> {
	let plan = resolve_plan(job, options)?;
	log::debug!("{:?}", plan);

	let dictionary = dictionary::build_from_path(
		&job.lookup,
		plan.lookup,
		options.separators.lookup,
		options.headers,
		options.case,
		options.quoting,
	)?;

	let input = stream::open_input(&job.primary)?;
	let mut output = stream::create_output(&job.output)?;
	let summary = transform(input, &mut output, &plan, &dictionary, options)?;
	match output.finish().map_err(LookupError::from) {
		Err(e) if e.is_broken_pipe() => log::debug!("Output closed while finishing"),
		result => result?,
	}

	log::info!(
		"Read {} rows, matched {}, wrote {}, excluded {}",
		summary.read,
		summary.matched,
		summary.written,
		summary.excluded
	);
	Ok(summary)
}

/// Resolve Plan
///
/// Turn the column arguments of `job` into indices. In header mode the arguments are names
/// looked up in the first row of each file, and the output header is assembled the same way
/// data rows are. Otherwise they are integer indices and no header is written.
pub fn resolve_plan(job: &LookupJob, options: &Options) -> Result<ColumnPlan> {
	let separators = options.separators;
	let by_name = options.headers;
	let read_header = |path: &Path, separator: u8| -> Result<Row> {
		if by_name {
			header::read_header(path, separator, options.quoting)
		} else {
			Ok(Row::new())
		}
	};

	let primary_header = read_header(&job.primary, separators.primary)?;
	let primary = single_column(
		&primary_header,
		&job.primary_column,
		separators.primary,
		by_name,
		&job.primary,
	)?;
	let lookup_header = read_header(&job.lookup, separators.lookup)?;
	let lookup = single_column(
		&lookup_header,
		&job.lookup_column,
		separators.lookup,
		by_name,
		&job.lookup,
	)?;

	if !by_name {
		let columns = ColumnRef::parse_list(&job.value_columns, separators.output, false)?;
		let values = header::resolve_columns(&lookup_header, &columns, &job.lookup)?;
		return Ok(ColumnPlan {
			primary,
			lookup,
			values,
			header: None,
		});
	}

	// The indicator column takes the value argument verbatim as its title.
	let (values, inserted) = if options.found {
		(Vec::new(), vec![job.value_columns.clone().into_bytes()])
	} else {
		let columns = ColumnRef::parse_list(&job.value_columns, separators.lookup, true)?;
		let values = header::resolve_columns(&lookup_header, &columns, &job.lookup)?;
		let inserted = select(&lookup_header, &values);
		(values, inserted)
	};

	Ok(ColumnPlan {
		primary,
		lookup,
		values,
		header: Some(splice(&primary_header, primary, inserted, options.placement)),
	})
}

/// Resolve a join column argument, which must name exactly one column.
fn single_column(
	header: &[Field],
	spec: &str,
	separator: u8,
	by_name: bool,
	file: &Path,
) -> Result<usize> {
	match ColumnRef::parse_list(spec, separator, by_name)?.as_slice() {
		[column] => column.resolve(header, file),
		_ => Err(column_not_found(spec, file)),
	}
}

/// Transform
///
/// Write the plan's header (if any), then one output row per primary row of `input` except for
/// rows dropped in exclude mode.
pub fn transform<R: Read, W: Write>(
	input: R,
	output: &mut W,
	plan: &ColumnPlan,
	dictionary: &LookupDictionary,
	options: &Options,
) -> Result<Summary> {
	let mut summary = Summary::default();
	let separator = options.separators.output;

	if let Some(header) = &plan.header {
		if !emit(output, header, separator)? {
			return Ok(summary);
		}
	}

	let rdr = delimited::reader(
		input,
		options.separators.primary,
		options.quoting,
		options.headers,
	);
	for row in delimited::rows(rdr) {
		let row = row?;
		summary.read += 1;
		let matched = lookup(&row, plan, dictionary, options);
		if matched.is_some() {
			summary.matched += 1;
		}
		match assemble(&row, matched, plan, options) {
			Some(out) => {
				if !emit(output, &out, separator)? {
					break;
				}
				summary.written += 1;
			}
			None => {
				log::debug!("Excluding unmatched row {}", summary.read);
				summary.excluded += 1;
			}
		}
	}

	Ok(summary)
}

/// Write one row, returning `false` once the reading end of the output has gone away.
fn emit<W: Write>(output: &mut W, row: &[Field], separator: u8) -> Result<bool> {
	match delimited::write_row(output, row, separator).map_err(LookupError::from) {
		Ok(()) => Ok(true),
		Err(e) if e.is_broken_pipe() => {
			log::debug!("Output closed, stopping");
			Ok(false)
		}
		Err(e) => Err(e),
	}
}

/// Transform Row
///
/// Look up the join key of `row` and build its output row, or `None` when the row is to be
/// dropped.
pub fn transform_row(
	row: &[Field],
	plan: &ColumnPlan,
	dictionary: &LookupDictionary,
	options: &Options,
) -> Option<Row> {
	assemble(row, lookup(row, plan, dictionary, options), plan, options)
}

/// Find the lookup row matching the join key of `row`.
fn lookup<'a>(
	row: &[Field],
	plan: &ColumnPlan,
	dictionary: &'a LookupDictionary,
	options: &Options,
) -> Option<&'a Row> {
	let key = options.case.normalize(field(row, plan.primary));
	dictionary.get(&key)
}

/// Build the output row for a lookup result, or `None` when it is dropped.
fn assemble(
	row: &[Field],
	matched: Option<&Row>,
	plan: &ColumnPlan,
	options: &Options,
) -> Option<Row> {
	let value = substitute(matched, &plan.values, options)?;
	Some(splice(row, plan.primary, value, options.placement))
}

/// Values placed into the output row for a lookup result.
fn substitute(matched: Option<&Row>, values: &[usize], options: &Options) -> Option<Row> {
	match matched {
		Some(_) if options.found => Some(vec![b"1".to_vec()]),
		Some(matched) => Some(select(matched, values)),
		None if options.exclude => None,
		None if options.found => Some(vec![b"0".to_vec()]),
		None => Some(vec![Field::new(); values.len()]),
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::types::{row, CaseMode, Placement, Quoting};
	use rstest::*;
	use std::fs;
	use std::io;
	use tempfile::TempDir;

	#[fixture]
	fn dictionary() -> LookupDictionary {
		let mut dictionary = LookupDictionary::new();
		dictionary.insert(b"1".to_vec(), row("1;30;north"));
		dictionary.insert(b"bob".to_vec(), row("bob;40"));
		dictionary
	}

	#[fixture]
	fn plan() -> ColumnPlan {
		ColumnPlan {
			primary: 0,
			lookup: 0,
			values: vec![1],
			header: None,
		}
	}

	#[rstest]
	#[case("1;x", false, false, Placement::Insert, Some("1;30;x"))]
	#[case("1;x", false, false, Placement::Replace, Some("30;x"))]
	#[case("3;z", false, false, Placement::Insert, Some("3;;z"))]
	#[case("3;z", true, false, Placement::Insert, None)]
	#[case("1;x", true, false, Placement::Insert, Some("1;30;x"))]
	#[case("1;x", false, true, Placement::Insert, Some("1;1;x"))]
	#[case("3;z", false, true, Placement::Insert, Some("3;0;z"))]
	#[case("3;z", false, true, Placement::Replace, Some("0;z"))]
	#[case("3;z", true, true, Placement::Insert, None)]
	fn applies_output_policy(
		dictionary: LookupDictionary,
		plan: ColumnPlan,
		#[case] input: &str,
		#[case] exclude: bool,
		#[case] found: bool,
		#[case] placement: Placement,
		#[case] expected: Option<&str>,
	) {
		let options = Options {
			exclude,
			found,
			placement,
			..Options::default()
		};
		let out = transform_row(&row(input), &plan, &dictionary, &options);
		assert_eq!(out, expected.map(row));
	}

	#[rstest]
	fn copies_several_values_in_order(dictionary: LookupDictionary, mut plan: ColumnPlan) {
		plan.values = vec![2, 9, 1];
		let out = transform_row(&row("1;x"), &plan, &dictionary, &Options::default());
		assert_eq!(out, Some(row("1;north;;30;x")));

		let out = transform_row(&row("7;x"), &plan, &dictionary, &Options::default());
		assert_eq!(out, Some(row("7;;;;x")));
	}

	#[rstest]
	fn ignores_case_when_asked(dictionary: LookupDictionary, plan: ColumnPlan) {
		let options = Options {
			case: CaseMode::Insensitive,
			..Options::default()
		};
		let out = transform_row(&row("BoB;y"), &plan, &dictionary, &options);
		assert_eq!(out, Some(row("BoB;40;y")));

		let out = transform_row(&row("BoB;y"), &plan, &dictionary, &Options::default());
		assert_eq!(out, Some(row("BoB;;y")));
	}

	#[rstest]
	fn short_row_misses(dictionary: LookupDictionary, mut plan: ColumnPlan) {
		plan.primary = 4;
		let out = transform_row(&row("1;x"), &plan, &dictionary, &Options::default());
		assert_eq!(out, Some(row("1;x;")));
	}

	#[rstest]
	fn transform_writes_header_and_rows(dictionary: LookupDictionary, mut plan: ColumnPlan) {
		plan.header = Some(row("id;age;name"));
		let options = Options {
			headers: true,
			exclude: true,
			..Options::default()
		};
		let input = "id;name\n1;alice\n2;bob\n";
		let mut output = Vec::new();
		let summary = transform(input.as_bytes(), &mut output, &plan, &dictionary, &options).unwrap();

		assert_eq!(std::str::from_utf8(&output).unwrap(), "id;age;name\n1;30;alice\n");
		assert_eq!(
			summary,
			Summary {
				read: 2,
				matched: 1,
				written: 1,
				excluded: 1
			}
		);
	}

	#[rstest]
	fn transform_uses_output_separator(dictionary: LookupDictionary, plan: ColumnPlan) {
		let mut options = Options::default();
		options.separators.primary = b',';
		options.separators.output = b'|';
		let mut output = Vec::new();
		transform("1,a|b\n".as_bytes(), &mut output, &plan, &dictionary, &options).unwrap();
		assert_eq!(std::str::from_utf8(&output).unwrap(), "1|30|\"a|b\"\n");
	}

	#[rstest]
	fn transform_passes_non_utf8_bytes_through(
		mut dictionary: LookupDictionary,
		plan: ColumnPlan,
	) {
		dictionary.insert(b"k\xe9".to_vec(), vec![b"K\xc9".to_vec(), b"\xff".to_vec()]);
		let options = Options {
			case: CaseMode::Insensitive,
			..Options::default()
		};
		let input: &[u8] = b"K\xe9;caf\xe9\n1;x\n9;y\n";
		let mut output = Vec::new();
		let summary = transform(input, &mut output, &plan, &dictionary, &options).unwrap();

		assert_eq!(output, b"K\xe9;\xff;caf\xe9\n1;30;x\n9;;y\n");
		assert_eq!(summary.read, 3);
		assert_eq!(summary.matched, 2);
		assert_eq!(summary.written, 3);
	}

	/// Accepts a fixed number of writes, then reports a closed pipe.
	struct ClosingPipe {
		remaining: usize,
		written: Vec<u8>,
	}

	impl Write for ClosingPipe {
		fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
			if self.remaining == 0 {
				return Err(io::Error::from(io::ErrorKind::BrokenPipe));
			}
			self.remaining -= 1;
			self.written.extend_from_slice(buf);
			Ok(buf.len())
		}

		fn flush(&mut self) -> io::Result<()> {
			Ok(())
		}
	}

	#[rstest]
	fn broken_pipe_stops_cleanly(dictionary: LookupDictionary, plan: ColumnPlan) {
		// One row is two writes: the line and its newline.
		let mut output = ClosingPipe {
			remaining: 2,
			written: Vec::new(),
		};
		let input = "1;a\n1;b\n1;c\n";
		let summary =
			transform(input.as_bytes(), &mut output, &plan, &dictionary, &Options::default())
				.unwrap();
		assert_eq!(summary.written, 1);
		assert_eq!(output.written, b"1;30;a\n");
	}

	struct Files {
		_dir: TempDir,
		job: LookupJob,
	}

	#[fixture]
	fn files() -> Files {
		let dir = TempDir::new().unwrap();
		let primary = dir.path().join("people.csv");
		let lookup = dir.path().join("ages.csv");
		fs::write(&primary, "name;id;city\nalice;1;x\n").unwrap();
		fs::write(&lookup, "age;key;zone\n30;1;n\n").unwrap();
		let job = LookupJob {
			primary,
			primary_column: "id".to_string(),
			lookup,
			lookup_column: "key".to_string(),
			value_columns: "zone;age".to_string(),
			output: dir.path().join("out.csv"),
		};
		Files { _dir: dir, job }
	}

	#[rstest]
	fn plan_resolves_names(files: Files) {
		let options = Options {
			headers: true,
			..Options::default()
		};
		let plan = resolve_plan(&files.job, &options).unwrap();
		assert_eq!(
			plan,
			ColumnPlan {
				primary: 1,
				lookup: 1,
				values: vec![2, 0],
				header: Some(row("name;id;zone;age;city")),
			}
		);
	}

	#[rstest]
	fn plan_titles_indicator_with_value_argument(mut files: Files) {
		files.job.value_columns = "matched".to_string();
		let options = Options {
			headers: true,
			found: true,
			placement: Placement::Replace,
			..Options::default()
		};
		let plan = resolve_plan(&files.job, &options).unwrap();
		assert!(plan.values.is_empty());
		assert_eq!(plan.header, Some(row("name;matched;city")));
	}

	#[rstest]
	fn plan_rejects_unknown_names(mut files: Files) {
		let options = Options {
			headers: true,
			..Options::default()
		};
		files.job.value_columns = "zone;height".to_string();
		let err = resolve_plan(&files.job, &options).unwrap_err();
		assert!(matches!(err, LookupError::ColumnNotFound { ref column, .. } if column == "height"));

		files.job.primary_column = "id;city".to_string();
		let err = resolve_plan(&files.job, &options).unwrap_err();
		assert!(matches!(err, LookupError::ColumnNotFound { ref column, .. } if column == "id;city"));
	}

	#[rstest]
	fn plan_parses_indices(mut files: Files) {
		files.job.primary_column = "1".to_string();
		files.job.lookup_column = "0".to_string();
		files.job.value_columns = "2,0".to_string();
		let mut options = Options {
			quoting: Quoting::Unquoted,
			..Options::default()
		};
		options.separators.output = b',';
		let plan = resolve_plan(&files.job, &options).unwrap();
		assert_eq!(
			plan,
			ColumnPlan {
				primary: 1,
				lookup: 0,
				values: vec![2, 0],
				header: None,
			}
		);

		files.job.value_columns = "2;0".to_string();
		assert!(matches!(
			resolve_plan(&files.job, &options),
			Err(LookupError::InvalidIndex(_))
		));
	}

	#[rstest]
	fn column_error_leaves_output_untouched(mut files: Files) {
		files.job.lookup_column = "missing".to_string();
		let options = Options {
			headers: true,
			..Options::default()
		};
		assert!(run(&files.job, &options).is_err());
		assert!(!files.job.output.exists());
	}
}
