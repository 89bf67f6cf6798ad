//! Program entrypoint and argument parsing.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use csv_lookup::process;
use csv_lookup::separator;
use csv_lookup::types::{CaseMode, LookupJob, Options, Placement, Quoting};

/// Tool to lookup value for CSV files.
///
/// For each row of FILE_CSV, the value of COLUMN_CSV is looked up in column COLUMN_LOOKUP of
/// FILE_LOOKUP, and the COLUMN_VALUE fields of the first matching row are inserted after it.
/// Files ending in .gz are decompressed and compressed on the fly.
#[derive(Parser, Debug)]
#[command(name = "csv-lookup", version)]
struct Cli {
	/// Primary file, transformed row by row
	file_csv: PathBuf,

	/// Join column of the primary file (index, or name with --headers)
	column_csv: String,

	/// Lookup file, loaded into memory
	file_lookup: PathBuf,

	/// Join column of the lookup file (index, or name with --headers)
	column_lookup: String,

	/// Lookup column(s) to copy, separated by the output separator (or by the lookup separator
	/// with --headers)
	column_value: String,

	/// Output file
	file_output: PathBuf,

	/// Separator character(s): one for all files, or three for primary, lookup and output
	#[arg(short, long, default_value = ";")]
	separator: String,

	/// Files have headers
	#[arg(short = 'H', long)]
	headers: bool,

	/// Replace the join column instead of inserting after it
	#[arg(short, long)]
	replace: bool,

	/// Ignore case when comparing keys
	#[arg(short, long)]
	ignorecase: bool,

	/// Exclude rows with no lookup value
	#[arg(short, long)]
	exclude: bool,

	/// Use indicator: was lookup successful or not
	#[arg(short, long)]
	found: bool,

	/// No handling of quotes in CSV files
	#[arg(short = 'U', long)]
	unquoted: bool,
}

impl Cli {
	fn options(&self) -> Result<Options> {
		Ok(Options {
			headers: self.headers,
			placement: if self.replace {
				Placement::Replace
			} else {
				Placement::Insert
			},
			case: if self.ignorecase {
				CaseMode::Insensitive
			} else {
				CaseMode::Sensitive
			},
			exclude: self.exclude,
			found: self.found,
			quoting: if self.unquoted {
				Quoting::Unquoted
			} else {
				Quoting::Quoted
			},
			separators: separator::resolve(&self.separator)?,
		})
	}

	fn job(self) -> LookupJob {
		LookupJob {
			primary: self.file_csv,
			primary_column: self.column_csv,
			lookup: self.file_lookup,
			lookup_column: self.column_lookup,
			value_columns: self.column_value,
			output: self.file_output,
		}
	}
}

fn main() -> Result<()> {
	env_logger::init();
	let cli = Cli::parse();
	let options = cli.options()?;
	let job = cli.job();
	process::run(&job, &options)?;
	Ok(())
}
