//! Error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
	/// The separator specification has the wrong number of characters.
	#[error("expected {expected} separators, {actual} were provided")]
	SeparatorCount { expected: usize, actual: usize },

	#[error("separator {0:?} is not a single-byte character")]
	SeparatorNotAscii(char),

	/// A named column is absent from the header of `file`.
	#[error("Column {column} not found in file {file}")]
	ColumnNotFound { column: String, file: String },

	#[error("invalid column index {0:?}")]
	InvalidIndex(String),

	#[error("failed to open {}: {source}", path.display())]
	Open {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error(transparent)]
	Io(#[from] io::Error),

	#[error(transparent)]
	Csv(#[from] csv::Error),
}

impl LookupError {
	/// True when the error is a write into a closed pipe.
	pub fn is_broken_pipe(&self) -> bool {
		match self {
			LookupError::Io(e) => e.kind() == io::ErrorKind::BrokenPipe,
			_ => false,
		}
	}
}

pub type Result<T> = std::result::Result<T, LookupError>;
