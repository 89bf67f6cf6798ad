//! Opening files, with transparent gzip handling.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;

use crate::error::{LookupError, Result};

/// Compression detected from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
	None,
	Gzip,
}

impl Compression {
	pub fn from_path(path: &Path) -> Self {
		match path.extension().and_then(|e| e.to_str()) {
			Some(ext) if ext.eq_ignore_ascii_case("gz") => Compression::Gzip,
			_ => Compression::None,
		}
	}
}

/// Open Input
///
/// Open `path` for reading, decompressing on the fly when it carries a `.gz` extension. The file
/// is closed when the returned reader is dropped.
pub fn open_input(path: &Path) -> Result<Box<dyn Read>> {
	let file = File::open(path).map_err(|source| LookupError::Open {
		path: path.to_path_buf(),
		source,
	})?;
	let buffered = BufReader::new(file);
	Ok(match Compression::from_path(path) {
		Compression::None => Box::new(buffered),
		Compression::Gzip => Box::new(MultiGzDecoder::new(buffered)),
	})
}

/// Output file, plain or gzip-compressed.
///
/// Call [`Output::finish`] to flush buffers and, for gzip, write the stream trailer. Dropping
/// without finishing still closes the file.
pub enum Output {
	Plain(BufWriter<File>),
	Gzip(GzEncoder<BufWriter<File>>),
}

/// Create Output
///
/// Create (or truncate) `path` for writing, compressing when it carries a `.gz` extension.
pub fn create_output(path: &Path) -> Result<Output> {
	let file = File::create(path).map_err(|source| LookupError::Open {
		path: path.to_path_buf(),
		source,
	})?;
	let buffered = BufWriter::new(file);
	Ok(match Compression::from_path(path) {
		Compression::None => Output::Plain(buffered),
		Compression::Gzip => Output::Gzip(GzEncoder::new(buffered, flate2::Compression::default())),
	})
}

impl Output {
	pub fn finish(self) -> io::Result<()> {
		match self {
			Output::Plain(mut w) => w.flush(),
			Output::Gzip(encoder) => encoder.finish()?.flush(),
		}
	}
}

impl Write for Output {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		match self {
			Output::Plain(w) => w.write(buf),
			Output::Gzip(w) => w.write(buf),
		}
	}

	fn flush(&mut self) -> io::Result<()> {
		match self {
			Output::Plain(w) => w.flush(),
			Output::Gzip(w) => w.flush(),
		}
	}
}
