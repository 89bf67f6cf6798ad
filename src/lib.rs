//! Key-based lookup join between two delimited text files.
//!
//! The lookup file is loaded into memory as a [`types::LookupDictionary`], then the primary file
//! is streamed row by row and each row is rewritten with values taken from its match.

pub mod delimited;
pub mod dictionary;
pub mod error;
pub mod header;
pub mod process;
pub mod separator;
pub mod stream;
pub mod types;
