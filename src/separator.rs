//! Separator specification parsing.

use crate::error::{LookupError, Result};
use crate::types::Separators;

/// Number of separators a run needs: primary, lookup and output.
pub const SEPARATOR_COUNT: usize = 3;

/// Parse Separators
///
/// Expand each literal `\t` into a tab, then either repeat a single character `count` times or
/// take exactly `count` characters in order. Any other length is rejected.
pub fn parse_separators(spec: &str, count: usize) -> Result<Vec<char>> {
	let spec = spec.replace(r"\t", "\t");
	let chars: Vec<char> = spec.chars().collect();
	match chars.len() {
		1 => Ok(vec![chars[0]; count]),
		n if n == count => Ok(chars),
		n => Err(LookupError::SeparatorCount {
			expected: count,
			actual: n,
		}),
	}
}

/// Resolve a separator specification into the separators of a run.
pub fn resolve(spec: &str) -> Result<Separators> {
	let chars = parse_separators(spec, SEPARATOR_COUNT)?;
	let bytes = chars
		.into_iter()
		.map(|c| {
			if c.is_ascii() {
				Ok(c as u8)
			} else {
				Err(LookupError::SeparatorNotAscii(c))
			}
		})
		.collect::<Result<Vec<u8>>>()?;
	Ok(Separators {
		primary: bytes[0],
		lookup: bytes[1],
		output: bytes[2],
	})
}
