// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::Write;

/// Lowercase hex rendering of a byte string, used for key fields in trace
/// spans and test assertions.
pub fn encode(bytes: impl AsRef<[u8]>) -> String {
	let bytes = bytes.as_ref();
	let mut out = String::with_capacity(bytes.len() * 2);
	for byte in bytes {
		let _ = write!(out, "{:02x}", byte);
	}
	out
}

/// Parses a hex string produced by [`encode`]. Whitespace is ignored.
pub fn decode(input: &str) -> Option<Vec<u8>> {
	let digits: Vec<u8> = input.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
	if digits.len() % 2 != 0 {
		return None;
	}
	digits.chunks(2)
		.map(|pair| {
			let high = (pair[0] as char).to_digit(16)?;
			let low = (pair[1] as char).to_digit(16)?;
			Some((high * 16 + low) as u8)
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_encode() {
		assert_eq!(encode([0x7e, 0x79, 0x60]), "7e7960");
		assert_eq!(encode([]), "");
	}

	#[test]
	fn test_decode() {
		assert_eq!(decode("80 27 10"), Some(vec![0x80, 0x27, 0x10]));
		assert_eq!(decode("8"), None);
		assert_eq!(decode("zz"), None);
	}
}
