// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tessera_core::{CodecError, CodecResult, WritableStream};

const INITIAL_BUFFER_SIZE: usize = 64;

/// Per-task scratch for the write targets: one growing buffer each for
/// primary keys, values and secondary keys.
#[derive(Debug)]
pub struct WriteContext {
	key_buffer: Vec<u8>,
	value_buffer: Vec<u8>,
	secondary_buffer: Vec<u8>,
	key_len: usize,
	value_len: usize,
}

impl Default for WriteContext {
	fn default() -> Self {
		Self::new()
	}
}

impl WriteContext {
	pub fn new() -> Self {
		Self::with_capacity(INITIAL_BUFFER_SIZE)
	}

	pub fn with_capacity(capacity: usize) -> Self {
		let capacity = capacity.max(1);
		Self {
			key_buffer: vec![0; capacity],
			value_buffer: vec![0; capacity],
			secondary_buffer: vec![0; capacity],
			key_len: 0,
			value_len: 0,
		}
	}

	/// The primary key written by the latest successful key encode.
	pub fn encoded_key(&self) -> &[u8] {
		&self.key_buffer[..self.key_len]
	}

	pub fn encoded_value(&self) -> &[u8] {
		&self.value_buffer[..self.value_len]
	}

	pub fn key_capacity(&self) -> usize {
		self.key_buffer.len()
	}

	pub(crate) fn encode_key(
		&mut self,
		encode: impl Fn(&mut WritableStream<'_>) -> CodecResult<()>,
	) -> CodecResult<&[u8]> {
		self.key_len = encode_growing(&mut self.key_buffer, encode)?;
		Ok(self.encoded_key())
	}

	pub(crate) fn encode_value(
		&mut self,
		encode: impl Fn(&mut WritableStream<'_>) -> CodecResult<()>,
	) -> CodecResult<&[u8]> {
		self.value_len = encode_growing(&mut self.value_buffer, encode)?;
		Ok(self.encoded_value())
	}

	/// Encodes a secondary key followed by the current primary key.
	pub(crate) fn encode_secondary(
		&mut self,
		encode: impl Fn(&mut WritableStream<'_>) -> CodecResult<()>,
	) -> CodecResult<&[u8]> {
		let primary = &self.key_buffer[..self.key_len];
		let len = encode_growing(&mut self.secondary_buffer, |stream| {
			encode(stream)?;
			stream.write(primary)
		})?;
		Ok(&self.secondary_buffer[..len])
	}
}

/// Runs `encode` into `buffer`, doubling it on overflow until it fits.
pub(crate) fn encode_growing(
	buffer: &mut Vec<u8>,
	encode: impl Fn(&mut WritableStream<'_>) -> CodecResult<()>,
) -> CodecResult<usize> {
	loop {
		let mut stream = WritableStream::new(buffer.as_mut_slice());
		match encode(&mut stream) {
			Ok(()) => return Ok(stream.size()),
			Err(CodecError::BufferOverflow {
				..
			}) => {
				let grown = buffer.len().max(1) * 2;
				buffer.resize(grown, 0);
			}
			Err(err) => return Err(err),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_buffer_doubles_until_fit() {
		let mut context = WriteContext::with_capacity(2);
		let key = context.encode_key(|stream| stream.write(&[7u8; 9])).unwrap().to_vec();
		assert_eq!(key, vec![7u8; 9]);
		assert_eq!(context.key_capacity(), 16);
	}

	#[test]
	fn test_key_length_tracks_latest_encode() {
		let mut context = WriteContext::new();
		context.encode_key(|stream| stream.write(b"long key")).unwrap();
		context.encode_key(|stream| stream.write(b"k")).unwrap();
		assert_eq!(context.encoded_key(), b"k");
	}

	#[test]
	fn test_failed_encode_keeps_previous_key() {
		let mut context = WriteContext::new();
		context.encode_key(|stream| stream.write(b"k")).unwrap();
		let result = context.encode_key(|_| Err(CodecError::SizeOutOfRange {
			size: 1,
		}));
		assert!(result.is_err());
		assert_eq!(context.encoded_key(), b"k");
	}

	#[test]
	fn test_secondary_appends_primary() {
		let mut context = WriteContext::new();
		context.encode_key(|stream| stream.write(b"pk")).unwrap();
		let key = context.encode_secondary(|stream| stream.write(b"sk")).unwrap();
		assert_eq!(key, b"skpk");
	}
}
