// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Base-128 variable length integers.
//!
//! Groups of 7 payload bits are written least significant first, the high bit
//! of each byte marking a continuation. A ninth byte, when present, carries
//! the remaining 8 bits in full, so any `u64` fits in at most 9 bytes.
//! Signed integers are zigzag mapped first.

use super::stream::{ReadableStream, WritableStream};
use crate::error::{CodecError, CodecResult};

pub const MAX_VARINT_SIZE: usize = 9;

pub fn write_u64(stream: &mut WritableStream<'_>, value: u64) -> CodecResult<()> {
	let mut buffer = [0u8; MAX_VARINT_SIZE];
	let size = encode_u64(value, &mut buffer);
	stream.write(&buffer[..size])
}

pub fn write_i64(stream: &mut WritableStream<'_>, value: i64) -> CodecResult<()> {
	write_u64(stream, zigzag(value))
}

pub fn encode_u64(mut value: u64, buffer: &mut [u8; MAX_VARINT_SIZE]) -> usize {
	for (i, byte) in buffer.iter_mut().enumerate().take(MAX_VARINT_SIZE - 1) {
		if value < 0x80 {
			*byte = value as u8;
			return i + 1;
		}
		*byte = (value as u8 & 0x7F) | 0x80;
		value >>= 7;
	}
	buffer[MAX_VARINT_SIZE - 1] = value as u8;
	MAX_VARINT_SIZE
}

pub fn size_u64(value: u64) -> usize {
	let mut buffer = [0u8; MAX_VARINT_SIZE];
	encode_u64(value, &mut buffer)
}

pub fn read_u64(stream: &mut ReadableStream<'_>) -> CodecResult<u64> {
	let mut cursor = *stream;
	let mut value = 0u64;
	for i in 0..MAX_VARINT_SIZE - 1 {
		let byte = cursor.read_u8()?;
		value |= ((byte & 0x7F) as u64) << (7 * i);
		if byte & 0x80 == 0 {
			*stream = cursor;
			return Ok(value);
		}
	}
	let last = cursor.read_u8()?;
	value |= (last as u64) << 56;
	*stream = cursor;
	Ok(value)
}

pub fn read_i64(stream: &mut ReadableStream<'_>) -> CodecResult<i64> {
	read_u64(stream).map(unzigzag)
}

/// Reads a length, rejecting anything above `2^31 - 1`.
pub fn read_size(stream: &mut ReadableStream<'_>) -> CodecResult<usize> {
	let mut cursor = *stream;
	let size = read_u64(&mut cursor)?;
	if size > i32::MAX as u64 {
		return Err(CodecError::SizeOutOfRange {
			size,
		});
	}
	*stream = cursor;
	Ok(size as usize)
}

pub fn read_i32(stream: &mut ReadableStream<'_>) -> CodecResult<i32> {
	let mut cursor = *stream;
	let value = read_i64(&mut cursor)?;
	let value = i32::try_from(value).map_err(|_| CodecError::IntegerOverflow {
		value,
	})?;
	*stream = cursor;
	Ok(value)
}

#[inline]
pub fn zigzag(value: i64) -> u64 {
	((value << 1) ^ (value >> 63)) as u64
}

#[inline]
pub fn unzigzag(value: u64) -> i64 {
	((value >> 1) as i64) ^ -((value & 1) as i64)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn encoded(value: u64) -> Vec<u8> {
		let mut buffer = [0u8; MAX_VARINT_SIZE];
		let size = encode_u64(value, &mut buffer);
		buffer[..size].to_vec()
	}

	#[test]
	fn test_group_layout() {
		assert_eq!(encoded(0), vec![0x00]);
		assert_eq!(encoded(127), vec![0x7F]);
		assert_eq!(encoded(128), vec![0x80, 0x01]);
		assert_eq!(encoded(300), vec![0xAC, 0x02]);
	}

	#[test]
	fn test_ninth_byte_uses_all_bits() {
		let bytes = encoded(u64::MAX);
		assert_eq!(bytes.len(), 9);
		assert_eq!(bytes[8], 0xFF);
		let mut stream = ReadableStream::new(&bytes);
		assert_eq!(read_u64(&mut stream).unwrap(), u64::MAX);
		assert!(stream.is_empty());
	}

	#[test]
	fn test_zigzag() {
		assert_eq!(zigzag(0), 0);
		assert_eq!(zigzag(-1), 1);
		assert_eq!(zigzag(1), 2);
		assert_eq!(unzigzag(zigzag(i64::MIN)), i64::MIN);
		assert_eq!(unzigzag(zigzag(i64::MAX)), i64::MAX);
	}

	#[test]
	fn test_truncated_input_does_not_advance() {
		let mut stream = ReadableStream::new(&[0x80, 0x80]);
		assert!(matches!(read_u64(&mut stream), Err(CodecError::BufferUnderflow { .. })));
		assert_eq!(stream.position(), 0);
	}

	#[test]
	fn test_read_i32_overflow() {
		let mut buffer = [0u8; 16];
		let mut out = WritableStream::new(&mut buffer);
		write_i64(&mut out, i32::MAX as i64 + 1).unwrap();
		let size = out.size();
		let mut stream = ReadableStream::new(&buffer[..size]);
		assert!(matches!(read_i32(&mut stream), Err(CodecError::IntegerOverflow { .. })));
		assert_eq!(stream.position(), 0);
	}

	#[test]
	fn test_read_size_limit() {
		let mut buffer = [0u8; 16];
		let mut out = WritableStream::new(&mut buffer);
		write_u64(&mut out, 1 << 31).unwrap();
		let size = out.size();
		let mut stream = ReadableStream::new(&buffer[..size]);
		assert!(matches!(read_size(&mut stream), Err(CodecError::SizeOutOfRange { .. })));
	}
}
