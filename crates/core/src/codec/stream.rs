// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::error::{CodecError, CodecResult};

enum Target<'b> {
	Buffer(&'b mut [u8]),
	Sizing,
}

/// Output side of the codec.
///
/// Writes into a caller provided buffer and fails with
/// [`CodecError::BufferOverflow`] once it is full; a sizing stream only
/// counts the bytes so the caller can preallocate.
pub struct WritableStream<'b> {
	target: Target<'b>,
	position: usize,
}

impl<'b> WritableStream<'b> {
	pub fn new(buffer: &'b mut [u8]) -> Self {
		Self {
			target: Target::Buffer(buffer),
			position: 0,
		}
	}

	pub fn sizing() -> WritableStream<'static> {
		WritableStream {
			target: Target::Sizing,
			position: 0,
		}
	}

	/// Bytes written so far, or that would have been written when sizing.
	#[inline]
	pub fn size(&self) -> usize {
		self.position
	}

	pub fn capacity(&self) -> Option<usize> {
		match &self.target {
			Target::Buffer(buffer) => Some(buffer.len()),
			Target::Sizing => None,
		}
	}

	pub fn write(&mut self, bytes: &[u8]) -> CodecResult<()> {
		let end = self.position + bytes.len();
		if let Target::Buffer(buffer) = &mut self.target {
			if end > buffer.len() {
				return Err(CodecError::BufferOverflow {
					required: end,
					capacity: buffer.len(),
				});
			}
			buffer[self.position..end].copy_from_slice(bytes);
		}
		self.position = end;
		Ok(())
	}

	#[inline]
	pub fn write_u8(&mut self, byte: u8) -> CodecResult<()> {
		self.write(&[byte])
	}

	pub fn write_repeated(&mut self, byte: u8, count: usize) -> CodecResult<()> {
		let end = self.position + count;
		if let Target::Buffer(buffer) = &mut self.target {
			if end > buffer.len() {
				return Err(CodecError::BufferOverflow {
					required: end,
					capacity: buffer.len(),
				});
			}
			buffer[self.position..end].fill(byte);
		}
		self.position = end;
		Ok(())
	}

	/// Writes `bytes`, bitwise inverted when `invert` is set.
	pub fn write_maybe_inverted(&mut self, bytes: &[u8], invert: bool) -> CodecResult<()> {
		if !invert {
			return self.write(bytes);
		}
		let end = self.position + bytes.len();
		if let Target::Buffer(buffer) = &mut self.target {
			if end > buffer.len() {
				return Err(CodecError::BufferOverflow {
					required: end,
					capacity: buffer.len(),
				});
			}
			for (dst, src) in buffer[self.position..end].iter_mut().zip(bytes) {
				*dst = !src;
			}
		}
		self.position = end;
		Ok(())
	}

	/// The bytes written so far; empty for a sizing stream.
	pub fn written(&self) -> &[u8] {
		match &self.target {
			Target::Buffer(buffer) => &buffer[..self.position],
			Target::Sizing => &[],
		}
	}
}

/// Input side of the codec: a read-only view with a cursor.
///
/// The stream is `Copy`; readers work on a copy and commit it only when the
/// whole entry was read, so a failed read leaves the position unchanged.
#[derive(Debug, Clone, Copy)]
pub struct ReadableStream<'b> {
	data: &'b [u8],
	position: usize,
}

impl<'b> ReadableStream<'b> {
	pub fn new(data: &'b [u8]) -> Self {
		Self {
			data,
			position: 0,
		}
	}

	#[inline]
	pub fn position(&self) -> usize {
		self.position
	}

	#[inline]
	pub fn remaining(&self) -> usize {
		self.data.len() - self.position
	}

	pub fn is_empty(&self) -> bool {
		self.remaining() == 0
	}

	/// The unread tail.
	pub fn rest(&self) -> &'b [u8] {
		&self.data[self.position..]
	}

	/// The bytes consumed so far.
	pub fn consumed(&self) -> &'b [u8] {
		&self.data[..self.position]
	}

	pub fn peek_u8(&self) -> CodecResult<u8> {
		self.data.get(self.position).copied().ok_or(CodecError::BufferUnderflow {
			required: 1,
			available: 0,
		})
	}

	pub fn read(&mut self, count: usize) -> CodecResult<&'b [u8]> {
		if count > self.remaining() {
			return Err(CodecError::BufferUnderflow {
				required: count,
				available: self.remaining(),
			});
		}
		let bytes = &self.data[self.position..self.position + count];
		self.position += count;
		Ok(bytes)
	}

	#[inline]
	pub fn read_u8(&mut self) -> CodecResult<u8> {
		let byte = self.peek_u8()?;
		self.position += 1;
		Ok(byte)
	}

	pub fn read_array<const N: usize>(&mut self) -> CodecResult<[u8; N]> {
		let mut array = [0u8; N];
		array.copy_from_slice(self.read(N)?);
		Ok(array)
	}

	/// Reads `N` bytes, inverting them back when `invert` is set.
	pub fn read_array_maybe_inverted<const N: usize>(&mut self, invert: bool) -> CodecResult<[u8; N]> {
		let mut array = self.read_array::<N>()?;
		if invert {
			array.iter_mut().for_each(|b| *b = !*b);
		}
		Ok(array)
	}

	pub fn skip(&mut self, count: usize) -> CodecResult<()> {
		self.read(count).map(|_| ())
	}
}
