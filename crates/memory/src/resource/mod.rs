// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::ptr::NonNull;

use crate::MemoryError;

mod fifo;
mod fixed_block;
mod lifo;
mod monotonic;

pub use fifo::{FifoCheckpoint, FifoResource};
pub use fixed_block::FixedBlockResource;
pub use lifo::{LifoCheckpoint, LifoResource};
pub use monotonic::MonotonicResource;

/// A paged arena owned by a single task.
///
/// Allocation takes `&self` so that slices handed out earlier stay borrowed
/// from the resource; every operation that can give memory back takes
/// `&mut self` and therefore cannot run while such a slice is alive.
pub trait MemoryResource {
	fn allocate(&self, bytes: usize, alignment: usize) -> Result<NonNull<u8>, MemoryError>;

	fn deallocate(&mut self, address: NonNull<u8>, bytes: usize, alignment: usize);

	/// Bytes left in the current page for an allocation with the given
	/// alignment.
	fn page_remaining(&self, alignment: usize) -> usize;

	fn page_size(&self) -> usize;

	/// Copies `bytes` into the arena and returns the copy.
	fn copy_bytes(&self, bytes: &[u8]) -> Result<&[u8], MemoryError> {
		if bytes.is_empty() {
			return Ok(&[]);
		}
		let address = self.allocate(bytes.len(), 1)?;
		// SAFETY: the region is freshly allocated, `bytes.len()` long and only
		// released through `&mut self`
		unsafe {
			std::ptr::copy_nonoverlapping(bytes.as_ptr(), address.as_ptr(), bytes.len());
			Ok(std::slice::from_raw_parts(address.as_ptr(), bytes.len()))
		}
	}

	fn copy_str(&self, s: &str) -> Result<&str, MemoryError> {
		let bytes = self.copy_bytes(s.as_bytes())?;
		// SAFETY: copied from a valid str
		Ok(unsafe { std::str::from_utf8_unchecked(bytes) })
	}
}

pub(crate) fn check_request(bytes: usize, alignment: usize, page_size: usize) -> Result<(), MemoryError> {
	if !alignment.is_power_of_two() {
		return Err(MemoryError::InvalidAlignment {
			alignment,
		});
	}
	if bytes > page_size {
		return Err(MemoryError::AllocationTooLarge {
			requested: bytes,
			page_size,
		});
	}
	Ok(())
}
