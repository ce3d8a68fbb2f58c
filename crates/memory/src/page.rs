// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::ptr::NonNull;

use crate::{PageInfo, align_up};

/// The in-use window `[lower, upper)` of one page.
#[derive(Debug, Clone, Copy)]
pub struct PageAllocationInfo {
	page: PageInfo,
	size: usize,
	lower: usize,
	upper: usize,
}

impl PageAllocationInfo {
	pub fn new(page: PageInfo, size: usize) -> Self {
		Self {
			page,
			size,
			lower: 0,
			upper: 0,
		}
	}

	#[inline]
	pub fn page(&self) -> PageInfo {
		self.page
	}

	#[inline]
	pub fn lower(&self) -> usize {
		self.lower
	}

	#[inline]
	pub fn upper(&self) -> usize {
		self.upper
	}

	pub fn is_empty(&self) -> bool {
		self.lower == self.upper
	}

	/// Claims `bytes` after aligning the upper offset, or returns `None` when
	/// the page cannot hold them.
	pub fn allocate(&mut self, bytes: usize, alignment: usize) -> Option<NonNull<u8>> {
		let offset = align_up(self.upper, alignment);
		let end = offset.checked_add(bytes)?;
		if end > self.size {
			return None;
		}
		self.upper = end;
		// SAFETY: offset + bytes stays within the page
		Some(unsafe { self.page.address().add(offset) })
	}

	/// Bytes still available at the back of the page for an allocation with
	/// the given alignment.
	pub fn remaining(&self, alignment: usize) -> usize {
		self.size.saturating_sub(align_up(self.upper, alignment))
	}

	pub fn contains(&self, address: NonNull<u8>) -> bool {
		let base = self.page.address().as_ptr() as usize;
		let address = address.as_ptr() as usize;
		address >= base && address < base + self.size
	}

	pub fn offset_of(&self, address: NonNull<u8>) -> usize {
		address.as_ptr() as usize - self.page.address().as_ptr() as usize
	}

	/// Releases the oldest allocation, which starts at `address`.
	pub fn deallocate_front(&mut self, address: NonNull<u8>, bytes: usize) {
		debug_assert!(self.contains(address));
		self.lower = (self.offset_of(address) + bytes).min(self.upper);
		self.reset_if_empty();
	}

	/// Releases the youngest allocation, which starts at `address`.
	pub fn deallocate_back(&mut self, address: NonNull<u8>) {
		debug_assert!(self.contains(address));
		self.upper = self.offset_of(address).max(self.lower);
		self.reset_if_empty();
	}

	/// Moves the lower offset forward to `offset`.
	pub fn rewind_front(&mut self, offset: usize) {
		self.lower = offset.min(self.upper);
		self.reset_if_empty();
	}

	/// Moves the upper offset back to `offset`.
	pub fn rewind_back(&mut self, offset: usize) {
		self.upper = offset.max(self.lower);
		self.reset_if_empty();
	}

	fn reset_if_empty(&mut self) {
		if self.lower == self.upper {
			self.lower = 0;
			self.upper = 0;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{PagePool, PagePoolConfig};

	const SIZE: usize = 4096;

	fn with_page(f: impl FnOnce(&mut PageAllocationInfo)) {
		let pool = PagePool::new(PagePoolConfig::default().with_page_size(SIZE));
		let page = pool.acquire(false).unwrap();
		let mut info = PageAllocationInfo::new(page, SIZE);
		f(&mut info);
		pool.release(page);
	}

	mod allocate {
		use super::*;

		#[test]
		fn test_aligns_upper_offset() {
			with_page(|info| {
				info.allocate(3, 1).unwrap();
				let p = info.allocate(8, 8).unwrap();
				assert_eq!(info.offset_of(p), 8);
				assert_eq!(info.upper(), 16);
			});
		}

		#[test]
		fn test_fails_past_page_end() {
			with_page(|info| {
				info.allocate(SIZE - 8, 1).unwrap();
				assert!(info.allocate(16, 1).is_none());
				assert_eq!(info.remaining(1), 8);
				assert!(info.allocate(8, 1).is_some());
				assert_eq!(info.remaining(1), 0);
			});
		}
	}

	mod deallocate {
		use super::*;

		#[test]
		fn test_back_rewinds_upper() {
			with_page(|info| {
				info.allocate(16, 8).unwrap();
				let second = info.allocate(32, 8).unwrap();
				info.deallocate_back(second);
				assert_eq!(info.upper(), 16);
			});
		}

		#[test]
		fn test_front_advances_lower() {
			with_page(|info| {
				let first = info.allocate(16, 8).unwrap();
				info.allocate(32, 8).unwrap();
				info.deallocate_front(first, 16);
				assert_eq!(info.lower(), 16);
				assert_eq!(info.upper(), 48);
			});
		}

		#[test]
		fn test_empty_window_resets() {
			with_page(|info| {
				let first = info.allocate(16, 8).unwrap();
				let second = info.allocate(16, 8).unwrap();
				info.deallocate_front(first, 16);
				info.deallocate_front(second, 16);
				assert!(info.is_empty());
				assert_eq!(info.lower(), 0);
				assert_eq!(info.upper(), 0);
			});
		}
	}
}
