// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{cell::RefCell, ptr::NonNull, sync::Arc};

use super::{MemoryResource, check_request};
use crate::{MemoryError, PageAllocationInfo, PagePool};

/// Allocate-only arena; pages go back to the pool when the resource is
/// dropped.
pub struct MonotonicResource {
	pool: Arc<PagePool>,
	pages: RefCell<Vec<PageAllocationInfo>>,
}

impl MonotonicResource {
	pub fn new(pool: Arc<PagePool>) -> Self {
		Self {
			pool,
			pages: RefCell::new(Vec::new()),
		}
	}

	pub fn page_count(&self) -> usize {
		self.pages.borrow().len()
	}

	/// Gives every page back and starts over.
	pub fn release(&mut self) {
		for info in self.pages.get_mut().drain(..) {
			self.pool.release(info.page());
		}
	}
}

impl MemoryResource for MonotonicResource {
	fn allocate(&self, bytes: usize, alignment: usize) -> Result<NonNull<u8>, MemoryError> {
		check_request(bytes, alignment, self.pool.page_size())?;
		let mut pages = self.pages.borrow_mut();
		if let Some(address) = pages.last_mut().and_then(|info| info.allocate(bytes, alignment)) {
			return Ok(address);
		}
		let mut info = PageAllocationInfo::new(self.pool.acquire(false)?, self.pool.page_size());
		let address = info.allocate(bytes, alignment).ok_or(MemoryError::AllocationTooLarge {
			requested: bytes,
			page_size: self.pool.page_size(),
		})?;
		pages.push(info);
		Ok(address)
	}

	fn deallocate(&mut self, _address: NonNull<u8>, _bytes: usize, _alignment: usize) {}

	fn page_remaining(&self, alignment: usize) -> usize {
		self.pages.borrow().last().map(|info| info.remaining(alignment)).unwrap_or(0)
	}

	fn page_size(&self) -> usize {
		self.pool.page_size()
	}
}

impl Drop for MonotonicResource {
	fn drop(&mut self) {
		self.release();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::PagePoolConfig;

	fn resource() -> (Arc<PagePool>, MonotonicResource) {
		let pool = Arc::new(PagePool::new(PagePoolConfig::default().with_page_size(4096)));
		(pool.clone(), MonotonicResource::new(pool))
	}

	#[test]
	fn test_spills_to_new_page() {
		let (_pool, resource) = resource();
		resource.allocate(4000, 8).unwrap();
		assert_eq!(resource.page_count(), 1);
		resource.allocate(200, 8).unwrap();
		assert_eq!(resource.page_count(), 2);
		assert_eq!(resource.page_remaining(1), 4096 - 200);
	}

	#[test]
	fn test_rejects_more_than_a_page() {
		let (_pool, resource) = resource();
		let err = resource.allocate(4097, 1).unwrap_err();
		assert!(matches!(err, MemoryError::AllocationTooLarge { .. }));
	}

	#[test]
	fn test_deallocate_is_noop() {
		let (_pool, mut resource) = resource();
		let address = resource.allocate(100, 1).unwrap();
		resource.deallocate(address, 100, 1);
		assert_eq!(resource.page_remaining(1), 4096 - 100);
	}

	#[test]
	fn test_drop_returns_pages() {
		let (pool, resource) = resource();
		resource.allocate(4000, 1).unwrap();
		resource.allocate(4000, 1).unwrap();
		drop(resource);
		assert_eq!(pool.free_pages(), 2);
	}

	#[test]
	fn test_copy_bytes() {
		let (_pool, resource) = resource();
		let copied = resource.copy_bytes(b"hello").unwrap();
		assert_eq!(copied, b"hello");
		assert_eq!(resource.copy_str("").unwrap(), "");
	}
}
