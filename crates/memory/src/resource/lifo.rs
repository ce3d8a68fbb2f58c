// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{cell::RefCell, ptr::NonNull, sync::Arc};

use tracing::trace;

use super::{MemoryResource, check_request};
use crate::{MemoryError, PageAllocationInfo, PageInfo, PagePool};

/// Position inside a [`LifoResource`] to unwind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifoCheckpoint {
	pages: usize,
	upper: usize,
}

/// Stack arena: only the youngest live allocation may be released.
///
/// An emptied page is kept as a reserve so that allocate/deallocate churn at
/// a page boundary does not go back and forth to the pool.
pub struct LifoResource {
	pool: Arc<PagePool>,
	pages: RefCell<Vec<PageAllocationInfo>>,
	reserved: RefCell<Option<PageInfo>>,
}

impl LifoResource {
	pub fn new(pool: Arc<PagePool>) -> Self {
		Self {
			pool,
			pages: RefCell::new(Vec::new()),
			reserved: RefCell::new(None),
		}
	}

	pub fn page_count(&self) -> usize {
		self.pages.borrow().len()
	}

	pub fn has_reserved_page(&self) -> bool {
		self.reserved.borrow().is_some()
	}

	pub fn checkpoint(&self) -> LifoCheckpoint {
		let pages = self.pages.borrow();
		LifoCheckpoint {
			pages: pages.len(),
			upper: pages.last().map(|info| info.upper()).unwrap_or(0),
		}
	}

	/// Releases everything allocated after `checkpoint`.
	pub fn deallocate_after(&mut self, checkpoint: LifoCheckpoint) {
		while self.pages.get_mut().len() > checkpoint.pages {
			if let Some(info) = self.pages.get_mut().pop() {
				self.retire(info.page());
			}
		}
		if let Some(last) = self.pages.get_mut().last_mut() {
			last.rewind_back(checkpoint.upper);
		}
		trace!(pages = checkpoint.pages, upper = checkpoint.upper, "lifo unwound");
	}

	fn retire(&mut self, page: PageInfo) {
		let reserved = self.reserved.get_mut();
		if reserved.is_none() {
			*reserved = Some(page);
		} else {
			self.pool.release(page);
		}
	}
}

impl MemoryResource for LifoResource {
	fn allocate(&self, bytes: usize, alignment: usize) -> Result<NonNull<u8>, MemoryError> {
		check_request(bytes, alignment, self.pool.page_size())?;
		let mut pages = self.pages.borrow_mut();
		if let Some(address) = pages.last_mut().and_then(|info| info.allocate(bytes, alignment)) {
			return Ok(address);
		}
		let page = match self.reserved.borrow_mut().take() {
			Some(page) => page,
			None => self.pool.acquire(false)?,
		};
		let mut info = PageAllocationInfo::new(page, self.pool.page_size());
		let address = info.allocate(bytes, alignment).ok_or(MemoryError::AllocationTooLarge {
			requested: bytes,
			page_size: self.pool.page_size(),
		})?;
		pages.push(info);
		Ok(address)
	}

	fn deallocate(&mut self, address: NonNull<u8>, _bytes: usize, _alignment: usize) {
		let Some(last) = self.pages.get_mut().last_mut() else {
			return;
		};
		debug_assert!(last.contains(address), "lifo deallocation must target the youngest allocation");
		last.deallocate_back(address);
		if last.is_empty() {
			if let Some(info) = self.pages.get_mut().pop() {
				self.retire(info.page());
			}
		}
	}

	fn page_remaining(&self, alignment: usize) -> usize {
		self.pages.borrow().last().map(|info| info.remaining(alignment)).unwrap_or(0)
	}

	fn page_size(&self) -> usize {
		self.pool.page_size()
	}
}

impl Drop for LifoResource {
	fn drop(&mut self) {
		for info in self.pages.get_mut().drain(..) {
			self.pool.release(info.page());
		}
		if let Some(page) = self.reserved.get_mut().take() {
			self.pool.release(page);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::PagePoolConfig;

	const PAGE: usize = 4096;

	fn resource() -> (Arc<PagePool>, LifoResource) {
		let pool = Arc::new(PagePool::new(PagePoolConfig::default().with_page_size(PAGE)));
		(pool.clone(), LifoResource::new(pool))
	}

	mod deallocate {
		use super::*;

		#[test]
		fn test_youngest_rewinds() {
			let (_pool, mut resource) = resource();
			resource.allocate(100, 8).unwrap();
			let second = resource.allocate(100, 8).unwrap();
			resource.deallocate(second, 100, 8);
			assert_eq!(resource.page_remaining(1), PAGE - 100);
		}

		#[test]
		fn test_empty_page_becomes_reserve() {
			let (pool, mut resource) = resource();
			resource.allocate(PAGE, 8).unwrap();
			let spill = resource.allocate(16, 8).unwrap();
			assert_eq!(resource.page_count(), 2);
			resource.deallocate(spill, 16, 8);
			assert_eq!(resource.page_count(), 1);
			assert!(resource.has_reserved_page());

			// churn at the boundary does not touch the pool
			let mapped = pool.mapped_pages();
			for _ in 0..10 {
				let spill = resource.allocate(16, 8).unwrap();
				resource.deallocate(spill, 16, 8);
			}
			assert_eq!(pool.mapped_pages(), mapped);
			assert_eq!(pool.free_pages(), 0);
		}
	}

	mod deallocate_after {
		use super::*;

		#[test]
		fn test_restores_page_count_and_remaining() {
			let (_pool, mut resource) = resource();
			for _ in 0..5 {
				resource.allocate(1000, 8).unwrap();
			}
			let checkpoint = resource.checkpoint();
			let pages = resource.page_count();
			let remaining = resource.page_remaining(1);
			for _ in 0..9 {
				resource.allocate(1500, 8).unwrap();
			}
			assert!(resource.page_count() > pages);
			resource.deallocate_after(checkpoint);
			assert_eq!(resource.page_count(), pages);
			assert_eq!(resource.page_remaining(1), remaining);
		}

		#[test]
		fn test_checkpoint_on_empty_resource() {
			let (pool, mut resource) = resource();
			let checkpoint = resource.checkpoint();
			resource.allocate(PAGE, 1).unwrap();
			resource.allocate(PAGE, 1).unwrap();
			resource.deallocate_after(checkpoint);
			assert_eq!(resource.page_count(), 0);
			assert_eq!(resource.page_remaining(1), 0);
			assert_eq!(pool.free_pages(), 1);
		}
	}
}
