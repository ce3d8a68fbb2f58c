// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	cell::{Cell, RefCell},
	collections::VecDeque,
	ptr::NonNull,
	sync::Arc,
};

use super::{MemoryResource, check_request};
use crate::{MemoryError, PageAllocationInfo, PagePool};

/// Position inside a [`FifoResource`]; everything allocated before it can be
/// released at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FifoCheckpoint {
	sequence: Option<u64>,
	upper: usize,
}

struct FifoPage {
	sequence: u64,
	info: PageAllocationInfo,
}

/// Queue arena: only the oldest live allocation may be released.
pub struct FifoResource {
	pool: Arc<PagePool>,
	pages: RefCell<VecDeque<FifoPage>>,
	next_sequence: Cell<u64>,
}

impl FifoResource {
	pub fn new(pool: Arc<PagePool>) -> Self {
		Self {
			pool,
			pages: RefCell::new(VecDeque::new()),
			next_sequence: Cell::new(0),
		}
	}

	pub fn page_count(&self) -> usize {
		self.pages.borrow().len()
	}

	pub fn checkpoint(&self) -> FifoCheckpoint {
		let pages = self.pages.borrow();
		FifoCheckpoint {
			sequence: pages.back().map(|page| page.sequence),
			upper: pages.back().map(|page| page.info.upper()).unwrap_or(0),
		}
	}

	/// Releases everything allocated before `checkpoint`.
	pub fn deallocate_before(&mut self, checkpoint: FifoCheckpoint) {
		let Some(sequence) = checkpoint.sequence else {
			return;
		};
		let pages = self.pages.get_mut();
		if !pages.iter().any(|page| page.sequence == sequence) {
			// the checkpoint page is gone, so is everything before it
			return;
		}
		while pages.front().is_some_and(|page| page.sequence != sequence) {
			if let Some(page) = pages.pop_front() {
				self.pool.release(page.info.page());
			}
		}
		if let Some(front) = pages.front_mut() {
			front.info.rewind_front(checkpoint.upper);
			if front.info.is_empty() && pages.len() > 1 {
				if let Some(page) = pages.pop_front() {
					self.pool.release(page.info.page());
				}
			}
		}
	}
}

impl MemoryResource for FifoResource {
	fn allocate(&self, bytes: usize, alignment: usize) -> Result<NonNull<u8>, MemoryError> {
		check_request(bytes, alignment, self.pool.page_size())?;
		let mut pages = self.pages.borrow_mut();
		if let Some(address) = pages.back_mut().and_then(|page| page.info.allocate(bytes, alignment)) {
			return Ok(address);
		}
		let mut info = PageAllocationInfo::new(self.pool.acquire(false)?, self.pool.page_size());
		let address = info.allocate(bytes, alignment).ok_or(MemoryError::AllocationTooLarge {
			requested: bytes,
			page_size: self.pool.page_size(),
		})?;
		let sequence = self.next_sequence.get();
		self.next_sequence.set(sequence + 1);
		pages.push_back(FifoPage {
			sequence,
			info,
		});
		Ok(address)
	}

	fn deallocate(&mut self, address: NonNull<u8>, bytes: usize, _alignment: usize) {
		let pages = self.pages.get_mut();
		let Some(front) = pages.front_mut() else {
			return;
		};
		debug_assert!(front.info.contains(address), "fifo deallocation must target the oldest allocation");
		front.info.deallocate_front(address, bytes);
		if front.info.is_empty() && pages.len() > 1 {
			if let Some(page) = pages.pop_front() {
				self.pool.release(page.info.page());
			}
		}
	}

	fn page_remaining(&self, alignment: usize) -> usize {
		self.pages.borrow().back().map(|page| page.info.remaining(alignment)).unwrap_or(0)
	}

	fn page_size(&self) -> usize {
		self.pool.page_size()
	}
}

impl Drop for FifoResource {
	fn drop(&mut self) {
		for page in self.pages.get_mut().drain(..) {
			self.pool.release(page.info.page());
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::PagePoolConfig;

	const PAGE: usize = 4096;

	fn resource() -> (Arc<PagePool>, FifoResource) {
		let pool = Arc::new(PagePool::new(PagePoolConfig::default().with_page_size(PAGE)));
		(pool.clone(), FifoResource::new(pool))
	}

	#[test]
	fn test_deallocate_oldest_releases_drained_pages() {
		let (pool, mut resource) = resource();
		let first = resource.allocate(PAGE, 8).unwrap();
		let second = resource.allocate(100, 8).unwrap();
		assert_eq!(resource.page_count(), 2);
		resource.deallocate(first, PAGE, 8);
		assert_eq!(resource.page_count(), 1);
		assert_eq!(pool.free_pages(), 1);
		resource.deallocate(second, 100, 8);
		// the last page stays, reset
		assert_eq!(resource.page_count(), 1);
		assert_eq!(resource.page_remaining(1), PAGE);
	}

	#[test]
	fn test_deallocate_before_checkpoint() {
		let (pool, mut resource) = resource();
		for _ in 0..6 {
			resource.allocate(1000, 8).unwrap();
		}
		let checkpoint = resource.checkpoint();
		let later = resource.allocate(500, 8).unwrap();
		resource.deallocate_before(checkpoint);
		assert_eq!(resource.page_count(), 1);
		assert_eq!(pool.free_pages(), 1);
		resource.deallocate(later, 500, 8);
		assert_eq!(resource.page_remaining(1), PAGE);
	}

	#[test]
	fn test_deallocate_before_empty_checkpoint_is_noop() {
		let (_pool, mut resource) = resource();
		let checkpoint = resource.checkpoint();
		resource.allocate(10, 1).unwrap();
		resource.deallocate_before(checkpoint);
		assert_eq!(resource.page_count(), 1);
		assert_eq!(resource.page_remaining(1), PAGE - 10);
	}
}
