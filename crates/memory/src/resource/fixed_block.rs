// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{cell::RefCell, ptr::NonNull, sync::Arc};

use super::MemoryResource;
use crate::{MemoryError, PageInfo, PagePool};

const MIN_BLOCK_SIZE: usize = 16;

struct BlockPage {
	page: PageInfo,
	/// Blocks handed out at least once, from the start of the page.
	bumped: usize,
	live: usize,
	released: Vec<u64>,
}

impl BlockPage {
	fn new(page: PageInfo, blocks: usize) -> Self {
		Self {
			page,
			bumped: 0,
			live: 0,
			released: vec![0; blocks.div_ceil(64)],
		}
	}

	fn take_released(&mut self) -> Option<usize> {
		for (word_index, word) in self.released.iter_mut().enumerate() {
			if *word != 0 {
				let bit = word.trailing_zeros() as usize;
				*word &= !(1u64 << bit);
				return Some(word_index * 64 + bit);
			}
		}
		None
	}

	fn release(&mut self, block: usize) {
		self.released[block / 64] |= 1u64 << (block % 64);
		self.live -= 1;
	}

	fn reset(&mut self) {
		self.bumped = 0;
		self.live = 0;
		self.released.iter_mut().for_each(|word| *word = 0);
	}
}

/// Arena of equally sized blocks that can be released in any order.
pub struct FixedBlockResource {
	pool: Arc<PagePool>,
	block_size: usize,
	blocks_per_page: usize,
	keep_empty_page: bool,
	pages: RefCell<Vec<BlockPage>>,
}

impl FixedBlockResource {
	pub fn new(pool: Arc<PagePool>, block_size: usize, keep_empty_page: bool) -> Result<Self, MemoryError> {
		let page_size = pool.page_size();
		if block_size < MIN_BLOCK_SIZE || page_size % block_size != 0 {
			return Err(MemoryError::InvalidBlockSize {
				block_size,
				page_size,
			});
		}
		Ok(Self {
			blocks_per_page: page_size / block_size,
			pool,
			block_size,
			keep_empty_page,
			pages: RefCell::new(Vec::new()),
		})
	}

	#[inline]
	pub fn block_size(&self) -> usize {
		self.block_size
	}

	pub fn page_count(&self) -> usize {
		self.pages.borrow().len()
	}

	pub fn live_blocks(&self) -> usize {
		self.pages.borrow().iter().map(|page| page.live).sum()
	}

	fn block_address(&self, page: &BlockPage, block: usize) -> NonNull<u8> {
		// SAFETY: block < blocks_per_page keeps the offset inside the page
		unsafe { page.page.address().add(block * self.block_size) }
	}
}

impl MemoryResource for FixedBlockResource {
	fn allocate(&self, bytes: usize, alignment: usize) -> Result<NonNull<u8>, MemoryError> {
		if !alignment.is_power_of_two() || self.block_size % alignment != 0 {
			return Err(MemoryError::InvalidAlignment {
				alignment,
			});
		}
		if bytes > self.block_size {
			return Err(MemoryError::AllocationTooLarge {
				requested: bytes,
				page_size: self.block_size,
			});
		}
		let mut pages = self.pages.borrow_mut();
		for page in pages.iter_mut() {
			let block = match page.take_released() {
				Some(block) => block,
				None if page.bumped < self.blocks_per_page => {
					page.bumped += 1;
					page.bumped - 1
				}
				None => continue,
			};
			page.live += 1;
			return Ok(self.block_address(page, block));
		}
		let mut page = BlockPage::new(self.pool.acquire(false)?, self.blocks_per_page);
		page.bumped = 1;
		page.live = 1;
		let address = self.block_address(&page, 0);
		pages.push(page);
		Ok(address)
	}

	fn deallocate(&mut self, address: NonNull<u8>, _bytes: usize, _alignment: usize) {
		let page_size = self.pool.page_size();
		let block_size = self.block_size;
		let pages = self.pages.get_mut();
		let found = pages.iter().position(|page| {
			let base = page.page.address().as_ptr() as usize;
			let address = address.as_ptr() as usize;
			address >= base && address < base + page_size
		});
		let Some(index) = found else {
			debug_assert!(false, "block does not belong to this resource");
			return;
		};
		let offset = address.as_ptr() as usize - pages[index].page.address().as_ptr() as usize;
		pages[index].release(offset / block_size);
		if pages[index].live > 0 {
			return;
		}
		let other_empty = pages.iter().enumerate().any(|(i, page)| i != index && page.live == 0);
		if self.keep_empty_page && !other_empty {
			pages[index].reset();
		} else {
			let page = pages.swap_remove(index);
			self.pool.release(page.page);
		}
	}

	fn page_remaining(&self, _alignment: usize) -> usize {
		self.pages
			.borrow()
			.last()
			.map(|page| (self.blocks_per_page - page.bumped) * self.block_size)
			.unwrap_or(0)
	}

	fn page_size(&self) -> usize {
		self.pool.page_size()
	}
}

impl Drop for FixedBlockResource {
	fn drop(&mut self) {
		for page in self.pages.get_mut().drain(..) {
			self.pool.release(page.page);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::PagePoolConfig;

	const PAGE: usize = 4096;

	fn pool() -> Arc<PagePool> {
		Arc::new(PagePool::new(PagePoolConfig::default().with_page_size(PAGE)))
	}

	#[test]
	fn test_rejects_bad_block_size() {
		assert!(FixedBlockResource::new(pool(), 8, false).is_err());
		assert!(FixedBlockResource::new(pool(), 48, false).is_err());
		assert!(FixedBlockResource::new(pool(), 64, false).is_ok());
	}

	#[test]
	fn test_any_order_release_and_reuse() {
		let mut resource = FixedBlockResource::new(pool(), 1024, false).unwrap();
		let blocks: Vec<_> = (0..4).map(|_| resource.allocate(1024, 8).unwrap()).collect();
		assert_eq!(resource.page_count(), 1);
		resource.deallocate(blocks[2], 1024, 8);
		resource.deallocate(blocks[0], 1024, 8);
		assert_eq!(resource.live_blocks(), 2);
		let reused = resource.allocate(16, 8).unwrap();
		assert_eq!(reused, blocks[0]);
		assert_eq!(resource.page_count(), 1);
	}

	#[test]
	fn test_empty_page_goes_back_to_pool() {
		let pool = pool();
		let mut resource = FixedBlockResource::new(pool.clone(), 2048, false).unwrap();
		let a = resource.allocate(10, 1).unwrap();
		let b = resource.allocate(10, 1).unwrap();
		resource.deallocate(b, 10, 1);
		resource.deallocate(a, 10, 1);
		assert_eq!(resource.page_count(), 0);
		assert_eq!(pool.free_pages(), 1);
	}

	#[test]
	fn test_keeps_one_empty_page() {
		let pool = pool();
		let mut resource = FixedBlockResource::new(pool.clone(), 2048, true).unwrap();
		let a = resource.allocate(10, 1).unwrap();
		resource.deallocate(a, 10, 1);
		assert_eq!(resource.page_count(), 1);
		assert_eq!(resource.page_remaining(1), PAGE);
		assert_eq!(pool.free_pages(), 0);
	}

	#[test]
	fn test_rejects_oversized_block_request() {
		let resource = FixedBlockResource::new(pool(), 64, false).unwrap();
		assert!(matches!(resource.allocate(65, 1), Err(MemoryError::AllocationTooLarge { .. })));
	}
}
