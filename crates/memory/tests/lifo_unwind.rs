// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Checkpoint unwinding of the stack arena under large allocation patterns.

use std::sync::Arc;

use tessera_memory::{DEFAULT_PAGE_SIZE, LifoResource, MemoryResource, PagePool, PagePoolConfig};

const MIB: usize = 1024 * 1024;

fn pool(page_size: usize) -> Arc<PagePool> {
	let mut config = PagePoolConfig::default().with_page_size(page_size);
	config.use_huge_pages = false;
	Arc::new(PagePool::new(config))
}

#[test]
fn test_unwind_megabyte_allocations() {
	let mut resource = LifoResource::new(pool(DEFAULT_PAGE_SIZE));
	for _ in 0..25 {
		resource.allocate(MIB, 8).unwrap();
	}
	let checkpoint = resource.checkpoint();
	let pages = resource.page_count();
	let remaining = resource.page_remaining(1);

	for _ in 0..25 {
		resource.allocate(MIB, 8).unwrap();
	}
	assert!(resource.page_count() > pages);

	resource.deallocate_after(checkpoint);
	assert_eq!(resource.page_count(), pages);
	assert_eq!(resource.page_remaining(1), remaining);

	// the unwound space is handed out again
	for _ in 0..25 {
		resource.allocate(MIB, 8).unwrap();
	}
	assert_eq!(resource.page_count(), 25);
}

#[test]
fn test_nested_checkpoints() {
	let page = 64 * 1024;
	let mut resource = LifoResource::new(pool(page));
	let sizes = [1, 7, 4096, 65_536, 300, 12_000, 64, 65_535, 2];

	let mut checkpoints = Vec::new();
	for (round, size) in sizes.iter().enumerate() {
		checkpoints.push((resource.checkpoint(), resource.page_count(), resource.page_remaining(1)));
		for i in 0..=round {
			resource.allocate(*size, 1 << (i % 4)).unwrap();
		}
	}
	while let Some((checkpoint, pages, remaining)) = checkpoints.pop() {
		resource.deallocate_after(checkpoint);
		assert_eq!(resource.page_count(), pages);
		assert_eq!(resource.page_remaining(1), remaining);
	}
	assert_eq!(resource.page_count(), 0);
}

#[test]
fn test_unwound_pages_return_to_pool() {
	let page = 64 * 1024;
	let pool = pool(page);
	let mut resource = LifoResource::new(pool.clone());
	let checkpoint = resource.checkpoint();
	for _ in 0..8 {
		resource.allocate(page, 8).unwrap();
	}
	resource.deallocate_after(checkpoint);
	// one page stays reserved, the rest go back to the pool
	assert!(resource.has_reserved_page());
	assert_eq!(pool.free_pages(), 7);
	drop(resource);
	assert_eq!(pool.free_pages(), 8);
}
