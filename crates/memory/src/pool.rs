// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	ptr::NonNull,
	sync::atomic::{AtomicUsize, Ordering},
};

use parking_lot::Mutex;
use tracing::{debug, instrument, trace};

use crate::{MemoryError, PagePoolConfig};

/// A page handed out by the [`PagePool`] and the node it was mapped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
	address: NonNull<u8>,
	node: usize,
}

// Pages are plain memory owned by whoever holds the `PageInfo`; the pool only
// moves them between owners.
unsafe impl Send for PageInfo {}
unsafe impl Sync for PageInfo {}

impl PageInfo {
	#[inline]
	pub fn address(&self) -> NonNull<u8> {
		self.address
	}

	#[inline]
	pub fn node(&self) -> usize {
		self.node
	}
}

/// Process wide source of fixed size pages with one free list per node.
pub struct PagePool {
	config: PagePoolConfig,
	free: Vec<Mutex<Vec<PageInfo>>>,
	mapped: AtomicUsize,
}

impl PagePool {
	pub fn new(config: PagePoolConfig) -> Self {
		let nodes = config.numa_nodes.max(1);
		debug!(page_size = config.page_size, nodes, "page pool created");
		Self {
			free: (0..nodes).map(|_| Mutex::new(Vec::new())).collect(),
			config,
			mapped: AtomicUsize::new(0),
		}
	}

	#[inline]
	pub fn page_size(&self) -> usize {
		self.config.page_size
	}

	pub fn config(&self) -> &PagePoolConfig {
		&self.config
	}

	/// Hands out a page, reusing a released one from the caller's node when
	/// possible unless `brandnew` is set.
	#[instrument(name = "memory::pool::acquire", level = "trace", skip(self))]
	pub fn acquire(&self, brandnew: bool) -> Result<PageInfo, MemoryError> {
		let node = current_node() % self.free.len();
		if !brandnew {
			let nodes = self.free.len();
			for candidate in (0..nodes).map(|i| (node + i) % nodes) {
				if let Some(page) = self.free[candidate].lock().pop() {
					trace!(node = candidate, "page reused");
					return Ok(page);
				}
			}
		}

		let address = map_page(self.config.page_size, self.config.use_huge_pages)?;
		let mapped = self.mapped.fetch_add(1, Ordering::Relaxed) + 1;
		debug!(node, mapped, "page pool grew");
		Ok(PageInfo {
			address,
			node,
		})
	}

	/// Returns a page to the free list of the node it was mapped on.
	pub fn release(&self, page: PageInfo) {
		if self.config.return_pages_to_os {
			unmap_page(page.address, self.config.page_size);
			self.mapped.fetch_sub(1, Ordering::Relaxed);
			return;
		}
		self.free[page.node % self.free.len()].lock().push(page);
	}

	/// Number of pages currently mapped by this pool, free or handed out.
	pub fn mapped_pages(&self) -> usize {
		self.mapped.load(Ordering::Relaxed)
	}

	pub fn free_pages(&self) -> usize {
		self.free.iter().map(|list| list.lock().len()).sum()
	}
}

impl Default for PagePool {
	fn default() -> Self {
		Self::new(PagePoolConfig::default())
	}
}

impl Drop for PagePool {
	fn drop(&mut self) {
		for list in &self.free {
			for page in list.lock().drain(..) {
				unmap_page(page.address, self.config.page_size);
			}
		}
	}
}

/// The node the calling thread currently runs on; 0 when unknown.
pub fn current_node() -> usize {
	#[cfg(target_os = "linux")]
	{
		let mut cpu: libc::c_uint = 0;
		let mut node: libc::c_uint = 0;
		let rc = unsafe {
			libc::syscall(
				libc::SYS_getcpu,
				&mut cpu as *mut libc::c_uint,
				&mut node as *mut libc::c_uint,
				std::ptr::null_mut::<libc::c_void>(),
			)
		};
		if rc == 0 {
			return node as usize;
		}
	}
	0
}

#[cfg(unix)]
fn map_page(size: usize, huge: bool) -> Result<NonNull<u8>, MemoryError> {
	if huge {
		if let Some(address) = map_huge_page(size) {
			return Ok(address);
		}
	}
	let address = unsafe {
		libc::mmap(
			std::ptr::null_mut(),
			size,
			libc::PROT_READ | libc::PROT_WRITE,
			libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
			-1,
			0,
		)
	};
	if address == libc::MAP_FAILED {
		return Err(MemoryError::MapFailed {
			size,
			errno: std::io::Error::last_os_error().raw_os_error().unwrap_or(0),
		});
	}
	NonNull::new(address.cast::<u8>()).ok_or(MemoryError::MapFailed {
		size,
		errno: 0,
	})
}

#[cfg(target_os = "linux")]
fn map_huge_page(size: usize) -> Option<NonNull<u8>> {
	let address = unsafe {
		libc::mmap(
			std::ptr::null_mut(),
			size,
			libc::PROT_READ | libc::PROT_WRITE,
			libc::MAP_PRIVATE | libc::MAP_ANONYMOUS | libc::MAP_HUGETLB,
			-1,
			0,
		)
	};
	if address == libc::MAP_FAILED {
		trace!(size, "huge page mapping unavailable");
		return None;
	}
	NonNull::new(address.cast::<u8>())
}

#[cfg(all(unix, not(target_os = "linux")))]
fn map_huge_page(_size: usize) -> Option<NonNull<u8>> {
	None
}

#[cfg(unix)]
fn unmap_page(address: NonNull<u8>, size: usize) {
	unsafe {
		libc::munmap(address.as_ptr().cast::<libc::c_void>(), size);
	}
}

#[cfg(not(unix))]
fn map_page(size: usize, _huge: bool) -> Result<NonNull<u8>, MemoryError> {
	let layout = std::alloc::Layout::from_size_align(size, 4096).map_err(|_| MemoryError::MapFailed {
		size,
		errno: 0,
	})?;
	NonNull::new(unsafe { std::alloc::alloc(layout) }).ok_or(MemoryError::MapFailed {
		size,
		errno: 0,
	})
}

#[cfg(not(unix))]
fn unmap_page(address: NonNull<u8>, size: usize) {
	if let Ok(layout) = std::alloc::Layout::from_size_align(size, 4096) {
		unsafe { std::alloc::dealloc(address.as_ptr(), layout) }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn pool() -> PagePool {
		PagePool::new(PagePoolConfig::default().with_page_size(64 * 1024))
	}

	#[test]
	fn test_acquire_maps_new_page() {
		let pool = pool();
		let page = pool.acquire(false).unwrap();
		assert_eq!(pool.mapped_pages(), 1);
		assert_eq!(pool.free_pages(), 0);
		pool.release(page);
		assert_eq!(pool.free_pages(), 1);
	}

	#[test]
	fn test_release_then_acquire_reuses() {
		let pool = pool();
		let page = pool.acquire(false).unwrap();
		pool.release(page);
		let again = pool.acquire(false).unwrap();
		assert_eq!(again.address(), page.address());
		assert_eq!(pool.mapped_pages(), 1);
		pool.release(again);
	}

	#[test]
	fn test_brandnew_skips_free_list() {
		let pool = pool();
		let page = pool.acquire(false).unwrap();
		pool.release(page);
		let fresh = pool.acquire(true).unwrap();
		assert_ne!(fresh.address(), page.address());
		assert_eq!(pool.mapped_pages(), 2);
		pool.release(fresh);
	}

	#[test]
	fn test_return_pages_to_os() {
		let pool = PagePool::new(PagePoolConfig {
			page_size: 64 * 1024,
			use_huge_pages: false,
			return_pages_to_os: true,
			numa_nodes: 2,
		});
		let page = pool.acquire(false).unwrap();
		pool.release(page);
		assert_eq!(pool.free_pages(), 0);
		assert_eq!(pool.mapped_pages(), 0);
	}

	#[test]
	fn test_pages_are_writable() {
		let pool = pool();
		let page = pool.acquire(false).unwrap();
		unsafe {
			let bytes = std::slice::from_raw_parts_mut(page.address().as_ptr(), pool.page_size());
			bytes[0] = 0xAB;
			bytes[pool.page_size() - 1] = 0xCD;
			assert_eq!(bytes[0], 0xAB);
		}
		pool.release(page);
	}
}
