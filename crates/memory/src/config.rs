// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::{Deserialize, Serialize};

use crate::DEFAULT_PAGE_SIZE;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagePoolConfig {
	/// Size of every page handed out by the pool.
	pub page_size: usize,
	/// Try huge page mappings first, falling back to regular anonymous
	/// mappings.
	pub use_huge_pages: bool,
	/// Unmap released pages instead of keeping them on the free lists.
	pub return_pages_to_os: bool,
	/// Number of free lists; the current node is folded into this range.
	pub numa_nodes: usize,
}

impl Default for PagePoolConfig {
	fn default() -> Self {
		Self {
			page_size: DEFAULT_PAGE_SIZE,
			use_huge_pages: true,
			return_pages_to_os: false,
			numa_nodes: 1,
		}
	}
}

impl PagePoolConfig {
	pub fn with_page_size(mut self, page_size: usize) -> Self {
		self.page_size = page_size;
		self
	}
}
