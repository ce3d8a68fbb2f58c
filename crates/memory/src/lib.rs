// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

mod config;
mod error;
mod page;
mod pool;
pub mod resource;

pub use config::PagePoolConfig;
pub use error::MemoryError;
pub use page::PageAllocationInfo;
pub use pool::{PageInfo, PagePool, current_node};
pub use resource::{
	FifoCheckpoint, FifoResource, FixedBlockResource, LifoCheckpoint, LifoResource, MemoryResource,
	MonotonicResource,
};

pub const DEFAULT_PAGE_SIZE: usize = 2 * 1024 * 1024;

/// Rounds `offset` up to the next multiple of `alignment`, which must be a
/// power of two.
#[inline]
pub(crate) fn align_up(offset: usize, alignment: usize) -> usize {
	(offset + alignment - 1) & !(alignment - 1)
}
