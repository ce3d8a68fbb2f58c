// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::{Deserialize, Serialize};
use tessera_memory::PagePoolConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
	/// Worker threads of the task pool.
	pub thread_count: usize,
	/// Run every task inline on the waiting thread, in submission order.
	pub single_threaded: bool,
}

impl Default for SchedulerConfig {
	fn default() -> Self {
		Self {
			thread_count: num_cpus::get().max(1),
			single_threaded: false,
		}
	}
}

impl SchedulerConfig {
	pub fn single_threaded() -> Self {
		Self {
			thread_count: 1,
			single_threaded: true,
		}
	}

	pub fn with_thread_count(mut self, thread_count: usize) -> Self {
		self.thread_count = thread_count.max(1);
		self
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
	pub pool: PagePoolConfig,
	pub scheduler: SchedulerConfig,
	/// Shuffle partitions used by group aggregation.
	pub default_partitions: usize,
}

impl Default for EngineConfig {
	fn default() -> Self {
		let scheduler = SchedulerConfig::default();
		Self {
			pool: PagePoolConfig::default(),
			default_partitions: scheduler.thread_count,
			scheduler,
		}
	}
}

impl EngineConfig {
	pub fn with_pool(mut self, pool: PagePoolConfig) -> Self {
		self.pool = pool;
		self
	}

	pub fn with_scheduler(mut self, scheduler: SchedulerConfig) -> Self {
		self.scheduler = scheduler;
		self
	}

	pub fn with_default_partitions(mut self, partitions: usize) -> Self {
		self.default_partitions = partitions.max(1);
		self
	}
}
