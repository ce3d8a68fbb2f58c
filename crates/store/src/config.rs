// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStoreConfig {
	/// Delay between a commit becoming visible and it being reported
	/// durable. `None` reports durability immediately.
	pub durability_delay: Option<Duration>,
}

impl MemoryStoreConfig {
	pub fn with_durability_delay(mut self, delay: Duration) -> Self {
		self.durability_delay = Some(delay);
		self
	}
}
