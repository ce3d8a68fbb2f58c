// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Shared fixtures for integration tests.

mod fixture;

use std::sync::{Arc, Once};

pub use fixture::{GroupFixture, TableFixture};
use tessera_core::{RecordBuffer, RecordLayout};
use tessera_memory::{MemoryResource, MonotonicResource, PagePool, PagePoolConfig};
use tessera_store::MemoryDatabase;
use tessera_type::Value;
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Installs a fmt subscriber filtered by `RUST_LOG`. Safe to call from
/// every test.
pub fn init_tracing() {
	INIT.call_once(|| {
		let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
		let _ = fmt().with_env_filter(filter).with_test_writer().with_target(false).try_init();
		tracing::debug!("test tracing installed");
	});
}

pub fn memory_database() -> MemoryDatabase {
	init_tracing();
	MemoryDatabase::default()
}

/// A small-page pool, so tests exercise page turnover without touching
/// huge pages.
pub fn test_pool() -> Arc<PagePool> {
	let mut config = PagePoolConfig::default().with_page_size(64 * 1024);
	config.use_huge_pages = false;
	Arc::new(PagePool::new(config))
}

pub fn arena(pool: &Arc<PagePool>) -> MonotonicResource {
	MonotonicResource::new(Arc::clone(pool))
}

/// A record of `layout` holding `values`, payloads copied into `arena`.
pub fn record<'a>(layout: &RecordLayout, values: &[Value], arena: &'a dyn MemoryResource) -> RecordBuffer<'a> {
	let mut record = RecordBuffer::new(layout.clone());
	for (index, value) in values.iter().enumerate() {
		record.set_value(index, value, arena).expect("value fits layout");
	}
	record
}
