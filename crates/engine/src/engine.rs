// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use tessera_core::{Database, TransactionOptions};
use tessera_memory::{MonotonicResource, PagePool};
use tessera_type::Value;
use tracing::{debug, instrument};

use crate::{
	aggregate::AggregateCatalog, config::EngineConfig, scheduler::TaskScheduler,
	transaction::TransactionContext, write::resolve_locators,
};

/// The shared services of one engine instance: the database, the page pool
/// every arena draws from, the task scheduler and the aggregate catalog.
pub struct Engine<D: Database> {
	db: D,
	pool: Arc<PagePool>,
	scheduler: TaskScheduler,
	catalog: AggregateCatalog,
	config: EngineConfig,
}

impl<D: Database> Engine<D> {
	#[instrument(name = "engine::new", level = "debug", skip_all)]
	pub fn new(db: D, config: EngineConfig) -> tessera_type::Result<Self> {
		let pool = Arc::new(PagePool::new(config.pool.clone()));
		let scheduler = TaskScheduler::new(config.scheduler.clone())?;
		debug!(page_size = pool.page_size(), partitions = config.default_partitions, "engine started");
		Ok(Self {
			db,
			pool,
			scheduler,
			catalog: AggregateCatalog::new(),
			config,
		})
	}

	pub fn db(&self) -> &D {
		&self.db
	}

	pub fn pool(&self) -> &Arc<PagePool> {
		&self.pool
	}

	pub fn scheduler(&self) -> &TaskScheduler {
		&self.scheduler
	}

	pub fn catalog(&self) -> &AggregateCatalog {
		&self.catalog
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	/// A fresh arena for one task.
	pub fn arena(&self) -> MonotonicResource {
		MonotonicResource::new(Arc::clone(&self.pool))
	}

	/// Registers the large object locators of rows bound for a write task.
	pub fn prepare_rows(&self, rows: &mut [Vec<Value>]) -> tessera_type::Result<()> {
		for row in rows.iter_mut() {
			resolve_locators(&self.db, row)?;
		}
		Ok(())
	}

	pub fn begin(&self, options: TransactionOptions) -> tessera_type::Result<TransactionContext<D::Transaction>> {
		TransactionContext::begin(&self.db, options)
	}
}
