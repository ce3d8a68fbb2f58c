// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Write requests scheduled as tasks on the engine.

use std::sync::Arc;

use parking_lot::Mutex;
use tessera_core::{RecordLayout, TransactionOptions};
use tessera_engine::{
	Engine, EngineConfig, Operator, RequestContext, SchedulerConfig, Task, WriteTask,
	write::{InsertKind, UpdateColumn, UpdateSource, WriteCreate, WritePartial},
};
use tessera_memory::PagePoolConfig;
use tessera_store::MemoryDatabase;
use tessera_testing::{TableFixture, init_tracing};
use tessera_type::{ErrorCode, FieldType, LobLocator, LobValue, Result, Value};

fn engine(fixture: &TableFixture, scheduler: SchedulerConfig) -> Result<Engine<MemoryDatabase>> {
	init_tracing();
	let mut pool = PagePoolConfig::default().with_page_size(64 * 1024);
	pool.use_huge_pages = false;
	Engine::new(fixture.db.clone(), EngineConfig::default().with_pool(pool).with_scheduler(scheduler))
}

fn insert_operator(fixture: &TableFixture) -> Arc<Operator> {
	Arc::new(Operator::Insert(WriteCreate::new(
		InsertKind::Insert,
		&fixture.primary,
		fixture.storage.clone(),
		fixture.secondaries(),
	)))
}

fn rows(keys: impl Iterator<Item = i32>) -> Vec<Vec<Value>> {
	keys.map(|k| TableFixture::row(k, Some(if k % 2 == 0 { "even" } else { "odd" }))).collect()
}

#[test]
fn test_parallel_inserts_share_transaction() -> Result<()> {
	let fixture = TableFixture::with_secondary();
	let engine = engine(&fixture, SchedulerConfig::default().with_thread_count(3))?;
	assert!(!engine.scheduler().is_single_threaded());

	let operator = insert_operator(&fixture);
	let transaction = Arc::new(Mutex::new(engine.begin(TransactionOptions::short())?));
	let request = Arc::new(RequestContext::new());
	for chunk in [0..100, 100..250] {
		let task = WriteTask::new(
			operator.clone(),
			transaction.clone(),
			engine.pool().clone(),
			fixture.row_layout(),
			rows(chunk),
		)
		.with_batch_size(16);
		engine.scheduler().schedule(&request, task);
	}
	engine.scheduler().wait(&request)?;
	transaction.lock().commit()?;

	let arena = engine.arena();
	let stored = fixture.rows(&arena);
	assert_eq!(stored.len(), 250);
	assert_eq!(stored, rows(0..250));
	assert_eq!(fixture.secondary_entries().len(), 250);
	Ok(())
}

#[test]
fn test_failed_row_aborts_transaction() -> Result<()> {
	let fixture = TableFixture::with_secondary();
	let engine = engine(&fixture, SchedulerConfig::single_threaded())?;

	let operator = insert_operator(&fixture);
	let transaction = Arc::new(Mutex::new(engine.begin(TransactionOptions::short())?));
	let request = Arc::new(RequestContext::new());
	let mut input = rows(0..10);
	input.push(TableFixture::row(3, Some("dup")));
	let failing = WriteTask::new(operator.clone(), transaction.clone(), engine.pool().clone(), fixture.row_layout(), input)
		.with_batch_size(4);
	let follower =
		WriteTask::new(operator, transaction.clone(), engine.pool().clone(), fixture.row_layout(), rows(20..30));
	engine.scheduler().schedule(&request, failing);
	engine.scheduler().schedule(&request, follower);

	let err = engine.scheduler().wait(&request).unwrap_err();
	assert_eq!(err.code(), ErrorCode::UniqueConstraintViolation);
	assert!(request.is_cancelled());
	assert_eq!(request.outstanding(), 0);
	assert!(!transaction.lock().is_active());

	let arena = engine.arena();
	assert!(fixture.rows(&arena).is_empty());
	assert!(fixture.secondary_entries().is_empty());
	Ok(())
}

#[test]
fn test_cancelled_request_skips_work() -> Result<()> {
	let fixture = TableFixture::new();
	let engine = engine(&fixture, SchedulerConfig::single_threaded())?;

	let transaction = Arc::new(Mutex::new(engine.begin(TransactionOptions::short())?));
	let request = Arc::new(RequestContext::new());
	request.cancel();
	let task = WriteTask::new(
		insert_operator(&fixture),
		transaction.clone(),
		engine.pool().clone(),
		fixture.row_layout(),
		rows(0..5),
	);
	engine.scheduler().schedule(&request, task);
	engine.scheduler().wait(&request)?;

	assert!(!transaction.lock().is_active());
	let arena = engine.arena();
	assert!(fixture.rows(&arena).is_empty());
	Ok(())
}

#[test]
fn test_update_and_delete_tasks() -> Result<()> {
	let fixture = TableFixture::with_secondary();
	let engine = engine(&fixture, SchedulerConfig::single_threaded())?;

	let transaction = Arc::new(Mutex::new(engine.begin(TransactionOptions::short())?));
	let request = Arc::new(RequestContext::new());
	let insert = WriteTask::new(
		insert_operator(&fixture),
		transaction.clone(),
		engine.pool().clone(),
		fixture.row_layout(),
		rows(1..=4),
	);
	assert_eq!(insert.name(), "insert");
	engine.scheduler().schedule(&request, insert);
	engine.scheduler().wait(&request)?;

	let update = Arc::new(Operator::WritePartial(WritePartial::update(
		&fixture.primary,
		fixture.storage.clone(),
		&[0],
		fixture.secondaries(),
		vec![UpdateColumn::new(1, UpdateSource::HostVariable(0))],
	)?));
	let host_layout = RecordLayout::nullable([FieldType::varchar(10)]);
	let update = WriteTask::new(
		update,
		transaction.clone(),
		engine.pool().clone(),
		fixture.key_layout(),
		vec![vec![Value::Int4(1)], vec![Value::Int4(2)]],
	)
	.with_host_variables(host_layout, vec!["new".into()]);
	assert_eq!(update.name(), "update");
	engine.scheduler().schedule(&request, update);

	let delete = Arc::new(Operator::WritePartial(WritePartial::delete(
		&fixture.primary,
		fixture.storage.clone(),
		&[0],
		fixture.secondaries(),
	)?));
	let delete = WriteTask::new(
		delete,
		transaction.clone(),
		engine.pool().clone(),
		fixture.key_layout(),
		vec![vec![Value::Int4(4)]],
	);
	assert_eq!(delete.name(), "delete");
	engine.scheduler().schedule(&request, delete);
	engine.scheduler().wait(&request)?;
	transaction.lock().commit()?;

	let arena = engine.arena();
	assert_eq!(
		fixture.rows(&arena),
		vec![TableFixture::row(1, Some("new")), TableFixture::row(2, Some("new")), TableFixture::row(3, Some("odd"))]
	);
	assert_eq!(fixture.secondary_entries().len(), 3);
	Ok(())
}

#[test]
fn test_engine_catalog_and_config() -> Result<()> {
	let fixture = TableFixture::new();
	let engine = engine(&fixture, SchedulerConfig::single_threaded().with_thread_count(2))?;
	assert_eq!(engine.catalog().len(), 50);
	assert!(engine.scheduler().is_single_threaded());
	assert_eq!(engine.pool().page_size(), 64 * 1024);
	assert!(engine.config().default_partitions >= 1);
	assert_eq!(engine.db().committed_version(), fixture.db.committed_version());
	Ok(())
}

#[test]
fn test_prepare_rows_registers_locators() -> Result<()> {
	let fixture = TableFixture::new();
	let engine = engine(&fixture, SchedulerConfig::single_threaded())?;
	let locator = LobLocator {
		channel: Some("upload".to_string()),
		path: "a/b".to_string(),
	};
	let mut rows = vec![vec![Value::Int4(1), Value::Blob(LobValue::Locator(locator.clone()))], vec![Value::Int4(2)]];
	engine.prepare_rows(&mut rows)?;

	let Value::Blob(LobValue::Reference(reference)) = &rows[0][1] else {
		panic!("locator left unresolved");
	};
	assert_eq!(engine.db().lob_locator(*reference), Some(locator));
	assert_eq!(rows[1], vec![Value::Int4(2)]);
	Ok(())
}
