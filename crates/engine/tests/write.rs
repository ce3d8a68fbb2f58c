// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Insert, update and delete against a primary index with and without a
//! secondary index.

use tessera_core::{RecordLayout, TransactionOptions, TransactionState};
use tessera_engine::{
	IndexScan, ScanBound, TransactionContext,
	write::{InsertKind, UpdateColumn, UpdateSource, WriteContext, WriteCreate, WritePartial, WriteStatus},
};
use tessera_memory::MemoryResource;
use tessera_store::MemoryTransaction;
use tessera_testing::{TableFixture, arena, record, test_pool};
use tessera_type::{ErrorCode, FieldType, Result, Value};

fn begin(fixture: &TableFixture) -> Result<TransactionContext<MemoryTransaction>> {
	TransactionContext::begin(&fixture.db, TransactionOptions::short())
}

fn insert(fixture: &TableFixture, kind: InsertKind, rows: &[Vec<Value>]) -> Result<Vec<WriteStatus>> {
	let pool = test_pool();
	let arena = arena(&pool);
	let op = WriteCreate::new(kind, &fixture.primary, fixture.storage.clone(), fixture.secondaries());
	let mut tx = begin(fixture)?;
	let mut ctx = WriteContext::new();
	let mut statuses = Vec::new();
	for values in rows {
		let row = record(&fixture.row_layout(), values, &arena);
		statuses.push(op.process_record(&mut ctx, tx.transaction()?, &row, &arena)?);
	}
	tx.commit()?;
	Ok(statuses)
}

fn delete(fixture: &TableFixture, k: i32, idempotent: bool) -> Result<WriteStatus> {
	let pool = test_pool();
	let arena = arena(&pool);
	let op = WritePartial::delete(&fixture.primary, fixture.storage.clone(), &[0], fixture.secondaries())?
		.with_idempotent_delete(idempotent);
	let mut tx = begin(fixture)?;
	let input = record(&fixture.key_layout(), &[Value::Int4(k)], &arena);
	let status = op.process_record(&mut WriteContext::new(), tx.transaction()?, &input, None, &arena)?;
	tx.commit()?;
	Ok(status)
}

/// `UPDATE T SET V = ? WHERE K = k`.
fn update_value(fixture: &TableFixture, k: i32, v: &str) -> Result<WriteStatus> {
	let pool = test_pool();
	let arena = arena(&pool);
	let op = WritePartial::update(
		&fixture.primary,
		fixture.storage.clone(),
		&[0],
		fixture.secondaries(),
		vec![UpdateColumn::new(1, UpdateSource::HostVariable(0))],
	)?;
	let mut tx = begin(fixture)?;
	let input = record(&fixture.key_layout(), &[Value::Int4(k)], &arena);
	let host = record(&RecordLayout::nullable([FieldType::varchar(10)]), &[v.into()], &arena);
	let status = op.process_record(&mut WriteContext::new(), tx.transaction()?, &input, Some(&host), &arena)?;
	tx.commit()?;
	Ok(status)
}

fn lookup(fixture: &TableFixture, k: i32, arena: &dyn MemoryResource) -> Result<Option<Vec<Value>>> {
	let (begin_bound, end_bound) = ScanBound::prefix(vec![Value::Int4(k)]);
	let scan = IndexScan::primary(&fixture.primary, fixture.storage.clone()).with_range(begin_bound, end_bound);
	let mut tx = TransactionContext::begin(&fixture.db, TransactionOptions::read_only())?;
	let tx = tx.transaction()?;
	let mut cursor = scan.open(tx)?;
	let (mut key, mut value) = (scan.key_record(), scan.value_record());
	if !cursor.next(tx, arena, &mut key, &mut value)? {
		return Ok(None);
	}
	let mut row = key.values();
	row.extend(value.values());
	assert!(!cursor.next(tx, arena, &mut key, &mut value)?);
	Ok(Some(row))
}

fn secondary_lookup(fixture: &TableFixture, v: &str, arena: &dyn MemoryResource) -> Result<Vec<Vec<Value>>> {
	let Some((index, storage)) = &fixture.secondary else {
		return Ok(Vec::new());
	};
	let (begin_bound, end_bound) = ScanBound::prefix(vec![v.into()]);
	let scan = IndexScan::secondary(&fixture.primary, fixture.storage.clone(), index, storage.clone())
		.with_range(begin_bound, end_bound);
	let mut tx = TransactionContext::begin(&fixture.db, TransactionOptions::read_only())?;
	let tx = tx.transaction()?;
	let mut cursor = scan.open(tx)?;
	let (mut key, mut value) = (scan.key_record(), scan.value_record());
	let mut rows = Vec::new();
	while cursor.next(tx, arena, &mut key, &mut value)? {
		let mut row = key.values();
		row.extend(value.values());
		rows.push(row);
	}
	Ok(rows)
}

#[test]
fn test_put_get_delete() -> Result<()> {
	let fixture = TableFixture::new();
	let pool = test_pool();
	let arena = arena(&pool);

	assert_eq!(insert(&fixture, InsertKind::Insert, &[TableFixture::row(1, Some("abc"))])?, vec![WriteStatus::Ok]);
	assert_eq!(lookup(&fixture, 1, &arena)?, Some(TableFixture::row(1, Some("abc"))));

	assert_eq!(delete(&fixture, 1, false)?, WriteStatus::Ok);
	assert_eq!(lookup(&fixture, 1, &arena)?, None);

	let err = delete(&fixture, 2, false).unwrap_err();
	assert_eq!(err.code(), ErrorCode::NotFound);
	Ok(())
}

#[test]
fn test_idempotent_delete_of_missing_row() -> Result<()> {
	let fixture = TableFixture::with_secondary();
	assert_eq!(delete(&fixture, 2, true)?, WriteStatus::NotFound);
	Ok(())
}

#[test]
fn test_delete_removes_secondary_entry() -> Result<()> {
	let fixture = TableFixture::with_secondary();
	insert(&fixture, InsertKind::Insert, &[TableFixture::row(1, Some("abc")), TableFixture::row(2, Some("abc"))])?;
	assert_eq!(fixture.secondary_entries().len(), 2);
	delete(&fixture, 1, false)?;

	let pool = test_pool();
	let arena = arena(&pool);
	assert_eq!(secondary_lookup(&fixture, "abc", &arena)?, vec![TableFixture::row(2, Some("abc"))]);
	assert_eq!(fixture.secondary_entries().len(), 1);
	Ok(())
}

#[test]
fn test_update_with_secondary_index() -> Result<()> {
	let fixture = TableFixture::with_secondary();
	let pool = test_pool();
	let arena = arena(&pool);
	insert(&fixture, InsertKind::Insert, &[TableFixture::row(1, Some("abc")), TableFixture::row(2, Some("def"))])?;

	assert_eq!(update_value(&fixture, 1, "xyz")?, WriteStatus::Ok);

	assert!(secondary_lookup(&fixture, "abc", &arena)?.is_empty());
	assert_eq!(secondary_lookup(&fixture, "xyz", &arena)?, vec![TableFixture::row(1, Some("xyz"))]);
	assert_eq!(secondary_lookup(&fixture, "def", &arena)?, vec![TableFixture::row(2, Some("def"))]);
	assert_eq!(lookup(&fixture, 1, &arena)?, Some(TableFixture::row(1, Some("xyz"))));
	Ok(())
}

#[test]
fn test_repeated_update_is_noop() -> Result<()> {
	let fixture = TableFixture::with_secondary();
	let pool = test_pool();
	let arena = arena(&pool);
	insert(&fixture, InsertKind::Insert, &[TableFixture::row(1, Some("abc")), TableFixture::row(2, Some("def"))])?;

	update_value(&fixture, 1, "xyz")?;
	let rows = fixture.rows(&arena);
	let entries = fixture.secondary_entries();

	assert_eq!(update_value(&fixture, 1, "xyz")?, WriteStatus::Ok);
	assert_eq!(fixture.rows(&arena), rows);
	assert_eq!(fixture.secondary_entries(), entries);
	Ok(())
}

#[test]
fn test_update_of_missing_row() -> Result<()> {
	let fixture = TableFixture::new();
	let err = update_value(&fixture, 9, "xyz").unwrap_err();
	assert_eq!(err.code(), ErrorCode::NotFound);
	Ok(())
}

#[test]
fn test_update_primary_key_moves_row() -> Result<()> {
	let fixture = TableFixture::with_secondary();
	let pool = test_pool();
	let arena = arena(&pool);
	insert(&fixture, InsertKind::Insert, &[TableFixture::row(1, Some("abc")), TableFixture::row(2, Some("def"))])?;

	let op = WritePartial::update(
		&fixture.primary,
		fixture.storage.clone(),
		&[0],
		fixture.secondaries(),
		vec![UpdateColumn::new(0, UpdateSource::Variable(1))],
	)?;
	assert!(op.affects_secondary(0));
	let layout = RecordLayout::new([
		(FieldType::int4(), false),
		(FieldType::int4(), false),
	]);

	let mut tx = begin(&fixture)?;
	let input = record(&layout, &[Value::Int4(1), Value::Int4(5)], &arena);
	op.process_record(&mut WriteContext::new(), tx.transaction()?, &input, None, &arena)?;
	tx.commit()?;

	assert_eq!(lookup(&fixture, 1, &arena)?, None);
	assert_eq!(lookup(&fixture, 5, &arena)?, Some(TableFixture::row(5, Some("abc"))));
	assert_eq!(secondary_lookup(&fixture, "abc", &arena)?, vec![TableFixture::row(5, Some("abc"))]);

	let mut tx = begin(&fixture)?;
	let input = record(&layout, &[Value::Int4(5), Value::Int4(2)], &arena);
	let err = op.process_record(&mut WriteContext::new(), tx.transaction()?, &input, None, &arena).unwrap_err();
	assert_eq!(err.code(), ErrorCode::UniqueConstraintViolation);
	tx.abort()?;
	Ok(())
}

#[test]
fn test_update_non_nullable_column_to_null() -> Result<()> {
	let fixture = TableFixture::new();
	let pool = test_pool();
	let arena = arena(&pool);
	insert(&fixture, InsertKind::Insert, &[TableFixture::row(1, Some("abc"))])?;

	let op = WritePartial::update(
		&fixture.primary,
		fixture.storage.clone(),
		&[0],
		Vec::new(),
		vec![UpdateColumn::new(0, UpdateSource::HostVariable(0))],
	)?;
	let host = record(&RecordLayout::nullable([FieldType::int4()]), &[Value::Null], &arena);
	let input = record(&fixture.key_layout(), &[Value::Int4(1)], &arena);
	let mut tx = begin(&fixture)?;
	let err = op.process_record(&mut WriteContext::new(), tx.transaction()?, &input, Some(&host), &arena).unwrap_err();
	assert_eq!(err.code(), ErrorCode::IntegrityConstraintViolation);
	tx.abort()?;
	assert_eq!(lookup(&fixture, 1, &arena)?, Some(TableFixture::row(1, Some("abc"))));
	Ok(())
}

#[test]
fn test_missing_host_variable() -> Result<()> {
	let fixture = TableFixture::new();
	let pool = test_pool();
	let arena = arena(&pool);
	insert(&fixture, InsertKind::Insert, &[TableFixture::row(1, Some("abc"))])?;

	let op = WritePartial::update(
		&fixture.primary,
		fixture.storage.clone(),
		&[0],
		Vec::new(),
		vec![UpdateColumn::new(1, UpdateSource::HostVariable(3))],
	)?;
	let input = record(&fixture.key_layout(), &[Value::Int4(1)], &arena);
	let mut tx = begin(&fixture)?;
	let err = op.process_record(&mut WriteContext::new(), tx.transaction()?, &input, None, &arena).unwrap_err();
	assert_eq!(err.code(), ErrorCode::InvalidArgument);
	Ok(())
}

mod insert {
	use super::*;

	#[test]
	fn test_duplicate_is_unique_violation() -> Result<()> {
		let fixture = TableFixture::with_secondary();
		insert(&fixture, InsertKind::Insert, &[TableFixture::row(1, Some("abc"))])?;
		let err = insert(&fixture, InsertKind::Insert, &[TableFixture::row(1, Some("def"))]).unwrap_err();
		assert_eq!(err.code(), ErrorCode::UniqueConstraintViolation);
		assert_eq!(fixture.secondary_entries().len(), 1);
		Ok(())
	}

	#[test]
	fn test_skip_keeps_existing_row() -> Result<()> {
		let fixture = TableFixture::with_secondary();
		let pool = test_pool();
		let arena = arena(&pool);
		insert(&fixture, InsertKind::Insert, &[TableFixture::row(1, Some("abc"))])?;

		let statuses =
			insert(&fixture, InsertKind::InsertSkip, &[TableFixture::row(1, Some("def")), TableFixture::row(2, None)])?;
		assert_eq!(statuses, vec![WriteStatus::AlreadyExists, WriteStatus::Ok]);
		assert_eq!(fixture.rows(&arena), vec![TableFixture::row(1, Some("abc")), TableFixture::row(2, None)]);
		assert!(secondary_lookup(&fixture, "def", &arena)?.is_empty());
		Ok(())
	}

	#[test]
	fn test_replace_rewrites_secondaries() -> Result<()> {
		let fixture = TableFixture::with_secondary();
		let pool = test_pool();
		let arena = arena(&pool);
		insert(&fixture, InsertKind::Insert, &[TableFixture::row(1, Some("abc"))])?;

		let statuses = insert(
			&fixture,
			InsertKind::InsertOrReplace,
			&[TableFixture::row(1, Some("def")), TableFixture::row(3, Some("ghi"))],
		)?;
		assert_eq!(statuses, vec![WriteStatus::Ok, WriteStatus::Ok]);
		assert_eq!(
			fixture.rows(&arena),
			vec![TableFixture::row(1, Some("def")), TableFixture::row(3, Some("ghi"))]
		);
		assert!(secondary_lookup(&fixture, "abc", &arena)?.is_empty());
		assert_eq!(secondary_lookup(&fixture, "def", &arena)?, vec![TableFixture::row(1, Some("def"))]);
		assert_eq!(fixture.secondary_entries().len(), 2);
		Ok(())
	}

	#[test]
	fn test_null_key_is_integrity_violation() -> Result<()> {
		let fixture = TableFixture::new();
		let pool = test_pool();
		let arena = arena(&pool);
		let op = WriteCreate::new(InsertKind::Insert, &fixture.primary, fixture.storage.clone(), Vec::new());
		let layout = RecordLayout::nullable([
			FieldType::int4(),
			FieldType::varchar(10),
		]);
		let row = record(&layout, &[Value::Null, "abc".into()], &arena);

		let mut tx = begin(&fixture)?;
		let err = op.process_record(&mut WriteContext::new(), tx.transaction()?, &row, &arena).unwrap_err();
		assert_eq!(err.code(), ErrorCode::IntegrityConstraintViolation);
		tx.abort()?;
		assert_eq!(tx.state()?, TransactionState::Aborted);
		Ok(())
	}

	#[test]
	fn test_value_longer_than_declared() -> Result<()> {
		let fixture = TableFixture::new();
		let err = insert(&fixture, InsertKind::Insert, &[TableFixture::row(1, Some("abcdefghijklmnop"))]).unwrap_err();
		assert_eq!(err.code(), ErrorCode::ValueTooLong);
		Ok(())
	}
}

mod scan {
	use super::*;

	fn load(fixture: &TableFixture) -> Result<()> {
		let rows: Vec<_> = (1..=6).map(|k| TableFixture::row(k, Some(if k % 2 == 0 { "even" } else { "odd" }))).collect();
		insert(fixture, InsertKind::Insert, &rows)?;
		Ok(())
	}

	fn keys(fixture: &TableFixture, scan: &IndexScan, arena: &dyn MemoryResource) -> Result<Vec<i32>> {
		let mut tx = TransactionContext::begin(&fixture.db, TransactionOptions::read_only())?;
		let tx = tx.transaction()?;
		let mut cursor = scan.open(tx)?;
		let (mut key, mut value) = (scan.key_record(), scan.value_record());
		let mut keys = Vec::new();
		while cursor.next(tx, arena, &mut key, &mut value)? {
			keys.push(key.get_value(0).as_i64().map_or(-1, |k| k as i32));
		}
		Ok(keys)
	}

	#[test]
	fn test_primary_range() -> Result<()> {
		let fixture = TableFixture::new();
		let pool = test_pool();
		let arena = arena(&pool);
		load(&fixture)?;

		let scan = IndexScan::primary(&fixture.primary, fixture.storage.clone())
			.with_range(ScanBound::exclusive(vec![Value::Int4(2)]), ScanBound::inclusive(vec![Value::Int4(5)]));
		assert_eq!(keys(&fixture, &scan, &arena)?, vec![3, 4, 5]);

		let reversed = scan.clone().reversed().with_limit(2);
		assert_eq!(keys(&fixture, &reversed, &arena)?, vec![5, 4]);

		let all = IndexScan::primary(&fixture.primary, fixture.storage.clone());
		assert_eq!(keys(&fixture, &all, &arena)?, vec![1, 2, 3, 4, 5, 6]);
		Ok(())
	}

	#[test]
	fn test_secondary_prefix() -> Result<()> {
		let fixture = TableFixture::with_secondary();
		let pool = test_pool();
		let arena = arena(&pool);
		load(&fixture)?;

		let (index, storage) = fixture.secondary.clone().expect("secondary index");
		let (begin_bound, end_bound) = ScanBound::prefix(vec!["even".into()]);
		let scan = IndexScan::secondary(&fixture.primary, fixture.storage.clone(), &index, storage)
			.with_range(begin_bound, end_bound);
		assert!(scan.is_secondary());
		assert_eq!(keys(&fixture, &scan, &arena)?, vec![2, 4, 6]);
		Ok(())
	}

	#[test]
	fn test_too_many_bound_values() {
		let fixture = TableFixture::new();
		let scan = IndexScan::primary(&fixture.primary, fixture.storage.clone())
			.with_range(ScanBound::inclusive(vec![Value::Int4(1), Value::Int4(2)]), ScanBound::unbound());
		assert_eq!(scan.range().unwrap_err().code(), ErrorCode::MismatchedKeyLength);
	}
}
