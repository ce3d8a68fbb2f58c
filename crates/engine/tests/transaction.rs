// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Transaction context lifecycle over the in-memory store.

use tessera_core::{
	Database, PutOption, StorageOptions, TransactionControl, TransactionOptions, TransactionState, TransactionType,
};
use tessera_engine::{CommitStatus, TransactionContext};
use tessera_store::MemoryTransaction;
use tessera_testing::memory_database;
use tessera_type::{ErrorClass, ErrorCode, Result};

#[test]
fn test_inactive_after_commit() -> Result<()> {
	let db = memory_database();
	let storage = db.create_storage("t", StorageOptions::default())?;

	let mut tx: TransactionContext<MemoryTransaction> = TransactionContext::begin(&db, TransactionOptions::short())?;
	assert!(tx.is_active());
	assert_eq!(tx.transaction_type(), TransactionType::Short);
	tx.transaction()?.put(&storage, b"k", b"v", PutOption::Create, &[])?;
	assert!(matches!(tx.commit()?, CommitStatus::Committed));
	assert!(!tx.is_active());

	let err = tx.transaction().err().expect("inactive");
	assert_eq!(err.code(), ErrorCode::InactiveTransaction);
	assert_eq!(err.class(), ErrorClass::TransactionLifecycle);
	assert_eq!(tx.commit().err().map(|e| e.code()), Some(ErrorCode::InactiveTransaction));
	assert_eq!(tx.abort().unwrap_err().code(), ErrorCode::InactiveTransaction);
	Ok(())
}

#[test]
fn test_abort_discards_writes() -> Result<()> {
	let db = memory_database();
	let storage = db.create_storage("t", StorageOptions::default())?;

	let mut tx = TransactionContext::begin(&db, TransactionOptions::short())?;
	tx.transaction()?.put(&storage, b"k", b"v", PutOption::Create, &[])?;
	tx.abort()?;
	assert!(!tx.is_active());
	assert_eq!(tx.state()?, TransactionState::Aborted);

	let mut reader = db.begin(TransactionOptions::read_only())?;
	assert_eq!(reader.get(&storage, b"k")?, None);
	Ok(())
}

#[test]
fn test_write_preserves_need_long_transaction() -> Result<()> {
	let db = memory_database();
	let storage = db.create_storage("t", StorageOptions::default())?;
	let options = TransactionOptions {
		write_preserves: vec![storage],
		..TransactionOptions::short()
	};
	let err = TransactionContext::begin(&db, options).err().expect("rejected");
	assert_eq!(err.code(), ErrorCode::InvalidArgument);
	Ok(())
}

#[test]
fn test_long_commit_pending_behind_older() -> Result<()> {
	let db = memory_database();
	let storage = db.create_storage("t", StorageOptions::default())?;

	let mut older = TransactionContext::begin(&db, TransactionOptions::long(vec![storage.clone()]))?;
	let mut younger = TransactionContext::begin(&db, TransactionOptions::long(vec![storage.clone()]))?;
	younger.transaction()?.put(&storage, b"k", b"younger", PutOption::CreateOrUpdate, &[])?;

	let CommitStatus::Pending(pending) = younger.commit()? else {
		panic!("younger long transaction committed ahead of older one");
	};
	assert_eq!(pending.id(), younger.id());
	assert!(!pending.is_done());
	assert!(pending.poll().is_none());
	assert!(!younger.is_active());

	older.transaction()?.put(&storage, b"k", b"older", PutOption::CreateOrUpdate, &[])?;
	assert!(matches!(older.commit()?, CommitStatus::Committed));

	assert!(pending.is_done());
	assert!(matches!(pending.poll(), Some(Ok(()))));
	assert!(matches!(pending.poll(), Some(Ok(()))));

	let mut reader = db.begin(TransactionOptions::read_only())?;
	assert_eq!(reader.get(&storage, b"k")?, Some(b"younger".to_vec()));
	Ok(())
}

#[test]
fn test_commit_conflict_surfaces_error() -> Result<()> {
	let db = memory_database();
	let storage = db.create_storage("t", StorageOptions::default())?;

	let mut first = TransactionContext::begin(&db, TransactionOptions::short())?;
	let mut second = TransactionContext::begin(&db, TransactionOptions::short())?;
	assert_eq!(first.transaction()?.get(&storage, b"k")?, None);
	first.transaction()?.put(&storage, b"k", b"first", PutOption::CreateOrUpdate, &[])?;
	second.transaction()?.put(&storage, b"k", b"second", PutOption::CreateOrUpdate, &[])?;
	assert!(matches!(second.commit()?, CommitStatus::Committed));

	let err = first.commit().err().expect("conflict");
	assert_eq!(err.code(), ErrorCode::SerializationFailure);
	assert!(err.code().is_retryable());
	assert!(!first.is_active());
	Ok(())
}

#[test]
fn test_settled_commit_polls_repeatedly() -> Result<()> {
	let db = memory_database();
	let storage = db.create_storage("t", StorageOptions::default())?;

	let mut older = TransactionContext::begin(&db, TransactionOptions::long(vec![storage.clone()]))?;
	let mut younger = TransactionContext::begin(&db, TransactionOptions::long(vec![storage.clone()]))?;
	younger.transaction()?.put(&storage, b"a", b"1", PutOption::CreateOrUpdate, &[])?;
	let CommitStatus::Pending(pending) = younger.commit()? else {
		panic!("younger long transaction committed ahead of older one");
	};
	older.abort()?;

	assert!(pending.is_done());
	for _ in 0..3 {
		assert!(matches!(pending.poll(), Some(Ok(()))));
	}
	Ok(())
}
