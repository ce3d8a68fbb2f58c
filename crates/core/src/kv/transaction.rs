// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use super::{PutOption, PutStatus, ScanIterator, ScanRange, StorageHandle};

pub type TransactionId = u64;

/// Flavour of a transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
	/// optimistic concurrency control
	#[default]
	Short,
	/// long transaction with declared write preserves
	Long,
	ReadOnly,
}

impl Display for TransactionType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			TransactionType::Short => f.write_str("short"),
			TransactionType::Long => f.write_str("long"),
			TransactionType::ReadOnly => f.write_str("read_only"),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionOptions {
	pub transaction_type: TransactionType,
	pub write_preserves: Vec<StorageHandle>,
	pub read_areas_inclusive: Vec<StorageHandle>,
	pub read_areas_exclusive: Vec<StorageHandle>,
}

impl TransactionOptions {
	pub fn short() -> Self {
		Self::default()
	}

	pub fn long(write_preserves: Vec<StorageHandle>) -> Self {
		Self {
			transaction_type: TransactionType::Long,
			write_preserves,
			..Self::default()
		}
	}

	pub fn read_only() -> Self {
		Self {
			transaction_type: TransactionType::ReadOnly,
			..Self::default()
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInfo {
	pub id: TransactionId,
}

/// Lifecycle state reported by the key-value engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionState {
	#[default]
	Unknown,
	WaitingStart,
	Started,
	WaitingCcCommit,
	Aborted,
	WaitingDurable,
	Durable,
}

impl TransactionState {
	/// Whether the commit has been decided one way or the other.
	pub fn is_terminal(&self) -> bool {
		matches!(self, TransactionState::Aborted | TransactionState::WaitingDurable | TransactionState::Durable)
	}
}

/// Invoked once with the outcome of a commit request.
pub type CommitCallback = Box<dyn FnOnce(tessera_type::Result<()>) + Send>;

/// Control handle of one transaction. Calls against one handle must be
/// serialized by the caller.
pub trait TransactionControl {
	type Iterator: ScanIterator;

	fn info(&self) -> TransactionInfo;

	fn transaction_type(&self) -> TransactionType;

	fn check(&self) -> tessera_type::Result<TransactionState>;

	/// Requests a commit. Returns `true` when `callback` has already been
	/// invoked before returning.
	fn commit_with_callback(&mut self, callback: CommitCallback) -> tessera_type::Result<bool>;

	fn abort(&mut self) -> tessera_type::Result<()>;

	fn get(&mut self, storage: &StorageHandle, key: &[u8]) -> tessera_type::Result<Option<Vec<u8>>>;

	fn put(
		&mut self,
		storage: &StorageHandle,
		key: &[u8],
		value: &[u8],
		option: PutOption,
		lob_ids: &[u64],
	) -> tessera_type::Result<PutStatus>;

	/// Returns `false` when the key was not present.
	fn delete(&mut self, storage: &StorageHandle, key: &[u8]) -> tessera_type::Result<bool>;

	fn check_exist(&mut self, storage: &StorageHandle, key: &[u8]) -> tessera_type::Result<bool>;

	fn scan(&mut self, storage: &StorageHandle, range: &ScanRange) -> tessera_type::Result<Self::Iterator>;
}

