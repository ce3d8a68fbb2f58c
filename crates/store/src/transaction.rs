// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	collections::BTreeMap,
	mem,
	sync::Arc,
};

use parking_lot::Mutex;
use tessera_core::kv::{
	CommitCallback, PutOption, PutStatus, ScanRange, SequenceId, SequenceValue, SequenceVersion, StorageHandle,
	TransactionControl, TransactionId, TransactionInfo, TransactionState, TransactionType,
};
use tessera_type::util::hex;
use tracing::{instrument, trace};

use crate::{
	database::MemoryDatabase,
	error::StoreError,
	iterator::MemoryScanIterator,
	storage::{Storage, Version},
};

pub(crate) type WriteSet = BTreeMap<(u64, Vec<u8>), (Arc<Storage>, Option<Arc<[u8]>>)>;

/// Keys and ranges a short transaction observed, validated at commit.
#[derive(Default)]
pub(crate) struct ReadSet {
	pub keys: Vec<(Arc<Storage>, Vec<u8>)>,
	pub ranges: Vec<(Arc<Storage>, ScanRange)>,
}

/// Everything a commit needs once the transaction handed it over.
pub(crate) struct PendingCommit {
	pub id: TransactionId,
	pub transaction_type: TransactionType,
	pub snapshot: Version,
	pub preserves: Vec<u64>,
	pub reads: ReadSet,
	pub writes: WriteSet,
	pub sequences: Vec<(SequenceId, SequenceVersion, SequenceValue)>,
	pub state: Arc<Mutex<TransactionState>>,
	pub callback: Option<CommitCallback>,
}

pub struct MemoryTransaction {
	db: MemoryDatabase,
	id: TransactionId,
	transaction_type: TransactionType,
	snapshot: Version,
	preserves: Vec<u64>,
	read_inclusive: Vec<u64>,
	read_exclusive: Vec<u64>,
	reads: ReadSet,
	writes: WriteSet,
	sequences: Vec<(SequenceId, SequenceVersion, SequenceValue)>,
	state: Arc<Mutex<TransactionState>>,
	finished: bool,
}

impl MemoryTransaction {
	pub(crate) fn new(
		db: MemoryDatabase,
		id: TransactionId,
		transaction_type: TransactionType,
		snapshot: Version,
		preserves: Vec<u64>,
		read_inclusive: Vec<u64>,
		read_exclusive: Vec<u64>,
	) -> Self {
		Self {
			db,
			id,
			transaction_type,
			snapshot,
			preserves,
			read_inclusive,
			read_exclusive,
			reads: ReadSet::default(),
			writes: WriteSet::new(),
			sequences: Vec::new(),
			state: Arc::new(Mutex::new(TransactionState::Started)),
			finished: false,
		}
	}

	/// Commits and reports the outcome directly: `Ok(true)` once applied,
	/// `Ok(false)` while the commit waits behind an older long transaction.
	pub fn commit(&mut self) -> tessera_type::Result<bool> {
		let outcome = Arc::new(Mutex::new(None));
		let slot = outcome.clone();
		let decided = self.commit_with_callback(Box::new(move |result| *slot.lock() = Some(result)))?;
		if !decided {
			return Ok(false);
		}
		match outcome.lock().take() {
			Some(result) => result.map(|_| true),
			None => Ok(true),
		}
	}

	pub fn snapshot(&self) -> u64 {
		self.snapshot
	}

	pub(crate) fn put_sequence(
		&mut self,
		id: SequenceId,
		version: SequenceVersion,
		value: SequenceValue,
	) -> tessera_type::Result<()> {
		self.ensure_active()?;
		if self.transaction_type == TransactionType::ReadOnly {
			return Err(StoreError::WriteByReadOnly {
				id: self.id,
			}
			.into());
		}
		self.sequences.push((id, version, value));
		Ok(())
	}

	fn ensure_active(&self) -> Result<(), StoreError> {
		if self.finished {
			return Err(StoreError::InactiveTransaction {
				id: self.id,
			});
		}
		Ok(())
	}

	fn readable(&self, handle: &StorageHandle) -> Result<Arc<Storage>, StoreError> {
		self.ensure_active()?;
		let storage = self.db.storage(handle)?;
		let outside = (!self.read_inclusive.is_empty() && !self.read_inclusive.contains(&storage.id()))
			|| self.read_exclusive.contains(&storage.id());
		if outside {
			return Err(StoreError::ReadAreaViolation {
				id: self.id,
				storage: storage.name().to_string(),
			});
		}
		Ok(storage)
	}

	fn writable(&self, handle: &StorageHandle) -> Result<Arc<Storage>, StoreError> {
		self.ensure_active()?;
		match self.transaction_type {
			TransactionType::ReadOnly => Err(StoreError::WriteByReadOnly {
				id: self.id,
			}),
			TransactionType::Long if !self.preserves.contains(&handle.id) => {
				Err(StoreError::WriteWithoutWritePreserve {
					id: self.id,
					storage: handle.name.to_string(),
				})
			}
			_ => Ok(self.db.storage(handle)?),
		}
	}

	/// The value this transaction sees for `key`, own writes first.
	fn lookup(&mut self, storage: &Arc<Storage>, key: &[u8]) -> Option<Arc<[u8]>> {
		if let Some((_, value)) = self.writes.get(&(storage.id(), key.to_vec())) {
			return value.clone();
		}
		if self.transaction_type == TransactionType::Short {
			self.reads.keys.push((storage.clone(), key.to_vec()));
		}
		storage.get(key, self.snapshot)
	}
}

impl TransactionControl for MemoryTransaction {
	type Iterator = MemoryScanIterator;

	fn info(&self) -> TransactionInfo {
		TransactionInfo {
			id: self.id,
		}
	}

	fn transaction_type(&self) -> TransactionType {
		self.transaction_type
	}

	fn check(&self) -> tessera_type::Result<TransactionState> {
		Ok(*self.state.lock())
	}

	#[instrument(name = "store::transaction::commit", level = "debug", skip(self, callback), fields(id = self.id))]
	fn commit_with_callback(&mut self, callback: CommitCallback) -> tessera_type::Result<bool> {
		self.ensure_active()?;
		self.finished = true;
		let pending = PendingCommit {
			id: self.id,
			transaction_type: self.transaction_type,
			snapshot: self.snapshot,
			preserves: self.preserves.clone(),
			reads: mem::take(&mut self.reads),
			writes: mem::take(&mut self.writes),
			sequences: mem::take(&mut self.sequences),
			state: self.state.clone(),
			callback: Some(callback),
		};
		Ok(self.db.commit(pending))
	}

	#[instrument(name = "store::transaction::abort", level = "debug", skip(self), fields(id = self.id))]
	fn abort(&mut self) -> tessera_type::Result<()> {
		let state = *self.state.lock();
		if self.finished && state != TransactionState::WaitingCcCommit {
			return Err(StoreError::InactiveTransaction {
				id: self.id,
			}
			.into());
		}
		self.finished = true;
		self.writes.clear();
		self.sequences.clear();
		*self.state.lock() = TransactionState::Aborted;
		self.db.abort(self.id);
		Ok(())
	}

	#[instrument(name = "store::transaction::get", level = "trace", skip(self, storage, key), fields(id = self.id, storage = %storage, key = %hex::encode(key)))]
	fn get(&mut self, storage: &StorageHandle, key: &[u8]) -> tessera_type::Result<Option<Vec<u8>>> {
		let storage = self.readable(storage)?;
		Ok(self.lookup(&storage, key).map(|value| value.to_vec()))
	}

	#[instrument(name = "store::transaction::put", level = "trace", skip(self, storage, key, value, lob_ids), fields(id = self.id, storage = %storage, key = %hex::encode(key)))]
	fn put(
		&mut self,
		storage: &StorageHandle,
		key: &[u8],
		value: &[u8],
		option: PutOption,
		lob_ids: &[u64],
	) -> tessera_type::Result<PutStatus> {
		let storage = self.writable(storage)?;
		if let Some(&id) = lob_ids.iter().find(|id| !self.db.is_lob_registered(**id)) {
			return Err(StoreError::LobNotFound {
				id,
			}
			.into());
		}
		if option != PutOption::CreateOrUpdate {
			let exists = self.lookup(&storage, key).is_some();
			if option == PutOption::Create && exists {
				trace!("key already exists");
				return Ok(PutStatus::AlreadyExists);
			}
			if option == PutOption::Update && !exists {
				trace!("key not found");
				return Ok(PutStatus::NotFound);
			}
		}
		self.writes.insert((storage.id(), key.to_vec()), (storage, Some(Arc::from(value))));
		Ok(PutStatus::Written)
	}

	#[instrument(name = "store::transaction::delete", level = "trace", skip(self, storage, key), fields(id = self.id, storage = %storage, key = %hex::encode(key)))]
	fn delete(&mut self, storage: &StorageHandle, key: &[u8]) -> tessera_type::Result<bool> {
		let storage = self.writable(storage)?;
		if self.lookup(&storage, key).is_none() {
			return Ok(false);
		}
		self.writes.insert((storage.id(), key.to_vec()), (storage, None));
		Ok(true)
	}

	fn check_exist(&mut self, storage: &StorageHandle, key: &[u8]) -> tessera_type::Result<bool> {
		let storage = self.readable(storage)?;
		Ok(self.lookup(&storage, key).is_some())
	}

	#[instrument(name = "store::transaction::scan", level = "trace", skip(self, storage, range), fields(id = self.id, storage = %storage))]
	fn scan(&mut self, storage: &StorageHandle, range: &ScanRange) -> tessera_type::Result<MemoryScanIterator> {
		let storage = self.readable(storage)?;
		let mut merged: BTreeMap<Vec<u8>, Arc<[u8]>> = storage.visible_in(range, self.snapshot).into_iter().collect();
		let own = self.writes.range((storage.id(), Vec::new())..(storage.id() + 1, Vec::new()));
		for ((_, key), (_, value)) in own {
			if !range.contains(key) {
				continue;
			}
			match value {
				Some(value) => merged.insert(key.clone(), value.clone()),
				None => merged.remove(key),
			};
		}
		if self.transaction_type == TransactionType::Short {
			self.reads.ranges.push((storage, range.clone()));
		}

		let mut entries: Vec<_> = merged.into_iter().collect();
		if range.reverse {
			entries.reverse();
		}
		if let Some(limit) = range.limit {
			entries.truncate(limit);
		}
		trace!(count = entries.len(), "scan materialized");
		Ok(MemoryScanIterator::new(entries))
	}
}

impl Drop for MemoryTransaction {
	fn drop(&mut self) {
		if !self.finished {
			*self.state.lock() = TransactionState::Aborted;
			self.db.abort(self.id);
		}
	}
}
