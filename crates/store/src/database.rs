// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	collections::{BTreeMap, HashMap},
	mem,
	sync::{
		Arc,
		atomic::{AtomicBool, AtomicU64, Ordering},
	},
	thread,
};

use parking_lot::{Mutex, RwLock};
use tessera_core::kv::{
	CommitCallback, Database, DurabilityCallback, SequenceId, SequenceValue, SequenceVersion, StorageHandle,
	StorageOptions, TransactionId, TransactionOptions, TransactionState, TransactionType,
};
use tessera_type::{LobLocator, LobReference};
use tracing::{debug, instrument, warn};

use crate::{
	config::MemoryStoreConfig,
	error::StoreError,
	storage::{Storage, Version},
	transaction::{MemoryTransaction, PendingCommit},
};

/// An in-memory key-value database with optimistic short transactions,
/// write-preserving long transactions and read-only snapshots.
#[derive(Clone)]
pub struct MemoryDatabase(pub(crate) Arc<DatabaseInner>);

pub(crate) struct DatabaseInner {
	config: MemoryStoreConfig,
	storages: RwLock<BTreeMap<String, Arc<Storage>>>,
	next_storage_id: AtomicU64,
	next_transaction_id: AtomicU64,
	committed: AtomicU64,
	durable: AtomicU64,
	commit: Mutex<CommitState>,
	sequences: RwLock<BTreeMap<SequenceId, (SequenceVersion, SequenceValue)>>,
	next_sequence_id: AtomicU64,
	lobs: RwLock<HashMap<u64, LobLocator>>,
	next_lob_id: AtomicU64,
	durability_callbacks: RwLock<Vec<DurabilityCallback>>,
	closed: AtomicBool,
}

/// Long transactions still running, and commits of long transactions that
/// wait for an older overlapping one to finish.
#[derive(Default)]
struct CommitState {
	long: BTreeMap<TransactionId, Vec<u64>>,
	waiting: Vec<PendingCommit>,
}

impl CommitState {
	fn blocked(&self, id: TransactionId, preserves: &[u64]) -> bool {
		self.long.range(..id).any(|(_, other)| other.iter().any(|s| preserves.contains(s)))
	}

	fn preserving_owner(&self, storage: u64) -> Option<TransactionId> {
		self.long.iter().find(|(_, preserves)| preserves.contains(&storage)).map(|(id, _)| *id)
	}
}

type Finished = Vec<(CommitCallback, tessera_type::Result<()>)>;

impl MemoryDatabase {
	pub fn new(config: MemoryStoreConfig) -> Self {
		Self(Arc::new(DatabaseInner {
			config,
			storages: RwLock::new(BTreeMap::new()),
			next_storage_id: AtomicU64::new(1),
			next_transaction_id: AtomicU64::new(1),
			committed: AtomicU64::new(0),
			durable: AtomicU64::new(0),
			commit: Mutex::new(CommitState::default()),
			sequences: RwLock::new(BTreeMap::new()),
			next_sequence_id: AtomicU64::new(1),
			lobs: RwLock::new(HashMap::new()),
			next_lob_id: AtomicU64::new(1),
			durability_callbacks: RwLock::new(Vec::new()),
			closed: AtomicBool::new(false),
		}))
	}

	/// The most recently committed version.
	pub fn committed_version(&self) -> u64 {
		self.0.committed.load(Ordering::Acquire)
	}

	/// The most recent version reported durable.
	pub fn durable_version(&self) -> u64 {
		self.0.durable.load(Ordering::Acquire)
	}

	/// Number of live entries in a storage at the latest version.
	pub fn entry_count(&self, handle: &StorageHandle) -> tessera_type::Result<usize> {
		let storage = self.storage(handle)?;
		Ok(storage.len(self.committed_version()))
	}

	pub fn lob_locator(&self, reference: LobReference) -> Option<LobLocator> {
		self.0.lobs.read().get(&reference.object_id).cloned()
	}

	pub(crate) fn storage(&self, handle: &StorageHandle) -> Result<Arc<Storage>, StoreError> {
		match self.0.storages.read().get(handle.name.as_ref()) {
			Some(storage) if storage.id() == handle.id => Ok(storage.clone()),
			_ => Err(StoreError::StorageNotFound {
				name: handle.name.to_string(),
			}),
		}
	}

	pub(crate) fn is_lob_registered(&self, id: u64) -> bool {
		self.0.lobs.read().contains_key(&id)
	}

	fn ensure_open(&self) -> Result<(), StoreError> {
		if self.0.closed.load(Ordering::Acquire) {
			return Err(StoreError::Closed);
		}
		Ok(())
	}

	/// Validates and applies `pending`, or parks it behind an older long
	/// transaction. Returns `true` when the commit was decided.
	pub(crate) fn commit(&self, pending: PendingCommit) -> bool {
		let mut finished = Finished::new();
		let decided = {
			let mut state = self.0.commit.lock();
			if pending.transaction_type == TransactionType::Long && state.blocked(pending.id, &pending.preserves) {
				debug!(id = pending.id, "long transaction commit waits for an older one");
				*pending.state.lock() = TransactionState::WaitingCcCommit;
				state.waiting.push(pending);
				false
			} else {
				self.decide(&mut state, pending, &mut finished);
				self.drain_waiting(&mut state, &mut finished);
				true
			}
		};
		for (callback, result) in finished {
			callback(result);
		}
		decided
	}

	pub(crate) fn abort(&self, id: TransactionId) {
		let mut finished = Finished::new();
		{
			let mut state = self.0.commit.lock();
			state.long.remove(&id);
			let mut parked = None;
			state.waiting.retain_mut(|p| {
				if p.id == id {
					parked = Some(mem::take(&mut p.callback));
					false
				} else {
					true
				}
			});
			if let Some(Some(callback)) = parked {
				finished.push((callback, Err(StoreError::InactiveTransaction { id }.into())));
			}
			self.drain_waiting(&mut state, &mut finished);
		}
		for (callback, result) in finished {
			callback(result);
		}
	}

	fn drain_waiting(&self, state: &mut CommitState, finished: &mut Finished) {
		loop {
			let position = state.waiting.iter().position(|p| !state.blocked(p.id, &p.preserves));
			let Some(position) = position else {
				break;
			};
			let pending = state.waiting.remove(position);
			self.decide(state, pending, finished);
		}
	}

	fn decide(&self, state: &mut CommitState, mut pending: PendingCommit, finished: &mut Finished) {
		state.long.remove(&pending.id);
		let result = self.validate(state, &pending).map(|_| self.apply(&mut pending));
		let callback = pending.callback.take();
		match result {
			Ok(version) => {
				debug!(id = pending.id, version, "transaction committed");
				self.publish_durability(pending.state.clone(), version);
				if let Some(callback) = callback {
					finished.push((callback, Ok(())));
				}
			}
			Err(err) => {
				warn!(id = pending.id, error = %err, "transaction commit rejected");
				*pending.state.lock() = TransactionState::Aborted;
				if let Some(callback) = callback {
					finished.push((callback, Err(err.into())));
				}
			}
		}
	}

	fn validate(&self, state: &CommitState, pending: &PendingCommit) -> Result<(), StoreError> {
		if pending.transaction_type != TransactionType::Short {
			return Ok(());
		}
		let conflict = StoreError::SerializationFailure {
			id: pending.id,
		};
		for (storage, key) in &pending.reads.keys {
			if storage.latest_version(key).is_some_and(|v| v > pending.snapshot) {
				return Err(conflict);
			}
		}
		for (storage, range) in &pending.reads.ranges {
			if storage.changed_since(range, pending.snapshot) {
				return Err(conflict);
			}
		}
		for ((_, key), (storage, _)) in &pending.writes {
			if storage.latest_version(key).is_some_and(|v| v > pending.snapshot) {
				return Err(conflict);
			}
			if let Some(owner) = state.preserving_owner(storage.id()) {
				return Err(StoreError::ConflictOnWritePreserve {
					id: pending.id,
					storage: storage.name().to_string(),
					owner,
				});
			}
		}
		Ok(())
	}

	fn apply(&self, pending: &mut PendingCommit) -> Version {
		if pending.writes.is_empty() && pending.sequences.is_empty() {
			return self.committed_version();
		}
		let version = self.committed_version() + 1;
		for ((_, key), (storage, value)) in mem::take(&mut pending.writes) {
			storage.apply(key, version, value);
		}
		let mut sequences = self.0.sequences.write();
		for (id, sequence_version, value) in pending.sequences.drain(..) {
			if let Some(current) = sequences.get_mut(&id) {
				if sequence_version > current.0 {
					*current = (sequence_version, value);
				}
			}
		}
		self.0.committed.store(version, Ordering::Release);
		version
	}

	fn publish_durability(&self, state: Arc<Mutex<TransactionState>>, version: Version) {
		match self.0.config.durability_delay {
			None => {
				*state.lock() = TransactionState::Durable;
				self.mark_durable(version);
			}
			Some(delay) => {
				*state.lock() = TransactionState::WaitingDurable;
				let db = self.clone();
				thread::spawn(move || {
					thread::sleep(delay);
					db.mark_durable(version);
					*state.lock() = TransactionState::Durable;
				});
			}
		}
	}

	fn mark_durable(&self, version: Version) {
		let previous = self.0.durable.fetch_max(version, Ordering::AcqRel);
		if version > previous {
			for callback in self.0.durability_callbacks.read().iter() {
				callback(version);
			}
		}
	}

	fn resolve_preserves(&self, handles: &[StorageHandle]) -> Result<Vec<u64>, StoreError> {
		handles.iter().map(|h| self.storage(h).map(|s| s.id())).collect()
	}
}

impl Default for MemoryDatabase {
	fn default() -> Self {
		Self::new(MemoryStoreConfig::default())
	}
}

impl Database for MemoryDatabase {
	type Transaction = MemoryTransaction;

	fn list_storages(&self) -> tessera_type::Result<Vec<String>> {
		self.ensure_open()?;
		Ok(self.0.storages.read().keys().cloned().collect())
	}

	#[instrument(name = "store::storage::create", level = "debug", skip(self, options))]
	fn create_storage(&self, name: &str, options: StorageOptions) -> tessera_type::Result<StorageHandle> {
		self.ensure_open()?;
		let mut storages = self.0.storages.write();
		if storages.contains_key(name) {
			return Err(StoreError::StorageAlreadyExists {
				name: name.to_string(),
			}
			.into());
		}
		let handle = StorageHandle {
			id: self.0.next_storage_id.fetch_add(1, Ordering::Relaxed),
			name: Arc::from(name),
		};
		storages.insert(name.to_string(), Arc::new(Storage::new(handle.clone(), options)));
		debug!(id = handle.id, "storage created");
		Ok(handle)
	}

	fn get_storage(&self, name: &str) -> tessera_type::Result<StorageHandle> {
		self.ensure_open()?;
		match self.0.storages.read().get(name) {
			Some(storage) => Ok(storage.handle.clone()),
			None => Err(StoreError::StorageNotFound {
				name: name.to_string(),
			}
			.into()),
		}
	}

	#[instrument(name = "store::storage::delete", level = "debug", skip(self), fields(name = %storage.name))]
	fn delete_storage(&self, storage: &StorageHandle) -> tessera_type::Result<()> {
		self.ensure_open()?;
		self.storage(storage)?;
		self.0.storages.write().remove(storage.name.as_ref());
		debug!("storage deleted");
		Ok(())
	}

	fn storage_set_options(&self, storage: &StorageHandle, options: StorageOptions) -> tessera_type::Result<()> {
		*self.storage(storage)?.options.write() = options;
		Ok(())
	}

	fn storage_get_options(&self, storage: &StorageHandle) -> tessera_type::Result<StorageOptions> {
		Ok(self.storage(storage)?.options.read().clone())
	}

	#[instrument(name = "store::transaction::begin", level = "debug", skip(self, options), fields(transaction_type = %options.transaction_type))]
	fn begin(&self, options: TransactionOptions) -> tessera_type::Result<MemoryTransaction> {
		self.ensure_open()?;
		if options.transaction_type != TransactionType::Long && !options.write_preserves.is_empty() {
			return Err(StoreError::InvalidOptions {
				reason: format!("write preserves given for a {} transaction", options.transaction_type),
			}
			.into());
		}
		let preserves = self.resolve_preserves(&options.write_preserves)?;
		let read_inclusive = self.resolve_preserves(&options.read_areas_inclusive)?;
		let read_exclusive = self.resolve_preserves(&options.read_areas_exclusive)?;
		let id = self.0.next_transaction_id.fetch_add(1, Ordering::Relaxed);
		let snapshot = {
			let mut state = self.0.commit.lock();
			if options.transaction_type == TransactionType::Long {
				state.long.insert(id, preserves.clone());
			}
			self.committed_version()
		};
		debug!(id, snapshot, "transaction started");
		Ok(MemoryTransaction::new(
			self.clone(),
			id,
			options.transaction_type,
			snapshot,
			preserves,
			read_inclusive,
			read_exclusive,
		))
	}

	fn sequence_create(&self) -> tessera_type::Result<SequenceId> {
		self.ensure_open()?;
		let id = self.0.next_sequence_id.fetch_add(1, Ordering::Relaxed);
		self.0.sequences.write().insert(id, (0, 0));
		Ok(id)
	}

	fn sequence_put(
		&self,
		tx: &mut MemoryTransaction,
		id: SequenceId,
		version: SequenceVersion,
		value: SequenceValue,
	) -> tessera_type::Result<()> {
		if !self.0.sequences.read().contains_key(&id) {
			return Err(StoreError::SequenceNotFound {
				id,
			}
			.into());
		}
		tx.put_sequence(id, version, value)
	}

	fn sequence_get(&self, id: SequenceId) -> tessera_type::Result<(SequenceVersion, SequenceValue)> {
		self.0.sequences.read().get(&id).copied().ok_or_else(|| {
			StoreError::SequenceNotFound {
				id,
			}
			.into()
		})
	}

	fn sequence_delete(&self, id: SequenceId) -> tessera_type::Result<()> {
		match self.0.sequences.write().remove(&id) {
			Some(_) => Ok(()),
			None => Err(StoreError::SequenceNotFound {
				id,
			}
			.into()),
		}
	}

	fn register_durability_callback(&self, callback: DurabilityCallback) -> tessera_type::Result<()> {
		self.0.durability_callbacks.write().push(callback);
		Ok(())
	}

	fn register_lob(&self, locator: &LobLocator) -> tessera_type::Result<LobReference> {
		self.ensure_open()?;
		let id = self.0.next_lob_id.fetch_add(1, Ordering::Relaxed);
		self.0.lobs.write().insert(id, locator.clone());
		Ok(LobReference::new(LobReference::PROVIDER_DATASTORE, id))
	}

	#[instrument(name = "store::database::close", level = "debug", skip(self))]
	fn close(&self) -> tessera_type::Result<()> {
		self.0.closed.store(true, Ordering::Release);
		Ok(())
	}
}
