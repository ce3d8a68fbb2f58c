// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
	thread,
};

use parking_lot::Mutex;
use tessera_core::kv::{
	Database, TransactionControl, TransactionId, TransactionOptions, TransactionState, TransactionType,
};
use tracing::{debug, instrument};

use crate::error::TransactionError;

type CommitSlot = Arc<Mutex<Option<tessera_type::Result<()>>>>;

/// Outcome of [`TransactionContext::commit`].
pub enum CommitStatus {
	Committed,
	/// A long transaction whose commit waits behind an older one.
	Pending(PendingCommit),
}

/// A commit request not yet decided by the store.
pub struct PendingCommit {
	id: TransactionId,
	done: Arc<AtomicBool>,
	result: CommitSlot,
}

impl PendingCommit {
	pub fn id(&self) -> TransactionId {
		self.id
	}

	pub fn is_done(&self) -> bool {
		self.done.load(Ordering::Acquire)
	}

	/// The commit outcome once decided. The outcome stays settled, so
	/// repeated polls return the same result.
	pub fn poll(&self) -> Option<tessera_type::Result<()>> {
		if !self.is_done() {
			return None;
		}
		Some(match self.result.lock().as_ref() {
			Some(result) => result.clone(),
			None => Err(TransactionError::CommitLost {
				id: self.id,
			}
			.into()),
		})
	}
}

/// Wraps a KV transaction with the `active` flag cleared by the first
/// terminal call.
pub struct TransactionContext<T: TransactionControl> {
	control: T,
	active: bool,
}

impl<T: TransactionControl> TransactionContext<T> {
	#[instrument(name = "engine::transaction::begin", level = "debug", skip(db, options), fields(transaction_type = %options.transaction_type))]
	pub fn begin<D>(db: &D, options: TransactionOptions) -> tessera_type::Result<Self>
	where
		D: Database<Transaction = T>,
	{
		if options.transaction_type != TransactionType::Long && !options.write_preserves.is_empty() {
			return Err(TransactionError::InvalidOptions {
				reason: format!("write preserves require a long transaction, got {}", options.transaction_type),
			}
			.into());
		}
		let control = db.begin(options)?;
		debug!(id = control.info().id, "transaction context created");
		Ok(Self {
			control,
			active: true,
		})
	}

	pub fn id(&self) -> TransactionId {
		self.control.info().id
	}

	pub fn transaction_type(&self) -> TransactionType {
		self.control.transaction_type()
	}

	pub fn is_active(&self) -> bool {
		self.active
	}

	pub fn state(&self) -> tessera_type::Result<TransactionState> {
		self.control.check()
	}

	/// The underlying transaction, for content operations.
	pub fn transaction(&mut self) -> tessera_type::Result<&mut T> {
		self.ensure_active()?;
		Ok(&mut self.control)
	}

	/// Commits. Short and read-only transactions wait for the outcome; a
	/// long transaction that cannot be decided yet returns a pending handle.
	#[instrument(name = "engine::transaction::commit", level = "debug", skip(self), fields(id = self.id()))]
	pub fn commit(&mut self) -> tessera_type::Result<CommitStatus> {
		self.ensure_active()?;
		self.active = false;

		let id = self.id();
		let done = Arc::new(AtomicBool::new(false));
		let result: CommitSlot = Arc::new(Mutex::new(None));
		let (flag, slot) = (done.clone(), result.clone());
		let decided = self.control.commit_with_callback(Box::new(move |outcome| {
			*slot.lock() = Some(outcome);
			flag.store(true, Ordering::Release);
		}))?;

		if self.control.transaction_type() == TransactionType::Long && !decided {
			debug!(id, "commit pending");
			return Ok(CommitStatus::Pending(PendingCommit {
				id,
				done,
				result,
			}));
		}
		while !done.load(Ordering::Acquire) {
			thread::yield_now();
		}
		take_result(id, &result)?;
		Ok(CommitStatus::Committed)
	}

	#[instrument(name = "engine::transaction::abort", level = "debug", skip(self), fields(id = self.id()))]
	pub fn abort(&mut self) -> tessera_type::Result<()> {
		self.ensure_active()?;
		self.active = false;
		self.control.abort()
	}

	fn ensure_active(&self) -> Result<(), TransactionError> {
		if !self.active {
			return Err(TransactionError::Inactive {
				id: self.id(),
			});
		}
		Ok(())
	}
}

fn take_result(id: TransactionId, slot: &CommitSlot) -> tessera_type::Result<()> {
	match slot.lock().take() {
		Some(result) => result,
		None => Err(TransactionError::CommitLost {
			id,
		}
		.into()),
	}
}
