// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The interface the engine core consumes from a transactional key-value
//! engine. Keys and values are opaque byte strings produced by the codec.

mod transaction;

use std::{
	fmt::{Display, Formatter},
	sync::Arc,
};

use serde::{Deserialize, Serialize};
use tessera_type::{LobLocator, LobReference};
pub use transaction::{
	CommitCallback, TransactionControl, TransactionId, TransactionInfo, TransactionOptions, TransactionState,
	TransactionType,
};

/// A named storage (one index) inside the key-value engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StorageHandle {
	pub id: u64,
	pub name: Arc<str>,
}

impl Display for StorageHandle {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.name)
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageOptions {
	/// opaque metadata kept alongside the storage
	pub payload: Vec<u8>,
}

/// Behaviour of `put` when the key is already present or missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PutOption {
	#[default]
	CreateOrUpdate,
	Create,
	Update,
}

/// Outcome of a `put` the engine did not reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutStatus {
	Written,
	/// `Create` found the key present
	AlreadyExists,
	/// `Update` found the key missing
	NotFound,
}

/// Endpoint of a range scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndPointKind {
	#[default]
	Unbound,
	Inclusive,
	Exclusive,
	/// every key starting with the endpoint bytes is inside the range
	PrefixedInclusive,
	/// every key starting with the endpoint bytes is outside the range
	PrefixedExclusive,
}

impl EndPointKind {
	/// Turns exact endpoints into prefix endpoints, as needed for secondary
	/// index keys followed by the primary key.
	pub fn prefixed(self) -> Self {
		match self {
			EndPointKind::Inclusive => EndPointKind::PrefixedInclusive,
			EndPointKind::Exclusive => EndPointKind::PrefixedExclusive,
			other => other,
		}
	}
}

/// A range endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndPoint {
	pub key: Vec<u8>,
	pub kind: EndPointKind,
}

impl EndPoint {
	pub fn unbound() -> Self {
		Self::default()
	}

	pub fn inclusive(key: impl Into<Vec<u8>>) -> Self {
		Self {
			key: key.into(),
			kind: EndPointKind::Inclusive,
		}
	}

	pub fn exclusive(key: impl Into<Vec<u8>>) -> Self {
		Self {
			key: key.into(),
			kind: EndPointKind::Exclusive,
		}
	}

	pub fn prefixed(self) -> Self {
		Self {
			key: self.key,
			kind: self.kind.prefixed(),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanRange {
	pub begin: EndPoint,
	pub end: EndPoint,
	pub limit: Option<usize>,
	pub reverse: bool,
}

impl ScanRange {
	pub fn all() -> Self {
		Self::default()
	}

	/// Every key starting with `prefix`.
	pub fn prefix(prefix: impl Into<Vec<u8>>) -> Self {
		let prefix = prefix.into();
		Self {
			begin: EndPoint {
				key: prefix.clone(),
				kind: EndPointKind::PrefixedInclusive,
			},
			end: EndPoint {
				key: prefix,
				kind: EndPointKind::PrefixedInclusive,
			},
			limit: None,
			reverse: false,
		}
	}

	/// Whether `key` lies inside the range, limit and direction aside.
	pub fn contains(&self, key: &[u8]) -> bool {
		let after_begin = match self.begin.kind {
			EndPointKind::Unbound => true,
			EndPointKind::Inclusive | EndPointKind::PrefixedInclusive => key >= self.begin.key.as_slice(),
			EndPointKind::Exclusive => key > self.begin.key.as_slice(),
			EndPointKind::PrefixedExclusive => {
				key > self.begin.key.as_slice() && !key.starts_with(&self.begin.key)
			}
		};
		let before_end = match self.end.kind {
			EndPointKind::Unbound => true,
			EndPointKind::Inclusive => key <= self.end.key.as_slice(),
			EndPointKind::Exclusive => key < self.end.key.as_slice(),
			EndPointKind::PrefixedInclusive => key <= self.end.key.as_slice() || key.starts_with(&self.end.key),
			EndPointKind::PrefixedExclusive => key < self.end.key.as_slice(),
		};
		after_begin && before_end
	}
}

/// Cursor over scan results; positioned before the first entry.
pub trait ScanIterator {
	/// Advances; `false` once exhausted.
	fn next(&mut self) -> tessera_type::Result<bool>;

	fn key(&self) -> &[u8];

	fn value(&self) -> &[u8];
}

pub type SequenceId = u64;
pub type SequenceVersion = u64;
pub type SequenceValue = i64;

/// Marker of the most recent durable commit, passed to durability callbacks.
pub type DurabilityMarker = u64;

pub type DurabilityCallback = Box<dyn Fn(DurabilityMarker) + Send + Sync>;

/// A key-value database.
///
/// Content operations are safe to call from several threads once storages
/// exist; storage creation and deletion happen before transactions start.
pub trait Database: Send + Sync {
	type Transaction: TransactionControl;

	fn list_storages(&self) -> tessera_type::Result<Vec<String>>;

	fn create_storage(&self, name: &str, options: StorageOptions) -> tessera_type::Result<StorageHandle>;

	fn get_storage(&self, name: &str) -> tessera_type::Result<StorageHandle>;

	fn delete_storage(&self, storage: &StorageHandle) -> tessera_type::Result<()>;

	fn storage_set_options(&self, storage: &StorageHandle, options: StorageOptions) -> tessera_type::Result<()>;

	fn storage_get_options(&self, storage: &StorageHandle) -> tessera_type::Result<StorageOptions>;

	fn begin(&self, options: TransactionOptions) -> tessera_type::Result<Self::Transaction>;

	fn sequence_create(&self) -> tessera_type::Result<SequenceId>;

	fn sequence_put(
		&self,
		tx: &mut Self::Transaction,
		id: SequenceId,
		version: SequenceVersion,
		value: SequenceValue,
	) -> tessera_type::Result<()>;

	fn sequence_get(&self, id: SequenceId) -> tessera_type::Result<(SequenceVersion, SequenceValue)>;

	fn sequence_delete(&self, id: SequenceId) -> tessera_type::Result<()>;

	fn register_durability_callback(&self, callback: DurabilityCallback) -> tessera_type::Result<()>;

	/// Registers a large object named by a path locator and returns the
	/// reference under which values refer to it.
	fn register_lob(&self, locator: &LobLocator) -> tessera_type::Result<LobReference>;

	fn close(&self) -> tessera_type::Result<()>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_prefixed_promotion() {
		assert_eq!(EndPointKind::Inclusive.prefixed(), EndPointKind::PrefixedInclusive);
		assert_eq!(EndPointKind::Exclusive.prefixed(), EndPointKind::PrefixedExclusive);
		assert_eq!(EndPointKind::Unbound.prefixed(), EndPointKind::Unbound);
	}

	#[test]
	fn test_prefix_range() {
		let range = ScanRange::prefix(b"ab".to_vec());
		assert!(range.contains(b"ab"));
		assert!(range.contains(b"ab\x00\x01"));
		assert!(range.contains(b"abzz"));
		assert!(!range.contains(b"aa\xFF"));
		assert!(!range.contains(b"ac"));
	}

	#[test]
	fn test_prefixed_exclusive_begin() {
		let range = ScanRange {
			begin: EndPoint::exclusive(b"ab".to_vec()).prefixed(),
			..ScanRange::all()
		};
		assert!(!range.contains(b"ab\x01"));
		assert!(range.contains(b"ac"));
	}

	#[test]
	fn test_exact_endpoints() {
		let range = ScanRange {
			begin: EndPoint::inclusive(b"b".to_vec()),
			end: EndPoint::exclusive(b"d".to_vec()),
			..ScanRange::all()
		};
		assert!(!range.contains(b"a"));
		assert!(range.contains(b"b"));
		assert!(range.contains(b"c\xFF"));
		assert!(!range.contains(b"d"));
	}
}
