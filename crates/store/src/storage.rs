// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{ops::Bound, sync::Arc};

use crossbeam_skiplist::SkipMap;
use parking_lot::RwLock;
use tessera_core::kv::{EndPointKind, ScanRange, StorageHandle, StorageOptions};

pub(crate) type Version = u64;

/// One committed state of a key; `None` marks a deletion.
#[derive(Debug, Clone)]
pub(crate) struct Versioned {
	pub version: Version,
	pub value: Option<Arc<[u8]>>,
}

/// The committed contents of one storage: a version chain per key, oldest
/// first.
pub(crate) struct Storage {
	pub handle: StorageHandle,
	pub options: RwLock<StorageOptions>,
	data: SkipMap<Vec<u8>, RwLock<Vec<Versioned>>>,
}

impl Storage {
	pub fn new(handle: StorageHandle, options: StorageOptions) -> Self {
		Self {
			handle,
			options: RwLock::new(options),
			data: SkipMap::new(),
		}
	}

	pub fn id(&self) -> u64 {
		self.handle.id
	}

	pub fn name(&self) -> &str {
		&self.handle.name
	}

	/// The value visible at `snapshot`.
	pub fn get(&self, key: &[u8], snapshot: Version) -> Option<Arc<[u8]>> {
		let entry = self.data.get(key)?;
		visible(&entry.value().read(), snapshot)
	}

	pub fn latest_version(&self, key: &[u8]) -> Option<Version> {
		let entry = self.data.get(key)?;
		let chain = entry.value().read();
		chain.last().map(|v| v.version)
	}

	pub fn apply(&self, key: Vec<u8>, version: Version, value: Option<Arc<[u8]>>) {
		let entry = self.data.get_or_insert_with(key, || RwLock::new(Vec::new()));
		entry.value().write().push(Versioned {
			version,
			value,
		});
	}

	/// Entries of `range` visible at `snapshot`, in ascending key order.
	pub fn visible_in(&self, range: &ScanRange, snapshot: Version) -> Vec<(Vec<u8>, Arc<[u8]>)> {
		let mut result = Vec::new();
		for entry in self.data.range::<[u8], _>((lower_bound(range), Bound::Unbounded)) {
			if !range.contains(entry.key()) {
				if past_end(range, entry.key()) {
					break;
				}
				continue;
			}
			if let Some(value) = visible(&entry.value().read(), snapshot) {
				result.push((entry.key().clone(), value));
			}
		}
		result
	}

	/// Whether any key of `range` was committed after `snapshot`.
	pub fn changed_since(&self, range: &ScanRange, snapshot: Version) -> bool {
		for entry in self.data.range::<[u8], _>((lower_bound(range), Bound::Unbounded)) {
			if !range.contains(entry.key()) {
				if past_end(range, entry.key()) {
					break;
				}
				continue;
			}
			if entry.value().read().last().is_some_and(|v| v.version > snapshot) {
				return true;
			}
		}
		false
	}

	pub fn len(&self, snapshot: Version) -> usize {
		self.data.iter().filter(|e| visible(&e.value().read(), snapshot).is_some()).count()
	}
}

fn visible(chain: &[Versioned], snapshot: Version) -> Option<Arc<[u8]>> {
	chain.iter().rev().find(|v| v.version <= snapshot).and_then(|v| v.value.clone())
}

fn lower_bound(range: &ScanRange) -> Bound<&[u8]> {
	match range.begin.kind {
		EndPointKind::Unbound => Bound::Unbounded,
		_ => Bound::Included(range.begin.key.as_slice()),
	}
}

fn past_end(range: &ScanRange, key: &[u8]) -> bool {
	let end = range.end.key.as_slice();
	match range.end.kind {
		EndPointKind::Unbound => false,
		EndPointKind::Inclusive => key > end,
		EndPointKind::Exclusive | EndPointKind::PrefixedExclusive => key >= end,
		EndPointKind::PrefixedInclusive => key > end && !key.starts_with(end),
	}
}
