// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use tessera_core::kv::ScanIterator;

/// A materialized scan. Holds its entries, so the owning transaction stays
/// usable while the iterator is alive.
#[derive(Debug, Default)]
pub struct MemoryScanIterator {
	entries: Vec<(Vec<u8>, Arc<[u8]>)>,
	position: Option<usize>,
}

impl MemoryScanIterator {
	pub(crate) fn new(entries: Vec<(Vec<u8>, Arc<[u8]>)>) -> Self {
		Self {
			entries,
			position: None,
		}
	}

	pub fn remaining(&self) -> usize {
		match self.position {
			None => self.entries.len(),
			Some(p) => self.entries.len().saturating_sub(p + 1),
		}
	}

	fn current(&self) -> Option<&(Vec<u8>, Arc<[u8]>)> {
		self.position.and_then(|p| self.entries.get(p))
	}
}

impl ScanIterator for MemoryScanIterator {
	fn next(&mut self) -> tessera_type::Result<bool> {
		let next = self.position.map_or(0, |p| (p + 1).min(self.entries.len()));
		self.position = Some(next);
		Ok(next < self.entries.len())
	}

	fn key(&self) -> &[u8] {
		self.current().map_or(&[], |(key, _)| key.as_slice())
	}

	fn value(&self) -> &[u8] {
		self.current().map_or(&[], |(_, value)| value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn entry(key: &[u8], value: &[u8]) -> (Vec<u8>, Arc<[u8]>) {
		(key.to_vec(), Arc::from(value))
	}

	#[test]
	fn test_walks_entries_in_order() {
		let mut iterator = MemoryScanIterator::new(vec![entry(b"a", b"1"), entry(b"b", b"2")]);
		assert_eq!(iterator.remaining(), 2);
		assert!(iterator.next().unwrap());
		assert_eq!(iterator.key(), b"a");
		assert_eq!(iterator.value(), b"1");
		assert!(iterator.next().unwrap());
		assert_eq!(iterator.key(), b"b");
		assert!(!iterator.next().unwrap());
		assert!(!iterator.next().unwrap());
		assert_eq!(iterator.key(), b"");
	}

	#[test]
	fn test_empty() {
		let mut iterator = MemoryScanIterator::default();
		assert!(!iterator.next().unwrap());
		assert_eq!(iterator.value(), b"");
	}
}
