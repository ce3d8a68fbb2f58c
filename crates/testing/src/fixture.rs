// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use tessera_core::{
	Column, Database, KeyColumn, PrimaryIndex, ReadableStream, RecordBuffer, RecordLayout, ScanIterator, ScanRange,
	SecondaryIndex, StorageHandle, StorageOptions, Table, TransactionControl, TransactionOptions,
};
use tessera_memory::MemoryResource;
use tessera_store::MemoryDatabase;
use tessera_type::{FieldType, Value};

use crate::{memory_database, record};

/// `T(K INT4 PRIMARY KEY, V VARCHAR(10))` on a fresh in-memory database,
/// optionally with a secondary index `S(V)`.
pub struct TableFixture {
	pub db: MemoryDatabase,
	pub primary: PrimaryIndex,
	pub storage: StorageHandle,
	pub secondary: Option<(SecondaryIndex, StorageHandle)>,
}

impl TableFixture {
	pub fn new() -> Self {
		Self::build(false)
	}

	pub fn with_secondary() -> Self {
		Self::build(true)
	}

	fn build(secondary: bool) -> Self {
		let db = memory_database();
		let table = Arc::new(Table::new(
			"T",
			vec![Column::new("K", FieldType::int4(), false), Column::new("V", FieldType::varchar(10), true)],
		));
		let primary = PrimaryIndex::new(table, "T", vec![KeyColumn::ascending(0)]).expect("primary index");
		let storage = db.create_storage("T", StorageOptions::default()).expect("primary storage");
		let secondary = secondary.then(|| {
			let index = SecondaryIndex::new(&primary, "S", vec![KeyColumn::ascending(1)]).expect("secondary index");
			let storage = db.create_storage("S", StorageOptions::default()).expect("secondary storage");
			(index, storage)
		});
		Self {
			db,
			primary,
			storage,
			secondary,
		}
	}

	pub fn secondaries(&self) -> Vec<(SecondaryIndex, StorageHandle)> {
		self.secondary.iter().cloned().collect()
	}

	pub fn row_layout(&self) -> RecordLayout {
		self.primary.table().row_layout()
	}

	/// The input layout of key-only requests such as DELETE.
	pub fn key_layout(&self) -> RecordLayout {
		RecordLayout::new([(FieldType::int4(), false)])
	}

	pub fn row(k: i32, v: Option<&str>) -> Vec<Value> {
		vec![Value::Int4(k), v.into()]
	}

	/// Every committed row of `T` in key order.
	pub fn rows(&self, arena: &dyn MemoryResource) -> Vec<Vec<Value>> {
		let mut tx = self.db.begin(TransactionOptions::read_only()).expect("begin");
		let mut iter = tx.scan(&self.storage, &ScanRange::all()).expect("scan");
		let (keys, values) = (self.primary.row_keys(), self.primary.row_values());
		let mut rows = Vec::new();
		while iter.next().expect("next") {
			let mut row = RecordBuffer::new(self.row_layout());
			keys.decode(&mut ReadableStream::new(iter.key()), &mut row, arena).expect("key");
			values.decode(&mut ReadableStream::new(iter.value()), &mut row, arena).expect("value");
			rows.push(row.values());
		}
		rows
	}

	/// Raw `(key, value)` entries of the secondary index.
	pub fn secondary_entries(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
		let Some((_, storage)) = &self.secondary else {
			return Vec::new();
		};
		let mut tx = self.db.begin(TransactionOptions::read_only()).expect("begin");
		let mut iter = tx.scan(storage, &ScanRange::all()).expect("scan");
		let mut entries = Vec::new();
		while iter.next().expect("next") {
			entries.push((iter.key().to_vec(), iter.value().to_vec()));
		}
		entries
	}
}

impl Default for TableFixture {
	fn default() -> Self {
		Self::new()
	}
}

/// Input rows of `R(G INT4, X INT4)` for grouped aggregation.
pub struct GroupFixture {
	pub layout: RecordLayout,
	pub rows: Vec<Vec<Value>>,
}

impl GroupFixture {
	/// `(1, 10), (1, 20), (2, 30)`.
	pub fn new() -> Self {
		Self::from_rows(vec![(1, Some(10)), (1, Some(20)), (2, Some(30))])
	}

	pub fn from_rows(rows: Vec<(i32, Option<i32>)>) -> Self {
		Self {
			layout: RecordLayout::nullable([FieldType::int4(), FieldType::int4()]),
			rows: rows.into_iter().map(|(g, x)| vec![Value::Int4(g), x.into()]).collect(),
		}
	}

	pub fn empty() -> Self {
		Self::from_rows(Vec::new())
	}

	pub fn records<'a>(&self, arena: &'a dyn MemoryResource) -> Vec<RecordBuffer<'a>> {
		self.rows.iter().map(|values| record(&self.layout, values, arena)).collect()
	}
}

impl Default for GroupFixture {
	fn default() -> Self {
		Self::new()
	}
}
