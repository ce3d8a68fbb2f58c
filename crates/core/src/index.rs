// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Index geometry: which table columns form the ordered key and the
//! unordered value of an index, and the field mappings derived from it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tessera_type::{ErrorCode, FieldType, return_error};

use crate::{
	codec::Order,
	mapping::{FieldInfo, FieldMapping},
	record::RecordLayout,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
	pub name: String,
	pub field_type: FieldType,
	pub nullable: bool,
}

impl Column {
	pub fn new(name: impl Into<String>, field_type: FieldType, nullable: bool) -> Self {
		Self {
			name: name.into(),
			field_type,
			nullable,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
	pub name: String,
	pub columns: Vec<Column>,
}

impl Table {
	pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
		Self {
			name: name.into(),
			columns,
		}
	}

	pub fn column_index(&self, name: &str) -> Option<usize> {
		self.columns.iter().position(|c| c.name == name)
	}

	/// A record holding every column in table order.
	pub fn row_layout(&self) -> RecordLayout {
		RecordLayout::new(self.columns.iter().map(|c| (c.field_type, c.nullable)))
	}
}

/// One key column: a table column and its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyColumn {
	pub column: usize,
	pub order: Order,
}

impl KeyColumn {
	pub fn ascending(column: usize) -> Self {
		Self {
			column,
			order: Order::Ascending,
		}
	}

	pub fn descending(column: usize) -> Self {
		Self {
			column,
			order: Order::Descending,
		}
	}
}

/// Where a column lives in the records of a primary index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnPosition {
	Key(usize),
	Value(usize),
}

/// The primary index of a table: every column appears exactly once, either
/// in the ordered key or in the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryIndex {
	table: Arc<Table>,
	storage: String,
	keys: Vec<KeyColumn>,
	values: Vec<usize>,
	key_layout: RecordLayout,
	value_layout: RecordLayout,
}

impl PrimaryIndex {
	pub fn new(table: Arc<Table>, storage: impl Into<String>, keys: Vec<KeyColumn>) -> tessera_type::Result<Self> {
		let storage = storage.into();
		if keys.is_empty() {
			return_error!(ErrorCode::InvalidArgument, "primary index {} has no key columns", storage);
		}
		let mut seen = vec![false; table.columns.len()];
		for key in &keys {
			match seen.get_mut(key.column) {
				Some(seen) if !*seen => *seen = true,
				Some(_) => {
					return_error!(ErrorCode::InvalidArgument, "column {} appears twice in key of {}", key.column, storage)
				}
				None => return_error!(ErrorCode::InvalidArgument, "column {} out of range for {}", key.column, table.name),
			}
		}
		let values: Vec<usize> = (0..table.columns.len()).filter(|c| !seen[*c]).collect();

		let key_layout = RecordLayout::new(keys.iter().map(|k| {
			let column = &table.columns[k.column];
			(column.field_type, column.nullable)
		}));
		let value_layout = RecordLayout::new(values.iter().map(|v| {
			let column = &table.columns[*v];
			(column.field_type, column.nullable)
		}));
		Ok(Self {
			table,
			storage,
			keys,
			values,
			key_layout,
			value_layout,
		})
	}

	pub fn table(&self) -> &Arc<Table> {
		&self.table
	}

	pub fn storage(&self) -> &str {
		&self.storage
	}

	pub fn keys(&self) -> &[KeyColumn] {
		&self.keys
	}

	pub fn values(&self) -> &[usize] {
		&self.values
	}

	pub fn key_layout(&self) -> &RecordLayout {
		&self.key_layout
	}

	pub fn value_layout(&self) -> &RecordLayout {
		&self.value_layout
	}

	pub fn position(&self, column: usize) -> Option<ColumnPosition> {
		if let Some(k) = self.keys.iter().position(|k| k.column == column) {
			return Some(ColumnPosition::Key(k));
		}
		self.values.iter().position(|v| *v == column).map(ColumnPosition::Value)
	}

	/// Key fields read from a caller record; `input_positions[i]` is the
	/// position of the `i`th key column in that record.
	pub fn input_keys(&self, input_positions: &[usize]) -> tessera_type::Result<FieldMapping> {
		if input_positions.len() != self.keys.len() {
			return_error!(
				ErrorCode::MismatchedKeyLength,
				"{} key positions given for {} key columns of {}",
				input_positions.len(),
				self.keys.len(),
				self.storage
			);
		}
		Ok(self
			.keys
			.iter()
			.zip(input_positions)
			.map(|(key, position)| {
				let column = &self.table.columns[key.column];
				FieldInfo::key(column.field_type, column.nullable, *position, key.order)
			})
			.collect())
	}

	/// Input keys over a full table row.
	pub fn row_keys(&self) -> FieldMapping {
		self.keys
			.iter()
			.map(|key| {
				let column = &self.table.columns[key.column];
				FieldInfo::key(column.field_type, column.nullable, key.column, key.order)
			})
			.collect()
	}

	/// Value fields read from a full table row.
	pub fn row_values(&self) -> FieldMapping {
		self.values
			.iter()
			.map(|v| {
				let column = &self.table.columns[*v];
				FieldInfo::value(column.field_type, column.nullable, *v)
			})
			.collect()
	}

	/// Key fields decoded into the index's own key record.
	pub fn extracted_keys(&self) -> FieldMapping {
		self.keys
			.iter()
			.enumerate()
			.map(|(i, key)| {
				let column = &self.table.columns[key.column];
				FieldInfo::key(column.field_type, column.nullable, i, key.order)
			})
			.collect()
	}

	/// Value fields decoded into the index's own value record.
	pub fn extracted_values(&self) -> FieldMapping {
		self.values
			.iter()
			.enumerate()
			.map(|(i, v)| {
				let column = &self.table.columns[*v];
				FieldInfo::value(column.field_type, column.nullable, i)
			})
			.collect()
	}
}

/// A secondary index key field together with the primary record it is drawn
/// from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecondaryField {
	pub info: FieldInfo,
	/// `true` when the source is the primary key record, `false` for the
	/// primary value record
	pub from_key: bool,
}

/// A secondary index over the columns of a primary index. Entries carry no
/// value; the primary key is appended to the secondary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondaryIndex {
	storage: String,
	keys: Vec<KeyColumn>,
	fields: Vec<SecondaryField>,
}

impl SecondaryIndex {
	pub fn new(primary: &PrimaryIndex, storage: impl Into<String>, keys: Vec<KeyColumn>) -> tessera_type::Result<Self> {
		let storage = storage.into();
		if keys.is_empty() {
			return_error!(ErrorCode::InvalidArgument, "secondary index {} has no key columns", storage);
		}
		let mut fields = Vec::with_capacity(keys.len());
		for key in &keys {
			let Some(position) = primary.position(key.column) else {
				return_error!(ErrorCode::InvalidArgument, "column {} out of range for {}", key.column, storage);
			};
			let column = &primary.table.columns[key.column];
			let (index, from_key) = match position {
				ColumnPosition::Key(i) => (i, true),
				ColumnPosition::Value(i) => (i, false),
			};
			fields.push(SecondaryField {
				info: FieldInfo::key(column.field_type, column.nullable, index, key.order),
				from_key,
			});
		}
		Ok(Self {
			storage,
			keys,
			fields,
		})
	}

	pub fn storage(&self) -> &str {
		&self.storage
	}

	pub fn keys(&self) -> &[KeyColumn] {
		&self.keys
	}

	pub fn fields(&self) -> &[SecondaryField] {
		&self.fields
	}

	/// Mapping over the secondary key columns, in a record laid out like
	/// the full table row.
	pub fn row_keys(&self, primary: &PrimaryIndex) -> FieldMapping {
		self.keys
			.iter()
			.map(|key| {
				let column = &primary.table.columns[key.column];
				FieldInfo::key(column.field_type, column.nullable, key.column, key.order)
			})
			.collect()
	}

	/// Whether any key column of this index is among `updated` table columns.
	pub fn is_affected_by(&self, updated: &[usize]) -> bool {
		self.keys.iter().any(|k| updated.contains(&k.column))
	}
}
