// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tessera_core::{
	FieldMapping, PrimaryIndex, PutOption, RecordBuffer, SecondaryIndex, StorageHandle, TransactionControl,
};
use tessera_memory::MemoryResource;
use tracing::{instrument, trace, warn};

use super::{WriteContext, WritePrimaryTarget, WriteSecondaryTarget, WriteStatus};
use crate::error::WriteError;

/// How an insert treats a row whose key already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InsertKind {
	/// Fail with a unique constraint violation.
	#[default]
	Insert,
	/// Replace the existing row and its secondary entries.
	InsertOrReplace,
	/// Keep the existing row.
	InsertSkip,
}

/// Writes full table rows into a primary index and its secondaries.
#[derive(Debug, Clone)]
pub struct WriteCreate {
	kind: InsertKind,
	primary: WritePrimaryTarget,
	secondaries: Vec<WriteSecondaryTarget>,
	row_keys: FieldMapping,
	row_values: FieldMapping,
}

impl WriteCreate {
	pub fn new(
		kind: InsertKind,
		index: &PrimaryIndex,
		storage: StorageHandle,
		secondaries: Vec<(SecondaryIndex, StorageHandle)>,
	) -> Self {
		let row_keys = index.row_keys();
		Self {
			kind,
			primary: WritePrimaryTarget::new(index, storage, row_keys.clone()),
			secondaries: secondaries
				.iter()
				.map(|(secondary, storage)| WriteSecondaryTarget::new(secondary, storage.clone()))
				.collect(),
			row_keys,
			row_values: index.row_values(),
		}
	}

	pub fn kind(&self) -> InsertKind {
		self.kind
	}

	/// Writes one row laid out in table column order. Returns
	/// `AlreadyExists` when a skipping insert left an existing row alone.
	#[instrument(name = "engine::write::create::process", level = "trace", skip_all, fields(storage = %self.primary.storage(), kind = ?self.kind))]
	pub fn process_record<'a, T: TransactionControl>(
		&self,
		ctx: &mut WriteContext,
		tx: &mut T,
		row: &RecordBuffer<'a>,
		arena: &'a dyn MemoryResource,
	) -> tessera_type::Result<WriteStatus> {
		let (key, value) = self.split(row)?;
		let result = match self.kind {
			InsertKind::Insert => self.insert(ctx, tx, &key, &value, false),
			InsertKind::InsertSkip => self.insert(ctx, tx, &key, &value, true),
			InsertKind::InsertOrReplace => self.replace(ctx, tx, row, arena, &key, &value),
		};
		if let Err(err) = &result {
			warn!(error = %err, "row aborted");
		}
		result
	}

	fn insert<T: TransactionControl>(
		&self,
		ctx: &mut WriteContext,
		tx: &mut T,
		key: &RecordBuffer<'_>,
		value: &RecordBuffer<'_>,
		skip_existing: bool,
	) -> tessera_type::Result<WriteStatus> {
		match self.primary.encode_put(ctx, tx, PutOption::Create, key, value)? {
			WriteStatus::AlreadyExists if skip_existing => {
				trace!("existing row kept");
				return Ok(WriteStatus::AlreadyExists);
			}
			WriteStatus::AlreadyExists => return Err(self.primary.duplicate(ctx).into()),
			_ => {}
		}
		for secondary in &self.secondaries {
			secondary.encode_put(ctx, tx, key, value)?;
		}
		Ok(WriteStatus::Ok)
	}

	fn replace<'a, T: TransactionControl>(
		&self,
		ctx: &mut WriteContext,
		tx: &mut T,
		row: &RecordBuffer<'a>,
		arena: &'a dyn MemoryResource,
		key: &RecordBuffer<'_>,
		value: &RecordBuffer<'_>,
	) -> tessera_type::Result<WriteStatus> {
		if !self.secondaries.is_empty() {
			let mut old_key = self.primary.key_record();
			let mut old_value = self.primary.value_record();
			if self.primary.encode_find(ctx, tx, row, arena, &mut old_key, &mut old_value)? == WriteStatus::Ok {
				for secondary in &self.secondaries {
					secondary.encode_remove(ctx, tx, &old_key, &old_value)?;
				}
			}
		}
		self.primary.encode_put(ctx, tx, PutOption::CreateOrUpdate, key, value)?;
		for secondary in &self.secondaries {
			secondary.encode_put(ctx, tx, key, value)?;
		}
		Ok(WriteStatus::Ok)
	}

	/// Splits a table row into primary key and value records.
	fn split<'a>(&self, row: &RecordBuffer<'a>) -> tessera_type::Result<(RecordBuffer<'a>, RecordBuffer<'a>)> {
		let mut key = self.primary.key_record();
		let mut value = self.primary.value_record();
		for (i, info) in self.row_keys.iter().enumerate() {
			self.check_not_null(info.nullable, info.index, row)?;
			key.copy_field(i, row, info.index)?;
		}
		for (i, info) in self.row_values.iter().enumerate() {
			self.check_not_null(info.nullable, info.index, row)?;
			value.copy_field(i, row, info.index)?;
		}
		Ok((key, value))
	}

	fn check_not_null(&self, nullable: bool, column: usize, row: &RecordBuffer<'_>) -> Result<(), WriteError> {
		if !nullable && row.is_null(column) {
			warn!(storage = %self.primary.storage(), column, "null value for non-nullable column");
			return Err(WriteError::NotNullViolation {
				storage: self.primary.storage().name.to_string(),
				column,
			});
		}
		Ok(())
	}
}
