// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tessera_core::{
	Datum, FieldMapping, PrimaryIndex, PutOption, PutStatus, ReadableStream, RecordBuffer, RecordLayout,
	StorageHandle, TransactionControl,
};
use tessera_memory::MemoryResource;
use tessera_type::{LobReference, util::hex};
use tracing::{instrument, trace, warn};

use super::{WriteContext, WriteStatus};
use crate::error::WriteError;

/// Reads and writes the primary entries of one table.
///
/// Key and value records passed to [`encode_put`](Self::encode_put) and
/// filled by the find operations use the index's own layouts; lookups take
/// an arbitrary caller record through the input key mapping.
#[derive(Debug, Clone)]
pub struct WritePrimaryTarget {
	storage: StorageHandle,
	input_keys: FieldMapping,
	keys: FieldMapping,
	values: FieldMapping,
	key_layout: RecordLayout,
	value_layout: RecordLayout,
}

impl WritePrimaryTarget {
	pub fn new(index: &PrimaryIndex, storage: StorageHandle, input_keys: FieldMapping) -> Self {
		Self {
			storage,
			input_keys,
			keys: index.extracted_keys(),
			values: index.extracted_values(),
			key_layout: index.key_layout().clone(),
			value_layout: index.value_layout().clone(),
		}
	}

	pub fn storage(&self) -> &StorageHandle {
		&self.storage
	}

	pub fn key_record<'a>(&self) -> RecordBuffer<'a> {
		RecordBuffer::new(self.key_layout.clone())
	}

	pub fn value_record<'a>(&self) -> RecordBuffer<'a> {
		RecordBuffer::new(self.value_layout.clone())
	}

	/// Looks up the row keyed by `input` and decodes it into `key` and
	/// `value`. The encoded key stays in `ctx` for later reuse.
	#[instrument(name = "engine::write::primary::find", level = "trace", skip_all, fields(storage = %self.storage))]
	pub fn encode_find<'a, T: TransactionControl>(
		&self,
		ctx: &mut WriteContext,
		tx: &mut T,
		input: &RecordBuffer<'_>,
		arena: &'a dyn MemoryResource,
		key: &mut RecordBuffer<'a>,
		value: &mut RecordBuffer<'a>,
	) -> tessera_type::Result<WriteStatus> {
		self.check_not_null(&self.input_keys, input)?;
		let encoded = ctx.encode_key(|stream| self.input_keys.encode(stream, input))?;
		trace!(key_hex = %hex::encode(encoded), "find");
		let Some(bytes) = tx.get(&self.storage, encoded)? else {
			return Ok(WriteStatus::NotFound);
		};
		self.keys.decode(&mut ReadableStream::new(ctx.encoded_key()), key, arena)?;
		self.values.decode(&mut ReadableStream::new(&bytes), value, arena)?;
		Ok(WriteStatus::Ok)
	}

	/// [`encode_find`](Self::encode_find) followed by removal of the entry.
	#[instrument(name = "engine::write::primary::find_remove", level = "trace", skip_all, fields(storage = %self.storage))]
	pub fn encode_find_remove<'a, T: TransactionControl>(
		&self,
		ctx: &mut WriteContext,
		tx: &mut T,
		input: &RecordBuffer<'_>,
		arena: &'a dyn MemoryResource,
		key: &mut RecordBuffer<'a>,
		value: &mut RecordBuffer<'a>,
	) -> tessera_type::Result<WriteStatus> {
		match self.encode_find(ctx, tx, input, arena, key, value)? {
			WriteStatus::Ok => self.remove_by_encoded_key(ctx, tx),
			status => Ok(status),
		}
	}

	#[instrument(name = "engine::write::primary::put", level = "trace", skip_all, fields(storage = %self.storage, option = ?option))]
	pub fn encode_put<T: TransactionControl>(
		&self,
		ctx: &mut WriteContext,
		tx: &mut T,
		option: PutOption,
		key: &RecordBuffer<'_>,
		value: &RecordBuffer<'_>,
	) -> tessera_type::Result<WriteStatus> {
		self.check_not_null(&self.keys, key)?;
		ctx.encode_key(|stream| self.keys.encode(stream, key))?;
		self.put_by_encoded_key(ctx, tx, option, value)
	}

	/// Writes `value` under the key left in `ctx` by the latest key encode.
	pub fn put_by_encoded_key<T: TransactionControl>(
		&self,
		ctx: &mut WriteContext,
		tx: &mut T,
		option: PutOption,
		value: &RecordBuffer<'_>,
	) -> tessera_type::Result<WriteStatus> {
		self.check_not_null(&self.values, value)?;
		let lob_ids = self.lob_ids(value);
		ctx.encode_value(|stream| self.values.encode(stream, value))?;
		let status = tx.put(&self.storage, ctx.encoded_key(), ctx.encoded_value(), option, &lob_ids)?;
		trace!(key_hex = %hex::encode(ctx.encoded_key()), value_len = ctx.encoded_value().len(), ?status, "put");
		Ok(match status {
			PutStatus::Written => WriteStatus::Ok,
			PutStatus::AlreadyExists => WriteStatus::AlreadyExists,
			PutStatus::NotFound => WriteStatus::NotFound,
		})
	}

	#[instrument(name = "engine::write::primary::remove", level = "trace", skip_all, fields(storage = %self.storage))]
	pub fn encode_remove<T: TransactionControl>(
		&self,
		ctx: &mut WriteContext,
		tx: &mut T,
		input: &RecordBuffer<'_>,
	) -> tessera_type::Result<WriteStatus> {
		self.check_not_null(&self.input_keys, input)?;
		ctx.encode_key(|stream| self.input_keys.encode(stream, input))?;
		self.remove_by_encoded_key(ctx, tx)
	}

	/// Removes the entry under the key left in `ctx`, skipping the encode.
	pub fn remove_by_encoded_key<T: TransactionControl>(
		&self,
		ctx: &mut WriteContext,
		tx: &mut T,
	) -> tessera_type::Result<WriteStatus> {
		let removed = tx.delete(&self.storage, ctx.encoded_key())?;
		trace!(key_hex = %hex::encode(ctx.encoded_key()), removed, "remove");
		Ok(if removed {
			WriteStatus::Ok
		} else {
			WriteStatus::NotFound
		})
	}

	pub(crate) fn not_found(&self, ctx: &WriteContext) -> WriteError {
		WriteError::RowNotFound {
			storage: self.storage.name.to_string(),
			key_hex: hex::encode(ctx.encoded_key()),
		}
	}

	pub(crate) fn duplicate(&self, ctx: &WriteContext) -> WriteError {
		WriteError::UniqueViolation {
			storage: self.storage.name.to_string(),
			key_hex: hex::encode(ctx.encoded_key()),
		}
	}

	fn check_not_null(&self, mapping: &FieldMapping, record: &RecordBuffer<'_>) -> Result<(), WriteError> {
		match mapping.iter().find(|info| !info.nullable && record.is_null(info.index)) {
			Some(info) => {
				warn!(storage = %self.storage, column = info.index, "null value for non-nullable column");
				Err(WriteError::NotNullViolation {
					storage: self.storage.name.to_string(),
					column: info.index,
				})
			}
			None => Ok(()),
		}
	}

	fn lob_ids(&self, value: &RecordBuffer<'_>) -> Vec<u64> {
		self.values
			.iter()
			.filter_map(|info| match value.get_datum(info.index) {
				Datum::Blob(reference) | Datum::Clob(reference)
					if reference.provider == LobReference::PROVIDER_DATASTORE =>
				{
					Some(reference.object_id)
				}
				_ => None,
			})
			.collect()
	}
}
