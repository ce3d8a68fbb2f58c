// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tessera_core::{
	FieldMapping, PutOption, RecordBuffer, SecondaryField, SecondaryIndex, StorageHandle, TransactionControl,
	codec,
};
use tessera_type::util::hex;
use tracing::{instrument, trace};

use super::WriteContext;

/// Maintains the entries of one secondary index: the secondary key drawn
/// from the primary key and value records, followed by the encoded primary
/// key, with an empty value.
#[derive(Debug, Clone)]
pub struct WriteSecondaryTarget {
	storage: StorageHandle,
	fields: Vec<SecondaryField>,
}

impl WriteSecondaryTarget {
	pub fn new(index: &SecondaryIndex, storage: StorageHandle) -> Self {
		Self {
			storage,
			fields: index.fields().to_vec(),
		}
	}

	pub fn storage(&self) -> &StorageHandle {
		&self.storage
	}

	/// The secondary key fields alone, as they prefix every entry key.
	pub fn prefix(&self) -> FieldMapping {
		self.fields.iter().map(|field| field.info).collect()
	}

	/// Encodes the entry key for a row, using the primary key currently held
	/// by `ctx`.
	pub fn encode<'c>(
		&self,
		ctx: &'c mut WriteContext,
		key: &RecordBuffer<'_>,
		value: &RecordBuffer<'_>,
	) -> tessera_type::Result<&'c [u8]> {
		Ok(ctx.encode_secondary(|stream| {
			for field in &self.fields {
				let source = if field.from_key {
					key
				} else {
					value
				};
				codec::encode(stream, &source.get_datum(field.info.index), &field.info.field_type, field.info.coding)?;
			}
			Ok(())
		})?)
	}

	#[instrument(name = "engine::write::secondary::put", level = "trace", skip_all, fields(storage = %self.storage))]
	pub fn encode_put<T: TransactionControl>(
		&self,
		ctx: &mut WriteContext,
		tx: &mut T,
		key: &RecordBuffer<'_>,
		value: &RecordBuffer<'_>,
	) -> tessera_type::Result<()> {
		let entry = self.encode(ctx, key, value)?;
		trace!(key_hex = %hex::encode(entry), "put");
		tx.put(&self.storage, entry, &[], PutOption::CreateOrUpdate, &[])?;
		Ok(())
	}

	#[instrument(name = "engine::write::secondary::remove", level = "trace", skip_all, fields(storage = %self.storage))]
	pub fn encode_remove<T: TransactionControl>(
		&self,
		ctx: &mut WriteContext,
		tx: &mut T,
		key: &RecordBuffer<'_>,
		value: &RecordBuffer<'_>,
	) -> tessera_type::Result<bool> {
		let entry = self.encode(ctx, key, value)?;
		trace!(key_hex = %hex::encode(entry), "remove");
		tx.delete(&self.storage, entry)
	}
}
