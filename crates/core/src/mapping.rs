// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tessera_memory::MemoryResource;
use tessera_type::FieldType;

use crate::{
	codec::{self, CodingSpec, Order, ReadableStream, WritableStream},
	error::CodecResult,
	record::RecordBuffer,
};

/// How one encoded field maps to one field of a record buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
	pub field_type: FieldType,
	pub nullable: bool,
	/// position of the field in the record layout
	pub index: usize,
	pub coding: CodingSpec,
}

impl FieldInfo {
	pub fn key(field_type: FieldType, nullable: bool, index: usize, order: Order) -> Self {
		Self {
			field_type,
			nullable,
			index,
			coding: CodingSpec::key(order, nullable),
		}
	}

	pub fn value(field_type: FieldType, nullable: bool, index: usize) -> Self {
		Self {
			field_type,
			nullable,
			index,
			coding: CodingSpec::value(nullable),
		}
	}
}

/// Field infos in encoding order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping(Vec<FieldInfo>);

impl FieldMapping {
	pub fn new(fields: Vec<FieldInfo>) -> Self {
		Self(fields)
	}

	pub fn fields(&self) -> &[FieldInfo] {
		&self.0
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &FieldInfo> {
		self.0.iter()
	}

	/// Encodes the mapped fields of `record` in order.
	pub fn encode(&self, stream: &mut WritableStream<'_>, record: &RecordBuffer<'_>) -> CodecResult<()> {
		for info in &self.0 {
			codec::encode(stream, &record.get_datum(info.index), &info.field_type, info.coding)?;
		}
		Ok(())
	}

	/// Decodes the mapped fields into `record`, copying payloads into `arena`.
	pub fn decode<'a>(
		&self,
		stream: &mut ReadableStream<'_>,
		record: &mut RecordBuffer<'a>,
		arena: &'a dyn MemoryResource,
	) -> tessera_type::Result<()> {
		for info in &self.0 {
			let datum = codec::decode(stream, &info.field_type, info.coding, arena)?;
			record.set_datum(info.index, datum)?;
		}
		Ok(())
	}

	/// Moves past the mapped fields without materializing them.
	pub fn skip(&self, stream: &mut ReadableStream<'_>) -> CodecResult<()> {
		for info in &self.0 {
			codec::skip(stream, &info.field_type, info.coding)?;
		}
		Ok(())
	}
}

impl FromIterator<FieldInfo> for FieldMapping {
	fn from_iter<T: IntoIterator<Item = FieldInfo>>(iter: T) -> Self {
		Self(iter.into_iter().collect())
	}
}
