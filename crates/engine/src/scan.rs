// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Range scans over a primary index, or over a secondary index followed by
//! a lookup of each referenced primary row.

use tessera_core::{
	Datum, EndPoint, EndPointKind, FieldMapping, PrimaryIndex, ReadableStream, RecordBuffer, RecordLayout,
	ScanIterator, ScanRange, SecondaryIndex, StorageHandle, TransactionControl, codec,
};
use tessera_memory::MemoryResource;
use tessera_type::{ErrorCode, Value, return_error, util::hex};
use tracing::{instrument, trace};

use crate::{error::WriteError, write::encode_growing};

/// One end of a scan: leading key column values and how they bound the range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanBound {
	pub values: Vec<Value>,
	pub kind: EndPointKind,
}

impl ScanBound {
	pub fn unbound() -> Self {
		Self::default()
	}

	pub fn inclusive(values: Vec<Value>) -> Self {
		Self {
			values,
			kind: EndPointKind::Inclusive,
		}
	}

	pub fn exclusive(values: Vec<Value>) -> Self {
		Self {
			values,
			kind: EndPointKind::Exclusive,
		}
	}

	/// Every entry whose leading key columns equal `values`.
	pub fn prefix(values: Vec<Value>) -> (Self, Self) {
		(Self::inclusive(values.clone()), Self::inclusive(values))
	}
}

#[derive(Debug, Clone)]
struct SecondarySource {
	storage: StorageHandle,
	prefix: FieldMapping,
}

/// A scan reader over one index. Rows come out decoded into records laid
/// out like the primary index's key and value.
#[derive(Debug, Clone)]
pub struct IndexScan {
	primary: StorageHandle,
	secondary: Option<SecondarySource>,
	bound_fields: FieldMapping,
	keys: FieldMapping,
	values: FieldMapping,
	key_layout: RecordLayout,
	value_layout: RecordLayout,
	begin: ScanBound,
	end: ScanBound,
	limit: Option<usize>,
	reverse: bool,
}

impl IndexScan {
	pub fn primary(index: &PrimaryIndex, storage: StorageHandle) -> Self {
		Self {
			bound_fields: index.extracted_keys(),
			keys: index.extracted_keys(),
			values: index.extracted_values(),
			key_layout: index.key_layout().clone(),
			value_layout: index.value_layout().clone(),
			primary: storage,
			secondary: None,
			begin: ScanBound::unbound(),
			end: ScanBound::unbound(),
			limit: None,
			reverse: false,
		}
	}

	pub fn secondary(
		primary: &PrimaryIndex,
		primary_storage: StorageHandle,
		index: &SecondaryIndex,
		storage: StorageHandle,
	) -> Self {
		let prefix: FieldMapping = index.fields().iter().map(|field| field.info).collect();
		Self {
			bound_fields: prefix.clone(),
			secondary: Some(SecondarySource {
				storage,
				prefix,
			}),
			..Self::primary(primary, primary_storage)
		}
	}

	pub fn with_range(mut self, begin: ScanBound, end: ScanBound) -> Self {
		self.begin = begin;
		self.end = end;
		self
	}

	pub fn with_limit(mut self, limit: usize) -> Self {
		self.limit = Some(limit);
		self
	}

	pub fn reversed(mut self) -> Self {
		self.reverse = true;
		self
	}

	pub fn is_secondary(&self) -> bool {
		self.secondary.is_some()
	}

	pub fn key_record<'a>(&self) -> RecordBuffer<'a> {
		RecordBuffer::new(self.key_layout.clone())
	}

	pub fn value_record<'a>(&self) -> RecordBuffer<'a> {
		RecordBuffer::new(self.value_layout.clone())
	}

	/// The storage range the scan covers, with both endpoints encoded
	/// through the key codec.
	pub fn range(&self) -> tessera_type::Result<ScanRange> {
		Ok(ScanRange {
			begin: self.endpoint(&self.begin)?,
			end: self.endpoint(&self.end)?,
			limit: self.limit,
			reverse: self.reverse,
		})
	}

	#[instrument(name = "engine::scan::open", level = "trace", skip_all, fields(storage = %self.scanned()))]
	pub fn open<T: TransactionControl>(&self, tx: &mut T) -> tessera_type::Result<IndexCursor<'_, T::Iterator>> {
		let range = self.range()?;
		trace!(
			begin_hex = %hex::encode(&range.begin.key),
			begin_kind = ?range.begin.kind,
			end_hex = %hex::encode(&range.end.key),
			end_kind = ?range.end.kind,
			"scan"
		);
		let iterator = tx.scan(self.scanned(), &range)?;
		Ok(IndexCursor {
			scan: self,
			iterator,
		})
	}

	fn scanned(&self) -> &StorageHandle {
		match &self.secondary {
			Some(secondary) => &secondary.storage,
			None => &self.primary,
		}
	}

	fn endpoint(&self, bound: &ScanBound) -> tessera_type::Result<EndPoint> {
		if bound.kind == EndPointKind::Unbound || bound.values.is_empty() {
			return Ok(EndPoint::unbound());
		}
		let fields = self.bound_fields.fields();
		if bound.values.len() > fields.len() {
			return_error!(
				ErrorCode::MismatchedKeyLength,
				"{} bound values given for {} key columns",
				bound.values.len(),
				fields.len()
			);
		}
		let datums = bound.values.iter().map(Datum::from_value).collect::<Result<Vec<_>, _>>()?;
		let mut key = vec![0u8; 32];
		let len = encode_growing(&mut key, |stream| {
			for (datum, info) in datums.iter().zip(fields) {
				codec::encode(stream, datum, &info.field_type, info.coding)?;
			}
			Ok(())
		})?;
		key.truncate(len);

		let partial = bound.values.len() < fields.len();
		let kind = if self.secondary.is_some() || partial {
			bound.kind.prefixed()
		} else {
			bound.kind
		};
		Ok(EndPoint {
			key,
			kind,
		})
	}
}

/// An open scan. Positioned before the first row.
pub struct IndexCursor<'s, I: ScanIterator> {
	scan: &'s IndexScan,
	iterator: I,
}

impl<I: ScanIterator> IndexCursor<'_, I> {
	/// Advances to the next row and decodes it into `key` and `value`.
	/// Returns `false` once the range is exhausted.
	pub fn next<'a, T: TransactionControl>(
		&mut self,
		tx: &mut T,
		arena: &'a dyn MemoryResource,
		key: &mut RecordBuffer<'a>,
		value: &mut RecordBuffer<'a>,
	) -> tessera_type::Result<bool> {
		if !self.iterator.next()? {
			return Ok(false);
		}
		let Some(secondary) = &self.scan.secondary else {
			self.scan.keys.decode(&mut ReadableStream::new(self.iterator.key()), key, arena)?;
			self.scan.values.decode(&mut ReadableStream::new(self.iterator.value()), value, arena)?;
			return Ok(true);
		};

		let mut entry = ReadableStream::new(self.iterator.key());
		secondary.prefix.skip(&mut entry)?;
		let primary_key = entry.rest();
		let Some(bytes) = tx.get(&self.scan.primary, primary_key)? else {
			return Err(WriteError::DanglingSecondary {
				storage: secondary.storage.name.to_string(),
				key_hex: hex::encode(primary_key),
			}
			.into());
		};
		self.scan.keys.decode(&mut ReadableStream::new(primary_key), key, arena)?;
		self.scan.values.decode(&mut ReadableStream::new(&bytes), value, arena)?;
		Ok(true)
	}
}
