// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::marker::PhantomData;

use tessera_memory::MemoryResource;
use tessera_type::{Date, Kind, LobReference, TimeOfDay, TimePoint, Triple, Value, ZoneOffset};

use super::layout::{FieldLayout, RecordLayout};
use crate::{
	datum::Datum,
	error::{CodecError, CodecResult},
};

/// A fixed size record. Character and octet fields are stored as fat
/// pointers to payloads that live at least as long as `'a`, usually in the
/// arena of the step that owns the record.
#[derive(Debug, Clone)]
pub struct RecordBuffer<'a> {
	layout: RecordLayout,
	data: Vec<u8>,
	_payloads: PhantomData<&'a [u8]>,
}

impl<'a> RecordBuffer<'a> {
	/// A record with every nullable field null and every other field zero.
	pub fn new(layout: RecordLayout) -> Self {
		let mut record = Self {
			data: vec![0u8; layout.size],
			layout,
			_payloads: PhantomData,
		};
		record.reset();
		record
	}

	pub fn layout(&self) -> &RecordLayout {
		&self.layout
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.data
	}

	pub fn reset(&mut self) {
		self.data.fill(0);
		for index in 0..self.layout.len() {
			if let Some(bit) = self.layout.field(index).nullity_offset {
				self.data[bit / 8] |= 1 << (bit % 8);
			}
		}
	}

	#[inline]
	pub fn is_null(&self, index: usize) -> bool {
		match self.layout.field(index).nullity_offset {
			Some(bit) => self.data[bit / 8] & (1 << (bit % 8)) != 0,
			None => false,
		}
	}

	/// Sets or clears the null flag. Non-nullable fields reject `null`.
	pub fn set_null(&mut self, index: usize, null: bool) -> CodecResult<()> {
		let field = *self.layout.field(index);
		match field.nullity_offset {
			Some(bit) => {
				if null {
					self.data[bit / 8] |= 1 << (bit % 8);
				} else {
					self.data[bit / 8] &= !(1 << (bit % 8));
				}
				Ok(())
			}
			None if null => Err(CodecError::UnexpectedNull {
				kind: field.field_type.kind(),
			}),
			None => Ok(()),
		}
	}

	pub fn get_datum(&self, index: usize) -> Datum<'a> {
		if self.is_null(index) {
			return Datum::Null;
		}
		let field = self.layout.field(index);
		let bytes = self.slot(field);
		match field.field_type.kind() {
			Kind::Boolean => Datum::Boolean(bytes[0] != 0),
			Kind::Int1 => Datum::Int1(bytes[0] as i8),
			Kind::Int2 => Datum::Int2(i16::from_ne_bytes(array(bytes, 0))),
			Kind::Int4 => Datum::Int4(i32::from_ne_bytes(array(bytes, 0))),
			Kind::Int8 => Datum::Int8(i64::from_ne_bytes(array(bytes, 0))),
			Kind::Float4 => Datum::Float4(f32::from_ne_bytes(array(bytes, 0))),
			Kind::Float8 => Datum::Float8(f64::from_ne_bytes(array(bytes, 0))),
			Kind::Decimal => Datum::Decimal(Triple::new(
				bytes[20] as i8,
				u128::from_ne_bytes(array(bytes, 0)),
				i32::from_ne_bytes(array(bytes, 16)),
			)),
			Kind::Character => {
				// SAFETY: only `set_datum` writes varlen slots, from a `&'a str`
				Datum::Character(unsafe { std::str::from_utf8_unchecked(self.varlen(bytes)) })
			}
			Kind::Octet => Datum::Octet(self.varlen(bytes)),
			Kind::Date => Datum::Date(Date::from_days(i64::from_ne_bytes(array(bytes, 0)))),
			Kind::TimeOfDay => {
				let nanos = u64::from_ne_bytes(array(bytes, 0));
				let offset = ZoneOffset(i32::from_ne_bytes(array(bytes, 8)));
				Datum::TimeOfDay(
					TimeOfDay::from_nanos(nanos).unwrap_or_default(),
					field.field_type.with_time_zone().then_some(offset),
				)
			}
			Kind::TimePoint => {
				let seconds = i64::from_ne_bytes(array(bytes, 0));
				let nanos = u32::from_ne_bytes(array(bytes, 8));
				let offset = ZoneOffset(i32::from_ne_bytes(array(bytes, 12)));
				Datum::TimePoint(
					TimePoint::new(seconds, nanos).unwrap_or_default(),
					field.field_type.with_time_zone().then_some(offset),
				)
			}
			Kind::Blob => Datum::Blob(lob(bytes)),
			Kind::Clob => Datum::Clob(lob(bytes)),
		}
	}

	/// Stores `datum` into field `index`. The datum kind must match the
	/// declared kind; `Datum::Null` sets the null flag.
	pub fn set_datum(&mut self, index: usize, datum: Datum<'a>) -> CodecResult<()> {
		let field = *self.layout.field(index);
		if datum.is_null() {
			return self.set_null(index, true);
		}
		if datum.kind() != Some(field.field_type.kind()) {
			return Err(CodecError::mismatch(field.field_type, datum.kind_name()));
		}
		let slot = &mut self.data[field.value_offset..field.value_offset + field.size()];
		match datum {
			Datum::Null => unreachable!("handled above"),
			Datum::Boolean(v) => slot[0] = v as u8,
			Datum::Int1(v) => slot[0] = v as u8,
			Datum::Int2(v) => slot.copy_from_slice(&v.to_ne_bytes()),
			Datum::Int4(v) => slot.copy_from_slice(&v.to_ne_bytes()),
			Datum::Int8(v) => slot.copy_from_slice(&v.to_ne_bytes()),
			Datum::Float4(v) => slot.copy_from_slice(&v.to_ne_bytes()),
			Datum::Float8(v) => slot.copy_from_slice(&v.to_ne_bytes()),
			Datum::Decimal(v) => {
				slot[..16].copy_from_slice(&v.coefficient().to_ne_bytes());
				slot[16..20].copy_from_slice(&v.exponent().to_ne_bytes());
				slot[20] = v.sign() as u8;
			}
			Datum::Character(v) => write_varlen(slot, v.as_bytes()),
			Datum::Octet(v) => write_varlen(slot, v),
			Datum::Date(v) => slot.copy_from_slice(&v.days().to_ne_bytes()),
			Datum::TimeOfDay(v, offset) => {
				slot[..8].copy_from_slice(&v.nanos().to_ne_bytes());
				slot[8..12].copy_from_slice(&offset.unwrap_or_default().seconds().to_ne_bytes());
			}
			Datum::TimePoint(v, offset) => {
				slot[..8].copy_from_slice(&v.seconds().to_ne_bytes());
				slot[8..12].copy_from_slice(&v.nanos().to_ne_bytes());
				slot[12..16].copy_from_slice(&offset.unwrap_or_default().seconds().to_ne_bytes());
			}
			Datum::Blob(v) | Datum::Clob(v) => {
				slot[..8].copy_from_slice(&v.provider.to_ne_bytes());
				slot[8..16].copy_from_slice(&v.object_id.to_ne_bytes());
			}
		}
		self.set_null(index, false)
	}

	pub fn get_value(&self, index: usize) -> Value {
		self.get_datum(index).to_value()
	}

	/// Stores an owned value, copying character and octet payloads into
	/// `arena`.
	pub fn set_value(&mut self, index: usize, value: &Value, arena: &'a dyn MemoryResource) -> tessera_type::Result<()> {
		let datum = Datum::from_value(value)?.copy_into(arena)?;
		Ok(self.set_datum(index, datum)?)
	}

	/// Copies field `from` of `source` into field `index`, sharing the
	/// payload.
	pub fn copy_field(&mut self, index: usize, source: &RecordBuffer<'a>, from: usize) -> CodecResult<()> {
		self.set_datum(index, source.get_datum(from))
	}

	/// Copies every field of a record with the same layout.
	pub fn copy_from(&mut self, source: &RecordBuffer<'a>) {
		debug_assert_eq!(self.layout, source.layout);
		self.data.copy_from_slice(&source.data);
	}

	pub fn values(&self) -> Vec<Value> {
		(0..self.layout.len()).map(|index| self.get_value(index)).collect()
	}

	fn slot(&self, field: &FieldLayout) -> &[u8] {
		&self.data[field.value_offset..field.value_offset + field.size()]
	}

	fn varlen(&self, slot: &[u8]) -> &'a [u8] {
		let address = u64::from_ne_bytes(array(slot, 0)) as usize;
		let len = u64::from_ne_bytes(array(slot, 8)) as usize;
		if len == 0 {
			return &[];
		}
		// SAFETY: the slot was written by `write_varlen` from a slice that
		// outlives `'a`
		unsafe { std::slice::from_raw_parts(address as *const u8, len) }
	}
}

#[inline]
fn array<const N: usize>(bytes: &[u8], at: usize) -> [u8; N] {
	let mut array = [0u8; N];
	array.copy_from_slice(&bytes[at..at + N]);
	array
}

fn write_varlen(slot: &mut [u8], payload: &[u8]) {
	slot[..8].copy_from_slice(&(payload.as_ptr() as usize as u64).to_ne_bytes());
	slot[8..16].copy_from_slice(&(payload.len() as u64).to_ne_bytes());
}

fn lob(bytes: &[u8]) -> LobReference {
	LobReference::new(u64::from_ne_bytes(array(bytes, 0)), u64::from_ne_bytes(array(bytes, 8)))
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use tessera_memory::{MonotonicResource, PagePool, PagePoolConfig};
	use tessera_type::FieldType;

	use super::*;

	fn layout() -> RecordLayout {
		RecordLayout::new([
			(FieldType::int4(), false),
			(FieldType::varchar(10), true),
			(FieldType::decimal(Some(6), Some(3)), true),
			(FieldType::time_point(true), true),
		])
	}

	#[test]
	fn test_new_record_is_null_where_nullable() {
		let record = RecordBuffer::new(layout());
		assert_eq!(record.get_datum(0), Datum::Int4(0));
		assert!(record.is_null(1));
		assert!(record.is_null(2));
		assert_eq!(record.get_datum(1), Datum::Null);
	}

	#[test]
	fn test_set_and_get() {
		let mut record = RecordBuffer::new(layout());
		record.set_datum(0, Datum::Int4(-7)).unwrap();
		record.set_datum(1, Datum::Character("abc")).unwrap();
		record.set_datum(2, Datum::Decimal(Triple::new(-1, 1234, -3))).unwrap();
		let point = TimePoint::new(1_700_000_000, 5).unwrap();
		record.set_datum(3, Datum::TimePoint(point, Some(ZoneOffset(3600)))).unwrap();

		assert_eq!(record.get_datum(0), Datum::Int4(-7));
		assert_eq!(record.get_datum(1), Datum::Character("abc"));
		assert_eq!(record.get_datum(2), Datum::Decimal(Triple::new(-1, 1234, -3)));
		assert_eq!(record.get_datum(3), Datum::TimePoint(point, Some(ZoneOffset(3600))));

		record.set_null(1, true).unwrap();
		assert_eq!(record.get_datum(1), Datum::Null);
	}

	#[test]
	fn test_null_rejected_for_non_nullable() {
		let mut record = RecordBuffer::new(layout());
		assert!(matches!(record.set_datum(0, Datum::Null), Err(CodecError::UnexpectedNull { .. })));
	}

	#[test]
	fn test_kind_mismatch() {
		let mut record = RecordBuffer::new(layout());
		assert!(matches!(record.set_datum(0, Datum::Int8(1)), Err(CodecError::TypeMismatch { .. })));
	}

	#[test]
	fn test_empty_varlen() {
		let mut record = RecordBuffer::new(layout());
		record.set_datum(1, Datum::Character("")).unwrap();
		assert_eq!(record.get_datum(1), Datum::Character(""));
	}

	#[test]
	fn test_value_is_copied_into_arena() {
		let arena = MonotonicResource::new(Arc::new(PagePool::new(PagePoolConfig::default().with_page_size(4096))));
		let mut record = RecordBuffer::new(layout());
		{
			let value = Value::Character("hello".to_string());
			record.set_value(1, &value, &arena).unwrap();
		}
		assert_eq!(record.get_value(1), Value::Character("hello".to_string()));
	}
}
