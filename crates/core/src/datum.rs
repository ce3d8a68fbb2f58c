// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::cmp::Ordering;

use tessera_memory::MemoryResource;
use tessera_type::{
	Date, Kind, LobReference, LobValue, TimeOfDay, TimePoint, Triple, Value, ZoneOffset, value::compare_float,
};

use crate::error::{CodecError, CodecResult};

/// A borrowed field value. Character and octet payloads point into a record
/// arena, an encoded buffer or an owned [`Value`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Datum<'a> {
	Null,
	Boolean(bool),
	Int1(i8),
	Int2(i16),
	Int4(i32),
	Int8(i64),
	Float4(f32),
	Float8(f64),
	Decimal(Triple),
	Character(&'a str),
	Octet(&'a [u8]),
	Date(Date),
	TimeOfDay(TimeOfDay, Option<ZoneOffset>),
	TimePoint(TimePoint, Option<ZoneOffset>),
	Blob(LobReference),
	Clob(LobReference),
}

impl<'a> Datum<'a> {
	pub fn is_null(&self) -> bool {
		matches!(self, Datum::Null)
	}

	pub fn kind(&self) -> Option<Kind> {
		Some(match self {
			Datum::Null => return None,
			Datum::Boolean(_) => Kind::Boolean,
			Datum::Int1(_) => Kind::Int1,
			Datum::Int2(_) => Kind::Int2,
			Datum::Int4(_) => Kind::Int4,
			Datum::Int8(_) => Kind::Int8,
			Datum::Float4(_) => Kind::Float4,
			Datum::Float8(_) => Kind::Float8,
			Datum::Decimal(_) => Kind::Decimal,
			Datum::Character(_) => Kind::Character,
			Datum::Octet(_) => Kind::Octet,
			Datum::Date(_) => Kind::Date,
			Datum::TimeOfDay(..) => Kind::TimeOfDay,
			Datum::TimePoint(..) => Kind::TimePoint,
			Datum::Blob(_) => Kind::Blob,
			Datum::Clob(_) => Kind::Clob,
		})
	}

	pub fn kind_name(&self) -> String {
		self.kind().map(|kind| kind.to_string()).unwrap_or_else(|| "null".to_string())
	}

	/// Borrows an owned value. LOB locators have no datum form and must be
	/// resolved to references first.
	pub fn from_value(value: &'a Value) -> CodecResult<Self> {
		Ok(match value {
			Value::Null => Datum::Null,
			Value::Boolean(v) => Datum::Boolean(*v),
			Value::Int1(v) => Datum::Int1(*v),
			Value::Int2(v) => Datum::Int2(*v),
			Value::Int4(v) => Datum::Int4(*v),
			Value::Int8(v) => Datum::Int8(*v),
			Value::Float4(v) => Datum::Float4(*v),
			Value::Float8(v) => Datum::Float8(*v),
			Value::Decimal(v) => Datum::Decimal(*v),
			Value::Character(v) => Datum::Character(v.as_str()),
			Value::Octet(v) => Datum::Octet(v.as_slice()),
			Value::Date(v) => Datum::Date(*v),
			Value::TimeOfDay(v) => Datum::TimeOfDay(*v, None),
			Value::TimeOfDayWithOffset(v, offset) => Datum::TimeOfDay(*v, Some(*offset)),
			Value::TimePoint(v) => Datum::TimePoint(*v, None),
			Value::TimePointWithOffset(v, offset) => Datum::TimePoint(*v, Some(*offset)),
			Value::Blob(lob) => Datum::Blob(resolved(lob)?),
			Value::Clob(lob) => Datum::Clob(resolved(lob)?),
		})
	}

	pub fn to_value(&self) -> Value {
		match *self {
			Datum::Null => Value::Null,
			Datum::Boolean(v) => Value::Boolean(v),
			Datum::Int1(v) => Value::Int1(v),
			Datum::Int2(v) => Value::Int2(v),
			Datum::Int4(v) => Value::Int4(v),
			Datum::Int8(v) => Value::Int8(v),
			Datum::Float4(v) => Value::Float4(v),
			Datum::Float8(v) => Value::Float8(v),
			Datum::Decimal(v) => Value::Decimal(v),
			Datum::Character(v) => Value::Character(v.to_string()),
			Datum::Octet(v) => Value::Octet(v.to_vec()),
			Datum::Date(v) => Value::Date(v),
			Datum::TimeOfDay(v, None) => Value::TimeOfDay(v),
			Datum::TimeOfDay(v, Some(offset)) => Value::TimeOfDayWithOffset(v, offset),
			Datum::TimePoint(v, None) => Value::TimePoint(v),
			Datum::TimePoint(v, Some(offset)) => Value::TimePointWithOffset(v, offset),
			Datum::Blob(v) => Value::Blob(LobValue::Reference(v)),
			Datum::Clob(v) => Value::Clob(LobValue::Reference(v)),
		}
	}

	/// Re-borrows varlen payloads from `arena`.
	pub fn copy_into<'b>(&self, arena: &'b dyn MemoryResource) -> tessera_type::Result<Datum<'b>> {
		Ok(match *self {
			Datum::Character(v) => Datum::Character(arena.copy_str(v)?),
			Datum::Octet(v) => Datum::Octet(arena.copy_bytes(v)?),
			Datum::Null => Datum::Null,
			Datum::Boolean(v) => Datum::Boolean(v),
			Datum::Int1(v) => Datum::Int1(v),
			Datum::Int2(v) => Datum::Int2(v),
			Datum::Int4(v) => Datum::Int4(v),
			Datum::Int8(v) => Datum::Int8(v),
			Datum::Float4(v) => Datum::Float4(v),
			Datum::Float8(v) => Datum::Float8(v),
			Datum::Decimal(v) => Datum::Decimal(v),
			Datum::Date(v) => Datum::Date(v),
			Datum::TimeOfDay(v, o) => Datum::TimeOfDay(v, o),
			Datum::TimePoint(v, o) => Datum::TimePoint(v, o),
			Datum::Blob(v) => Datum::Blob(v),
			Datum::Clob(v) => Datum::Clob(v),
		})
	}

	/// The engine's `less` relation: null first, NaN after every number.
	pub fn compare(&self, other: &Datum<'_>) -> Option<Ordering> {
		Some(match (self, other) {
			(Datum::Null, Datum::Null) => Ordering::Equal,
			(Datum::Null, _) => Ordering::Less,
			(_, Datum::Null) => Ordering::Greater,
			(Datum::Boolean(l), Datum::Boolean(r)) => l.cmp(r),
			(Datum::Int1(l), Datum::Int1(r)) => l.cmp(r),
			(Datum::Int2(l), Datum::Int2(r)) => l.cmp(r),
			(Datum::Int4(l), Datum::Int4(r)) => l.cmp(r),
			(Datum::Int8(l), Datum::Int8(r)) => l.cmp(r),
			(Datum::Float4(l), Datum::Float4(r)) => compare_float(*l as f64, *r as f64),
			(Datum::Float8(l), Datum::Float8(r)) => compare_float(*l, *r),
			(Datum::Decimal(l), Datum::Decimal(r)) => l.cmp(r),
			(Datum::Character(l), Datum::Character(r)) => l.as_bytes().cmp(r.as_bytes()),
			(Datum::Octet(l), Datum::Octet(r)) => l.cmp(r),
			(Datum::Date(l), Datum::Date(r)) => l.cmp(r),
			(Datum::TimeOfDay(l, lo), Datum::TimeOfDay(r, ro)) => (l, lo).cmp(&(r, ro)),
			(Datum::TimePoint(l, lo), Datum::TimePoint(r, ro)) => (l, lo).cmp(&(r, ro)),
			(Datum::Blob(l), Datum::Blob(r)) => l.cmp(r),
			(Datum::Clob(l), Datum::Clob(r)) => l.cmp(r),
			_ => return None,
		})
	}
}

fn resolved(lob: &LobValue) -> CodecResult<LobReference> {
	lob.reference().ok_or_else(|| CodecError::unsupported("unresolved lob locator"))
}

impl From<i32> for Datum<'_> {
	fn from(v: i32) -> Self {
		Datum::Int4(v)
	}
}

impl From<i64> for Datum<'_> {
	fn from(v: i64) -> Self {
		Datum::Int8(v)
	}
}

impl<'a> From<&'a str> for Datum<'a> {
	fn from(v: &'a str) -> Self {
		Datum::Character(v)
	}
}
