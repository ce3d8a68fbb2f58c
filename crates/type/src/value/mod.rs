// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	cmp::Ordering,
	fmt::{Display, Formatter},
};

use serde::{Deserialize, Serialize};

pub mod decimal;
pub mod kind;
pub mod lob;
pub mod temporal;

use decimal::Triple;
use kind::Kind;
use lob::LobValue;
use temporal::{Date, TimeOfDay, TimePoint, ZoneOffset};

/// An owned value of one of the scalar kinds, or null.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Value {
	/// Value is not defined (think null in common programming languages)
	Null,
	Boolean(bool),
	Int1(i8),
	Int2(i16),
	Int4(i32),
	Int8(i64),
	Float4(f32),
	Float8(f64),
	Decimal(Triple),
	Character(String),
	Octet(Vec<u8>),
	Date(Date),
	TimeOfDay(TimeOfDay),
	TimeOfDayWithOffset(TimeOfDay, ZoneOffset),
	TimePoint(TimePoint),
	TimePointWithOffset(TimePoint, ZoneOffset),
	Blob(LobValue),
	Clob(LobValue),
}

impl Value {
	/// The kind of a non-null value.
	pub fn kind(&self) -> Option<Kind> {
		Some(match self {
			Value::Null => return None,
			Value::Boolean(_) => Kind::Boolean,
			Value::Int1(_) => Kind::Int1,
			Value::Int2(_) => Kind::Int2,
			Value::Int4(_) => Kind::Int4,
			Value::Int8(_) => Kind::Int8,
			Value::Float4(_) => Kind::Float4,
			Value::Float8(_) => Kind::Float8,
			Value::Decimal(_) => Kind::Decimal,
			Value::Character(_) => Kind::Character,
			Value::Octet(_) => Kind::Octet,
			Value::Date(_) => Kind::Date,
			Value::TimeOfDay(_) | Value::TimeOfDayWithOffset(..) => Kind::TimeOfDay,
			Value::TimePoint(_) | Value::TimePointWithOffset(..) => Kind::TimePoint,
			Value::Blob(_) => Kind::Blob,
			Value::Clob(_) => Kind::Clob,
		})
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Value::Int1(v) => Some(*v as i64),
			Value::Int2(v) => Some(*v as i64),
			Value::Int4(v) => Some(*v as i64),
			Value::Int8(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::Character(s) => Some(s),
			_ => None,
		}
	}

	/// Orders two values of the same kind. Null sorts before everything,
	/// NaN after every other float. Values of different kinds are not
	/// comparable.
	pub fn compare(&self, other: &Value) -> Option<Ordering> {
		Some(match (self, other) {
			(Value::Null, Value::Null) => Ordering::Equal,
			(Value::Null, _) => Ordering::Less,
			(_, Value::Null) => Ordering::Greater,
			(Value::Boolean(l), Value::Boolean(r)) => l.cmp(r),
			(Value::Int1(l), Value::Int1(r)) => l.cmp(r),
			(Value::Int2(l), Value::Int2(r)) => l.cmp(r),
			(Value::Int4(l), Value::Int4(r)) => l.cmp(r),
			(Value::Int8(l), Value::Int8(r)) => l.cmp(r),
			(Value::Float4(l), Value::Float4(r)) => compare_float(*l as f64, *r as f64),
			(Value::Float8(l), Value::Float8(r)) => compare_float(*l, *r),
			(Value::Decimal(l), Value::Decimal(r)) => l.cmp(r),
			(Value::Character(l), Value::Character(r)) => l.as_bytes().cmp(r.as_bytes()),
			(Value::Octet(l), Value::Octet(r)) => l.cmp(r),
			(Value::Date(l), Value::Date(r)) => l.cmp(r),
			(Value::TimeOfDay(l), Value::TimeOfDay(r)) => l.cmp(r),
			(Value::TimeOfDayWithOffset(l, lo), Value::TimeOfDayWithOffset(r, ro)) => (l, lo).cmp(&(r, ro)),
			(Value::TimePoint(l), Value::TimePoint(r)) => l.cmp(r),
			(Value::TimePointWithOffset(l, lo), Value::TimePointWithOffset(r, ro)) => (l, lo).cmp(&(r, ro)),
			(Value::Blob(l), Value::Blob(r)) => l.cmp(r),
			(Value::Clob(l), Value::Clob(r)) => l.cmp(r),
			_ => return None,
		})
	}
}

/// Total order over floats where every NaN is equal and greater than any
/// number.
pub fn compare_float(l: f64, r: f64) -> Ordering {
	match (l.is_nan(), r.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		self.compare(other) == Some(Ordering::Equal)
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Value::Boolean(v)
	}
}

impl From<i8> for Value {
	fn from(v: i8) -> Self {
		Value::Int1(v)
	}
}

impl From<i16> for Value {
	fn from(v: i16) -> Self {
		Value::Int2(v)
	}
}

impl From<i32> for Value {
	fn from(v: i32) -> Self {
		Value::Int4(v)
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::Int8(v)
	}
}

impl From<f32> for Value {
	fn from(v: f32) -> Self {
		Value::Float4(v)
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Value::Float8(v)
	}
}

impl From<Triple> for Value {
	fn from(v: Triple) -> Self {
		Value::Decimal(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::Character(v.to_string())
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Value::Character(v)
	}
}

impl From<Date> for Value {
	fn from(v: Date) -> Self {
		Value::Date(v)
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(v: Option<T>) -> Self {
		v.map(Into::into).unwrap_or(Value::Null)
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Value::Null => f.write_str("null"),
			Value::Boolean(v) => Display::fmt(v, f),
			Value::Int1(v) => Display::fmt(v, f),
			Value::Int2(v) => Display::fmt(v, f),
			Value::Int4(v) => Display::fmt(v, f),
			Value::Int8(v) => Display::fmt(v, f),
			Value::Float4(v) => Display::fmt(v, f),
			Value::Float8(v) => Display::fmt(v, f),
			Value::Decimal(v) => Display::fmt(v, f),
			Value::Character(v) => write!(f, "'{}'", v),
			Value::Octet(v) => write!(f, "0x{}", crate::util::hex::encode(v)),
			Value::Date(v) => Display::fmt(v, f),
			Value::TimeOfDay(v) => Display::fmt(v, f),
			Value::TimeOfDayWithOffset(v, offset) => write!(f, "{}{}", v, offset),
			Value::TimePoint(v) => Display::fmt(v, f),
			Value::TimePointWithOffset(v, offset) => write!(f, "{}{}", v, offset),
			Value::Blob(v) | Value::Clob(v) => Display::fmt(v, f),
		}
	}
}
