// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::cmp::Ordering;

use tessera_core::{Datum, RecordBuffer};
use tessera_memory::MemoryResource;
use tessera_type::Kind;

use crate::error::AggregateError;

/// Record-at-a-time aggregation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregator {
	Sum,
	/// adds 1 per non-null argument
	Count,
	/// adds 1 per row
	CountRows,
	/// adds two running int8 counts
	CountMerge,
	Max,
	Min,
	/// divides a `(sum, count)` intermediate
	Avg,
	Identity,
}

/// What an aggregate contributes for a group that saw no input rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyValue {
	Null,
	Zero,
}

impl EmptyValue {
	pub fn generate(&self, target: &mut RecordBuffer<'_>, index: usize) -> tessera_type::Result<()> {
		match self {
			EmptyValue::Null => target.set_null(index, true)?,
			EmptyValue::Zero => target.set_datum(index, Datum::Int8(0))?,
		}
		Ok(())
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorInfo {
	pub aggregator: Aggregator,
	/// source field locators
	pub arguments: Vec<usize>,
	pub empty_generator: EmptyValue,
}

impl AggregatorInfo {
	pub fn new(aggregator: Aggregator, arguments: Vec<usize>, empty_generator: EmptyValue) -> Self {
		Self {
			aggregator,
			arguments,
			empty_generator,
		}
	}
}

impl Aggregator {
	/// Folds `source` into field `index` of `target`. When `initial` is set
	/// the current target contents are ignored. Payloads kept in `target`
	/// are copied into `arena`.
	pub fn apply<'a>(
		&self,
		target: &mut RecordBuffer<'a>,
		index: usize,
		initial: bool,
		source: &RecordBuffer<'_>,
		fields: &[usize],
		arena: &'a dyn MemoryResource,
	) -> tessera_type::Result<()> {
		match self {
			Aggregator::Sum => {
				let value = source.get_datum(fields[0]);
				if initial || target.is_null(index) {
					return Ok(target.set_datum(index, value.copy_into(arena)?)?);
				}
				if value.is_null() {
					return Ok(());
				}
				let sum = add(target.get_datum(index), value)?;
				Ok(target.set_datum(index, sum)?)
			}
			Aggregator::Count => {
				let present = !source.is_null(fields[0]) as i64;
				accumulate(target, index, initial, present)
			}
			Aggregator::CountRows => accumulate(target, index, initial, 1),
			Aggregator::CountMerge => {
				let count = match source.get_datum(fields[0]) {
					Datum::Int8(count) => count,
					_ => 0,
				};
				accumulate(target, index, initial, count)
			}
			Aggregator::Max => keep_extreme(target, index, initial, source.get_datum(fields[0]), Ordering::Greater, arena),
			Aggregator::Min => keep_extreme(target, index, initial, source.get_datum(fields[0]), Ordering::Less, arena),
			Aggregator::Avg => {
				let sum = source.get_datum(fields[0]);
				let count = match source.get_datum(fields[1]) {
					Datum::Int8(count) => count,
					_ => 0,
				};
				if sum.is_null() || count == 0 {
					return Ok(target.set_null(index, true)?);
				}
				Ok(target.set_datum(index, divide(sum, count)?)?)
			}
			Aggregator::Identity => {
				let value = source.get_datum(fields[0]).copy_into(arena)?;
				Ok(target.set_datum(index, value)?)
			}
		}
	}
}

fn accumulate(target: &mut RecordBuffer<'_>, index: usize, initial: bool, amount: i64) -> tessera_type::Result<()> {
	let current = match target.get_datum(index) {
		Datum::Int8(current) if !initial => current,
		_ => 0,
	};
	Ok(target.set_datum(index, Datum::Int8(current.wrapping_add(amount)))?)
}

fn keep_extreme<'a>(
	target: &mut RecordBuffer<'a>,
	index: usize,
	initial: bool,
	value: Datum<'_>,
	wanted: Ordering,
	arena: &'a dyn MemoryResource,
) -> tessera_type::Result<()> {
	if initial || target.is_null(index) {
		return Ok(target.set_datum(index, value.copy_into(arena)?)?);
	}
	if value.is_null() {
		return Ok(());
	}
	let current = target.get_datum(index);
	match value.compare(&current) {
		Some(ordering) if ordering == wanted => Ok(target.set_datum(index, value.copy_into(arena)?)?),
		Some(_) => Ok(()),
		None => Err(AggregateError::Arithmetic {
			operation: if wanted == Ordering::Greater {
				"max"
			} else {
				"min"
			},
			kind: value.kind().unwrap_or(Kind::Int8),
		}
		.into()),
	}
}

fn add<'a>(current: Datum<'a>, value: Datum<'_>) -> tessera_type::Result<Datum<'a>> {
	Ok(match (current, value) {
		(Datum::Int1(l), Datum::Int1(r)) => Datum::Int1(l.wrapping_add(r)),
		(Datum::Int2(l), Datum::Int2(r)) => Datum::Int2(l.wrapping_add(r)),
		(Datum::Int4(l), Datum::Int4(r)) => Datum::Int4(l.wrapping_add(r)),
		(Datum::Int8(l), Datum::Int8(r)) => Datum::Int8(l.wrapping_add(r)),
		(Datum::Float4(l), Datum::Float4(r)) => Datum::Float4(l + r),
		(Datum::Float8(l), Datum::Float8(r)) => Datum::Float8(l + r),
		(Datum::Decimal(l), Datum::Decimal(r)) => Datum::Decimal(l.checked_add(&r)?),
		(current, _) => {
			return Err(AggregateError::Arithmetic {
				operation: "sum",
				kind: current.kind().unwrap_or(Kind::Int8),
			}
			.into());
		}
	})
}

fn divide<'a>(sum: Datum<'_>, count: i64) -> tessera_type::Result<Datum<'a>> {
	Ok(match sum {
		Datum::Int1(v) => Datum::Int1((v as i64 / count) as i8),
		Datum::Int2(v) => Datum::Int2((v as i64 / count) as i16),
		Datum::Int4(v) => Datum::Int4((v as i64 / count) as i32),
		Datum::Int8(v) => Datum::Int8(v / count),
		Datum::Float4(v) => Datum::Float4(v / count as f32),
		Datum::Float8(v) => Datum::Float8(v / count as f64),
		Datum::Decimal(v) => Datum::Decimal(v.divide(count)?),
		other => {
			return Err(AggregateError::Arithmetic {
				operation: "avg",
				kind: other.kind().unwrap_or(Kind::Int8),
			}
			.into());
		}
	})
}
