// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use tessera_type::{ErrorCode, FieldType, Kind, return_error};

use super::aggregator::{Aggregator, AggregatorInfo, EmptyValue};
use crate::error::AggregateError;

/// First id of the built-in aggregate signatures.
pub const FUNCTION_ID_BASE: u32 = 10000;

const SUM_ARGUMENTS: [Kind; 7] =
	[Kind::Int1, Kind::Int2, Kind::Int4, Kind::Int8, Kind::Float4, Kind::Float8, Kind::Decimal];

const COUNT_ARGUMENTS: [Kind; 13] = [
	Kind::Boolean,
	Kind::Int1,
	Kind::Int2,
	Kind::Int4,
	Kind::Int8,
	Kind::Float4,
	Kind::Float8,
	Kind::Decimal,
	Kind::Character,
	Kind::Octet,
	Kind::Date,
	Kind::TimeOfDay,
	Kind::TimePoint,
];

const ORDERED_ARGUMENTS: [Kind; 11] = [
	Kind::Int2,
	Kind::Int4,
	Kind::Int8,
	Kind::Float4,
	Kind::Float8,
	Kind::Decimal,
	Kind::Character,
	Kind::Octet,
	Kind::Date,
	Kind::TimeOfDay,
	Kind::TimePoint,
];

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregateKind {
	Sum,
	Count,
	CountRows,
	Avg,
	Max,
	Min,
}

impl AggregateKind {
	pub fn name(&self) -> &'static str {
		match self {
			AggregateKind::Sum => "sum",
			AggregateKind::Count => "count",
			AggregateKind::CountRows => "count_rows",
			AggregateKind::Avg => "avg",
			AggregateKind::Max => "max",
			AggregateKind::Min => "min",
		}
	}

	pub fn from_name(name: &str) -> Option<Self> {
		Some(match name {
			"sum" => AggregateKind::Sum,
			"count" => AggregateKind::Count,
			"count_rows" => AggregateKind::CountRows,
			"avg" => AggregateKind::Avg,
			"max" => AggregateKind::Max,
			"min" => AggregateKind::Min,
			_ => return None,
		})
	}
}

impl Display for AggregateKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}

/// One built-in aggregate signature.
///
/// The intermediate fields carry a partial result between the three
/// phases: `pre` fills them from input rows, `mid` merges two partial
/// results and `post` projects the merged intermediate to the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateFunction {
	pub id: u32,
	pub kind: AggregateKind,
	/// `None` only for `count_rows`
	pub argument: Option<Kind>,
}

impl AggregateFunction {
	pub fn name(&self) -> &'static str {
		self.kind.name()
	}

	pub fn arity(&self) -> usize {
		self.argument.map_or(0, |_| 1)
	}

	/// Intermediate field types with their nullability.
	pub fn intermediate(&self) -> Vec<(FieldType, bool)> {
		let count = (FieldType::int8(), false);
		match (self.kind, self.argument) {
			(AggregateKind::Count | AggregateKind::CountRows, _) => vec![count],
			(AggregateKind::Avg, Some(argument)) => vec![(FieldType::from(argument), true), count],
			(_, Some(argument)) => vec![(FieldType::from(argument), true)],
			(_, None) => vec![count],
		}
	}

	pub fn result(&self) -> (FieldType, bool) {
		match (self.kind, self.argument) {
			(AggregateKind::Count | AggregateKind::CountRows, _) | (_, None) => (FieldType::int8(), false),
			(_, Some(argument)) => (FieldType::from(argument), true),
		}
	}

	/// Per input row. Argument locators index the function's arguments.
	pub fn pre(&self) -> Vec<AggregatorInfo> {
		match self.kind {
			AggregateKind::Sum => vec![AggregatorInfo::new(Aggregator::Sum, vec![0], EmptyValue::Null)],
			AggregateKind::Count => vec![AggregatorInfo::new(Aggregator::Count, vec![0], EmptyValue::Zero)],
			AggregateKind::CountRows => vec![AggregatorInfo::new(Aggregator::CountRows, vec![], EmptyValue::Zero)],
			AggregateKind::Avg => vec![
				AggregatorInfo::new(Aggregator::Sum, vec![0], EmptyValue::Null),
				AggregatorInfo::new(Aggregator::Count, vec![0], EmptyValue::Zero),
			],
			AggregateKind::Max => vec![AggregatorInfo::new(Aggregator::Max, vec![0], EmptyValue::Null)],
			AggregateKind::Min => vec![AggregatorInfo::new(Aggregator::Min, vec![0], EmptyValue::Null)],
		}
	}

	/// Merges two intermediates. Locators index the intermediate fields.
	pub fn mid(&self) -> Vec<AggregatorInfo> {
		match self.kind {
			AggregateKind::Sum => vec![AggregatorInfo::new(Aggregator::Sum, vec![0], EmptyValue::Null)],
			AggregateKind::Count | AggregateKind::CountRows => {
				vec![AggregatorInfo::new(Aggregator::CountMerge, vec![0], EmptyValue::Zero)]
			}
			AggregateKind::Avg => vec![
				AggregatorInfo::new(Aggregator::Sum, vec![0], EmptyValue::Null),
				AggregatorInfo::new(Aggregator::CountMerge, vec![1], EmptyValue::Zero),
			],
			AggregateKind::Max => vec![AggregatorInfo::new(Aggregator::Max, vec![0], EmptyValue::Null)],
			AggregateKind::Min => vec![AggregatorInfo::new(Aggregator::Min, vec![0], EmptyValue::Null)],
		}
	}

	/// Projects the merged intermediate to the single result field.
	pub fn post(&self) -> Vec<AggregatorInfo> {
		match self.kind {
			AggregateKind::Avg => vec![AggregatorInfo::new(Aggregator::Avg, vec![0, 1], EmptyValue::Null)],
			AggregateKind::Count | AggregateKind::CountRows => {
				vec![AggregatorInfo::new(Aggregator::Identity, vec![0], EmptyValue::Zero)]
			}
			_ => vec![AggregatorInfo::new(Aggregator::Identity, vec![0], EmptyValue::Null)],
		}
	}
}

/// The repository of built-in aggregates, addressed by stable function id.
#[derive(Debug, Clone)]
pub struct AggregateCatalog {
	functions: Vec<AggregateFunction>,
}

impl Default for AggregateCatalog {
	fn default() -> Self {
		Self::new()
	}
}

impl AggregateCatalog {
	pub fn new() -> Self {
		let signatures = SUM_ARGUMENTS
			.iter()
			.map(|k| (AggregateKind::Sum, Some(*k)))
			.chain(COUNT_ARGUMENTS.iter().map(|k| (AggregateKind::Count, Some(*k))))
			.chain([(AggregateKind::CountRows, None)])
			.chain(SUM_ARGUMENTS.iter().map(|k| (AggregateKind::Avg, Some(*k))))
			.chain(ORDERED_ARGUMENTS.iter().map(|k| (AggregateKind::Max, Some(*k))))
			.chain(ORDERED_ARGUMENTS.iter().map(|k| (AggregateKind::Min, Some(*k))));
		let functions = signatures
			.enumerate()
			.map(|(i, (kind, argument))| AggregateFunction {
				id: FUNCTION_ID_BASE + i as u32,
				kind,
				argument,
			})
			.collect();
		Self {
			functions,
		}
	}

	pub fn len(&self) -> usize {
		self.functions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.functions.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &AggregateFunction> {
		self.functions.iter()
	}

	pub fn get(&self, id: u32) -> Result<&AggregateFunction, AggregateError> {
		id.checked_sub(FUNCTION_ID_BASE)
			.and_then(|offset| self.functions.get(offset as usize))
			.ok_or(AggregateError::UnknownFunction {
				id,
			})
	}

	pub fn find(&self, kind: AggregateKind, argument: Option<Kind>) -> Option<&AggregateFunction> {
		self.functions.iter().find(|f| f.kind == kind && f.argument == argument)
	}

	/// Looks up a signature by name and argument kinds.
	pub fn resolve(&self, name: &str, arguments: &[Kind]) -> tessera_type::Result<&AggregateFunction> {
		let Some(kind) = AggregateKind::from_name(name) else {
			return_error!(ErrorCode::NotFound, "unknown aggregate function {}", name);
		};
		let expected = if kind == AggregateKind::CountRows {
			0
		} else {
			1
		};
		if arguments.len() != expected {
			return Err(AggregateError::ArgumentCount {
				name: kind.name(),
				expected,
				actual: arguments.len(),
			}
			.into());
		}
		let argument = arguments.first().copied();
		match self.find(kind, argument) {
			Some(function) => Ok(function),
			None => Err(AggregateError::UnsupportedArgument {
				name: kind.name(),
				kind: argument.unwrap_or(Kind::Int8),
			}
			.into()),
		}
	}
}
