// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Every scalar kind the engine can store.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Kind {
	/// A boolean: true or false.
	Boolean,
	/// A 1-byte signed integer
	Int1,
	/// A 2-byte signed integer
	Int2,
	/// A 4-byte signed integer
	Int4,
	/// An 8-byte signed integer
	Int8,
	/// A 4-byte floating point
	Float4,
	/// An 8-byte floating point
	Float8,
	/// Sign, 128-bit coefficient and exponent
	Decimal,
	/// Text, fixed or varying
	Character,
	/// Binary string, fixed or varying
	Octet,
	/// Days since epoch
	Date,
	/// Nanoseconds since midnight
	TimeOfDay,
	/// Seconds and nanoseconds since epoch
	TimePoint,
	/// Binary large object reference
	Blob,
	/// Character large object reference
	Clob,
}

/// Size in bytes of a varlen fat pointer inside a record buffer.
pub const VARLEN_SLOT_SIZE: usize = 16;

impl Kind {
	/// Size of the in-record representation in bytes.
	pub fn size(&self) -> usize {
		match self {
			Kind::Boolean => 1,
			Kind::Int1 => 1,
			Kind::Int2 => 2,
			Kind::Int4 => 4,
			Kind::Int8 => 8,
			Kind::Float4 => 4,
			Kind::Float8 => 8,
			Kind::Decimal => 24, // coefficient: u128 + exponent: i32 + sign: i8
			Kind::Character => VARLEN_SLOT_SIZE,
			Kind::Octet => VARLEN_SLOT_SIZE,
			Kind::Date => 8,
			Kind::TimeOfDay => 16,   // nanos: u64 + offset: i32
			Kind::TimePoint => 16,   // seconds: i64 + nanos: u32 + offset: i32
			Kind::Blob => 16,        // provider: u64 + object id: u64
			Kind::Clob => 16,
		}
	}

	pub fn alignment(&self) -> usize {
		match self {
			Kind::Boolean | Kind::Int1 => 1,
			Kind::Int2 => 2,
			Kind::Int4 | Kind::Float4 => 4,
			_ => 8,
		}
	}

	pub fn is_varlen(&self) -> bool {
		matches!(self, Kind::Character | Kind::Octet)
	}

	pub fn is_integer(&self) -> bool {
		matches!(self, Kind::Int1 | Kind::Int2 | Kind::Int4 | Kind::Int8)
	}

	pub fn is_floating_point(&self) -> bool {
		matches!(self, Kind::Float4 | Kind::Float8)
	}

	pub fn is_numeric(&self) -> bool {
		self.is_integer() || self.is_floating_point() || matches!(self, Kind::Decimal)
	}

	pub fn is_lob(&self) -> bool {
		matches!(self, Kind::Blob | Kind::Clob)
	}

	pub fn name(&self) -> &'static str {
		match self {
			Kind::Boolean => "BOOLEAN",
			Kind::Int1 => "TINYINT",
			Kind::Int2 => "SMALLINT",
			Kind::Int4 => "INT",
			Kind::Int8 => "BIGINT",
			Kind::Float4 => "REAL",
			Kind::Float8 => "DOUBLE",
			Kind::Decimal => "DECIMAL",
			Kind::Character => "CHAR",
			Kind::Octet => "BINARY",
			Kind::Date => "DATE",
			Kind::TimeOfDay => "TIME",
			Kind::TimePoint => "TIMESTAMP",
			Kind::Blob => "BLOB",
			Kind::Clob => "CLOB",
		}
	}
}

impl Display for Kind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}

/// Declared length of a character or octet column. `Flexible` is the `*`
/// length, i.e. bounded only by the engine.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Length {
	Bounded(u32),
	Flexible,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarlenOption {
	pub varying: bool,
	pub length: Option<Length>,
}

impl VarlenOption {
	/// The padded width of a fixed-length column. A fixed column without an
	/// explicit length has length 1.
	pub fn fixed_length(&self) -> Option<usize> {
		if self.varying {
			return None;
		}
		match self.length {
			Some(Length::Bounded(length)) => Some(length as usize),
			Some(Length::Flexible) => None,
			None => Some(1),
		}
	}

	pub fn max_length(&self) -> Option<usize> {
		match self.length {
			Some(Length::Bounded(length)) => Some(length as usize),
			Some(Length::Flexible) => None,
			None if !self.varying => Some(1),
			None => None,
		}
	}
}

/// Precision and scale of a decimal column. `None` stands for an arbitrary
/// precision or scale.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecimalOption {
	pub precision: Option<u8>,
	pub scale: Option<u8>,
}

impl DecimalOption {
	pub const MAX_PRECISION: u8 = 38;

	pub fn is_arbitrary(&self) -> bool {
		self.precision.is_none() || self.scale.is_none()
	}
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldOption {
	None,
	Decimal(DecimalOption),
	Varlen(VarlenOption),
	Temporal {
		with_time_zone: bool,
	},
}

/// A kind together with its kind-specific options.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldType {
	kind: Kind,
	option: FieldOption,
}

impl FieldType {
	pub fn new(kind: Kind) -> Self {
		let option = match kind {
			Kind::Decimal => FieldOption::Decimal(DecimalOption {
				precision: None,
				scale: None,
			}),
			Kind::Character | Kind::Octet => FieldOption::Varlen(VarlenOption {
				varying: true,
				length: None,
			}),
			Kind::TimeOfDay | Kind::TimePoint => FieldOption::Temporal {
				with_time_zone: false,
			},
			_ => FieldOption::None,
		};
		Self {
			kind,
			option,
		}
	}

	pub fn boolean() -> Self {
		Self::new(Kind::Boolean)
	}

	pub fn int1() -> Self {
		Self::new(Kind::Int1)
	}

	pub fn int2() -> Self {
		Self::new(Kind::Int2)
	}

	pub fn int4() -> Self {
		Self::new(Kind::Int4)
	}

	pub fn int8() -> Self {
		Self::new(Kind::Int8)
	}

	pub fn float4() -> Self {
		Self::new(Kind::Float4)
	}

	pub fn float8() -> Self {
		Self::new(Kind::Float8)
	}

	pub fn date() -> Self {
		Self::new(Kind::Date)
	}

	pub fn blob() -> Self {
		Self::new(Kind::Blob)
	}

	pub fn clob() -> Self {
		Self::new(Kind::Clob)
	}

	pub fn decimal(precision: Option<u8>, scale: Option<u8>) -> Self {
		Self {
			kind: Kind::Decimal,
			option: FieldOption::Decimal(DecimalOption {
				precision,
				scale,
			}),
		}
	}

	pub fn character(varying: bool, length: Option<Length>) -> Self {
		Self {
			kind: Kind::Character,
			option: FieldOption::Varlen(VarlenOption {
				varying,
				length,
			}),
		}
	}

	pub fn varchar(length: u32) -> Self {
		Self::character(true, Some(Length::Bounded(length)))
	}

	pub fn char(length: u32) -> Self {
		Self::character(false, Some(Length::Bounded(length)))
	}

	pub fn octet(varying: bool, length: Option<Length>) -> Self {
		Self {
			kind: Kind::Octet,
			option: FieldOption::Varlen(VarlenOption {
				varying,
				length,
			}),
		}
	}

	pub fn time_of_day(with_time_zone: bool) -> Self {
		Self {
			kind: Kind::TimeOfDay,
			option: FieldOption::Temporal {
				with_time_zone,
			},
		}
	}

	pub fn time_point(with_time_zone: bool) -> Self {
		Self {
			kind: Kind::TimePoint,
			option: FieldOption::Temporal {
				with_time_zone,
			},
		}
	}

	#[inline]
	pub fn kind(&self) -> Kind {
		self.kind
	}

	pub fn option(&self) -> FieldOption {
		self.option
	}

	pub fn decimal_option(&self) -> Option<DecimalOption> {
		match self.option {
			FieldOption::Decimal(option) => Some(option),
			_ => None,
		}
	}

	pub fn varlen_option(&self) -> Option<VarlenOption> {
		match self.option {
			FieldOption::Varlen(option) => Some(option),
			_ => None,
		}
	}

	pub fn with_time_zone(&self) -> bool {
		matches!(
			self.option,
			FieldOption::Temporal {
				with_time_zone: true
			}
		)
	}
}

impl From<Kind> for FieldType {
	fn from(kind: Kind) -> Self {
		Self::new(kind)
	}
}

impl Display for FieldType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match (self.kind, self.option) {
			(Kind::Decimal, FieldOption::Decimal(option)) => {
				let precision = option.precision.map(|p| p.to_string()).unwrap_or_else(|| "*".to_string());
				let scale = option.scale.map(|s| s.to_string()).unwrap_or_else(|| "*".to_string());
				write!(f, "DECIMAL({}, {})", precision, scale)
			}
			(kind @ (Kind::Character | Kind::Octet), FieldOption::Varlen(option)) => {
				let name = match (kind, option.varying) {
					(Kind::Character, true) => "VARCHAR",
					(Kind::Character, false) => "CHAR",
					(_, true) => "VARBINARY",
					(_, false) => "BINARY",
				};
				match option.length {
					Some(Length::Bounded(length)) => write!(f, "{}({})", name, length),
					Some(Length::Flexible) => write!(f, "{}(*)", name),
					None => f.write_str(name),
				}
			}
			(kind, FieldOption::Temporal {
				with_time_zone: true,
			}) => write!(f, "{} WITH TIME ZONE", kind),
			(kind, _) => write!(f, "{}", kind),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_fixed_length() {
		assert_eq!(FieldType::char(4).varlen_option().unwrap().fixed_length(), Some(4));
		assert_eq!(FieldType::varchar(4).varlen_option().unwrap().fixed_length(), None);
		assert_eq!(FieldType::character(false, None).varlen_option().unwrap().fixed_length(), Some(1));
		assert_eq!(
			FieldType::character(true, Some(Length::Flexible)).varlen_option().unwrap().max_length(),
			None
		);
	}

	#[test]
	fn test_display_reports_arbitrary_options() {
		assert_eq!(FieldType::decimal(Some(6), Some(3)).to_string(), "DECIMAL(6, 3)");
		assert_eq!(FieldType::decimal(None, None).to_string(), "DECIMAL(*, *)");
		assert_eq!(FieldType::varchar(10).to_string(), "VARCHAR(10)");
		assert_eq!(FieldType::character(true, Some(Length::Flexible)).to_string(), "VARCHAR(*)");
		assert_eq!(FieldType::time_point(true).to_string(), "TIMESTAMP WITH TIME ZONE");
	}

	#[test]
	fn test_sizes_fit_alignment() {
		for kind in [
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
			Kind::Blob,
			Kind::Clob,
		] {
			assert_eq!(kind.size() % kind.alignment(), 0, "{}", kind);
		}
	}
}
