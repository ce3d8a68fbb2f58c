// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use crate::error::{CodecError, CodecResult};

pub const EMBED_POSITIVE_INT: u8 = 0x00;
pub const EMBED_CHARACTER: u8 = 0x40;
pub const EMBED_ROW: u8 = 0x80;
pub const EMBED_ARRAY: u8 = 0xA0;
pub const EMBED_NEGATIVE_INT: u8 = 0xC0;
pub const EMBED_OCTET: u8 = 0xD0;
pub const EMBED_BIT: u8 = 0xE0;

pub const UNKNOWN: u8 = 0xE8;
pub const INT: u8 = 0xE9;
pub const FLOAT4: u8 = 0xEA;
pub const FLOAT8: u8 = 0xEB;
pub const DECIMAL_COMPACT: u8 = 0xEC;
pub const DECIMAL: u8 = 0xED;
pub const TIME_OF_DAY_WITH_OFFSET: u8 = 0xEE;
pub const TIME_POINT_WITH_OFFSET: u8 = 0xEF;
pub const CHARACTER: u8 = 0xF0;
pub const OCTET: u8 = 0xF1;
pub const BIT: u8 = 0xF2;
pub const DATE: u8 = 0xF3;
pub const TIME_OF_DAY: u8 = 0xF4;
pub const TIME_POINT: u8 = 0xF5;
pub const DATETIME_INTERVAL: u8 = 0xF6;
pub const ROW: u8 = 0xF8;
pub const ARRAY: u8 = 0xF9;
pub const CLOB: u8 = 0xFA;
pub const BLOB: u8 = 0xFB;
pub const END_OF_CONTENTS: u8 = 0xFE;

pub const EMBED_POSITIVE_INT_MAX: i64 = 63;
pub const EMBED_NEGATIVE_INT_MIN: i64 = -16;
pub const EMBED_CHARACTER_MAX: usize = 64;
pub const EMBED_OCTET_MAX: usize = 16;
pub const EMBED_BIT_MAX: usize = 8;
pub const EMBED_ROW_MAX: usize = 32;
pub const EMBED_ARRAY_MAX: usize = 32;

/// Classification of the first byte of a value mode entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
	Null,
	Int,
	Float4,
	Float8,
	Decimal,
	Character,
	Octet,
	Bit,
	Date,
	TimeOfDay,
	TimeOfDayWithOffset,
	TimePoint,
	TimePointWithOffset,
	DatetimeInterval,
	Row,
	Array,
	Clob,
	Blob,
	EndOfContents,
}

impl EntryType {
	/// Classifies a tag byte. Reserved tags are rejected.
	pub fn of(tag: u8) -> CodecResult<Self> {
		Ok(match tag {
			0x00..=0x3F => EntryType::Int,
			0x40..=0x7F => EntryType::Character,
			0x80..=0x9F => EntryType::Row,
			0xA0..=0xBF => EntryType::Array,
			0xC0..=0xCF => EntryType::Int,
			0xD0..=0xDF => EntryType::Octet,
			0xE0..=0xE7 => EntryType::Bit,
			UNKNOWN => EntryType::Null,
			INT => EntryType::Int,
			FLOAT4 => EntryType::Float4,
			FLOAT8 => EntryType::Float8,
			DECIMAL_COMPACT | DECIMAL => EntryType::Decimal,
			TIME_OF_DAY_WITH_OFFSET => EntryType::TimeOfDayWithOffset,
			TIME_POINT_WITH_OFFSET => EntryType::TimePointWithOffset,
			CHARACTER => EntryType::Character,
			OCTET => EntryType::Octet,
			BIT => EntryType::Bit,
			DATE => EntryType::Date,
			TIME_OF_DAY => EntryType::TimeOfDay,
			TIME_POINT => EntryType::TimePoint,
			DATETIME_INTERVAL => EntryType::DatetimeInterval,
			ROW => EntryType::Row,
			ARRAY => EntryType::Array,
			CLOB => EntryType::Clob,
			BLOB => EntryType::Blob,
			END_OF_CONTENTS => EntryType::EndOfContents,
			_ => {
				return Err(CodecError::UnrecognizedEntry {
					tag,
				});
			}
		})
	}
}

impl Display for EntryType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			EntryType::Null => "null",
			EntryType::Int => "int",
			EntryType::Float4 => "float4",
			EntryType::Float8 => "float8",
			EntryType::Decimal => "decimal",
			EntryType::Character => "character",
			EntryType::Octet => "octet",
			EntryType::Bit => "bit",
			EntryType::Date => "date",
			EntryType::TimeOfDay => "time_of_day",
			EntryType::TimeOfDayWithOffset => "time_of_day_with_offset",
			EntryType::TimePoint => "time_point",
			EntryType::TimePointWithOffset => "time_point_with_offset",
			EntryType::DatetimeInterval => "datetime_interval",
			EntryType::Row => "row",
			EntryType::Array => "array",
			EntryType::Clob => "clob",
			EntryType::Blob => "blob",
			EntryType::EndOfContents => "end_of_contents",
		};
		f.write_str(name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_reserved_tags_rejected() {
		for tag in [0xF7u8, 0xFC, 0xFD, 0xFF] {
			assert_eq!(
				EntryType::of(tag),
				Err(CodecError::UnrecognizedEntry {
					tag
				})
			);
		}
	}

	#[test]
	fn test_embedded_ranges() {
		assert_eq!(EntryType::of(0x3F).unwrap(), EntryType::Int);
		assert_eq!(EntryType::of(0xCF).unwrap(), EntryType::Int);
		assert_eq!(EntryType::of(0x7F).unwrap(), EntryType::Character);
		assert_eq!(EntryType::of(0x9F).unwrap(), EntryType::Row);
		assert_eq!(EntryType::of(0xE7).unwrap(), EntryType::Bit);
		assert_eq!(EntryType::of(0xE8).unwrap(), EntryType::Null);
	}
}
