// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Value mode ("storage") encoding: compact, tagged, not order preserving.
//!
//! Every entry starts with a tag byte (see [`super::entry`]). Readers take a
//! [`ReadableStream`] by `&mut` and only move it forward when the whole entry
//! was read successfully.

use tessera_type::{Date, FieldType, Kind, LobReference, TimeOfDay, TimePoint, Triple, TypeError, ZoneOffset};

use super::{
	check_length,
	entry::{self, EntryType},
	key, padded_length,
	stream::{ReadableStream, WritableStream},
	varint,
};
use crate::{
	datum::Datum,
	error::{CodecError, CodecResult},
};

/// Widest two's complement coefficient of a full decimal entry.
pub const DECIMAL_MAX_BYTES: usize = 17;

pub fn write_null(stream: &mut WritableStream<'_>) -> CodecResult<()> {
	stream.write_u8(entry::UNKNOWN)
}

pub fn write_end_of_contents(stream: &mut WritableStream<'_>) -> CodecResult<()> {
	stream.write_u8(entry::END_OF_CONTENTS)
}

pub fn write_int(stream: &mut WritableStream<'_>, value: i64) -> CodecResult<()> {
	if (0..=entry::EMBED_POSITIVE_INT_MAX).contains(&value) {
		return stream.write_u8(entry::EMBED_POSITIVE_INT + value as u8);
	}
	if (entry::EMBED_NEGATIVE_INT_MIN..0).contains(&value) {
		return stream.write_u8(entry::EMBED_NEGATIVE_INT + (value - entry::EMBED_NEGATIVE_INT_MIN) as u8);
	}
	stream.write_u8(entry::INT)?;
	varint::write_i64(stream, value)
}

pub fn write_float4(stream: &mut WritableStream<'_>, value: f32) -> CodecResult<()> {
	let bits = if value.is_nan() {
		key::CANONICAL_NAN_F32
	} else {
		value.to_bits()
	};
	stream.write_u8(entry::FLOAT4)?;
	stream.write(&bits.to_be_bytes())
}

pub fn write_float8(stream: &mut WritableStream<'_>, value: f64) -> CodecResult<()> {
	let bits = if value.is_nan() {
		key::CANONICAL_NAN_F64
	} else {
		value.to_bits()
	};
	stream.write_u8(entry::FLOAT8)?;
	stream.write(&bits.to_be_bytes())
}

pub fn write_decimal(stream: &mut WritableStream<'_>, value: Triple) -> CodecResult<()> {
	if let Some(coefficient) = value.signed_coefficient().and_then(|c| i64::try_from(c).ok()) {
		stream.write_u8(entry::DECIMAL_COMPACT)?;
		varint::write_i64(stream, value.exponent() as i64)?;
		return varint::write_i64(stream, coefficient);
	}
	let bytes = decimal_to_twos_complement(&value);
	stream.write_u8(entry::DECIMAL)?;
	varint::write_i64(stream, value.exponent() as i64)?;
	varint::write_u64(stream, bytes.len() as u64)?;
	stream.write(&bytes)
}

pub fn write_character(stream: &mut WritableStream<'_>, bytes: &[u8]) -> CodecResult<()> {
	write_character_padded(stream, bytes, bytes.len())
}

/// Writes `bytes` right padded with spaces to `length`.
pub fn write_character_padded(stream: &mut WritableStream<'_>, bytes: &[u8], length: usize) -> CodecResult<()> {
	if (1..=entry::EMBED_CHARACTER_MAX).contains(&length) {
		stream.write_u8(entry::EMBED_CHARACTER + (length - 1) as u8)?;
	} else {
		stream.write_u8(entry::CHARACTER)?;
		varint::write_u64(stream, length as u64)?;
	}
	stream.write(bytes)?;
	stream.write_repeated(b' ', length - bytes.len())
}

pub fn write_octet(stream: &mut WritableStream<'_>, bytes: &[u8]) -> CodecResult<()> {
	write_octet_padded(stream, bytes, bytes.len())
}

/// Writes `bytes` right padded with zeros to `length`.
pub fn write_octet_padded(stream: &mut WritableStream<'_>, bytes: &[u8], length: usize) -> CodecResult<()> {
	if (1..=entry::EMBED_OCTET_MAX).contains(&length) {
		stream.write_u8(entry::EMBED_OCTET + (length - 1) as u8)?;
	} else {
		stream.write_u8(entry::OCTET)?;
		varint::write_u64(stream, length as u64)?;
	}
	stream.write(bytes)?;
	stream.write_repeated(0, length - bytes.len())
}

/// Writes a bit string of `bit_count` bits packed into `bytes`.
pub fn write_bit(stream: &mut WritableStream<'_>, bytes: &[u8], bit_count: usize) -> CodecResult<()> {
	let needed = bit_count.div_ceil(8);
	if bytes.len() < needed {
		return Err(CodecError::BufferUnderflow {
			required: needed,
			available: bytes.len(),
		});
	}
	if (1..=entry::EMBED_BIT_MAX).contains(&bit_count) {
		stream.write_u8(entry::EMBED_BIT + (bit_count - 1) as u8)?;
	} else {
		stream.write_u8(entry::BIT)?;
		varint::write_u64(stream, bit_count as u64)?;
	}
	stream.write(&bytes[..needed])
}

pub fn write_date(stream: &mut WritableStream<'_>, value: Date) -> CodecResult<()> {
	stream.write_u8(entry::DATE)?;
	varint::write_i64(stream, value.days())
}

pub fn write_time_of_day(
	stream: &mut WritableStream<'_>,
	value: TimeOfDay,
	offset: Option<ZoneOffset>,
) -> CodecResult<()> {
	match offset {
		None => {
			stream.write_u8(entry::TIME_OF_DAY)?;
			varint::write_u64(stream, value.nanos())
		}
		Some(offset) => {
			stream.write_u8(entry::TIME_OF_DAY_WITH_OFFSET)?;
			varint::write_u64(stream, value.nanos())?;
			varint::write_i64(stream, offset.seconds() as i64)
		}
	}
}

pub fn write_time_point(
	stream: &mut WritableStream<'_>,
	value: TimePoint,
	offset: Option<ZoneOffset>,
) -> CodecResult<()> {
	stream.write_u8(match offset {
		None => entry::TIME_POINT,
		Some(_) => entry::TIME_POINT_WITH_OFFSET,
	})?;
	varint::write_i64(stream, value.seconds())?;
	varint::write_u64(stream, value.nanos() as u64)?;
	if let Some(offset) = offset {
		varint::write_i64(stream, offset.seconds() as i64)?;
	}
	Ok(())
}

pub fn write_row_begin(stream: &mut WritableStream<'_>, size: usize) -> CodecResult<()> {
	write_container_begin(stream, size, entry::EMBED_ROW, entry::EMBED_ROW_MAX, entry::ROW)
}

pub fn write_array_begin(stream: &mut WritableStream<'_>, size: usize) -> CodecResult<()> {
	write_container_begin(stream, size, entry::EMBED_ARRAY, entry::EMBED_ARRAY_MAX, entry::ARRAY)
}

fn write_container_begin(
	stream: &mut WritableStream<'_>,
	size: usize,
	embed: u8,
	embed_max: usize,
	tag: u8,
) -> CodecResult<()> {
	if (1..=embed_max).contains(&size) {
		return stream.write_u8(embed + (size - 1) as u8);
	}
	stream.write_u8(tag)?;
	varint::write_u64(stream, size as u64)
}

pub fn write_blob(stream: &mut WritableStream<'_>, reference: LobReference) -> CodecResult<()> {
	write_lob(stream, entry::BLOB, reference)
}

pub fn write_clob(stream: &mut WritableStream<'_>, reference: LobReference) -> CodecResult<()> {
	write_lob(stream, entry::CLOB, reference)
}

fn write_lob(stream: &mut WritableStream<'_>, tag: u8, reference: LobReference) -> CodecResult<()> {
	stream.write_u8(tag)?;
	stream.write(&reference.provider.to_be_bytes())?;
	stream.write(&reference.object_id.to_be_bytes())
}

/// The entry type at the current position without consuming it.
pub fn peek_type(stream: &ReadableStream<'_>) -> CodecResult<EntryType> {
	EntryType::of(stream.peek_u8()?)
}

fn expect(cursor: &mut ReadableStream<'_>, expected: EntryType) -> CodecResult<u8> {
	let tag = cursor.read_u8()?;
	let found = EntryType::of(tag)?;
	if found == EntryType::DatetimeInterval {
		return Err(CodecError::unsupported(found));
	}
	if found != expected {
		return Err(CodecError::unsupported(format!("{} where {} was expected", found, expected)));
	}
	Ok(tag)
}

pub fn read_null(stream: &mut ReadableStream<'_>) -> CodecResult<()> {
	let mut cursor = *stream;
	expect(&mut cursor, EntryType::Null)?;
	*stream = cursor;
	Ok(())
}

pub fn read_end_of_contents(stream: &mut ReadableStream<'_>) -> CodecResult<()> {
	let mut cursor = *stream;
	expect(&mut cursor, EntryType::EndOfContents)?;
	*stream = cursor;
	Ok(())
}

pub fn read_int(stream: &mut ReadableStream<'_>) -> CodecResult<i64> {
	let mut cursor = *stream;
	let tag = expect(&mut cursor, EntryType::Int)?;
	let value = match tag {
		0x00..=0x3F => (tag - entry::EMBED_POSITIVE_INT) as i64,
		0xC0..=0xCF => (tag - entry::EMBED_NEGATIVE_INT) as i64 + entry::EMBED_NEGATIVE_INT_MIN,
		_ => varint::read_i64(&mut cursor)?,
	};
	*stream = cursor;
	Ok(value)
}

/// Reads an int entry that must fit into 32 bits.
pub fn read_int4(stream: &mut ReadableStream<'_>) -> CodecResult<i32> {
	let mut cursor = *stream;
	let value = read_int(&mut cursor)?;
	let value = i32::try_from(value).map_err(|_| CodecError::IntegerOverflow {
		value,
	})?;
	*stream = cursor;
	Ok(value)
}

pub fn read_float4(stream: &mut ReadableStream<'_>) -> CodecResult<f32> {
	let mut cursor = *stream;
	expect(&mut cursor, EntryType::Float4)?;
	let value = f32::from_bits(u32::from_be_bytes(cursor.read_array()?));
	*stream = cursor;
	Ok(value)
}

pub fn read_float8(stream: &mut ReadableStream<'_>) -> CodecResult<f64> {
	let mut cursor = *stream;
	expect(&mut cursor, EntryType::Float8)?;
	let value = f64::from_bits(u64::from_be_bytes(cursor.read_array()?));
	*stream = cursor;
	Ok(value)
}

pub fn read_decimal(stream: &mut ReadableStream<'_>) -> CodecResult<Triple> {
	let mut cursor = *stream;
	let tag = expect(&mut cursor, EntryType::Decimal)?;
	let exponent = varint::read_i32(&mut cursor)?;
	let value = if tag == entry::DECIMAL_COMPACT {
		let coefficient = varint::read_i64(&mut cursor)?;
		Triple::from_i128(coefficient as i128, exponent)
	} else {
		let size = varint::read_size(&mut cursor)?;
		if size == 0 || size > DECIMAL_MAX_BYTES {
			return Err(CodecError::DecimalOutOfRange {
				bytes: size,
			});
		}
		let bytes = cursor.read(size)?;
		decimal_from_twos_complement(bytes, exponent)?
	};
	*stream = cursor;
	Ok(value)
}

pub fn read_character<'b>(stream: &mut ReadableStream<'b>) -> CodecResult<&'b [u8]> {
	let mut cursor = *stream;
	let tag = expect(&mut cursor, EntryType::Character)?;
	let size = if tag == entry::CHARACTER {
		varint::read_size(&mut cursor)?
	} else {
		(tag - entry::EMBED_CHARACTER) as usize + 1
	};
	let bytes = cursor.read(size)?;
	*stream = cursor;
	Ok(bytes)
}

pub fn read_octet<'b>(stream: &mut ReadableStream<'b>) -> CodecResult<&'b [u8]> {
	let mut cursor = *stream;
	let tag = expect(&mut cursor, EntryType::Octet)?;
	let size = if tag == entry::OCTET {
		varint::read_size(&mut cursor)?
	} else {
		(tag - entry::EMBED_OCTET) as usize + 1
	};
	let bytes = cursor.read(size)?;
	*stream = cursor;
	Ok(bytes)
}

/// Reads a bit string, returning the packed bytes and the bit count.
pub fn read_bit<'b>(stream: &mut ReadableStream<'b>) -> CodecResult<(&'b [u8], usize)> {
	let mut cursor = *stream;
	let tag = expect(&mut cursor, EntryType::Bit)?;
	let bit_count = if tag == entry::BIT {
		varint::read_size(&mut cursor)?
	} else {
		(tag - entry::EMBED_BIT) as usize + 1
	};
	let bytes = cursor.read(bit_count.div_ceil(8))?;
	*stream = cursor;
	Ok((bytes, bit_count))
}

pub fn read_date(stream: &mut ReadableStream<'_>) -> CodecResult<Date> {
	let mut cursor = *stream;
	expect(&mut cursor, EntryType::Date)?;
	let days = varint::read_i64(&mut cursor)?;
	*stream = cursor;
	Ok(Date::from_days(days))
}

pub fn read_time_of_day(stream: &mut ReadableStream<'_>) -> CodecResult<(TimeOfDay, Option<ZoneOffset>)> {
	let mut cursor = *stream;
	let with_offset = match peek_type(&cursor)? {
		EntryType::TimeOfDayWithOffset => {
			expect(&mut cursor, EntryType::TimeOfDayWithOffset)?;
			true
		}
		_ => {
			expect(&mut cursor, EntryType::TimeOfDay)?;
			false
		}
	};
	let nanos = varint::read_u64(&mut cursor)?;
	let value = TimeOfDay::from_nanos(nanos).ok_or_else(|| CodecError::unsupported("time of day out of range"))?;
	let offset = if with_offset {
		Some(ZoneOffset(varint::read_i32(&mut cursor)?))
	} else {
		None
	};
	*stream = cursor;
	Ok((value, offset))
}

pub fn read_time_point(stream: &mut ReadableStream<'_>) -> CodecResult<(TimePoint, Option<ZoneOffset>)> {
	let mut cursor = *stream;
	let with_offset = match peek_type(&cursor)? {
		EntryType::TimePointWithOffset => {
			expect(&mut cursor, EntryType::TimePointWithOffset)?;
			true
		}
		_ => {
			expect(&mut cursor, EntryType::TimePoint)?;
			false
		}
	};
	let seconds = varint::read_i64(&mut cursor)?;
	let nanos = varint::read_u64(&mut cursor)?;
	let value = u32::try_from(nanos)
		.ok()
		.and_then(|nanos| TimePoint::new(seconds, nanos))
		.ok_or_else(|| CodecError::unsupported("time point nanoseconds out of range"))?;
	let offset = if with_offset {
		Some(ZoneOffset(varint::read_i32(&mut cursor)?))
	} else {
		None
	};
	*stream = cursor;
	Ok((value, offset))
}

pub fn read_row_begin(stream: &mut ReadableStream<'_>) -> CodecResult<usize> {
	read_container_begin(stream, EntryType::Row, entry::ROW, entry::EMBED_ROW)
}

pub fn read_array_begin(stream: &mut ReadableStream<'_>) -> CodecResult<usize> {
	read_container_begin(stream, EntryType::Array, entry::ARRAY, entry::EMBED_ARRAY)
}

fn read_container_begin(
	stream: &mut ReadableStream<'_>,
	expected: EntryType,
	tag_long: u8,
	embed: u8,
) -> CodecResult<usize> {
	let mut cursor = *stream;
	let tag = expect(&mut cursor, expected)?;
	let size = if tag == tag_long {
		varint::read_size(&mut cursor)?
	} else {
		(tag - embed) as usize + 1
	};
	*stream = cursor;
	Ok(size)
}

pub fn read_blob(stream: &mut ReadableStream<'_>) -> CodecResult<LobReference> {
	read_lob(stream, EntryType::Blob)
}

pub fn read_clob(stream: &mut ReadableStream<'_>) -> CodecResult<LobReference> {
	read_lob(stream, EntryType::Clob)
}

fn read_lob(stream: &mut ReadableStream<'_>, expected: EntryType) -> CodecResult<LobReference> {
	let mut cursor = *stream;
	expect(&mut cursor, expected)?;
	let provider = u64::from_be_bytes(cursor.read_array()?);
	let object_id = u64::from_be_bytes(cursor.read_array()?);
	*stream = cursor;
	Ok(LobReference::new(provider, object_id))
}

/// Skips one entry including nested row and array elements.
pub fn skip(stream: &mut ReadableStream<'_>) -> CodecResult<()> {
	let mut cursor = *stream;
	match peek_type(&cursor)? {
		EntryType::Null => read_null(&mut cursor)?,
		EntryType::EndOfContents => read_end_of_contents(&mut cursor)?,
		EntryType::Int => {
			read_int(&mut cursor)?;
		}
		EntryType::Float4 => {
			read_float4(&mut cursor)?;
		}
		EntryType::Float8 => {
			read_float8(&mut cursor)?;
		}
		EntryType::Decimal => {
			read_decimal(&mut cursor)?;
		}
		EntryType::Character => {
			read_character(&mut cursor)?;
		}
		EntryType::Octet => {
			read_octet(&mut cursor)?;
		}
		EntryType::Bit => {
			read_bit(&mut cursor)?;
		}
		EntryType::Date => {
			read_date(&mut cursor)?;
		}
		EntryType::TimeOfDay | EntryType::TimeOfDayWithOffset => {
			read_time_of_day(&mut cursor)?;
		}
		EntryType::TimePoint | EntryType::TimePointWithOffset => {
			read_time_point(&mut cursor)?;
		}
		EntryType::Blob => {
			read_blob(&mut cursor)?;
		}
		EntryType::Clob => {
			read_clob(&mut cursor)?;
		}
		EntryType::Row => {
			let size = read_row_begin(&mut cursor)?;
			for _ in 0..size {
				skip(&mut cursor)?;
			}
		}
		EntryType::Array => {
			let size = read_array_begin(&mut cursor)?;
			for _ in 0..size {
				skip(&mut cursor)?;
			}
		}
		found @ EntryType::DatetimeInterval => return Err(CodecError::unsupported(found)),
	}
	*stream = cursor;
	Ok(())
}

fn decimal_to_twos_complement(value: &Triple) -> Vec<u8> {
	let mut bytes = [0u8; DECIMAL_MAX_BYTES];
	bytes[1..].copy_from_slice(&value.coefficient().to_be_bytes());
	if value.is_negative() {
		// negate the 17 byte integer: invert, then add one
		let mut carry = true;
		for byte in bytes.iter_mut().rev() {
			*byte = !*byte;
			if carry {
				let (sum, overflow) = byte.overflowing_add(1);
				*byte = sum;
				carry = overflow;
			}
		}
	}
	let mut start = 0;
	while start < DECIMAL_MAX_BYTES - 1 {
		let redundant = (bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
			|| (bytes[start] == 0xFF && bytes[start + 1] & 0x80 != 0);
		if !redundant {
			break;
		}
		start += 1;
	}
	bytes[start..].to_vec()
}

fn decimal_from_twos_complement(bytes: &[u8], exponent: i32) -> CodecResult<Triple> {
	let negative = bytes[0] & 0x80 != 0;
	let mut extended = [if negative {
		0xFF
	} else {
		0x00
	}; DECIMAL_MAX_BYTES];
	extended[DECIMAL_MAX_BYTES - bytes.len()..].copy_from_slice(bytes);
	if negative {
		let mut carry = true;
		for byte in extended.iter_mut().rev() {
			*byte = !*byte;
			if carry {
				let (sum, overflow) = byte.overflowing_add(1);
				*byte = sum;
				carry = overflow;
			}
		}
	}
	if extended[0] != 0 {
		return Err(CodecError::DecimalOutOfRange {
			bytes: bytes.len(),
		});
	}
	let mut magnitude = [0u8; 16];
	magnitude.copy_from_slice(&extended[1..]);
	let sign = if negative {
		-1
	} else {
		1
	};
	Ok(Triple::new(sign, u128::from_be_bytes(magnitude), exponent))
}

/// Encodes one field in value mode according to its declared type.
pub fn encode_value(stream: &mut WritableStream<'_>, datum: &Datum<'_>, field_type: &FieldType) -> CodecResult<()> {
	if let Some(kind) = datum.kind() {
		if kind != field_type.kind() {
			return Err(CodecError::mismatch(field_type, datum.kind_name()));
		}
	}
	match *datum {
		Datum::Null => write_null(stream),
		Datum::Boolean(v) => write_int(stream, v as i64),
		Datum::Int1(v) => write_int(stream, v as i64),
		Datum::Int2(v) => write_int(stream, v as i64),
		Datum::Int4(v) => write_int(stream, v as i64),
		Datum::Int8(v) => write_int(stream, v),
		Datum::Float4(v) => write_float4(stream, v),
		Datum::Float8(v) => write_float8(stream, v),
		Datum::Decimal(v) => write_decimal(stream, normalize_decimal(v, field_type)?),
		Datum::Character(v) => {
			let option = field_type.varlen_option();
			check_length(v.len(), option)?;
			write_character_padded(stream, v.as_bytes(), padded_length(v.len(), option))
		}
		Datum::Octet(v) => {
			let option = field_type.varlen_option();
			check_length(v.len(), option)?;
			write_octet_padded(stream, v, padded_length(v.len(), option))
		}
		Datum::Date(v) => write_date(stream, v),
		Datum::TimeOfDay(v, offset) => write_time_of_day(stream, v, offset_for(field_type, offset)),
		Datum::TimePoint(v, offset) => write_time_point(stream, v, offset_for(field_type, offset)),
		Datum::Blob(v) => write_blob(stream, v),
		Datum::Clob(v) => write_clob(stream, v),
	}
}

/// Decodes one value mode field of the declared type.
pub fn decode_value<'b>(stream: &mut ReadableStream<'b>, field_type: &FieldType) -> CodecResult<Datum<'b>> {
	if peek_type(stream)? == EntryType::Null {
		read_null(stream)?;
		return Ok(Datum::Null);
	}
	Ok(match field_type.kind() {
		Kind::Boolean => Datum::Boolean(read_int(stream)? != 0),
		Kind::Int1 => Datum::Int1(narrow(stream)?),
		Kind::Int2 => Datum::Int2(narrow(stream)?),
		Kind::Int4 => Datum::Int4(read_int4(stream)?),
		Kind::Int8 => Datum::Int8(read_int(stream)?),
		Kind::Float4 => Datum::Float4(read_float4(stream)?),
		Kind::Float8 => Datum::Float8(read_float8(stream)?),
		Kind::Decimal => Datum::Decimal(read_decimal(stream)?),
		Kind::Character => {
			let mut cursor = *stream;
			let bytes = read_character(&mut cursor)?;
			let text = std::str::from_utf8(bytes).map_err(|_| TypeError::InvalidCharacterData)?;
			*stream = cursor;
			Datum::Character(text)
		}
		Kind::Octet => Datum::Octet(read_octet(stream)?),
		Kind::Date => Datum::Date(read_date(stream)?),
		Kind::TimeOfDay => {
			let (value, offset) = read_time_of_day(stream)?;
			Datum::TimeOfDay(value, offset)
		}
		Kind::TimePoint => {
			let (value, offset) = read_time_point(stream)?;
			Datum::TimePoint(value, offset)
		}
		Kind::Blob => Datum::Blob(read_blob(stream)?),
		Kind::Clob => Datum::Clob(read_clob(stream)?),
	})
}

fn narrow<T: TryFrom<i64>>(stream: &mut ReadableStream<'_>) -> CodecResult<T> {
	let mut cursor = *stream;
	let value = read_int(&mut cursor)?;
	let narrowed = T::try_from(value).map_err(|_| CodecError::IntegerOverflow {
		value,
	})?;
	*stream = cursor;
	Ok(narrowed)
}

/// Picks the representative triple for the declared decimal type: the one at
/// the declared scale, or the reduced one for arbitrary types.
pub fn normalize_decimal(value: Triple, field_type: &FieldType) -> CodecResult<Triple> {
	match field_type.decimal_option() {
		Some(option) => match (option.precision, option.scale) {
			(Some(precision), Some(scale)) => Ok(value.fit(precision, scale)?),
			(None, Some(scale)) => Ok(value.rescale(scale as i32)?),
			_ => Ok(value.reduce()),
		},
		None => Ok(value.reduce()),
	}
}

fn offset_for(field_type: &FieldType, offset: Option<ZoneOffset>) -> Option<ZoneOffset> {
	if field_type.with_time_zone() {
		Some(offset.unwrap_or_default())
	} else {
		None
	}
}
