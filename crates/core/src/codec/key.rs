// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Key mode encoding: concatenated fields compare under `memcmp` in the
//! order declared by their directions.
//!
//! * integers, dates: big-endian two's complement with the sign bit flipped
//! * floats: big-endian IEEE bits, all inverted when negative, otherwise only
//!   the sign bit flipped; NaN and negative zero are canonicalized first
//! * character / octet: fixed length padded (spaces / zeros), varying length
//!   raw bytes followed by a single `0x00`; payloads containing `0x00` are
//!   rejected for the varying form
//! * decimal: two's complement coefficient at the declared scale, as wide as
//!   the declared precision needs, sign bit flipped
//! * time of day: unsigned nanoseconds; time point: flipped seconds then
//!   nanoseconds; with time zone the flipped offset seconds follow
//!
//! Descending fields invert every byte. Nullable fields are prefixed with
//! `0x00` (null) or `0x01` (present); a null payload is written as zeros of
//! the fixed width of the type.

use smallvec::SmallVec;
use tessera_memory::MemoryResource;
use tessera_type::{Date, FieldType, Kind, TimeOfDay, TimePoint, Triple, TypeError, ZoneOffset};

use super::{
	Order, check_length,
	stream::{ReadableStream, WritableStream},
};
use crate::{
	datum::Datum,
	error::{CodecError, CodecResult},
};

const NULL_MARKER: u8 = 0x00;
const PRESENT_MARKER: u8 = 0x01;
const TERMINATOR: u8 = 0x00;

pub const CANONICAL_NAN_F32: u32 = 0x7FC0_0000;
pub const CANONICAL_NAN_F64: u64 = 0x7FF8_0000_0000_0000;

type KeyBytes = SmallVec<[u8; 32]>;

/// Bytes of the two's complement coefficient of a `DECIMAL(precision, _)`
/// key: the least `n` with `10^precision - 1 <= 2^(8n - 1) - 1`.
pub fn decimal_key_width(precision: u8) -> usize {
	let max = 10u128.saturating_pow(precision as u32) - 1;
	(1..=16).find(|n| max <= (1u128 << (8 * n - 1)) - 1).unwrap_or(16)
}

/// Width of the key payload when it does not depend on the value.
pub fn fixed_key_width(field_type: &FieldType) -> CodecResult<Option<usize>> {
	Ok(Some(match field_type.kind() {
		Kind::Boolean | Kind::Int1 => 1,
		Kind::Int2 => 2,
		Kind::Int4 | Kind::Float4 => 4,
		Kind::Int8 | Kind::Float8 | Kind::Date => 8,
		Kind::Decimal => decimal_key_width(decimal_key_options(field_type)?.0),
		Kind::Character | Kind::Octet => match field_type.varlen_option().and_then(|o| o.fixed_length()) {
			Some(length) => length,
			None => return Ok(None),
		},
		Kind::TimeOfDay => 8 + offset_width(field_type),
		Kind::TimePoint => 12 + offset_width(field_type),
		Kind::Blob | Kind::Clob => return Err(CodecError::unsupported(format!("{} key", field_type.kind()))),
	}))
}

fn offset_width(field_type: &FieldType) -> usize {
	if field_type.with_time_zone() {
		4
	} else {
		0
	}
}

fn decimal_key_options(field_type: &FieldType) -> CodecResult<(u8, u8)> {
	match field_type.decimal_option() {
		Some(option) => match (option.precision, option.scale) {
			(Some(precision), Some(scale)) => Ok((precision, scale)),
			_ => Err(CodecError::unsupported(format!("{} key", field_type))),
		},
		None => Err(CodecError::mismatch(Kind::Decimal, field_type)),
	}
}

pub fn canonical_f32(value: f32) -> u32 {
	if value.is_nan() {
		CANONICAL_NAN_F32
	} else if value == 0.0 {
		0
	} else {
		value.to_bits()
	}
}

pub fn canonical_f64(value: f64) -> u64 {
	if value.is_nan() {
		CANONICAL_NAN_F64
	} else if value == 0.0 {
		0
	} else {
		value.to_bits()
	}
}

/// Encodes one key field.
pub fn encode_key(
	stream: &mut WritableStream<'_>,
	datum: &Datum<'_>,
	field_type: &FieldType,
	order: Order,
	nullable: bool,
) -> CodecResult<()> {
	let invert = order == Order::Descending;
	if datum.is_null() {
		if !nullable {
			return Err(CodecError::UnexpectedNull {
				kind: field_type.kind(),
			});
		}
		stream.write_maybe_inverted(&[NULL_MARKER], invert)?;
		let width = fixed_key_width(field_type)?.unwrap_or(0);
		return stream.write_repeated(0, width);
	}
	if datum.kind() != Some(field_type.kind()) {
		return Err(CodecError::mismatch(field_type, datum.kind_name()));
	}
	if nullable {
		stream.write_maybe_inverted(&[PRESENT_MARKER], invert)?;
	}

	let mut bytes = KeyBytes::new();
	match *datum {
		Datum::Null => unreachable!("handled above"),
		Datum::Boolean(v) => bytes.push(v as u8),
		Datum::Int1(v) => bytes.push((v as u8) ^ 0x80),
		Datum::Int2(v) => bytes.extend_from_slice(&((v as u16) ^ 0x8000).to_be_bytes()),
		Datum::Int4(v) => bytes.extend_from_slice(&((v as u32) ^ 0x8000_0000).to_be_bytes()),
		Datum::Int8(v) => bytes.extend_from_slice(&flip_i64(v)),
		Datum::Float4(v) => {
			let bits = canonical_f32(v);
			let bits = if bits & 0x8000_0000 != 0 {
				!bits
			} else {
				bits ^ 0x8000_0000
			};
			bytes.extend_from_slice(&bits.to_be_bytes());
		}
		Datum::Float8(v) => {
			let bits = canonical_f64(v);
			let bits = if bits & 0x8000_0000_0000_0000 != 0 {
				!bits
			} else {
				bits ^ 0x8000_0000_0000_0000
			};
			bytes.extend_from_slice(&bits.to_be_bytes());
		}
		Datum::Decimal(v) => encode_decimal(&mut bytes, v, field_type)?,
		Datum::Character(v) => return encode_varlen(stream, v.as_bytes(), field_type, b' ', invert),
		Datum::Octet(v) => return encode_varlen(stream, v, field_type, 0, invert),
		Datum::Date(v) => bytes.extend_from_slice(&flip_i64(v.days())),
		Datum::TimeOfDay(v, offset) => {
			bytes.extend_from_slice(&v.nanos().to_be_bytes());
			push_offset(&mut bytes, field_type, offset);
		}
		Datum::TimePoint(v, offset) => {
			bytes.extend_from_slice(&flip_i64(v.seconds()));
			bytes.extend_from_slice(&v.nanos().to_be_bytes());
			push_offset(&mut bytes, field_type, offset);
		}
		Datum::Blob(_) | Datum::Clob(_) => {
			return Err(CodecError::unsupported(format!("{} key", field_type.kind())));
		}
	}
	stream.write_maybe_inverted(&bytes, invert)
}

#[inline]
fn flip_i64(value: i64) -> [u8; 8] {
	((value as u64) ^ 0x8000_0000_0000_0000).to_be_bytes()
}

#[inline]
fn unflip_i64(bytes: [u8; 8]) -> i64 {
	(u64::from_be_bytes(bytes) ^ 0x8000_0000_0000_0000) as i64
}

fn push_offset(bytes: &mut KeyBytes, field_type: &FieldType, offset: Option<ZoneOffset>) {
	if field_type.with_time_zone() {
		let seconds = offset.unwrap_or_default().seconds();
		bytes.extend_from_slice(&((seconds as u32) ^ 0x8000_0000).to_be_bytes());
	}
}

fn encode_decimal(bytes: &mut KeyBytes, value: Triple, field_type: &FieldType) -> CodecResult<()> {
	let (precision, scale) = decimal_key_options(field_type)?;
	let fitted = value.fit(precision, scale)?;
	let coefficient = fitted.signed_coefficient().ok_or_else(|| TypeError::DecimalOutOfRange {
		value: value.to_string(),
	})?;
	let width = decimal_key_width(precision);
	let full = coefficient.to_be_bytes();
	let start = bytes.len();
	bytes.extend_from_slice(&full[16 - width..]);
	bytes[start] ^= 0x80;
	Ok(())
}

fn encode_varlen(
	stream: &mut WritableStream<'_>,
	payload: &[u8],
	field_type: &FieldType,
	pad: u8,
	invert: bool,
) -> CodecResult<()> {
	let option = field_type.varlen_option();
	check_length(payload.len(), option)?;
	match option.and_then(|o| o.fixed_length()) {
		Some(length) => {
			stream.write_maybe_inverted(payload, invert)?;
			stream.write_repeated(
				if invert {
					!pad
				} else {
					pad
				},
				length - payload.len(),
			)
		}
		None => {
			if payload.contains(&TERMINATOR) {
				return Err(CodecError::InvalidKeyPayload {
					kind: field_type.kind(),
				});
			}
			stream.write_maybe_inverted(payload, invert)?;
			stream.write_maybe_inverted(&[TERMINATOR], invert)
		}
	}
}

/// Reads the nullity marker; `true` when the field is null.
fn read_null_marker(cursor: &mut ReadableStream<'_>, invert: bool, nullable: bool) -> CodecResult<bool> {
	if !nullable {
		return Ok(false);
	}
	let [marker] = cursor.read_array_maybe_inverted::<1>(invert)?;
	match marker {
		NULL_MARKER => Ok(true),
		PRESENT_MARKER => Ok(false),
		tag => Err(CodecError::UnrecognizedEntry {
			tag,
		}),
	}
}

/// Decodes one key field, copying character and octet payloads into `arena`.
pub fn decode_key<'a>(
	stream: &mut ReadableStream<'_>,
	field_type: &FieldType,
	order: Order,
	nullable: bool,
	arena: &'a dyn MemoryResource,
) -> tessera_type::Result<Datum<'a>> {
	let invert = order == Order::Descending;
	let mut cursor = *stream;
	if read_null_marker(&mut cursor, invert, nullable)? {
		cursor.skip(fixed_key_width(field_type)?.unwrap_or(0))?;
		*stream = cursor;
		return Ok(Datum::Null);
	}
	let datum = match field_type.kind() {
		Kind::Boolean => Datum::Boolean(cursor.read_array_maybe_inverted::<1>(invert)?[0] != 0),
		Kind::Int1 => Datum::Int1((cursor.read_array_maybe_inverted::<1>(invert)?[0] ^ 0x80) as i8),
		Kind::Int2 => {
			Datum::Int2((u16::from_be_bytes(cursor.read_array_maybe_inverted(invert)?) ^ 0x8000) as i16)
		}
		Kind::Int4 => {
			Datum::Int4((u32::from_be_bytes(cursor.read_array_maybe_inverted(invert)?) ^ 0x8000_0000) as i32)
		}
		Kind::Int8 => Datum::Int8(unflip_i64(cursor.read_array_maybe_inverted(invert)?)),
		Kind::Float4 => {
			let bits = u32::from_be_bytes(cursor.read_array_maybe_inverted(invert)?);
			let bits = if bits & 0x8000_0000 != 0 {
				bits ^ 0x8000_0000
			} else {
				!bits
			};
			Datum::Float4(f32::from_bits(bits))
		}
		Kind::Float8 => {
			let bits = u64::from_be_bytes(cursor.read_array_maybe_inverted(invert)?);
			let bits = if bits & 0x8000_0000_0000_0000 != 0 {
				bits ^ 0x8000_0000_0000_0000
			} else {
				!bits
			};
			Datum::Float8(f64::from_bits(bits))
		}
		Kind::Decimal => {
			let (precision, scale) = decimal_key_options(field_type)?;
			let width = decimal_key_width(precision);
			let raw = cursor.read(width)?;
			let mut full = [0u8; 16];
			let first = if invert {
				!raw[0]
			} else {
				raw[0]
			} ^ 0x80;
			let fill = if first & 0x80 != 0 {
				0xFF
			} else {
				0x00
			};
			full[..16 - width].fill(fill);
			for (dst, src) in full[16 - width..].iter_mut().zip(raw) {
				*dst = if invert {
					!*src
				} else {
					*src
				};
			}
			full[16 - width] = first;
			Datum::Decimal(Triple::from_i128(i128::from_be_bytes(full), -(scale as i32)))
		}
		Kind::Character => {
			let bytes = decode_varlen(&mut cursor, field_type, invert)?;
			let text = std::str::from_utf8(&bytes).map_err(|_| CodecError::from(TypeError::InvalidCharacterData))?;
			Datum::Character(arena.copy_str(text)?)
		}
		Kind::Octet => {
			let bytes = decode_varlen(&mut cursor, field_type, invert)?;
			Datum::Octet(arena.copy_bytes(&bytes)?)
		}
		Kind::Date => Datum::Date(Date::from_days(unflip_i64(cursor.read_array_maybe_inverted(invert)?))),
		Kind::TimeOfDay => {
			let nanos = u64::from_be_bytes(cursor.read_array_maybe_inverted(invert)?);
			let value = TimeOfDay::from_nanos(nanos)
				.ok_or_else(|| CodecError::unsupported("time of day out of range"))?;
			Datum::TimeOfDay(value, read_offset(&mut cursor, field_type, invert)?)
		}
		Kind::TimePoint => {
			let seconds = unflip_i64(cursor.read_array_maybe_inverted(invert)?);
			let nanos = u32::from_be_bytes(cursor.read_array_maybe_inverted(invert)?);
			let value = TimePoint::new(seconds, nanos)
				.ok_or_else(|| CodecError::unsupported("time point nanoseconds out of range"))?;
			Datum::TimePoint(value, read_offset(&mut cursor, field_type, invert)?)
		}
		Kind::Blob | Kind::Clob => {
			return Err(CodecError::unsupported(format!("{} key", field_type.kind())).into());
		}
	};
	*stream = cursor;
	Ok(datum)
}

fn read_offset(
	cursor: &mut ReadableStream<'_>,
	field_type: &FieldType,
	invert: bool,
) -> CodecResult<Option<ZoneOffset>> {
	if !field_type.with_time_zone() {
		return Ok(None);
	}
	let raw = u32::from_be_bytes(cursor.read_array_maybe_inverted(invert)?);
	Ok(Some(ZoneOffset((raw ^ 0x8000_0000) as i32)))
}

fn decode_varlen(cursor: &mut ReadableStream<'_>, field_type: &FieldType, invert: bool) -> CodecResult<KeyBytes> {
	let raw = match field_type.varlen_option().and_then(|o| o.fixed_length()) {
		Some(length) => cursor.read(length)?,
		None => {
			let terminator = if invert {
				!TERMINATOR
			} else {
				TERMINATOR
			};
			let rest = cursor.rest();
			let end = rest.iter().position(|b| *b == terminator).ok_or(CodecError::BufferUnderflow {
				required: rest.len() + 1,
				available: rest.len(),
			})?;
			let raw = cursor.read(end)?;
			cursor.skip(1)?;
			raw
		}
	};
	Ok(raw.iter()
		.map(|b| {
			if invert {
				!*b
			} else {
				*b
			}
		})
		.collect())
}

/// Moves past one key field without materializing it.
pub fn skip_key(
	stream: &mut ReadableStream<'_>,
	field_type: &FieldType,
	order: Order,
	nullable: bool,
) -> CodecResult<()> {
	let invert = order == Order::Descending;
	let mut cursor = *stream;
	let null = read_null_marker(&mut cursor, invert, nullable)?;
	match fixed_key_width(field_type)? {
		Some(width) => cursor.skip(width)?,
		None if null => {}
		None => {
			decode_varlen(&mut cursor, field_type, invert)?;
		}
	}
	*stream = cursor;
	Ok(())
}
