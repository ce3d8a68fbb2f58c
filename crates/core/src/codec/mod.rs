// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::{Deserialize, Serialize};
use tessera_memory::MemoryResource;
use tessera_type::{FieldType, TypeError, VarlenOption};

use crate::{
	datum::Datum,
	error::{CodecError, CodecResult},
};

pub mod entry;
pub mod key;
pub mod stream;
pub mod value;
pub mod varint;

pub use stream::{ReadableStream, WritableStream};

/// Direction of a key field.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
	#[default]
	Ascending,
	Descending,
}

/// Selects the encoder branch for one field: key mode with a direction, or
/// value mode when `order` is `None`.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodingSpec {
	pub order: Option<Order>,
	pub nullable: bool,
}

impl CodingSpec {
	pub const fn key(order: Order, nullable: bool) -> Self {
		Self {
			order: Some(order),
			nullable,
		}
	}

	pub const fn value(nullable: bool) -> Self {
		Self {
			order: None,
			nullable,
		}
	}

	pub fn is_key(&self) -> bool {
		self.order.is_some()
	}
}

pub(crate) fn check_length(len: usize, option: Option<VarlenOption>) -> CodecResult<()> {
	if let Some(max) = option.and_then(|o| o.max_length()) {
		if len > max {
			return Err(TypeError::ValueTooLong {
				length: len,
				declared: max as u32,
			}
			.into());
		}
	}
	Ok(())
}

pub(crate) fn padded_length(len: usize, option: Option<VarlenOption>) -> usize {
	option.and_then(|o| o.fixed_length()).map_or(len, |fixed| fixed.max(len))
}

/// Encodes one field under `spec`.
pub fn encode(
	stream: &mut WritableStream<'_>,
	datum: &Datum<'_>,
	field_type: &FieldType,
	spec: CodingSpec,
) -> CodecResult<()> {
	match spec.order {
		Some(order) => key::encode_key(stream, datum, field_type, order, spec.nullable),
		None if datum.is_null() && !spec.nullable => Err(CodecError::UnexpectedNull {
			kind: field_type.kind(),
		}),
		None => value::encode_value(stream, datum, field_type),
	}
}

/// Decodes one field under `spec`, copying varlen payloads into `arena`.
pub fn decode<'a>(
	stream: &mut ReadableStream<'_>,
	field_type: &FieldType,
	spec: CodingSpec,
	arena: &'a dyn MemoryResource,
) -> tessera_type::Result<Datum<'a>> {
	match spec.order {
		Some(order) => key::decode_key(stream, field_type, order, spec.nullable, arena),
		None => {
			let datum = value::decode_value(stream, field_type)?;
			datum.copy_into(arena)
		}
	}
}

/// Moves past one field under `spec`.
pub fn skip(stream: &mut ReadableStream<'_>, field_type: &FieldType, spec: CodingSpec) -> CodecResult<()> {
	match spec.order {
		Some(order) => key::skip_key(stream, field_type, order, spec.nullable),
		None => value::skip(stream),
	}
}
