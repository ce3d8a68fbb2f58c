// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{ops::Deref, sync::Arc};

use tessera_type::FieldType;

/// Placement of one field inside a record buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout {
	pub field_type: FieldType,
	pub nullable: bool,
	/// byte offset of the value
	pub value_offset: usize,
	/// bit offset of the null flag, present for nullable fields only
	pub nullity_offset: Option<usize>,
}

impl FieldLayout {
	pub fn size(&self) -> usize {
		self.field_type.kind().size()
	}
}

/// Shape of a fixed size record: values at aligned offsets, followed by one
/// null flag bit per nullable field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout(Arc<RecordLayoutInner>);

impl Deref for RecordLayout {
	type Target = RecordLayoutInner;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

#[derive(Debug, PartialEq, Eq)]
pub struct RecordLayoutInner {
	pub fields: Vec<FieldLayout>,
	/// total size in bytes, a multiple of `alignment`
	pub size: usize,
	pub alignment: usize,
}

impl RecordLayout {
	pub fn new(fields: impl IntoIterator<Item = (FieldType, bool)>) -> Self {
		let mut offset = 0;
		let mut alignment = 1;
		let mut nullable_count: usize = 0;
		let mut layouts = Vec::new();

		for (field_type, nullable) in fields {
			let kind = field_type.kind();
			offset = align_up(offset, kind.alignment());
			layouts.push(FieldLayout {
				field_type,
				nullable,
				value_offset: offset,
				nullity_offset: None,
			});
			offset += kind.size();
			alignment = alignment.max(kind.alignment());
			if nullable {
				nullable_count += 1;
			}
		}

		let nullity_base = offset * 8;
		let mut bit = 0;
		for layout in layouts.iter_mut().filter(|l| l.nullable) {
			layout.nullity_offset = Some(nullity_base + bit);
			bit += 1;
		}

		let size = align_up(offset + nullable_count.div_ceil(8), alignment);
		Self(Arc::new(RecordLayoutInner {
			fields: layouts,
			size,
			alignment,
		}))
	}

	/// All fields nullable.
	pub fn nullable(types: impl IntoIterator<Item = FieldType>) -> Self {
		Self::new(types.into_iter().map(|t| (t, true)))
	}

	#[inline]
	pub fn field(&self, index: usize) -> &FieldLayout {
		&self.fields[index]
	}

	pub fn len(&self) -> usize {
		self.fields.len()
	}

	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}
}

fn align_up(offset: usize, align: usize) -> usize {
	(offset + align - 1) & !(align - 1)
}

#[cfg(test)]
mod tests {
	use tessera_type::FieldType;

	use super::*;

	#[test]
	fn test_single_int4() {
		let layout = RecordLayout::new([(FieldType::int4(), false)]);
		assert_eq!(layout.field(0).value_offset, 0);
		assert_eq!(layout.field(0).nullity_offset, None);
		assert_eq!(layout.size, 4);
		assert_eq!(layout.alignment, 4);
	}

	#[test]
	fn test_offsets_are_aligned() {
		let layout = RecordLayout::new([
			(FieldType::boolean(), false),
			(FieldType::int8(), true),
			(FieldType::int2(), false),
			(FieldType::varchar(10), true),
		]);
		assert_eq!(layout.field(0).value_offset, 0);
		assert_eq!(layout.field(1).value_offset, 8);
		assert_eq!(layout.field(2).value_offset, 16);
		assert_eq!(layout.field(3).value_offset, 24);
		assert_eq!(layout.field(1).nullity_offset, Some(40 * 8));
		assert_eq!(layout.field(3).nullity_offset, Some(40 * 8 + 1));
		assert_eq!(layout.size, 48);
		assert_eq!(layout.alignment, 8);
	}

	#[test]
	fn test_nullity_bits_spill_into_next_byte() {
		let layout = RecordLayout::nullable(std::iter::repeat_n(FieldType::int1(), 9));
		assert_eq!(layout.field(8).nullity_offset, Some(9 * 8 + 8));
		assert_eq!(layout.size, 11);
	}
}
