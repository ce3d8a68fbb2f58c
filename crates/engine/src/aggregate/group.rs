// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use indexmap::{IndexMap, map::Entry};
use tessera_core::{FieldInfo, FieldMapping, Order, ReadableStream, RecordBuffer, RecordLayout};
use tessera_memory::MemoryResource;
use tracing::{debug, instrument};
use xxhash_rust::xxh3::xxh3_64;

use super::{
	aggregator::{Aggregator, EmptyValue},
	catalog::AggregateFunction,
};
use crate::{error::AggregateError, write::encode_growing};

/// Partial aggregates keyed by the key-encoded group columns.
pub type GroupState<'a> = IndexMap<Vec<u8>, RecordBuffer<'a>>;

/// An aggregate applied to input columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateCall {
	pub function: AggregateFunction,
	/// input column per function argument
	pub arguments: Vec<usize>,
}

impl AggregateCall {
	pub fn new(function: AggregateFunction, arguments: Vec<usize>) -> Self {
		Self {
			function,
			arguments,
		}
	}
}

#[derive(Debug, Clone)]
struct Step {
	aggregator: Aggregator,
	target: usize,
	fields: Vec<usize>,
	empty: EmptyValue,
}

/// Grouped aggregation split into the phases a shuffle separates: each
/// upstream task runs [`pre`](Self::pre) over its rows,
/// [`shuffle`](Self::shuffle) routes the partial groups to partitions by
/// key hash, and each partition runs [`merge`](Self::merge) and
/// [`finish`](Self::finish).
///
/// Output rows hold the group columns followed by one field per call.
#[derive(Debug, Clone)]
pub struct GroupAggregator {
	group_keys: FieldMapping,
	group_decode: FieldMapping,
	state_layout: RecordLayout,
	result_layout: RecordLayout,
	pre: Vec<Step>,
	mid: Vec<Step>,
	post: Vec<Step>,
	partitions: usize,
}

impl GroupAggregator {
	pub fn new(
		input: &RecordLayout,
		group_columns: &[usize],
		calls: &[AggregateCall],
		partitions: usize,
	) -> tessera_type::Result<Self> {
		let mut group_keys = Vec::with_capacity(group_columns.len());
		let mut group_decode = Vec::with_capacity(group_columns.len());
		let mut result_fields = Vec::new();
		for (i, column) in group_columns.iter().enumerate() {
			let field = input.field(*column);
			group_keys.push(FieldInfo::key(field.field_type, field.nullable, *column, Order::Ascending));
			group_decode.push(FieldInfo::key(field.field_type, field.nullable, i, Order::Ascending));
			result_fields.push((field.field_type, field.nullable));
		}

		let mut state_fields = Vec::new();
		let (mut pre, mut mid, mut post) = (Vec::new(), Vec::new(), Vec::new());
		for (n, call) in calls.iter().enumerate() {
			let function = &call.function;
			if call.arguments.len() != function.arity() {
				return Err(AggregateError::ArgumentCount {
					name: function.name(),
					expected: function.arity(),
					actual: call.arguments.len(),
				}
				.into());
			}
			if let (Some(expected), Some(column)) = (function.argument, call.arguments.first()) {
				let kind = input.field(*column).field_type.kind();
				if kind != expected {
					return Err(AggregateError::UnsupportedArgument {
						name: function.name(),
						kind,
					}
					.into());
				}
			}

			let offset = state_fields.len();
			state_fields.extend(function.intermediate());
			for (i, info) in function.pre().into_iter().enumerate() {
				pre.push(Step {
					aggregator: info.aggregator,
					target: offset + i,
					fields: info.arguments.iter().map(|a| call.arguments[*a]).collect(),
					empty: info.empty_generator,
				});
			}
			for (i, info) in function.mid().into_iter().enumerate() {
				mid.push(Step {
					aggregator: info.aggregator,
					target: offset + i,
					fields: info.arguments.iter().map(|a| offset + a).collect(),
					empty: info.empty_generator,
				});
			}
			for info in function.post() {
				post.push(Step {
					aggregator: info.aggregator,
					target: group_columns.len() + n,
					fields: info.arguments.iter().map(|a| offset + a).collect(),
					empty: info.empty_generator,
				});
			}
			result_fields.push(function.result());
		}

		Ok(Self {
			group_keys: FieldMapping::new(group_keys),
			group_decode: FieldMapping::new(group_decode),
			state_layout: RecordLayout::new(state_fields),
			result_layout: RecordLayout::new(result_fields),
			pre,
			mid,
			post,
			partitions: partitions.max(1),
		})
	}

	pub fn partitions(&self) -> usize {
		self.partitions
	}

	pub fn result_layout(&self) -> &RecordLayout {
		&self.result_layout
	}

	pub fn partition_of(&self, key: &[u8]) -> usize {
		(xxh3_64(key) % self.partitions as u64) as usize
	}

	/// Folds one task's input rows into per-group intermediates.
	pub fn pre<'a>(&self, rows: &[RecordBuffer<'_>], arena: &'a dyn MemoryResource) -> tessera_type::Result<GroupState<'a>> {
		let mut groups = GroupState::new();
		let mut key = vec![0u8; 64];
		for row in rows {
			let len = encode_growing(&mut key, |stream| self.group_keys.encode(stream, row))?;
			match groups.entry(key[..len].to_vec()) {
				Entry::Occupied(mut entry) => self.apply(&self.pre, entry.get_mut(), false, row, arena)?,
				Entry::Vacant(entry) => {
					let mut state = RecordBuffer::new(self.state_layout.clone());
					self.apply(&self.pre, &mut state, true, row, arena)?;
					entry.insert(state);
				}
			}
		}
		Ok(groups)
	}

	/// Routes the groups of every upstream task to their partition.
	pub fn shuffle<'a>(&self, partials: Vec<GroupState<'a>>) -> Vec<Vec<(Vec<u8>, RecordBuffer<'a>)>> {
		let mut partitions: Vec<Vec<_>> = (0..self.partitions).map(|_| Vec::new()).collect();
		for partial in partials {
			for (key, state) in partial {
				let partition = self.partition_of(&key);
				partitions[partition].push((key, state));
			}
		}
		partitions
	}

	/// Combines the intermediates of one partition that share a group.
	pub fn merge<'a>(
		&self,
		entries: Vec<(Vec<u8>, RecordBuffer<'a>)>,
		arena: &'a dyn MemoryResource,
	) -> tessera_type::Result<GroupState<'a>> {
		let mut merged = GroupState::new();
		for (key, state) in entries {
			match merged.entry(key) {
				Entry::Occupied(mut entry) => self.apply(&self.mid, entry.get_mut(), false, &state, arena)?,
				Entry::Vacant(entry) => {
					entry.insert(state);
				}
			}
		}
		Ok(merged)
	}

	pub fn finish<'a>(
		&self,
		merged: &GroupState<'a>,
		arena: &'a dyn MemoryResource,
	) -> tessera_type::Result<Vec<RecordBuffer<'a>>> {
		merged.iter().map(|(key, state)| self.project(key, state, arena)).collect()
	}

	/// The single output row of an ungrouped aggregation over no input.
	pub fn empty_row<'a>(&self, arena: &'a dyn MemoryResource) -> tessera_type::Result<RecordBuffer<'a>> {
		let mut state = RecordBuffer::new(self.state_layout.clone());
		for step in &self.pre {
			step.empty.generate(&mut state, step.target)?;
		}
		self.project(&[], &state, arena)
	}

	/// Runs every phase over `chunks`, one chunk per upstream task.
	#[instrument(name = "engine::aggregate::run", level = "trace", skip_all, fields(chunks = chunks.len(), partitions = self.partitions))]
	pub fn run<'a>(
		&self,
		chunks: &[Vec<RecordBuffer<'_>>],
		arena: &'a dyn MemoryResource,
	) -> tessera_type::Result<Vec<RecordBuffer<'a>>> {
		let partials = chunks.iter().map(|chunk| self.pre(chunk, arena)).collect::<tessera_type::Result<Vec<_>>>()?;
		let mut rows = Vec::new();
		for partition in self.shuffle(partials) {
			let merged = self.merge(partition, arena)?;
			rows.extend(self.finish(&merged, arena)?);
		}
		if rows.is_empty() && self.group_keys.is_empty() {
			rows.push(self.empty_row(arena)?);
		}
		debug!(groups = rows.len(), "aggregated");
		Ok(rows)
	}

	fn apply<'a>(
		&self,
		steps: &[Step],
		target: &mut RecordBuffer<'a>,
		initial: bool,
		source: &RecordBuffer<'_>,
		arena: &'a dyn MemoryResource,
	) -> tessera_type::Result<()> {
		for step in steps {
			step.aggregator.apply(target, step.target, initial, source, &step.fields, arena)?;
		}
		Ok(())
	}

	fn project<'a>(
		&self,
		key: &[u8],
		state: &RecordBuffer<'a>,
		arena: &'a dyn MemoryResource,
	) -> tessera_type::Result<RecordBuffer<'a>> {
		let mut row = RecordBuffer::new(self.result_layout.clone());
		self.group_decode.decode(&mut ReadableStream::new(key), &mut row, arena)?;
		self.apply(&self.post, &mut row, true, state, arena)?;
		Ok(row)
	}
}
