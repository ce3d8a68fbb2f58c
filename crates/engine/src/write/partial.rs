// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tessera_core::{
	ColumnPosition, Datum, PrimaryIndex, PutOption, RecordBuffer, SecondaryIndex, StorageHandle, TransactionControl,
};
use tessera_memory::MemoryResource;
use tessera_type::util::hex;
use tracing::{instrument, trace, warn};

use super::{WriteContext, WritePrimaryTarget, WriteSecondaryTarget, WriteStatus};
use crate::error::WriteError;

/// Where the new value of an updated column comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateSource {
	/// A field of the input record.
	Variable(usize),
	/// A bound parameter.
	HostVariable(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateColumn {
	/// table column
	pub column: usize,
	pub source: UpdateSource,
}

impl UpdateColumn {
	pub fn new(column: usize, source: UpdateSource) -> Self {
		Self {
			column,
			source,
		}
	}
}

/// Progress of one row through an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStage {
	Fetched,
	Updated,
	PrimaryWritten,
	SecondariesWritten,
	Done,
}

#[derive(Debug, Clone)]
struct UpdateTarget {
	position: ColumnPosition,
	source: UpdateSource,
	nullable: bool,
	column: usize,
}

#[derive(Debug, Clone)]
struct SecondaryTarget {
	target: WriteSecondaryTarget,
	affected: bool,
}

#[derive(Debug, Clone)]
enum PartialWriteKind {
	Update(Vec<UpdateTarget>),
	Delete,
}

/// UPDATE and DELETE over a primary index and its secondaries, one input
/// record at a time.
#[derive(Debug, Clone)]
pub struct WritePartial {
	kind: PartialWriteKind,
	primary: WritePrimaryTarget,
	secondaries: Vec<SecondaryTarget>,
	key_updated: bool,
	idempotent_delete: bool,
}

impl WritePartial {
	/// `input_keys[i]` is the position of the `i`th primary key column in
	/// the input records.
	pub fn delete(
		index: &PrimaryIndex,
		storage: StorageHandle,
		input_keys: &[usize],
		secondaries: Vec<(SecondaryIndex, StorageHandle)>,
	) -> tessera_type::Result<Self> {
		let primary = WritePrimaryTarget::new(index, storage, index.input_keys(input_keys)?);
		Ok(Self {
			kind: PartialWriteKind::Delete,
			primary,
			secondaries: secondaries
				.iter()
				.map(|(secondary, storage)| SecondaryTarget {
					target: WriteSecondaryTarget::new(secondary, storage.clone()),
					affected: true,
				})
				.collect(),
			key_updated: false,
			idempotent_delete: false,
		})
	}

	pub fn update(
		index: &PrimaryIndex,
		storage: StorageHandle,
		input_keys: &[usize],
		secondaries: Vec<(SecondaryIndex, StorageHandle)>,
		columns: Vec<UpdateColumn>,
	) -> tessera_type::Result<Self> {
		let primary = WritePrimaryTarget::new(index, storage, index.input_keys(input_keys)?);
		let mut targets = Vec::with_capacity(columns.len());
		for update in &columns {
			let Some(position) = index.position(update.column) else {
				return Err(WriteError::UnknownColumn {
					table: index.table().name.clone(),
					column: update.column,
				}
				.into());
			};
			targets.push(UpdateTarget {
				position,
				source: update.source,
				nullable: index.table().columns[update.column].nullable,
				column: update.column,
			});
		}
		let key_updated = targets.iter().any(|t| matches!(t.position, ColumnPosition::Key(_)));
		let updated: Vec<usize> = columns.iter().map(|c| c.column).collect();
		Ok(Self {
			kind: PartialWriteKind::Update(targets),
			primary,
			secondaries: secondaries
				.iter()
				.map(|(secondary, storage)| SecondaryTarget {
					target: WriteSecondaryTarget::new(secondary, storage.clone()),
					affected: key_updated || secondary.is_affected_by(&updated),
				})
				.collect(),
			key_updated,
			idempotent_delete: false,
		})
	}

	/// Treat a missing row as success on delete.
	pub fn with_idempotent_delete(mut self, idempotent: bool) -> Self {
		self.idempotent_delete = idempotent;
		self
	}

	pub fn is_delete(&self) -> bool {
		matches!(self.kind, PartialWriteKind::Delete)
	}

	/// Whether the update rewrites entries of the `i`th secondary index.
	pub fn affects_secondary(&self, i: usize) -> bool {
		self.secondaries.get(i).is_some_and(|s| s.affected)
	}

	#[instrument(name = "engine::write::partial::process", level = "trace", skip_all, fields(storage = %self.primary.storage()))]
	pub fn process_record<'a, T: TransactionControl>(
		&self,
		ctx: &mut WriteContext,
		tx: &mut T,
		input: &RecordBuffer<'_>,
		host: Option<&RecordBuffer<'_>>,
		arena: &'a dyn MemoryResource,
	) -> tessera_type::Result<WriteStatus> {
		let mut stage = RowStage::Fetched;
		let result = match &self.kind {
			PartialWriteKind::Delete => self.delete_row(ctx, tx, input, arena),
			PartialWriteKind::Update(targets) => {
				self.update_row(ctx, tx, input, host, arena, targets, &mut stage)
			}
		};
		if let Err(err) = &result {
			warn!(?stage, error = %err, "row aborted");
		}
		result
	}

	fn delete_row<'a, T: TransactionControl>(
		&self,
		ctx: &mut WriteContext,
		tx: &mut T,
		input: &RecordBuffer<'_>,
		arena: &'a dyn MemoryResource,
	) -> tessera_type::Result<WriteStatus> {
		let mut key = self.primary.key_record();
		let mut value = self.primary.value_record();
		match self.primary.encode_find_remove(ctx, tx, input, arena, &mut key, &mut value)? {
			WriteStatus::Ok => {}
			_ if self.idempotent_delete => return Ok(WriteStatus::NotFound),
			_ => return Err(self.primary.not_found(ctx).into()),
		}
		for secondary in &self.secondaries {
			secondary.target.encode_remove(ctx, tx, &key, &value)?;
		}
		Ok(WriteStatus::Ok)
	}

	#[allow(clippy::too_many_arguments)]
	fn update_row<'a, T: TransactionControl>(
		&self,
		ctx: &mut WriteContext,
		tx: &mut T,
		input: &RecordBuffer<'_>,
		host: Option<&RecordBuffer<'_>>,
		arena: &'a dyn MemoryResource,
		targets: &[UpdateTarget],
		stage: &mut RowStage,
	) -> tessera_type::Result<WriteStatus> {
		let mut key = self.primary.key_record();
		let mut value = self.primary.value_record();
		if self.primary.encode_find(ctx, tx, input, arena, &mut key, &mut value)? != WriteStatus::Ok {
			return Err(self.primary.not_found(ctx).into());
		}
		let old_key = key.clone();
		let old_value = value.clone();

		for target in targets {
			let datum = source_datum(target.source, input, host)?.copy_into(arena)?;
			if datum.is_null() && !target.nullable {
				return Err(WriteError::NotNullViolation {
					storage: self.primary.storage().name.to_string(),
					column: target.column,
				}
				.into());
			}
			match target.position {
				ColumnPosition::Key(i) => key.set_datum(i, datum)?,
				ColumnPosition::Value(i) => value.set_datum(i, datum)?,
			}
		}
		*stage = RowStage::Updated;

		if self.key_updated {
			for secondary in &self.secondaries {
				secondary.target.encode_remove(ctx, tx, &old_key, &old_value)?;
			}
			self.primary.remove_by_encoded_key(ctx, tx)?;
			if self.primary.encode_put(ctx, tx, PutOption::Create, &key, &value)? == WriteStatus::AlreadyExists {
				return Err(self.primary.duplicate(ctx).into());
			}
			*stage = RowStage::PrimaryWritten;
			for secondary in &self.secondaries {
				secondary.target.encode_put(ctx, tx, &key, &value)?;
			}
		} else {
			if self.primary.put_by_encoded_key(ctx, tx, PutOption::Update, &value)? == WriteStatus::NotFound {
				return Err(self.primary.not_found(ctx).into());
			}
			*stage = RowStage::PrimaryWritten;
			for secondary in self.secondaries.iter().filter(|s| s.affected) {
				secondary.target.encode_remove(ctx, tx, &old_key, &old_value)?;
				secondary.target.encode_put(ctx, tx, &key, &value)?;
			}
		}
		*stage = RowStage::SecondariesWritten;
		trace!(key_hex = %hex::encode(ctx.encoded_key()), "row updated");
		*stage = RowStage::Done;
		Ok(WriteStatus::Ok)
	}
}

fn source_datum<'r>(
	source: UpdateSource,
	input: &'r RecordBuffer<'_>,
	host: Option<&'r RecordBuffer<'_>>,
) -> Result<Datum<'r>, WriteError> {
	match source {
		UpdateSource::Variable(i) => Ok(input.get_datum(i)),
		UpdateSource::HostVariable(i) => match host {
			Some(host) if i < host.layout().len() => Ok(host.get_datum(i)),
			_ => Err(WriteError::MissingHostVariable {
				index: i,
			}),
		},
	}
}
