// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;
use tessera_core::{RecordBuffer, RecordLayout, TransactionControl};
use tessera_memory::{MemoryResource, MonotonicResource, PagePool};
use tessera_type::Value;
use tracing::{debug, instrument};

use crate::{
	error::WriteError,
	request::RequestContext,
	scheduler::{Task, TaskResult},
	transaction::TransactionContext,
	write::{WriteContext, WriteCreate, WritePartial, WriteStatus},
};

/// The write operators a request step can run.
#[derive(Debug, Clone)]
pub enum Operator {
	Insert(WriteCreate),
	WritePartial(WritePartial),
}

impl Operator {
	/// Writes one input row. Fails fast once the request is cancelled; a
	/// failure is recorded on the request.
	#[instrument(name = "engine::operator::process", level = "trace", skip_all)]
	pub fn process_record<'a, T: TransactionControl>(
		&self,
		request: &RequestContext,
		ctx: &mut WriteContext,
		tx: &mut T,
		input: &RecordBuffer<'a>,
		host: Option<&RecordBuffer<'a>>,
		arena: &'a dyn MemoryResource,
	) -> tessera_type::Result<WriteStatus> {
		if request.is_cancelled() {
			return Err(WriteError::Cancelled.into());
		}
		let result = match self {
			Operator::Insert(op) => op.process_record(ctx, tx, input, arena),
			Operator::WritePartial(op) => op.process_record(ctx, tx, input, host, arena),
		};
		if let Err(err) = &result {
			request.set_error(err.clone());
		}
		result
	}
}

fn record<'a>(
	layout: &RecordLayout,
	values: &[Value],
	arena: &'a dyn MemoryResource,
) -> tessera_type::Result<RecordBuffer<'a>> {
	let mut record = RecordBuffer::new(layout.clone());
	for (index, value) in values.iter().enumerate() {
		record.set_value(index, value, arena)?;
	}
	Ok(record)
}

/// Feeds owned rows through an operator inside a shared transaction, a
/// batch per run. Cancelling the request aborts the transaction.
pub struct WriteTask<T: TransactionControl> {
	operator: Arc<Operator>,
	transaction: Arc<Mutex<TransactionContext<T>>>,
	pool: Arc<PagePool>,
	layout: RecordLayout,
	rows: VecDeque<Vec<Value>>,
	host: Option<(RecordLayout, Vec<Value>)>,
	batch_size: usize,
	context: WriteContext,
	written: usize,
}

impl<T: TransactionControl> WriteTask<T> {
	pub fn new(
		operator: Arc<Operator>,
		transaction: Arc<Mutex<TransactionContext<T>>>,
		pool: Arc<PagePool>,
		layout: RecordLayout,
		rows: Vec<Vec<Value>>,
	) -> Self {
		Self {
			operator,
			transaction,
			pool,
			layout,
			rows: rows.into(),
			host: None,
			batch_size: 64,
			context: WriteContext::new(),
			written: 0,
		}
	}

	pub fn with_host_variables(mut self, layout: RecordLayout, values: Vec<Value>) -> Self {
		self.host = Some((layout, values));
		self
	}

	pub fn with_batch_size(mut self, batch_size: usize) -> Self {
		self.batch_size = batch_size.max(1);
		self
	}
}

impl<T: TransactionControl + Send> Task for WriteTask<T> {
	fn run(&mut self, request: &RequestContext) -> tessera_type::Result<TaskResult> {
		let arena = MonotonicResource::new(Arc::clone(&self.pool));
		let host = match &self.host {
			Some((layout, values)) => Some(record(layout, values, &arena)?),
			None => None,
		};
		let mut guard = self.transaction.lock();
		let tx = guard.transaction()?;
		for _ in 0..self.batch_size {
			let Some(values) = self.rows.pop_front() else {
				break;
			};
			let input = record(&self.layout, &values, &arena)?;
			if self.operator.process_record(request, &mut self.context, tx, &input, host.as_ref(), &arena)?
				== WriteStatus::Ok
			{
				self.written += 1;
			}
		}
		if self.rows.is_empty() {
			debug!(written = self.written, "write task complete");
			return Ok(TaskResult::Complete);
		}
		Ok(TaskResult::Yield)
	}

	fn cancelled(&mut self) {
		let mut transaction = self.transaction.lock();
		if transaction.is_active() {
			debug!(id = transaction.id(), "aborting transaction of cancelled request");
			let _ = transaction.abort();
		}
	}

	fn name(&self) -> &str {
		match self.operator.as_ref() {
			Operator::Insert(_) => "insert",
			Operator::WritePartial(op) if op.is_delete() => "delete",
			Operator::WritePartial(_) => "update",
		}
	}
}
