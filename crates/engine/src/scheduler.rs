// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Task-parallel execution of request steps.
//!
//! Tasks run on a fixed pool of worker threads fed from one channel, or
//! inline on the waiting thread in single-threaded mode. A task that yields
//! is queued again behind the tasks already waiting.

use std::{
	collections::VecDeque,
	sync::Arc,
	thread::{self, JoinHandle},
};

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;
use tessera_type::{internal_error, return_internal_error};
use tracing::{debug, trace, warn};

use crate::{config::SchedulerConfig, request::RequestContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskResult {
	Complete,
	/// run again later
	Yield,
}

/// A unit of work belonging to one request.
pub trait Task: Send {
	fn run(&mut self, request: &RequestContext) -> tessera_type::Result<TaskResult>;

	/// Called instead of [`run`](Self::run) once the request is cancelled.
	fn cancelled(&mut self) {}

	fn name(&self) -> &str {
		"task"
	}
}

struct Job {
	request: Arc<RequestContext>,
	task: Box<dyn Task>,
}

enum Message {
	Run(Job),
	Shutdown,
}

pub struct TaskScheduler {
	config: SchedulerConfig,
	sender: Sender<Message>,
	workers: Vec<JoinHandle<()>>,
	inline: Mutex<VecDeque<Job>>,
}

impl TaskScheduler {
	pub fn new(config: SchedulerConfig) -> tessera_type::Result<Self> {
		let (sender, receiver) = unbounded();
		let mut workers = Vec::new();
		if !config.single_threaded {
			for index in 0..config.thread_count.max(1) {
				let (sender, receiver) = (sender.clone(), receiver.clone());
				let spawned = thread::Builder::new()
					.name(format!("tessera-worker-{index}"))
					.spawn(move || worker_loop(receiver, sender));
				match spawned {
					Ok(worker) => workers.push(worker),
					Err(err) => return_internal_error!("failed to spawn worker {}: {}", index, err),
				}
			}
		}
		debug!(workers = workers.len(), single_threaded = config.single_threaded, "scheduler started");
		Ok(Self {
			config,
			sender,
			workers,
			inline: Mutex::new(VecDeque::new()),
		})
	}

	pub fn config(&self) -> &SchedulerConfig {
		&self.config
	}

	pub fn is_single_threaded(&self) -> bool {
		self.workers.is_empty()
	}

	pub fn schedule(&self, request: &Arc<RequestContext>, task: impl Task + 'static) {
		request.task_started();
		let job = Job {
			request: Arc::clone(request),
			task: Box::new(task),
		};
		trace!(task = job.task.name(), "scheduled");
		if self.is_single_threaded() {
			self.inline.lock().push_back(job);
			return;
		}
		if let Err(err) = self.sender.send(Message::Run(job)) {
			if let Message::Run(job) = err.into_inner() {
				job.request.set_error(internal_error!("scheduler queue closed").into());
				job.request.task_finished();
			}
		}
	}

	/// Blocks until every task of `request` has finished, then returns the
	/// first error any of them raised.
	pub fn wait(&self, request: &RequestContext) -> tessera_type::Result<()> {
		if self.is_single_threaded() {
			loop {
				let Some(job) = self.inline.lock().pop_front() else {
					break;
				};
				if let Some(job) = execute(job) {
					self.inline.lock().push_back(job);
				}
			}
		}
		request.wait_idle();
		match request.take_error() {
			Some(err) => Err(err),
			None => Ok(()),
		}
	}
}

impl Drop for TaskScheduler {
	fn drop(&mut self) {
		for _ in &self.workers {
			let _ = self.sender.send(Message::Shutdown);
		}
		for worker in self.workers.drain(..) {
			let _ = worker.join();
		}
		debug!("scheduler stopped");
	}
}

fn worker_loop(receiver: Receiver<Message>, sender: Sender<Message>) {
	while let Ok(message) = receiver.recv() {
		match message {
			Message::Run(job) => {
				if let Some(job) = execute(job) {
					let _ = sender.send(Message::Run(job));
				}
			}
			Message::Shutdown => break,
		}
	}
}

/// Runs one step of a job; returns it when it yielded.
fn execute(mut job: Job) -> Option<Job> {
	if job.request.is_cancelled() {
		trace!(task = job.task.name(), "skipped, request cancelled");
		job.task.cancelled();
		job.request.task_finished();
		return None;
	}
	match job.task.run(&job.request) {
		Ok(TaskResult::Complete) => {
			job.request.task_finished();
			None
		}
		Ok(TaskResult::Yield) => Some(job),
		Err(err) => {
			warn!(task = job.task.name(), error = %err, "task failed");
			job.request.set_error(err);
			job.request.cancel();
			job.task.cancelled();
			job.request.task_finished();
			None
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};

	use tessera_type::{Error, ErrorCode};

	use super::*;

	struct Counter {
		remaining: usize,
		total: Arc<AtomicUsize>,
	}

	impl Task for Counter {
		fn run(&mut self, _request: &RequestContext) -> tessera_type::Result<TaskResult> {
			self.total.fetch_add(1, Ordering::SeqCst);
			if self.remaining == 0 {
				return Ok(TaskResult::Complete);
			}
			self.remaining -= 1;
			Ok(TaskResult::Yield)
		}
	}

	struct Failing;

	impl Task for Failing {
		fn run(&mut self, _request: &RequestContext) -> tessera_type::Result<TaskResult> {
			Err(Error::new(ErrorCode::NotFound, "missing"))
		}
	}

	fn run_counters(config: SchedulerConfig) {
		let scheduler = TaskScheduler::new(config).unwrap();
		let request = Arc::new(RequestContext::new());
		let total = Arc::new(AtomicUsize::new(0));
		for _ in 0..4 {
			scheduler.schedule(
				&request,
				Counter {
					remaining: 2,
					total: total.clone(),
				},
			);
		}
		scheduler.wait(&request).unwrap();
		assert_eq!(total.load(Ordering::SeqCst), 12);
		assert_eq!(request.outstanding(), 0);
	}

	#[test]
	fn test_single_threaded_yields() {
		run_counters(SchedulerConfig::single_threaded());
	}

	#[test]
	fn test_pool_yields() {
		run_counters(SchedulerConfig::default().with_thread_count(3));
	}

	#[test]
	fn test_error_cancels_request() {
		let scheduler = TaskScheduler::new(SchedulerConfig::single_threaded()).unwrap();
		let request = Arc::new(RequestContext::new());
		let total = Arc::new(AtomicUsize::new(0));
		scheduler.schedule(&request, Failing);
		scheduler.schedule(
			&request,
			Counter {
				remaining: 0,
				total: total.clone(),
			},
		);
		let err = scheduler.wait(&request).unwrap_err();
		assert_eq!(err.code(), ErrorCode::NotFound);
		assert!(request.is_cancelled());
		assert_eq!(total.load(Ordering::SeqCst), 0);
	}
}
