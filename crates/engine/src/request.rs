// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::{Condvar, Mutex};
use tessera_type::Error;
use tracing::debug;

type CancelHook = Box<dyn FnOnce() + Send>;

/// State shared by every task of one request: cancellation, the first error
/// raised by any of its tasks, and the number of tasks still outstanding.
#[derive(Default)]
pub struct RequestContext {
	cancelled: AtomicBool,
	error: Mutex<Option<Error>>,
	hooks: Mutex<Vec<CancelHook>>,
	outstanding: AtomicUsize,
	idle: Mutex<()>,
	idle_signal: Condvar,
}

impl RequestContext {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancelled.load(Ordering::Acquire)
	}

	/// Marks the request cancelled and runs the registered hooks once.
	pub fn cancel(&self) {
		if self.cancelled.swap(true, Ordering::AcqRel) {
			return;
		}
		debug!("request cancelled");
		let hooks = std::mem::take(&mut *self.hooks.lock());
		for hook in hooks {
			hook();
		}
	}

	/// Runs `hook` when the request is cancelled, or right away if it already
	/// is.
	pub fn on_cancel(&self, hook: impl FnOnce() + Send + 'static) {
		if self.is_cancelled() {
			hook();
			return;
		}
		self.hooks.lock().push(Box::new(hook));
	}

	/// Keeps the first error; later ones are dropped.
	pub fn set_error(&self, error: Error) {
		let mut slot = self.error.lock();
		if slot.is_none() {
			*slot = Some(error);
		}
	}

	pub fn error(&self) -> Option<Error> {
		self.error.lock().clone()
	}

	pub fn take_error(&self) -> Option<Error> {
		self.error.lock().take()
	}

	pub(crate) fn task_started(&self) {
		self.outstanding.fetch_add(1, Ordering::AcqRel);
	}

	pub(crate) fn task_finished(&self) {
		if self.outstanding.fetch_sub(1, Ordering::AcqRel) == 1 {
			let _guard = self.idle.lock();
			self.idle_signal.notify_all();
		}
	}

	pub fn outstanding(&self) -> usize {
		self.outstanding.load(Ordering::Acquire)
	}

	pub(crate) fn wait_idle(&self) {
		let mut guard = self.idle.lock();
		while self.outstanding() > 0 {
			self.idle_signal.wait(&mut guard);
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::{Arc, atomic::AtomicUsize};

	use tessera_type::ErrorCode;

	use super::*;

	#[test]
	fn test_keeps_first_error() {
		let request = RequestContext::new();
		request.set_error(Error::new(ErrorCode::NotFound, "first"));
		request.set_error(Error::new(ErrorCode::Unknown, "second"));
		assert_eq!(request.error().map(|e| e.code()), Some(ErrorCode::NotFound));
		assert!(request.take_error().is_some());
		assert!(request.error().is_none());
	}

	#[test]
	fn test_cancel_runs_hooks_once() {
		let request = RequestContext::new();
		let calls = Arc::new(AtomicUsize::new(0));
		let counter = calls.clone();
		request.on_cancel(move || {
			counter.fetch_add(1, Ordering::SeqCst);
		});
		request.cancel();
		request.cancel();
		assert!(request.is_cancelled());
		assert_eq!(calls.load(Ordering::SeqCst), 1);

		let late = calls.clone();
		request.on_cancel(move || {
			late.fetch_add(1, Ordering::SeqCst);
		});
		assert_eq!(calls.load(Ordering::SeqCst), 2);
	}
}
