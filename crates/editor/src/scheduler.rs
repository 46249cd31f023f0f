//! Deferred frame tasks with cancellation.
//!
//! Commands that touch the host view (focus, blur) defer the call to the
//! next frame. Each [`FrameTask`] carries a child of the scheduler's
//! [`CancellationToken`]; cancelling the scheduler (on editor destroy)
//! turns every queued task into a no-op.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// A unit of work deferred to the next frame.
pub struct FrameTask {
	label: &'static str,
	token: CancellationToken,
	run: Box<dyn FnOnce() + Send>,
}

impl FrameTask {
	/// Label used in logs.
	pub fn label(&self) -> &'static str {
		self.label
	}

	/// Returns true if the task will be skipped.
	pub fn is_cancelled(&self) -> bool {
		self.token.is_cancelled()
	}
}

#[derive(Default)]
struct Queue {
	tasks: VecDeque<FrameTask>,
	scheduled_total: u64,
	completed_total: u64,
	dropped_total: u64,
}

/// Queue of frame tasks owned by an editor.
pub struct FrameScheduler {
	queue: Mutex<Queue>,
	token: CancellationToken,
}

impl Default for FrameScheduler {
	fn default() -> Self {
		Self::new(CancellationToken::new())
	}
}

impl FrameScheduler {
	/// Creates a scheduler whose tasks are children of `token`.
	pub fn new(token: CancellationToken) -> Self {
		Self {
			queue: Mutex::new(Queue::default()),
			token,
		}
	}

	/// Queues `f` for the next frame.
	pub fn schedule(&self, label: &'static str, f: impl FnOnce() + Send + 'static) {
		let mut queue = self.queue.lock();
		if self.token.is_cancelled() {
			queue.dropped_total += 1;
			trace!(label, "frame.schedule after cancel");
			return;
		}
		queue.scheduled_total += 1;
		queue.tasks.push_back(FrameTask {
			label,
			token: self.token.child_token(),
			run: Box::new(f),
		});
		trace!(label, pending = queue.tasks.len(), "frame.schedule");
	}

	/// Runs every queued task, skipping cancelled ones.
	///
	/// Returns the number of tasks that ran. Tasks scheduled while running
	/// wait for the next frame.
	pub fn run_pending(&self) -> usize {
		let tasks = std::mem::take(&mut self.queue.lock().tasks);
		let mut ran = 0;
		let mut dropped = 0;
		for task in tasks {
			if task.is_cancelled() {
				dropped += 1;
				trace!(label = task.label, "frame.skip cancelled");
				continue;
			}
			(task.run)();
			ran += 1;
		}

		let mut queue = self.queue.lock();
		queue.completed_total += ran as u64;
		queue.dropped_total += dropped;
		if dropped > 0 {
			debug!(ran, dropped, "frame.run_pending");
		}
		ran
	}

	/// Cancels every queued and future task.
	pub fn cancel(&self) {
		self.token.cancel();
	}

	/// Returns true once [`cancel`](Self::cancel) was called.
	pub fn is_cancelled(&self) -> bool {
		self.token.is_cancelled()
	}

	/// Number of queued tasks.
	pub fn pending_count(&self) -> usize {
		self.queue.lock().tasks.len()
	}

	/// Total tasks accepted.
	pub fn scheduled_total(&self) -> u64 {
		self.queue.lock().scheduled_total
	}

	/// Total tasks run.
	pub fn completed_total(&self) -> u64 {
		self.queue.lock().completed_total
	}

	/// Total tasks skipped or refused after cancellation.
	pub fn dropped_total(&self) -> u64 {
		self.queue.lock().dropped_total
	}
}
