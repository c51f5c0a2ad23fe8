//! Delayed tasks tied to a visualization's lifetime.

use std::time::Duration;

use leptos::prelude::{TimeoutHandle, set_timeout_with_handle};
use log::error;

/// Handle to a pending delayed task.
pub trait ScheduledTask {
	/// Prevents the task from running. Cancelling a task that already ran is a no-op.
	fn cancel(self);
}

/// Runs closures after a delay.
pub trait Scheduler {
	/// Cancellation handle.
	type Task: ScheduledTask;

	/// Runs `task` once after `delay`.
	fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> Self::Task;
}

/// Browser `setTimeout`, via Leptos.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimeoutScheduler;

/// A pending browser timeout.
pub struct Timeout(Option<TimeoutHandle>);

impl ScheduledTask for Timeout {
	fn cancel(self) {
		if let Some(handle) = self.0 {
			handle.clear();
		}
	}
}

impl Scheduler for TimeoutScheduler {
	type Task = Timeout;

	fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> Timeout {
		match set_timeout_with_handle(task, delay) {
			Ok(handle) => Timeout(Some(handle)),
			Err(e) => {
				error!("failed to schedule timeout: {:?}", e);
				Timeout(None)
			}
		}
	}
}
