//! Cancellable background tasks.
//!
//! Every recurring or delayed operation is owned by a [`TaskHandle`]. Dropping
//! the handle aborts the task, so a timer can never outlive the view or
//! request that started it.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};

/// Sole owner of a spawned task.
///
/// The task is aborted when the handle is dropped or cancelled.
#[derive(Debug)]
pub struct TaskHandle<T> {
    handle: Option<JoinHandle<T>>,
}

impl<T: Send + 'static> TaskHandle<T> {
    /// Spawn `task` on the current tokio runtime.
    pub fn spawn<F>(task: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self {
            handle: Some(tokio::spawn(task)),
        }
    }
}

impl<T> TaskHandle<T> {
    /// Abort the task.
    pub fn cancel(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the task's result.
    ///
    /// Returns `None` if the task was aborted or panicked.
    pub async fn join(mut self) -> Option<T> {
        let handle = self.handle.take()?;
        handle.await.ok()
    }
}

impl<T> Drop for TaskHandle<T> {
    fn drop(&mut self) {
        self.abort();
    }
}

/// Runs only the last of a burst of calls, once the burst has been quiet
/// for the delay.
///
/// Each call supersedes the pending one, including one that has already
/// started running.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<TaskHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Schedule `task` to run after the delay, cancelling any earlier call.
    pub fn call<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Some(previous) = self.pending.take() {
            trace!("superseding pending call");
            previous.cancel();
        }

        let delay = self.delay;
        self.pending = Some(TaskHandle::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }));
    }

    /// Cancel the pending call, if any.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.cancel();
        }
    }

    /// Whether a call is waiting or running.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|p| !p.is_finished())
    }
}

/// Outcome of one polling attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep<T> {
    /// Not finished yet; poll again after the interval.
    Pending,
    /// Finished; stop polling with this result.
    Done(T),
}

/// Call `step` every `interval` until it returns [`PollStep::Done`].
///
/// The first attempt happens one interval after spawning. Dropping or
/// cancelling the returned handle stops polling.
pub fn poll_until<T, F, Fut>(interval: Duration, mut step: F) -> TaskHandle<T>
where
    T: Send + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = PollStep<T>> + Send,
{
    TaskHandle::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await; // First tick is immediate, skip it

        let mut attempt = 0u32;
        loop {
            ticker.tick().await;
            attempt += 1;
            match step().await {
                PollStep::Pending => trace!(attempt, "poll pending"),
                PollStep::Done(result) => {
                    debug!(attempt, "polling finished");
                    return result;
                }
            }
        }
    })
}
