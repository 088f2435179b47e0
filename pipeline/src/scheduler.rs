//! Debounce scheduler: coalesces edit bursts into one analysis trigger.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use lexlens_types::{Revision, SourceBuffer};

/// Callback run when the quiet period elapses, with the buffer as of fire time.
pub(crate) type Trigger = Arc<dyn Fn(SourceBuffer) + Send + Sync>;

/// At most one armed timer at a time; re-arming is the only cancellation.
///
/// Dropping the scheduler cancels the armed timer, so a disposed session can
/// never fire.
pub(crate) struct DebounceScheduler {
    quiet: Duration,
    buffer: watch::Receiver<SourceBuffer>,
    trigger: Trigger,
    pending: Option<JoinHandle<()>>,
}

impl DebounceScheduler {
    pub fn new(quiet: Duration, buffer: watch::Receiver<SourceBuffer>, trigger: Trigger) -> Self {
        Self {
            quiet,
            buffer,
            trigger,
            pending: None,
        }
    }

    /// Cancel any armed timer and arm a fresh one.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn notify(&mut self, revision: Revision) {
        self.cancel();

        let deadline = Instant::now() + self.quiet;
        let buffer = self.buffer.clone();
        let trigger = Arc::clone(&self.trigger);
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let snapshot = buffer.borrow().clone();
            tracing::debug!(
                armed_at = %revision,
                current = %snapshot.revision(),
                "Debounce timer fired"
            );
            trigger(snapshot);
        }));
    }

    /// Disarm the pending timer, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for DebounceScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
