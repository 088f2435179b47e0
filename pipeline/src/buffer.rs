//! Buffer state: the session's single copy of the edited text.

use tokio::sync::watch;

use lexlens_types::{Revision, SourceBuffer};

/// Owns the [`SourceBuffer`] and publishes every edit to subscribers.
///
/// Subscribers (the debounce timer) always observe the latest buffer, which is
/// what lets a timer armed at revision N analyze revision N+k when it fires.
pub(crate) struct BufferState {
    tx: watch::Sender<SourceBuffer>,
}

impl BufferState {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SourceBuffer::new());
        Self { tx }
    }

    /// Store `text` and return the new, strictly greater revision.
    pub fn update(&self, text: String) -> Revision {
        let mut revision = Revision::INITIAL;
        self.tx.send_modify(|buffer| revision = buffer.apply_edit(text));
        revision
    }

    pub fn revision(&self) -> Revision {
        self.tx.borrow().revision()
    }

    pub fn snapshot(&self) -> SourceBuffer {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SourceBuffer> {
        self.tx.subscribe()
    }
}
