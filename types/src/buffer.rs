use std::fmt;

/// Monotonic edit counter for a [`SourceBuffer`].
///
/// The revision is the only correlation key between an analysis request and
/// the buffer state it was taken from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct Revision(u64);

impl Revision {
    /// Revision of a freshly created, never edited buffer.
    pub const INITIAL: Self = Self(0);

    #[must_use]
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }

    #[must_use]
    fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// The edited text together with the revision it corresponds to.
///
/// Fields are private; the only way to change the text is [`SourceBuffer::apply_edit`],
/// which always bumps the revision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceBuffer {
    text: String,
    revision: Revision,
}

impl SourceBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the text and return the new revision.
    ///
    /// Last write wins: the stored text is always the argument of the most
    /// recent call.
    pub fn apply_edit(&mut self, text: impl Into<String>) -> Revision {
        self.text = text.into();
        self.revision = self.revision.next();
        self.revision
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn revision(&self) -> Revision {
        self.revision
    }
}
