//! Capabilities the pipeline consumes from the editor: the decoration layer
//! and the read-only token panel.

use std::collections::HashMap;

use lexlens_types::{Marker, TokenSummary};

/// The editor's decoration API.
///
/// `set_markers` replaces the whole marker set of `channel` in one call; an
/// empty list clears the channel.
pub trait MarkerSink {
    fn set_markers(&mut self, channel: &str, markers: Vec<Marker>);
}

/// Receives the token classification of every accepted analysis.
pub trait TokenPanel {
    fn show_tokens(&mut self, tokens: &TokenSummary);
}

/// No panel attached.
impl TokenPanel for () {
    fn show_tokens(&mut self, _tokens: &TokenSummary) {}
}

/// In-memory decoration layer, keyed by channel.
#[derive(Debug, Default)]
pub struct MarkerLayer {
    channels: HashMap<String, Vec<Marker>>,
    installs: usize,
}

impl MarkerLayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn markers(&self, channel: &str) -> &[Marker] {
        self.channels
            .get(channel)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of `set_markers` calls received so far.
    #[must_use]
    pub fn installs(&self) -> usize {
        self.installs
    }
}

impl MarkerSink for MarkerLayer {
    fn set_markers(&mut self, channel: &str, markers: Vec<Marker>) {
        self.installs += 1;
        if markers.is_empty() {
            self.channels.remove(channel);
        } else {
            self.channels.insert(channel.to_string(), markers);
        }
    }
}
