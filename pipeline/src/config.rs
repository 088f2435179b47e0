use std::time::Duration;

use serde::Deserialize;

/// Quiet period used when none is configured.
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;

const MIN_DEBOUNCE_MS: u64 = 50;
const MAX_DEBOUNCE_MS: u64 = 10_000;

/// Marker channel the pipeline owns in the editor's decoration layer.
pub const DEFAULT_CHANNEL: &str = "lexlens";

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_channel() -> String {
    DEFAULT_CHANNEL.to_string()
}

/// Pipeline tuning (`[pipeline]` table).
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Quiet period after the last edit before analysis runs.
    #[serde(default = "default_debounce_ms")]
    debounce_ms: u64,
    #[serde(default = "default_channel")]
    channel: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            channel: default_channel(),
        }
    }
}

impl PipelineConfig {
    /// Debounce interval, clamped to a sane range.
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms.clamp(MIN_DEBOUNCE_MS, MAX_DEBOUNCE_MS))
    }

    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    #[must_use]
    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }
}
