//! Incremental diagnostics pipeline for one edited buffer.
//!
//! # Architecture
//!
//! ```text
//! on_edit() -> BufferState (revision + 1) -> DebounceScheduler (re-arm)
//!                                                  |
//!                                       quiet period elapses
//!                                                  v
//!                               spawned task: Analyzer::analyze + normalize
//!                                                  |
//!                                            event channel
//!                                                  v
//! poll_events() / next_outcome() -> DecorationReconciler -> MarkerSink
//! ```
//!
//! Only the newest revision's diagnostics are ever installed. Replies for
//! superseded revisions are discarded, and failed round-trips leave the
//! installed markers untouched.

mod buffer;
mod config;
mod reconciler;
mod scheduler;
mod session;
mod surface;

pub use config::{DEFAULT_CHANNEL, DEFAULT_DEBOUNCE_MS, PipelineConfig};
pub use reconciler::Reconciliation;
pub use session::{DiagnosticsSession, PipelineOutcome};
pub use surface::{MarkerLayer, MarkerSink, TokenPanel};
