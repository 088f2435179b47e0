//! DiagnosticsSession facade: public API consumed by the editor.
//!
//! The session owns every pipeline component for one edited buffer. Timer and
//! network work runs on spawned tasks; their results come back over a channel
//! and are applied only from `&mut self`, so the reconciler stays the single
//! writer of the decoration layer.
//!
//! Construction is the start boundary, [`DiagnosticsSession::dispose`] (or drop)
//! the end. No global editor handles.

use std::sync::Arc;

use tokio::sync::mpsc;

use lexlens_analysis::{Analysis, AnalysisError, Analyzer, normalize};
use lexlens_types::{Diagnostic, Marker, Revision, SourceBuffer, TokenSummary, status_string};

use crate::buffer::BufferState;
use crate::config::PipelineConfig;
use crate::reconciler::{DecorationReconciler, Reconciliation};
use crate::scheduler::{DebounceScheduler, Trigger};
use crate::surface::{MarkerSink, TokenPanel};

/// Channel capacity between analysis tasks and the session.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Completion of one analysis task, tagged with the revision it analyzed.
#[derive(Debug)]
struct AnalysisEvent {
    revision: Revision,
    result: Result<Analysis, AnalysisError>,
}

/// What happened to one completed analysis.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// Markers for `revision` are now installed.
    Applied { revision: Revision, count: usize },
    /// The buffer moved on before the reply arrived; reply discarded.
    Stale {
        revision: Revision,
        current: Revision,
    },
    /// The round-trip failed; installed markers are unchanged.
    Failed {
        revision: Revision,
        error: AnalysisError,
    },
}

impl PipelineOutcome {
    #[must_use]
    pub fn revision(&self) -> Revision {
        match self {
            Self::Applied { revision, .. }
            | Self::Stale { revision, .. }
            | Self::Failed { revision, .. } => *revision,
        }
    }
}

fn spawn_analysis<A: Analyzer>(
    analyzer: Arc<A>,
    event_tx: mpsc::Sender<AnalysisEvent>,
    snapshot: SourceBuffer,
) {
    let revision = snapshot.revision();
    tracing::debug!(revision = %revision, bytes = snapshot.text().len(), "Starting analysis");
    tokio::spawn(async move {
        let result = analyzer
            .analyze(snapshot.text().to_string())
            .await
            .and_then(normalize);
        // A closed channel means the session was disposed while we were in flight.
        let _ = event_tx.send(AnalysisEvent { revision, result }).await;
    });
}

/// One editor buffer wired to an analysis backend and a decoration layer.
pub struct DiagnosticsSession<A, S, P = ()> {
    buffer: BufferState,
    scheduler: DebounceScheduler,
    reconciler: DecorationReconciler<S>,
    panel: P,
    tokens: Option<TokenSummary>,
    analyzer: Arc<A>,
    event_rx: mpsc::Receiver<AnalysisEvent>,
    event_tx: mpsc::Sender<AnalysisEvent>,
}

impl<A: Analyzer, S: MarkerSink> DiagnosticsSession<A, S> {
    /// Start a session without a token panel.
    pub fn new(analyzer: A, sink: S, config: &PipelineConfig) -> Self {
        Self::with_panel(analyzer, sink, (), config)
    }
}

impl<A: Analyzer, S: MarkerSink, P: TokenPanel> DiagnosticsSession<A, S, P> {
    pub fn with_panel(analyzer: A, sink: S, panel: P, config: &PipelineConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let analyzer = Arc::new(analyzer);
        let buffer = BufferState::new();

        let trigger: Trigger = {
            let analyzer = Arc::clone(&analyzer);
            let event_tx = event_tx.clone();
            Arc::new(move |snapshot: SourceBuffer| {
                spawn_analysis(Arc::clone(&analyzer), event_tx.clone(), snapshot);
            })
        };
        let scheduler = DebounceScheduler::new(config.debounce(), buffer.subscribe(), trigger);

        tracing::info!(
            debounce_ms = config.debounce().as_millis(),
            channel = config.channel(),
            "Diagnostics session started"
        );

        Self {
            buffer,
            scheduler,
            reconciler: DecorationReconciler::new(sink, config.channel().to_string()),
            panel,
            tokens: None,
            analyzer,
            event_rx,
            event_tx,
        }
    }

    /// Record an edit and (re)arm the debounce timer.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn on_edit(&mut self, text: impl Into<String>) -> Revision {
        let revision = self.buffer.update(text.into());
        self.scheduler.notify(revision);
        revision
    }

    /// Skip the quiet period and analyze the current revision immediately.
    pub fn analyze_now(&mut self) -> Revision {
        self.scheduler.cancel();
        let snapshot = self.buffer.snapshot();
        let revision = snapshot.revision();
        spawn_analysis(Arc::clone(&self.analyzer), self.event_tx.clone(), snapshot);
        revision
    }

    /// Apply completed analyses, up to `budget`, without waiting.
    pub fn poll_events(&mut self, budget: usize) -> Vec<PipelineOutcome> {
        let mut outcomes = Vec::new();
        while outcomes.len() < budget {
            match self.event_rx.try_recv() {
                Ok(event) => outcomes.push(self.handle_event(event)),
                Err(mpsc::error::TryRecvError::Empty | mpsc::error::TryRecvError::Disconnected) => {
                    break;
                }
            }
        }
        outcomes
    }

    /// Wait for the next completed analysis and apply it.
    ///
    /// Returns `None` only if the event channel closed, which cannot happen
    /// while the session holds its own sender.
    pub async fn next_outcome(&mut self) -> Option<PipelineOutcome> {
        let event = self.event_rx.recv().await?;
        Some(self.handle_event(event))
    }

    fn handle_event(&mut self, event: AnalysisEvent) -> PipelineOutcome {
        let AnalysisEvent { revision, result } = event;
        let analysis = match result {
            Ok(analysis) => analysis,
            Err(error) => {
                tracing::warn!(
                    revision = %revision,
                    error = %error,
                    "Analysis failed; keeping installed markers"
                );
                return PipelineOutcome::Failed { revision, error };
            }
        };

        let (diagnostics, tokens) = analysis.into_parts();
        match self
            .reconciler
            .reconcile(diagnostics, revision, self.buffer.revision())
        {
            Reconciliation::Applied { count } => {
                if let Some(tokens) = tokens {
                    self.panel.show_tokens(&tokens);
                    self.tokens = Some(tokens);
                }
                tracing::info!(revision = %revision, count, "Diagnostics installed");
                PipelineOutcome::Applied { revision, count }
            }
            Reconciliation::Stale { current } => PipelineOutcome::Stale { revision, current },
        }
    }

    /// Latest buffer revision.
    #[must_use]
    pub fn revision(&self) -> Revision {
        self.buffer.revision()
    }

    #[must_use]
    pub fn buffer(&self) -> SourceBuffer {
        self.buffer.snapshot()
    }

    /// Diagnostics behind the currently installed markers.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.reconciler.installed()
    }

    /// Copy of the installed markers, in install order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Marker> {
        self.reconciler.installed().iter().map(Marker::from).collect()
    }

    /// Revision the installed markers were computed from.
    #[must_use]
    pub fn applied_revision(&self) -> Option<Revision> {
        self.reconciler.applied()
    }

    /// Compact "E:n W:m" summary of the installed diagnostics.
    #[must_use]
    pub fn status_string(&self) -> String {
        status_string(self.reconciler.installed())
    }

    /// Last token classification accepted by the reconciler.
    #[must_use]
    pub fn tokens(&self) -> Option<&TokenSummary> {
        self.tokens.as_ref()
    }

    /// Whether a debounce timer is armed.
    #[must_use]
    pub fn is_debouncing(&self) -> bool {
        self.scheduler.is_armed()
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        self.reconciler.sink()
    }

    #[must_use]
    pub fn panel(&self) -> &P {
        &self.panel
    }

    /// End the session: disarm the timer, clear the marker channel, and hand
    /// the decoration layer back to the caller.
    ///
    /// Analyses still in flight complete into a closed channel and are dropped.
    pub fn dispose(mut self) -> S {
        self.scheduler.cancel();
        self.reconciler.clear();
        tracing::info!(revision = %self.buffer.revision(), "Diagnostics session disposed");
        self.reconciler.into_sink()
    }
}
