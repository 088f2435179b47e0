//! Decoration reconciler: the single writer of the editor's marker layer.

use lexlens_types::{Diagnostic, Marker, Revision};

use crate::surface::MarkerSink;

/// Result of offering a diagnostic list to the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// Markers were replaced wholesale with `count` new ones.
    Applied { count: usize },
    /// The list belongs to a superseded revision; markers were not touched.
    Stale { current: Revision },
}

pub(crate) struct DecorationReconciler<S> {
    sink: S,
    channel: String,
    /// Revision of the currently installed marker set.
    applied: Option<Revision>,
    installed: Vec<Diagnostic>,
}

impl<S: MarkerSink> DecorationReconciler<S> {
    pub fn new(sink: S, channel: String) -> Self {
        Self {
            sink,
            channel,
            applied: None,
            installed: Vec::new(),
        }
    }

    /// Install `diagnostics` if they were computed from `current`.
    ///
    /// Latest revision wins: a list for any revision other than `current`, or
    /// older than what is already installed, is discarded.
    pub fn reconcile(
        &mut self,
        diagnostics: Vec<Diagnostic>,
        for_revision: Revision,
        current: Revision,
    ) -> Reconciliation {
        let superseded = self.applied.is_some_and(|applied| for_revision < applied);
        if for_revision != current || superseded {
            tracing::debug!(
                revision = %for_revision,
                current = %current,
                "Discarding stale diagnostics"
            );
            return Reconciliation::Stale { current };
        }

        let markers: Vec<Marker> = diagnostics.iter().map(Marker::from).collect();
        let count = markers.len();
        self.sink.set_markers(&self.channel, markers);
        self.applied = Some(for_revision);
        self.installed = diagnostics;
        Reconciliation::Applied { count }
    }

    /// Remove every marker this reconciler installed.
    pub fn clear(&mut self) {
        self.sink.set_markers(&self.channel, Vec::new());
        self.installed.clear();
    }

    pub fn installed(&self) -> &[Diagnostic] {
        &self.installed
    }

    pub fn applied(&self) -> Option<Revision> {
        self.applied
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
