//! Core domain types for lexlens.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the pipeline: the analysis client
//! produces [`Diagnostic`]s and [`TokenSummary`]s, the pipeline turns them into
//! [`Marker`]s keyed by [`Revision`].

mod buffer;
mod diagnostic;
mod tokens;

pub use buffer::{Revision, SourceBuffer};
pub use diagnostic::{Diagnostic, Marker, Severity, status_string};
pub use tokens::{TokenCategory, TokenSummary};
