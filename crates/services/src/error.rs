//! Shared error types for the services crate.

use thiserror::Error;

use prep_core::model::SessionRecordError;

/// Errors emitted by `PracticeService`.
///
/// Selection, readiness, weak-topic, and booster queries are total functions
/// over the progress record, so only session recording can fail.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PracticeError {
    #[error(transparent)]
    Session(#[from] SessionRecordError),
}
