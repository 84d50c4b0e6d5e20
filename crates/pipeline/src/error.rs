//! Error taxonomy of the analysis pipeline.

use crate::job::JobId;

/// Unrecoverable failures of one analysis run.
///
/// Either variant marks the whole job `failed`. A frame with no visible
/// person is NOT an error — the pose adapter reports it as an all-absent
/// joint frame and the metrics stay in-band absent.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// The frame source is unusable: missing file, unreadable container,
    /// a stream that yields no frames.
    #[error("video source unusable: {0}")]
    Acquisition(String),

    /// The pose estimator cannot run at all (failed to start, died
    /// mid-stream, spoke garbage).
    #[error("pose detection unavailable: {0}")]
    DetectionUnavailable(String),
}

/// Failures of the job-record store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No job with the given id. A caller error on status lookups, not a
    /// job failure.
    #[error("analysis job not found: {0}")]
    NotFound(JobId),
}
