//! The job orchestrator.
//!
//! One independent background unit of work per submitted video. The
//! lifecycle contract pollers rely on:
//!
//! - `submit` returns once the `pending` record is stored;
//! - the worker flips the record to `processing` before reading a frame;
//! - terminal states are committed with their result fields in one store
//!   update, so no poller sees a half-populated record;
//! - no retries, no cancellation — a failed job is resubmitted as a new
//!   one by the caller.

use std::sync::Arc;

use coverdrive_core::joints::Side;
use coverdrive_core::metrics::MetricExtractor;

use crate::analyzer::run_analysis;
use crate::detect::PoseDetector;
use crate::error::StoreError;
use crate::job::{AnalysisJob, JobId};
use crate::source::FrameSource;
use crate::store::JobStore;

/// Submits analysis jobs and answers status polls.
#[derive(Clone)]
pub struct AnalysisEngine {
    store: Arc<dyn JobStore>,
    extractor: MetricExtractor,
}

impl AnalysisEngine {
    /// Engine with the default front side (left — right-handed batter).
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self {
            store,
            extractor: MetricExtractor::default(),
        }
    }

    /// Override the batter's front side.
    pub fn with_front_side(mut self, front: Side) -> Self {
        self.extractor = MetricExtractor::new(front);
        self
    }

    /// Create a `pending` job and start its background run. Returns as
    /// soon as the record is stored; the analysis itself proceeds on a
    /// blocking worker thread.
    pub async fn submit<S, D>(&self, source: S, detector: D) -> Result<JobId, StoreError>
    where
        S: FrameSource + 'static,
        D: PoseDetector + 'static,
    {
        let job = AnalysisJob::pending(JobId::new_v4());
        let id = job.analysis_id;
        self.store.create(job).await?;

        let store = Arc::clone(&self.store);
        let extractor = self.extractor;
        tokio::spawn(async move {
            run_job(store, id, source, detector, extractor).await;
        });

        tracing::info!(analysis_id = %id, "Analysis job submitted");
        Ok(id)
    }

    /// Snapshot of one job; `StoreError::NotFound` for unknown ids.
    pub async fn get_status(&self, id: JobId) -> Result<AnalysisJob, StoreError> {
        self.store.get(id).await
    }

    /// Snapshots of all jobs, newest first.
    pub async fn list_jobs(&self) -> Result<Vec<AnalysisJob>, StoreError> {
        self.store.list().await
    }
}

/// The background unit of work for one job id.
async fn run_job<S, D>(
    store: Arc<dyn JobStore>,
    id: JobId,
    source: S,
    detector: D,
    extractor: MetricExtractor,
) where
    S: FrameSource + 'static,
    D: PoseDetector + 'static,
{
    if let Err(e) = store.mark_processing(id).await {
        tracing::error!(analysis_id = %id, error = %e, "Could not mark job processing");
        return;
    }

    let result =
        tokio::task::spawn_blocking(move || run_analysis(source, detector, extractor)).await;

    let commit = match result {
        Ok(Ok(outcome)) => store.complete(id, outcome).await,
        Ok(Err(err)) => {
            tracing::error!(analysis_id = %id, error = %err, "Analysis job failed");
            store.fail(id, &err.to_string()).await
        }
        Err(join_err) => {
            tracing::error!(analysis_id = %id, error = %join_err, "Analysis worker panicked");
            store.fail(id, "analysis worker panicked").await
        }
    };

    if let Err(e) = commit {
        tracing::error!(analysis_id = %id, error = %e, "Could not record job outcome");
    }
}
