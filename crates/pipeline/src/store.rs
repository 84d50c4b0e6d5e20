//! Job-record store.
//!
//! The orchestrator persists every state transition through this
//! abstraction instead of ambient shared state. Implementations must
//! support concurrent creation and independent per-id updates; each
//! method call is atomic, so a poller never observes a terminal status
//! before its result fields are in place.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::analyzer::AnalysisOutcome;
use crate::error::StoreError;
use crate::job::{AnalysisJob, JobId, JobStatus};

/// Create / read / update access to analysis job records.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a freshly submitted job.
    async fn create(&self, job: AnalysisJob) -> Result<(), StoreError>;

    /// Snapshot of one job.
    async fn get(&self, id: JobId) -> Result<AnalysisJob, StoreError>;

    /// Snapshots of every job, newest first.
    async fn list(&self) -> Result<Vec<AnalysisJob>, StoreError>;

    /// Flip a pending job to `processing`.
    async fn mark_processing(&self, id: JobId) -> Result<(), StoreError>;

    /// Publish a completed result: all result fields and the `completed`
    /// status land in one atomic update.
    async fn complete(&self, id: JobId, outcome: AnalysisOutcome) -> Result<(), StoreError>;

    /// Mark a job `failed` with a human-readable message.
    async fn fail(&self, id: JobId, message: &str) -> Result<(), StoreError>;
}

/// In-process store over a shared map; the default for a single-node
/// deployment and for tests.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<JobId, AnalysisJob>>,
}

impl InMemoryJobStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Apply `update` to a live (non-terminal) job under the write lock.
    ///
    /// Updates against terminal jobs are dropped: `completed` and
    /// `failed` admit no further transitions.
    async fn update_live<F>(&self, id: JobId, update: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut AnalysisJob),
    {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if job.status.is_terminal() {
            tracing::warn!(
                analysis_id = %id,
                status = job.status.as_str(),
                "Ignoring update to terminal job",
            );
            return Ok(());
        }
        update(job);
        Ok(())
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, job: AnalysisJob) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        jobs.insert(job.analysis_id, job);
        Ok(())
    }

    async fn get(&self, id: JobId) -> Result<AnalysisJob, StoreError> {
        let jobs = self.jobs.read().await;
        jobs.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    async fn list(&self) -> Result<Vec<AnalysisJob>, StoreError> {
        let jobs = self.jobs.read().await;
        let mut all: Vec<AnalysisJob> = jobs.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn mark_processing(&self, id: JobId) -> Result<(), StoreError> {
        self.update_live(id, |job| {
            job.status = JobStatus::Processing;
        })
        .await
    }

    async fn complete(&self, id: JobId, outcome: AnalysisOutcome) -> Result<(), StoreError> {
        self.update_live(id, |job| {
            job.scores = Some(outcome.board.scores);
            job.feedback = Some(outcome.board.feedback);
            job.metrics_summary = Some(outcome.summary);
            job.video_info = Some(outcome.video);
            job.completed_at = Some(chrono::Utc::now());
            job.status = JobStatus::Completed;
        })
        .await
    }

    async fn fail(&self, id: JobId, message: &str) -> Result<(), StoreError> {
        self.update_live(id, |job| {
            job.error_message = Some(message.to_string());
            job.completed_at = Some(chrono::Utc::now());
            job.status = JobStatus::Failed;
        })
        .await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    use coverdrive_core::aggregate::SequenceAggregator;
    use coverdrive_core::metrics::FrameMetrics;
    use coverdrive_core::scoring;

    use crate::source::VideoInfo;

    fn dummy_outcome() -> AnalysisOutcome {
        let mut agg = SequenceAggregator::new();
        for _ in 0..5 {
            agg.push(
                true,
                &FrameMetrics {
                    elbow_angle: Some(115.0),
                    spine_lean: Some(20.0),
                    head_alignment: Some(0.05),
                    foot_angle: Some(27.0),
                },
            );
        }
        let summary = agg.finish();
        let board = scoring::evaluate(&summary);
        AnalysisOutcome {
            video: VideoInfo {
                duration_seconds: 0.2,
                fps: 25.0,
                frames_total: summary.frames_total,
                frames_with_pose: summary.frames_with_pose,
            },
            summary,
            board,
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = InMemoryJobStore::new();
        let job = AnalysisJob::pending(JobId::new_v4());
        let id = job.analysis_id;

        store.create(job).await.unwrap();
        let got = store.get(id).await.unwrap();
        assert_eq!(got.analysis_id, id);
        assert_eq!(got.status, JobStatus::Pending);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = InMemoryJobStore::new();
        assert_matches!(
            store.get(JobId::new_v4()).await,
            Err(StoreError::NotFound(_))
        );
    }

    #[tokio::test]
    async fn complete_publishes_all_result_fields_at_once() {
        let store = InMemoryJobStore::new();
        let job = AnalysisJob::pending(JobId::new_v4());
        let id = job.analysis_id;
        store.create(job).await.unwrap();
        store.mark_processing(id).await.unwrap();

        store.complete(id, dummy_outcome()).await.unwrap();

        let got = store.get(id).await.unwrap();
        assert_eq!(got.status, JobStatus::Completed);
        assert!(got.scores.is_some());
        assert!(got.feedback.is_some());
        assert!(got.metrics_summary.is_some());
        assert!(got.video_info.is_some());
        assert!(got.completed_at.is_some());
        assert!(got.error_message.is_none());
    }

    #[tokio::test]
    async fn failed_job_keeps_its_message() {
        let store = InMemoryJobStore::new();
        let job = AnalysisJob::pending(JobId::new_v4());
        let id = job.analysis_id;
        store.create(job).await.unwrap();

        store.fail(id, "video source unusable: zero frames").await.unwrap();

        let got = store.get(id).await.unwrap();
        assert_eq!(got.status, JobStatus::Failed);
        assert_eq!(
            got.error_message.as_deref(),
            Some("video source unusable: zero frames")
        );
    }

    #[tokio::test]
    async fn terminal_jobs_admit_no_further_transitions() {
        let store = InMemoryJobStore::new();
        let job = AnalysisJob::pending(JobId::new_v4());
        let id = job.analysis_id;
        store.create(job).await.unwrap();
        store.fail(id, "broken").await.unwrap();

        // Attempts to move a failed job are dropped.
        store.mark_processing(id).await.unwrap();
        store.complete(id, dummy_outcome()).await.unwrap();

        let got = store.get(id).await.unwrap();
        assert_eq!(got.status, JobStatus::Failed);
        assert!(got.scores.is_none());
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = InMemoryJobStore::new();
        let mut ids = Vec::new();
        for i in 0..3 {
            let mut job = AnalysisJob::pending(JobId::new_v4());
            // Force distinct, ordered timestamps.
            job.created_at += chrono::Duration::seconds(i);
            ids.push(job.analysis_id);
            store.create(job).await.unwrap();
        }

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].analysis_id, ids[2]);
        assert_eq!(listed[2].analysis_id, ids[0]);
    }
}
