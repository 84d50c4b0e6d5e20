//! Analysis job records and the lifecycle vocabulary.

use serde::Serialize;

use coverdrive_core::aggregate::MetricsSummary;
use coverdrive_core::scoring::{Feedback, Scores};

use crate::source::VideoInfo;

/// Opaque job identity.
pub type JobId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Lifecycle states: `pending -> processing -> completed | failed`.
///
/// `completed` and `failed` are terminal; nothing transitions out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

/// One analysis request tracked through its lifecycle.
///
/// Serializes to the externally consumed result-record shape; the result
/// fields appear only once the job reaches a terminal state, and they are
/// populated before the status flips (write-then-publish).
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisJob {
    pub analysis_id: JobId,
    pub status: JobStatus,
    pub created_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<Scores>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics_summary: Option<MetricsSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_info: Option<VideoInfo>,
}

impl AnalysisJob {
    /// A freshly submitted job, before any frame has been read.
    pub fn pending(analysis_id: JobId) -> Self {
        Self {
            analysis_id,
            status: JobStatus::Pending,
            created_at: chrono::Utc::now(),
            completed_at: None,
            error_message: None,
            scores: None,
            feedback: None,
            metrics_summary: None,
            video_info: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
