//! The single forward pass over one video.
//!
//! Strictly sequential: frame N+1 is not decoded or detected until frame
//! N's metrics are in the aggregator. Each frame is dropped as soon as
//! its joints are extracted, so memory stays bounded regardless of video
//! length. Runs inside the job's blocking task.

use coverdrive_core::aggregate::{MetricsSummary, SequenceAggregator};
use coverdrive_core::metrics::MetricExtractor;
use coverdrive_core::scoring::{self, ScoreBoard};

use crate::detect::PoseDetector;
use crate::error::AnalysisError;
use crate::source::{FrameSource, VideoInfo};

/// Log a progress line every this many frames.
const PROGRESS_LOG_INTERVAL: u64 = 25;

/// Everything a completed job publishes.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub summary: MetricsSummary,
    pub board: ScoreBoard,
    pub video: VideoInfo,
}

/// Run the full pipeline for one video: open the source, then per frame
/// detect -> extract -> aggregate, then evaluate.
///
/// A stream that yields zero frames is an acquisition error; poor pose
/// coverage is not — the evaluator's neutral fallback handles it and the
/// job still completes.
pub fn run_analysis<S, D>(
    mut source: S,
    mut detector: D,
    extractor: MetricExtractor,
) -> Result<AnalysisOutcome, AnalysisError>
where
    S: FrameSource,
    D: PoseDetector,
{
    let meta = source.open()?;
    tracing::info!(
        fps = meta.fps,
        duration_seconds = meta.duration_seconds,
        "Starting video analysis",
    );

    let mut aggregator = SequenceAggregator::new();
    while let Some(frame) = source.next_frame()? {
        let joints = detector.detect(&frame)?;
        let metrics = extractor.extract(&joints);
        aggregator.push(joints.any_detected(), &metrics);

        if aggregator.frames_total() % PROGRESS_LOG_INTERVAL == 0 {
            tracing::debug!(
                frames_total = aggregator.frames_total(),
                frames_with_pose = aggregator.frames_with_pose(),
                "Analysis progress",
            );
        }
    }

    if aggregator.frames_total() == 0 {
        return Err(AnalysisError::Acquisition(
            "video stream contains no frames".into(),
        ));
    }

    let summary = aggregator.finish();
    let board = scoring::evaluate(&summary);
    tracing::info!(
        frames_total = summary.frames_total,
        frames_with_pose = summary.frames_with_pose,
        "Video analysis complete",
    );

    Ok(AnalysisOutcome {
        video: VideoInfo {
            duration_seconds: meta.duration_seconds,
            fps: meta.fps,
            frames_total: summary.frames_total,
            frames_with_pose: summary.frames_with_pose,
        },
        summary,
        board,
    })
}
