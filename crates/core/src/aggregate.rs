//! Whole-video reduction of per-frame metrics.
//!
//! [`SequenceAggregator`] is a forward-only streaming reducer: frames are
//! pushed in playback order and never revisited. Each metric channel keeps
//! only the valid values it needs for its median, so memory is bounded by
//! the number of pose-bearing frames, not by video length times frame size.
//!
//! The reduction is the median. Transient misdetections produce spike
//! values on single frames; the median ignores them where a mean would not.

use serde::Serialize;

use crate::metrics::FrameMetrics;

/// One representative scalar per metric channel for an entire video.
///
/// A channel is `None` when no frame measured it — consumers must treat
/// that as "insufficient data", never as zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub elbow_angle: Option<f64>,
    pub spine_lean: Option<f64>,
    pub head_alignment: Option<f64>,
    pub foot_angle: Option<f64>,
    /// Every frame offered to the aggregator. Not serialized here; the
    /// result record reports coverage under `video_info`.
    #[serde(skip_serializing)]
    pub frames_total: u64,
    /// Frames where the pose adapter detected at least one joint.
    #[serde(skip_serializing)]
    pub frames_with_pose: u64,
}

/// Accumulator for one metric channel.
#[derive(Debug, Default)]
struct Channel {
    values: Vec<f64>,
}

impl Channel {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.values.push(v);
        }
    }

    /// Median of the collected values; `None` if the channel never saw one.
    fn median(mut self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        self.values.sort_unstable_by(f64::total_cmp);
        let mid = self.values.len() / 2;
        if self.values.len() % 2 == 1 {
            Some(self.values[mid])
        } else {
            Some((self.values[mid - 1] + self.values[mid]) / 2.0)
        }
    }
}

/// Streaming reducer over one video's frame metrics.
#[derive(Debug, Default)]
pub struct SequenceAggregator {
    frames_total: u64,
    frames_with_pose: u64,
    elbow: Channel,
    spine: Channel,
    head: Channel,
    foot: Channel,
}

impl SequenceAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one frame, in order. `pose_detected` is whether the pose
    /// adapter saw at least one joint in this frame.
    pub fn push(&mut self, pose_detected: bool, metrics: &FrameMetrics) {
        self.frames_total += 1;
        if pose_detected {
            self.frames_with_pose += 1;
        }
        self.elbow.push(metrics.elbow_angle);
        self.spine.push(metrics.spine_lean);
        self.head.push(metrics.head_alignment);
        self.foot.push(metrics.foot_angle);
    }

    /// Frames pushed so far.
    pub fn frames_total(&self) -> u64 {
        self.frames_total
    }

    /// Pose-bearing frames pushed so far.
    pub fn frames_with_pose(&self) -> u64 {
        self.frames_with_pose
    }

    /// Close the stream and reduce each channel to its median.
    pub fn finish(self) -> MetricsSummary {
        MetricsSummary {
            elbow_angle: self.elbow.median(),
            spine_lean: self.spine.median(),
            head_alignment: self.head.median(),
            foot_angle: self.foot.median(),
            frames_total: self.frames_total,
            frames_with_pose: self.frames_with_pose,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn elbow_only(angle: f64) -> FrameMetrics {
        FrameMetrics {
            elbow_angle: Some(angle),
            ..FrameMetrics::default()
        }
    }

    #[test]
    fn empty_stream_reports_all_absent() {
        let summary = SequenceAggregator::new().finish();
        assert_eq!(summary.frames_total, 0);
        assert_eq!(summary.frames_with_pose, 0);
        assert!(summary.elbow_angle.is_none());
        assert!(summary.spine_lean.is_none());
        assert!(summary.head_alignment.is_none());
        assert!(summary.foot_angle.is_none());
    }

    #[test]
    fn counts_total_and_pose_frames_independently() {
        let mut agg = SequenceAggregator::new();
        // 10 frames, 6 with pose.
        for i in 0..10 {
            let has_pose = i < 6;
            let metrics = if has_pose {
                elbow_only(110.0 + i as f64)
            } else {
                FrameMetrics::default()
            };
            agg.push(has_pose, &metrics);
        }

        let summary = agg.finish();
        assert_eq!(summary.frames_total, 10);
        assert_eq!(summary.frames_with_pose, 6);
        // Median over exactly the 6 valid values: 110..115 -> 112.5.
        assert_eq!(summary.elbow_angle, Some(112.5));
    }

    #[test]
    fn median_is_order_independent() {
        let values = [130.0, 95.0, 110.0, 170.0, 101.0];

        let mut forward = SequenceAggregator::new();
        for v in values {
            forward.push(true, &elbow_only(v));
        }
        let mut reversed = SequenceAggregator::new();
        for v in values.iter().rev() {
            reversed.push(true, &elbow_only(*v));
        }

        assert_eq!(
            forward.finish().elbow_angle,
            reversed.finish().elbow_angle
        );
    }

    #[test]
    fn median_resists_a_misdetection_spike() {
        let mut agg = SequenceAggregator::new();
        for v in [112.0, 114.0, 113.0, 179.9, 111.0] {
            agg.push(true, &elbow_only(v));
        }
        // Median 113.0; a mean would be pulled to ~126.
        assert_eq!(agg.finish().elbow_angle, Some(113.0));
    }

    #[test]
    fn even_count_median_averages_middle_pair() {
        let mut agg = SequenceAggregator::new();
        for v in [10.0, 20.0, 30.0, 40.0] {
            agg.push(true, &elbow_only(v));
        }
        assert_eq!(agg.finish().elbow_angle, Some(25.0));
    }

    #[test]
    fn channels_reduce_independently() {
        let mut agg = SequenceAggregator::new();
        agg.push(
            true,
            &FrameMetrics {
                elbow_angle: Some(115.0),
                spine_lean: None,
                head_alignment: Some(0.1),
                foot_angle: None,
            },
        );
        agg.push(
            true,
            &FrameMetrics {
                elbow_angle: None,
                spine_lean: Some(18.0),
                head_alignment: Some(0.3),
                foot_angle: None,
            },
        );

        let summary = agg.finish();
        assert_eq!(summary.elbow_angle, Some(115.0));
        assert_eq!(summary.spine_lean, Some(18.0));
        assert_eq!(summary.head_alignment, Some(0.2));
        assert!(summary.foot_angle.is_none());
    }

    #[test]
    fn pose_frame_without_metrics_still_counts_as_pose() {
        let mut agg = SequenceAggregator::new();
        agg.push(true, &FrameMetrics::default());

        let summary = agg.finish();
        assert_eq!(summary.frames_with_pose, 1);
        assert!(summary.elbow_angle.is_none());
    }

    #[test]
    fn summary_serializes_metric_channels_only() {
        let mut agg = SequenceAggregator::new();
        agg.push(true, &elbow_only(120.0));
        let summary = agg.finish();

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["elbow_angle"], 120.0);
        assert!(json["spine_lean"].is_null());
        assert!(json.get("frames_total").is_none());
        assert!(json.get("frames_with_pose").is_none());
    }
}
