//! Per-frame biomechanical measurements.
//!
//! [`MetricExtractor::extract`] is a pure function over one frame's joints.
//! Every channel is `Some` only when all joints it depends on are detected
//! above [`MIN_JOINT_CONFIDENCE`] and its vectors are non-degenerate;
//! nothing is ever defaulted to zero.
//!
//! [`MIN_JOINT_CONFIDENCE`]: crate::joints::MIN_JOINT_CONFIDENCE

use serde::Serialize;

use crate::geometry;
use crate::joints::{Joint, JointFrame, Side};

/// The four instantaneous measurements of one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FrameMetrics {
    /// Angle at the front elbow (shoulder–elbow–wrist), degrees in [0,180].
    pub elbow_angle: Option<f64>,
    /// Hip-to-shoulder line vs the vertical axis, degrees; 0 = upright.
    pub spine_lean: Option<f64>,
    /// Signed nose-to-front-knee x offset, normalized by body scale.
    pub head_alignment: Option<f64>,
    /// Front heel-to-toe line vs the horizontal pitch axis, degrees.
    pub foot_angle: Option<f64>,
}

impl FrameMetrics {
    /// True when no channel could be measured.
    pub fn is_empty(&self) -> bool {
        self.elbow_angle.is_none()
            && self.spine_lean.is_none()
            && self.head_alignment.is_none()
            && self.foot_angle.is_none()
    }
}

/// Computes [`FrameMetrics`] for a configured front side.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricExtractor {
    front: Side,
}

impl MetricExtractor {
    pub fn new(front: Side) -> Self {
        Self { front }
    }

    /// Measure one frame. Infallible: missing joints produce absent
    /// channels, never errors.
    pub fn extract(&self, frame: &JointFrame) -> FrameMetrics {
        FrameMetrics {
            elbow_angle: self.elbow_angle(frame),
            spine_lean: self.spine_lean(frame),
            head_alignment: self.head_alignment(frame),
            foot_angle: self.foot_angle(frame),
        }
    }

    fn elbow_angle(&self, frame: &JointFrame) -> Option<f64> {
        let shoulder = frame.detected(self.front.shoulder())?;
        let elbow = frame.detected(self.front.elbow())?;
        let wrist = frame.detected(self.front.wrist())?;
        geometry::angle_at_vertex(shoulder.position(), elbow.position(), wrist.position())
    }

    fn spine_lean(&self, frame: &JointFrame) -> Option<f64> {
        let hip = side_midpoint(frame, Joint::LeftHip, Joint::RightHip)?;
        let shoulder = side_midpoint(frame, Joint::LeftShoulder, Joint::RightShoulder)?;
        geometry::lean_from_vertical(hip, shoulder)
    }

    fn head_alignment(&self, frame: &JointFrame) -> Option<f64> {
        let nose = frame.detected(Joint::Nose)?;
        let knee = frame.detected(self.front.knee())?;
        let scale = body_scale(frame)?;
        Some((nose.x - knee.x) / scale)
    }

    fn foot_angle(&self, frame: &JointFrame) -> Option<f64> {
        let heel = frame.detected(self.front.heel())?;
        let toe = frame.detected(self.front.foot_index())?;
        geometry::slope_from_horizontal(heel.position(), toe.position())
    }
}

/// Midpoint of a left/right joint pair, falling back to whichever single
/// side is detected. `None` only when neither side is usable.
fn side_midpoint(frame: &JointFrame, left: Joint, right: Joint) -> Option<(f64, f64)> {
    match (frame.detected(left), frame.detected(right)) {
        (Some(l), Some(r)) => Some(geometry::midpoint(l.position(), r.position())),
        (Some(l), None) => Some(l.position()),
        (None, Some(r)) => Some(r.position()),
        (None, None) => None,
    }
}

/// Resolution-independent body scale: shoulder width, falling back to hip
/// width. `None` when no pair is detected or the pair is degenerate.
fn body_scale(frame: &JointFrame) -> Option<f64> {
    const MIN_SCALE: f64 = 1e-6;

    let pair_width = |left: Joint, right: Joint| -> Option<f64> {
        let l = frame.detected(left)?;
        let r = frame.detected(right)?;
        let width = geometry::distance(l.position(), r.position());
        (width >= MIN_SCALE).then_some(width)
    };

    pair_width(Joint::LeftShoulder, Joint::RightShoulder)
        .or_else(|| pair_width(Joint::LeftHip, Joint::RightHip))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joints::Keypoint;

    const TOL: f64 = 1e-6;

    fn kp(x: f64, y: f64) -> Keypoint {
        Keypoint::new(x, y, 0.95)
    }

    /// A frame with every joint of a plausible left-forward stance.
    fn full_stance() -> JointFrame {
        let mut f = JointFrame::empty();
        f.set(Joint::Nose, kp(0.48, 0.20));
        f.set(Joint::LeftShoulder, kp(0.45, 0.35));
        f.set(Joint::RightShoulder, kp(0.55, 0.35));
        f.set(Joint::LeftElbow, kp(0.40, 0.45));
        f.set(Joint::LeftWrist, kp(0.38, 0.58));
        f.set(Joint::RightElbow, kp(0.60, 0.45));
        f.set(Joint::RightWrist, kp(0.62, 0.58));
        f.set(Joint::LeftHip, kp(0.46, 0.55));
        f.set(Joint::RightHip, kp(0.54, 0.55));
        f.set(Joint::LeftKnee, kp(0.44, 0.72));
        f.set(Joint::RightKnee, kp(0.56, 0.72));
        f.set(Joint::LeftAnkle, kp(0.43, 0.88));
        f.set(Joint::RightAnkle, kp(0.57, 0.88));
        f.set(Joint::LeftHeel, kp(0.42, 0.90));
        f.set(Joint::RightHeel, kp(0.58, 0.90));
        f.set(Joint::LeftFootIndex, kp(0.47, 0.92));
        f.set(Joint::RightFootIndex, kp(0.63, 0.92));
        f
    }

    #[test]
    fn full_stance_measures_all_channels() {
        let metrics = MetricExtractor::default().extract(&full_stance());
        assert!(metrics.elbow_angle.is_some());
        assert!(metrics.spine_lean.is_some());
        assert!(metrics.head_alignment.is_some());
        assert!(metrics.foot_angle.is_some());
    }

    #[test]
    fn right_angle_elbow_measures_ninety() {
        let mut f = JointFrame::empty();
        f.set(Joint::LeftShoulder, kp(0.0, 0.0));
        f.set(Joint::LeftElbow, kp(0.0, -1.0));
        f.set(Joint::LeftWrist, kp(1.0, -1.0));

        let metrics = MetricExtractor::default().extract(&f);
        assert!((metrics.elbow_angle.unwrap() - 90.0).abs() < TOL);
    }

    #[test]
    fn missing_wrist_means_absent_elbow_angle() {
        let full = full_stance();
        let mut f = JointFrame::empty();
        for joint in Joint::ALL {
            if joint == Joint::LeftWrist {
                continue;
            }
            if let Some(point) = full.get(joint) {
                f.set(joint, point);
            }
        }

        let metrics = MetricExtractor::default().extract(&f);
        assert!(metrics.elbow_angle.is_none());
        // Other channels are unaffected.
        assert!(metrics.spine_lean.is_some());
    }

    #[test]
    fn low_confidence_joint_means_absent_metric() {
        let mut f = JointFrame::empty();
        f.set(Joint::LeftShoulder, kp(0.0, 0.0));
        f.set(Joint::LeftElbow, Keypoint::new(0.0, -1.0, 0.2));
        f.set(Joint::LeftWrist, kp(1.0, -1.0));

        let metrics = MetricExtractor::default().extract(&f);
        assert!(metrics.elbow_angle.is_none());
    }

    #[test]
    fn upright_spine_leans_zero() {
        let mut f = JointFrame::empty();
        f.set(Joint::LeftHip, kp(0.0, 0.0));
        f.set(Joint::RightHip, kp(0.0, 0.0));
        f.set(Joint::LeftShoulder, kp(0.0, -1.0));
        f.set(Joint::RightShoulder, kp(0.0, -1.0));

        let metrics = MetricExtractor::default().extract(&f);
        assert!(metrics.spine_lean.unwrap().abs() < TOL);
    }

    #[test]
    fn spine_lean_falls_back_to_single_side() {
        let mut f = JointFrame::empty();
        f.set(Joint::LeftHip, kp(0.5, 0.6));
        f.set(Joint::LeftShoulder, kp(0.5, 0.3));

        let metrics = MetricExtractor::default().extract(&f);
        assert!(metrics.spine_lean.unwrap().abs() < TOL);
    }

    #[test]
    fn spine_lean_absent_without_any_hip() {
        let mut f = JointFrame::empty();
        f.set(Joint::LeftShoulder, kp(0.45, 0.35));
        f.set(Joint::RightShoulder, kp(0.55, 0.35));

        let metrics = MetricExtractor::default().extract(&f);
        assert!(metrics.spine_lean.is_none());
    }

    #[test]
    fn head_alignment_is_signed_and_scale_normalized() {
        let mut f = JointFrame::empty();
        f.set(Joint::Nose, kp(0.50, 0.2));
        f.set(Joint::LeftKnee, kp(0.40, 0.7));
        f.set(Joint::LeftShoulder, kp(0.40, 0.35));
        f.set(Joint::RightShoulder, kp(0.60, 0.35));

        let metrics = MetricExtractor::default().extract(&f);
        // Offset 0.10 over shoulder width 0.20 = +0.5, nose ahead of knee.
        assert!((metrics.head_alignment.unwrap() - 0.5).abs() < TOL);
    }

    #[test]
    fn head_alignment_absent_without_body_scale() {
        let mut f = JointFrame::empty();
        f.set(Joint::Nose, kp(0.50, 0.2));
        f.set(Joint::LeftKnee, kp(0.40, 0.7));

        let metrics = MetricExtractor::default().extract(&f);
        assert!(metrics.head_alignment.is_none());
    }

    #[test]
    fn flat_foot_measures_zero_angle() {
        let mut f = JointFrame::empty();
        f.set(Joint::LeftHeel, kp(0.40, 0.90));
        f.set(Joint::LeftFootIndex, kp(0.48, 0.90));

        let metrics = MetricExtractor::default().extract(&f);
        assert!(metrics.foot_angle.unwrap().abs() < TOL);
    }

    #[test]
    fn coincident_foot_joints_yield_absent_angle() {
        let mut f = JointFrame::empty();
        f.set(Joint::LeftHeel, kp(0.40, 0.90));
        f.set(Joint::LeftFootIndex, kp(0.40, 0.90));

        let metrics = MetricExtractor::default().extract(&f);
        assert!(metrics.foot_angle.is_none());
    }

    #[test]
    fn right_front_side_uses_right_joints() {
        let mut f = JointFrame::empty();
        f.set(Joint::RightShoulder, kp(0.0, 0.0));
        f.set(Joint::RightElbow, kp(0.0, -1.0));
        f.set(Joint::RightWrist, kp(1.0, -1.0));

        let left = MetricExtractor::new(Side::Left).extract(&f);
        let right = MetricExtractor::new(Side::Right).extract(&f);
        assert!(left.elbow_angle.is_none());
        assert!((right.elbow_angle.unwrap() - 90.0).abs() < TOL);
    }

    #[test]
    fn empty_frame_yields_empty_metrics() {
        let metrics = MetricExtractor::default().extract(&JointFrame::empty());
        assert!(metrics.is_empty());
    }
}
