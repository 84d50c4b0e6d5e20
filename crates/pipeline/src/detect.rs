//! Pose-frame adapters.
//!
//! A [`PoseDetector`] turns one decoded frame into a [`JointFrame`]. A
//! frame with no visible person is an all-absent joint frame, never an
//! error; errors mean the estimator itself is unusable, which fails the
//! whole job.
//!
//! The shipped [`SidecarPoseDetector`] drives an external estimator
//! process over a line protocol: one JSON header, then one raw RGB24
//! frame in and one JSON keypoint line out per frame. Any MediaPipe- or
//! MoveNet-style wrapper that speaks the protocol plugs in unchanged.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde::Deserialize;
use std::collections::HashMap;

use coverdrive_core::joints::{Joint, JointFrame, Keypoint};

use crate::error::AnalysisError;
use crate::source::Frame;

/// Per-frame pose estimation over a consistent coordinate space.
pub trait PoseDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<JointFrame, AnalysisError>;
}

// ---------------------------------------------------------------------------
// Sidecar wire format
// ---------------------------------------------------------------------------

/// One reply line from the sidecar: joint name -> `[x, y, confidence]`.
/// `joints` is `null` (or missing) when no person is visible.
#[derive(Debug, Deserialize)]
struct SidecarReply {
    #[serde(default)]
    joints: Option<HashMap<String, [f64; 3]>>,
}

/// Parse one sidecar reply line into a joint frame.
///
/// Joint names outside the closed enumeration are ignored, so estimators
/// with richer vocabularies (MediaPipe emits 33 landmarks) work as-is.
fn parse_reply(line: &str) -> Result<JointFrame, AnalysisError> {
    let reply: SidecarReply = serde_json::from_str(line.trim()).map_err(|e| {
        AnalysisError::DetectionUnavailable(format!("malformed sidecar reply: {e}"))
    })?;

    let mut joint_frame = JointFrame::empty();
    if let Some(joints) = reply.joints {
        for (name, [x, y, confidence]) in joints {
            if let Some(joint) = Joint::from_name(&name) {
                joint_frame.set(joint, Keypoint::new(x, y, confidence));
            }
        }
    }
    Ok(joint_frame)
}

// ---------------------------------------------------------------------------
// SidecarPoseDetector
// ---------------------------------------------------------------------------

/// Drives an external pose-estimation command as a long-lived child
/// process, one instance per job.
pub struct SidecarPoseDetector {
    command: Vec<String>,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout: Option<BufReader<ChildStdout>>,
    frame_dims: Option<(u32, u32)>,
}

impl SidecarPoseDetector {
    /// `command_line` is the estimator invocation, whitespace-split
    /// (e.g. `"python3 tools/pose_sidecar.py"`). The process is spawned
    /// lazily on the first frame, once the dimensions are known.
    pub fn new(command_line: &str) -> Self {
        Self {
            command: command_line.split_whitespace().map(str::to_string).collect(),
            child: None,
            stdin: None,
            stdout: None,
            frame_dims: None,
        }
    }

    fn start(&mut self, width: u32, height: u32) -> Result<(), AnalysisError> {
        let program = self.command.first().ok_or_else(|| {
            AnalysisError::DetectionUnavailable("no pose estimator command configured".into())
        })?;

        let mut child = Command::new(program)
            .args(&self.command[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                AnalysisError::DetectionUnavailable(format!(
                    "failed to start pose estimator '{program}': {e}"
                ))
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            AnalysisError::DetectionUnavailable("pose estimator stdin unavailable".into())
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            AnalysisError::DetectionUnavailable("pose estimator stdout unavailable".into())
        })?;

        // Header line: the fixed frame geometry for the whole stream.
        let header = format!("{{\"width\":{width},\"height\":{height}}}\n");
        stdin.write_all(header.as_bytes()).map_err(|e| {
            AnalysisError::DetectionUnavailable(format!("pose estimator rejected header: {e}"))
        })?;

        self.stdin = Some(stdin);
        self.stdout = Some(BufReader::new(stdout));
        self.child = Some(child);
        self.frame_dims = Some((width, height));

        tracing::debug!(command = %self.command.join(" "), width, height, "Pose sidecar started");
        Ok(())
    }
}

impl PoseDetector for SidecarPoseDetector {
    fn detect(&mut self, frame: &Frame) -> Result<JointFrame, AnalysisError> {
        let dims = (frame.width(), frame.height());
        if self.child.is_none() {
            self.start(dims.0, dims.1)?;
        }
        if self.frame_dims != Some(dims) {
            return Err(AnalysisError::DetectionUnavailable(format!(
                "frame geometry changed mid-stream: expected {:?}, got {dims:?}",
                self.frame_dims,
            )));
        }

        let stdin = self.stdin.as_mut().ok_or_else(|| {
            AnalysisError::DetectionUnavailable("pose estimator stdin closed".into())
        })?;
        stdin.write_all(frame.as_raw()).map_err(|e| {
            AnalysisError::DetectionUnavailable(format!("pose estimator stopped reading: {e}"))
        })?;
        stdin.flush().map_err(|e| {
            AnalysisError::DetectionUnavailable(format!("pose estimator pipe broke: {e}"))
        })?;

        let stdout = self.stdout.as_mut().ok_or_else(|| {
            AnalysisError::DetectionUnavailable("pose estimator stdout closed".into())
        })?;
        let mut line = String::new();
        let read = stdout.read_line(&mut line).map_err(|e| {
            AnalysisError::DetectionUnavailable(format!("failed reading pose estimator: {e}"))
        })?;
        if read == 0 {
            return Err(AnalysisError::DetectionUnavailable(
                "pose estimator exited mid-stream".into(),
            ));
        }

        parse_reply(&line)
    }
}

impl Drop for SidecarPoseDetector {
    fn drop(&mut self) {
        // Closing stdin lets a well-behaved sidecar exit on its own.
        self.stdin.take();
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn reply_with_joints_parses_into_frame() {
        let line = r#"{"joints": {
            "nose": [0.5, 0.2, 0.98],
            "left_knee": [0.42, 0.71, 0.87]
        }}"#;
        let frame = parse_reply(line).unwrap();

        let nose = frame.get(Joint::Nose).unwrap();
        assert_eq!(nose.x, 0.5);
        assert_eq!(nose.confidence, 0.98);
        assert!(frame.get(Joint::LeftKnee).is_some());
        assert!(frame.get(Joint::LeftElbow).is_none());
    }

    #[test]
    fn null_joints_mean_no_person() {
        let frame = parse_reply(r#"{"joints": null}"#).unwrap();
        assert!(!frame.any_detected());

        let frame = parse_reply(r#"{}"#).unwrap();
        assert!(!frame.any_detected());
    }

    #[test]
    fn unknown_joint_names_are_ignored() {
        let line = r#"{"joints": {
            "left_pinky": [0.1, 0.1, 0.9],
            "right_hip": [0.55, 0.5, 0.9]
        }}"#;
        let frame = parse_reply(line).unwrap();
        assert_eq!(frame.detected_count(), 1);
        assert!(frame.get(Joint::RightHip).is_some());
    }

    #[test]
    fn malformed_reply_is_detection_unavailable() {
        assert_matches!(
            parse_reply("not json at all"),
            Err(AnalysisError::DetectionUnavailable(_))
        );
    }

    #[test]
    fn missing_command_fails_on_first_frame() {
        let mut detector = SidecarPoseDetector::new("");
        let frame = Frame::new(4, 4);
        assert_matches!(
            detector.detect(&frame),
            Err(AnalysisError::DetectionUnavailable(_))
        );
    }
}
