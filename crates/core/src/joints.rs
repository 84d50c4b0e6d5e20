//! Body-joint vocabulary and per-frame keypoint records.
//!
//! A [`JointFrame`] is a fixed-size record of optional keypoints keyed by
//! the closed [`Joint`] enumeration — one per video frame, discarded as
//! soon as its metrics are extracted so memory stays bounded per frame.

use serde::{Deserialize, Serialize};

/// Minimum detection confidence for a keypoint to count as detected.
///
/// Keypoints below this are treated exactly like missing ones; the metric
/// extractor never reads them.
pub const MIN_JOINT_CONFIDENCE: f64 = 0.5;

/// Named anatomical landmarks in normalized image coordinates.
///
/// The snake_case serde names double as the wire vocabulary of the pose
/// sidecar protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    Nose,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

impl Joint {
    /// Number of joints in the closed enumeration.
    pub const COUNT: usize = 17;

    /// Every joint, in declaration order.
    pub const ALL: [Joint; Joint::COUNT] = [
        Joint::Nose,
        Joint::LeftShoulder,
        Joint::RightShoulder,
        Joint::LeftElbow,
        Joint::RightElbow,
        Joint::LeftWrist,
        Joint::RightWrist,
        Joint::LeftHip,
        Joint::RightHip,
        Joint::LeftKnee,
        Joint::RightKnee,
        Joint::LeftAnkle,
        Joint::RightAnkle,
        Joint::LeftHeel,
        Joint::RightHeel,
        Joint::LeftFootIndex,
        Joint::RightFootIndex,
    ];

    /// The wire name of this joint (snake_case).
    pub fn name(self) -> &'static str {
        match self {
            Joint::Nose => "nose",
            Joint::LeftShoulder => "left_shoulder",
            Joint::RightShoulder => "right_shoulder",
            Joint::LeftElbow => "left_elbow",
            Joint::RightElbow => "right_elbow",
            Joint::LeftWrist => "left_wrist",
            Joint::RightWrist => "right_wrist",
            Joint::LeftHip => "left_hip",
            Joint::RightHip => "right_hip",
            Joint::LeftKnee => "left_knee",
            Joint::RightKnee => "right_knee",
            Joint::LeftAnkle => "left_ankle",
            Joint::RightAnkle => "right_ankle",
            Joint::LeftHeel => "left_heel",
            Joint::RightHeel => "right_heel",
            Joint::LeftFootIndex => "left_foot_index",
            Joint::RightFootIndex => "right_foot_index",
        }
    }

    /// Parse a wire name back into a joint.
    ///
    /// Returns `None` for names outside the enumeration, which lets callers
    /// ignore landmarks from richer estimators (MediaPipe emits 33).
    pub fn from_name(name: &str) -> Option<Joint> {
        Joint::ALL.iter().copied().find(|j| j.name() == name)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Which side of the body leads the shot.
///
/// A right-handed batter plays the cover drive with the left side forward,
/// so [`Side::Left`] is the default front side throughout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Left,
    Right,
}

impl Side {
    pub fn shoulder(self) -> Joint {
        match self {
            Side::Left => Joint::LeftShoulder,
            Side::Right => Joint::RightShoulder,
        }
    }

    pub fn elbow(self) -> Joint {
        match self {
            Side::Left => Joint::LeftElbow,
            Side::Right => Joint::RightElbow,
        }
    }

    pub fn wrist(self) -> Joint {
        match self {
            Side::Left => Joint::LeftWrist,
            Side::Right => Joint::RightWrist,
        }
    }

    pub fn hip(self) -> Joint {
        match self {
            Side::Left => Joint::LeftHip,
            Side::Right => Joint::RightHip,
        }
    }

    pub fn knee(self) -> Joint {
        match self {
            Side::Left => Joint::LeftKnee,
            Side::Right => Joint::RightKnee,
        }
    }

    pub fn heel(self) -> Joint {
        match self {
            Side::Left => Joint::LeftHeel,
            Side::Right => Joint::RightHeel,
        }
    }

    pub fn foot_index(self) -> Joint {
        match self {
            Side::Left => Joint::LeftFootIndex,
            Side::Right => Joint::RightFootIndex,
        }
    }
}

/// A single detected landmark: normalized position plus confidence in [0,1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
    pub confidence: f64,
}

impl Keypoint {
    pub fn new(x: f64, y: f64, confidence: f64) -> Self {
        Self { x, y, confidence }
    }

    /// The (x, y) position as a tuple for geometry helpers.
    pub fn position(self) -> (f64, f64) {
        (self.x, self.y)
    }
}

/// One video frame's worth of optional keypoints.
///
/// Immutable by convention once the pose adapter hands it over.
#[derive(Debug, Clone, Default)]
pub struct JointFrame {
    points: [Option<Keypoint>; Joint::COUNT],
}

impl JointFrame {
    /// An all-absent frame (no person visible).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn set(&mut self, joint: Joint, keypoint: Keypoint) {
        self.points[joint.index()] = Some(keypoint);
    }

    /// The raw keypoint, regardless of confidence.
    pub fn get(&self, joint: Joint) -> Option<Keypoint> {
        self.points[joint.index()]
    }

    /// The keypoint only if its confidence clears [`MIN_JOINT_CONFIDENCE`].
    pub fn detected(&self, joint: Joint) -> Option<Keypoint> {
        self.get(joint)
            .filter(|kp| kp.confidence >= MIN_JOINT_CONFIDENCE)
    }

    /// Whether the frame carries at least one confidently detected joint.
    pub fn any_detected(&self) -> bool {
        Joint::ALL.iter().any(|&j| self.detected(j).is_some())
    }

    /// Number of confidently detected joints.
    pub fn detected_count(&self) -> usize {
        Joint::ALL.iter().filter(|&&j| self.detected(j).is_some()).count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
