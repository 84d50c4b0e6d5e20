//! Category scoring and coaching feedback.
//!
//! Deterministic, table-driven mapping from a [`MetricsSummary`] to five
//! 1–10 category scores. Threshold bands are constants so they can be
//! tested (and tuned) independently of the rest of the pipeline. Feedback
//! stays in coaching language; no raw numbers leak into it.

use serde::Serialize;

use crate::aggregate::MetricsSummary;

/// Score assigned when a category's input measurement is unavailable.
pub const NEUTRAL_SCORE: u8 = 5;

/// Minimum pose-bearing frames required to trust any summary metric.
///
/// Below this, every category falls back to [`NEUTRAL_SCORE`] and the
/// feedback says so; the job itself still completes.
pub const MIN_POSE_FRAMES: u64 = 3;

/// Weight of the swing-control score in the follow-through combination.
const FOLLOW_WEIGHT_SWING: f64 = 0.6;
/// Weight of the balance score in the follow-through combination.
const FOLLOW_WEIGHT_BALANCE: f64 = 0.4;

/// Head offset magnitude beyond which corrective feedback kicks in.
const HEAD_OFFSET_LIMIT: f64 = 0.2;

// ---------------------------------------------------------------------------
// Band tables
// ---------------------------------------------------------------------------

/// One scoring band: values in `lo..=hi` map to `score` with a fixed line
/// of feedback.
#[derive(Debug, Clone, Copy)]
pub struct ScoreBand {
    pub lo: f64,
    pub hi: f64,
    pub score: u8,
    pub feedback: &'static str,
}

/// An ordered band table plus the rule for values outside every band.
///
/// Bands are checked in order, most specific first. A value outside all of
/// them degrades stepwise with its distance from `ideal`:
/// `max(1, 6 - floor(|value - ideal| / 10))`, with a below/above advisory.
#[derive(Debug, Clone, Copy)]
pub struct RangeRule {
    pub bands: &'static [ScoreBand],
    pub ideal: f64,
    pub below: &'static str,
    pub above: &'static str,
}

impl RangeRule {
    /// Score a measured value against this table.
    pub fn apply(&self, value: f64) -> (u8, &'static str) {
        for band in self.bands {
            if value >= band.lo && value <= band.hi {
                return (band.score, band.feedback);
            }
        }
        let distance = (value - self.ideal).abs();
        let score = (6 - (distance / 10.0) as i64).clamp(1, 10) as u8;
        let advisory = if value < self.ideal { self.below } else { self.above };
        (score, advisory)
    }
}

/// Front-elbow angle bands (degrees at the elbow vertex).
pub const SWING_CONTROL_RULE: RangeRule = RangeRule {
    bands: &[
        ScoreBand {
            lo: 105.0,
            hi: 125.0,
            score: 9,
            feedback: "Good elbow positioning for controlled swing",
        },
        ScoreBand {
            lo: 90.0,
            hi: 135.0,
            score: 7,
            feedback: "Good elbow positioning for controlled swing",
        },
    ],
    ideal: 115.0,
    below: "Try to keep your front elbow higher during the shot",
    above: "Front elbow is too high, lower it slightly for better control",
};

/// Spine-lean bands (degrees from vertical).
pub const BALANCE_RULE: RangeRule = RangeRule {
    bands: &[
        ScoreBand {
            lo: 15.0,
            hi: 25.0,
            score: 9,
            feedback: "Good spine angle for balanced shot execution",
        },
        ScoreBand {
            lo: 10.0,
            hi: 30.0,
            score: 7,
            feedback: "Good spine angle for balanced shot execution",
        },
    ],
    ideal: 20.0,
    below: "Lean slightly forward for better balance and power",
    above: "Reduce forward lean to maintain better balance",
};

/// Front-foot direction bands (degrees from the pitch axis).
pub const FOOTWORK_RULE: RangeRule = RangeRule {
    bands: &[
        ScoreBand {
            lo: 20.0,
            hi: 35.0,
            score: 9,
            feedback: "Good foot positioning towards the target",
        },
        ScoreBand {
            lo: 15.0,
            hi: 45.0,
            score: 7,
            feedback: "Good foot positioning towards the target",
        },
    ],
    ideal: 27.5,
    below: "Try to point your front foot more towards the target",
    above: "Front foot is pointing too wide, align more towards the pitch",
};

// ---------------------------------------------------------------------------
// Feedback banks
// ---------------------------------------------------------------------------

const FOOTWORK_EXTRA: &str = "Focus on balanced weight transfer during the shot";
const SWING_EXTRA: &str = "Maintain smooth acceleration through the ball";

const HEAD_GOOD: &str = "Excellent head position over the front knee";
const HEAD_ADVICE: &str = "Keep your head more directly over your front knee";
const HEAD_ADVICE_WHY: &str = "This will improve balance and shot accuracy";

const FOLLOW_TOP: [&str; 2] = [
    "Excellent overall technique",
    "Continue practicing for consistency",
];
const FOLLOW_MID: [&str; 2] = [
    "Good technique with room for refinement",
    "Focus on identified weak areas",
];
const FOLLOW_LOW: [&str; 2] = [
    "Technique needs improvement",
    "Practice basic fundamentals regularly",
];

const UNAVAILABLE_FOOTWORK: &str =
    "Foot direction could not be measured; keep the batter's feet in frame";
const UNAVAILABLE_HEAD: &str =
    "Head position could not be measured; keep the head and front knee in frame";
const UNAVAILABLE_SWING: &str =
    "The front arm could not be tracked well enough to assess the swing";
const UNAVAILABLE_BALANCE: &str =
    "Body lean could not be measured; film side-on with the full body visible";
const UNAVAILABLE_FOLLOW: &str =
    "Follow-through could not be assessed without swing and balance readings";

const LOW_CONFIDENCE: &str =
    "Too few frames had a clear view of the batter; this result is low confidence";

// ---------------------------------------------------------------------------
// Score board
// ---------------------------------------------------------------------------

/// Integer scores in [1,10], one per coaching category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scores {
    pub footwork: u8,
    pub head_position: u8,
    pub swing_control: u8,
    pub balance: u8,
    pub follow_through: u8,
}

/// Ordered advisory lines per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub footwork: Vec<String>,
    pub head_position: Vec<String>,
    pub swing_control: Vec<String>,
    pub balance: Vec<String>,
    pub follow_through: Vec<String>,
}

/// The evaluator's complete output for one video.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreBoard {
    pub scores: Scores,
    pub feedback: Feedback,
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Map an aggregated summary to category scores and feedback.
///
/// Deterministic and side-effect-free. Absent metrics score
/// [`NEUTRAL_SCORE`] with feedback saying the measurement was unavailable;
/// a summary with fewer than [`MIN_POSE_FRAMES`] pose-bearing frames is
/// treated as insufficient across the board.
pub fn evaluate(summary: &MetricsSummary) -> ScoreBoard {
    if summary.frames_with_pose < MIN_POSE_FRAMES {
        return low_confidence_board();
    }

    let (footwork, mut footwork_fb) =
        range_category(summary.foot_angle, &FOOTWORK_RULE, UNAVAILABLE_FOOTWORK);
    if summary.foot_angle.is_some() {
        footwork_fb.push(FOOTWORK_EXTRA.to_string());
    }

    let (head_position, head_fb) = head_category(summary.head_alignment);

    let (swing_control, mut swing_fb) =
        range_category(summary.elbow_angle, &SWING_CONTROL_RULE, UNAVAILABLE_SWING);
    if summary.elbow_angle.is_some() {
        swing_fb.push(SWING_EXTRA.to_string());
    }

    let (balance, balance_fb) =
        range_category(summary.spine_lean, &BALANCE_RULE, UNAVAILABLE_BALANCE);

    let (follow_through, follow_fb) = follow_through_category(
        summary.elbow_angle.is_some() || summary.spine_lean.is_some(),
        swing_control,
        balance,
    );

    ScoreBoard {
        scores: Scores {
            footwork,
            head_position,
            swing_control,
            balance,
            follow_through,
        },
        feedback: Feedback {
            footwork: footwork_fb,
            head_position: head_fb,
            swing_control: swing_fb,
            balance: balance_fb,
            follow_through: follow_fb,
        },
    }
}

fn range_category(
    value: Option<f64>,
    rule: &RangeRule,
    unavailable: &str,
) -> (u8, Vec<String>) {
    match value {
        Some(v) => {
            let (score, line) = rule.apply(v);
            (score, vec![line.to_string()])
        }
        None => (NEUTRAL_SCORE, vec![unavailable.to_string()]),
    }
}

/// Head position: linear in the offset magnitude, higher when the head
/// stays over the front knee.
fn head_category(alignment: Option<f64>) -> (u8, Vec<String>) {
    match alignment {
        Some(offset) => {
            let magnitude = offset.abs();
            let score = (10.0 - magnitude * 10.0).round().clamp(1.0, 10.0) as u8;
            let feedback = if magnitude > HEAD_OFFSET_LIMIT {
                vec![HEAD_ADVICE.to_string(), HEAD_ADVICE_WHY.to_string()]
            } else {
                vec![HEAD_GOOD.to_string()]
            };
            (score, feedback)
        }
        None => (NEUTRAL_SCORE, vec![UNAVAILABLE_HEAD.to_string()]),
    }
}

/// Follow-through: weighted combination of the swing-control and balance
/// scores, reflecting how consistently the shot was completed.
fn follow_through_category(
    any_input_measured: bool,
    swing_control: u8,
    balance: u8,
) -> (u8, Vec<String>) {
    if !any_input_measured {
        return (NEUTRAL_SCORE, vec![UNAVAILABLE_FOLLOW.to_string()]);
    }

    let combined = FOLLOW_WEIGHT_SWING * f64::from(swing_control)
        + FOLLOW_WEIGHT_BALANCE * f64::from(balance);
    let score = combined.round().clamp(1.0, 10.0) as u8;

    let lines = if score >= 8 {
        FOLLOW_TOP
    } else if score >= 6 {
        FOLLOW_MID
    } else {
        FOLLOW_LOW
    };
    (score, lines.iter().map(|s| s.to_string()).collect())
}

fn low_confidence_board() -> ScoreBoard {
    let fb = || vec![LOW_CONFIDENCE.to_string()];
    ScoreBoard {
        scores: Scores {
            footwork: NEUTRAL_SCORE,
            head_position: NEUTRAL_SCORE,
            swing_control: NEUTRAL_SCORE,
            balance: NEUTRAL_SCORE,
            follow_through: NEUTRAL_SCORE,
        },
        feedback: Feedback {
            footwork: fb(),
            head_position: fb(),
            swing_control: fb(),
            balance: fb(),
            follow_through: fb(),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
