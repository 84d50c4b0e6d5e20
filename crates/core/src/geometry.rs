//! Planar geometry over normalized image coordinates.
//!
//! All angles are reported in degrees. Degenerate inputs (coincident
//! points) yield `None` instead of dividing by zero — a missing metric,
//! not a fault.

/// Vectors shorter than this are considered zero-length.
const EPS: f64 = 1e-9;

/// Angle at `vertex` between the vectors vertex→a and vertex→b, in [0,180].
///
/// Invariant under uniform scaling and rigid motion of the three points.
pub fn angle_at_vertex(
    a: (f64, f64),
    vertex: (f64, f64),
    b: (f64, f64),
) -> Option<f64> {
    let v1 = (a.0 - vertex.0, a.1 - vertex.1);
    let v2 = (b.0 - vertex.0, b.1 - vertex.1);

    let mag1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let mag2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();
    if mag1 < EPS || mag2 < EPS {
        return None;
    }

    let cos = ((v1.0 * v2.0 + v1.1 * v2.1) / (mag1 * mag2)).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

/// Angle of the base→tip vector away from the vertical axis, in [0,90].
///
/// 0° means tip is directly above (or below) base.
pub fn lean_from_vertical(base: (f64, f64), tip: (f64, f64)) -> Option<f64> {
    let dx = tip.0 - base.0;
    let dy = tip.1 - base.1;
    if dx.abs() < EPS && dy.abs() < EPS {
        return None;
    }
    Some(dx.abs().atan2(dy.abs()).to_degrees())
}

/// Angle of the from→to vector away from the horizontal axis, in [0,90].
pub fn slope_from_horizontal(from: (f64, f64), to: (f64, f64)) -> Option<f64> {
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    if dx.abs() < EPS && dy.abs() < EPS {
        return None;
    }
    Some(dy.abs().atan2(dx.abs()).to_degrees())
}

/// Midpoint of two points.
pub fn midpoint(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
    ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}

/// Euclidean distance between two points.
pub fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    (dx * dx + dy * dy).sqrt()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
