//! Planar joint geometry over normalized image coordinates.

pub use point::Point;

use num_traits::ToPrimitive;

mod point;

const MIN_RAY_LENGTH: f32 = 1e-6;

/// Angle at vertex `b` between the rays `b -> a` and `b -> c`, rounded to the
/// nearest whole degree.
///
/// Absent points and zero-length rays give 0 rather than an error or NaN.
pub fn angle_at(a: Option<Point>, b: Option<Point>, c: Option<Point>) -> u16 {
    let (a, b, c) = match (a, b, c) {
        (Some(a), Some(b), Some(c)) => (a, b, c),
        _ => return 0,
    };
    let ba = a - b;
    let bc = c - b;
    let norms = ba.norm() * bc.norm();
    if ba.norm() < MIN_RAY_LENGTH || bc.norm() < MIN_RAY_LENGTH || !norms.is_finite() {
        return 0;
    }

    // rounding error can push the cosine just past +-1
    let cosine = (ba.dot(bc) / norms).clamp(-1.0, 1.0);
    cosine.acos().to_degrees().round().to_u16().unwrap_or(0)
}

/// Euclidean distance between two points, 0 when either is absent.
pub fn distance(a: Option<Point>, b: Option<Point>) -> f32 {
    match (a, b) {
        (Some(a), Some(b)) => a.squared_distance(b).sqrt(),
        _ => 0.0,
    }
}
