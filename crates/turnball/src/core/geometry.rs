//! Small 2D helpers on top of `glam::Vec2`.

use glam::Vec2;

/// Below this length a vector counts as degenerate.
pub const DEGENERATE_LEN: f32 = 1e-6;

/// True when both components are finite numbers.
pub fn is_finite(v: Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

/// Unit vector in the direction of `v`, or `None` for zero / non-finite input.
pub fn direction(v: Vec2) -> Option<Vec2> {
    if !is_finite(v) {
        return None;
    }
    let len = v.length();
    if len < DEGENERATE_LEN {
        None
    } else {
        Some(v / len)
    }
}

/// Bounce `v` off a surface whose unit `normal` points back into play.
///
/// Only the approaching component is reflected, scaled by `restitution`; a
/// velocity already leaving the surface is returned unchanged.
pub fn reflect(v: Vec2, normal: Vec2, restitution: f32) -> Vec2 {
    let vn = v.dot(normal);
    if vn >= 0.0 {
        return v;
    }
    v - normal * vn * (1.0 + restitution)
}

/// Scale `v` down so its length does not exceed `max`.
pub fn clamp_length(v: Vec2, max: f32) -> Vec2 {
    let len_sq = v.length_squared();
    if len_sq > max * max && len_sq > 0.0 {
        v * (max / len_sq.sqrt())
    } else {
        v
    }
}

/// Distance from `point` to the segment `a`-`b`.
pub fn segment_point_distance(a: Vec2, b: Vec2, point: Vec2) -> f32 {
    let line = b - a;
    let len_sq = line.length_squared();
    if len_sq < 0.0001 {
        return a.distance(point);
    }
    // Project onto the line, clamped to the segment
    let t = ((point - a).dot(line) / len_sq).clamp(0.0, 1.0);
    (a + line * t).distance(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_rejects_zero_and_nan() {
        assert_eq!(direction(Vec2::ZERO), None);
        assert_eq!(direction(Vec2::new(f32::NAN, 1.0)), None);
        assert_eq!(direction(Vec2::new(f32::INFINITY, 0.0)), None);
        let d = direction(Vec2::new(3.0, 4.0)).unwrap();
        assert!((d - Vec2::new(0.6, 0.8)).length() < 1e-6);
    }

    #[test]
    fn reflect_only_approaching_velocity() {
        // Left wall: normal points right
        let v = reflect(Vec2::new(-10.0, 3.0), Vec2::X, 0.5);
        assert!((v - Vec2::new(5.0, 3.0)).length() < 1e-5);
        assert_eq!(reflect(Vec2::new(4.0, 1.0), Vec2::X, 0.5), Vec2::new(4.0, 1.0));
    }

    #[test]
    fn clamp_length_only_shrinks() {
        assert_eq!(clamp_length(Vec2::new(3.0, 4.0), 10.0), Vec2::new(3.0, 4.0));
        let v = clamp_length(Vec2::new(30.0, 40.0), 10.0);
        assert!((v.length() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let a = Vec2::ZERO;
        let b = Vec2::new(10.0, 0.0);
        assert!((segment_point_distance(a, b, Vec2::new(5.0, 3.0)) - 3.0).abs() < 1e-5);
        assert!((segment_point_distance(a, b, Vec2::new(-4.0, 3.0)) - 5.0).abs() < 1e-5);
    }
}
