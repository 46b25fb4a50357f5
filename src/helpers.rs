//! Utility functions shared by the simulators

use bevy::prelude::*;

use crate::constants::{MAX_RATING, MIN_RATING, STAT_MAX, STAT_MIN};

/// Map a rating onto 0.0 (MIN_RATING) ..= 1.0 (MAX_RATING)
pub fn normalize_rating(rating: f32) -> f32 {
    ((rating - MIN_RATING) / (MAX_RATING - MIN_RATING)).clamp(0.0, 1.0)
}

/// Clamp a rounded stat value into the legal stat range
pub fn clamp_stat(value: f32) -> u8 {
    if !value.is_finite() {
        return STAT_MIN as u8;
    }
    (value.round() as i32).clamp(STAT_MIN, STAT_MAX) as u8
}

/// Stat as a 0.0 - 1.0 fraction of the maximum
pub fn stat_fraction(stat: u8) -> f32 {
    stat as f32 / STAT_MAX as f32
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Move a point toward a target by at most `max_delta`
pub fn move_toward(current: Vec2, target: Vec2, max_delta: f32) -> Vec2 {
    let delta = target - current;
    let dist = delta.length();
    if dist <= max_delta || dist <= f32::EPSILON {
        target
    } else {
        current + delta / dist * max_delta
    }
}

/// `num / den`, or 0.0 when there is nothing to divide by
pub fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 { 0.0 } else { num / den }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_rating_clamps() {
        assert_eq!(normalize_rating(1.0), 0.0);
        assert_eq!(normalize_rating(2.0), 0.0);
        assert!((normalize_rating(5.0) - 0.5).abs() < 1e-6);
        assert_eq!(normalize_rating(8.0), 1.0);
        assert_eq!(normalize_rating(12.0), 1.0);
    }

    #[test]
    fn test_clamp_stat() {
        assert_eq!(clamp_stat(-20.0), 1);
        assert_eq!(clamp_stat(50.4), 50);
        assert_eq!(clamp_stat(250.0), 99);
        assert_eq!(clamp_stat(f32::NAN), 1);
    }

    #[test]
    fn test_move_toward() {
        let p = move_toward(Vec2::ZERO, Vec2::new(10.0, 0.0), 3.0);
        assert!((p.x - 3.0).abs() < 1e-6);
        let p = move_toward(Vec2::ZERO, Vec2::new(1.0, 0.0), 3.0);
        assert_eq!(p, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_ratio_zero_denominator() {
        assert_eq!(ratio(5.0, 0.0), 0.0);
        assert_eq!(ratio(6.0, 3.0), 2.0);
    }
}
