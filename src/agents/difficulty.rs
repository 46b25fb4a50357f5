//! Shot difficulty and error odds for the drill-physics agents
//!
//! Difficulty blends how fast the incoming ball is, how much spin it carries
//! and how far the agent had to stretch for it. Error odds scale that by the
//! agent's own control/defense and by the rating gap to the opponent.

use crate::constants::*;
use crate::player::{SkillProfile, Stat};

/// Difficulty of playing the incoming ball, 0.0 (sitter) to 1.0 (impossible)
pub fn shot_difficulty(ball_speed: f32, spin: f32, topspin: f32, stretch: f32) -> f32 {
    let speed = (ball_speed / BALL_MAX_SPEED).clamp(0.0, 1.0);
    let spin = (spin.abs() + topspin.max(0.0)).clamp(0.0, 1.0);
    let stretch = stretch.clamp(0.0, 1.0);
    DRILL_SPEED_WEIGHT * speed + DRILL_SPIN_WEIGHT * spin + DRILL_STRETCH_WEIGHT * stretch
}

/// Error multiplier from the rating gap: below 1.0 when the agent is the
/// stronger player, above 1.0 when outclassed
pub fn rating_factor(own_rating: f32, opponent_rating: f32) -> f32 {
    (-DRILL_RATING_CURVE * (own_rating - opponent_rating))
        .exp()
        .clamp(DRILL_RATING_FACTOR_MIN, DRILL_RATING_FACTOR_MAX)
}

/// Per-contact error probabilities
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorOdds {
    pub unforced: f32,
    pub forced: f32,
}

/// Error odds for `profile` playing a ball of the given difficulty
pub fn error_odds(
    profile: &SkillProfile,
    difficulty: f32,
    opponent_rating: f32,
    pressure_multiplier: f32,
) -> ErrorOdds {
    let difficulty = difficulty.clamp(0.0, 1.0);
    let control = (profile.fraction(Stat::Consistency) + profile.fraction(Stat::Accuracy)) / 2.0;
    let defense = (profile.fraction(Stat::Defense) + profile.fraction(Stat::Reflexes)) / 2.0;
    let scale = rating_factor(profile.rating(), opponent_rating) * pressure_multiplier.max(1.0);

    // Unforced: present even on easy balls, shrinks with control
    let unforced = DRILL_UNFORCED_BASE * (0.5 + difficulty) * (1.5 - control) * scale;
    // Forced: grows quadratically with difficulty, resisted by defense
    let forced = DRILL_FORCED_BASE * difficulty * difficulty * (1.2 - defense) * scale;

    ErrorOdds {
        unforced: unforced.clamp(DRILL_UNFORCED_MIN, DRILL_UNFORCED_MAX),
        forced: forced.clamp(DRILL_FORCED_MIN, DRILL_FORCED_MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_weights_sum_to_one() {
        assert!((shot_difficulty(BALL_MAX_SPEED * 2.0, 3.0, 3.0, 5.0) - 1.0).abs() < 1e-5);
        assert_eq!(shot_difficulty(0.0, 0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_rating_factor_direction() {
        assert!((rating_factor(4.0, 4.0) - 1.0).abs() < 1e-6);
        assert!(rating_factor(6.0, 4.0) < 1.0);
        assert!(rating_factor(2.0, 8.0) <= DRILL_RATING_FACTOR_MAX);
        assert!(rating_factor(8.0, 2.0) >= DRILL_RATING_FACTOR_MIN);
    }

    #[test]
    fn test_error_odds_clamped() {
        for value in [1.0, 50.0, 99.0] {
            let profile = SkillProfile::uniform(5.0, value);
            for difficulty in [0.0, 0.5, 1.0, 3.0] {
                let odds = error_odds(&profile, difficulty, 2.0, 10.0);
                assert!((DRILL_UNFORCED_MIN..=DRILL_UNFORCED_MAX).contains(&odds.unforced));
                assert!((DRILL_FORCED_MIN..=DRILL_FORCED_MAX).contains(&odds.forced));
                let odds = error_odds(&profile, difficulty, 8.0, 1.0);
                assert!((DRILL_UNFORCED_MIN..=DRILL_UNFORCED_MAX).contains(&odds.unforced));
            }
        }
    }

    #[test]
    fn test_better_control_fewer_errors() {
        let sloppy = SkillProfile::uniform(4.0, 20.0);
        let clean = SkillProfile::uniform(4.0, 90.0);
        let a = error_odds(&sloppy, 0.5, 4.0, 1.0);
        let b = error_odds(&clean, 0.5, 4.0, 1.0);
        assert!(b.unforced < a.unforced);
        assert!(b.forced < a.forced);
    }

    #[test]
    fn test_harder_ball_more_forced_errors() {
        let profile = SkillProfile::uniform(4.0, 50.0);
        let easy = error_odds(&profile, 0.2, 4.0, 1.0);
        let hard = error_odds(&profile, 0.8, 4.0, 1.0);
        assert!(hard.forced > easy.forced);
        assert!(hard.unforced > easy.unforced);
    }
}
