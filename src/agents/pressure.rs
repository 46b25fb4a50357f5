//! Rally pressure: a decaying running total of recent shot difficulty

use crate::constants::*;
use crate::player::{SkillProfile, Stat};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RallyPressure {
    level: f32,
}

impl RallyPressure {
    pub fn reset(&mut self) {
        self.level = 0.0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    /// Fold in the difficulty of the ball just faced
    pub fn add(&mut self, difficulty: f32) {
        self.level = self.level * PRESSURE_DECAY + difficulty.max(0.0);
    }

    /// Pressure a player tolerates before errors climb (clutch + focus)
    pub fn threshold(profile: &SkillProfile) -> f32 {
        let composure = (profile.fraction(Stat::Clutch) + profile.fraction(Stat::Focus)) / 2.0;
        PRESSURE_BASE_THRESHOLD + PRESSURE_SKILL_THRESHOLD * composure
    }

    /// Error multiplier, 1.0 until pressure exceeds the threshold
    pub fn multiplier(&self, profile: &SkillProfile) -> f32 {
        1.0 + PRESSURE_GAIN * (self.level - Self::threshold(profile)).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pressure_decays_and_accumulates() {
        let mut pressure = RallyPressure::default();
        pressure.add(1.0);
        pressure.add(1.0);
        assert!((pressure.level() - (1.0 * PRESSURE_DECAY + 1.0)).abs() < 1e-6);
        pressure.reset();
        assert_eq!(pressure.level(), 0.0);
    }

    #[test]
    fn test_multiplier_kicks_in_above_threshold() {
        let nervy = SkillProfile::uniform(3.0, 1.0);
        let calm = SkillProfile::uniform(3.0, 99.0);
        let mut pressure = RallyPressure::default();
        assert_eq!(pressure.multiplier(&nervy), 1.0);
        for _ in 0..10 {
            pressure.add(0.9);
        }
        assert!(pressure.multiplier(&nervy) > 1.0);
        assert!(pressure.multiplier(&calm) < pressure.multiplier(&nervy));
    }
}
