//! Simulation parameters - the rating → stats mapping the trainer tunes
//!
//! 37 scalars: a (slope, offset) pair per stat, the computer-opponent
//! equipment bonus line, the starter stat vector, and the movement speed
//! endpoints. The flat array layout is:
//!
//! | index   | field                                   |
//! |---------|-----------------------------------------|
//! | 0..22   | `(slope, offset)` per stat, stat order  |
//! | 22      | npc_equip_slope                         |
//! | 23      | npc_equip_offset                        |
//! | 24..35  | starter stat per stat, stat order       |
//! | 35      | move_speed_min                          |
//! | 36      | move_speed_max                          |

mod file;

pub use file::{PARAMS_FILE, ParamsDocument, ParamsError};

use serde::{Deserialize, Serialize};

use crate::constants::{MIN_RATING, STAT_MAX};
use crate::helpers::{lerp, normalize_rating};
use crate::player::{STAT_COUNT, SkillProfile, Stat};

pub const PARAM_COUNT: usize = 37;

const NPC_SLOPE_INDEX: usize = 2 * STAT_COUNT;
const NPC_OFFSET_INDEX: usize = NPC_SLOPE_INDEX + 1;
const STARTER_INDEX: usize = NPC_OFFSET_INDEX + 1;
const MOVE_MIN_INDEX: usize = STARTER_INDEX + STAT_COUNT;
const MOVE_MAX_INDEX: usize = MOVE_MIN_INDEX + 1;

/// Field names, in array order
pub const PARAM_NAMES: [&str; PARAM_COUNT] = [
    "power_slope",
    "power_offset",
    "accuracy_slope",
    "accuracy_offset",
    "spin_slope",
    "spin_offset",
    "speed_slope",
    "speed_offset",
    "defense_slope",
    "defense_offset",
    "reflexes_slope",
    "reflexes_offset",
    "positioning_slope",
    "positioning_offset",
    "clutch_slope",
    "clutch_offset",
    "focus_slope",
    "focus_offset",
    "stamina_slope",
    "stamina_offset",
    "consistency_slope",
    "consistency_offset",
    "npc_equip_slope",
    "npc_equip_offset",
    "starter_power",
    "starter_accuracy",
    "starter_spin",
    "starter_speed",
    "starter_defense",
    "starter_reflexes",
    "starter_positioning",
    "starter_clutch",
    "starter_focus",
    "starter_stamina",
    "starter_consistency",
    "move_speed_min",
    "move_speed_max",
];

// Documented defaults, stat order
const DEFAULT_SLOPES: [f32; STAT_COUNT] = [72.0, 70.0, 68.0, 66.0, 70.0, 68.0, 72.0, 60.0, 64.0, 58.0, 74.0];
const DEFAULT_OFFSETS: [f32; STAT_COUNT] = [18.0, 20.0, 15.0, 22.0, 18.0, 20.0, 16.0, 20.0, 20.0, 28.0, 16.0];
const DEFAULT_STARTER: [f32; STAT_COUNT] = [18.0, 15.0, 10.0, 20.0, 15.0, 18.0, 12.0, 12.0, 15.0, 25.0, 15.0];
const DEFAULT_NPC_EQUIP_SLOPE: f32 = 4.0;
const DEFAULT_NPC_EQUIP_OFFSET: f32 = 3.0;
const DEFAULT_MOVE_SPEED_MIN: f32 = 0.75;
const DEFAULT_MOVE_SPEED_MAX: f32 = 1.0;

// Valid ranges
const SLOPE_RANGE: (f32, f32) = (0.0, 98.0);
const OFFSET_RANGE: (f32, f32) = (1.0, 60.0);
const NPC_EQUIP_RANGE: (f32, f32) = (-10.0, 25.0);
const STARTER_RANGE: (f32, f32) = (1.0, 60.0);
const MOVE_SPEED_RANGE: (f32, f32) = (0.4, 1.5);

/// Rating → stat mapping and related constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "ParamsDocument", into = "ParamsDocument")]
pub struct SimulationParams {
    pub stat_slopes: [f32; STAT_COUNT],
    pub stat_offsets: [f32; STAT_COUNT],
    pub npc_equip_slope: f32,
    pub npc_equip_offset: f32,
    pub starter_stats: [f32; STAT_COUNT],
    pub move_speed_min: f32,
    pub move_speed_max: f32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            stat_slopes: DEFAULT_SLOPES,
            stat_offsets: DEFAULT_OFFSETS,
            npc_equip_slope: DEFAULT_NPC_EQUIP_SLOPE,
            npc_equip_offset: DEFAULT_NPC_EQUIP_OFFSET,
            starter_stats: DEFAULT_STARTER,
            move_speed_min: DEFAULT_MOVE_SPEED_MIN,
            move_speed_max: DEFAULT_MOVE_SPEED_MAX,
        }
    }
}

/// Valid (min, max) for each array slot
pub fn param_bounds(index: usize) -> (f64, f64) {
    let (lo, hi) = match index {
        i if i < NPC_SLOPE_INDEX && i % 2 == 0 => SLOPE_RANGE,
        i if i < NPC_SLOPE_INDEX => OFFSET_RANGE,
        NPC_SLOPE_INDEX | NPC_OFFSET_INDEX => NPC_EQUIP_RANGE,
        i if i < MOVE_MIN_INDEX => STARTER_RANGE,
        _ => MOVE_SPEED_RANGE,
    };
    (lo as f64, hi as f64)
}

/// Position of a named field in the flat array
pub fn param_index(name: &str) -> Option<usize> {
    PARAM_NAMES.iter().position(|&n| n == name)
}

impl SimulationParams {
    /// Flatten into the optimizer's 37-element form
    pub fn to_array(&self) -> [f64; PARAM_COUNT] {
        let mut out = [0.0; PARAM_COUNT];
        for i in 0..STAT_COUNT {
            out[2 * i] = self.stat_slopes[i] as f64;
            out[2 * i + 1] = self.stat_offsets[i] as f64;
            out[STARTER_INDEX + i] = self.starter_stats[i] as f64;
        }
        out[NPC_SLOPE_INDEX] = self.npc_equip_slope as f64;
        out[NPC_OFFSET_INDEX] = self.npc_equip_offset as f64;
        out[MOVE_MIN_INDEX] = self.move_speed_min as f64;
        out[MOVE_MAX_INDEX] = self.move_speed_max as f64;
        out
    }

    /// Rebuild from the flat form. Values are sanitized, so any valid
    /// parameter set survives `from_array(&p.to_array())` unchanged.
    pub fn from_array(values: &[f64; PARAM_COUNT]) -> Self {
        let mut params = Self::default();
        for i in 0..STAT_COUNT {
            params.stat_slopes[i] = values[2 * i] as f32;
            params.stat_offsets[i] = values[2 * i + 1] as f32;
            params.starter_stats[i] = values[STARTER_INDEX + i] as f32;
        }
        params.npc_equip_slope = values[NPC_SLOPE_INDEX] as f32;
        params.npc_equip_offset = values[NPC_OFFSET_INDEX] as f32;
        params.move_speed_min = values[MOVE_MIN_INDEX] as f32;
        params.move_speed_max = values[MOVE_MAX_INDEX] as f32;
        params.sanitized()
    }

    /// Clamp every scalar into its valid range, then enforce
    /// `slope + offset <= 99` by re-deriving the slope.
    pub fn sanitized(mut self) -> Self {
        fn fit(v: f32, (lo, hi): (f32, f32), fallback: f32) -> f32 {
            if v.is_finite() { v.clamp(lo, hi) } else { fallback }
        }

        for i in 0..STAT_COUNT {
            let offset = fit(self.stat_offsets[i], OFFSET_RANGE, DEFAULT_OFFSETS[i]);
            let mut slope = fit(self.stat_slopes[i], SLOPE_RANGE, DEFAULT_SLOPES[i]);
            if slope + offset > STAT_MAX as f32 {
                slope = STAT_MAX as f32 - offset;
            }
            self.stat_slopes[i] = slope;
            self.stat_offsets[i] = offset;
            self.starter_stats[i] = fit(self.starter_stats[i], STARTER_RANGE, DEFAULT_STARTER[i]);
        }
        self.npc_equip_slope = fit(self.npc_equip_slope, NPC_EQUIP_RANGE, DEFAULT_NPC_EQUIP_SLOPE);
        self.npc_equip_offset = fit(self.npc_equip_offset, NPC_EQUIP_RANGE, DEFAULT_NPC_EQUIP_OFFSET);
        self.move_speed_min = fit(self.move_speed_min, MOVE_SPEED_RANGE, DEFAULT_MOVE_SPEED_MIN);
        self.move_speed_max = fit(self.move_speed_max, MOVE_SPEED_RANGE, DEFAULT_MOVE_SPEED_MAX);
        self
    }

    /// Unclamped linear stat value for a rating
    pub fn stat_value(&self, stat: Stat, rating: f32) -> f32 {
        let i = stat.index();
        self.stat_slopes[i] * normalize_rating(rating) + self.stat_offsets[i]
    }

    /// Profile derived from a rating (every stat clamped to 1..=99)
    pub fn profile_for_rating(&self, rating: f32) -> SkillProfile {
        SkillProfile::new(rating, Stat::ALL.map(|s| self.stat_value(s, rating)))
    }

    /// Flat bonus the computer opponent gets on every stat
    pub fn npc_bonus(&self, rating: f32) -> i32 {
        (self.npc_equip_slope * normalize_rating(rating) + self.npc_equip_offset).round() as i32
    }

    /// Computer-opponent profile: derived stats plus virtual equipment
    pub fn npc_profile(&self, rating: f32) -> SkillProfile {
        self.profile_for_rating(rating).with_bonus(self.npc_bonus(rating))
    }

    /// Profile a brand-new player starts with
    pub fn starter_profile(&self) -> SkillProfile {
        SkillProfile::new(MIN_RATING, self.starter_stats)
    }

    /// Movement speed multiplier, interpolated between the endpoints by rating
    pub fn move_speed_scale(&self, rating: f32) -> f32 {
        lerp(self.move_speed_min, self.move_speed_max, normalize_rating(rating))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededRng;

    fn random_valid_params(rng: &mut SeededRng) -> SimulationParams {
        let mut values = [0.0; PARAM_COUNT];
        for (i, v) in values.iter_mut().enumerate() {
            let (lo, hi) = param_bounds(i);
            *v = lo + (hi - lo) * rng.uniform();
        }
        SimulationParams::from_array(&values)
    }

    #[test]
    fn test_defaults_are_valid() {
        let p = SimulationParams::default();
        assert_eq!(p, p.sanitized());
    }

    #[test]
    fn test_array_round_trip() {
        let mut rng = SeededRng::new(5);
        for _ in 0..200 {
            let p = random_valid_params(&mut rng);
            assert_eq!(SimulationParams::from_array(&p.to_array()), p);
        }
    }

    #[test]
    fn test_names_cover_array() {
        assert_eq!(param_index("power_slope"), Some(0));
        assert_eq!(param_index("consistency_offset"), Some(21));
        assert_eq!(param_index("npc_equip_slope"), Some(22));
        assert_eq!(param_index("starter_power"), Some(24));
        assert_eq!(param_index("move_speed_max"), Some(36));
    }

    #[test]
    fn test_slope_rederived_when_over_cap() {
        let mut values = SimulationParams::default().to_array();
        values[0] = 95.0;
        values[1] = 30.0;
        let p = SimulationParams::from_array(&values);
        assert_eq!(p.stat_slopes[0], 69.0);
        assert_eq!(p.stat_offsets[0], 30.0);
    }

    #[test]
    fn test_derived_stats_always_in_range() {
        let mut rng = SeededRng::new(11);
        for _ in 0..50 {
            let p = random_valid_params(&mut rng);
            let mut rating = 0.0;
            while rating <= 10.0 {
                for profile in [p.profile_for_rating(rating), p.npc_profile(rating)] {
                    assert!(profile.stats().iter().all(|&s| (1..=99).contains(&s)));
                }
                // Before clamping, the max-rating endpoint never exceeds 99 either
                for stat in Stat::ALL {
                    assert!(p.stat_value(stat, 8.0) <= 99.0 + 1e-3);
                }
                rating += 0.25;
            }
        }
    }

    #[test]
    fn test_non_finite_values_fall_back() {
        let mut values = SimulationParams::default().to_array();
        values[36] = f64::NAN;
        let p = SimulationParams::from_array(&values);
        assert_eq!(p.move_speed_max, 1.0);
    }

    #[test]
    fn test_move_speed_scale_interpolates() {
        let p = SimulationParams::default();
        assert!((p.move_speed_scale(2.0) - 0.75).abs() < 1e-6);
        assert!((p.move_speed_scale(8.0) - 1.0).abs() < 1e-6);
        assert!((p.move_speed_scale(5.0) - 0.875).abs() < 1e-6);
    }

    #[test]
    fn test_npc_profile_gets_bonus() {
        let p = SimulationParams::default();
        let human = p.profile_for_rating(5.0);
        let npc = p.npc_profile(5.0);
        let bonus = p.npc_bonus(5.0);
        assert_eq!(bonus, 5);
        assert_eq!(npc.get(Stat::Power) as i32, (human.get(Stat::Power) as i32 + bonus).min(99));
    }
}
