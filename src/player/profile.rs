//! Skill profiles - the 11 integer stats a competitor plays with

use serde::{Deserialize, Serialize};

use crate::helpers::{clamp_stat, stat_fraction};

pub const STAT_COUNT: usize = 11;

/// Named stat slots, in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    Power,
    Accuracy,
    Spin,
    Speed,
    Defense,
    Reflexes,
    Positioning,
    Clutch,
    Focus,
    Stamina,
    Consistency,
}

impl Stat {
    pub const ALL: [Stat; STAT_COUNT] = [
        Stat::Power,
        Stat::Accuracy,
        Stat::Spin,
        Stat::Speed,
        Stat::Defense,
        Stat::Reflexes,
        Stat::Positioning,
        Stat::Clutch,
        Stat::Focus,
        Stat::Stamina,
        Stat::Consistency,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Stat::Power => "power",
            Stat::Accuracy => "accuracy",
            Stat::Spin => "spin",
            Stat::Speed => "speed",
            Stat::Defense => "defense",
            Stat::Reflexes => "reflexes",
            Stat::Positioning => "positioning",
            Stat::Clutch => "clutch",
            Stat::Focus => "focus",
            Stat::Stamina => "stamina",
            Stat::Consistency => "consistency",
        }
    }

    pub fn from_name(name: &str) -> Option<Stat> {
        Stat::ALL.into_iter().find(|s| s.name() == name)
    }
}

/// Immutable stat bundle plus the rating it was built for.
/// Every stat is clamped to 1..=99 at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillProfile {
    rating: f32,
    stats: [u8; STAT_COUNT],
}

impl SkillProfile {
    /// Build from raw values, clamping each into range
    pub fn new(rating: f32, values: [f32; STAT_COUNT]) -> Self {
        Self {
            rating,
            stats: values.map(clamp_stat),
        }
    }

    /// Every stat set to the same value
    pub fn uniform(rating: f32, value: f32) -> Self {
        Self::new(rating, [value; STAT_COUNT])
    }

    pub fn rating(&self) -> f32 {
        self.rating
    }

    pub fn get(&self, stat: Stat) -> u8 {
        self.stats[stat.index()]
    }

    /// Stat as f64, for the closed-form rally formulas
    pub fn value(&self, stat: Stat) -> f64 {
        self.get(stat) as f64
    }

    /// Stat as a 0.0 - 1.0 fraction
    pub fn fraction(&self, stat: Stat) -> f32 {
        stat_fraction(self.get(stat))
    }

    pub fn stats(&self) -> [u8; STAT_COUNT] {
        self.stats
    }

    /// Mean of all 11 stats
    pub fn average(&self) -> f64 {
        self.stats.iter().map(|&s| s as f64).sum::<f64>() / STAT_COUNT as f64
    }

    /// New profile with one stat replaced
    pub fn with_stat(&self, stat: Stat, value: f32) -> Self {
        let mut stats = self.stats;
        stats[stat.index()] = clamp_stat(value);
        Self {
            rating: self.rating,
            stats,
        }
    }

    /// New profile with a flat bonus added to every stat
    pub fn with_bonus(&self, bonus: i32) -> Self {
        Self {
            rating: self.rating,
            stats: self.stats.map(|s| clamp_stat((s as i32 + bonus) as f32)),
        }
    }

    /// Mean of speed and reflexes, 0.0 - 1.0
    pub fn athleticism(&self) -> f32 {
        (self.fraction(Stat::Speed) + self.fraction(Stat::Reflexes)) / 2.0
    }
}
