//! Shot shaping: turn a chosen mode into launch parameters

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::court::Side;
use crate::helpers::lerp;
use crate::player::{SkillProfile, Stat};
use crate::rng::SeededRng;

/// Contact this close to the kitchen line counts as playing at the net
const NET_PLAY_DEPTH: f32 = KITCHEN_LINE_DEPTH + 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotMode {
    #[default]
    Normal,
    Power,
    Topspin,
    Slice,
    Angled,
    Focus,
}

impl ShotMode {
    /// Special modes, in the order they are considered
    pub const SPECIAL: [ShotMode; 5] = [
        ShotMode::Power,
        ShotMode::Topspin,
        ShotMode::Slice,
        ShotMode::Angled,
        ShotMode::Focus,
    ];

    /// Stat that gates this mode
    pub fn gate(self) -> Stat {
        match self {
            ShotMode::Normal | ShotMode::Angled => Stat::Accuracy,
            ShotMode::Power => Stat::Power,
            ShotMode::Topspin | ShotMode::Slice => Stat::Spin,
            ShotMode::Focus => Stat::Focus,
        }
    }

    /// Per-shot unlock weight at a full stat
    pub fn unlock_weight(self) -> f32 {
        match self {
            ShotMode::Normal => 0.0,
            ShotMode::Power => MODE_POWER_UNLOCK,
            ShotMode::Topspin => MODE_TOPSPIN_UNLOCK,
            ShotMode::Slice => MODE_SLICE_UNLOCK,
            ShotMode::Angled => MODE_ANGLED_UNLOCK,
            ShotMode::Focus => MODE_FOCUS_UNLOCK,
        }
    }
}

/// Everything the ball needs to be struck
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotParams {
    pub target: Vec2,
    pub power: f32,
    pub arc: f32,
    pub spin: f32,
    pub topspin: f32,
    pub mode: ShotMode,
}

fn aim_noise(profile: &SkillProfile, mode: ShotMode, power: f32) -> f32 {
    let mut sigma = AGENT_AIM_NOISE * (1.0 - profile.fraction(Stat::Accuracy));
    if mode == ShotMode::Focus {
        sigma *= 0.5;
    }
    // Hard hitting costs precision
    sigma * (1.0 + (power - 0.5).max(0.0))
}

/// Rally shot from `contact` with the ball at `ball_height`
pub fn shape_shot(
    profile: &SkillProfile,
    side: Side,
    mode: ShotMode,
    contact: Vec2,
    ball_height: f32,
    rng: &mut SeededRng,
) -> ShotParams {
    let accuracy = profile.fraction(Stat::Accuracy);
    let power_skill = profile.fraction(Stat::Power);
    let spin_skill = profile.fraction(Stat::Spin);
    let at_net = contact.y.abs() < NET_PLAY_DEPTH;

    let (x, depth, power, arc, spin, topspin) = match mode {
        // Low ball at the net: drop it into the kitchen
        ShotMode::Normal if at_net && ball_height < NET_HEIGHT => {
            (rng.range(-4.0, 4.0), rng.range(3.5, 6.0), 0.15, 0.3, 0.0, 0.0)
        }
        ShotMode::Normal => (
            rng.range(-5.0, 5.0),
            lerp(12.0, 18.0, accuracy),
            0.45 + 0.3 * power_skill,
            0.35,
            0.0,
            0.2 * spin_skill,
        ),
        ShotMode::Power => (rng.range(-4.0, 4.0), 17.0, 0.8 + 0.2 * power_skill, 0.15, 0.0, 0.1),
        ShotMode::Topspin => (rng.range(-5.0, 5.0), 16.0, 0.6, 0.45, 0.0, 0.6 + 0.4 * spin_skill),
        ShotMode::Slice => {
            let curl = if rng.chance(0.5) { 1.0 } else { -1.0 };
            (rng.range(-5.0, 5.0), 15.0, 0.4, 0.3, curl * (0.5 + 0.5 * spin_skill), 0.0)
        }
        ShotMode::Angled => {
            let wing = if contact.x > 0.0 { -1.0 } else { 1.0 };
            (wing * 8.5, 11.0, 0.5, 0.35, 0.0, 0.2 * spin_skill)
        }
        ShotMode::Focus => (rng.range(-3.0, 3.0), 15.0, 0.5, 0.4, 0.0, 0.2 * spin_skill),
    };

    let sigma = aim_noise(profile, mode, power);
    let sign = side.opponent().sign();
    let target = Vec2::new(
        x + rng.gaussian() as f32 * sigma,
        sign * (depth + rng.gaussian() as f32 * sigma * 0.7),
    );

    ShotParams { target, power, arc, spin, topspin, mode }
}

/// Serve from `position`, aimed deep and cross-court
pub fn shape_serve(
    profile: &SkillProfile,
    side: Side,
    position: Vec2,
    mode: ShotMode,
    rng: &mut SeededRng,
) -> ShotParams {
    let accuracy = profile.fraction(Stat::Accuracy);
    let mut power = 0.5 + 0.3 * profile.fraction(Stat::Power);
    if mode == ShotMode::Power {
        power += 0.15;
    }
    let topspin = 0.2 * profile.fraction(Stat::Spin);
    let cross = -position.x.signum() * rng.range(2.0, 6.0);
    let depth = lerp(15.0, 18.5, accuracy);

    let sigma = aim_noise(profile, mode, power);
    let sign = side.opponent().sign();
    let target = Vec2::new(
        cross + rng.gaussian() as f32 * sigma,
        sign * (depth + rng.gaussian() as f32 * sigma * 0.7),
    );

    ShotParams { target, power, arc: 0.35, spin: 0.0, topspin, mode }
}
