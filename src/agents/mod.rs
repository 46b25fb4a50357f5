//! Decision agents - the players the full point simulator drives
//!
//! Both agent kinds share one body model (movement, stamina, hitbox) and one
//! error model; they differ in reaction, positioning noise and how they pick
//! shots.

mod body;
mod difficulty;
mod human;
mod npc;
mod pressure;
mod shots;

pub use body::{AgentBody, Approach};
pub use difficulty::{ErrorOdds, error_odds, rating_factor, shot_difficulty};
pub use human::HumanAgent;
pub use npc::NpcAgent;
pub use pressure::RallyPressure;
pub use shots::{ShotMode, ShotParams, shape_serve, shape_shot};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ball::BallFlight;
use crate::constants::*;
use crate::court::Side;
use crate::helpers::lerp;
use crate::params::SimulationParams;
use crate::player::{SkillProfile, Stat};
use crate::rng::SeededRng;

/// What the point simulator tells an agent about the rally
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RallyContext {
    /// Shots struck so far this point, serve included
    pub shots: u32,
    /// The opponent struck the ball last and it is still live
    pub incoming: bool,
    pub opponent_rating: f32,
}

impl RallyContext {
    /// The ball in play must bounce before it is struck (return of serve
    /// and the shot after it)
    pub fn must_bounce(&self) -> bool {
        self.shots <= 2
    }
}

/// Depth to hold: back at the baseline while the next ball must bounce,
/// otherwise up toward the kitchen line as positioning allows
pub fn ready_depth(profile: &SkillProfile, ctx: &RallyContext) -> f32 {
    let next_must_bounce = if ctx.incoming {
        ctx.must_bounce()
    } else {
        ctx.shots < 2
    };
    if next_must_bounce {
        HOME_DEPTH
    } else {
        lerp(HOME_DEPTH, KITCHEN_LINE_DEPTH, profile.fraction(Stat::Positioning))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unforced,
    Forced,
}

/// Player contract driven tick by tick by the point simulator
pub trait DecisionAgent: Send {
    fn body(&self) -> &AgentBody;

    fn body_mut(&mut self) -> &mut AgentBody;

    fn side(&self) -> Side {
        self.body().side()
    }

    fn profile(&self) -> &SkillProfile {
        self.body().profile()
    }

    fn position(&self) -> Vec2 {
        self.body().position()
    }

    /// Drop all per-point state and stand at `start`
    fn reset_for_point(&mut self, start: Vec2) {
        self.body_mut().reset(start);
    }

    /// Observe the ball and move for one tick
    fn observe(&mut self, ball: &dyn BallFlight, ctx: &RallyContext, dt: f32, rng: &mut SeededRng);

    fn can_reach(&self, ball: &dyn BallFlight) -> bool {
        self.body().can_reach(ball)
    }

    /// Elect to strike the ball this tick
    fn should_swing(&self, ball: &dyn BallFlight, ctx: &RallyContext) -> bool;

    /// Decide whether this contact goes wrong. Also folds the ball's
    /// difficulty into rally pressure.
    fn error_check(
        &mut self,
        ball: &dyn BallFlight,
        ctx: &RallyContext,
        rng: &mut SeededRng,
    ) -> Option<ErrorKind> {
        let body = self.body_mut();
        let difficulty = shot_difficulty(ball.speed(), ball.spin(), ball.topspin(), body.stretch(ball));
        body.pressure.add(difficulty);
        let multiplier = body.pressure.multiplier(body.profile());
        let odds = error_odds(body.profile(), difficulty, ctx.opponent_rating, multiplier);
        if rng.chance(odds.forced as f64) {
            Some(ErrorKind::Forced)
        } else if rng.chance(odds.unforced as f64) {
            Some(ErrorKind::Unforced)
        } else {
            None
        }
    }

    fn choose_shot(&mut self, ball: &dyn BallFlight, ctx: &RallyContext, rng: &mut SeededRng) -> ShotParams;

    fn serve(&mut self, rng: &mut SeededRng) -> ShotParams;
}

/// Who is on a side of the court
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerKind {
    /// Human-like agent with stats derived from its rating
    Human,
    /// Computer opponent with virtual equipment
    Computer,
    /// Brand-new human player with starter stats
    Starter,
}

impl PlayerKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "human" | "player" => Some(Self::Human),
            "computer" | "npc" | "cpu" => Some(Self::Computer),
            "starter" | "new" => Some(Self::Starter),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PlayerKind::Human => "human",
            PlayerKind::Computer => "computer",
            PlayerKind::Starter => "starter",
        }
    }
}

/// A kind of player at a rating
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerSpec {
    pub kind: PlayerKind,
    pub rating: f32,
    /// Explicit stats (a named preset) instead of rating-derived ones
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<SkillProfile>,
}

impl PlayerSpec {
    pub fn new(kind: PlayerKind, rating: f32) -> Self {
        Self { kind, rating, profile: None }
    }

    pub fn human(rating: f32) -> Self {
        Self::new(PlayerKind::Human, rating)
    }

    pub fn computer(rating: f32) -> Self {
        Self::new(PlayerKind::Computer, rating)
    }

    pub fn starter() -> Self {
        Self::new(PlayerKind::Starter, MIN_RATING)
    }

    /// Human-like player with supplied stats
    pub fn preset(profile: SkillProfile) -> Self {
        Self {
            kind: PlayerKind::Human,
            rating: profile.rating(),
            profile: Some(profile),
        }
    }

    /// Rating the player actually plays at (starters are always MIN_RATING)
    pub fn effective_rating(&self) -> f32 {
        match self.kind {
            PlayerKind::Starter => MIN_RATING,
            _ => self.rating,
        }
    }

    pub fn profile(&self, params: &SimulationParams) -> SkillProfile {
        if let Some(profile) = self.profile {
            return profile;
        }
        match self.kind {
            PlayerKind::Human => params.profile_for_rating(self.rating),
            PlayerKind::Computer => params.npc_profile(self.rating),
            PlayerKind::Starter => params.starter_profile(),
        }
    }

    pub fn build_agent(&self, side: Side, params: &SimulationParams) -> Box<dyn DecisionAgent> {
        let profile = self.profile(params);
        match self.kind {
            PlayerKind::Human | PlayerKind::Starter => Box::new(HumanAgent::new(side, profile, params)),
            PlayerKind::Computer => Box::new(NpcAgent::with_profile(side, profile, params)),
        }
    }

    pub fn label(&self) -> String {
        match (self.kind, self.profile) {
            (PlayerKind::Starter, _) => "starter".to_string(),
            (kind, Some(_)) => format!("{} {:.1} preset", kind.label(), self.rating),
            (kind, None) => format!("{} {:.1}", kind.label(), self.rating),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_must_bounce_window() {
        let ctx = |shots| RallyContext { shots, incoming: true, opponent_rating: 4.0 };
        assert!(ctx(1).must_bounce());
        assert!(ctx(2).must_bounce());
        assert!(!ctx(3).must_bounce());
    }

    #[test]
    fn test_ready_depth() {
        let profile = SkillProfile::uniform(4.0, 99.0);
        let served = RallyContext { shots: 1, incoming: false, opponent_rating: 4.0 };
        assert_eq!(ready_depth(&profile, &served), HOME_DEPTH);
        let returned = RallyContext { shots: 2, incoming: false, opponent_rating: 4.0 };
        assert!((ready_depth(&profile, &returned) - KITCHEN_LINE_DEPTH).abs() < 1e-4);
        let third_incoming = RallyContext { shots: 2, incoming: true, opponent_rating: 4.0 };
        assert_eq!(ready_depth(&profile, &third_incoming), HOME_DEPTH);
    }

    #[test]
    fn test_player_specs() {
        let params = SimulationParams::default();
        assert_eq!(PlayerSpec::starter().profile(&params), params.starter_profile());
        assert_eq!(PlayerSpec::computer(4.0).profile(&params), params.npc_profile(4.0));
        let agent = PlayerSpec::human(4.0).build_agent(Side::Far, &params);
        assert_eq!(agent.side(), Side::Far);
        assert_eq!(PlayerKind::from_name("NPC"), Some(PlayerKind::Computer));
        assert_eq!(PlayerSpec::computer(4.5).label(), "computer 4.5");
        assert_eq!(PlayerSpec::new(PlayerKind::Starter, 6.0).effective_rating(), MIN_RATING);
        let custom = SkillProfile::uniform(4.5, 80.0);
        assert_eq!(PlayerSpec::preset(custom).profile(&params), custom);
        assert_eq!(PlayerSpec::preset(custom).label(), "human 4.5 preset");
    }

    #[test]
    fn test_error_check_builds_pressure() {
        let params = SimulationParams::default();
        let mut agent = HumanAgent::new(Side::Near, SkillProfile::uniform(4.0, 50.0), &params);
        agent.reset_for_point(Vec2::new(0.0, -15.0));
        let mut ball = crate::ball::CourtBall::new();
        ball.launch(Vec3::new(1.0, -15.0, 2.0), Vec2::new(0.0, 15.0), 0.9, 0.2, 0.5, 0.5);
        let ctx = RallyContext { shots: 4, incoming: true, opponent_rating: 4.0 };
        agent.error_check(&ball, &ctx, &mut SeededRng::new(4));
        assert!(agent.body().pressure.level() > 0.0);
    }
}
