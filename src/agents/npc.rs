//! Computer opponent: instant reactions, exact positioning, stats boosted by
//! virtual equipment and a fixed stat-threshold shot selection. It still has
//! to get its feet moving, so wide or fast balls can get past it.

use super::body::{AgentBody, Approach};
use super::shots::{ShotMode, ShotParams, shape_serve, shape_shot};
use super::{DecisionAgent, RallyContext, ready_depth};
use crate::ball::BallFlight;
use crate::constants::*;
use crate::court::{Side, in_kitchen, ready_position};
use crate::params::SimulationParams;
use crate::player::{SkillProfile, Stat};
use crate::rng::SeededRng;

#[derive(Debug, Clone)]
pub struct NpcAgent {
    body: AgentBody,
}

impl NpcAgent {
    /// Computer opponent at `rating`, equipment bonus included
    pub fn new(side: Side, rating: f32, params: &SimulationParams) -> Self {
        Self::with_profile(side, params.npc_profile(rating), params)
    }

    /// Computer opponent with an explicit profile
    pub fn with_profile(side: Side, profile: SkillProfile, params: &SimulationParams) -> Self {
        Self {
            body: AgentBody::new(side, profile, params),
        }
    }

    fn rally_mode(&self, ball: &dyn BallFlight) -> ShotMode {
        let profile = self.body.profile();
        let at_net = self.body.position().y.abs() < KITCHEN_LINE_DEPTH + 1.5;
        if at_net && ball.height() < NET_HEIGHT {
            ShotMode::Normal
        } else if profile.get(Stat::Power) >= 70 && ball.height() > NET_HEIGHT {
            ShotMode::Power
        } else if profile.get(Stat::Spin) >= 65 {
            ShotMode::Topspin
        } else if profile.get(Stat::Accuracy) >= 75 {
            ShotMode::Angled
        } else if profile.get(Stat::Focus) >= 60 {
            ShotMode::Focus
        } else {
            ShotMode::Normal
        }
    }
}

impl DecisionAgent for NpcAgent {
    fn body(&self) -> &AgentBody {
        &self.body
    }

    fn body_mut(&mut self) -> &mut AgentBody {
        &mut self.body
    }

    fn observe(&mut self, ball: &dyn BallFlight, ctx: &RallyContext, dt: f32, _rng: &mut SeededRng) {
        let depth = ready_depth(self.body.profile(), ctx);
        if !ctx.incoming {
            self.body.approach = None;
            self.body.move_to(ready_position(self.body.side(), depth), dt);
            return;
        }
        let approach = self.body.approach.get_or_insert_with(Approach::default);
        approach.elapsed += dt;
        let moving_for = approach.elapsed;
        let target = self.body.intercept_target(ball, depth);
        self.body.chase(target, moving_for, dt);
    }

    fn should_swing(&self, ball: &dyn BallFlight, ctx: &RallyContext) -> bool {
        if !ctx.incoming || !self.can_reach(ball) {
            return false;
        }
        ball.bounce_count() > 0 || (!ctx.must_bounce() && !in_kitchen(self.body.position()))
    }

    fn choose_shot(&mut self, ball: &dyn BallFlight, _ctx: &RallyContext, rng: &mut SeededRng) -> ShotParams {
        let mode = self.rally_mode(ball);
        shape_shot(
            self.body.profile(),
            self.body.side(),
            mode,
            ball.position(),
            ball.height(),
            rng,
        )
    }

    fn serve(&mut self, rng: &mut SeededRng) -> ShotParams {
        let profile = self.body.profile();
        let mode = if profile.get(Stat::Power) >= 70 {
            ShotMode::Power
        } else {
            ShotMode::Normal
        };
        shape_serve(profile, self.body.side(), self.body.position(), mode, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ball::CourtBall;
    use bevy::prelude::*;

    #[test]
    fn test_npc_profile_includes_equipment() {
        let params = SimulationParams::default();
        let npc = NpcAgent::new(Side::Far, 5.0, &params);
        let plain = params.profile_for_rating(5.0);
        let bonus = params.npc_bonus(5.0);
        assert!(bonus > 0);
        assert_eq!(
            npc.profile().get(Stat::Power) as i32,
            (plain.get(Stat::Power) as i32 + bonus).min(99)
        );
    }

    #[test]
    fn test_npc_reacts_immediately() {
        let params = SimulationParams::default();
        let mut npc = NpcAgent::new(Side::Far, 3.0, &params);
        let start = Vec2::new(0.0, HOME_DEPTH);
        npc.reset_for_point(start);
        let mut ball = CourtBall::new();
        ball.launch(Vec3::new(0.0, -19.0, 2.5), Vec2::new(6.0, 16.0), 0.7, 0.3, 0.0, 0.0);
        let ctx = RallyContext { shots: 1, incoming: true, opponent_rating: 3.0 };
        npc.observe(&ball, &ctx, POINT_TICK, &mut SeededRng::new(0));
        assert_ne!(npc.position(), start);
    }

    #[test]
    fn test_shot_selection_is_deterministic() {
        let params = SimulationParams::default();
        let mut npc = NpcAgent::with_profile(
            Side::Near,
            SkillProfile::uniform(5.0, 50.0).with_stat(Stat::Spin, 80.0),
            &params,
        );
        npc.reset_for_point(Vec2::new(0.0, -HOME_DEPTH));
        let mut ball = CourtBall::new();
        ball.launch(Vec3::new(0.0, -18.0, 3.5), Vec2::new(0.0, 10.0), 0.5, 0.5, 0.0, 0.0);
        let ctx = RallyContext { shots: 4, incoming: true, opponent_rating: 5.0 };
        let mut rng = SeededRng::new(9);
        for _ in 0..20 {
            assert_eq!(npc.choose_shot(&ball, &ctx, &mut rng).mode, ShotMode::Topspin);
        }
    }
}
