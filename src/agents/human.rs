//! Human-like agent: reacts late, misjudges position, and unlocks special
//! shots only as often as its skills allow

use bevy::prelude::*;

use super::body::{AgentBody, Approach};
use super::shots::{ShotMode, ShotParams, shape_serve, shape_shot};
use super::{DecisionAgent, RallyContext, ready_depth};
use crate::ball::BallFlight;
use crate::constants::*;
use crate::court::{Side, in_kitchen, ready_position};
use crate::helpers::{lerp, normalize_rating};
use crate::params::SimulationParams;
use crate::player::{SkillProfile, Stat};
use crate::rng::SeededRng;

#[derive(Debug, Clone)]
pub struct HumanAgent {
    body: AgentBody,
    reaction_delay: f32,
}

impl HumanAgent {
    pub fn new(side: Side, profile: SkillProfile, params: &SimulationParams) -> Self {
        let reaction_delay = lerp(
            AGENT_MAX_REACTION,
            AGENT_MIN_REACTION,
            normalize_rating(profile.rating()),
        );
        Self {
            body: AgentBody::new(side, profile, params),
            reaction_delay,
        }
    }

    pub fn reaction_delay(&self) -> f32 {
        self.reaction_delay
    }

    fn begin_approach(&self, ctx: &RallyContext, rng: &mut SeededRng) -> Approach {
        let profile = self.body.profile();
        let sigma = AGENT_POSITION_NOISE * (1.0 - profile.fraction(Stat::Positioning));
        let noise = Vec2::new(
            rng.gaussian() as f32 * sigma,
            rng.gaussian() as f32 * sigma * 0.5,
        );
        let impatience = AGENT_IMPATIENCE * (1.0 - profile.fraction(Stat::Focus));
        let impatient = ctx.must_bounce() && rng.chance(impatience as f64);
        Approach {
            elapsed: 0.0,
            noise,
            impatient,
        }
    }

    fn reacting(&self) -> Option<&Approach> {
        self.body
            .approach
            .as_ref()
            .filter(|a| a.elapsed >= self.reaction_delay)
    }

    /// Roll every special mode independently; pick among those unlocked
    fn pick_mode(&self, rng: &mut SeededRng) -> ShotMode {
        let profile = self.body.profile();
        let unlocked: Vec<ShotMode> = ShotMode::SPECIAL
            .into_iter()
            .filter(|mode| {
                let p = (profile.fraction(mode.gate()) * mode.unlock_weight())
                    .clamp(0.0, MODE_UNLOCK_CAP);
                rng.chance(p as f64)
            })
            .collect();
        if unlocked.is_empty() {
            ShotMode::Normal
        } else {
            let pick = (rng.next_u64() % unlocked.len() as u64) as usize;
            unlocked[pick]
        }
    }
}

impl DecisionAgent for HumanAgent {
    fn body(&self) -> &AgentBody {
        &self.body
    }

    fn body_mut(&mut self) -> &mut AgentBody {
        &mut self.body
    }

    fn observe(&mut self, ball: &dyn BallFlight, ctx: &RallyContext, dt: f32, rng: &mut SeededRng) {
        let depth = ready_depth(self.body.profile(), ctx);
        if !ctx.incoming {
            self.body.approach = None;
            self.body.move_to(ready_position(self.body.side(), depth), dt);
            return;
        }

        if self.body.approach.is_none() {
            let approach = self.begin_approach(ctx, rng);
            self.body.approach = Some(approach);
        }
        let Some(approach) = self.body.approach.as_mut() else {
            return;
        };
        approach.elapsed += dt;
        if approach.elapsed < self.reaction_delay {
            return;
        }
        let noise = approach.noise;
        let moving_for = approach.elapsed - self.reaction_delay + dt;
        let target = self.body.intercept_target(ball, depth) + noise;
        self.body.chase(target, moving_for, dt);
    }

    fn should_swing(&self, ball: &dyn BallFlight, ctx: &RallyContext) -> bool {
        let Some(approach) = self.reacting() else {
            return false;
        };
        if !ctx.incoming || !self.can_reach(ball) {
            return false;
        }
        if ball.bounce_count() == 0 {
            if ctx.must_bounce() {
                return approach.impatient;
            }
            if in_kitchen(self.body.position()) {
                return false;
            }
        }
        true
    }

    fn choose_shot(&mut self, ball: &dyn BallFlight, _ctx: &RallyContext, rng: &mut SeededRng) -> ShotParams {
        let mode = self.pick_mode(rng);
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
        let p = (profile.fraction(Stat::Power) * MODE_POWER_UNLOCK).clamp(0.0, MODE_UNLOCK_CAP);
        let mode = if rng.chance(p as f64) { ShotMode::Power } else { ShotMode::Normal };
        shape_serve(profile, self.body.side(), self.body.position(), mode, rng)
    }
}
