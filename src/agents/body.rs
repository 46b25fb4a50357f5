//! Shared agent body: court position, movement with a sprint/stamina
//! trade-off, the 3-D hitbox and per-point state.

use bevy::prelude::*;

use super::pressure::RallyPressure;
use crate::ball::BallFlight;
use crate::constants::*;
use crate::court::Side;
use crate::helpers::{lerp, move_toward};
use crate::params::SimulationParams;
use crate::player::{SkillProfile, Stat};

/// How far ahead of a bounced ball the agent aims to meet it (seconds)
const CHASE_LEAD: f32 = 0.2;
/// Agents may stray this far past a sideline
const SIDELINE_SLACK: f32 = 4.0;

/// State of one approach to an incoming ball
#[derive(Debug, Clone, Copy, Default)]
pub struct Approach {
    /// Seconds since the opponent struck the ball
    pub elapsed: f32,
    /// Positioning error applied to this approach's target
    pub noise: Vec2,
    /// Will swing before the bounce if the ball comes within reach
    pub impatient: bool,
}

#[derive(Debug, Clone)]
pub struct AgentBody {
    side: Side,
    profile: SkillProfile,
    base_speed: f32,
    position: Vec2,
    /// 0.0 - 1.0
    stamina: f32,
    pub pressure: RallyPressure,
    pub approach: Option<Approach>,
}

impl AgentBody {
    pub fn new(side: Side, profile: SkillProfile, params: &SimulationParams) -> Self {
        let base_speed = AGENT_BASE_MOVE_SPEED
            * params.move_speed_scale(profile.rating())
            * (0.6 + 0.4 * profile.fraction(Stat::Speed));
        Self {
            side,
            profile,
            base_speed,
            position: Vec2::ZERO,
            stamina: 1.0,
            pressure: RallyPressure::default(),
            approach: None,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn profile(&self) -> &SkillProfile {
        &self.profile
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn stamina(&self) -> f32 {
        self.stamina
    }

    /// Cruising speed before any sprint
    pub fn base_speed(&self) -> f32 {
        self.base_speed
    }

    /// Clear everything carried within a point
    pub fn reset(&mut self, start: Vec2) {
        self.position = start;
        self.stamina = 1.0;
        self.pressure.reset();
        self.approach = None;
    }

    /// Speed for covering `distance`; sprints when far away and rested
    pub fn effective_speed(&self, distance: f32) -> (f32, bool) {
        if distance > AGENT_SPRINT_DISTANCE && self.stamina > AGENT_MIN_SPRINT_STAMINA {
            (self.base_speed * AGENT_SPRINT_MULTIPLIER, true)
        } else {
            (self.base_speed, false)
        }
    }

    /// Seconds from standstill to full speed
    pub fn first_step(&self) -> f32 {
        lerp(
            AGENT_SLOW_FIRST_STEP,
            AGENT_QUICK_FIRST_STEP,
            self.profile.fraction(Stat::Reflexes),
        )
    }

    /// Move toward `target` for `dt` seconds, spending or recovering stamina
    pub fn move_to(&mut self, target: Vec2, dt: f32) {
        self.step_toward(target, dt, 1.0);
    }

    /// Move toward an incoming ball. `moving_for` is the time spent on this
    /// approach, this tick included; speed builds up over the first step.
    pub fn chase(&mut self, target: Vec2, moving_for: f32, dt: f32) {
        let ramp = (moving_for / self.first_step()).clamp(0.0, 1.0);
        self.step_toward(target, dt, ramp);
    }

    fn step_toward(&mut self, target: Vec2, dt: f32, ramp: f32) {
        let target = self.clamp_to_side(target);
        let distance = self.position.distance(target);
        let (speed, sprinting) = self.effective_speed(distance);
        let speed = speed * ramp;
        if sprinting {
            let endurance = 1.0 - 0.5 * self.profile.fraction(Stat::Stamina);
            self.stamina = (self.stamina - AGENT_SPRINT_DRAIN * endurance * dt).max(0.0);
        } else {
            self.stamina = (self.stamina + AGENT_STAMINA_REGEN * dt).min(1.0);
        }
        self.position = move_toward(self.position, target, speed * dt);
    }

    fn clamp_to_side(&self, target: Vec2) -> Vec2 {
        let limit_x = COURT_HALF_WIDTH + SIDELINE_SLACK;
        let depth = (target.y * self.side.sign()).clamp(0.5, COURT_HALF_LENGTH + OUT_OF_PLAY_MARGIN);
        Vec2::new(target.x.clamp(-limit_x, limit_x), depth * self.side.sign())
    }

    /// Where to meet an incoming ball: line up with its path at `depth`, or
    /// chase it once it has bounced or already passed that line
    pub fn intercept_target(&self, ball: &dyn BallFlight, depth: f32) -> Vec2 {
        let pos = ball.position();
        let vel = ball.velocity();
        let sign = self.side.sign();
        let toward_me = vel.y * sign > 0.1;
        let bounced_here = ball.bounce_count() > 0 && Side::of_point(pos) == self.side;
        let line_y = sign * depth;
        let past_line = (pos.y - line_y) * sign > 0.0;

        if !toward_me || bounced_here || past_line {
            return pos + vel * CHASE_LEAD;
        }
        let t = (line_y - pos.y) / vel.y;
        Vec2::new(pos.x + vel.x * t, line_y)
    }

    /// Planar reach radius
    pub fn reach(&self) -> f32 {
        AGENT_BASE_REACH + AGENT_REACH_BONUS * self.profile.athleticism()
    }

    /// Highest contact point
    pub fn height_reach(&self) -> f32 {
        AGENT_BASE_HIGH_REACH + AGENT_JUMP_REACH * self.profile.athleticism()
    }

    /// Ball inside the hitbox this tick (and on this agent's half)
    pub fn can_reach(&self, ball: &dyn BallFlight) -> bool {
        Side::of_point(ball.position()) == self.side
            && self.position.distance(ball.position()) <= self.reach()
            && ball.height() <= self.height_reach()
    }

    /// How far the agent is stretched for the ball, 0.0 - 1.0 of reach
    pub fn stretch(&self, ball: &dyn BallFlight) -> f32 {
        (self.position.distance(ball.position()) / self.reach()).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ball::CourtBall;

    fn body(speed: f32) -> AgentBody {
        let profile = SkillProfile::uniform(4.0, 50.0).with_stat(Stat::Speed, speed);
        AgentBody::new(Side::Near, profile, &SimulationParams::default())
    }

    #[test]
    fn test_faster_players_move_faster() {
        assert!(body(90.0).base_speed() > body(10.0).base_speed());
    }

    #[test]
    fn test_sprint_drains_stamina() {
        let mut b = body(50.0);
        b.reset(Vec2::new(0.0, -20.0));
        for _ in 0..60 {
            b.move_to(Vec2::new(0.0, -2.0), POINT_TICK);
        }
        assert!(b.stamina() < 1.0);
        let drained = b.stamina();
        b.reset(Vec2::new(0.0, -20.0));
        assert!(drained < b.stamina());
    }

    #[test]
    fn test_movement_stays_on_own_half() {
        let mut b = body(50.0);
        b.reset(Vec2::new(0.0, -3.0));
        for _ in 0..600 {
            b.move_to(Vec2::new(40.0, 10.0), POINT_TICK);
        }
        assert!(b.position().y < 0.0);
        assert!(b.position().x <= COURT_HALF_WIDTH + SIDELINE_SLACK);
    }

    #[test]
    fn test_reach_requires_own_half_and_height() {
        let mut b = body(50.0);
        b.reset(Vec2::new(0.0, -15.0));
        let mut ball = CourtBall::new();
        ball.launch(Vec3::new(0.5, -15.0, 2.0), Vec2::new(0.0, 15.0), 0.5, 0.5, 0.0, 0.0);
        assert!(b.can_reach(&ball));
        ball.launch(Vec3::new(0.5, -15.0, 12.0), Vec2::new(0.0, 15.0), 0.5, 0.5, 0.0, 0.0);
        assert!(!b.can_reach(&ball));
        ball.launch(Vec3::new(0.5, 15.0, 2.0), Vec2::new(0.0, -15.0), 0.5, 0.5, 0.0, 0.0);
        assert!(!b.can_reach(&ball));
    }

    #[test]
    fn test_chase_builds_up_speed() {
        let mut quick = body(50.0);
        quick.profile = quick.profile.with_stat(Stat::Reflexes, 99.0);
        let mut slow = body(50.0);
        slow.profile = slow.profile.with_stat(Stat::Reflexes, 1.0);
        assert!(quick.first_step() < slow.first_step());

        let start = Vec2::new(0.0, -HOME_DEPTH);
        let target = Vec2::new(10.0, -HOME_DEPTH);
        let mut walker = body(50.0);
        walker.reset(start);
        walker.move_to(target, POINT_TICK);
        slow.reset(start);
        slow.chase(target, POINT_TICK, POINT_TICK);
        let first = slow.position().distance(start);
        assert!(first > 0.0);
        assert!(first < walker.position().distance(start));

        let mut elapsed = POINT_TICK;
        for _ in 0..120 {
            elapsed += POINT_TICK;
            slow.chase(target, elapsed, POINT_TICK);
        }
        let late = slow.position();
        let next = Vec2::new(10.0, -HOME_DEPTH + 5.0);
        let (full, _) = slow.effective_speed(late.distance(next));
        slow.chase(next, elapsed + POINT_TICK, POINT_TICK);
        assert!((slow.position().distance(late) - full * POINT_TICK).abs() < 1e-3);
    }

    #[test]
    fn test_intercept_lines_up_on_depth() {
        let mut b = body(50.0);
        b.reset(Vec2::new(0.0, -HOME_DEPTH));
        let mut ball = CourtBall::new();
        ball.launch(Vec3::new(0.0, 19.0, 2.5), Vec2::new(-4.0, -16.0), 0.7, 0.3, 0.0, 0.0);
        let target = b.intercept_target(&ball, HOME_DEPTH);
        assert!((target.y + HOME_DEPTH).abs() < 1e-3);
        assert!(target.x < 0.0);
    }
}
