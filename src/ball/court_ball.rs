//! Reference ball integrator: projectile flight with drag, spin, bounces
//! and a net plane at y = 0.

use bevy::prelude::*;

use super::flight::BallFlight;
use crate::constants::*;
use crate::court::{beyond_play, in_bounds};
use crate::helpers::lerp;

/// Lowest and highest net clearance a launch aims for (above the tape)
const MIN_CLEARANCE: f32 = 0.3;
const MAX_CLEARANCE: f32 = 5.0;
/// Vertical bounce speed below which the ball starts rolling
const ROLL_THRESHOLD: f32 = 1.0;
/// Horizontal velocity retained after 1 second of rolling
const ROLL_FRICTION: f32 = 0.3;
/// Closer than this to the net the clearance fit degenerates into a pop-up
const MIN_NET_DISTANCE: f32 = 1.0;
/// Posts sit this far outside the sidelines
const NET_POST_OVERHANG: f32 = 1.0;

#[derive(Debug, Clone, Default)]
pub struct CourtBall {
    /// (x, y, height)
    pos: Vec3,
    vel: Vec3,
    spin: f32,
    topspin: f32,
    bounces: u32,
    bounced_this_frame: bool,
    last_bounce: Option<Vec2>,
    landing_out: bool,
    net_hit: bool,
    stall_frames: u32,
    live: bool,
}

impl CourtBall {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full 3-D position (x, y, height)
    pub fn position_3d(&self) -> Vec3 {
        self.pos
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    fn effective_gravity(topspin: f32) -> f32 {
        BALL_GRAVITY + topspin.clamp(0.0, 1.0) * BALL_TOPSPIN_GRAVITY
    }

    /// Solve for the launch velocity. Across the net the trajectory is fitted
    /// through the clearance height over the net and the target; otherwise
    /// horizontal speed comes straight from power.
    fn solve_velocity(from: Vec3, toward: Vec2, power: f32, arc: f32, gravity: f32) -> Vec3 {
        let start = from.truncate();
        let delta = toward - start;
        let dist = delta.length().max(0.5);
        let dir = if delta.length() > f32::EPSILON {
            delta / delta.length()
        } else {
            Vec2::new(0.0, -start.y.signum())
        };
        let h0 = from.z.max(0.0);

        // Ground distance to the net plane along the shot line
        let to_net = if dir.y.abs() > 1e-4 { -start.y / dir.y } else { -1.0 };

        let (horizontal_speed, slope) = if to_net > MIN_NET_DISTANCE && to_net < dist - 0.1 {
            let clearance = NET_HEIGHT
                + lerp(MAX_CLEARANCE, MIN_CLEARANCE, power.clamp(0.0, 1.0))
                    * (0.5 + arc.clamp(0.0, 1.0));
            // z(s) = h0 + a*s - b*s^2 through (to_net, clearance) and (dist, 0)
            let b = ((clearance - h0 + h0 * to_net / dist) / (to_net * (dist - to_net))).max(1e-4);
            let a = (b * dist * dist - h0) / dist;
            ((gravity / (2.0 * b)).sqrt(), a)
        } else {
            let speed = lerp(BALL_MIN_SPEED, BALL_MAX_SPEED, power.clamp(0.0, 1.0))
                * (1.0 - 0.35 * arc.clamp(0.0, 1.0));
            let t = dist / speed;
            let vz = (0.5 * gravity * t * t - h0) / t;
            (speed, vz / speed)
        };

        Vec3::new(
            dir.x * horizontal_speed,
            dir.y * horizontal_speed,
            slope * horizontal_speed,
        )
    }
}

impl BallFlight for CourtBall {
    fn step(&mut self, dt: f32) {
        self.bounced_this_frame = false;
        if !self.live || self.net_hit {
            return;
        }

        let airborne = self.pos.z > 0.0 || self.vel.z > 0.0;
        if airborne {
            self.vel.z -= Self::effective_gravity(self.topspin) * dt;
            self.vel.x += self.spin * BALL_SPIN_CURVE * dt;
            let drag = BALL_AIR_DRAG.powf(dt);
            self.vel.x *= drag;
            self.vel.y *= drag;
        } else {
            let friction = ROLL_FRICTION.powf(dt);
            self.vel.x *= friction;
            self.vel.y *= friction;
        }
        let spin_decay = BALL_SPIN_DECAY.powf(dt);
        self.spin *= spin_decay;

        let prev = self.pos;
        self.pos += self.vel * dt;

        // Net plane crossing
        if prev.y != 0.0 && prev.y.signum() != self.pos.y.signum() {
            let f = prev.y / (prev.y - self.pos.y);
            let crossing = prev + (self.pos - prev) * f;
            if crossing.z < NET_HEIGHT && crossing.x.abs() <= COURT_HALF_WIDTH + NET_POST_OVERHANG {
                self.net_hit = true;
                self.pos = Vec3::new(crossing.x, prev.y.signum() * 0.05, crossing.z.max(0.0));
                self.vel = Vec3::ZERO;
                return;
            }
        }

        // Ground contact
        if self.pos.z <= 0.0 && self.vel.z < 0.0 {
            self.pos.z = 0.0;
            self.bounces += 1;
            self.bounced_this_frame = true;
            let spot = self.pos.truncate();
            self.last_bounce = Some(spot);
            if self.bounces == 1 {
                self.landing_out = !in_bounds(spot);
            }
            self.vel.z = -self.vel.z * BALL_RESTITUTION;
            self.vel.x *= BALL_BOUNCE_FRICTION;
            self.vel.y *= BALL_BOUNCE_FRICTION;
            if self.vel.z < ROLL_THRESHOLD {
                self.vel.z = 0.0;
            }
        }

        let grounded = self.pos.z <= 0.01 && self.vel.z <= 0.0;
        if grounded && self.velocity().length() < BALL_STALL_SPEED {
            self.stall_frames += 1;
        } else {
            self.stall_frames = 0;
        }
    }

    fn position(&self) -> Vec2 {
        self.pos.truncate()
    }

    fn height(&self) -> f32 {
        self.pos.z
    }

    fn velocity(&self) -> Vec2 {
        self.vel.truncate()
    }

    fn spin(&self) -> f32 {
        self.spin
    }

    fn topspin(&self) -> f32 {
        self.topspin
    }

    fn bounce_count(&self) -> u32 {
        self.bounces
    }

    fn bounced_this_frame(&self) -> bool {
        self.bounced_this_frame
    }

    fn last_bounce(&self) -> Option<Vec2> {
        self.last_bounce
    }

    fn is_landing_out(&self) -> bool {
        self.landing_out
    }

    fn is_double_bounce(&self) -> bool {
        self.bounces >= 2
    }

    fn is_out_of_bounds(&self) -> bool {
        beyond_play(self.pos.truncate())
    }

    fn is_stalled(&self) -> bool {
        self.stall_frames >= BALL_STALL_FRAMES
    }

    fn hit_net(&self) -> bool {
        self.net_hit
    }

    fn launch(&mut self, from: Vec3, toward: Vec2, power: f32, arc: f32, spin: f32, topspin: f32) {
        let topspin = topspin.clamp(0.0, 1.0);
        self.pos = from;
        self.vel = Self::solve_velocity(from, toward, power, arc, Self::effective_gravity(topspin));
        self.spin = spin.clamp(-1.0, 1.0);
        self.topspin = topspin;
        self.bounces = 0;
        self.bounced_this_frame = false;
        self.last_bounce = None;
        self.landing_out = false;
        self.net_hit = false;
        self.stall_frames = 0;
        self.live = true;
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fly_until_bounce(ball: &mut CourtBall) -> Option<Vec2> {
        for _ in 0..2000 {
            ball.step(POINT_TICK);
            if ball.hit_net() {
                return None;
            }
            if ball.bounced_this_frame() {
                return ball.last_bounce();
            }
        }
        None
    }

    #[test]
    fn test_drive_clears_net_and_lands_near_target() {
        let mut ball = CourtBall::new();
        let target = Vec2::new(2.0, 16.0);
        ball.launch(Vec3::new(0.0, -19.0, BALL_CONTACT_HEIGHT), target, 0.8, 0.3, 0.0, 0.0);
        let landed = fly_until_bounce(&mut ball).expect("ball should bounce");
        assert!(!ball.hit_net());
        assert!(landed.y > KITCHEN_DEPTH, "landed at {:?}", landed);
        assert!(landed.distance(target) < 3.0, "landed at {:?}", landed);
        assert!(!ball.is_landing_out());
    }

    #[test]
    fn test_dink_clears_net() {
        let mut ball = CourtBall::new();
        ball.launch(Vec3::new(0.0, -8.0, 1.5), Vec2::new(-1.0, 5.0), 0.2, 0.3, 0.0, 0.0);
        let landed = fly_until_bounce(&mut ball).expect("dink should clear the net");
        assert!(landed.y > 0.0 && landed.y < KITCHEN_DEPTH);
    }

    #[test]
    fn test_ball_into_net_is_flagged() {
        let mut ball = CourtBall::new();
        // Launched from below the tape and aimed at the net itself
        ball.launch(Vec3::new(0.0, -3.0, 0.5), Vec2::new(0.0, -0.2), 1.0, 0.0, 0.0, 0.0);
        ball.vel = Vec3::new(0.0, 40.0, 0.0);
        for _ in 0..120 {
            ball.step(POINT_TICK);
        }
        assert!(ball.hit_net());
        assert!(ball.position().y < 0.0);
    }

    #[test]
    fn test_long_ball_lands_out() {
        let mut ball = CourtBall::new();
        ball.launch(Vec3::new(0.0, -19.0, 2.5), Vec2::new(0.0, 30.0), 0.9, 0.2, 0.0, 0.0);
        fly_until_bounce(&mut ball).expect("ball should bounce");
        assert!(ball.is_landing_out());
    }

    #[test]
    fn test_ball_eventually_double_bounces_and_stalls() {
        let mut ball = CourtBall::new();
        ball.launch(Vec3::new(0.0, -19.0, 2.5), Vec2::new(0.0, 10.0), 0.1, 0.5, 0.0, 0.0);
        let mut double = false;
        for _ in 0..(120 * 20) {
            ball.step(POINT_TICK);
            double |= ball.is_double_bounce();
            if ball.is_stalled() || ball.is_out_of_bounds() {
                break;
            }
        }
        assert!(double);
        assert!(ball.is_stalled() || ball.is_out_of_bounds());
    }

    #[test]
    fn test_reset_clears_state() {
        let mut ball = CourtBall::new();
        ball.launch(Vec3::new(0.0, -19.0, 2.5), Vec2::new(0.0, 10.0), 0.5, 0.5, 0.2, 0.5);
        ball.step(POINT_TICK);
        ball.reset();
        assert!(!ball.is_live());
        assert_eq!(ball.bounce_count(), 0);
        assert_eq!(ball.last_bounce(), None);
    }
}
