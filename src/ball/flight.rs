//! Ball-flight integrator contract
//!
//! The point simulator only talks to the ball through this trait. Court
//! coordinates follow `crate::court`: (x, y) on the ground plane, height
//! separately.

use bevy::prelude::*;

/// Tick-driven ball integrator consumed by the full point simulator
pub trait BallFlight {
    /// Advance the ball by `dt` seconds
    fn step(&mut self, dt: f32);

    /// Ground-plane position
    fn position(&self) -> Vec2;

    fn height(&self) -> f32;

    /// Ground-plane velocity
    fn velocity(&self) -> Vec2;

    /// Sidespin, -1.0 (slice) ..= 1.0
    fn spin(&self) -> f32;

    /// Topspin, 0.0 ..= 1.0
    fn topspin(&self) -> f32;

    /// Bounces since the last launch
    fn bounce_count(&self) -> u32;

    fn bounced_this_frame(&self) -> bool;

    /// Where the most recent bounce landed
    fn last_bounce(&self) -> Option<Vec2>;

    /// First bounce since the last launch landed outside the lines
    fn is_landing_out(&self) -> bool;

    fn is_double_bounce(&self) -> bool;

    /// Ball has left the playing area entirely
    fn is_out_of_bounds(&self) -> bool;

    /// Ball has effectively stopped
    fn is_stalled(&self) -> bool;

    /// Ball struck the net since the last launch
    fn hit_net(&self) -> bool;

    /// Strike the ball from `from` (x, y, height) toward a ground target.
    /// `power` and `arc` are 0.0 ..= 1.0; `spin` is sidespin, `topspin` dips.
    fn launch(&mut self, from: Vec3, toward: Vec2, power: f32, arc: f32, spin: f32, topspin: f32);

    /// Clear all state, ball dead at the origin
    fn reset(&mut self);

    fn speed(&self) -> f32 {
        self.velocity().length()
    }
}
