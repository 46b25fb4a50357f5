//! Full point simulator
//!
//! Drives two decision agents and a ball integrator at a fixed step, one
//! point at a time, and calls the point the way a referee would. Each tick:
//! advance the ball, let both agents observe and move, give the near then
//! far agent a chance to strike, then check terminal ball states (net, first
//! bounce, double bounce, out of play, stalled).

use bevy::log::debug;
use bevy::prelude::*;

use crate::agents::{DecisionAgent, ErrorKind, PlayerSpec, RallyContext};
use crate::ball::{BallFlight, CourtBall};
use crate::constants::*;
use crate::court::{Side, in_kitchen, ready_position, serve_position};
use crate::params::SimulationParams;
use crate::rng::SeededRng;
use crate::scoring::{MatchRules, MatchState};
use crate::simulation::{MatchDetail, MatchResult, MatchStats, PointDetail, PointKind, PointResult};

/// Lowest contact height used when re-launching a ball off the ground
const MIN_CONTACT_HEIGHT: f32 = 0.5;

pub struct PointSimulator<B: BallFlight> {
    ball: B,
    /// Indexed by `Side::index`
    agents: [Box<dyn DecisionAgent>; 2],
    rng: SeededRng,
    stats: MatchStats,
    server: Side,
    last_hitter: Option<Side>,
    /// Shots struck this point, serve included
    shot_count: u32,
    clock: f32,
    live: bool,
}

impl<B: BallFlight> PointSimulator<B> {
    pub fn new(
        ball: B,
        near: Box<dyn DecisionAgent>,
        far: Box<dyn DecisionAgent>,
        rng: SeededRng,
    ) -> Self {
        Self {
            ball,
            agents: [near, far],
            rng,
            stats: MatchStats::new(),
            server: Side::Near,
            last_hitter: None,
            shot_count: 0,
            clock: 0.0,
            live: false,
        }
    }

    pub fn ball(&self) -> &B {
        &self.ball
    }

    pub fn ball_mut(&mut self) -> &mut B {
        &mut self.ball
    }

    pub fn agent(&self, side: Side) -> &dyn DecisionAgent {
        self.agents[side.index()].as_ref()
    }

    pub fn stats(&self) -> &MatchStats {
        &self.stats
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn shot_count(&self) -> u32 {
        self.shot_count
    }

    pub fn last_hitter(&self) -> Option<Side> {
        self.last_hitter
    }

    fn context_for(&self, side: Side) -> RallyContext {
        RallyContext {
            shots: self.shot_count,
            incoming: self.live && self.last_hitter == Some(side.opponent()),
            opponent_rating: self.agents[side.opponent().index()].profile().rating(),
        }
    }

    /// Reset ball and agents, then serve. `server_score` picks the service court.
    pub fn start_point(&mut self, server: Side, server_score: u32) {
        self.ball.reset();
        let receiver = server.opponent();
        let serve_spot = serve_position(server, server_score);
        let receive_spot = Vec2::new(-serve_spot.x, ready_position(receiver, HOME_DEPTH).y);
        self.agents[server.index()].reset_for_point(serve_spot);
        self.agents[receiver.index()].reset_for_point(receive_spot);

        self.server = server;
        self.clock = 0.0;
        self.live = true;

        let shot = self.agents[server.index()].serve(&mut self.rng);
        let from = serve_spot.extend(BALL_CONTACT_HEIGHT);
        self.ball
            .launch(from, shot.target, shot.power, shot.arc, shot.spin, shot.topspin);
        self.last_hitter = Some(server);
        self.shot_count = 1;
    }

    /// Advance one fixed step. Returns the result once the point is over.
    pub fn tick(&mut self) -> Option<PointResult> {
        if !self.live {
            return None;
        }

        self.clock += POINT_TICK;
        if self.clock >= POINT_CLOCK_LIMIT {
            let hitter = self.last_hitter.unwrap_or(self.server);
            debug!("point clock expired, charged to {}", hitter);
            return Some(self.end_point(hitter.opponent(), PointKind::UnforcedError));
        }

        self.ball.step(POINT_TICK);

        for side in Side::BOTH {
            let ctx = self.context_for(side);
            let ball: &dyn BallFlight = &self.ball;
            self.agents[side.index()].observe(ball, &ctx, POINT_TICK, &mut self.rng);
        }

        // A ball landing this tick is called before anyone may play it
        if !self.ball.bounced_this_frame() {
            for side in Side::BOTH {
                let ctx = self.context_for(side);
                let agent = &self.agents[side.index()];
                if agent.can_reach(&self.ball) && agent.should_swing(&self.ball, &ctx) {
                    if let Some(result) = self.attempt_hit(side) {
                        return Some(result);
                    }
                }
            }
        }

        self.check_ball()
    }

    /// `side` strikes the ball now. Applies the two-bounce and kitchen rules
    /// and the agent's error decision; returns a result if the contact ended
    /// the point. Ignored when the ball is not `side`'s to play.
    pub fn attempt_hit(&mut self, side: Side) -> Option<PointResult> {
        if !self.live
            || self.last_hitter == Some(side)
            || Side::of_point(self.ball.position()) != side
        {
            return None;
        }
        let opponent = side.opponent();
        let ctx = self.context_for(side);
        let on_the_fly = self.ball.bounce_count() == 0;

        if on_the_fly && ctx.must_bounce() {
            debug!("{} struck the ball before it bounced", side);
            return Some(self.end_point(opponent, PointKind::UnforcedError));
        }
        if on_the_fly && in_kitchen(self.agents[side.index()].position()) {
            debug!("{} volleyed from the kitchen", side);
            return Some(self.end_point(opponent, PointKind::UnforcedError));
        }

        let ball: &dyn BallFlight = &self.ball;
        let agent = &mut self.agents[side.index()];
        match agent.error_check(ball, &ctx, &mut self.rng) {
            Some(ErrorKind::Forced) => return Some(self.end_point(opponent, PointKind::ForcedError)),
            Some(ErrorKind::Unforced) => {
                return Some(self.end_point(opponent, PointKind::UnforcedError));
            }
            None => {}
        }

        let shot = agent.choose_shot(ball, &ctx, &mut self.rng);
        let from = self
            .ball
            .position()
            .extend(self.ball.height().max(MIN_CONTACT_HEIGHT));
        self.ball
            .launch(from, shot.target, shot.power, shot.arc, shot.spin, shot.topspin);
        self.last_hitter = Some(side);
        self.shot_count += 1;
        None
    }

    /// Terminal ball states, in priority order
    fn check_ball(&mut self) -> Option<PointResult> {
        let hitter = self.last_hitter.unwrap_or(self.server);
        let receiver = hitter.opponent();
        let clean_kind = if self.shot_count == 1 {
            PointKind::Ace
        } else {
            PointKind::Winner
        };

        if self.ball.hit_net() {
            return Some(self.end_point(receiver, PointKind::UnforcedError));
        }

        if self.ball.bounced_this_frame() && self.ball.bounce_count() == 1 {
            let spot = self.ball.last_bounce().unwrap_or(self.ball.position());
            let landed_on = Side::of_point(spot);
            if self.shot_count == 1 && landed_on == receiver && in_kitchen(spot) {
                debug!("{} served into the kitchen", hitter);
                return Some(self.end_point(receiver, PointKind::UnforcedError));
            }
            if self.ball.is_landing_out() || landed_on == hitter {
                return Some(self.end_point(receiver, PointKind::UnforcedError));
            }
        }

        if self.ball.is_double_bounce() {
            return Some(self.end_point(hitter, clean_kind));
        }

        if self.ball.is_out_of_bounds() || self.ball.is_stalled() {
            if self.ball.bounce_count() == 0 {
                return Some(self.end_point(receiver, PointKind::UnforcedError));
            }
            return Some(self.end_point(hitter, clean_kind));
        }

        None
    }

    fn end_point(&mut self, winner: Side, kind: PointKind) -> PointResult {
        self.live = false;
        self.stats.record(winner, kind);
        self.ball.reset();
        PointResult {
            winner,
            rally_shots: self.shot_count,
            detail: Some(PointDetail {
                kind,
                near: self.stats.side(Side::Near),
                far: self.stats.side(Side::Far),
            }),
        }
    }

    /// Serve and play out one point
    pub fn play_point(&mut self, server: Side, server_score: u32) -> PointResult {
        self.start_point(server, server_score);
        loop {
            if let Some(result) = self.tick() {
                return result;
            }
        }
    }

    /// Play a full game under `rules`. Tallies start from zero.
    pub fn play_match(&mut self, rules: MatchRules) -> MatchResult {
        let seed = self.rng.seed();
        self.stats = MatchStats::new();
        let mut state = MatchState::new(rules);
        let mut total_rally_shots = 0;

        while !state.is_over() {
            let server = state.server();
            let point = self.play_point(server, state.score(server));
            total_rally_shots += point.rally_shots;
            state.record_rally(point.winner);
        }

        let total_rallies = state.rallies();
        MatchResult {
            score_near: state.score(Side::Near),
            score_far: state.score(Side::Far),
            winner: state.winner().unwrap_or(rules.first_server),
            total_rallies,
            total_rally_shots,
            seed,
            detail: Some(MatchDetail {
                avg_rally_length: crate::helpers::ratio(total_rally_shots as f64, total_rallies as f64),
                near: self.stats.side(Side::Near),
                far: self.stats.side(Side::Far),
            }),
        }
    }
}

/// Full-fidelity match between two players on the reference court ball
pub fn simulate_full_match(
    params: &SimulationParams,
    near: PlayerSpec,
    far: PlayerSpec,
    rules: MatchRules,
    seed: u64,
) -> MatchResult {
    let mut sim = PointSimulator::new(
        CourtBall::new(),
        near.build_agent(Side::Near, params),
        far.build_agent(Side::Far, params),
        SeededRng::new(seed),
    );
    sim.play_match(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::SideTallies;

    fn computer_sim(seed: u64) -> PointSimulator<CourtBall> {
        let params = SimulationParams::default();
        PointSimulator::new(
            CourtBall::new(),
            PlayerSpec::computer(4.0).build_agent(Side::Near, &params),
            PlayerSpec::computer(4.0).build_agent(Side::Far, &params),
            SeededRng::new(seed),
        )
    }

    fn kind(result: &PointResult) -> PointKind {
        result.detail.map(|d| d.kind).unwrap()
    }

    #[test]
    fn test_fly_hit_on_return_is_unforced_error() {
        let mut sim = computer_sim(1);
        sim.start_point(Side::Near, 0);
        for _ in 0..600 {
            sim.ball_mut().step(POINT_TICK);
            if sim.ball().position().y > 3.0 {
                break;
            }
        }
        assert_eq!(sim.ball().bounce_count(), 0);
        let result = sim.attempt_hit(Side::Far).expect("fly hit ends the point");
        assert_eq!(result.winner, Side::Near);
        assert_eq!(result.rally_shots, 1);
        assert_eq!(kind(&result), PointKind::UnforcedError);
        assert!(!sim.is_live());
        assert_eq!(sim.stats().side(Side::Far).unforced_errors, 1);
    }

    #[test]
    fn test_serve_into_kitchen_is_fault() {
        let mut sim = computer_sim(2);
        sim.start_point(Side::Near, 0);
        sim.ball_mut()
            .launch(Vec3::new(2.5, -SERVE_DEPTH, 2.5), Vec2::new(-1.0, 4.0), 0.4, 0.5, 0.0, 0.0);
        let result = loop {
            if let Some(result) = sim.tick() {
                break result;
            }
        };
        assert_eq!(result.winner, Side::Far);
        assert_eq!(kind(&result), PointKind::UnforcedError);
        assert_eq!(result.rally_shots, 1);
    }

    #[test]
    fn test_serve_long_is_fault() {
        let mut sim = computer_sim(3);
        sim.start_point(Side::Far, 0);
        sim.ball_mut()
            .launch(Vec3::new(-2.5, SERVE_DEPTH, 2.5), Vec2::new(2.0, -30.0), 0.9, 0.2, 0.0, 0.0);
        let result = loop {
            if let Some(result) = sim.tick() {
                break result;
            }
        };
        assert_eq!(result.winner, Side::Near);
        assert_eq!(kind(&result), PointKind::UnforcedError);
    }

    #[test]
    fn test_ball_landing_on_own_side_is_charged_to_hitter() {
        let mut sim = computer_sim(4);
        sim.start_point(Side::Near, 0);
        sim.ball_mut()
            .launch(Vec3::new(0.0, -10.0, 2.5), Vec2::new(0.0, -3.0), 0.3, 0.3, 0.0, 0.0);
        let mut result = None;
        for _ in 0..240 {
            result = sim.tick();
            if result.is_some() {
                break;
            }
        }
        let result = result.expect("point should end");
        assert_eq!(result.winner, Side::Far);
        assert_eq!(kind(&result), PointKind::UnforcedError);
    }

    #[test]
    fn test_points_always_resolve() {
        let mut sim = computer_sim(5);
        for i in 0..20 {
            let server = if i % 2 == 0 { Side::Near } else { Side::Far };
            let result = sim.play_point(server, i);
            assert!(result.rally_shots >= 1);
            assert!(result.detail.is_some());
            assert!(!sim.is_live());
        }
    }

    #[test]
    fn test_stronger_computer_hits_past_weaker_one() {
        let params = SimulationParams::default();
        let mut strong = SideTallies::default();
        let mut strong_wins = 0;
        for seed in 0..6 {
            let result = simulate_full_match(
                &params,
                PlayerSpec::computer(6.0),
                PlayerSpec::computer(3.0),
                MatchRules::default(),
                seed,
            );
            let detail = result.detail.expect("full matches carry detail");
            strong.aces += detail.near.aces;
            strong.winners += detail.near.winners;
            if result.winner == Side::Near {
                strong_wins += 1;
            }
        }
        assert!(strong.aces + strong.winners > 0, "{:?}", strong);
        assert!(strong_wins >= 4);
    }

    #[test]
    fn test_full_match_is_deterministic_and_tallied() {
        let params = SimulationParams::default();
        let run = || {
            simulate_full_match(
                &params,
                PlayerSpec::human(4.0),
                PlayerSpec::computer(4.0),
                MatchRules::default(),
                42,
            )
        };
        let a = run();
        let b = run();
        assert_eq!(a, b);
        let detail = a.detail.expect("full matches carry detail");
        assert_eq!(detail.near.total() + detail.far.total(), a.total_rallies);
        assert!(a.total_rallies <= MAX_RALLIES);
        assert!(a.score_near.max(a.score_far) >= POINTS_TO_WIN.min(MAX_SCORE) || a.total_rallies == MAX_RALLIES);
    }
}
