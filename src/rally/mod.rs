//! Probabilistic rally simulator
//!
//! Closed-form per-shot model: no ball, no agents. Each point is an ace
//! check followed by a bounded exchange where every shot can end as a
//! winner, an unforced error or a forced error. Every probability clamps
//! its own range so any profile pair yields a valid draw.

use bevy::log::debug;

use crate::constants::*;
use crate::court::Side;
use crate::player::{SkillProfile, Stat};
use crate::rng::SeededRng;
use crate::scoring::{MatchRules, MatchState};
use crate::simulation::{MatchResult, PointKind, PointResult};

/// Chance the serve is an outright ace
pub fn ace_chance(server: &SkillProfile, receiver: &SkillProfile) -> f64 {
    let edge = server.value(Stat::Power) * RALLY_ACE_POWER_SCALE
        - receiver.value(Stat::Reflexes) * RALLY_ACE_REFLEX_SCALE;
    (RALLY_ACE_BASE + edge * RALLY_ACE_SENSITIVITY).clamp(RALLY_ACE_MIN, RALLY_ACE_MAX)
}

/// Chance the attacker ends shot `shot` with a clean winner
pub fn winner_chance(attacker: &SkillProfile, defender: &SkillProfile, shot: u32) -> f64 {
    let attack = (attacker.value(Stat::Power)
        + attacker.value(Stat::Accuracy)
        + attacker.value(Stat::Spin))
        / 300.0;
    let defense = (defender.value(Stat::Defense)
        + defender.value(Stat::Positioning)
        + defender.value(Stat::Reflexes))
        / 300.0;
    (RALLY_WINNER_BASE
        + (attack - defense) * RALLY_WINNER_SENSITIVITY
        + shot as f64 * RALLY_WINNER_PER_SHOT)
        .clamp(RALLY_WINNER_MIN, RALLY_WINNER_MAX)
}

/// Chance the attacker misses on shot `shot`
pub fn error_chance(attacker: &SkillProfile, shot: u32) -> f64 {
    let control = (attacker.value(Stat::Consistency) + attacker.value(Stat::Accuracy)) / 200.0;
    (RALLY_ERROR_BASE - control + shot as f64 * RALLY_ERROR_PER_SHOT)
        .clamp(RALLY_ERROR_MIN, RALLY_ERROR_MAX)
}

/// Chance the attacker's shot forces the defender into an error
pub fn forced_error_chance(attacker: &SkillProfile, defender: &SkillProfile) -> f64 {
    let pressure = (attacker.value(Stat::Power) + attacker.value(Stat::Spin)) / 200.0;
    let resist = (defender.value(Stat::Defense) + defender.value(Stat::Reflexes)) / 200.0;
    (RALLY_FORCED_BASE + (pressure - resist) * RALLY_FORCED_SENSITIVITY)
        .clamp(RALLY_FORCED_MIN, RALLY_FORCED_MAX)
}

/// Longest exchange before the point is decided on overall quality
pub fn max_rally_shots(a: &SkillProfile, b: &SkillProfile) -> u32 {
    let avg_defense = (a.value(Stat::Defense)
        + a.value(Stat::Consistency)
        + b.value(Stat::Defense)
        + b.value(Stat::Consistency))
        / 4.0;
    let shots = (RALLY_BASE_SHOTS + avg_defense / 10.0).floor();
    (shots as u32).clamp(MIN_RALLY_SHOTS, MAX_RALLY_SHOTS)
}

/// Server's chance of taking a point that ran to the shot limit
pub fn exhaustion_win_chance(server: &SkillProfile, receiver: &SkillProfile) -> f64 {
    (0.5 + (server.average() - receiver.average()) / 200.0 * RALLY_EXHAUSTION_SENSITIVITY)
        .clamp(0.05, 0.95)
}

/// One resolved exchange, from the server's point of view
#[derive(Debug, Clone, Copy)]
struct Exchange {
    server_won: bool,
    shots: u32,
    kind: PointKind,
}

fn play_exchange(server: &SkillProfile, receiver: &SkillProfile, rng: &mut SeededRng) -> Exchange {
    if rng.chance(ace_chance(server, receiver)) {
        return Exchange { server_won: true, shots: 1, kind: PointKind::Ace };
    }

    let limit = max_rally_shots(server, receiver);
    for shot in 1..=limit {
        let server_attacking = shot % 2 == 1;
        let (attacker, defender) = if server_attacking {
            (server, receiver)
        } else {
            (receiver, server)
        };

        let (attacker_won, kind) = if rng.chance(winner_chance(attacker, defender, shot)) {
            (true, PointKind::Winner)
        } else if rng.chance(error_chance(attacker, shot)) {
            (false, PointKind::UnforcedError)
        } else if rng.chance(forced_error_chance(attacker, defender)) {
            (true, PointKind::ForcedError)
        } else {
            continue;
        };

        return Exchange {
            server_won: attacker_won == server_attacking,
            shots: shot,
            kind,
        };
    }

    // Ran the distance: overall quality decides
    Exchange {
        server_won: rng.chance(exhaustion_win_chance(server, receiver)),
        shots: limit,
        kind: PointKind::Winner,
    }
}

/// Play a single point with `server` serving
pub fn simulate_point(
    near: &SkillProfile,
    far: &SkillProfile,
    server: Side,
    rng: &mut SeededRng,
) -> PointResult {
    let (serving, receiving) = match server {
        Side::Near => (near, far),
        Side::Far => (far, near),
    };
    let exchange = play_exchange(serving, receiving, rng);
    let winner = if exchange.server_won { server } else { server.opponent() };
    debug!(
        "rally: {} served, {} won on a {} after {} shots",
        server,
        winner,
        exchange.kind.label(),
        exchange.shots
    );
    PointResult {
        winner,
        rally_shots: exchange.shots,
        detail: None,
    }
}

/// Play a full game. Pure function of the profiles, rules and RNG stream.
pub fn simulate_match(
    near: &SkillProfile,
    far: &SkillProfile,
    rules: MatchRules,
    rng: &mut SeededRng,
) -> MatchResult {
    let seed = rng.seed();
    let mut state = MatchState::new(rules);
    let mut total_rally_shots = 0;

    while !state.is_over() {
        let point = simulate_point(near, far, state.server(), rng);
        total_rally_shots += point.rally_shots;
        state.record_rally(point.winner);
    }

    MatchResult {
        score_near: state.score(Side::Near),
        score_far: state.score(Side::Far),
        // A finished state always has a winner; rallies are never tied
        winner: state.winner().unwrap_or(rules.first_server),
        total_rallies: state.rallies(),
        total_rally_shots,
        seed,
        detail: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SimulationParams;
    use crate::scoring::ScoringMode;

    fn flat(value: f32) -> SkillProfile {
        SkillProfile::uniform(4.0, value)
    }

    #[test]
    fn test_match_is_deterministic() {
        let params = SimulationParams::default();
        let near = params.profile_for_rating(4.5);
        let far = params.npc_profile(4.0);
        let a = simulate_match(&near, &far, MatchRules::default(), &mut SeededRng::new(99));
        let b = simulate_match(&near, &far, MatchRules::default(), &mut SeededRng::new(99));
        assert_eq!(a, b);
        assert_eq!(a.seed, 99);
    }

    #[test]
    fn test_probabilities_stay_clamped() {
        for (a, b) in [(1.0, 99.0), (99.0, 1.0), (50.0, 50.0), (1.0, 1.0), (99.0, 99.0)] {
            let (x, y) = (flat(a), flat(b));
            let ace = ace_chance(&x, &y);
            assert!((RALLY_ACE_MIN..=RALLY_ACE_MAX).contains(&ace));
            for shot in [1, 7, 40] {
                let w = winner_chance(&x, &y, shot);
                assert!((RALLY_WINNER_MIN..=RALLY_WINNER_MAX).contains(&w));
                let e = error_chance(&x, shot);
                assert!((RALLY_ERROR_MIN..=RALLY_ERROR_MAX).contains(&e));
            }
            let f = forced_error_chance(&x, &y);
            assert!((RALLY_FORCED_MIN..=RALLY_FORCED_MAX).contains(&f));
            let ex = exhaustion_win_chance(&x, &y);
            assert!((0.05..=0.95).contains(&ex));
            let max = max_rally_shots(&x, &y);
            assert!((MIN_RALLY_SHOTS..=MAX_RALLY_SHOTS).contains(&max));
        }
    }

    #[test]
    fn test_ace_chance_monotonic() {
        let receiver = flat(50.0);
        let mut last = 0.0;
        for power in (1..=99).step_by(7) {
            let server = flat(50.0).with_stat(Stat::Power, power as f32);
            let chance = ace_chance(&server, &receiver);
            assert!(chance >= last);
            last = chance;
        }

        let server = flat(50.0);
        let mut last = 1.0;
        for reflexes in (1..=99).step_by(7) {
            let receiver = flat(50.0).with_stat(Stat::Reflexes, reflexes as f32);
            let chance = ace_chance(&server, &receiver);
            assert!(chance <= last);
            last = chance;
        }
    }

    #[test]
    fn test_ace_dominance() {
        let server = flat(50.0).with_stat(Stat::Power, 99.0);
        let receiver = flat(50.0).with_stat(Stat::Reflexes, 1.0);
        assert!(ace_chance(&server, &receiver) >= 0.20);
    }

    #[test]
    fn test_symmetric_profiles_split_evenly() {
        let profile = SimulationParams::default().profile_for_rating(4.0);
        let mut near_wins = 0;
        for i in 0..1000u64 {
            let rules = MatchRules {
                first_server: if i % 2 == 0 { Side::Near } else { Side::Far },
                ..Default::default()
            };
            let mut rng = SeededRng::new(SeededRng::derive_seed(7, &[i]));
            if simulate_match(&profile, &profile, rules, &mut rng).winner == Side::Near {
                near_wins += 1;
            }
        }
        let rate = near_wins as f64 / 1000.0;
        assert!((rate - 0.5).abs() <= 0.05, "win rate {}", rate);
    }

    #[test]
    fn test_matches_terminate_within_caps() {
        let params = SimulationParams::default();
        for seed in 0..200 {
            let mut rng = SeededRng::new(seed);
            let scoring = if seed % 2 == 0 { ScoringMode::Rally } else { ScoringMode::SideOut };
            let rules = MatchRules { scoring, ..Default::default() };
            let result = simulate_match(
                &params.profile_for_rating(2.0 + (seed % 7) as f32),
                &params.npc_profile(5.0),
                rules,
                &mut rng,
            );
            assert!(result.total_rallies <= MAX_RALLIES);
            assert!(result.score_near.max(result.score_far) <= MAX_SCORE);
            assert!(result.total_rally_shots >= result.total_rallies);
            assert!(result.detail.is_none());
        }
    }

    #[test]
    fn test_stronger_player_wins_more() {
        let params = SimulationParams::default();
        let strong = params.profile_for_rating(6.0);
        let weak = params.profile_for_rating(3.0);
        let mut diff = 0;
        for seed in 0..200 {
            let result =
                simulate_match(&strong, &weak, MatchRules::default(), &mut SeededRng::new(seed));
            diff += result.point_differential();
        }
        assert!(diff > 0);
    }

    #[test]
    fn test_point_reports_shot_count() {
        let near = flat(50.0);
        let far = flat(50.0);
        let mut rng = SeededRng::new(3);
        for _ in 0..100 {
            let point = simulate_point(&near, &far, Side::Far, &mut rng);
            assert!(point.rally_shots >= 1);
            assert!(point.rally_shots <= max_rally_shots(&near, &far));
        }
    }
}
