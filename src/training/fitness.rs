//! Fitness battery: the fixed matchups a parameter candidate is scored on

use serde::{Deserialize, Serialize};

use crate::agents::PlayerSpec;
use crate::constants::{DUPR_MAX_DIFFERENTIAL, DUPR_POINTS_PER_RATING};
use crate::court::Side;
use crate::helpers::ratio;
use crate::params::SimulationParams;
use crate::rally;
use crate::rng::SeededRng;
use crate::scoring::MatchRules;

use super::settings::BatterySettings;

/// Expected differential of a rating gap: 12 points per rating, capped at 10.5
pub fn gap_target(gap: f64) -> f64 {
    (gap.abs() * DUPR_POINTS_PER_RATING).min(DUPR_MAX_DIFFERENTIAL) * gap.signum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseKind {
    Gap,
    HumanVsComputer,
    StarterVsComputer,
}

/// One matchup with the near-side differential it should produce
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    pub kind: CaseKind,
    pub label: String,
    pub near: PlayerSpec,
    pub far: PlayerSpec,
    pub target: f64,
}

/// Expand battery settings into concrete cases
pub fn build_battery(settings: &BatterySettings) -> Vec<TestCase> {
    let gaps = settings.gap_pairs.iter().map(|pair| TestCase {
        kind: CaseKind::Gap,
        label: format!("cpu {:.1} vs cpu {:.1}", pair.high, pair.low),
        near: PlayerSpec::computer(pair.high),
        far: PlayerSpec::computer(pair.low),
        target: gap_target((pair.high - pair.low) as f64),
    });
    let humans = settings.human_vs_computer.iter().map(|case| TestCase {
        kind: CaseKind::HumanVsComputer,
        label: format!("human {:.1} vs cpu {:.1}", case.rating, case.rating),
        near: PlayerSpec::human(case.rating),
        far: PlayerSpec::computer(case.rating),
        target: case.target,
    });
    let starters = settings.starter_vs_computer.iter().map(|case| TestCase {
        kind: CaseKind::StarterVsComputer,
        label: format!("starter vs cpu {:.1}", case.rating),
        near: PlayerSpec::starter(),
        far: PlayerSpec::computer(case.rating),
        target: case.target,
    });
    gaps.chain(humans).chain(starters).collect()
}

/// Measured result of one case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseOutcome {
    pub label: String,
    pub kind: CaseKind,
    pub target: f64,
    /// Mean near - far over the samples
    pub actual: f64,
    /// Near win rate
    pub win_rate: f64,
    pub samples: u32,
}

impl CaseOutcome {
    pub fn error(&self) -> f64 {
        self.actual - self.target
    }
}

/// Fitness of one parameter set over the whole battery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Lower is better
    pub fitness: f64,
    /// Mean squared differential error across cases
    pub differential_error: f64,
    pub avg_rally_length: f64,
    pub cases: Vec<CaseOutcome>,
}

/// Play `matches` fast matches of one case. Match `m` of case `c` is seeded
/// from `(seed, c, m)` and odd matches swap the first server.
pub fn play_case(
    params: &SimulationParams,
    case: &TestCase,
    case_index: usize,
    rules: MatchRules,
    matches: u32,
    seed: u64,
) -> (CaseOutcome, u64, u64) {
    let near = case.near.profile(params);
    let far = case.far.profile(params);
    let mut differential = 0i64;
    let mut wins = 0u32;
    let mut rallies = 0u64;
    let mut shots = 0u64;

    for m in 0..matches {
        let mut match_rules = rules;
        if m % 2 == 1 {
            match_rules.first_server = rules.first_server.opponent();
        }
        let mut rng = SeededRng::new(SeededRng::derive_seed(seed, &[case_index as u64, m as u64]));
        let result = rally::simulate_match(&near, &far, match_rules, &mut rng);
        differential += result.point_differential() as i64;
        wins += (result.winner == Side::Near) as u32;
        rallies += result.total_rallies as u64;
        shots += result.total_rally_shots as u64;
    }

    let outcome = CaseOutcome {
        label: case.label.clone(),
        kind: case.kind,
        target: case.target,
        actual: ratio(differential as f64, matches as f64),
        win_rate: ratio(wins as f64, matches as f64),
        samples: matches,
    };
    (outcome, rallies, shots)
}

/// Score a parameter set: mean squared differential error plus the weighted
/// squared rally-length error
pub fn evaluate(
    params: &SimulationParams,
    battery: &[TestCase],
    settings: &BatterySettings,
    rules: MatchRules,
    matches: u32,
    seed: u64,
) -> Evaluation {
    let mut cases = Vec::with_capacity(battery.len());
    let mut rallies = 0u64;
    let mut shots = 0u64;
    for (i, case) in battery.iter().enumerate() {
        let (outcome, r, s) = play_case(params, case, i, rules, matches, seed);
        rallies += r;
        shots += s;
        cases.push(outcome);
    }

    let squared: f64 = cases.iter().map(|c| c.error().powi(2)).sum();
    let differential_error = ratio(squared, cases.len() as f64);
    let avg_rally_length = ratio(shots as f64, rallies as f64);
    let rally_error = (avg_rally_length - settings.rally_length_target).powi(2);

    Evaluation {
        fitness: differential_error + settings.rally_length_weight * rally_error,
        differential_error,
        avg_rally_length,
        cases,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::settings::{GapCase, RatingCase};

    fn small_battery() -> BatterySettings {
        BatterySettings {
            gap_pairs: vec![GapCase { high: 5.0, low: 4.0 }],
            human_vs_computer: vec![RatingCase { rating: 4.0, target: -2.0 }],
            starter_vs_computer: vec![RatingCase { rating: 3.0, target: -6.0 }],
            ..Default::default()
        }
    }

    #[test]
    fn test_gap_target() {
        assert!((gap_target(0.5) - 6.0).abs() < 1e-9);
        assert!((gap_target(1.0) - 10.5).abs() < 1e-9);
        assert!((gap_target(2.0) - 10.5).abs() < 1e-9);
        assert!((gap_target(-0.25) + 3.0).abs() < 1e-9);
        assert_eq!(gap_target(0.0), 0.0);
    }

    #[test]
    fn test_battery_layout() {
        let battery = build_battery(&BatterySettings::default());
        assert_eq!(battery.len(), 11);
        assert_eq!(battery[0].kind, CaseKind::Gap);
        assert_eq!(battery[0].near, PlayerSpec::computer(3.5));
        assert!((battery[0].target - 6.0).abs() < 1e-9);
        assert_eq!(battery.last().map(|c| c.near), Some(PlayerSpec::starter()));
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let settings = small_battery();
        let battery = build_battery(&settings);
        let params = SimulationParams::default();
        let a = evaluate(&params, &battery, &settings, MatchRules::default(), 10, 5);
        let b = evaluate(&params, &battery, &settings, MatchRules::default(), 10, 5);
        assert_eq!(a, b);
        assert_eq!(a.cases.len(), 3);
        assert!(a.fitness >= a.differential_error);
        assert!(a.avg_rally_length > 1.0);
        assert!(a.cases.iter().all(|c| c.samples == 10 && (0.0..=1.0).contains(&c.win_rate)));
    }

    #[test]
    fn test_stronger_computer_wins_gap_case() {
        let settings = BatterySettings {
            gap_pairs: vec![GapCase { high: 7.0, low: 3.0 }],
            human_vs_computer: vec![],
            starter_vs_computer: vec![],
            ..Default::default()
        };
        let battery = build_battery(&settings);
        let eval = evaluate(&SimulationParams::default(), &battery, &settings, MatchRules::default(), 40, 1);
        assert!(eval.cases[0].actual > 0.0);
        assert!(eval.cases[0].win_rate > 0.5);
    }

    #[test]
    fn test_rally_weight_zero_removes_regularizer() {
        let settings = BatterySettings {
            rally_length_weight: 0.0,
            ..small_battery()
        };
        let battery = build_battery(&settings);
        let eval = evaluate(&SimulationParams::default(), &battery, &settings, MatchRules::default(), 6, 9);
        assert_eq!(eval.fitness, eval.differential_error);
    }
}
