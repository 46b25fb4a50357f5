//! Natural Evolution Strategy trainer over the 37-scalar parameter vector
//!
//! The search runs in normalized space: every scalar is mapped onto [0, 1]
//! through its valid range, perturbed there, and mapped back (and
//! sanitized) before simulation.

use bevy::log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use thiserror::Error;

use crate::agents::PlayerSpec;
use crate::helpers::ratio;
use crate::params::{PARAM_COUNT, SimulationParams, param_bounds};
use crate::point::simulate_full_match;
use crate::rng::SeededRng;

use super::fitness::{Evaluation, TestCase, build_battery, evaluate, play_case};
use super::history::{GenerationRecord, HistoryError, MemoryHistory, TrainingHistory};
use super::report::{CrossCheckEntry, TrainingReport};
use super::settings::{SettingsError, TrainerSettings};

type Vector = [f64; PARAM_COUNT];

// Seed streams under (base seed, generation, ...)
const STREAM_NOISE: u64 = 0;
const STREAM_EVAL: u64 = 1;
const STREAM_ESTIMATE: u64 = 2;
const STREAM_FINAL: u64 = u64::MAX;
const STREAM_CROSS_CHECK: u64 = u64::MAX - 1;

#[derive(Debug, Error)]
pub enum TrainerError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrainerState {
    #[default]
    Idle,
    Running,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Best fitness stopped improving for `patience` generations
    Converged,
    MaxGenerations,
    /// The stop flag was raised
    Stopped,
}

impl StopReason {
    pub fn label(&self) -> &'static str {
        match self {
            StopReason::Converged => "converged",
            StopReason::MaxGenerations => "generation cap",
            StopReason::Stopped => "stopped",
        }
    }
}

/// Progress emitted after every generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: u32,
    /// Mean candidate fitness
    pub mean_fitness: f64,
    /// Best candidate fitness
    pub min_fitness: f64,
    /// Fitness of the updated running estimate
    pub estimate_fitness: f64,
    /// Best estimate fitness seen so far (never increases)
    pub best_fitness: f64,
    pub elapsed_secs: f64,
}

/// What a finished run hands back
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub best: SimulationParams,
    pub stop_reason: StopReason,
    pub report: TrainingReport,
}

/// Map parameters into [0, 1] per scalar
pub fn normalize(params: &SimulationParams) -> Vector {
    let mut out = params.to_array();
    for (i, v) in out.iter_mut().enumerate() {
        let (lo, hi) = param_bounds(i);
        *v = ((*v - lo) / (hi - lo)).clamp(0.0, 1.0);
    }
    out
}

/// Inverse of `normalize`, clamped and sanitized
pub fn denormalize(theta: &Vector) -> SimulationParams {
    let mut values = [0.0; PARAM_COUNT];
    for (i, v) in values.iter_mut().enumerate() {
        let (lo, hi) = param_bounds(i);
        *v = lo + theta[i].clamp(0.0, 1.0) * (hi - lo);
    }
    SimulationParams::from_array(&values)
}

/// Centered ranks: best (lowest) fitness gets +0.5, worst -0.5
pub fn centered_rank_weights(fitness: &[f64]) -> Vec<f64> {
    let n = fitness.len();
    if n < 2 {
        return vec![0.0; n];
    }
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| fitness[a].total_cmp(&fitness[b]));
    let mut weights = vec![0.0; n];
    for (rank, &i) in order.iter().enumerate() {
        weights[i] = 0.5 - rank as f64 / (n - 1) as f64;
    }
    weights
}

fn gaussian_vector(rng: &mut SeededRng) -> Vector {
    let mut eps = [0.0; PARAM_COUNT];
    for e in eps.iter_mut() {
        *e = rng.gaussian();
    }
    eps
}

pub struct NesTrainer {
    settings: TrainerSettings,
    battery: Vec<TestCase>,
    theta: Vector,
    best: SimulationParams,
    best_fitness: f64,
    generation: u32,
    stale: u32,
    state: TrainerState,
    stop: Arc<AtomicBool>,
    history: Box<dyn TrainingHistory>,
    run_id: String,
    pool: Option<rayon::ThreadPool>,
}

impl NesTrainer {
    pub fn new(settings: TrainerSettings, initial: SimulationParams) -> Result<Self, TrainerError> {
        settings.validate()?;
        let pool = if settings.threads > 0 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(settings.threads)
                    .build()?,
            )
        } else {
            None
        };
        let initial = initial.sanitized();
        Ok(Self {
            battery: build_battery(&settings.battery),
            theta: normalize(&initial),
            best: initial,
            best_fitness: f64::INFINITY,
            generation: 0,
            stale: 0,
            state: TrainerState::Idle,
            stop: Arc::new(AtomicBool::new(false)),
            history: Box::new(MemoryHistory::new()),
            run_id: uuid::Uuid::new_v4().to_string(),
            pool,
            settings,
        })
    }

    /// Record generations in `history` instead of the in-memory store
    pub fn with_history(mut self, history: Box<dyn TrainingHistory>) -> Self {
        self.history = history;
        self
    }

    pub fn settings(&self) -> &TrainerSettings {
        &self.settings
    }

    pub fn state(&self) -> TrainerState {
        self.state
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn best(&self) -> &SimulationParams {
        &self.best
    }

    pub fn best_fitness(&self) -> f64 {
        self.best_fitness
    }

    /// Current running estimate
    pub fn estimate(&self) -> SimulationParams {
        denormalize(&self.theta)
    }

    pub fn history(&self) -> &dyn TrainingHistory {
        self.history.as_ref()
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Flag checked between generations; raise it from any thread to stop
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    fn evaluate_with(&self, params: &SimulationParams, matches: u32, seed: u64) -> Evaluation {
        evaluate(
            params,
            &self.battery,
            &self.settings.battery,
            self.settings.rules,
            matches,
            seed,
        )
    }

    /// Run one generation: sample, evaluate, rank, update, re-evaluate the
    /// estimate and track the best
    pub fn step(&mut self, started: Instant) -> Result<GenerationStats, TrainerError> {
        let n = self.settings.population;
        let sigma = self.settings.sigma;
        let base = self.settings.seed;
        let generation = self.generation as u64;

        let population: Vec<(Vector, u64)> = (0..n as u64)
            .map(|i| {
                let mut rng = SeededRng::new(SeededRng::derive_seed(base, &[generation, i, STREAM_NOISE]));
                let eval_seed = SeededRng::derive_seed(base, &[generation, i, STREAM_EVAL]);
                (gaussian_vector(&mut rng), eval_seed)
            })
            .collect();

        let theta = self.theta;
        let fitness: Vec<f64> = self.install(|| {
            population
                .par_iter()
                .map(|(eps, seed)| {
                    let mut candidate = theta;
                    for (c, e) in candidate.iter_mut().zip(eps) {
                        *c = (*c + sigma * e).clamp(0.0, 1.0);
                    }
                    self.evaluate_with(&denormalize(&candidate), self.settings.matches_per_case, *seed)
                        .fitness
                })
                .collect()
        });

        let weights = centered_rank_weights(&fitness);
        let scale = self.settings.learning_rate / (n as f64 * sigma);
        for (w, (eps, _)) in weights.iter().zip(&population) {
            for (t, e) in self.theta.iter_mut().zip(eps) {
                *t += scale * w * e;
            }
        }
        for t in self.theta.iter_mut() {
            *t = t.clamp(0.0, 1.0);
        }

        let estimate = denormalize(&self.theta);
        let estimate_seed = SeededRng::derive_seed(base, &[generation, STREAM_ESTIMATE]);
        let estimate_fitness = self
            .install(|| self.evaluate_with(&estimate, self.settings.matches_per_case, estimate_seed))
            .fitness;

        if estimate_fitness < self.best_fitness - self.settings.improvement_threshold {
            self.stale = 0;
        } else {
            self.stale += 1;
        }
        if estimate_fitness < self.best_fitness {
            self.best_fitness = estimate_fitness;
            self.best = estimate;
        }

        let stats = GenerationStats {
            generation: self.generation,
            mean_fitness: ratio(fitness.iter().sum(), n as f64),
            min_fitness: fitness.iter().copied().fold(f64::INFINITY, f64::min),
            estimate_fitness,
            best_fitness: self.best_fitness,
            elapsed_secs: started.elapsed().as_secs_f64(),
        };
        debug!(
            "generation {}: mean {:.3} min {:.3} estimate {:.3} best {:.3}",
            stats.generation, stats.mean_fitness, stats.min_fitness, stats.estimate_fitness, stats.best_fitness
        );

        self.history.append(&GenerationRecord::new(
            &self.run_id,
            stats,
            estimate.to_array().to_vec(),
        ))?;
        self.generation += 1;
        Ok(stats)
    }

    /// Train until convergence, the generation cap, or the stop flag, then
    /// build the final report
    pub fn run(&mut self, mut on_generation: impl FnMut(&GenerationStats)) -> Result<TrainingOutcome, TrainerError> {
        self.state = TrainerState::Running;
        let started = Instant::now();
        info!(
            "Training: population {}, sigma {}, lr {}, {} cases",
            self.settings.population,
            self.settings.sigma,
            self.settings.learning_rate,
            self.battery.len()
        );

        let stop_reason = loop {
            if self.stop.load(Ordering::Relaxed) {
                break StopReason::Stopped;
            }
            if self.generation >= self.settings.max_generations {
                break StopReason::MaxGenerations;
            }
            let stats = match self.step(started) {
                Ok(stats) => stats,
                Err(e) => {
                    self.state = TrainerState::Idle;
                    return Err(e);
                }
            };
            on_generation(&stats);
            if self.stale >= self.settings.patience {
                break StopReason::Converged;
            }
        };
        info!("Training ended after {} generations ({})", self.generation, stop_reason.label());

        let report = self.final_report(stop_reason, started);
        self.state = TrainerState::Idle;
        Ok(TrainingOutcome {
            best: self.best,
            stop_reason,
            report,
        })
    }

    /// Re-evaluate the best parameters with the larger sample count and
    /// cross-check the two simulators
    pub fn final_report(&self, stop_reason: StopReason, started: Instant) -> TrainingReport {
        let seed = SeededRng::derive_seed(self.settings.seed, &[STREAM_FINAL]);
        let evaluation = self.install(|| self.evaluate_with(&self.best, self.settings.final_matches_per_case, seed));
        let cross_check = self.install(|| self.cross_check());
        TrainingReport::new(
            &evaluation,
            self.generation,
            stop_reason,
            started.elapsed().as_secs_f64(),
            self.settings.battery.rally_length_target,
            self.settings.report_tolerance,
            cross_check,
        )
    }

    /// Human vs computer at each cross-check rating through both simulators
    pub fn cross_check(&self) -> Vec<CrossCheckEntry> {
        let matches = self.settings.cross_check.matches;
        let rules = self.settings.rules;
        let params = self.best;
        self.settings
            .cross_check
            .ratings
            .par_iter()
            .enumerate()
            .map(|(r, &rating)| {
                let case = TestCase {
                    kind: super::fitness::CaseKind::HumanVsComputer,
                    label: format!("human {:.1} vs cpu {:.1}", rating, rating),
                    near: PlayerSpec::human(rating),
                    far: PlayerSpec::computer(rating),
                    target: 0.0,
                };
                let seed = SeededRng::derive_seed(self.settings.seed, &[STREAM_CROSS_CHECK, r as u64]);
                let (fast, fast_rallies, fast_shots) = play_case(&params, &case, r, rules, matches, seed);

                let mut differential = 0i64;
                let mut rallies = 0u64;
                let mut shots = 0u64;
                for m in 0..matches {
                    let mut match_rules = rules;
                    if m % 2 == 1 {
                        match_rules.first_server = rules.first_server.opponent();
                    }
                    let match_seed = SeededRng::derive_seed(seed, &[m as u64]);
                    let result = simulate_full_match(&params, case.near, case.far, match_rules, match_seed);
                    differential += result.point_differential() as i64;
                    rallies += result.total_rallies as u64;
                    shots += result.total_rally_shots as u64;
                }

                CrossCheckEntry {
                    rating,
                    matches,
                    fast_differential: fast.actual,
                    full_differential: ratio(differential as f64, matches as f64),
                    fast_rally_length: ratio(fast_shots as f64, fast_rallies as f64),
                    full_rally_length: ratio(shots as f64, rallies as f64),
                }
            })
            .collect()
    }
}
