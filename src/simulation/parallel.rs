//! Parallel simulation execution
//!
//! Uses Rayon to run match batches concurrently. Every match carries its own
//! seed, so a batch gives the same results whatever the thread count.

use rayon::prelude::*;

use crate::agents::PlayerSpec;
use crate::court::Side;
use crate::params::SimulationParams;
use crate::point::simulate_full_match;
use crate::rally;
use crate::rng::SeededRng;
use crate::scoring::MatchRules;

use super::config::{SimConfig, SimMode};
use super::metrics::MatchResult;

/// Initialize parallel execution with the given thread count.
/// Call this once at startup before running parallel simulations.
pub fn init_parallel(threads: usize) -> Result<(), String> {
    if threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| format!("Failed to initialize Rayon thread pool: {}", e))?;
    }
    // If threads == 0, use Rayon's default (auto-detect)
    Ok(())
}

/// Configuration for a single match in a batch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchConfig {
    pub mode: SimMode,
    pub near: PlayerSpec,
    pub far: PlayerSpec,
    pub rules: MatchRules,
    /// RNG seed for this match
    pub seed: u64,
}

impl MatchConfig {
    /// Play this match
    pub fn run(&self, params: &SimulationParams) -> MatchResult {
        match self.mode {
            SimMode::Fast => {
                let near = self.near.profile(params);
                let far = self.far.profile(params);
                rally::simulate_match(&near, &far, self.rules, &mut SeededRng::new(self.seed))
            }
            SimMode::Full => simulate_full_match(params, self.near, self.far, self.rules, self.seed),
        }
    }
}

/// Expand a run configuration into one `MatchConfig` per match.
/// Match `i` is seeded from `(base_seed, i)`; with `alternate_serve` odd
/// matches swap who serves first.
pub fn match_configs(config: &SimConfig, base_seed: u64) -> Vec<MatchConfig> {
    (0..config.matches)
        .map(|i| {
            let mut rules = config.rules;
            if config.alternate_serve && i % 2 == 1 {
                rules.first_server = rules.first_server.opponent();
            }
            MatchConfig {
                mode: config.mode,
                near: config.near,
                far: config.far,
                rules,
                seed: SeededRng::derive_seed(base_seed, &[i as u64]),
            }
        })
        .collect()
}

/// Run multiple matches in parallel.
/// Returns results in the same order as configs.
pub fn run_matches_parallel(configs: &[MatchConfig], params: &SimulationParams) -> Vec<MatchResult> {
    configs.par_iter().map(|cfg| cfg.run(params)).collect()
}

/// First-server split of a batch (near, far)
pub fn first_server_split(configs: &[MatchConfig]) -> (usize, usize) {
    let near = configs
        .iter()
        .filter(|c| c.rules.first_server == Side::Near)
        .count();
    (near, configs.len() - near)
}
