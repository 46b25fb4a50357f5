//! Batch simulation runner behind the `simulate` binary

use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::params::SimulationParams;

use super::config::SimConfig;
use super::db::SimDatabase;
use super::metrics::{BatchSummary, MatchResult};
use super::parallel::{MatchConfig, first_server_split, match_configs, run_matches_parallel};

/// Everything a batch produced, as written by `--output` and `--json`
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub config: SimConfig,
    pub base_seed: u64,
    pub summary: BatchSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<MatchResult>,
}

/// Parameter profile for a run; bad files fall back to defaults
pub fn load_params(config: &SimConfig) -> SimulationParams {
    SimulationParams::load_profile(config.params_file.as_deref().map(Path::new))
}

/// Play every match of the batch, in parallel when configured
pub fn run_batch(configs: &[MatchConfig], params: &SimulationParams, parallel: bool, quiet: bool) -> Vec<MatchResult> {
    if parallel {
        return run_matches_parallel(configs, params);
    }

    let mut results = Vec::with_capacity(configs.len());
    for (i, cfg) in configs.iter().enumerate() {
        if !quiet {
            print!("\rMatch {}/{}...", i + 1, configs.len());
            std::io::stdout().flush().ok();
        }
        results.push(cfg.run(params));
    }
    if !quiet {
        println!("\rCompleted {} matches.", configs.len());
    }
    results
}

/// Store a finished batch in a new session
pub fn record_batch(
    db: &SimDatabase,
    config: &SimConfig,
    configs: &[MatchConfig],
    results: &[MatchResult],
) -> rusqlite::Result<String> {
    let config_json = serde_json::to_string(config).ok();
    let session_id = db.create_session("simulate", config_json.as_deref())?;
    for (cfg, result) in configs.iter().zip(results) {
        db.insert_match(&session_id, cfg, result)?;
    }
    Ok(session_id)
}

/// Run a simulation from a full configuration
pub fn run_simulation(config: SimConfig) -> Result<BatchSummary, String> {
    let params = load_params(&config);
    let base_seed = config.seed.unwrap_or_else(rand::random);

    if !config.quiet {
        println!(
            "Running {} {} matches: {} vs {} (seed: {})",
            config.matches,
            config.mode.label(),
            config.near.label(),
            config.far.label(),
            base_seed
        );
    }

    let configs = match_configs(&config, base_seed);
    if !config.quiet {
        let (near_first, far_first) = first_server_split(&configs);
        println!("First server: near {} / far {}", near_first, far_first);
    }

    let results = run_batch(&configs, &params, config.parallel > 0, config.quiet);
    let summary = BatchSummary::from_results(&results);

    if let Some(db_path) = &config.db_path {
        let db = SimDatabase::open(Path::new(db_path)).map_err(|e| format!("Failed to open {}: {}", db_path, e))?;
        let session = record_batch(&db, &config, &configs, &results)
            .map_err(|e| format!("Failed to record results: {}", e))?;
        if !config.quiet {
            println!("Recorded session {} in {}", session, db_path);
        }
    }

    let mut report = BatchReport {
        config: config.clone(),
        base_seed,
        summary: summary.clone(),
        results,
    };

    if let Some(output_file) = &config.output_file {
        let json = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        std::fs::write(output_file, json).map_err(|e| format!("Failed to write {}: {}", output_file, e))?;
        if !config.quiet {
            println!("Results written to {}", output_file);
        }
    }

    if config.json {
        report.results.clear();
        let json = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{}", json);
    } else {
        println!("\n{}", summary.format());
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::config::SimMode;

    fn quiet_config(matches: u32) -> SimConfig {
        SimConfig {
            matches,
            seed: Some(11),
            quiet: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_batch_is_reproducible() {
        let params = SimulationParams::default();
        let configs = match_configs(&quiet_config(20), 11);
        let a = run_batch(&configs, &params, false, true);
        let b = run_batch(&configs, &params, true, true);
        assert_eq!(a, b);
        assert_eq!(BatchSummary::from_results(&a).matches, 20);
    }

    #[test]
    fn test_record_batch() {
        let params = SimulationParams::default();
        let mut config = quiet_config(3);
        config.mode = SimMode::Full;
        let configs = match_configs(&config, 5);
        let results = run_batch(&configs, &params, false, true);

        let db = SimDatabase::open_in_memory().unwrap();
        record_batch(&db, &config, &configs, &results).unwrap();
        assert_eq!(db.session_count().unwrap(), 1);
        assert_eq!(db.match_count().unwrap(), 3);
    }

    #[test]
    fn test_missing_explicit_params_file_falls_back() {
        let mut config = quiet_config(1);
        config.params_file = Some("does/not/exist.json".to_string());
        assert_eq!(load_params(&config), SimulationParams::default());
    }
}
