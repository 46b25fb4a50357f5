//! NES Trainer Binary
//!
//! Tunes the rating-to-stat parameters so fast-simulator margins track the
//! target differentials, then writes the report and the trained profile.
//!
//! Usage:
//!   cargo run --bin train
//!   cargo run --bin train -- --generations 30 --population 32 --history history.db

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;

use pickleball::debug_logging::DebugLogConfig;
use pickleball::training::{NesTrainer, SqliteHistory, TrainerSettings};
use pickleball::{PARAMS_FILE, SimulationParams};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let settings = match TrainerSettings::from_args() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };
    DebugLogConfig::load_with_args(&args).install(settings.quiet);

    if let Err(e) = run(settings) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(settings: TrainerSettings) -> Result<(), Box<dyn std::error::Error>> {
    let initial = SimulationParams::load_profile(settings.params_file.as_deref().map(Path::new));
    let quiet = settings.quiet;
    let output_dir = PathBuf::from(&settings.output_dir);
    let history_db = settings.history_db.clone();
    let settings_toml = settings.to_toml()?;

    let mut trainer = NesTrainer::new(settings, initial)?;
    if let Some(path) = &history_db {
        trainer = trainer.with_history(Box::new(SqliteHistory::open(Path::new(path))?));
    }

    // Ctrl-C is not trapped; a stalled run can be stopped by creating this file
    let stop = trainer.stop_handle();
    let stop_file = output_dir.join("STOP");

    if !quiet {
        println!("Training run {}", trainer.run_id());
        println!(
            "{:>4} {:>10} {:>10} {:>10} {:>10} {:>8}",
            "Gen", "Mean", "Min", "Estimate", "Best", "Elapsed"
        );
    }
    let outcome = trainer.run(|stats| {
        if !quiet {
            println!(
                "{:>4} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>7.1}s",
                stats.generation,
                stats.mean_fitness,
                stats.min_fitness,
                stats.estimate_fitness,
                stats.best_fitness,
                stats.elapsed_secs
            );
        }
        if stop_file.exists() {
            stop.store(true, Ordering::Relaxed);
        }
    })?;

    let text = outcome.report.to_plain_text(true);
    println!("\n{}", text);

    fs::create_dir_all(&output_dir)?;
    fs::write(output_dir.join("report.txt"), outcome.report.to_plain_text(false))?;
    fs::write(output_dir.join("report.json"), outcome.report.to_json()?)?;
    fs::write(output_dir.join("trainer.toml"), settings_toml)?;
    let params_path = output_dir.join(Path::new(PARAMS_FILE).file_name().unwrap_or_default());
    outcome.best.save(&params_path)?;

    println!("Report and trained parameters written to {}", output_dir.display());
    Ok(())
}
