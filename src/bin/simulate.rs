//! Match Simulation Tool - headless pickleball matches between two players
//!
//! Runs fast (rally model) or full (agents + ball flight) matches and prints
//! a batch summary.
//!
//! Usage:
//!   cargo run --bin simulate -- --help
//!   cargo run --bin simulate -- --near human:4.5 --far computer:4.0 --matches 1000
//!   cargo run --bin simulate -- --full --matches 200 --parallel 8 --db results.db

use pickleball::debug_logging::DebugLogConfig;
use pickleball::simulation::{SimConfig, init_parallel, run_simulation};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let config = SimConfig::from_args();
    DebugLogConfig::load_with_args(&args).install(config.quiet || config.json);

    if let Err(e) = init_parallel(config.parallel) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run_simulation(config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
