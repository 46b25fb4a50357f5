//! Headless match simulation - results, batches and storage
//!
//! Result types shared by both simulators, plus the batch runner, rayon
//! fan-out and SQLite store behind the `simulate` binary.

pub mod config;
pub mod db;
pub mod metrics;
pub mod parallel;
pub mod runner;

pub use config::{SimConfig, SimMode};
pub use db::{MatchFilter, PlayerRecord, SimDatabase};
pub use metrics::{
    BatchSummary, MatchDetail, MatchResult, MatchStats, PointDetail, PointKind, PointResult, SideTallies,
};
pub use parallel::{MatchConfig, init_parallel, match_configs, run_matches_parallel};
pub use runner::{run_batch, run_simulation};
