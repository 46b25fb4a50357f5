//! Trainer settings
//!
//! Loads from trainer.toml (local, gitignored) or falls back to
//! trainer.template.toml (tracked). CLI args override file settings.

use bevy::log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::scoring::MatchRules;

/// Path to local settings file (gitignored)
pub const SETTINGS_FILE: &str = "config/trainer.toml";
/// Path to template file (tracked in git)
pub const TEMPLATE_FILE: &str = "config/trainer.template.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to encode settings: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Computer vs computer at two ratings; target comes from the gap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GapCase {
    pub high: f32,
    pub low: f32,
}

/// A fixed rating with an analyst-supplied target differential
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingCase {
    pub rating: f32,
    pub target: f64,
}

/// The fixed set of matchups every candidate is scored on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatterySettings {
    /// Computer (high) vs computer (low)
    pub gap_pairs: Vec<GapCase>,
    /// Human at `rating` vs computer at the same rating
    pub human_vs_computer: Vec<RatingCase>,
    /// Starter vs computer at `rating`
    pub starter_vs_computer: Vec<RatingCase>,
    /// Shots per rally the fast simulator should average
    pub rally_length_target: f64,
    /// Weight of the squared rally-length error in the fitness
    pub rally_length_weight: f64,
}

impl Default for BatterySettings {
    fn default() -> Self {
        Self {
            gap_pairs: vec![
                GapCase { high: 3.5, low: 3.0 },
                GapCase { high: 4.0, low: 3.0 },
                GapCase { high: 5.0, low: 4.0 },
                GapCase { high: 6.0, low: 5.0 },
                GapCase { high: 7.0, low: 6.0 },
                GapCase { high: 6.0, low: 4.0 },
            ],
            human_vs_computer: vec![
                RatingCase { rating: 3.0, target: -3.0 },
                RatingCase { rating: 4.5, target: -2.0 },
                RatingCase { rating: 6.0, target: -1.0 },
            ],
            starter_vs_computer: vec![
                RatingCase { rating: 2.0, target: -3.0 },
                RatingCase { rating: 3.0, target: -7.0 },
            ],
            rally_length_target: 4.5,
            rally_length_weight: 1.0,
        }
    }
}

/// Fast-vs-full agreement check run on the trained parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossCheckSettings {
    /// Human vs computer at each of these ratings
    pub ratings: Vec<f32>,
    /// Matches per rating and simulator
    pub matches: u32,
}

impl Default for CrossCheckSettings {
    fn default() -> Self {
        Self {
            ratings: vec![3.0, 4.5, 6.0],
            matches: 20,
        }
    }
}

/// NES trainer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerSettings {
    /// Perturbations per generation
    pub population: usize,
    /// Perturbation scale in normalized parameter space
    pub sigma: f64,
    pub learning_rate: f64,
    /// Hard generation cap
    pub max_generations: u32,
    /// Generations without improvement before convergence
    pub patience: u32,
    /// Smallest best-fitness drop that counts as improvement
    pub improvement_threshold: f64,
    /// Fast-simulator matches per battery case while training
    pub matches_per_case: u32,
    /// Matches per battery case for the final report
    pub final_matches_per_case: u32,
    /// Base seed every generation and candidate stream derives from
    pub seed: u64,
    /// Worker threads (0 = rayon's global pool)
    pub threads: usize,
    /// Tolerance (points) for OK / WARN / FAIL in the report
    pub report_tolerance: f64,
    pub rules: MatchRules,
    pub battery: BatterySettings,
    pub cross_check: CrossCheckSettings,
    /// Starting parameter profile (None = built-in defaults)
    pub params_file: Option<String>,
    /// Directory for the report and trained profile
    pub output_dir: String,
    /// SQLite history database (None = in-memory history)
    pub history_db: Option<String>,
    /// Suppress per-generation output
    pub quiet: bool,
}

impl Default for TrainerSettings {
    fn default() -> Self {
        Self {
            population: 24,
            sigma: 0.05,
            learning_rate: 0.02,
            max_generations: 60,
            patience: 8,
            improvement_threshold: 0.01,
            matches_per_case: 60,
            final_matches_per_case: 400,
            seed: 42,
            threads: 0,
            report_tolerance: 1.5,
            rules: MatchRules::default(),
            battery: BatterySettings::default(),
            cross_check: CrossCheckSettings::default(),
            params_file: None,
            output_dir: "training_output".to_string(),
            history_db: None,
            quiet: false,
        }
    }
}

impl TrainerSettings {
    /// Parse settings from TOML text
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, SettingsError> {
        toml::from_str(content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content, path)
    }

    /// Load settings with priority: local file > template > defaults
    pub fn load() -> Self {
        for file in [SETTINGS_FILE, TEMPLATE_FILE] {
            let path = Path::new(file);
            if !path.exists() {
                continue;
            }
            match Self::from_file(path) {
                Ok(settings) => {
                    info!("Loaded trainer settings from {}", file);
                    return settings;
                }
                Err(e) => warn!("{}", e),
            }
        }

        info!("No trainer settings found, using defaults");
        Self::default()
    }

    /// Serialize as TOML
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject settings the trainer cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.population < 2 {
            return Err(SettingsError::Invalid("population must be at least 2".into()));
        }
        if !(self.sigma > 0.0 && self.sigma.is_finite()) {
            return Err(SettingsError::Invalid("sigma must be positive".into()));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(SettingsError::Invalid("learning_rate must be positive".into()));
        }
        if self.matches_per_case == 0 || self.final_matches_per_case == 0 {
            return Err(SettingsError::Invalid("match counts must be at least 1".into()));
        }
        let battery = &self.battery;
        if battery.gap_pairs.is_empty()
            && battery.human_vs_computer.is_empty()
            && battery.starter_vs_computer.is_empty()
        {
            return Err(SettingsError::Invalid("battery has no cases".into()));
        }
        Ok(())
    }

    /// Apply CLI argument overrides (args[0] is the program name)
    pub fn apply_cli_overrides(&mut self, args: &[String]) {
        let mut i = 1;
        while i < args.len() {
            let value = args.get(i + 1);
            let consumed = match (args[i].as_str(), value) {
                ("--settings", Some(_)) => true,
                ("--population" | "-p", Some(v)) => set(&mut self.population, v),
                ("--sigma", Some(v)) => set(&mut self.sigma, v),
                ("--learning-rate" | "--lr", Some(v)) => set(&mut self.learning_rate, v),
                ("--generations" | "-g", Some(v)) => set(&mut self.max_generations, v),
                ("--patience", Some(v)) => set(&mut self.patience, v),
                ("--matches" | "-n", Some(v)) => set(&mut self.matches_per_case, v),
                ("--final-matches", Some(v)) => set(&mut self.final_matches_per_case, v),
                ("--seed" | "-s", Some(v)) => set(&mut self.seed, v),
                ("--threads" | "-j", Some(v)) => set(&mut self.threads, v),
                ("--params", Some(v)) => {
                    self.params_file = Some(v.clone());
                    true
                }
                ("--output" | "-o", Some(v)) => {
                    self.output_dir = v.clone();
                    true
                }
                ("--history", Some(v)) => {
                    self.history_db = Some(v.clone());
                    true
                }
                ("--quiet" | "-q", _) => {
                    self.quiet = true;
                    false
                }
                ("--debug-log", _) => false,
                ("--help" | "-h", _) => {
                    print_help();
                    std::process::exit(0);
                }
                (other, _) => {
                    warn!("Ignoring argument '{}'", other);
                    false
                }
            };
            i += if consumed { 2 } else { 1 };
        }
    }

    /// Load settings (explicit `--settings` file or default files) and apply CLI overrides
    pub fn from_args() -> Result<Self, SettingsError> {
        let args: Vec<String> = std::env::args().collect();
        let mut settings = match args.iter().position(|a| a == "--settings") {
            Some(pos) => {
                let path = args
                    .get(pos + 1)
                    .ok_or_else(|| SettingsError::Invalid("--settings needs a file".into()))?;
                Self::from_file(Path::new(path))?
            }
            None => Self::load(),
        };
        settings.apply_cli_overrides(&args);
        settings.validate()?;
        Ok(settings)
    }
}

/// Parse `text` into `slot`, keeping the old value on bad input
fn set<T: std::str::FromStr>(slot: &mut T, text: &str) -> bool {
    match text.parse() {
        Ok(v) => *slot = v,
        Err(_) => warn!("Ignoring invalid value '{}'", text),
    }
    true
}

fn print_help() {
    println!(
        r#"NES trainer - tune rating-to-stat parameters against target differentials

USAGE:
    cargo run --bin train -- [OPTIONS]

OPTIONS:
    --settings FILE          Load settings from a TOML file
    -p, --population N       Perturbations per generation (default: 24)
    --sigma X                Perturbation scale, normalized space (default: 0.05)
    --lr, --learning-rate X  Learning rate (default: 0.02)
    -g, --generations N      Generation cap (default: 60)
    --patience N             Generations without improvement before stopping (default: 8)
    -n, --matches N          Matches per battery case (default: 60)
    --final-matches N        Matches per case for the final report (default: 400)
    -s, --seed N             Base seed (default: 42)
    -j, --threads N          Worker threads, 0 = all cores (default: 0)
    --params FILE            Starting parameter profile (default: built-in)
    -o, --output DIR         Report and profile directory (default: training_output)
    --history FILE           Record generations in a SQLite database
    -q, --quiet              Only print the final report
    --debug-log              Log every generation in detail
    -h, --help               Show this help

SETTINGS FILES:
    config/trainer.toml            Local settings (gitignored)
    config/trainer.template.toml   Template with defaults (tracked)

    CLI arguments override file settings.
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("train")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings = TrainerSettings::from_toml(
            r#"
            population = 8
            seed = 7

            [battery]
            rally_length_target = 5.0

            [[battery.gap_pairs]]
            high = 5.0
            low = 4.0
            "#,
            Path::new("inline.toml"),
        )
        .unwrap();
        assert_eq!(settings.population, 8);
        assert_eq!(settings.seed, 7);
        assert_eq!(settings.battery.gap_pairs, vec![GapCase { high: 5.0, low: 4.0 }]);
        assert_eq!(settings.battery.rally_length_target, 5.0);
        assert_eq!(settings.battery.human_vs_computer, BatterySettings::default().human_vs_computer);
        assert_eq!(settings.sigma, TrainerSettings::default().sigma);
    }

    #[test]
    fn test_template_matches_defaults() {
        let template = TrainerSettings::from_toml(
            include_str!("../../config/trainer.template.toml"),
            Path::new(TEMPLATE_FILE),
        )
        .unwrap();
        assert_eq!(template, TrainerSettings::default());
        assert!(template.learning_rate <= 0.02);
    }

    #[test]
    fn test_toml_round_trip() {
        let settings = TrainerSettings::default();
        let text = settings.to_toml().unwrap();
        let back = TrainerSettings::from_toml(&text, Path::new("round.toml")).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let err = TrainerSettings::from_toml("population = \"many\"", Path::new("bad.toml"));
        assert!(matches!(err, Err(SettingsError::Parse { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut settings = TrainerSettings::default();
        settings.apply_cli_overrides(&args(&[
            "-p", "10", "--sigma", "0.1", "-g", "5", "--seed", "3", "--history", "h.db", "-q", "--patience",
            "oops",
        ]));
        assert_eq!(settings.population, 10);
        assert_eq!(settings.sigma, 0.1);
        assert_eq!(settings.max_generations, 5);
        assert_eq!(settings.seed, 3);
        assert_eq!(settings.history_db.as_deref(), Some("h.db"));
        assert!(settings.quiet);
        assert_eq!(settings.patience, TrainerSettings::default().patience);
    }

    #[test]
    fn test_validate() {
        assert!(TrainerSettings::default().validate().is_ok());
        let tiny = TrainerSettings { population: 1, ..Default::default() };
        assert!(tiny.validate().is_err());
        let mut empty = TrainerSettings::default();
        empty.battery.gap_pairs.clear();
        empty.battery.human_vs_computer.clear();
        empty.battery.starter_vs_computer.clear();
        assert!(empty.validate().is_err());
    }
}
