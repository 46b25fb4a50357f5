//! Simulation configuration

use serde::{Deserialize, Serialize};

use crate::agents::{PlayerKind, PlayerSpec};
use crate::player::PresetDatabase;
use crate::court::Side;
use crate::scoring::{MatchRules, ScoringMode};

/// Which simulator plays the matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimMode {
    /// Closed-form probabilistic rally model
    #[default]
    Fast,
    /// Tick-driven agents and ball flight
    Full,
}

impl SimMode {
    pub fn label(self) -> &'static str {
        match self {
            SimMode::Fast => "fast",
            SimMode::Full => "full",
        }
    }
}

/// Configuration for a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub mode: SimMode,
    pub near: PlayerSpec,
    pub far: PlayerSpec,
    /// Number of matches to play
    pub matches: u32,
    /// RNG seed for reproducibility (None = random)
    pub seed: Option<u64>,
    pub rules: MatchRules,
    /// Alternate the first server match by match (otherwise `rules.first_server` always serves first)
    pub alternate_serve: bool,
    /// Parameter profile to load (None = the default profile location)
    pub params_file: Option<String>,
    /// Write all match results as JSON to this file
    pub output_file: Option<String>,
    /// Print the summary as JSON instead of a table
    pub json: bool,
    /// Suppress progress output
    pub quiet: bool,
    /// Number of parallel threads (0 = sequential, N = N threads)
    pub parallel: usize,
    /// Path to SQLite database for storing results
    pub db_path: Option<String>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            mode: SimMode::Fast,
            near: PlayerSpec::human(4.0),
            far: PlayerSpec::computer(4.0),
            matches: 100,
            seed: None,
            rules: MatchRules::default(),
            alternate_serve: true,
            params_file: None,
            output_file: None,
            json: false,
            quiet: false,
            parallel: 0, // Sequential by default
            db_path: None,
        }
    }
}

/// Template simulation settings (checked into git)
pub const SIM_SETTINGS_TEMPLATE: &str = "config/simulation_settings.template.json";
/// Local simulation settings (gitignored, user's custom settings)
pub const SIM_SETTINGS_FILE: &str = "config/simulation_settings.json";

/// Parse `kind[:rating]`, e.g. `human:4.5`, `computer:3`, `starter`, or
/// `preset:<name>` from the skill presets file
pub fn parse_player(text: &str) -> Result<PlayerSpec, String> {
    if let Some(name) = text.strip_prefix("preset:") {
        let presets = PresetDatabase::default();
        return presets
            .get_by_name(name.trim())
            .map(|p| PlayerSpec::preset(p.profile))
            .ok_or_else(|| format!("Unknown skill preset '{}'", name.trim()));
    }
    let (kind_name, rating) = match text.split_once(':') {
        Some((kind, rating)) => {
            let rating: f32 = rating
                .trim()
                .parse()
                .map_err(|_| format!("Invalid rating in '{}'", text))?;
            (kind.trim(), Some(rating))
        }
        None => (text.trim(), None),
    };
    let kind = PlayerKind::from_name(kind_name)
        .ok_or_else(|| format!("Unknown player kind '{}'", kind_name))?;
    Ok(match (kind, rating) {
        (PlayerKind::Starter, _) => PlayerSpec::starter(),
        (kind, Some(rating)) => PlayerSpec::new(kind, rating),
        (kind, None) => return Err(format!("Player '{}' needs a rating, e.g. {}:4.0", text, kind.label())),
    })
}

fn parse_side(text: &str) -> Option<Side> {
    match text.to_lowercase().as_str() {
        "near" => Some(Side::Near),
        "far" => Some(Side::Far),
        _ => None,
    }
}

impl SimConfig {
    /// Load configuration from a JSON settings file
    pub fn from_file(path: &str) -> Result<Self, String> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
        serde_json::from_str(&contents).map_err(|e| format!("Failed to parse {}: {}", path, e))
    }

    /// Load configuration from default config files
    /// Priority: local settings > template settings > built-in defaults
    pub fn from_config_files() -> Self {
        if let Ok(config) = Self::from_file(SIM_SETTINGS_FILE) {
            return config;
        }
        if let Ok(config) = Self::from_file(SIM_SETTINGS_TEMPLATE) {
            return config;
        }
        Self::default()
    }

    /// Parse configuration from command line arguments
    pub fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        if args.iter().any(|a| a == "--help" || a == "-h") {
            print_help();
            std::process::exit(0);
        }
        match Self::from_arg_list(Self::from_config_files(), &args[1..]) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(2);
            }
        }
    }

    /// Apply command line arguments on top of `base`
    pub fn from_arg_list(base: Self, args: &[String]) -> Result<Self, String> {
        let mut config = base;

        // Explicit settings file replaces the base before any overrides
        if let Some(pos) = args.iter().position(|a| a == "--settings") {
            let path = args.get(pos + 1).ok_or("--settings needs a file")?;
            match Self::from_file(path) {
                Ok(loaded) => config = loaded,
                Err(e) => eprintln!("Warning: {}", e),
            }
        }

        let mut i = 0;
        while i < args.len() {
            let value = args.get(i + 1).map(String::as_str);
            let mut takes_value = true;
            match (args[i].as_str(), value) {
                ("--settings", Some(_)) => {}
                ("--mode", Some(v)) => {
                    config.mode = match v {
                        "fast" => SimMode::Fast,
                        "full" => SimMode::Full,
                        _ => return Err(format!("Unknown mode '{}'", v)),
                    };
                }
                ("--full", _) => {
                    config.mode = SimMode::Full;
                    takes_value = false;
                }
                ("--near", Some(v)) => config.near = parse_player(v)?,
                ("--far", Some(v)) => config.far = parse_player(v)?,
                ("--matches", Some(v)) => {
                    config.matches = v.parse().map_err(|_| format!("Invalid match count '{}'", v))?;
                }
                ("--seed", Some(v)) => {
                    config.seed = Some(v.parse().map_err(|_| format!("Invalid seed '{}'", v))?);
                }
                ("--scoring", Some(v)) => {
                    config.rules.scoring =
                        ScoringMode::from_name(v).ok_or_else(|| format!("Unknown scoring '{}'", v))?;
                }
                ("--first-server", Some(v)) => {
                    config.rules.first_server =
                        parse_side(v).ok_or_else(|| format!("Unknown side '{}'", v))?;
                    config.alternate_serve = false;
                }
                ("--points", Some(v)) => {
                    config.rules.points_to_win = v.parse().map_err(|_| format!("Invalid points '{}'", v))?;
                    config.rules.max_score = config.rules.max_score.max(config.rules.points_to_win);
                }
                ("--params", Some(v)) => config.params_file = Some(v.to_string()),
                ("--output", Some(v)) => config.output_file = Some(v.to_string()),
                ("--json", _) => {
                    config.json = true;
                    takes_value = false;
                }
                ("--quiet" | "-q", _) => {
                    config.quiet = true;
                    takes_value = false;
                }
                ("--debug-log", _) => takes_value = false,
                ("--parallel", Some(v)) => config.parallel = v.parse().unwrap_or(0),
                ("--db", Some(v)) => config.db_path = Some(v.to_string()),
                (flag, None) if flag.starts_with("--") => {
                    return Err(format!("{} needs a value", flag));
                }
                (other, _) => {
                    eprintln!("Warning: ignoring argument '{}'", other);
                    takes_value = false;
                }
            }
            i += if takes_value { 2 } else { 1 };
        }

        Ok(config)
    }
}

fn print_help() {
    println!(
        r#"Pickleball match simulator

USAGE:
    cargo run --bin simulate -- [OPTIONS]

OPTIONS:
    --settings <FILE>      Load settings from JSON file (CLI args override file settings)
    --mode <fast|full>     Simulator to use (default: fast)
    --full                 Same as --mode full
    --near <PLAYER>        Near player, e.g. human:4.5 (default: human:4.0)
    --far <PLAYER>         Far player, e.g. computer:4.0 (default: computer:4.0)
    --matches <N>          Number of matches (default: 100)
    --seed <N>             RNG seed for reproducibility
    --scoring <MODE>       rally or side-out (default: rally)
    --first-server <SIDE>  near or far serves first in every match (default: alternate)
    --points <N>           Points to win (default: 11)
    --params <FILE>        Parameter profile (default: config/sim_params.json if present)
    --output <FILE>        Write all match results as JSON
    --json                 Print the summary as JSON
    --quiet, -q            Suppress progress output
    --debug-log            Log every point (see config/debug_logging.json)
    --parallel <N>         Run matches in parallel with N threads
    --db <FILE>            Store results in SQLite database
    --help, -h             Show this help

PLAYERS:
    human:<rating>     Human-like agent with stats derived from the rating
    computer:<rating>  Computer opponent with virtual equipment
    starter            Brand-new player with starter stats
    preset:<name>      Human-like agent with stats from assets/skill_presets.txt

EXAMPLES:
    # 1000 fast matches, 4.5 human against a 4.0 computer
    cargo run --bin simulate -- --near human:4.5 --far computer:4.0 --matches 1000

    # Full simulation on 8 threads, recorded to SQLite
    cargo run --bin simulate -- --full --matches 200 --parallel 8 --db results.db
"#
    );
}
