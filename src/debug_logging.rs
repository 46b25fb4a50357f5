//! Debug logging configuration shared across binaries.

use bevy::app::App;
use bevy::log::{Level, LogPlugin};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEBUG_LOG_SETTINGS_FILE: &str = "config/debug_logging.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugLogConfig {
    /// Log per-point and per-generation detail
    pub enabled: bool,
    /// Extra `tracing` filter directives, e.g. "pickleball::point=trace"
    pub filter: Option<String>,
}

impl DebugLogConfig {
    pub fn load() -> Self {
        let path = Path::new(DEBUG_LOG_SETTINGS_FILE);
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    pub fn enabled_from_args(args: &[String]) -> bool {
        args.iter().any(|arg| arg == "--debug-log")
    }

    pub fn load_with_args(args: &[String]) -> Self {
        let mut config = Self::load();
        if Self::enabled_from_args(args) {
            config.enabled = true;
        }
        config
    }

    /// Level the library's `bevy::log` macros are emitted at
    pub fn level(&self, quiet: bool) -> Level {
        match (self.enabled, quiet) {
            (true, _) => Level::DEBUG,
            (false, true) => Level::WARN,
            (false, false) => Level::INFO,
        }
    }

    /// Install the global log subscriber. Binaries call this once at startup.
    pub fn install(&self, quiet: bool) {
        let mut plugin = LogPlugin {
            level: self.level(quiet),
            ..Default::default()
        };
        if let Some(filter) = &self.filter {
            plugin.filter = format!("{},{}", plugin.filter, filter);
        }
        App::new().add_plugins(plugin);
    }
}
