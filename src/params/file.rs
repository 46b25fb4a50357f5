//! Persisted parameter profile (JSON)
//!
//! The document is a flat object keyed by the names in `PARAM_NAMES`.
//! Missing or non-numeric fields take the documented default, unknown keys
//! are ignored with a warning.

use bevy::log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::{PARAM_COUNT, PARAM_NAMES, SimulationParams, param_index};

/// Default location of the trained parameter profile
pub const PARAMS_FILE: &str = "config/sim_params.json";

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode parameters: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Serialized form of `SimulationParams`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamsDocument {
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl From<SimulationParams> for ParamsDocument {
    fn from(params: SimulationParams) -> Self {
        let fields = PARAM_NAMES
            .iter()
            .zip(params.to_array())
            .map(|(name, value)| (name.to_string(), serde_json::Value::from(value)))
            .collect();
        Self { fields }
    }
}

impl From<ParamsDocument> for SimulationParams {
    fn from(doc: ParamsDocument) -> Self {
        let mut values: [f64; PARAM_COUNT] = SimulationParams::default().to_array();
        for (name, value) in &doc.fields {
            let Some(index) = param_index(name) else {
                warn!("Ignoring unknown parameter '{}'", name);
                continue;
            };
            match value.as_f64() {
                Some(v) if v.is_finite() => values[index] = v,
                _ => warn!("Parameter '{}' is not a number, using default", name),
            }
        }
        SimulationParams::from_array(&values)
    }
}

impl SimulationParams {
    /// Load a parameter profile from a JSON file
    pub fn load(path: &Path) -> Result<Self, ParamsError> {
        let contents = fs::read_to_string(path).map_err(|source| ParamsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ParamsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a parameter profile, falling back to defaults on any failure
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(params) => params,
            Err(e) => {
                warn!("{}, using default simulation parameters", e);
                Self::default()
            }
        }
    }

    /// Parameter profile for a run: `path` when given, otherwise
    /// `PARAMS_FILE` when present, otherwise defaults. Unreadable or
    /// malformed files fall back to defaults with a warning.
    pub fn load_profile(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::load_or_default(path),
            None if Path::new(PARAMS_FILE).exists() => Self::load_or_default(Path::new(PARAMS_FILE)),
            None => Self::default(),
        }
    }

    /// Write the profile as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), ParamsError> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ParamsError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, json).map_err(|source| ParamsError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
