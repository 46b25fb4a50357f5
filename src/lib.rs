//! Pickleball - headless skill simulation and parameter training
//!
//! Two simulators decide matches between skill profiles: a closed-form rally
//! model (`rally`) and a tick-driven point simulator (`point`) that drives
//! decision agents against a ball-flight integrator. The `training` module
//! tunes the rating-to-stat mapping (`params`) with NES so simulated margins
//! track target differentials.

// Core modules
pub mod constants;
pub mod court;
pub mod debug_logging;
pub mod helpers;
pub mod params;
pub mod rng;
pub mod simulation;
pub mod training;

// Match logic modules
pub mod agents;
pub mod ball;
pub mod player;
pub mod point;
pub mod rally;
pub mod scoring;

// Re-export commonly used types for convenience
pub use agents::{DecisionAgent, HumanAgent, NpcAgent, PlayerKind, PlayerSpec, RallyContext, ShotMode, ShotParams};
pub use ball::{BallFlight, CourtBall};
pub use constants::*;
pub use court::Side;
pub use helpers::*;
pub use params::{PARAM_COUNT, PARAMS_FILE, ParamsError, SimulationParams};
pub use player::{PresetDatabase, SKILL_PRESETS_FILE, SkillPreset, SkillProfile, Stat};
pub use point::{PointSimulator, simulate_full_match};
pub use rng::SeededRng;
pub use scoring::{MatchRules, MatchState, ScoringMode};
pub use simulation::{
    BatchSummary, MatchDetail, MatchResult, MatchStats, PointDetail, PointKind, PointResult, SideTallies, SimConfig,
    SimDatabase, SimMode,
};
pub use training::{
    GenerationStats, NesTrainer, StopReason, TrainerError, TrainerSettings, TrainingHistory, TrainingOutcome,
    TrainingReport,
};
