//! Parameter training - NES over the rating-to-stat mapping
//!
//! The trainer scores parameter candidates on a fixed battery of fast
//! simulator matchups, keeps an append-only generation history and finishes
//! with a report cross-checked against the full point simulator.

mod fitness;
mod history;
mod report;
mod settings;
mod trainer;

pub use fitness::{CaseKind, CaseOutcome, Evaluation, TestCase, build_battery, evaluate, gap_target};
pub use history::{GenerationRecord, HistoryError, MemoryHistory, SqliteHistory, TrainingHistory};
pub use report::{CaseReport, CaseStatus, CrossCheckEntry, TrainingReport};
pub use settings::{
    BatterySettings, CrossCheckSettings, GapCase, RatingCase, SETTINGS_FILE, SettingsError, TEMPLATE_FILE,
    TrainerSettings,
};
pub use trainer::{
    GenerationStats, NesTrainer, StopReason, TrainerError, TrainerState, TrainingOutcome, centered_rank_weights,
    denormalize, normalize,
};
