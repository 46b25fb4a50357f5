//! Player module - skill profiles and presets

mod presets;
mod profile;

pub use presets::{PresetDatabase, SKILL_PRESETS_FILE, SkillPreset, parse_presets};
pub use profile::{STAT_COUNT, SkillProfile, Stat};
