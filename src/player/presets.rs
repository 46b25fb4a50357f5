//! Named skill presets
//!
//! Loaded from assets/skill_presets.txt. Each preset starts with
//! `preset: <name>` followed by `rating:` and `<stat>: <value>` lines;
//! stats that are not listed default to 50.

use bevy::prelude::*;
use std::fs;

use super::profile::{STAT_COUNT, SkillProfile, Stat};

/// Path to skill presets file
pub const SKILL_PRESETS_FILE: &str = "assets/skill_presets.txt";

const DEFAULT_PRESET_STAT: f32 = 50.0;

/// A profile supplied directly rather than derived from a rating
#[derive(Debug, Clone)]
pub struct SkillPreset {
    pub name: String,
    pub profile: SkillProfile,
}

/// Database of skill presets loaded from file
#[derive(Debug, Clone)]
pub struct PresetDatabase {
    presets: Vec<SkillPreset>,
}

impl Default for PresetDatabase {
    fn default() -> Self {
        Self::load_from_file(SKILL_PRESETS_FILE)
    }
}

impl PresetDatabase {
    /// Load presets from file, or an empty database if the file is missing
    pub fn load_from_file(path: &str) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Could not read skill presets file {}: {}", path, e);
                return Self { presets: Vec::new() };
            }
        };

        let presets = parse_presets(&content);
        info!("Loaded {} skill presets from {}", presets.len(), path);
        Self { presets }
    }

    pub fn from_presets(presets: Vec<SkillPreset>) -> Self {
        Self { presets }
    }

    pub fn get_by_name(&self, name: &str) -> Option<&SkillPreset> {
        self.presets.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn presets(&self) -> &[SkillPreset] {
        &self.presets
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

struct PendingPreset {
    name: String,
    rating: f32,
    values: [f32; STAT_COUNT],
}

impl PendingPreset {
    fn finish(self) -> SkillPreset {
        SkillPreset {
            name: self.name,
            profile: SkillProfile::new(self.rating, self.values),
        }
    }
}

/// Parse presets from file content
pub fn parse_presets(content: &str) -> Vec<SkillPreset> {
    let mut presets = Vec::new();
    let mut current: Option<PendingPreset> = None;

    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(name) = line.strip_prefix("preset:") {
            if let Some(p) = current.take() {
                presets.push(p.finish());
            }
            current = Some(PendingPreset {
                name: name.trim().to_string(),
                rating: 3.5,
                values: [DEFAULT_PRESET_STAT; STAT_COUNT],
            });
            continue;
        }

        let Some(preset) = current.as_mut() else {
            continue;
        };

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let Ok(value) = value.trim().parse::<f32>() else {
            warn!("Ignoring unparseable value for '{}' in preset {}", key, preset.name);
            continue;
        };

        if key == "rating" {
            preset.rating = value;
        } else if let Some(stat) = Stat::from_name(key) {
            preset.values[stat.index()] = value;
        }
    }

    if let Some(p) = current {
        presets.push(p.finish());
    }

    presets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_presets() {
        let content = r#"
# comment
preset: Banger
rating: 4.5
power: 90
consistency: 30

preset: Dinker
accuracy: 85
bogus: 12
"#;
        let presets = parse_presets(content);
        assert_eq!(presets.len(), 2);
        assert_eq!(presets[0].name, "Banger");
        assert_eq!(presets[0].profile.rating(), 4.5);
        assert_eq!(presets[0].profile.get(Stat::Power), 90);
        assert_eq!(presets[0].profile.get(Stat::Consistency), 30);
        assert_eq!(presets[0].profile.get(Stat::Spin), 50);
        assert_eq!(presets[1].profile.get(Stat::Accuracy), 85);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let db = PresetDatabase::from_presets(parse_presets("preset: Wall\ndefense: 95\n"));
        assert!(db.get_by_name("wall").is_some());
        assert!(db.get_by_name("nope").is_none());
    }

    #[test]
    fn test_missing_file_gives_empty_database() {
        let db = PresetDatabase::load_from_file("does/not/exist.txt");
        assert!(db.is_empty());
    }
}
