//! Level catalog.
//!
//! Levels arrive as a JSON array with camelCase keys:
//!
//! ```json
//! [{ "id": 1, "name": "Laboratory", "sceneFile": "Level1.json",
//!    "mainMenuHiddenItems": ["Ceiling"],
//!    "inGameHiddenItems": { "0": ["Wall_1", "Wall_2"], "-90": ["Wall_4"] } }]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LevelError;
use crate::gfx::scene::Scene;
use crate::room::{normalize_degrees, HiddenWalls};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub id: i64,
    pub name: String,
    pub scene_file: String,
    #[serde(default)]
    pub main_menu_hidden_items: Option<Vec<String>>,
    /// Wall names to hide keyed by room facing in degrees, as a string.
    #[serde(default)]
    pub in_game_hidden_items: Option<BTreeMap<String, Vec<String>>>,
}

impl Level {
    /// Converts the string-keyed hide map into degree buckets in `[0, 360)`.
    /// Keys that are not numbers or not quarter turns are skipped with a
    /// warning.
    pub fn hidden_walls(&self) -> HiddenWalls {
        let mut walls = HiddenWalls::new();
        let Some(items) = &self.in_game_hidden_items else {
            return walls;
        };
        for (key, names) in items {
            let Ok(degrees) = key.trim().parse::<f32>() else {
                log::warn!("level {}: ignoring hidden-wall key `{key}`", self.id);
                continue;
            };
            let normalized = normalize_degrees(degrees);
            let bucket = normalized.round() as u16 % 360;
            if bucket % 90 != 0 || (normalized - normalized.round()).abs() > 1e-3 {
                log::warn!("level {}: hidden-wall key `{key}` is not a quarter turn", self.id);
                continue;
            }
            walls.entry(bucket).or_default().extend(names.iter().cloned());
        }
        walls
    }

    /// Hides the menu-only items in `scene`. Missing names are skipped.
    pub fn apply_main_menu_hidden(&self, scene: &mut Scene) -> usize {
        let mut hidden = 0;
        for name in self.main_menu_hidden_items.iter().flatten() {
            match scene.find(name) {
                Some(node) => {
                    scene.set_hidden(node, true);
                    hidden += 1;
                }
                None => log::warn!("level {}: menu item `{name}` not in scene", self.id),
            }
        }
        hidden
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelCatalog {
    levels: Vec<Level>,
}

impl LevelCatalog {
    pub fn from_json_str(json: &str) -> Result<Self, LevelError> {
        let catalog: LevelCatalog = serde_json::from_str(json)?;
        if let Some(level) = catalog.levels.iter().find(|level| level.scene_file.trim().is_empty()) {
            return Err(LevelError::MissingSceneFile { id: level.id });
        }
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self, LevelError> {
        let json = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn get(&self, id: i64) -> Option<&Level> {
        self.levels.iter().find(|level| level.id == id)
    }

    pub fn first(&self) -> Option<&Level> {
        self.levels.first()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
