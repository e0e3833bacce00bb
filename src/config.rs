//! Session tunables.
//!
//! Everything here deserializes with `#[serde(default)]`, so a config file
//! only needs the fields it changes. Vectors are plain `[f32; 3]` arrays on
//! disk and converted to cgmath types at the use site.

use std::path::Path;

use anyhow::{Context, Result};
use cgmath::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::focus::RotationProfileTable;
use crate::interaction::InteractionTable;
use crate::puzzle::PuzzleSecrets;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub camera: CameraConfig,
    pub room: RoomConfig,
    pub focus: FocusConfig,
    pub key_insertion: KeyInsertionConfig,
    /// Open/close motion per canonical id prefix. First matching prefix wins.
    pub toggle_motions: Vec<ToggleMotion>,
    pub zones: Vec<InteractionZone>,
    pub secrets: PuzzleSecrets,
    pub interactions: InteractionTable,
    pub rotation_profiles: RotationProfileTable,
    /// Seconds a lock/wrong-code notice stays up.
    pub notice_seconds: f32,
    pub passcode_max_len: usize,
    /// Viewport in pixels, used to turn screen taps into rays.
    pub viewport: [f32; 2],
    pub music_track: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            room: RoomConfig::default(),
            focus: FocusConfig::default(),
            key_insertion: KeyInsertionConfig::default(),
            toggle_motions: ToggleMotion::defaults(),
            zones: Vec::new(),
            secrets: PuzzleSecrets::default(),
            interactions: InteractionTable::default(),
            rotation_profiles: RotationProfileTable::default(),
            notice_seconds: 2.0,
            passcode_max_len: 8,
            viewport: [1180.0, 820.0],
            music_track: "tensemusic".to_string(),
        }
    }
}

impl SessionConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SessionConfig =
            serde_json::from_str(json).context("parsing session config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading session config {}", path.display()))?;
        Self::from_json_str(&json)
    }

    /// Checks the data-driven tables. Called on load so a bad table fails
    /// up front instead of misbehaving mid-game.
    pub fn validate(&self) -> Result<(), TableError> {
        self.interactions.validate()?;
        self.rotation_profiles.validate()?;
        if self.camera.min_radius <= 0.0 || self.camera.min_radius > self.camera.max_radius {
            return Err(TableError::InvalidRange {
                what: "camera radius",
                min: self.camera.min_radius,
                max: self.camera.max_radius,
            });
        }
        if self.focus.min_zoom <= 0.0 || self.focus.min_zoom > self.focus.max_zoom {
            return Err(TableError::InvalidRange {
                what: "focus zoom",
                min: self.focus.min_zoom,
                max: self.focus.max_zoom,
            });
        }
        Ok(())
    }

    pub fn toggle_motion(&self, id: &str) -> Option<&ToggleMotion> {
        self.toggle_motions
            .iter()
            .find(|motion| id.starts_with(&motion.prefix))
    }

    pub fn zone(&self, id: &str) -> Option<&InteractionZone> {
        self.zones.iter().find(|zone| zone.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub home_eye: [f32; 3],
    pub home_target: [f32; 3],
    /// Orthographic half-height for the room overview; `None` keeps the
    /// overview in perspective.
    pub home_ortho_scale: Option<f32>,
    pub fov_degrees: f32,
    pub zoom_seconds: f32,
    pub zoom_out_seconds: f32,
    pub smoothing_seconds: f32,
    /// Radians of orbit per pixel of drag.
    pub orbit_sensitivity: f32,
    /// Half-width of the horizontal orbit window around the zoom-in angle.
    pub yaw_window_degrees: f32,
    /// Half-width of the vertical orbit window around the zoom-in angle.
    pub pitch_window_degrees: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Distance used by zoom-to-node when the node has no geometry.
    pub default_zoom_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            home_eye: [2.0, 2.5, 2.0],
            home_target: [0.0, 1.0, 0.0],
            home_ortho_scale: Some(2.1),
            fov_degrees: 55.0,
            zoom_seconds: 1.0,
            zoom_out_seconds: 1.0,
            smoothing_seconds: 0.1,
            orbit_sensitivity: 0.005,
            yaw_window_degrees: 30.0,
            pitch_window_degrees: 20.0,
            min_radius: 0.5,
            max_radius: 6.0,
            default_zoom_distance: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Name of the node the room rotates around.
    pub room_node: String,
    pub wall_prefix: String,
    /// Radians of yaw per pixel of horizontal drag.
    pub drag_sensitivity: f32,
    pub snap_seconds: f32,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            room_node: "root".to_string(),
            wall_prefix: "Wall_".to_string(),
            drag_sensitivity: 0.005,
            snap_seconds: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    pub fov_degrees: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Radians of object rotation per pixel of drag.
    pub rotate_sensitivity: f32,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 55.0,
            min_zoom: 1.0,
            max_zoom: 10.0,
            rotate_sensitivity: 0.005,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyInsertionConfig {
    pub key_node: String,
    pub move_by: [f32; 3],
    pub move_seconds: f32,
    pub turn_radians: f32,
    pub turn_seconds: f32,
    pub settle_radians: f32,
    pub settle_seconds: f32,
}

impl Default for KeyInsertionConfig {
    fn default() -> Self {
        Self {
            key_node: "Golden_Key".to_string(),
            move_by: [0.0, 0.0, -0.15],
            move_seconds: 0.3,
            turn_radians: std::f32::consts::FRAC_PI_2,
            turn_seconds: 0.3,
            settle_radians: -0.2,
            settle_seconds: 0.15,
        }
    }
}

/// How an openable object moves when it opens. Closing plays the inverse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleMotion {
    pub prefix: String,
    #[serde(default)]
    pub translation: [f32; 3],
    #[serde(default)]
    pub rotation: [f32; 3],
    pub seconds: f32,
}

impl ToggleMotion {
    fn defaults() -> Vec<Self> {
        let swing = -std::f32::consts::FRAC_PI_2 * 0.9;
        vec![
            ToggleMotion {
                prefix: "locker_".to_string(),
                translation: [0.0; 3],
                rotation: [0.0, swing, 0.0],
                seconds: 0.4,
            },
            ToggleMotion {
                prefix: "cabinet_".to_string(),
                translation: [0.0; 3],
                rotation: [0.0, -swing, 0.0],
                seconds: 0.4,
            },
            ToggleMotion {
                prefix: "flask_".to_string(),
                translation: [0.0, 0.06, 0.0],
                rotation: [0.0; 3],
                seconds: 0.25,
            },
            ToggleMotion {
                prefix: "book".to_string(),
                translation: [0.0; 3],
                rotation: [0.0, 0.0, std::f32::consts::FRAC_PI_2],
                seconds: 0.35,
            },
        ]
    }

    pub fn translation(&self) -> Vector3<f32> {
        Vector3::from(self.translation)
    }

    pub fn rotation(&self) -> Vector3<f32> {
        Vector3::from(self.rotation)
    }
}

/// A spot the camera flies to when its object is tapped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionZone {
    pub id: String,
    pub center: [f32; 3],
    #[serde(default = "InteractionZone::default_zoom_distance")]
    pub zoom_distance: f32,
    #[serde(default)]
    pub height_offset: f32,
}

impl InteractionZone {
    fn default_zoom_distance() -> f32 {
        3.0
    }

    pub fn focus_point(&self) -> Vector3<f32> {
        Vector3::from(self.center) + Vector3::new(0.0, self.height_offset, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = SessionConfig::from_json_str(
            r#"{ "notice_seconds": 3.5, "camera": { "yaw_window_degrees": 25.0 } }"#,
        )
        .expect("valid config");
        assert_eq!(config.notice_seconds, 3.5);
        assert_eq!(config.camera.yaw_window_degrees, 25.0);
        assert_eq!(config.camera.zoom_seconds, 1.0);
        assert_eq!(config.room.wall_prefix, "Wall_");
    }

    #[test]
    fn inverted_radius_range_is_rejected() {
        let result = SessionConfig::from_json_str(
            r#"{ "camera": { "min_radius": 4.0, "max_radius": 1.0 } }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn toggle_motion_matches_by_prefix() {
        let config = SessionConfig::default();
        assert!(config.toggle_motion("locker_2").is_some());
        assert!(config.toggle_motion("flask_3").is_some());
        assert!(config.toggle_motion("calendar").is_none());
    }

    #[test]
    fn zone_focus_point_applies_height_offset() {
        let zone = InteractionZone {
            id: "desk".to_string(),
            center: [1.0, 0.5, -1.0],
            zoom_distance: 2.0,
            height_offset: 0.25,
        };
        assert_eq!(zone.focus_point(), Vector3::new(1.0, 0.75, -1.0));
    }
}
