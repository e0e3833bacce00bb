//! Detail view for a single object.
//!
//! Opening a [`FocusSession`] copies one node out of a freshly loaded scene
//! into its own scene, turns it to a presentation angle picked from the
//! [`RotationProfileTable`], centres its pivot and backs the camera off far
//! enough to fit it. Closing drops the copy; nothing leaks back into the
//! room scene.

use std::collections::HashSet;

use cgmath::{Deg, Rad, Vector3};
use serde::{Deserialize, Serialize};

use crate::config::FocusConfig;
use crate::error::{FocusError, TableError};
use crate::gfx::camera::{fit_distance, CameraPose, OrbitCamera, Projection};
use crate::gfx::scene::{NodeId, Scene, SceneSource};

const HALF_PI: f32 = std::f32::consts::FRAC_PI_2;
const PI: f32 = std::f32::consts::PI;

/// A named presentation angle shared by a group of nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationProfile {
    pub name: String,
    /// Euler angles in radians.
    pub euler: [f32; 3],
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationProfileTable {
    pub profiles: Vec<RotationProfile>,
    /// Used for nodes no profile lists.
    pub fallback: [f32; 3],
}

impl Default for RotationProfileTable {
    fn default() -> Self {
        let profile = |name: &str, euler: [f32; 3], members: &[&str]| RotationProfile {
            name: name.to_string(),
            euler,
            members: members.iter().map(|member| member.to_string()).collect(),
        };
        Self {
            profiles: vec![
                profile(
                    "flat",
                    [0.0, 0.0, 0.0],
                    &["Willas___Hayya", "Paper_2", "Paper_1", "Photo_4", "Golden_Key"],
                ),
                profile(
                    "shelf_spine",
                    [HALF_PI, 4.6, PI],
                    &[
                        "Periodic_Table",
                        "Blue_Book_1",
                        "Blue_Book_3",
                        "Green_Book_1",
                        "Green_Book_2",
                        "Green_Book_3",
                        "Red_Book",
                        "Red_Book_1",
                        "Red_Book_3",
                        "Photo_2",
                    ],
                ),
                profile("upside_down", [PI, 0.0, PI], &["Calendar"]),
                profile(
                    "lock_face",
                    [HALF_PI, PI, PI],
                    &["Locker_1", "Locker_2", "Locker_3", "Lock_1", "Lock_2", "Lock_3"],
                ),
                profile("poster", [HALF_PI, -4.6, PI], &["Science_Poster"]),
                profile(
                    "flashlight",
                    [PI / 4.0, 0.0, 3.0 * PI / 4.0],
                    &["UV_Flashlight"],
                ),
                profile("clue_card", [0.0, -PI, 0.0], &["Clue_color"]),
            ],
            fallback: [HALF_PI, 0.0, PI],
        }
    }
}

impl RotationProfileTable {
    /// Every profile needs a name and each node may belong to one profile.
    pub fn validate(&self) -> Result<(), TableError> {
        const TABLE: &str = "rotation profiles";
        let mut names = HashSet::new();
        let mut members = HashSet::new();
        for (index, profile) in self.profiles.iter().enumerate() {
            if profile.name.is_empty() {
                return Err(TableError::EmptyField {
                    table: TABLE,
                    index,
                    field: "name",
                });
            }
            if !names.insert(profile.name.as_str()) {
                return Err(TableError::Duplicate {
                    table: TABLE,
                    name: profile.name.clone(),
                });
            }
            for member in &profile.members {
                if !members.insert(member.as_str()) {
                    return Err(TableError::Duplicate {
                        table: TABLE,
                        name: member.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn profile_for(&self, node_name: &str) -> Option<&RotationProfile> {
        self.profiles
            .iter()
            .find(|profile| profile.members.iter().any(|member| member == node_name))
    }

    pub fn euler_for(&self, node_name: &str) -> Vector3<f32> {
        Vector3::from(
            self.profile_for(node_name)
                .map(|profile| profile.euler)
                .unwrap_or(self.fallback),
        )
    }
}

pub struct FocusSession {
    scene_file: String,
    node_name: String,
    scene: Scene,
    node: NodeId,
    zoom: f32,
    config: FocusConfig,
}

impl FocusSession {
    pub fn open(
        source: &dyn SceneSource,
        scene_file: &str,
        node_name: &str,
        profiles: &RotationProfileTable,
        config: &FocusConfig,
    ) -> Result<Self, FocusError> {
        let source_scene = source
            .load_scene(scene_file)
            .ok_or_else(|| FocusError::SceneMissing(scene_file.to_string()))?;
        let missing = || FocusError::NodeMissing {
            scene: scene_file.to_string(),
            node: node_name.to_string(),
        };
        let original = source_scene.find(node_name).ok_or_else(missing)?;
        let (mut scene, node) = source_scene.extract(original).ok_or_else(missing)?;

        let mut transform = scene.transform(node).ok_or_else(missing)?;
        transform.position = Vector3::new(0.0, 0.0, 0.0);
        transform.euler = profiles.euler_for(node_name);
        scene.set_transform(node, transform);
        scene.set_hidden(node, false);

        let fov = Rad::from(Deg(config.fov_degrees)).0;
        let bounds = scene.bounding_box(node);
        if let Some(bounds) = bounds {
            scene.set_pivot(node, bounds.center());
        }
        let scale = transform.scale.x.max(transform.scale.y).max(transform.scale.z);
        let max_dimension = bounds
            .map(|bounds| bounds.max_dimension() * scale)
            .filter(|dimension| *dimension > f32::EPSILON)
            .unwrap_or(1.0);
        let zoom = fit_distance(max_dimension, fov).clamp(config.min_zoom, config.max_zoom);

        log::debug!("focus on {node_name} from {scene_file}, zoom {zoom:.2}");
        Ok(Self {
            scene_file: scene_file.to_string(),
            node_name: node_name.to_string(),
            scene,
            node,
            zoom,
            config: config.clone(),
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    pub fn scene_file(&self) -> &str {
        &self.scene_file
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn euler(&self) -> Vector3<f32> {
        self.scene
            .transform(self.node)
            .map(|transform| transform.euler)
            .unwrap_or(Vector3::new(0.0, 0.0, 0.0))
    }

    /// Spins the object in its own space by a drag in pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        let sensitivity = self.config.rotate_sensitivity;
        if let Some(node) = self.scene.node_mut(self.node) {
            node.transform.euler.y += dx * sensitivity;
            node.transform.euler.x += dy * sensitivity;
        }
    }

    /// Spreading fingers (`scale > 1`) brings the camera closer.
    pub fn pinch(&mut self, scale: f32) {
        if scale <= f32::EPSILON || !scale.is_finite() {
            return;
        }
        self.zoom = (self.zoom / scale).clamp(self.config.min_zoom, self.config.max_zoom);
    }

    pub fn camera_pose(&self) -> CameraPose {
        CameraPose::new(Vector3::new(0.0, 0.0, self.zoom), Vector3::new(0.0, 0.0, 0.0))
    }

    pub fn camera(&self, aspect: f32) -> OrbitCamera {
        OrbitCamera::new(
            self.camera_pose(),
            Projection::Perspective {
                fovy: Rad::from(Deg(self.config.fov_degrees)),
            },
            aspect,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::picking::Aabb;
    use crate::gfx::scene::MemorySceneSource;

    fn source() -> MemorySceneSource {
        let mut scene = Scene::new();
        let room = scene.add_named(scene.root(), "root", Vector3::new(0.0, 0.0, 0.0));
        let calendar = scene.add_named(room, "Calendar", Vector3::new(1.5, 1.2, -2.0));
        scene.node_mut(calendar).unwrap().bounds = Some(Aabb::new(
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.4, 0.6, 0.02),
        ));
        let poster = scene.add_named(room, "Huge_Poster", Vector3::new(0.0, 1.0, -2.0));
        scene.node_mut(poster).unwrap().bounds = Some(Aabb::new(
            Vector3::new(-10.0, -10.0, 0.0),
            Vector3::new(10.0, 10.0, 0.1),
        ));
        MemorySceneSource::new().with_scene("Level1.json", scene)
    }

    #[test]
    fn default_profiles_are_valid() {
        assert_eq!(RotationProfileTable::default().validate(), Ok(()));
    }

    #[test]
    fn member_in_two_profiles_is_rejected() {
        let mut table = RotationProfileTable::default();
        table.profiles[0].members.push("Calendar".to_string());
        assert!(matches!(table.validate(), Err(TableError::Duplicate { .. })));
    }

    #[test]
    fn open_isolates_and_frames_the_node() {
        let source = source();
        let table = RotationProfileTable::default();
        let config = FocusConfig::default();
        let focus = FocusSession::open(&source, "Level1.json", "Calendar", &table, &config)
            .expect("calendar opens");

        assert_eq!(focus.scene().find("root"), None);
        let transform = focus.scene().transform(focus.node()).unwrap();
        assert_eq!(transform.position, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(transform.euler, Vector3::new(PI, 0.0, PI));
        assert_eq!(transform.pivot, Vector3::new(0.2, 0.3, 0.01));
        assert!(focus.zoom() >= config.min_zoom && focus.zoom() <= config.max_zoom);
    }

    #[test]
    fn fit_distance_is_clamped_into_zoom_range() {
        let source = source();
        let config = FocusConfig::default();
        let focus = FocusSession::open(
            &source,
            "Level1.json",
            "Huge_Poster",
            &RotationProfileTable::default(),
            &config,
        )
        .unwrap();
        assert_eq!(focus.zoom(), config.max_zoom);
        assert_eq!(focus.euler(), Vector3::new(HALF_PI, 0.0, PI));
    }

    #[test]
    fn pinch_and_rotate_stay_in_bounds() {
        let source = source();
        let mut focus = FocusSession::open(
            &source,
            "Level1.json",
            "Calendar",
            &RotationProfileTable::default(),
            &FocusConfig::default(),
        )
        .unwrap();
        focus.pinch(100.0);
        assert_eq!(focus.zoom(), 1.0);
        focus.pinch(0.001);
        assert_eq!(focus.zoom(), 10.0);
        focus.pinch(0.0);
        assert_eq!(focus.zoom(), 10.0);

        let before = focus.euler();
        focus.rotate(100.0, -50.0);
        let after = focus.euler();
        assert!((after.y - before.y - 0.5).abs() < 1e-5);
        assert!((after.x - before.x + 0.25).abs() < 1e-5);
    }

    #[test]
    fn missing_assets_are_errors() {
        let source = source();
        let table = RotationProfileTable::default();
        let config = FocusConfig::default();
        assert_eq!(
            FocusSession::open(&source, "Level9.json", "Calendar", &table, &config).err(),
            Some(FocusError::SceneMissing("Level9.json".to_string()))
        );
        assert!(matches!(
            FocusSession::open(&source, "Level1.json", "Microscope", &table, &config),
            Err(FocusError::NodeMissing { .. })
        ));
    }
}
