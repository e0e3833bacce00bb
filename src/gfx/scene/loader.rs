//! Scene asset lookup.
//!
//! The session only ever asks a [`SceneSource`] for a scene by name and
//! gets `None` back when the asset is missing. Two file formats are
//! understood by [`DirectorySceneSource`]:
//!
//! - `.json`: a [`SceneDescription`] node tree with transforms and bounds
//! - `.obj`: every OBJ object becomes a node carrying its mesh bounds; a
//!   `/` in the object name nests it (`root/Locker_1/Locker_1_Door`)

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use cgmath::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::SceneLoadError;
use crate::gfx::picking::Aabb;

use super::node::{Node, NodeId, Transform};
use super::scene::Scene;

pub trait SceneSource {
    /// Loads a fresh copy of the named scene, or `None` if it is unavailable.
    fn load_scene(&self, name: &str) -> Option<Scene>;
}

/// Serializable node tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    pub nodes: Vec<NodeDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeDescription {
    pub name: Option<String>,
    pub position: [f32; 3],
    /// Euler angles in radians.
    pub euler: [f32; 3],
    pub scale: [f32; 3],
    pub hidden: bool,
    /// `[min, max]` in local space.
    pub bounds: Option<[[f32; 3]; 2]>,
    pub children: Vec<NodeDescription>,
}

impl Default for NodeDescription {
    fn default() -> Self {
        Self {
            name: None,
            position: [0.0; 3],
            euler: [0.0; 3],
            scale: [1.0; 3],
            hidden: false,
            bounds: None,
            children: Vec::new(),
        }
    }
}

impl SceneDescription {
    pub fn from_json_str(json: &str) -> Result<Self, SceneLoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn build(&self) -> Scene {
        let mut scene = Scene::new();
        let root = scene.root();
        for node in &self.nodes {
            add_description(&mut scene, root, node);
        }
        scene
    }
}

fn add_description(scene: &mut Scene, parent: NodeId, description: &NodeDescription) {
    let mut node = Node::new(description.name.clone());
    node.transform = Transform {
        position: Vector3::from(description.position),
        euler: Vector3::from(description.euler),
        scale: Vector3::from(description.scale),
        pivot: Vector3::new(0.0, 0.0, 0.0),
    };
    node.hidden = description.hidden;
    node.bounds = description
        .bounds
        .map(|[min, max]| Aabb::new(Vector3::from(min), Vector3::from(max)));
    let id = scene.add_node(parent, node);
    for child in &description.children {
        add_description(scene, id, child);
    }
}

/// Builds a scene from an OBJ file.
pub fn load_obj_scene(path: &Path) -> Result<Scene, SceneLoadError> {
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|source| SceneLoadError::Obj {
        path: path.to_path_buf(),
        source,
    })?;

    let mut scene = Scene::new();
    for model in &models {
        let mut parent = scene.root();
        let segments: Vec<&str> = model
            .name
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();
        let Some((leaf, ancestors)) = segments.split_last() else {
            continue;
        };
        for segment in ancestors {
            parent = match scene.find_node(parent, segment, false) {
                Some(existing) => existing,
                None => scene.add_node(parent, Node::named(segment)),
            };
        }
        let bounds = Aabb::from_positions(&model.mesh.positions);
        let node = match scene.find_node(parent, leaf, false) {
            Some(existing) => existing,
            None => scene.add_node(parent, Node::named(leaf)),
        };
        if let (Some(node), Some(bounds)) = (scene.node_mut(node), bounds) {
            node.bounds = Some(match node.bounds {
                Some(existing) => existing.union(&bounds),
                None => bounds,
            });
        }
    }
    log::debug!("loaded {} OBJ objects from {}", models.len(), path.display());
    Ok(scene)
}

/// Resolves scene names to files under one directory.
#[derive(Debug, Clone)]
pub struct DirectorySceneSource {
    root: PathBuf,
}

impl DirectorySceneSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn try_load(&self, name: &str) -> Result<Scene, SceneLoadError> {
        let path = self.root.join(name);
        if !path.is_file() {
            return Err(SceneLoadError::NotFound(name.to_string()));
        }
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let json = std::fs::read_to_string(&path).map_err(|source| SceneLoadError::Io {
                    path: path.clone(),
                    source,
                })?;
                Ok(SceneDescription::from_json_str(&json)?.build())
            }
            Some("obj") => load_obj_scene(&path),
            _ => Err(SceneLoadError::UnsupportedFormat(name.to_string())),
        }
    }
}

impl SceneSource for DirectorySceneSource {
    fn load_scene(&self, name: &str) -> Option<Scene> {
        match self.try_load(name) {
            Ok(scene) => Some(scene),
            Err(err) => {
                log::warn!("scene `{name}` unavailable: {err}");
                None
            }
        }
    }
}

/// In-memory scenes, handed out as clones.
#[derive(Debug, Clone, Default)]
pub struct MemorySceneSource {
    scenes: HashMap<String, Scene>,
}

impl MemorySceneSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scene(mut self, name: &str, scene: Scene) -> Self {
        self.insert(name, scene);
        self
    }

    pub fn insert(&mut self, name: &str, scene: Scene) {
        self.scenes.insert(name.to_string(), scene);
    }
}

impl SceneSource for MemorySceneSource {
    fn load_scene(&self, name: &str) -> Option<Scene> {
        let scene = self.scenes.get(name).cloned();
        if scene.is_none() {
            log::warn!("scene `{name}` not registered");
        }
        scene
    }
}
