//! # Scene Graph
//!
//! Named node hierarchy for one loaded diorama.
//!
//! - [`Scene`] - arena of [`Node`]s addressed by [`NodeId`]
//! - [`Transform`] - position, euler rotation, scale and pivot of a node
//! - [`SceneSource`] - where scenes come from (directory of assets or memory)
//!
//! ```
//! use cgmath::Vector3;
//! use diorama::gfx::scene::Scene;
//!
//! let mut scene = Scene::new();
//! let room = scene.add_named(scene.root(), "root", Vector3::new(0.0, 0.0, 0.0));
//! scene.add_named(room, "Locker_1", Vector3::new(1.0, 0.0, -1.0));
//! assert!(scene.find("Locker_1").is_some());
//! ```

pub mod loader;
pub mod node;
pub mod scene;

pub use loader::{
    DirectorySceneSource, MemorySceneSource, NodeDescription, SceneDescription, SceneSource,
};
pub use node::{Node, NodeId, Transform, TransformDelta};
pub use scene::Scene;
