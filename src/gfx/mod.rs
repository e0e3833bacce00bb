//! # Graphics Module
//!
//! Renderer-agnostic 3D state: the scene graph, transform tweens, the camera
//! rig and ray picking. Drawing is left to whoever owns the window; this
//! module only produces transforms, visibility and view-projection matrices.

pub mod animation;
pub mod camera;
pub mod picking;
pub mod scene;

pub use camera::orbit_camera::OrbitCamera;
