pub mod camera_rig;
pub mod camera_utils;
pub mod orbit_camera;

// Re-export main types
pub use camera_rig::{fit_distance, CameraEvent, CameraMode, CameraRig, OrbitState};
pub use camera_utils::{Camera, CameraPose};
pub use orbit_camera::{OrbitCamera, Projection};
