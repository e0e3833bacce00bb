//! Camera rig with two modes: the room overview ("home") and a focused
//! orbit around a point of interest.
//!
//! Mode changes only happen through animated transitions. While a
//! transition runs `is_zooming` is set, and every gesture or zoom request is
//! rejected until it clears, so two camera tweens never overlap.

use cgmath::{Deg, Rad, Vector3};

use crate::config::CameraConfig;
use crate::gfx::animation::{Easing, Tween, TweenStep};
use crate::gfx::scene::{NodeId, Scene};

use super::camera_utils::CameraPose;
use super::orbit_camera::{
    calculate_cartesian_eye_position, calculate_spherical_from_eye, OrbitCamera, Projection,
    Spherical,
};

const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Orbit parameters while focused.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitState {
    pub target: Vector3<f32>,
    pub radius: f32,
    pub yaw: f32,
    pub pitch: f32,
    /// Angles captured when the zoom settled; the orbit window is centred here.
    pub base_yaw: f32,
    pub base_pitch: f32,
}

impl OrbitState {
    fn settled_at(eye: Vector3<f32>, target: Vector3<f32>) -> Self {
        let Spherical {
            distance,
            yaw,
            pitch,
        } = calculate_spherical_from_eye(eye, target);
        Self {
            target,
            radius: distance,
            yaw,
            pitch,
            base_yaw: yaw,
            base_pitch: pitch,
        }
    }

    fn eye(&self) -> Vector3<f32> {
        calculate_cartesian_eye_position(
            Spherical {
                distance: self.radius,
                yaw: self.yaw,
                pitch: self.pitch,
            },
            self.target,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraMode {
    Home,
    Focused(OrbitState),
}

/// Reported by [`CameraRig::update`] when a transition settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraEvent {
    ZoomedIn { id: String },
    ZoomedOut,
}

#[derive(Debug, Clone)]
enum TransitionKind {
    ZoomIn { id: String, target: Vector3<f32> },
    ZoomOut,
}

#[derive(Debug, Clone)]
struct Transition {
    tween: Tween<CameraPose>,
    kind: TransitionKind,
}

pub struct CameraRig {
    camera: OrbitCamera,
    config: CameraConfig,
    home: CameraPose,
    home_projection: Projection,
    mode: CameraMode,
    is_zoomed_in: bool,
    is_zooming: bool,
    transition: Option<Transition>,
    smoothing: Option<Tween<CameraPose>>,
    focused_id: Option<String>,
}

impl CameraRig {
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        let home = CameraPose::new(
            Vector3::from(config.home_eye),
            Vector3::from(config.home_target),
        );
        let home_projection = match config.home_ortho_scale {
            Some(scale) => Projection::Orthographic { scale },
            None => Projection::Perspective {
                fovy: Rad::from(Deg(config.fov_degrees)),
            },
        };
        Self {
            camera: OrbitCamera::new(home, home_projection, aspect),
            config: config.clone(),
            home,
            home_projection,
            mode: CameraMode::Home,
            is_zoomed_in: false,
            is_zooming: false,
            transition: None,
            smoothing: None,
            focused_id: None,
        }
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn pose(&self) -> CameraPose {
        self.camera.pose()
    }

    pub fn home_pose(&self) -> CameraPose {
        self.home
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn orbit(&self) -> Option<OrbitState> {
        match self.mode {
            CameraMode::Focused(orbit) => Some(orbit),
            CameraMode::Home => None,
        }
    }

    pub fn is_zoomed_in(&self) -> bool {
        self.is_zoomed_in
    }

    pub fn is_zooming(&self) -> bool {
        self.is_zooming
    }

    /// Id of the zone or node the camera is focused on (or flying to).
    pub fn focused_id(&self) -> Option<&str> {
        self.focused_id.as_deref()
    }

    /// Flies to `point`, ending `distance` away along the current view
    /// direction. Rejected while another transition is in flight.
    pub fn zoom_to_point(&mut self, point: Vector3<f32>, distance: f32, id: &str) -> bool {
        if self.is_zooming {
            log::debug!("zoom to `{id}` ignored, camera transition in flight");
            return false;
        }
        let to = CameraPose::new(point - self.camera.forward() * distance.max(0.0), point);

        self.smoothing = None;
        self.camera.projection = Projection::Perspective {
            fovy: Rad::from(Deg(self.config.fov_degrees)),
        };
        self.transition = Some(Transition {
            tween: Tween::new(
                self.camera.pose(),
                to,
                self.config.zoom_seconds,
                Easing::EaseInEaseOut,
            ),
            kind: TransitionKind::ZoomIn {
                id: id.to_string(),
                target: point,
            },
        });
        self.is_zooming = true;
        self.focused_id = Some(id.to_string());
        log::debug!("zooming to `{id}` at {:?}", point);
        true
    }

    /// Flies to a node, fitting its bounds in view.
    pub fn zoom_to_node(&mut self, scene: &Scene, node: NodeId) -> bool {
        if scene.node(node).is_none() {
            return false;
        }
        let id = scene.name(node).unwrap_or_default().to_string();
        let (center, distance) = match scene.world_bounding_box(node) {
            Some(bounds) => {
                let fov = Rad::from(Deg(self.config.fov_degrees)).0;
                (bounds.center(), fit_distance(bounds.max_dimension(), fov))
            }
            None => {
                let world = scene.world_matrix(node);
                (
                    Vector3::new(world.w.x, world.w.y, world.w.z),
                    self.config.default_zoom_distance,
                )
            }
        };
        let distance = distance.clamp(self.config.min_radius, self.config.max_radius);
        self.zoom_to_point(center, distance, &id)
    }

    /// Returns to the stored home pose.
    pub fn zoom_out(&mut self) -> bool {
        if self.is_zooming || !self.is_zoomed_in {
            return false;
        }
        self.smoothing = None;
        self.transition = Some(Transition {
            tween: Tween::new(
                self.camera.pose(),
                self.home,
                self.config.zoom_out_seconds,
                Easing::EaseInEaseOut,
            ),
            kind: TransitionKind::ZoomOut,
        });
        self.is_zooming = true;
        true
    }

    /// Orbits around the focus target. Each angle stays inside its window
    /// around the angle captured at zoom-in.
    pub fn orbit_drag(&mut self, dx: f32, dy: f32) -> bool {
        if self.is_zooming {
            return false;
        }
        let CameraMode::Focused(mut orbit) = self.mode else {
            return false;
        };
        let yaw_window = Rad::from(Deg(self.config.yaw_window_degrees)).0;
        let pitch_window = Rad::from(Deg(self.config.pitch_window_degrees)).0;
        let sensitivity = self.config.orbit_sensitivity;

        orbit.yaw = (orbit.yaw - dx * sensitivity)
            .clamp(orbit.base_yaw - yaw_window, orbit.base_yaw + yaw_window);
        orbit.pitch = (orbit.pitch + dy * sensitivity)
            .clamp(orbit.base_pitch - pitch_window, orbit.base_pitch + pitch_window)
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.apply_orbit(orbit);
        true
    }

    /// Pinch scale above 1 moves closer.
    pub fn pinch(&mut self, scale: f32) -> bool {
        if self.is_zooming || scale <= 0.0 || !scale.is_finite() {
            return false;
        }
        let CameraMode::Focused(mut orbit) = self.mode else {
            return false;
        };
        orbit.radius = (orbit.radius / scale).clamp(self.config.min_radius, self.config.max_radius);
        self.apply_orbit(orbit);
        true
    }

    fn apply_orbit(&mut self, orbit: OrbitState) {
        self.mode = CameraMode::Focused(orbit);
        let to = CameraPose::new(orbit.eye(), orbit.target);
        self.smoothing = Some(Tween::new(
            self.camera.pose(),
            to,
            self.config.smoothing_seconds,
            Easing::EaseOut,
        ));
    }

    /// Advances the active transition or smoothing tween.
    pub fn update(&mut self, dt: f32) -> Option<CameraEvent> {
        if let Some(transition) = self.transition.as_mut() {
            match transition.tween.step(dt) {
                TweenStep::Running(pose) => {
                    self.camera.set_pose(pose);
                    return None;
                }
                TweenStep::Settled(pose) => {
                    self.camera.set_pose(pose);
                }
                TweenStep::Idle => {}
            }
            let kind = transition.kind.clone();
            self.transition = None;
            return Some(self.settle(kind));
        }

        if let Some(smoothing) = self.smoothing.as_mut() {
            match smoothing.step(dt) {
                TweenStep::Running(pose) => self.camera.set_pose(pose),
                TweenStep::Settled(pose) => {
                    self.camera.set_pose(pose);
                    self.smoothing = None;
                }
                TweenStep::Idle => self.smoothing = None,
            }
        }
        None
    }

    fn settle(&mut self, kind: TransitionKind) -> CameraEvent {
        match kind {
            TransitionKind::ZoomIn { id, target } => {
                // Angles come from where the camera actually ended up.
                let orbit = OrbitState::settled_at(self.camera.eye, target);
                self.mode = CameraMode::Focused(orbit);
                self.is_zoomed_in = true;
                self.is_zooming = false;
                log::debug!("zoom settled on `{id}` radius {:.2}", orbit.radius);
                CameraEvent::ZoomedIn { id }
            }
            TransitionKind::ZoomOut => {
                self.camera.set_pose(self.home);
                self.camera.projection = self.home_projection;
                self.mode = CameraMode::Home;
                self.is_zoomed_in = false;
                self.is_zooming = false;
                self.focused_id = None;
                CameraEvent::ZoomedOut
            }
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize_projection(width, height);
    }
}

/// Camera distance that fits an object of `max_dimension` inside a vertical
/// field of view of `fov` radians, plus one object size of margin.
pub fn fit_distance(max_dimension: f32, fov: f32) -> f32 {
    let half_tan = (fov / 2.0).tan();
    if half_tan <= f32::EPSILON {
        return max_dimension;
    }
    max_dimension / (2.0 * half_tan) + max_dimension
}
