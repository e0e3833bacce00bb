use super::camera_utils::{Camera, CameraPose};
use cgmath::*;

/// How the camera projects the room.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective { fovy: Rad<f32> },
    /// `scale` is half the visible height in world units.
    Orthographic { scale: f32 },
}

/// Orbit-style camera: an eye looking at a target, plus projection data.
///
/// The rig drives `eye`/`target` directly; the spherical helpers below
/// convert between those and (distance, yaw, pitch) around a target.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub projection: Projection,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }
}

impl OrbitCamera {
    pub fn new(pose: CameraPose, projection: Projection, aspect: f32) -> Self {
        Self {
            eye: pose.eye,
            target: pose.target,
            up: Vector3::unit_y(),
            projection,
            aspect,
            znear: 0.01,
            zfar: 1000.0,
        }
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            eye: self.eye,
            target: self.target,
        }
    }

    pub fn set_pose(&mut self, pose: CameraPose) {
        self.eye = pose.eye;
        self.target = pose.target;
    }

    /// Unit vector from the eye toward the look target.
    pub fn forward(&self) -> Vector3<f32> {
        let direction = self.target - self.eye;
        if direction.magnitude2() <= f32::EPSILON {
            -Vector3::unit_z()
        } else {
            direction.normalize()
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(
            Point3::from_vec(self.eye),
            Point3::from_vec(self.target),
            self.up,
        )
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        match self.projection {
            Projection::Perspective { fovy } => perspective(fovy, self.aspect, self.znear, self.zfar),
            Projection::Orthographic { scale } => ortho(
                -scale * self.aspect,
                scale * self.aspect,
                -scale,
                scale,
                self.znear,
                self.zfar,
            ),
        }
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }
}

/// Spherical coordinates of an eye around a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub distance: f32,
    /// Horizontal angle around +Y, zero looking down -Z from +Z.
    pub yaw: f32,
    /// Vertical angle above the target's horizontal plane.
    pub pitch: f32,
}

pub fn calculate_cartesian_eye_position(spherical: Spherical, target: Vector3<f32>) -> Vector3<f32> {
    let Spherical {
        distance,
        yaw,
        pitch,
    } = spherical;
    Vector3::new(
        distance * yaw.sin() * pitch.cos(),
        distance * pitch.sin(),
        distance * yaw.cos() * pitch.cos(),
    ) + target
}

/// Inverse of [`calculate_cartesian_eye_position`].
pub fn calculate_spherical_from_eye(eye: Vector3<f32>, target: Vector3<f32>) -> Spherical {
    let offset = eye - target;
    let distance = offset.magnitude();
    if distance <= f32::EPSILON {
        return Spherical {
            distance: 0.0,
            yaw: 0.0,
            pitch: 0.0,
        };
    }
    Spherical {
        distance,
        yaw: offset.x.atan2(offset.z),
        pitch: (offset.y / distance).clamp(-1.0, 1.0).asin(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spherical_round_trip() {
        let target = Vector3::new(1.0, 0.5, -2.0);
        let spherical = Spherical {
            distance: 3.0,
            yaw: 0.7,
            pitch: -0.3,
        };
        let eye = calculate_cartesian_eye_position(spherical, target);
        let back = calculate_spherical_from_eye(eye, target);
        assert!((back.distance - 3.0).abs() < 1e-4);
        assert!((back.yaw - 0.7).abs() < 1e-4);
        assert!((back.pitch + 0.3).abs() < 1e-4);
    }

    #[test]
    fn degenerate_forward_falls_back() {
        let pose = CameraPose {
            eye: Vector3::new(1.0, 1.0, 1.0),
            target: Vector3::new(1.0, 1.0, 1.0),
        };
        let camera = OrbitCamera::new(pose, Projection::Orthographic { scale: 2.0 }, 1.0);
        assert_eq!(camera.forward(), -Vector3::unit_z());
    }
}
