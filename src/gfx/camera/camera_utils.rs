use cgmath::{Matrix4, Vector3};

use crate::gfx::animation::Interpolate;

pub trait Camera: Sized {
    fn build_view_projection_matrix(&self) -> Matrix4<f32>;
}

/// Where the camera sits and what it looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
}

impl CameraPose {
    pub fn new(eye: Vector3<f32>, target: Vector3<f32>) -> Self {
        Self { eye, target }
    }
}

impl Interpolate for CameraPose {
    fn interpolate(&self, to: &Self, t: f32) -> Self {
        Self {
            eye: self.eye + (to.eye - self.eye) * t,
            target: self.target + (to.target - self.target) * t,
        }
    }
}

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    let mut result = [[0.0; 4]; 4];

    for i in 0..4 {
        for j in 0..4 {
            result[i][j] = matrix4[i][j];
        }
    }

    result
}
