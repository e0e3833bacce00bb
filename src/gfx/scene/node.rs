use cgmath::{Matrix4, Rad, SquareMatrix, Vector3, Zero};

use crate::gfx::picking::Aabb;

/// Handle to a node inside a [`Scene`](super::Scene) arena.
///
/// Ids are only meaningful for the scene that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Local transform of a node.
///
/// Rotation is stored as Euler angles in radians and applied yaw (Y), then
/// pitch (X), then roll (Z). The pivot is subtracted before rotation and
/// scale, so it acts as the local origin the node spins around.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub euler: Vector3<f32>,
    pub scale: Vector3<f32>,
    pub pivot: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::zero(),
            euler: Vector3::zero(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            pivot: Vector3::zero(),
        }
    }
}

impl Transform {
    pub fn from_position(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Rotation-only part of the transform.
    pub fn rotation_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_angle_y(Rad(self.euler.y))
            * Matrix4::from_angle_x(Rad(self.euler.x))
            * Matrix4::from_angle_z(Rad(self.euler.z))
    }

    /// Full local matrix: T * R * S * pivot⁻¹
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * self.rotation_matrix()
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
            * Matrix4::from_translation(-self.pivot)
    }

    /// Returns a copy with `delta` added on top.
    pub fn offset_by(&self, delta: &TransformDelta) -> Self {
        Self {
            position: self.position + delta.translation,
            euler: self.euler + delta.rotation,
            scale: self.scale,
            pivot: self.pivot,
        }
    }

    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position + (other.position - self.position) * t,
            euler: self.euler + (other.euler - self.euler) * t,
            scale: self.scale + (other.scale - self.scale) * t,
            pivot: self.pivot + (other.pivot - self.pivot) * t,
        }
    }
}

/// Relative move/rotate applied by an animation, in the node's parent space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformDelta {
    pub translation: Vector3<f32>,
    pub rotation: Vector3<f32>,
}

impl TransformDelta {
    pub fn translate(translation: Vector3<f32>) -> Self {
        Self {
            translation,
            rotation: Vector3::zero(),
        }
    }

    pub fn rotate(rotation: Vector3<f32>) -> Self {
        Self {
            translation: Vector3::zero(),
            rotation,
        }
    }

    pub fn inverted(&self) -> Self {
        Self {
            translation: -self.translation,
            rotation: -self.rotation,
        }
    }
}

/// A single scene graph node.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: Option<String>,
    pub transform: Transform,
    pub hidden: bool,
    /// Mesh extent in the node's own local space, if it carries geometry.
    pub bounds: Option<Aabb>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name,
            transform: Transform::default(),
            hidden: false,
            bounds: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn named(name: &str) -> Self {
        Self::new(Some(name.to_string()))
    }

    /// Name if present and non-empty.
    pub fn label(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn local_matrix(&self) -> Matrix4<f32> {
        if self.transform == Transform::default() {
            Matrix4::identity()
        } else {
            self.transform.matrix()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn pivot_is_origin_of_rotation() {
        let mut transform = Transform::default();
        transform.pivot = Vector3::new(1.0, 0.0, 0.0);
        transform.euler.y = std::f32::consts::PI;

        let pivot = transform.matrix() * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert!(close(pivot.x, 0.0), "x = {}", pivot.x);
        assert!(close(pivot.z, 0.0), "z = {}", pivot.z);
    }

    #[test]
    fn delta_round_trips_through_inverse() {
        let base = Transform::from_position(Vector3::new(1.0, 2.0, 3.0));
        let delta = TransformDelta {
            translation: Vector3::new(0.5, 0.0, 0.0),
            rotation: Vector3::new(0.0, 1.0, 0.0),
        };
        let back = base.offset_by(&delta).offset_by(&delta.inverted());
        assert!(close(back.position.x, base.position.x));
        assert!(close(back.euler.y, base.euler.y));
    }

    #[test]
    fn empty_name_has_no_label() {
        assert_eq!(Node::new(Some(String::new())).label(), None);
        assert_eq!(Node::named("Locker_1").label(), Some("Locker_1"));
    }
}
