//! # Node Picking
//!
//! Turns a tap in screen space into the scene node under it.
//!
//! ## How it works
//!
//! 1. **Tap to Ray**: Convert screen coordinates to a world-space ray through
//!    the active camera (perspective or orthographic)
//! 2. **Ray-Node Intersection**: Test the ray against the world-space bounds
//!    of every visible node that carries geometry
//! 3. **Selection**: Return the closest hit
//!
//! ## Usage
//!
//! ```no_run
//! use diorama::gfx::picking::NodePicker;
//! # fn demo(camera: &diorama::gfx::camera::OrbitCamera, scene: &diorama::gfx::scene::Scene) {
//! if let Some(hit) = NodePicker::new().pick_node((320.0, 240.0), (640.0, 480.0), camera, scene) {
//!     println!("tapped {:?}", scene.name(hit.node));
//! }
//! # }
//! ```

use cgmath::{InnerSpace, Matrix4, SquareMatrix, Vector3, Vector4, Zero};

use crate::gfx::{
    camera::{Camera, OrbitCamera},
    scene::{NodeId, Scene},
};

/// World-space ray. The direction is kept unit length so hit distances
/// compare across nodes.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vector3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }
}

/// Axis-aligned box, used both for mesh extents and for hit testing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

fn component_min(a: Vector3<f32>, b: Vector3<f32>) -> Vector3<f32> {
    Vector3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z))
}

fn component_max(a: Vector3<f32>, b: Vector3<f32>) -> Vector3<f32> {
    Vector3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z))
}

impl Aabb {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Smallest box around `points`, or `None` for an empty slice.
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vector3<f32>>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::new(first, first), |bounds, point| {
            Self::new(component_min(bounds.min, point), component_max(bounds.max, point))
        }))
    }

    /// Like [`Aabb::enclosing`], collapsing to the origin when empty.
    pub fn from_vertices(vertices: &[[f32; 3]]) -> Self {
        Self::enclosing(vertices.iter().copied().map(Vector3::from))
            .unwrap_or_else(|| Self::new(Vector3::zero(), Vector3::zero()))
    }

    /// Bounds of a flat `[x, y, z, x, y, z, ...]` position buffer.
    pub fn from_positions(positions: &[f32]) -> Option<Self> {
        Self::enclosing(
            positions
                .chunks_exact(3)
                .map(|chunk| Vector3::new(chunk[0], chunk[1], chunk[2])),
        )
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::new(
            component_min(self.min, other.min),
            component_max(self.max, other.max),
        )
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn max_dimension(&self) -> f32 {
        let size = self.size();
        size.x.max(size.y).max(size.z)
    }

    /// Slab test. Returns the distance along the ray to the first surface
    /// hit, or to the exit point when the ray starts inside the box.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let mut enter = f32::NEG_INFINITY;
        let mut exit = f32::INFINITY;
        for axis in 0..3 {
            let inverse = 1.0 / ray.direction[axis];
            let a = (self.min[axis] - ray.origin[axis]) * inverse;
            let b = (self.max[axis] - ray.origin[axis]) * inverse;
            enter = enter.max(a.min(b));
            exit = exit.min(a.max(b));
        }
        if enter > exit || exit < 0.0 {
            return None;
        }
        Some(if enter >= 0.0 { enter } else { exit })
    }

    /// Box around the eight transformed corners.
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        let (lo, hi) = (self.min, self.max);
        let corners = (0..8u8).map(|bits| {
            let corner = Vector3::new(
                if bits & 1 == 0 { lo.x } else { hi.x },
                if bits & 2 == 0 { lo.y } else { hi.y },
                if bits & 4 == 0 { lo.z } else { hi.z },
            );
            let projected = matrix * corner.extend(1.0);
            projected.truncate() / projected.w
        });
        Self::enclosing(corners).unwrap_or(*self)
    }
}

/// Result of a picking operation
#[derive(Debug, Clone)]
pub struct PickResult {
    pub node: NodeId,
    /// Distance from the ray origin to the hit
    pub distance: f32,
    pub intersection_point: Vector3<f32>,
}

/// Ray-casts screen taps against scene nodes.
#[derive(Debug, Default)]
pub struct NodePicker;

impl NodePicker {
    pub fn new() -> Self {
        Self
    }

    /// World ray through a tap. Works for both projections: the ray runs
    /// from the tap on the near plane to the tap on the far plane.
    pub fn screen_to_ray(
        &self,
        screen_pos: (f32, f32),
        screen_size: (f32, f32),
        camera: &OrbitCamera,
    ) -> Ray {
        let (tap_x, tap_y) = screen_pos;
        let (width, height) = screen_size;
        let ndc_x = 2.0 * tap_x / width - 1.0;
        // screen y grows downwards
        let ndc_y = 1.0 - 2.0 * tap_y / height;

        let Some(unproject) = camera.build_view_projection_matrix().invert() else {
            return Ray::new(camera.eye, camera.forward());
        };
        let at_depth = |depth: f32| {
            let world = unproject * Vector4::new(ndc_x, ndc_y, depth, 1.0);
            world.truncate() / world.w
        };
        let near = at_depth(-1.0);
        Ray::new(near, at_depth(1.0) - near)
    }

    /// Closest visible node under a screen position.
    pub fn pick_node(
        &self,
        screen_pos: (f32, f32),
        screen_size: (f32, f32),
        camera: &OrbitCamera,
        scene: &Scene,
    ) -> Option<PickResult> {
        let ray = self.screen_to_ray(screen_pos, screen_size, camera);
        self.pick_with_ray(&ray, scene)
    }

    pub fn pick_with_ray(&self, ray: &Ray, scene: &Scene) -> Option<PickResult> {
        scene
            .ids()
            .filter(|&id| scene.is_visible(id))
            .filter_map(|id| {
                let bounds = scene.node(id)?.bounds?;
                let distance = bounds
                    .transform(&scene.world_matrix(id))
                    .intersect_ray(ray)?;
                Some(PickResult {
                    node: id,
                    distance,
                    intersection_point: ray.point_at(distance),
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::{CameraPose, Projection};
    use cgmath::{Deg, Rad};

    fn unit_box() -> Aabb {
        Aabb::new(Vector3::new(-0.5, -0.5, -0.5), Vector3::new(0.5, 0.5, 0.5))
    }

    #[test]
    fn bounds_from_mesh_positions() {
        let bounds = Aabb::from_positions(&[0.0, 0.0, 0.0, 1.0, 2.0, 0.5, -1.0, 0.5, -0.5])
            .expect("three vertices");
        assert_eq!(bounds.min, Vector3::new(-1.0, 0.0, -0.5));
        assert_eq!(bounds.max, Vector3::new(1.0, 2.0, 0.5));
        assert_eq!(bounds.max_dimension(), 2.0);
        assert!(Aabb::from_positions(&[1.0, 2.0]).is_none());
    }

    #[test]
    fn slab_test_reports_entry_distance() {
        let ray = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 3.0));
        assert_eq!(unit_box().intersect_ray(&ray), Some(4.5));

        let inside = Ray::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(unit_box().intersect_ray(&inside), Some(0.5));

        let wide = Ray::new(Vector3::new(2.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(unit_box().intersect_ray(&wide).is_none());
    }

    #[test]
    fn transformed_bounds_follow_translation() {
        let moved = unit_box().transform(&Matrix4::from_translation(Vector3::new(1.0, 0.0, 0.0)));
        assert_eq!(moved.min, Vector3::new(0.5, -0.5, -0.5));
        assert_eq!(moved.max, Vector3::new(1.5, 0.5, 0.5));
    }

    #[test]
    fn picks_nearest_visible_node() {
        let mut scene = Scene::new();
        let root = scene.root();
        let near = scene.add_named(root, "Flask_1", Vector3::new(0.0, 0.0, 2.0));
        let far = scene.add_named(root, "Cabinet_1", Vector3::new(0.0, 0.0, -2.0));
        for id in [near, far] {
            scene.node_mut(id).unwrap().bounds = Some(unit_box());
        }

        let camera = OrbitCamera::new(
            CameraPose::new(Vector3::new(0.0, 0.0, 10.0), Vector3::new(0.0, 0.0, 0.0)),
            Projection::Perspective {
                fovy: Rad::from(Deg(45.0)),
            },
            1.0,
        );
        let picker = NodePicker::new();

        let hit = picker
            .pick_node((320.0, 320.0), (640.0, 640.0), &camera, &scene)
            .expect("center tap hits");
        assert_eq!(hit.node, near);

        scene.set_hidden(near, true);
        let hit = picker
            .pick_node((320.0, 320.0), (640.0, 640.0), &camera, &scene)
            .expect("hidden node is skipped");
        assert_eq!(hit.node, far);

        assert!(picker
            .pick_node((5.0, 5.0), (640.0, 640.0), &camera, &scene)
            .is_none());
    }

    #[test]
    fn orthographic_rays_are_parallel() {
        let camera = OrbitCamera::new(
            CameraPose::new(Vector3::new(0.0, 0.0, 10.0), Vector3::new(0.0, 0.0, 0.0)),
            Projection::Orthographic { scale: 2.0 },
            1.0,
        );
        let picker = NodePicker::new();
        let a = picker.screen_to_ray((100.0, 100.0), (640.0, 640.0), &camera);
        let b = picker.screen_to_ray((500.0, 400.0), (640.0, 640.0), &camera);
        assert!((a.direction - b.direction).magnitude() < 1e-4);
        assert!((a.direction.z + 1.0).abs() < 1e-4);
    }
}
