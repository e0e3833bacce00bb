//! Room yaw, quarter-turn snapping and wall culling.
//!
//! Continuous drags write the yaw straight into the room node. Releasing the
//! drag snaps to the nearest quarter turn with a short tween; once that tween
//! settles the session calls [`RoomRotation::update_wall_visibility`] so the
//! walls facing the camera get hidden.

use std::collections::BTreeMap;
use std::f32::consts::FRAC_PI_2;

use crate::config::RoomConfig;
use crate::gfx::animation::{Easing, NodeAnimator};
use crate::gfx::scene::{NodeId, Scene};

/// Wall names to hide, keyed by facing in degrees (0, 90, 180, 270).
pub type HiddenWalls = BTreeMap<u16, Vec<String>>;

/// Maps any angle in degrees into `[0, 360)`.
pub fn normalize_degrees(degrees: f32) -> f32 {
    let normalized = ((degrees % 360.0) + 360.0) % 360.0;
    // -0.0 and values that round up to 360 both land on 0
    if normalized >= 360.0 || normalized == 0.0 {
        0.0
    } else {
        normalized
    }
}

/// The quarter-turn bucket an angle in radians falls into.
pub fn facing_bucket(angle: f32) -> u16 {
    let quarter_turns = (angle / FRAC_PI_2).round();
    normalize_degrees(quarter_turns * 90.0).round() as u16 % 360
}

pub struct RoomRotation {
    room: Option<NodeId>,
    current_angle: f32,
    hidden_walls: HiddenWalls,
    config: RoomConfig,
}

impl RoomRotation {
    /// Looks up the configured room node. A scene without one still gets a
    /// rotation engine; it just has nothing to turn.
    pub fn new(scene: &Scene, config: &RoomConfig, hidden_walls: HiddenWalls) -> Self {
        let room = scene.find(&config.room_node);
        if room.is_none() {
            log::warn!("room node `{}` not found, rotation disabled", config.room_node);
        }
        let current_angle = room
            .and_then(|id| scene.transform(id))
            .map(|transform| transform.euler.y)
            .unwrap_or(0.0);
        Self {
            room,
            current_angle,
            hidden_walls,
            config: config.clone(),
        }
    }

    pub fn room_node(&self) -> Option<NodeId> {
        self.room
    }

    pub fn current_angle(&self) -> f32 {
        self.current_angle
    }

    pub fn facing_degrees(&self) -> u16 {
        facing_bucket(self.current_angle)
    }

    /// Converts a horizontal drag in pixels to a yaw delta.
    pub fn drag_to_delta(&self, dx: f32) -> f32 {
        dx * self.config.drag_sensitivity
    }

    /// Adds `delta` radians and writes the yaw immediately. An in-flight snap
    /// is abandoned so the drag owns the node again.
    pub fn apply_delta<E>(&mut self, scene: &mut Scene, animator: &mut NodeAnimator<E>, delta: f32) {
        self.current_angle += delta;
        let Some(room) = self.room else {
            return;
        };
        animator.cancel(room);
        if let Some(node) = scene.node_mut(room) {
            node.transform.euler.y = self.current_angle;
        }
    }

    /// Rounds the yaw to the nearest quarter turn and tweens the room there.
    ///
    /// `current_angle` takes the snapped value right away; `on_complete` comes
    /// back out of the animator once the tween settles. Returns the snapped
    /// angle.
    pub fn snap_to_nearest_quarter_turn<E>(
        &mut self,
        scene: &Scene,
        animator: &mut NodeAnimator<E>,
        on_complete: E,
    ) -> f32 {
        let snapped = (self.current_angle / FRAC_PI_2).round() * FRAC_PI_2;
        self.current_angle = snapped;
        if let Some(room) = self.room {
            if let Some(from) = scene.transform(room) {
                let mut to = from;
                to.euler.y = snapped;
                animator.cancel(room);
                animator.animate_to(
                    room,
                    from,
                    to,
                    self.config.snap_seconds,
                    Easing::EaseInEaseOut,
                    Some(on_complete),
                );
            }
        }
        snapped
    }

    pub fn hidden_walls_for(&self, degrees: u16) -> &[String] {
        self.hidden_walls
            .get(&degrees)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Hides exactly the walls listed for the current facing and shows every
    /// other wall under the room node.
    pub fn update_wall_visibility(&self, scene: &mut Scene) {
        let bucket = self.facing_degrees();
        let hidden = self.hidden_walls_for(bucket);
        let from = self.room.unwrap_or_else(|| scene.root());
        let walls: Vec<NodeId> = scene
            .descendants(from)
            .into_iter()
            .filter(|&id| {
                scene
                    .name(id)
                    .is_some_and(|name| name.starts_with(&self.config.wall_prefix))
            })
            .collect();
        for wall in walls {
            let hide = scene
                .name(wall)
                .is_some_and(|name| hidden.iter().any(|hidden| hidden == name));
            scene.set_hidden(wall, hide);
        }
        log::debug!("facing {bucket}, hiding {hidden:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn room_scene() -> Scene {
        let mut scene = Scene::new();
        let origin = Vector3::new(0.0, 0.0, 0.0);
        let room = scene.add_named(scene.root(), "root", origin);
        for wall in ["Wall_1", "Wall_2", "Wall_3", "Wall_4"] {
            scene.add_named(room, wall, origin);
        }
        scene
    }

    fn walls() -> HiddenWalls {
        let mut walls = HiddenWalls::new();
        walls.insert(0, vec!["Wall_1".to_string(), "Wall_2".to_string()]);
        walls.insert(90, vec!["Wall_2".to_string(), "Wall_3".to_string()]);
        walls.insert(270, vec!["Wall_4".to_string(), "Wall_1".to_string()]);
        walls
    }

    fn hidden_names(scene: &Scene) -> Vec<String> {
        scene
            .ids()
            .filter(|&id| scene.is_hidden(id))
            .filter_map(|id| scene.name(id).map(str::to_string))
            .collect()
    }

    #[test]
    fn negative_angles_normalize() {
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(-450.0), 270.0);
        assert_eq!(normalize_degrees(720.0), 0.0);
        assert_eq!(normalize_degrees(-0.0), 0.0);
        assert_eq!(facing_bucket(-FRAC_PI_2), facing_bucket(3.0 * FRAC_PI_2));
    }

    #[test]
    fn minus_ninety_and_two_seventy_hide_the_same_walls() {
        let mut results = Vec::new();
        for angle in [-FRAC_PI_2, 3.0 * FRAC_PI_2] {
            let mut scene = room_scene();
            let mut animator: NodeAnimator<()> = NodeAnimator::new();
            let mut room = RoomRotation::new(&scene, &RoomConfig::default(), walls());
            room.apply_delta(&mut scene, &mut animator, angle);
            room.snap_to_nearest_quarter_turn(&scene, &mut animator, ());
            room.update_wall_visibility(&mut scene);
            results.push(hidden_names(&scene));
        }
        assert_eq!(results[0], results[1]);
        assert_eq!(results[0], vec!["Wall_1".to_string(), "Wall_4".to_string()]);
    }

    #[test]
    fn missing_bucket_shows_every_wall() {
        let mut scene = room_scene();
        let mut animator: NodeAnimator<()> = NodeAnimator::new();
        let mut room = RoomRotation::new(&scene, &RoomConfig::default(), walls());
        room.update_wall_visibility(&mut scene);
        assert_eq!(hidden_names(&scene).len(), 2);

        room.apply_delta(&mut scene, &mut animator, std::f32::consts::PI);
        room.update_wall_visibility(&mut scene);
        assert!(hidden_names(&scene).is_empty());
    }

    #[test]
    fn drag_writes_yaw_immediately() {
        let mut scene = room_scene();
        let mut animator: NodeAnimator<()> = NodeAnimator::new();
        let mut room = RoomRotation::new(&scene, &RoomConfig::default(), HiddenWalls::new());
        room.apply_delta(&mut scene, &mut animator, 0.4);
        let node = room.room_node().unwrap();
        assert_eq!(scene.transform(node).unwrap().euler.y, 0.4);
    }

    #[test]
    fn snap_settles_the_node_and_reports_completion() {
        let mut scene = room_scene();
        let mut animator = NodeAnimator::new();
        let mut room = RoomRotation::new(&scene, &RoomConfig::default(), HiddenWalls::new());
        room.apply_delta(&mut scene, &mut animator, 1.3);
        let snapped = room.snap_to_nearest_quarter_turn(&scene, &mut animator, "snapped");
        assert!((snapped - FRAC_PI_2).abs() < 1e-6);
        assert_eq!(room.current_angle(), snapped);

        let mut events = Vec::new();
        for _ in 0..30 {
            events.extend(animator.tick(1.0 / 60.0, &mut scene));
        }
        assert_eq!(events, vec!["snapped"]);
        let yaw = scene.transform(room.room_node().unwrap()).unwrap().euler.y;
        assert!((yaw - FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn random_drags_always_snap_to_quarter_turns() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut scene = room_scene();
        let mut animator: NodeAnimator<()> = NodeAnimator::new();
        let mut room = RoomRotation::new(&scene, &RoomConfig::default(), HiddenWalls::new());
        for _ in 0..200 {
            let deltas = rng.random_range(1..12);
            for _ in 0..deltas {
                let delta = rng.random_range(-2.5f32..2.5);
                room.apply_delta(&mut scene, &mut animator, delta);
            }
            let snapped = room.snap_to_nearest_quarter_turn(&scene, &mut animator, ());
            let turns = snapped / FRAC_PI_2;
            assert!((turns - turns.round()).abs() < 1e-4, "{snapped} is off-grid");
        }
    }
}
