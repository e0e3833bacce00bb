//! # Animation
//!
//! Timeline-driven transform animation. Every in-flight animation is a small
//! [`Tween`] state machine (`Idle` → `Animating` → `Settling` → `Idle`)
//! advanced by a single `tick` per frame, so completion is reported as a
//! value rather than through nested callbacks.
//!
//! [`NodeAnimator`] owns the tweens that move scene nodes. It guarantees at
//! most one tween per node: a second request for a busy node is rejected
//! and the caller decides whether to wait or [`NodeAnimator::cancel`].

use std::f32::consts::PI;

use super::scene::{NodeId, Scene, Transform, TransformDelta};

/// Timing curve applied to normalized progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    #[default]
    EaseInEaseOut,
}

impl Easing {
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => 1.0 - (t * PI / 2.0).cos(),
            Easing::EaseOut => (t * PI / 2.0).sin(),
            Easing::EaseInEaseOut => 0.5 - 0.5 * (t * PI).cos(),
        }
    }
}

pub trait Interpolate: Copy {
    fn interpolate(&self, to: &Self, t: f32) -> Self;
}

impl Interpolate for Transform {
    fn interpolate(&self, to: &Self, t: f32) -> Self {
        self.lerp(to, t)
    }
}

impl Interpolate for f32 {
    fn interpolate(&self, to: &Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenPhase {
    Idle,
    Animating,
    Settling,
}

/// Result of advancing a tween by one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenStep<T> {
    /// Mid-flight value.
    Running(T),
    /// Final value; reported exactly once.
    Settled(T),
    /// Nothing left to do.
    Idle,
}

#[derive(Debug, Clone, Copy)]
pub struct Tween<T> {
    from: T,
    to: T,
    duration: f32,
    elapsed: f32,
    easing: Easing,
    phase: TweenPhase,
}

impl<T: Interpolate> Tween<T> {
    pub fn new(from: T, to: T, duration: f32, easing: Easing) -> Self {
        let phase = if duration > 0.0 {
            TweenPhase::Animating
        } else {
            TweenPhase::Settling
        };
        Self {
            from,
            to,
            duration: duration.max(0.0),
            elapsed: 0.0,
            easing,
            phase,
        }
    }

    pub fn phase(&self) -> TweenPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != TweenPhase::Idle
    }

    pub fn target(&self) -> T {
        self.to
    }

    /// Value at the current elapsed time without advancing.
    pub fn current(&self) -> T {
        match self.phase {
            TweenPhase::Animating => {
                let t = self.easing.apply(self.elapsed / self.duration);
                self.from.interpolate(&self.to, t)
            }
            TweenPhase::Settling | TweenPhase::Idle => self.to,
        }
    }

    pub fn step(&mut self, dt: f32) -> TweenStep<T> {
        match self.phase {
            TweenPhase::Idle => TweenStep::Idle,
            TweenPhase::Animating => {
                self.elapsed += dt.max(0.0);
                if self.elapsed >= self.duration {
                    self.phase = TweenPhase::Settling;
                    self.step(0.0)
                } else {
                    TweenStep::Running(self.current())
                }
            }
            TweenPhase::Settling => {
                self.phase = TweenPhase::Idle;
                TweenStep::Settled(self.to)
            }
        }
    }
}

/// Identifies one node animation for cancellation and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationId(u64);

#[derive(Debug)]
struct NodeTrack<E> {
    id: AnimationId,
    node: NodeId,
    tween: Tween<Transform>,
    on_complete: Option<E>,
}

/// Runs transform tweens against nodes of one scene.
#[derive(Debug)]
pub struct NodeAnimator<E> {
    tracks: Vec<NodeTrack<E>>,
    next_id: u64,
}

impl<E> Default for NodeAnimator<E> {
    fn default() -> Self {
        Self {
            tracks: Vec::new(),
            next_id: 1,
        }
    }
}

impl<E> NodeAnimator<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_animating(&self, node: NodeId) -> bool {
        self.tracks.iter().any(|track| track.node == node)
    }

    pub fn active_count(&self) -> usize {
        self.tracks.len()
    }

    /// Starts animating `node` by `delta` from its current transform.
    ///
    /// Returns `None` when the node does not exist or is already animating.
    /// `on_complete` is handed back from [`tick`](Self::tick) once the tween
    /// has settled.
    pub fn animate(
        &mut self,
        scene: &Scene,
        node: NodeId,
        delta: TransformDelta,
        duration: f32,
        easing: Easing,
        on_complete: Option<E>,
    ) -> Option<AnimationId> {
        let from = scene.transform(node)?;
        self.animate_to(node, from, from.offset_by(&delta), duration, easing, on_complete)
    }

    /// Starts animating `node` between two absolute transforms.
    pub fn animate_to(
        &mut self,
        node: NodeId,
        from: Transform,
        to: Transform,
        duration: f32,
        easing: Easing,
        on_complete: Option<E>,
    ) -> Option<AnimationId> {
        if self.is_animating(node) {
            log::debug!("node {:?} already animating, request dropped", node);
            return None;
        }
        let id = AnimationId(self.next_id);
        self.next_id += 1;
        self.tracks.push(NodeTrack {
            id,
            node,
            tween: Tween::new(from, to, duration, easing),
            on_complete,
        });
        Some(id)
    }

    /// Aborts any tween on `node`, leaving it where it currently is. The
    /// completion value is dropped.
    pub fn cancel(&mut self, node: NodeId) -> bool {
        let before = self.tracks.len();
        self.tracks.retain(|track| track.node != node);
        before != self.tracks.len()
    }

    /// Advances every tween, writes the interpolated transforms into `scene`
    /// and returns the completion values of tweens that settled this tick, in
    /// start order.
    pub fn tick(&mut self, dt: f32, scene: &mut Scene) -> Vec<E> {
        let mut completed = Vec::new();
        let mut finished_ids = Vec::new();
        for track in self.tracks.iter_mut() {
            match track.tween.step(dt) {
                TweenStep::Running(value) => scene.set_transform(track.node, value),
                TweenStep::Settled(value) => {
                    scene.set_transform(track.node, value);
                    finished_ids.push(track.id);
                }
                TweenStep::Idle => finished_ids.push(track.id),
            }
        }
        let mut remaining = Vec::with_capacity(self.tracks.len());
        for mut track in self.tracks.drain(..) {
            if finished_ids.contains(&track.id) {
                if let Some(event) = track.on_complete.take() {
                    completed.push(event);
                }
            } else {
                remaining.push(track);
            }
        }
        self.tracks = remaining;
        completed
    }
}
