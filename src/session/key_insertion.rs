//! Golden key insertion: move in, turn, settle back, disappear.
//!
//! Each stage is one node tween. The tween's completion event names the
//! stage that just finished, and [`KeyInsertion::stage_finished`] starts the
//! next one, so the whole sequence is driven by the animator tick.

use cgmath::Vector3;
use serde::Serialize;

use crate::config::KeyInsertionConfig;
use crate::gfx::animation::{Easing, NodeAnimator};
use crate::gfx::scene::{NodeId, Scene, TransformDelta};

use super::SceneEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStage {
    Moving,
    Turning,
    Settling,
    Done,
}

#[derive(Debug, Default)]
pub struct KeyInsertion {
    node: Option<NodeId>,
    stage: Option<KeyStage>,
}

impl KeyInsertion {
    pub fn stage(&self) -> Option<KeyStage> {
        self.stage
    }

    /// Starts the sequence on the configured key node. Without one the
    /// sequence is skipped and reported done.
    pub fn start(
        &mut self,
        scene: &mut Scene,
        animator: &mut NodeAnimator<SceneEvent>,
        config: &KeyInsertionConfig,
    ) {
        let Some(node) = scene.find(&config.key_node) else {
            log::warn!("key node `{}` not found, skipping insertion visual", config.key_node);
            self.stage = Some(KeyStage::Done);
            return;
        };
        scene.set_hidden(node, false);
        self.node = Some(node);
        self.run(KeyStage::Moving, scene, animator, config);
    }

    pub fn stage_finished(
        &mut self,
        finished: KeyStage,
        scene: &mut Scene,
        animator: &mut NodeAnimator<SceneEvent>,
        config: &KeyInsertionConfig,
    ) {
        let next = match finished {
            KeyStage::Moving => KeyStage::Turning,
            KeyStage::Turning => KeyStage::Settling,
            KeyStage::Settling | KeyStage::Done => KeyStage::Done,
        };
        self.run(next, scene, animator, config);
    }

    fn run(
        &mut self,
        stage: KeyStage,
        scene: &mut Scene,
        animator: &mut NodeAnimator<SceneEvent>,
        config: &KeyInsertionConfig,
    ) {
        let Some(node) = self.node else {
            self.stage = Some(KeyStage::Done);
            return;
        };
        let (delta, seconds) = match stage {
            KeyStage::Moving => (
                TransformDelta::translate(Vector3::from(config.move_by)),
                config.move_seconds,
            ),
            KeyStage::Turning => (
                TransformDelta::rotate(Vector3::new(0.0, 0.0, config.turn_radians)),
                config.turn_seconds,
            ),
            KeyStage::Settling => (
                TransformDelta::rotate(Vector3::new(0.0, 0.0, config.settle_radians)),
                config.settle_seconds,
            ),
            KeyStage::Done => {
                scene.set_hidden(node, true);
                self.stage = Some(KeyStage::Done);
                return;
            }
        };
        self.stage = Some(stage);
        let started = animator.animate(
            scene,
            node,
            delta,
            seconds,
            Easing::EaseInEaseOut,
            Some(SceneEvent::KeyStage(stage)),
        );
        if started.is_none() {
            // node busy or gone, finish without the visual
            scene.set_hidden(node, true);
            self.stage = Some(KeyStage::Done);
        }
    }
}
