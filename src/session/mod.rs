//! # Game Session
//!
//! [`GameSession`] is the composition root of one playthrough. It owns the
//! room scene, the camera rig, the puzzle state and every animation and
//! timer, and is driven entirely from outside:
//!
//! - [`GameSession::handle`] applies one [`Intent`] from the view layer
//! - [`GameSession::update`] advances camera, node tweens and timers by `dt`
//! - [`GameSession::snapshot`] reports what a view should draw
//!
//! Every failure inside a running session (missing node, missing asset,
//! wrong code, locked object) degrades to a logged no-op or a transient
//! notice. Nothing here returns an error.
//!
//! ```
//! use diorama::prelude::*;
//!
//! let level = Level {
//!     id: 1,
//!     name: "Laboratory".to_string(),
//!     scene_file: "Level1.json".to_string(),
//!     main_menu_hidden_items: None,
//!     in_game_hidden_items: None,
//! };
//! let mut session = GameSession::new(
//!     level,
//!     Box::new(MemorySceneSource::new()),
//!     Box::new(NullAudio),
//!     SessionConfig::default(),
//! );
//! session.handle(Intent::RequestHint);
//! session.update(1.0 / 60.0);
//! assert!(session.snapshot().hint.is_some());
//! ```

mod intent;
mod key_insertion;
mod snapshot;

pub use intent::Intent;
pub use key_insertion::{KeyInsertion, KeyStage};
pub use snapshot::Snapshot;

use crate::audio::{sfx, AudioSink, MUSIC_VOLUME, SFX_VOLUME};
use crate::config::SessionConfig;
use crate::focus::FocusSession;
use crate::gfx::animation::{Easing, NodeAnimator};
use crate::gfx::camera::camera_utils::{convert_matrix4_to_array, Camera};
use crate::gfx::camera::{CameraEvent, CameraRig};
use crate::gfx::picking::NodePicker;
use crate::gfx::scene::{NodeId, Scene, SceneSource, TransformDelta};
use crate::interaction::{Classification, InteractableId};
use crate::level::Level;
use crate::puzzle::{
    hint_for, ItemOutcome, PasscodeOutcome, PasscodeTarget, PuzzleState, TapOutcome,
};
use crate::room::RoomRotation;
use crate::scheduler::{Scheduler, TimerId};

pub const LOCKED_NOTICE: &str = "It's locked.";
pub const WRONG_CODE_NOTICE: &str = "Wrong code.";
pub const KEY_REJECTED_NOTICE: &str = "The key doesn't fit anything yet.";

/// Completion events carried by node tweens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEvent {
    RoomSnapped,
    KeyStage(KeyStage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerAction {
    DismissNotice,
}

#[derive(Debug, Clone)]
struct Notice {
    text: String,
    timer: TimerId,
}

pub struct GameSession {
    config: SessionConfig,
    level: Level,
    source: Box<dyn SceneSource>,
    audio: Box<dyn AudioSink>,
    scene: Scene,
    room: RoomRotation,
    rig: CameraRig,
    picker: NodePicker,
    animator: NodeAnimator<SceneEvent>,
    scheduler: Scheduler<TimerAction>,
    puzzle: PuzzleState,
    key_insertion: KeyInsertion,
    focus: Option<FocusSession>,
    /// Node whose passcode prompt is open, for the open motion on success.
    prompt_node: Option<NodeId>,
    /// Zoom-out asked for while a zoom-in was still flying.
    pending_zoom_out: bool,
    notice: Option<Notice>,
    hint: Option<&'static str>,
    exited: bool,
}

impl GameSession {
    /// Loads the level's scene and starts the background loop. A missing
    /// scene leaves an empty room; the session still runs.
    pub fn new(
        level: Level,
        source: Box<dyn SceneSource>,
        audio: Box<dyn AudioSink>,
        config: SessionConfig,
    ) -> Self {
        let mut scene = source.load_scene(&level.scene_file).unwrap_or_else(|| {
            log::warn!("level {} scene `{}` missing", level.id, level.scene_file);
            Scene::new()
        });
        let room = RoomRotation::new(&scene, &config.room, level.hidden_walls());
        room.update_wall_visibility(&mut scene);

        let [width, height] = config.viewport;
        let aspect = if height > 0.0 { width / height } else { 1.0 };
        let rig = CameraRig::new(&config.camera, aspect);

        audio.play_loop(&config.music_track, MUSIC_VOLUME);
        log::info!("session started on level {} ({})", level.id, level.name);

        Self {
            puzzle: PuzzleState::new(config.secrets.clone(), config.passcode_max_len),
            config,
            level,
            source,
            audio,
            scene,
            room,
            rig,
            picker: NodePicker::new(),
            animator: NodeAnimator::new(),
            scheduler: Scheduler::new(),
            key_insertion: KeyInsertion::default(),
            focus: None,
            prompt_node: None,
            pending_zoom_out: false,
            notice: None,
            hint: None,
            exited: false,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn puzzle(&self) -> &PuzzleState {
        &self.puzzle
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn room(&self) -> &RoomRotation {
        &self.room
    }

    pub fn focus(&self) -> Option<&FocusSession> {
        self.focus.as_ref()
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|notice| notice.text.as_str())
    }

    pub fn has_exited(&self) -> bool {
        self.exited
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.viewport = [width as f32, height as f32];
        self.rig.resize(width, height);
    }

    pub fn handle(&mut self, intent: Intent) {
        if self.exited {
            log::debug!("session exited, {intent:?} ignored");
            return;
        }
        match intent {
            Intent::TapNode { name } => match self.scene.find(&name) {
                Some(node) => self.tap_node(node),
                None => log::debug!("tap on unknown node `{name}`"),
            },
            Intent::TapAt { x, y } => self.tap_at(x, y),
            Intent::Drag { dx, dy } => self.drag(dx, dy),
            Intent::DragEnded => self.drag_ended(),
            Intent::Pinch { scale } => self.pinch(scale),
            Intent::AppendPasscodeDigit { digit } => {
                if self.puzzle.append_passcode(digit) {
                    self.play(sfx::BUTTON);
                }
            }
            Intent::ClearPasscode => self.puzzle.clear_passcode(),
            Intent::DeletePasscodeLastChar => self.puzzle.delete_passcode_last(),
            Intent::SubmitPasscode => self.submit_passcode(),
            Intent::DismissPasscode => {
                self.puzzle.dismiss_prompt();
                self.prompt_node = None;
                self.request_zoom_out();
            }
            Intent::UseItem { item } => self.use_item(&item),
            Intent::DismissClue => self.puzzle.dismiss_clue(),
            Intent::CloseFocus => self.close_focus(),
            Intent::ZoomOut => {
                if self.focus.is_some() {
                    self.close_focus();
                } else {
                    self.request_zoom_out();
                }
            }
            Intent::RequestExit => self.exit(),
            Intent::RequestHint => self.hint = Some(hint_for(self.puzzle.progress())),
            Intent::DismissHint => self.hint = None,
        }
    }

    /// Advances camera transitions, node tweens and timers.
    pub fn update(&mut self, dt: f32) {
        match self.rig.update(dt) {
            Some(CameraEvent::ZoomedIn { id }) => {
                log::debug!("camera settled on `{id}`");
                if std::mem::take(&mut self.pending_zoom_out) {
                    self.rig.zoom_out();
                }
            }
            Some(CameraEvent::ZoomedOut) => {
                log::debug!("camera back home");
                self.pending_zoom_out = false;
            }
            None => {}
        }

        for event in self.animator.tick(dt, &mut self.scene) {
            match event {
                SceneEvent::RoomSnapped => self.room.update_wall_visibility(&mut self.scene),
                SceneEvent::KeyStage(stage) => self.key_insertion.stage_finished(
                    stage,
                    &mut self.scene,
                    &mut self.animator,
                    &self.config.key_insertion,
                ),
            }
        }

        for action in self.scheduler.advance(dt) {
            match action {
                TimerAction::DismissNotice => self.notice = None,
            }
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let (camera_eye, view_projection) = match &self.focus {
            Some(focus) => {
                let camera = focus.camera(self.aspect());
                (camera.eye, camera.build_view_projection_matrix())
            }
            None => {
                let camera = self.rig.camera();
                (camera.eye, camera.build_view_projection_matrix())
            }
        };
        let hidden_walls = self
            .scene
            .ids()
            .filter(|&id| self.scene.is_hidden(id))
            .filter_map(|id| self.scene.name(id))
            .filter(|name| name.starts_with(&self.config.room.wall_prefix))
            .map(str::to_string)
            .collect();

        Snapshot {
            progress: self.puzzle.progress(),
            inventory: self.puzzle.inventory().items().to_vec(),
            passcode: self.puzzle.passcode().to_string(),
            passcode_prompt: self.puzzle.prompt(),
            notice: self.notice().map(str::to_string),
            hint: self.hint.map(str::to_string),
            displayed_clue: self.puzzle.displayed_clue().map(str::to_string),
            is_zoomed_in: self.rig.is_zoomed_in(),
            is_zooming: self.rig.is_zooming(),
            focused_id: self.rig.focused_id().map(str::to_string),
            detail_node: self.focus.as_ref().map(|focus| focus.node_name().to_string()),
            riddles_found: self.puzzle.riddles_found(),
            has_inserted_key: self.puzzle.has_inserted_key(),
            key_insertion: self.key_insertion.stage(),
            book_open: self.puzzle.book_open(),
            uv_light_on: self.puzzle.uv_light_on(),
            opened: self.puzzle.opened().map(str::to_string).collect(),
            opened_flasks: self.puzzle.opened_flasks().map(str::to_string).collect(),
            room_angle: self.room.current_angle(),
            room_facing: self.room.facing_degrees(),
            hidden_walls,
            camera_eye: camera_eye.into(),
            camera_view_projection: convert_matrix4_to_array(view_projection),
            exited: self.exited,
        }
    }

    fn aspect(&self) -> f32 {
        let [width, height] = self.config.viewport;
        if height > 0.0 {
            width / height
        } else {
            1.0
        }
    }

    /// Zooms out now, or right after the zoom-in in flight settles.
    fn request_zoom_out(&mut self) {
        if !self.rig.zoom_out() && self.rig.is_zooming() {
            self.pending_zoom_out = true;
        }
    }

    fn play(&self, sound: &str) {
        self.audio.play_one_shot(sound, SFX_VOLUME, false);
    }

    fn show_notice(&mut self, text: &str, sound: &str) {
        if let Some(previous) = self.notice.take() {
            self.scheduler.cancel(previous.timer);
        }
        let timer = self
            .scheduler
            .schedule(self.config.notice_seconds, TimerAction::DismissNotice);
        self.notice = Some(Notice {
            text: text.to_string(),
            timer,
        });
        self.play(sound);
    }

    fn tap_at(&mut self, x: f32, y: f32) {
        if self.rig.is_zooming() || self.focus.is_some() {
            log::debug!("tap ignored while zooming or in detail view");
            return;
        }
        let [width, height] = self.config.viewport;
        match self
            .picker
            .pick_node((x, y), (width, height), self.rig.camera(), &self.scene)
        {
            Some(hit) => self.tap_node(hit.node),
            None => log::debug!("tap at ({x}, {y}) hit nothing"),
        }
    }

    fn tap_node(&mut self, node: NodeId) {
        if self.rig.is_zooming() || self.focus.is_some() {
            log::debug!("tap ignored while zooming or in detail view");
            return;
        }
        let (id, source) = match self.config.interactions.classify(&self.scene, node) {
            Classification::Interactable { id, source } => (id, source),
            Classification::Ignored => return,
        };
        let moving = self.motion_node(source);
        if self.animator.is_animating(moving) {
            log::debug!("`{id}` still moving, tap dropped");
            return;
        }

        match self.puzzle.handle_tap(&id) {
            TapOutcome::PromptOpened(target) => {
                self.prompt_node = Some(source);
                self.rig.zoom_to_node(&self.scene, source);
                self.play(sfx::BUTTON);
                log::debug!("passcode prompt for {target:?}");
            }
            TapOutcome::Toggled {
                id,
                open,
                riddle_counted,
            } => {
                self.play_toggle(&id, moving, open);
                if riddle_counted {
                    log::info!(
                        "riddle found in `{id}` ({} total)",
                        self.puzzle.riddles_found()
                    );
                }
            }
            TapOutcome::KeyInserted => self.start_key_insertion(),
            TapOutcome::Locked { required } => {
                log::debug!("`{id}` needs {required}");
                self.show_notice(LOCKED_NOTICE, sfx::LOCKED);
            }
            TapOutcome::NoChange => {}
            TapOutcome::Unhandled => self.inspect(&id, source),
        }
    }

    /// Zones fly the camera over; everything else opens the detail view.
    fn inspect(&mut self, id: &InteractableId, source: NodeId) {
        if let Some(zone) = self.config.zone(id.as_str()) {
            let (point, distance) = (zone.focus_point(), zone.zoom_distance);
            self.rig.zoom_to_point(point, distance, id.as_str());
            return;
        }
        let Some(name) = self.scene.name(source).map(str::to_string) else {
            return;
        };
        match FocusSession::open(
            self.source.as_ref(),
            &self.level.scene_file,
            &name,
            &self.config.rotation_profiles,
            &self.config.focus,
        ) {
            Ok(focus) => self.focus = Some(focus),
            Err(err) => log::warn!("detail view for `{id}` unavailable: {err}"),
        }
    }

    fn close_focus(&mut self) {
        if self.focus.take().is_some() {
            log::debug!("detail view closed");
        }
    }

    /// The node that actually moves for an object: a locker swings its
    /// `<name>_Door` child when there is one.
    fn motion_node(&self, source: NodeId) -> NodeId {
        self.scene
            .name(source)
            .and_then(|name| self.scene.find_node(source, &format!("{name}_Door"), false))
            .unwrap_or(source)
    }

    fn play_toggle(&mut self, id: &InteractableId, node: NodeId, open: bool) {
        self.play(if open { sfx::OPEN } else { sfx::CLOSE });
        let Some(motion) = self.config.toggle_motion(id.as_str()) else {
            return;
        };
        let delta = TransformDelta {
            translation: motion.translation(),
            rotation: motion.rotation(),
        };
        let delta = if open { delta } else { delta.inverted() };
        self.animator.animate(
            &self.scene,
            node,
            delta,
            motion.seconds,
            Easing::EaseInEaseOut,
            None,
        );
    }

    fn drag(&mut self, dx: f32, dy: f32) {
        if self.rig.is_zooming() {
            log::debug!("drag ignored during camera transition");
            return;
        }
        if let Some(focus) = self.focus.as_mut() {
            focus.rotate(dx, dy);
        } else if self.rig.is_zoomed_in() {
            self.rig.orbit_drag(dx, dy);
        } else {
            let delta = self.room.drag_to_delta(dx);
            self.room
                .apply_delta(&mut self.scene, &mut self.animator, delta);
        }
    }

    fn drag_ended(&mut self) {
        if self.rig.is_zooming() || self.rig.is_zoomed_in() || self.focus.is_some() {
            return;
        }
        self.room.snap_to_nearest_quarter_turn(
            &self.scene,
            &mut self.animator,
            SceneEvent::RoomSnapped,
        );
    }

    fn pinch(&mut self, scale: f32) {
        if self.rig.is_zooming() {
            return;
        }
        if let Some(focus) = self.focus.as_mut() {
            focus.pinch(scale);
        } else {
            // inert in the room overview
            self.rig.pinch(scale);
        }
    }

    fn submit_passcode(&mut self) {
        match self.puzzle.submit_passcode() {
            PasscodeOutcome::NoPrompt => {}
            PasscodeOutcome::Accepted {
                target, rewards, ..
            } => {
                self.play(sfx::UNLOCK);
                if !rewards.is_empty() {
                    self.play(sfx::PICKUP);
                }
                if let Some(node) = self.prompt_node.take() {
                    if target != PasscodeTarget::Door {
                        let moving = self.motion_node(node);
                        self.play_toggle(&InteractableId::new(target.object_id()), moving, true);
                    }
                }
                self.request_zoom_out();
            }
            PasscodeOutcome::Rejected { .. } => {
                self.show_notice(WRONG_CODE_NOTICE, sfx::WRONG_CODE);
            }
        }
    }

    fn use_item(&mut self, item: &str) {
        match self.puzzle.use_item(item) {
            ItemOutcome::KeyInserted => self.start_key_insertion(),
            ItemOutcome::KeyRejected => self.show_notice(KEY_REJECTED_NOTICE, sfx::LOCKED),
            ItemOutcome::UvLight { on } => {
                log::debug!("UV light {}", if on { "on" } else { "off" });
                self.play(sfx::BUTTON);
            }
            ItemOutcome::ClueShown { item } => log::debug!("showing {item}"),
            ItemOutcome::NotHeld | ItemOutcome::Unusable => {
                log::debug!("`{item}` cannot be used now");
            }
        }
    }

    fn start_key_insertion(&mut self) {
        self.audio
            .play_one_shot(sfx::KEY_INSERT, SFX_VOLUME, true);
        self.key_insertion.start(
            &mut self.scene,
            &mut self.animator,
            &self.config.key_insertion,
        );
    }

    /// Leaves the level. Progress is dropped and audio stops.
    fn exit(&mut self) {
        self.audio.stop();
        self.puzzle = PuzzleState::new(self.config.secrets.clone(), self.config.passcode_max_len);
        self.focus = None;
        self.prompt_node = None;
        self.pending_zoom_out = false;
        self.notice = None;
        self.hint = None;
        self.scheduler.clear();
        self.exited = true;
        log::info!("left level {}, progress discarded", self.level.id);
    }
}
