use serde::Serialize;

use crate::puzzle::{PasscodeTarget, ProgressState};

use super::KeyStage;

/// Observable session state for a view layer, one frame's worth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub progress: ProgressState,
    pub inventory: Vec<String>,
    pub passcode: String,
    pub passcode_prompt: Option<PasscodeTarget>,
    pub notice: Option<String>,
    pub hint: Option<String>,
    pub displayed_clue: Option<String>,
    pub is_zoomed_in: bool,
    pub is_zooming: bool,
    /// Zone or node the camera is focused on.
    pub focused_id: Option<String>,
    /// Node shown in the detail view, if open.
    pub detail_node: Option<String>,
    pub riddles_found: u8,
    pub has_inserted_key: bool,
    pub key_insertion: Option<KeyStage>,
    pub book_open: bool,
    pub uv_light_on: bool,
    pub opened: Vec<String>,
    pub opened_flasks: Vec<String>,
    pub room_angle: f32,
    pub room_facing: u16,
    pub hidden_walls: Vec<String>,
    pub camera_eye: [f32; 3],
    pub camera_view_projection: [[f32; 4]; 4],
    pub exited: bool,
}
