use serde::{Deserialize, Serialize};

/// Everything the presentation layer can ask of a running session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    /// Tap on a node known by name (the view already hit-tested).
    TapNode { name: String },
    /// Tap at a screen position in pixels; the session hit-tests.
    TapAt { x: f32, y: f32 },
    Drag { dx: f32, dy: f32 },
    DragEnded,
    Pinch { scale: f32 },
    AppendPasscodeDigit { digit: char },
    ClearPasscode,
    DeletePasscodeLastChar,
    SubmitPasscode,
    DismissPasscode,
    UseItem { item: String },
    DismissClue,
    CloseFocus,
    ZoomOut,
    RequestExit,
    RequestHint,
    DismissHint,
}
