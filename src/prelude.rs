//! # Diorama Prelude
//!
//! Commonly used types in one import:
//!
//! ```rust
//! use diorama::prelude::*;
//! ```

pub use crate::audio::{AudioSink, LogAudio, NullAudio, RecordingAudio};
pub use crate::config::SessionConfig;
pub use crate::gfx::scene::{DirectorySceneSource, MemorySceneSource, Scene, SceneSource};
pub use crate::input::GestureController;
pub use crate::level::{Level, LevelCatalog};
pub use crate::puzzle::{PasscodeTarget, ProgressState};
pub use crate::session::{GameSession, Intent, Snapshot};

pub use cgmath::Vector3;
