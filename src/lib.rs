// src/lib.rs
//! Diorama escape-room core
//!
//! Scene graph, camera rig, room rotation and puzzle state for a one-room 3D
//! escape game, independent of any renderer or UI toolkit.

pub mod audio;
pub mod config;
pub mod error;
pub mod focus;
pub mod gfx;
pub mod input;
pub mod interaction;
pub mod level;
pub mod prelude;
pub mod puzzle;
pub mod room;
pub mod scheduler;
pub mod session;

// Re-export main types for convenience
pub use config::SessionConfig;
pub use session::{GameSession, Intent, Snapshot};
