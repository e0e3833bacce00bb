//! Error types for the loading edges of the crate.
//!
//! Gameplay itself never returns these: once a session is running, missing
//! assets and rejected input degrade to a logged no-op.

use std::path::PathBuf;

use thiserror::Error;

/// A data-driven lookup table failed validation.
#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("{table}: entry {index} has an empty {field}")]
    EmptyField {
        table: &'static str,
        index: usize,
        field: &'static str,
    },
    #[error("{table}: `{name}` is listed more than once")]
    Duplicate { table: &'static str, name: String },
    #[error("interaction table: `{name}` is both aliased and deny-listed")]
    AliasedAndDenied { name: String },
    #[error("invalid {what} range [{min}, {max}]")]
    InvalidRange {
        what: &'static str,
        min: f32,
        max: f32,
    },
}

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed level data")]
    Parse(#[from] serde_json::Error),
    #[error("level {id} has no scene file")]
    MissingSceneFile { id: i64 },
}

#[derive(Debug, Error)]
pub enum SceneLoadError {
    #[error("scene asset `{0}` not found")]
    NotFound(String),
    #[error("unsupported scene format for `{0}`")]
    UnsupportedFormat(String),
    #[error("failed to read scene asset {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse OBJ scene {path}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
    #[error("failed to parse scene description")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FocusError {
    #[error("scene `{0}` could not be loaded")]
    SceneMissing(String),
    #[error("node `{node}` not found in scene `{scene}`")]
    NodeMissing { scene: String, node: String },
}
