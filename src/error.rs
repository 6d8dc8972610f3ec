//! Error types
//!
//! None of these ever reach the frame loop as a fault: callers log them and
//! fall back (silence, defaults, no selection).

use thiserror::Error;

/// Failures inside the audio graph
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio context unavailable")]
    ContextUnavailable,
    #[error("failed to create {0} node")]
    NodeCreation(&'static str),
    #[error("failed to synthesize noise buffer: {0}")]
    BufferSynthesis(String),
    #[error("failed to connect audio graph")]
    Connect,
    #[error("playback failed: {0}")]
    Playback(String),
}

/// The scene handed to the game does not satisfy the world invariants
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("world has no player boat")]
    MissingPlayer,
    #[error("world has {0} player boats, expected exactly one")]
    MultiplePlayers(usize),
}

/// Settings could not be read
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid settings json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f32 },
    #[error("ambient track list is empty")]
    NoAmbientTracks,
}
