//! Error taxonomy for the session and its control surface.
//!
//! Out-of-range parameter values are deliberately absent: they are clamped,
//! never reported.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// No input/output device, permission denied, or the stream could not be built.
    #[error("audio device unavailable: {reason}")]
    DeviceUnavailable { reason: String },

    /// Parameter update or preset load before the session reached `Running`.
    #[error("session is not running")]
    NotReady,

    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),

    #[error("unknown preset `{0}`")]
    UnknownPreset(String),

    #[error("failed to spawn {name} task")]
    TaskSpawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SessionError {
    pub fn device(reason: impl std::fmt::Display) -> Self {
        Self::DeviceUnavailable {
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = SessionError> = std::result::Result<T, E>;
