//! Error types shared by the stage and its host bridge.

use thiserror::Error;

/// Why a request issued by the stage did not produce a usable body.
///
/// Flows treat every variant the same way (silent ignore or fallback text);
/// the distinction only reaches the log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request never produced a response (offline, CORS, aborted).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("unsuccessful status {0}")]
    Status(u16),

    /// The body could not be read or decoded.
    #[error("undecodable body: {0}")]
    Decode(String),
}

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid stage config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("audio_volume must be within 0.0..=1.0, got {0}")]
    Volume(f32),

    #[error("backdrop_pixel must be at least 1")]
    ZeroPixel,
}
