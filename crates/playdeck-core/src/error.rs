//! Error types for Playdeck Core

use thiserror::Error;

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Player error types
#[derive(Error, Debug)]
pub enum Error {
    // Backend errors
    #[error("no playback backend available")]
    UnsupportedBackend,

    #[error("failed to load source: {0}")]
    SourceLoad(String),

    #[error("metadata for source \"{name}\" never arrived")]
    SourceLoadTimeout { name: String },

    #[error("unknown source: {name}")]
    UnknownSource { name: String },

    // Subtitle errors
    #[error("failed to fetch subtitles: {0}")]
    SubtitleFetch(String),

    #[error("malformed cue block: {reason}")]
    MalformedCue { reason: String },

    // Playback errors
    #[error("invalid playback state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    // Network errors
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    // Configuration errors
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // Internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns true if playback can continue despite this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::SubtitleFetch(_) | Error::MalformedCue { .. } | Error::Network(_)
        )
    }

    /// Returns the error code surfaced to the View
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::UnsupportedBackend => "BACKEND_UNSUPPORTED",
            Error::SourceLoad(_) => "SOURCE_LOAD",
            Error::SourceLoadTimeout { .. } => "SOURCE_TIMEOUT",
            Error::UnknownSource { .. } => "SOURCE_UNKNOWN",
            Error::SubtitleFetch(_) => "SUBTITLE_FETCH",
            Error::MalformedCue { .. } => "CUE_MALFORMED",
            Error::InvalidStateTransition { .. } => "INVALID_STATE",
            Error::Network(_) => "NETWORK",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::Internal(_) => "INTERNAL",
        }
    }
}
