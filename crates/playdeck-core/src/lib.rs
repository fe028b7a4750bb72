//! Playdeck Core - Embeddable Media-Player Control Surface
//!
//! This crate provides the behavioral core of a media player:
//! - One capability contract over two incompatible playback backends
//! - The playback state machine and its View side effects
//! - Subtitle cue parsing and cursor scheduling
//! - The pointer-drag protocol for the seek and volume tracks
//! - Buffered-fraction monitoring and the source-switch protocol
//!
//! Rendering, layout, and transport stay outside: the View renders
//! [`ViewCommand`]s and forwards gestures in, and subtitle retrieval goes
//! through a [`SubtitleFetcher`] collaborator.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Playdeck Core                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │     Cue      │  │  Buffering   │  │ Interaction  │           │
//! │  │  Scheduler   │  │   Monitor    │  │  Controller  │           │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘           │
//! │         │                 │                 │                   │
//! │         └─────────────────┼─────────────────┘                   │
//! │                           │                                     │
//! │                    ┌──────┴──────┐                              │
//! │                    │  Playback   │                              │
//! │                    │ Controller  │                              │
//! │                    └──────┬──────┘                              │
//! │                           │                                     │
//! │              ┌────────────┴────────────┐                        │
//! │        ┌─────┴──────┐            ┌─────┴──────┐                 │
//! │        │   Native   │            │   Plugin   │                 │
//! │        │  Backend   │            │  Backend   │                 │
//! │        └────────────┘            └────────────┘                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod backend;
pub mod controller;
pub mod cues;
pub mod error;
pub mod fetch;
pub mod interaction;
pub mod monitor;
pub mod types;
pub mod view;

pub use backend::{
    probe, BackendAdapter, BackendEvent, BackendKind, EnvironmentCapabilities,
};
pub use backend::native::{ElementEvent, NativeBackend, StreamingElement};
pub use backend::plugin::{PluginBackend, PluginHandle};
pub use controller::PlaybackController;
pub use cues::{parse_cue_sheet, CueScheduler};
pub use error::{Error, Result};
pub use fetch::{HttpSubtitleFetcher, SubtitleFetcher};
pub use interaction::{Axis, InteractionController, SessionSpec, TrackBounds};
pub use monitor::BufferingMonitor;
pub use types::*;
pub use view::ViewCommand;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the player library with default configuration
pub fn init() {
    tracing::info!(version = VERSION, "Playdeck Core initialized");
}
