//! Backend abstraction - one capability contract over two playback engines
//!
//! The orchestrator drives playback exclusively through [`BackendAdapter`];
//! everything the native streaming element and the plugin fallback disagree
//! on (method vs. property access, pushed vs. polled events) stays inside
//! the two variants:
//! - [`native::NativeBackend`]: translates pushed element callbacks
//! - [`plugin::PluginBackend`]: derives events from a fixed-interval poll
//!
//! Which variant gets instantiated is decided once at startup by [`probe`]
//! and never revisited mid-session.

pub mod native;
pub mod plugin;

use crate::error::{Error, Result};
use crate::types::MediaSource;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;

/// Events a backend raises toward the orchestrator.
///
/// Delivery is in backend order. The plugin variant's poll-derived `Seeked`
/// and `TimeUpdate` events are coarser than the native ones and may coalesce
/// several real changes into one observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackendEvent {
    /// Source metadata is available; duration in seconds
    MetadataLoaded { duration: f64 },
    Playing,
    Paused,
    Seeked,
    /// Playback position changed; position in seconds
    TimeUpdate(f64),
    Ended,
}

/// Which backend variant is driving playback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Native,
    Plugin,
}

impl BackendKind {
    /// Cadence at which the buffering monitor samples this backend
    pub fn sample_cadence(&self) -> Duration {
        match self {
            BackendKind::Native => Duration::from_secs(1),
            BackendKind::Plugin => Duration::from_millis(500),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Native => write!(f, "native"),
            BackendKind::Plugin => write!(f, "plugin"),
        }
    }
}

/// Uniform playback capability contract.
///
/// `play`/`pause` fail silently when no source is loaded; callers check
/// readiness through the state machine. After [`BackendAdapter::set_source`]
/// the backend must not be resumed or queried for duration until it raises
/// [`BackendEvent::MetadataLoaded`].
pub trait BackendAdapter: Send + Sync {
    fn play(&self);
    fn pause(&self);
    fn is_paused(&self) -> bool;

    /// Current playback position in seconds
    fn current_time(&self) -> f64;
    fn seek(&self, seconds: f64);

    /// Source duration in seconds, `None` until metadata is available.
    /// The plugin variant may report `None` for longer than the native one.
    fn duration(&self) -> Option<f64>;

    fn volume(&self) -> f64;
    fn set_volume(&self, level: f64);
    fn set_muted(&self, muted: bool);
    fn is_muted(&self) -> bool;

    /// Buffered portion of the source in `[0, 1]`
    fn buffered_fraction(&self) -> f64;

    /// Begin an asynchronous reload with the given source
    fn set_source(&self, source: &MediaSource) -> Result<()>;

    /// Subscribe to backend events
    fn subscribe(&self) -> mpsc::UnboundedReceiver<BackendEvent>;

    fn kind(&self) -> BackendKind;
}

/// What the runtime environment can offer, as reported by the embedder
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentCapabilities {
    /// A native streaming element can be created
    pub streaming_element: bool,
    /// The plugin runtime is installed
    pub plugin: bool,
}

/// Pick the backend variant for this session. Called once at startup.
pub fn probe(caps: &EnvironmentCapabilities) -> Result<BackendKind> {
    if caps.streaming_element {
        Ok(BackendKind::Native)
    } else if caps.plugin {
        Ok(BackendKind::Plugin)
    } else {
        Err(Error::UnsupportedBackend)
    }
}

/// Fan-out of backend events to any number of subscribers.
/// Senders whose receiver is gone are dropped on the next emit.
#[derive(Default)]
pub(crate) struct EventFan {
    senders: Mutex<Vec<mpsc::UnboundedSender<BackendEvent>>>,
}

impl EventFan {
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<BackendEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.lock().push(tx);
        rx
    }

    pub fn emit(&self, event: BackendEvent) {
        self.senders.lock().retain(|tx| tx.send(event).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_prefers_native() {
        let caps = EnvironmentCapabilities {
            streaming_element: true,
            plugin: true,
        };
        assert_eq!(probe(&caps).unwrap(), BackendKind::Native);
    }

    #[test]
    fn test_probe_falls_back_to_plugin() {
        let caps = EnvironmentCapabilities {
            streaming_element: false,
            plugin: true,
        };
        assert_eq!(probe(&caps).unwrap(), BackendKind::Plugin);
    }

    #[test]
    fn test_probe_rejects_bare_environment() {
        let caps = EnvironmentCapabilities::default();
        assert!(matches!(
            probe(&caps),
            Err(Error::UnsupportedBackend)
        ));
    }

    #[test]
    fn test_event_fan_drops_closed_subscribers() {
        let fan = EventFan::default();
        let rx = fan.subscribe();
        drop(rx);

        let mut live = fan.subscribe();
        fan.emit(BackendEvent::Playing);

        assert_eq!(live.try_recv().unwrap(), BackendEvent::Playing);
        assert_eq!(fan.senders.lock().len(), 1);
    }
}
