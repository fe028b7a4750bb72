//! Plugin backend - poll-derived events over a property-only plugin handle
//!
//! The plugin runtime cannot push fine-grained notifications, so this
//! variant samples the handle on a fixed 200ms interval and synthesizes
//! the event stream the orchestrator expects:
//! - `MetadataLoaded` when the reported duration first becomes known
//! - `Playing`/`Paused` on paused-flag edges
//! - `TimeUpdate` whenever the observed position moves
//! - `Seeked` from position discontinuities, debounced by one further poll
//!   interval (≈200ms) so a dragged seek fires once instead of per jump
//! - `Ended` when the position reaches the duration

use super::{BackendAdapter, BackendEvent, BackendKind, EventFan};
use crate::error::{Error, Result};
use crate::types::{FormatTag, MediaSource};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Poll cadence for deriving events from the plugin
pub const POLL_CADENCE: Duration = Duration::from_millis(200);

/// Observed position jump treated as a seek rather than ordinary playback
const SEEK_JUMP_SECS: f64 = 1.0;

/// Quiet poll intervals before a detected seek is reported
const SEEK_DEBOUNCE_TICKS: u32 = 1;

/// The raw surface of the plugin runtime, supplied by the embedder.
/// Everything is a synchronous property query; there are no callbacks.
pub trait PluginHandle: Send + Sync {
    fn play(&self);
    fn pause(&self);
    fn is_paused(&self) -> bool;

    fn current_time(&self) -> f64;
    fn seek_to(&self, seconds: f64);

    /// Reported duration; `<= 0` until the plugin has parsed metadata
    fn duration(&self) -> f64;

    fn volume(&self) -> f64;
    fn set_volume(&self, level: f64);

    /// Buffered portion of the source in `[0, 1]`
    fn buffer_level(&self) -> f64;

    /// Replace the loaded media URL
    fn change_media(&self, url: &str);
}

/// Plugin-backend variant of [`BackendAdapter`].
///
/// Must be constructed inside a tokio runtime; the poll task starts
/// immediately and is re-armed on every source change.
pub struct PluginBackend<P: PluginHandle + 'static> {
    handle: Arc<P>,
    events: Arc<EventFan>,
    fallback_relative_path: String,
    muted: AtomicBool,
    /// Volume remembered across a mute, since the plugin has no muted flag
    pre_mute_level: Mutex<f64>,
    poll: Mutex<Option<JoinHandle<()>>>,
}

impl<P: PluginHandle + 'static> PluginBackend<P> {
    pub fn new(handle: P, fallback_relative_path: impl Into<String>) -> Self {
        let backend = Self {
            handle: Arc::new(handle),
            events: Arc::new(EventFan::default()),
            fallback_relative_path: fallback_relative_path.into(),
            muted: AtomicBool::new(false),
            pre_mute_level: Mutex::new(1.0),
            poll: Mutex::new(None),
        };
        backend.arm_poll();
        backend
    }

    pub fn handle(&self) -> &P {
        &self.handle
    }

    /// (Re)start the poll task with fresh derivation state
    fn arm_poll(&self) {
        let mut slot = self.poll.lock();
        if let Some(task) = slot.take() {
            task.abort();
        }
        *slot = Some(spawn_poll(Arc::clone(&self.handle), Arc::clone(&self.events)));
    }
}

fn spawn_poll<P: PluginHandle + 'static>(
    handle: Arc<P>,
    events: Arc<EventFan>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(POLL_CADENCE);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        let mut metadata_seen = false;
        let mut was_paused = true;
        let mut last_time: Option<f64> = None;
        let mut seek_countdown: Option<u32> = None;
        let mut ended_emitted = false;

        loop {
            ticker.tick().await;

            let duration = handle.duration();
            if !metadata_seen && duration > 0.0 {
                metadata_seen = true;
                events.emit(BackendEvent::MetadataLoaded { duration });
            }

            let paused = handle.is_paused();
            if paused != was_paused {
                was_paused = paused;
                events.emit(if paused {
                    BackendEvent::Paused
                } else {
                    BackendEvent::Playing
                });
            }

            if !metadata_seen {
                continue;
            }

            let time = handle.current_time();

            if let Some(prev) = last_time {
                if (time - prev).abs() > SEEK_JUMP_SECS {
                    // restart the debounce window on every further jump
                    seek_countdown = Some(SEEK_DEBOUNCE_TICKS);
                } else if let Some(ticks) = seek_countdown {
                    if ticks == 0 {
                        seek_countdown = None;
                        events.emit(BackendEvent::Seeked);
                    } else {
                        seek_countdown = Some(ticks - 1);
                    }
                }
                if time != prev {
                    events.emit(BackendEvent::TimeUpdate(time));
                }
            }
            last_time = Some(time);

            if time + 0.5 < duration {
                ended_emitted = false;
            } else if time >= duration - 0.05 && !ended_emitted {
                ended_emitted = true;
                events.emit(BackendEvent::Ended);
            }
        }
    })
}

impl<P: PluginHandle + 'static> BackendAdapter for PluginBackend<P> {
    fn play(&self) {
        self.handle.play();
    }

    fn pause(&self) {
        self.handle.pause();
    }

    fn is_paused(&self) -> bool {
        self.handle.is_paused()
    }

    fn current_time(&self) -> f64 {
        self.handle.current_time()
    }

    fn seek(&self, seconds: f64) {
        self.handle.seek_to(seconds.max(0.0));
    }

    fn duration(&self) -> Option<f64> {
        let duration = self.handle.duration();
        (duration > 0.0).then_some(duration)
    }

    fn volume(&self) -> f64 {
        if self.muted.load(Ordering::Acquire) {
            *self.pre_mute_level.lock()
        } else {
            self.handle.volume()
        }
    }

    fn set_volume(&self, level: f64) {
        let level = level.clamp(0.0, 1.0);
        self.muted.store(false, Ordering::Release);
        self.handle.set_volume(level);
    }

    fn set_muted(&self, muted: bool) {
        if muted == self.muted.load(Ordering::Acquire) {
            return;
        }
        if muted {
            *self.pre_mute_level.lock() = self.handle.volume();
            self.handle.set_volume(0.0);
        } else {
            self.handle.set_volume(*self.pre_mute_level.lock());
        }
        self.muted.store(muted, Ordering::Release);
    }

    fn is_muted(&self) -> bool {
        self.muted.load(Ordering::Acquire)
    }

    fn buffered_fraction(&self) -> f64 {
        self.handle.buffer_level().clamp(0.0, 1.0)
    }

    fn set_source(&self, source: &MediaSource) -> Result<()> {
        // the plugin decodes mp4 only, addressed relative to its own swf
        let url = source.format(FormatTag::Mp4).ok_or_else(|| {
            Error::SourceLoad(format!("source \"{}\" has no mp4 variant", source.label))
        })?;

        let prefixed = format!("{}{}", self.fallback_relative_path, url);
        debug!(label = %source.label, url = %prefixed, "loading source via plugin");
        self.handle.change_media(&prefixed);
        self.arm_poll();
        Ok(())
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<BackendEvent> {
        self.events.subscribe()
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Plugin
    }
}

impl<P: PluginHandle + 'static> Drop for PluginBackend<P> {
    fn drop(&mut self) {
        if let Some(task) = self.poll.lock().take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakePlugin {
        paused: Mutex<bool>,
        time: Mutex<f64>,
        duration: Mutex<f64>,
        volume: Mutex<f64>,
        media: Mutex<Vec<String>>,
    }

    impl FakePlugin {
        fn fresh() -> Self {
            Self {
                paused: Mutex::new(true),
                volume: Mutex::new(1.0),
                ..Self::default()
            }
        }
    }

    impl PluginHandle for FakePlugin {
        fn play(&self) {
            *self.paused.lock() = false;
        }
        fn pause(&self) {
            *self.paused.lock() = true;
        }
        fn is_paused(&self) -> bool {
            *self.paused.lock()
        }
        fn current_time(&self) -> f64 {
            *self.time.lock()
        }
        fn seek_to(&self, seconds: f64) {
            *self.time.lock() = seconds;
        }
        fn duration(&self) -> f64 {
            *self.duration.lock()
        }
        fn volume(&self) -> f64 {
            *self.volume.lock()
        }
        fn set_volume(&self, level: f64) {
            *self.volume.lock() = level;
        }
        fn buffer_level(&self) -> f64 {
            0.0
        }
        fn change_media(&self, url: &str) {
            self.media.lock().push(url.to_string());
        }
    }

    async fn run_polls(n: u32) {
        for _ in 0..n {
            tokio::time::advance(POLL_CADENCE).await;
            tokio::task::yield_now().await;
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<BackendEvent>) -> Vec<BackendEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn test_metadata_emitted_once_duration_is_known() {
        let backend = PluginBackend::new(FakePlugin::fresh(), "../");
        let mut rx = backend.subscribe();

        run_polls(3).await;
        assert!(drain(&mut rx).is_empty());

        *backend.handle().duration.lock() = 42.0;
        run_polls(2).await;

        let events = drain(&mut rx);
        assert_eq!(events, [BackendEvent::MetadataLoaded { duration: 42.0 }]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_paused_edges_become_events() {
        let backend = PluginBackend::new(FakePlugin::fresh(), "../");
        let mut rx = backend.subscribe();

        *backend.handle().duration.lock() = 42.0;
        run_polls(1).await;
        drain(&mut rx);

        backend.handle().play();
        run_polls(1).await;
        assert_eq!(drain(&mut rx), [BackendEvent::Playing]);

        backend.handle().pause();
        run_polls(1).await;
        assert_eq!(drain(&mut rx), [BackendEvent::Paused]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_seek_jumps_are_debounced_to_one_event() {
        let backend = PluginBackend::new(FakePlugin::fresh(), "../");
        let mut rx = backend.subscribe();

        *backend.handle().duration.lock() = 300.0;
        run_polls(2).await;
        drain(&mut rx);

        // two rapid jumps, as a drag would produce
        *backend.handle().time.lock() = 30.0;
        run_polls(1).await;
        *backend.handle().time.lock() = 60.0;
        run_polls(1).await;

        // quiet period lets the debounce expire
        run_polls(3).await;

        let seeks = drain(&mut rx)
            .into_iter()
            .filter(|event| *event == BackendEvent::Seeked)
            .count();
        assert_eq!(seeks, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ended_fires_once_at_duration() {
        let backend = PluginBackend::new(FakePlugin::fresh(), "../");
        let mut rx = backend.subscribe();

        *backend.handle().duration.lock() = 10.0;
        run_polls(1).await;
        drain(&mut rx);

        *backend.handle().time.lock() = 10.0;
        run_polls(3).await;

        let ends = drain(&mut rx)
            .into_iter()
            .filter(|event| *event == BackendEvent::Ended)
            .count();
        assert_eq!(ends, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mute_remembers_level() {
        let backend = PluginBackend::new(FakePlugin::fresh(), "../");
        backend.set_volume(0.6);

        backend.set_muted(true);
        assert!(backend.is_muted());
        assert_eq!(*backend.handle().volume.lock(), 0.0);
        assert_eq!(backend.volume(), 0.6);

        backend.set_muted(false);
        assert!(!backend.is_muted());
        assert_eq!(*backend.handle().volume.lock(), 0.6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_source_prefixes_fallback_path() {
        let backend = PluginBackend::new(FakePlugin::fresh(), "../");
        let source = MediaSource::new("Standard").with_format(FormatTag::Mp4, "media/video.mp4");

        backend.set_source(&source).unwrap();
        assert_eq!(
            backend.handle().media.lock().as_slice(),
            ["../media/video.mp4"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_source_requires_mp4() {
        let backend = PluginBackend::new(FakePlugin::fresh(), "../");
        let source = MediaSource::new("WebM only").with_format(FormatTag::WebM, "video.webm");

        assert!(matches!(
            backend.set_source(&source),
            Err(Error::SourceLoad(_))
        ));
    }
}
