//! Native backend - thin translation over an event-capable streaming element

use super::{BackendAdapter, BackendEvent, BackendKind, EventFan};
use crate::error::{Error, Result};
use crate::types::{FormatTag, MediaSource};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// The raw surface of a native streaming element, supplied by the embedder.
///
/// The element pushes its own callbacks; the embedder forwards them through
/// [`NativeBackend::handle_element_event`].
pub trait StreamingElement: Send + Sync {
    fn play(&self);
    fn pause(&self);
    fn is_paused(&self) -> bool;

    fn current_time(&self) -> f64;
    fn set_current_time(&self, seconds: f64);

    /// `None` until metadata has loaded
    fn duration(&self) -> Option<f64>;

    fn volume(&self) -> f64;
    fn set_volume(&self, level: f64);
    fn set_muted(&self, muted: bool);
    fn is_muted(&self) -> bool;

    /// End of the buffered range divided by duration, in `[0, 1]`
    fn buffered_fraction(&self) -> f64;

    /// Replace the element's media URL and begin loading
    fn load(&self, url: &str);

    /// Whether the element can decode the given format
    fn can_play(&self, format: FormatTag) -> bool;
}

/// Raw callbacks a streaming element fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementEvent {
    LoadedMetadata,
    Playing,
    Pause,
    Seeked,
    TimeUpdate,
    Ended,
}

/// Native-backend variant of [`BackendAdapter`]
pub struct NativeBackend<E: StreamingElement> {
    element: E,
    events: EventFan,
}

impl<E: StreamingElement> NativeBackend<E> {
    pub fn new(element: E) -> Self {
        Self {
            element,
            events: EventFan::default(),
        }
    }

    /// Forward a raw element callback. Called by the embedder's event glue.
    pub fn handle_element_event(&self, event: ElementEvent) {
        let mapped = match event {
            ElementEvent::LoadedMetadata => BackendEvent::MetadataLoaded {
                duration: self.element.duration().unwrap_or(0.0),
            },
            ElementEvent::Playing => BackendEvent::Playing,
            ElementEvent::Pause => BackendEvent::Paused,
            ElementEvent::Seeked => BackendEvent::Seeked,
            ElementEvent::TimeUpdate => BackendEvent::TimeUpdate(self.element.current_time()),
            ElementEvent::Ended => BackendEvent::Ended,
        };
        self.events.emit(mapped);
    }

    pub fn element(&self) -> &E {
        &self.element
    }
}

impl<E: StreamingElement> BackendAdapter for NativeBackend<E> {
    fn play(&self) {
        self.element.play();
    }

    fn pause(&self) {
        self.element.pause();
    }

    fn is_paused(&self) -> bool {
        self.element.is_paused()
    }

    fn current_time(&self) -> f64 {
        self.element.current_time()
    }

    fn seek(&self, seconds: f64) {
        self.element.set_current_time(seconds.max(0.0));
    }

    fn duration(&self) -> Option<f64> {
        self.element.duration()
    }

    fn volume(&self) -> f64 {
        self.element.volume()
    }

    fn set_volume(&self, level: f64) {
        self.element.set_volume(level.clamp(0.0, 1.0));
    }

    fn set_muted(&self, muted: bool) {
        self.element.set_muted(muted);
    }

    fn is_muted(&self) -> bool {
        self.element.is_muted()
    }

    fn buffered_fraction(&self) -> f64 {
        self.element.buffered_fraction().clamp(0.0, 1.0)
    }

    fn set_source(&self, source: &MediaSource) -> Result<()> {
        let (tag, url) = FormatTag::PREFERENCE
            .iter()
            .filter(|tag| self.element.can_play(**tag))
            .find_map(|tag| source.format(*tag).map(|url| (*tag, url)))
            .ok_or_else(|| {
                warn!(label = %source.label, "no playable format for source");
                Error::SourceLoad(format!("no playable format for \"{}\"", source.label))
            })?;

        debug!(label = %source.label, format = %tag, url, "loading source");
        self.element.load(url);
        Ok(())
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<BackendEvent> {
        self.events.subscribe()
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Native
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct FakeElement {
        paused: Mutex<bool>,
        time: Mutex<f64>,
        duration: Mutex<Option<f64>>,
        loads: Mutex<Vec<String>>,
        webm_only: bool,
    }

    impl StreamingElement for FakeElement {
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
        fn set_current_time(&self, seconds: f64) {
            *self.time.lock() = seconds;
        }
        fn duration(&self) -> Option<f64> {
            *self.duration.lock()
        }
        fn volume(&self) -> f64 {
            1.0
        }
        fn set_volume(&self, _level: f64) {}
        fn set_muted(&self, _muted: bool) {}
        fn is_muted(&self) -> bool {
            false
        }
        fn buffered_fraction(&self) -> f64 {
            0.0
        }
        fn load(&self, url: &str) {
            self.loads.lock().push(url.to_string());
        }
        fn can_play(&self, format: FormatTag) -> bool {
            if self.webm_only {
                format == FormatTag::WebM
            } else {
                true
            }
        }
    }

    fn multi_format_source() -> MediaSource {
        MediaSource::new("Standard")
            .with_format(FormatTag::Mp4, "video.mp4")
            .with_format(FormatTag::WebM, "video.webm")
            .with_format(FormatTag::Ogg, "video.ogv")
    }

    #[test]
    fn test_set_source_prefers_mp4() {
        let backend = NativeBackend::new(FakeElement::default());
        backend.set_source(&multi_format_source()).unwrap();
        assert_eq!(backend.element().loads.lock().as_slice(), ["video.mp4"]);
    }

    #[test]
    fn test_set_source_respects_element_capability() {
        let backend = NativeBackend::new(FakeElement {
            webm_only: true,
            ..FakeElement::default()
        });
        backend.set_source(&multi_format_source()).unwrap();
        assert_eq!(backend.element().loads.lock().as_slice(), ["video.webm"]);
    }

    #[test]
    fn test_set_source_with_no_playable_format() {
        let backend = NativeBackend::new(FakeElement {
            webm_only: true,
            ..FakeElement::default()
        });
        let source = MediaSource::new("Mp4 only").with_format(FormatTag::Mp4, "video.mp4");
        assert!(matches!(
            backend.set_source(&source),
            Err(Error::SourceLoad(_))
        ));
    }

    #[test]
    fn test_element_events_are_translated() {
        let backend = NativeBackend::new(FakeElement::default());
        *backend.element().duration.lock() = Some(120.0);
        *backend.element().time.lock() = 7.0;

        let mut rx = backend.subscribe();
        backend.handle_element_event(ElementEvent::LoadedMetadata);
        backend.handle_element_event(ElementEvent::TimeUpdate);
        backend.handle_element_event(ElementEvent::Ended);

        assert_eq!(
            rx.try_recv().unwrap(),
            BackendEvent::MetadataLoaded { duration: 120.0 }
        );
        assert_eq!(rx.try_recv().unwrap(), BackendEvent::TimeUpdate(7.0));
        assert_eq!(rx.try_recv().unwrap(), BackendEvent::Ended);
    }

    #[test]
    fn test_seek_clamps_negative_positions() {
        let backend = NativeBackend::new(FakeElement::default());
        backend.seek(-3.0);
        assert_eq!(backend.current_time(), 0.0);
    }
}
