//! Core types for Playdeck

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

/// Unique identifier for a playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Media container/codec tag for a source variant.
///
/// Which tag a backend actually plays is the backend's decision; the catalog
/// just carries every encoding the embedder provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FormatTag {
    Mp4,
    WebM,
    Ogg,
}

impl FormatTag {
    /// Probe order used when a backend can play more than one format
    pub const PREFERENCE: [FormatTag; 3] = [FormatTag::Mp4, FormatTag::WebM, FormatTag::Ogg];

    pub fn extension(&self) -> &'static str {
        match self {
            FormatTag::Mp4 => "mp4",
            FormatTag::WebM => "webm",
            FormatTag::Ogg => "ogv",
        }
    }
}

impl std::fmt::Display for FormatTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// A named media asset: one or more format URLs plus optional poster and
/// subtitle attachments. Immutable once constructed.
///
/// Format URLs are kept as strings because they may be relative to the
/// embedding page; poster and subtitle URLs must be absolute (the core
/// fetches subtitles itself).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSource {
    /// Human-readable label shown in the source menu
    pub label: String,
    /// Poster image shown before first playback
    pub poster: Option<Url>,
    /// Subtitle file for this source
    pub subtitle: Option<Url>,
    /// Format tag -> media URL
    pub formats: BTreeMap<FormatTag, String>,
}

impl MediaSource {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            poster: None,
            subtitle: None,
            formats: BTreeMap::new(),
        }
    }

    pub fn with_format(mut self, tag: FormatTag, url: impl Into<String>) -> Self {
        self.formats.insert(tag, url.into());
        self
    }

    pub fn with_poster(mut self, poster: Url) -> Self {
        self.poster = Some(poster);
        self
    }

    pub fn with_subtitle(mut self, subtitle: Url) -> Self {
        self.subtitle = Some(subtitle);
        self
    }

    /// URL for a specific format, if provided
    pub fn format(&self, tag: FormatTag) -> Option<&str> {
        self.formats.get(&tag).map(String::as_str)
    }
}

/// The full set of sources available to one player, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceCatalog {
    entries: Vec<(String, MediaSource)>,
    default_name: Option<String>,
}

impl SourceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a named source
    pub fn insert(&mut self, name: impl Into<String>, source: MediaSource) {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = source;
        } else {
            self.entries.push((name, source));
        }
    }

    pub fn with_source(mut self, name: impl Into<String>, source: MediaSource) -> Self {
        self.insert(name, source);
        self
    }

    pub fn with_default(mut self, name: impl Into<String>) -> Self {
        self.default_name = Some(name.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&MediaSource> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }

    /// The configured default source, falling back to the first declared one
    /// when the configured name is absent.
    pub fn default_entry(&self) -> Option<(&str, &MediaSource)> {
        self.default_name
            .as_deref()
            .and_then(|name| self.get(name).map(|s| (name, s)))
            .or_else(|| self.entries.first().map(|(n, s)| (n.as_str(), s)))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Player state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerState {
    /// Initial state, no content loaded
    Idle,
    /// Waiting for source metadata
    Loading,
    /// Metadata available, not yet played
    Ready,
    /// Content is playing
    Playing,
    /// Playback paused
    Paused,
    /// A seek gesture is in flight
    Seeking,
    /// Playback reached the end of the source
    Ended,
    /// Backend error; recoverable only by switching source
    Error,
}

impl PlayerState {
    /// Check if transition to target state is valid
    pub fn can_transition_to(&self, target: PlayerState) -> bool {
        use PlayerState::*;
        matches!(
            (self, target),
            // From Idle
            (Idle, Loading) |
            // From Loading: a source switch resumes playback directly
            (Loading, Ready) | (Loading, Playing) | (Loading, Error) |
            // From Ready
            (Ready, Playing) | (Ready, Loading) | (Ready, Error) |
            // From Playing
            (Playing, Paused) | (Playing, Seeking) | (Playing, Ended) | (Playing, Loading) | (Playing, Error) |
            // From Paused
            (Paused, Playing) | (Paused, Seeking) | (Paused, Loading) | (Paused, Error) |
            // From Seeking
            (Seeking, Playing) | (Seeking, Paused) | (Seeking, Loading) | (Seeking, Error) |
            // From Ended
            (Ended, Playing) | (Ended, Seeking) | (Ended, Loading) | (Ended, Error) |
            // From Error
            (Error, Loading)
        )
    }
}

impl std::fmt::Display for PlayerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerState::Idle => write!(f, "idle"),
            PlayerState::Loading => write!(f, "loading"),
            PlayerState::Ready => write!(f, "ready"),
            PlayerState::Playing => write!(f, "playing"),
            PlayerState::Paused => write!(f, "paused"),
            PlayerState::Seeking => write!(f, "seeking"),
            PlayerState::Ended => write!(f, "ended"),
            PlayerState::Error => write!(f, "error"),
        }
    }
}

/// One buffering sample. Recomputed on every tick, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BufferInfo {
    /// Buffered portion of the source, in `[0, 1]`
    pub fraction: f64,
    /// True once the whole source is buffered
    pub is_complete: bool,
}

/// A timed subtitle entry. Offsets are whole seconds; sub-second precision
/// is deliberately truncated at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleCue {
    pub start_secs: u32,
    pub end_secs: u32,
    pub text: String,
}

impl SubtitleCue {
    pub fn new(start_secs: u32, end_secs: u32, text: impl Into<String>) -> Self {
        Self {
            start_secs,
            end_secs,
            text: text.into(),
        }
    }

    /// Check if the cue should be displayed at given time
    pub fn is_active_at(&self, time: f64) -> bool {
        time >= self.start_secs as f64 && time < self.end_secs as f64
    }
}

/// Current volume as shown to the View
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeState {
    /// Volume level in `[0, 1]`
    pub level: f64,
    pub muted: bool,
}

impl Default for VolumeState {
    fn default() -> Self {
        Self {
            level: 1.0,
            muted: false,
        }
    }
}

/// Identifiers for the controls the View lays out, in display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlKind {
    Play,
    Progress,
    Time,
    Volume,
    Fullscreen,
    SourceMenu,
    /// Custom button keyed into [`PlayerOptions::custom_controls`]
    Custom(String),
}

/// A custom button definition supplied by the embedder. The core never
/// renders these; the View does, and binds clicks itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomControl {
    pub label: String,
    pub class_name: Option<String>,
    pub url: Option<Url>,
    pub target: Option<String>,
}

/// Lifecycle notification callback
pub type Hook = Box<dyn Fn() + Send + Sync>;

/// Optional embedder callbacks fired at playback lifecycle points
#[derive(Default)]
pub struct LifecycleHooks {
    pub on_start: Option<Hook>,
    pub on_play: Option<Hook>,
    pub on_pause: Option<Hook>,
    pub on_seek: Option<Hook>,
    pub on_end: Option<Hook>,
    pub on_source_change: Option<Hook>,
}

impl std::fmt::Debug for LifecycleHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let set = |hook: &Option<Hook>| if hook.is_some() { "set" } else { "unset" };
        f.debug_struct("LifecycleHooks")
            .field("on_start", &set(&self.on_start))
            .field("on_play", &set(&self.on_play))
            .field("on_pause", &set(&self.on_pause))
            .field("on_seek", &set(&self.on_seek))
            .field("on_end", &set(&self.on_end))
            .field("on_source_change", &set(&self.on_source_change))
            .finish()
    }
}

/// Validated player options. Read-only after construction.
#[derive(Debug)]
pub struct PlayerOptions {
    /// Controls the View lays out, in order
    pub controls: Vec<ControlKind>,
    /// Name of the source to load first
    pub default_source: String,
    /// Custom button definitions, keyed by control identifier
    pub custom_controls: std::collections::HashMap<String, CustomControl>,
    /// Path prefix the plugin backend puts in front of media URLs
    pub fallback_relative_path: String,
    /// Separator rendered between elapsed and total time
    pub time_separator: String,
    /// How long a source may take to deliver metadata before the load is
    /// reported as failed
    pub load_timeout: Duration,
    /// Lifecycle notification callbacks
    pub hooks: LifecycleHooks,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            controls: vec![
                ControlKind::Play,
                ControlKind::Progress,
                ControlKind::Time,
                ControlKind::Volume,
                ControlKind::Fullscreen,
                ControlKind::SourceMenu,
            ],
            default_source: "standard".to_string(),
            custom_controls: std::collections::HashMap::new(),
            fallback_relative_path: "../".to_string(),
            time_separator: "/".to_string(),
            load_timeout: Duration::from_secs(10),
            hooks: LifecycleHooks::default(),
        }
    }
}

/// Format seconds as `minutes:seconds`.
///
/// Minutes do not roll over into hours: 3600 seconds formats as "60:00".
/// This matches the display contract of the control bar's time widget.
pub fn format_time(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 { secs } else { 0.0 };
    let mut minutes = (total / 60.0).floor() as u64;
    let mut seconds = (total - minutes as f64 * 60.0).round() as u64;

    if seconds == 60 {
        seconds = 0;
        minutes += 1;
    }

    format!("{}:{:02}", minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(9.0), "0:09");
        assert_eq!(format_time(125.0), "2:05");
        assert_eq!(format_time(3600.0), "60:00");
        assert_eq!(format_time(59.7), "1:00");
    }

    #[test]
    fn test_format_time_degenerate_input() {
        assert_eq!(format_time(-3.0), "0:00");
        assert_eq!(format_time(f64::NAN), "0:00");
    }

    #[test]
    fn test_state_transitions() {
        // Valid transitions
        assert!(PlayerState::Idle.can_transition_to(PlayerState::Loading));
        assert!(PlayerState::Loading.can_transition_to(PlayerState::Ready));
        assert!(PlayerState::Ready.can_transition_to(PlayerState::Playing));
        assert!(PlayerState::Playing.can_transition_to(PlayerState::Paused));
        assert!(PlayerState::Ended.can_transition_to(PlayerState::Playing));
        assert!(PlayerState::Error.can_transition_to(PlayerState::Loading));

        // Invalid transitions
        assert!(!PlayerState::Idle.can_transition_to(PlayerState::Playing));
        assert!(!PlayerState::Error.can_transition_to(PlayerState::Playing));
        assert!(!PlayerState::Paused.can_transition_to(PlayerState::Ended));
    }

    #[test]
    fn test_catalog_default_falls_back_to_first() {
        let catalog = SourceCatalog::new()
            .with_source("hd", MediaSource::new("HD"))
            .with_source("sd", MediaSource::new("SD"))
            .with_default("missing");

        let (name, source) = catalog.default_entry().unwrap();
        assert_eq!(name, "hd");
        assert_eq!(source.label, "HD");
    }

    #[test]
    fn test_catalog_configured_default() {
        let catalog = SourceCatalog::new()
            .with_source("hd", MediaSource::new("HD"))
            .with_source("sd", MediaSource::new("SD"))
            .with_default("sd");

        assert_eq!(catalog.default_entry().unwrap().0, "sd");
    }

    #[test]
    fn test_catalog_insert_replaces() {
        let mut catalog = SourceCatalog::new();
        catalog.insert("main", MediaSource::new("v1"));
        catalog.insert("main", MediaSource::new("v2"));

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("main").unwrap().label, "v2");
    }

    #[test]
    fn test_cue_active_window_is_half_open() {
        let cue = SubtitleCue::new(2, 5, "hi");
        assert!(!cue.is_active_at(1.9));
        assert!(cue.is_active_at(2.0));
        assert!(cue.is_active_at(4.9));
        assert!(!cue.is_active_at(5.0));
    }
}
