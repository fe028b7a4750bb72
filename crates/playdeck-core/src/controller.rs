//! Playback controller - main orchestrator for the control surface
//!
//! Coordinates:
//! - The backend adapter (native or plugin, chosen at startup)
//! - State machine transitions and their View side effects
//! - The subtitle cue scheduler and fetch
//! - The buffering monitor lifecycle
//! - The source-switch protocol
//!
//! All mutations run on the event pump or in the public async methods; the
//! backend adapter is never touched by any other component. The View talks
//! in through the public methods and listens on the [`ViewCommand`] channel.

use crate::{
    backend::{BackendAdapter, BackendEvent},
    cues::{parse_cue_sheet, CueScheduler},
    error::{Error, Result},
    fetch::SubtitleFetcher,
    interaction::{Axis, InteractionController, SessionSpec, TrackBounds},
    monitor::BufferingMonitor,
    types::*,
    view::ViewCommand,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, RwLock};
use tracing::{debug, info, instrument, warn};

/// The user's play/pause wish recorded while metadata is still loading.
/// At most one is kept; a later wish overwrites the pending one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intent {
    Play,
    Pause,
}

/// Why the backend is currently loading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadKind {
    /// First load after construction; settles into `Ready`
    Initial,
    /// Source switch; resumes playback on its own
    Switch,
}

/// Internal events funneled into the pump alongside backend events
enum CoreEvent {
    Buffer(BufferInfo),
    Subtitles {
        name: String,
        result: Result<Vec<SubtitleCue>>,
    },
    VolumeTo(f64),
    SeekReleased,
    LoadTimeout {
        name: String,
    },
}

/// Orchestrator owning one backend, one cue scheduler, and one (optional)
/// buffering monitor. Constructed once per player instance.
pub struct PlaybackController {
    /// Unique session ID for log correlation
    id: SessionId,
    options: PlayerOptions,
    catalog: SourceCatalog,
    adapter: Arc<dyn BackendAdapter>,
    fetcher: Arc<dyn SubtitleFetcher>,

    /// Current player state
    state: RwLock<PlayerState>,
    /// State change broadcaster
    state_tx: watch::Sender<PlayerState>,

    /// Name of the active catalog entry
    current_source: RwLock<String>,
    /// Duration of the active source, once metadata arrived
    duration: RwLock<Option<f64>>,
    /// Last observed playback position
    position: RwLock<f64>,
    volume: RwLock<VolumeState>,
    cues: RwLock<CueScheduler>,
    last_subtitle: RwLock<String>,

    /// Drag session owner for the seek and volume tracks
    interactions: Mutex<InteractionController>,
    /// State to restore once a seek settles
    pre_seek: Mutex<Option<PlayerState>>,
    deferred: Mutex<Option<Intent>>,
    pending_load: Mutex<Option<LoadKind>>,

    monitor: Mutex<Option<BufferingMonitor>>,
    buffer_complete: AtomicBool,
    /// Set while the source-switch protocol runs; the protocol's own pause
    /// echo is ignored
    switching: AtomicBool,
    fullscreen: AtomicBool,
    poster_visible: AtomicBool,

    load_watchdog: Mutex<Option<tokio::task::JoinHandle<()>>>,
    pump: Mutex<Option<tokio::task::JoinHandle<()>>>,

    internal_tx: mpsc::UnboundedSender<CoreEvent>,
    internal_rx: Mutex<Option<mpsc::UnboundedReceiver<CoreEvent>>>,
    view_tx: mpsc::UnboundedSender<ViewCommand>,
    view_rx: Mutex<Option<mpsc::UnboundedReceiver<ViewCommand>>>,
}

impl PlaybackController {
    pub fn new(
        adapter: Arc<dyn BackendAdapter>,
        catalog: SourceCatalog,
        options: PlayerOptions,
        fetcher: Arc<dyn SubtitleFetcher>,
    ) -> Arc<Self> {
        let (state_tx, _) = watch::channel(PlayerState::Idle);
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = mpsc::unbounded_channel();

        let selection_tx = view_tx.clone();
        let interactions = InteractionController::new(Box::new(move |suppressed| {
            let _ = selection_tx.send(ViewCommand::SelectionSuppressed(suppressed));
        }));

        Arc::new(Self {
            id: SessionId::new(),
            options,
            catalog,
            adapter,
            fetcher,
            state: RwLock::new(PlayerState::Idle),
            state_tx,
            current_source: RwLock::new(String::new()),
            duration: RwLock::new(None),
            position: RwLock::new(0.0),
            volume: RwLock::new(VolumeState::default()),
            cues: RwLock::new(CueScheduler::inert()),
            last_subtitle: RwLock::new(String::new()),
            interactions: Mutex::new(interactions),
            pre_seek: Mutex::new(None),
            deferred: Mutex::new(None),
            pending_load: Mutex::new(None),
            monitor: Mutex::new(None),
            buffer_complete: AtomicBool::new(false),
            switching: AtomicBool::new(false),
            fullscreen: AtomicBool::new(false),
            poster_visible: AtomicBool::new(false),
            load_watchdog: Mutex::new(None),
            pump: Mutex::new(None),
            internal_tx,
            internal_rx: Mutex::new(Some(internal_rx)),
            view_tx,
            view_rx: Mutex::new(Some(view_rx)),
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn options(&self) -> &PlayerOptions {
        &self.options
    }

    pub fn catalog(&self) -> &SourceCatalog {
        &self.catalog
    }

    /// Get current state
    pub async fn state(&self) -> PlayerState {
        *self.state.read().await
    }

    /// Subscribe to state changes
    pub fn subscribe_state(&self) -> watch::Receiver<PlayerState> {
        self.state_tx.subscribe()
    }

    /// The View's end of the command channel. Yields once.
    pub fn take_view_commands(&self) -> Option<mpsc::UnboundedReceiver<ViewCommand>> {
        self.view_rx.lock().take()
    }

    pub async fn position(&self) -> f64 {
        *self.position.read().await
    }

    pub async fn duration(&self) -> Option<f64> {
        *self.duration.read().await
    }

    pub async fn volume_state(&self) -> VolumeState {
        *self.volume.read().await
    }

    pub async fn current_source(&self) -> String {
        self.current_source.read().await.clone()
    }

    /// Load the default source and start the event pump.
    /// The player settles into `Ready` when metadata arrives.
    #[instrument(skip(self))]
    pub async fn initialize(self: Arc<Self>) -> Result<()> {
        let (name, source) = self
            .catalog
            .default_entry()
            .map(|(n, s)| (n.to_string(), s.clone()))
            .ok_or_else(|| Error::InvalidConfig("source catalog is empty".to_string()))?;

        info!(
            session_id = %self.id,
            backend = %self.adapter.kind(),
            source = %name,
            "initializing player"
        );

        Self::spawn_event_pump(Arc::clone(&self));

        *self.current_source.write().await = name.clone();
        *self.pending_load.lock() = Some(LoadKind::Initial);
        self.set_state(PlayerState::Loading).await?;

        if source.poster.is_some() {
            self.poster_visible.store(true, Ordering::Release);
            self.send_view(ViewCommand::PosterVisible(true));
        }

        if let Err(error) = self.adapter.set_source(&source) {
            self.fail_load(&error).await;
            return Err(error);
        }

        self.begin_subtitle_fetch(&name, &source);
        self.arm_load_watchdog(name);

        if let Some(hook) = &self.options.hooks.on_start {
            hook();
        }

        Ok(())
    }

    /// Abort every task this controller owns. Idempotent.
    pub fn shutdown(&self) {
        self.disarm_load_watchdog();
        self.stop_monitor();
        if let Some(pump) = self.pump.lock().take() {
            pump.abort();
        }
    }

    // ------------------------------------------------------------------
    // User gestures
    // ------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn user_play(&self) -> Result<()> {
        match self.state().await {
            PlayerState::Loading => {
                debug!("play deferred until metadata arrives");
                *self.deferred.lock() = Some(Intent::Play);
            }
            PlayerState::Ready | PlayerState::Paused => {
                self.adapter.play();
                self.set_state(PlayerState::Playing).await?;
            }
            PlayerState::Ended => {
                // rewind when the backend has not done so on its own
                if self.adapter.current_time() > 0.0 {
                    self.adapter.seek(0.0);
                }
                self.cues.write().await.resync(0.0);
                self.adapter.play();
                self.set_state(PlayerState::Playing).await?;
            }
            state => debug!(%state, "play ignored"),
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn user_pause(&self) -> Result<()> {
        match self.state().await {
            PlayerState::Loading => {
                debug!("pause deferred until metadata arrives");
                *self.deferred.lock() = Some(Intent::Pause);
            }
            // the transition itself arrives as a backend Paused event
            PlayerState::Playing => self.adapter.pause(),
            state => debug!(%state, "pause ignored"),
        }
        Ok(())
    }

    /// Play/pause button: follow the backend's actual paused status
    pub async fn toggle_play(&self) -> Result<()> {
        if self.adapter.is_paused() {
            self.user_play().await
        } else {
            self.user_pause().await
        }
    }

    pub async fn toggle_mute(&self) {
        let mut volume = self.volume.write().await;
        if volume.muted {
            self.adapter.set_muted(false);
            volume.muted = false;
            volume.level = self.adapter.volume();
            let level = volume.level;
            drop(volume);
            self.send_view(ViewCommand::MuteGlyph { muted: false });
            self.send_view(ViewCommand::VolumeFraction(level));
        } else {
            self.adapter.set_muted(true);
            volume.muted = true;
            drop(volume);
            self.send_view(ViewCommand::MuteGlyph { muted: true });
            self.send_view(ViewCommand::VolumeFraction(0.0));
        }
    }

    /// Fullscreen is a boolean intent; the View owns the actual toggle
    pub fn toggle_fullscreen(&self) {
        let active = !self.fullscreen.fetch_xor(true, Ordering::AcqRel);
        self.send_view(ViewCommand::Fullscreen(active));
    }

    /// Switch to another catalog entry. Ordered and not interruptible; a
    /// switch while one is already loading is rejected.
    #[instrument(skip(self))]
    pub async fn change_source(&self, name: &str) -> Result<()> {
        let source = self
            .catalog
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownSource {
                name: name.to_string(),
            })?;

        let state = self.state().await;
        if state == PlayerState::Loading {
            return Err(Error::InvalidStateTransition {
                from: state.to_string(),
                to: PlayerState::Loading.to_string(),
            });
        }
        if *self.current_source.read().await == name && state != PlayerState::Error {
            debug!(name, "source already active");
            return Ok(());
        }

        info!(name, "switching source");
        self.switching.store(true, Ordering::Release);
        *self.deferred.lock() = None;
        *self.pre_seek.lock() = None;

        // 1. pause the current backend; its echo is ignored while switching
        self.adapter.pause();

        // 2. reset UI widths and tear down the monitor before any new sampling
        self.stop_monitor();
        self.buffer_complete.store(false, Ordering::Release);
        self.send_view(ViewCommand::ScrubberFraction(0.0));
        self.send_view(ViewCommand::PointerFraction(0.0));
        self.send_view(ViewCommand::BufferFraction(0.0));
        *self.cues.write().await = CueScheduler::inert();
        self.emit_subtitle(String::new()).await;

        *self.position.write().await = 0.0;
        *self.duration.write().await = None;
        *self.current_source.write().await = name.to_string();
        *self.pending_load.lock() = Some(LoadKind::Switch);
        self.set_state(PlayerState::Loading).await?;

        // 3. asynchronous reload; completion runs in on_metadata_loaded
        if let Err(error) = self.adapter.set_source(&source) {
            self.fail_load(&error).await;
            return Err(error);
        }

        self.begin_subtitle_fetch(name, &source);
        self.arm_load_watchdog(name.to_string());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Drag gestures (seek and volume tracks)
    // ------------------------------------------------------------------

    /// Begin a seek drag. No-op unless metadata is known and playback is in
    /// a seekable state.
    pub async fn pointer_down_seek(&self, bounds: TrackBounds) {
        let duration = match *self.duration.read().await {
            Some(d) if d > 0.0 => d,
            _ => {
                debug!("seek gesture ignored, duration unknown");
                return;
            }
        };

        let state = self.state().await;
        let restore = match state {
            PlayerState::Playing => PlayerState::Playing,
            PlayerState::Paused | PlayerState::Ended => PlayerState::Paused,
            _ => {
                debug!(%state, "seek gesture ignored");
                return;
            }
        };

        {
            let mut slot = self.pre_seek.lock();
            if slot.is_none() {
                *slot = Some(restore);
            }
        }
        self.set_state_if_valid(PlayerState::Seeking).await;

        let adapter = Arc::clone(&self.adapter);
        let view_tx = self.view_tx.clone();
        let internal_tx = self.internal_tx.clone();
        self.interactions.lock().pointer_down(SessionSpec {
            bounds,
            axis: Axis::Horizontal,
            inverted: false,
            on_update: Box::new(move |fraction| {
                adapter.seek(fraction * duration);
                let _ = view_tx.send(ViewCommand::ScrubberFraction(fraction));
                let _ = view_tx.send(ViewCommand::PointerFraction(fraction));
            }),
            on_release: Box::new(move || {
                let _ = internal_tx.send(CoreEvent::SeekReleased);
            }),
        });
    }

    /// Begin a volume drag. The vertical track is inverted: its top is max.
    pub fn pointer_down_volume(&self, bounds: TrackBounds) {
        let view_tx = self.view_tx.clone();
        let internal_tx = self.internal_tx.clone();
        self.interactions.lock().pointer_down(SessionSpec {
            bounds,
            axis: Axis::Vertical,
            inverted: true,
            on_update: Box::new(move |fraction| {
                let _ = view_tx.send(ViewCommand::VolumeFraction(fraction));
                let _ = internal_tx.send(CoreEvent::VolumeTo(fraction));
            }),
            on_release: Box::new(|| {}),
        });
    }

    pub fn pointer_move(&self, coord: f64) {
        self.interactions.lock().pointer_move(coord);
    }

    pub fn pointer_up(&self, coord: f64) {
        self.interactions.lock().pointer_up(coord);
    }

    pub fn pointer_cancel(&self) {
        self.interactions.lock().pointer_cancel();
    }

    // ------------------------------------------------------------------
    // Event pump
    // ------------------------------------------------------------------

    fn spawn_event_pump(this: Arc<Self>) {
        let mut backend_rx = this.adapter.subscribe();
        let Some(mut internal_rx) = this.internal_rx.lock().take() else {
            debug!("event pump already running");
            return;
        };

        let controller = Arc::clone(&this);
        let pump = tokio::spawn(async move {
            loop {
                tokio::select! {
                    event = backend_rx.recv() => match event {
                        Some(event) => controller.handle_backend_event(event).await,
                        None => break,
                    },
                    event = internal_rx.recv() => match event {
                        Some(event) => controller.handle_core_event(event).await,
                        None => break,
                    },
                }
            }
            debug!("event pump stopped");
        });
        *this.pump.lock() = Some(pump);
    }

    async fn handle_backend_event(&self, event: BackendEvent) {
        match event {
            BackendEvent::MetadataLoaded { duration } => self.on_metadata_loaded(duration).await,
            BackendEvent::Playing => self.on_backend_playing().await,
            BackendEvent::Paused => self.on_backend_paused().await,
            BackendEvent::Seeked => self.on_backend_seeked().await,
            BackendEvent::TimeUpdate(t) => self.on_time_update(t).await,
            BackendEvent::Ended => self.on_backend_ended().await,
        }
    }

    async fn handle_core_event(&self, event: CoreEvent) {
        match event {
            CoreEvent::Buffer(info) => self.on_buffer_sample(info),
            CoreEvent::Subtitles { name, result } => self.on_subtitles(name, result).await,
            CoreEvent::VolumeTo(fraction) => self.on_volume_to(fraction).await,
            CoreEvent::SeekReleased => self.on_seek_released().await,
            CoreEvent::LoadTimeout { name } => self.on_load_timeout(name).await,
        }
    }

    async fn on_metadata_loaded(&self, duration: f64) {
        self.disarm_load_watchdog();
        *self.duration.write().await = Some(duration);

        let elapsed = format_time(*self.position.read().await);
        self.send_view(ViewCommand::TimeText {
            elapsed,
            total: format_time(duration),
        });

        let pending = self.pending_load.lock().take();
        match pending {
            Some(LoadKind::Initial) => {
                self.set_state_if_valid(PlayerState::Ready).await;
                let deferred = self.deferred.lock().take();
                if deferred == Some(Intent::Play) {
                    debug!("replaying deferred play intent");
                    let _ = self.user_play().await;
                }
            }
            Some(LoadKind::Switch) => {
                self.ensure_monitor();
                self.adapter.play();
                self.set_state_if_valid(PlayerState::Playing).await;
                self.switching.store(false, Ordering::Release);

                let name = self.current_source.read().await.clone();
                self.send_view(ViewCommand::SourceChanged(name));
                if let Some(hook) = &self.options.hooks.on_source_change {
                    hook();
                }
            }
            None => debug!(duration, "metadata refresh outside a load"),
        }
    }

    async fn on_backend_playing(&self) {
        if self.poster_visible.swap(false, Ordering::AcqRel) {
            self.send_view(ViewCommand::PosterVisible(false));
        }
        self.ensure_monitor();
        self.send_view(ViewCommand::PlayGlyph { playing: true });
        self.set_state_if_valid(PlayerState::Playing).await;
        if let Some(hook) = &self.options.hooks.on_play {
            hook();
        }
    }

    async fn on_backend_paused(&self) {
        if self.switching.load(Ordering::Acquire) {
            debug!("ignoring pause echo during source switch");
            return;
        }
        if self.state().await == PlayerState::Seeking {
            return;
        }
        if self.set_state_if_valid(PlayerState::Paused).await {
            self.send_view(ViewCommand::PlayGlyph { playing: false });
            if let Some(hook) = &self.options.hooks.on_pause {
                hook();
            }
        }
    }

    async fn on_backend_seeked(&self) {
        let t = self.adapter.current_time();
        let text = {
            let mut cues = self.cues.write().await;
            cues.resync(t);
            cues.update(t).to_string()
        };
        self.emit_subtitle(text).await;

        let dragging = self.interactions.lock().is_active();
        if !dragging {
            self.restore_after_seek().await;
        }
        if let Some(hook) = &self.options.hooks.on_seek {
            hook();
        }
    }

    async fn on_time_update(&self, t: f64) {
        *self.position.write().await = t;

        if let Some(duration) = *self.duration.read().await {
            if duration > 0.0 {
                let fraction = (t / duration).clamp(0.0, 1.0);
                // a drag preview owns the scrubber until release
                if !self.interactions.lock().is_active() {
                    self.send_view(ViewCommand::ScrubberFraction(fraction));
                    self.send_view(ViewCommand::PointerFraction(fraction));
                }
                self.send_view(ViewCommand::TimeText {
                    elapsed: format_time(t),
                    total: format_time(duration),
                });
            }
        }

        let text = self.cues.write().await.update(t).to_string();
        self.emit_subtitle(text).await;
    }

    async fn on_backend_ended(&self) {
        self.stop_monitor();
        self.send_view(ViewCommand::ScrubberFraction(0.0));
        self.send_view(ViewCommand::PointerFraction(0.0));
        self.send_view(ViewCommand::PlayGlyph { playing: false });
        self.set_state_if_valid(PlayerState::Ended).await;
        if let Some(hook) = &self.options.hooks.on_end {
            hook();
        }
    }

    fn on_buffer_sample(&self, info: BufferInfo) {
        self.send_view(ViewCommand::BufferFraction(info.fraction));
        if info.is_complete {
            self.buffer_complete.store(true, Ordering::Release);
        }
    }

    async fn on_subtitles(&self, name: String, result: Result<Vec<SubtitleCue>>) {
        if *self.current_source.read().await != name {
            debug!(name, "dropping stale subtitle payload");
            return;
        }
        match result {
            Ok(cues) if cues.is_empty() => debug!("subtitle payload produced no cues"),
            Ok(cues) => {
                let t = *self.position.read().await;
                let mut scheduler = CueScheduler::new(cues);
                scheduler.resync(t);
                let text = scheduler.update(t).to_string();
                *self.cues.write().await = scheduler;
                self.emit_subtitle(text).await;
            }
            Err(error) => {
                // non-fatal: playback continues without captions
                warn!(%error, code = error.error_code(), "subtitle fetch failed");
            }
        }
    }

    async fn on_volume_to(&self, fraction: f64) {
        self.adapter.set_volume(fraction);

        let mut volume = self.volume.write().await;
        let was_muted = volume.muted;
        volume.level = fraction;
        volume.muted = fraction <= 0.0;
        let muted = volume.muted;
        drop(volume);

        if muted != was_muted {
            self.send_view(ViewCommand::MuteGlyph { muted });
        }
    }

    async fn on_seek_released(&self) {
        // a newer drag supersedes this release
        if self.interactions.lock().is_active() {
            return;
        }
        let t = self.adapter.current_time();
        self.cues.write().await.resync(t);
        self.restore_after_seek().await;
    }

    async fn on_load_timeout(&self, name: String) {
        if self.state().await != PlayerState::Loading {
            return; // stale watchdog
        }
        let error = Error::SourceLoadTimeout { name };
        self.fail_load(&error).await;
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Transition to new state
    async fn set_state(&self, new_state: PlayerState) -> Result<()> {
        let current = *self.state.read().await;

        if !current.can_transition_to(new_state) {
            return Err(Error::InvalidStateTransition {
                from: current.to_string(),
                to: new_state.to_string(),
            });
        }

        *self.state.write().await = new_state;
        let _ = self.state_tx.send(new_state);

        info!(from = %current, to = %new_state, "state transition");
        Ok(())
    }

    /// Transitions are total: anything invalid is a logged no-op.
    /// Returns whether the state actually changed.
    async fn set_state_if_valid(&self, new_state: PlayerState) -> bool {
        if *self.state.read().await == new_state {
            return false;
        }
        match self.set_state(new_state).await {
            Ok(()) => true,
            Err(error) => {
                debug!(%error, "transition treated as no-op");
                false
            }
        }
    }

    async fn restore_after_seek(&self) {
        let restore = self.pre_seek.lock().take();
        match restore {
            Some(PlayerState::Playing) => {
                if self.adapter.is_paused() {
                    self.adapter.play();
                }
                self.set_state_if_valid(PlayerState::Playing).await;
            }
            Some(_) => {
                self.set_state_if_valid(PlayerState::Paused).await;
            }
            None => {}
        }
    }

    async fn fail_load(&self, error: &Error) {
        warn!(%error, code = error.error_code(), "source load failed");
        self.switching.store(false, Ordering::Release);
        *self.pending_load.lock() = None;
        self.disarm_load_watchdog();
        self.send_view(ViewCommand::ErrorMessage(error.to_string()));
        self.set_state_if_valid(PlayerState::Error).await;
    }

    /// Start the buffering monitor unless one is already running or the
    /// buffer completed for this source
    fn ensure_monitor(&self) {
        if self.buffer_complete.load(Ordering::Acquire) {
            return;
        }
        let mut slot = self.monitor.lock();
        if slot.as_ref().is_some_and(|m| !m.is_finished()) {
            return;
        }
        let cadence = self.adapter.kind().sample_cadence();
        let tx = self.internal_tx.clone();
        *slot = Some(BufferingMonitor::spawn(
            Arc::clone(&self.adapter),
            cadence,
            move |info| {
                let _ = tx.send(CoreEvent::Buffer(info));
            },
        ));
    }

    fn stop_monitor(&self) {
        if let Some(monitor) = self.monitor.lock().take() {
            monitor.stop();
        }
    }

    fn begin_subtitle_fetch(&self, name: &str, source: &MediaSource) {
        let Some(url) = source.subtitle.clone() else {
            return;
        };
        let name = name.to_string();
        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let result = fetcher.fetch(&url).await.map(|raw| parse_cue_sheet(&raw));
            let _ = tx.send(CoreEvent::Subtitles { name, result });
        });
    }

    fn arm_load_watchdog(&self, name: String) {
        let timeout = self.options.load_timeout;
        let tx = self.internal_tx.clone();
        let watchdog = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let _ = tx.send(CoreEvent::LoadTimeout { name });
        });
        if let Some(previous) = self.load_watchdog.lock().replace(watchdog) {
            previous.abort();
        }
    }

    fn disarm_load_watchdog(&self) {
        if let Some(watchdog) = self.load_watchdog.lock().take() {
            watchdog.abort();
        }
    }

    async fn emit_subtitle(&self, text: String) {
        let mut last = self.last_subtitle.write().await;
        if *last != text {
            *last = text.clone();
            self.send_view(ViewCommand::Subtitle(text));
        }
    }

    fn send_view(&self, command: ViewCommand) {
        let _ = self.view_tx.send(command);
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
