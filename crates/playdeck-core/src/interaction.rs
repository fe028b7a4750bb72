//! Pointer-drag protocol for the seek and volume tracks
//!
//! Both tracks speak the same protocol; only the axis, the inversion flag,
//! and the update/commit callbacks differ. A plain click is a zero-duration
//! drag: down followed by up at the same coordinate still issues exactly one
//! update.
//!
//! While a session is active, text selection is suppressed through a guard
//! callback into the View. The guard is released unconditionally on every
//! exit path - pointer-up and pointer-cancel run the same release code.

use tracing::debug;

/// Direction a track extends in. The View reports the pointer coordinate
/// along this axis; the controller never sees the other one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// A track's position and length along its axis, in View units (pixels)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackBounds {
    pub origin: f64,
    pub extent: f64,
}

impl TrackBounds {
    pub fn new(origin: f64, extent: f64) -> Self {
        Self { origin, extent }
    }

    /// Normalized position of a pointer coordinate, clamped into `[0, 1]`
    pub fn fraction_at(&self, coord: f64) -> f64 {
        if self.extent <= 0.0 {
            return 0.0;
        }
        ((coord - self.origin) / self.extent).clamp(0.0, 1.0)
    }
}

/// Continuous position callback during a drag
pub type UpdateFn = Box<dyn FnMut(f64) + Send>;
/// One-shot commit callback on release
pub type ReleaseFn = Box<dyn FnOnce() + Send>;
/// Selection suppression guard; `true` acquires, `false` releases
pub type SelectionGuardFn = Box<dyn Fn(bool) + Send + Sync>;

/// Everything one drag gesture needs
pub struct SessionSpec {
    pub bounds: TrackBounds,
    pub axis: Axis,
    /// Flip the fraction (vertical volume track: top of track = max)
    pub inverted: bool,
    pub on_update: UpdateFn,
    pub on_release: ReleaseFn,
}

struct ActiveSession {
    bounds: TrackBounds,
    inverted: bool,
    on_update: UpdateFn,
    on_release: Option<ReleaseFn>,
}

impl ActiveSession {
    fn fraction_at(&self, coord: f64) -> f64 {
        let raw = self.bounds.fraction_at(coord);
        if self.inverted {
            1.0 - raw
        } else {
            raw
        }
    }
}

/// Owner of the (at most one) in-flight drag session
pub struct InteractionController {
    selection_guard: SelectionGuardFn,
    active: Option<ActiveSession>,
}

impl InteractionController {
    pub fn new(selection_guard: SelectionGuardFn) -> Self {
        Self {
            selection_guard,
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Begin a session. A still-active previous session is cancelled first,
    /// so the guard never leaks.
    pub fn pointer_down(&mut self, spec: SessionSpec) {
        if self.active.is_some() {
            debug!("pointer down with active session, cancelling previous");
            self.pointer_cancel();
        }

        (self.selection_guard)(true);
        self.active = Some(ActiveSession {
            bounds: spec.bounds,
            inverted: spec.inverted,
            on_update: spec.on_update,
            on_release: Some(spec.on_release),
        });
    }

    pub fn pointer_move(&mut self, coord: f64) {
        if let Some(session) = self.active.as_mut() {
            let fraction = session.fraction_at(coord);
            (session.on_update)(fraction);
        }
    }

    /// Final update at the release coordinate, then the release callback,
    /// then guard release and session teardown.
    pub fn pointer_up(&mut self, coord: f64) {
        if let Some(mut session) = self.active.take() {
            let fraction = session.fraction_at(coord);
            (session.on_update)(fraction);
            if let Some(release) = session.on_release.take() {
                release();
            }
            (self.selection_guard)(false);
        }
    }

    /// Cancellation path: no final update (the coordinate is unknown), but
    /// the same release and guard teardown as pointer-up.
    pub fn pointer_cancel(&mut self) {
        if let Some(mut session) = self.active.take() {
            if let Some(release) = session.on_release.take() {
                release();
            }
            (self.selection_guard)(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Harness {
        controller: InteractionController,
        updates: Arc<Mutex<Vec<f64>>>,
        releases: Arc<AtomicUsize>,
        suppressed: Arc<AtomicBool>,
    }

    impl Harness {
        fn new() -> Self {
            let suppressed = Arc::new(AtomicBool::new(false));
            let guard = suppressed.clone();
            Self {
                controller: InteractionController::new(Box::new(move |on| {
                    guard.store(on, Ordering::SeqCst);
                })),
                updates: Arc::new(Mutex::new(Vec::new())),
                releases: Arc::new(AtomicUsize::new(0)),
                suppressed,
            }
        }

        fn spec(&self, bounds: TrackBounds, inverted: bool) -> SessionSpec {
            let updates = self.updates.clone();
            let releases = self.releases.clone();
            SessionSpec {
                bounds,
                axis: if inverted {
                    Axis::Vertical
                } else {
                    Axis::Horizontal
                },
                inverted,
                on_update: Box::new(move |fraction| updates.lock().push(fraction)),
                on_release: Box::new(move || {
                    releases.fetch_add(1, Ordering::SeqCst);
                }),
            }
        }
    }

    #[test]
    fn test_drag_produces_monotonic_fractions() {
        let mut h = Harness::new();
        let spec = h.spec(TrackBounds::new(0.0, 200.0), false);

        h.controller.pointer_down(spec);
        assert!(h.suppressed.load(Ordering::SeqCst));

        for coord in [0.0, 50.0, 100.0, 150.0, 200.0] {
            h.controller.pointer_move(coord);
        }
        h.controller.pointer_up(200.0);

        let updates = h.updates.lock().clone();
        assert_eq!(updates, [0.0, 0.25, 0.5, 0.75, 1.0, 1.0]);
        assert!(updates.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(h.releases.load(Ordering::SeqCst), 1);
        assert!(!h.suppressed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_click_is_a_zero_duration_drag() {
        let mut h = Harness::new();
        let spec = h.spec(TrackBounds::new(0.0, 200.0), false);

        h.controller.pointer_down(spec);
        h.controller.pointer_up(100.0);

        assert_eq!(h.updates.lock().as_slice(), [0.5]);
        assert_eq!(h.releases.load(Ordering::SeqCst), 1);
        assert!(!h.suppressed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_fractions_clamp_outside_track() {
        let mut h = Harness::new();
        let spec = h.spec(TrackBounds::new(100.0, 200.0), false);

        h.controller.pointer_down(spec);
        h.controller.pointer_move(50.0);
        h.controller.pointer_move(400.0);
        h.controller.pointer_up(400.0);

        assert_eq!(h.updates.lock().as_slice(), [0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_vertical_track_inverts_fraction() {
        let mut h = Harness::new();
        let spec = h.spec(TrackBounds::new(0.0, 100.0), true);

        h.controller.pointer_down(spec);
        h.controller.pointer_move(0.0); // top of the track = max
        h.controller.pointer_up(100.0); // bottom = min

        assert_eq!(h.updates.lock().as_slice(), [1.0, 0.0]);
    }

    #[test]
    fn test_cancel_releases_guard_without_update() {
        let mut h = Harness::new();
        let spec = h.spec(TrackBounds::new(0.0, 200.0), false);

        h.controller.pointer_down(spec);
        h.controller.pointer_cancel();

        assert!(h.updates.lock().is_empty());
        assert_eq!(h.releases.load(Ordering::SeqCst), 1);
        assert!(!h.suppressed.load(Ordering::SeqCst));
        assert!(!h.controller.is_active());
    }

    #[test]
    fn test_release_path_is_idempotent() {
        let mut h = Harness::new();
        let spec = h.spec(TrackBounds::new(0.0, 200.0), false);

        h.controller.pointer_down(spec);
        h.controller.pointer_up(50.0);
        h.controller.pointer_up(50.0);
        h.controller.pointer_cancel();

        assert_eq!(h.releases.load(Ordering::SeqCst), 1);
        assert_eq!(h.updates.lock().len(), 1);
    }

    #[test]
    fn test_degenerate_track_yields_zero() {
        let bounds = TrackBounds::new(10.0, 0.0);
        assert_eq!(bounds.fraction_at(50.0), 0.0);
    }
}
