//! Typed notification surface from the core to the View
//!
//! The core never touches presentation state. Everything the View needs to
//! render flows through [`ViewCommand`] values on an unbounded channel; the
//! View forwards pointer coordinates and track bounds back in through the
//! orchestrator's public methods.

/// A render or notification command for the View
#[derive(Debug, Clone, PartialEq)]
pub enum ViewCommand {
    /// Swap the play/pause glyph
    PlayGlyph { playing: bool },
    /// Played portion of the scrubber, `[0, 1]`
    ScrubberFraction(f64),
    /// Position marker on the scrubber, `[0, 1]`
    PointerFraction(f64),
    /// Buffered-range width, `[0, 1]`
    BufferFraction(f64),
    /// Volume track fill, `[0, 1]`
    VolumeFraction(f64),
    /// Elapsed and total time, already formatted
    TimeText { elapsed: String, total: String },
    /// Subtitle text to display; empty clears the overlay
    Subtitle(String),
    MuteGlyph { muted: bool },
    PosterVisible(bool),
    /// Suppress or restore text selection while a drag is active
    SelectionSuppressed(bool),
    /// User-visible error message; playback needs a source change to resume
    ErrorMessage(String),
    /// The active source changed to the named catalog entry
    SourceChanged(String),
    /// Fullscreen intent; the View owns the actual toggle
    Fullscreen(bool),
}
