//! Subtitle cue parsing and scheduling
//!
//! The cue sheet format is block-oriented: blocks are separated by a doubled
//! line break (either `\r\n` or `\n`, sniffed from the payload's first
//! occurrence), and each block carries an index line, a
//! `HH:MM:SS,mmm --> HH:MM:SS,mmm` timecode line, and one or more text
//! lines. Timecodes are truncated to whole seconds on purpose; the display
//! contract is coarse-grained.
//!
//! [`CueScheduler`] tracks a cursor into the parsed timeline. During
//! uninterrupted playback the cursor only ever advances; a time
//! discontinuity (seek) forces a linear rescan from the start, which is
//! cheap at realistic cue counts.

use crate::error::{Error, Result};
use crate::types::SubtitleCue;
use tracing::{debug, warn};

/// Position jump beyond which an update is treated as a seek rather than
/// ordinary playback, forcing a cursor rescan.
pub const SEEK_DISCONTINUITY_SECS: f64 = 1.5;

/// Parse a raw cue sheet. Malformed blocks are skipped; only the shape of
/// the payload as a whole can make this fail to produce any cues.
pub fn parse_cue_sheet(payload: &str) -> Vec<SubtitleCue> {
    let separator = sniff_separator(payload);
    let record_separator = format!("{separator}{separator}");

    let mut cues = Vec::new();
    for block in payload.split(record_separator.as_str()) {
        if block.trim().is_empty() {
            continue;
        }
        match parse_block(block, separator) {
            Ok(cue) => cues.push(cue),
            Err(error) => warn!(%error, "skipping malformed cue block"),
        }
    }

    debug!(count = cues.len(), "parsed cue sheet");
    cues
}

/// Line-ending convention, decided by the first occurrence in the payload
fn sniff_separator(payload: &str) -> &'static str {
    if payload.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

fn parse_block(block: &str, separator: &str) -> Result<SubtitleCue> {
    let mut lines = block.split(separator).filter(|line| !line.is_empty());

    let _index = lines.next().ok_or_else(|| Error::MalformedCue {
        reason: "empty block".to_string(),
    })?;

    let timing = lines.next().ok_or_else(|| Error::MalformedCue {
        reason: "missing timecode line".to_string(),
    })?;
    let (start, end) = timing.split_once(" --> ").ok_or_else(|| Error::MalformedCue {
        reason: format!("not a timecode line: {timing}"),
    })?;

    let start_secs = timecode_to_secs(start.trim())?;
    let end_secs = timecode_to_secs(end.trim())?;

    let text = lines.collect::<Vec<_>>().join("\n");
    if text.is_empty() {
        return Err(Error::MalformedCue {
            reason: "cue has no text".to_string(),
        });
    }

    Ok(SubtitleCue {
        start_secs,
        end_secs,
        text,
    })
}

/// Convert `HH:MM:SS,mmm` to whole seconds, truncating the milliseconds
pub(crate) fn timecode_to_secs(tc: &str) -> Result<u32> {
    let clock = tc.split(',').next().unwrap_or(tc);
    let mut parts = clock.split(':');

    let mut field = || -> Result<u32> {
        parts
            .next()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .ok_or_else(|| Error::MalformedCue {
                reason: format!("bad timecode: {tc}"),
            })
    };

    let hours = field()?;
    let minutes = field()?;
    let seconds = field()?;

    Ok(hours * 3600 + minutes * 60 + seconds)
}

/// Cursor over an ordered cue timeline.
///
/// An inert scheduler (no cues) is valid and does nothing; playback without
/// subtitles runs through the same code path.
#[derive(Debug, Default)]
pub struct CueScheduler {
    cues: Vec<SubtitleCue>,
    cursor: usize,
    last_time: Option<f64>,
}

impl CueScheduler {
    pub fn new(cues: Vec<SubtitleCue>) -> Self {
        Self {
            cues,
            cursor: 0,
            last_time: None,
        }
    }

    /// A scheduler with no cues; every query yields empty text
    pub fn inert() -> Self {
        Self::default()
    }

    pub fn is_inert(&self) -> bool {
        self.cues.is_empty()
    }

    /// Advance to playback time `t` and return the text to display.
    ///
    /// Detects discontinuities against the previously observed time and
    /// rescans when the jump exceeds [`SEEK_DISCONTINUITY_SECS`].
    pub fn update(&mut self, t: f64) -> &str {
        if self.cues.is_empty() {
            return "";
        }

        if let Some(prev) = self.last_time {
            if (t - prev).abs() > SEEK_DISCONTINUITY_SECS {
                self.rescan(t);
            }
        }
        self.last_time = Some(t);

        // common path: monotonic forward advance, clamped at the last cue
        while t >= self.cues[self.cursor].end_secs as f64 && self.cursor < self.cues.len() - 1 {
            self.cursor += 1;
        }

        let cue = &self.cues[self.cursor];
        if cue.is_active_at(t) {
            &cue.text
        } else {
            ""
        }
    }

    /// Re-position the cursor after a known discontinuity
    pub fn resync(&mut self, t: f64) {
        if self.cues.is_empty() {
            return;
        }
        self.rescan(t);
        self.last_time = Some(t);
    }

    /// First cue whose end exceeds `t`, clamped to the final cue
    fn rescan(&mut self, t: f64) {
        self.cursor = self
            .cues
            .iter()
            .position(|cue| (cue.end_secs as f64) > t)
            .unwrap_or(self.cues.len() - 1);
    }
}
