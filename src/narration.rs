//! Narration decision policy.
//!
//! For every slide the driver decides, exactly once and before any audio is
//! synthesized, where its spoken script comes from: an embedded speaker
//! note, a freshly generated script, or nothing (the slide is shown in
//! silence). The functions here are pure.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Where a slide's narration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrationSource {
    /// Speaker note text embedded in the presentation file.
    EmbeddedNote(String),
    /// Script written by the LLM for this slide.
    GeneratedScript(String),
    /// No narration; the clip gets a silent track of fixed length.
    Silence,
}

impl NarrationSource {
    /// The text to synthesize, if any.
    pub fn script(&self) -> Option<&str> {
        match self {
            Self::EmbeddedNote(s) | Self::GeneratedScript(s) => Some(s),
            Self::Silence => None,
        }
    }

    pub fn kind(&self) -> NarrationKind {
        match self {
            Self::EmbeddedNote(_) => NarrationKind::Note,
            Self::GeneratedScript(_) => NarrationKind::Generated,
            Self::Silence => NarrationKind::Silent,
        }
    }

    /// Build the source for an embedded note, applying [`decide`].
    pub fn from_note(note: Option<&str>) -> Self {
        match decide(note) {
            Some(text) => Self::EmbeddedNote(text),
            None => Self::Silence,
        }
    }
}

/// Tag of a [`NarrationSource`] without its text, for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrationKind {
    Note,
    Generated,
    Silent,
}

/// Decide the script for one slide.
///
/// Non-null, non-blank input is returned trimmed; anything else means the
/// slide is silent.
pub fn decide(narration: Option<&str>) -> Option<String> {
    narration
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Look up the note for a 1-based slide index.
///
/// The note list and the rendered page list can disagree in length (the
/// `.pptx` and its exported PDF are separate files). An index past the end
/// of `notes` yields `None`, the same as a slide without a note.
pub fn note_for_slide(notes: &[Option<String>], slide: usize) -> Option<&str> {
    if slide == 0 {
        return None;
    }
    notes.get(slide - 1).and_then(|n| n.as_deref())
}

/// Log a warning when the deck's note count differs from its page count.
pub fn warn_on_count_mismatch(notes: usize, pages: usize) {
    if notes != pages {
        warn!(
            "Presentation has {} slides but the companion PDF has {} pages; \
             slides without a matching note are silent",
            notes, pages
        );
    }
}
