//! Result types of a completed run.

use crate::narration::NarrationKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything a successful run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutput {
    pub project_name: String,
    /// `<output_root>/<project>/<project>.mp4`
    pub final_video: PathBuf,
    /// One entry per slide, in slide order.
    pub slides: Vec<SlideOutcome>,
    pub stats: RunStats,
}

/// Artifacts and timing of a single slide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideOutcome {
    /// 1-based slide index.
    pub index: usize,
    pub narration: NarrationKind,
    /// Present only for narrated slides.
    pub script_path: Option<PathBuf>,
    /// Present only for narrated slides.
    pub audio_path: Option<PathBuf>,
    pub clip_path: PathBuf,
    pub duration_secs: f64,
}

/// Aggregate numbers for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub total_slides: usize,
    pub narrated_slides: usize,
    pub silent_slides: usize,
    /// Slides whose script came from the model rather than a speaker note.
    pub generated_scripts: usize,
    /// Sum of all clip durations.
    pub video_duration_secs: f64,
    pub elapsed_ms: u64,
}

impl RunStats {
    /// Tally stats from per-slide outcomes.
    pub fn from_slides(slides: &[SlideOutcome], elapsed_ms: u64) -> Self {
        let narrated = slides
            .iter()
            .filter(|s| s.narration != NarrationKind::Silent)
            .count();
        Self {
            total_slides: slides.len(),
            narrated_slides: narrated,
            silent_slides: slides.len() - narrated,
            generated_scripts: slides
                .iter()
                .filter(|s| s.narration == NarrationKind::Generated)
                .count(),
            video_duration_secs: slides.iter().map(|s| s.duration_secs).sum(),
            elapsed_ms,
        }
    }
}
