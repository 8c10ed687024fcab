//! Run driver: deck in, narrated video out.
//!
//! Slides are processed strictly in order, one at a time:
//!
//! ```text
//! Loading ──▶ SourceLoaded ──▶ for each slide:
//!     Deciding ──▶ Scripting? ──▶ Synthesizing? ──▶ Encoding
//! ──▶ Assembling ──▶ Done
//! ```
//!
//! Any state can move to `Failed`; the first error aborts the run. Artifacts already written for earlier
//! slides are left on disk; re-running overwrites them in place.

use crate::config::PipelineConfig;
use crate::deck::{Deck, DeckFormat, Slide};
use crate::error::Deck2VideoError;
use crate::layout::ProjectLayout;
use crate::narration::{decide, NarrationSource};
use crate::output::{RunOutput, RunStats, SlideOutcome};
use crate::pipeline::assemble::assemble;
use crate::pipeline::clip::{build_clip, ClipAudio};
use crate::pipeline::media::MediaTool;
use crate::pipeline::script::{LlmScriptGenerator, ScriptGenerator};
use crate::pipeline::speech::{synthesize_to_file, GeminiSynthesizer, SpeechSynthesizer};
use crate::source::load_deck;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Where the driver currently is; logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Loading,
    SourceLoaded,
    Deciding { slide: usize },
    Scripting { slide: usize },
    Synthesizing { slide: usize },
    Encoding { slide: usize },
    Assembling,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "loading"),
            Self::SourceLoaded => write!(f, "source loaded"),
            Self::Deciding { slide } => write!(f, "deciding narration for slide {slide}"),
            Self::Scripting { slide } => write!(f, "generating script for slide {slide}"),
            Self::Synthesizing { slide } => write!(f, "synthesizing audio for slide {slide}"),
            Self::Encoding { slide } => write!(f, "encoding clip for slide {slide}"),
            Self::Assembling => write!(f, "assembling final video"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Current [`RunState`] of a run; remembered so a failure can be reported
/// with the state it happened in.
#[derive(Debug)]
struct StateTracker {
    current: RunState,
}

impl StateTracker {
    fn new() -> Self {
        debug!(state = %RunState::Loading, "run state");
        Self {
            current: RunState::Loading,
        }
    }

    fn enter(&mut self, state: RunState) {
        debug!(state = %state, "run state");
        self.current = state;
    }

    /// Log `err` with the state it happened in, then move to `Failed`.
    fn fail(&mut self, err: Deck2VideoError) -> Deck2VideoError {
        error!(state = %self.current, kind = err.kind(), "Run failed while {}: {}", self.current, err);
        self.enter(RunState::Failed);
        err
    }
}

/// Turn a `.pptx` or `.pdf` deck into a narrated video.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// Any failure is fatal; see [`Deck2VideoError`] for the kinds. In
/// particular a `.pptx` without its companion PDF fails with
/// [`Deck2VideoError::MissingCompanionFile`] before anything is written.
pub async fn generate_video(
    input: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<RunOutput, Deck2VideoError> {
    let input = input.as_ref();
    info!("Processing presentation: {}", input.display());

    let mut tracker = StateTracker::new();
    let deck = match load_deck(input, config).await {
        Ok(deck) => deck,
        Err(e) => return Err(tracker.fail(e)),
    };
    tracker.enter(RunState::SourceLoaded);
    run_deck(deck, config, &mut tracker)
        .await
        .map_err(|e| tracker.fail(e))
}

/// Run the per-slide loop and final assembly on an already loaded deck.
pub async fn generate_from_deck(
    deck: Deck,
    config: &PipelineConfig,
) -> Result<RunOutput, Deck2VideoError> {
    let mut tracker = StateTracker::new();
    tracker.enter(RunState::SourceLoaded);
    run_deck(deck, config, &mut tracker)
        .await
        .map_err(|e| tracker.fail(e))
}

async fn run_deck(
    deck: Deck,
    config: &PipelineConfig,
    tracker: &mut StateTracker,
) -> Result<RunOutput, Deck2VideoError> {
    let start = Instant::now();

    // ── Step 1: Services ─────────────────────────────────────────────────
    let synthesizer = resolve_synthesizer(config)?;
    let generator = match deck.format {
        DeckFormat::Pdf => Some(resolve_generator(config)?),
        DeckFormat::Presentation => None,
    };
    let tool = MediaTool::new(&config.ffmpeg, &config.ffprobe);

    // ── Step 2: Output tree ──────────────────────────────────────────────
    let layout = ProjectLayout::new(&config.output_root, &deck.project_name);
    layout.create_dirs().await?;

    let total = deck.len();
    info!("Found {} slides", total);
    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(total);
    }

    // ── Step 3: One clip per slide ───────────────────────────────────────
    let mut outcomes = Vec::with_capacity(total);
    for slide in &deck.slides {
        if let Some(ref cb) = config.progress_callback {
            cb.on_slide_start(slide.index, total);
        }

        let outcome = process_slide(
            slide,
            generator.as_deref(),
            &*synthesizer,
            &tool,
            &layout,
            config,
            tracker,
        )
        .await?;

        if let Some(ref cb) = config.progress_callback {
            cb.on_slide_complete(
                slide.index,
                total,
                outcome.audio_path.is_some(),
                outcome.duration_secs,
            );
        }
        outcomes.push(outcome);
    }

    // ── Step 4: Assemble ─────────────────────────────────────────────────
    tracker.enter(RunState::Assembling);
    let clips: Vec<_> = outcomes.iter().map(|o| o.clip_path.clone()).collect();
    let final_video = layout.final_video_path();
    assemble(&tool, &clips, &layout.base_dir, &final_video).await?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(total, &final_video);
    }
    tracker.enter(RunState::Done);

    let stats = RunStats::from_slides(&outcomes, start.elapsed().as_millis() as u64);
    info!(
        "Video generation complete: {} ({} slides, {} narrated, {:.1}s)",
        final_video.display(),
        stats.total_slides,
        stats.narrated_slides,
        stats.video_duration_secs
    );

    Ok(RunOutput {
        project_name: deck.project_name,
        final_video,
        slides: outcomes,
        stats,
    })
}

async fn process_slide(
    slide: &Slide,
    generator: Option<&dyn ScriptGenerator>,
    synthesizer: &dyn SpeechSynthesizer,
    tool: &MediaTool,
    layout: &ProjectLayout,
    config: &PipelineConfig,
    tracker: &mut StateTracker,
) -> Result<SlideOutcome, Deck2VideoError> {
    info!("Processing slide {}", slide.index);

    tracker.enter(RunState::Deciding { slide: slide.index });
    let source = match generator {
        Some(generator) => {
            tracker.enter(RunState::Scripting { slide: slide.index });
            let script = generator.generate(slide).await?;
            match decide(Some(&script)) {
                Some(text) => NarrationSource::GeneratedScript(text),
                None => {
                    return Err(Deck2VideoError::ScriptGenerationFailure {
                        slide: slide.index,
                        detail: "generated script is blank".into(),
                    })
                }
            }
        }
        None => NarrationSource::from_note(slide.narration.as_deref()),
    };

    let (script_path, audio_path, audio) = match source.script() {
        Some(text) => {
            let script_path = layout.script_path(slide.index);
            tokio::fs::write(&script_path, text).await.map_err(|e| {
                Deck2VideoError::OutputWriteFailed {
                    path: script_path.clone(),
                    source: e,
                }
            })?;
            debug!("Script saved to: {}", script_path.display());

            tracker.enter(RunState::Synthesizing { slide: slide.index });
            let audio_path = layout.audio_path(slide.index);
            synthesize_to_file(synthesizer, text, &audio_path).await?;
            let audio = ClipAudio::Narrated(audio_path.clone());
            (Some(script_path), Some(audio_path), audio)
        }
        None => {
            info!("No narration for slide {}, creating silent clip", slide.index);
            (None, None, ClipAudio::Silent(config.silent_duration_secs))
        }
    };

    tracker.enter(RunState::Encoding { slide: slide.index });
    let clip_path = layout.clip_path(slide.index);
    let duration_secs = build_clip(tool, &slide.image, &audio, &clip_path).await?;

    Ok(SlideOutcome {
        index: slide.index,
        narration: source.kind(),
        script_path,
        audio_path,
        clip_path,
        duration_secs,
    })
}

fn resolve_synthesizer(
    config: &PipelineConfig,
) -> Result<Arc<dyn SpeechSynthesizer>, Deck2VideoError> {
    if let Some(ref s) = config.synthesizer {
        return Ok(Arc::clone(s));
    }
    let tts = config.settings.model_config.gemini_tts.clone();
    info!("Using Gemini TTS model {} (voice {})", tts.model, tts.voice_name);
    Ok(Arc::new(GeminiSynthesizer::from_env(tts)?))
}

fn resolve_generator(
    config: &PipelineConfig,
) -> Result<Arc<dyn ScriptGenerator>, Deck2VideoError> {
    if let Some(ref g) = config.script_generator {
        return Ok(Arc::clone(g));
    }
    info!(
        "Using script model {}",
        config.settings.model_config.claude.model
    );
    Ok(Arc::new(LlmScriptGenerator::anthropic(
        config.settings.clone(),
    )?))
}
