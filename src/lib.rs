//! # edgequake-deck2video
//!
//! Turn a slide deck into a narrated video.
//!
//! Every slide becomes a short clip: the rendered page held on screen for as
//! long as its narration lasts, or a few seconds of silence when there is
//! nothing to say. The clips are then joined, in slide order, into one mp4.
//!
//! Narration comes from one of two places depending on the input:
//!
//! * `.pptx`: the slide's speaker notes. Pages are rendered from a companion
//!   PDF export of the deck (`slides/pdf/<deck>.pdf` by default).
//! * `.pdf`: a script written by a vision LLM (Claude) looking at the page.
//!
//! ## Pipeline Overview
//!
//! ```text
//! deck
//!  │
//!  ├─ 1. Load       validate input, read notes, rasterise pages (pdfium)
//!  ├─ 2. Decide     speaker note, generated script, or silence
//!  ├─ 3. Speak      Gemini TTS → 24 kHz mono WAV
//!  ├─ 4. Clip       still image + audio → mp4 (ffmpeg, 1 fps)
//!  └─ 5. Assemble   concat demuxer, stream copy → <project>.mp4
//! ```
//!
//! Slides are processed one after another. The first failure aborts the
//! run; artifacts of earlier slides stay on disk under
//! `output/<project>/{txt,wav,mp4}`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_deck2video::{generate_video, PipelineConfig, Settings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Needs ANTHROPIC_API_KEY (for .pdf decks) and GOOGLE_API_KEY.
//!     let config = PipelineConfig::builder()
//!         .settings(Settings::load("prompts.yaml")?)
//!         .build()?;
//!     let output = generate_video("talk.pptx", &config).await?;
//!     println!("{}", output.final_video.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `deck2video` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## External Requirements
//!
//! * `ffmpeg` and `ffprobe` on `PATH` (or configured explicitly)
//! * a pdfium shared library (`PDFIUM_LIB_PATH`, the working directory, or
//!   the system library path)

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod credentials;
pub mod deck;
pub mod error;
pub mod generate;
pub mod layout;
pub mod narration;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod source;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PipelineConfig, PipelineConfigBuilder, Settings};
pub use credentials::Credentials;
pub use deck::{Deck, DeckFormat, Slide};
pub use error::Deck2VideoError;
pub use generate::{generate_from_deck, generate_video};
pub use layout::ProjectLayout;
pub use narration::{NarrationKind, NarrationSource};
pub use output::{RunOutput, RunStats, SlideOutcome};
pub use pipeline::script::ScriptGenerator;
pub use pipeline::speech::SpeechSynthesizer;
pub use progress::{NoopProgressCallback, ProgressCallback, RunProgressCallback};
pub use source::load_deck;
