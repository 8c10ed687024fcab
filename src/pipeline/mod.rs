//! Pipeline stages for deck-to-video generation.
//!
//! Each submodule does one transformation step and is driven, slide by
//! slide, from [`crate::generate`].
//!
//! ## Data Flow
//!
//! ```text
//!           ┌─ notes (pptx) ──────────────┐
//! input ──▶─┤                             ├──▶ speech ──▶ clip ──▶ assemble
//!           └─ render ──▶ encode ──▶ script┘    (TTS)    (ffmpeg)  (concat)
//! ```
//!
//! 1. [`input`]    — validate the deck path and locate the companion PDF
//! 2. [`notes`]    — read speaker notes out of a `.pptx` archive
//! 3. [`render`]   — rasterise PDF pages; runs in `spawn_blocking` because
//!    pdfium is not async-safe
//! 4. [`encode`]   — downscale and base64-wrap a page for the vision model
//! 5. [`script`]   — generate narration for a page (`.pdf` decks only)
//! 6. [`speech`]   — synthesize narration to a WAV file
//! 7. [`clip`]     — encode one still-image clip per slide
//! 8. [`assemble`] — concatenate the clips into the final video
//!
//! [`media`] wraps the ffmpeg and ffprobe executables for the last stages.

pub mod assemble;
pub mod clip;
pub mod encode;
pub mod input;
pub mod media;
pub mod notes;
pub mod render;
pub mod script;
pub mod speech;
