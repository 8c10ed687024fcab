//! Error types for the edgequake-deck2video library.
//!
//! Every failure in a run is fatal: there is no per-slide retry and no
//! skip-and-continue. Each stage returns `Err(Deck2VideoError)` and the
//! driver in [`crate::generate`] aborts the run on the first one.
//! Artifacts already written for earlier slides stay on disk.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-deck2video library.
#[derive(Debug, Error)]
pub enum Deck2VideoError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Deck file was not found at the given path.
    #[error("Deck file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// The deck extension is neither `.pptx` nor `.pdf`.
    #[error("Unsupported input format '{extension}' for '{path}'\nSupported formats: .pptx (speaker notes), .pdf (generated scripts).")]
    UnsupportedInputFormat { path: PathBuf, extension: String },

    /// A `.pptx` deck has no page-source PDF next to it by convention.
    #[error("Companion PDF not found: '{expected}'\nExport the deck to PDF and place it there.")]
    MissingCompanionFile { expected: PathBuf },

    /// The file has a `.pdf` extension but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// The presentation archive could not be read.
    #[error("Failed to read presentation '{path}': {detail}")]
    DeckParseFailed { path: PathBuf, detail: String },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Configuration / environment ───────────────────────────────────────
    /// The settings document is missing or malformed.
    #[error("Failed to load settings from '{path}': {detail}")]
    ConfigLoadFailure { path: PathBuf, detail: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A required API key is not set in the environment.
    #[error("Environment variable {var} is not set.\n{hint}")]
    MissingCredential { var: String, hint: String },

    // ── Service errors ────────────────────────────────────────────────────
    /// The LLM call for a slide script failed or returned nothing usable.
    #[error("Script generation failed for slide {slide}: {detail}")]
    ScriptGenerationFailure { slide: usize, detail: String },

    /// The speech synthesis call failed or returned a malformed payload.
    #[error("Speech synthesis failed: {detail}")]
    SynthesisFailure { detail: String },

    // ── Media tool errors ─────────────────────────────────────────────────
    /// ffmpeg / ffprobe could not be spawned.
    #[error("Could not run '{tool}': {detail}\nInstall ffmpeg or pass --ffmpeg/--ffprobe.")]
    ToolUnavailable { tool: String, detail: String },

    /// ffprobe could not report a duration for an audio artifact.
    #[error("Failed to probe duration of '{path}': {detail}")]
    ProbeFailed { path: PathBuf, detail: String },

    /// ffmpeg exited non-zero while encoding a slide clip.
    #[error("Encoding failed for '{path}': {stderr}")]
    EncodingFailure { path: PathBuf, stderr: String },

    /// ffmpeg exited non-zero while concatenating clips.
    #[error("Concatenation into '{path}' failed: {stderr}")]
    ConcatenationFailure { path: PathBuf, stderr: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output artifact.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Deck2VideoError {
    /// Short machine-friendly name of the error kind, used in run logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FileNotFound { .. } => "file_not_found",
            Self::UnsupportedInputFormat { .. } => "unsupported_input_format",
            Self::MissingCompanionFile { .. } => "missing_companion_file",
            Self::NotAPdf { .. } => "not_a_pdf",
            Self::DeckParseFailed { .. } => "deck_parse_failed",
            Self::CorruptPdf { .. } => "corrupt_pdf",
            Self::RasterisationFailed { .. } => "rasterisation_failed",
            Self::PdfiumBindingFailed(_) => "pdfium_binding_failed",
            Self::ConfigLoadFailure { .. } => "config_load_failure",
            Self::InvalidConfig(_) => "invalid_config",
            Self::MissingCredential { .. } => "missing_credential",
            Self::ScriptGenerationFailure { .. } => "script_generation_failure",
            Self::SynthesisFailure { .. } => "synthesis_failure",
            Self::ToolUnavailable { .. } => "tool_unavailable",
            Self::ProbeFailed { .. } => "probe_failed",
            Self::EncodingFailure { .. } => "encoding_failure",
            Self::ConcatenationFailure { .. } => "concatenation_failure",
            Self::OutputWriteFailed { .. } => "output_write_failed",
            Self::Internal(_) => "internal",
        }
    }
}
