//! Progress-callback trait for per-slide generation events.
//!
//! Inject an [`Arc<dyn RunProgressCallback>`] via
//! [`crate::config::PipelineConfigBuilder::progress_callback`] to receive
//! events as the driver works through the deck. The CLI uses this to drive
//! an `indicatif` progress bar; library users can forward events anywhere.
//!
//! Slides are processed strictly in order, so events for slide `i + 1`
//! never arrive before `on_slide_complete` for slide `i`.
//!
//! # Example
//!
//! ```rust
//! use edgequake_deck2video::{PipelineConfig, RunProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl RunProgressCallback for CountingCallback {
//!     fn on_slide_complete(&self, slide: usize, total: usize, narrated: bool, secs: f64) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("slide {slide}/{total} narrated={narrated} ({secs:.1}s)");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { completed: AtomicUsize::new(0) });
//!
//! let config = PipelineConfig::builder()
//!     .progress_callback(counter as Arc<dyn RunProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the pipeline driver as it processes each slide.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait RunProgressCallback: Send + Sync {
    /// Called once after the deck is loaded, before the first slide.
    fn on_run_start(&self, total_slides: usize) {
        let _ = total_slides;
    }

    /// Called before any work is done for a slide.
    ///
    /// # Arguments
    /// * `slide` — 1-indexed slide number
    /// * `total` — number of slides in the deck
    fn on_slide_start(&self, slide: usize, total: usize) {
        let _ = (slide, total);
    }

    /// Called when a slide's clip has been written.
    ///
    /// # Arguments
    /// * `slide`         — 1-indexed slide number
    /// * `total`         — number of slides in the deck
    /// * `narrated`      — whether the clip carries synthesized speech
    /// * `duration_secs` — length of the clip
    fn on_slide_complete(&self, slide: usize, total: usize, narrated: bool, duration_secs: f64) {
        let _ = (slide, total, narrated, duration_secs);
    }

    /// Called once the final video has been assembled.
    fn on_run_complete(&self, total_slides: usize, final_video: &Path) {
        let _ = (total_slides, final_video);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl RunProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PipelineConfig`].
pub type ProgressCallback = Arc<dyn RunProgressCallback>;
