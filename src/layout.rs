//! Output tree layout.
//!
//! ```text
//! <output_root>/<project>/
//!     txt/slide_001_script.txt
//!     wav/slide_001_audio.wav
//!     mp4/slide_001_video.mp4
//!     <project>.mp4
//! ```
//!
//! Names depend only on the slide index, so a re-run overwrites the previous
//! run's artifacts in place. Files for indices that no longer exist (the deck
//! shrank) are left alone.

use crate::error::Deck2VideoError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Paths of one project's output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub project_name: String,
    pub base_dir: PathBuf,
    pub txt_dir: PathBuf,
    pub wav_dir: PathBuf,
    pub mp4_dir: PathBuf,
}

impl ProjectLayout {
    pub fn new(output_root: &Path, project_name: &str) -> Self {
        let base_dir = output_root.join(project_name);
        Self {
            project_name: project_name.to_string(),
            txt_dir: base_dir.join("txt"),
            wav_dir: base_dir.join("wav"),
            mp4_dir: base_dir.join("mp4"),
            base_dir,
        }
    }

    /// Create all directories of the tree (idempotent).
    pub async fn create_dirs(&self) -> Result<(), Deck2VideoError> {
        for dir in [&self.base_dir, &self.txt_dir, &self.wav_dir, &self.mp4_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| Deck2VideoError::OutputWriteFailed {
                    path: dir.clone(),
                    source: e,
                })?;
        }
        debug!("Output tree ready: {}", self.base_dir.display());
        Ok(())
    }

    pub fn script_path(&self, slide: usize) -> PathBuf {
        self.txt_dir.join(format!("{}_script.txt", slide_stem(slide)))
    }

    pub fn audio_path(&self, slide: usize) -> PathBuf {
        self.wav_dir.join(format!("{}_audio.wav", slide_stem(slide)))
    }

    pub fn clip_path(&self, slide: usize) -> PathBuf {
        self.mp4_dir.join(format!("{}_video.mp4", slide_stem(slide)))
    }

    pub fn final_video_path(&self) -> PathBuf {
        self.base_dir.join(format!("{}.mp4", self.project_name))
    }
}

/// `slide_NNN` with a 3-digit zero-padded 1-based index.
pub fn slide_stem(slide: usize) -> String {
    format!("slide_{:03}", slide)
}
