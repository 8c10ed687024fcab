//! Deck and slide types.
//!
//! A [`Deck`] is loaded once at the start of a run and never mutated. It
//! carries the rasterised slides in page order plus, for presentation
//! decks, the narration text found in the speaker notes.

use image::DynamicImage;
use std::path::{Path, PathBuf};

/// How narration for a deck is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckFormat {
    /// `.pptx`: speaker notes are the narration; pages come from the
    /// companion PDF.
    Presentation,
    /// `.pdf`: pages are the deck; narration is generated per page.
    Pdf,
}

impl DeckFormat {
    /// Detect the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pptx" => Some(Self::Presentation),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }
}

/// One page of the deck.
#[derive(Debug, Clone)]
pub struct Slide {
    /// 1-based position in the deck.
    pub index: usize,
    /// Rasterised page.
    pub image: DynamicImage,
    /// Raw narration candidate (speaker note), before the decision policy.
    pub narration: Option<String>,
}

/// An ordered, immutable sequence of slides from one source file.
#[derive(Debug, Clone)]
pub struct Deck {
    /// Path of the file the run was started with.
    pub path: PathBuf,
    pub format: DeckFormat,
    /// Namespace for the output tree.
    pub project_name: String,
    pub slides: Vec<Slide>,
}

impl Deck {
    /// Assemble a deck from page images and per-slide narration candidates.
    ///
    /// Slides are numbered from 1 in image order. `notes[i]` belongs to
    /// slide `i + 1`; slides beyond the end of `notes` get no narration.
    pub fn new(
        path: impl Into<PathBuf>,
        format: DeckFormat,
        images: Vec<DynamicImage>,
        notes: &[Option<String>],
    ) -> Self {
        let path = path.into();
        let project_name = project_name(&path);
        let slides = images
            .into_iter()
            .enumerate()
            .map(|(i, image)| Slide {
                index: i + 1,
                image,
                narration: crate::narration::note_for_slide(notes, i + 1).map(str::to_string),
            })
            .collect();

        Self {
            path,
            format,
            project_name,
            slides,
        }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

/// Project name for a deck: the file stem, or `presentation` if there is none.
pub fn project_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "presentation".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn blank(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255])))
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(
            DeckFormat::from_path(Path::new("talks/Intro.PPTX")),
            Some(DeckFormat::Presentation)
        );
        assert_eq!(DeckFormat::from_path(Path::new("a.pdf")), Some(DeckFormat::Pdf));
        assert_eq!(DeckFormat::from_path(Path::new("a.key")), None);
        assert_eq!(DeckFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn project_name_is_file_stem() {
        assert_eq!(project_name(Path::new("slides/q3-review.pptx")), "q3-review");
        assert_eq!(project_name(Path::new("deck.tar.pdf")), "deck.tar");
    }

    #[test]
    fn slides_are_one_based_and_aligned_with_notes() {
        let notes = vec![Some("one".to_string()), None];
        let deck = Deck::new(
            "talk.pptx",
            DeckFormat::Presentation,
            vec![blank(4, 4), blank(4, 4), blank(4, 4)],
            &notes,
        );
        assert_eq!(deck.len(), 3);
        assert_eq!(deck.project_name, "talk");
        let indices: Vec<usize> = deck.slides.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert_eq!(deck.slides[0].narration.as_deref(), Some("one"));
        assert_eq!(deck.slides[1].narration, None);
        assert_eq!(deck.slides[2].narration, None);
    }
}
