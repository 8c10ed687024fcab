//! Deck loading for both narration strategies.
//!
//! * `.pptx`: the companion PDF is located first (before the archive is
//!   opened), then the speaker notes are read and the companion is rendered.
//! * `.pdf`: the pages are rendered; narration is generated later, per slide.
//!
//! Nothing is written to the output tree here.

use crate::config::PipelineConfig;
use crate::deck::{Deck, DeckFormat};
use crate::error::Deck2VideoError;
use crate::narration::warn_on_count_mismatch;
use crate::pipeline::{input, notes, render};
use std::path::Path;
use tracing::info;

/// Load a deck: validate the path, read narration sources and render pages.
pub async fn load_deck(path: &Path, config: &PipelineConfig) -> Result<Deck, Deck2VideoError> {
    let resolved = input::resolve_deck(path)?;

    match resolved.format {
        DeckFormat::Presentation => {
            let companion = input::locate_companion_pdf(&resolved.path, &config.companion_dir)?;

            let deck_path = resolved.path.clone();
            let slide_notes =
                tokio::task::spawn_blocking(move || notes::extract_speaker_notes(&deck_path))
                    .await
                    .map_err(|e| {
                        Deck2VideoError::Internal(format!("Notes task panicked: {}", e))
                    })??;

            let images = render::render_pages(&companion, config).await?;
            warn_on_count_mismatch(slide_notes.len(), images.len());

            let deck = Deck::new(resolved.path, DeckFormat::Presentation, images, &slide_notes);
            info!(
                "Loaded presentation '{}': {} slides, {} with notes",
                deck.project_name,
                deck.len(),
                deck.slides.iter().filter(|s| s.narration.is_some()).count()
            );
            Ok(deck)
        }
        DeckFormat::Pdf => {
            let images = render::render_pages(&resolved.path, config).await?;
            let deck = Deck::new(resolved.path, DeckFormat::Pdf, images, &[]);
            info!("Loaded PDF '{}': {} pages", deck.project_name, deck.len());
            Ok(deck)
        }
    }
}
