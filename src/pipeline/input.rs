//! Input resolution: validate the deck path and locate its page source.
//!
//! A `.pdf` deck is its own page source. A `.pptx` deck carries only the
//! speaker notes; its pages are rendered from a companion PDF found by
//! convention at `<companion_dir>/<deck_basename>.pdf`. Magic bytes are
//! checked here so callers get a meaningful error rather than a pdfium or
//! zip failure deep inside a stage.

use crate::deck::DeckFormat;
use crate::error::Deck2VideoError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A deck path that exists, is readable and has a supported format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDeck {
    pub path: PathBuf,
    pub format: DeckFormat,
}

/// Validate the user-supplied deck path.
pub fn resolve_deck(input: impl AsRef<Path>) -> Result<ResolvedDeck, Deck2VideoError> {
    let path = input.as_ref().to_path_buf();

    if !path.exists() {
        return Err(Deck2VideoError::FileNotFound { path });
    }

    let format =
        DeckFormat::from_path(&path).ok_or_else(|| Deck2VideoError::UnsupportedInputFormat {
            extension: path
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_else(|| "(none)".to_string()),
            path: path.clone(),
        })?;

    let magic = read_magic(&path)?;
    match format {
        DeckFormat::Pdf => check_pdf_magic(&path, magic)?,
        DeckFormat::Presentation => {
            if &magic != b"PK\x03\x04" {
                return Err(Deck2VideoError::DeckParseFailed {
                    path,
                    detail: "not a zip archive (expected an Office Open XML .pptx)".into(),
                });
            }
        }
    }

    debug!("Resolved {:?} deck: {}", format, path.display());
    Ok(ResolvedDeck { path, format })
}

/// Expected companion PDF path for a presentation deck.
pub fn companion_pdf_path(deck: &Path, companion_dir: &Path) -> PathBuf {
    let base_name = crate::deck::project_name(deck);
    companion_dir.join(format!("{base_name}.pdf"))
}

/// Locate and validate the companion PDF of a presentation deck.
pub fn locate_companion_pdf(
    deck: &Path,
    companion_dir: &Path,
) -> Result<PathBuf, Deck2VideoError> {
    let expected = companion_pdf_path(deck, companion_dir);
    if !expected.is_file() {
        return Err(Deck2VideoError::MissingCompanionFile { expected });
    }
    let magic = read_magic(&expected)?;
    check_pdf_magic(&expected, magic)?;

    info!("Found companion PDF: {}", expected.display());
    Ok(expected)
}

fn read_magic(path: &Path) -> Result<[u8; 4], Deck2VideoError> {
    let mut file = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Deck2VideoError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => Deck2VideoError::DeckParseFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        },
    })?;
    let mut magic = [0u8; 4];
    // Files shorter than four bytes keep zeroes and fail the magic check.
    let _ = file.read(&mut magic);
    Ok(magic)
}

fn check_pdf_magic(path: &Path, magic: [u8; 4]) -> Result<(), Deck2VideoError> {
    if &magic != b"%PDF" {
        return Err(Deck2VideoError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }
    Ok(())
}
