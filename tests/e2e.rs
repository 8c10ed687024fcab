//! End-to-end tests for edgequake-deck2video.
//!
//! The live tests render real decks from `./test_cases/` with pdfium and call
//! the Anthropic and Gemini APIs. They are gated behind `E2E_ENABLED` so they
//! do not run in CI unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture

use edgequake_deck2video::{generate_video, load_deck, DeckFormat, PipelineConfig, Settings};
use std::path::PathBuf;

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn test_cases_dir() -> PathBuf {
    repo_root().join("test_cases")
}

/// Skip this test if E2E_ENABLED is not set *or* no file at `path`.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP — test file not found: {}", p.display());
            return;
        }
        p
    }};
}

#[test]
fn shipped_settings_document_loads() {
    let settings = Settings::load(repo_root().join("prompts.yaml")).unwrap();
    assert_eq!(settings, Settings::default());
}

#[tokio::test]
async fn test_load_pdf_deck() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));

    let config = PipelineConfig::builder().dpi(72).build().unwrap();
    let deck = load_deck(&path, &config).await.expect("deck should load");
    assert_eq!(deck.format, DeckFormat::Pdf);
    assert!(!deck.is_empty());
    assert_eq!(deck.slides[0].index, 1);
    assert!(deck.slides.iter().all(|s| s.narration.is_none()));
}

#[tokio::test]
async fn test_load_pptx_deck_with_companion() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.pptx"));

    let config = PipelineConfig::builder()
        .companion_dir(test_cases_dir())
        .dpi(72)
        .build()
        .unwrap();
    let deck = load_deck(&path, &config).await.expect("deck should load");
    assert_eq!(deck.format, DeckFormat::Presentation);
    assert_eq!(deck.project_name, "sample");
    println!(
        "{} slides, {} with notes",
        deck.len(),
        deck.slides.iter().filter(|s| s.narration.is_some()).count()
    );
}

#[tokio::test]
async fn test_generate_pdf_video_live() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));
    if std::env::var("ANTHROPIC_API_KEY").is_err() || std::env::var("GOOGLE_API_KEY").is_err() {
        println!("SKIP — ANTHROPIC_API_KEY and GOOGLE_API_KEY must be set");
        return;
    }

    let out = tempfile::tempdir().unwrap();
    let config = PipelineConfig::builder()
        .output_root(out.path())
        .dpi(100)
        .settings(Settings::load(repo_root().join("prompts.yaml")).unwrap())
        .build()
        .unwrap();

    let output = generate_video(&path, &config).await.expect("run should succeed");
    assert!(output.final_video.is_file());
    assert_eq!(output.stats.silent_slides, 0);
    for slide in &output.slides {
        let script = std::fs::read_to_string(slide.script_path.as_ref().unwrap()).unwrap();
        assert!(!script.trim().is_empty());
        assert!(!script.contains("**"), "script contains markdown: {script}");
    }
}
