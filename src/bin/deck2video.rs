//! CLI binary for edgequake-deck2video.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `PipelineConfig` and prints results.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use edgequake_deck2video::{
    generate_video, Credentials, PipelineConfig, ProgressCallback, RunProgressCallback, Settings,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: one bar for the deck plus a log line per finished slide.
struct CliProgressCallback {
    bar: ProgressBar,
    slide_started: Mutex<Option<Instant>>,
    narrated: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(SPINNER);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Loading deck…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            slide_started: Mutex::new(None),
            narrated: AtomicUsize::new(0),
        })
    }
}

impl RunProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_slides: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} slides  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(SPINNER);

        self.bar.set_length(total_slides as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Rendering");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Building video from {total_slides} slides…"))
        ));
    }

    fn on_slide_start(&self, slide: usize, _total: usize) {
        if let Ok(mut started) = self.slide_started.lock() {
            *started = Some(Instant::now());
        }
        self.bar.set_message(format!("slide {slide}"));
    }

    fn on_slide_complete(&self, slide: usize, total: usize, narrated: bool, duration_secs: f64) {
        let elapsed = self
            .slide_started
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        if narrated {
            self.narrated.fetch_add(1, Ordering::SeqCst);
        }

        self.bar.println(format!(
            "  {} Slide {:>3}/{:<3}  {:<9}  {:>6}  {}",
            green("✓"),
            slide,
            total,
            if narrated { "narrated" } else { "silent" },
            dim(&format!("{duration_secs:.1}s")),
            dim(&format!("took {elapsed:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, total_slides: usize, final_video: &Path) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} slides ({} narrated)  →  {}",
            green("✔"),
            bold(&total_slides.to_string()),
            self.narrated.load(Ordering::SeqCst),
            bold(&final_video.display().to_string()),
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Narrate a PowerPoint deck from its speaker notes
  # (pages come from slides/pdf/talk.pdf)
  deck2video talk.pptx

  # Let the model write the narration for each page of a PDF
  deck2video lecture.pdf

  # Custom prompts and output location
  deck2video --config my-prompts.yaml --output-dir videos lecture.pdf

  # Machine-readable run report
  deck2video --json talk.pptx > report.json

OUTPUT:
  output/<deck>/txt/slide_001_script.txt   narration text
  output/<deck>/wav/slide_001_audio.wav    synthesized speech (24 kHz mono)
  output/<deck>/mp4/slide_001_video.mp4    per-slide clip
  output/<deck>/<deck>.mp4                 final video

ENVIRONMENT VARIABLES:
  ANTHROPIC_API_KEY       Anthropic API key (script generation)
  GOOGLE_API_KEY          Google API key (Gemini text-to-speech)
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  RUST_LOG                Override the log filter

  Variables may also be placed in a .env file in the working directory.

REQUIREMENTS:
  ffmpeg and ffprobe on PATH (or --ffmpeg / --ffprobe)
"#;

/// Turn slide decks into narrated videos.
#[derive(Parser, Debug)]
#[command(
    name = "deck2video",
    version,
    about = "Turn slide decks into narrated videos",
    long_about = "Turn a .pptx deck (narrated from its speaker notes) or a .pdf deck \
(narrated by an LLM-written script per page) into a single mp4: one still clip per slide, \
with Gemini text-to-speech audio or a short silence, joined in slide order.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Deck to convert: a .pptx or a .pdf file.
    input: PathBuf,

    /// Settings document (prompts, models, voice).
    #[arg(long, env = "DECK2VIDEO_CONFIG", default_value = "prompts.yaml")]
    config: PathBuf,

    /// Root of the output tree.
    #[arg(long, env = "DECK2VIDEO_OUTPUT_DIR", default_value = "output")]
    output_dir: PathBuf,

    /// Directory holding the PDF export of a .pptx deck.
    #[arg(long, env = "DECK2VIDEO_COMPANION_DIR", default_value = "slides/pdf")]
    companion_dir: PathBuf,

    /// ffmpeg executable.
    #[arg(long, env = "DECK2VIDEO_FFMPEG", default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// ffprobe executable.
    #[arg(long, env = "DECK2VIDEO_FFPROBE", default_value = "ffprobe")]
    ffprobe: PathBuf,

    /// Rendering DPI (72–600).
    #[arg(long, env = "DECK2VIDEO_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Length in seconds of a clip for a slide without narration.
    #[arg(long, env = "DECK2VIDEO_SILENT_DURATION", default_value_t = 3.0)]
    silent_duration: f64,

    /// Print the run report as JSON on stdout.
    #[arg(long, env = "DECK2VIDEO_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "DECK2VIDEO_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DECK2VIDEO_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DECK2VIDEO_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{} {:#}", red("✘"), err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // A missing .env is normal; keys may already be in the environment.
    let _ = dotenvy::dotenv();
    let cli = parse_cli();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs unless --verbose is given.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Preconditions ────────────────────────────────────────────────────
    Credentials::from_env().context("Missing API credentials")?;

    let settings = Settings::load(&cli.config)
        .with_context(|| format!("Failed to load settings from {}", cli.config.display()))?;

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn RunProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, settings, progress_cb)?;

    // ── Run ──────────────────────────────────────────────────────────────
    let output = generate_video(&cli.input, &config)
        .await
        .with_context(|| format!("Failed to generate video from {}", cli.input.display()))?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet && !show_progress {
        eprintln!(
            "{}  {} slides ({} narrated, {} silent)  {:.1}s of video  {}ms",
            green("✔"),
            output.stats.total_slides,
            output.stats.narrated_slides,
            output.stats.silent_slides,
            output.stats.video_duration_secs,
            output.stats.elapsed_ms,
        );
        eprintln!("   {}", bold(&output.final_video.display().to_string()));
    }

    Ok(())
}

/// Parse the command line; usage errors exit with status 1 like every other
/// failure, help and version exit with 0.
fn parse_cli() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            std::process::exit(code);
        }
    }
}

/// Map CLI args to `PipelineConfig`.
fn build_config(
    cli: &Cli,
    settings: Settings,
    progress: Option<ProgressCallback>,
) -> Result<PipelineConfig> {
    let mut builder = PipelineConfig::builder()
        .output_root(&cli.output_dir)
        .companion_dir(&cli.companion_dir)
        .ffmpeg(&cli.ffmpeg)
        .ffprobe(&cli.ffprobe)
        .dpi(cli.dpi)
        .silent_duration_secs(cli.silent_duration)
        .settings(settings);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
