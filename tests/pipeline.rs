//! Integration tests for the run driver.
//!
//! External services are replaced with in-process fakes: the synthesizer
//! returns silent PCM whose length depends on the text, the generator
//! returns a fixed sentence per slide. On unix the driver runs against
//! shell stand-ins for ffmpeg/ffprobe: the ffmpeg stand-in writes its
//! arguments (or, for a concat, the clip list) into the output file, and the
//! ffprobe stand-in derives a WAV duration from the file size. Tests that
//! need the real tools print `SKIP` and return when they are not on `PATH`.

use edgequake_deck2video::pipeline::assemble::assemble;
use edgequake_deck2video::pipeline::clip::{build_clip, ClipAudio, SILENT_AUDIO_SOURCE};
use edgequake_deck2video::pipeline::media::MediaTool;
use edgequake_deck2video::pipeline::speech::SPEECH_SAMPLE_RATE;
use edgequake_deck2video::{
    generate_from_deck, generate_video, Deck, Deck2VideoError, DeckFormat, NarrationKind,
    PipelineConfig, RunProgressCallback, ScriptGenerator, Slide, SpeechSynthesizer,
};
use futures::future::BoxFuture;
use image::{DynamicImage, Rgb, RgbImage};
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// ── Fakes ────────────────────────────────────────────────────────────────────

/// Returns `secs_per_word` seconds of silence per word of input.
struct FakeSynthesizer {
    secs_per_word: f64,
    calls: Mutex<Vec<String>>,
}

impl FakeSynthesizer {
    fn new(secs_per_word: f64) -> Arc<Self> {
        Arc::new(Self {
            secs_per_word,
            calls: Mutex::new(Vec::new()),
        })
    }
}

impl SpeechSynthesizer for FakeSynthesizer {
    fn synthesize<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<u8>, Deck2VideoError>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(text.to_string());
            let words = text.split_whitespace().count() as f64;
            let samples = (words * self.secs_per_word * SPEECH_SAMPLE_RATE as f64) as usize;
            Ok(vec![0u8; samples * 2])
        })
    }
}

/// Writes one sentence per slide; fails on `fail_on` if set.
struct FakeGenerator {
    fail_on: Option<usize>,
}

impl ScriptGenerator for FakeGenerator {
    fn generate<'a>(&'a self, slide: &'a Slide) -> BoxFuture<'a, Result<String, Deck2VideoError>> {
        Box::pin(async move {
            if self.fail_on == Some(slide.index) {
                return Err(Deck2VideoError::ScriptGenerationFailure {
                    slide: slide.index,
                    detail: "model unavailable".into(),
                });
            }
            Ok(format!("This is slide number {}.", slide.index))
        })
    }
}

#[derive(Default)]
struct RecordingProgress {
    events: Mutex<Vec<String>>,
}

impl RunProgressCallback for RecordingProgress {
    fn on_run_start(&self, total_slides: usize) {
        self.events.lock().unwrap().push(format!("start:{total_slides}"));
    }
    fn on_slide_complete(&self, slide: usize, _total: usize, narrated: bool, _secs: f64) {
        self.events
            .lock()
            .unwrap()
            .push(format!("slide:{slide}:{narrated}"));
    }
    fn on_run_complete(&self, total_slides: usize, _final_video: &Path) {
        self.events.lock().unwrap().push(format!("done:{total_slides}"));
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

macro_rules! skip_unless_ffmpeg {
    () => {
        if !MediaTool::default().is_available().await {
            println!("SKIP — ffmpeg/ffprobe not found on PATH");
            return;
        }
    };
}

/// Odd-sized page so the even-dimension resize is exercised.
fn page(shade: u8) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(161, 91, Rgb([shade, shade, 200])))
}

fn deck(format: DeckFormat, notes: &[Option<&str>]) -> Deck {
    let images = (0..notes.len()).map(|i| page(40 * i as u8)).collect();
    let notes: Vec<Option<String>> = notes.iter().map(|n| n.map(str::to_string)).collect();
    Deck::new("/decks/quarterly.pptx", format, images, &notes)
}

/// Stand-in ffmpeg. `-version` succeeds; a concat copies its manifest to
/// the output; any other call writes its arguments, one per line, to the
/// output (the last argument).
#[cfg(unix)]
const FAKE_FFMPEG: &str = r#"#!/bin/sh
[ "$1" = "-version" ] && { echo "ffmpeg stand-in"; exit 0; }
for last; do :; done
prev=""; concat=0; manifest=""
for a; do
  [ "$a" = "concat" ] && concat=1
  [ "$prev" = "-i" ] && [ "$concat" = 1 ] && [ -z "$manifest" ] && manifest="$a"
  prev="$a"
done
if [ -n "$manifest" ]; then cp "$manifest" "$last"; else printf '%s\n' "$@" > "$last"; fi
"#;

/// Stand-in ffprobe: duration of a 24 kHz mono 16-bit WAV from its size.
#[cfg(unix)]
const FAKE_FFPROBE: &str = r#"#!/bin/sh
[ "$1" = "-version" ] && { echo "ffprobe stand-in"; exit 0; }
for last; do :; done
size=$(wc -c < "$last")
awk -v s="$size" 'BEGIN { printf "%.6f\n", (s - 44) / 48000 }'
"#;

/// Paths of the stand-in tools, written once per test binary.
#[cfg(unix)]
fn fake_tools() -> (&'static Path, &'static Path) {
    use once_cell::sync::Lazy;
    use std::os::unix::fs::PermissionsExt;

    static TOOLS: Lazy<(tempfile::TempDir, PathBuf, PathBuf)> = Lazy::new(|| {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, body: &str| {
            let path = dir.path().join(name);
            std::fs::write(&path, body).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        };
        let ffmpeg = write("ffmpeg", FAKE_FFMPEG);
        let ffprobe = write("ffprobe", FAKE_FFPROBE);
        (dir, ffmpeg, ffprobe)
    });
    (&TOOLS.1, &TOOLS.2)
}

/// Config wired to the stand-in tools.
#[cfg(unix)]
fn config(out: &Path, synth: Arc<FakeSynthesizer>) -> edgequake_deck2video::PipelineConfigBuilder {
    let (ffmpeg, ffprobe) = fake_tools();
    PipelineConfig::builder()
        .output_root(out)
        .synthesizer(synth)
        .ffmpeg(ffmpeg)
        .ffprobe(ffprobe)
}

fn lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

/// Value following `flag` in a recorded argument list.
fn arg_after<'a>(args: &'a [String], flag: &str) -> &'a str {
    let i = args.iter().position(|a| a == flag).unwrap();
    &args[i + 1]
}

/// Minimal `.pptx` archive: the zip magic is all that is checked before the
/// companion lookup.
fn write_pptx(path: &Path) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file(
        "ppt/presentation.xml",
        zip::write::SimpleFileOptions::default(),
    )
    .unwrap();
    zip.write_all(b"<p:presentation/>").unwrap();
    zip.finish().unwrap();
}

// ── Tests without external tools ─────────────────────────────────────────────

#[tokio::test]
async fn missing_companion_aborts_before_output_exists() {
    let dir = tempfile::tempdir().unwrap();
    let deck_path = dir.path().join("talk.pptx");
    write_pptx(&deck_path);
    let companion_dir = dir.path().join("slides/pdf");
    std::fs::create_dir_all(&companion_dir).unwrap();
    let out = dir.path().join("output");

    let config = PipelineConfig::builder()
        .output_root(&out)
        .companion_dir(&companion_dir)
        .synthesizer(FakeSynthesizer::new(0.5))
        .build()
        .unwrap();

    let err = generate_video(&deck_path, &config).await.unwrap_err();
    match err {
        Deck2VideoError::MissingCompanionFile { expected } => {
            assert_eq!(expected, companion_dir.join("talk.pdf"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!out.exists(), "no output directory may be created");
}

#[tokio::test]
async fn unsupported_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("talk.key");
    std::fs::write(&path, b"keynote").unwrap();

    let err = generate_video(&path, &PipelineConfig::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "unsupported_input_format");
}

#[tokio::test]
async fn narration_artifacts_precede_clip_failure() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output");
    let synth = FakeSynthesizer::new(0.25);
    let config = PipelineConfig::builder()
        .output_root(&out)
        .synthesizer(synth.clone())
        .ffmpeg("/nonexistent/bin/ffmpeg")
        .ffprobe("/nonexistent/bin/ffprobe")
        .build()
        .unwrap();

    let deck = deck(DeckFormat::Presentation, &[Some("  Welcome to the review.  ")]);
    let err = generate_from_deck(deck, &config).await.unwrap_err();
    assert_eq!(err.kind(), "tool_unavailable");

    // Script and audio for slide 1 were written before the clip stage failed.
    let base = out.join("quarterly");
    let script = std::fs::read_to_string(base.join("txt/slide_001_script.txt")).unwrap();
    assert_eq!(script, "Welcome to the review.");
    let wav = hound::WavReader::open(base.join("wav/slide_001_audio.wav")).unwrap();
    assert_eq!(wav.spec().sample_rate, 24_000);
    assert_eq!(wav.spec().channels, 1);
    assert_eq!(synth.calls.lock().unwrap().as_slice(), ["Welcome to the review."]);
    assert!(!base.join("mp4/slide_001_video.mp4").exists());
}

// ── Driver tests against the stand-in tools ─────────────────────────────────

#[cfg(unix)]
#[tokio::test]
async fn notes_deck_produces_one_clip_per_slide() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output");
    let synth = FakeSynthesizer::new(0.5);
    let progress = Arc::new(RecordingProgress::default());
    let config = config(&out, synth.clone())
        .progress_callback(progress.clone())
        .build()
        .unwrap();

    // 4 slides, 2 with usable notes ("Hello there" = 2 words = 1.0 s).
    let deck = deck(
        DeckFormat::Presentation,
        &[Some("Hello there"), None, Some("   "), Some("Goodbye for now")],
    );
    let output = generate_from_deck(deck, &config).await.unwrap();

    assert_eq!(output.project_name, "quarterly");
    assert_eq!(output.slides.len(), 4);
    let kinds: Vec<NarrationKind> = output.slides.iter().map(|s| s.narration).collect();
    assert_eq!(
        kinds,
        [
            NarrationKind::Note,
            NarrationKind::Silent,
            NarrationKind::Silent,
            NarrationKind::Note
        ]
    );

    // Narrated clips last as long as their audio; silent ones 3.0 s.
    assert!((output.slides[0].duration_secs - 1.0).abs() < 0.01);
    assert_eq!(output.slides[1].duration_secs, 3.0);
    assert_eq!(output.slides[2].duration_secs, 3.0);
    assert!((output.slides[3].duration_secs - 1.5).abs() < 0.01);
    assert!((output.stats.video_duration_secs - 8.5).abs() < 0.02);

    let base = out.join("quarterly");
    let narrated = lines(&base.join("mp4/slide_001_video.mp4"));
    assert!(arg_after(&narrated, "-i").ends_with(".png"));
    assert!(narrated.contains(&base.join("wav/slide_001_audio.wav").display().to_string()));
    assert_eq!(arg_after(&narrated, "-t"), "1.000");
    assert!(!narrated.iter().any(|a| a.contains("anullsrc")));

    for silent_clip in ["mp4/slide_002_video.mp4", "mp4/slide_003_video.mp4"] {
        let silent = lines(&base.join(silent_clip));
        assert_eq!(arg_after(&silent, "lavfi"), "-i");
        assert!(silent.iter().any(|a| a == SILENT_AUDIO_SOURCE));
        assert_eq!(arg_after(&silent, "-t"), "3.000");
    }

    assert!(base.join("txt/slide_001_script.txt").is_file());
    assert!(!base.join("txt/slide_002_script.txt").exists());
    assert!(!base.join("wav/slide_003_audio.wav").exists());
    assert!(base.join("wav/slide_004_audio.wav").is_file());
    assert_eq!(
        synth.calls.lock().unwrap().as_slice(),
        ["Hello there", "Goodbye for now"]
    );

    // The final video is the concat of the four clips in slide order.
    assert_eq!(output.final_video, base.join("quarterly.mp4"));
    let expected: Vec<String> = (1..=4)
        .map(|i| format!("file '{}'", base.join(format!("mp4/slide_{i:03}_video.mp4")).display()))
        .collect();
    assert_eq!(lines(&output.final_video), expected);

    // No temp frames or manifests left behind.
    let leftovers: Vec<PathBuf> = walk(&base)
        .into_iter()
        .filter(|p| p.extension().is_some_and(|e| e == "png" || e == "txt"))
        .filter(|p| !p.starts_with(base.join("txt")))
        .collect();
    assert!(leftovers.is_empty(), "leftover temp files: {leftovers:?}");

    assert_eq!(
        progress.events.lock().unwrap().as_slice(),
        [
            "start:4",
            "slide:1:true",
            "slide:2:false",
            "slide:3:false",
            "slide:4:true",
            "done:4"
        ]
    );
    assert_eq!(output.stats.narrated_slides, 2);
    assert_eq!(output.stats.silent_slides, 2);
}

#[cfg(unix)]
#[tokio::test]
async fn pdf_deck_narrates_every_page() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output");
    let synth = FakeSynthesizer::new(0.2);
    let config = config(&out, synth.clone())
        .script_generator(Arc::new(FakeGenerator { fail_on: None }))
        .build()
        .unwrap();

    let deck = deck(DeckFormat::Pdf, &[None, None]);
    let output = generate_from_deck(deck, &config).await.unwrap();

    assert!(output
        .slides
        .iter()
        .all(|s| s.narration == NarrationKind::Generated));
    assert_eq!(output.stats.generated_scripts, 2);
    assert_eq!(output.stats.silent_slides, 0);
    let script =
        std::fs::read_to_string(out.join("quarterly/txt/slide_002_script.txt")).unwrap();
    assert_eq!(script, "This is slide number 2.");
    assert_eq!(synth.calls.lock().unwrap().len(), 2);

    // "This is slide number 2." is 5 words at 0.2 s each.
    assert!((output.slides[1].duration_secs - 1.0).abs() < 0.01);
    let clip = lines(&out.join("quarterly/mp4/slide_002_video.mp4"));
    assert_eq!(arg_after(&clip, "-t"), "1.000");
}

#[cfg(unix)]
#[tokio::test]
async fn generation_failure_keeps_earlier_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output");
    let config = config(&out, FakeSynthesizer::new(0.2))
        .script_generator(Arc::new(FakeGenerator { fail_on: Some(2) }))
        .build()
        .unwrap();

    let deck = deck(DeckFormat::Pdf, &[None, None, None]);
    let err = generate_from_deck(deck, &config).await.unwrap_err();
    assert!(matches!(
        err,
        Deck2VideoError::ScriptGenerationFailure { slide: 2, .. }
    ));

    let base = out.join("quarterly");
    assert!(base.join("txt/slide_001_script.txt").is_file());
    assert!(base.join("wav/slide_001_audio.wav").is_file());
    assert!(base.join("mp4/slide_001_video.mp4").is_file());
    assert!(!base.join("txt/slide_002_script.txt").exists());
    assert!(!base.join("mp4/slide_002_video.mp4").exists());
    assert!(!base.join("mp4/slide_003_video.mp4").exists());
    assert!(!base.join("quarterly.mp4").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn rerun_overwrites_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output");
    let config = config(&out, FakeSynthesizer::new(0.5)).build().unwrap();

    generate_from_deck(
        deck(DeckFormat::Presentation, &[Some("first run"), None]),
        &config,
    )
    .await
    .unwrap();
    let output = generate_from_deck(
        deck(DeckFormat::Presentation, &[Some("second run here"), None]),
        &config,
    )
    .await
    .unwrap();

    let base = out.join("quarterly");
    let script = std::fs::read_to_string(base.join("txt/slide_001_script.txt")).unwrap();
    assert_eq!(script, "second run here");
    assert!((output.slides[0].duration_secs - 1.5).abs() < 0.01);
    let clip = lines(&base.join("mp4/slide_001_video.mp4"));
    assert_eq!(arg_after(&clip, "-t"), "1.500");
    assert_eq!(lines(&output.final_video).len(), 2);
}

// ── Tests with the real ffmpeg ───────────────────────────────────────────────

#[tokio::test]
async fn real_tools_encode_playable_video() {
    skip_unless_ffmpeg!();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output");
    let config = PipelineConfig::builder()
        .output_root(&out)
        .synthesizer(FakeSynthesizer::new(0.5))
        .build()
        .unwrap();

    let deck = deck(DeckFormat::Presentation, &[Some("Hello there"), None]);
    let output = generate_from_deck(deck, &config).await.unwrap();

    let tool = MediaTool::default();
    let silent = tool
        .probe_duration(&out.join("quarterly/mp4/slide_002_video.mp4"))
        .await
        .unwrap();
    assert!((silent - 3.0).abs() < 1.1, "silent clip lasted {silent}s");
    let total = tool.probe_duration(&output.final_video).await.unwrap();
    assert!(total > 3.0, "final video lasted {total}s");
}

/// Colour of the centre pixel of the first frame of `video`.
async fn first_frame_colour(tool: &MediaTool, video: &Path, dir: &Path) -> Rgb<u8> {
    let frame = dir.join(format!(
        "{}_first.png",
        video.file_stem().unwrap().to_string_lossy()
    ));
    let args: [&OsStr; 6] = [
        OsStr::new("-y"),
        OsStr::new("-i"),
        video.as_os_str(),
        OsStr::new("-frames:v"),
        OsStr::new("1"),
        frame.as_os_str(),
    ];
    let result = tool.ffmpeg(args).await.unwrap();
    assert!(result.status.success());
    let img = image::open(&frame).unwrap().to_rgb8();
    *img.get_pixel(img.width() / 2, img.height() / 2)
}

#[tokio::test]
async fn concatenation_follows_clip_order() {
    skip_unless_ffmpeg!();

    let dir = tempfile::tempdir().unwrap();
    let tool = MediaTool::default();
    let solid = |c: [u8; 3]| DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 48, Rgb(c)));

    let red = dir.path().join("red.mp4");
    let blue = dir.path().join("blue.mp4");
    build_clip(&tool, &solid([220, 20, 20]), &ClipAudio::Silent(1.0), &red)
        .await
        .unwrap();
    build_clip(&tool, &solid([20, 20, 220]), &ClipAudio::Silent(1.0), &blue)
        .await
        .unwrap();

    let red_first = dir.path().join("red_blue.mp4");
    let blue_first = dir.path().join("blue_red.mp4");
    assemble(&tool, &[red.clone(), blue.clone()], dir.path(), &red_first)
        .await
        .unwrap();
    assemble(&tool, &[blue, red], dir.path(), &blue_first)
        .await
        .unwrap();

    let a = first_frame_colour(&tool, &red_first, dir.path()).await;
    assert!(a[0] > 150 && a[2] < 100, "expected red first, got {a:?}");
    let b = first_frame_colour(&tool, &blue_first, dir.path()).await;
    assert!(b[2] > 150 && b[0] < 100, "expected blue first, got {b:?}");
}

fn walk(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(walk(&path));
            } else {
                files.push(path);
            }
        }
    }
    files
}
