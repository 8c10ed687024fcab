//! Per-slide clip encoding: one still image held for the length of its
//! audio track.
//!
//! libx264 with `yuv420p` rejects odd frame dimensions, so the slide is
//! first resized (Lanczos) to the nearest even width and height at or below
//! the original and written to a temporary PNG. The temp file is removed
//! when it goes out of scope, on success and on error alike.
//!
//! Narrated clips take their length from the WAV (probed with ffprobe).
//! Silent clips get a generated silent track of the configured length.

use crate::error::Deck2VideoError;
use crate::pipeline::media::{stderr_tail, MediaTool};
use image::imageops::FilterType;
use image::DynamicImage;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, error, info};

/// Silent audio source for slides without narration.
pub const SILENT_AUDIO_SOURCE: &str = "anullsrc=channel_layout=mono:sample_rate=48000";

/// Audio track of a clip.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipAudio {
    /// A synthesized narration file; the clip lasts as long as it does.
    Narrated(PathBuf),
    /// No narration; a silent track of the given length in seconds.
    Silent(f64),
}

/// Nearest even dimensions at or below `(width, height)`, never below 2.
pub fn even_dimensions(width: u32, height: u32) -> (u32, u32) {
    fn even(n: u32) -> u32 {
        (n - n % 2).max(2)
    }
    (even(width), even(height))
}

/// Write `image` as a PNG with even dimensions to a temp file in `dir`.
pub fn prepare_frame(image: &DynamicImage, dir: &Path) -> Result<NamedTempFile, Deck2VideoError> {
    let (w, h) = even_dimensions(image.width(), image.height());
    let resized;
    let frame = if (w, h) != (image.width(), image.height()) {
        debug!(
            "Resizing frame {}x{} → {}x{}",
            image.width(),
            image.height(),
            w,
            h
        );
        resized = image.resize_exact(w, h, FilterType::Lanczos3);
        &resized
    } else {
        image
    };

    let write_err = |source: std::io::Error| Deck2VideoError::OutputWriteFailed {
        path: dir.to_path_buf(),
        source,
    };
    let mut tmp = tempfile::Builder::new()
        .prefix("frame_")
        .suffix(".png")
        .tempfile_in(dir)
        .map_err(write_err)?;
    frame
        .write_to(tmp.as_file_mut(), image::ImageFormat::Png)
        .map_err(|e| write_err(std::io::Error::other(e.to_string())))?;
    Ok(tmp)
}

/// ffmpeg arguments for one clip.
pub fn encode_args(frame: &Path, audio: &ClipAudio, duration_secs: f64, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-y".into(), "-loop".into(), "1".into(), "-i".into(), frame.into()];
    match audio {
        ClipAudio::Narrated(wav) => {
            args.extend(["-i".into(), wav.into()]);
        }
        ClipAudio::Silent(_) => {
            args.extend(["-f".into(), "lavfi".into(), "-i".into(), SILENT_AUDIO_SOURCE.into()]);
        }
    }
    args.extend(
        [
            "-c:v",
            "libx264",
            "-c:a",
            "aac",
            "-t",
            &format!("{:.3}", duration_secs),
            "-pix_fmt",
            "yuv420p",
            "-r",
            "1",
            "-shortest",
        ]
        .map(OsString::from),
    );
    args.push(output.into());
    args
}

/// Encode the clip for one slide and return its duration in seconds.
pub async fn build_clip(
    tool: &MediaTool,
    image: &DynamicImage,
    audio: &ClipAudio,
    output: &Path,
) -> Result<f64, Deck2VideoError> {
    let duration = match audio {
        ClipAudio::Narrated(wav) => tool.probe_duration(wav).await?,
        ClipAudio::Silent(secs) => *secs,
    };

    let frame_dir = output.parent().unwrap_or_else(|| Path::new("."));
    let frame = prepare_frame(image, frame_dir)?;

    let args = encode_args(frame.path(), audio, duration, output);
    let result = tool.ffmpeg(&args).await?;
    drop(frame);

    if !result.status.success() {
        let stderr = stderr_tail(&result.stderr, 20);
        error!("Error creating video {}: {}", output.display(), stderr);
        return Err(Deck2VideoError::EncodingFailure {
            path: output.to_path_buf(),
            stderr,
        });
    }

    info!("Created video: {} ({:.2}s)", output.display(), duration);
    Ok(duration)
}
