//! Final assembly: join the slide clips, in slide order, with the ffmpeg
//! concat demuxer and stream copy (no re-encode).
//!
//! Every clip is produced by the same encoder settings, which is what lets
//! `-c copy` work. The manifest is a temp file in the project directory and
//! is removed whether or not ffmpeg succeeds.

use crate::error::Deck2VideoError;
use crate::pipeline::media::{stderr_tail, MediaTool};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Concat-demuxer manifest: one `file '<absolute path>'` line per clip.
///
/// Single quotes inside a path are written as `'\''`.
pub fn concat_manifest(clips: &[PathBuf]) -> Result<String, std::io::Error> {
    let mut out = String::new();
    for clip in clips {
        let abs = std::path::absolute(clip)?;
        let escaped = abs.to_string_lossy().replace('\'', r"'\''");
        out.push_str(&format!("file '{}'\n", escaped));
    }
    Ok(out)
}

/// ffmpeg arguments for the concat step.
pub fn concat_args(manifest: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-y", "-f", "concat", "-safe", "0", "-i"]
        .map(OsString::from)
        .to_vec();
    args.push(manifest.into());
    args.extend(["-c", "copy"].map(OsString::from));
    args.push(output.into());
    args
}

/// Concatenate `clips` into `output`, using `work_dir` for the manifest.
pub async fn assemble(
    tool: &MediaTool,
    clips: &[PathBuf],
    work_dir: &Path,
    output: &Path,
) -> Result<(), Deck2VideoError> {
    let concat_err = |stderr: String| Deck2VideoError::ConcatenationFailure {
        path: output.to_path_buf(),
        stderr,
    };
    if clips.is_empty() {
        return Err(concat_err("no clips to concatenate".into()));
    }

    let write_err = |source: std::io::Error| Deck2VideoError::OutputWriteFailed {
        path: work_dir.to_path_buf(),
        source,
    };
    let contents = concat_manifest(clips).map_err(write_err)?;
    let mut manifest = tempfile::Builder::new()
        .prefix("input_list_")
        .suffix(".txt")
        .tempfile_in(work_dir)
        .map_err(write_err)?;
    manifest
        .write_all(contents.as_bytes())
        .and_then(|_| manifest.flush())
        .map_err(write_err)?;

    info!("Concatenating {} clips into {}", clips.len(), output.display());
    let result = tool.ffmpeg(&concat_args(manifest.path(), output)).await?;
    drop(manifest);

    if !result.status.success() {
        let stderr = stderr_tail(&result.stderr, 20);
        error!("Error combining videos: {}", stderr);
        return Err(concat_err(stderr));
    }

    info!("Final video created: {}", output.display());
    Ok(())
}
