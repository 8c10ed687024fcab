//! Thin async wrapper over the `ffmpeg` and `ffprobe` executables.
//!
//! Both tools are spawned with `tokio::process::Command` and their output is
//! captured. A spawn failure (binary missing, not executable) maps to
//! [`Deck2VideoError::ToolUnavailable`]; non-zero exits are returned to the
//! caller with stderr so each stage can raise its own error kind.

use crate::error::Deck2VideoError;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::debug;

/// Locations of the media tools used by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTool {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for MediaTool {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

impl MediaTool {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// Run ffmpeg with `args`, capturing stdout and stderr.
    pub async fn ffmpeg<I, S>(&self, args: I) -> Result<Output, Deck2VideoError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        run(&self.ffmpeg, args).await
    }

    /// Duration in seconds of a media file, as reported by ffprobe.
    pub async fn probe_duration(&self, path: &Path) -> Result<f64, Deck2VideoError> {
        let mut args: Vec<&OsStr> = [
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ]
        .into_iter()
        .map(OsStr::new)
        .collect();
        args.push(path.as_os_str());

        let output = run(&self.ffprobe, args).await?;
        if !output.status.success() {
            return Err(Deck2VideoError::ProbeFailed {
                path: path.to_path_buf(),
                detail: format!(
                    "ffprobe exited with {:?}: {}",
                    output.status.code(),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let duration = parse_duration(&stdout).ok_or_else(|| Deck2VideoError::ProbeFailed {
            path: path.to_path_buf(),
            detail: format!("unparseable duration '{}'", stdout.trim()),
        })?;
        debug!("Probed {}: {:.3}s", path.display(), duration);
        Ok(duration)
    }

    /// True if both tools can be spawned and answer `-version`.
    pub async fn is_available(&self) -> bool {
        for tool in [&self.ffmpeg, &self.ffprobe] {
            match run(tool, ["-version"]).await {
                Ok(out) if out.status.success() => {}
                _ => return false,
            }
        }
        true
    }
}

async fn run<I, S>(tool: &Path, args: I) -> Result<Output, Deck2VideoError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(tool);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    debug!("Running {:?}", cmd.as_std());

    cmd.output()
        .await
        .map_err(|e| Deck2VideoError::ToolUnavailable {
            tool: tool.display().to_string(),
            detail: e.to_string(),
        })
}

/// Parse ffprobe's bare `format=duration` value.
///
/// Returns None for empty output, `N/A`, or a negative / non-finite number.
pub fn parse_duration(stdout: &str) -> Option<f64> {
    let value: f64 = stdout.lines().next()?.trim().parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Last `max_lines` lines of ffmpeg stderr; the banner and stream dump
/// before the actual error are noise in an error message.
pub fn stderr_tail(stderr: &[u8], max_lines: usize) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_probe_output() {
        assert_eq!(parse_duration("4.520000\n"), Some(4.52));
        assert_eq!(parse_duration("3"), Some(3.0));
        assert_eq!(parse_duration("N/A\n"), None);
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("-1.0"), None);
    }

    #[test]
    fn stderr_tail_keeps_last_lines() {
        let stderr = b"ffmpeg version 7\n  built with gcc\n\nInput #0\nError opening output\n";
        assert_eq!(stderr_tail(stderr, 2), "Input #0\nError opening output");
        assert_eq!(stderr_tail(b"", 5), "");
    }

    #[tokio::test]
    async fn missing_binary_is_tool_unavailable() {
        let tool = MediaTool::new("/nonexistent/ffmpeg-xyz", "/nonexistent/ffprobe-xyz");
        let err = tool.ffmpeg(["-version"]).await.unwrap_err();
        assert!(matches!(err, Deck2VideoError::ToolUnavailable { .. }));

        let err = tool.probe_duration(Path::new("a.wav")).await.unwrap_err();
        assert_eq!(err.kind(), "tool_unavailable");
        assert!(!tool.is_available().await);
    }
}
