//! Speech synthesis: narration text → 24 kHz mono 16-bit WAV.
//!
//! The Gemini TTS endpoint answers a `generateContent` request with
//! `responseModalities: ["AUDIO"]` by returning base64 raw PCM
//! (signed 16-bit little-endian, 24000 Hz, one channel) in the first
//! candidate's `inlineData`. The PCM has no header, so it is wrapped in a
//! WAV container with explicit format fields before it is written.
//!
//! Any failure (transport, HTTP status, missing or undecodable audio) is a
//! [`Deck2VideoError::SynthesisFailure`] and aborts the run.

use crate::config::TtsSettings;
use crate::error::Deck2VideoError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info};

/// Sample rate of synthesized speech.
pub const SPEECH_SAMPLE_RATE: u32 = 24_000;
/// Channels of synthesized speech.
pub const SPEECH_CHANNELS: u16 = 1;
/// Bits per sample of synthesized speech.
pub const SPEECH_BITS_PER_SAMPLE: u16 = 16;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Converts text into raw PCM (s16le, [`SPEECH_SAMPLE_RATE`], mono).
pub trait SpeechSynthesizer: Send + Sync {
    fn synthesize<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<u8>, Deck2VideoError>>;
}

/// Gemini TTS client using a single prebuilt voice.
pub struct GeminiSynthesizer {
    client: reqwest::Client,
    api_key: String,
    settings: TtsSettings,
    base_url: String,
}

impl GeminiSynthesizer {
    pub fn new(api_key: impl Into<String>, settings: TtsSettings) -> Result<Self, Deck2VideoError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Deck2VideoError::SynthesisFailure {
                detail: format!("HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            settings,
            base_url: GEMINI_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different API root (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build a client from `GOOGLE_API_KEY`.
    pub fn from_env(settings: TtsSettings) -> Result<Self, Deck2VideoError> {
        let key = crate::credentials::require_env(
            crate::credentials::GOOGLE_API_KEY,
            "Needed for speech synthesis.",
        )?;
        Self::new(key, settings)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.settings.model
        )
    }
}

impl SpeechSynthesizer for GeminiSynthesizer {
    fn synthesize<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<u8>, Deck2VideoError>> {
        Box::pin(async move {
            info!("Converting text to speech: {} characters", text.chars().count());
            let fail = |detail: String| {
                error!("Text-to-speech failed: {}", detail);
                Deck2VideoError::SynthesisFailure { detail }
            };

            let request = TtsRequest::new(text, &self.settings.voice_name);
            let response = self
                .client
                .post(self.endpoint())
                .header("x-goog-api-key", &self.api_key)
                .json(&request)
                .send()
                .await
                .map_err(|e| fail(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(fail(format!("HTTP {status}: {}", truncate(&body, 300))));
            }

            let body: TtsResponse = response
                .json()
                .await
                .map_err(|e| fail(format!("malformed response: {e}")))?;
            extract_pcm(body).map_err(fail)
        })
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TtsRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_modalities: [&'static str; 1],
    speech_config: SpeechConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig<'a> {
    voice_config: VoiceConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig<'a> {
    prebuilt_voice_config: PrebuiltVoiceConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig<'a> {
    voice_name: &'a str,
}

impl<'a> TtsRequest<'a> {
    fn new(text: &'a str, voice_name: &'a str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![TextPart { text }],
            }],
            generation_config: GenerationConfig {
                response_modalities: ["AUDIO"],
                speech_config: SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig { voice_name },
                    },
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct TtsResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: String,
    data: String,
}

/// Decode the audio payload of the first candidate.
fn extract_pcm(response: TtsResponse) -> Result<Vec<u8>, String> {
    let inline = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().find_map(|p| p.inline_data))
        .ok_or_else(|| "response contains no audio data".to_string())?;

    debug!("Received audio part ({})", inline.mime_type);
    let pcm = STANDARD
        .decode(inline.data.as_bytes())
        .map_err(|e| format!("audio payload is not valid base64: {e}"))?;

    if pcm.is_empty() {
        return Err("audio payload is empty".into());
    }
    if pcm.len() % 2 != 0 {
        return Err(format!(
            "audio payload has {} bytes, not a whole number of 16-bit samples",
            pcm.len()
        ));
    }
    Ok(pcm)
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        format!("{}\u{2026}", s.chars().take(max_chars).collect::<String>())
    } else {
        s.to_string()
    }
}

// ── WAV output ───────────────────────────────────────────────────────────

/// Write raw s16le PCM to `path` as a mono 24 kHz WAV.
///
/// Returns the audio duration in seconds.
pub fn write_wav(path: &Path, pcm: &[u8]) -> Result<f64, Deck2VideoError> {
    if pcm.len() % 2 != 0 {
        return Err(Deck2VideoError::SynthesisFailure {
            detail: format!("{} PCM bytes is not a whole number of samples", pcm.len()),
        });
    }

    let spec = hound::WavSpec {
        channels: SPEECH_CHANNELS,
        sample_rate: SPEECH_SAMPLE_RATE,
        bits_per_sample: SPEECH_BITS_PER_SAMPLE,
        sample_format: hound::SampleFormat::Int,
    };
    let to_io = |e: hound::Error| Deck2VideoError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: match e {
            hound::Error::IoError(io) => io,
            other => std::io::Error::other(other.to_string()),
        },
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(to_io)?;
    for chunk in pcm.chunks_exact(2) {
        writer
            .write_sample(i16::from_le_bytes([chunk[0], chunk[1]]))
            .map_err(to_io)?;
    }
    writer.finalize().map_err(to_io)?;

    let samples = pcm.len() / 2;
    Ok(samples as f64 / SPEECH_SAMPLE_RATE as f64)
}

/// Synthesize `text` and persist it as a WAV at `path`.
///
/// Returns the audio duration in seconds.
pub async fn synthesize_to_file(
    synthesizer: &dyn SpeechSynthesizer,
    text: &str,
    path: &Path,
) -> Result<f64, Deck2VideoError> {
    let pcm = synthesizer.synthesize(text).await?;
    let owned = path.to_path_buf();
    let duration = tokio::task::spawn_blocking(move || write_wav(&owned, &pcm))
        .await
        .map_err(|e| Deck2VideoError::Internal(format!("WAV writer task panicked: {e}")))??;
    info!("Audio saved to: {} ({:.2}s)", path.display(), duration);
    Ok(duration)
}
