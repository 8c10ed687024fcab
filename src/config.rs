//! Configuration types for deck-to-video generation.
//!
//! Two layers:
//!
//! * [`Settings`] — the YAML settings document (prompt templates, model
//!   identifiers, voice, customization). Loaded once at startup; every
//!   recognised key is a typed field with a documented default, unknown keys
//!   are ignored, invalid values fail at load time.
//!
//! * [`PipelineConfig`] — run knobs (output root, DPI, ffmpeg binaries,
//!   injected service adapters), built via [`PipelineConfigBuilder`].

use crate::error::Deck2VideoError;
use crate::pipeline::script::ScriptGenerator;
use crate::pipeline::speech::SpeechSynthesizer;
use crate::progress::ProgressCallback;
use crate::prompts::{
    DEFAULT_PRESENTATION_STYLE, DEFAULT_SCRIPT_LENGTH, DEFAULT_SYSTEM_PROMPT, DEFAULT_USER_PROMPT,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

// ── Settings document ────────────────────────────────────────────────────

/// The structured settings document (`prompts.yaml`).
///
/// ```yaml
/// script_generation:
///   system_prompt: "..."
///   user_prompt: "Narrate slide {page_num}."
/// model_config:
///   claude: { model: claude-sonnet-4-20250514, max_tokens: 1024, temperature: 0.7 }
///   gemini_tts: { model: gemini-2.5-flash-preview-tts, voice_name: Kore }
/// customization:
///   presentation_style: "friendly"
///   script_length: "30 seconds"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub script_generation: ScriptGenerationSettings,
    pub model_config: ModelConfig,
    pub customization: Customization,
}

/// `script_generation.*`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptGenerationSettings {
    /// System prompt template. Default: [`DEFAULT_SYSTEM_PROMPT`].
    pub system_prompt: String,
    /// User prompt template with a `{page_num}` placeholder.
    /// Default: [`DEFAULT_USER_PROMPT`].
    pub user_prompt: String,
}

impl Default for ScriptGenerationSettings {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            user_prompt: DEFAULT_USER_PROMPT.to_string(),
        }
    }
}

/// `model_config.*`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub claude: ClaudeSettings,
    pub gemini_tts: TtsSettings,
}

/// `model_config.claude.*` — script generation model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaudeSettings {
    /// Default: `claude-sonnet-4-20250514`.
    pub model: String,
    /// Default: 1024.
    pub max_tokens: usize,
    /// Range 0.0–2.0. Default: 0.7.
    pub temperature: f32,
}

impl Default for ClaudeSettings {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

/// `model_config.gemini_tts.*` — speech synthesis model and voice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsSettings {
    /// Default: `gemini-2.5-flash-preview-tts`.
    pub model: String,
    /// Prebuilt voice name. Default: `Kore`.
    pub voice_name: String,
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash-preview-tts".to_string(),
            voice_name: "Kore".to_string(),
        }
    }
}

/// `customization.*` — values substituted into the prompt templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Customization {
    pub presentation_style: String,
    pub script_length: String,
}

impl Default for Customization {
    fn default() -> Self {
        Self {
            presentation_style: DEFAULT_PRESENTATION_STYLE.to_string(),
            script_length: DEFAULT_SCRIPT_LENGTH.to_string(),
        }
    }
}

impl Settings {
    /// Load and validate the settings document at `path`.
    ///
    /// A missing file, an empty or malformed document, and out-of-range
    /// values all yield [`Deck2VideoError::ConfigLoadFailure`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Deck2VideoError> {
        let path = path.as_ref();
        let fail = |detail: String| Deck2VideoError::ConfigLoadFailure {
            path: path.to_path_buf(),
            detail,
        };

        let text = std::fs::read_to_string(path).map_err(|e| fail(e.to_string()))?;
        let settings = Self::from_yaml(&text).map_err(|e| match e {
            Deck2VideoError::ConfigLoadFailure { detail, .. } => fail(detail),
            other => other,
        })?;

        info!("Loaded settings from: {}", path.display());
        Ok(settings)
    }

    /// Parse and validate a settings document held in memory.
    pub fn from_yaml(text: &str) -> Result<Self, Deck2VideoError> {
        let fail = |detail: String| Deck2VideoError::ConfigLoadFailure {
            path: PathBuf::from("<inline>"),
            detail,
        };

        if text.trim().is_empty() {
            return Err(fail("settings document is empty".into()));
        }
        let settings: Settings = serde_yaml::from_str(text).map_err(|e| fail(e.to_string()))?;
        settings.validate().map_err(fail)?;
        Ok(settings)
    }

    /// Re-read the document from `path`, replacing `self` only on success.
    pub fn reload(&mut self, path: impl AsRef<Path>) -> Result<(), Deck2VideoError> {
        *self = Self::load(path)?;
        Ok(())
    }

    /// Write the settings back to `path` as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Deck2VideoError> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(self)
            .map_err(|e| Deck2VideoError::Internal(format!("settings serialisation: {e}")))?;
        std::fs::write(path, yaml).map_err(|e| Deck2VideoError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        info!("Saved settings to: {}", path.display());
        Ok(())
    }

    fn validate(&self) -> Result<(), String> {
        let claude = &self.model_config.claude;
        if claude.model.trim().is_empty() {
            return Err("model_config.claude.model must not be empty".into());
        }
        if claude.max_tokens == 0 {
            return Err("model_config.claude.max_tokens must be ≥ 1".into());
        }
        if !(0.0..=2.0).contains(&claude.temperature) {
            return Err(format!(
                "model_config.claude.temperature must be 0.0–2.0, got {}",
                claude.temperature
            ));
        }
        let tts = &self.model_config.gemini_tts;
        if tts.model.trim().is_empty() {
            return Err("model_config.gemini_tts.model must not be empty".into());
        }
        if tts.voice_name.trim().is_empty() {
            return Err("model_config.gemini_tts.voice_name must not be empty".into());
        }
        Ok(())
    }
}

// ── Run configuration ────────────────────────────────────────────────────

/// Configuration for one deck-to-video run.
///
/// Built via [`PipelineConfig::builder()`] or [`PipelineConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_deck2video::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .output_root("out")
///     .dpi(200)
///     .silent_duration_secs(2.5)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 200);
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// Root of the output tree; each run writes `<output_root>/<project>/`.
    /// Default: `output`.
    pub output_root: PathBuf,

    /// Directory searched for the companion PDF of a `.pptx` deck.
    /// Default: `slides/pdf`.
    pub companion_dir: PathBuf,

    /// Rendering DPI for slide rasterisation. Range: 72–600. Default: 300.
    pub dpi: u32,

    /// Cap on the longest rendered edge in pixels. Default: 4096.
    pub max_rendered_pixels: u32,

    /// Length of a clip for a slide without narration. Default: 3.0 s.
    pub silent_duration_secs: f64,

    /// ffmpeg executable. Default: `ffmpeg` on `PATH`.
    pub ffmpeg: PathBuf,

    /// ffprobe executable. Default: `ffprobe` on `PATH`.
    pub ffprobe: PathBuf,

    /// Prompt and model settings.
    pub settings: Settings,

    /// Pre-constructed script generator. If None, a Claude-backed generator
    /// is created from `settings` when a `.pdf` deck needs one.
    pub script_generator: Option<Arc<dyn ScriptGenerator>>,

    /// Pre-constructed speech synthesizer. If None, a Gemini TTS client is
    /// created from `settings` and `GOOGLE_API_KEY`.
    pub synthesizer: Option<Arc<dyn SpeechSynthesizer>>,

    /// Optional progress observer.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("output"),
            companion_dir: PathBuf::from("slides/pdf"),
            dpi: 300,
            max_rendered_pixels: 4096,
            silent_duration_secs: 3.0,
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            settings: Settings::default(),
            script_generator: None,
            synthesizer: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("output_root", &self.output_root)
            .field("companion_dir", &self.companion_dir)
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("silent_duration_secs", &self.silent_duration_secs)
            .field("ffmpeg", &self.ffmpeg)
            .field("ffprobe", &self.ffprobe)
            .field("settings", &self.settings)
            .field(
                "script_generator",
                &self.script_generator.as_ref().map(|_| "<dyn ScriptGenerator>"),
            )
            .field(
                "synthesizer",
                &self.synthesizer.as_ref().map(|_| "<dyn SpeechSynthesizer>"),
            )
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`PipelineConfig`].
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn output_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_root = path.into();
        self
    }

    pub fn companion_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.companion_dir = path.into();
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 600);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn silent_duration_secs(mut self, secs: f64) -> Self {
        self.config.silent_duration_secs = secs;
        self
    }

    pub fn ffmpeg(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.ffmpeg = path.into();
        self
    }

    pub fn ffprobe(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.ffprobe = path.into();
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.config.settings = settings;
        self
    }

    pub fn script_generator(mut self, generator: Arc<dyn ScriptGenerator>) -> Self {
        self.config.script_generator = Some(generator);
        self
    }

    pub fn synthesizer(mut self, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        self.config.synthesizer = Some(synthesizer);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, Deck2VideoError> {
        let c = &self.config;
        if !(72..=600).contains(&c.dpi) {
            return Err(Deck2VideoError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if !c.silent_duration_secs.is_finite() || c.silent_duration_secs <= 0.0 {
            return Err(Deck2VideoError::InvalidConfig(format!(
                "Silent duration must be a positive number of seconds, got {}",
                c.silent_duration_secs
            )));
        }
        if c.output_root.as_os_str().is_empty() {
            return Err(Deck2VideoError::InvalidConfig(
                "Output root must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
