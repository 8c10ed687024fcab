//! Narration script generation for `.pdf` decks.
//!
//! One LLM call per slide: the rendered page as an image attachment plus
//! the user prompt naming the page number. There is no retry; a failed call
//! aborts the run.
//!
//! Models sometimes return Markdown (fences, headings, bullets, bold) even
//! when told to write plain speech. Those markers would be read aloud by the
//! TTS voice, so [`clean_script`] strips them before the script is saved.

use crate::config::Settings;
use crate::deck::Slide;
use crate::error::Deck2VideoError;
use crate::pipeline::encode;
use crate::prompts::render_template;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use futures::future::BoxFuture;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Produces narration text for one slide.
pub trait ScriptGenerator: Send + Sync {
    /// Return the narration for `slide` (1-based index in `slide.index`).
    fn generate<'a>(&'a self, slide: &'a Slide) -> BoxFuture<'a, Result<String, Deck2VideoError>>;
}

/// [`ScriptGenerator`] backed by an `edgequake-llm` provider.
pub struct LlmScriptGenerator {
    provider: Arc<dyn LLMProvider>,
    settings: Settings,
}

impl LlmScriptGenerator {
    pub fn new(provider: Arc<dyn LLMProvider>, settings: Settings) -> Self {
        Self { provider, settings }
    }

    /// Create an Anthropic provider for `model_config.claude.model`.
    ///
    /// The provider reads `ANTHROPIC_API_KEY` itself; it is checked here
    /// first so a missing key surfaces as [`Deck2VideoError::MissingCredential`].
    pub fn anthropic(settings: Settings) -> Result<Self, Deck2VideoError> {
        crate::credentials::require_env(
            crate::credentials::ANTHROPIC_API_KEY,
            "Needed for slide script generation.",
        )?;
        let model = settings.model_config.claude.model.clone();
        let provider = ProviderFactory::create_llm_provider("anthropic", &model)
            .map_err(|e| provider_error(&model, e))?;
        Ok(Self::new(provider, settings))
    }

    fn build_messages(&self, slide: &Slide) -> Result<Vec<ChatMessage>, Deck2VideoError> {
        let gen = &self.settings.script_generation;
        let system = render_template(&gen.system_prompt, slide.index, &self.settings);
        let user = render_template(&gen.user_prompt, slide.index, &self.settings);

        let image = encode::encode_slide(&slide.image).map_err(|e| {
            Deck2VideoError::ScriptGenerationFailure {
                slide: slide.index,
                detail: format!("image encoding failed: {e}"),
            }
        })?;

        Ok(vec![
            ChatMessage::system(&system),
            ChatMessage::user_with_images(&user, vec![image]),
        ])
    }
}

impl ScriptGenerator for LlmScriptGenerator {
    fn generate<'a>(&'a self, slide: &'a Slide) -> BoxFuture<'a, Result<String, Deck2VideoError>> {
        Box::pin(async move {
            let start = Instant::now();
            let messages = self.build_messages(slide)?;
            let options = build_options(&self.settings);

            let response = self
                .provider
                .chat(&messages, Some(&options))
                .await
                .map_err(|e| {
                    error!("Slide {}: script generation failed: {}", slide.index, e);
                    Deck2VideoError::ScriptGenerationFailure {
                        slide: slide.index,
                        detail: e.to_string(),
                    }
                })?;

            debug!(
                "Slide {}: {} input tokens, {} output tokens, {:?}",
                slide.index,
                response.prompt_tokens,
                response.completion_tokens,
                start.elapsed()
            );

            let script = clean_script(&response.content);
            if script.is_empty() {
                return Err(Deck2VideoError::ScriptGenerationFailure {
                    slide: slide.index,
                    detail: "model returned an empty script".into(),
                });
            }
            info!(
                "Generated script for slide {}: {} characters",
                slide.index,
                script.chars().count()
            );
            Ok(script)
        })
    }
}

/// Build `CompletionOptions` from the Claude settings.
fn build_options(settings: &Settings) -> CompletionOptions {
    let claude = &settings.model_config.claude;
    CompletionOptions {
        temperature: Some(claude.temperature),
        max_tokens: Some(claude.max_tokens),
        ..Default::default()
    }
}

// ── Script cleanup ───────────────────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[\w-]*\n(.*)\n```\s*$").unwrap());
static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#{1,6}[ \t]+").unwrap());
static RE_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*(?:[-*+•]|\d+[.)])[ \t]+").unwrap());
static RE_EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\*\*|__)(.+?)(\*\*|__)|\*([^*\n]+)\*").unwrap());
static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Turn raw model output into plain speakable text.
///
/// Rules, in order:
/// 1. Strip an outer code fence
/// 2. Normalise line endings (CRLF → LF)
/// 3. Drop heading markers and list bullets (keep the text)
/// 4. Unwrap `**bold**`, `__bold__` and `*italic*`
/// 5. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 6. Trim each line, collapse 3+ newlines to one blank line, trim the whole
pub fn clean_script(input: &str) -> String {
    let s = match RE_OUTER_FENCES.captures(input.trim()) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    };
    let s = s.replace("\r\n", "\n").replace('\r', "\n");
    let s = RE_HEADING.replace_all(&s, "");
    let s = RE_BULLET.replace_all(&s, "");
    let s = RE_EMPHASIS.replace_all(&s, |c: &regex::Captures| {
        c.get(2)
            .or_else(|| c.get(4))
            .map_or(String::new(), |m| m.as_str().to_string())
    });
    let s = s.replace(
        ['\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}'],
        "",
    );
    let s = s.lines().map(str::trim).collect::<Vec<_>>().join("\n");
    RE_BLANK_LINES.replace_all(&s, "\n\n").trim().to_string()
}

/// A provider that cannot be built is a setup problem, not a slide failure.
fn provider_error(model: &str, err: impl std::fmt::Display) -> Deck2VideoError {
    Deck2VideoError::InvalidConfig(format!(
        "could not create script provider for model '{model}': {err}"
    ))
}
