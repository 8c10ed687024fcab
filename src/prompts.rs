//! Default prompt templates for slide narration scripts.
//!
//! These are the fallbacks used when the settings document omits
//! `script_generation.system_prompt` or `script_generation.user_prompt`.
//! Templates may contain the placeholders `{page_num}`,
//! `{presentation_style}` and `{script_length}`; [`render_template`] fills
//! them in.

use crate::config::Settings;

/// Default system prompt for narration script generation.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are an experienced presenter recording a voice-over for a slide deck.

Write the narration for the slide you are shown.

Rules:
- Speak in a {presentation_style} tone
- Aim for {script_length}
- Explain what the slide shows; do not read every bullet verbatim
- Write plain spoken sentences only: no headings, no bullet points, no Markdown
- Do NOT add stage directions, speaker labels or commentary
- Output ONLY the words to be spoken"#;

/// Default user prompt; `{page_num}` is the 1-based slide number.
pub const DEFAULT_USER_PROMPT: &str =
    "Write the narration script for slide {page_num} of this presentation.";

/// Default for `customization.presentation_style`.
pub const DEFAULT_PRESENTATION_STYLE: &str = "clear, friendly and professional";

/// Default for `customization.script_length`.
pub const DEFAULT_SCRIPT_LENGTH: &str = "about 30 to 60 seconds of speech";

/// Substitute the known placeholders in a prompt template.
///
/// Unknown `{...}` sequences are left untouched so templates can contain
/// literal braces.
pub fn render_template(template: &str, page_num: usize, settings: &Settings) -> String {
    template
        .replace("{page_num}", &page_num.to_string())
        .replace(
            "{presentation_style}",
            &settings.customization.presentation_style,
        )
        .replace("{script_length}", &settings.customization.script_length)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_page_number() {
        let settings = Settings::default();
        let out = render_template(DEFAULT_USER_PROMPT, 7, &settings);
        assert!(out.contains("slide 7"), "got: {out}");
        assert!(!out.contains("{page_num}"));
    }

    #[test]
    fn renders_customization_fields() {
        let mut settings = Settings::default();
        settings.customization.presentation_style = "playful".into();
        settings.customization.script_length = "two sentences".into();
        let out = render_template(DEFAULT_SYSTEM_PROMPT, 1, &settings);
        assert!(out.contains("playful"));
        assert!(out.contains("two sentences"));
    }

    #[test]
    fn leaves_unknown_placeholders() {
        let settings = Settings::default();
        let out = render_template("{page_num} of {total}", 3, &settings);
        assert_eq!(out, "3 of {total}");
    }
}
