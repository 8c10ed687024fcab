//! API keys read from the environment.
//!
//! Both keys are checked up front so a run never starts work it cannot
//! finish: script generation (Anthropic) and speech synthesis (Google).

use crate::error::Deck2VideoError;

/// Key for the script-generation LLM.
pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";

/// Key for Gemini speech synthesis.
pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";

/// The API keys a run needs.
#[derive(Clone)]
pub struct Credentials {
    pub anthropic_api_key: String,
    pub google_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("anthropic_api_key", &"<redacted>")
            .field("google_api_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Read both keys from the process environment.
    pub fn from_env() -> Result<Self, Deck2VideoError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read both keys through `lookup`; empty values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Deck2VideoError> {
        Ok(Self {
            anthropic_api_key: require(&lookup, ANTHROPIC_API_KEY, "Needed for slide script generation.")?,
            google_api_key: require(&lookup, GOOGLE_API_KEY, "Needed for speech synthesis.")?,
        })
    }
}

/// Read a single key from the process environment.
pub fn require_env(var: &str, hint: &str) -> Result<String, Deck2VideoError> {
    require(&|v: &str| std::env::var(v).ok(), var, hint)
}

fn require(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    hint: &str,
) -> Result<String, Deck2VideoError> {
    lookup(var)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Deck2VideoError::MissingCredential {
            var: var.to_string(),
            hint: hint.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn both_keys_present() {
        let creds =
            Credentials::from_lookup(env(&[(ANTHROPIC_API_KEY, "sk-a"), (GOOGLE_API_KEY, "g")]))
                .unwrap();
        assert_eq!(creds.anthropic_api_key, "sk-a");
        assert!(!format!("{creds:?}").contains("sk-a"));
    }

    #[test]
    fn missing_google_key() {
        let err = Credentials::from_lookup(env(&[(ANTHROPIC_API_KEY, "sk-a")])).unwrap_err();
        match err {
            Deck2VideoError::MissingCredential { var, .. } => assert_eq!(var, GOOGLE_API_KEY),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let err = Credentials::from_lookup(env(&[(ANTHROPIC_API_KEY, "  "), (GOOGLE_API_KEY, "g")]))
            .unwrap_err();
        assert!(err.to_string().contains(ANTHROPIC_API_KEY));
    }
}
