/// Provider credentials and endpoints
///
/// Read once at startup. A provider is enabled when its credential is present
/// and non-blank; availability is never checked at runtime.

use std::env;

use crate::providers::{elevenlabs, local_tts};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Primary text provider (`GROQ_API_KEY`)
    pub groq_api_key: Option<String>,

    /// Secondary text provider (`GEMINI_API_KEY`)
    pub gemini_api_key: Option<String>,

    /// Primary voice provider (`ELEVENLABS_API_KEY`)
    pub elevenlabs_api_key: Option<String>,

    /// Default ElevenLabs voice (`ELEVENLABS_VOICE_ID`)
    pub elevenlabs_voice_id: String,

    /// Secondary voice provider endpoint (`LOCAL_TTS_URL`)
    pub local_tts_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            groq_api_key: None,
            gemini_api_key: None,
            elevenlabs_api_key: None,
            elevenlabs_voice_id: elevenlabs::DEFAULT_VOICE_ID.to_string(),
            local_tts_url: local_tts::DEFAULT_URL.to_string(),
        }
    }
}

impl ProviderConfig {
    /// Loads provider settings from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads provider settings through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let credential = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            groq_api_key: credential("GROQ_API_KEY"),
            gemini_api_key: credential("GEMINI_API_KEY"),
            elevenlabs_api_key: credential("ELEVENLABS_API_KEY"),
            elevenlabs_voice_id: credential("ELEVENLABS_VOICE_ID")
                .unwrap_or(defaults.elevenlabs_voice_id),
            local_tts_url: credential("LOCAL_TTS_URL").unwrap_or(defaults.local_tts_url),
        }
    }

    /// Whether at least one text provider is configured
    pub fn has_text_provider(&self) -> bool {
        self.groq_api_key.is_some() || self.gemini_api_key.is_some()
    }
}
