/// Voice relay
///
/// Exactly one speech provider is chosen at construction: ElevenLabs when its
/// key is configured, the local TTS service otherwise. Failures are returned
/// as-is; there is no fallback between the two.

use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::ProviderConfig;
use crate::providers::{
    elevenlabs, Audio, ElevenLabsProvider, LocalTtsProvider, SpeechProvider, SpeechRequest,
};
use crate::text::RelayError;

#[derive(Clone)]
pub struct VoiceRelay {
    provider: Arc<dyn SpeechProvider>,
}

impl fmt::Debug for VoiceRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoiceRelay")
            .field("provider", &self.provider.name())
            .finish()
    }
}

impl VoiceRelay {
    pub fn new(provider: Arc<dyn SpeechProvider>) -> Self {
        Self { provider }
    }

    pub fn from_config(config: &ProviderConfig, client: reqwest::Client) -> Self {
        Self::select(config, client, elevenlabs::DEFAULT_BASE_URL)
    }

    fn select(config: &ProviderConfig, client: reqwest::Client, elevenlabs_base_url: &str) -> Self {
        let provider: Arc<dyn SpeechProvider> = match &config.elevenlabs_api_key {
            Some(key) => Arc::new(
                ElevenLabsProvider::new(client, key.clone())
                    .with_default_voice(config.elevenlabs_voice_id.clone())
                    .with_base_url(elevenlabs_base_url),
            ),
            None => Arc::new(LocalTtsProvider::new(client, config.local_tts_url.clone())),
        };

        info!(provider = provider.name(), "Voice relay configured");
        Self::new(provider)
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Synthesizes `text`, optionally with a specific voice
    ///
    /// # Errors
    ///
    /// [`RelayError::InvalidInput`] for blank text (no outbound call is made),
    /// [`RelayError::Provider`] if synthesis fails
    pub async fn speak(&self, text: &str, voice_id: Option<&str>) -> Result<Audio, RelayError> {
        if text.trim().is_empty() {
            return Err(RelayError::InvalidInput("Text is required".to_string()));
        }

        let request = SpeechRequest {
            text: text.to_string(),
            voice_id: voice_id.map(str::to_string),
        };

        debug!(provider = self.provider.name(), chars = text.len(), "Synthesizing speech");

        self.provider
            .synthesize(&request)
            .await
            .map_err(|source| RelayError::Provider {
                provider: self.provider.name().to_string(),
                source,
            })
    }
}
