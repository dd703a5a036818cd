/// ElevenLabs text-to-speech provider
///
/// Returns MP3 audio. The voice can be overridden per request; model and
/// voice settings are fixed.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use super::{ensure_success, key_prefix, Audio, ProviderResult, SpeechProvider, SpeechRequest};

pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io/v1";
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";
pub const MODEL_ID: &str = "eleven_monolingual_v1";
pub const STABILITY: f32 = 0.5;
pub const SIMILARITY_BOOST: f32 = 0.75;
pub const CONTENT_TYPE: &str = "audio/mpeg";

#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

pub struct ElevenLabsProvider {
    client: reqwest::Client,
    api_key: String,
    default_voice_id: String,
    base_url: String,
}

impl ElevenLabsProvider {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        debug!(key = %key_prefix(&api_key), "Configured ElevenLabs provider");
        Self {
            client,
            api_key,
            default_voice_id: DEFAULT_VOICE_ID.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Voice used when a request does not name one
    pub fn with_default_voice(mut self, voice_id: impl Into<String>) -> Self {
        self.default_voice_id = voice_id.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, request: &SpeechRequest) -> String {
        let voice_id = request
            .voice_id
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(&self.default_voice_id);
        format!("{}/text-to-speech/{}", self.base_url, voice_id)
    }
}

#[async_trait]
impl SpeechProvider for ElevenLabsProvider {
    fn name(&self) -> &str {
        "elevenlabs"
    }

    async fn synthesize(&self, request: &SpeechRequest) -> ProviderResult<Audio> {
        let body = TtsRequest {
            text: &request.text,
            model_id: MODEL_ID,
            voice_settings: VoiceSettings {
                stability: STABILITY,
                similarity_boost: SIMILARITY_BOOST,
            },
        };

        let response = self
            .client
            .post(self.endpoint(request))
            .header("xi-api-key", &self.api_key)
            .header(reqwest::header::ACCEPT, CONTENT_TYPE)
            .json(&body)
            .send()
            .await?;

        let bytes = ensure_success(response).await?.bytes().await?;
        Ok(Audio {
            bytes,
            content_type: CONTENT_TYPE,
        })
    }
}
