/// Self-hosted text-to-speech service
///
/// Posts `{text, speaker}` to a local HTTP endpoint and returns WAV audio.

use async_trait::async_trait;
use serde::Serialize;

use super::{ensure_success, Audio, ProviderResult, SpeechProvider, SpeechRequest};

pub const DEFAULT_URL: &str = "http://localhost:8000/tts";
pub const SPEAKER: &str = "Ryan";
pub const CONTENT_TYPE: &str = "audio/wav";

#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    speaker: &'a str,
}

pub struct LocalTtsProvider {
    client: reqwest::Client,
    url: String,
}

impl LocalTtsProvider {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SpeechProvider for LocalTtsProvider {
    fn name(&self) -> &str {
        "local-tts"
    }

    /// The local service has a single fixed speaker; `voice_id` is ignored
    async fn synthesize(&self, request: &SpeechRequest) -> ProviderResult<Audio> {
        let response = self
            .client
            .post(&self.url)
            .json(&TtsRequest {
                text: &request.text,
                speaker: SPEAKER,
            })
            .send()
            .await?;

        let bytes = ensure_success(response).await?.bytes().await?;
        Ok(Audio {
            bytes,
            content_type: CONTENT_TYPE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderError;
    use crate::test_server::{self, StubServer};
    use axum::http::StatusCode;

    #[test]
    fn test_request_uses_fixed_speaker() {
        let body = serde_json::to_value(TtsRequest {
            text: "Hi there",
            speaker: SPEAKER,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"text": "Hi there", "speaker": "Ryan"}));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_request_error() {
        let provider = LocalTtsProvider::new(reqwest::Client::new(), "http://127.0.0.1:1/tts");
        let result = provider
            .synthesize(&SpeechRequest {
                text: "hello".to_string(),
                voice_id: None,
            })
            .await;
        assert!(matches!(result, Err(crate::providers::ProviderError::Request(_))));
    }

    #[tokio::test]
    async fn test_synthesize_over_http() {
        let server = StubServer::start(StatusCode::OK, CONTENT_TYPE, &b"RIFF-wav"[..]).await;
        let provider = LocalTtsProvider::new(test_server::client(), server.url("/tts"));

        let audio = provider
            .synthesize(&SpeechRequest {
                text: "Good morning".to_string(),
                voice_id: Some("ignored".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(&audio.bytes[..], b"RIFF-wav");
        assert_eq!(audio.content_type, "audio/wav");

        let recorded = server.single_request();
        assert_eq!(recorded.path, "/tts");
        assert_eq!(
            recorded.body,
            serde_json::json!({"text": "Good morning", "speaker": "Ryan"})
        );
    }

    #[tokio::test]
    async fn test_server_error_is_status_error() {
        let server =
            StubServer::start(StatusCode::INTERNAL_SERVER_ERROR, "text/plain", "model not loaded").await;
        let provider = LocalTtsProvider::new(test_server::client(), server.url("/tts"));

        let err = provider
            .synthesize(&SpeechRequest {
                text: "hello".to_string(),
                voice_id: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Status { status: 500, ref body } if body == "model not loaded"));
    }
}
