/// Provider contract and implementations
///
/// A provider wraps one external HTTP API. Text providers turn a prompt into
/// a completion; speech providers turn text into audio bytes. Providers make
/// exactly one outbound call per invocation and never retry; ordering and
/// fallback belong to the relays in [`crate::text`] and [`crate::voice`].
///
/// # Implementations
///
/// - [`GroqProvider`]: Groq chat completions (primary text)
/// - [`GeminiProvider`]: Google Gemini `generateContent` (secondary text)
/// - [`ElevenLabsProvider`]: ElevenLabs text-to-speech (primary voice)
/// - [`LocalTtsProvider`]: self-hosted TTS service (secondary voice)
/// - [`MockTextProvider`], [`MockSpeechProvider`]: call-counting test doubles
///
/// # Example
///
/// ```no_run
/// use eduagent_relay::providers::{GroqProvider, TextProvider};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let groq = GroqProvider::new(reqwest::Client::new(), "gsk_...".to_string());
/// let reply = groq.complete("Explain ownership in one sentence").await?;
/// println!("{} said: {reply}", groq.name());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use bytes::Bytes;

pub mod elevenlabs;
pub mod gemini;
pub mod groq;
pub mod local_tts;
pub mod mock;

pub use elevenlabs::ElevenLabsProvider;
pub use gemini::GeminiProvider;
pub use groq::GroqProvider;
pub use local_tts::LocalTtsProvider;
pub use mock::{MockSpeechProvider, MockTextProvider};

/// Longest slice of an error body kept for diagnostics
const MAX_ERROR_BODY: usize = 200;

/// Provider error types
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Network or TLS failure before a response arrived
    #[error("Request failed: {0}")]
    Request(String),

    /// Provider answered with a non-success status
    #[error("Provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response arrived but did not have the expected shape
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    /// Response was well-formed but carried no content
    #[error("Provider returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::InvalidResponse(err.to_string())
        } else {
            ProviderError::Request(err.to_string())
        }
    }
}

/// Provider result type alias
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Text completion provider
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Short identifier used in logs (e.g. "groq")
    fn name(&self) -> &str;

    /// Sends `prompt` as a single user message and returns the completion
    ///
    /// An empty completion is reported as [`ProviderError::EmptyResponse`].
    async fn complete(&self, prompt: &str) -> ProviderResult<String>;
}

/// Text to synthesize
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub text: String,

    /// Voice override; providers without voice selection ignore it
    pub voice_id: Option<String>,
}

/// Synthesized audio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audio {
    pub bytes: Bytes,

    /// MIME type to send back to the client
    pub content_type: &'static str,
}

/// Text-to-speech provider
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn synthesize(&self, request: &SpeechRequest) -> ProviderResult<Audio>;
}

/// Turns a non-success response into [`ProviderError::Status`]
pub(crate) async fn ensure_success(response: reqwest::Response) -> ProviderResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Status {
        status: status.as_u16(),
        body: truncate(&body, MAX_ERROR_BODY),
    })
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// First few characters of a credential, for logs
pub fn key_prefix(key: &str) -> String {
    let prefix: String = key.chars().take(5).collect();
    format!("{prefix}...")
}
