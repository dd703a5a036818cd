/// Text relay with primary/secondary fallback
///
/// # Fallback order
///
/// ```text
/// complete(prompt)
///   ├─> primary configured?   try once ── ok ──> reply
///   │                                   └ err ─> warn, fall through
///   ├─> secondary configured? try once ── ok ──> reply
///   │                                   └ err ─> warn
///   └─> NoProviderAvailable (with every failure that happened)
/// ```
///
/// Neither provider is ever retried.
///
/// # Example
///
/// ```no_run
/// use eduagent_relay::{ProviderConfig, TextRelay};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let relay = TextRelay::from_config(&ProviderConfig::from_env(), reqwest::Client::new());
/// let roadmap = relay.generate_roadmap("Backend Engineer", &["rust".to_string()]).await?;
/// println!("{}", roadmap["title"]);
/// # Ok(())
/// # }
/// ```

use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::ProviderConfig;
use crate::extract::extract_roadmap_json;
use crate::prompt::{build_chat_prompt, build_roadmap_prompt};
use crate::providers::{GeminiProvider, GroqProvider, ProviderError, TextProvider};

/// One failed provider attempt
#[derive(Debug)]
pub struct ProviderFailure {
    pub provider: String,
    pub error: ProviderError,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider, self.error)
    }
}

/// Relay error types
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// No provider is configured, or every configured provider failed
    #[error("No AI provider available")]
    NoProviderAvailable { failures: Vec<ProviderFailure> },

    /// The single configured provider for this call failed
    #[error("{provider} failed: {source}")]
    Provider {
        provider: String,
        #[source]
        source: ProviderError,
    },

    /// Model output could not be parsed as JSON
    #[error("Model returned malformed JSON: {0}")]
    MalformedRoadmap(String),

    /// Request rejected before any outbound call
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl RelayError {
    /// True when nothing was attempted because nothing is configured
    pub fn is_unconfigured(&self) -> bool {
        matches!(self, RelayError::NoProviderAvailable { failures } if failures.is_empty())
    }
}

/// Completion plus the provider that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub provider: String,
}

/// Primary/secondary text relay
#[derive(Clone)]
pub struct TextRelay {
    primary: Option<Arc<dyn TextProvider>>,
    secondary: Option<Arc<dyn TextProvider>>,
}

impl fmt::Debug for TextRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextRelay")
            .field("primary", &self.primary.as_ref().map(|p| p.name().to_string()))
            .field("secondary", &self.secondary.as_ref().map(|p| p.name().to_string()))
            .finish()
    }
}

impl TextRelay {
    pub fn new(
        primary: Option<Arc<dyn TextProvider>>,
        secondary: Option<Arc<dyn TextProvider>>,
    ) -> Self {
        Self { primary, secondary }
    }

    /// Groq as primary, Gemini as secondary, each only if its key is set
    pub fn from_config(config: &ProviderConfig, client: reqwest::Client) -> Self {
        let primary = config.groq_api_key.clone().map(|key| {
            Arc::new(GroqProvider::new(client.clone(), key)) as Arc<dyn TextProvider>
        });
        let secondary = config.gemini_api_key.clone().map(|key| {
            Arc::new(GeminiProvider::new(client.clone(), key)) as Arc<dyn TextProvider>
        });

        let relay = Self::new(primary, secondary);
        info!(?relay, "Text relay configured");
        relay
    }

    pub fn is_configured(&self) -> bool {
        self.primary.is_some() || self.secondary.is_some()
    }

    /// Sends a fully assembled prompt through the fallback chain
    pub async fn complete(&self, prompt: &str) -> Result<Completion, RelayError> {
        let mut failures = Vec::new();

        for provider in [&self.primary, &self.secondary].into_iter().flatten() {
            debug!(provider = provider.name(), "Requesting completion");

            match provider.complete(prompt).await {
                Ok(text) => {
                    return Ok(Completion {
                        text,
                        provider: provider.name().to_string(),
                    })
                }
                Err(error) => {
                    warn!(provider = provider.name(), error = %error, "Text provider failed");
                    failures.push(ProviderFailure {
                        provider: provider.name().to_string(),
                        error,
                    });
                }
            }
        }

        Err(RelayError::NoProviderAvailable { failures })
    }

    /// Generates a roadmap document and parses it as JSON
    pub async fn generate_roadmap(
        &self,
        role: &str,
        interests: &[String],
    ) -> Result<Value, RelayError> {
        info!(role, "Generating roadmap");
        let completion = self.complete(&build_roadmap_prompt(role, interests)).await?;
        extract_roadmap_json(&completion.text)
    }

    /// Answers a tutor chat message
    pub async fn chat(&self, message: &str, context: Option<&Value>) -> Result<String, RelayError> {
        let completion = self.complete(&build_chat_prompt(message, context)).await?;
        Ok(completion.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MockTextProvider;
    use serde_json::json;

    fn relay(primary: Option<&MockTextProvider>, secondary: Option<&MockTextProvider>) -> TextRelay {
        TextRelay::new(
            primary.map(|p| Arc::new(p.clone()) as Arc<dyn TextProvider>),
            secondary.map(|s| Arc::new(s.clone()) as Arc<dyn TextProvider>),
        )
    }

    #[tokio::test]
    async fn test_primary_success_skips_secondary() {
        let primary = MockTextProvider::replying("groq", "from primary");
        let secondary = MockTextProvider::replying("gemini", "from secondary");

        let completion = relay(Some(&primary), Some(&secondary))
            .complete("hi")
            .await
            .unwrap();

        assert_eq!(completion.text, "from primary");
        assert_eq!(completion.provider, "groq");
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn test_primary_failure_falls_back_once() {
        let primary = MockTextProvider::failing("groq");
        let secondary = MockTextProvider::replying("gemini", "from secondary");

        let completion = relay(Some(&primary), Some(&secondary))
            .complete("hi")
            .await
            .unwrap();

        assert_eq!(completion.provider, "gemini");
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn test_secondary_only() {
        let secondary = MockTextProvider::replying("gemini", "ok");
        let completion = relay(None, Some(&secondary)).complete("hi").await.unwrap();
        assert_eq!(completion.text, "ok");
    }

    #[tokio::test]
    async fn test_empty_completion_falls_back() {
        let primary = MockTextProvider::replying("groq", "");
        let secondary = MockTextProvider::replying("gemini", "fallback");

        let completion = relay(Some(&primary), Some(&secondary))
            .complete("hi")
            .await
            .unwrap();
        assert_eq!(completion.text, "fallback");
    }

    #[tokio::test]
    async fn test_unconfigured_fails_without_calls() {
        let err = relay(None, None).complete("hi").await.unwrap_err();
        assert!(err.is_unconfigured());
        assert!(!relay(None, None).is_configured());
    }

    #[tokio::test]
    async fn test_both_failing() {
        let primary = MockTextProvider::failing("groq");
        let secondary = MockTextProvider::failing("gemini");

        let err = relay(Some(&primary), Some(&secondary))
            .complete("hi")
            .await
            .unwrap_err();

        match err {
            RelayError::NoProviderAvailable { failures } => {
                let names: Vec<_> = failures.iter().map(|f| f.provider.as_str()).collect();
                assert_eq!(names, vec!["groq", "gemini"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn test_generate_roadmap_parses_fenced_output() {
        let primary = MockTextProvider::replying(
            "groq",
            "```json\n{\"title\": \"Rust Path\", \"phases\": []}\n```",
        );

        let roadmap = relay(Some(&primary), None)
            .generate_roadmap("Rust Developer", &[])
            .await
            .unwrap();

        assert_eq!(roadmap, json!({"title": "Rust Path", "phases": []}));
        let prompt = primary.last_prompt().unwrap();
        assert!(prompt.contains("Rust Developer"));
        assert!(prompt.contains("User interests: General."));
    }

    #[tokio::test]
    async fn test_generate_roadmap_malformed() {
        let primary = MockTextProvider::replying("groq", "Sure! Here's a roadmap:");
        let err = relay(Some(&primary), None)
            .generate_roadmap("Designer", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::MalformedRoadmap(_)));
    }

    #[tokio::test]
    async fn test_chat_forwards_context() {
        let primary = MockTextProvider::replying("groq", "Keep going!");
        let reply = relay(Some(&primary), None)
            .chat("Am I on track?", Some(&json!({"phase": 2})))
            .await
            .unwrap();

        assert_eq!(reply, "Keep going!");
        assert_eq!(
            primary.last_prompt().as_deref(),
            Some(r#"Context: {"phase":2}. User says: Am I on track?"#)
        );
    }
}
