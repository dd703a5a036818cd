/// Groq chat-completions provider
///
/// Sends the prompt as a single user message to the OpenAI-compatible
/// `/chat/completions` endpoint with a fixed model and temperature.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ensure_success, key_prefix, ProviderError, ProviderResult, TextProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const MODEL: &str = "llama-3.3-70b-versatile";
pub const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct GroqProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GroqProvider {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        debug!(key = %key_prefix(&api_key), "Configured Groq provider");
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Points the provider at a different OpenAI-compatible host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn request_body<'a>(prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: MODEL,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
        }
    }
}

#[async_trait]
impl TextProvider for GroqProvider {
    fn name(&self) -> &str {
        "groq"
    }

    async fn complete(&self, prompt: &str) -> ProviderResult<String> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&Self::request_body(prompt))
            .send()
            .await?;

        let body: ChatResponse = ensure_success(response).await?.json().await?;
        extract_content(body)
    }
}

fn extract_content(body: ChatResponse) -> ProviderResult<String> {
    let content = body
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default();

    if content.trim().is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{self, StubServer};
    use axum::http::StatusCode;
    use serde_json::json;

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(GroqProvider::request_body("hi")).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "llama-3.3-70b-versatile",
                "messages": [{"role": "user", "content": "hi"}],
                "temperature": 0.7f32
            })
        );
    }

    #[test]
    fn test_extract_content() {
        let body: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": "Hello!"}}]
        }))
        .unwrap();
        assert_eq!(extract_content(body).unwrap(), "Hello!");
    }

    #[test]
    fn test_empty_completion_is_error() {
        let no_choices: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(matches!(
            extract_content(no_choices),
            Err(ProviderError::EmptyResponse)
        ));

        let blank: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"content": "  "}}]
        }))
        .unwrap();
        assert!(matches!(extract_content(blank), Err(ProviderError::EmptyResponse)));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let provider = GroqProvider::new(reqwest::Client::new(), "gsk_test".to_string())
            .with_base_url("http://localhost:9999/v1/");
        assert_eq!(provider.base_url, "http://localhost:9999/v1");
    }

    #[tokio::test]
    async fn test_complete_over_http() {
        let server = StubServer::json(
            StatusCode::OK,
            json!({"choices": [{"message": {"role": "assistant", "content": "Borrow, don't own."}}]}),
        )
        .await;
        let provider = GroqProvider::new(test_server::client(), "gsk_test".to_string())
            .with_base_url(&server.base_url);

        let reply = provider.complete("Explain ownership").await.unwrap();
        assert_eq!(reply, "Borrow, don't own.");

        let request = server.single_request();
        assert_eq!(request.path, "/chat/completions");
        assert_eq!(request.header("authorization"), Some("Bearer gsk_test"));
        assert_eq!(request.body["model"], MODEL);
        assert_eq!(request.body["messages"][0]["content"], "Explain ownership");
    }

    #[tokio::test]
    async fn test_rate_limit_is_status_error() {
        let server = StubServer::json(
            StatusCode::TOO_MANY_REQUESTS,
            json!({"error": {"message": "Rate limit reached"}}),
        )
        .await;
        let provider = GroqProvider::new(test_server::client(), "gsk_test".to_string())
            .with_base_url(&server.base_url);

        match provider.complete("hi").await {
            Err(ProviderError::Status { status, body }) => {
                assert_eq!(status, 429);
                assert!(body.contains("Rate limit reached"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }
}
