/// Mock providers for testing
///
/// Each mock answers deterministically and counts how often it was called,
/// so fallback order can be asserted without network access.
///
/// # Example
///
/// ```no_run
/// use eduagent_relay::providers::{MockTextProvider, TextProvider};
///
/// # async fn example() {
/// let mock = MockTextProvider::replying("mock", "hello");
/// let reply = mock.complete("hi").await.unwrap();
/// assert_eq!(reply, "hello");
/// assert_eq!(mock.calls(), 1);
/// # }
/// ```

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{
    Audio, ProviderError, ProviderResult, SpeechProvider, SpeechRequest, TextProvider,
};

#[derive(Debug, Clone)]
enum Outcome {
    Reply(String),
    Fail(u16),
}

/// Mock text provider
///
/// Clones share the call counter, so a test can keep a handle after moving
/// the mock into a relay.
#[derive(Debug, Clone)]
pub struct MockTextProvider {
    name: String,
    outcome: Outcome,
    calls: Arc<AtomicUsize>,
    last_prompt: Arc<Mutex<Option<String>>>,
}

impl MockTextProvider {
    /// Always answers with `reply`
    pub fn replying(name: &str, reply: &str) -> Self {
        Self::with_outcome(name, Outcome::Reply(reply.to_string()))
    }

    /// Always fails with a 500 status
    pub fn failing(name: &str) -> Self {
        Self::with_outcome(name, Outcome::Fail(500))
    }

    fn with_outcome(name: &str, outcome: Outcome) -> Self {
        Self {
            name: name.to_string(),
            outcome,
            calls: Arc::new(AtomicUsize::new(0)),
            last_prompt: Arc::new(Mutex::new(None)),
        }
    }

    /// Number of `complete` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompt passed to the most recent call
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().ok().and_then(|p| p.clone())
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, prompt: &str) -> ProviderResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(prompt.to_string());
        }

        match &self.outcome {
            Outcome::Reply(reply) if reply.trim().is_empty() => Err(ProviderError::EmptyResponse),
            Outcome::Reply(reply) => Ok(reply.clone()),
            Outcome::Fail(status) => Err(ProviderError::Status {
                status: *status,
                body: format!("{} unavailable", self.name),
            }),
        }
    }
}

/// Mock speech provider returning fixed bytes
#[derive(Debug, Clone)]
pub struct MockSpeechProvider {
    name: String,
    content_type: &'static str,
    fail: bool,
    calls: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<SpeechRequest>>>,
}

impl MockSpeechProvider {
    pub fn new(name: &str, content_type: &'static str) -> Self {
        Self {
            name: name.to_string(),
            content_type,
            fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            fail: true,
            ..Self::new(name, "application/octet-stream")
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<SpeechRequest> {
        self.last_request.lock().ok().and_then(|r| r.clone())
    }
}

#[async_trait]
impl SpeechProvider for MockSpeechProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn synthesize(&self, request: &SpeechRequest) -> ProviderResult<Audio> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        if self.fail {
            return Err(ProviderError::Request(format!("{} unreachable", self.name)));
        }

        Ok(Audio {
            bytes: Bytes::from(format!("{}:{}", self.name, request.text)),
            content_type: self.content_type,
        })
    }
}
