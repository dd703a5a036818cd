//! # EduAgent Relay
//!
//! Forwards text and speech requests to external AI providers.
//!
//! ## Modules
//!
//! - `providers`: Provider traits, HTTP clients and mocks
//! - `text`: Primary/secondary text relay, roadmap generation and chat
//! - `voice`: Credential-selected speech relay
//! - `prompt`: Prompt templates
//! - `extract`: Roadmap JSON extraction from model output
//! - `config`: Provider credentials from the environment
//!
//! ## Example
//!
//! ```no_run
//! use eduagent_relay::{ProviderConfig, TextRelay, VoiceRelay};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ProviderConfig::from_env();
//! let client = reqwest::Client::new();
//!
//! let text = TextRelay::from_config(&config, client.clone());
//! let voice = VoiceRelay::from_config(&config, client);
//!
//! let reply = text.chat("What should I learn next?", None).await?;
//! let audio = voice.speak(&reply, None).await?;
//! println!("{} bytes of {}", audio.bytes.len(), audio.content_type);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod extract;
pub mod prompt;
pub mod providers;
pub mod text;
pub mod voice;

#[cfg(test)]
mod test_server;

pub use config::ProviderConfig;
pub use providers::Audio;
pub use text::{Completion, ProviderFailure, RelayError, TextRelay};
pub use voice::VoiceRelay;
