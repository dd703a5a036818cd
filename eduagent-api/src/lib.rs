//! # EduAgent API Server Library
//!
//! HTTP surface of the EduAgent learning platform: accounts, AI-generated
//! roadmaps with progress tracking, tutor chat, speech, and a community feed.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Response security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
