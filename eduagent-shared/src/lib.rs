//! # EduAgent Shared Library
//!
//! Types and persistence shared by the EduAgent API server.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, session tokens, auth middleware, ownership checks
//! - `db`: Connection pool and embedded migrations
//! - `models`: Row models for users, roadmaps and posts
//! - `gamification`: XP and level rules

pub mod auth;
pub mod db;
pub mod gamification;
pub mod models;

/// Current version of the EduAgent shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
