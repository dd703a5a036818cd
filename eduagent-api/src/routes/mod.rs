/// API route handlers
///
/// - `health`: Banner and health check
/// - `auth`: Signup, login and the current user's profile
/// - `agent`: Roadmap generation, tutor chat and speech synthesis
/// - `roadmaps`: Saved roadmaps and module progress
/// - `posts`: Community feed

pub mod agent;
pub mod auth;
pub mod health;
pub mod posts;
pub mod roadmaps;
