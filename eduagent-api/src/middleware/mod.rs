/// Middleware modules for the API server
///
/// - `security`: Security response headers
///
/// Token authentication is applied in [`crate::app`] on top of
/// `eduagent_shared::auth::middleware::authenticate`.

pub mod security;
