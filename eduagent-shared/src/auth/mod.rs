/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and signup password policy
/// - [`jwt`]: Session token generation and validation
/// - [`middleware`]: Axum middleware that turns a token into an [`middleware::AuthContext`]
/// - [`authorization`]: Per-resource ownership checks
///
/// # Example
///
/// ```no_run
/// use eduagent_shared::auth::password::{hash_password, verify_password};
/// use eduagent_shared::auth::jwt::{create_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), "ada".to_string());
/// let token = create_token(&claims, "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
