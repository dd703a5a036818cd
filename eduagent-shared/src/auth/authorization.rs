/// Resource ownership checks
///
/// Ownership is checked per request in the handler after the row has been
/// loaded; the storage layer does not filter by owner for single-resource
/// lookups. Keeping the check here means "not found" and "not yours" stay
/// distinct errors.
///
/// # Example
///
/// ```
/// use eduagent_shared::auth::authorization::{require_owner, Owned};
/// use eduagent_shared::auth::middleware::AuthContext;
/// use uuid::Uuid;
///
/// struct Note { owner: Uuid }
///
/// impl Owned for Note {
///     fn owner_id(&self) -> Uuid { self.owner }
/// }
///
/// let me = AuthContext { user_id: Uuid::new_v4(), username: "ada".into() };
/// let mine = Note { owner: me.user_id };
/// let theirs = Note { owner: Uuid::new_v4() };
///
/// assert!(require_owner(&me, &mine).is_ok());
/// assert!(require_owner(&me, &theirs).is_err());
/// ```

use uuid::Uuid;

use super::middleware::AuthContext;

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Caller does not own the resource
    #[error("Not authorized to access this resource")]
    NotOwner {
        /// Who asked
        user_id: Uuid,
        /// Who owns it
        owner_id: Uuid,
    },
}

/// A resource that belongs to exactly one user
pub trait Owned {
    /// The owning user's ID
    fn owner_id(&self) -> Uuid;
}

/// Succeeds only if the authenticated caller owns `resource`
///
/// # Errors
///
/// Returns `AuthzError::NotOwner` on mismatch
pub fn require_owner<R: Owned + ?Sized>(auth: &AuthContext, resource: &R) -> Result<(), AuthzError> {
    let owner_id = resource.owner_id();

    if owner_id != auth.user_id {
        tracing::warn!(
            user_id = %auth.user_id,
            owner_id = %owner_id,
            "Ownership check failed"
        );
        return Err(AuthzError::NotOwner {
            user_id: auth.user_id,
            owner_id,
        });
    }

    Ok(())
}
