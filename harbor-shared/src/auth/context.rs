/// Authenticated request context
///
/// After the session gate admits a request, this struct is inserted into the
/// request extensions; handlers extract it with Axum's `Extension`
/// extractor. It is the only source of caller identity; request bodies
/// never carry a user id.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of the authenticated caller, derived from the verified session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Email on the identity account
    pub email: String,

    /// Whether the email has been confirmed
    pub email_verified: bool,
}

impl AuthContext {
    /// Builds a context for a verified session
    pub fn new(user_id: Uuid, email: impl Into<String>, email_verified: bool) -> Self {
        Self {
            user_id,
            email: email.into(),
            email_verified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_fields() {
        let id = Uuid::new_v4();
        let ctx = AuthContext::new(id, "a@x.com", true);
        assert_eq!(ctx.user_id, id);
        assert_eq!(ctx.email, "a@x.com");
        assert!(ctx.email_verified);
    }
}
