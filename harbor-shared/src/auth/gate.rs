/// Session gate decision
///
/// Every protected route is guarded by the same check: there must be a
/// valid session, and the session's email must be confirmed. The decision
/// itself is a pure function of session state; the HTTP middleware in the
/// API crate performs the token validation and user lookup, then applies
/// this decision. Because the gate re-reads the user row on every request,
/// a user who confirms their email elsewhere is admitted on their next
/// request without re-authenticating.

/// Session state as observed at request time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session (missing or invalid credentials)
    Anonymous,

    /// Session exists but the email has not been confirmed
    Unverified,

    /// Session exists and the email is confirmed
    Verified,
}

/// What the gate tells the client to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Let the request through
    Allow,

    /// Redirect to the sign-in view
    SignIn,

    /// Redirect to the verify-email view
    VerifyEmail,
}

impl GateDecision {
    /// Client-side route the decision redirects to, if any
    pub fn redirect_to(&self) -> Option<&'static str> {
        match self {
            GateDecision::Allow => None,
            GateDecision::SignIn => Some("/signin"),
            GateDecision::VerifyEmail => Some("/verify-email"),
        }
    }
}

/// Decides whether a request may proceed
pub fn decide(state: SessionState) -> GateDecision {
    match state {
        SessionState::Anonymous => GateDecision::SignIn,
        SessionState::Unverified => GateDecision::VerifyEmail,
        SessionState::Verified => GateDecision::Allow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_redirects_to_signin() {
        assert_eq!(decide(SessionState::Anonymous), GateDecision::SignIn);
        assert_eq!(
            decide(SessionState::Anonymous).redirect_to(),
            Some("/signin")
        );
    }

    #[test]
    fn test_unverified_redirects_to_verify_email() {
        assert_eq!(decide(SessionState::Unverified), GateDecision::VerifyEmail);
        assert_eq!(
            decide(SessionState::Unverified).redirect_to(),
            Some("/verify-email")
        );
    }

    #[test]
    fn test_verified_is_allowed() {
        assert_eq!(decide(SessionState::Verified), GateDecision::Allow);
        assert!(decide(SessionState::Verified).redirect_to().is_none());
    }
}
