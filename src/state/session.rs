//! Session context for the current page lifetime.
//!
//! SYSTEM CONTEXT
//! ==============
//! Owned by the UI shell through `SessionManager` and passed by reference to
//! every request-issuing call, which reads the access token at call time.
//! Nothing here persists: the refresh cookie lives in the transport's jar.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use crate::net::types::TokenGrant;

/// Logical authentication state derived from the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated,
}

/// In-memory session tokens. Invariant: authenticated iff `access_token` is set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    access_token: Option<String>,
    username: Option<String>,
    csrf_token: Option<String>,
}

impl Session {
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Start from a long-lived API token (created via `POST /tokens`).
    #[must_use]
    pub fn with_access_token(token: impl Into<String>) -> Self {
        let token = token.into();
        Self { access_token: (!token.is_empty()).then_some(token), ..Self::default() }
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        if self.access_token.is_some() { AuthState::Authenticated } else { AuthState::Anonymous }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state() == AuthState::Authenticated
    }

    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    #[must_use]
    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    /// `Authorization` header value, or `None` when anonymous.
    #[must_use]
    pub fn bearer(&self) -> Option<String> {
        self.access_token.as_ref().map(|token| format!("Bearer {token}"))
    }

    /// CSRF value for refresh/revoke: memory first, then the cookie, else empty.
    #[must_use]
    pub fn resolve_csrf(&self, cookie: Option<String>) -> String {
        self.csrf_token
            .clone()
            .or(cookie)
            .unwrap_or_default()
    }

    /// Adopt a `/login` grant. Returns false (and changes nothing) without a token.
    pub fn adopt_login(&mut self, grant: &TokenGrant) -> bool {
        let Some(token) = grant.access_token() else {
            return false;
        };
        self.access_token = Some(token.to_owned());
        self.username = grant.username().map(str::to_owned);
        self.csrf_token = grant.csrf().map(str::to_owned);
        true
    }

    /// Adopt a `/refresh` grant; a missing `csrf` keeps the previous token.
    pub fn adopt_refresh(&mut self, grant: &TokenGrant) -> bool {
        let Some(token) = grant.access_token() else {
            return false;
        };
        self.access_token = Some(token.to_owned());
        self.username = grant.username().map(str::to_owned);
        if let Some(csrf) = grant.csrf() {
            self.csrf_token = Some(csrf.to_owned());
        }
        true
    }

    /// Drop the access token and username. The CSRF token stays in memory.
    pub fn sign_out(&mut self) {
        self.access_token = None;
        self.username = None;
    }

    /// Forget everything, as a page navigation does.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
