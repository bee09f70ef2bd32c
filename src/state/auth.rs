//! Session manager: bootstrap, login, register and logout transitions.
//!
//! SYSTEM CONTEXT
//! ==============
//! The UI shell owns one `SessionManager` for the page lifetime. Every
//! transition reports an explicit outcome; none of them can fail the page.
//!
//! TRANSITIONS
//! ===========
//! - bootstrap: silent `/refresh` using the cookie session, else anonymous
//! - login: local validation, then `/login`, adopting the grant on success
//! - register: `/register`, then exactly one login on 200/201
//! - logout: best-effort `/tokens/revoke`, then always anonymous

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use serde_json::Value;

use super::session::{AuthState, Session};
use crate::error::ClientError;
use crate::net::api::{ApiClient, LoginReply};
use crate::net::transport::Transport;
use crate::net::types::{Credentials, RawReply, Registration};

// =============================================================================
// OUTCOMES
// =============================================================================

#[derive(Debug)]
#[must_use]
pub enum BootstrapOutcome {
    Authenticated { username: Option<String> },
    Anonymous { reason: ClientError },
}

#[derive(Debug)]
#[must_use]
pub enum LoginOutcome {
    /// Username or password was empty; nothing was sent.
    MissingCredentials,
    Authenticated { username: Option<String>, data: Option<Value> },
    /// The server answered without a usable token.
    Rejected { status: u16, data: Option<Value> },
    Failed(ClientError),
}

impl LoginOutcome {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// Text the login form shows: the reply JSON, or `login failed`.
    #[must_use]
    pub fn result_text(&self) -> String {
        match self {
            Self::Authenticated { data: Some(data), .. } | Self::Rejected { data: Some(data), .. } => data.to_string(),
            _ => "login failed".to_owned(),
        }
    }
}

#[derive(Debug)]
#[must_use]
pub enum RegisterOutcome {
    /// Status 200/201; `login` is the follow-up attempt with the same credentials.
    Registered { reply: RawReply, login: LoginOutcome },
    Rejected { reply: RawReply },
    Failed(ClientError),
}

#[derive(Debug)]
#[must_use]
pub struct LogoutOutcome {
    /// What the revoke call produced. Informational only.
    pub revoke: Result<RawReply, ClientError>,
}

// =============================================================================
// MANAGER
// =============================================================================

pub struct SessionManager<T> {
    api: ApiClient<T>,
    session: Session,
}

impl<T: Transport> SessionManager<T> {
    pub fn new(api: ApiClient<T>) -> Self {
        Self { api, session: Session::anonymous() }
    }

    /// Start with a pre-issued session (e.g. a long-lived API token).
    pub fn with_session(api: ApiClient<T>, session: Session) -> Self {
        Self { api, session }
    }

    pub fn api(&self) -> &ApiClient<T> {
        &self.api
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> AuthState {
        self.session.state()
    }

    /// Forget the in-memory session, as navigating away does.
    pub fn reset(&mut self) {
        self.session.reset();
    }

    fn csrf(&self) -> String {
        self.session.resolve_csrf(self.api.csrf_cookie())
    }

    /// Silently re-establish a session from the refresh cookie.
    pub async fn bootstrap(&mut self) -> BootstrapOutcome {
        let csrf = self.csrf();
        let grant = match self.api.refresh(&csrf).await {
            Ok(grant) => grant,
            Err(reason) => return self.fall_back_anonymous(reason),
        };
        if !self.session.adopt_refresh(&grant) {
            return self.fall_back_anonymous(ClientError::MissingField("token"));
        }
        tracing::info!(username = ?self.session.username(), "session restored");
        BootstrapOutcome::Authenticated { username: self.session.username().map(str::to_owned) }
    }

    fn fall_back_anonymous(&mut self, reason: ClientError) -> BootstrapOutcome {
        tracing::debug!(error = %reason, "no session to restore");
        self.session.sign_out();
        BootstrapOutcome::Anonymous { reason }
    }

    /// Log in with form credentials. Empty fields short-circuit locally.
    pub async fn login(&mut self, username: &str, password: &str) -> LoginOutcome {
        if username.is_empty() || password.is_empty() {
            return LoginOutcome::MissingCredentials;
        }
        let credentials = Credentials { username: username.to_owned(), password: password.to_owned() };
        match self.api.login(&credentials).await {
            Ok(reply) => self.apply_login(reply),
            Err(e) => {
                tracing::warn!(error = %e, "login request failed");
                LoginOutcome::Failed(e)
            }
        }
    }

    fn apply_login(&mut self, reply: LoginReply) -> LoginOutcome {
        let adopted = reply.token_grant().is_some_and(|grant| self.session.adopt_login(grant));
        if !adopted {
            tracing::info!(status = reply.status, "login rejected");
            return LoginOutcome::Rejected { status: reply.status, data: reply.data };
        }
        tracing::info!(username = ?self.session.username(), "logged in");
        LoginOutcome::Authenticated { username: self.session.username().map(str::to_owned), data: reply.data }
    }

    /// Register, then log in once with the same credentials on 200/201.
    pub async fn register(&mut self, registration: &Registration) -> RegisterOutcome {
        let reply = match self.api.register(registration).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "register request failed");
                return RegisterOutcome::Failed(e);
            }
        };
        if !matches!(reply.status, 200 | 201) {
            tracing::info!(status = reply.status, "registration rejected");
            return RegisterOutcome::Rejected { reply };
        }
        let login = self.login(&registration.username, &registration.password).await;
        RegisterOutcome::Registered { reply, login }
    }

    /// Revoke one named token without touching the current session.
    ///
    /// # Errors
    ///
    /// Returns an error only when no response was received.
    pub async fn revoke_api_token(&self, token: &str) -> Result<RawReply, ClientError> {
        let reply = self.api.revoke_api_token(&self.session, &self.csrf(), token).await?;
        if reply.is_success() {
            tracing::info!("api token revoked");
        } else {
            tracing::warn!(status = reply.status, "api token revoke rejected");
        }
        Ok(reply)
    }

    /// Revoke best-effort, then always drop the access token and username.
    pub async fn logout(&mut self) -> LogoutOutcome {
        let csrf = self.csrf();
        let revoke = self.api.revoke(&csrf).await;
        match &revoke {
            Ok(reply) if !reply.is_success() => {
                tracing::warn!(status = reply.status, "token revoke rejected; logging out locally");
            }
            Err(e) => tracing::warn!(error = %e, "token revoke failed; logging out locally"),
            Ok(_) => {}
        }
        self.session.sign_out();
        tracing::info!("logged out");
        LogoutOutcome { revoke }
    }
}
