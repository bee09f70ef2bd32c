//! REST API helpers for the package registry.
//!
//! SYSTEM CONTEXT
//! ==============
//! One method per registry endpoint. Calls that act on behalf of the user take
//! the `Session` explicitly and read its access token at call time; refresh
//! and revoke carry the CSRF token instead.
//!
//! ERROR HANDLING
//! ==============
//! Reads decode into typed responses and fail with `ClientError`. Writes whose
//! replies the UI echoes verbatim return `RawReply` for any status, so a
//! server-reported failure still reaches the user as text.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use serde_json::Value;

use super::transport::{HttpRequest, HttpResponse, Transport};
use super::types::*;
use crate::config::{ClientConfig, csrf_cookie_name};
use crate::error::ClientError;
use crate::state::session::Session;

pub const CSRF_HEADER: &str = "X-CSRF-Token";

// =============================================================================
// ENDPOINTS
// =============================================================================

fn search_endpoint(query: &str, sort: Option<SearchSort>) -> String {
    let mut path = format!("/search?q={}", urlencoding::encode(query));
    if let Some(sort) = sort {
        path.push_str("&sort=");
        path.push_str(sort.as_query());
    }
    path
}

fn package_endpoint(id: PackageId) -> String {
    format!("/packages/{id}")
}

fn versions_endpoint(id: PackageId) -> String {
    format!("/packages/{id}/versions")
}

fn version_endpoint(id: PackageId, version: &str) -> String {
    format!("/packages/{id}/versions/{}", urlencoding::encode(version))
}

fn artifacts_endpoint(id: PackageId, version: &str) -> String {
    format!("{}/artifacts", version_endpoint(id, version))
}

fn comments_endpoint(id: PackageId) -> String {
    format!("/packages/{id}/comments")
}

fn votes_endpoint(id: PackageId) -> String {
    format!("/packages/{id}/votes")
}

/// Download link for an artifact. The client never fetches it itself.
#[must_use]
pub fn artifact_download_endpoint(id: ArtifactId) -> String {
    format!("/artifacts/{id}/download")
}

/// Reply of `POST /login`, kept whole so the caller can echo it.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginReply {
    pub status: u16,
    /// The decoded body, `None` when it was not JSON.
    pub data: Option<Value>,
    /// The grant, present only for a 2xx reply that decoded.
    pub grant: Option<TokenGrant>,
}

impl LoginReply {
    /// The grant when it actually carries an access token.
    #[must_use]
    pub fn token_grant(&self) -> Option<&TokenGrant> {
        self.grant.as_ref().filter(|grant| grant.access_token().is_some())
    }
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct ApiClient<T> {
    transport: T,
    csrf_cookie: String,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, config: &ClientConfig) -> Self {
        Self { transport, csrf_cookie: config.csrf_cookie_name() }
    }

    /// Build a client whose CSRF cookie is `<service>_csrf`.
    pub fn with_service(transport: T, service: &str) -> Self {
        Self { transport, csrf_cookie: csrf_cookie_name(service) }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Value of the readable CSRF cookie, if the server has set one.
    #[must_use]
    pub fn csrf_cookie(&self) -> Option<String> {
        self.transport.cookie(&self.csrf_cookie)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        self.transport.send(request).await
    }

    async fn send_raw(&self, request: HttpRequest) -> Result<RawReply, ClientError> {
        let response = self.send(request).await?;
        Ok(RawReply { status: response.status, body: response.body })
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// `GET /search?q=`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status or a bad body.
    pub async fn search(&self, query: &str, sort: Option<SearchSort>) -> Result<SearchResponse, ClientError> {
        self.send(HttpRequest::get(search_endpoint(query, sort))).await?.success_json()
    }

    /// `GET /packages/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status or a bad body.
    pub async fn package(&self, id: PackageId) -> Result<PackageResponse, ClientError> {
        self.send(HttpRequest::get(package_endpoint(id))).await?.success_json()
    }

    /// `GET /packages/{id}/versions`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status or a bad body.
    pub async fn versions(&self, id: PackageId) -> Result<VersionsResponse, ClientError> {
        self.send(HttpRequest::get(versions_endpoint(id))).await?.success_json()
    }

    /// `GET /packages/{id}/versions/{version}`; the body is left opaque.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status or non-JSON body.
    pub async fn version(&self, id: PackageId, version: &str) -> Result<Value, ClientError> {
        self.send(HttpRequest::get(version_endpoint(id, version))).await?.success_json()
    }

    /// `GET /packages/{id}/versions/{version}/artifacts`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status or a bad body.
    pub async fn artifacts(&self, id: PackageId, version: &str) -> Result<ArtifactsResponse, ClientError> {
        self.send(HttpRequest::get(artifacts_endpoint(id, version))).await?.success_json()
    }

    /// `GET /packages/{id}/comments`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status or a bad body.
    pub async fn comments(&self, id: PackageId) -> Result<CommentsResponse, ClientError> {
        self.send(HttpRequest::get(comments_endpoint(id))).await?.success_json()
    }

    /// `GET /health`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status or a bad body.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.send(HttpRequest::get("/health")).await?.success_json()
    }

    /// `GET /me` for the session's token.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status or a bad body.
    pub async fn me(&self, session: &Session) -> Result<Me, ClientError> {
        self.send(authorized(HttpRequest::get("/me"), session)).await?.success_json()
    }

    // -------------------------------------------------------------------------
    // Writes echoed verbatim
    // -------------------------------------------------------------------------

    /// `POST /packages`.
    ///
    /// # Errors
    ///
    /// Returns an error only when no response was received.
    pub async fn create_package(&self, session: &Session, body: &NewPackage) -> Result<RawReply, ClientError> {
        self.send_raw(authorized(HttpRequest::post("/packages"), session).json(body)?).await
    }

    /// `POST /packages/{id}/versions`.
    ///
    /// # Errors
    ///
    /// Returns an error only when no response was received.
    pub async fn publish_version(
        &self,
        session: &Session,
        id: PackageId,
        body: &NewVersion,
    ) -> Result<RawReply, ClientError> {
        self.send_raw(authorized(HttpRequest::post(versions_endpoint(id)), session).json(body)?).await
    }

    /// `POST /packages/{id}/versions/{version}/artifacts`.
    ///
    /// # Errors
    ///
    /// Returns an error only when no response was received.
    pub async fn upload_artifact(
        &self,
        session: &Session,
        id: PackageId,
        version: &str,
        body: &NewArtifact,
    ) -> Result<RawReply, ClientError> {
        self.send_raw(authorized(HttpRequest::post(artifacts_endpoint(id, version)), session).json(body)?)
            .await
    }

    /// `POST /packages/{id}/comments`.
    ///
    /// # Errors
    ///
    /// Returns an error only when no response was received.
    pub async fn post_comment(&self, session: &Session, id: PackageId, body: &NewComment) -> Result<RawReply, ClientError> {
        self.send_raw(authorized(HttpRequest::post(comments_endpoint(id)), session).json(body)?).await
    }

    /// `POST /packages/{id}/votes`.
    ///
    /// # Errors
    ///
    /// Returns an error only when no response was received.
    pub async fn vote(&self, session: &Session, id: PackageId, body: NewVote) -> Result<RawReply, ClientError> {
        self.send_raw(authorized(HttpRequest::post(votes_endpoint(id)), session).json(&body)?).await
    }

    /// `POST /tokens`, minting a long-lived API token.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status or a bad body.
    pub async fn create_api_token(&self, session: &Session, scopes: Vec<String>) -> Result<ApiToken, ClientError> {
        let request = authorized(HttpRequest::post("/tokens"), session).json(&NewApiToken { scopes })?;
        self.send(request).await?.success_json()
    }

    // -------------------------------------------------------------------------
    // Session endpoints
    // -------------------------------------------------------------------------

    /// `POST /register`. Success is judged by status alone.
    ///
    /// # Errors
    ///
    /// Returns an error only when no response was received.
    pub async fn register(&self, body: &Registration) -> Result<RawReply, ClientError> {
        self.send_raw(HttpRequest::post("/register").json(body)?).await
    }

    /// `POST /login`.
    ///
    /// # Errors
    ///
    /// Returns an error only when no response was received.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginReply, ClientError> {
        let response = self.send(HttpRequest::post("/login").json(credentials)?).await?;
        let data = response.json::<Value>().ok();
        let grant = if response.is_success() { response.json::<TokenGrant>().ok() } else { None };
        Ok(LoginReply { status: response.status, data, grant })
    }

    /// `POST /refresh`, trading the refresh cookie for a new access token.
    ///
    /// # Errors
    ///
    /// Returns an error for transport failure, non-2xx status, a bad body, or
    /// a body without a token.
    pub async fn refresh(&self, csrf: &str) -> Result<TokenGrant, ClientError> {
        let request = HttpRequest::post("/refresh").with_credentials().header(CSRF_HEADER, csrf);
        let grant: TokenGrant = self.send(request).await?.success_json()?;
        if grant.access_token().is_none() {
            return Err(ClientError::MissingField("token"));
        }
        Ok(grant)
    }

    /// `POST /tokens/revoke` for the cookie-held refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error only when no response was received.
    pub async fn revoke(&self, csrf: &str) -> Result<RawReply, ClientError> {
        let request = HttpRequest::post("/tokens/revoke")
            .with_credentials()
            .header("Content-Type", "application/json")
            .header(CSRF_HEADER, csrf);
        self.send_raw(request).await
    }

    /// `POST /tokens/revoke` naming a specific token, e.g. a long-lived API
    /// token minted by [`Self::create_api_token`].
    ///
    /// # Errors
    ///
    /// Returns an error only when no response was received.
    pub async fn revoke_api_token(&self, session: &Session, csrf: &str, token: &str) -> Result<RawReply, ClientError> {
        let request = authorized(HttpRequest::post("/tokens/revoke"), session)
            .with_credentials()
            .header(CSRF_HEADER, csrf)
            .json(&RevokeToken { token: token.to_owned() })?;
        self.send_raw(request).await
    }
}

/// Attach the bearer header when the session holds a token.
fn authorized(request: HttpRequest, session: &Session) -> HttpRequest {
    match session.bearer() {
        Some(bearer) => request.header("Authorization", bearer),
        None => request,
    }
}
