//! Transport seam between the registry API and the network.
//!
//! SYSTEM CONTEXT
//! ==============
//! `ApiClient` builds `HttpRequest` values and hands them to a `Transport`.
//! `HttpTransport` sends them with `reqwest` and keeps a cookie jar, which is
//! where the server's refresh cookie and the readable CSRF cookie live. Tests
//! swap in `test_helpers::MockTransport`.

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest::cookie::{CookieStore, Jar};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ClientError;

// =============================================================================
// REQUEST / RESPONSE
// =============================================================================

/// A registry request, relative to the configured origin.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Path plus optional query, always starting with `/`.
    pub path: String,
    pub headers: Vec<(&'static str, String)>,
    pub json: Option<Value>,
    /// Include same-origin credentials (cookies) with the request.
    pub credentials: bool,
}

impl HttpRequest {
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), headers: Vec::new(), json: None, credentials: false }
    }

    #[must_use]
    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    #[must_use]
    pub fn with_credentials(mut self) -> Self {
        self.credentials = true;
        self
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Parse`] if the body cannot be serialized.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, ClientError> {
        self.json = Some(serde_json::to_value(body).map_err(|e| ClientError::Parse(e.to_string()))?);
        Ok(self)
    }

    /// Look up a header value by case-insensitive name.
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    /// True for any 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Parse`] if the body is not the expected shape.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_str(&self.body).map_err(|e| ClientError::Parse(e.to_string()))
    }

    /// Decode a success body, turning any other status into [`ClientError::Status`].
    ///
    /// # Errors
    ///
    /// Returns an error for non-2xx statuses or undecodable bodies.
    pub fn success_json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        if !self.is_success() {
            return Err(ClientError::Status { status: self.status, body: self.body.clone() });
        }
        self.json()
    }
}

// =============================================================================
// TRANSPORT
// =============================================================================

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return whatever status the server produced.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] when no response was received.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError>;

    /// Read a script-visible cookie for the registry origin.
    fn cookie(&self, name: &str) -> Option<String>;
}

#[async_trait::async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        (**self).send(request).await
    }

    fn cookie(&self, name: &str) -> Option<String> {
        (**self).cookie(name)
    }
}

/// `reqwest`-backed transport with a persistent cookie jar.
pub struct HttpTransport {
    http: reqwest::Client,
    base: reqwest::Url,
    jar: Arc<Jar>,
}

impl HttpTransport {
    /// Build a transport for the configured origin.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut base = reqwest::Url::parse(&config.base_url).map_err(|e| ClientError::InvalidBaseUrl(e.to_string()))?;
        // Endpoint paths resolve under any path prefix of the base URL.
        if !base.path().ends_with('/') {
            let prefixed = format!("{}/", base.path());
            base.set_path(&prefixed);
        }
        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ClientError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base, jar })
    }

    fn url(&self, path: &str) -> Result<reqwest::Url, ClientError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidBaseUrl(e.to_string()))
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        let url = self.url(&request.path)?;
        tracing::debug!(method = %request.method, path = %request.path, "registry request");

        // The jar is shared by every request on this client; `credentials`
        // only matters to transports that scope cookies per call.
        let mut builder = self.http.request(request.method, url);
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.json {
            builder = builder.json(&body);
        }

        let response = builder.send().await.map_err(|e| ClientError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| ClientError::Transport(e.to_string()))?;
        tracing::debug!(status, "registry response");
        Ok(HttpResponse { status, body })
    }

    fn cookie(&self, name: &str) -> Option<String> {
        let header = self.jar.cookies(&self.base)?;
        cookie_value(header.to_str().ok()?, name)
    }
}

/// Extract one cookie's value from a `Cookie` header string.
#[must_use]
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_owned())
}
