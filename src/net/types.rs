//! Wire types for the registry REST API.
//!
//! DESIGN
//! ======
//! Response types are lenient: collections default to empty and most fields
//! are optional, because the registry returns loosely-shaped rows and the
//! views already define what an absent value renders as.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type PackageId = i64;
pub type ArtifactId = i64;

// =============================================================================
// RESPONSES
// =============================================================================

/// One row of `GET /search`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SearchHit {
    pub id: PackageId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub download_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PackageSummary {
    #[serde(default)]
    pub id: Option<PackageId>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_by: Option<i64>,
    #[serde(default)]
    pub token_required: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PackageResponse {
    pub package: PackageSummary,
    #[serde(default)]
    pub latest_version: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VersionSummary {
    pub version: String,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub released_at: Option<String>,
    #[serde(default)]
    pub is_deprecated: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VersionsResponse {
    #[serde(default)]
    pub versions: Vec<VersionSummary>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ArtifactSummary {
    pub id: ArtifactId,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub blob_url: Option<String>,
    #[serde(default)]
    pub size_bytes: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ArtifactsResponse {
    #[serde(default)]
    pub artifacts: Vec<ArtifactSummary>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CommentSummary {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub package_version_id: Option<Value>,
    pub body: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CommentsResponse {
    #[serde(default)]
    pub comments: Vec<CommentSummary>,
}

/// Body of a successful `/login` or `/refresh`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TokenGrant {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub csrf: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
}

impl TokenGrant {
    /// The access token, treating an empty string as absent.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        non_empty(self.token.as_deref())
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        non_empty(self.username.as_deref())
    }

    #[must_use]
    pub fn csrf(&self) -> Option<&str> {
        non_empty(self.csrf.as_deref())
    }
}

/// `GET /me`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Me {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub role: String,
}

/// `POST /tokens`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiToken {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// A response the caller shows verbatim instead of interpreting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReply {
    pub status: u16,
    pub body: String,
}

impl RawReply {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Compact JSON when the body parses, otherwise the raw text.
    #[must_use]
    pub fn json_text(&self) -> String {
        serde_json::from_str::<Value>(&self.body)
            .map_or_else(|_| self.body.clone(), |value| value.to_string())
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials { username: self.username.clone(), password: self.password.clone() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPackage {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewVersion {
    pub version: String,
    pub metadata: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewArtifact {
    pub blob_url: String,
    pub filename: String,
    pub size_bytes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewComment {
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NewVote {
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewApiToken {
    pub scopes: Vec<String>,
}

/// Body of `POST /tokens/revoke` naming one token to revoke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevokeToken {
    pub token: String,
}

/// Ordering accepted by `GET /search?sort=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchSort {
    MostDownloaded,
    Random,
    Newest,
}

impl SearchSort {
    #[must_use]
    pub fn as_query(self) -> &'static str {
        match self {
            Self::MostDownloaded => "most_downloaded",
            Self::Random => "random",
            Self::Newest => "newest",
        }
    }
}

impl std::str::FromStr for SearchSort {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "most_downloaded" => Ok(Self::MostDownloaded),
            "random" => Ok(Self::Random),
            "newest" => Ok(Self::Newest),
            other => Err(format!("unknown sort '{other}' (expected most_downloaded, random or newest)")),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
