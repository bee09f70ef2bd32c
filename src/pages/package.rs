//! Package detail page: versions, artifacts, and the publish/upload/comment forms.
//!
//! SYSTEM CONTEXT
//! ==============
//! `PackageView` is the open package; publish and comment target it.
//! `SelectedVersion` is the version picked from its list; artifact uploads
//! target it. The two are kept apart because selecting a version outlives
//! opening another package.

#[cfg(test)]
#[path = "package_test.rs"]
mod package_test;

use std::fmt;

use serde_json::Value;

use crate::app::Action;
use crate::net::api::artifact_download_endpoint;
use crate::net::types::*;
use crate::state::ui::Control;

pub const SELECT_LABEL: &str = "Select";

// =============================================================================
// VIEWS
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct PackageView {
    pub id: PackageId,
    pub name: String,
    pub description: String,
    pub versions: Vec<VersionEntry>,
}

impl PackageView {
    #[must_use]
    pub fn new(id: PackageId, response: &PackageResponse) -> Self {
        Self {
            id,
            name: response.package.name.clone(),
            description: response.package.description.clone().unwrap_or_default(),
            versions: Vec::new(),
        }
    }

    pub fn set_versions(&mut self, response: &VersionsResponse) {
        self.versions = response
            .versions
            .iter()
            .map(|v| VersionEntry::new(self.id, &v.version))
            .collect();
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionEntry {
    pub version: String,
    pub control: Control,
}

impl VersionEntry {
    #[must_use]
    pub fn new(package_id: PackageId, version: &str) -> Self {
        Self {
            version: version.to_owned(),
            control: Control {
                label: SELECT_LABEL,
                action: Action::SelectVersion { package_id, version: version.to_owned() },
            },
        }
    }
}

impl fmt::Display for VersionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} — ({})", self.version, self.control.label)
    }
}

/// A download link for one artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactLink {
    pub id: ArtifactId,
    pub href: String,
    pub label: String,
    pub size_bytes: i64,
}

impl From<&ArtifactSummary> for ArtifactLink {
    fn from(artifact: &ArtifactSummary) -> Self {
        let label = artifact
            .filename
            .as_deref()
            .filter(|name| !name.is_empty())
            .or(artifact.blob_url.as_deref())
            .unwrap_or_default()
            .to_owned();
        Self {
            id: artifact.id,
            href: artifact_download_endpoint(artifact.id),
            label,
            size_bytes: artifact.size_bytes.unwrap_or(0),
        }
    }
}

impl fmt::Display for ArtifactLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) <{}>", self.label, self.size_bytes, self.href)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SelectedVersion {
    pub package_id: PackageId,
    pub version: String,
    /// The single-version body; fetched but never rendered.
    pub detail: Option<Value>,
    pub artifacts: Vec<ArtifactLink>,
}

impl SelectedVersion {
    #[must_use]
    pub fn new(package_id: PackageId, version: &str) -> Self {
        Self { package_id, version: version.to_owned(), detail: None, artifacts: Vec::new() }
    }

    pub fn set_artifacts(&mut self, response: &ArtifactsResponse) {
        self.artifacts = response.artifacts.iter().map(ArtifactLink::from).collect();
    }
}

// =============================================================================
// FORMS
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PublishForm {
    pub version: String,
    pub metadata: String,
}

impl From<&PublishForm> for NewVersion {
    fn from(form: &PublishForm) -> Self {
        Self { version: form.version.clone(), metadata: form.metadata.clone() }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArtifactForm {
    pub blob_url: String,
    pub filename: String,
    /// Raw size input; parsed leniently on submit.
    pub size: String,
}

impl From<&ArtifactForm> for NewArtifact {
    fn from(form: &ArtifactForm) -> Self {
        Self {
            blob_url: form.blob_url.clone(),
            filename: form.filename.clone(),
            size_bytes: parse_size_input(&form.size),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommentForm {
    pub body: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CreatePackageForm {
    pub name: String,
    pub description: String,
}

impl From<&CreatePackageForm> for NewPackage {
    fn from(form: &CreatePackageForm) -> Self {
        Self { name: form.name.clone(), description: form.description.clone() }
    }
}

/// Leading-integer parse: optional sign then digits, ignoring the rest.
/// Blank or non-numeric input is `0`.
#[must_use]
pub fn parse_size_input(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0_i64, |acc, d| acc.saturating_mul(10).saturating_add(i64::from(d - b'0')));
    if negative { -magnitude } else { magnitude }
}
