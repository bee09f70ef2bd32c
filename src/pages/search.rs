//! Search results list.

#[cfg(test)]
#[path = "search_test.rs"]
mod search_test;

use std::fmt;

use crate::app::Action;
use crate::net::types::{PackageId, SearchHit, SearchResponse};
use crate::state::ui::Control;

pub const VIEW_LABEL: &str = "View";

/// One rendered hit with its `View` control.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchEntry {
    pub id: PackageId,
    pub name: String,
    pub description: String,
    pub control: Control,
}

impl From<&SearchHit> for SearchEntry {
    fn from(hit: &SearchHit) -> Self {
        Self {
            id: hit.id,
            name: hit.name.clone(),
            description: hit.description.clone().unwrap_or_default(),
            control: Control { label: VIEW_LABEL, action: Action::ViewPackage { id: hit.id } },
        }
    }
}

impl fmt::Display for SearchEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} — {} ({})", self.id, self.name, self.description, self.control.label)
    }
}

#[must_use]
pub fn entries(response: &SearchResponse) -> Vec<SearchEntry> {
    response.results.iter().map(SearchEntry::from).collect()
}
