//! View-model state for everything the page renders.
//!
//! DESIGN
//! ======
//! Plain data, no widgets: the shell writes here after every action and a
//! renderer (the terminal front end, or tests) reads it back. Auth rendering
//! is derived from the session so the login form and the user badge can never
//! be visible together.

#[cfg(test)]
#[path = "ui_test.rs"]
mod ui_test;

use std::collections::BTreeSet;

use super::session::Session;
use crate::app::Action;
use crate::pages::package::{PackageView, SelectedVersion};
use crate::pages::search::SearchEntry;

/// Exactly one of the two auth views is visible at any time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthView {
    #[default]
    LoginForm,
    UserInfo { username: String },
}

impl AuthView {
    #[must_use]
    pub fn for_session(session: &Session) -> Self {
        if session.is_authenticated() {
            Self::UserInfo { username: session.username().unwrap_or_default().to_owned() }
        } else {
            Self::LoginForm
        }
    }
}

/// Input fields that can carry error styling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum FieldId {
    LoginUsername,
    LoginPassword,
    RegUsername,
    RegEmail,
    RegPassword,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldMarks(BTreeSet<FieldId>);

impl FieldMarks {
    pub fn mark_all(&mut self, fields: &[FieldId]) {
        self.0.extend(fields.iter().copied());
    }

    pub fn clear_all(&mut self, fields: &[FieldId]) {
        for field in fields {
            self.0.remove(field);
        }
    }

    #[must_use]
    pub fn is_marked(&self, field: FieldId) -> bool {
        self.0.contains(&field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A clickable control rendered next to an entry, bound to the action it fires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Control {
    pub label: &'static str,
    pub action: Action,
}

#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub auth: AuthView,
    pub field_errors: FieldMarks,
    pub register_result: Option<String>,
    pub login_result: Option<String>,
    pub create_package_result: Option<String>,
    /// Alert-style messages in the order they were raised.
    pub alerts: Vec<String>,
    pub search_results: Vec<SearchEntry>,
    pub package: Option<PackageView>,
    pub selection: Option<SelectedVersion>,
    /// Pending navigation target, e.g. `/` after logout.
    pub location: Option<String>,
}

impl UiState {
    pub fn alert(&mut self, message: impl Into<String>) {
        self.alerts.push(message.into());
    }

    pub fn navigate(&mut self, path: &str) {
        self.location = Some(path.to_owned());
    }
}
