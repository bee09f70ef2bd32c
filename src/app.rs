//! UI shell: mounted views, action dispatch and page lifecycle.
//!
//! SYSTEM CONTEXT
//! ==============
//! `App` owns the session manager and the view-model state for one page
//! lifetime. Views are registered with `mount`; an action is dispatched only
//! when its view is mounted and visible for the current auth state, so a
//! hidden login form or a missing comment box can never fire a request.
//!
//! Every action runs as one sequential await chain and reports an
//! `ActionOutcome`. Duplicate submissions are not de-duplicated.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::collections::BTreeSet;

use crate::error::ClientError;
use crate::net::transport::Transport;
use crate::net::types::{NewArtifact, NewComment, NewPackage, NewVersion, PackageId, RawReply, Registration, SearchSort};
use crate::pages::login::{LOGIN_FIELDS, LoginForm, REGISTER_FIELDS, RegisterForm};
use crate::pages::package::{ArtifactForm, CommentForm, CreatePackageForm, PackageView, PublishForm, SelectedVersion};
use crate::pages::search;
use crate::state::auth::{BootstrapOutcome, LoginOutcome, RegisterOutcome, SessionManager};
use crate::state::ui::{AuthView, UiState};

pub const ROOT_PATH: &str = "/";

const PACKAGE_NOT_FOUND: &str = "package not found";
const SELECT_A_VERSION: &str = "select a version";

/// Views a page can mount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ViewId {
    Search,
    PackageDetail,
    PublishForm,
    ArtifactForm,
    CommentForm,
    CreatePackageForm,
    RegisterForm,
    LoginForm,
    UserInfo,
}

impl ViewId {
    pub const ALL: [ViewId; 9] = [
        ViewId::Search,
        ViewId::PackageDetail,
        ViewId::PublishForm,
        ViewId::ArtifactForm,
        ViewId::CommentForm,
        ViewId::CreatePackageForm,
        ViewId::RegisterForm,
        ViewId::LoginForm,
        ViewId::UserInfo,
    ];
}

/// A user action, bound to the view whose control fires it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Search { query: String, sort: Option<SearchSort> },
    ViewPackage { id: PackageId },
    SelectVersion { package_id: PackageId, version: String },
    PublishVersion(PublishForm),
    AddArtifact(ArtifactForm),
    PostComment(CommentForm),
    CreatePackage(CreatePackageForm),
    Register(RegisterForm),
    Login(LoginForm),
    Logout,
}

impl Action {
    /// The view that owns this action's control.
    #[must_use]
    pub fn view(&self) -> ViewId {
        match self {
            Self::Search { .. } | Self::ViewPackage { .. } => ViewId::Search,
            Self::SelectVersion { .. } => ViewId::PackageDetail,
            Self::PublishVersion(_) => ViewId::PublishForm,
            Self::AddArtifact(_) => ViewId::ArtifactForm,
            Self::PostComment(_) => ViewId::CommentForm,
            Self::CreatePackage(_) => ViewId::CreatePackageForm,
            Self::Register(_) => ViewId::RegisterForm,
            Self::Login(_) => ViewId::LoginForm,
            Self::Logout => ViewId::UserInfo,
        }
    }
}

#[derive(Debug)]
#[must_use]
pub enum ActionOutcome {
    Completed,
    /// The server answered with a non-success status.
    Rejected { status: u16 },
    /// Local validation stopped the action before any request.
    Invalid(&'static str),
    /// The action's view is not mounted or not visible.
    Unbound(ViewId),
    Failed(ClientError),
}

impl ActionOutcome {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    fn from_reply(reply: &RawReply) -> Self {
        if reply.is_success() { Self::Completed } else { Self::Rejected { status: reply.status } }
    }
}

// =============================================================================
// SHELL
// =============================================================================

pub struct App<T> {
    sessions: SessionManager<T>,
    ui: UiState,
    mounted: BTreeSet<ViewId>,
}

impl<T: Transport> App<T> {
    pub fn new(sessions: SessionManager<T>) -> Self {
        let mut app = Self { sessions, ui: UiState::default(), mounted: BTreeSet::new() };
        app.render_auth();
        app
    }

    /// Register the views present on this page.
    pub fn mount(&mut self, views: impl IntoIterator<Item = ViewId>) -> &mut Self {
        self.mounted.extend(views);
        self
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn sessions(&self) -> &SessionManager<T> {
        &self.sessions
    }

    /// Mounted and visible for the current auth state.
    #[must_use]
    pub fn is_bound(&self, view: ViewId) -> bool {
        if !self.mounted.contains(&view) {
            return false;
        }
        match view {
            ViewId::LoginForm => !self.sessions.session().is_authenticated(),
            ViewId::UserInfo => self.sessions.session().is_authenticated(),
            _ => true,
        }
    }

    /// Restore the session from the refresh cookie and render the auth view.
    pub async fn bootstrap(&mut self) -> BootstrapOutcome {
        let outcome = self.sessions.bootstrap().await;
        self.render_auth();
        outcome
    }

    /// Bootstrap unless the session already holds a token, as with a
    /// pre-issued API token that a failed refresh would otherwise sign out.
    pub async fn resume(&mut self) -> Option<BootstrapOutcome> {
        if self.sessions.session().is_authenticated() {
            tracing::debug!("session pre-seeded; skipping bootstrap");
            return None;
        }
        Some(self.bootstrap().await)
    }

    /// Page load: bootstrap, then run the initial search.
    pub async fn load(&mut self) -> BootstrapOutcome {
        let outcome = self.bootstrap().await;
        if self.is_bound(ViewId::Search) {
            if let ActionOutcome::Failed(e) = self.search(String::new(), None).await {
                tracing::warn!(error = %e, "initial search failed");
            }
        }
        outcome
    }

    /// Follow a navigation: memory is lost, cookies survive, load runs again.
    pub async fn reload(&mut self) -> BootstrapOutcome {
        self.sessions.reset();
        self.ui = UiState::default();
        self.load().await
    }

    /// Take the pending navigation target, if an action requested one.
    pub fn take_navigation(&mut self) -> Option<String> {
        self.ui.location.take()
    }

    pub async fn dispatch(&mut self, action: Action) -> ActionOutcome {
        let view = action.view();
        if !self.is_bound(view) {
            tracing::debug!(?view, "action ignored; view not bound");
            return ActionOutcome::Unbound(view);
        }
        let outcome = match action {
            Action::Search { query, sort } => self.search(query, sort).await,
            Action::ViewPackage { id } => self.view_package(id).await,
            Action::SelectVersion { package_id, version } => self.select_version(package_id, version).await,
            Action::PublishVersion(form) => self.publish_version(&form).await,
            Action::AddArtifact(form) => self.add_artifact(&form).await,
            Action::PostComment(form) => self.post_comment(&form).await,
            Action::CreatePackage(form) => self.create_package(&form).await,
            Action::Register(form) => self.register(&form).await,
            Action::Login(form) => self.login(&form).await,
            Action::Logout => self.logout().await,
        };
        self.render_auth();
        outcome
    }

    fn render_auth(&mut self) {
        self.ui.auth = AuthView::for_session(self.sessions.session());
    }

    // -------------------------------------------------------------------------
    // Browsing
    // -------------------------------------------------------------------------

    async fn search(&mut self, query: String, sort: Option<SearchSort>) -> ActionOutcome {
        match self.sessions.api().search(&query, sort).await {
            Ok(resp) => {
                self.ui.search_results = search::entries(&resp);
                ActionOutcome::Completed
            }
            Err(e) => {
                self.ui.search_results.clear();
                ActionOutcome::Failed(e)
            }
        }
    }

    async fn view_package(&mut self, id: PackageId) -> ActionOutcome {
        let api = self.sessions.api();
        let pkg = match api.package(id).await {
            Ok(pkg) => pkg,
            Err(e) => return ActionOutcome::Failed(e),
        };
        let mut view = PackageView::new(id, &pkg);
        let versions = api.versions(id).await;
        if let Ok(versions) = &versions {
            view.set_versions(versions);
        }
        self.ui.package = Some(view);
        match versions {
            Ok(_) => ActionOutcome::Completed,
            Err(e) => ActionOutcome::Failed(e),
        }
    }

    async fn select_version(&mut self, package_id: PackageId, version: String) -> ActionOutcome {
        self.ui.selection = Some(SelectedVersion::new(package_id, &version));
        let api = self.sessions.api();
        let detail = match api.version(package_id, &version).await {
            Ok(detail) => detail,
            Err(e) => return ActionOutcome::Failed(e),
        };
        let artifacts = match api.artifacts(package_id, &version).await {
            Ok(artifacts) => artifacts,
            Err(e) => return ActionOutcome::Failed(e),
        };
        if let Some(selection) = self.ui.selection.as_mut() {
            selection.detail = Some(detail);
            selection.set_artifacts(&artifacts);
        }
        ActionOutcome::Completed
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    async fn publish_version(&mut self, form: &PublishForm) -> ActionOutcome {
        let Some(id) = self.ui.package.as_ref().map(|p| p.id) else {
            return ActionOutcome::Invalid("no package open");
        };
        let reply = self
            .sessions
            .api()
            .publish_version(self.sessions.session(), id, &NewVersion::from(form))
            .await;
        self.alert_reply(reply, RawReply::json_text)
    }

    async fn add_artifact(&mut self, form: &ArtifactForm) -> ActionOutcome {
        let id = match self.resolve_open_package().await {
            Ok(Some(id)) => id,
            Ok(None) => return ActionOutcome::Invalid(PACKAGE_NOT_FOUND),
            Err(e) => return ActionOutcome::Failed(e),
        };
        let Some(version) = self.ui.selection.as_ref().map(|s| s.version.clone()) else {
            self.ui.alert(SELECT_A_VERSION);
            return ActionOutcome::Invalid(SELECT_A_VERSION);
        };
        let reply = self
            .sessions
            .api()
            .upload_artifact(self.sessions.session(), id, &version, &NewArtifact::from(form))
            .await;
        self.alert_reply(reply, RawReply::json_text)
    }

    async fn post_comment(&mut self, form: &CommentForm) -> ActionOutcome {
        let id = match self.resolve_open_package().await {
            Ok(Some(id)) => id,
            Ok(None) => {
                self.ui.alert(PACKAGE_NOT_FOUND);
                return ActionOutcome::Invalid(PACKAGE_NOT_FOUND);
            }
            Err(e) => return ActionOutcome::Failed(e),
        };
        let body = NewComment { body: form.body.clone() };
        let reply = self.sessions.api().post_comment(self.sessions.session(), id, &body).await;
        self.alert_reply(reply, |reply| reply.body.clone())
    }

    /// Look the open package up by its displayed name and take the first hit.
    /// `None` when no package is open or the search finds nothing.
    async fn resolve_open_package(&self) -> Result<Option<PackageId>, ClientError> {
        let Some(name) = self.ui.package.as_ref().map(|p| p.name.as_str()) else {
            return Ok(None);
        };
        let hits = self.sessions.api().search(name, None).await?;
        Ok(hits.results.first().map(|hit| hit.id))
    }

    async fn create_package(&mut self, form: &CreatePackageForm) -> ActionOutcome {
        let reply = self
            .sessions
            .api()
            .create_package(self.sessions.session(), &NewPackage::from(form))
            .await;
        match reply {
            Ok(reply) => {
                self.ui.create_package_result = Some(reply.json_text());
                ActionOutcome::from_reply(&reply)
            }
            Err(e) => ActionOutcome::Failed(e),
        }
    }

    fn alert_reply(&mut self, reply: Result<RawReply, ClientError>, text: impl Fn(&RawReply) -> String) -> ActionOutcome {
        match reply {
            Ok(reply) => {
                self.ui.alert(text(&reply));
                ActionOutcome::from_reply(&reply)
            }
            Err(e) => ActionOutcome::Failed(e),
        }
    }

    // -------------------------------------------------------------------------
    // Session
    // -------------------------------------------------------------------------

    async fn login(&mut self, form: &LoginForm) -> ActionOutcome {
        let outcome = self.sessions.login(&form.username, &form.password).await;
        self.ui.login_result = Some(outcome.result_text());
        if outcome.is_authenticated() {
            self.ui.field_errors.clear_all(&LOGIN_FIELDS);
        } else {
            self.ui.field_errors.mark_all(&LOGIN_FIELDS);
        }
        match outcome {
            LoginOutcome::Authenticated { .. } => ActionOutcome::Completed,
            LoginOutcome::MissingCredentials => ActionOutcome::Invalid("username and password are required"),
            LoginOutcome::Rejected { status, .. } => ActionOutcome::Rejected { status },
            LoginOutcome::Failed(e) => ActionOutcome::Failed(e),
        }
    }

    async fn register(&mut self, form: &RegisterForm) -> ActionOutcome {
        match self.sessions.register(&Registration::from(form)).await {
            RegisterOutcome::Registered { reply, login } => {
                self.ui.register_result = Some(reply.json_text());
                self.ui.field_errors.clear_all(&REGISTER_FIELDS);
                if login.is_authenticated() {
                    self.ui.navigate(ROOT_PATH);
                }
                ActionOutcome::Completed
            }
            RegisterOutcome::Rejected { reply } => {
                self.ui.register_result = Some(reply.json_text());
                self.ui.field_errors.mark_all(&REGISTER_FIELDS);
                ActionOutcome::Rejected { status: reply.status }
            }
            RegisterOutcome::Failed(e) => ActionOutcome::Failed(e),
        }
    }

    async fn logout(&mut self) -> ActionOutcome {
        let outcome = self.sessions.logout().await;
        tracing::debug!(revoked = outcome.revoke.as_ref().is_ok_and(RawReply::is_success), "logout finished");
        self.render_auth();
        self.ui.navigate(ROOT_PATH);
        ActionOutcome::Completed
    }
}
