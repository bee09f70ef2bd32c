use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ebuild_client::app::{Action, ActionOutcome, App, ViewId};
use ebuild_client::config::ClientConfig;
use ebuild_client::error::ClientError;
use ebuild_client::net::api::ApiClient;
use ebuild_client::net::transport::HttpTransport;
use ebuild_client::net::types::{NewVote, PackageId, SearchSort};
use ebuild_client::pages::login::{LoginForm, RegisterForm};
use ebuild_client::pages::package::{ArtifactForm, CommentForm, CreatePackageForm, PublishForm};
use ebuild_client::state::auth::{BootstrapOutcome, SessionManager};
use ebuild_client::state::session::Session;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("server rejected the request with status {status}")]
    Rejected { status: u16 },
    #[error("{0}")]
    Invalid(&'static str),
    #[error("{0:?} is not available in the current session")]
    Unbound(ViewId),
    #[error("missing credentials; pass --username and --password or set EBUILD_USERNAME/EBUILD_PASSWORD")]
    MissingCredentials,
}

#[derive(Parser, Debug)]
#[command(name = "ebuild", about = "ebuild package registry client")]
struct Cli {
    #[arg(long, env = "EBUILD_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "EBUILD_SERVICE_NAME")]
    service: Option<String>,

    #[arg(long, env = "EBUILD_USERNAME")]
    username: Option<String>,

    #[arg(long, env = "EBUILD_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Pre-issued API token; skips the cookie bootstrap.
    #[arg(long, env = "EBUILD_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Health,
    Search {
        #[arg(default_value = "")]
        query: String,
        #[arg(long)]
        sort: Option<SearchSort>,
    },
    Show {
        id: PackageId,
    },
    Artifacts {
        id: PackageId,
        version: String,
    },
    Comments {
        id: PackageId,
    },
    Create {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    Publish {
        id: PackageId,
        version: String,
        #[arg(long, default_value = "")]
        metadata: String,
    },
    Upload {
        id: PackageId,
        version: String,
        #[arg(long)]
        blob_url: String,
        #[arg(long, default_value = "")]
        filename: String,
        #[arg(long, default_value = "0")]
        size: String,
    },
    Comment {
        id: PackageId,
        body: String,
    },
    Vote {
        id: PackageId,
        #[arg(allow_hyphen_values = true)]
        value: i32,
    },
    Register {
        username: String,
        email: String,
        password: String,
    },
    Login,
    Logout,
    Me,
    Token {
        #[arg(long = "scope")]
        scopes: Vec<String>,
    },
    /// Revoke a specific token, such as one printed by `token`.
    Revoke {
        token: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    let api = ApiClient::new(HttpTransport::new(&config)?, &config);

    let mut app = match &cli.token {
        Some(token) => App::new(SessionManager::with_session(api, Session::with_access_token(token.as_str()))),
        None => App::new(SessionManager::new(api)),
    };
    app.mount(ViewId::ALL);
    if let Some(BootstrapOutcome::Anonymous { reason }) = app.resume().await {
        tracing::debug!(error = %reason, "continuing without a session");
    }

    let result = run(&mut app, &cli).await;
    for alert in &app.ui().alerts {
        println!("{alert}");
    }
    result
}

fn build_config(cli: &Cli) -> Result<ClientConfig, ClientError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url)?;
    }
    if let Some(service) = cli.service.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        config.service_name = service.to_owned();
    }
    Ok(config)
}

async fn run(app: &mut App<HttpTransport>, cli: &Cli) -> Result<(), CliError> {
    match &cli.command {
        Command::Health => {
            let health = app.sessions().api().health().await?;
            println!("{}", health.status);
        }
        Command::Search { query, sort } => {
            completed(app.dispatch(Action::Search { query: query.clone(), sort: *sort }).await)?;
            for entry in &app.ui().search_results {
                println!("{entry}");
            }
        }
        Command::Show { id } => {
            completed(app.dispatch(Action::ViewPackage { id: *id }).await)?;
            if let Some(package) = &app.ui().package {
                println!("{} — {}", package.name, package.description);
                for version in &package.versions {
                    println!("  {version}");
                }
            }
        }
        Command::Artifacts { id, version } => {
            select_version(app, *id, version).await?;
            if let Some(selection) = &app.ui().selection {
                for artifact in &selection.artifacts {
                    println!("{artifact}");
                }
            }
        }
        Command::Comments { id } => {
            for comment in app.sessions().api().comments(*id).await?.comments {
                println!("[{}] {}", comment.id, comment.body);
            }
        }
        Command::Create { name, description } => {
            sign_in_if_requested(app, cli).await?;
            let form = CreatePackageForm { name: name.clone(), description: description.clone() };
            let outcome = app.dispatch(Action::CreatePackage(form)).await;
            if let Some(result) = &app.ui().create_package_result {
                println!("{result}");
            }
            completed(outcome)?;
        }
        Command::Publish { id, version, metadata } => {
            sign_in_if_requested(app, cli).await?;
            completed(app.dispatch(Action::ViewPackage { id: *id }).await)?;
            let form = PublishForm { version: version.clone(), metadata: metadata.clone() };
            completed(app.dispatch(Action::PublishVersion(form)).await)?;
        }
        Command::Upload { id, version, blob_url, filename, size } => {
            sign_in_if_requested(app, cli).await?;
            completed(app.dispatch(Action::ViewPackage { id: *id }).await)?;
            select_version(app, *id, version).await?;
            let form = ArtifactForm { blob_url: blob_url.clone(), filename: filename.clone(), size: size.clone() };
            completed(app.dispatch(Action::AddArtifact(form)).await)?;
        }
        Command::Comment { id, body } => {
            sign_in_if_requested(app, cli).await?;
            completed(app.dispatch(Action::ViewPackage { id: *id }).await)?;
            completed(app.dispatch(Action::PostComment(CommentForm { body: body.clone() })).await)?;
        }
        Command::Vote { id, value } => {
            sign_in_if_requested(app, cli).await?;
            let sessions = app.sessions();
            let reply = sessions.api().vote(sessions.session(), *id, NewVote { value: *value }).await?;
            println!("{}", reply.json_text());
            if !reply.is_success() {
                return Err(CliError::Rejected { status: reply.status });
            }
        }
        Command::Register { username, email, password } => {
            let form = RegisterForm { username: username.clone(), email: email.clone(), password: password.clone() };
            let outcome = app.dispatch(Action::Register(form)).await;
            if let Some(result) = &app.ui().register_result {
                println!("{result}");
            }
            completed(outcome)?;
        }
        Command::Login => {
            sign_in(app, cli).await?;
            if let Some(result) = &app.ui().login_result {
                println!("{result}");
            }
        }
        Command::Logout => {
            sign_in_if_requested(app, cli).await?;
            completed(app.dispatch(Action::Logout).await)?;
            println!("logged out");
        }
        Command::Me => {
            sign_in_if_requested(app, cli).await?;
            let sessions = app.sessions();
            let me = sessions.api().me(sessions.session()).await?;
            println!("{} ({}) role={}", me.username, me.id, me.role);
        }
        Command::Token { scopes } => {
            sign_in_if_requested(app, cli).await?;
            let sessions = app.sessions();
            let token = sessions.api().create_api_token(sessions.session(), scopes.clone()).await?;
            println!("{}", token.token);
        }
        Command::Revoke { token } => {
            sign_in_if_requested(app, cli).await?;
            let reply = app.sessions().revoke_api_token(token).await?;
            println!("{}", reply.json_text());
            if !reply.is_success() {
                return Err(CliError::Rejected { status: reply.status });
            }
        }
    }
    Ok(())
}

async fn select_version(app: &mut App<HttpTransport>, package_id: PackageId, version: &str) -> Result<(), CliError> {
    completed(app.dispatch(Action::SelectVersion { package_id, version: version.to_owned() }).await)
}

/// Log in when credentials were supplied and no session is held yet.
async fn sign_in_if_requested(app: &mut App<HttpTransport>, cli: &Cli) -> Result<(), CliError> {
    if cli.username.is_none() || app.sessions().session().is_authenticated() {
        return Ok(());
    }
    sign_in(app, cli).await
}

async fn sign_in(app: &mut App<HttpTransport>, cli: &Cli) -> Result<(), CliError> {
    let (Some(username), Some(password)) = (&cli.username, &cli.password) else {
        return Err(CliError::MissingCredentials);
    };
    let form = LoginForm { username: username.clone(), password: password.clone() };
    completed(app.dispatch(Action::Login(form)).await)
}

fn completed(outcome: ActionOutcome) -> Result<(), CliError> {
    match outcome {
        ActionOutcome::Completed => Ok(()),
        ActionOutcome::Rejected { status } => Err(CliError::Rejected { status }),
        ActionOutcome::Invalid(reason) => Err(CliError::Invalid(reason)),
        ActionOutcome::Unbound(view) => Err(CliError::Unbound(view)),
        ActionOutcome::Failed(e) => Err(e.into()),
    }
}
