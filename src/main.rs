//! CLI entry point for the LiveTakeoff API client.
//!
//! Provides subcommands for logging in and out, issuing raw authenticated
//! requests against the API, and working with jobs.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use livetakeoff_client::credentials::FileStore;
use livetakeoff_client::output::{print_jobs, print_json, print_pretty};
use livetakeoff_client::services::jobs::{JobsApi, PhotoUpload};
use livetakeoff_client::session::{LOGIN_ROUTE, Navigator};
use livetakeoff_client::{ApiClient, ClientConfig, RequestBody};
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const CREDENTIALS_ENV: &str = "LIVETAKEOFF_CREDENTIALS";
const PASSWORD_ENV: &str = "LIVETAKEOFF_PASSWORD";

#[derive(Parser)]
#[command(name = "livetakeoff")]
#[command(about = "Command-line client for the LiveTakeoff API", long_about = None)]
struct Cli {
    /// JSON file holding the access and refresh tokens
    #[arg(long, global = true, value_name = "FILE")]
    credentials: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Exchange a username and password for API tokens
    Login {
        username: String,

        /// Password (falls back to LIVETAKEOFF_PASSWORD)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Forget the stored tokens
    Logout,
    /// Report whether an access token is stored
    Status,
    /// GET a path relative to the API base URL
    Get { path: String },
    /// POST to a path, optionally with a JSON body
    Post {
        path: String,
        #[arg(long)]
        json: Option<String>,
    },
    /// PUT to a path, optionally with a JSON body
    Put {
        path: String,
        #[arg(long)]
        json: Option<String>,
    },
    /// DELETE a path
    Delete { path: String },
    /// Work with jobs
    Jobs {
        #[command(subcommand)]
        command: JobsCommand,
    },
}

#[derive(Subcommand)]
enum JobsCommand {
    /// List jobs
    List {
        /// Free-text search term
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show a single job
    Show { id: String },
    /// Post a comment on a job
    Comment { id: String, text: String },
    /// Upload one or more photos to a job
    Upload {
        id: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

/// Navigator for a terminal: the only route it knows is the login hint.
struct CliNavigator;

impl Navigator for CliNavigator {
    fn replace_route(&self, route: &str) {
        if route == LOGIN_ROUTE {
            warn!("Run `livetakeoff login <username>` to sign in again");
        } else {
            info!(route, "Navigation requested");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/livetakeoff.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("livetakeoff.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let credentials_path = cli
        .credentials
        .or_else(|| std::env::var_os(CREDENTIALS_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("credentials.json"));
    let config = ClientConfig::from_env()?;
    info!(base_url = %config.base_url, credentials = %credentials_path.display(), "Client configured");

    let client = ApiClient::new(config, Arc::new(FileStore::new(credentials_path)))?
        .with_navigator(Arc::new(CliNavigator));

    match cli.command {
        Commands::Login { username, password } => {
            let password = match password.or_else(|| std::env::var(PASSWORD_ENV).ok()) {
                Some(password) => password,
                None => bail!("a password is required (--password or {PASSWORD_ENV})"),
            };
            client.login(&username, &password).await?;
            info!(username = %username, "Signed in");
        }
        Commands::Logout => {
            client.logout().await?;
        }
        Commands::Status => {
            let authenticated = client.is_authenticated().await?;
            info!(authenticated, "Session status");
        }
        Commands::Get { path } => {
            let body = client.get(&path, None).await?;
            render(&body)?;
        }
        Commands::Post { path, json } => {
            let body = client.post(&path, json_body(json.as_deref())?, None).await?;
            render(&body)?;
        }
        Commands::Put { path, json } => {
            let body = client.put(&path, json_body(json.as_deref())?, None).await?;
            render(&body)?;
        }
        Commands::Delete { path } => {
            let body = client.delete(&path, None).await?;
            render(&body)?;
        }
        Commands::Jobs { command } => run_jobs(&client, command).await?,
    }

    Ok(())
}

#[tracing::instrument(skip(client, command))]
async fn run_jobs(client: &ApiClient, command: JobsCommand) -> Result<()> {
    match command {
        JobsCommand::List { search } => {
            let jobs = client.list_jobs(search.as_deref()).await?;
            print_jobs(&jobs);
        }
        JobsCommand::Show { id } => {
            let job = client.get_job(&id).await?;
            render(&job)?;
        }
        JobsCommand::Comment { id, text } => {
            let comment = client.add_comment(&id, &text).await?;
            render(&comment)?;
        }
        JobsCommand::Upload { id, files } => {
            let mut photos = Vec::with_capacity(files.len());
            for file in &files {
                let photo = PhotoUpload::from_path(file)
                    .await
                    .with_context(|| format!("failed to read {}", file.display()))?;
                photos.push(photo);
            }
            let uploaded = client.upload_photos(&id, photos).await?;
            info!(job_id = %id, count = files.len(), "Photos uploaded");
            render(&uploaded)?;
        }
    }
    Ok(())
}

fn json_body(raw: Option<&str>) -> Result<Option<RequestBody>> {
    raw.map(|raw| {
        serde_json::from_str::<Value>(raw)
            .map(RequestBody::Json)
            .context("--json must be valid JSON")
    })
    .transpose()
}

fn render(body: &Value) -> Result<()> {
    print_pretty(body);
    print_json(body)
}
