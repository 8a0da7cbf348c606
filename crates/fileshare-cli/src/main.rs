//! Fileshare CLI: command-line client for the fileshare service.
//!
//! Set FILESHARE_URL and FILESHARE_API_TOKEN (a `.env` file works too). The token is sent
//! as `Authorization: Bearer` unless FILESHARE_AUTH_HEADER=x-api-token.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use fileshare_api_client::{ApiClient, UploadSource};
use fileshare_cli::{files_table, init_tracing, notification_line, queue_lines, OutputFormat};
use fileshare_client::{render, FileShareApp, Navigation};
use fileshare_core::models::FileRecord;
use fileshare_core::ClientConfig;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "fileshare", about = "Fileshare CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List your files and the files shared with you
    List {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Upload one or more files
    Upload {
        /// Paths of the files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Create (or show) the public share link of a file
    Share {
        /// File ID
        id: String,
        /// Also require the direct link to the raw bytes
        #[arg(long)]
        raw: bool,
    },
    /// Revoke the public share link of a file
    Hide {
        /// File ID
        id: String,
    },
    /// Rename a file
    Rename {
        /// File ID
        id: String,
        /// New display name
        name: String,
    },
    /// Replace the share token with a custom slug
    CustomUrl {
        /// File ID
        id: String,
        /// Letters, digits, '-' and '_', 4 to 64 characters
        slug: String,
    },
    /// Delete a file
    Delete {
        /// File ID
        id: String,
    },
    /// Print the link for a file according to your copy-link preference
    Copy {
        /// File ID
        id: String,
    },
    /// Check that the service is up
    Health,
}

#[derive(Serialize)]
struct ShareOutput<'a> {
    id: &'a str,
    name: &'a str,
    is_public: bool,
    share_url: Option<&'a str>,
    share_raw_url: Option<&'a str>,
    share_token: Option<&'a str>,
}

impl<'a> From<&'a FileRecord> for ShareOutput<'a> {
    fn from(record: &'a FileRecord) -> Self {
        Self {
            id: &record.id,
            name: &record.name,
            is_public: record.is_public,
            share_url: record.share_url.as_deref(),
            share_raw_url: record.share_raw_url.as_deref(),
            share_token: record.share_token.as_deref(),
        }
    }
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

/// Print notifications raised so far to stderr, before they can expire.
fn flush_notifications(app: &mut FileShareApp<ApiClient>) {
    for notification in app.state_mut().notifications_mut().drain() {
        eprintln!("{}", notification_line(&notification));
    }
}

/// Print pending notifications and fail when the backend wants a login.
fn finish(app: &mut FileShareApp<ApiClient>) -> anyhow::Result<()> {
    flush_notifications(app);

    if let Some(Navigation::Login { path }) = app.state().session().navigation() {
        bail!(
            "Authentication required. Log in at {}{} or check FILESHARE_API_TOKEN",
            app.api().base_url(),
            path
        );
    }
    Ok(())
}

async fn upload(app: &mut FileShareApp<ApiClient>, files: Vec<PathBuf>) -> anyhow::Result<()> {
    let mut sources = Vec::with_capacity(files.len());
    for path in &files {
        let source = UploadSource::from_path(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        sources.push(source);
    }

    let outcome = app.add_files(sources);
    flush_notifications(app);
    if outcome.accepted.is_empty() {
        return Ok(());
    }

    app.start_upload();
    let mut last_generation = app.state().generation();
    while app.outstanding_uploads() > 0 {
        if !app.process_next_event().await {
            break;
        }
        flush_notifications(app);
        if app.state().generation() != last_generation {
            last_generation = app.state().generation();
            for line in queue_lines(&app.render()) {
                tracing::debug!(progress = %line, "Upload progress");
            }
        }
    }

    for line in queue_lines(&app.render()) {
        println!("{}", line);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = ClientConfig::from_env().context("Invalid client configuration")?;

    if let Commands::Health = cli.command {
        let client = ApiClient::from_config(&config)?;
        let status = client
            .health()
            .await
            .context("Health check request failed")?;
        print_json(&status)?;
        if !status.is_ok() {
            bail!("Service reported status '{}'", status.status);
        }
        return Ok(());
    }

    config
        .require_token()
        .context("Set FILESHARE_API_TOKEN to use the fileshare CLI")?;
    let mut app = FileShareApp::from_config(&config)?;

    if let Err(err) = app.refresh(false).await {
        finish(&mut app)?;
        return Err(err).context("Failed to load the file list");
    }

    let result: anyhow::Result<()> = async {
        match cli.command {
            Commands::List { format } => {
                let view = render(app.state());
                match format {
                    OutputFormat::Table => print!("{}", files_table(&view)),
                    OutputFormat::Json => print_json(&view.files)?,
                }
            }
            Commands::Upload { files } => upload(&mut app, files).await?,
            Commands::Share { id, raw } => {
                let record = app.ensure_share_link(&id, raw).await?;
                print_json(&ShareOutput::from(&record))?;
            }
            Commands::Hide { id } => {
                let record = app.hide(&id).await?;
                print_json(&ShareOutput::from(&record))?;
            }
            Commands::Rename { id, name } => {
                let record = app.rename(&id, &name).await?;
                print_json(&record)?;
            }
            Commands::CustomUrl { id, slug } => {
                let record = app.set_custom_url(&id, &slug).await?;
                print_json(&ShareOutput::from(&record))?;
            }
            Commands::Delete { id } => {
                app.delete(&id).await?;
                print_json(&serde_json::json!({ "success": true, "id": id }))?;
            }
            Commands::Copy { id } => {
                let link = app.copy_link(&id).await?;
                println!("{}", link);
            }
            Commands::Health => {}
        }
        Ok(())
    }
    .await;

    finish(&mut app)?;
    result
}
