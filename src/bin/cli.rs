//! CLI binary for commerce-admin.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use commerce_admin::{AdminConfig, AdminCore, Command as UserCommand, DispatchOptions};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command-line front end for the commerce admin orchestration core.
#[derive(Parser)]
#[command(name = "commerce-admin", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask the backend whether the AI interpreter is available.
    Status,

    /// Dispatch a typed report command.
    Command {
        /// The command text.
        text: String,

        /// Deadline for the AI attempt, in milliseconds.
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Skip the AI interpreter and use the local one.
        #[arg(long)]
        local: bool,
    },

    /// Dispatch a recorded voice command.
    Audio {
        /// Audio file to upload.
        file: PathBuf,

        /// Deadline for the AI attempt, in milliseconds.
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Manage owner/member relations.
    Relations {
        #[command(subcommand)]
        action: RelationsAction,
    },
}

#[derive(Subcommand)]
enum RelationsAction {
    /// List the member ids currently related to an owner.
    List { owner: u64 },

    /// Create one relation per member id.
    Add {
        owner: u64,
        #[arg(required = true)]
        members: Vec<u64>,
    },

    /// Remove all current relations of an owner, then create the given ones.
    Replace { owner: u64, members: Vec<u64> },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only JSON.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("commerce_admin=info,commerce_gateway=info")
        }))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => AdminConfig::from_file(path)?,
        None => {
            let path = AdminConfig::default_config_path();
            if path.exists() {
                AdminConfig::from_file(&path)?
            } else {
                AdminConfig::default()
            }
        }
    };
    config.apply_env_overrides();
    let core = AdminCore::from_config(&config)?;
    info!(base_url = %config.gateway.base_url, "commerce-admin ready");

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, cancelling");
            ctrl_c.cancel();
        }
    });

    match cli.command {
        Command::Status => print_json(&core.probe().probe(&cancel).await),
        Command::Command {
            text,
            timeout_ms,
            local,
        } => {
            let options = DispatchOptions {
                timeout: timeout_ms.map(Duration::from_millis),
                force_local: local,
            };
            let outcome = core
                .dispatcher()
                .dispatch(&UserCommand::text(text), &options, &cancel)
                .await;
            print_json(&outcome)
        }
        Command::Audio { file, timeout_ms } => {
            let payload = tokio::fs::read(&file).await?;
            let filename = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let options = DispatchOptions {
                timeout: timeout_ms.map(Duration::from_millis),
                force_local: false,
            };
            let outcome = core
                .dispatcher()
                .dispatch(&UserCommand::audio(payload, filename), &options, &cancel)
                .await;
            print_json(&outcome)
        }
        Command::Relations { action } => run_relations(&core, action, &cancel).await,
    }
}

async fn run_relations(
    core: &AdminCore,
    action: RelationsAction,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let reconciler = core.reconciler();
    match action {
        RelationsAction::List { owner } => {
            let member_ids = reconciler.current_member_ids(owner).await?;
            print_json(&serde_json::json!({
                "ownerId": owner,
                "memberIds": member_ids,
            }))
        }
        RelationsAction::Add { owner, members } => {
            let report = reconciler.create_all(owner, &members, cancel).await;
            info!("{}", report.summary());
            print_json(&report)
        }
        RelationsAction::Replace { owner, members } => {
            let report = reconciler.replace_all(owner, &members, cancel).await;
            info!("{}", report.creation.summary());
            print_json(&report)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
