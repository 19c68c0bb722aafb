//! `bizdash-tui`: terminal dashboard for the business-admin backend.
//!
//! One table screen per collection (Employees, Projects, Customers,
//! Finance, Assets), switched with 1-5 or Tab. Each screen is backed by a
//! `CrudPresenter`; store snapshots reach the UI through the data bridge.
//!
//! Logs go to a file (default: the bizdash data dir) so they never corrupt
//! the terminal.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use bizdash_config::FileVault;
use bizdash_core::{BackendConfig, Session};

use crate::app::App;

/// Terminal dashboard for employees, projects, customers, finance and assets.
#[derive(Parser, Debug)]
#[command(name = "bizdash-tui", version, about)]
struct Cli {
    /// Backend profile to use
    #[arg(short = 'p', long, env = "BIZDASH_PROFILE")]
    profile: Option<String>,

    /// API base URL (overrides profile)
    #[arg(short = 'u', long, env = "BIZDASH_API_URL")]
    api_url: Option<String>,

    /// Log file path (defaults to bizdash-tui.log in the data dir)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-based tracing. Stdout belongs to the terminal UI. Hold the guard
/// for the lifetime of the app so buffered lines are flushed.
fn setup_tracing(cli: &Cli) -> Result<WorkerGuard> {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "bizdash_tui={log_level},bizdash_core={log_level},bizdash_api={log_level}"
        ))
    });

    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| bizdash_config::data_dir().join("bizdash-tui.log"));
    let log_dir = log_file
        .parent()
        .map_or_else(|| PathBuf::from("."), PathBuf::from);
    std::fs::create_dir_all(&log_dir)
        .wrap_err_with(|| format!("creating log directory {}", log_dir.display()))?;
    let log_filename = log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("bizdash-tui.log"));

    let file_appender = tracing_appender::rolling::never(&log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    Ok(guard)
}

/// Resolve the profile and build a session for it, restoring any session
/// the CLI or a previous run stored.
fn build_session(cli: &Cli) -> Result<(String, Option<String>, Session)> {
    let cfg = bizdash_config::load_config_or_default();
    let profile_name = cfg.active_profile_name(cli.profile.as_deref());
    let profile = cfg.profiles.get(&profile_name).cloned().unwrap_or_default();

    let mut backend: BackendConfig =
        bizdash_config::profile_to_backend_config(&profile, &cfg.defaults)?;
    if let Some(ref raw) = cli.api_url {
        backend.url = raw
            .parse::<url::Url>()
            .wrap_err_with(|| format!("invalid API URL: {raw}"))?;
    }

    let client = backend.connect()?;
    let vault = Arc::new(FileVault::for_profile(&profile_name));
    let session = Session::new(client, vault);
    session.init();
    Ok((profile_name, bizdash_config::resolve_username(&profile), session))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks first, so a panic during setup still restores the terminal
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli)?;

    let (profile_name, username, session) = build_session(&cli)?;
    info!(
        profile = %profile_name,
        url = %session.client().base_url(),
        restored = session.is_authenticated(),
        "starting bizdash-tui"
    );

    let mut app = App::new(Arc::new(session), profile_name, username);
    app.run().await?;

    Ok(())
}
