//! Shotgen - product shot generator client.

mod adapters;
mod cassette;
mod cli;
mod config;
mod context;
mod controller;
mod error;
mod form;
mod output;
mod params;
mod ports;
mod session;
mod upload;
mod view;

use std::path::Path;
use std::process;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::controller::GenerationController;
use crate::error::AppError;
use crate::params::AspectRatio;
use crate::session::Session;
use crate::upload::PickedFile;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Install the stderr subscriber; `RUST_LOG` overrides the level chosen here.
fn init_tracing(verbose: bool) {
    let default = if verbose { "shotgen=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), AppError> {
    // Load config
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path).map_err(AppError::Config)?;

    // Resolve settings: flags override config
    let ratio = match cli.aspect_ratio.as_deref() {
        Some(token) => token.parse::<AspectRatio>().map_err(AppError::InvalidArgument)?,
        None => config.defaults.aspect_ratio,
    };
    let endpoint = cli.endpoint.clone().unwrap_or_else(|| config.endpoint());
    let timeout = cli.timeout.map_or_else(|| config.timeout(), Duration::from_secs);
    if timeout.is_zero() {
        return Err(AppError::InvalidArgument("timeout must be at least 1 second".into()));
    }

    // Pick the image before any service is built so picker errors need no backend
    let image = cli.image.as_deref().map(|p| PickedFile::from_path(Path::new(p))).transpose()?;

    tracing::debug!(%endpoint, timeout_secs = timeout.as_secs(), %ratio, "settings resolved");

    // Create context based on mode (live / recording / replaying)
    let replay_path = std::env::var("SHOTGEN_REPLAY").ok();
    let is_recording = std::env::var("SHOTGEN_REC").is_ok_and(|v| v == "true" || v == "1");

    let (ctx, recording_session) = if let Some(ref cassette_path) = replay_path {
        tracing::debug!(cassette = %cassette_path, "replaying");
        (ServiceContext::replaying(Path::new(cassette_path))?, None)
    } else if is_recording {
        tracing::debug!("recording mode enabled");
        let (ctx, session) = ServiceContext::recording(&endpoint)?;
        (ctx, Some(session))
    } else {
        (ServiceContext::live(&endpoint)?, None)
    };

    let mut session = Session::new(GenerationController::new(ratio), ctx.service, timeout);
    let mut stdout = std::io::stdout();

    let outcome = if cli.interactive {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        session::run_interactive(&mut session, stdin, &mut stdout).await
    } else {
        session::run_once(&mut session, image, cli.prompt.unwrap_or_default(), &mut stdout).await
    };
    drop(session);

    // Finish recording if active
    if let Some(recording) = recording_session {
        match recording.finish() {
            Ok(path) => eprintln!("Cassette saved: {}", path.display()),
            Err(e) => eprintln!("Warning: failed to save cassette: {e}"),
        }
    }

    outcome
}
