use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use iocraft::prelude::*;

use skillfarm_board::api::ApiClient;
use skillfarm_board::app::App;
use skillfarm_board::color::ColorDepth;
use skillfarm_board::config::loader;
use skillfarm_board::config::types::{AppConfig, TableSource};
use skillfarm_board::engine::{Engine, EngineHandle, ServerEngine, StubEngine};
use skillfarm_board::progress::ReadinessTag;
use skillfarm_board::theme::{Background, ResolvedTheme};
use skillfarm_board::types::{DetailsPayload, RosterPayload};
use skillfarm_board::views::rows::{TableRenderer, ViewConfig};

const DEMO_DETAILS: &str = include_str!("../tests/fixtures/details.json");
const DEMO_ROSTER: &str = include_str!("../tests/fixtures/roster.json");

#[derive(Parser)]
#[command(name = "skillfarm-board", version, about = "Skill farm training dashboard")]
struct Cli {
    /// Path to config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging to debug.log.
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch both endpoints once and print a summary.
    Check,
    /// Run the dashboard against bundled sample data.
    Demo,
}

fn main() -> Result<()> {
    // Install a panic hook that writes to a file, since the fullscreen TUI
    // swallows stderr.
    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        let msg = format!("{info}\n\n{backtrace}");
        let _ = std::fs::write("panic.log", &msg);
        eprintln!("{msg}");
    }));

    let cli = Cli::parse();

    if cli.debug {
        let file = std::fs::File::create("debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(file)
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
    }

    let config = loader::load_config(cli.config.as_deref())?;

    let engine_handle = match cli.command {
        Some(Commands::Check) => return check(&config),
        Some(Commands::Demo) => demo_engine()?.start(),
        None => ServerEngine::new(ApiClient::new(&config.server)?).start(),
    };

    let color_depth = ColorDepth::detect();
    let theme = ResolvedTheme::resolve(&config.theme, Background::detect());

    tracing::info!(base_url = %config.server.base_url, "skillfarm-board starting");
    run_tui(&config, &engine_handle, &theme, color_depth)
}

fn run_tui(
    config: &AppConfig,
    engine: &EngineHandle,
    theme: &ResolvedTheme,
    color_depth: ColorDepth,
) -> Result<()> {
    // Dropping the engine handle after this returns closes its channel,
    // which stops the engine thread.
    smol::block_on(
        element! {
            App(config, engine, theme, color_depth)
        }
        .fullscreen(),
    )?;
    Ok(())
}

fn demo_engine() -> Result<StubEngine> {
    Ok(StubEngine {
        details: Some(serde_json::from_str(DEMO_DETAILS).context("parsing demo details")?),
        roster: Some(serde_json::from_str(DEMO_ROSTER).context("parsing demo roster")?),
    })
}

/// One fetch of each endpoint, summarised on stdout.
fn check(config: &AppConfig) -> Result<()> {
    let client = ApiClient::new(&config.server)?;
    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    let (details, roster): (Result<DetailsPayload>, Result<RosterPayload>) =
        runtime.block_on(async { tokio::join!(client.fetch_details(), client.fetch_roster()) });

    let mut renderer = TableRenderer::new(
        ViewConfig::new(config, &ResolvedTheme::resolve(&config.theme, Background::Dark)),
        config.server.inactive_days,
    );
    let mut failed = false;

    match details {
        Ok(payload) => match renderer.render_details(&payload) {
            Ok(()) => println!(
                "details: {} active, {} inactive",
                renderer.details().len(),
                renderer.inactive().len()
            ),
            Err(e) => {
                failed = true;
                println!("details: rejected: {e}");
            }
        },
        Err(e) => {
            failed = true;
            println!("details: {e:#}");
        }
    }

    match roster {
        Ok(payload) => {
            let characters = payload.characters().count();
            match renderer.render_roster(&payload, Utc::now()) {
                Ok(()) => {
                    let count = |tag| {
                        renderer
                            .details()
                            .rows()
                            .iter()
                            .chain(renderer.inactive().rows())
                            .filter(|r| r.readiness == Some(tag))
                            .count()
                    };
                    println!(
                        "roster: {} groups, {characters} characters ({} ready, {} maybe, {} not ready)",
                        payload.groups.len(),
                        count(ReadinessTag::Ready),
                        count(ReadinessTag::Maybe),
                        count(ReadinessTag::NotReady),
                    );
                }
                Err(e) => {
                    failed = true;
                    println!("roster: rejected: {e}");
                }
            }
        }
        Err(e) => {
            failed = true;
            println!("roster: {e:#}");
        }
    }

    if config.server.table_source == TableSource::Roster {
        println!("table source: roster (rows computed locally)");
    }
    if failed {
        anyhow::bail!("check failed");
    }
    Ok(())
}
