mod cli;
mod config;
mod duration;
mod orchestrator;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use gabs_gp_client::BackoffConfig;
use gabs_server::{GameOrchestrator, Registries};
use tokio::io::{stdin, stdout, BufReader};

use cli::Cli;
use orchestrator::BridgeOrchestrator;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_filter = config::resolve_log_filter(&cli);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(log_filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::from(0),
        Err(err) => {
            tracing::error!(error = %err, "fatal startup failure");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_root = config::resolve_config_root(&cli)?;
    let descriptors = config::load_descriptors(&config_root).unwrap_or_default();

    let backoff = BackoffConfig::parse(&cli.reconnect_backoff).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let grace = duration::parse_duration(&cli.grace)?;

    let registries = Arc::new(Registries::new(config::resolve_normalize_config(&cli)));
    let orchestrator = Arc::new(BridgeOrchestrator::new(
        descriptors,
        config_root,
        backoff,
        grace,
        Arc::clone(&registries),
    ));
    gabs_server::register_builtin_tools(&registries, Arc::clone(&orchestrator) as Arc<dyn GameOrchestrator>);

    let is_http = cli.http.is_some();
    let run_result = match &cli.http {
        Some(addr) => run_http(addr, Arc::clone(&registries), Arc::clone(&orchestrator)).await,
        None => run_stdio(Arc::clone(&registries)).await,
    };

    shutdown(orchestrator, is_http).await;
    run_result
}

async fn run_stdio(registries: Arc<Registries>) -> anyhow::Result<()> {
    let reader = BufReader::new(stdin());
    let writer = stdout();
    tokio::select! {
        result = gabs_server::serve_stdio(registries, reader, writer) => {
            result.map_err(|e| anyhow::anyhow!(e.to_string()))
        }
        _ = shutdown_signal() => Ok(()),
    }
}

async fn run_http(addr: &str, registries: Arc<Registries>, orchestrator: Arc<BridgeOrchestrator>) -> anyhow::Result<()> {
    let live_games: Arc<dyn Fn() -> usize + Send + Sync> = Arc::new(move || orchestrator.live_count());
    let router = gabs_server::http_router(registries, live_games);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "HTTP transport listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = sigterm.recv() => {},
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Default shutdown policy (§5): HTTP exit leaves live games running;
/// stdio exit stops every live game. Either way, every reconnector is
/// cancelled so no task outlives the process.
async fn shutdown(orchestrator: Arc<BridgeOrchestrator>, is_http: bool) {
    if !is_http {
        for game_id in orchestrator.live_game_ids() {
            if let Err(err) = orchestrator.stop(&game_id).await {
                tracing::warn!(game_id = %game_id, error = %err, "failed to stop game during shutdown");
            }
        }
    }
    orchestrator.shutdown_mirrors().await;
}
