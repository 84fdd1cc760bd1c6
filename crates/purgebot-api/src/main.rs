//! purgebot entry point.
//!
//! Binary name: `purgebot`
//!
//! Parses CLI arguments, initializes tracing, the registry and services, then
//! dispatches to the command handler or starts the purge loop.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    purgebot_observe::tracing_setup::init_tracing(log_filter(cli.verbose, cli.quiet), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialise tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "purgebot", &mut std::io::stdout());
        return Ok(());
    }

    let force_dry_run = match &cli.command {
        Commands::Run { dry_run, .. } | Commands::Tick { dry_run } => *dry_run,
        _ => false,
    };
    let state = AppState::init(force_dry_run).await?;

    let result = match cli.command {
        Commands::Register { channel, duration } => {
            cli::channel::register(&state, channel, &duration, cli.json).await
        }
        Commands::Unregister { channel } => cli::channel::unregister(&state, channel, cli.json).await,
        Commands::Info { channel } => cli::channel::info(&state, channel, cli.json).await,
        Commands::List => cli::channel::list(&state, cli.json).await,
        Commands::Run { dry_run, interval } => {
            cli::run::run(&state, dry_run, interval, cli.quiet).await
        }
        Commands::Tick { dry_run } => cli::run::tick(&state, dry_run, cli.json).await,
        Commands::Completions { .. } => unreachable!("handled above"),
    };

    purgebot_observe::tracing_setup::shutdown_tracing();
    result
}

/// Default log filter for the given verbosity. `RUST_LOG` overrides it.
fn log_filter(verbose: u8, quiet: bool) -> &'static str {
    match verbose {
        0 if quiet => "error",
        0 => "warn",
        1 => "info,purgebot=debug",
        _ => "trace",
    }
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_filter() {
        assert_eq!(log_filter(0, false), "warn");
        assert_eq!(log_filter(0, true), "error");
        assert_eq!(log_filter(1, false), "info,purgebot=debug");
        assert_eq!(log_filter(3, true), "trace");
    }
}
