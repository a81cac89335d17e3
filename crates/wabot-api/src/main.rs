//! wabot CLI entry point.
//!
//! Binary name: `wabot`
//!
//! Parses CLI arguments, sets up tracing, then dispatches to the command
//! handler. `wabot run` is the long-running bot.

mod cli;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use wabot_observe::tracing_setup::{TracingOptions, init_tracing, shutdown_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need tracing or config
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "wabot", &mut std::io::stdout());
        return Ok(());
    }

    let (log_file, enable_otel) = match &cli.command {
        Commands::Run(args) => (Some(args.log_file.clone()), args.otel),
        _ => (None, false),
    };
    let _tracing_guard = init_tracing(&TracingOptions {
        filter: cli.log_filter().to_string(),
        log_file,
        enable_otel,
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let config_path = cli::config::resolve_config_path(cli.config.clone());

    let result = match cli.command {
        Commands::Run(args) => cli::run::run(args, &config_path).await,
        Commands::Config => cli::config::show_config(&config_path, cli.json).await,
        Commands::Completions { .. } => unreachable!("handled above"),
    };

    shutdown_tracing();
    result
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
