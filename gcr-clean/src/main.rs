use clap::Parser;
use libgcrclean::{CleanError, Cleaner, Client, ClientConfig, Result};
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

mod cli;
mod context;
mod logging;
mod version;

/// Exit status of a `--strict` run that saw registry failures
const EXIT_RUN_FAILURES: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    if cli.version {
        println!("{}", version::VersionInfo::current());
        return ExitCode::SUCCESS;
    }

    // Build context with precedence: defaults > config file > env vars > CLI flags
    let ctx = match context::AppContext::build(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&ctx.config.log.level, ctx.config.log.format) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(&ctx).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Unable to start cleanup");
            ExitCode::FAILURE
        }
    }
}

async fn run(ctx: &context::AppContext) -> Result<ExitCode> {
    let config = &ctx.config;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        registry = %config.registry,
        projects = ?ctx.projects,
        noop = config.noop,
        "gcr-clean starting"
    );

    let credentials =
        libgcrclean::auth::resolve_async(&config.registry, config.account.as_deref()).await?;

    let client_config = ClientConfig::new()
        .with_timeout(config.network.timeout)
        .with_max_idle_per_host(config.parallel);
    let client = Client::with_config(&config.registry, credentials, client_config).map_err(|e| {
        CleanError::config_with_source("Invalid registry", Some(config.registry.as_str()), e)
    })?;

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_interrupt(cancel.clone()));

    let report = Cleaner::new(Arc::new(client), ctx.scope(), ctx.clean_options())
        .with_cancellation(cancel)
        .run()
        .await;

    if ctx.strict && report.has_failures() {
        tracing::warn!("Run finished with failures");
        return Ok(ExitCode::from(EXIT_RUN_FAILURES));
    }
    Ok(ExitCode::SUCCESS)
}

/// Cancels `cancel` on the first Ctrl-C.
async fn cancel_on_interrupt(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::warn!("Interrupt received, finishing outstanding work");
            cancel.cancel();
        }
        Err(e) => tracing::warn!(error = %e, "Unable to listen for interrupts"),
    }
}
