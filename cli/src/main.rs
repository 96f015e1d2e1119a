//! CLI entrypoint for Diagnostic Crew
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use crew_application::{
    ContextBootstrapPort, NoBootstrap, NoProgress, NoRunEventLogger, RunError, RunEventLogger,
    RunIntakeUseCase,
};
use crew_domain::{OutputFormat, config::has_errors};
use crew_infrastructure::{
    ConfigLoader, FileConfig, HttpBootstrap, HttpClient, JsonlRunEventLogger, ToolRegistry,
};
use crew_presentation::{Cli, ConsoleFormatter, OutputConfig, ProgressReporter};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the tracing subscriber.
///
/// Diagnostics go to stderr; with a log directory they are also written to
/// a daily rolling file. The returned guard flushes that file on drop.
fn init_tracing(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "diagnostic-crew.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    guard
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("could not load configuration")?
    };

    if let Some(secs) = cli.deadline {
        if secs == 0 {
            bail!("--deadline must be greater than zero");
        }
        config.run.deadline_secs = secs;
    }

    let issues = config.validate();
    if !issues.is_empty() {
        eprint!("{}", ConsoleFormatter::format_config_issues(&issues));
    }
    if has_errors(&issues) {
        bail!("invalid configuration");
    }
    Ok(config)
}

fn run_logger(cli: &Cli, config: &FileConfig) -> Arc<dyn RunEventLogger> {
    let logger = match (&cli.run_log, config.logging.resolved_dir()) {
        (Some(path), _) => JsonlRunEventLogger::new(path),
        (None, Some(dir)) if config.logging.run_log => {
            JsonlRunEventLogger::for_run(dir.join("runs"), cli.subject.as_deref())
        }
        _ => None,
    };

    match logger {
        Some(logger) => {
            info!("Run events: {}", logger.path().display());
            Arc::new(logger)
        }
        None => Arc::new(NoRunEventLogger),
    }
}

fn bootstrap(config: &FileConfig) -> Result<Arc<dyn ContextBootstrapPort>> {
    match config.backend.base_url() {
        Some(url) => {
            let client = HttpClient::new(config.backend.token.clone())
                .context("could not build HTTP client")?;
            Ok(Arc::new(
                HttpBootstrap::new(client, url).with_timeout(config.backend.timeout()),
            ))
        }
        None => {
            warn!("backend.url is not set; the run uses command-line inputs only");
            Ok(Arc::new(NoBootstrap))
        }
    }
}

/// Cancel the run on Ctrl+C; workers still in flight are recorded as gaps.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                warn!("Received Ctrl+C, cancelling run");
                cancel.cancel();
            }
            Err(e) => warn!("Failed to install Ctrl+C handler: {}", e),
        }
    });
    token
}

fn exit_code(error: &RunError) -> ExitCode {
    match error {
        RunError::Configuration(_) => ExitCode::from(2),
        RunError::BootstrapFailed(_) => ExitCode::from(3),
        RunError::InsufficientEvidence { .. } => ExitCode::from(4),
        RunError::SubmissionFailed { .. } => ExitCode::from(5),
        RunError::Coordination(_) => ExitCode::FAILURE,
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(&cli)?;
    let _guard = init_tracing(cli.verbose, config.logging.resolved_dir().as_deref());

    let output = OutputConfig::new(
        config.output.format,
        config.output.color,
        config.output.show_progress,
    )
    .with_cli(&cli);
    output.apply_color();

    let request = cli.to_request();
    if request.is_empty() {
        bail!("nothing to assess: give a subject id or one of --audio, --image, --notes");
    }

    info!("Starting Diagnostic Crew");

    // === Dependency Injection ===
    let logger = run_logger(&cli, &config);
    let bootstrap = bootstrap(&config)?;
    let gateway = Arc::new(
        ToolRegistry::from_config(&config)
            .context("could not build tool adapters")?
            .into_gateway(&config, Arc::clone(&logger)),
    );

    let use_case = RunIntakeUseCase::new(bootstrap, gateway)
        .with_logger(logger)
        .with_bootstrap_timeout(config.backend.timeout())
        .with_cancellation(cancel_on_ctrl_c());

    let result = if output.show_progress {
        let progress = ProgressReporter::new();
        use_case.execute_with_progress(request, &progress).await
    } else {
        use_case.execute_with_progress(request, &NoProgress).await
    };

    match result {
        Ok(run) => {
            let text = match output.format {
                OutputFormat::Text => ConsoleFormatter::format(&run),
                OutputFormat::Json => ConsoleFormatter::format_json(&run),
            };
            println!("{}", text);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprint!("{}", ConsoleFormatter::format_error(&e));
            Ok(exit_code(&e))
        }
    }
}
