//! CLI entrypoint for review-crew
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use crew_application::{
    LlmGateway, NoProgress, ProgressNotifier, ReviewSourceUseCase, RunReviewUseCase,
    SourceRepository,
};
use crew_domain::{
    ConfigIssue, ConfigIssueCode, CrewDefinition, OutputFormat, ReviewRequest, Severity,
    parse_file_selection,
};
use crew_infrastructure::config::FileLoggingConfig;
use crew_infrastructure::{
    ConfigLoader, CrewLoader, FileConfig, FileReportStore, GitSourceRepository,
    JsonlTranscriptFactory, LocalSourceLoader, gateway_from_config,
};
use crew_presentation::{
    AppState, Cli, Command, ConsoleFormatter, OutputFormatter, ProgressReporter, ServerSettings,
    SimpleProgress, create_router, serve,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<()> {
    // .env values become process environment before any config is read
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    // === Configuration ===
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };
    if let Some(model) = &cli.model {
        config.llm.model = model.clone();
    }
    if let Command::Serve { host, port } = &command {
        if let Some(host) = host {
            config.server.host = host.clone();
        }
        if let Some(port) = port {
            config.server.port = *port;
        }
    }
    if !config.output.color {
        colored::control::set_override(false);
    }

    let _log_guard = init_logging(cli.verbose, &config.logging);
    info!("Starting review-crew");

    let needs_llm = matches!(
        command,
        Command::Review { .. } | Command::Github { .. } | Command::Serve { .. }
    );
    let mut issues = config.validate();
    if !needs_llm {
        issues.retain(|i| !matches!(i.code, ConfigIssueCode::MissingApiKey { .. }));
    }
    report_warnings(&issues);
    let (config, _) = ConfigLoader::check(config, issues)?;

    let crew = CrewLoader::load(cli.crew.as_deref())?;
    report_warnings(&crew.warnings);
    let crew = crew.definition;

    let display = ProgressDisplay::from_flags(cli.quiet, cli.verbose);

    match command {
        Command::Crew => {
            println!("{}", ConsoleFormatter::format_crew(&crew));
        }

        Command::Files { repo_url } => {
            let repository = git_repository(&config);
            let files = repository
                .list_files(&repo_url)
                .await
                .with_context(|| format!("Failed to list files in {}", repo_url))?;
            println!("{}", ConsoleFormatter::format_files(&repo_url, &files));
        }

        Command::Review {
            path,
            output,
            format,
        } => {
            let service = build_review_service(&config, crew);
            let mut request = ReviewRequest::local(path);
            if let Some(dir) = output {
                request = request.with_output_dir(dir);
            }
            let format = format
                .map(OutputFormat::from)
                .or(config.output.format)
                .unwrap_or_default();
            run_review(&service, request, format, display).await?;
        }

        Command::Github {
            repo_url,
            files,
            output,
            format,
        } => {
            let service = build_review_service(&config, crew);
            let selected = files.as_deref().map(parse_file_selection).unwrap_or_default();
            let mut request = ReviewRequest::repository(repo_url, selected);
            if let Some(dir) = output {
                request = request.with_output_dir(dir);
            }
            let format = format
                .map(OutputFormat::from)
                .or(config.output.format)
                .unwrap_or_default();
            run_review(&service, request, format, display).await?;
        }

        Command::Serve { .. } => {
            let service = build_review_service(&config, crew);
            let settings = ServerSettings {
                cors_origins: config.server.cors_origins.clone(),
                static_dir: config.server.static_dir.clone(),
                body_limit: usize::try_from(config.review.max_upload_size).unwrap_or(usize::MAX),
            };
            let router = create_router(Arc::new(AppState::new(service, settings)));
            let addr = config.server.bind_address();
            if !cli.quiet {
                println!("review-crew API listening on http://{}", addr);
            }
            serve(router, &addr)
                .await
                .with_context(|| format!("Server on {} failed", addr))?;
        }
    }

    Ok(())
}

/// Console log level from `-v` count, unless `RUST_LOG` is set; optional
/// daily file log. The returned guard flushes the file writer on drop.
fn init_logging(verbose: u8, logging: &FileLoggingConfig) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let console = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let mut guard = None;
    let file_layer = if logging.file {
        match RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("review-crew")
            .filename_suffix("log")
            .build(&logging.dir)
        {
            Ok(appender) => {
                let (writer, worker_guard) = tracing_appender::non_blocking(appender);
                guard = Some(worker_guard);
                Some(
                    fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer)
                        .with_filter(EnvFilter::new("info")),
                )
            }
            Err(e) => {
                eprintln!(
                    "warning: file logging disabled ({}): {}",
                    logging.dir.display(),
                    e
                );
                None
            }
        }
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .init();

    guard
}

fn report_warnings(issues: &[ConfigIssue]) {
    let warnings: Vec<_> = issues
        .iter()
        .filter(|i| i.severity == Severity::Warning)
        .cloned()
        .collect();
    if !warnings.is_empty() {
        eprint!("{}", ConsoleFormatter::format_issues(&warnings));
    }
}

fn git_repository(config: &FileConfig) -> GitSourceRepository {
    GitSourceRepository::new(
        config.review.to_policy(),
        config.github.max_files,
        config.github.default_files,
    )
    .with_clone_timeout(Duration::from_secs(config.github.clone_timeout_seconds))
}

// === Dependency Injection ===
fn build_review_service(
    config: &FileConfig,
    crew: CrewDefinition,
) -> ReviewSourceUseCase<dyn LlmGateway> {
    let params = config.review_params();
    let gateway: Arc<dyn LlmGateway> = Arc::new(gateway_from_config(
        config,
        |name| std::env::var(name).ok(),
        params.stage_timeout,
    ));

    let mut runner = RunReviewUseCase::new(gateway, Arc::new(crew), params);
    if config.logging.transcript {
        // One file per run, so concurrent server requests never share a transcript
        let dir = config.logging.dir.join("transcripts");
        runner = runner.with_transcripts(Arc::new(JsonlTranscriptFactory::new(dir)));
    }

    let policy = config.review.to_policy();
    ReviewSourceUseCase::new(
        runner,
        Arc::new(LocalSourceLoader::new(policy.clone())),
        Arc::new(git_repository(config)),
        Arc::new(FileReportStore::new(&config.output.dir)),
        policy,
    )
}

/// How stage progress is shown on the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProgressDisplay {
    Silent,
    /// Plain lines; interleaves cleanly with `-v` log output
    Lines,
    Bar,
}

impl ProgressDisplay {
    fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            Self::Silent
        } else if verbose > 0 {
            Self::Lines
        } else {
            Self::Bar
        }
    }
}

async fn run_review(
    service: &ReviewSourceUseCase<dyn LlmGateway>,
    request: ReviewRequest,
    format: OutputFormat,
    display: ProgressDisplay,
) -> Result<()> {
    // JSON output must stay parseable on stdout
    let display = if format == OutputFormat::Json {
        ProgressDisplay::Silent
    } else {
        display
    };
    let progress: Box<dyn ProgressNotifier> = match display {
        ProgressDisplay::Silent => Box::new(NoProgress),
        ProgressDisplay::Lines => Box::new(SimpleProgress),
        ProgressDisplay::Bar => Box::new(ProgressReporter::new()),
    };

    let outcome = service
        .execute_with_progress(request, progress.as_ref())
        .await?;

    println!("{}", ConsoleFormatter.render(&outcome, format));
    Ok(())
}
