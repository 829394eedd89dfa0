//! Site Scheduler - Entry Point
//!
//! Loads configuration, connects the task manager to the scheduling backend
//! (or the in-memory one with `--offline`) and runs an interactive loop that
//! feeds each line through the command pipeline.

use site_scheduler::backend::{HttpBackend, InMemoryBackend, SchedulingBackend};
use site_scheduler::command::response;
use site_scheduler::command::{CommandProcessor, Session};
use site_scheduler::core::config::{AssistantConfig, LoggingConfig};
use site_scheduler::core::error::Result;
use site_scheduler::core::SystemClock;
use site_scheduler::host::{ConsoleHost, PresentationHost};
use site_scheduler::nlp::NlpEngine;
use site_scheduler::tasks::{TaskManager, TaskStore};

use clap::Parser;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Natural-language assistant for construction schedule tasks
#[derive(Parser, Debug)]
#[command(name = "site-scheduler")]
#[command(about = "Update construction schedule tasks with plain-language commands")]
struct Args {
    /// TOML configuration file (missing file = defaults)
    #[arg(long, default_value = "site-scheduler.toml")]
    config: PathBuf,

    /// Use the in-memory backend instead of the scheduling service
    #[arg(long)]
    offline: bool,

    /// Client ID for the scheduling service (overrides config)
    #[arg(long)]
    client_id: Option<String>,

    /// Client secret for the scheduling service (overrides config)
    #[arg(long)]
    client_secret: Option<String>,
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match &logging.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn load_config(args: &Args) -> Result<AssistantConfig> {
    let mut config = AssistantConfig::load(&args.config)?;
    config.apply_env();
    if let Some(id) = &args.client_id {
        config.backend.client_id = Some(id.clone());
    }
    if let Some(secret) = &args.client_secret {
        config.backend.client_secret = Some(secret.clone());
    }
    config.validated()
}

fn connect_backend(config: &AssistantConfig, offline: bool) -> Result<Box<dyn SchedulingBackend>> {
    if offline {
        tracing::info!("Running offline with the in-memory backend");
        return Ok(Box::new(InMemoryBackend::offline()));
    }
    let client = HttpBackend::new(&config.backend)?;
    match client.check_auth_status() {
        Ok(status) => tracing::debug!(authenticated = status.authenticated, "Backend reachable"),
        Err(e) => tracing::warn!(error = %e, "Scheduling backend not reachable at start-up"),
    }
    Ok(Box::new(client))
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    init_tracing(&config.logging)?;

    tracing::info!("Site Scheduler starting...");

    let backend = connect_backend(&config, args.offline)?;
    let store = TaskStore::new(&config.storage.state_file, &config.storage.mapping_file);
    let mut manager = TaskManager::open(backend, store)?;

    match config.credentials() {
        Some((id, secret)) => {
            manager.authenticate(&id, &secret);
        }
        None if !manager.is_authenticated() => {
            tracing::warn!("No client credentials configured; type 'connect' to sign in");
        }
        None => {}
    }

    let engine = NlpEngine::with_categories(manager.categories().clone(), &config.pipeline);
    let processor = CommandProcessor::new(engine, &config.pipeline, SystemClock);
    let mut session = Session::new();
    let mut host = ConsoleHost::stdio();
    host.state_mut().authenticated = manager.is_authenticated();

    host.display_message(response::WELCOME, false);
    if !manager.is_authenticated() {
        host.display_message(response::NOT_AUTHENTICATED, false);
    }

    while let Some(line) = host.read_line("> ")? {
        match line.as_str() {
            "" => continue,
            "quit" | "q" | "exit" => break,
            "tasks" => {
                let records = manager.records();
                if records.is_empty() {
                    host.display_message("No tasks yet.", false);
                }
                for record in records {
                    host.display_message(&record.to_string(), false);
                }
            }
            _ => processor.handle_input(&mut session, &mut manager, &mut host, &line),
        }
    }

    tracing::info!("Site Scheduler shutting down");
    Ok(())
}
