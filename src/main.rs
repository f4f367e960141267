//! TaskHub - task-driven server and channel orchestration
//!
//! Main entry point for the TaskHub CLI.

mod cli;
mod cmd_session;
mod cmd_task;

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use taskhub_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};
use taskhub_coordinator::{HeadlessSurface, LifecycleCoordinator};
use taskhub_protocols::SessionStore;
use taskhub_session::{FileSessionStore, MemorySessionStore};

use cli::{Cli, Commands};

/// Initialize tracing with console and, when enabled, daily rolling file output.
///
/// `RUST_LOG` overrides the configured level.
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let file_layer = if logging.file_enabled {
        std::fs::create_dir_all(&logging.log_dir)
            .with_context(|| format!("creating log dir {}", logging.log_dir.display()))?;
        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("taskhub")
            .filename_suffix("log")
            .max_log_files(30)
            .build(&logging.log_dir)?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // The guard flushes on drop; keep it for the whole process.
        static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
            std::sync::OnceLock::new();
        let _ = GUARD.set(guard);

        Some(fmt::layer().with_writer(non_blocking).with_ansi(false).boxed())
    } else {
        None
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(file_layer)
        .init();

    Ok(())
}

/// Load the config file. An explicit path must exist; the default may not.
fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => ConfigLoader::load(path)?,
        None => ConfigLoader::load_or_default(&ConfigLoader::default_path())?,
    };
    Ok(config)
}

fn check_config(config: &Config) -> anyhow::Result<()> {
    let result = ConfigValidator::validate(config);
    for warning in &result.warnings {
        warn!("Config warning at {}: {}", warning.path, warning.message);
    }
    if !result.is_valid() {
        let errors: Vec<_> = result
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect();
        bail!("invalid configuration:\n  {}", errors.join("\n  "));
    }
    Ok(())
}

async fn open_store(config: &Config, ephemeral: bool) -> anyhow::Result<Arc<dyn SessionStore>> {
    if ephemeral {
        info!("Using in-memory session store");
        return Ok(Arc::new(MemorySessionStore::new()));
    }
    let store = FileSessionStore::new(&config.session.storage_path)
        .await
        .with_context(|| {
            format!("opening session store at {}", config.session.storage_path.display())
        })?;
    Ok(Arc::new(store))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.logging)?;
    check_config(&config)?;

    let store = open_store(&config, cli.ephemeral).await?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(&config, store).await,
        Commands::Create {
            task_id,
            title,
            task_type,
            phase,
            priority,
            agents,
            progress_channel,
            planning_channel,
            auto_archive,
            template,
        } => {
            let mut task = taskhub_protocols::TaskServerConfig::new(task_id, title, task_type)
                .with_priority(priority)
                .with_progress_channel(progress_channel)
                .with_planning_channel(planning_channel)
                .with_auto_archive(auto_archive);
            if let Some(phase) = phase {
                task = task.with_phase(phase);
            }
            if let Some(template) = template {
                task = task.with_template(template);
            }
            for agent in &agents {
                task = task.with_agent(cmd_task::parse_agent(agent)?);
            }
            cmd_task::create(&config, store, task).await
        }
        Commands::AddAgent { task_id, agent } => {
            cmd_task::add_agent(&config, store, &task_id, cmd_task::parse_agent(&agent)?).await
        }
        Commands::Progress {
            task_id,
            status,
            phase,
            percent,
            message,
        } => {
            let mut update = taskhub_protocols::TaskProgressUpdate::new(task_id, status);
            if let Some(phase) = phase {
                update = update.with_phase(phase);
            }
            if let Some(percent) = percent {
                update = update.with_progress(percent);
            }
            if let Some(message) = message {
                update = update.with_message(message);
            }
            cmd_task::progress(&config, store, update).await
        }
        Commands::Archive { task_id } => cmd_task::archive(&config, store, &task_id).await,
        Commands::Status { json } => cmd_session::status(store.as_ref(), json).await,
        Commands::Export { path } => cmd_session::export(store.as_ref(), &path).await,
        Commands::Clear => cmd_session::clear(store.as_ref()).await,
        Commands::Templates => cmd_session::templates(&config),
    }
}

/// Run the coordinator in foreground until Ctrl-C.
async fn run(config: &Config, store: Arc<dyn SessionStore>) -> anyhow::Result<()> {
    info!("Starting TaskHub v{}", env!("CARGO_PKG_VERSION"));

    let coordinator =
        LifecycleCoordinator::start(config, store, Arc::new(HeadlessSurface::new())).await?;
    info!(
        "TaskHub running with {} active task servers ({} in view). Press Ctrl-C to stop.",
        coordinator.orchestrator().active_count(),
        coordinator.tracker().server_count()
    );

    tokio::signal::ctrl_c().await?;
    info!("Received Ctrl-C, shutting down...");
    coordinator.dispose().await;
    Ok(())
}
