//! One-shot task commands.
//!
//! Each command starts a coordinator over the stored session, applies one
//! operation and disposes it, which saves the session.

use std::sync::Arc;

use anyhow::{anyhow, Context};

use taskhub_config::Config;
use taskhub_coordinator::{HeadlessSurface, LifecycleCoordinator};
use taskhub_protocols::{AgentChannelConfig, SessionStore, TaskProgressUpdate, TaskServerConfig};

/// Parse `ROLE:NAME`.
pub(crate) fn parse_agent(spec: &str) -> anyhow::Result<AgentChannelConfig> {
    let (role, name) = spec
        .split_once(':')
        .filter(|(role, name)| !role.is_empty() && !name.is_empty())
        .ok_or_else(|| anyhow!("agent must be ROLE:NAME, got '{}'", spec))?;
    Ok(AgentChannelConfig::new(role.trim(), name.trim()))
}

async fn start(config: &Config, store: Arc<dyn SessionStore>) -> anyhow::Result<LifecycleCoordinator> {
    // One-shot commands need the persisted index whatever the run setting.
    let mut config = config.clone();
    config.coordinator.restore_on_start = true;
    let coordinator =
        LifecycleCoordinator::start(&config, store, Arc::new(HeadlessSurface::new())).await?;
    Ok(coordinator)
}

pub(crate) async fn create(
    config: &Config,
    store: Arc<dyn SessionStore>,
    task: TaskServerConfig,
) -> anyhow::Result<()> {
    let coordinator = start(config, store).await?;
    let template = coordinator.orchestrator().resolve_template(&task);
    let result = coordinator.orchestrator().create_task_server(&task).await;
    coordinator.dispose().await;

    let server = result.with_context(|| format!("creating server for task {}", task.task_id))?;
    println!("Created '{}' ({}) from template '{}'", server.name, server.id, template.id);
    for channel in &server.channels {
        println!("  #{:<28} {:<9} {}", channel.name, channel.kind.as_str(), channel.id);
    }
    Ok(())
}

pub(crate) async fn add_agent(
    config: &Config,
    store: Arc<dyn SessionStore>,
    task_id: &str,
    agent: AgentChannelConfig,
) -> anyhow::Result<()> {
    let coordinator = start(config, store).await?;
    let result = coordinator.orchestrator().add_agent_channel(task_id, &agent).await;
    coordinator.dispose().await;

    let channel = result?;
    println!("Added #{} ({})", channel.name, channel.id);
    Ok(())
}

pub(crate) async fn progress(
    config: &Config,
    store: Arc<dyn SessionStore>,
    update: TaskProgressUpdate,
) -> anyhow::Result<()> {
    let coordinator = start(config, store).await?;
    let known = coordinator.orchestrator().get_task_state(&update.task_id).is_some();
    coordinator.orchestrator().update_task_progress(&update).await;
    let archived = known && coordinator.orchestrator().get_task_state(&update.task_id).is_none();
    coordinator.dispose().await;

    if !known {
        println!("No active task server for task {}", update.task_id);
    } else if archived {
        println!("Task {} is {:?}; server archived", update.task_id, update.status);
    } else {
        println!("Task {} updated: {:?}", update.task_id, update.status);
    }
    Ok(())
}

pub(crate) async fn archive(
    config: &Config,
    store: Arc<dyn SessionStore>,
    task_id: &str,
) -> anyhow::Result<()> {
    let coordinator = start(config, store).await?;
    let result = coordinator.orchestrator().archive_task_server(task_id).await;
    coordinator.dispose().await;

    result?;
    println!("Archived server for task {}", task_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_agent() {
        let agent = parse_agent("developer:Ada").unwrap();
        assert_eq!(agent.role, "developer");
        assert_eq!(agent.name, "Ada");
        assert!(parse_agent("developer").is_err());
        assert!(parse_agent(":Ada").is_err());
    }
}
