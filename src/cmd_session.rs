//! Session and template commands.

use std::path::Path;

use taskhub_config::Config;
use taskhub_coordinator::commands;
use taskhub_core::TemplateRegistry;
use taskhub_protocols::SessionStore;

pub(crate) async fn status(store: &dyn SessionStore, json: bool) -> anyhow::Result<()> {
    let status = commands::session_status(store).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("{}", status);
    }
    Ok(())
}

pub(crate) async fn export(store: &dyn SessionStore, path: &Path) -> anyhow::Result<()> {
    let summary = commands::export_session(store, path).await?;
    println!("Exported session {} to {}", summary.session_id, path.display());
    Ok(())
}

pub(crate) async fn clear(store: &dyn SessionStore) -> anyhow::Result<()> {
    commands::clear_session(store).await?;
    println!("Session cleared");
    Ok(())
}

pub(crate) fn templates(config: &Config) -> anyhow::Result<()> {
    let registry = TemplateRegistry::with_templates(config.templates.clone())?;
    for template in registry.list() {
        println!("{} ({})", template.id, template.name);
        println!("  task types: {}", template.task_types.join(", "));
        println!("  name:       {}", template.name_pattern);
        for channel in &template.channels {
            let mode = if channel.auto_create { "auto" } else { "manual" };
            println!("  - {:<9} {:<6} {}", channel.kind.as_str(), mode, channel.name_pattern);
        }
    }
    Ok(())
}
