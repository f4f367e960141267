//! Topology generation: the initial channel set of a task server.

use std::collections::HashSet;

use chrono::Utc;

use taskhub_protocols::{
    AgentChannelConfig, Channel, ChannelKind, TaskServerConfig, TopologyTemplate,
};

/// Name of the channel appended by `include_progress_channel`.
pub const PROGRESS_CHANNEL_NAME: &str = "Task Progress";
/// Name of the channel appended by `include_planning_channel`.
pub const PLANNING_CHANNEL_NAME: &str = "Planning & Architecture";

/// Topology generation switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopologyOptions {
    /// Skip an include-flag channel when the template already produced its kind.
    pub deduplicate: bool,
}

/// Substitute `{token}` placeholders and trim the result.
pub fn format_pattern(pattern: &str, tokens: &[(&str, &str)]) -> String {
    let mut out = pattern.to_string();
    for (token, value) in tokens {
        out = out.replace(&format!("{{{}}}", token), value);
    }
    out.trim().to_string()
}

/// Server display name for `config` under `template`.
pub fn format_server_name(template: &TopologyTemplate, config: &TaskServerConfig) -> String {
    format_pattern(
        &template.name_pattern,
        &[
            ("taskTitle", config.task_title.as_str()),
            ("taskType", config.task_type.as_str()),
            ("phase", config.phase.as_deref().unwrap_or("")),
            ("priority", config.priority.as_str()),
        ],
    )
}

/// Channel name for an agent. A per-agent template override replaces `pattern`.
pub fn format_agent_channel_name(pattern: &str, agent: &AgentChannelConfig) -> String {
    let pattern = agent.channel_template.as_deref().unwrap_or(pattern);
    format_pattern(
        pattern,
        &[("agentRole", agent.role.as_str()), ("agentName", agent.name.as_str())],
    )
}

/// Issues channel ids of the form `{task}-{role}-{millis}`.
///
/// Ids are unique within one generator; a repeated role gets a numeric suffix.
pub(crate) struct ChannelIdGenerator<'a> {
    task_id: &'a str,
    stamp: i64,
    issued: HashSet<String>,
}

impl<'a> ChannelIdGenerator<'a> {
    pub(crate) fn new(task_id: &'a str) -> Self {
        Self {
            task_id,
            stamp: Utc::now().timestamp_millis(),
            issued: HashSet::new(),
        }
    }

    /// Treat already issued ids as taken.
    pub(crate) fn reserve<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.issued.extend(ids);
    }

    pub(crate) fn next(&mut self, role: &str) -> String {
        let base = format!("{}-{}-{}", self.task_id, role, self.stamp);
        let mut id = base.clone();
        let mut n = 2;
        while self.issued.contains(&id) {
            id = format!("{}-{}", base, n);
            n += 1;
        }
        self.issued.insert(id.clone());
        id
    }
}

/// Build an agent channel.
pub(crate) fn agent_channel(id: String, pattern: &str, agent: &AgentChannelConfig) -> Channel {
    Channel::new(id, format_agent_channel_name(pattern, agent), ChannelKind::Agent)
        .with_agent_role(agent.role.clone())
}

/// Generate the initial channels for a task server.
///
/// Auto-create templates come first, in template order; the include flags
/// append one extra channel each, even when the template already produced
/// a channel of that kind.
pub fn generate_topology(template: &TopologyTemplate, config: &TaskServerConfig) -> Vec<Channel> {
    generate_topology_with(template, config, TopologyOptions::default())
}

/// [`generate_topology`] with explicit options.
pub fn generate_topology_with(
    template: &TopologyTemplate,
    config: &TaskServerConfig,
    options: TopologyOptions,
) -> Vec<Channel> {
    let mut ids = ChannelIdGenerator::new(&config.task_id);
    let mut channels = Vec::new();

    for channel_template in template.channels.iter().filter(|t| t.auto_create) {
        match channel_template.kind {
            ChannelKind::Agent => {
                for agent in config
                    .expected_agents
                    .iter()
                    .filter(|a| channel_template.admits_role(&a.role))
                {
                    let id = ids.next(&format!("agent-{}", agent.role));
                    channels.push(agent_channel(id, &channel_template.name_pattern, agent));
                }
            }
            kind => {
                let name = format_pattern(
                    &channel_template.name_pattern,
                    &[
                        ("taskType", config.task_type.as_str()),
                        ("phase", config.phase.as_deref().unwrap_or("")),
                    ],
                );
                channels.push(Channel::new(ids.next(kind.as_str()), name, kind));
            }
        }
    }

    if config.include_progress_channel
        && !(options.deduplicate && has_kind(&channels, ChannelKind::Progress))
    {
        let id = ids.next("task-progress");
        channels.push(Channel::new(id, PROGRESS_CHANNEL_NAME, ChannelKind::Progress));
    }

    if config.include_planning_channel
        && !(options.deduplicate && has_kind(&channels, ChannelKind::Planning))
    {
        let id = ids.next("planning-architecture");
        channels.push(Channel::new(id, PLANNING_CHANNEL_NAME, ChannelKind::Planning));
    }

    channels
}

fn has_kind(channels: &[Channel], kind: ChannelKind) -> bool {
    channels.iter().any(|c| c.kind == kind)
}

#[cfg(test)]
#[path = "topology_tests.rs"]
mod tests;
