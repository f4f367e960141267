use super::*;
use crate::templates::TemplateRegistry;
use taskhub_protocols::{ChannelTemplate, PermissionDescriptor, TaskPriority};

fn squad_template() -> TopologyTemplate {
    TopologyTemplate {
        id: "squad".to_string(),
        name: "Squad".to_string(),
        task_types: vec!["squad".to_string()],
        name_pattern: "  [{priority}] {taskTitle} ({taskType}) {phase} ".to_string(),
        channels: vec![
            ChannelTemplate::new(ChannelKind::General, "{taskType}-lobby"),
            ChannelTemplate::new(ChannelKind::Agent, "{agentRole}:{agentName}")
                .restricted_to_roles(&["developer", "tester"]),
            ChannelTemplate::new(ChannelKind::Agent, "all-{agentName}"),
            ChannelTemplate::new(ChannelKind::Progress, "never").manual(),
        ],
        permissions: PermissionDescriptor::open(),
    }
}

fn squad_config() -> TaskServerConfig {
    TaskServerConfig::new("t1", "Ship it", "squad")
        .with_agent(AgentChannelConfig::new("developer", "Ada"))
        .with_agent(AgentChannelConfig::new("designer", "Bo"))
        .with_agent(AgentChannelConfig::new("tester", "Cy"))
}

#[test]
fn test_format_pattern_replaces_and_trims() {
    let out = format_pattern("  {a}-{b}-{a} ", &[("a", "x"), ("b", "y")]);
    assert_eq!(out, "x-y-x");
    assert_eq!(format_pattern("{unknown}", &[("a", "x")]), "{unknown}");
}

#[test]
fn test_format_server_name_tokens() {
    let config = squad_config().with_priority(TaskPriority::High);
    assert_eq!(format_server_name(&squad_template(), &config), "[high] Ship it (squad)");

    let config = config.with_phase("2");
    assert_eq!(format_server_name(&squad_template(), &config), "[high] Ship it (squad) 2");
}

#[test]
fn test_agent_channels_respect_role_filter() {
    let channels = generate_topology(&squad_template(), &squad_config());
    let names: Vec<_> = channels.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["squad-lobby", "developer:Ada", "tester:Cy", "all-Ada", "all-Bo", "all-Cy"]
    );
    let agent_roles: Vec<_> = channels
        .iter()
        .filter(|c| c.kind == ChannelKind::Agent)
        .map(|c| c.agent_role.as_deref().unwrap())
        .collect();
    assert_eq!(agent_roles, vec!["developer", "tester", "developer", "designer", "tester"]);
}

#[test]
fn test_channel_ids_unique_and_prefixed() {
    let channels = generate_topology(&squad_template(), &squad_config());
    let ids: HashSet<_> = channels.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids.len(), channels.len());
    assert!(channels.iter().all(|c| c.id.starts_with("t1-")));
    assert!(channels.iter().all(|c| c.message_count == 0));
}

#[test]
fn test_channel_count_matches_auto_create_plus_flags() {
    let config = squad_config().with_progress_channel(true).with_planning_channel(true);
    let channels = generate_topology(&squad_template(), &config);
    // 1 general + 2 filtered agents + 3 open agents + 2 flags
    assert_eq!(channels.len(), 8);
    assert_eq!(channels[6].name, PROGRESS_CHANNEL_NAME);
    assert_eq!(channels[7].name, PLANNING_CHANNEL_NAME);
}

#[test]
fn test_phase_template_duplicates_progress_channel() {
    let registry = TemplateRegistry::new();
    let template = registry.resolve("phase1", None);
    let config = TaskServerConfig::new("p1", "Foundations", "phase1").with_progress_channel(true);

    let channels = generate_topology(&template, &config);
    let kinds: Vec<_> = channels.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![ChannelKind::Planning, ChannelKind::Progress, ChannelKind::Progress]
    );
    assert_eq!(channels[0].name, "phase1-planning");
    assert_eq!(channels[2].name, PROGRESS_CHANNEL_NAME);
    assert_ne!(channels[1].id, channels[2].id);
}

#[test]
fn test_deduplicate_skips_flag_channels() {
    let registry = TemplateRegistry::new();
    let template = registry.resolve("phase1", None);
    let config = TaskServerConfig::new("p1", "Foundations", "phase1")
        .with_progress_channel(true)
        .with_planning_channel(true);

    let channels = generate_topology_with(&template, &config, TopologyOptions { deduplicate: true });
    assert_eq!(channels.len(), 2);

    let default = registry.resolve("misc", None);
    let channels = generate_topology_with(&default, &config, TopologyOptions { deduplicate: true });
    // general + progress flag + planning flag
    assert_eq!(channels.len(), 3);
}

#[test]
fn test_manual_agent_template_creates_nothing() {
    let registry = TemplateRegistry::new();
    let template = registry.resolve("phase1", None);
    let config = TaskServerConfig::new("p1", "Foundations", "phase1")
        .with_agent(AgentChannelConfig::new("developer", "Ada"));
    let channels = generate_topology(&template, &config);
    assert!(channels.iter().all(|c| c.kind != ChannelKind::Agent));
}

#[test]
fn test_agent_channel_template_override() {
    let mut agent = AgentChannelConfig::new("developer", "Ada");
    agent.channel_template = Some("dev-{agentName}".to_string());
    assert_eq!(format_agent_channel_name("{agentRole}-{agentName}", &agent), "dev-Ada");
}

#[test]
fn test_id_generator_suffixes_repeats() {
    let mut ids = ChannelIdGenerator::new("t9");
    let first = ids.next("agent-dev");
    let second = ids.next("agent-dev");
    let third = ids.next("agent-dev");
    assert!(first.starts_with("t9-agent-dev-"));
    assert_eq!(second, format!("{}-2", first));
    assert_eq!(third, format!("{}-3", first));
}
