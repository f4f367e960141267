use super::*;

fn state(task_id: &str, server_id: &str, status: TaskStatus) -> TaskResourceState {
    TaskResourceState {
        task_id: task_id.to_string(),
        server_id: server_id.to_string(),
        task_type: "research".to_string(),
        phase: None,
        agent_channel_ids: Vec::new(),
        progress_channel_id: None,
        planning_channel_id: None,
        status,
        auto_archive_on_completion: false,
        created_at: chrono::Utc::now(),
        completed_at: None,
    }
}

#[test]
fn test_priority_ordering() {
    assert!(TaskPriority::Low < TaskPriority::Medium);
    assert!(TaskPriority::Medium < TaskPriority::High);
    assert!(TaskPriority::High < TaskPriority::Critical);
    assert_eq!(TaskPriority::default(), TaskPriority::Medium);
}

#[test]
fn test_priority_parse_and_display() {
    assert_eq!("HIGH".parse::<TaskPriority>().unwrap(), TaskPriority::High);
    assert!("urgent".parse::<TaskPriority>().is_err());
    assert_eq!(TaskPriority::Critical.to_string(), "critical");
}

#[test]
fn test_progress_status_terminal() {
    assert!(ProgressStatus::Completed.is_terminal());
    assert!(ProgressStatus::Failed.is_terminal());
    assert!(!ProgressStatus::InProgress.is_terminal());
    assert!(!ProgressStatus::Blocked.is_terminal());
    assert_eq!(
        "in-progress".parse::<ProgressStatus>().unwrap(),
        ProgressStatus::InProgress
    );
}

#[test]
fn test_progress_update_clamps_percentage() {
    let update = TaskProgressUpdate::new("t1", ProgressStatus::InProgress).with_progress(250);
    assert_eq!(update.progress, Some(100));
}

#[test]
fn test_task_config_deserialize_defaults() {
    let json = r#"{"task_id":"t1","task_title":"Build","task_type":"phase1"}"#;
    let config: TaskServerConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.priority, TaskPriority::Medium);
    assert!(config.expected_agents.is_empty());
    assert!(!config.include_progress_channel);
    assert!(config.template_id.is_none());
}

#[test]
fn test_channel_template_role_filter() {
    let open = ChannelTemplate::new(ChannelKind::Agent, "{agentName}");
    assert!(open.admits_role("anyone"));

    let restricted = open.restricted_to_roles(&["developer"]);
    assert!(restricted.admits_role("developer"));
    assert!(!restricted.admits_role("designer"));
}

#[test]
fn test_template_applies_literally() {
    let template = TopologyTemplate {
        id: "default".to_string(),
        name: "Default".to_string(),
        task_types: vec![WILDCARD_TASK_TYPE.to_string()],
        name_pattern: "{taskTitle}".to_string(),
        channels: Vec::new(),
        permissions: PermissionDescriptor::open(),
    };
    assert!(template.is_wildcard());
    assert!(!template.applies_to("research"));
}

#[test]
fn test_task_state_finish() {
    let mut s = state("t1", "s1", TaskStatus::Active);
    assert!(s.is_active());
    s.finish(TaskStatus::Failed);
    assert_eq!(s.status, TaskStatus::Failed);
    assert!(s.status.is_terminal());
    assert!(s.completed_at.is_some());
}

#[test]
fn test_session_upserts() {
    let mut session = Session::new();
    let server = Server::for_task("s1", "Server", "t1", Vec::new());
    session.upsert_server(server.clone());
    session.upsert_server(Server {
        name: "Renamed".to_string(),
        ..server
    });
    assert_eq!(session.servers.len(), 1);
    assert_eq!(session.servers[0].name, "Renamed");

    session.upsert_task_state(state("t1", "s1", TaskStatus::Active));
    session.upsert_task_state(state("t1", "s1", TaskStatus::Completed));
    assert_eq!(session.task_states.len(), 1);
    assert_eq!(session.task_states[0].status, TaskStatus::Completed);
}

#[test]
fn test_session_server_for_task() {
    let mut session = Session::new();
    session.upsert_server(Server::for_task("s1", "A", "t1", Vec::new()));
    session.upsert_server(Server::for_task("s2", "B", "t2", Vec::new()));
    assert_eq!(session.server_for_task("t2").unwrap().id, "s2");
    assert!(session.server_for_task("t3").is_none());
}

#[test]
fn test_session_summary_counts() {
    let mut session = Session::new();
    let channels = vec![
        Channel::new("c1", "general", ChannelKind::General),
        Channel::new("c2", "progress", ChannelKind::Progress),
    ];
    session.upsert_server(Server::for_task("s1", "A", "t1", channels));
    let mut archived = Server::for_task("s2", "B", "t2", Vec::new());
    archived.archived = true;
    session.upsert_server(archived);
    session.upsert_task_state(state("t1", "s1", TaskStatus::Active));
    session.upsert_task_state(state("t2", "s2", TaskStatus::Failed));

    let summary = session.summary();
    assert_eq!(summary.session_id, session.id);
    assert_eq!(summary.server_count, 2);
    assert_eq!(summary.archived_server_count, 1);
    assert_eq!(summary.channel_count, 2);
    assert_eq!(summary.active_task_count, 1);
    assert_eq!(summary.failed_task_count, 1);
    assert_eq!(summary.completed_task_count, 0);
    assert!(session.is_server_archived("s2"));
}

#[test]
fn test_channel_touch() {
    let mut channel = Channel::new("c1", "general", ChannelKind::General);
    assert_eq!(channel.message_count, 0);
    channel.touch();
    assert_eq!(channel.message_count, 1);
}
