use super::*;

fn custom(id: &str, task_types: &[&str]) -> TopologyTemplate {
    TopologyTemplate {
        id: id.to_string(),
        name: id.to_string(),
        task_types: task_types.iter().map(|t| t.to_string()).collect(),
        name_pattern: "{taskTitle}".to_string(),
        channels: Vec::new(),
        permissions: PermissionDescriptor::open(),
    }
}

#[test]
fn test_builtins_seeded() {
    let registry = TemplateRegistry::new();
    assert_eq!(registry.len(), 3);
    assert_eq!(registry.list_ids(), vec!["default", "phase", "research"]);
    assert!(registry.get(DEFAULT_TEMPLATE_ID).unwrap().is_wildcard());
}

#[test]
fn test_phase_template_shape() {
    let registry = TemplateRegistry::new();
    let phase = registry.get(PHASE_TEMPLATE_ID).unwrap();
    let auto: Vec<_> = phase.channels.iter().filter(|c| c.auto_create).map(|c| c.kind).collect();
    assert_eq!(auto, vec![ChannelKind::Planning, ChannelKind::Progress]);

    let agent = phase.channels.iter().find(|c| c.kind == ChannelKind::Agent).unwrap();
    assert!(!agent.auto_create);
    assert!(agent.admits_role("developer"));
    assert!(!agent.admits_role("marketing"));
}

#[test]
fn test_resolve_by_task_type() {
    let registry = TemplateRegistry::new();
    assert_eq!(registry.resolve("phase1", None).id, "phase");
    assert_eq!(registry.resolve("analysis", None).id, "research");
}

#[test]
fn test_resolve_falls_back_to_default() {
    let registry = TemplateRegistry::new();
    assert_eq!(registry.resolve("deployment", None).id, "default");
    assert_eq!(registry.resolve("*", None).id, "default");
}

#[test]
fn test_explicit_id_takes_precedence() {
    let registry = TemplateRegistry::new();
    assert_eq!(registry.resolve("phase1", Some("research")).id, "research");
}

#[test]
fn test_unknown_explicit_id_uses_task_type() {
    let registry = TemplateRegistry::new();
    assert_eq!(registry.resolve("phase2", Some("missing")).id, "phase");
    assert_eq!(registry.resolve("other", Some("missing")).id, "default");
}

#[test]
fn test_first_registered_match_wins() {
    let registry = TemplateRegistry::new();
    registry.register(custom("alt-research", &["research"])).unwrap();
    assert_eq!(registry.resolve("research", None).id, "research");

    registry.register(custom("review", &["review"])).unwrap();
    registry.register(custom("review-2", &["review"])).unwrap();
    assert_eq!(registry.resolve("review", None).id, "review");
}

#[test]
fn test_register_duplicate() {
    let registry = TemplateRegistry::new();
    let result = registry.register(custom("phase", &["x"]));
    assert!(matches!(result, Err(RegistryError::AlreadyRegistered(_))));
    assert_eq!(registry.len(), 3);
}

#[test]
fn test_with_templates() {
    let registry = TemplateRegistry::with_templates(vec![custom("ops", &["incident"])]).unwrap();
    assert_eq!(registry.resolve("incident", None).id, "ops");
}

#[test]
fn test_default_is_protected() {
    let registry = TemplateRegistry::new();
    assert!(matches!(
        registry.unregister(DEFAULT_TEMPLATE_ID),
        Err(RegistryError::Protected(_))
    ));
    registry.unregister(RESEARCH_TEMPLATE_ID).unwrap();
    assert!(!registry.contains(RESEARCH_TEMPLATE_ID));
    assert_eq!(registry.resolve("research", None).id, "default");
    assert!(matches!(
        registry.unregister("nope"),
        Err(RegistryError::NotFound(_))
    ));
}
