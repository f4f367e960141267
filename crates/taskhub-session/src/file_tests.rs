use super::*;
use std::sync::Arc;

use chrono::Utc;
use tempfile::TempDir;

use taskhub_protocols::{ChannelKind, TaskStatus};

fn server(id: &str, task_id: &str) -> Server {
    Server::for_task(
        id,
        format!("Server {}", id),
        task_id,
        vec![Channel::new(format!("{}-general", id), "general", ChannelKind::General)],
    )
}

fn state(task_id: &str, server_id: &str) -> TaskResourceState {
    TaskResourceState {
        task_id: task_id.to_string(),
        server_id: server_id.to_string(),
        task_type: "phase1".to_string(),
        phase: None,
        agent_channel_ids: Vec::new(),
        progress_channel_id: None,
        planning_channel_id: None,
        status: TaskStatus::Active,
        auto_archive_on_completion: false,
        created_at: Utc::now(),
        completed_at: None,
    }
}

#[tokio::test]
async fn test_new_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("session");
    let store = FileSessionStore::new(&path).await.unwrap();
    assert!(path.is_dir());
    assert_eq!(store.storage_path(), path.as_path());
    assert!(store.get_current_session().await.unwrap().is_none());
}

#[tokio::test]
async fn test_writes_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    {
        let store = FileSessionStore::new(temp_dir.path()).await.unwrap();
        store.add_server(&server("s1", "t1")).await.unwrap();
        store
            .add_channel("s1", &Channel::new("s1-agent", "dev-Ada", ChannelKind::Agent))
            .await
            .unwrap();
        store.upsert_task_state(&state("t1", "s1")).await.unwrap();
    }

    let store = FileSessionStore::new(temp_dir.path()).await.unwrap();
    let session = store.get_current_session().await.unwrap().unwrap();
    assert_eq!(session.servers.len(), 1);
    assert_eq!(session.server("s1").unwrap().channels.len(), 2);
    assert_eq!(session.task_states.len(), 1);
    assert!(!temp_dir.path().join("session.json.tmp").exists());
}

#[tokio::test]
async fn test_upsert_task_state_replaces() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSessionStore::new(temp_dir.path()).await.unwrap();
    store.upsert_task_state(&state("t1", "s1")).await.unwrap();

    let mut finished = state("t1", "s1");
    finished.finish(TaskStatus::Failed);
    store.upsert_task_state(&finished).await.unwrap();

    let session = store.get_current_session().await.unwrap().unwrap();
    assert_eq!(session.task_states.len(), 1);
    assert_eq!(session.task_states[0].status, TaskStatus::Failed);
}

#[tokio::test]
async fn test_add_channel_unknown_server() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSessionStore::new(temp_dir.path()).await.unwrap();
    let err = store
        .add_channel("missing", &Channel::new("c", "c", ChannelKind::Agent))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
    assert!(!store.session_path().exists());
}

#[tokio::test]
async fn test_archive_task_server() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSessionStore::new(temp_dir.path()).await.unwrap();
    store.add_server(&server("s1", "t1")).await.unwrap();
    store.add_server(&server("s2", "t2")).await.unwrap();
    store.archive_task_server("t2").await.unwrap();

    let session = store.get_current_session().await.unwrap().unwrap();
    assert!(!session.is_server_archived("s1"));
    assert!(session.is_server_archived("s2"));
}

#[tokio::test]
async fn test_save_and_clear_session() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSessionStore::new(temp_dir.path()).await.unwrap();

    let mut session = Session::new();
    session.active_channel_id = Some("c1".to_string());
    store.save_session(&session).await.unwrap();
    let loaded = store.get_current_session().await.unwrap().unwrap();
    assert_eq!(loaded.id, session.id);
    assert_eq!(loaded.active_channel_id.as_deref(), Some("c1"));

    store.clear_session().await.unwrap();
    assert!(store.get_current_session().await.unwrap().is_none());
    // Clearing twice is fine.
    store.clear_session().await.unwrap();
}

#[tokio::test]
async fn test_corrupt_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSessionStore::new(temp_dir.path()).await.unwrap();
    tokio::fs::write(store.session_path(), "{ not json").await.unwrap();

    let err = store.get_current_session().await.unwrap_err();
    assert!(matches!(err, StoreError::Serialization(_)));
}

#[tokio::test]
async fn test_concurrent_writes_are_serialized() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FileSessionStore::new(temp_dir.path()).await.unwrap());

    let mut handles = Vec::new();
    for i in 0..10 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.add_server(&server(&format!("s{}", i), "t")).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let session = store.get_current_session().await.unwrap().unwrap();
    assert_eq!(session.servers.len(), 10);
}
