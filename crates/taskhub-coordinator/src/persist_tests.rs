use super::*;

use taskhub_core::StateTracker;
use taskhub_session::MemorySessionStore;

fn persister() -> (Arc<SerializedStore>, Arc<StateTracker>, SessionPersister) {
    let store = Arc::new(SerializedStore::new(Arc::new(MemorySessionStore::new())));
    let tracker = Arc::new(StateTracker::new());
    let persister = SessionPersister::new(store.clone(), tracker.clone());
    (store, tracker, persister)
}

#[tokio::test]
async fn test_persist_creates_session_with_selection() {
    let (store, tracker, persister) = persister();
    tracker.select(Some("s1".to_string()), Some("c1".to_string()));

    persister.persist().await.unwrap();

    let session = store.get_current_session().await.unwrap().unwrap();
    assert_eq!(session.active_server_id.as_deref(), Some("s1"));
    assert_eq!(session.active_channel_id.as_deref(), Some("c1"));
    assert_eq!(persister.save_count(), 1);
}

#[tokio::test]
async fn test_persist_keeps_existing_records() {
    let (store, _tracker, persister) = persister();
    store
        .add_server(&Server::for_task("s1", "s1", "t1", Vec::new()))
        .await
        .unwrap();
    let before = store.get_current_session().await.unwrap().unwrap();

    persister.persist().await.unwrap();

    let after = store.get_current_session().await.unwrap().unwrap();
    assert_eq!(after.id, before.id);
    assert_eq!(after.servers.len(), 1);
    assert!(after.active_server_id.is_none());
}

#[tokio::test]
async fn test_serialized_store_delegates() {
    let (store, _tracker, _persister) = persister();
    store
        .add_server(&Server::for_task("s1", "s1", "t1", Vec::new()))
        .await
        .unwrap();
    store.archive_task_server("t1").await.unwrap();
    assert!(store
        .inner()
        .get_current_session()
        .await
        .unwrap()
        .unwrap()
        .is_server_archived("s1"));

    store.clear_session().await.unwrap();
    assert!(store.get_current_session().await.unwrap().is_none());
}
