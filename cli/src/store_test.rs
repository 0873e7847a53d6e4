use super::*;

use prodops_client::net::session::SessionStore;
use prodops_client::net::types::User;

fn store_in(dir: &tempfile::TempDir) -> FileStore {
    FileStore::new(dir.path().join("nested").join("session.json"))
}

#[test]
fn missing_file_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    assert_eq!(store.get("token"), None);
}

#[test]
fn set_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    store.set("token", "tok123");
    assert!(store.path().exists());
    assert_eq!(store.get("token").as_deref(), Some("tok123"));
}

#[test]
fn values_survive_a_fresh_handle() {
    let dir = tempfile::tempdir().unwrap();
    store_in(&dir).set("token", "tok123");
    assert_eq!(store_in(&dir).get("token").as_deref(), Some("tok123"));
}

#[test]
fn remove_keeps_other_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    store.set("token", "tok123");
    store.set("theme", "dark");
    store.remove("token");
    assert_eq!(store.get("token"), None);
    assert_eq!(store.get("theme").as_deref(), Some("dark"));
}

#[test]
fn corrupt_file_reads_as_empty_and_is_replaced_on_write() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    std::fs::write(store.path(), "not json").unwrap();

    assert_eq!(store.get("token"), None);
    store.set("token", "fresh");
    assert_eq!(store.get("token").as_deref(), Some("fresh"));
}

#[test]
fn session_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let session = SessionStore::new(store_in(&dir));
    let user = User {
        id: Some(7),
        email: "supervisor1@prodops.ai".to_owned(),
        roles: vec!["supervisor".to_owned()],
    };
    session.set_token("tok123");
    session.set_user(&user);

    let reopened = SessionStore::new(store_in(&dir));
    assert!(reopened.is_authenticated());
    assert_eq!(reopened.user(), Some(user));

    reopened.clear_auth();
    assert!(!SessionStore::new(store_in(&dir)).is_authenticated());
}
