mod common;

use common::{admin_session, citizen_session, worker_session};
use chrono::Utc;
use ecosarthi_portal::{
    InMemorySessionStore, SessionStore,
    session::{Role, Session, SessionSnapshot},
    session_store::{SessionState, spawn_expiry_sweep},
};
use std::{sync::Arc, time::Duration};
use uuid::Uuid;

// --- Session model ---

#[test]
fn test_anonymous_session_has_no_flags_and_no_keys() {
    let session = Session::default();

    assert_eq!(session, Session::Anonymous);
    assert_eq!(session.role(), None);
    assert!(!session.flags().any());
    assert!(session.storage_entries().is_empty());
}

#[test]
fn test_at_most_one_flag_is_ever_set() {
    for session in [citizen_session(), worker_session(), admin_session()] {
        let flags = session.flags();
        let set = Role::ALL.iter().filter(|role| flags.get(**role)).count();
        assert_eq!(set, 1, "{:?} should carry exactly one role flag", session.role());
    }
}

#[test]
fn test_citizen_storage_keys() {
    let keys = citizen_session().storage_entries();

    assert_eq!(keys.get("isCitizen").map(String::as_str), Some("true"));
    assert_eq!(keys.get("citizenId").map(String::as_str), Some("CIT-1"));
    assert_eq!(keys.get("homeNumber").map(String::as_str), Some("H-101"));
    assert_eq!(keys.get("citizenName").map(String::as_str), Some("Asha"));
    assert_eq!(keys.get("greenPoints").map(String::as_str), Some("40"));
    assert_eq!(keys.get("area").map(String::as_str), Some("Ward 5"));
    assert!(!keys.contains_key("isWorker"));
    assert!(!keys.contains_key("isAdmin"));
}

#[test]
fn test_worker_storage_keys() {
    let keys = worker_session().storage_entries();

    assert_eq!(keys.get("isWorker").map(String::as_str), Some("true"));
    assert_eq!(keys.get("workerId").map(String::as_str), Some("W-7"));
    assert_eq!(keys.get("workerName").map(String::as_str), Some("Ravi"));
    assert_eq!(keys.get("workerRole").map(String::as_str), Some("garbage_collector"));
    assert_eq!(keys.get("goldenPoints").map(String::as_str), Some("12"));
    assert!(!keys.contains_key("citizenId"));
    assert!(!keys.contains_key("greenPoints"));
}

#[test]
fn test_admin_session_exposes_only_the_flag() {
    let keys = admin_session().storage_entries();

    assert_eq!(keys.len(), 1);
    assert_eq!(keys.get("isAdmin").map(String::as_str), Some("true"));
}

#[test]
fn test_credit_points_only_applies_to_balances() {
    let mut citizen = citizen_session();
    assert!(citizen.credit_points(5));
    assert_eq!(citizen.storage_entries()["greenPoints"], "45");

    let mut worker = worker_session();
    assert!(worker.credit_points(10));
    assert_eq!(worker.storage_entries()["goldenPoints"], "22");

    let mut admin = admin_session();
    assert!(!admin.credit_points(10));
    assert_eq!(admin, admin_session());

    let mut anonymous = Session::Anonymous;
    assert!(!anonymous.credit_points(10));
}

#[test]
fn test_snapshot_serializes_role_and_keys() {
    let snapshot = SessionSnapshot::from(&worker_session());
    let json = serde_json::to_value(&snapshot).unwrap();

    assert_eq!(json["role"], "worker");
    assert_eq!(json["keys"]["workerId"], "W-7");

    let anonymous = serde_json::to_value(SessionSnapshot::from(&Session::Anonymous)).unwrap();
    assert!(anonymous["role"].is_null());
    assert_eq!(anonymous["keys"], serde_json::json!({}));
}

// --- In-memory session store ---

#[tokio::test]
async fn test_unknown_session_reads_as_anonymous() {
    let store = InMemorySessionStore::new();

    assert_eq!(store.get(Uuid::new_v4()).await.unwrap(), Session::Anonymous);
}

#[tokio::test]
async fn test_set_role_replaces_previous_role() {
    let store = InMemorySessionStore::new();
    let id = Uuid::new_v4();

    store.set_role(id, citizen_session()).await.unwrap();
    store.set_role(id, worker_session()).await.unwrap();

    let session = store.get(id).await.unwrap();
    assert!(store.get_role(id, Role::Worker).await.unwrap());
    assert!(!store.get_role(id, Role::Citizen).await.unwrap());

    let keys = session.storage_entries();
    assert!(!keys.contains_key("isCitizen"));
    assert!(!keys.contains_key("citizenId"));
    assert!(!keys.contains_key("greenPoints"));
}

#[tokio::test]
async fn test_clear_role_removes_role_and_profile() {
    let store = InMemorySessionStore::new();
    let id = Uuid::new_v4();
    store.set_role(id, citizen_session()).await.unwrap();

    assert!(store.clear_role(id, Role::Citizen).await.unwrap());

    assert!(!store.get_role(id, Role::Citizen).await.unwrap());
    let keys = store.get(id).await.unwrap().storage_entries();
    for key in Role::Citizen.profile_keys() {
        assert!(!keys.contains_key(*key), "{key} should be gone");
    }
}

#[tokio::test]
async fn test_clear_role_leaves_other_roles_alone() {
    let store = InMemorySessionStore::new();
    let id = Uuid::new_v4();
    store.set_role(id, worker_session()).await.unwrap();

    assert!(!store.clear_role(id, Role::Admin).await.unwrap());
    assert_eq!(store.get(id).await.unwrap(), worker_session());
}

#[tokio::test]
async fn test_writing_anonymous_clears() {
    let store = InMemorySessionStore::new();
    let id = Uuid::new_v4();
    store.set_role(id, admin_session()).await.unwrap();

    store.set_role(id, Session::Anonymous).await.unwrap();

    assert_eq!(store.get(id).await.unwrap(), Session::Anonymous);
}

#[tokio::test]
async fn test_clear_logs_out_of_everything() {
    let store = InMemorySessionStore::new();
    let id = Uuid::new_v4();
    store.set_role(id, admin_session()).await.unwrap();

    store.clear(id).await.unwrap();

    for role in Role::ALL {
        assert!(!store.get_role(id, role).await.unwrap());
    }
}

#[tokio::test]
async fn test_credit_points_persists() {
    let store = InMemorySessionStore::new();
    let id = Uuid::new_v4();
    store.set_role(id, worker_session()).await.unwrap();

    let updated = store.credit_points(id, 8).await.unwrap();

    assert_eq!(updated.storage_entries()["goldenPoints"], "20");
    assert_eq!(store.get(id).await.unwrap(), updated);
    assert_eq!(
        store.credit_points(Uuid::new_v4(), 8).await.unwrap(),
        Session::Anonymous
    );
}

#[tokio::test]
async fn test_prune_expired_drops_only_stale_sessions() {
    let store = InMemorySessionStore::new();
    let stale = Uuid::new_v4();
    store.set_role(stale, citizen_session()).await.unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    let cutoff = Utc::now();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let fresh = Uuid::new_v4();
    store.set_role(fresh, worker_session()).await.unwrap();

    assert_eq!(store.prune_expired(cutoff).await.unwrap(), 1);
    assert_eq!(store.get(stale).await.unwrap(), Session::Anonymous);
    assert_eq!(store.get(fresh).await.unwrap(), worker_session());
}

#[tokio::test]
async fn test_expiry_sweep_runs_in_background() {
    let store: SessionState = Arc::new(InMemorySessionStore::new());
    let id = Uuid::new_v4();
    store.set_role(id, admin_session()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let sweep = spawn_expiry_sweep(store.clone(), Duration::ZERO, Duration::from_millis(10));
    tokio::time::sleep(Duration::from_millis(100)).await;
    sweep.abort();

    assert_eq!(store.get(id).await.unwrap(), Session::Anonymous);
}
