use super::*;
use shared::domain::UserId;

fn profile(first_name: &str) -> UserProfile {
    UserProfile {
        id: UserId(7),
        first_name: first_name.to_string(),
        email: "a@b.com".to_string(),
    }
}

#[tokio::test]
async fn snapshot_defaults_to_guest() {
    let store = SessionStore::new();
    assert_eq!(store.snapshot().await, Session::Guest);
    assert!(!store.snapshot().await.is_authenticated());
}

#[tokio::test]
async fn authenticated_sessions_always_carry_a_user() {
    let store = SessionStore::new();
    store.set_authenticated(profile("Maverick")).await;

    let snapshot = store.snapshot().await;
    assert!(snapshot.is_authenticated());
    assert_eq!(
        snapshot.user().map(|user| user.first_name.as_str()),
        Some("Maverick")
    );
}

#[tokio::test]
async fn profile_is_replaced_wholesale() {
    let store = SessionStore::new();
    store.set_authenticated(profile("Maverick")).await;
    store.set_authenticated(profile("Pete")).await;

    let snapshot = store.snapshot().await;
    assert_eq!(
        snapshot.user().map(|user| user.first_name.as_str()),
        Some("Pete")
    );
}

#[tokio::test]
async fn clear_drops_the_profile() {
    let store = SessionStore::new();
    store.set_authenticated(profile("Maverick")).await;
    store.clear().await;

    let snapshot = store.snapshot().await;
    assert_eq!(snapshot, Session::Guest);
    assert!(snapshot.user().is_none());
}

#[tokio::test]
async fn subscribers_observe_changes() {
    let store = SessionStore::new();
    let mut rx = store.subscribe();

    store.set_authenticated(profile("Maverick")).await;
    let event = rx.recv().await.expect("event");
    assert!(event.is_authenticated());

    store.clear().await;
    let event = rx.recv().await.expect("event");
    assert_eq!(event, Session::Guest);
}

#[tokio::test]
async fn unchanged_writes_do_not_notify() {
    let store = SessionStore::new();
    let mut rx = store.subscribe();

    store.clear().await;
    assert!(rx.try_recv().is_err());

    store.set_authenticated(profile("Maverick")).await;
    rx.recv().await.expect("first change");
    store.set_authenticated(profile("Maverick")).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn with_initial_seeds_from_a_server_hint() {
    let store = SessionStore::with_initial(Session::Authenticated(profile("Maverick")));
    assert!(store.snapshot().await.is_authenticated());
}
