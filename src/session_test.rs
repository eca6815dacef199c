use super::*;
use crate::storage::MemoryStorage;

fn store() -> (Arc<MemoryStorage>, SessionStore) {
    let storage = Arc::new(MemoryStorage::new());
    let sessions = SessionStore::new(storage.clone());
    (storage, sessions)
}

// =============================================================
// get / set / clear
// =============================================================

#[test]
fn empty_storage_has_no_session() {
    let (_, sessions) = store();
    assert_eq!(sessions.get_session().unwrap(), None);
    assert!(!sessions.is_authenticated().unwrap());
}

#[test]
fn set_session_writes_login_shape_under_fixed_key() {
    let (storage, sessions) = store();
    sessions.set_session(&Session::logged_in("ada", Some("welcome".into()))).unwrap();

    let raw = storage.get_item(SESSION_KEY).unwrap().unwrap();
    let value: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value, serde_json::json!({ "username": "ada", "loggedIn": true, "message": "welcome" }));
}

#[test]
fn set_session_overwrites_previous_value() {
    let (_, sessions) = store();
    sessions.set_session(&Session::logged_in("ada", None)).unwrap();
    sessions.set_session(&Session::logged_in("bob", None)).unwrap();
    assert_eq!(sessions.get_session().unwrap().unwrap().username, "bob");
}

#[test]
fn clear_session_is_idempotent() {
    let (_, sessions) = store();
    sessions.set_session(&Session::logged_in("ada", None)).unwrap();
    assert!(sessions.is_authenticated().unwrap());
    sessions.clear_session().unwrap();
    sessions.clear_session().unwrap();
    assert!(!sessions.is_authenticated().unwrap());
}

#[test]
fn corrupt_value_is_parse_error() {
    let (storage, sessions) = store();
    storage.set_item(SESSION_KEY, "{not json").unwrap();
    assert!(matches!(sessions.get_session(), Err(SessionError::Parse(_))));
    assert!(matches!(sessions.is_authenticated(), Err(SessionError::Parse(_))));
}

#[test]
fn stored_null_and_empty_read_as_absent() {
    let (storage, sessions) = store();
    storage.set_item(SESSION_KEY, "null").unwrap();
    assert_eq!(sessions.get_session().unwrap(), None);
    storage.set_item(SESSION_KEY, "").unwrap();
    assert_eq!(sessions.get_session().unwrap(), None);
}

#[test]
fn full_storage_surfaces_storage_error() {
    let sessions = SessionStore::new(Arc::new(MemoryStorage::with_quota(4)));
    let err = sessions.set_session(&Session::logged_in("ada", None)).unwrap_err();
    assert!(matches!(err, SessionError::Storage(_)));
}

// =============================================================
// is_authenticated
// =============================================================

#[test]
fn object_without_token_or_flag_is_not_authenticated() {
    let (storage, sessions) = store();
    storage.set_item(SESSION_KEY, r#"{"username":"ada"}"#).unwrap();
    assert!(sessions.get_session().unwrap().is_some());
    assert!(!sessions.is_authenticated().unwrap());
}

#[test]
fn false_flag_and_empty_token_is_not_authenticated() {
    let (storage, sessions) = store();
    storage.set_item(SESSION_KEY, r#"{"loggedIn":false,"token":""}"#).unwrap();
    assert!(!sessions.is_authenticated().unwrap());
}

#[test]
fn token_alone_is_authenticated() {
    let (storage, sessions) = store();
    storage.set_item(SESSION_KEY, r#"{"token":"abc"}"#).unwrap();
    assert!(sessions.is_authenticated().unwrap());
}

#[test]
fn flag_uses_truthiness_for_non_bool_values() {
    let (storage, sessions) = store();
    for (raw, expected) in [
        (r#"{"loggedIn":1}"#, true),
        (r#"{"loggedIn":0}"#, false),
        (r#"{"loggedIn":"yes"}"#, true),
        (r#"{"loggedIn":""}"#, false),
        (r#"{"loggedIn":null}"#, false),
        (r#"{"loggedIn":{}}"#, true),
    ] {
        storage.set_item(SESSION_KEY, raw).unwrap();
        assert_eq!(sessions.is_authenticated().unwrap(), expected, "for {raw}");
    }
}

#[test]
fn logout_in_one_clone_is_seen_by_another() {
    let (_, sessions) = store();
    let other = sessions.clone();
    sessions.set_session(&Session::logged_in("ada", None)).unwrap();
    assert!(other.is_authenticated().unwrap());
    sessions.clear_session().unwrap();
    assert!(!other.is_authenticated().unwrap());
}

#[test]
fn token_uses_truthiness_for_non_string_values() {
    let (storage, sessions) = store();
    for (raw, expected) in [
        (r#"{"token":123}"#, true),
        (r#"{"token":true}"#, true),
        (r#"{"token":0}"#, false),
        (r#"{"token":false}"#, false),
        (r#"{"token":null}"#, false),
    ] {
        storage.set_item(SESSION_KEY, raw).unwrap();
        assert_eq!(sessions.is_authenticated().unwrap(), expected, "for {raw}");
    }
}

#[test]
fn odd_field_types_are_read_leniently() {
    let (storage, sessions) = store();
    storage.set_item(SESSION_KEY, r#"{"username":7,"loggedIn":true,"message":["x"]}"#).unwrap();
    let session = sessions.get_session().unwrap().unwrap();
    assert_eq!(session.username, "7");
    assert_eq!(session.message, None);
    assert!(sessions.is_authenticated().unwrap());
}

#[test]
fn non_object_json_is_absent_not_corrupt() {
    let (storage, sessions) = store();
    for raw in ["0", r#""x""#, "true", "[1,2]"] {
        storage.set_item(SESSION_KEY, raw).unwrap();
        assert_eq!(sessions.get_session().unwrap(), None, "for {raw}");
        assert!(!sessions.is_authenticated().unwrap(), "for {raw}");
    }
}
