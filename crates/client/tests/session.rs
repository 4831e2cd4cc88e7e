use std::cell::Cell;

use acadme_client::{
    AuthError, Authenticator, Error, LoginResp, Password, Result, Role, Session, SessionStore,
    TokenPair,
};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

/// Accepts one username/password, and hands out numbered tokens
struct FakeAuth {
    refresh_ok: bool,
    issued: Cell<u32>,
}

impl FakeAuth {
    fn new(refresh_ok: bool) -> Self {
        Self {
            refresh_ok,
            issued: Cell::new(0),
        }
    }

    fn next(&self) -> u32 {
        self.issued.set(self.issued.get() + 1);
        self.issued.get()
    }
}

impl Authenticator for FakeAuth {
    fn login(&self, username: &str, password: &Password) -> Result<LoginResp> {
        if username != "aargeee" || password.as_ref() != "hunter2" {
            return Err(AuthError::LoginFailed.into());
        }
        let n = self.next();
        Ok(serde_json::from_value(serde_json::json!({
            "access_token": format!("access-{n}"),
            "refresh_token": format!("refresh-{n}"),
            "role": "LEARNER",
        }))?)
    }

    fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        if !self.refresh_ok {
            return Err(AuthError::RefreshRejected.into());
        }
        let n = self.next();
        Ok(serde_json::from_value(serde_json::json!({
            "accessToken": format!("access-{n}"),
            "refreshToken": format!("{refresh_token}-{n}"),
        }))?)
    }
}

fn stored(store: &SessionStore) -> Option<Session> {
    let s = std::fs::read_to_string(store.path()).ok()?;
    Some(serde_json::from_str(&s).unwrap())
}

#[test]
fn starts_logged_out_without_file() {
    let dir = tempdir().unwrap();
    let store = SessionStore::open(dir.path().join("session.json"));
    assert!(!store.is_logged_in());
    assert!(store.session().is_none());
}

#[test]
fn corrupt_file_means_logged_out() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "{not json").unwrap();

    let store = SessionStore::open(&path);
    assert!(!store.is_logged_in());
}

#[test]
fn login_persists_session() {
    let dir = tempdir().unwrap();
    let auth = FakeAuth::new(true);
    let mut store = SessionStore::open(dir.path().join("acadme").join("session.json"));

    let session = store
        .login(&auth, "aargeee", &Password::from("hunter2"))
        .unwrap()
        .clone();
    assert_eq!(session.username, "aargeee");
    assert_eq!(session.access_token, "access-1");
    assert_eq!(session.refresh_token.as_deref(), Some("refresh-1"));
    assert_eq!(session.role, Role::Learner);

    assert_eq!(stored(&store), Some(session.clone()));

    // and a fresh store picks it back up
    let reopened = SessionStore::open(store.path());
    assert_eq!(reopened.session(), Some(&session));
}

#[test]
fn session_file_layout() {
    let dir = tempdir().unwrap();
    let auth = FakeAuth::new(true);
    let mut store = SessionStore::open(dir.path().join("session.json"));
    store
        .login(&auth, "aargeee", &Password::from("hunter2"))
        .unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(
        raw,
        serde_json::json!({
            "username": "aargeee",
            "accessToken": "access-1",
            "refreshToken": "refresh-1",
            "role": "LEARNER",
        })
    );
}

#[test]
fn bad_login_stays_logged_out() {
    let dir = tempdir().unwrap();
    let auth = FakeAuth::new(true);
    let mut store = SessionStore::open(dir.path().join("session.json"));

    let res = store.login(&auth, "aargeee", &Password::from("wrong"));
    assert!(matches!(
        res,
        Err(Error::AuthError(AuthError::LoginFailed))
    ));
    assert!(!store.is_logged_in());
    assert!(!store.path().exists());
}

#[test]
fn logout_removes_file() {
    let dir = tempdir().unwrap();
    let auth = FakeAuth::new(true);
    let mut store = SessionStore::open(dir.path().join("session.json"));
    store
        .login(&auth, "aargeee", &Password::from("hunter2"))
        .unwrap();

    store.logout().unwrap();
    assert!(!store.is_logged_in());
    assert!(!store.path().exists());

    // logging out twice is fine
    store.logout().unwrap();
}

#[test]
fn refresh_updates_tokens_in_place() {
    let dir = tempdir().unwrap();
    let auth = FakeAuth::new(true);
    let mut store = SessionStore::open(dir.path().join("session.json"));
    store
        .login(&auth, "aargeee", &Password::from("hunter2"))
        .unwrap();

    store.refresh(&auth).unwrap();

    let session = store.session().unwrap().clone();
    assert_eq!(session.username, "aargeee");
    assert_eq!(session.access_token, "access-2");
    assert_eq!(session.refresh_token.as_deref(), Some("refresh-1-2"));
    assert_eq!(stored(&store), Some(session));
}

#[test]
fn refresh_failure_logs_out() {
    let dir = tempdir().unwrap();
    let mut store = SessionStore::open(dir.path().join("session.json"));
    store
        .login(&FakeAuth::new(true), "aargeee", &Password::from("hunter2"))
        .unwrap();

    let res = store.refresh(&FakeAuth::new(false));
    assert!(matches!(
        res,
        Err(Error::AuthError(AuthError::RefreshRejected))
    ));
    assert!(!store.is_logged_in());
    assert!(!store.path().exists());
}

#[test]
fn refresh_without_token_does_nothing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(
        &path,
        r#"{"username": "aargeee", "accessToken": "a", "refreshToken": null, "role": "TUTOR"}"#,
    )
    .unwrap();

    let mut store = SessionStore::open(&path);
    // would fail if it were called
    store.refresh(&FakeAuth::new(false)).unwrap();
    assert_eq!(store.session().unwrap().access_token, "a");
    assert_eq!(store.session().unwrap().role, Role::Tutor);

    let mut logged_out = SessionStore::open(dir.path().join("other.json"));
    logged_out.refresh(&FakeAuth::new(false)).unwrap();
    assert!(!logged_out.is_logged_in());
}
