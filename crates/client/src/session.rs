//! The logged in user, and keeping them logged in across runs
use std::{
    fs::{self, File},
    io::ErrorKind,
    path::{Path, PathBuf},
};

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use crate::{AuthError, Bearer, Client, LoginResp, Password, Result, Role, TokenPair};

/// Who is logged in, and the tokens we hold for them.
/// This is also the layout of the session file.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub username: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl Session {
    pub fn bearer(&self) -> Bearer {
        self.access_token.clone().into()
    }

    pub fn is_learner(&self) -> bool {
        self.role == Role::Learner
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// The parts of the API the session store needs
pub trait Authenticator {
    fn login(&self, username: &str, password: &Password) -> Result<LoginResp>;
    fn refresh(&self, refresh_token: &str) -> Result<TokenPair>;
}

impl Authenticator for Client {
    fn login(&self, username: &str, password: &Password) -> Result<LoginResp> {
        Client::login(self, username, password)
    }

    fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        self.refresh_tokens(refresh_token)
    }
}

/// Holds the current session, if any, and keeps it in sync with a file on disk.
pub struct SessionStore {
    path: PathBuf,
    current: Option<Session>,
}

impl SessionStore {
    /// Load whatever session was saved at `path`. This never touches the network.
    /// A missing or unreadable file means we start logged out.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = match read_session(&path) {
            Ok(s) => s,
            Err(e) => {
                warn!("ignoring unreadable session file {}: {}", path.display(), e);
                None
            }
        };

        debug!(
            "opened session store at {}, logged in: {}",
            path.display(),
            current.is_some()
        );
        Self { path, current }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn session(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.current.is_some()
    }

    /// Log in with the given credentials, saving the new session.
    /// On failure, the current state is left alone.
    pub fn login(
        &mut self,
        auth: &impl Authenticator,
        username: &str,
        password: &Password,
    ) -> Result<&Session> {
        let resp = auth.login(username, password)?;
        let session = Session {
            username: username.to_string(),
            access_token: resp.access_token,
            refresh_token: resp.refresh_token,
            role: resp.role,
        };

        write_session(&self.path, &session)?;
        debug!("logged in as {:?}", session);

        Ok(self.current.insert(session))
    }

    /// Forget the current session, both in memory and on disk
    pub fn logout(&mut self) -> Result<()> {
        debug!("logging out");
        self.current = None;
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    /// Swap our refresh token for new tokens.
    /// Does nothing without a refresh token. Any failure logs us out.
    pub fn refresh(&mut self, auth: &impl Authenticator) -> Result<()> {
        let Some(refresh_token) = self.current.as_ref().and_then(|s| s.refresh_token.clone())
        else {
            return Ok(());
        };

        match self.try_refresh(auth, &refresh_token) {
            Ok(()) => Ok(()),
            Err(e) => {
                error!("error refreshing session, logging out: {}", e);
                if let Err(e) = self.logout() {
                    error!("error removing session file: {}", e);
                }
                Err(e)
            }
        }
    }

    fn try_refresh(&mut self, auth: &impl Authenticator, refresh_token: &str) -> Result<()> {
        let tokens = auth.refresh(refresh_token)?;
        let Some(session) = self.current.as_mut() else {
            return Err(AuthError::NotLoggedIn.into());
        };

        session.access_token = tokens.access_token;
        if let Some(refresh_token) = tokens.refresh_token {
            session.refresh_token = Some(refresh_token);
        }
        write_session(&self.path, session)?;
        debug!("refreshed session for {}", session.username);

        Ok(())
    }
}

fn read_session(path: &Path) -> Result<Option<Session>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    Ok(Some(serde_json::from_reader(&file)?))
}

fn write_session(path: &Path, session: &Session) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    serde_json::to_writer(&mut file, session)?;

    Ok(())
}
