//! Client-side session: the auth token and the signed-in user's profile.
//!
//! The session is a service handed to [`crate::client::ApiClient`]; callers
//! that need to react to login/logout subscribe to a `watch` channel instead
//! of polling. The file-backed store keeps a JSON object with exactly two
//! keys, `authToken` and `authUser`, and removes the file when cleared.

use crate::resources::Id;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not serialize session: {0}")]
    Json(#[from] serde_json::Error),
}

/// Profile of the signed-in user as returned by the auth endpoints.
///
/// Fields the client does not use are kept in `extra` so the stored profile
/// round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<Id>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// "First Last", or the username when no name is set.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// Snapshot broadcast to subscribers on every change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

pub trait SessionStore: Send + Sync {
    fn state(&self) -> SessionState;

    fn token(&self) -> Option<String> {
        self.state().token
    }

    fn user(&self) -> Option<UserProfile> {
        self.state().user
    }

    fn set_session(&self, token: &str, user: UserProfile) -> Result<(), SessionError>;

    /// Replace the stored profile, keeping the token.
    fn set_user(&self, user: UserProfile) -> Result<(), SessionError>;

    fn clear_session(&self) -> Result<(), SessionError>;

    fn subscribe(&self) -> watch::Receiver<SessionState>;
}

/// Shortened token for log lines. Never log a whole token.
pub fn token_prefix(token: &str) -> String {
    let prefix: String = token.chars().take(10).collect();
    format!("{prefix}...")
}

#[derive(Serialize, Deserialize)]
struct SessionFile {
    #[serde(rename = "authToken", default)]
    auth_token: Option<String>,
    #[serde(rename = "authUser", default)]
    auth_user: Option<UserProfile>,
}

/// Session held in memory and, when opened with a path, mirrored to a file.
pub struct LocalSession {
    path: Option<PathBuf>,
    sender: watch::Sender<SessionState>,
}

impl LocalSession {
    /// A session that lives only as long as the process. Used in tests.
    pub fn in_memory() -> Self {
        let (sender, _) = watch::channel(SessionState::default());
        LocalSession { path: None, sender }
    }

    /// Open a file-backed session, restoring whatever the file holds.
    ///
    /// A missing file is an empty session. A file that cannot be parsed is
    /// discarded the same way a logout would.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref().to_path_buf();
        let state = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<SessionFile>(&contents) {
                Ok(file) => SessionState {
                    token: file.auth_token.filter(|t| !t.is_empty()),
                    user: file.auth_user,
                },
                Err(e) => {
                    warn!("Discarding unreadable session file {}: {}", path.display(), e);
                    remove_if_exists(&path)?;
                    SessionState::default()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => SessionState::default(),
            Err(source) => return Err(SessionError::Io { path, source }),
        };
        let (sender, _) = watch::channel(state);
        Ok(LocalSession {
            path: Some(path),
            sender,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn update(&self, state: SessionState) -> Result<(), SessionError> {
        self.persist(&state)?;
        self.sender.send_replace(state);
        Ok(())
    }

    fn persist(&self, state: &SessionState) -> Result<(), SessionError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if state.token.is_none() && state.user.is_none() {
            return remove_if_exists(path);
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| SessionError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        let file = SessionFile {
            auth_token: state.token.clone(),
            auth_user: state.user.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        fs::write(path, json).map_err(|source| SessionError::Io {
            path: path.clone(),
            source,
        })
    }
}

fn remove_if_exists(path: &Path) -> Result<(), SessionError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(SessionError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

impl SessionStore for LocalSession {
    fn state(&self) -> SessionState {
        self.sender.borrow().clone()
    }

    fn set_session(&self, token: &str, user: UserProfile) -> Result<(), SessionError> {
        info!("Session stored for {} (token {})", user.username, token_prefix(token));
        self.update(SessionState {
            token: Some(token.to_string()),
            user: Some(user),
        })
    }

    fn set_user(&self, user: UserProfile) -> Result<(), SessionError> {
        let token = self.sender.borrow().token.clone();
        self.update(SessionState {
            token,
            user: Some(user),
        })
    }

    fn clear_session(&self) -> Result<(), SessionError> {
        if self.sender.borrow().is_authenticated() {
            info!("Session cleared");
        }
        self.update(SessionState::default())
    }

    fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.sender.subscribe()
    }
}
