/// Session state and storage
///
/// A [`Session`] is the logged-in user plus their bearer token. It is owned by
/// the [`KanbanClient`](crate::client::KanbanClient) and mirrored into a
/// [`SessionStore`] so it survives restarts:
///
/// - written on successful login or registration
/// - cleared on logout (even when the server call fails) and on any `401`
/// - reloaded at start-up and re-validated with `GET /v1/user`
///
/// # Example
///
/// ```no_run
/// use kanban_client::session::{FileStore, SessionStore};
///
/// let store = FileStore::new("/tmp/kanban/session.json");
/// if let Some(session) = store.load()? {
///     println!("Logged in as {}", session.user.email);
/// }
/// # Ok::<(), kanban_client::ClientError>(())
/// ```

use crate::error::ClientResult;
use kanban_shared::models::user::User;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Logged-in user and their token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub token: String,
}

/// Persistent home for the current session
pub trait SessionStore: Send + Sync {
    /// Returns the stored session, or `None` when nothing is stored
    fn load(&self) -> ClientResult<Option<Session>>;

    /// Replaces the stored session
    fn save(&self, session: &Session) -> ClientResult<()>;

    /// Removes the stored session; a no-op when nothing is stored
    fn clear(&self) -> ClientResult<()>;
}

/// Process-local store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    session: Mutex<Option<Session>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> ClientResult<Option<Session>> {
        Ok(self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, session: &Session) -> ClientResult<()> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// JSON file store
///
/// Parent directories are created on first save.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileStore {
    fn load(&self) -> ClientResult<Option<Session>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn save(&self, session: &Session) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&self.path, serde_json::to_vec_pretty(session)?)?;
        tracing::debug!(path = %self.path.display(), "Saved session");

        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
