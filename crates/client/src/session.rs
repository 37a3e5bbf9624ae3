//! Token store: access token, refresh token and cached user identity.
//!
//! The whole [`Session`] sits behind one lock, so every mutation, including
//! [`TokenStore::clear_session`], is observed atomically by later reads.
//! [`FileTokenStore`] additionally mirrors the session to a JSON file so it
//! survives process restarts.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use bazaar_core::types::{AuthUser, Session};

/// Shared session storage used by the pipeline and the refresh coordinator.
///
/// Implementors provide [`load`](Self::load) and [`modify`](Self::modify);
/// the field accessors are built on top of them.
pub trait TokenStore: Send + Sync {
    /// Snapshot of the current session.
    fn load(&self) -> Session;

    /// Apply `f` to the session under the store's write lock.
    fn modify(&self, f: &mut dyn FnMut(&mut Session));

    fn access_token(&self) -> Option<String> {
        self.load().access_token
    }

    fn refresh_token(&self) -> Option<String> {
        self.load().refresh_token
    }

    fn user(&self) -> Option<AuthUser> {
        self.load().user
    }

    fn set_access_token(&self, token: &str) {
        self.modify(&mut |s: &mut Session| s.access_token = Some(token.to_owned()));
    }

    fn set_refresh_token(&self, token: &str) {
        self.modify(&mut |s: &mut Session| s.refresh_token = Some(token.to_owned()));
    }

    fn set_user(&self, user: &AuthUser) {
        self.modify(&mut |s: &mut Session| s.user = Some(user.clone()));
    }

    /// Write all three fields in one step, as login does.
    fn set_login(&self, access_token: &str, refresh_token: Option<&str>, user: &AuthUser) {
        self.modify(&mut |s: &mut Session| {
            s.access_token = Some(access_token.to_owned());
            s.refresh_token = refresh_token.map(str::to_owned);
            s.user = Some(user.clone());
        });
    }

    fn clear_session(&self) {
        self.modify(&mut |s: &mut Session| *s = Session::default());
    }
}

/// In-process store. Nothing outlives the value.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    session: RwLock<Session>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: RwLock::new(session),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Session {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn modify(&self, f: &mut dyn FnMut(&mut Session)) {
        let mut guard = self.session.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut *guard);
    }
}

/// Store mirrored to a JSON file.
///
/// The file is rewritten after every mutation while the write lock is held,
/// so the on-disk order matches the in-memory order. An empty session
/// removes the file. Write failures are logged and do not affect the
/// in-memory value. On Unix the file is created owner-only (`0o600`).
///
/// Persisting is synchronous `std::fs` I/O on the calling thread, including
/// when the refresh coordinator stores a new token from async code. The
/// file is a few hundred bytes and written only on login, refresh and
/// logout.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    session: RwLock<Session>,
}

impl FileTokenStore {
    /// Open the store at `path`, loading any session saved there.
    ///
    /// A missing file is an empty session; so is an unreadable or corrupt
    /// one, after a warning.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let session = match read_session(&path) {
            Ok(Some(session)) => {
                tracing::debug!(path = %path.display(), "Loaded saved session");
                session
            }
            Ok(None) => Session::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable session file");
                Session::default()
            }
        };

        Self {
            path,
            session: RwLock::new(session),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, session: &Session) {
        let result = if session.is_empty() {
            match fs::remove_file(&self.path) {
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                other => other,
            }
        } else {
            write_session(&self.path, session)
        };

        if let Err(e) = result {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to persist session");
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Session {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn modify(&self, f: &mut dyn FnMut(&mut Session)) {
        let mut guard = self.session.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut *guard);
        self.persist(&*guard);
    }
}

fn read_session(path: &Path) -> io::Result<Option<Session>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Write via a sibling temp file and rename so readers never see a
/// half-written session.
fn write_session(path: &Path, session: &Session) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    write_private(&tmp, &serde_json::to_vec_pretty(session)?)?;
    fs::rename(&tmp, path)
}

/// Write `bytes` to a fresh file readable only by the owner.
fn write_private(path: &Path, bytes: &[u8]) -> io::Result<()> {
    // The mode only applies on creation, so never reuse a leftover file.
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
        _ => {}
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
