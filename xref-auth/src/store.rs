use chrono::DateTime;
use chrono::Utc;
use log::warn;
use serde::Deserialize;
use serde::Serialize;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::RwLock;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use crate::token::parse_token;

const SESSION_FILENAME: &str = "session.json";

/// Persisted shape of the session slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
}

/// The single process-wide session slot.
///
/// Written by the login flow and by the invalidation path below, read
/// everywhere else. The on-disk copy survives restarts; the in-memory copy
/// keeps repeated checks cheap.
#[derive(Debug)]
pub struct SessionStore {
    home: PathBuf,
    cached: RwLock<Option<Session>>,
}

impl SessionStore {
    /// Open the store rooted at `home`, reading any persisted session.
    pub fn new(home: PathBuf) -> Self {
        let cached = try_read_session_json(&session_file(&home)).ok();
        Self {
            home,
            cached: RwLock::new(cached),
        }
    }

    pub fn session_file(&self) -> PathBuf {
        session_file(&self.home)
    }

    /// Record a freshly issued token. Called by the login flow only.
    pub fn save(&self, access_token: &str) -> io::Result<()> {
        let session = Session {
            access_token: access_token.to_string(),
        };
        write_session_json(&self.session_file(), &session)?;
        if let Ok(mut guard) = self.cached.write() {
            *guard = Some(session);
        }
        Ok(())
    }

    /// Current token, if any. No validity check is performed here.
    pub fn token(&self) -> Option<String> {
        self.cached
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|s| s.access_token.clone()))
    }

    /// Drop the session from memory and disk. Returns whether a persisted
    /// session existed.
    pub fn clear(&self) -> io::Result<bool> {
        if let Ok(mut guard) = self.cached.write() {
            *guard = None;
        }
        let path = self.session_file();
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Advisory check used before rendering protected views.
    ///
    /// Returns false when no token is held, when the token fails to parse,
    /// or when its expiry has passed. Invalid and expired tokens are
    /// discarded so subsequent checks short-circuit on the empty slot.
    pub fn is_session_valid(&self) -> bool {
        self.is_session_valid_at(Utc::now())
    }

    pub fn is_session_valid_at(&self, now: DateTime<Utc>) -> bool {
        let Some(token) = self.token() else {
            return false;
        };
        match parse_token(&token) {
            Ok(info) if !info.is_expired_at(now) => true,
            Ok(_) => {
                self.discard("session token expired");
                false
            }
            Err(err) => {
                self.discard(&format!("session token unusable: {err}"));
                false
            }
        }
    }

    fn discard(&self, reason: &str) {
        warn!("{reason}; clearing stored session");
        if let Err(err) = self.clear() {
            warn!("failed to clear stored session: {err}");
        }
    }
}

fn session_file(home: &Path) -> PathBuf {
    home.join(SESSION_FILENAME)
}

fn try_read_session_json(path: &Path) -> io::Result<Session> {
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    let session: Session = serde_json::from_str(&contents)?;
    Ok(session)
}

fn write_session_json(path: &Path, session: &Session) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json_data = serde_json::to_string_pretty(session)?;
    let mut options = OpenOptions::new();
    options.truncate(true).write(true).create(true);
    #[cfg(unix)]
    {
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(json_data.as_bytes())?;
    file.flush()?;
    Ok(())
}
