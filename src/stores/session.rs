use crate::core::error::SessionError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::warn;

/// Separator between username and password inside the decoded token.
const SEPARATOR: char = ':';

/// Operator credentials cached client-side so the console does not have to
/// re-authenticate on every start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Encode credentials into the opaque session token.
///
/// Base64 over "username:password", a reversible byte-level encoding, not
/// encryption. Kept for compatibility with the directory API, which expects
/// exactly this shape in the Authorization header; a server-issued opaque
/// token should replace it once the API grows one.
pub fn encode_token(credentials: &Credentials) -> String {
    BASE64.encode(format!(
        "{}{}{}",
        credentials.username, SEPARATOR, credentials.password
    ))
}

/// Decode a session token back into credentials.
///
/// The split is at the first separator, so usernames must not contain one
/// while passwords may.
pub fn decode_token(token: &str) -> Result<Credentials, SessionError> {
    let bytes = BASE64.decode(token).map_err(|_| SessionError::Decode)?;
    let decoded = String::from_utf8(bytes).map_err(|_| SessionError::Decode)?;

    let (username, password) = decoded
        .split_once(SEPARATOR)
        .ok_or(SessionError::Malformed)?;

    Ok(Credentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

/// True iff the token decodes and contains the separator.
pub fn is_valid(token: &str) -> bool {
    decode_token(token).is_ok()
}

/// Persistent store for the session token.
///
/// Injected wherever authorization is needed instead of read ad hoc from
/// ambient storage, so tests can substitute a fake.
pub trait SessionStore: Send + Sync {
    /// Persist the credentials as one encoded token. Subsequent `load` calls
    /// return this token until `clear`.
    fn save(&self, credentials: &Credentials) -> Result<(), SessionError>;

    /// The stored token, or None. Never fails; an unreadable store is absent.
    fn load(&self) -> Option<String>;

    /// Remove the stored token. Idempotent.
    fn clear(&self) -> Result<(), SessionError>;
}

/// Token persisted as a single file, the localStorage analogue.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, credentials: &Credentials) -> Result<(), SessionError> {
        std::fs::write(&self.path, encode_token(credentials))?;
        Ok(())
    }

    fn load(&self) -> Option<String> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        let token = content.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemorySessionStore {
    token: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a raw token already present, valid or not.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, credentials: &Credentials) -> Result<(), SessionError> {
        *self.token.lock().unwrap() = Some(encode_token(credentials));
        Ok(())
    }

    fn load(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.token.lock().unwrap() = None;
        Ok(())
    }
}

/// Result of the startup session check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// No usable session; show the login screen.
    Absent,
    /// A valid cached session; go straight to the dashboard.
    Valid(Credentials),
}

/// Startup algorithm: load, validate, and purge anything invalid.
///
/// Presence but invalidity always results in a purge so a corrupt token can
/// never wedge the console into an unusable session.
pub fn startup_check(store: &dyn SessionStore) -> SessionStatus {
    let Some(token) = store.load() else {
        return SessionStatus::Absent;
    };

    match decode_token(&token) {
        Ok(credentials) => SessionStatus::Valid(credentials),
        Err(e) => {
            warn!(error = %e, "Stored session token is invalid, purging");
            if let Err(e) = store.clear() {
                warn!(error = %e, "Failed to purge invalid session token");
            }
            SessionStatus::Absent
        }
    }
}
