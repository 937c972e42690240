//! Login sessions and their on-disk store.
//!
//! A `Session` is the only state the client persists. The store keeps one
//! session per role in a small TOML file, using the same key names the web
//! portal used for its cookies and local storage so a student and a teacher
//! can be signed in side by side.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::FlowError;

/// Which console a session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
}

impl Role {
    /// Path segment used by the login endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
        }
    }

    /// Key holding this role's bearer token.
    pub fn token_key(&self) -> &'static str {
        match self {
            Role::Student => "authUserToken",
            Role::Teacher => "authAdminToken",
        }
    }

    /// Key holding this role's identifier.
    pub fn id_key(&self) -> &'static str {
        match self {
            Role::Student => "userId",
            Role::Teacher => "adminId",
        }
    }

    /// Name of the screen a successful login lands on.
    pub fn dashboard(&self) -> &'static str {
        match self {
            Role::Student => "student dashboard",
            Role::Teacher => "teacher dashboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "student" | "user" => Ok(Role::Student),
            "teacher" | "admin" | "professor" => Ok(Role::Teacher),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// An authenticated identity.
///
/// Note: Custom Debug impl masks the token so sessions can be logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub role: Role,
    pub token: String,
    /// Student or teacher identifier, exactly as the server issued it.
    pub id: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("role", &self.role)
            .field("token", &"***")
            .field("id", &self.id)
            .finish()
    }
}

impl Session {
    pub fn new(role: Role, token: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            role,
            token: token.into(),
            id: id.into(),
        }
    }

    /// The identifier as a number, for request bodies that want one.
    ///
    /// Falls back to `0` when the server issued a non-numeric identifier;
    /// the server rejects such requests on its own.
    pub fn numeric_id(&self) -> u64 {
        self.id.trim().parse().unwrap_or(0)
    }
}

/// Shape of the session file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(rename = "authUserToken", default, skip_serializing_if = "Option::is_none")]
    user_token: Option<String>,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(rename = "authAdminToken", default, skip_serializing_if = "Option::is_none")]
    admin_token: Option<String>,
    #[serde(rename = "adminId", default, skip_serializing_if = "Option::is_none")]
    admin_id: Option<String>,
}

impl SessionFile {
    fn slots(&mut self, role: Role) -> (&mut Option<String>, &mut Option<String>) {
        match role {
            Role::Student => (&mut self.user_token, &mut self.user_id),
            Role::Teacher => (&mut self.admin_token, &mut self.admin_id),
        }
    }
}

/// File-backed session storage.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.config/quizzki/session.toml`, or `./session.toml` without a home.
    pub fn default_path() -> PathBuf {
        std::env::var("HOME")
            .ok()
            .map(|h| {
                PathBuf::from(h)
                    .join(".config")
                    .join("quizzki")
                    .join("session.toml")
            })
            .unwrap_or_else(|| PathBuf::from("session.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<SessionFile> {
        if !self.path.exists() {
            return Ok(SessionFile::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read session file: {}", self.path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse session file: {}", self.path.display()))
    }

    fn write(&self, file: &SessionFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = toml::to_string(file).context("failed to serialize session")?;
        write_private(&self.path, content.as_bytes())
            .with_context(|| format!("failed to write session file: {}", self.path.display()))
    }

    /// The stored session for `role`, if both its token and id are present.
    pub fn load(&self, role: Role) -> Result<Option<Session>> {
        let mut file = self.read()?;
        let (token, id) = file.slots(role);
        Ok(match (token.take(), id.take()) {
            (Some(token), Some(id)) if !token.is_empty() => Some(Session { role, token, id }),
            _ => None,
        })
    }

    /// Like [`load`](Self::load), but a missing session is an error.
    pub fn require(&self, role: Role) -> Result<Session> {
        self.load(role)?
            .ok_or_else(|| FlowError::NoSession(role).into())
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        let mut file = self.read()?;
        let (token, id) = file.slots(session.role);
        *token = Some(session.token.clone());
        *id = Some(session.id.clone());
        self.write(&file)?;
        tracing::debug!(role = %session.role, path = %self.path.display(), "session saved");
        Ok(())
    }

    /// Forget the session for `role`. Returns whether one was stored.
    pub fn clear(&self, role: Role) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        let mut file = self.read()?;
        let (token, id) = file.slots(role);
        let had = token.take().is_some();
        id.take();
        self.write(&file)?;
        Ok(had)
    }
}

/// Tokens are bearer credentials: the file is readable by its owner only.
#[cfg(unix)]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut f = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    f.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    f.write_all(content)
}

#[cfg(not(unix))]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("session.toml"));
        (dir, store)
    }

    #[test]
    fn role_parse_and_keys() {
        assert_eq!("Teacher".parse::<Role>().unwrap(), Role::Teacher);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Teacher);
        assert_eq!("student".parse::<Role>().unwrap(), Role::Student);
        assert!("janitor".parse::<Role>().is_err());
        assert_eq!(Role::Teacher.id_key(), "adminId");
        assert_eq!(Role::Student.token_key(), "authUserToken");
    }

    #[test]
    fn missing_file_means_no_session() {
        let (_dir, store) = store();
        assert!(store.load(Role::Student).unwrap().is_none());
        let err = store.require(Role::Teacher).unwrap_err();
        assert!(err.to_string().contains("no active teacher session"));
    }

    #[test]
    fn save_uses_portal_key_names() {
        let (_dir, store) = store();
        store
            .save(&Session::new(Role::Teacher, "tok-1", "42"))
            .unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("authAdminToken = \"tok-1\""));
        assert!(raw.contains("adminId = \"42\""));
        assert!(!raw.contains("userId"));
    }

    #[test]
    fn roles_coexist_and_clear_independently() {
        let (_dir, store) = store();
        store.save(&Session::new(Role::Student, "s", "7")).unwrap();
        store.save(&Session::new(Role::Teacher, "t", "9")).unwrap();

        assert_eq!(store.load(Role::Student).unwrap().unwrap().id, "7");
        assert_eq!(store.load(Role::Teacher).unwrap().unwrap().token, "t");

        assert!(store.clear(Role::Student).unwrap());
        assert!(!store.clear(Role::Student).unwrap());
        assert!(store.load(Role::Student).unwrap().is_none());
        assert!(store.load(Role::Teacher).unwrap().is_some());
    }

    #[cfg(unix)]
    #[test]
    fn session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, store) = store();
        store.save(&Session::new(Role::Student, "s", "7")).unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn clear_without_file_creates_nothing() {
        let (_dir, store) = store();
        assert!(!store.clear(Role::Teacher).unwrap());
        assert!(!store.path().exists());
    }

    #[test]
    fn debug_masks_token() {
        let session = Session::new(Role::Student, "secret-token", "3");
        let debug = format!("{session:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn numeric_id_parses_or_defaults() {
        assert_eq!(Session::new(Role::Student, "t", " 15 ").numeric_id(), 15);
        assert_eq!(Session::new(Role::Student, "t", "abc").numeric_id(), 0);
    }
}
