//! Persisted client credentials and access gating.
//!
//! The client keeps a single JSON blob (identity, permissions, token and
//! session) under one key. Stores are passed explicitly to the transport so
//! tests can swap in [`MemoryCredentialStore`].

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::constants::ALLOWED_ROLES;
use crate::error::ApiError;
use crate::models::{AuthResponse, Session};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthCredentials {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub permissions: Option<Vec<String>>,
    pub token: Option<String>,
    pub session: Option<Session>,
}

impl From<AuthResponse> for AuthCredentials {
    fn from(auth: AuthResponse) -> Self {
        Self {
            id: Some(auth.id),
            first_name: Some(auth.first_name),
            last_name: Some(auth.last_name),
            email: Some(auth.email),
            permissions: Some(auth.roles),
            token: Some(auth.token),
            session: auth.session,
        }
    }
}

impl AuthCredentials {
    /// Token and at least one permission present.
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
            && self.permissions.as_ref().is_some_and(|p| !p.is_empty())
    }

    pub fn has_access(&self, allowed_roles: &[&str]) -> bool {
        has_access(allowed_roles, self.permissions.as_deref())
    }

    /// Authenticated and holding one of the admin roles.
    pub fn can_administer(&self) -> bool {
        self.is_authenticated() && self.has_access(ALLOWED_ROLES)
    }

    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            _ => self.email.clone().unwrap_or_else(|| "anonymous".to_string()),
        }
    }
}

pub fn has_access(allowed_roles: &[&str], user_permissions: Option<&[String]>) -> bool {
    match user_permissions {
        Some(perms) => allowed_roles
            .iter()
            .any(|role| perms.iter().any(|p| p.as_str() == *role)),
        None => false,
    }
}

/// Where credentials live between runs.
pub trait CredentialStore: Send + Sync {
    /// Stored credentials, or the empty value when nothing is stored.
    fn load(&self) -> AuthCredentials;

    fn save(&self, credentials: &AuthCredentials) -> Result<(), ApiError>;

    fn clear(&self) -> Result<(), ApiError>;

    fn token(&self) -> Option<String> {
        self.load().token.filter(|t| !t.is_empty())
    }
}

/// Credentials kept in a JSON file (one file per credential key).
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> AuthCredentials {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return AuthCredentials::default(),
        };
        match serde_json::from_str(&raw) {
            Ok(credentials) => credentials,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Ignoring unreadable credential file"
                );
                AuthCredentials::default()
            }
        }
    }

    fn save(&self, credentials: &AuthCredentials) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string(credentials)?;
        write_private(&self.path, raw.as_bytes())?;
        tracing::debug!(path = %self.path.display(), "Credentials saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Write a file only its owner can read. Existing files are narrowed too.
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(contents)
}

/// In-process credential store.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<AuthCredentials>,
}

impl MemoryCredentialStore {
    pub fn new(credentials: AuthCredentials) -> Self {
        Self {
            inner: RwLock::new(credentials),
        }
    }

    /// Store holding only a bearer token with admin permissions.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self::new(AuthCredentials {
            token: Some(token.into()),
            permissions: Some(ALLOWED_ROLES.iter().map(|r| r.to_string()).collect()),
            ..Default::default()
        })
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> AuthCredentials {
        self.inner
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    fn save(&self, credentials: &AuthCredentials) -> Result<(), ApiError> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| ApiError::new(crate::error::ApiErrorKind::Config, "credential store poisoned"))?;
        *guard = credentials.clone();
        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        self.save(&AuthCredentials::default())
    }
}
