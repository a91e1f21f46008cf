use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::error::{ClientError, Result};
use crate::models::{AuthTokens, User};

/// Token pair plus the user it was issued for. Handed to `ApiClient::with_session`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub tokens: AuthTokens,
    pub user: User,
}

/// Client-local persistence for the logged-in session.
pub trait CredentialStore: Send + Sync {
    fn save(&self, session: &AuthSession) -> Result<()>;
    fn load(&self) -> Result<Option<AuthSession>>;
    fn clear(&self) -> Result<()>;
}

/// JSON file on disk; survives restarts.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialStore for FileCredentialStore {
    fn save(&self, session: &AuthSession) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ClientError::Credentials(e.to_string()))?;
        }
        let payload = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, payload).map_err(|e| ClientError::Credentials(e.to_string()))
    }

    fn load(&self) -> Result<Option<AuthSession>> {
        let payload = match fs::read_to_string(&self.path) {
            Ok(payload) => payload,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ClientError::Credentials(e.to_string())),
        };

        let session = serde_json::from_str::<AuthSession>(&payload)
            .map_err(|e| ClientError::Credentials(format!("corrupt credentials file: {e}")))?;
        Ok(Some(session))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Credentials(e.to_string())),
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    session: Mutex<Option<AuthSession>>,
}

impl InMemoryCredentialStore {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<AuthSession>>> {
        self.session
            .lock()
            .map_err(|e| ClientError::Credentials(format!("in-memory lock poisoned: {e}")))
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn save(&self, session: &AuthSession) -> Result<()> {
        *self.lock()? = Some(session.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<AuthSession>> {
        Ok(self.lock()?.clone())
    }

    fn clear(&self) -> Result<()> {
        *self.lock()? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session() -> AuthSession {
        AuthSession {
            tokens: AuthTokens {
                access: "access-token".to_string(),
                refresh: "refresh-token".to_string(),
            },
            user: User {
                id: 1,
                email: "lifter@example.com".to_string(),
                first_name: "Lee".to_string(),
                last_name: "Fter".to_string(),
                username: "lifter".to_string(),
            },
        }
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested").join("credentials.json"));

        assert_eq!(store.load().unwrap(), None);

        store.save(&sample_session()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample_session()));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, "not json").unwrap();

        let result = FileCredentialStore::new(path).load();

        assert!(matches!(result, Err(ClientError::Credentials(_))));
    }

    #[test]
    fn test_in_memory_store() {
        let store = InMemoryCredentialStore::default();

        store.save(&sample_session()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample_session()));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
