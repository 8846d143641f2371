//! Persisted backend credentials and the in-memory session built on them.
//!
//! The persisted record always uses the same three keys: `access_token`,
//! `refresh_token` and `user`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<Value>,
}

impl SessionState {
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.user.is_none()
    }
}

/// Durable storage for a `SessionState`.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Empty state when nothing has been saved yet.
    async fn load(&self) -> Result<SessionState>;
    async fn save(&self, state: &SessionState) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

/// JSON file store. Parent directories are created on first save.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<SessionState> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SessionState::default())
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read {}", self.path.display()))
            }
        };
        serde_json::from_str(&raw)
            .with_context(|| format!("Corrupt session file {}", self.path.display()))
    }

    async fn save(&self, state: &SessionState) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(state)?;
        tokio::fs::write(&self.path, raw)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", self.path.display())),
        }
    }
}

#[derive(Default)]
pub struct MemoryTokenStore {
    state: Mutex<SessionState>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: SessionState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.lock().clone()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<SessionState> {
        Ok(self.snapshot())
    }

    async fn save(&self, state: &SessionState) -> Result<()> {
        *self.state.lock() = state.clone();
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.state.lock() = SessionState::default();
        Ok(())
    }
}

/// Current credentials, mirrored to a `TokenStore` on every change.
///
/// The lock is only held to copy or swap state, never across a store write.
pub struct AuthSession {
    state: RwLock<SessionState>,
    store: Arc<dyn TokenStore>,
}

impl AuthSession {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            state: RwLock::new(SessionState::default()),
            store,
        }
    }

    /// Replaces in-memory state with whatever the store holds.
    pub async fn load(&self) -> Result<()> {
        let persisted = self.store.load().await?;
        *self.state.write() = persisted;
        Ok(())
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.read().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.read().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.state.read().refresh_token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().access_token.is_some()
    }

    pub async fn store_login(&self, access: String, refresh: String, user: Value) -> Result<()> {
        self.update(|state| {
            *state = SessionState {
                access_token: Some(access),
                refresh_token: Some(refresh),
                user: Some(user),
            }
        })
        .await
    }

    /// New access token; the refresh token only changes when one is rotated in.
    pub async fn store_tokens(&self, access: String, refresh: Option<String>) -> Result<()> {
        self.update(|state| {
            state.access_token = Some(access);
            if let Some(refresh) = refresh {
                state.refresh_token = Some(refresh);
            }
        })
        .await
    }

    pub async fn store_user(&self, user: Value) -> Result<()> {
        self.update(|state| state.user = Some(user)).await
    }

    pub async fn clear(&self) -> Result<()> {
        *self.state.write() = SessionState::default();
        self.store.clear().await
    }

    async fn update(&self, apply: impl FnOnce(&mut SessionState)) -> Result<()> {
        let snapshot = {
            let mut state = self.state.write();
            apply(&mut state);
            state.clone()
        };
        self.store.save(&snapshot).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("session.json"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_store_uses_fixed_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let store = FileTokenStore::new(&path);
        let state = SessionState {
            access_token: Some("a".to_string()),
            refresh_token: Some("r".to_string()),
            user: Some(json!({"email": "ana@example.com"})),
        };
        store.save(&state).await.unwrap();

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["access_token"], "a");
        assert_eq!(raw["refresh_token"], "r");
        assert_eq!(raw["user"]["email"], "ana@example.com");
        assert_eq!(store.load().await.unwrap(), state);

        store.clear().await.unwrap();
        assert!(!path.exists());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(FileTokenStore::new(path).load().await.is_err());
    }

    #[tokio::test]
    async fn test_session_mirrors_changes_to_store() {
        let store = Arc::new(MemoryTokenStore::new());
        let session = AuthSession::new(store.clone());

        session
            .store_login("a1".into(), "r1".into(), json!({"id": 1}))
            .await
            .unwrap();
        assert!(session.is_authenticated());

        session.store_tokens("a2".into(), None).await.unwrap();
        let persisted = store.snapshot();
        assert_eq!(persisted.access_token.as_deref(), Some("a2"));
        assert_eq!(persisted.refresh_token.as_deref(), Some("r1"));

        session.clear().await.unwrap();
        assert!(!session.is_authenticated());
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_load_restores_persisted_state() {
        let store = Arc::new(MemoryTokenStore::with_state(SessionState {
            access_token: Some("a".to_string()),
            refresh_token: Some("r".to_string()),
            user: None,
        }));
        let session = AuthSession::new(store);
        assert!(!session.is_authenticated());
        session.load().await.unwrap();
        assert_eq!(session.refresh_token().as_deref(), Some("r"));
    }
}
