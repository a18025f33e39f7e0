use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;

use crate::session::SessionStore;

/// How long a controller waits for a token to show up at startup before
/// proceeding unauthenticated.
pub const READY_TIMEOUT: Duration = Duration::from_millis(1000);

/// Owns the current bearer token and announces changes to it.
///
/// Controllers that need the token at startup await `wait_ready` instead of
/// polling; whoever performs sign-in publishes through the same handle. The
/// HTTP adapter clears the token when the server rejects it.
#[derive(Clone)]
pub struct AuthHandle {
    tx: Arc<watch::Sender<Option<String>>>,
    store: Option<SessionStore>,
}

impl AuthHandle {
    /// Creates a handle backed by the on-disk session store, seeded with
    /// any previously saved token.
    pub fn new(store: SessionStore) -> Result<Self> {
        let initial = store.load()?;
        let (tx, _rx) = watch::channel(initial);
        Ok(Self {
            tx: Arc::new(tx),
            store: Some(store),
        })
    }

    /// Creates a handle with no persistence. Used by tests.
    pub fn detached() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            tx: Arc::new(tx),
            store: None,
        }
    }

    pub fn token(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Persists the token and announces it to waiting controllers.
    pub fn sign_in(&self, token: &str) -> Result<()> {
        let token = token.trim();
        if let Some(store) = &self.store {
            store.save(token)?;
        }
        self.tx.send_replace(Some(token.to_string()));
        Ok(())
    }

    /// Explicit sign-out: deletes the stored token and announces absence.
    pub fn sign_out(&self) -> Result<()> {
        if let Some(store) = &self.store {
            store.delete()?;
        }
        self.tx.send_replace(None);
        Ok(())
    }

    /// Drops the token after the server rejected it (401/403). Best effort
    /// on the persistent side; the in-memory token is always cleared.
    pub fn invalidate(&self) {
        if let Some(store) = &self.store {
            if let Err(e) = store.delete() {
                log::warn!("Failed to remove rejected token from disk: {e}");
            }
        }
        self.tx.send_replace(None);
    }

    /// Waits until a token is available, up to `timeout`.
    ///
    /// Returns `None` on timeout so callers can degrade gracefully rather
    /// than block indefinitely.
    pub async fn wait_ready(&self, timeout: Duration) -> Option<String> {
        if let Some(token) = self.token() {
            return Some(token);
        }

        let mut rx = self.tx.subscribe();
        let wait = async {
            loop {
                // The sender lives in self, so changed() cannot fail here.
                if rx.changed().await.is_err() {
                    return None;
                }
                if let Some(token) = rx.borrow().clone() {
                    return Some(token);
                }
            }
        };

        tokio::time::timeout(timeout, wait).await.unwrap_or(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wait_ready_returns_immediately_when_signed_in() {
        let auth = AuthHandle::detached();
        auth.sign_in("token-abc").unwrap();

        let token = auth.wait_ready(Duration::from_millis(10)).await;
        assert_eq!(token, Some("token-abc".into()));
    }

    #[tokio::test]
    async fn wait_ready_times_out_without_a_token() {
        let auth = AuthHandle::detached();
        let token = auth.wait_ready(Duration::from_millis(20)).await;
        assert_eq!(token, None);
    }

    #[tokio::test]
    async fn wait_ready_observes_a_late_sign_in() {
        let auth = AuthHandle::detached();
        let waiter = auth.clone();

        let handle = tokio::spawn(async move {
            waiter.wait_ready(Duration::from_secs(5)).await
        });
        tokio::task::yield_now().await;
        auth.sign_in("late-token").unwrap();

        assert_eq!(handle.await.unwrap(), Some("late-token".into()));
    }

    #[tokio::test]
    async fn invalidate_clears_the_token() {
        let auth = AuthHandle::detached();
        auth.sign_in("token-abc").unwrap();
        assert!(auth.is_signed_in());

        auth.invalidate();
        assert!(!auth.is_signed_in());
        assert_eq!(auth.token(), None);
    }

    #[tokio::test]
    async fn sign_in_persists_through_the_session_store() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let store = SessionStore::at_path(temp_dir.path().join("token"));
        let auth = AuthHandle::new(store.clone()).unwrap();

        auth.sign_in("persisted-token").unwrap();
        assert_eq!(store.load().unwrap(), Some("persisted-token".into()));

        auth.sign_out().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[tokio::test]
    async fn new_handle_is_seeded_from_disk() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let store = SessionStore::at_path(temp_dir.path().join("token"));
        store.save("seeded-token").unwrap();

        let auth = AuthHandle::new(store).unwrap();
        assert_eq!(auth.token(), Some("seeded-token".into()));
    }
}
