use std::sync::{Arc, Mutex};

use agora_types::Post;

/// Shared post cache handed to each controller.
///
/// Snapshots are clones, never aliases of a controller's live list, so one
/// view mutating its list can never silently rewrite another's. Writers
/// publish whole sequences through `replace`; `invalidate` marks the cache
/// dirty so the next load refetches.
#[derive(Clone, Default)]
pub struct PostStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    posts: Option<Vec<Post>>,
    dirty: bool,
}

impl PostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the cached sequence, or `None` when nothing has
    /// been loaded yet or the cache was invalidated.
    pub fn snapshot(&self) -> Option<Vec<Post>> {
        let inner = self.lock();
        if inner.dirty {
            return None;
        }
        inner.posts.clone()
    }

    /// Installs a fresh sequence and clears the dirty flag.
    pub fn replace(&self, posts: Vec<Post>) {
        let mut inner = self.lock();
        inner.posts = Some(posts);
        inner.dirty = false;
    }

    /// Marks the cache stale; the next `snapshot` returns `None`.
    pub fn invalidate(&self) {
        self.lock().dirty = true;
    }

    pub fn is_loaded(&self) -> bool {
        let inner = self.lock();
        inner.posts.is_some() && !inner.dirty
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("post store lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::post;

    #[test]
    fn empty_store_has_no_snapshot() {
        let store = PostStore::new();
        assert!(store.snapshot().is_none());
        assert!(!store.is_loaded());
    }

    #[test]
    fn replace_then_snapshot_round_trips() {
        let store = PostStore::new();
        store.replace(vec![post(1, "a", "b"), post(2, "c", "d")]);

        let snap = store.snapshot().unwrap();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].id, 1);
    }

    #[test]
    fn snapshot_is_a_copy_not_an_alias() {
        let store = PostStore::new();
        store.replace(vec![post(1, "a", "b")]);

        let mut snap = store.snapshot().unwrap();
        snap[0].likes = 99;

        // The store is unaffected until the caller publishes back.
        assert_eq!(store.snapshot().unwrap()[0].likes, 0);
    }

    #[test]
    fn invalidate_forces_a_refetch() {
        let store = PostStore::new();
        store.replace(vec![post(1, "a", "b")]);
        store.invalidate();

        assert!(store.snapshot().is_none());
        assert!(!store.is_loaded());

        store.replace(vec![post(2, "c", "d")]);
        assert_eq!(store.snapshot().unwrap()[0].id, 2);
    }

    #[test]
    fn clones_share_the_same_cache() {
        let store = PostStore::new();
        let other = store.clone();
        store.replace(vec![post(7, "t", "b")]);

        assert_eq!(other.snapshot().unwrap()[0].id, 7);
    }
}
