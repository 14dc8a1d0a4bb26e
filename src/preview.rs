//! Ephemeral display references for selected images.
//!
//! A selected image is registered under an opaque `preview://<id>` URL that a
//! rendering layer can resolve back to bytes for display. The registration
//! lives exactly as long as its [`PreviewHandle`]: releasing the handle (or
//! dropping it) removes the entry. Move semantics make a double release
//! unrepresentable.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

const URL_SCHEME: &str = "preview://";

/// Registry of live preview references.
#[derive(Debug, Default)]
pub struct PreviewStore {
    entries: Mutex<HashMap<u64, Entry>>,
    next_id: AtomicU64,
}

#[derive(Debug)]
struct Entry {
    mime_type: String,
    bytes: Arc<Vec<u8>>,
}

impl PreviewStore {
    /// Creates an empty store.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers the given bytes and returns the owning handle.
    pub fn create(
        self: &Arc<Self>,
        bytes: Arc<Vec<u8>>,
        mime_type: impl Into<String>,
    ) -> PreviewHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock_entries().insert(
            id,
            Entry {
                mime_type: mime_type.into(),
                bytes,
            },
        );
        PreviewHandle {
            store: Arc::clone(self),
            id,
            url: format!("{URL_SCHEME}{id}"),
        }
    }

    /// Resolves a preview URL to its MIME type and bytes, if still registered.
    pub fn resolve(&self, url: &str) -> Option<(String, Arc<Vec<u8>>)> {
        let id = Self::parse_url(url)?;
        self.lock_entries()
            .get(&id)
            .map(|entry| (entry.mime_type.clone(), Arc::clone(&entry.bytes)))
    }

    /// Returns true if the URL refers to a live registration.
    pub fn contains(&self, url: &str) -> bool {
        match Self::parse_url(url) {
            Some(id) => self.lock_entries().contains_key(&id),
            None => false,
        }
    }

    /// Number of live registrations.
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    /// Returns true if no registrations are live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn revoke(&self, id: u64) {
        self.lock_entries().remove(&id);
    }

    fn parse_url(url: &str) -> Option<u64> {
        url.strip_prefix(URL_SCHEME)?.parse().ok()
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<u64, Entry>> {
        self.entries.lock().expect("preview registry poisoned")
    }
}

/// Owning handle to one preview registration.
///
/// The registration is removed exactly once, on [`release`](Self::release) or
/// on drop.
#[derive(Debug)]
pub struct PreviewHandle {
    store: Arc<PreviewStore>,
    id: u64,
    url: String,
}

impl PreviewHandle {
    /// The `preview://<id>` URL of this registration.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Releases the registration. Equivalent to dropping the handle.
    pub fn release(self) {}
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.store.revoke(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_resolve() {
        let store = PreviewStore::new();
        let handle = store.create(Arc::new(vec![1, 2, 3]), "image/png");

        assert!(handle.url().starts_with("preview://"));
        let (mime, bytes) = store.resolve(handle.url()).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(*bytes, vec![1, 2, 3]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_release_removes_entry() {
        let store = PreviewStore::new();
        let handle = store.create(Arc::new(vec![0]), "image/png");
        let url = handle.url().to_owned();

        handle.release();
        assert!(!store.contains(&url));
        assert!(store.is_empty());
    }

    #[test]
    fn test_drop_removes_entry() {
        let store = PreviewStore::new();
        {
            let _handle = store.create(Arc::new(vec![0]), "image/jpeg");
            assert_eq!(store.len(), 1);
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_handles_are_independent() {
        let store = PreviewStore::new();
        let first = store.create(Arc::new(vec![1]), "image/png");
        let second = store.create(Arc::new(vec![2]), "image/png");

        assert_ne!(first.url(), second.url());

        let second_url = second.url().to_owned();
        drop(first);
        assert!(store.contains(&second_url));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_resolve_unknown_url() {
        let store = PreviewStore::new();
        assert!(store.resolve("preview://42").is_none());
        assert!(store.resolve("blob:whatever").is_none());
    }
}
