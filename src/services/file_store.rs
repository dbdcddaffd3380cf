use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicU64, Ordering};

/// Store-issued stamp. A write (or a selection) only replaces state stamped
/// with a lower revision.
pub type Revision = u64;

#[derive(Debug, Clone)]
pub struct StagedFile {
    pub name: String,
    pub bytes: Bytes,
    pub revision: Revision,
    pub staged_at: DateTime<Utc>,
}

impl StagedFile {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Session-scoped byte store keyed by the exact original filename.
pub trait FileStore: Send + Sync {
    /// Hands out the next revision. Revisions are strictly increasing.
    fn reserve_revision(&self) -> Revision;

    /// Writes `bytes` under `name` unless the stored entry carries a newer
    /// revision. Returns whether the write took effect.
    fn put_at(&self, name: &str, bytes: Bytes, revision: Revision) -> bool;

    fn get(&self, name: &str) -> Option<Bytes>;
    fn entry(&self, name: &str) -> Option<StagedFile>;

    /// All staged files, sorted by name.
    fn list(&self) -> Vec<StagedFile>;

    fn len(&self) -> usize;
    fn clear(&self);

    fn put(&self, name: &str, bytes: Bytes) -> Revision {
        let revision = self.reserve_revision();
        self.put_at(name, bytes, revision);
        revision
    }

    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct InMemoryFileStore {
    files: DashMap<String, StagedFile>,
    next_revision: AtomicU64,
}

impl InMemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FileStore for InMemoryFileStore {
    fn reserve_revision(&self) -> Revision {
        self.next_revision.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn put_at(&self, name: &str, bytes: Bytes, revision: Revision) -> bool {
        let staged = StagedFile {
            name: name.to_string(),
            bytes,
            revision,
            staged_at: Utc::now(),
        };

        match self.files.entry(name.to_string()) {
            Entry::Occupied(mut existing) => {
                if existing.get().revision > revision {
                    tracing::debug!(
                        "Discarding stale write for '{}' (revision {} < {})",
                        name,
                        revision,
                        existing.get().revision
                    );
                    return false;
                }
                existing.insert(staged);
            }
            Entry::Vacant(slot) => {
                slot.insert(staged);
            }
        }
        true
    }

    fn get(&self, name: &str) -> Option<Bytes> {
        self.files.get(name).map(|f| f.bytes.clone())
    }

    fn entry(&self, name: &str) -> Option<StagedFile> {
        self.files.get(name).map(|f| f.value().clone())
    }

    fn list(&self) -> Vec<StagedFile> {
        let mut files: Vec<StagedFile> = self.files.iter().map(|f| f.value().clone()).collect();
        files.sort_by(|a, b| a.name.cmp(&b.name));
        files
    }

    fn len(&self) -> usize {
        self.files.len()
    }

    fn clear(&self) {
        self.files.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let store = InMemoryFileStore::new();
        store.put("a.txt", Bytes::from_static(&[1, 2, 3]));

        assert_eq!(store.get("a.txt").unwrap().as_ref(), &[1, 2, 3]);
        assert!(store.get("b.txt").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_reupload_overwrites_without_growing() {
        let store = InMemoryFileStore::new();
        store.put("a.txt", Bytes::from_static(b"old"));
        store.put("a.txt", Bytes::from_static(b"new content"));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a.txt").unwrap().as_ref(), b"new content");
    }

    #[test]
    fn test_stale_revision_is_discarded() {
        let store = InMemoryFileStore::new();
        let older = store.reserve_revision();
        let newer = store.reserve_revision();

        assert!(store.put_at("x", Bytes::from_static(b"second"), newer));
        assert!(!store.put_at("x", Bytes::from_static(b"first"), older));

        let entry = store.entry("x").unwrap();
        assert_eq!(entry.bytes.as_ref(), b"second");
        assert_eq!(entry.revision, newer);
    }

    #[test]
    fn test_names_are_exact_keys() {
        let store = InMemoryFileStore::new();
        store.put("Main.class", Bytes::from_static(b"upper"));
        store.put("main.class", Bytes::from_static(b"lower"));
        store.put("dir/../Main.class", Bytes::from_static(b"path"));

        assert_eq!(store.len(), 3);
        assert_eq!(store.get("Main.class").unwrap().as_ref(), b"upper");
    }

    #[test]
    fn test_list_is_sorted_and_clear_empties() {
        let store = InMemoryFileStore::new();
        store.put("b", Bytes::new());
        store.put("a", Bytes::new());

        let names: Vec<String> = store.list().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["a", "b"]);

        store.clear();
        assert!(store.is_empty());
    }
}
