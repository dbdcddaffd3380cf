use crate::services::file_store::Revision;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;

/// The entry the next dispatch targets, with the revision that put it there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub name: Option<String>,
    pub revision: Revision,
}

/// Tracks the selected entry name and the running list of uploaded names.
///
/// A selection is only replaced by an offer carrying a newer revision, so the
/// outcome of a batch depends on the order reads were started, not on the
/// order they completed.
pub struct EntrySelection {
    state: watch::Sender<Selection>,
    uploaded: Mutex<Vec<String>>,
}

impl EntrySelection {
    pub fn new() -> Self {
        let (state, _) = watch::channel(Selection::default());
        Self {
            state,
            uploaded: Mutex::new(Vec::new()),
        }
    }

    /// Adopts `name` if `revision` is newer than the current selection's.
    pub fn offer(&self, name: &str, revision: Revision) -> bool {
        self.state.send_if_modified(|current| {
            if revision > current.revision {
                current.name = Some(name.to_string());
                current.revision = revision;
                true
            } else {
                false
            }
        })
    }

    /// Appends `name` to the uploaded list unless it is already there.
    pub fn record_upload(&self, name: &str) {
        let mut uploaded = self.lock_uploaded();
        if !uploaded.iter().any(|n| n == name) {
            uploaded.push(name.to_string());
        }
    }

    pub fn current(&self) -> Option<String> {
        self.state.borrow().name.clone()
    }

    pub fn snapshot(&self) -> Selection {
        self.state.borrow().clone()
    }

    /// Names staged this session, in first-staged order.
    pub fn uploaded(&self) -> Vec<String> {
        self.lock_uploaded().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Selection> {
        self.state.subscribe()
    }

    /// Forgets the selection and the uploaded list. The revision is kept so
    /// reads started before the reset cannot re-select their entry.
    pub fn reset(&self) {
        self.lock_uploaded().clear();
        self.state.send_if_modified(|current| current.name.take().is_some());
    }

    fn lock_uploaded(&self) -> MutexGuard<'_, Vec<String>> {
        self.uploaded.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for EntrySelection {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_offer_wins() {
        let selection = EntrySelection::new();
        assert!(selection.offer("a", 1));
        assert!(selection.offer("b", 2));
        assert!(!selection.offer("c", 1));

        assert_eq!(selection.current().as_deref(), Some("b"));
        assert_eq!(selection.snapshot().revision, 2);
    }

    #[test]
    fn test_uploaded_list_has_no_duplicates() {
        let selection = EntrySelection::new();
        selection.record_upload("a");
        selection.record_upload("b");
        selection.record_upload("a");

        assert_eq!(selection.uploaded(), vec!["a", "b"]);
    }

    #[test]
    fn test_reset_keeps_revision_floor() {
        let selection = EntrySelection::new();
        selection.record_upload("a");
        selection.offer("a", 5);
        selection.reset();

        assert_eq!(selection.current(), None);
        assert!(selection.uploaded().is_empty());
        assert!(!selection.offer("late", 4));
        assert!(selection.offer("fresh", 6));
    }

    #[tokio::test]
    async fn test_subscribers_observe_changes() {
        let selection = EntrySelection::new();
        let mut rx = selection.subscribe();

        selection.offer("Main.class", 1);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().name.as_deref(), Some("Main.class"));
    }
}
