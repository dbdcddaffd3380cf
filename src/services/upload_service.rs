use crate::services::file_store::{FileStore, Revision};
use crate::services::selection::EntrySelection;
use crate::utils::data_url::{self, DataUrlError};
use async_trait::async_trait;
use bytes::Bytes;
use futures::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum StageError {
    #[error("failed to read '{name}': {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode '{name}': {source}")]
    Decode {
        name: String,
        #[source]
        source: DataUrlError,
    },

    #[error("'{0}' is not staged")]
    NotStaged(String),
}

/// What a read produced: the raw buffer, or the file rendered as a data URL.
#[derive(Debug, Clone)]
pub enum FilePayload {
    Raw(Bytes),
    DataUrl(String),
}

impl FilePayload {
    pub fn into_bytes(self) -> Result<Bytes, DataUrlError> {
        match self {
            FilePayload::Raw(bytes) => Ok(bytes),
            FilePayload::DataUrl(url) => Ok(Bytes::from(data_url::decode(&url)?.bytes)),
        }
    }
}

/// A user-selected file whose content can be read asynchronously.
#[async_trait]
pub trait FileSource: Send + Sync {
    fn name(&self) -> &str;
    async fn read(&self) -> std::io::Result<FilePayload>;
}

/// A file whose content already sits in memory (an HTTP part, a test fixture).
#[derive(Debug, Clone)]
pub struct MemoryFile {
    name: String,
    payload: FilePayload,
}

impl MemoryFile {
    pub fn raw(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            payload: FilePayload::Raw(bytes.into()),
        }
    }

    pub fn data_url(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: FilePayload::DataUrl(url.into()),
        }
    }
}

#[async_trait]
impl FileSource for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self) -> std::io::Result<FilePayload> {
        Ok(self.payload.clone())
    }
}

/// A file on local disk, staged under its file name.
#[derive(Debug, Clone)]
pub struct LocalFile {
    name: String,
    path: PathBuf,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }

    pub fn with_name(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

#[async_trait]
impl FileSource for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self) -> std::io::Result<FilePayload> {
        let data = tokio::fs::read(&self.path).await?;
        Ok(FilePayload::Raw(Bytes::from(data)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedEntry {
    pub name: String,
    pub size: usize,
    pub revision: Revision,
    /// False when a newer write for the same name landed first.
    pub applied: bool,
}

#[derive(Debug)]
pub struct FailedRead {
    pub name: String,
    pub error: StageError,
}

/// Outcome of one batch. `staged` and `failed` keep selection order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub staged: Vec<StagedEntry>,
    pub failed: Vec<FailedRead>,
    pub selected: Option<String>,
}

pub struct UploadStager {
    store: Arc<dyn FileStore>,
    selection: Arc<EntrySelection>,
}

impl UploadStager {
    pub fn new(store: Arc<dyn FileStore>, selection: Arc<EntrySelection>) -> Self {
        Self { store, selection }
    }

    pub fn store(&self) -> &Arc<dyn FileStore> {
        &self.store
    }

    pub fn selection(&self) -> &Arc<EntrySelection> {
        &self.selection
    }

    /// Reads every source concurrently and stages each one as its read
    /// completes.
    ///
    /// Revisions are reserved up front in selection order: for a name that
    /// appears twice the later source wins, and the selected entry ends up
    /// being the last source that was read successfully.
    pub async fn stage_batch(&self, sources: Vec<Box<dyn FileSource>>) -> BatchReport {
        info!("📥 Staging {} file(s)", sources.len());

        let reads: Vec<_> = sources
            .iter()
            .map(|source| {
                let revision = self.store.reserve_revision();
                self.stage_one(source.as_ref(), revision)
            })
            .collect();

        let mut report = BatchReport::default();
        for result in join_all(reads).await {
            match result {
                Ok(entry) => report.staged.push(entry),
                Err(failed) => report.failed.push(failed),
            }
        }
        report.selected = self.selection.current();

        info!(
            "✅ Batch done: {} staged, {} failed, selected={:?}",
            report.staged.len(),
            report.failed.len(),
            report.selected
        );
        report
    }

    async fn stage_one(
        &self,
        source: &dyn FileSource,
        revision: Revision,
    ) -> Result<StagedEntry, FailedRead> {
        let name = source.name().to_string();

        let bytes = match source.read().await {
            Ok(payload) => payload.into_bytes().map_err(|source| StageError::Decode {
                name: name.clone(),
                source,
            }),
            Err(source) => Err(StageError::Read {
                name: name.clone(),
                source,
            }),
        };

        let bytes = match bytes {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!("⚠️  {}", error);
                return Err(FailedRead { name, error });
            }
        };

        let size = bytes.len();
        let applied = self.store.put_at(&name, bytes, revision);
        self.selection.record_upload(&name);
        if applied {
            self.selection.offer(&name, revision);
        }
        tracing::debug!("Staged '{}' ({} bytes, revision {})", name, size, revision);

        Ok(StagedEntry {
            name,
            size,
            revision,
            applied,
        })
    }

    /// Makes a staged entry the dispatch target.
    pub fn select(&self, name: &str) -> Result<Revision, StageError> {
        if !self.store.contains(name) {
            return Err(StageError::NotStaged(name.to_string()));
        }
        let revision = self.store.reserve_revision();
        self.selection.offer(name, revision);
        info!("🎯 Selected '{}'", name);
        Ok(revision)
    }

    /// Drops every staged file and the selection, like reloading the page.
    pub fn clear(&self) {
        self.store.clear();
        self.selection.reset();
        info!("🧹 Staging area cleared");
    }
}
