use crate::services::file_store::FileStore;
use crate::services::host_bridge::{HostBridge, HostImports};
use crate::services::selection::EntrySelection;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use utoipa::ToSchema;

/// How the entry crosses the processing boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Only the name is passed; the processor looks the bytes up itself.
    #[default]
    ByName,
    /// The staged bytes are passed along with the name.
    Inline,
}

impl FromStr for DispatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "by_name" | "by-name" | "name" => Ok(DispatchMode::ByName),
            "inline" | "bytes" => Ok(DispatchMode::Inline),
            other => Err(format!("unknown dispatch mode '{}'", other)),
        }
    }
}

impl std::fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchMode::ByName => write!(f, "by_name"),
            DispatchMode::Inline => write!(f, "inline"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub entry: String,
    pub bytes: Option<Bytes>,
}

impl DispatchRequest {
    pub fn by_name(entry: impl Into<String>) -> Self {
        Self {
            entry: entry.into(),
            bytes: None,
        }
    }

    pub fn inline(entry: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            entry: entry.into(),
            bytes: Some(bytes),
        }
    }

    /// Inline bytes if present, otherwise a lookup through the host.
    pub fn resolve(&self, host: &dyn HostImports) -> Bytes {
        match &self.bytes {
            Some(bytes) => bytes.clone(),
            None => host.get_file_content(&self.entry),
        }
    }
}

/// The external processing entry point.
#[async_trait]
pub trait Processor: Send + Sync {
    fn name(&self) -> &'static str;

    async fn process(
        &self,
        host: &dyn HostImports,
        request: DispatchRequest,
    ) -> anyhow::Result<()>;
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("no entry selected; upload a file first")]
    NothingSelected,

    #[error("processor '{processor}' failed on '{entry}': {source}")]
    Processor {
        processor: &'static str,
        entry: String,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DispatchReceipt {
    pub entry: String,
    pub processor: String,
    pub mode: DispatchMode,
    pub dispatched_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

pub struct Dispatcher {
    store: Arc<dyn FileStore>,
    selection: Arc<EntrySelection>,
    host: Arc<HostBridge>,
    processor: Arc<dyn Processor>,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn FileStore>,
        selection: Arc<EntrySelection>,
        host: Arc<HostBridge>,
        processor: Arc<dyn Processor>,
    ) -> Self {
        Self {
            store,
            selection,
            host,
            processor,
        }
    }

    pub fn processor_name(&self) -> &'static str {
        self.processor.name()
    }

    /// Dispatches the currently selected entry.
    pub async fn dispatch(&self, mode: DispatchMode) -> Result<DispatchReceipt, DispatchError> {
        let entry = self
            .selection
            .current()
            .ok_or(DispatchError::NothingSelected)?;
        self.dispatch_entry(&entry, mode).await
    }

    pub async fn dispatch_entry(
        &self,
        entry: &str,
        mode: DispatchMode,
    ) -> Result<DispatchReceipt, DispatchError> {
        let request = match mode {
            DispatchMode::ByName => DispatchRequest::by_name(entry),
            // Unstaged entries go by name so the lookup reports them.
            DispatchMode::Inline => match self.store.get(entry) {
                Some(bytes) => DispatchRequest::inline(entry, bytes),
                None => DispatchRequest::by_name(entry),
            },
        };

        let dispatched_at = Utc::now();
        let start = std::time::Instant::now();
        tracing::info!(
            "🚚 Dispatching '{}' to {} ({})",
            entry,
            self.processor.name(),
            mode
        );

        self.processor
            .process(self.host.as_ref(), request)
            .await
            .map_err(|source| DispatchError::Processor {
                processor: self.processor.name(),
                entry: entry.to_string(),
                source,
            })?;

        Ok(DispatchReceipt {
            entry: entry.to_string(),
            processor: self.processor.name().to_string(),
            mode,
            dispatched_at,
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Dispatches the selected entry every time the selection changes, until
    /// `shutdown` flips.
    ///
    /// The subscription is taken when this is called, so changes made before
    /// the returned future is first polled are not missed.
    pub fn watch_selection(
        self: Arc<Self>,
        mode: DispatchMode,
        mut shutdown: watch::Receiver<bool>,
    ) -> impl Future<Output = ()> + Send + 'static {
        let mut selection = self.selection.subscribe();

        async move {
            tracing::info!("👀 Auto-dispatch watching the selection ({})", mode);

            loop {
                tokio::select! {
                    _ = shutdown.changed() => {
                        tracing::info!("🛑 Auto-dispatch shutting down");
                        break;
                    }
                    changed = selection.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let entry = selection.borrow_and_update().name.clone();
                        if let Some(entry) = entry {
                            if let Err(e) = self.dispatch_entry(&entry, mode).await {
                                tracing::error!("❌ Auto-dispatch failed: {}", e);
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::file_store::InMemoryFileStore;
    use crate::services::host_bridge::{OutputLog, TracingSink};
    use std::sync::Mutex;

    /// Records what crossed the boundary and echoes the resolved size.
    #[derive(Default)]
    struct RecordingProcessor {
        seen: Mutex<Vec<(String, bool)>>,
    }

    #[async_trait]
    impl Processor for RecordingProcessor {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn process(
            &self,
            host: &dyn HostImports,
            request: DispatchRequest,
        ) -> anyhow::Result<()> {
            self.seen
                .lock()
                .unwrap()
                .push((request.entry.clone(), request.bytes.is_some()));
            let bytes = request.resolve(host);
            host.output_log(&format!("{}:{}", request.entry, bytes.len()));
            Ok(())
        }
    }

    struct FailingProcessor;

    #[async_trait]
    impl Processor for FailingProcessor {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn process(
            &self,
            _host: &dyn HostImports,
            _request: DispatchRequest,
        ) -> anyhow::Result<()> {
            anyhow::bail!("boom")
        }
    }

    type Fixture = (
        Dispatcher,
        Arc<InMemoryFileStore>,
        Arc<EntrySelection>,
        Arc<OutputLog>,
    );

    fn setup(processor: Arc<dyn Processor>) -> Fixture {
        let store = Arc::new(InMemoryFileStore::new());
        let selection = Arc::new(EntrySelection::new());
        let output = Arc::new(OutputLog::new());
        let host = Arc::new(HostBridge::new(
            store.clone(),
            Arc::new(TracingSink),
            output.clone(),
        ));
        let dispatcher = Dispatcher::new(store.clone(), selection.clone(), host, processor);
        (dispatcher, store, selection, output)
    }

    #[test]
    fn test_dispatch_mode_parsing() {
        assert_eq!("inline".parse::<DispatchMode>(), Ok(DispatchMode::Inline));
        assert_eq!("By-Name".parse::<DispatchMode>(), Ok(DispatchMode::ByName));
        assert!("sideways".parse::<DispatchMode>().is_err());
        assert_eq!(DispatchMode::Inline.to_string(), "inline");
    }

    #[tokio::test]
    async fn test_dispatch_without_selection_fails() {
        let (dispatcher, _, _, _) = setup(Arc::new(RecordingProcessor::default()));
        assert!(matches!(
            dispatcher.dispatch(DispatchMode::ByName).await,
            Err(DispatchError::NothingSelected)
        ));
    }

    #[tokio::test]
    async fn test_by_name_and_inline_reach_same_bytes() {
        let processor = Arc::new(RecordingProcessor::default());
        let (dispatcher, store, selection, output) = setup(processor.clone());
        let revision = store.put("Main.class", Bytes::from_static(b"abcd"));
        selection.offer("Main.class", revision);

        let receipt = dispatcher.dispatch(DispatchMode::ByName).await.unwrap();
        assert_eq!(receipt.entry, "Main.class");
        assert_eq!(receipt.processor, "recording");
        dispatcher.dispatch(DispatchMode::Inline).await.unwrap();

        assert_eq!(
            *processor.seen.lock().unwrap(),
            vec![
                ("Main.class".to_string(), false),
                ("Main.class".to_string(), true)
            ]
        );
        assert_eq!(output.snapshot(), vec!["Main.class:4", "Main.class:4"]);
    }

    #[tokio::test]
    async fn test_inline_for_unstaged_entry_falls_back_to_lookup() {
        let processor = Arc::new(RecordingProcessor::default());
        let (dispatcher, _, _, output) = setup(processor.clone());

        dispatcher
            .dispatch_entry("Ghost.class", DispatchMode::Inline)
            .await
            .unwrap();

        assert_eq!(
            *processor.seen.lock().unwrap(),
            vec![("Ghost.class".to_string(), false)]
        );
        assert_eq!(output.snapshot(), vec!["Ghost.class:0"]);
    }

    #[tokio::test]
    async fn test_processor_failure_propagates() {
        let (dispatcher, _, _, _) = setup(Arc::new(FailingProcessor));
        let err = dispatcher
            .dispatch_entry("x", DispatchMode::ByName)
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Processor { processor: "failing", .. }));
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_watch_selection_dispatches_on_change() {
        let processor = Arc::new(RecordingProcessor::default());
        let (dispatcher, store, selection, output) = setup(processor.clone());
        let dispatcher = Arc::new(dispatcher);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let watcher = dispatcher.watch_selection(DispatchMode::ByName, shutdown_rx);

        // Moves before the watcher is first polled still count.
        let revision = store.put("A.class", Bytes::from_static(b"xyz"));
        selection.offer("A.class", revision);
        assert!(output.is_empty());

        let handle = tokio::spawn(watcher);

        for _ in 0..100 {
            if !output.is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert_eq!(output.snapshot(), vec!["A.class:3"]);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
