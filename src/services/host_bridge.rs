use crate::services::file_store::FileStore;
use bytes::Bytes;
use std::sync::{Arc, Mutex, MutexGuard};

/// Where processor output and lookup failures are written.
pub trait LogSink: Send + Sync {
    fn info(&self, line: &str);
    fn error(&self, line: &str);
}

/// Writes through `tracing` under the `guest` target.
pub struct TracingSink;

impl LogSink for TracingSink {
    fn info(&self, line: &str) {
        tracing::info!(target: "guest", "{}", line);
    }

    fn error(&self, line: &str) {
        tracing::error!(target: "guest", "{}", line);
    }
}

/// Observable list of every line a processor reported.
#[derive(Debug, Default)]
pub struct OutputLog {
    lines: Mutex<Vec<String>>,
}

impl OutputLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, line: String) {
        self.lock().push(line);
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.lines.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Functions a processor may call back into while it runs.
pub trait HostImports: Send + Sync {
    /// Staged bytes for `key`, or an empty sequence (and one logged error)
    /// when nothing is staged under that name.
    fn get_file_content(&self, key: &str) -> Bytes;

    /// Writes `value` to the log sink, then appends it to the output list.
    fn output_log(&self, value: &str);
}

pub struct HostBridge {
    store: Arc<dyn FileStore>,
    sink: Arc<dyn LogSink>,
    output: Arc<OutputLog>,
}

impl HostBridge {
    pub fn new(store: Arc<dyn FileStore>, sink: Arc<dyn LogSink>, output: Arc<OutputLog>) -> Self {
        Self {
            store,
            sink,
            output,
        }
    }

    pub fn output(&self) -> &Arc<OutputLog> {
        &self.output
    }
}

impl HostImports for HostBridge {
    fn get_file_content(&self, key: &str) -> Bytes {
        match self.store.get(key) {
            Some(bytes) => bytes,
            None => {
                self.sink.error(&format!("{} is not found. upload {}", key, key));
                Bytes::new()
            }
        }
    }

    fn output_log(&self, value: &str) {
        self.sink.info(value);
        self.output.push(value.to_string());
    }
}
