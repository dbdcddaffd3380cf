use crate::services::dispatch::{DispatchRequest, Processor};
use crate::services::host_bridge::HostImports;
use crate::utils::hash::calculate_hash;
use anyhow::Result;
use async_trait::async_trait;

/// Reports size, SHA-256 and sniffed MIME type of the entry.
pub struct DigestProcessor;

#[async_trait]
impl Processor for DigestProcessor {
    fn name(&self) -> &'static str {
        "digest"
    }

    async fn process(&self, host: &dyn HostImports, request: DispatchRequest) -> Result<()> {
        let bytes = request.resolve(host);
        if bytes.is_empty() {
            host.output_log(&format!("{}: nothing to digest", request.entry));
            return Ok(());
        }

        let mime_type = infer::get(&bytes)
            .map(|kind| kind.mime_type())
            .unwrap_or("application/octet-stream");

        host.output_log(&format!("{}: {} bytes", request.entry, bytes.len()));
        host.output_log(&format!("sha256 {}", calculate_hash(&bytes)));
        host.output_log(&format!("type {}", mime_type));
        Ok(())
    }
}

pub struct GreetProcessor;

#[async_trait]
impl Processor for GreetProcessor {
    fn name(&self) -> &'static str {
        "greet"
    }

    async fn process(&self, host: &dyn HostImports, request: DispatchRequest) -> Result<()> {
        let bytes = request.resolve(host);
        host.output_log(&format!("Hello, {}!", request.entry));
        host.output_log(&format!("{} has {} bytes", request.entry, bytes.len()));
        Ok(())
    }
}

pub fn create_processor(kind: &str) -> Box<dyn Processor> {
    match kind.to_lowercase().as_str() {
        "digest" | "sha256" => Box::new(DigestProcessor),
        "greet" | "hello" => Box::new(GreetProcessor),
        _ => {
            tracing::warn!("Unknown processor '{}', using DigestProcessor", kind);
            Box::new(DigestProcessor)
        }
    }
}
