use crate::config::StagerConfig;
use crate::services::dispatch::Processor;
use std::sync::Arc;
use tracing::info;

pub fn setup_processor(config: &StagerConfig) -> Arc<dyn Processor> {
    let processor = crate::services::processors::create_processor(&config.processor);

    info!(
        "⚙️  Processor: {} (mode={}, auto-dispatch={})",
        processor.name(),
        config.dispatch_mode,
        config.auto_dispatch
    );

    processor.into()
}
