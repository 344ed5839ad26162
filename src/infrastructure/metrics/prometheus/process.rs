use anyhow::Result;
use prometheus::Registry;

/// Registers the process collector (CPU time, resident memory, open file
/// descriptors, start time) with `registry`.
#[cfg(target_os = "linux")]
pub(crate) fn register_process_collector(registry: &Registry) -> Result<()> {
    // ---
    use prometheus::process_collector::ProcessCollector;

    registry.register(Box::new(ProcessCollector::for_self()))?;
    tracing::info!("Observing process metrics");
    Ok(())
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn register_process_collector(_registry: &Registry) -> Result<()> {
    tracing::debug!("Process metrics are only collected on Linux");
    Ok(())
}
