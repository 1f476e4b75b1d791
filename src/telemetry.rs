use anyhow::Result;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::ObservabilityConfig;

/// Initialize structured logging.
///
/// `RUST_LOG` wins when set; otherwise the configured level applies. JSON output
/// carries the current span and span list so log lines can be grouped by
/// correlation id.
pub fn init_telemetry(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let registry = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }

    tracing::debug!("Workspace versioning telemetry initialized");
    Ok(())
}

/// Generate a correlation ID for linking the operations of one facade instance
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Create a span carrying the common attributes of a versioning operation
pub fn create_versioning_span(
    operation: &str,
    working_dir: &Path,
    correlation_id: &str,
) -> tracing::Span {
    tracing::info_span!(
        "versioning",
        operation = operation,
        workspace = %working_dir.display(),
        correlation.id = correlation_id,
        otel.kind = "internal"
    )
}
