//! Logging bootstrap for one balancer replica.
//!
//! Logs from every cluster end up in the same aggregation pipeline, so the
//! first line a replica emits carries its cluster and instance identity;
//! everything after is attributable through that startup record.

use tracing::{info, Level};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::models::{ClusterId, InstanceId};

/// Initialize structured logging for this replica.
///
/// JSON output for production, pretty for development, optionally appended
/// to a file. `RUST_LOG` overrides the configured level when set.
pub fn init_logging(
    config: &LoggingConfig,
    cluster_id: &ClusterId,
    instance_id: &InstanceId,
) -> anyhow::Result<()> {
    let level = parse_level(&config.level)?;
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let writer = log_writer(config)?;
    let registry = tracing_subscriber::registry().with(env_filter);

    if config.format.as_str() == "json" {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(writer),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().pretty().with_target(true).with_writer(writer))
            .init();
    }

    info!(
        cluster_id = %cluster_id,
        instance_id = %instance_id,
        level = %level,
        format = %config.format,
        "Logging initialized"
    );

    Ok(())
}

/// Where log lines go: an append-only file when configured, stdout otherwise
fn log_writer(config: &LoggingConfig) -> anyhow::Result<BoxMakeWriter> {
    Ok(match &config.file_path {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            BoxMakeWriter::new(std::sync::Arc::new(file))
        }
        None => BoxMakeWriter::new(std::io::stdout),
    })
}

fn parse_level(level: &str) -> anyhow::Result<Level> {
    level
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid log level: {level}"))
}
