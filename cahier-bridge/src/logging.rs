//! Log to a file: the terminal belongs to the UI while it runs.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_NAME: &str = "cahier.log";
pub const DEFAULT_FILTER: &str = "cahier=info,cahier_core=info,cahier_bridge=info";

/// Install the global subscriber. `CAHIER_LOG` wins over `RUST_LOG`.
/// Keep the returned guard alive until exit so buffered lines get flushed.
pub fn init(log_dir: &Path) -> Option<WorkerGuard> {
    if let Err(e) = std::fs::create_dir_all(log_dir) {
        eprintln!("Warning: logging disabled, cannot create {}: {}", log_dir.display(), e);
        return None;
    }

    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env("CAHIER_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;

    Some(guard)
}
