//! Tracing subscriber setup

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_FILTER: &str = "panel_update_check=info";
const DEBUG_FILTER: &str = "panel_update_check=debug";

/// Build the log filter.
///
/// Log level is controlled by:
/// 1. `debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
fn env_filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::new(DEBUG_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Initialize the global tracing subscriber.
///
/// Logs go to stderr, or to `log_file` when given. The returned guard
/// flushes the file writer on drop and must be kept alive until exit.
pub fn init(debug: bool, log_file: Option<&Path>) -> std::io::Result<Option<WorkerGuard>> {
    let filter = env_filter(debug);

    let Some(path) = log_file else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .with(filter)
            .init();
        return Ok(None);
    };

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "panel-update-check.log".into());

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        dir, file_name,
    ));

    tracing_subscriber::registry()
        .with(fmt::layer().json().with_writer(writer))
        .with(filter)
        .init();

    Ok(Some(guard))
}
