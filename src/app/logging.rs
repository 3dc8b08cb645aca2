//! Usage: Process-wide tracing setup (stderr + optional daily rolling file, `log` bridge).

use crate::shared::error::AppResult;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info";
const LOG_FILE_PREFIX: &str = "bird-auth.log";

static INITIALIZED: AtomicBool = AtomicBool::new(false);
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Directive used when `RUST_LOG` is unset or invalid.
    pub default_filter: String,
    /// Also write to `<dir>/bird-auth.log.<date>`.
    pub log_dir: Option<PathBuf>,
    pub ansi: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            default_filter: DEFAULT_FILTER.to_string(),
            log_dir: None,
            ansi: true,
        }
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(options: &LogOptions) -> AppResult<()> {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(options.default_filter.as_str()));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(options.ansi)
        .with_target(true);

    let file_layer = match options.log_dir.as_ref() {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| {
                INITIALIZED.store(false, Ordering::SeqCst);
                format!("SYSTEM_ERROR: failed to create log dir {}: {e}", dir.display())
            })?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(fmt::layer().with_writer(writer).with_ansi(false))
        }
        None => None,
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer);

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        // Another subscriber (e.g. the host's) owns the process; keep using it.
        tracing::debug!("global tracing subscriber already set: {e}");
        return Ok(());
    }

    // reqwest/hyper internals log through the `log` facade.
    if let Err(e) = tracing_log::LogTracer::init() {
        tracing::debug!("log bridge not installed: {e}");
    }

    tracing::debug!(file = options.log_dir.is_some(), "logging initialized");
    Ok(())
}
