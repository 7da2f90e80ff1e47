use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

const LOG_FILE_PREFIX: &str = "lexdesk.log";

/// Installs the global subscriber and bridges `log` records into it.
///
/// Events go to stderr, or to a daily rolling file under `log_dir` when one
/// is configured. The returned guard flushes the file writer on drop and
/// must be held for the life of the process.
pub fn init(config: &Config) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&config.log_filter)
        .with_context(|| format!("invalid log filter {:?}", config.log_filter))?;

    let (writer, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    let bridged = tracing_log::LogTracer::init();
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_timer(UtcTime::rfc_3339())
        .with_writer(writer);
    let installed = if config.log_json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    // Both fail only when something else got there first; that one stays.
    if let Err(err) = bridged {
        tracing::debug!(target: "lexdesk", event = "log_bridge_present", error = %err);
    }
    if let Err(err) = installed {
        tracing::debug!(target: "lexdesk", event = "subscriber_present", error = %err);
    }

    if let Some(dir) = &config.log_dir {
        tracing::info!(target: "lexdesk", event = "log_file_sink", dir = %dir.display());
    }
    Ok(guard)
}
