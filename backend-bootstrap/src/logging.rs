use anyhow::{anyhow, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber. With `log_dir` set, output goes to a
/// daily rolling file and the returned guard must outlive the server.
pub fn init(log_format: &str, log_dir: Option<&str>) -> Result<Option<WorkerGuard>> {
    let json = log_format == "json";
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter());

    let (installed, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "turnout-backend.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let builder = builder.with_writer(writer).with_ansi(false);
            let installed = if json {
                builder.json().try_init()
            } else {
                builder.try_init()
            };
            (installed, Some(guard))
        }
        None => {
            let installed = if json {
                builder.json().try_init()
            } else {
                builder.try_init()
            };
            (installed, None)
        }
    };
    installed.map_err(|err| anyhow!("failed to install logger: {err}"))?;
    Ok(guard)
}
