use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=info,sqlx=warn";

/// Installs the global subscriber: an `EnvFilter` over a fmt layer writing to
/// stdout through a non-blocking appender.
///
/// Keep the returned guard alive for the life of the process, otherwise
/// buffered log lines are lost on exit.
pub fn init_tracing() -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_target(true))
        .init();

    guard
}
