use std::path::Path;
#[cfg(feature = "trace")]
use std::sync::Once;

#[cfg(feature = "trace")]
static INIT: Once = Once::new();

/// Keeps the background log writer alive. Dropping it flushes buffered lines,
/// so hold it until the end of `main`.
#[must_use = "dropping the guard stops the log writer"]
pub struct TraceGuard {
    #[cfg(feature = "trace")]
    _worker: tracing_appender::non_blocking::WorkerGuard,
}

/// Install a JSON subscriber writing to `radterm-trace.jsonl` in `log_dir`.
/// `RUST_LOG` overrides the default `radterm=debug` filter.
///
/// Returns `None` when tracing is already installed.
#[cfg(feature = "trace")]
pub fn init_tracing(log_dir: &Path) -> Option<TraceGuard> {
    let mut guard = None;
    INIT.call_once(|| {
        let file_appender = tracing_appender::rolling::never(log_dir, "radterm-trace.jsonl");
        let (non_blocking, worker) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::fmt()
            .json()
            .with_writer(non_blocking)
            .with_target(true)
            .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(
                        "radterm=debug,radterm_core=debug,radterm_gate=debug",
                    )
                }),
            )
            .init();
        guard = Some(TraceGuard { _worker: worker });
    });
    guard
}

#[cfg(not(feature = "trace"))]
pub fn init_tracing(_log_dir: &Path) -> Option<TraceGuard> {
    None
}
