//! Tracing subscriber setup for the binary.
//!
//! Filtering follows `RUST_LOG` when set, otherwise `info` for this crate and
//! `warn` for the HTTP stack:
//!
//! ```bash
//! RUST_LOG=netpay::core=trace netpay adjust --roster cities.json --anchor Warsaw
//! ```

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::util::TryInitError;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum LogFormat {
    /// Single-line human-readable output.
    #[default]
    Compact,
    /// Multi-line output with colours.
    Pretty,
    /// One JSON object per event.
    Json,
}

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,axum=warn"))
}

/// Installs the global subscriber. Logs go to stderr so CLI output on stdout
/// stays machine-readable.
pub fn init_logging(format: LogFormat) -> Result<(), TryInitError> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let registry = tracing_subscriber::registry().with(default_filter());
    match format {
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    }
}
