//! Logging and tracing configuration
//!
//! The transcript goes to stdout; tracing output goes to stderr so the two
//! never interleave in redirected output.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing for the CLI (stderr logging)
///
/// Logs are controlled by the `RUST_LOG` environment variable.
/// Default level is WARN for this crate and dependencies, DEBUG with `verbose`.
pub fn init_cli(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("pixcheck=debug,warn")
        } else {
            EnvFilter::new("pixcheck=warn,warn")
        }
    });

    // A subscriber may already be installed (e.g. by an embedding test)
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();
}
