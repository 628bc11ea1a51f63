//! Logging setup for the provider process.
//!
//! All output goes to **stderr**; stdout belongs to the host. The filter
//! comes from `RUST_LOG` when set. Otherwise the host's `TF_LOG` level
//! (`TRACE`, `DEBUG`, `INFO`, `WARN`, `ERROR`, any case) is honoured, and
//! failing both the given default applies.
//!
//! ```bash
//! RUST_LOG=eventpush_provider=debug ./terraform-provider-eventpush
//! TF_LOG=DEBUG terraform apply
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable the host uses for its own log level.
pub const HOST_LOG_ENV: &str = "TF_LOG";

/// Initialize logging at `info` unless the environment says otherwise.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with_default("info");
}

/// Initialize logging with a custom default level.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with_default(default_level: &str) {
    let filter = resolve_filter(
        std::env::var(HOST_LOG_ENV).ok().as_deref(),
        default_level,
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer())
        .init();
}

/// Try to initialize logging, returning false if already initialized.
pub fn try_init_logging() -> bool {
    let filter = resolve_filter(std::env::var(HOST_LOG_ENV).ok().as_deref(), "info");
    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer())
        .try_init()
        .is_ok()
}

fn stderr_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
}

fn resolve_filter(host_level: Option<&str>, default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = host_level
            .and_then(host_level_directive)
            .unwrap_or(default_level);
        EnvFilter::new(level)
    })
}

/// Map a `TF_LOG` value onto a filter directive.
///
/// `JSON` is the host's structured trace mode and maps to `trace`; unknown
/// values yield `None`.
fn host_level_directive(value: &str) -> Option<&'static str> {
    match value.trim().to_ascii_uppercase().as_str() {
        "TRACE" | "JSON" => Some("trace"),
        "DEBUG" => Some("debug"),
        "INFO" => Some("info"),
        "WARN" => Some("warn"),
        "ERROR" => Some("error"),
        "OFF" => Some("off"),
        _ => None,
    }
}
