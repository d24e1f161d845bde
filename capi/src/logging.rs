//! # Structured Logging
//!
//! Installs a `tracing` subscriber for hosts that want to see what the
//! library does. Nothing is installed unless the host asks: a library must
//! not grab the global subscriber on its own.
//!
//! Output goes to stderr so that stdout stays with the host program.

use std::ffi::c_char;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::boundary::c_str;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable output for local development.
    Pretty,
    /// JSON lines for log aggregation.
    Json,
}

impl LogFormat {
    /// Accepts "json" or "pretty" (case-insensitive); anything else is
    /// `Pretty`.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` overrides `default_level` when set, e.g.
///
/// ```text
/// RUST_LOG=assetchain_protocol=debug,assetchain_capi=info
/// ```
///
/// Returns `false` if a global subscriber was already installed, by this
/// function or by the host.
pub fn init_logging(default_level: &str, format: LogFormat) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let installed = match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init()
            .is_ok(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init()
            .is_ok(),
    };

    if installed {
        tracing::info!("logging initialized (format={:?})", format);
    }
    installed
}

/// C entry point for [`init_logging`]. A null `level` means `"info"`.
///
/// # Safety
///
/// `level` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn ac_logging_init(level: *const c_char, json: bool) -> bool {
    let level = if level.is_null() {
        "info"
    } else {
        match c_str(level, "level") {
            Ok(level) => level,
            Err(_) => return false,
        }
    };
    let format = if json { LogFormat::Json } else { LogFormat::Pretty };
    std::panic::catch_unwind(|| init_logging(level, format)).unwrap_or(false)
}
