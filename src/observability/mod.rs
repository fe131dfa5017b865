//! Structured logging setup.
//!
//! Logs go to stderr so stdout stays clean for graph exports.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset, by verbosity.
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "docgraph=info",
        1 => "docgraph=debug",
        _ => "docgraph=trace",
    }
}

/// Initialize structured logging with `RUST_LOG` environment variable support.
///
/// Without `RUST_LOG` the level follows `verbosity` (`-v` flags). Call once
/// at program startup; subsequent calls are silently ignored by
/// `tracing_subscriber`.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    // try_init so double-init in tests doesn't panic
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
