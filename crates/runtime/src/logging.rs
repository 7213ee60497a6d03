//! Tracing setup
//!
//! Logs go to stderr so stdout carries only the parent's and child's lines.
//! `RUST_LOG` wins when set; otherwise the configured directive applies.

use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` if present and valid, else `default_directive`
pub fn filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG))
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(default_directive: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(default_directive))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_invalid_directive_falls_back() {
        // Must not panic on a directive that does not parse
        let _ = filter("fibfork=[[");
    }

    #[test]
    #[serial]
    fn test_init_is_idempotent() {
        init("warn");
        init("debug");
    }
}
