//! Logging setup.
//!
//! Library code only emits `tracing` events; binaries call [`init`] once
//! to print them.

use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber filtered by `RUST_LOG`.
///
/// Falls back to `default_filter` (e.g. `"info,mathrace_room=debug"`)
/// when `RUST_LOG` is unset or unparsable. Returns `false` if a global
/// subscriber was already installed, which is harmless in tests.
pub fn init(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_a_no_op() {
        let _ = init("warn");
        assert!(!init("warn"));
    }
}
