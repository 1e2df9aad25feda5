//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system.
///
/// Honors `RUST_LOG` and falls back to `info`. Calling this more than once
/// is harmless; later calls are ignored.
pub fn init() {
    init_with_filter("info");
}

/// Initialize logging with an explicit default filter (e.g. `"slot_engine=debug"`).
///
/// `RUST_LOG` still takes precedence when set.
pub fn init_with_filter(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    if env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init()
        .is_err()
    {
        log::debug!("Logger already initialized");
    }
}
