//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
///
/// Reads the `RUST_LOG` environment variable for filtering, as usual for
/// `env_logger`. Call once at application startup.
pub fn init() {
    env_logger::init();
}
