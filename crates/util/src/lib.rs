//! Ambient utilities shared by `intently`'s crates: YAML document loading,
//! error-logging helpers, and (behind `feature = "test"`) assertion macros.

pub mod yaml;

#[cfg(feature = "test")]
pub mod test_util;

/// Extension trait that logs an `Err` via `tracing` before passing it
/// through unchanged, so a caller can `?` an error and still get it
/// recorded.
pub trait ResultTraced<T> {
    fn traced(self) -> anyhow::Result<T>;
}

impl<T> ResultTraced<T> for anyhow::Result<T> {
    fn traced(self) -> anyhow::Result<T> {
        if let Err(error) = &self {
            tracing::error!(error = %error, "operation failed");
        }
        self
    }
}

/// Initialize a `tracing-subscriber` formatter for CLI use. `verbose`
/// lowers the default filter from `info` to `debug`.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}
