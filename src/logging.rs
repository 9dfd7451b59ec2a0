//! Optional `tracing` subscriber setup for hosts that do not install their own.

use tracing_subscriber::EnvFilter;

/// Installs a global fmt subscriber. `RUST_LOG` wins over `default_directives`.
///
/// Fails if the directives do not parse or a global subscriber is already set.
pub fn init(default_directives: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directives)?,
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).try_init()
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_invalid_directives_are_rejected() {
        if std::env::var_os("RUST_LOG").is_none() {
            assert!(super::init("authgate_core=notalevel").is_err());
        }
    }
}
