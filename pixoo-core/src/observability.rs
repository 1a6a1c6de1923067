/*!
Structured logging setup for Pixoo binaries.

The library itself only emits `tracing` events; a binary calls
[`init_observability`] once to install a subscriber.
*/

use tracing::subscriber::set_global_default;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::{PixooError, Result};

/// Directive used when `RUST_LOG` is not set
pub const DEFAULT_DIRECTIVE: &str = "pixoo=info";

/// Build the env filter, falling back to `default_directive`
pub fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Initialize the global tracing subscriber
///
/// # Arguments
/// * `default_directive` - Filter used when `RUST_LOG` is unset (e.g. `"info"`)
/// * `json` - Emit one JSON object per event instead of human-readable lines
///
/// # Errors
/// Fails if a global subscriber is already installed.
pub fn init_observability(default_directive: &str, json: bool) -> Result<()> {
    let json_layer = json.then(|| {
        fmt::layer()
            .json()
            .with_target(false)
            .with_current_span(false)
    });
    let text_layer = (!json).then(|| fmt::layer().with_target(false));

    let subscriber = Registry::default()
        .with(env_filter(default_directive))
        .with(json_layer)
        .with(text_layer);

    set_global_default(subscriber).map_err(|e| {
        PixooError::validation(format!("Failed to set global tracing subscriber: {e}"))
    })?;

    tracing::debug!("Pixoo logging initialized");
    Ok(())
}

/// Initialize logging with [`DEFAULT_DIRECTIVE`] and plain-text output
pub fn init_default_observability() -> Result<()> {
    init_observability(DEFAULT_DIRECTIVE, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        let _ = init_default_observability();
        assert!(init_observability("debug", true).is_err());
    }

    #[test]
    fn test_env_filter_accepts_directive() {
        let filter = env_filter("pixoo=debug");
        assert!(!filter.to_string().is_empty());
    }
}
