//! Log output setup.
//!
//! `RUST_LOG` wins when set. Otherwise development mode logs this crate at
//! `debug` (every request with its latency), and normal mode at `info`.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn default_filter(dev_mode: bool) -> &'static str {
    if dev_mode {
        "pronounce_client=debug,info"
    } else {
        "pronounce_client=info,warn"
    }
}

/// Install a global fmt subscriber. Returns `false` when one is already
/// installed (tests, embedding applications).
pub fn init(dev_mode: bool) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(dev_mode)));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_harmless() {
        init(true);
        assert!(!init(false));
    }

    #[test]
    fn dev_mode_enables_request_logs() {
        assert!(default_filter(true).contains("pronounce_client=debug"));
        assert!(default_filter(false).contains("pronounce_client=info"));
    }
}
