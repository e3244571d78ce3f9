//! Environment configuration.
//!
//! Read once at [`App`](crate::app::App) construction and carried on the app;
//! nothing in the runtime reads the environment after startup.

use std::env;

/// Tunables sourced from `EMBER_*` environment variables.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Paint the frame-time overlay into the topmost stacking band.
    pub debug_overlay: bool,
    /// Scroll lines applied per wheel tick.
    pub wheel_lines: u32,
    /// Hover delay before a tooltip activates, in milliseconds.
    pub tooltip_delay_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            debug_overlay: false,
            wheel_lines: 3,
            tooltip_delay_ms: 500,
        }
    }
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            debug_overlay: env_flag("EMBER_DEBUG_OVERLAY"),
            wheel_lines: env_parse("EMBER_WHEEL_LINES", defaults.wheel_lines),
            tooltip_delay_ms: env_parse("EMBER_TOOLTIP_DELAY_MS", defaults.tooltip_delay_ms),
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::RuntimeConfig;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.previous {
                unsafe { env::set_var(self.key, value) };
            } else {
                unsafe { env::remove_var(self.key) };
            }
        }
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env lock poisoned")
    }

    fn set_env_guard(key: &'static str, value: Option<&str>) -> EnvGuard {
        let previous = env::var(key).ok();
        if let Some(value) = value {
            unsafe { env::set_var(key, value) };
        } else {
            unsafe { env::remove_var(key) };
        }
        EnvGuard { key, previous }
    }

    #[test]
    fn env_defaults() {
        let _lock = env_lock();
        let _g1 = set_env_guard("EMBER_DEBUG_OVERLAY", None);
        let _g2 = set_env_guard("EMBER_WHEEL_LINES", None);
        let _g3 = set_env_guard("EMBER_TOOLTIP_DELAY_MS", None);

        let config = RuntimeConfig::from_env();
        assert!(!config.debug_overlay);
        assert_eq!(config.wheel_lines, 3);
        assert_eq!(config.tooltip_delay_ms, 500);
    }

    #[test]
    fn env_overrides_apply() {
        let _lock = env_lock();
        let _g1 = set_env_guard("EMBER_DEBUG_OVERLAY", Some("1"));
        let _g2 = set_env_guard("EMBER_WHEEL_LINES", Some("5"));
        let _g3 = set_env_guard("EMBER_TOOLTIP_DELAY_MS", Some("250"));

        let config = RuntimeConfig::from_env();
        assert!(config.debug_overlay);
        assert_eq!(config.wheel_lines, 5);
        assert_eq!(config.tooltip_delay_ms, 250);
    }

    #[test]
    fn garbage_values_fall_back_to_defaults() {
        let _lock = env_lock();
        let _g1 = set_env_guard("EMBER_DEBUG_OVERLAY", Some("yes"));
        let _g2 = set_env_guard("EMBER_WHEEL_LINES", Some("many"));
        let _g3 = set_env_guard("EMBER_TOOLTIP_DELAY_MS", Some(""));

        let config = RuntimeConfig::from_env();
        assert!(!config.debug_overlay);
        assert_eq!(config.wheel_lines, 3);
        assert_eq!(config.tooltip_delay_ms, 500);
    }
}
