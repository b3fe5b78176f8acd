//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from environment variables. It provides
//! thread-safe access and mutation for testing or overrides in runtime environments.

use std::env;
use std::sync::{OnceLock, RwLock};

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub work_storage_root: String,
    pub debug: bool,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// This method is used internally to populate the singleton. Every field
    /// has a usable default so the core can run in test environments with no
    /// `.env` present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "dv-gym".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "grader=info".into()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "grader.log".into()),
            log_to_stdout: env::var("LOG_TO_STDOUT").unwrap_or_else(|_| "false".into()) == "true",
            work_storage_root: env::var("WORK_STORAGE_ROOT").unwrap_or_else(|_| "./work".into()),
            debug: matches!(
                env::var("DVGYM_DEBUG")
                    .unwrap_or_default()
                    .to_lowercase()
                    .as_str(),
                "1" | "true" | "yes"
            ),
        }
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// # Panics
    /// Panics if the lock cannot be acquired.
    pub fn global() -> std::sync::RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Resets the configuration by reloading from environment variables.
    ///
    /// Useful in tests to clear overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock.write().unwrap();
            *guard = AppConfig::from_env();
        }
    }

    /// Generic internal setter for any field in the config.
    ///
    /// Used by public per-field setter methods.
    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    /// Override `env` value.
    pub fn set_env(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.env = value.into());
    }

    pub fn set_project_name(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.project_name = value.into());
    }

    pub fn set_log_level(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_level = value.into());
    }

    pub fn set_log_file(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_file = value.into());
    }

    pub fn set_log_to_stdout(value: bool) {
        AppConfig::set_field(|cfg| cfg.log_to_stdout = value);
    }

    pub fn set_work_storage_root(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.work_storage_root = value.into());
    }

    pub fn set_debug(value: bool) {
        AppConfig::set_field(|cfg| cfg.debug = value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults_without_env() {
        unsafe {
            std::env::remove_var("PROJECT_NAME");
            std::env::remove_var("WORK_STORAGE_ROOT");
            std::env::remove_var("DVGYM_DEBUG");
        }
        let cfg = AppConfig::from_env();
        assert_eq!(cfg.project_name, "dv-gym");
        assert_eq!(cfg.work_storage_root, "./work");
        assert!(!cfg.debug);
    }

    #[test]
    #[serial]
    fn test_debug_flag_variants() {
        for (value, expected) in [("1", true), ("true", true), ("YES", true), ("off", false)] {
            unsafe {
                std::env::set_var("DVGYM_DEBUG", value);
            }
            let cfg = AppConfig::from_env();
            assert_eq!(cfg.debug, expected, "DVGYM_DEBUG={value}");
        }
        unsafe {
            std::env::remove_var("DVGYM_DEBUG");
        }
    }

    #[test]
    #[serial]
    fn test_setter_overrides_global() {
        AppConfig::set_work_storage_root("/tmp/dv-gym-work");
        assert_eq!(AppConfig::global().work_storage_root, "/tmp/dv-gym-work");
        AppConfig::reset();
    }
}
