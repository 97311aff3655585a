
use std::env;

use tempfile::TempDir;

/// RAII guard for environment variables - automatically restores on drop
pub(crate) struct EnvGuard {
    key: &'static str,
    original: Option<String>,
}

impl EnvGuard {
    pub(crate) fn set(key: &'static str, value: &str) -> Self {
        unsafe {
            let original = env::var(key).ok();
            env::set_var(key, value);
            Self { key, original }
        }
    }

    pub(crate) fn remove(key: &'static str) -> Self {
        unsafe {
            let original = env::var(key).ok();
            env::remove_var(key);
            Self { key, original }
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        unsafe {
            match &self.original {
                Some(val) => env::set_var(self.key, val),
                None => env::remove_var(self.key),
            }
        }
    }
}

/// Isolated config directory with database env vars cleared
pub(crate) struct ConfigDir {
    pub(crate) temp: TempDir,
    _guards: Vec<EnvGuard>,
}

/// Create a temp config directory and point INV_CONFIG_DIR at it
pub(crate) fn setup_config_dir() -> ConfigDir {
    let temp = TempDir::new().unwrap();
    let guards = vec![
        EnvGuard::set("INV_CONFIG_DIR", temp.path().to_str().unwrap()),
        EnvGuard::remove("DATABASE_URL"),
        EnvGuard::remove("INV_DATABASE_URL"),
        EnvGuard::remove("INV_RELAY_URL"),
    ];
    ConfigDir {
        temp,
        _guards: guards,
    }
}
