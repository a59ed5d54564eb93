//! Tests for the configuration layers.

use std::io::Write;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use parley::config::{ParleyConfig, DEFAULT_BASE_URL};
use parley::error::ParleyError;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_ENV_VARS: [&str; 6] = [
    "OPENAI_API_KEY",
    "OPENAI_BASE_URL",
    "OPENAI_ORG_ID",
    "PARLEY_POLL_INTERVAL_MS",
    "PARLEY_HISTORY_LIMIT",
    "PARLEY_MAX_ATTEMPTS",
];

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn capture(keys: &[&str]) -> Self {
        let saved = keys
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn clean_env() -> (std::sync::MutexGuard<'static, ()>, EnvGuard) {
    let lock = env_lock_guard();
    let guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    for key in CONFIG_ENV_VARS {
        std::env::remove_var(key);
    }
    (lock, guard)
}

#[test]
fn from_env_reads_credentials_and_pacing() {
    let _env = clean_env();
    std::env::set_var("OPENAI_API_KEY", "sk-env");
    std::env::set_var("OPENAI_BASE_URL", "http://localhost:9999/v1");
    std::env::set_var("PARLEY_POLL_INTERVAL_MS", "250");
    std::env::set_var("PARLEY_HISTORY_LIMIT", "20");

    let config = ParleyConfig::from_env();

    assert_eq!(config.require_api_key().unwrap(), "sk-env");
    assert_eq!(config.base_url, "http://localhost:9999/v1");
    assert_eq!(config.poll_interval(), Duration::from_millis(250));
    assert_eq!(config.history_limit, 20);
}

#[test]
fn environment_overrides_file_values() {
    let _env = clean_env();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "api_key = \"sk-file\"\npoll_interval_ms = 1000\nmax_attempts = 2"
    )
    .unwrap();
    std::env::set_var("PARLEY_MAX_ATTEMPTS", "4");

    let config = ParleyConfig::load(file.path()).unwrap();

    assert_eq!(config.api_key.as_deref(), Some("sk-file"));
    assert_eq!(config.poll_interval_ms, 1000);
    assert_eq!(config.max_attempts, 4);
    assert_eq!(config.base_url, DEFAULT_BASE_URL);
}

#[test]
fn missing_file_is_io_error() {
    let err = ParleyConfig::load("/definitely/not/here/parley.toml").unwrap_err();
    assert!(matches!(err, ParleyError::Io(_)));
}
