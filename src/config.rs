use anyhow::Result;
use std::path::PathBuf;

pub(crate) const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Process-wide settings, read from the environment once at startup and
/// passed down explicitly. Missing settings fail here, not at first use.
#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) db_path: PathBuf,
    pub(crate) bot_token: String,
    pub(crate) chat_id: String,
    pub(crate) api_base: String,
}

impl Config {
    pub(crate) fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let db_path = require(&get, "DB_PATH")?;
        let bot_token = require(&get, "API_TOKEN")?;
        let chat_id = require(&get, "ALLOWED_USER_ID")?;
        let api_base = get("TELEGRAM_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        Ok(Self {
            db_path: PathBuf::from(db_path),
            bot_token,
            chat_id,
            api_base,
        })
    }
}

fn require(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    match get(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => anyhow::bail!("Missing required configuration: {key}"),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + '_ {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_lookup(env(&[
            ("DB_PATH", "/tmp/ledger.db"),
            ("API_TOKEN", "123:abc"),
            ("ALLOWED_USER_ID", "42"),
            ("TELEGRAM_API_URL", "http://localhost:8081"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/ledger.db"));
        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.chat_id, "42");
        assert_eq!(config.api_base, "http://localhost:8081");
    }

    #[test]
    fn test_api_base_defaults() {
        let config = Config::from_lookup(env(&[
            ("DB_PATH", "/tmp/ledger.db"),
            ("API_TOKEN", "123:abc"),
            ("ALLOWED_USER_ID", "42"),
        ]))
        .unwrap();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn test_missing_setting_names_the_variable() {
        let err = Config::from_lookup(env(&[
            ("DB_PATH", "/tmp/ledger.db"),
            ("ALLOWED_USER_ID", "42"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("API_TOKEN"));
    }

    #[test]
    fn test_blank_setting_rejected() {
        let err = Config::from_lookup(env(&[
            ("DB_PATH", "  "),
            ("API_TOKEN", "123:abc"),
            ("ALLOWED_USER_ID", "42"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("DB_PATH"));
    }
}
