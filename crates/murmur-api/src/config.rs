//! Application configuration loaded from environment variables.

use anyhow::{Result, bail};

/// Admin passwords that must never make it past boot.
pub const PLACEHOLDER_PASSWORDS: &[&str] = &["change-me", "admin", "password", "secret"];

#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind host (default "0.0.0.0").
    pub host: String,

    /// Server bind port (default 3000).
    pub port: u16,

    /// SQLite database file path.
    pub db_path: String,

    /// Public base URL used in permalinks, emails, and feed links.
    pub base_url: String,

    /// Site name shown in page titles, OG tags, and email subjects.
    pub site_name: String,

    /// Plaintext admin password (compared via digest equality).
    pub admin_password: Option<String>,

    /// Argon2 PHC hash of the admin password; takes precedence over the
    /// plaintext form when both are set.
    pub admin_password_hash: Option<String>,

    /// Skip the session guard entirely. Local development only.
    pub dev_bypass: bool,

    /// Requests allowed per client IP per rate-limit window.
    pub rate_limit_per_minute: u32,
}

impl Config {
    /// Load configuration from environment variables. Fails when no admin
    /// credential is configured or a placeholder password is used.
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("MURMUR_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = std::env::var("MURMUR_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()?;
        let db_path = std::env::var("MURMUR_DB_PATH").unwrap_or_else(|_| "murmur.db".to_string());
        let base_url = std::env::var("MURMUR_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_string();
        let site_name = std::env::var("MURMUR_SITE_NAME").unwrap_or_else(|_| "Murmur".to_string());

        let admin_password = std::env::var("MURMUR_ADMIN_PASSWORD").ok().filter(|s| !s.is_empty());
        let admin_password_hash = std::env::var("MURMUR_ADMIN_PASSWORD_HASH")
            .ok()
            .filter(|s| !s.is_empty());
        let dev_bypass = std::env::var("MURMUR_DEV_BYPASS").is_ok_and(|v| v == "1");

        if admin_password.is_none() && admin_password_hash.is_none() {
            bail!("MURMUR_ADMIN_PASSWORD (or MURMUR_ADMIN_PASSWORD_HASH) must be set");
        }
        if let Some(pw) = &admin_password {
            if PLACEHOLDER_PASSWORDS.contains(&pw.as_str()) {
                bail!("MURMUR_ADMIN_PASSWORD is still a placeholder value");
            }
        }

        let rate_limit_per_minute: u32 = std::env::var("MURMUR_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(120);

        tracing::info!(
            host = %host,
            port,
            db_path = %db_path,
            base_url = %base_url,
            site_name = %site_name,
            dev_bypass,
            rate_limit_per_minute,
            "configuration loaded"
        );

        Ok(Self {
            host,
            port,
            db_path,
            base_url,
            site_name,
            admin_password,
            admin_password_hash,
            dev_bypass,
            rate_limit_per_minute,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mutex to serialize config tests that manipulate env vars.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const ENV_KEYS: &[&str] = &[
        "MURMUR_HOST",
        "MURMUR_PORT",
        "MURMUR_DB_PATH",
        "MURMUR_BASE_URL",
        "MURMUR_SITE_NAME",
        "MURMUR_ADMIN_PASSWORD",
        "MURMUR_ADMIN_PASSWORD_HASH",
        "MURMUR_DEV_BYPASS",
        "MURMUR_RATE_LIMIT",
    ];

    fn with_env_vars<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
        let _guard = ENV_MUTEX.lock().unwrap();

        let saved: Vec<_> = ENV_KEYS.iter().map(|k| (*k, std::env::var(k).ok())).collect();

        // SAFETY: serialized by the mutex; only test code touches these vars.
        unsafe {
            for k in ENV_KEYS {
                std::env::remove_var(k);
            }
            for (k, v) in vars {
                std::env::set_var(k, v);
            }
        }

        f();

        // SAFETY: restoring original env state.
        unsafe {
            for (k, v) in &saved {
                match v {
                    Some(val) => std::env::set_var(k, val),
                    None => std::env::remove_var(k),
                }
            }
        }
    }

    #[test]
    fn missing_password_refused() {
        with_env_vars(&[], || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn placeholder_password_refused() {
        with_env_vars(&[("MURMUR_ADMIN_PASSWORD", "change-me")], || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn defaults_with_real_password() {
        with_env_vars(&[("MURMUR_ADMIN_PASSWORD", "a-long-real-password")], || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.host, "0.0.0.0");
            assert_eq!(config.port, 3000);
            assert_eq!(config.base_url, "http://localhost:3000");
            assert_eq!(config.site_name, "Murmur");
            assert!(!config.dev_bypass);
        });
    }

    #[test]
    fn base_url_trailing_slash_stripped() {
        with_env_vars(
            &[
                ("MURMUR_ADMIN_PASSWORD", "a-long-real-password"),
                ("MURMUR_BASE_URL", "https://blog.example/"),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.base_url, "https://blog.example");
            },
        );
    }

    #[test]
    fn hash_alone_is_sufficient() {
        with_env_vars(&[("MURMUR_ADMIN_PASSWORD_HASH", "$argon2id$stub")], || {
            let config = Config::from_env().unwrap();
            assert!(config.admin_password.is_none());
            assert!(config.admin_password_hash.is_some());
        });
    }
}
