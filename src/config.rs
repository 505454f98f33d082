//! Startup configuration.
//!
//! Everything the boot sequence needs is read once, validated, and handed to
//! each step explicitly. Sources, lowest priority first:
//! - built-in defaults
//! - process environment (a `.env` file is loaded into it by `main`)

use crate::bootstrap::readiness::ReadinessPolicy;
use crate::error::BootError;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Environment keys consulted by [`Config::figment`].
pub const ENV_KEYS: [&str; 10] = [
    "database_url",
    "host",
    "port",
    "loglevel",
    "db_ready_interval_secs",
    "db_ready_max_attempts",
    "superuser_username",
    "superuser_email",
    "superuser_password",
    "password_hash_cost",
];

/// Flat, unvalidated view of the configuration sources.
#[derive(Clone, Serialize, Deserialize)]
pub struct RawConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub loglevel: String,
    pub db_ready_interval_secs: u64,
    pub db_ready_max_attempts: Option<usize>,
    pub superuser_username: Option<String>,
    pub superuser_email: Option<String>,
    pub superuser_password: Option<String>,
    pub password_hash_cost: u32,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://data/assignmate.sqlite".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            loglevel: "info".to_string(),
            db_ready_interval_secs: 2,
            db_ready_max_attempts: None,
            superuser_username: None,
            superuser_email: None,
            superuser_password: None,
            password_hash_cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// Credentials for the privileged account created at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct SuperuserSettings {
    pub username: String,
    pub email: String,
    pub password: String,
    /// bcrypt work factor used when the account is created.
    pub hash_cost: u32,
}

impl fmt::Debug for SuperuserSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuperuserSettings")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("hash_cost", &self.hash_cost)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub loglevel: String,
    pub readiness: ReadinessPolicy,
    /// `None` disables provisioning.
    pub superuser: Option<SuperuserSettings>,
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(RawConfig::default()))
            .merge(Env::raw().only(&ENV_KEYS))
    }

    /// Load from the process environment and validate.
    pub fn load() -> Result<Self, BootError> {
        Self::from_figment(&Self::figment())
    }

    pub fn from_figment(figment: &Figment) -> Result<Self, BootError> {
        let raw: RawConfig = figment.extract()?;
        Self::try_from(raw)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl TryFrom<RawConfig> for Config {
    type Error = BootError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        if raw.database_url.trim().is_empty() {
            return Err(BootError::Config("DATABASE_URL must not be empty".to_string()));
        }
        if raw.host.trim().is_empty() {
            return Err(BootError::Config("HOST must not be empty".to_string()));
        }
        if raw.port == 0 {
            return Err(BootError::Config("PORT must be between 1 and 65535".to_string()));
        }
        if raw.db_ready_interval_secs == 0 {
            return Err(BootError::Config(
                "DB_READY_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }
        if raw.db_ready_max_attempts == Some(0) {
            return Err(BootError::Config(
                "DB_READY_MAX_ATTEMPTS must be greater than zero when set".to_string(),
            ));
        }

        let superuser = superuser_settings(
            raw.superuser_username,
            raw.superuser_email,
            raw.superuser_password,
            raw.password_hash_cost,
        )?;

        Ok(Self {
            database_url: raw.database_url,
            host: raw.host,
            port: raw.port,
            loglevel: raw.loglevel,
            readiness: ReadinessPolicy {
                interval: Duration::from_secs(raw.db_ready_interval_secs),
                max_attempts: raw.db_ready_max_attempts,
            },
            superuser,
        })
    }
}

/// The three superuser keys are all-or-nothing. A key set to an empty or
/// blank value counts as unset.
fn superuser_settings(
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    hash_cost: u32,
) -> Result<Option<SuperuserSettings>, BootError> {
    let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    let username = present(username);
    let email = present(email);
    let password = present(password);

    let (username, email, password) = match (username, email, password) {
        (None, None, None) => return Ok(None),
        (Some(u), Some(e), Some(p)) => (u, e, p),
        (u, e, p) => {
            let missing: Vec<&str> = [
                ("SUPERUSER_USERNAME", u.is_none()),
                ("SUPERUSER_EMAIL", e.is_none()),
                ("SUPERUSER_PASSWORD", p.is_none()),
            ]
            .into_iter()
            .filter_map(|(key, absent)| absent.then_some(key))
            .collect();
            return Err(BootError::Config(format!(
                "incomplete superuser settings, missing {}",
                missing.join(", ")
            )));
        }
    };

    let username = username.trim().to_string();
    if username.is_empty() || username.chars().any(char::is_whitespace) {
        return Err(BootError::Config(
            "SUPERUSER_USERNAME must be non-empty and contain no whitespace".to_string(),
        ));
    }

    let email = email.trim().to_string();
    if !is_plausible_email(&email) {
        return Err(BootError::Config(format!(
            "SUPERUSER_EMAIL is not a valid address: {email:?}"
        )));
    }

    if !(4..=31).contains(&hash_cost) {
        return Err(BootError::Config(format!(
            "PASSWORD_HASH_COST must be between 4 and 31, got {hash_cost}"
        )));
    }

    Ok(Some(SuperuserSettings {
        username,
        email,
        password,
        hash_cost,
    }))
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
