//! Configuration file handling
//!
//! Settings come from `config.toml` in the platform config directory (or an
//! explicit `--config` path) and can be overridden from the environment.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::config_path;
use super::{Error, Result};

/// Environment variable overriding `service.base_url`
pub const ENV_BASE_URL: &str = "PETFRIENDS_BASE_URL";
/// Environment variable overriding `credentials.valid_email`
pub const ENV_EMAIL: &str = "PETFRIENDS_EMAIL";
/// Environment variable overriding `credentials.valid_password`
pub const ENV_PASSWORD: &str = "PETFRIENDS_PASSWORD";

/// Template written by `petfriends config --init`
pub const CONFIG_TEMPLATE: &str = r#"[service]
base_url = "https://petfriends.skillfactory.ru/"
# timeout_secs = 30

[credentials]
valid_email = ""
valid_password = ""
# invalid_email = "nobody@example.invalid"
# invalid_password = "definitely-not-the-password"

[fixtures]
dir = "images"
"#;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Remote service settings
    #[serde(default)]
    pub service: ServiceConfig,

    /// Valid and deliberately invalid credentials
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Where scenario photos are looked up
    #[serde(default)]
    pub fixtures: FixturesConfig,
}

/// Remote service settings
#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    /// Base URL every endpoint path is joined onto
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout; the HTTP client's default applies when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn default_base_url() -> String {
    "https://petfriends.skillfactory.ru/".to_string()
}

/// Credential settings
#[derive(Debug, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub valid_email: Option<String>,

    #[serde(default)]
    pub valid_password: Option<String>,

    /// An email address the service has never registered
    #[serde(default = "default_invalid_email")]
    pub invalid_email: String,

    /// A password that does not belong to `valid_email`
    #[serde(default = "default_invalid_password")]
    pub invalid_password: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            valid_email: None,
            valid_password: None,
            invalid_email: default_invalid_email(),
            invalid_password: default_invalid_password(),
        }
    }
}

fn default_invalid_email() -> String {
    "nobody@example.invalid".to_string()
}

fn default_invalid_password() -> String {
    "definitely-not-the-password".to_string()
}

/// Fixture settings
#[derive(Debug, Deserialize)]
pub struct FixturesConfig {
    /// Directory relative photo names are resolved against
    #[serde(default = "default_fixtures_dir")]
    pub dir: PathBuf,
}

impl Default for FixturesConfig {
    fn default() -> Self {
        Self {
            dir: default_fixtures_dir(),
        }
    }
}

fn default_fixtures_dir() -> PathBuf {
    PathBuf::from("images")
}

/// The credential sets a scenario can authenticate with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub valid_email: String,
    pub valid_password: String,
    pub invalid_email: String,
    pub invalid_password: String,
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit path, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Apply `PETFRIENDS_*` environment overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup; empty values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(url) = lookup(ENV_BASE_URL) {
            self.service.base_url = url;
        }
        if let Some(email) = lookup(ENV_EMAIL) {
            self.credentials.valid_email = Some(email);
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.credentials.valid_password = Some(password);
        }
    }

    /// Resolve the credential sets
    ///
    /// Fails when the valid email or password is not configured.
    pub fn credentials(&self) -> Result<Credentials> {
        let creds = &self.credentials;
        let valid_email = creds
            .valid_email
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "credentials.valid_email is not set (config file or {})",
                    ENV_EMAIL
                ))
            })?;
        let valid_password = creds
            .valid_password
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "credentials.valid_password is not set (config file or {})",
                    ENV_PASSWORD
                ))
            })?;

        Ok(Credentials {
            valid_email,
            valid_password,
            invalid_email: creds.invalid_email.clone(),
            invalid_password: creds.invalid_password.clone(),
        })
    }
}
