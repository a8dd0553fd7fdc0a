// upload-cli/src/config.rs
use anyhow::{anyhow, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use upload_client::{Cookie, Credentials, SessionConfig};

#[derive(Debug, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Base URL that upload paths are appended to
    #[serde(default)]
    pub bootstrap_url: Option<String>,
    #[serde(default)]
    pub verbose: bool,
    /// Request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub cookie: Option<CookieConfig>,
    #[serde(default)]
    pub auth: Option<AuthConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CookieConfig {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AuthConfig {
    pub login: String,
    #[serde(default)]
    pub password: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_dir()?.join("config.toml");
        Self::load_from(&config_path)
    }

    /// Load from `path`, writing a default file there if none exists
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            let default = Self::default();
            default.save_to(path)?;
            default
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;

        // Set permissions to 600 (owner read/write only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Allow the endpoint and credentials to be overridden by environment variables
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("FUPLOAD_BOOTSTRAP_URL") {
            self.bootstrap_url = Some(url);
        }

        if let Some(login) = var("FUPLOAD_LOGIN") {
            let password = self
                .auth
                .take()
                .map(|auth| auth.password)
                .unwrap_or_default();
            self.auth = Some(AuthConfig { login, password });
        }

        if let Some(password) = var("FUPLOAD_PASSWORD") {
            if let Some(auth) = self.auth.as_mut() {
                auth.password = password;
            }
        }
    }

    fn config_dir() -> Result<PathBuf> {
        let base_dirs =
            BaseDirs::new().ok_or_else(|| anyhow!("Cannot determine config directory"))?;
        Ok(base_dirs.config_dir().join("fupload"))
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            bootstrap_url: self.bootstrap_url.clone(),
            cookie: self
                .cookie
                .as_ref()
                .map(|c| Cookie::new(c.name.clone(), c.value.clone())),
            auth: self
                .auth
                .as_ref()
                .map(|a| Credentials::new(a.login.clone(), a.password.clone())),
            verbose: self.verbose,
        }
    }
}
