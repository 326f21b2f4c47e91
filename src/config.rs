use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Env var consulted before `security.session_secret`.
pub const SECRET_ENV_VAR: &str = "SECRET_KEY";

/// Development-only signing secret. Accepted only with `allow_insecure_secret`.
const INSECURE_FALLBACK_SECRET: &str = "fallbacksecret";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub uploads: UploadConfig,

    pub export: ExportConfig,

    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    pub log_format: LogFormat,

    /// 0 keeps the tokio default (one worker per core).
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:database.db".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            worker_threads: 0,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,

    /// Whether to set the Secure flag on session cookies.
    /// Set to false for local development without HTTPS.
    pub secure_cookies: bool,

    pub session_inactivity_minutes: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            secure_cookies: true,
            session_inactivity_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Public directory, served under `/static/uploads`.
    pub directory: String,

    /// Compared case-insensitively against the sanitized filename.
    pub allowed_extensions: Vec<String>,

    pub max_upload_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            directory: "static/uploads".to_string(),
            allowed_extensions: crate::constants::ALLOWED_IMAGE_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Single shared file, overwritten by every export.
    pub path: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            path: "items.xlsx".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// The one username that is granted the admin role when it registers.
    pub admin_username: String,

    /// Cookie signing secret. `SECRET_KEY` in the environment takes precedence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_secret: Option<String>,

    /// Accept the built-in development secret when no secret is configured.
    pub allow_insecure_secret: bool,

    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            admin_username: crate::constants::DEFAULT_ADMIN_USERNAME.to_string(),
            session_secret: None,
            allow_insecure_secret: false,
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

/// Where the effective signing secret came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    Environment,
    ConfigFile,
    InsecureFallback,
}

impl SecurityConfig {
    /// Resolves the session signing secret: env, then config, then the
    /// development fallback if explicitly allowed.
    pub fn resolve_session_secret(&self) -> Result<(String, SecretSource)> {
        let from_env = std::env::var(SECRET_ENV_VAR)
            .ok()
            .filter(|value| !value.trim().is_empty());
        self.resolve_session_secret_with(from_env)
    }

    fn resolve_session_secret_with(&self, from_env: Option<String>) -> Result<(String, SecretSource)> {
        if let Some(secret) = from_env {
            return Ok((secret, SecretSource::Environment));
        }

        if let Some(secret) = self
            .session_secret
            .as_ref()
            .filter(|value| !value.trim().is_empty())
        {
            return Ok((secret.clone(), SecretSource::ConfigFile));
        }

        if self.allow_insecure_secret {
            warn!(
                "No {SECRET_ENV_VAR} configured; signing sessions with the insecure development \
                 secret. Session cookies can be forged on this deployment."
            );
            return Ok((INSECURE_FALLBACK_SECRET.to_string(), SecretSource::InsecureFallback));
        }

        anyhow::bail!(
            "No session secret configured. Set {SECRET_ENV_VAR} or security.session_secret \
             (or security.allow_insecure_secret = true for local development)"
        )
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Loads `path` when given, otherwise searches the default locations.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("lostfound").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".lostfound").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("server.port must be > 0");
        }

        if self.server.session_inactivity_minutes <= 0 {
            anyhow::bail!("server.session_inactivity_minutes must be > 0");
        }

        if self.uploads.directory.trim().is_empty() {
            anyhow::bail!("uploads.directory cannot be empty");
        }

        if self.uploads.allowed_extensions.is_empty() {
            anyhow::bail!("uploads.allowed_extensions must list at least one extension");
        }

        if self.export.path.trim().is_empty() {
            anyhow::bail!("export.path cannot be empty");
        }

        if self.security.admin_username.trim().is_empty() {
            anyhow::bail!("security.admin_username cannot be empty");
        }

        Ok(())
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
