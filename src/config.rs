use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Placeholder values shipped in the defaults. Startup warns while any of
/// them is still in effect.
pub const DEFAULT_SESSION_SECRET: &str = "chemsolve-default-session-secret-please-change";
pub const DEFAULT_ADMIN_PASSWORD: &str = "chemsolve-admin-please-change";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub upstream: UpstreamConfig,

    pub security: SecurityConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// JSON file holding the registered users.
    pub users_path: String,

    pub log_level: String,

    /// "pretty" or "json"
    pub log_format: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            users_path: "data/users.json".to_string(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    /// Directory with the HTML pages, scripts and styles.
    pub public_dir: String,

    pub cors_allowed_origins: Vec<String>,

    /// Whether to set the Secure flag on session cookies.
    /// Off by default so plain-HTTP local setups keep working.
    pub secure_cookies: bool,

    /// Sessions expire after this many minutes without a request.
    pub session_ttl_minutes: i64,

    /// Secret the session cookie signing key is derived from.
    pub session_secret: String,

    /// Maximum accepted request body. Images arrive base64-encoded inside JSON.
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            public_dir: "public".to_string(),
            cors_allowed_origins: vec![
                "http://localhost:8080".to_string(),
                "http://127.0.0.1:8080".to_string(),
            ],
            secure_cookies: false,
            session_ttl_minutes: 24 * 60,
            session_secret: DEFAULT_SESSION_SECRET.to_string(),
            body_limit_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,

    pub model: String,

    #[serde(skip_serializing)]
    pub api_key: String,

    /// Ask the model to ground its answer with web search.
    pub search_grounding: bool,

    /// Request timeout. Unset means the call waits until upstream answers
    /// or the connection fails.
    pub timeout_seconds: Option<u64>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key: String::new(),
            search_grounding: true,
            timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Username of the built-in administrator. Never stored in the users file.
    pub admin_username: String,

    #[serde(skip_serializing)]
    pub admin_password: String,

    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            admin_username: "admin".to_string(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Config {
    /// Loads the first config file found, then applies environment overrides.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                config = Self::load_from_path(path)?;
                break;
            }
        }

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Environment variables win over the file. `lookup` is injected so tests
    /// don't have to touch the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup("SESSION_SECRET") {
            self.server.session_secret = secret;
        }
        if let Some(key) = lookup("GEMINI_API_KEY") {
            self.upstream.api_key = key;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT value: {port}"))?;
        }
        if let Some(path) = lookup("USERS_PATH") {
            self.general.users_path = path;
        }
        if let Some(username) = lookup("ADMIN_USERNAME") {
            self.security.admin_username = username;
        }
        if let Some(password) = lookup("ADMIN_PASSWORD") {
            self.security.admin_password = password;
        }
        Ok(())
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![Self::default_config_path()];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("chemsolve").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".chemsolve").join("config.toml"));
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
            Self::default().save_to_path(&path)?;
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.public_dir.trim().is_empty() {
            anyhow::bail!("server.public_dir cannot be empty");
        }

        if self.server.session_ttl_minutes <= 0 {
            anyhow::bail!("server.session_ttl_minutes must be > 0");
        }

        if self.security.admin_username.trim().is_empty() {
            anyhow::bail!("security.admin_username cannot be empty");
        }

        // An empty admin password would let an empty login form through.
        if self.security.admin_password.is_empty() {
            anyhow::bail!("security.admin_password cannot be empty");
        }

        argon2::Params::new(
            self.security.argon2_memory_cost_kib,
            self.security.argon2_time_cost,
            self.security.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;

        url::Url::parse(&self.upstream.base_url).context("Invalid upstream.base_url")?;

        Ok(())
    }

    /// Names of settings still at their shipped placeholder value.
    #[must_use]
    pub fn insecure_defaults(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.server.session_secret == DEFAULT_SESSION_SECRET {
            names.push("SESSION_SECRET");
        }
        if self.security.admin_password == DEFAULT_ADMIN_PASSWORD {
            names.push("ADMIN_PASSWORD");
        }
        if self.upstream.api_key.is_empty() {
            names.push("GEMINI_API_KEY");
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.session_ttl_minutes, 1440);
        assert_eq!(config.server.body_limit_bytes, 10 * 1024 * 1024);
        assert_eq!(config.general.users_path, "data/users.json");
        assert_eq!(config.security.admin_username, "admin");
        assert!(config.upstream.search_grounding);
        assert!(config.upstream.timeout_seconds.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization_hides_secrets() {
        let mut config = Config::default();
        config.upstream.api_key = "super-secret-key".to_string();
        config.security.admin_password = "hunter2".to_string();

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[upstream]"));
        assert!(!toml_str.contains("super-secret-key"));
        assert!(!toml_str.contains("hunter2"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [server]
            port = 3000
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.upstream.model, "gemini-1.5-flash");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("SESSION_SECRET", "s3cret"),
            ("GEMINI_API_KEY", "key-123"),
            ("PORT", "9090"),
            ("ADMIN_PASSWORD", "root-pw"),
        ]);

        let mut config = Config::default();
        config
            .apply_env_overrides(|k| env.get(k).map(ToString::to_string))
            .unwrap();

        assert_eq!(config.server.session_secret, "s3cret");
        assert_eq!(config.upstream.api_key, "key-123");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.security.admin_password, "root-pw");
        assert!(config.insecure_defaults().is_empty());
    }

    #[test]
    fn test_invalid_port_override_is_rejected() {
        let mut config = Config::default();
        let result = config.apply_env_overrides(|k| (k == "PORT").then(|| "eighty".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.server.session_ttl_minutes = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.security.argon2_parallelism = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.security.admin_password = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_insecure_defaults_reported() {
        let names = Config::default().insecure_defaults();
        assert_eq!(names, vec!["SESSION_SECRET", "ADMIN_PASSWORD", "GEMINI_API_KEY"]);
    }
}
