use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    /// Language model used for schedules, summaries and reports.
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub push: PushConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// Public origin of the participant app, used for deep links and report URLs.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

/// Which store implementation backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn pool_config(&self) -> persistence::db::DatabaseConfig {
        persistence::db::DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout_secs: self.connect_timeout_secs,
            idle_timeout_secs: self.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Password checks allowed per event code per minute. 0 disables the limiter.
    #[serde(default = "default_password_attempts")]
    pub password_attempts_per_minute: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            password_attempts_per_minute: default_password_attempts(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    /// Empty means no model is configured and the placeholder generator is used.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    #[serde(default = "default_openai_model")]
    pub model: String,

    #[serde(default = "default_transcription_model")]
    pub transcription_model: String,

    #[serde(default = "default_openai_timeout_ms")]
    pub timeout_ms: u64,

    /// Brochure text beyond this many characters is not sent to the model.
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

impl OpenAiConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_openai_base_url(),
            model: default_openai_model(),
            transcription_model: default_transcription_model(),
            timeout_ms: default_openai_timeout_ms(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

/// Web Push configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    #[serde(default)]
    pub enabled: bool,

    /// VAPID private key: PEM text, or a path to a PEM file.
    #[serde(default)]
    pub vapid_private_key: String,

    /// VAPID `sub` claim, a `mailto:` or `https:` URI.
    #[serde(default = "default_push_subject")]
    pub subject: String,

    #[serde(default = "default_push_icon")]
    pub icon: String,

    #[serde(default = "default_push_icon")]
    pub badge: String,

    #[serde(default = "default_push_ttl")]
    pub ttl_secs: u32,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            vapid_private_key: String::new(),
            subject: default_push_subject(),
            icon: default_push_icon(),
            badge: default_push_icon(),
            ttl_secs: default_push_ttl(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    #[serde(default = "default_window_secs")]
    pub window_secs: i64,

    /// Bearer token required by the cron endpoint when set.
    #[serde(default)]
    pub cron_secret: Option<String>,
}

impl DispatchConfig {
    pub fn cron_secret(&self) -> Option<&str> {
        self.cron_secret
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            cron_secret: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// Directory uploaded audio and photos are written to, served at `/media`.
    #[serde(default = "default_media_dir")]
    pub dir: String,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            dir: default_media_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    60
}
fn default_max_body_size() -> usize {
    26_214_400
}
fn default_public_base_url() -> String {
    "http://localhost:8080".to_string()
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_password_attempts() -> u32 {
    10
}
fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_transcription_model() -> String {
    "whisper-1".to_string()
}
fn default_openai_timeout_ms() -> u64 {
    60_000
}
fn default_max_input_chars() -> usize {
    200_000
}
fn default_push_subject() -> String {
    "mailto:admin@example.com".to_string()
}
fn default_push_icon() -> String {
    "/icon-192x192.png".to_string()
}
fn default_push_ttl() -> u32 {
    3600
}
fn default_window_secs() -> i64 {
    domain::services::dispatch::DEFAULT_WINDOW_SECS
}
fn default_media_dir() -> String {
    "data/media".to_string()
}
fn default_max_upload_bytes() -> usize {
    10_485_760
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with XL__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("XL")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("security.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for tests with custom overrides.
    ///
    /// Defaults are embedded so no config files are read. The in-memory store
    /// is selected unless overridden.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "127.0.0.1"
            port = 8080
            request_timeout_secs = 30
            max_body_size = 26214400
            public_base_url = "http://localhost:3000"

            [storage]
            backend = "memory"

            [database]
            url = ""
            max_connections = 5
            min_connections = 1
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "debug"
            format = "pretty"

            [security]
            cors_origins = []
            password_attempts_per_minute = 0

            [dispatch]
            window_secs = 120

            [media]
            dir = "data/media-test"
            max_upload_bytes = 1048576
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        Ok(cfg)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.storage.backend == StorageBackend::Postgres && self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "XL__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.dispatch.window_secs <= 0 {
            return Err(ConfigValidationError::InvalidValue(
                "dispatch.window_secs must be positive".to_string(),
            ));
        }

        if self.push.enabled && self.push.vapid_private_key.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "push.vapid_private_key is required when push is enabled".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_load_with_defaults() {
        let config = Config::load_for_test(&[]).expect("Failed to load config");

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.dispatch.window_secs, 120);
        assert_eq!(config.openai.max_input_chars, 200_000);
        assert!(!config.openai.is_configured());
        assert!(!config.push.enabled);
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::load_for_test(&[
            ("server.port", "9000"),
            ("logging.level", "warn"),
            ("openai.api_key", "sk-test"),
            ("dispatch.cron_secret", "s3cret"),
        ])
        .expect("Failed to load config");

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.logging.level, "warn");
        assert!(config.openai.is_configured());
        assert_eq!(config.dispatch.cron_secret(), Some("s3cret"));
    }

    #[test]
    fn test_blank_cron_secret_is_ignored() {
        let config = Config::load_for_test(&[("dispatch.cron_secret", "  ")]).unwrap();
        assert_eq!(config.dispatch.cron_secret(), None);
    }

    #[test]
    fn test_memory_backend_needs_no_database_url() {
        let config = Config::load_for_test(&[]).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_postgres_backend_requires_database_url() {
        let config = Config::load_for_test(&[("storage.backend", "postgres")]).unwrap();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("XL__DATABASE__URL"));
    }

    #[test]
    fn test_validation_invalid_pool_settings() {
        let config = Config::load_for_test(&[
            ("database.min_connections", "100"),
            ("database.max_connections", "10"),
        ])
        .unwrap();

        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("min_connections"));
    }

    #[test]
    fn test_validation_rejects_non_positive_window() {
        let config = Config::load_for_test(&[("dispatch.window_secs", "0")]).unwrap();
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("window_secs"));
    }

    #[test]
    fn test_push_requires_vapid_key() {
        let config = Config::load_for_test(&[("push.enabled", "true")]).unwrap();
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("vapid_private_key"));
    }

    #[test]
    fn test_socket_addr() {
        let config = Config::load_for_test(&[("server.port", "3000")]).unwrap();
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_pool_config_copies_settings() {
        let config = Config::load_for_test(&[("database.url", "postgres://x@localhost/xl")])
            .unwrap();
        let pool = config.database.pool_config();
        assert_eq!(pool.url, "postgres://x@localhost/xl");
        assert_eq!(pool.max_connections, 5);
        assert_eq!(pool.min_connections, 1);
    }
}
