use crate::defaults;
use crate::error::SmartSpeakError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub stt: SttConfig,
    pub sentiment: SentimentConfig,
    pub storage: StorageConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Allowed browser origins; empty allows any origin.
    pub cors_origins: Vec<String>,
    /// Upper bound for one analysis, e.g. "120s" or "2m".
    pub request_timeout: String,
    pub max_upload_bytes: usize,
    /// Directory for per-request temporary files.
    pub temp_dir: Option<PathBuf>,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    pub model: String,
    pub beam_size: u32,
    pub threads: Option<usize>,
    /// Download the model at startup when it is not installed.
    pub auto_download: bool,
}

/// Sentiment scorer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SentimentConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub api_token: Option<String>,
    pub timeout: String,
}

/// Blob storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub folder: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: defaults::BIND_ADDRESS.to_string(),
            cors_origins: Vec::new(),
            request_timeout: defaults::REQUEST_TIMEOUT.to_string(),
            max_upload_bytes: defaults::MAX_UPLOAD_BYTES,
            temp_dir: None,
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_MODEL.to_string(),
            beam_size: defaults::BEAM_SIZE,
            threads: None,
            auto_download: true,
        }
    }
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: defaults::SENTIMENT_ENDPOINT.to_string(),
            api_token: None,
            timeout: defaults::SENTIMENT_TIMEOUT.to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cloud_name: None,
            api_key: None,
            api_secret: None,
            folder: defaults::UPLOAD_FOLDER.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> anyhow::Result<Duration> {
        parse_duration("server.request_timeout", &self.request_timeout)
    }
}

impl SentimentConfig {
    pub fn timeout(&self) -> anyhow::Result<Duration> {
        parse_duration("sentiment.timeout", &self.timeout)
    }
}

impl StorageConfig {
    /// Cloudinary credentials, when all three are set.
    pub fn credentials(&self) -> Option<crate::storage::CloudinaryConfig> {
        let credentials = crate::storage::CloudinaryConfig {
            cloud_name: self.cloud_name.clone()?,
            api_key: self.api_key.clone()?,
            api_secret: self.api_secret.clone()?,
        };
        credentials.is_complete().then_some(credentials)
    }
}

fn parse_duration(key: &str, value: &str) -> anyhow::Result<Duration> {
    humantime::parse_duration(value).map_err(|e| {
        SmartSpeakError::ConfigInvalidValue {
            key: key.to_string(),
            message: format!("'{value}': {e}"),
        }
        .into()
    })
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SmartSpeakError::ConfigFileNotFound {
                path: path.display().to_string(),
            },
            _ => SmartSpeakError::Io(e),
        })?;
        let config: Config = toml::from_str(&contents).map_err(SmartSpeakError::from)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e)
                if matches!(
                    e.downcast_ref::<SmartSpeakError>(),
                    Some(SmartSpeakError::ConfigFileNotFound { .. })
                ) =>
            {
                Ok(Self::default())
            }
            Err(e) => Err(e.context(format!("Failed to load config from {}", path.display()))),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - SMARTSPEAK_BIND → server.bind
    /// - SMARTSPEAK_MODEL → stt.model
    /// - SMARTSPEAK_SENTIMENT_URL → sentiment.endpoint
    /// - HF_TOKEN → sentiment.api_token
    /// - CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY, CLOUDINARY_API_SECRET → storage
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(bind) = non_empty_env("SMARTSPEAK_BIND") {
            self.server.bind = bind;
        }
        if let Some(model) = non_empty_env("SMARTSPEAK_MODEL") {
            self.stt.model = model;
        }
        if let Some(endpoint) = non_empty_env("SMARTSPEAK_SENTIMENT_URL") {
            self.sentiment.endpoint = endpoint;
        }
        if let Some(token) = non_empty_env("HF_TOKEN") {
            self.sentiment.api_token = Some(token);
        }
        if let Some(cloud_name) = non_empty_env("CLOUDINARY_CLOUD_NAME") {
            self.storage.cloud_name = Some(cloud_name);
        }
        if let Some(api_key) = non_empty_env("CLOUDINARY_API_KEY") {
            self.storage.api_key = Some(api_key);
        }
        if let Some(api_secret) = non_empty_env("CLOUDINARY_API_SECRET") {
            self.storage.api_secret = Some(api_secret);
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/smartspeak/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("smartspeak")
            .join("config.toml")
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to serialize tests that modify environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_KEYS: &[&str] = &[
        "SMARTSPEAK_BIND",
        "SMARTSPEAK_MODEL",
        "SMARTSPEAK_SENTIMENT_URL",
        "HF_TOKEN",
        "CLOUDINARY_CLOUD_NAME",
        "CLOUDINARY_API_KEY",
        "CLOUDINARY_API_SECRET",
    ];

    // SAFETY: These helpers are only used in tests with ENV_LOCK held,
    // ensuring no concurrent access to environment variables.
    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn clear_smartspeak_env() {
        for key in ENV_KEYS {
            unsafe { std::env::remove_var(key) }
        }
    }

    fn write_config(contents: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        temp_file
    }

    #[test]
    fn test_default_config_has_correct_values() {
        let config = Config::default();

        assert_eq!(config.server.bind, "0.0.0.0:5000");
        assert!(config.server.cors_origins.is_empty());
        assert_eq!(config.server.request_timeout().unwrap(), Duration::from_secs(120));
        assert_eq!(config.server.max_upload_bytes, 25 * 1024 * 1024);
        assert_eq!(config.server.temp_dir, None);

        assert_eq!(config.stt.model, "small");
        assert_eq!(config.stt.beam_size, 5);
        assert_eq!(config.stt.threads, None);
        assert!(config.stt.auto_download);

        assert!(config.sentiment.enabled);
        assert!(config.sentiment.endpoint.contains("sst-2"));
        assert_eq!(config.sentiment.api_token, None);

        assert_eq!(config.storage.folder, "smart-speak");
        assert!(config.storage.credentials().is_none());
    }

    #[test]
    fn test_load_from_toml_file() {
        let temp_file = write_config(
            r#"
            [server]
            bind = "127.0.0.1:8080"
            cors_origins = ["http://localhost:3000"]
            request_timeout = "2m"
            max_upload_bytes = 1048576
            temp_dir = "/var/tmp/smartspeak"

            [stt]
            model = "base.en"
            beam_size = 3
            threads = 4
            auto_download = false

            [sentiment]
            enabled = false
            endpoint = "http://localhost:9000/classify"
            api_token = "hf_abc"
            timeout = "5s"

            [storage]
            cloud_name = "demo"
            api_key = "key"
            api_secret = "secret"
            folder = "clips"
        "#,
        );

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.server.cors_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.server.request_timeout().unwrap(), Duration::from_secs(120));
        assert_eq!(config.server.max_upload_bytes, 1048576);
        assert_eq!(config.server.temp_dir, Some(PathBuf::from("/var/tmp/smartspeak")));

        assert_eq!(config.stt.model, "base.en");
        assert_eq!(config.stt.beam_size, 3);
        assert_eq!(config.stt.threads, Some(4));
        assert!(!config.stt.auto_download);

        assert!(!config.sentiment.enabled);
        assert_eq!(config.sentiment.endpoint, "http://localhost:9000/classify");
        assert_eq!(config.sentiment.api_token.as_deref(), Some("hf_abc"));
        assert_eq!(config.sentiment.timeout().unwrap(), Duration::from_secs(5));

        let credentials = config.storage.credentials().unwrap();
        assert_eq!(credentials.cloud_name, "demo");
        assert_eq!(credentials.api_key, "key");
        assert_eq!(credentials.api_secret, "secret");
        assert_eq!(config.storage.folder, "clips");
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let temp_file = write_config(
            r#"
            [stt]
            model = "tiny.en"
        "#,
        );

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.stt.model, "tiny.en");
        assert_eq!(config.stt.beam_size, 5);
        assert_eq!(config.server, ServerConfig::default());
        assert_eq!(config.sentiment, SentimentConfig::default());
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn test_invalid_duration_is_reported_with_key() {
        let config = ServerConfig {
            request_timeout: "soon".to_string(),
            ..Default::default()
        };
        let err = config.request_timeout().unwrap_err().to_string();
        assert!(err.contains("server.request_timeout"), "{}", err);
    }

    #[test]
    fn test_partial_credentials_are_ignored() {
        let storage = StorageConfig {
            cloud_name: Some("demo".to_string()),
            api_key: Some("key".to_string()),
            ..Default::default()
        };
        assert!(storage.credentials().is_none());
    }

    #[test]
    fn test_env_override_model() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_smartspeak_env();

        set_env("SMARTSPEAK_MODEL", "tiny.en");
        let config = Config::default().with_env_overrides();

        assert_eq!(config.stt.model, "tiny.en");
        assert_eq!(config.server.bind, "0.0.0.0:5000"); // Not overridden

        clear_smartspeak_env();
    }

    #[test]
    fn test_env_override_all() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_smartspeak_env();

        set_env("SMARTSPEAK_BIND", "127.0.0.1:5001");
        set_env("SMARTSPEAK_MODEL", "medium.en");
        set_env("SMARTSPEAK_SENTIMENT_URL", "http://localhost:9000");
        set_env("HF_TOKEN", "hf_token");
        set_env("CLOUDINARY_CLOUD_NAME", "demo");
        set_env("CLOUDINARY_API_KEY", "key");
        set_env("CLOUDINARY_API_SECRET", "secret");

        let config = Config::default().with_env_overrides();

        assert_eq!(config.server.bind, "127.0.0.1:5001");
        assert_eq!(config.stt.model, "medium.en");
        assert_eq!(config.sentiment.endpoint, "http://localhost:9000");
        assert_eq!(config.sentiment.api_token.as_deref(), Some("hf_token"));
        assert!(config.storage.credentials().is_some());

        clear_smartspeak_env();
    }

    #[test]
    fn test_env_override_empty_string_ignored() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_smartspeak_env();

        set_env("SMARTSPEAK_MODEL", "");
        set_env("HF_TOKEN", "");
        let config = Config::default().with_env_overrides();

        assert_eq!(config.stt.model, "small");
        assert_eq!(config.sentiment.api_token, None);

        clear_smartspeak_env();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let temp_file = write_config(
            r#"
            [server
            bind = "broken
        "#,
        );

        let err = Config::load(temp_file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SmartSpeakError>(),
            Some(SmartSpeakError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file_is_config_file_not_found() {
        let missing_path = Path::new("/tmp/nonexistent_smartspeak_config_12345.toml");
        let err = Config::load(missing_path).unwrap_err();

        match err.downcast_ref::<SmartSpeakError>() {
            Some(SmartSpeakError::ConfigFileNotFound { path }) => {
                assert!(path.ends_with("nonexistent_smartspeak_config_12345.toml"));
            }
            other => panic!("Expected ConfigFileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_default_path_ends_with_app_dir() {
        let path = Config::default_path();
        let path_str = path.to_string_lossy();

        assert!(path_str.contains("smartspeak"));
        assert!(path_str.ends_with("config.toml"));
    }

    #[test]
    fn test_load_or_default_returns_default_for_missing_file() {
        let missing_path = Path::new("/tmp/nonexistent_smartspeak_config_12345.toml");
        let config = Config::load_or_default(missing_path).unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_errors_on_invalid_toml() {
        let temp_file = write_config("[stt\nmodel = ");

        let err = Config::load_or_default(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed, config);
    }
}
