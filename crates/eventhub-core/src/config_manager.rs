use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to read config: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration for the Event Hub
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EventHubConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Profile prompt and organization search tuning
    #[serde(default)]
    pub workflow: WorkflowConfig,

    /// Seed data for the in-memory stores
    #[serde(default)]
    pub store: StoreConfig,

    /// Hosted model endpoint for generated content
    #[serde(default)]
    pub llm: LLMConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Quiet period after the last keystroke before searching (default: 200ms)
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Number of search results shown to the user (default: 5)
    #[serde(default = "default_search_result_cap")]
    pub search_result_cap: usize,

    /// Delay before the completion prompt appears (default: 500ms)
    #[serde(default = "default_prompt_reveal_delay_ms")]
    pub prompt_reveal_delay_ms: u64,

    /// Hours a "remind me later" suppresses the prompt (default: 24)
    #[serde(default = "default_reminder_window_hours")]
    pub reminder_window_hours: i64,

    /// Where client-persistent storage lives; in-memory when unset
    #[serde(default)]
    pub client_storage_path: Option<PathBuf>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: default_search_debounce_ms(),
            search_result_cap: default_search_result_cap(),
            prompt_reveal_delay_ms: default_prompt_reveal_delay_ms(),
            reminder_window_hours: default_reminder_window_hours(),
            client_storage_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// JSON document with users, students, organizations and events
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
}

/// LLM configuration for generated event copy and chatbot replies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    /// Disabled means the AI routes answer 503
    #[serde(default)]
    pub enabled: bool,

    /// OpenAI-compatible base URL (e.g. "https://api.openai.com/v1")
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Model identifier
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// API key sent as a bearer token
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_llm_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            api_key: None,
            timeout_secs: default_llm_timeout_secs(),
            max_retries: default_llm_max_retries(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: pretty, json, compact
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_search_debounce_ms() -> u64 {
    200
}
fn default_search_result_cap() -> usize {
    5
}
fn default_prompt_reveal_delay_ms() -> u64 {
    500
}
fn default_reminder_window_hours() -> i64 {
    24
}
fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_llm_timeout_secs() -> u64 {
    60
}
fn default_llm_max_retries() -> u32 {
    2
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> usize {
    1024
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

/// Configuration manager with layered loading
pub struct ConfigManager {
    config: EventHubConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with the following precedence:
    /// 1. Environment variables (.env file)
    /// 2. Config file (.eventhub.toml)
    /// 3. Sensible defaults
    pub fn load() -> Result<Self, ConfigError> {
        info!("Loading Event Hub configuration");

        Self::load_dotenv();

        let (config, config_path) = Self::load_config_file()?;
        let config = Self::apply_env_overrides(config);
        Self::validate_config(&config)?;

        match config_path {
            Some(ref path) => info!("Config file: {}", path.display()),
            None => info!("Config file: NONE (using defaults)"),
        }
        info!(
            debounce_ms = config.workflow.search_debounce_ms,
            result_cap = config.workflow.search_result_cap,
            llm_enabled = config.llm.enabled,
            "Configuration loaded"
        );

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Load an explicit file, still applying environment overrides
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let config = Self::apply_env_overrides(Self::read_toml_file(path)?);
        Self::validate_config(&config)?;
        Ok(Self {
            config,
            config_path: Some(path.to_path_buf()),
        })
    }

    /// Wrap an already-built configuration (tests, embedding)
    pub fn from_config(config: EventHubConfig) -> Result<Self, ConfigError> {
        Self::validate_config(&config)?;
        Ok(Self {
            config,
            config_path: None,
        })
    }

    fn load_dotenv() {
        if Path::new(".env").exists() {
            if let Err(e) = dotenv::from_filename(".env") {
                warn!("Failed to load .env file: {}", e);
            } else {
                info!("Loaded .env file from current directory");
            }
            return;
        }

        if let Some(home) = dirs::home_dir() {
            let home_env = home.join(".eventhub.env");
            if home_env.exists() {
                if let Err(e) = dotenv::from_path(&home_env) {
                    warn!("Failed to load .eventhub.env: {}", e);
                } else {
                    info!("Loaded .eventhub.env from home directory");
                }
            }
        }
    }

    /// Search order:
    /// 1. ./.eventhub.toml
    /// 2. ~/.eventhub/config.toml
    /// 3. defaults
    fn load_config_file() -> Result<(EventHubConfig, Option<PathBuf>), ConfigError> {
        let local_config = Path::new(".eventhub.toml");
        if local_config.exists() {
            let config = Self::read_toml_file(local_config)?;
            return Ok((config, Some(local_config.to_path_buf())));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".eventhub").join("config.toml");
            if user_config.exists() {
                let config = Self::read_toml_file(&user_config)?;
                return Ok((config, Some(user_config)));
            }
        }

        info!("No config file found, using defaults");
        Ok((EventHubConfig::default(), None))
    }

    fn read_toml_file(path: &Path) -> Result<EventHubConfig, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn apply_env_overrides(mut config: EventHubConfig) -> EventHubConfig {
        if let Ok(host) = std::env::var("EVENTHUB_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("EVENTHUB_PORT") {
            if let Ok(p) = port.parse() {
                config.server.port = p;
            }
        }

        if let Ok(debounce) = std::env::var("EVENTHUB_SEARCH_DEBOUNCE_MS") {
            if let Ok(ms) = debounce.parse() {
                config.workflow.search_debounce_ms = ms;
            }
        }
        if let Ok(cap) = std::env::var("EVENTHUB_SEARCH_RESULT_CAP") {
            if let Ok(n) = cap.parse() {
                config.workflow.search_result_cap = n;
            }
        }
        if let Ok(path) = std::env::var("EVENTHUB_CLIENT_STORAGE") {
            config.workflow.client_storage_path = Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var("EVENTHUB_SEED_PATH") {
            config.store.seed_path = Some(PathBuf::from(path));
        }

        if let Ok(url) = std::env::var("EVENTHUB_LLM_BASE_URL") {
            config.llm.base_url = url;
        }
        if let Ok(model) = std::env::var("EVENTHUB_LLM_MODEL") {
            config.llm.model = model;
            config.llm.enabled = true; // Enable if model specified
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            config.llm.api_key = Some(key);
        }
        if let Ok(enabled) = std::env::var("EVENTHUB_LLM_ENABLED") {
            config.llm.enabled = enabled.to_lowercase() == "true" || enabled == "1";
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            // Only plain levels map onto the config; directive lists stay in RUST_LOG.
            if is_plain_level(&level) {
                config.logging.level = level;
            }
        }

        config
    }

    fn validate_config(config: &EventHubConfig) -> Result<(), ConfigError> {
        if config.workflow.search_result_cap == 0 {
            return Err(ConfigError::ValidationError(
                "workflow.search_result_cap must be at least 1".to_string(),
            ));
        }
        if config.workflow.reminder_window_hours <= 0 {
            return Err(ConfigError::ValidationError(
                "workflow.reminder_window_hours must be positive".to_string(),
            ));
        }

        if config.llm.enabled && config.llm.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "llm.base_url is required when llm.enabled = true".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&config.llm.temperature) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid llm.temperature: {}. Must be between 0.0 and 2.0",
                config.llm.temperature
            )));
        }

        if !is_plain_level(&config.logging.level) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                config.logging.level
            )));
        }
        match config.logging.format.as_str() {
            "pretty" | "json" | "compact" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: {}. Must be one of: pretty, json, compact",
                    other
                )))
            }
        }

        Ok(())
    }

    pub fn config(&self) -> &EventHubConfig {
        &self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Create a default config file
    pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        let config = EventHubConfig::default();
        let toml_str =
            toml::to_string_pretty(&config).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::ReadError(e.to_string()))?;
        }

        std::fs::write(path, toml_str).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        Ok(())
    }
}

fn is_plain_level(level: &str) -> bool {
    matches!(level, "trace" | "debug" | "info" | "warn" | "error")
}
