use askdb_agents::{GenerationLimits, LoopConfig};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const CONFIG_PATH_ENV: &str = "ASKDB_CONFIG";
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ApiConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    pub api_keys: Option<ApiKeysConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database used when a request sets `use_default_db`
    pub default_path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            default_path: PathBuf::from("data/demo.db"),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_iterations: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let loop_config = LoopConfig::default();
        Self {
            provider: askdb_llm_sdk::providers::ANTHROPIC.to_string(),
            model: None,
            max_tokens: loop_config.limits.max_tokens,
            temperature: loop_config.limits.temperature,
            max_iterations: loop_config.max_iterations,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolTransport {
    #[default]
    Local,
    Stdio,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct ToolsConfig {
    pub transport: ToolTransport,
    /// Path to the askdb-tool-server binary, used by the stdio transport
    pub server_command: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ApiKeysConfig {
    pub anthropic_api_key: Option<String>,
}

impl ApiConfig {
    /// Load the config file (writing a commented default on first run) and
    /// apply `ASKDB__SECTION__KEY` environment overrides.
    pub fn load() -> Result<(Self, PathBuf), ConfigError> {
        let config_path = get_config_path();

        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ConfigError::Message(format!("Failed to create config directory: {e}"))
                })?;
            }
        }

        if !config_path.exists() {
            std::fs::write(&config_path, DEFAULT_CONFIG).map_err(|e| {
                ConfigError::Message(format!("Failed to write default config: {e}"))
            })?;
        }

        let config = Self::from_file(&config_path)?;
        Ok((config, config_path))
    }

    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()))
            .add_source(
                Environment::with_prefix("ASKDB")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Anthropic key from the config file, falling back to `ANTHROPIC_API_KEY`
    pub fn anthropic_api_key(&self) -> Option<String> {
        self.api_keys
            .as_ref()
            .and_then(|keys| keys.anthropic_api_key.clone())
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                std::env::var(API_KEY_ENV)
                    .ok()
                    .filter(|key| !key.trim().is_empty())
            })
    }

    pub fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            max_iterations: self.llm.max_iterations,
            limits: GenerationLimits {
                max_tokens: self.llm.max_tokens,
                temperature: self.llm.temperature,
            },
        }
    }

    pub fn default_db_path(&self) -> String {
        self.database.default_path.to_string_lossy().into_owned()
    }
}

const DEFAULT_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 8000

[database]
default_path = "data/demo.db"

[llm]
provider = "anthropic"
# model = "Claude 3 Haiku"
max_tokens = 4096
temperature = 0.7
max_iterations = 5

[tools]
transport = "local"  # Options: local, stdio
# server_command = "/usr/local/bin/askdb-tool-server"

[api_keys]
# anthropic_api_key = "your-anthropic-key"
"#;

fn get_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("askdb/api.toml")
    } else {
        PathBuf::from("api.toml")
    }
}
