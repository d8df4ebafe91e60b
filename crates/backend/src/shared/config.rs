use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid {name}: {reason}")]
    Invalid { name: String, reason: String },
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub bridge: BridgeConfig,
    pub logs: LogsConfig,
    #[serde(default)]
    pub classification: ClassificationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Which bridge deployment the dashboard talks to.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BridgeContext {
    #[default]
    Normal,
    /// First-run setup: the bridge exposes its API on a separate port.
    Setup,
}

impl std::str::FromStr for BridgeContext {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" | "" => Ok(BridgeContext::Normal),
            "setup" => Ok(BridgeContext::Setup),
            other => Err(ConfigError::Invalid {
                name: "SEERRBRIDGE_CONTEXT".into(),
                reason: format!("expected 'normal' or 'setup', got '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BridgeConfig {
    pub base_url: String,
    pub setup_base_url: String,
    #[serde(default)]
    pub context: BridgeContext,
    pub timeout_secs: u64,
    pub status_path: String,
    pub stale_after_secs: i64,
}

impl BridgeConfig {
    /// Base URL for the active deployment context, without a trailing slash.
    pub fn active_base_url(&self) -> &str {
        let url = match self.context {
            BridgeContext::Normal => &self.base_url,
            BridgeContext::Setup => &self.setup_base_url,
        };
        url.trim_end_matches('/')
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogsConfig {
    /// How many of the newest rows the statistics are computed over.
    pub statistics_window: u64,
    pub recent_sample_cap: usize,
    pub recent_logs_limit: u64,
    pub default_page_size: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClassificationConfig {
    #[serde(default = "default_episode_keywords")]
    pub episode_keywords: Vec<String>,
    #[serde(default = "default_grab_keywords")]
    pub grab_keywords: Vec<String>,
    #[serde(default = "default_token_keywords")]
    pub token_keywords: Vec<String>,
    #[serde(default = "default_token_expired_keywords")]
    pub token_expired_keywords: Vec<String>,
    #[serde(default = "default_token_refresh_keywords")]
    pub token_refresh_keywords: Vec<String>,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            episode_keywords: default_episode_keywords(),
            grab_keywords: default_grab_keywords(),
            token_keywords: default_token_keywords(),
            token_expired_keywords: default_token_expired_keywords(),
            token_refresh_keywords: default_token_refresh_keywords(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_episode_keywords() -> Vec<String> {
    strings(&["episode", "season"])
}

fn default_grab_keywords() -> Vec<String> {
    strings(&[
        "grabbed",
        "torrent added",
        "added to real-debrid",
        "successfully added",
    ])
}

fn default_token_keywords() -> Vec<String> {
    strings(&["token"])
}

fn default_token_expired_keywords() -> Vec<String> {
    strings(&["expired", "invalid", "unauthorized", "401"])
}

fn default_token_refresh_keywords() -> Vec<String> {
    strings(&["refresh"])
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 3000

[database]
url = "sqlite://target/db/dashboard.db?mode=rwc"

[bridge]
base_url = "http://localhost:8777"
setup_base_url = "http://localhost:8778"
context = "normal"
timeout_secs = 30
status_path = "/status"
stale_after_secs = 30

[logs]
statistics_window = 1000
recent_sample_cap = 20
recent_logs_limit = 20
default_page_size = 50
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
///
/// Environment overrides are applied on top of whichever file was used.
pub fn load_config() -> Result<Config, ConfigError> {
    let mut config = load_file_or_default()?;
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    Ok(config)
}

fn load_file_or_default() -> Result<Config, ConfigError> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");
            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                return load_from_path(&config_path);
            }
            tracing::warn!("config.toml not found at: {}", config_path.display());
        }
    }

    tracing::info!("Using default embedded configuration");
    Ok(toml::from_str(DEFAULT_CONFIG)?)
}

pub fn load_from_path(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    Ok(toml::from_str(&contents)?)
}

/// `lookup` is injected so tests don't have to touch the process environment.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("SERVER_HOST") {
        config.server.host = host;
    }
    if let Some(port) = lookup("SERVER_PORT") {
        config.server.port = port.trim().parse().map_err(|err| ConfigError::Invalid {
            name: "SERVER_PORT".into(),
            reason: format!("{err}"),
        })?;
    }
    if let Some(url) = lookup("DATABASE_URL") {
        config.database.url = url;
    }
    if let Some(url) = lookup("SEERRBRIDGE_URL") {
        config.bridge.base_url = url;
    }
    if let Some(url) = lookup("SEERRBRIDGE_SETUP_URL") {
        config.bridge.setup_base_url = url;
    }
    if let Some(context) = lookup("SEERRBRIDGE_CONTEXT") {
        config.bridge.context = context.parse()?;
    }
    validate(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    for (name, url) in [
        ("bridge.base_url", &config.bridge.base_url),
        ("bridge.setup_base_url", &config.bridge.setup_base_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                name: name.into(),
                reason: format!("'{url}' is not an http(s) URL"),
            });
        }
    }
    if config.logs.recent_sample_cap == 0 || config.logs.default_page_size == 0 {
        return Err(ConfigError::Invalid {
            name: "logs".into(),
            reason: "recent_sample_cap and default_page_size must be positive".into(),
        });
    }
    Ok(())
}
