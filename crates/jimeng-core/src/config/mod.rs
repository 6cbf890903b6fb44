//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable carrying the upstream session token
pub const SESSION_TOKEN_ENV: &str = "JIMENG_SESSION_ID";

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "JIMENG_CONFIG_DIR";

/// Client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub upstream: UpstreamConfig,
    pub generation: GenerationConfig,
    pub retry: RetryConfig,
}

/// How to reach and present ourselves to the upstream service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    #[serde(skip)]
    pub session_token: Option<String>,
    pub base_url: String,
    pub assistant_id: String,
    pub version_code: String,
    pub platform_code: String,
    pub region: String,
    pub time_zone: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub default_model: String,
    pub sample_strength: f64,
    pub poll_interval_ms: u64,
    /// Ceiling on status lookups per job; `None` polls until a terminal status
    pub max_poll_attempts: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub delay_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            session_token: None,
            base_url: "https://jimeng.jianying.com".to_string(),
            assistant_id: "513695".to_string(),
            version_code: "5.8.0".to_string(),
            platform_code: "7".to_string(),
            region: "CN".to_string(),
            time_zone: "Asia/Shanghai".to_string(),
            timeout_secs: 15,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_model: "jimeng-2.1".to_string(),
            sample_strength: 0.5,
            poll_interval_ms: 1000,
            max_poll_attempts: None,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay_ms: 5000,
        }
    }
}

impl UpstreamConfig {
    pub fn resolved_session_token(&self) -> anyhow::Result<Option<String>> {
        self.enforce_env_only()?;

        Ok(env::var(SESSION_TOKEN_ENV)
            .ok()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty()))
    }

    pub fn redacted_session_token(&self) -> anyhow::Result<Option<String>> {
        self.resolved_session_token().map(|opt| opt.map(|token| redact(&token)))
    }

    pub fn enforce_env_only(&self) -> anyhow::Result<()> {
        if self.session_token.is_some() {
            return Err(anyhow!(
                "Session tokens must be provided via the {} environment variable, not stored in configuration",
                SESSION_TOKEN_ENV
            ));
        }
        Ok(())
    }
}

/// Keep only the last four characters of a secret
pub fn redact(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        "***".to_string()
    } else {
        let suffix: String = chars[chars.len() - 4..].iter().collect();
        format!("***{}", suffix)
    }
}

const KEYS: &[&str] = &[
    "upstream.base_url",
    "upstream.assistant_id",
    "upstream.version_code",
    "upstream.platform_code",
    "upstream.region",
    "upstream.time_zone",
    "upstream.timeout_secs",
    "upstream.session_token",
    "generation.default_model",
    "generation.sample_strength",
    "generation.poll_interval_ms",
    "generation.max_poll_attempts",
    "retry.max_retries",
    "retry.delay_ms",
];

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var(CONFIG_DIR_ENV) {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("jimeng")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or defaults if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path, creating parent directories
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        self.upstream.enforce_env_only()?;
        if self.upstream.base_url.trim().is_empty() {
            return Err(anyhow!("upstream.base_url must not be empty"));
        }
        if self.upstream.timeout_secs == 0 {
            return Err(anyhow!("upstream.timeout_secs must be positive"));
        }
        if !(0.0..=1.0).contains(&self.generation.sample_strength) {
            return Err(anyhow!("generation.sample_strength must be between 0.0 and 1.0"));
        }
        if self.generation.poll_interval_ms == 0 {
            return Err(anyhow!("generation.poll_interval_ms must be positive"));
        }
        if self.generation.max_poll_attempts == Some(0) {
            return Err(anyhow!("generation.max_poll_attempts must be positive when set"));
        }
        Ok(())
    }

    /// Session token from the environment, if any
    pub fn session_token(&self) -> anyhow::Result<Option<String>> {
        self.upstream.resolved_session_token()
    }

    /// All recognised configuration keys
    pub fn keys() -> &'static [&'static str] {
        KEYS
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "upstream.base_url" => Ok(self.upstream.base_url.clone()),
            "upstream.assistant_id" => Ok(self.upstream.assistant_id.clone()),
            "upstream.version_code" => Ok(self.upstream.version_code.clone()),
            "upstream.platform_code" => Ok(self.upstream.platform_code.clone()),
            "upstream.region" => Ok(self.upstream.region.clone()),
            "upstream.time_zone" => Ok(self.upstream.time_zone.clone()),
            "upstream.timeout_secs" => Ok(self.upstream.timeout_secs.to_string()),

            "generation.default_model" => Ok(self.generation.default_model.clone()),
            "generation.sample_strength" => Ok(self.generation.sample_strength.to_string()),
            "generation.poll_interval_ms" => Ok(self.generation.poll_interval_ms.to_string()),
            "generation.max_poll_attempts" => Ok(self
                .generation
                .max_poll_attempts
                .map(|n| n.to_string())
                .unwrap_or_else(|| "unbounded".to_string())),

            "retry.max_retries" => Ok(self.retry.max_retries.to_string()),
            "retry.delay_ms" => Ok(self.retry.delay_ms.to_string()),

            // Session token (special handling - show redacted)
            "upstream.session_token" | "session_token" => {
                match self.upstream.redacted_session_token()? {
                    Some(redacted) => Ok(redacted),
                    None => Ok(format!("(not set - use {} env var)", SESSION_TOKEN_ENV)),
                }
            }

            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `jimeng config show` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "upstream.base_url" => {
                let url = value.trim().trim_end_matches('/');
                if url.is_empty() {
                    return Err(anyhow!("Base URL must not be empty"));
                }
                self.upstream.base_url = url.to_string();
            }
            "upstream.assistant_id" => {
                value
                    .parse::<u64>()
                    .with_context(|| format!("Invalid assistant_id value: {}", value))?;
                self.upstream.assistant_id = value.to_string();
            }
            "upstream.version_code" => {
                self.upstream.version_code = value.to_string();
            }
            "upstream.platform_code" => {
                self.upstream.platform_code = value.to_string();
            }
            "upstream.region" => {
                self.upstream.region = value.to_string();
            }
            "upstream.time_zone" => {
                self.upstream.time_zone = value.to_string();
            }
            "upstream.timeout_secs" => {
                let secs: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid timeout_secs value: {}", value))?;
                if secs == 0 {
                    return Err(anyhow!("Timeout must be positive"));
                }
                self.upstream.timeout_secs = secs;
            }

            "generation.default_model" => {
                self.generation.default_model = value.to_string();
            }
            "generation.sample_strength" => {
                let strength: f64 = value
                    .parse()
                    .with_context(|| format!("Invalid sample_strength value: {}", value))?;
                if !(0.0..=1.0).contains(&strength) {
                    return Err(anyhow!("Sample strength must be between 0.0 and 1.0"));
                }
                self.generation.sample_strength = strength;
            }
            "generation.poll_interval_ms" => {
                let interval: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid poll_interval_ms value: {}", value))?;
                if interval == 0 {
                    return Err(anyhow!("Poll interval must be positive"));
                }
                self.generation.poll_interval_ms = interval;
            }
            "generation.max_poll_attempts" => {
                let value = value.trim();
                if value.is_empty() || value.eq_ignore_ascii_case("unbounded") {
                    self.generation.max_poll_attempts = None;
                } else {
                    let attempts: u32 = value
                        .parse()
                        .with_context(|| format!("Invalid max_poll_attempts value: {}", value))?;
                    if attempts == 0 {
                        return Err(anyhow!("Max poll attempts must be positive"));
                    }
                    self.generation.max_poll_attempts = Some(attempts);
                }
            }

            "retry.max_retries" => {
                self.retry.max_retries = value
                    .parse()
                    .with_context(|| format!("Invalid max_retries value: {}", value))?;
            }
            "retry.delay_ms" => {
                self.retry.delay_ms = value
                    .parse()
                    .with_context(|| format!("Invalid delay_ms value: {}", value))?;
            }

            // Session token cannot be set via config
            "upstream.session_token" | "session_token" => {
                return Err(anyhow!(
                    "Session tokens cannot be stored in configuration. \
                     Set the {} environment variable instead.",
                    SESSION_TOKEN_ENV
                ));
            }

            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `jimeng config show` to see available keys.",
                    key
                ));
            }
        }
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        KEYS.iter()
            .map(|key| {
                let value = self.get(key)?;
                Ok((key.to_string(), value))
            })
            .collect()
    }
}
