use crate::delivery::{ConflictPolicy, RepositoryTarget, RetryPolicy};
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "DPR_CONFIG_PATH";

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_LOG_FILE: &str = "dpr_sender.log";
pub const DEFAULT_REPORTS_DIR: &str = "reports";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    pub url: Option<String>,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub delay_after_final: bool,
    pub log_file: PathBuf,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_attempts: 3,
            retry_delay_ms: 3_000,
            delay_after_final: false,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl WebhookConfig {
    pub fn endpoint(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            delay: Duration::from_millis(self.retry_delay_ms),
            delay_after_final_attempt: self.delay_after_final,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    pub token: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub api_base: String,
    pub branch: Option<String>,
    pub reports_dir: String,
    pub replace_existing: bool,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            token: None,
            owner: None,
            repo: None,
            api_base: DEFAULT_API_BASE.to_string(),
            branch: None,
            reports_dir: DEFAULT_REPORTS_DIR.to_string(),
            replace_existing: false,
        }
    }
}

impl RepositoryConfig {
    /// Resolves the upload target, listing every missing value at once.
    pub fn target(&self) -> Result<RepositoryTarget, AppError> {
        let token = present(self.token.as_deref());
        let owner = present(self.owner.as_deref());
        let repo = present(self.repo.as_deref());

        let mut missing = Vec::new();
        if token.is_none() {
            missing.push(ConfigKey::Token.env_var());
        }
        if owner.is_none() {
            missing.push(ConfigKey::Owner.env_var());
        }
        if repo.is_none() {
            missing.push(ConfigKey::Repo.env_var());
        }

        match (token, owner, repo) {
            (Some(token), Some(owner), Some(repo)) => Ok(RepositoryTarget {
                api_base: self.api_base.trim().trim_end_matches('/').to_string(),
                owner: owner.to_string(),
                repo: repo.to_string(),
                token: token.to_string(),
                branch: present(self.branch.as_deref()).map(str::to_string),
                reports_dir: self.reports_dir.trim().trim_matches('/').to_string(),
                conflict_policy: if self.replace_existing {
                    ConflictPolicy::ReplaceExisting
                } else {
                    ConflictPolicy::BlindWrite
                },
            }),
            _ => Err(AppError::configuration(format!(
                "missing {}",
                missing.join(" / ")
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub webhook: WebhookConfig,
    pub repository: RepositoryConfig,
    pub timeout_secs: u64,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            webhook: WebhookConfig::default(),
            repository: RepositoryConfig::default(),
            timeout_secs: 10,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    WebhookUrl,
    MaxAttempts,
    RetryDelayMs,
    TimeoutSecs,
    DelayAfterFinal,
    LogFile,
    Token,
    Owner,
    Repo,
    ApiBase,
    Branch,
    ReportsDir,
    ReplaceExisting,
    LogLevel,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 14] = [
        Self::WebhookUrl,
        Self::MaxAttempts,
        Self::RetryDelayMs,
        Self::TimeoutSecs,
        Self::DelayAfterFinal,
        Self::LogFile,
        Self::Token,
        Self::Owner,
        Self::Repo,
        Self::ApiBase,
        Self::Branch,
        Self::ReportsDir,
        Self::ReplaceExisting,
        Self::LogLevel,
    ];

    /// Dotted key used in override flags.
    pub fn name(self) -> &'static str {
        match self {
            Self::WebhookUrl => "webhook.url",
            Self::MaxAttempts => "webhook.max_attempts",
            Self::RetryDelayMs => "webhook.retry_delay_ms",
            Self::TimeoutSecs => "timeout_secs",
            Self::DelayAfterFinal => "webhook.delay_after_final",
            Self::LogFile => "webhook.log_file",
            Self::Token => "repository.token",
            Self::Owner => "repository.owner",
            Self::Repo => "repository.repo",
            Self::ApiBase => "repository.api_base",
            Self::Branch => "repository.branch",
            Self::ReportsDir => "repository.reports_dir",
            Self::ReplaceExisting => "repository.replace_existing",
            Self::LogLevel => "log_level",
        }
    }

    pub fn env_var(self) -> &'static str {
        match self {
            Self::WebhookUrl => "WEBHOOK_URL",
            Self::MaxAttempts => "DPR_MAX_ATTEMPTS",
            Self::RetryDelayMs => "DPR_RETRY_DELAY_MS",
            Self::TimeoutSecs => "DPR_TIMEOUT_SECS",
            Self::DelayAfterFinal => "DPR_DELAY_AFTER_FINAL",
            Self::LogFile => "DPR_LOG_FILE",
            Self::Token => "GITHUB_TOKEN",
            Self::Owner => "GITHUB_USERNAME",
            Self::Repo => "GITHUB_REPO",
            Self::ApiBase => "GITHUB_API_URL",
            Self::Branch => "GITHUB_BRANCH",
            Self::ReportsDir => "DPR_REPORTS_DIR",
            Self::ReplaceExisting => "DPR_REPLACE_EXISTING",
            Self::LogLevel => "DPR_LOG_LEVEL",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.name() == name)
    }
}

impl Config {
    /// Per-request HTTP timeout shared by both delivery clients.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Overlays values from the process environment.
    pub fn with_env(self) -> Result<Self, AppError> {
        self.with_lookup(|name| std::env::var(name).ok())
    }

    /// Overlays values from `lookup`; blank values count as absent.
    pub fn with_lookup<F>(mut self, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in ConfigKey::ALL {
            if let Some(value) = lookup(key.env_var())
                && !value.trim().is_empty()
            {
                self.apply(key, &value)?;
            }
        }
        Ok(self)
    }

    pub fn with_overrides(mut self, overrides: &[(ConfigKey, String)]) -> Result<Self, AppError> {
        for (key, value) in overrides {
            self.apply(*key, value)?;
        }
        Ok(self)
    }

    pub fn apply(&mut self, key: ConfigKey, raw: &str) -> Result<(), AppError> {
        let value = raw.trim();
        match key {
            ConfigKey::WebhookUrl => self.webhook.url = optional(value),
            ConfigKey::MaxAttempts => self.webhook.max_attempts = parse_number(key, value)?,
            ConfigKey::RetryDelayMs => self.webhook.retry_delay_ms = parse_number(key, value)?,
            ConfigKey::TimeoutSecs => {
                self.timeout_secs = parse_timeout(parse_number(key, value)?)?
            }
            ConfigKey::DelayAfterFinal => self.webhook.delay_after_final = parse_flag(key, value)?,
            ConfigKey::LogFile => self.webhook.log_file = PathBuf::from(required(key, value)?),
            ConfigKey::Token => self.repository.token = optional(value),
            ConfigKey::Owner => self.repository.owner = optional(value),
            ConfigKey::Repo => self.repository.repo = optional(value),
            ConfigKey::ApiBase => self.repository.api_base = required(key, value)?,
            ConfigKey::Branch => self.repository.branch = optional(value),
            ConfigKey::ReportsDir => self.repository.reports_dir = required(key, value)?,
            ConfigKey::ReplaceExisting => {
                self.repository.replace_existing = parse_flag(key, value)?
            }
            ConfigKey::LogLevel => {
                self.log_level = crate::logging::normalize_level(value)?.to_string()
            }
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("dpr").join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("dpr")
            .join(CONFIG_FILE_NAME))
    }
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

pub fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

pub fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    let log_level = crate::logging::normalize_level(&config.log_level)?;
    parse_timeout(config.timeout_secs)?;
    Ok(Config {
        log_level: log_level.to_string(),
        ..config
    })
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn required(key: ConfigKey, value: &str) -> Result<String, AppError> {
    if value.is_empty() {
        return Err(AppError::configuration(format!(
            "{} cannot be empty",
            key.name()
        )));
    }
    Ok(value.to_string())
}

fn parse_number<T: std::str::FromStr>(key: ConfigKey, value: &str) -> Result<T, AppError> {
    value.parse().map_err(|_| {
        AppError::configuration(format!(
            "{} must be a non-negative integer, got `{value}`",
            key.name()
        ))
    })
}

/// A zero timeout would fail every request before it is sent.
fn parse_timeout(secs: u64) -> Result<u64, AppError> {
    if secs == 0 {
        return Err(AppError::configuration(format!(
            "{} must be at least 1 second",
            ConfigKey::TimeoutSecs.name()
        )));
    }
    Ok(secs)
}

fn parse_flag(key: ConfigKey, value: &str) -> Result<bool, AppError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AppError::configuration(format!(
            "{} must be a boolean, got `{value}`",
            key.name()
        ))),
    }
}
