use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default observability endpoint
pub const DEFAULT_SERVER_URL: &str = "http://localhost:4000/events";

/// Message the host emits whenever it is idle; never worth speaking aloud
pub const WAITING_FOR_INPUT: &str = "Claude is waiting for your input";

/// Log level for the file logger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Off => log::LevelFilter::Off,
        }
    }
}

/// Main hookcast configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub log_level: LogLevel,
    /// Application name reported with every event (defaults to the cwd base name)
    pub app_name: Option<String>,
    pub observability: ObservabilityConfig,
    pub notify: NotifyConfig,
    pub tts: TtsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Forward events at all
    pub enabled: bool,
    /// Events endpoint
    pub server_url: String,
    /// Per-request timeout
    pub timeout_ms: u64,
    /// How long a hook waits for its background send before exiting
    pub flush_grace_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Speak notifications even without --notify
    pub enabled: bool,
    /// Messages containing any of these are never spoken
    pub skip_phrases: Vec<String>,
    /// Regex variants of skip_phrases
    pub skip_patterns: Vec<String>,
    /// Environment variable holding the name to address the listener by
    pub display_name_env: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TtsConfig {
    /// Directory holding elevenlabs_tts.py, openai_tts.py and pyttsx3_tts.py
    pub scripts_dir: PathBuf,
    /// Kill a backend that runs longer than this
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            app_name: None,
            observability: ObservabilityConfig::default(),
            notify: NotifyConfig::default(),
            tts: TtsConfig::default(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            server_url: DEFAULT_SERVER_URL.to_string(),
            timeout_ms: 1000,
            flush_grace_ms: 250,
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            skip_phrases: vec![WAITING_FOR_INPUT.to_string()],
            skip_patterns: Vec::new(),
            display_name_env: "ENGINEER_NAME".to_string(),
        }
    }
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            scripts_dir: PathBuf::from("~/.claude/hooks/utils/tts"),
            timeout_secs: 10,
        }
    }
}

impl ObservabilityConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Grace period for the background send, never longer than the request timeout
    pub fn flush_grace(&self) -> Duration {
        Duration::from_millis(self.flush_grace_ms.min(self.timeout_ms))
    }

    /// Health endpoint next to the events endpoint
    pub fn health_url(&self) -> String {
        let trimmed = self.server_url.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(idx) if idx > trimmed.find("://").map(|i| i + 2).unwrap_or(0) => {
                format!("{}/health", &trimmed[..idx])
            }
            _ => format!("{}/health", trimmed),
        }
    }
}

impl TtsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::load_file(config_path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn load_file(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, it must load
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        if let Ok(env_path) = std::env::var("HOOKCAST_CONFIG") {
            let path = PathBuf::from(env_path);
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from HOOKCAST_CONFIG: {}", e);
                    }
                }
            }
        }

        // HOOKCAST_DIR (or ~/.config/hookcast), then ./hookcast.yaml for development
        let candidates = [Self::hookcast_dir().join("hookcast.yaml"), PathBuf::from("hookcast.yaml")];

        for path in candidates {
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("HOOKCAST_SERVER_URL")
            && !url.trim().is_empty()
        {
            self.observability.server_url = url;
        }
    }

    /// Get the hookcast config directory
    pub fn hookcast_dir() -> PathBuf {
        std::env::var("HOOKCAST_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("hookcast"))
    }

    /// Application name: configured value, else the base name of the cwd
    pub fn resolve_app_name(&self) -> String {
        if let Some(ref name) = self.app_name
            && !name.is_empty()
        {
            return name.clone();
        }

        std::env::current_dir()
            .ok()
            .and_then(|dir| dir.file_name().map(|n| n.to_string_lossy().to_string()))
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }
}
