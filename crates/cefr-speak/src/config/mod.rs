use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub storage: StorageConfig,
    pub session: SessionConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let data_dir = env::var("CEFR_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".cefr-speak"));

        let defaults = SessionConfig::default();
        let session = SessionConfig {
            time_budget: read_number("SESSION_TIME_BUDGET", defaults.time_budget)?,
            tick_interval: read_interval("SESSION_TICK_MS", defaults.tick_interval)?,
            startup_delay: read_millis("SESSION_STARTUP_MS", defaults.startup_delay)?,
            playback_delay: read_millis("SESSION_PLAYBACK_MS", defaults.playback_delay)?,
            response_duration: read_millis("SESSION_RESPONSE_MS", defaults.response_duration)?,
            backend_delay: read_millis("BACKEND_DELAY_MS", defaults.backend_delay)?,
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let format = match env::var("APP_LOG_FORMAT") {
            Ok(raw) if raw.trim().eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        };

        Ok(Self {
            environment,
            storage: StorageConfig { data_dir },
            session,
            telemetry: TelemetryConfig { log_level, format },
        })
    }
}

fn read_number(var: &'static str, default: u32) -> Result<u32, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidNumber { var, value: raw }),
        Err(_) => Ok(default),
    }
}

fn read_millis(var: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| ConfigError::InvalidNumber { var, value: raw }),
        Err(_) => Ok(default),
    }
}

fn read_interval(var: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    let interval = read_millis(var, default)?;
    if interval.is_zero() {
        return Err(ConfigError::ZeroInterval { var });
    }
    Ok(interval)
}

/// Where the saved profile lives.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

/// Timing for the assessment conversation and the mock analysis backend.
///
/// `time_budget` is counted in ticks; one tick is emitted per `tick_interval`
/// while the conversation is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub time_budget: u32,
    pub tick_interval: Duration,
    pub startup_delay: Duration,
    pub playback_delay: Duration,
    pub response_duration: Duration,
    pub backend_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            time_budget: 120,
            tick_interval: Duration::from_secs(1),
            startup_delay: Duration::from_millis(2000),
            playback_delay: Duration::from_millis(2000),
            response_duration: Duration::from_millis(15_000),
            backend_delay: Duration::from_millis(3000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber { var: &'static str, value: String },
    ZeroInterval { var: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { var, value } => {
                write!(f, "{var} must be a non-negative integer, got '{value}'")
            }
            ConfigError::ZeroInterval { var } => write!(f, "{var} must be greater than zero"),
        }
    }
}

impl std::error::Error for ConfigError {}
