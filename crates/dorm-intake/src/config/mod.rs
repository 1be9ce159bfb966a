use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
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

/// Top-level configuration for the intake workflow and its companion service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub timings: WorkflowTimings,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let base_url = env::var("INTAKE_BACKEND_URL")
            .unwrap_or_else(|_| format!("http://127.0.0.1:{port}"));
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBackendUrl(base_url));
        }

        let request_timeout = Duration::from_secs(read_number(
            "INTAKE_REQUEST_TIMEOUT_SECS",
            BackendConfig::DEFAULT_TIMEOUT_SECS,
        )?);
        let notification_ttl = Duration::from_millis(read_number(
            "INTAKE_NOTIFICATION_TTL_MS",
            WorkflowTimings::DEFAULT_NOTIFICATION_TTL_MS,
        )?);
        let reset_delay = Duration::from_millis(read_number(
            "INTAKE_RESET_DELAY_MS",
            WorkflowTimings::DEFAULT_RESET_DELAY_MS,
        )?);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            backend: BackendConfig {
                base_url,
                request_timeout,
            },
            timings: WorkflowTimings {
                notification_ttl,
                reset_delay,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn read_number(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Where the submission client sends applications and facility requests.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub request_timeout: Duration,
}

impl BackendConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
}

/// Delays driving notification expiry and the post-submit form reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowTimings {
    pub notification_ttl: Duration,
    pub reset_delay: Duration,
}

impl WorkflowTimings {
    pub const DEFAULT_NOTIFICATION_TTL_MS: u64 = 4_000;
    pub const DEFAULT_RESET_DELAY_MS: u64 = 3_000;
}

impl Default for WorkflowTimings {
    fn default() -> Self {
        Self {
            notification_ttl: Duration::from_millis(Self::DEFAULT_NOTIFICATION_TTL_MS),
            reset_delay: Duration::from_millis(Self::DEFAULT_RESET_DELAY_MS),
        }
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidBackendUrl(String),
    InvalidNumber { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidBackendUrl(url) => {
                write!(f, "INTAKE_BACKEND_URL must be an http(s) URL, got '{url}'")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a non-negative integer, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidBackendUrl(_)
            | ConfigError::InvalidNumber { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "INTAKE_BACKEND_URL",
            "INTAKE_REQUEST_TIMEOUT_SECS",
            "INTAKE_NOTIFICATION_TTL_MS",
            "INTAKE_RESET_DELAY_MS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.backend.base_url, "http://127.0.0.1:3000");
        assert_eq!(config.backend.request_timeout, Duration::from_secs(30));
        assert_eq!(config.timings, WorkflowTimings::default());
        assert_eq!(config.timings.notification_ttl, Duration::from_secs(4));
        assert_eq!(config.timings.reset_delay, Duration::from_secs(3));
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn rejects_non_numeric_timings() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("INTAKE_RESET_DELAY_MS", "soon");
        match AppConfig::load() {
            Err(ConfigError::InvalidNumber { key, value }) => {
                assert_eq!(key, "INTAKE_RESET_DELAY_MS");
                assert_eq!(value, "soon");
            }
            other => panic!("expected invalid number error, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn rejects_backend_url_without_scheme() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("INTAKE_BACKEND_URL", "intake.example.edu");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidBackendUrl(_))
        ));
        reset_env();
    }
}
