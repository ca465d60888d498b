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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub erp: ErpConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            erp: ErpConfig::from_env()?,
        })
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Connection and document settings for the ERP lead and careers endpoints.
///
/// Passed explicitly to the HTTP gateway; nothing reads it from global state.
#[derive(Debug, Clone, PartialEq)]
pub struct ErpConfig {
    pub enabled: bool,
    pub base_url: String,
    pub api_key: String,
    pub api_secret: String,
    pub lead_doctype: String,
    pub naming_series: String,
    pub source: String,
    pub contact_source: String,
    pub status: String,
    pub timeout: Duration,
}

impl Default for ErpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            lead_doctype: "Visitor Information".to_string(),
            naming_series: ".FY.EXPO.####".to_string(),
            source: "Configurator".to_string(),
            contact_source: "Contact Us (Website Page)".to_string(),
            status: "Open".to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

impl ErpConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let enabled = match env::var("ERP_ENABLED") {
            Ok(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag {
                name: "ERP_ENABLED",
                value: raw,
            })?,
            Err(_) => false,
        };

        let timeout = match env::var("ERP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidTimeout)?,
            Err(_) => defaults.timeout,
        };

        let config = Self {
            enabled,
            base_url: env::var("ERP_BASE_URL")
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .unwrap_or_default(),
            api_key: env::var("ERP_API_KEY").unwrap_or_default(),
            api_secret: env::var("ERP_API_SECRET").unwrap_or_default(),
            lead_doctype: env::var("ERP_LEAD_DOCTYPE").unwrap_or(defaults.lead_doctype),
            naming_series: env::var("ERP_NAMING_SERIES").unwrap_or(defaults.naming_series),
            source: env::var("ERP_SOURCE").unwrap_or(defaults.source),
            contact_source: env::var("ERP_CONTACT_SOURCE").unwrap_or(defaults.contact_source),
            status: env::var("ERP_STATUS").unwrap_or(defaults.status),
            timeout,
        };

        if config.enabled && config.base_url.is_empty() {
            return Err(ConfigError::MissingErpBaseUrl);
        }

        Ok(config)
    }

    /// REST resource endpoint for one ERP doctype.
    pub fn resource_endpoint(&self, doctype: &str) -> String {
        format!("{}/api/resource/{}", self.base_url, doctype)
    }

    /// Endpoint receiving lead documents.
    pub fn lead_endpoint(&self) -> String {
        self.resource_endpoint(&self.lead_doctype)
    }

    pub fn authorization(&self) -> String {
        format!("token {}:{}", self.api_key, self.api_secret)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" | "" => Some(false),
        _ => None,
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidFlag { name: &'static str, value: String },
    InvalidTimeout,
    MissingErpBaseUrl,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{name} must be a boolean flag, found '{value}'")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "ERP_TIMEOUT_SECS must be a whole number of seconds")
            }
            ConfigError::MissingErpBaseUrl => {
                write!(f, "ERP_BASE_URL is required when ERP_ENABLED is set")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidFlag { .. }
            | ConfigError::InvalidTimeout
            | ConfigError::MissingErpBaseUrl => None,
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
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "ERP_ENABLED",
            "ERP_BASE_URL",
            "ERP_API_KEY",
            "ERP_API_SECRET",
            "ERP_LEAD_DOCTYPE",
            "ERP_TIMEOUT_SECS",
        ] {
            env::remove_var(name);
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
        assert_eq!(config.telemetry.log_level, "info");
        assert!(!config.erp.enabled);
        assert_eq!(config.erp.lead_doctype, "Visitor Information");
        assert_eq!(config.erp.timeout, Duration::from_secs(15));
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn enabled_erp_requires_base_url() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ERP_ENABLED", "yes");
        let err = AppConfig::load().expect_err("missing base url rejected");
        assert!(matches!(err, ConfigError::MissingErpBaseUrl));
    }

    #[test]
    fn erp_settings_build_endpoint_and_token() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ERP_ENABLED", "1");
        env::set_var("ERP_BASE_URL", "https://erp.example.com/");
        env::set_var("ERP_API_KEY", "key");
        env::set_var("ERP_API_SECRET", "secret");
        env::set_var("ERP_TIMEOUT_SECS", "4");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(
            config.erp.lead_endpoint(),
            "https://erp.example.com/api/resource/Visitor Information"
        );
        assert_eq!(config.erp.authorization(), "token key:secret");
        assert_eq!(config.erp.timeout, Duration::from_secs(4));
        reset_env();
    }

    #[test]
    fn rejects_garbled_erp_flag() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ERP_ENABLED", "maybe");
        let err = AppConfig::load().expect_err("flag rejected");
        assert!(err.to_string().contains("ERP_ENABLED"));
        reset_env();
    }
}
