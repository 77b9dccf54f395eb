use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

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
    pub zones: ZoneConfig,
    pub mail: MailConfig,
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
            zones: ZoneConfig::from_env()?,
            mail: MailConfig::from_env()?,
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Paths to the static zone data plus the enumerated zone range.
#[derive(Debug, Clone)]
pub struct ZoneConfig {
    pub dataset_path: PathBuf,
    pub directory_path: PathBuf,
    pub roster_path: PathBuf,
    pub zone_count: u32,
}

impl ZoneConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let dataset_path =
            env::var("ZONE_DATASET_PATH").unwrap_or_else(|_| "config/zones.json".to_string());
        let directory_path =
            env::var("ZONE_EMAIL_PATH").unwrap_or_else(|_| "config/zone-emails.json".to_string());
        let roster_path =
            env::var("WORKER_ROSTER_PATH").unwrap_or_else(|_| "config/workers.json".to_string());
        let zone_count = env::var("ZONE_COUNT")
            .unwrap_or_else(|_| "12".to_string())
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidZoneCount)?;

        Ok(Self {
            dataset_path: PathBuf::from(dataset_path),
            directory_path: PathBuf::from(directory_path),
            roster_path: PathBuf::from(roster_path),
            zone_count,
        })
    }
}

/// SMTP settings for zone notifications.
///
/// Delivery is opt-in: without `MAIL_DELIVERY=true` the sink logs messages
/// instead of relaying them, so local setups need no SMTP credentials.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_address: String,
    pub delivery_enabled: bool,
}

impl MailConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            smtp_port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidSmtpPort)?,
            smtp_username: env::var("SMTP_USERNAME").unwrap_or_default(),
            smtp_password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            from_address: env::var("SMTP_FROM_EMAIL")
                .unwrap_or_else(|_| "noreply@localhost".to_string()),
            delivery_enabled: env::var("MAIL_DELIVERY")
                .map(|value| value.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidSmtpPort,
    InvalidZoneCount,
    InvalidHost { source: std::net::AddrParseError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidSmtpPort => write!(f, "SMTP_PORT must be a valid u16"),
            ConfigError::InvalidZoneCount => write!(f, "ZONE_COUNT must be a positive integer"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    #[test]
    fn server_config_accepts_localhost() {
        let config = ServerConfig {
            host: "localhost".to_string(),
            port: 3000,
        };
        let addr = config.socket_addr().expect("localhost resolves");
        assert_eq!(addr.to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn server_config_rejects_non_address_hosts() {
        let config = ServerConfig {
            host: "garbage.example".to_string(),
            port: 3000,
        };
        assert!(matches!(
            config.socket_addr(),
            Err(ConfigError::InvalidHost { .. })
        ));
    }

    #[test]
    fn zone_config_defaults_apply_without_env() {
        let _lock = env_guard().lock().expect("env guard");
        env::remove_var("ZONE_DATASET_PATH");
        env::remove_var("ZONE_COUNT");

        let config = ZoneConfig::from_env().expect("defaults load");
        assert_eq!(config.dataset_path, PathBuf::from("config/zones.json"));
        assert_eq!(config.zone_count, 12);
    }

    #[test]
    fn mail_delivery_defaults_to_disabled() {
        let _lock = env_guard().lock().expect("env guard");
        env::remove_var("MAIL_DELIVERY");

        let config = MailConfig::from_env().expect("defaults load");
        assert!(!config.delivery_enabled);
        assert_eq!(config.smtp_port, 587);
    }
}
