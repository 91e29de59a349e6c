use std::env;
use std::fmt;
use std::fs::File;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use crate::workflows::prioritization::report::{DEFAULT_BUCKET_WIDTH, DEFAULT_TOP_N};
use crate::workflows::prioritization::{
    FactorRegistry, RegistryError, ReportSettings, ThresholdLadder, ThresholdLadderError,
};

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
    pub prioritization: PrioritizationConfig,
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
            prioritization: PrioritizationConfig::from_env()?,
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

/// Scoring and report knobs. The ladder is validated here, so a loaded
/// configuration never carries an unusable one.
#[derive(Debug, Clone)]
pub struct PrioritizationConfig {
    pub thresholds: ThresholdLadder,
    pub report: ReportSettings,
    /// JSON factor catalog; the reference catalog is used when unset.
    pub factor_catalog: Option<PathBuf>,
}

impl Default for PrioritizationConfig {
    fn default() -> Self {
        Self {
            thresholds: ThresholdLadder::reference(),
            report: ReportSettings::default(),
            factor_catalog: None,
        }
    }
}

impl PrioritizationConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let reference = ThresholdLadder::reference();
        let thresholds = ThresholdLadder::new(
            parse_var("APP_THRESHOLD_HIGHEST", i64::from(reference.highest_threshold()))?,
            parse_var("APP_THRESHOLD_HIGH", i64::from(reference.high_threshold()))?,
            parse_var("APP_THRESHOLD_MEDIUM", i64::from(reference.medium_threshold()))?,
            parse_var("APP_THRESHOLD_LOW", i64::from(reference.low_threshold()))?,
        )?;

        let bucket_width = parse_var("APP_HISTOGRAM_BUCKET_WIDTH", DEFAULT_BUCKET_WIDTH)?;
        if bucket_width == 0 {
            return Err(ConfigError::InvalidBucketWidth);
        }
        let top_n = parse_var("APP_TOP_N", DEFAULT_TOP_N)?;

        let factor_catalog = env::var("APP_FACTOR_CATALOG")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            thresholds,
            report: ReportSettings {
                bucket_width,
                top_n,
            },
            factor_catalog,
        })
    }

    /// Load the configured factor catalog, falling back to the reference one.
    pub fn registry(&self) -> Result<FactorRegistry, ConfigError> {
        let Some(path) = &self.factor_catalog else {
            return Ok(FactorRegistry::reference());
        };

        let file = File::open(path).map_err(|source| ConfigError::CatalogFile {
            path: path.clone(),
            source,
        })?;
        FactorRegistry::from_json_reader(file).map_err(|source| ConfigError::Registry {
            path: path.clone(),
            source,
        })
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse::<T>()
                .map_err(|_| ConfigError::InvalidNumber {
                    variable: name,
                    value,
                })
        }
        _ => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidNumber {
        variable: &'static str,
        value: String,
    },
    InvalidBucketWidth,
    Thresholds(ThresholdLadderError),
    CatalogFile {
        path: PathBuf,
        source: std::io::Error,
    },
    Registry {
        path: PathBuf,
        source: RegistryError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { variable, value } => {
                write!(f, "{variable} must be a whole number, got '{value}'")
            }
            ConfigError::InvalidBucketWidth => {
                write!(f, "APP_HISTOGRAM_BUCKET_WIDTH must be greater than zero")
            }
            ConfigError::Thresholds(err) => write!(f, "threshold ladder rejected: {err}"),
            ConfigError::CatalogFile { path, .. } => {
                write!(f, "cannot open factor catalog {}", path.display())
            }
            ConfigError::Registry { path, source } => {
                write!(f, "factor catalog {} is invalid: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidBucketWidth => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::Thresholds(err) => Some(err),
            ConfigError::CatalogFile { source, .. } => Some(source),
            ConfigError::Registry { source, .. } => Some(source),
        }
    }
}

impl From<ThresholdLadderError> for ConfigError {
    fn from(value: ThresholdLadderError) -> Self {
        Self::Thresholds(value)
    }
}
