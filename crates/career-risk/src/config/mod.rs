use crate::models::confidence::{DEFAULT_ITERATIONS, MAX_ITERATIONS};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

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
    pub cors: CorsConfig,
    pub rate_limit: RateLimitConfig,
    pub models: ModelConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment =
            AppEnvironment::from_str(&lookup("APP_ENV").unwrap_or_else(|| "development".into()));

        let host = lookup("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("APP_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = lookup("APP_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let cors = CorsConfig::parse(lookup("APP_ALLOWED_ORIGINS").as_deref());

        let defaults = RateLimitConfig::default();
        let limit = |var: &'static str, default: u32| parse_var(&lookup, var, default);
        let rate_limit = RateLimitConfig {
            window_secs: parse_var(&lookup, "APP_RATE_LIMIT_WINDOW_SECS", defaults.window_secs)?,
            resistance: limit("APP_RATE_LIMIT_RESISTANCE_PER_MIN", defaults.resistance)?,
            freshness: limit("APP_RATE_LIMIT_FRESHNESS_PER_MIN", defaults.freshness)?,
            trajectory: limit("APP_RATE_LIMIT_TRAJECTORY_PER_MIN", defaults.trajectory)?,
            portfolio: limit("APP_RATE_LIMIT_PORTFOLIO_PER_MIN", defaults.portfolio)?,
            cascade: limit("APP_RATE_LIMIT_CASCADE_PER_MIN", defaults.cascade)?,
            confidence: limit("APP_RATE_LIMIT_CONFIDENCE_PER_MIN", defaults.confidence)?,
            calibration: limit("APP_RATE_LIMIT_CALIBRATION_PER_MIN", defaults.calibration)?,
        };
        if rate_limit.window_secs == 0 {
            return Err(ConfigError::OutOfRange {
                var: "APP_RATE_LIMIT_WINDOW_SECS",
                value: "0".to_string(),
            });
        }

        let ci_iterations = parse_var(&lookup, "APP_CI_ITERATIONS", DEFAULT_ITERATIONS)?;
        if !(1..=MAX_ITERATIONS).contains(&ci_iterations) {
            return Err(ConfigError::OutOfRange {
                var: "APP_CI_ITERATIONS",
                value: ci_iterations.to_string(),
            });
        }
        let sampler_seed = match lookup("APP_SAMPLER_SEED") {
            Some(raw) if !raw.trim().is_empty() => Some(parse_value("APP_SAMPLER_SEED", &raw)?),
            _ => None,
        };

        let api_key = lookup("APP_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            cors,
            rate_limit,
            models: ModelConfig {
                ci_iterations,
                sampler_seed,
            },
            auth: AuthConfig { api_key },
        })
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        Some(raw) if !raw.trim().is_empty() => parse_value(var, &raw),
        _ => Ok(default),
    }
}

fn parse_value<T: FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidNumber {
        var,
        value: raw.to_string(),
    })
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

/// Browser origins allowed to call the API. `None` admits any origin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: Option<Vec<String>>,
}

impl CorsConfig {
    fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Self::default();
        };
        let origins: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();
        if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
            return Self::default();
        }
        Self {
            allowed_origins: Some(origins),
        }
    }
}

/// Fixed-window request budgets per endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub window_secs: u64,
    pub resistance: u32,
    pub freshness: u32,
    pub trajectory: u32,
    pub portfolio: u32,
    pub cascade: u32,
    pub confidence: u32,
    pub calibration: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 60,
            resistance: 60,
            freshness: 60,
            trajectory: 30,
            portfolio: 30,
            cascade: 30,
            confidence: 60,
            calibration: 30,
        }
    }
}

/// Knobs shared by the Monte Carlo models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub ci_iterations: u32,
    pub sampler_seed: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            ci_iterations: DEFAULT_ITERATIONS,
            sampler_seed: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthConfig {
    pub api_key: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { var: &'static str, value: String },
    OutOfRange { var: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { var, value } => {
                write!(f, "{var} must be a non-negative integer (got '{value}')")
            }
            ConfigError::OutOfRange { var, value } => {
                write!(f, "{var} is outside its accepted range (got '{value}')")
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
