use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Deployment stage of the service. Production hides server-side error detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnvironment {
    #[default]
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

    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Top-level configuration for the engagement service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let stage = env::var("APP_ENV")
            .or_else(|_| env::var("STAGE"))
            .unwrap_or_else(|_| "development".to_string());
        let environment = AppEnvironment::from_str(&stage);

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let mode = match env::var("APP_AUTH_MODE") {
            Ok(raw) => AuthMode::parse(&raw)?,
            Err(_) => AuthMode::Token,
        };
        let defaults = AuthConfig::default();
        let auth = AuthConfig {
            mode,
            signing_key: env::var("APP_TOKEN_SIGNING_KEY").unwrap_or(defaults.signing_key),
            issuer: env::var("APP_TOKEN_ISSUER").unwrap_or(defaults.issuer),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            auth,
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

/// How requests prove which customer they act for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// HS256 token in `x-auth-token`, issued by the login service.
    #[default]
    Token,
    /// Customer id forwarded by a trusted gateway in `x-customer-cif`.
    Gateway,
}

impl AuthMode {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "token" | "jwt" => Ok(Self::Token),
            "gateway" => Ok(Self::Gateway),
            other => Err(ConfigError::InvalidAuthMode(other.to_string())),
        }
    }
}

/// Token verification settings shared with the login service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub mode: AuthMode,
    pub signing_key: String,
    pub issuer: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::Token,
            signing_key: "thinmonkeysSecretSignature".to_string(),
            issuer: "thinmonkeys".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidAuthMode(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidAuthMode(value) => {
                write!(f, "APP_AUTH_MODE must be 'token' or 'gateway', got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidAuthMode(_) => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
