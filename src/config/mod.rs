use std::env;
use std::fmt;

use crate::error::ConfigError;

/// Upper bound on issued token lifetimes (one year).
pub const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 365;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub verify_tokens: bool,
    pub leeway_secs: u64,
    pub jwt_expiry_hours: u64,
    pub token_cookie: String,
}

// Hand-written so the secret never lands in logs
impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &if self.jwt_secret.is_empty() { "<unset>" } else { "<redacted>" })
            .field("verify_tokens", &self.verify_tokens)
            .field("leeway_secs", &self.leeway_secs)
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("token_cookie", &self.token_cookie)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub enable_request_logging: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source. `from_env` passes
    /// the process environment; tests pass a map.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let environment = match var("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(var)
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        // Server overrides
        if let Some(v) = var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(v) = var("TENANT_GATEWAY_PORT").or_else(|| var("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Security overrides
        if let Some(v) = var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Some(v) = var("SECURITY_JWT_VERIFY") {
            self.security.verify_tokens = v.parse().unwrap_or(self.security.verify_tokens);
        }
        if let Some(v) = var("SECURITY_JWT_LEEWAY_SECS") {
            self.security.leeway_secs = v.parse().unwrap_or(self.security.leeway_secs);
        }
        if let Some(v) = var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Some(v) = var("SECURITY_TOKEN_COOKIE") {
            self.security.token_cookie = v;
        }

        // API overrides
        if let Some(v) = var("SECURITY_ENABLE_CORS") {
            self.api.enable_cors = v.parse().unwrap_or(self.api.enable_cors);
        }
        if let Some(v) = var("SECURITY_CORS_ORIGINS") {
            self.api.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        self
    }

    /// Refuse configurations the gateway cannot run safely with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.verify_tokens && self.security.jwt_secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if self.security.token_cookie.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "SECURITY_TOKEN_COOKIE",
                reason: "cookie name must not be empty".to_string(),
            });
        }
        if self.security.jwt_expiry_hours == 0 || self.security.jwt_expiry_hours > MAX_JWT_EXPIRY_HOURS {
            return Err(ConfigError::InvalidValue {
                name: "SECURITY_JWT_EXPIRY_HOURS",
                reason: format!("token lifetime must be between 1 and {} hours", MAX_JWT_EXPIRY_HOURS),
            });
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            security: SecurityConfig {
                jwt_secret: "tenant-gateway-development-secret".to_string(),
                verify_tokens: true,
                leeway_secs: 60,
                jwt_expiry_hours: 24 * 7, // 1 week
                token_cookie: "token".to_string(),
            },
            api: ApiConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                enable_request_logging: true,
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                verify_tokens: true,
                leeway_secs: 30,
                jwt_expiry_hours: 24,
                token_cookie: "token".to_string(),
            },
            api: ApiConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                enable_request_logging: true,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                verify_tokens: true,
                leeway_secs: 0,
                jwt_expiry_hours: 4,
                token_cookie: "token".to_string(),
            },
            api: ApiConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                enable_request_logging: false,
            },
        }
    }
}
