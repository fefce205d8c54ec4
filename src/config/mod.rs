use std::env;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub security: SecurityConfig,
    pub mail: MailConfig,
    pub expense: ExpenseConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StoreBackend::Postgres),
            "memory" | "mem" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::InvalidValue {
                name: "STORE_BACKEND",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
    /// Upper bound for a single store operation
    pub operation_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub secret_key: String,
    pub jwt_expiry_hours: i64,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub relay_url: Option<String>,
    pub relay_token: Option<String>,
    pub from: String,
    pub to: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ExpenseConfig {
    /// Offset from UTC used to cut calendar years for income/outcome reports
    pub utc_offset_minutes: i32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source; `from_env` passes the
    /// process environment.
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides(&lookup)?;

        config.validate()?;
        Ok(config)
    }

    fn with_env_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("PORT") {
            self.server.port = parse_var("PORT", &v)?;
        }

        // Store overrides
        if let Some(v) = lookup("STORE_BACKEND") {
            self.store.backend = v.parse()?;
        }
        if let Some(v) = lookup("DATABASE_URL") {
            self.store.database_url = non_empty(v);
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.store.max_connections = parse_var("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.store.connection_timeout_secs = parse_var("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }
        if let Some(v) = lookup("STORE_TIMEOUT_SECS") {
            self.store.operation_timeout_secs = parse_var("STORE_TIMEOUT_SECS", &v)?;
        }

        // Security overrides
        if let Some(v) = lookup("SECRET_KEY") {
            self.security.secret_key = v;
        }
        if let Some(v) = lookup("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = parse_var("JWT_EXPIRY_HOURS", &v)?;
        }
        if let Some(v) = lookup("EMAIL") {
            self.security.admin_email = non_empty(v);
        }
        if let Some(v) = lookup("PASSWORD") {
            self.security.admin_password = non_empty(v);
        }
        if let Some(v) = lookup("CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Mail overrides
        if let Some(v) = lookup("MAIL_RELAY_URL") {
            self.mail.relay_url = non_empty(v);
        }
        if let Some(v) = lookup("MAIL_RELAY_TOKEN") {
            self.mail.relay_token = non_empty(v);
        }
        if let Some(v) = lookup("MAIL_FROM") {
            self.mail.from = v;
        }
        if let Some(v) = lookup("MAIL_TO") {
            self.mail.to = non_empty(v);
        }

        // Expense overrides
        if let Some(v) = lookup("EXPENSE_UTC_OFFSET_MINUTES") {
            self.expense.utc_offset_minutes = parse_var("EXPENSE_UTC_OFFSET_MINUTES", &v)?;
        }

        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.security.secret_key.is_empty() {
            return Err(ConfigError::Missing("SECRET_KEY"));
        }
        if self.security.jwt_expiry_hours <= 0 {
            return Err(ConfigError::InvalidValue {
                name: "JWT_EXPIRY_HOURS",
                value: self.security.jwt_expiry_hours.to_string(),
            });
        }
        if self.store.backend == StoreBackend::Postgres && self.store.database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        // Credentialed CORS needs explicit origins
        if let Some(origin) = self.security.cors_origins.iter().find(|o| o.as_str() == "*") {
            return Err(ConfigError::InvalidValue {
                name: "CORS_ORIGINS",
                value: origin.clone(),
            });
        }
        // chrono::FixedOffset accepts strictly less than one day
        if self.expense.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(ConfigError::InvalidValue {
                name: "EXPENSE_UTC_OFFSET_MINUTES",
                value: self.expense.utc_offset_minutes.to_string(),
            });
        }
        Ok(())
    }

    /// Site-owner credentials for `POST /portfolio/login`, when configured
    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        match (&self.security.admin_email, &self.security.admin_password) {
            (Some(email), Some(password)) => Some((email.as_str(), password.as_str())),
            _ => None,
        }
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 8000 },
            store: StoreConfig {
                backend: StoreBackend::Postgres,
                database_url: None,
                max_connections: 10,
                connection_timeout_secs: 30,
                operation_timeout_secs: 100,
            },
            security: SecurityConfig {
                secret_key: String::new(),
                jwt_expiry_hours: 24,
                admin_email: None,
                admin_password: None,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
            mail: MailConfig {
                relay_url: None,
                relay_token: None,
                from: "portfolio@localhost".to_string(),
                to: None,
            },
            expense: ExpenseConfig { utc_offset_minutes: 0 },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.store.max_connections = 20;
        config.store.connection_timeout_secs = 10;
        config.security.cors_origins = vec!["https://staging.example.com".to_string()];
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.store.max_connections = 50;
        config.store.connection_timeout_secs = 5;
        config.security.cors_origins = vec!["https://example.com".to_string()];
        config
    }
}

fn parse_var<T: FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    })
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_source(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_development_config() {
        let config = load(&[("SECRET_KEY", "s"), ("STORE_BACKEND", "memory")]).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.store.operation_timeout_secs, 100);
        assert_eq!(config.security.jwt_expiry_hours, 24);
        assert_eq!(config.expense.utc_offset_minutes, 0);
    }

    #[test]
    fn test_production_profile_with_overrides() {
        let config = load(&[
            ("APP_ENV", "production"),
            ("SECRET_KEY", "s"),
            ("DATABASE_URL", "postgres://localhost/portfolio"),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
            ("PORT", "9000"),
        ])
        .unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.store.max_connections, 50);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.security.cors_origins, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn secret_key_is_required() {
        let err = load(&[("STORE_BACKEND", "memory")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SECRET_KEY")));

        let err = load(&[("STORE_BACKEND", "memory"), ("SECRET_KEY", "")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SECRET_KEY")));
    }

    #[test]
    fn postgres_backend_requires_database_url() {
        let err = load(&[("SECRET_KEY", "s")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn rejects_malformed_numbers() {
        let err = load(&[("SECRET_KEY", "s"), ("STORE_BACKEND", "memory"), ("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "PORT", .. }));

        let err = load(&[
            ("SECRET_KEY", "s"),
            ("STORE_BACKEND", "memory"),
            ("EXPENSE_UTC_OFFSET_MINUTES", "1440"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "EXPENSE_UTC_OFFSET_MINUTES", .. }));
    }

    #[test]
    fn wildcard_cors_origin_is_rejected() {
        for origins in ["*", "https://a.example, *"] {
            let err = load(&[("SECRET_KEY", "s"), ("STORE_BACKEND", "memory"), ("CORS_ORIGINS", origins)]).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { name: "CORS_ORIGINS", .. }), "{}", origins);
        }
    }

    #[test]
    fn admin_credentials_need_both_values() {
        let config = load(&[("SECRET_KEY", "s"), ("STORE_BACKEND", "memory"), ("EMAIL", "me@example.com")]).unwrap();
        assert!(config.admin_credentials().is_none());

        let config = load(&[
            ("SECRET_KEY", "s"),
            ("STORE_BACKEND", "memory"),
            ("EMAIL", "me@example.com"),
            ("PASSWORD", "hunter22"),
        ])
        .unwrap();
        assert_eq!(config.admin_credentials(), Some(("me@example.com", "hunter22")));
    }
}
