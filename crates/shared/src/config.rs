//! Application configuration management.

use serde::Deserialize;

use crate::jwt;

/// Shortest signing secret accepted at startup.
const MIN_SECRET_LEN: usize = 32;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// JWT configuration.
    #[serde(default)]
    pub jwt: JwtConfig,
    /// Student id hashing.
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Portal endpoints and login behaviour.
    #[serde(default)]
    pub portal: PortalConfig,
    /// Periodic cleanup.
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://data/easyjw.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    10
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key for signing tokens. Required.
    #[serde(default)]
    pub secret: String,
    /// Access token lifetime in minutes.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_minutes: i64,
    /// Refresh token lifetime in days.
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry_days: i64,
    /// Check the caller IP against the IP a token was issued to.
    #[serde(default = "default_true")]
    pub bind_client_ip: bool,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            access_token_expiry_minutes: default_access_token_expiry(),
            refresh_token_expiry_days: default_refresh_token_expiry(),
            bind_client_ip: true,
        }
    }
}

fn default_access_token_expiry() -> i64 {
    120
}

fn default_refresh_token_expiry() -> i64 {
    7
}

fn default_true() -> bool {
    true
}

/// Student id hashing configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityConfig {
    /// Secret salt appended before hashing. Must stay stable.
    #[serde(default)]
    pub salt: String,
}

/// Portal configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    /// Portal origin, e.g. `http://zhjw.qfnu.edu.cn`.
    #[serde(default = "default_portal_base_url")]
    pub base_url: String,
    /// Timeout for every outbound call, in seconds.
    #[serde(default = "default_portal_timeout")]
    pub timeout_secs: u64,
    /// Login attempts before giving up.
    #[serde(default = "default_max_login_retries")]
    pub max_login_retries: u32,
    /// OCR service endpoint used to read captchas.
    #[serde(default = "default_ocr_url")]
    pub ocr_url: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: default_portal_base_url(),
            timeout_secs: default_portal_timeout(),
            max_login_retries: default_max_login_retries(),
            ocr_url: default_ocr_url(),
        }
    }
}

fn default_portal_base_url() -> String {
    "http://zhjw.qfnu.edu.cn".to_string()
}

fn default_portal_timeout() -> u64 {
    15
}

fn default_max_login_retries() -> u32 {
    3
}

fn default_ocr_url() -> String {
    "http://127.0.0.1:9898/ocr".to_string()
}

/// Maintenance configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MaintenanceConfig {
    /// How often the sweeper runs, in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
    /// Portal sessions idle longer than this are cleared.
    #[serde(default = "default_session_max_idle")]
    pub session_max_idle_hours: i64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval(),
            session_max_idle_hours: default_session_max_idle(),
        }
    }
}

fn default_sweep_interval() -> u64 {
    1800
}

fn default_session_max_idle() -> i64 {
    2
}

impl AppConfig {
    /// Loads configuration from environment and config files, then validates it.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or fails validation.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("EASYJW")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations that would run with guessable secrets.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Message` describing the first problem found.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.jwt.secret.trim().len() < MIN_SECRET_LEN {
            return Err(config::ConfigError::Message(format!(
                "jwt.secret must be set and at least {MIN_SECRET_LEN} characters"
            )));
        }
        if self.identity.salt.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "identity.salt must be set".to_string(),
            ));
        }
        if self.jwt.access_token_expiry_minutes <= 0 || self.jwt.refresh_token_expiry_days <= 0 {
            return Err(config::ConfigError::Message(
                "token lifetimes must be positive".to_string(),
            ));
        }
        if self.portal.max_login_retries == 0 {
            return Err(config::ConfigError::Message(
                "portal.max_login_retries must be at least 1".to_string(),
            ));
        }
        if self.maintenance.sweep_interval_secs == 0 || self.maintenance.session_max_idle_hours <= 0 {
            return Err(config::ConfigError::Message(
                "maintenance interval and idle window must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the token service configuration.
    #[must_use]
    pub fn jwt_config(&self) -> jwt::JwtConfig {
        jwt::JwtConfig {
            secret: self.jwt.secret.clone(),
            access_token_expires_minutes: self.jwt.access_token_expiry_minutes,
            refresh_token_expires_days: self.jwt.refresh_token_expiry_days,
            bind_client_ip: self.jwt.bind_client_ip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AppConfig {
        let mut config = AppConfig::default();
        config.jwt.secret = "0123456789abcdef0123456789abcdef".to_string();
        config.identity.salt = "pepper".to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.portal.max_login_retries, 3);
        assert_eq!(config.jwt.access_token_expiry_minutes, 120);
        assert!(config.jwt.bind_client_ip);
    }

    #[test]
    fn test_missing_secret_fails_fast() {
        let mut config = valid();
        config.jwt.secret = String::new();
        assert!(config.validate().is_err());

        config.jwt.secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_salt_fails_fast() {
        let mut config = valid();
        config.identity.salt = "   ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid().validate().is_ok());
        assert_eq!(valid().jwt_config().access_token_expires_minutes, 120);
    }

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("EASYJW__JWT__SECRET", Some("env-secret-env-secret-env-secret-00")),
                ("EASYJW__JWT__ACCESS_TOKEN_EXPIRY_MINUTES", Some("30")),
                ("EASYJW__IDENTITY__SALT", Some("env-salt")),
                ("EASYJW__PORTAL__MAX_LOGIN_RETRIES", Some("5")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.jwt.access_token_expiry_minutes, 30);
                assert_eq!(config.identity.salt, "env-salt");
                assert_eq!(config.portal.max_login_retries, 5);
            },
        );
    }

    #[test]
    fn test_load_without_secret_is_rejected() {
        temp_env::with_vars(
            [
                ("EASYJW__JWT__SECRET", None::<&str>),
                ("EASYJW__IDENTITY__SALT", Some("env-salt")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
