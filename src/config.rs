//! Runtime settings read from the environment (and a `.env` file when present).

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

/// SMTP relay settings. An empty `host` disables delivery; mails are logged instead.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub sender: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub env: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub server_host: String,
    pub server_port: u16,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub idle_timeout: Duration,
    pub fe_base_url: String,
    pub jwt_secret: String,
    pub jwt_ttl: chrono::Duration,
    pub jwt_refresh_window: chrono::Duration,
    pub cookie_secure: bool,
    pub otp_ttl: chrono::Duration,
    pub smtp: SmtpConfig,
}

impl Config {
    /// Loads `.env` (if any) and reads the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let jwt_secret = get("JWT_SECRET")
            .ok_or_else(|| AppError::Configuration("JWT_SECRET must be set".into()))?;
        let jwt_hours: f64 = parse_or(&get, "JWT_EXPIRATION_DURATION", 2.0)?;
        let jwt_seconds = (jwt_hours * 3600.0).round();
        if !jwt_seconds.is_finite() || jwt_seconds < 1.0 || jwt_seconds > i64::MAX as f64 {
            return Err(AppError::Configuration(
                "JWT_EXPIRATION_DURATION must be a positive number of hours".into(),
            ));
        }
        let jwt_ttl = span(
            "JWT_EXPIRATION_DURATION",
            chrono::Duration::try_seconds(jwt_seconds as i64),
        )?;
        let jwt_refresh_window = span(
            "JWT_REFRESH_WINDOW_HOURS",
            chrono::Duration::try_hours(parse_or(&get, "JWT_REFRESH_WINDOW_HOURS", 168)?),
        )?;
        let otp_minutes: i64 = parse_or(&get, "OTP_TTL_MINUTES", 5)?;
        if otp_minutes < 1 {
            return Err(AppError::Configuration(
                "OTP_TTL_MINUTES must be positive".into(),
            ));
        }
        let otp_ttl = span("OTP_TTL_MINUTES", chrono::Duration::try_minutes(otp_minutes))?;

        Ok(Self {
            env: get("ENV").unwrap_or_else(|| "development".to_string()),
            database_url: database_url(&get)?,
            db_max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 5)?,
            server_host: get("HOST_ADDRESS").unwrap_or_else(|| "127.0.0.1".to_string()),
            server_port: parse_or(&get, "HOST_PORT", 8080)?,
            read_timeout: Duration::from_secs(parse_or(&get, "HOST_READ_TIMEOUT", 15)?),
            write_timeout: Duration::from_secs(parse_or(&get, "HOST_WRITE_TIMEOUT", 15)?),
            idle_timeout: Duration::from_secs(parse_or(&get, "HOST_IDLE_TIMEOUT", 60)?),
            fe_base_url: get("FE_BASE_URL").unwrap_or_else(|| "http://localhost:8080".to_string()),
            jwt_secret,
            jwt_ttl,
            jwt_refresh_window,
            cookie_secure: parse_or(&get, "COOKIE_SECURE", true)?,
            otp_ttl,
            smtp: SmtpConfig {
                host: get("SMTP_HOST").unwrap_or_default(),
                port: parse_or(&get, "SMTP_PORT", 587)?,
                username: get("SMTP_HOST_USER").unwrap_or_default(),
                password: get("SMTP_HOST_PASSWORD").unwrap_or_default(),
                sender: get("CS_EMAIL_ADDRESS")
                    .unwrap_or_else(|| "no-reply@laundry-tracker.local".to_string()),
            },
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Configuration(format!("{} has an invalid value: {}", key, raw))),
        None => Ok(default),
    }
}

/// Accepts a duration only if it can still be added to the current time.
fn span(key: &str, duration: Option<chrono::Duration>) -> Result<chrono::Duration, AppError> {
    duration
        .filter(|d| chrono::Utc::now().checked_add_signed(*d).is_some())
        .ok_or_else(|| AppError::Configuration(format!("{} is out of range", key)))
}

/// `DATABASE_URL` wins; otherwise the URL is assembled from the `POSTGRES_*` parts.
fn database_url<G>(get: &G) -> Result<String, AppError>
where
    G: Fn(&str) -> Option<String>,
{
    if let Some(url) = get("DATABASE_URL") {
        return Ok(url);
    }

    let host = get("POSTGRES_DB_HOST").ok_or_else(|| {
        AppError::Configuration("DATABASE_URL or POSTGRES_DB_HOST must be set".into())
    })?;
    let user = get("POSTGRES_DB_USER").unwrap_or_else(|| "postgres".to_string());
    let password = get("POSTGRES_DB_PASSWORD").unwrap_or_default();
    let name = get("POSTGRES_DB_NAME").unwrap_or_else(|| "laundry".to_string());
    let port = get("POSTGRES_DB_PORT").unwrap_or_else(|| "5432".to_string());
    let ssl_mode = get("POSTGRES_SSL_MODE").unwrap_or_else(|| "prefer".to_string());

    Ok(format!(
        "postgres://{}:{}@{}:{}/{}?sslmode={}",
        user, password, host, port, name, ssl_mode
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.database_url, "postgres://test");
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.env, "development");
        assert_eq!(config.jwt_ttl, chrono::Duration::hours(2));
        assert_eq!(config.otp_ttl, chrono::Duration::minutes(5));
        assert!(config.cookie_secure);
        assert!(config.smtp.host.is_empty());
    }

    #[test]
    fn test_custom_values() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", "secret"),
            ("HOST_PORT", "3000"),
            ("HOST_ADDRESS", "0.0.0.0"),
            ("JWT_EXPIRATION_DURATION", "0.5"),
            ("COOKIE_SECURE", "false"),
        ]))
        .unwrap();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_url(), "http://0.0.0.0:3000");
        assert_eq!(config.jwt_ttl, chrono::Duration::minutes(30));
        assert!(!config.cookie_secure);
    }

    #[test]
    fn test_database_url_from_parts() {
        let config = Config::from_lookup(lookup(&[
            ("JWT_SECRET", "secret"),
            ("POSTGRES_DB_HOST", "db"),
            ("POSTGRES_DB_USER", "app"),
            ("POSTGRES_DB_PASSWORD", "pw"),
            ("POSTGRES_DB_NAME", "laundry"),
            ("POSTGRES_DB_PORT", "6543"),
            ("POSTGRES_SSL_MODE", "disable"),
        ]))
        .unwrap();

        assert_eq!(
            config.database_url,
            "postgres://app:pw@db:6543/laundry?sslmode=disable"
        );
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let result = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://test")]));
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", "secret"),
            ("HOST_PORT", "eighty"),
        ]));
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_unusable_durations_are_rejected() {
        let cases = [
            ("JWT_EXPIRATION_DURATION", "NaN"),
            ("JWT_EXPIRATION_DURATION", "inf"),
            ("JWT_EXPIRATION_DURATION", "-1"),
            ("JWT_EXPIRATION_DURATION", "0.0001"),
            ("JWT_EXPIRATION_DURATION", "1e300"),
            ("JWT_REFRESH_WINDOW_HOURS", "9223372036854775807"),
            ("OTP_TTL_MINUTES", "9223372036854775807"),
            ("OTP_TTL_MINUTES", "100000000000000"),
            ("OTP_TTL_MINUTES", "0"),
        ];

        for (key, value) in cases {
            let result = Config::from_lookup(lookup(&[
                ("DATABASE_URL", "postgres://test"),
                ("JWT_SECRET", "secret"),
                (key, value),
            ]));
            assert!(
                matches!(result, Err(AppError::Configuration(_))),
                "{}={} should be rejected",
                key,
                value
            );
        }
    }
}
