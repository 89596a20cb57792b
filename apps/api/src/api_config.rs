use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use campusguard_core::AppError;
use tracing_subscriber::EnvFilter;

const MIN_BOOTSTRAP_TOKEN_LENGTH: usize = 16;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub database_max_connections: u32,
    pub frontend_url: String,
    pub bootstrap_token: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub session_idle_minutes: i64,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(migrate_only, |name| env::var(name).ok())
    }

    pub fn from_lookup(
        migrate_only: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let database_url = required_non_empty(&lookup, "DATABASE_URL")?;
        let frontend_url =
            lookup("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());
        let bootstrap_token = required_non_empty(&lookup, "AUTH_BOOTSTRAP_TOKEN")?;
        if bootstrap_token.len() < MIN_BOOTSTRAP_TOKEN_LENGTH {
            return Err(AppError::Validation(format!(
                "AUTH_BOOTSTRAP_TOKEN must be at least {MIN_BOOTSTRAP_TOKEN_LENGTH} characters"
            )));
        }

        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = parsed_or(&lookup, "API_PORT", 3001_u16)?;
        let cookie_secure = lookup("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|| "false".to_owned())
            .eq_ignore_ascii_case("true");
        let session_idle_minutes = parsed_or(&lookup, "SESSION_IDLE_MINUTES", 30_i64)?;
        if session_idle_minutes <= 0 {
            return Err(AppError::Validation(
                "SESSION_IDLE_MINUTES must be positive".to_owned(),
            ));
        }
        let database_max_connections = parsed_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10_u32)?;

        Ok(Self {
            migrate_only,
            database_url,
            database_max_connections,
            frontend_url,
            bootstrap_token,
            api_host,
            api_port,
            cookie_secure,
            session_idle_minutes,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_non_empty(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<String, AppError> {
    let value = lookup(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn parsed_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name).filter(|value| !value.trim().is_empty()) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name} '{value}': {error}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use campusguard_core::AppError;

    use super::ApiConfig;

    fn load(values: &[(&str, &str)]) -> Result<ApiConfig, AppError> {
        let values: HashMap<String, String> = values
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        ApiConfig::from_lookup(false, |name| values.get(name).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("DATABASE_URL", "postgres://localhost/campusguard"),
        ("AUTH_BOOTSTRAP_TOKEN", "0123456789abcdef"),
    ];

    #[test]
    fn defaults_apply_when_optional_values_are_missing() {
        let config = load(&REQUIRED).unwrap_or_else(|_| unreachable!());

        assert_eq!(config.frontend_url, "http://localhost:3000");
        assert_eq!(config.api_port, 3001);
        assert_eq!(config.session_idle_minutes, 30);
        assert_eq!(config.database_max_connections, 10);
        assert!(!config.cookie_secure);
        assert!(config.socket_address().is_ok());
    }

    #[test]
    fn missing_database_url_is_rejected() {
        let result = load(&[("AUTH_BOOTSTRAP_TOKEN", "0123456789abcdef")]);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn short_bootstrap_token_is_rejected() {
        let result = load(&[
            ("DATABASE_URL", "postgres://localhost/campusguard"),
            ("AUTH_BOOTSTRAP_TOKEN", "short"),
        ]);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let mut values = REQUIRED.to_vec();
        values.push(("API_PORT", "seventy"));
        assert!(matches!(load(&values), Err(AppError::Validation(_))));

        let mut values = REQUIRED.to_vec();
        values.push(("SESSION_IDLE_MINUTES", "0"));
        assert!(matches!(load(&values), Err(AppError::Validation(_))));
    }

    #[test]
    fn overrides_are_read() {
        let mut values = REQUIRED.to_vec();
        values.extend([
            ("API_HOST", "0.0.0.0"),
            ("API_PORT", "8080"),
            ("SESSION_COOKIE_SECURE", "TRUE"),
        ]);
        let config = load(&values).unwrap_or_else(|_| unreachable!());

        assert_eq!(config.api_port, 8080);
        assert!(config.cookie_secure);
        assert_eq!(
            config.socket_address().map(|address| address.to_string()).ok(),
            Some("0.0.0.0:8080".to_owned())
        );
    }
}
