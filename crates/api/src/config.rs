use photopro_notifications::scheduler::DEFAULT_INTERVAL;

use crate::auth::jwt::JwtConfig;

/// Shared secrets used to authenticate inbound vendor and scheduler calls.
#[derive(Debug, Clone)]
pub struct IntegrationSecrets {
    /// HMAC key for `x-payment-signature`.
    pub payment_webhook_secret: String,
    /// HMAC key for `x-identity-signature`.
    pub identity_webhook_secret: String,
    /// Bearer token expected on `/cron/*` endpoints.
    pub cron_secret: String,
}

/// Server configuration loaded from environment variables.
///
/// All non-secret fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Externally reachable base URL used to build feed subscription links.
    pub public_base_url: String,
    /// Web app base URL; when set, feed events link to `{app_url}/scheduling/{id}`.
    pub app_url: Option<String>,
    /// Seconds between background reminder passes (default: `900`).
    pub reminder_interval_secs: u64,
    /// Bearer token validation settings.
    pub jwt: JwtConfig,
    pub secrets: IntegrationSecrets,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                    |
    /// | `PUBLIC_BASE_URL`         | `http://localhost:3000` |
    /// | `APP_URL`                 | unset                   |
    /// | `REMINDER_INTERVAL_SECS`  | `900`                   |
    /// | `PAYMENT_WEBHOOK_SECRET`  | **required**            |
    /// | `IDENTITY_WEBHOOK_SECRET` | **required**            |
    /// | `CRON_SECRET`             | **required**            |
    ///
    /// # Panics
    ///
    /// Panics if a required secret is missing or a numeric value does not parse.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let public_base_url = trim_base_url(
            &std::env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".into()),
        );

        let app_url = std::env::var("APP_URL")
            .ok()
            .map(|url| trim_base_url(&url))
            .filter(|url| !url.is_empty());

        let reminder_interval_secs: u64 = std::env::var("REMINDER_INTERVAL_SECS")
            .ok()
            .map(|v| v.parse().expect("REMINDER_INTERVAL_SECS must be a valid u64"))
            .unwrap_or(DEFAULT_INTERVAL.as_secs());
        assert!(reminder_interval_secs > 0, "REMINDER_INTERVAL_SECS must be positive");

        let secrets = IntegrationSecrets {
            payment_webhook_secret: required_secret("PAYMENT_WEBHOOK_SECRET"),
            identity_webhook_secret: required_secret("IDENTITY_WEBHOOK_SECRET"),
            cron_secret: required_secret("CRON_SECRET"),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            public_base_url,
            app_url,
            reminder_interval_secs,
            jwt: JwtConfig::from_env(),
            secrets,
        }
    }
}

fn required_secret(name: &str) -> String {
    let value = std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set in the environment"));
    assert!(!value.is_empty(), "{name} must not be empty");
    value
}

/// Split a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Strip surrounding whitespace and trailing slashes from a base URL.
pub fn trim_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}
