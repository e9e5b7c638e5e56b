use std::env;
use std::time::Duration;

/// Runtime settings, read once at startup from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the REST backend, without the `/api` suffix.
    pub api_url: String,
    pub host: String,
    pub port: u16,
    /// Mark credential cookies `Secure`. Needed once served over https.
    pub secure_cookies: bool,
    /// Sessions untouched for this long are dropped from memory.
    pub session_idle: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            secure_cookies: false,
            session_idle: Duration::from_secs(30 * 60),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_url = env::var("CLUBACTIV_API_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_url);
        let host = env::var("HOST").unwrap_or(defaults.host);
        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.port);
        let secure_cookies = env::var("COOKIE_SECURE")
            .ok()
            .map(|v| parse_flag(&v))
            .unwrap_or(defaults.secure_cookies);
        let session_idle = env::var("SESSION_IDLE_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.session_idle);

        Self {
            api_url,
            host,
            port,
            secure_cookies,
            session_idle,
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
