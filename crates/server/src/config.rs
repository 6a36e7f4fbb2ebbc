use std::env;
use std::time::Duration;

use annotator::config::AnalysisConfig;
use annotator::error::ConfigError;

use crate::session::DEFAULT_SESSION_TTL;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub app_env: String,
    /// Idle time before a browser session is dropped
    pub session_ttl: Duration,
    pub analysis: AnalysisConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var("PORT") {
            Ok(v) => v
                .parse()
                .map_err(|_| ConfigError("PORT must be a port number"))?,
            Err(_) => 8000,
        };

        let session_ttl = match env::var("SESSION_TTL_SECS") {
            Ok(v) => Duration::from_secs(
                v.parse()
                    .map_err(|_| ConfigError("SESSION_TTL_SECS must be a number of seconds"))?,
            ),
            Err(_) => DEFAULT_SESSION_TTL,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "production".to_string()),
            session_ttl,
            analysis: AnalysisConfig::from_env()?,
        })
    }

    pub fn is_development(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("development")
    }

    /// Default log filter when RUST_LOG is unset
    pub fn default_log_filter(&self) -> &'static str {
        if self.is_development() {
            "debug"
        } else {
            "info"
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
