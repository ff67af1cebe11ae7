use std::env;
use std::str::FromStr;

use gridrights_core::AppError;
use gridrights_domain::RightsFlag;
use url::Url;

/// Upstream provider wiring selected at startup.
#[derive(Debug, Clone)]
pub enum UpstreamProviderConfig {
    /// Seeded in-memory adapters for development.
    Memory,
    /// HTTP adapters against the product backend.
    Http {
        /// Base URL of the upstream rights API.
        base_url: String,
        /// Per-request timeout in seconds.
        timeout_seconds: u64,
    },
}

/// Runtime configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_host: String,
    pub api_port: u16,
    pub frontend_url: String,
    pub upstream: UpstreamProviderConfig,
    /// `None` grants every screen action (development default).
    pub operator_grants: Option<Vec<(i64, i64, RightsFlag)>>,
}

impl ApiConfig {
    /// Loads configuration, validating the upstream wiring.
    pub fn load() -> Result<Self, AppError> {
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

        let upstream = match env::var("UPSTREAM_PROVIDER")
            .unwrap_or_else(|_| "memory".to_owned())
            .as_str()
        {
            "memory" => UpstreamProviderConfig::Memory,
            "http" => {
                let base_url = required_env("UPSTREAM_BASE_URL")?;
                Url::parse(&base_url).map_err(|error| {
                    AppError::Validation(format!("invalid UPSTREAM_BASE_URL: {error}"))
                })?;
                let timeout_seconds = env::var("UPSTREAM_TIMEOUT_SECONDS")
                    .ok()
                    .and_then(|value| value.parse::<u64>().ok())
                    .unwrap_or(30);
                UpstreamProviderConfig::Http {
                    base_url,
                    timeout_seconds,
                }
            }
            other => {
                return Err(AppError::Validation(format!(
                    "UPSTREAM_PROVIDER must be either 'memory' or 'http', got '{other}'"
                )));
            }
        };

        let operator_grants = env::var("OPERATOR_GRANTS")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(|value| parse_grants(&value))
            .transpose()?;

        Ok(Self {
            api_host,
            api_port,
            frontend_url,
            upstream,
            operator_grants,
        })
    }
}

/// Parses a `module:transaction:flag` comma-separated grant list.
fn parse_grants(value: &str) -> Result<Vec<(i64, i64, RightsFlag)>, AppError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let mut parts = entry.split(':');
            let (Some(module), Some(transaction), Some(flag), None) =
                (parts.next(), parts.next(), parts.next(), parts.next())
            else {
                return Err(AppError::Validation(format!(
                    "OPERATOR_GRANTS entry '{entry}' must be module:transaction:flag"
                )));
            };

            let module_id = module.parse::<i64>().map_err(|error| {
                AppError::Validation(format!("invalid module id in '{entry}': {error}"))
            })?;
            let transaction_id = transaction.parse::<i64>().map_err(|error| {
                AppError::Validation(format!("invalid transaction id in '{entry}': {error}"))
            })?;
            let flag = RightsFlag::from_str(flag)?;

            Ok((module_id, transaction_id, flag))
        })
        .collect()
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}
