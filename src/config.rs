//! Process configuration read from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::dispatch::{DEFAULT_SCRIPT_PATH, DEFAULT_STATUS_CONTEXT, DispatchConfig};

/// Default listen address.
pub const DEFAULT_ADDR: &str = "0.0.0.0:7744";

pub const ENV_ADDR: &str = "BUILD_GATEWAY_ADDR";
pub const ENV_PROJECTS_FILE: &str = "BUILD_GATEWAY_PROJECTS_FILE";
pub const ENV_SCRIPT_PATH: &str = "BUILD_GATEWAY_SCRIPT_PATH";
pub const ENV_STATUS_CONTEXT: &str = "BUILD_GATEWAY_STATUS_CONTEXT";
pub const ENV_STATUS_TARGET_URL: &str = "BUILD_GATEWAY_STATUS_TARGET_URL";
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";
pub const ENV_GITHUB_API_URL: &str = "GITHUB_API_URL";

/// Errors from reading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Gateway configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Address the HTTP server binds to.
    pub addr: SocketAddr,

    /// JSON file of projects seeding the in-memory store.
    pub projects_file: Option<PathBuf>,

    pub dispatch: DispatchConfig,

    /// Fallback API token for projects without one.
    pub github_token: Option<String>,

    /// API base URL override, e.g. for GitHub Enterprise.
    pub github_api_url: Option<String>,
}

impl GatewayConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let addr_value = get(ENV_ADDR).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_value
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: ENV_ADDR,
                value: addr_value.clone(),
                reason: e.to_string(),
            })?;

        Ok(GatewayConfig {
            addr,
            projects_file: get(ENV_PROJECTS_FILE).map(PathBuf::from),
            dispatch: DispatchConfig {
                script_path: get(ENV_SCRIPT_PATH)
                    .unwrap_or_else(|| DEFAULT_SCRIPT_PATH.to_string()),
                status_context: get(ENV_STATUS_CONTEXT)
                    .unwrap_or_else(|| DEFAULT_STATUS_CONTEXT.to_string()),
                status_target_url: get(ENV_STATUS_TARGET_URL),
            },
            github_token: get(ENV_GITHUB_TOKEN),
            github_api_url: get(ENV_GITHUB_API_URL),
        })
    }
}

// The token stays out of logs.
impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("addr", &self.addr)
            .field("projects_file", &self.projects_file)
            .field("dispatch", &self.dispatch)
            .field("has_github_token", &self.github_token.is_some())
            .field("github_api_url", &self.github_api_url)
            .finish()
    }
}
