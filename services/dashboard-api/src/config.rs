//! Service configuration.

use anyhow::{anyhow, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use bundle_store::CachePolicy;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8090";
pub const DEFAULT_DATA_ROOT: &str = "public/data";

/// Deployment mode. Production reuses resolved bundles; development reads
/// from disk on every request so edits show up immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployMode {
    #[value(alias = "prod")]
    Production,
    #[default]
    #[value(alias = "dev")]
    Development,
}

impl DeployMode {
    pub fn cache_policy(&self) -> CachePolicy {
        match self {
            DeployMode::Production => CachePolicy::Enabled,
            DeployMode::Development => CachePolicy::Disabled,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeployMode::Production => "production",
            DeployMode::Development => "development",
        }
    }
}

impl FromStr for DeployMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(DeployMode::Production),
            "development" | "dev" => Ok(DeployMode::Development),
            other => Err(anyhow!("unknown deploy mode '{}'", other)),
        }
    }
}

impl fmt::Display for DeployMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings the request path depends on.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Root of the published data tree.
    pub data_root: PathBuf,
    pub mode: DeployMode,
}

impl ServiceConfig {
    pub fn new(data_root: impl Into<PathBuf>, mode: DeployMode) -> Self {
        Self {
            data_root: data_root.into(),
            mode,
        }
    }

    /// Read `DASHBOARD_DATA_ROOT` and `DASHBOARD_MODE`, falling back to
    /// defaults when unset.
    pub fn from_env() -> Result<Self> {
        let data_root = std::env::var("DASHBOARD_DATA_ROOT")
            .unwrap_or_else(|_| DEFAULT_DATA_ROOT.to_string());
        let mode = match std::env::var("DASHBOARD_MODE") {
            Ok(value) => value.parse()?,
            Err(_) => DeployMode::default(),
        };
        Ok(Self::new(data_root, mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_aliases() {
        assert_eq!("prod".parse::<DeployMode>().unwrap(), DeployMode::Production);
        assert_eq!("Development".parse::<DeployMode>().unwrap(), DeployMode::Development);
        assert!("staging".parse::<DeployMode>().is_err());
    }

    #[test]
    fn test_mode_cache_policy() {
        assert_eq!(DeployMode::Production.cache_policy(), CachePolicy::Enabled);
        assert_eq!(DeployMode::default().cache_policy(), CachePolicy::Disabled);
    }

    #[test]
    fn test_from_env() {
        std::env::set_var("DASHBOARD_DATA_ROOT", "/srv/avalanche/data");
        std::env::set_var("DASHBOARD_MODE", "prod");
        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.data_root, PathBuf::from("/srv/avalanche/data"));
        assert_eq!(config.mode, DeployMode::Production);

        std::env::set_var("DASHBOARD_MODE", "staging");
        assert!(ServiceConfig::from_env().is_err());

        std::env::remove_var("DASHBOARD_DATA_ROOT");
        std::env::remove_var("DASHBOARD_MODE");
        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.data_root, PathBuf::from(DEFAULT_DATA_ROOT));
        assert_eq!(config.mode, DeployMode::Development);
    }

    #[test]
    fn test_clap_value_aliases() {
        let parsed = <DeployMode as ValueEnum>::from_str("dev", true).unwrap();
        assert_eq!(parsed, DeployMode::Development);
    }
}
