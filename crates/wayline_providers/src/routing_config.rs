use std::{io::Read, path::Path, time::Duration};

use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    google_maps_api::{GOOGLE_MAPS_API_URL, GoogleMapsClient, GoogleMapsClientParams},
    graphhopper_api::{
        GRAPHHOPPER_API_URL, GraphHopperOptions, GraphHopperRouteClient,
        GraphHopperRouteClientParams,
    },
    http,
    osrm_api::{OSRM_PUBLIC_URL, OsrmClient, OsrmClientParams, OsrmCodePolicy, OsrmOptions},
    routing_provider::RoutingProvider,
};

pub const GRAPHHOPPER_API_KEY_ENV_VAR: &str = "GRAPHHOPPER_API_KEY";
pub const GOOGLE_MAPS_API_KEY_ENV_VAR: &str = "GOOGLE_MAPS_API_KEY";
pub const OSRM_URL_ENV_VAR: &str = "OSRM_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing API key for {provider}, set it in the configuration or in {env_var}")]
    MissingApiKey {
        provider: &'static str,
        env_var: &'static str,
    },

    #[error("Unable to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// The routing backend and its request defaults.
///
/// Unset api keys and urls are looked up in the environment when the provider is built.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum RoutingProviderConfig {
    /// http://project-osrm.org/docs/v5.24.0/api/#route-service
    Osrm {
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        options: OsrmOptions,
        #[serde(default)]
        code_policy: OsrmCodePolicy,
    },
    /// https://docs.graphhopper.com/openapi/routing/getroute
    GraphHopper {
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        options: GraphHopperOptions,
    },
    /// https://developers.google.com/maps/documentation/distance-matrix
    GoogleMaps {
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default)]
        base_url: Option<String>,
    },
}

impl RoutingProviderConfig {
    pub fn osrm() -> Self {
        RoutingProviderConfig::Osrm {
            url: None,
            options: OsrmOptions::default(),
            code_policy: OsrmCodePolicy::default(),
        }
    }

    pub fn graphhopper() -> Self {
        RoutingProviderConfig::GraphHopper {
            api_key: None,
            base_url: None,
            options: GraphHopperOptions::default(),
        }
    }

    pub fn google_maps() -> Self {
        RoutingProviderConfig::GoogleMaps {
            api_key: None,
            base_url: None,
        }
    }
}

fn default_timeout_ms() -> u64 {
    http::DEFAULT_TIMEOUT.as_millis() as u64
}

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(rename = "RoutingConfig")]
pub struct RoutingConfig {
    pub provider: RoutingProviderConfig,

    /// Per request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl RoutingConfig {
    pub fn new(provider: RoutingProviderConfig) -> Self {
        Self {
            provider,
            timeout_ms: default_timeout_ms(),
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Builds the configured provider, reading missing keys and urls from the process environment.
    pub fn build(&self) -> Result<Box<dyn RoutingProvider>, ConfigError> {
        self.build_with_env(|name| std::env::var(name).ok())
    }

    pub fn build_with_env<F>(&self, env: F) -> Result<Box<dyn RoutingProvider>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout = self.timeout();

        let provider: Box<dyn RoutingProvider> = match &self.provider {
            RoutingProviderConfig::Osrm {
                url,
                options,
                code_policy,
            } => Box::new(OsrmClient::new(OsrmClientParams {
                osrm_url: url
                    .clone()
                    .or_else(|| env(OSRM_URL_ENV_VAR))
                    .unwrap_or_else(|| OSRM_PUBLIC_URL.to_string()),
                options: options.clone(),
                code_policy: *code_policy,
                timeout,
            })),
            RoutingProviderConfig::GraphHopper {
                api_key,
                base_url,
                options,
            } => Box::new(GraphHopperRouteClient::new(GraphHopperRouteClientParams {
                api_key: resolve_api_key(
                    api_key,
                    "graphhopper",
                    GRAPHHOPPER_API_KEY_ENV_VAR,
                    &env,
                )?,
                base_url: base_url
                    .clone()
                    .unwrap_or_else(|| GRAPHHOPPER_API_URL.to_string()),
                options: options.clone(),
                timeout,
            })),
            RoutingProviderConfig::GoogleMaps { api_key, base_url } => {
                Box::new(GoogleMapsClient::new(GoogleMapsClientParams {
                    api_key: resolve_api_key(
                        api_key,
                        "google_maps",
                        GOOGLE_MAPS_API_KEY_ENV_VAR,
                        &env,
                    )?,
                    base_url: base_url
                        .clone()
                        .unwrap_or_else(|| GOOGLE_MAPS_API_URL.to_string()),
                    timeout,
                }))
            }
        };

        Ok(provider)
    }
}

fn resolve_api_key<F>(
    api_key: &Option<String>,
    provider: &'static str,
    env_var: &'static str,
    env: &F,
) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    api_key
        .clone()
        .or_else(|| env(env_var))
        .filter(|key| !key.trim().is_empty())
        .ok_or(ConfigError::MissingApiKey { provider, env_var })
}

pub fn generate_json_schema() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&schema_for!(RoutingConfig))
}
