use std::{fmt::Display, time::Duration};

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    distance_time::DistanceTime,
    error::RoutingError,
    http::{self, BadRequestBody},
    point::Point,
    routing_provider::RoutingProvider,
};

pub const OSRM_PUBLIC_URL: &str = "http://router.project-osrm.org";
pub const OSRM_ROUTE_API_PATH: &str = "/route/v1/driving/";

const PROVIDER: &str = "osrm";

/// Whether to search for alternative routes, `true`, `false` or a maximum count.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Alternatives {
    Toggle(bool),
    Count(u32),
}

impl Default for Alternatives {
    fn default() -> Self {
        Alternatives::Toggle(false)
    }
}

impl Display for Alternatives {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Alternatives::Toggle(enabled) => write!(f, "{enabled}"),
            Alternatives::Count(count) => write!(f, "{count}"),
        }
    }
}

/// Format of the returned route geometry.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Geometries {
    #[default]
    Polyline,
    Polyline6,
    GeoJson,
}

impl Display for Geometries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Geometries::Polyline => "polyline",
                Geometries::Polyline6 => "polyline6",
                Geometries::GeoJson => "geojson",
            }
        )
    }
}

/// Simplification level of the overview geometry.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Overview {
    Full,
    /// Simplified according to the highest zoom level it can still be displayed on
    #[default]
    Simplified,
    #[serde(rename = "false")]
    Disabled,
}

impl Display for Overview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Overview::Full => "full",
                Overview::Simplified => "simplified",
                Overview::Disabled => "false",
            }
        )
    }
}

/// Forces the route to keep going straight at waypoints, constraining u-turns.
/// `Default` leaves the decision to the server profile.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum ContinueStraight {
    #[default]
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "true")]
    Enabled,
    #[serde(rename = "false")]
    Disabled,
}

impl Display for ContinueStraight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ContinueStraight::Default => "default",
                ContinueStraight::Enabled => "true",
                ContinueStraight::Disabled => "false",
            }
        )
    }
}

#[derive(Deserialize, Serialize, JsonSchema, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct OsrmOptions {
    pub alternatives: Alternatives,
    /// Return route steps for each leg
    pub steps: bool,
    pub geometries: Geometries,
    pub overview: Overview,
    pub continue_straight: ContinueStraight,
}

impl OsrmOptions {
    fn query(&self) -> String {
        format!(
            "?alternatives={}&steps={}&geometries={}&overview={}&continue_straight={}",
            self.alternatives, self.steps, self.geometries, self.overview, self.continue_straight
        )
    }
}

/// How the top level `code` of an OSRM response is treated.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OsrmCodePolicy {
    /// The code is not inspected, the first route is used whenever there is one.
    #[default]
    Ignore,
    /// Any code other than `Ok` is a [`RoutingError::ProviderStatus`].
    RequireOk,
}

pub struct OsrmClientParams {
    pub osrm_url: String,
    pub options: OsrmOptions,
    pub code_policy: OsrmCodePolicy,
    pub timeout: Duration,
}

impl Default for OsrmClientParams {
    fn default() -> Self {
        Self {
            osrm_url: OSRM_PUBLIC_URL.to_string(),
            options: OsrmOptions::default(),
            code_policy: OsrmCodePolicy::default(),
            timeout: http::DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Deserialize)]
struct OsrmRoute {
    /// Meters
    distance: f64,
    /// Seconds
    duration: f64,
}

#[derive(Deserialize)]
struct OsrmRouteResponse {
    #[serde(default)]
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

impl OsrmRouteResponse {
    fn into_distance_time(self, code_policy: OsrmCodePolicy) -> Result<DistanceTime, RoutingError> {
        if code_policy == OsrmCodePolicy::RequireOk && self.code != "Ok" {
            return Err(RoutingError::ProviderStatus {
                provider: PROVIDER,
                code: self.code,
                message: self.message,
            });
        }

        let route = self
            .routes
            .into_iter()
            .next()
            .ok_or(RoutingError::NoRoute { provider: PROVIDER })?;

        DistanceTime::from_provider(PROVIDER, route.distance, route.duration)
    }
}

pub struct OsrmClient {
    route_url: String,
    query: String,
    code_policy: OsrmCodePolicy,
    timeout: Duration,
    client: reqwest::Client,
}

impl OsrmClient {
    pub fn new(params: OsrmClientParams) -> Self {
        let mut route_url = params.osrm_url.trim_end_matches('/').to_string();
        route_url.push_str(OSRM_ROUTE_API_PATH);

        Self {
            route_url,
            query: params.options.query(),
            code_policy: params.code_policy,
            timeout: params.timeout,
            client: reqwest::Client::new(),
        }
    }

    /// Coordinates go in the path as `lon,lat`.
    pub fn route_url(&self, from: &Point, to: &Point) -> String {
        format!(
            "{}{};{}{}",
            self.route_url,
            from.lon_lat(),
            to.lon_lat(),
            self.query
        )
    }
}

impl Default for OsrmClient {
    fn default() -> Self {
        Self::new(OsrmClientParams::default())
    }
}

#[async_trait]
impl RoutingProvider for OsrmClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn distance_time(&self, from: Point, to: Point) -> Result<DistanceTime, RoutingError> {
        debug!("OSRM: requesting route {} -> {}", from, to);

        let url = self.route_url(&from, &to);
        let response: OsrmRouteResponse = http::get_json(
            &self.client,
            PROVIDER,
            &url,
            self.timeout,
            BadRequestBody::Decode,
        )
        .await?;

        response.into_distance_time(self.code_policy)
    }
}
