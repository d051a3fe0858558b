use std::{fmt::Display, time::Duration};

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    distance_time::DistanceTime,
    error::RoutingError,
    http::{self, BadRequestBody},
    point::Point,
    routing_provider::RoutingProvider,
};

pub const GRAPHHOPPER_API_URL: &str = "https://graphhopper.com/api/1";
pub const GRAPHHOPPER_ROUTE_API_PATH: &str = "/route";

const PROVIDER: &str = "graphhopper";

/// https://docs.graphhopper.com/openapi/map-data-and-routing-profiles/openstreetmap/standard-routing-profiles
#[derive(Deserialize, Serialize, JsonSchema, Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GraphHopperVehicle {
    #[default]
    Car,
    Bike,
    Foot,
    /// Van or small truck such as a Mercedes Sprinter or Ford Transit
    #[serde(alias = "van")]
    SmallTruck,
    Truck,
}

impl Display for GraphHopperVehicle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                GraphHopperVehicle::Car => "car",
                GraphHopperVehicle::Bike => "bike",
                GraphHopperVehicle::Foot => "foot",
                GraphHopperVehicle::SmallTruck => "small_truck",
                GraphHopperVehicle::Truck => "truck",
            }
        )
    }
}

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GraphHopperOptions {
    /// Language of the turn instructions
    pub locale: String,
    pub instructions: bool,
    pub vehicle: GraphHopperVehicle,
    /// Only honored by GraphHopper when `points_encoded` is false
    pub elevation: bool,
    pub points_encoded: bool,
    /// Compute the route geometry, not only distance and time
    pub calc_points: bool,
}

impl Default for GraphHopperOptions {
    fn default() -> Self {
        Self {
            locale: String::from("en"),
            instructions: false,
            vehicle: GraphHopperVehicle::Car,
            elevation: false,
            points_encoded: true,
            calc_points: true,
        }
    }
}

impl GraphHopperOptions {
    fn query(&self, api_key: &str) -> String {
        format!(
            "&locale={}&instructions={}&vehicle={}&elevation={}&points_encoded={}&calc_points={}&key={}",
            self.locale,
            self.instructions,
            self.vehicle,
            self.elevation,
            self.points_encoded,
            self.calc_points,
            api_key
        )
    }
}

pub struct GraphHopperRouteClientParams {
    pub api_key: String,
    pub base_url: String,
    pub options: GraphHopperOptions,
    pub timeout: Duration,
}

impl GraphHopperRouteClientParams {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: GRAPHHOPPER_API_URL.to_string(),
            options: GraphHopperOptions::default(),
            timeout: http::DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Deserialize)]
struct GraphHopperPath {
    /// Meters
    distance: f64,
    /// Milliseconds
    time: u64,
}

#[derive(Deserialize)]
struct GraphHopperRouteResponse {
    #[serde(default)]
    paths: Vec<GraphHopperPath>,
    /// Set instead of `paths` when routing fails
    message: Option<String>,
}

impl GraphHopperRouteResponse {
    fn into_distance_time(self) -> Result<DistanceTime, RoutingError> {
        let Some(path) = self.paths.into_iter().next() else {
            if let Some(message) = self.message {
                debug!("GraphHopperApi: no route: {}", message);
            }
            return Err(RoutingError::NoRoute { provider: PROVIDER });
        };

        // Whole seconds, the remaining milliseconds are truncated
        let seconds = (path.time / 1000) as f64;

        DistanceTime::from_provider(PROVIDER, path.distance, seconds)
    }
}

pub struct GraphHopperRouteClient {
    route_url: String,
    query: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl GraphHopperRouteClient {
    pub fn new(params: GraphHopperRouteClientParams) -> Self {
        let options = &params.options;
        if options.elevation && options.points_encoded {
            warn!("GraphHopperApi: elevation is ignored unless points_encoded is false");
        }

        let mut route_url = params.base_url.trim_end_matches('/').to_string();
        route_url.push_str(GRAPHHOPPER_ROUTE_API_PATH);

        Self {
            route_url,
            query: options.query(&params.api_key),
            timeout: params.timeout,
            client: reqwest::Client::new(),
        }
    }

    /// Points go in the query as `lat,lon`.
    pub fn route_url(&self, from: &Point, to: &Point) -> String {
        format!(
            "{}?point={}&point={}{}",
            self.route_url,
            from.lat_lon(),
            to.lat_lon(),
            self.query
        )
    }
}

#[async_trait]
impl RoutingProvider for GraphHopperRouteClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn distance_time(&self, from: Point, to: Point) -> Result<DistanceTime, RoutingError> {
        debug!("GraphHopperApi: requesting route {} -> {}", from, to);

        let url = self.route_url(&from, &to);
        let response: GraphHopperRouteResponse = http::get_json(
            &self.client,
            PROVIDER,
            &url,
            self.timeout,
            BadRequestBody::Decode,
        )
        .await?;

        response.into_distance_time()
    }
}
