use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::{
    distance_time::DistanceTime,
    error::RoutingError,
    http::{self, BadRequestBody},
    point::Point,
    routing_provider::RoutingProvider,
};

pub const GOOGLE_MAPS_API_URL: &str = "https://maps.googleapis.com/maps/api";
pub const GOOGLE_MAPS_DISTANCE_MATRIX_API_PATH: &str = "/distancematrix/json";

const PROVIDER: &str = "google_maps";
const STATUS_OK: &str = "OK";

pub struct GoogleMapsClientParams {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GoogleMapsClientParams {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: GOOGLE_MAPS_API_URL.to_string(),
            timeout: http::DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Deserialize, Default)]
struct Field {
    #[serde(default)]
    value: f64,
}

/// Distance and durations for one origin-destination pair.
#[derive(Deserialize)]
struct Element {
    #[serde(default)]
    status: String,
    /// Meters
    #[serde(default)]
    distance: Field,
    /// Seconds
    #[serde(default)]
    duration: Field,
    /// Seconds, only present when a departure time is requested
    #[serde(default)]
    duration_in_traffic: Field,
}

#[derive(Deserialize)]
struct Row {
    #[serde(default)]
    elements: Vec<Element>,
}

#[derive(Deserialize)]
struct DistanceMatrixResponse {
    status: Option<String>,
    error_message: Option<String>,
    #[serde(default)]
    rows: Vec<Row>,
}

impl DistanceMatrixResponse {
    fn into_distance_time(self) -> Result<DistanceTime, RoutingError> {
        let top_level_status = self.status.filter(|status| status != STATUS_OK);
        let message = self.error_message;

        let element = self
            .rows
            .into_iter()
            .next()
            .and_then(|row| row.elements.into_iter().next());

        let Some(element) = element else {
            return Err(RoutingError::DistanceUnavailable {
                status: top_level_status,
                message,
            });
        };

        if element.status != STATUS_OK {
            let status = Some(element.status).filter(|status| !status.is_empty());
            return Err(RoutingError::DistanceUnavailable {
                status: status.or(top_level_status),
                message,
            });
        }

        // Live traffic estimate wins whenever google provides one
        let duration = if element.duration_in_traffic.value > 0.0 {
            element.duration_in_traffic.value
        } else {
            element.duration.value
        };

        DistanceTime::from_provider(PROVIDER, element.distance.value, duration)
    }
}

pub struct GoogleMapsClient {
    distance_matrix_url: String,
    api_key: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl GoogleMapsClient {
    pub fn new(params: GoogleMapsClientParams) -> Self {
        let mut distance_matrix_url = params.base_url.trim_end_matches('/').to_string();
        distance_matrix_url.push_str(GOOGLE_MAPS_DISTANCE_MATRIX_API_PATH);

        Self {
            distance_matrix_url,
            api_key: params.api_key,
            timeout: params.timeout,
            client: reqwest::Client::new(),
        }
    }

    /// One origin and one destination as `lat,lon`, departing now so traffic is applied.
    pub fn distance_matrix_url(&self, from: &Point, to: &Point) -> String {
        format!(
            "{}?key={}&origins={}&destinations={}&departure_time=now",
            self.distance_matrix_url,
            self.api_key,
            from.lat_lon(),
            to.lat_lon()
        )
    }
}

#[async_trait]
impl RoutingProvider for GoogleMapsClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn distance_time(&self, from: Point, to: Point) -> Result<DistanceTime, RoutingError> {
        debug!("GoogleMapsApi: requesting distance {} -> {}", from, to);

        let url = self.distance_matrix_url(&from, &to);
        let response: DistanceMatrixResponse = http::get_json(
            &self.client,
            PROVIDER,
            &url,
            self.timeout,
            BadRequestBody::Reject,
        )
        .await?;

        response.into_distance_time()
    }
}
