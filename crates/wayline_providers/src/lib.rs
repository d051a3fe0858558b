pub mod distance_time;
pub mod error;
pub mod google_maps_api;
pub mod graphhopper_api;
mod http;
pub mod osrm_api;
pub mod point;
pub mod routing_config;
pub mod routing_provider;

pub use distance_time::DistanceTime;
pub use error::{RoutingError, RoutingErrorKind};
pub use http::DEFAULT_TIMEOUT;
pub use point::Point;
pub use routing_config::{ConfigError, RoutingConfig, RoutingProviderConfig};
pub use routing_provider::RoutingProvider;
