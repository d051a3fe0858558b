use async_trait::async_trait;

use crate::{distance_time::DistanceTime, error::RoutingError, point::Point};

/// Resolves the travel distance and duration between two points through a remote routing service.
///
/// Implementations are bound to a fully resolved request template at construction and hold no
/// mutable state, so a single instance can be shared between tasks. Every call issues at most one
/// HTTP request. Dropping the returned future cancels the request.
#[async_trait]
pub trait RoutingProvider: Send + Sync {
    /// Short identifier used in logs and errors.
    fn name(&self) -> &'static str;

    /// Distance in meters and duration in seconds from `from` to `to`.
    async fn distance_time(&self, from: Point, to: Point) -> Result<DistanceTime, RoutingError>;
}
