use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::RoutingError;

/// DistanceTime is the normalized result of every provider.
/// Distance is always in meters, duration always in seconds.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Copy, PartialEq)]
pub struct DistanceTime {
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

impl DistanceTime {
    pub const ZERO: DistanceTime = DistanceTime {
        distance_meters: 0.0,
        duration_seconds: 0.0,
    };

    /// Builds a result from raw provider values, rejecting negative or non-finite numbers.
    pub(crate) fn from_provider(
        provider: &'static str,
        distance_meters: f64,
        duration_seconds: f64,
    ) -> Result<Self, RoutingError> {
        for (field, value) in [
            ("distance", distance_meters),
            ("duration", duration_seconds),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(RoutingError::InvalidValue {
                    provider,
                    field,
                    value,
                });
            }
        }

        Ok(DistanceTime {
            distance_meters,
            duration_seconds,
        })
    }

    pub fn duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(self.duration_seconds)
    }
}
