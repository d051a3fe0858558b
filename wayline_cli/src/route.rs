use std::{path::PathBuf, time::Duration};

use clap::{Args, ValueEnum};
use tracing::{info, warn};
use wayline_providers::{Point, RoutingConfig, RoutingProviderConfig};

use crate::parsers;

#[derive(Copy, Clone, ValueEnum)]
pub enum Provider {
    Osrm,
    GraphHopper,
    GoogleMaps,
}

impl From<Provider> for RoutingProviderConfig {
    fn from(provider: Provider) -> Self {
        match provider {
            Provider::Osrm => RoutingProviderConfig::osrm(),
            Provider::GraphHopper => RoutingProviderConfig::graphhopper(),
            Provider::GoogleMaps => RoutingProviderConfig::google_maps(),
        }
    }
}

#[derive(Args)]
pub struct RouteArgs {
    /// Origin as `latitude,longitude`
    #[arg(long, allow_hyphen_values = true)]
    from: Point,

    /// Destination as `latitude,longitude`
    #[arg(long, allow_hyphen_values = true)]
    to: Point,

    /// Routing backend, ignored when --config is given
    #[arg(short, long, value_enum, default_value_t = Provider::Osrm)]
    provider: Provider,

    /// JSON provider configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Request timeout (e.g., "10s", "PT1M", "30")
    #[arg(short, long, value_parser = parsers::parse_timeout)]
    timeout: Option<Duration>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: RouteArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => RoutingConfig::from_file(path)?,
        None => RoutingConfig::new(args.provider.into()),
    };

    if let Some(timeout) = args.timeout {
        config.timeout_ms = u64::try_from(timeout.as_millis())?;
    }

    let provider = config.build()?;
    info!("Routing {} -> {} with {}", args.from, args.to, provider.name());

    let result = tokio::select! {
        result = provider.distance_time(args.from, args.to) => result?,
        _ = tokio::signal::ctrl_c() => {
            warn!("Cancelled");
            return Ok(());
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Distance : {} meters", result.distance_meters);
        println!("Time : {} seconds", result.duration_seconds);
    }

    Ok(())
}
