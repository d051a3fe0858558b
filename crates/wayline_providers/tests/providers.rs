use std::{sync::Arc, time::Duration};

use mockito::{Matcher, Server};
use serde_json::json;
use tokio::net::TcpListener;
use wayline_providers::{
    DistanceTime, Point, RoutingConfig, RoutingError, RoutingErrorKind, RoutingProvider,
    RoutingProviderConfig,
    google_maps_api::{GoogleMapsClient, GoogleMapsClientParams},
    graphhopper_api::{
        GraphHopperOptions, GraphHopperRouteClient, GraphHopperRouteClientParams,
        GraphHopperVehicle,
    },
    osrm_api::{OsrmClient, OsrmClientParams, OsrmCodePolicy, OsrmOptions},
};

const OSRM_PATH: &str = "/route/v1/driving/106.829552,-6.260971;106.831823,-6.273751";

fn from() -> Point {
    Point::new(-6.260971, 106.829552)
}

fn to() -> Point {
    Point::new(-6.273751, 106.831823)
}

fn osrm_client(url: String, timeout: Duration) -> OsrmClient {
    OsrmClient::new(OsrmClientParams {
        osrm_url: url,
        timeout,
        ..Default::default()
    })
}

#[tokio::test]
async fn test_osrm_distance_time() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", OSRM_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("alternatives".into(), "false".into()),
            Matcher::UrlEncoded("overview".into(), "simplified".into()),
            Matcher::UrlEncoded("continue_straight".into(), "default".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "code": "Ok",
                "routes": [{"distance": 1200.5, "duration": 300.0}],
                "waypoints": []
            })
            .to_string(),
        )
        .expect(2)
        .create_async()
        .await;

    let client = osrm_client(server.url(), Duration::from_secs(5));

    let first = client.distance_time(from(), to()).await.unwrap();
    let second = client.distance_time(from(), to()).await.unwrap();

    assert_eq!(
        first,
        DistanceTime {
            distance_meters: 1200.5,
            duration_seconds: 300.0
        }
    );
    assert_eq!(first, second);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_osrm_no_route() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", OSRM_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"code": "Ok", "routes": []}"#)
        .create_async()
        .await;

    let client = osrm_client(server.url(), Duration::from_secs(5));
    let err = client.distance_time(from(), to()).await.unwrap_err();

    assert!(matches!(err, RoutingError::NoRoute { provider: "osrm" }));
}

#[tokio::test]
async fn test_osrm_require_ok_policy() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", OSRM_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"code": "NoRoute", "routes": [{"distance": 1.0, "duration": 1.0}]}"#)
        .expect(2)
        .create_async()
        .await;

    let lenient = osrm_client(server.url(), Duration::from_secs(5));
    assert!(lenient.distance_time(from(), to()).await.is_ok());

    let strict = OsrmClient::new(OsrmClientParams {
        osrm_url: server.url(),
        options: OsrmOptions::default(),
        code_policy: OsrmCodePolicy::RequireOk,
        timeout: Duration::from_secs(5),
    });
    let err = strict.distance_time(from(), to()).await.unwrap_err();
    assert_eq!(err.kind(), RoutingErrorKind::ProviderStatus);
}

#[tokio::test]
async fn test_osrm_server_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", OSRM_PATH)
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("upstream unavailable")
        .create_async()
        .await;

    let client = osrm_client(server.url(), Duration::from_secs(5));
    let err = client.distance_time(from(), to()).await.unwrap_err();

    match &err {
        RoutingError::Api { status, message } => {
            assert_eq!(*status, 503);
            assert_eq!(message, "upstream unavailable");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_osrm_bad_request_no_route() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", OSRM_PATH)
        .match_query(Matcher::Any)
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"code":"NoRoute","message":"Impossible route between points"}"#)
        .expect(2)
        .create_async()
        .await;

    let lenient = osrm_client(server.url(), Duration::from_secs(5));
    let err = lenient.distance_time(from(), to()).await.unwrap_err();
    assert!(matches!(err, RoutingError::NoRoute { provider: "osrm" }));
    assert_eq!(err.kind(), RoutingErrorKind::EmptyResult);

    let strict = OsrmClient::new(OsrmClientParams {
        osrm_url: server.url(),
        code_policy: OsrmCodePolicy::RequireOk,
        timeout: Duration::from_secs(5),
        ..Default::default()
    });
    let err = strict.distance_time(from(), to()).await.unwrap_err();
    match &err {
        RoutingError::ProviderStatus { code, message, .. } => {
            assert_eq!(code, "NoRoute");
            assert_eq!(message.as_deref(), Some("Impossible route between points"));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_osrm_bad_request_not_json() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", OSRM_PATH)
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body("Bad Request")
        .create_async()
        .await;

    let client = osrm_client(server.url(), Duration::from_secs(5));
    let err = client.distance_time(from(), to()).await.unwrap_err();

    assert!(matches!(err, RoutingError::Api { status: 400, .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_graphhopper_distance_time() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/route")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("vehicle".into(), "small_truck".into()),
            Matcher::UrlEncoded("locale".into(), "en".into()),
            Matcher::UrlEncoded("key".into(), "test-key".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "info": {"took": 3},
                "paths": [{"distance": 5000.0, "time": 754999}]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = GraphHopperRouteClient::new(GraphHopperRouteClientParams {
        base_url: server.url(),
        options: GraphHopperOptions {
            vehicle: GraphHopperVehicle::SmallTruck,
            ..Default::default()
        },
        ..GraphHopperRouteClientParams::new("test-key")
    });

    let result = client.distance_time(from(), to()).await.unwrap();

    assert_eq!(result.distance_meters, 5000.0);
    assert_eq!(result.duration_seconds, 754.0);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_graphhopper_malformed_body() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/route")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("{\"paths\": [")
        .create_async()
        .await;

    let client = GraphHopperRouteClient::new(GraphHopperRouteClientParams {
        base_url: server.url(),
        ..GraphHopperRouteClientParams::new("test-key")
    });
    let err = client.distance_time(from(), to()).await.unwrap_err();

    assert_eq!(err.kind(), RoutingErrorKind::Decode);
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_graphhopper_bad_request() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/route")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "message": "Cannot find point 1: -6.273751,106.831823",
                "hints": [{"message": "Cannot find point 1: -6.273751,106.831823", "details": "com.graphhopper.util.exceptions.PointNotFoundException"}]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = GraphHopperRouteClient::new(GraphHopperRouteClientParams {
        base_url: server.url(),
        ..GraphHopperRouteClientParams::new("test-key")
    });
    let err = client.distance_time(from(), to()).await.unwrap_err();

    assert!(matches!(
        err,
        RoutingError::NoRoute {
            provider: "graphhopper"
        }
    ));
    assert_eq!(err.kind(), RoutingErrorKind::EmptyResult);
}

#[tokio::test]
async fn test_graphhopper_rate_limited() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/route")
        .match_query(Matcher::Any)
        .with_status(429)
        .with_body(r#"{"message": "API limit reached"}"#)
        .create_async()
        .await;

    let client = GraphHopperRouteClient::new(GraphHopperRouteClientParams {
        base_url: server.url(),
        ..GraphHopperRouteClientParams::new("test-key")
    });
    let err = client.distance_time(from(), to()).await.unwrap_err();

    assert!(matches!(err, RoutingError::Api { status: 429, .. }));
    assert!(err.is_retryable());
}

fn google_body(status: &str, duration: u64, duration_in_traffic: u64) -> String {
    json!({
        "rows": [{
            "elements": [{
                "status": status,
                "distance": {"text": "2.1 km", "value": 2104},
                "duration": {"text": "10 mins", "value": duration},
                "duration_in_traffic": {"text": "15 mins", "value": duration_in_traffic}
            }]
        }],
        "status": "OK"
    })
    .to_string()
}

fn google_maps_client(server: &Server) -> GoogleMapsClient {
    GoogleMapsClient::new(GoogleMapsClientParams {
        base_url: server.url(),
        ..GoogleMapsClientParams::new("test-key")
    })
}

#[tokio::test]
async fn test_google_maps_traffic_precedence() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/distancematrix/json")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("key".into(), "test-key".into()),
            Matcher::UrlEncoded("origins".into(), "-6.260971,106.829552".into()),
            Matcher::UrlEncoded("destinations".into(), "-6.273751,106.831823".into()),
            Matcher::UrlEncoded("departure_time".into(), "now".into()),
        ]))
        .with_status(200)
        .with_body(google_body("OK", 600, 900))
        .create_async()
        .await;

    let client = google_maps_client(&server);
    let result = client.distance_time(from(), to()).await.unwrap();

    assert_eq!(result.distance_meters, 2104.0);
    assert_eq!(result.duration_seconds, 900.0);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_google_maps_without_traffic() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/distancematrix/json")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(google_body("OK", 600, 0))
        .create_async()
        .await;

    let client = google_maps_client(&server);
    let result = client.distance_time(from(), to()).await.unwrap();

    assert_eq!(result.distance_meters, 2104.0);
    assert_eq!(result.duration_seconds, 600.0);
}

#[tokio::test]
async fn test_google_maps_zero_results() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/distancematrix/json")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(google_body("ZERO_RESULTS", 0, 0))
        .create_async()
        .await;

    let client = google_maps_client(&server);
    let err = client.distance_time(from(), to()).await.unwrap_err();

    assert!(matches!(err, RoutingError::DistanceUnavailable { .. }));
    assert_eq!(err.kind(), RoutingErrorKind::ProviderStatus);
}

#[tokio::test]
async fn test_providers_from_config() {
    let mut server = Server::new_async().await;
    let _osrm = server
        .mock("GET", OSRM_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"code": "Ok", "routes": [{"distance": 2000.0, "duration": 200.0}]}"#)
        .create_async()
        .await;
    let _graphhopper = server
        .mock("GET", "/route")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"paths": [{"distance": 2000.0, "time": 200500}]}"#)
        .create_async()
        .await;
    let _google = server
        .mock("GET", "/distancematrix/json")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"rows": [{"elements": [{"status": "OK", "distance": {"value": 2000}, "duration": {"value": 200}}]}]}"#,
        )
        .create_async()
        .await;

    let configs = [
        RoutingProviderConfig::Osrm {
            url: Some(server.url()),
            options: OsrmOptions::default(),
            code_policy: OsrmCodePolicy::Ignore,
        },
        RoutingProviderConfig::GraphHopper {
            api_key: None,
            base_url: Some(server.url()),
            options: GraphHopperOptions::default(),
        },
        RoutingProviderConfig::GoogleMaps {
            api_key: None,
            base_url: Some(server.url()),
        },
    ];

    let providers: Vec<Box<dyn RoutingProvider>> = configs
        .into_iter()
        .map(|provider| {
            RoutingConfig::new(provider)
                .build_with_env(|_| Some(String::from("test-key")))
                .unwrap()
        })
        .collect();

    for provider in &providers {
        let result = provider.distance_time(from(), to()).await.unwrap();

        assert_eq!(
            result,
            DistanceTime {
                distance_meters: 2000.0,
                duration_seconds: 200.0
            },
            "provider {}",
            provider.name()
        );
    }
}

#[tokio::test]
async fn test_concurrent_calls_share_one_provider() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", OSRM_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"code": "Ok", "routes": [{"distance": 42.0, "duration": 7.0}]}"#)
        .expect(4)
        .create_async()
        .await;

    let provider: Arc<dyn RoutingProvider> =
        Arc::new(osrm_client(server.url(), Duration::from_secs(5)));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let provider = provider.clone();
            tokio::spawn(async move { provider.distance_time(from(), to()).await })
        })
        .collect();

    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.distance_meters, 42.0);
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    // Accepts connections and never answers
    tokio::spawn(async move {
        let mut connections = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            connections.push(socket);
        }
    });

    let client = osrm_client(format!("http://{address}"), Duration::from_millis(200));
    let err = client.distance_time(from(), to()).await.unwrap_err();

    assert!(matches!(err, RoutingError::Timeout(_)));
    assert_eq!(err.kind(), RoutingErrorKind::Timeout);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_connection_refused() {
    let address = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let client = osrm_client(format!("http://{address}"), Duration::from_secs(5));
    let err = client.distance_time(from(), to()).await.unwrap_err();

    assert_eq!(err.kind(), RoutingErrorKind::Transport);
}
