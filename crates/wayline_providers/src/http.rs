use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::RoutingError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// What to do with the body of a `400 Bad Request` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BadRequestBody {
    /// The provider reports routing failures with a 400 and its regular envelope.
    Decode,
    Reject,
}

/// Issues a GET request and decodes the JSON body.
///
/// Non-success statuses become [`RoutingError::Api`] with the body as message, except a 400
/// whose body decodes as `T` when `bad_request` is [`BadRequestBody::Decode`].
pub(crate) async fn get_json<T>(
    client: &reqwest::Client,
    provider: &'static str,
    url: &str,
    timeout: Duration,
    bad_request: BadRequestBody,
) -> Result<T, RoutingError>
where
    T: DeserializeOwned,
{
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|err| {
            // the url carries the api key
            let err = err.without_url();
            warn!("{}: request failed: {}", provider, err);
            RoutingError::from_reqwest(err, timeout)
        })?;

    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|err| RoutingError::from_reqwest(err.without_url(), timeout))?;

    if !status.is_success() {
        if status == StatusCode::BAD_REQUEST && bad_request == BadRequestBody::Decode {
            if let Ok(body) = serde_json::from_slice::<T>(&bytes) {
                debug!("{}: decoded 400 reply", provider);
                return Ok(body);
            }
        }

        warn!("{}: API error {}", provider, status.as_u16());
        return Err(RoutingError::Api {
            status: status.as_u16(),
            message: String::from_utf8_lossy(&bytes).into_owned(),
        });
    }

    let body: T = serde_json::from_slice(&bytes).inspect_err(|err| {
        warn!("{}: unable to decode response: {}", provider, err);
    })?;

    Ok(body)
}
