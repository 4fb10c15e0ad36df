//! Shared request plumbing: every provider response goes through
//! [`fetch_json`], which turns transport failures and non-2xx statuses into
//! `Network` errors and shape mismatches into `MalformedData`.

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use skycast_core::{NetworkError, ReqwestErrorExt};

use crate::types::WeatherError;

const MAX_ERROR_BODY: usize = 200;

/// Build the HTTP client shared by all providers of one context.
/// No timeout is configured; requests rely on the platform defaults.
pub fn build_client() -> Result<Client, WeatherError> {
    Client::builder()
        .build()
        .map_err(|e| WeatherError::Network(e.into_network_error()))
}

/// Send a request and decode its JSON body into `T`.
pub async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
    what: &str,
) -> Result<T, WeatherError> {
    let response = request
        .send()
        .await
        .map_err(|e| WeatherError::Network(e.into_network_error()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message: String = body.chars().take(MAX_ERROR_BODY).collect();
        tracing::debug!("{} returned status {}: {}", what, status, message);
        return Err(NetworkError::ServerError {
            status: status.as_u16(),
            message,
        }
        .into());
    }

    let body = response
        .text()
        .await
        .map_err(|e| WeatherError::Network(e.into_network_error()))?;

    serde_json::from_str(&body)
        .map_err(|e| WeatherError::MalformedData(format!("{what}: {e}")))
}
