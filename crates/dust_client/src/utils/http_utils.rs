use std::error::Error;
use std::time::{Duration, Instant};

use log::{debug, error, info};
use reqwest::{Client, Method, Response};
use serde::Serialize;

use crate::error::{DustApiError, Result};
use crate::masking::mask_secret;

/// Executes a bearer-authenticated request against the Dust API.
///
/// `timeout` bounds the whole exchange; pass `None` for streamed bodies, whose
/// lifetime is governed by the caller.
pub async fn execute_request<T: Serialize + ?Sized>(
    client: &Client,
    method: Method,
    url: &str,
    api_key: &str,
    json_body: Option<&T>,
    timeout: Option<Duration>,
) -> Result<Response> {
    let mut request_builder = client.request(method.clone(), url).bearer_auth(api_key);

    if let Some(body) = json_body {
        request_builder = request_builder.json(body);
    }
    if let Some(timeout) = timeout {
        request_builder = request_builder.timeout(timeout);
    }

    info!("Sending {} request to {}", method, url);
    debug!("Authorization: Bearer {}", mask_secret(api_key));

    let start_time = Instant::now();

    match request_builder.send().await {
        Ok(resp) => {
            info!(
                "Got response from {} after {:?} with status {}",
                url,
                start_time.elapsed(),
                resp.status()
            );
            Ok(resp)
        }
        Err(e) => {
            error!("Failed HTTP request to {}: {}", url, e);
            if let Some(source) = e.source() {
                error!("Error source: {:?}", source);
            }
            if e.is_timeout() {
                error!("Request timed out");
            }
            if e.is_connect() {
                error!("Connection error");
            }
            Err(DustApiError::Http(e))
        }
    }
}

/// Turns a non-success response into [`DustApiError::Status`] carrying the raw body.
pub async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_else(|e| {
        error!("Failed to read error body: {}", e);
        String::new()
    });
    Err(DustApiError::Status {
        status: status.as_u16(),
        body,
    })
}
