//! Network exchange with the Anypay API.
//!
//! All calls are POSTs with an empty body; every parameter travels in the
//! query string. Exactly one attempt is made per call and the status code is
//! not interpreted: whatever JSON the service returns is handed back.

use crate::errors::Result;
use crate::types::ApiResponse;
use reqwest::header::{CONNECTION, CONTENT_TYPE};
use reqwest::Client;

/// Sends a POST to `target` over the shared client and parses the JSON reply.
///
/// Transport failures surface as [`crate::AnypayError::HttpError`], a body that
/// is not JSON as [`crate::AnypayError::JsonError`].
pub async fn send(client: &Client, target: &str) -> Result<ApiResponse> {
    let response = client
        .post(target)
        .header(CONTENT_TYPE, "application/json")
        .header(CONNECTION, "keep-alive")
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;

    tracing::debug!(status = status.as_u16(), bytes = body.len(), "anypay response");

    Ok(serde_json::from_str(&body)?)
}
