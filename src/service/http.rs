//! HTTP client construction, headers, and status mapping.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::error::ParleyError;

const BETA_HEADER: HeaderName = HeaderName::from_static("openai-beta");
const ORGANIZATION_HEADER: HeaderName = HeaderName::from_static("openai-organization");

/// Build a client with the given request timeout.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, ParleyError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(10)
        .build()
        .map_err(ParleyError::from)
}

/// Bearer auth plus the Assistants v2 beta opt-in.
pub fn assistants_headers(api_key: &str, organization: Option<&str>) -> Result<HeaderMap, ParleyError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(BETA_HEADER, HeaderValue::from_static("assistants=v2"));
    let auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
        .map_err(|_| ParleyError::Configuration("API key contains invalid header characters".into()))?;
    headers.insert(AUTHORIZATION, auth);
    if let Some(org) = organization {
        let org = HeaderValue::from_str(org)
            .map_err(|_| ParleyError::Configuration("organization contains invalid header characters".into()))?;
        headers.insert(ORGANIZATION_HEADER, org);
    }
    Ok(headers)
}

/// Map a non-success status and body to an error.
pub fn status_to_error(status: u16, body: &str) -> ParleyError {
    let message = error_message(body).unwrap_or_else(|| body.to_string());
    match status {
        401 | 403 => ParleyError::Authentication(message),
        429 => ParleyError::RateLimited {
            retry_after_ms: extract_retry_after(body),
        },
        _ => ParleyError::api(status, message),
    }
}

/// `{"error": {"message": ...}}` bodies carry a readable message.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

fn extract_retry_after(body: &str) -> Option<u64> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("retry_after"))
                .and_then(|r| r.as_f64())
                .map(|s| (s * 1000.0) as u64)
        })
}
