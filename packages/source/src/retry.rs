//! HTTP retry helper for transient errors.
//!
//! All upstream requests go through [`send_json`] instead of calling
//! `reqwest::RequestBuilder::send()` directly, so every request gets the
//! same bounded retry treatment for transient failures: connection errors,
//! timeouts, non-success statuses, undecodable bodies, and `ArcGIS` error
//! payloads embedded in otherwise successful responses.
//!
//! # Usage
//!
//! ```ignore
//! use crate::retry;
//!
//! let body = retry::send_json(|| client.get(url).query(&params)).await?;
//! ```

use std::time::Duration;

use crate::SourceError;

/// Number of attempts per logical request before the error escalates to
/// the caller (which abandons the current query candidate).
const MAX_RETRIES: u32 = 3;

/// Fixed delay between attempts.
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Sends an HTTP request and parses the response body as JSON.
///
/// The `build_request` closure is called on each attempt to construct a
/// fresh [`reqwest::RequestBuilder`] (builders are consumed by `.send()`).
///
/// Every failure class is treated as transient and retried up to
/// [`MAX_RETRIES`] times with a fixed [`RETRY_DELAY`]: the upstream has a
/// history of shedding load with sporadic 5xx responses, truncated bodies,
/// and HTTP 200s wrapping an `error` object, and all of them recover on
/// the same page moments later.
///
/// # Errors
///
/// Returns the last [`SourceError`] once all attempts are exhausted.
#[allow(clippy::future_not_send)]
pub async fn send_json<F>(build_request: F) -> Result<serde_json::Value, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut last_error: Option<SourceError> = None;

    for attempt in 1..=MAX_RETRIES {
        match try_send(&build_request).await {
            Ok(body) => return Ok(body),
            Err(e) => {
                log::warn!("  attempt {attempt}/{MAX_RETRIES} failed: {e}");
                if attempt < MAX_RETRIES {
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| SourceError::Api {
        code: -1,
        message: "request failed after all retries".to_string(),
    }))
}

/// Single attempt: send, check status, decode JSON, reject embedded errors.
#[allow(clippy::future_not_send)]
async fn try_send<F>(build_request: &F) -> Result<serde_json::Value, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = build_request().send().await?.error_for_status()?;
    let body: serde_json::Value = response.json().await?;

    // ArcGIS reports failures as an `error` object inside an HTTP 200
    // body; an "empty" success that carries one is a failure.
    if let Some(error) = body.get("error") {
        return Err(SourceError::Api {
            code: error
                .get("code")
                .and_then(serde_json::Value::as_i64)
                .unwrap_or(-1),
            message: error
                .get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("Unknown")
                .to_string(),
        });
    }

    Ok(body)
}
