//! Shared HTTP plumbing for panel clients
//!
//! Sends a prepared `RequestBuilder`, logs the exchange, turns transport-level
//! failures into [`PanelError`] and optionally retries transient ones.
//! Authentication and URL layout stay with each panel client.

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::PanelError;
use crate::utils::log_sanitizer::truncate_for_log;

/// HTTP helper functions
pub struct HttpUtils;

impl HttpUtils {
    /// Send a request and return `(status_code, body)`.
    ///
    /// HTTP 429 becomes [`PanelError::RateLimited`] and 502..=504 become
    /// [`PanelError::NetworkError`]; every other status is handed back to the
    /// caller for envelope parsing.
    pub async fn execute_request(
        request_builder: RequestBuilder,
        panel_name: &str,
        method_name: &str,
        url: &str,
    ) -> Result<(u16, String), PanelError> {
        log::debug!("[{panel_name}] {method_name} {url}");

        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                PanelError::Timeout {
                    panel: panel_name.to_string(),
                    detail: e.to_string(),
                }
            } else {
                PanelError::NetworkError {
                    panel: panel_name.to_string(),
                    detail: e.to_string(),
                }
            }
        })?;

        let status_code = response.status().as_u16();
        log::debug!("[{panel_name}] Response Status: {status_code}");

        // Read before the body consumes the response
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        if status_code == 429 {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{panel_name}] Rate limited (HTTP 429), retry_after={retry_after:?}");
            return Err(PanelError::RateLimited {
                panel: panel_name.to_string(),
                retry_after,
                raw_message: Some(truncate_for_log(&body)),
            });
        }

        if matches!(status_code, 502..=504) {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{panel_name}] Gateway error (HTTP {status_code})");
            return Err(PanelError::NetworkError {
                panel: panel_name.to_string(),
                detail: format!("HTTP {status_code}: {}", truncate_for_log(&body)),
            });
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| PanelError::NetworkError {
                panel: panel_name.to_string(),
                detail: format!("Failed to read response body: {e}"),
            })?;

        log::debug!(
            "[{panel_name}] Response Body: {}",
            truncate_for_log(&response_text)
        );

        Ok((status_code, response_text))
    }

    /// Deserialize a JSON body, mapping failures to [`PanelError::ParseError`].
    pub fn parse_json<T>(response_text: &str, panel_name: &str) -> Result<T, PanelError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(response_text).map_err(|e| {
            log::error!("[{panel_name}] JSON parse failed: {e}");
            log::error!(
                "[{panel_name}] Raw response: {}",
                truncate_for_log(response_text)
            );
            PanelError::ParseError {
                panel: panel_name.to_string(),
                detail: e.to_string(),
            }
        })
    }

    /// Like [`execute_request`](Self::execute_request), retrying transient
    /// failures up to `max_retries` times.
    ///
    /// Backoff is 100ms doubling per attempt, capped at 10s. A `Retry-After`
    /// hint on a rate limit wins over the backoff (capped at 30s). Requests
    /// whose body cannot be cloned are sent once.
    pub async fn execute_request_with_retry(
        request_builder: RequestBuilder,
        panel_name: &str,
        method_name: &str,
        url: &str,
        max_retries: u32,
    ) -> Result<(u16, String), PanelError> {
        if max_retries == 0 {
            return Self::execute_request(request_builder, panel_name, method_name, url).await;
        }

        let mut last_error = None;

        for attempt in 0..=max_retries {
            let Some(req) = request_builder.try_clone() else {
                log::warn!("[{panel_name}] Cannot clone request, disabling retry");
                return Self::execute_request(request_builder, panel_name, method_name, url)
                    .await;
            };

            match Self::execute_request(req, panel_name, method_name, url).await {
                Ok(resp) => return Ok(resp),
                Err(e) if attempt < max_retries && e.is_retryable() => {
                    let delay = retry_delay(&e, attempt);
                    log::warn!(
                        "[{}] Request failed (attempt {}/{}), retrying in {:.1}s: {}",
                        panel_name,
                        attempt + 1,
                        max_retries,
                        delay.as_secs_f32(),
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| PanelError::NetworkError {
            panel: panel_name.to_string(),
            detail: "All retries exhausted with no error captured".to_string(),
        }))
    }
}

fn retry_delay(error: &PanelError, attempt: u32) -> Duration {
    if let PanelError::RateLimited {
        retry_after: Some(secs),
        ..
    } = error
    {
        Duration::from_secs((*secs).min(30))
    } else {
        backoff_delay(attempt)
    }
}

/// 100ms, 200ms, 400ms, ... capped at 10s
fn backoff_delay(attempt: u32) -> Duration {
    let capped_attempt = attempt.min(20);
    let delay_ms = 100_u64.saturating_mul(1_u64 << capped_attempt);
    Duration::from_millis(delay_ms.min(10_000))
}
