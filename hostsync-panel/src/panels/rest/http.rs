//! REST panel HTTP request methods

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, PanelErrorMapper, RawApiError};
use crate::utils::log_sanitizer::truncate_for_log;

use super::{ApiEnvelope, RestAuth, RestPanelClient};

impl RestPanelClient {
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            RestAuth::Bearer(token) => request.bearer_auth(token),
            RestAuth::Basic { username, password } => request.basic_auth(username, Some(password)),
        }
    }

    /// Send a request and unwrap the response envelope.
    ///
    /// Returns the envelope's `data`, which may be absent (e.g. for DELETE).
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
        ctx: ErrorContext,
    ) -> Result<Option<T>> {
        let mut request = self
            .authorize(self.client.request(method.clone(), url))
            .header("Accept", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let (status, response_text) = HttpUtils::execute_request_with_retry(
            request,
            self.panel_name(),
            method.as_str(),
            url,
            self.max_retries,
        )
        .await?;

        let envelope: ApiEnvelope<T> = if status >= 400 {
            // Error pages are not always JSON
            match serde_json::from_str(&response_text) {
                Ok(envelope) => envelope,
                Err(_) => {
                    return Err(self.map_error(
                        RawApiError::with_code(
                            format!("http_{status}"),
                            truncate_for_log(&response_text),
                        ),
                        ctx,
                    ));
                }
            }
        } else {
            HttpUtils::parse_json(&response_text, self.panel_name())?
        };

        if status >= 400 || !envelope.success {
            let raw = match envelope.error {
                Some(err) => RawApiError {
                    code: err.code.or_else(|| Some(format!("http_{status}"))),
                    message: err.message,
                },
                None if status >= 400 => {
                    RawApiError::with_code(format!("http_{status}"), format!("HTTP {status}"))
                }
                None => RawApiError::new("Request reported failure without an error body"),
            };
            log::warn!(
                "[{}] API error: {} - {}",
                self.panel_name(),
                raw.code.as_deref().unwrap_or("-"),
                raw.message
            );
            return Err(self.map_error(raw, ctx));
        }

        Ok(envelope.data)
    }

    /// Like [`send`](Self::send) but requires `data` to be present.
    pub(crate) async fn send_for_data<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
        ctx: ErrorContext,
    ) -> Result<T> {
        self.send(method, url, body, ctx)
            .await?
            .ok_or_else(|| self.parse_error("Missing data in response"))
    }
}
