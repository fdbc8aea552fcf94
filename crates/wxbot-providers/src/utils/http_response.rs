//! HTTP Response Utilities
//!
//! Helper functions for processing HTTP responses from API providers.

use reqwest::Response;
use serde::de::DeserializeOwned;
use wxbot_domain::error::{Error, Result};

fn provider_error(provider: &str, context: &str, details: &str) -> Error {
    Error::provider(format!("{provider} {context}: {details}"))
}

/// Utilities for processing HTTP responses
pub struct HttpResponseUtils;

impl HttpResponseUtils {
    /// Check response status and decode the JSON body
    ///
    /// Every failure maps to `Error::Provider`.
    pub async fn check_and_parse<T: DeserializeOwned>(
        response: Response,
        provider_name: &str,
    ) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let code = status.as_u16();

            return Err(match code {
                401 => provider_error(provider_name, "authentication failed", &error_text),
                429 => provider_error(provider_name, "rate limit exceeded", &error_text),
                500..=599 => provider_error(
                    provider_name,
                    &format!("server error ({code})"),
                    &error_text,
                ),
                _ => provider_error(
                    provider_name,
                    &format!("request failed ({code})"),
                    &error_text,
                ),
            });
        }

        response
            .json()
            .await
            .map_err(|e| provider_error(provider_name, "response parse failed", &e.to_string()))
    }
}
